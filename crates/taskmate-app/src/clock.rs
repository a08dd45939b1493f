use time::{OffsetDateTime, PrimitiveDateTime};

/// Current wall-clock time in the local zone.
///
/// Falls back to UTC when the local offset cannot be determined (for
/// example in multi-threaded processes on some Unix platforms).
#[must_use]
pub fn local_now() -> PrimitiveDateTime {
    let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
    PrimitiveDateTime::new(now.date(), now.time())
}
