//! Calendar date and clock time encodings used by the task service.

use time::format_description::FormatItem;
use time::macros::format_description;
use time::{Date, Time};

const DATE_FORMAT: &[FormatItem<'static>] = format_description!("[year]-[month]-[day]");
const TIME_FORMAT: &[FormatItem<'static>] = format_description!("[hour]:[minute]");
const TIME_WITH_SECONDS: &[FormatItem<'static>] = format_description!("[hour]:[minute]:[second]");

/// Parse a `YYYY-MM-DD` date. A longer ISO timestamp is cut to its date part.
#[must_use]
pub fn parse_date(raw: &str) -> Option<Date> {
    let trimmed = raw.trim();
    let date_part = match trimmed.char_indices().nth(10) {
        Some((idx, 'T' | 't' | ' ')) => &trimmed[..idx],
        _ => trimmed,
    };
    Date::parse(date_part, DATE_FORMAT).ok()
}

/// Parse an `HH:MM` clock time; trailing seconds are tolerated.
#[must_use]
pub fn parse_time(raw: &str) -> Option<Time> {
    let trimmed = raw.trim();
    Time::parse(trimmed, TIME_FORMAT)
        .or_else(|_| Time::parse(trimmed, TIME_WITH_SECONDS))
        .ok()
}

/// Render a date as `YYYY-MM-DD`.
#[must_use]
pub fn format_date(date: Date) -> String {
    date.format(DATE_FORMAT).unwrap_or_default()
}

/// Render a time as `HH:MM`.
#[must_use]
pub fn format_time(time: Time) -> String {
    time.format(TIME_FORMAT).unwrap_or_default()
}

pub(crate) mod date {
    use serde::{Deserialize, Deserializer, Serializer};
    use time::Date;

    pub fn serialize<S>(date: &Date, s: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        s.serialize_str(&super::format_date(*date))
    }

    pub fn deserialize<'de, D>(d: D) -> Result<Date, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(d)?;
        super::parse_date(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid date: {raw}")))
    }
}

pub(crate) mod clock_time {
    use serde::{Deserialize, Deserializer, Serializer};
    use time::Time;

    #[allow(clippy::ref_option)]
    pub fn serialize<S>(time: &Option<Time>, s: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match time {
            Some(value) => s.serialize_str(&super::format_time(*value)),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(d: D) -> Result<Option<Time>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(d)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(value) => super::parse_time(value)
                .map(Some)
                .ok_or_else(|| serde::de::Error::custom(format!("invalid time: {value}"))),
        }
    }
}

pub(crate) mod flag {
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawFlag {
        Bool(bool),
        Int(i64),
    }

    // Services backed by integer columns send 0/1.
    pub fn deserialize<'de, D>(d: D) -> Result<bool, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Option::<RawFlag>::deserialize(d)? {
            Some(RawFlag::Bool(value)) => value,
            Some(RawFlag::Int(value)) => value != 0,
            None => false,
        })
    }
}
