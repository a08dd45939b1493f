use time::{Date, PrimitiveDateTime};

use crate::NewTask;
use crate::validate::{Field, FieldErrors, TaskDraft, validate};
use crate::wire::{format_date, format_time};

/// Task creation form: the draft plus the errors currently shown next to it.
#[derive(Debug, Clone, Default)]
pub struct TaskForm {
    draft: TaskDraft,
    errors: FieldErrors,
    submit_error: Option<String>,
}

impl TaskForm {
    /// Empty form.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current draft values.
    #[must_use]
    pub const fn draft(&self) -> &TaskDraft {
        &self.draft
    }

    /// Errors from the last submit attempt that are still relevant.
    #[must_use]
    pub const fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    /// Failure of the last create request, shown inline.
    #[must_use]
    pub fn submit_error(&self) -> Option<&str> {
        self.submit_error.as_deref()
    }

    /// Edit a field. Its error disappears immediately.
    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        self.draft.set(field, value);
        self.errors.clear(field);
    }

    /// Fill date and time with the given local instant (minute precision).
    pub fn set_now(&mut self, now: PrimitiveDateTime) {
        self.set(Field::Date, format_date(now.date()));
        self.set(Field::Time, format_time(now.time()));
    }

    /// Validate the draft. Errors are kept on the form when it fails.
    pub fn submit(&mut self, today: Date) -> Option<NewTask> {
        self.submit_error = None;
        match validate(&self.draft, today) {
            Ok(task) => {
                self.errors = FieldErrors::default();
                Some(task)
            }
            Err(errors) => {
                self.errors = errors;
                None
            }
        }
    }

    /// Record a failed create request without touching the draft.
    pub fn set_submit_error(&mut self, message: impl Into<String>) {
        self.submit_error = Some(message.into());
    }

    /// Clear draft and errors.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
