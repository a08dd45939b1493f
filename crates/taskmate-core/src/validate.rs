use std::collections::BTreeMap;
use std::fmt;

use time::Date;

use crate::workload::{Workload, WorkloadError};
use crate::{NewTask, Priority, wire};

/// Name left blank.
pub const NAME_REQUIRED: &str = "Task name is required";
/// Name shorter than [`MIN_NAME_CHARS`].
pub const NAME_TOO_SHORT: &str = "Task name must be at least 3 characters";
/// Date left blank.
pub const DATE_REQUIRED: &str = "Due date is required";
/// Date is not a calendar date.
pub const DATE_INVALID: &str = "Due date must be a valid date";
/// Date before today.
pub const DATE_IN_PAST: &str = "Due date cannot be in the past";
/// Time is present but not `HH:MM`.
pub const TIME_INVALID: &str = "Due time must be a valid time (HH:MM)";
/// Priority blank or unknown.
pub const PRIORITY_REQUIRED: &str = "Priority is required";
/// Workload left blank.
pub const WORKLOAD_REQUIRED: &str = "Workload is required";
/// Workload not made of hour/minute tokens.
pub const WORKLOAD_FORMAT: &str = "Workload format should be like '2hr 30min'";

/// Minimum trimmed length of a task name.
pub const MIN_NAME_CHARS: usize = 3;

/// Draft field a validation message belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    /// Task name.
    Name,
    /// Due date.
    Date,
    /// Due time.
    Time,
    /// Priority.
    Priority,
    /// Workload.
    Workload,
}

impl Field {
    /// Lower-case field label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Date => "date",
            Self::Time => "time",
            Self::Priority => "priority",
            Self::Workload => "workload",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Unsaved task fields exactly as entered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskDraft {
    /// Task name.
    pub name: String,
    /// Due date, `YYYY-MM-DD`.
    pub date: String,
    /// Optional due time, `HH:MM`.
    pub time: String,
    /// `High`, `Medium` or `Low`.
    pub priority: String,
    /// Workload such as `2hr 30min`.
    pub workload: String,
}

impl TaskDraft {
    /// Raw value of a field.
    #[must_use]
    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Name => &self.name,
            Field::Date => &self.date,
            Field::Time => &self.time,
            Field::Priority => &self.priority,
            Field::Workload => &self.workload,
        }
    }

    /// Replace the raw value of a field.
    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        let slot = match field {
            Field::Name => &mut self.name,
            Field::Date => &mut self.date,
            Field::Time => &mut self.time,
            Field::Priority => &mut self.priority,
            Field::Workload => &mut self.workload,
        };
        *slot = value.into();
    }
}

/// Field-scoped validation messages.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<Field, String>);

impl FieldErrors {
    /// True when no field has an error.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of fields with an error.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Message for a field, if any.
    #[must_use]
    pub fn get(&self, field: Field) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    /// Drop the message for a field.
    pub fn clear(&mut self, field: Field) {
        self.0.remove(&field);
    }

    /// Iterate messages in form order.
    pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> {
        self.0.iter().map(|(field, message)| (*field, message.as_str()))
    }

    fn insert(&mut self, field: Field, message: &str) {
        self.0.insert(field, message.to_owned());
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, message) in self.iter() {
            if !first {
                f.write_str("; ")?;
            }
            first = false;
            write!(f, "{field}: {message}")?;
        }
        Ok(())
    }
}

/// Check every rule against the draft, accumulating all field errors.
///
/// `today` is the local calendar date; a due date equal to it is accepted.
///
/// # Errors
/// Returns the accumulated [`FieldErrors`] when any rule fails.
pub fn validate(draft: &TaskDraft, today: Date) -> Result<NewTask, FieldErrors> {
    let mut errors = FieldErrors::default();

    let name = draft.name.trim();
    if name.is_empty() {
        errors.insert(Field::Name, NAME_REQUIRED);
    } else if name.chars().count() < MIN_NAME_CHARS {
        errors.insert(Field::Name, NAME_TOO_SHORT);
    }

    let date = if draft.date.trim().is_empty() {
        errors.insert(Field::Date, DATE_REQUIRED);
        None
    } else {
        match wire::parse_date(&draft.date) {
            Some(date) if date < today => {
                errors.insert(Field::Date, DATE_IN_PAST);
                None
            }
            Some(date) => Some(date),
            None => {
                errors.insert(Field::Date, DATE_INVALID);
                None
            }
        }
    };

    let time = if draft.time.trim().is_empty() {
        None
    } else {
        let parsed = wire::parse_time(&draft.time);
        if parsed.is_none() {
            errors.insert(Field::Time, TIME_INVALID);
        }
        parsed
    };

    let priority = draft.priority.parse::<Priority>().ok();
    if priority.is_none() {
        errors.insert(Field::Priority, PRIORITY_REQUIRED);
    }

    let workload = match Workload::parse(&draft.workload) {
        Ok(workload) => Some(workload),
        Err(WorkloadError::Empty) => {
            errors.insert(Field::Workload, WORKLOAD_REQUIRED);
            None
        }
        Err(_) => {
            errors.insert(Field::Workload, WORKLOAD_FORMAT);
            None
        }
    };

    match (date, priority, workload) {
        (Some(date), Some(priority), Some(workload)) if errors.is_empty() => Ok(NewTask {
            name: name.to_owned(),
            date,
            time,
            priority,
            workload,
        }),
        _ => Err(errors),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::{date, time};

    const TODAY: Date = date!(2025 - 06 - 15);

    fn draft(name: &str, date: &str, priority: &str, workload: &str) -> TaskDraft {
        TaskDraft {
            name: name.into(),
            date: date.into(),
            time: String::new(),
            priority: priority.into(),
            workload: workload.into(),
        }
    }

    fn errors_of(draft: &TaskDraft) -> FieldErrors {
        match validate(draft, TODAY) {
            Ok(task) => panic!("expected validation errors, got {task:?}"),
            Err(errors) => errors,
        }
    }

    #[test]
    fn empty_draft_reports_every_required_field() {
        let errors = errors_of(&TaskDraft::default());
        assert_eq!(errors.len(), 4);
        assert_eq!(errors.get(Field::Name), Some(NAME_REQUIRED));
        assert_eq!(errors.get(Field::Date), Some(DATE_REQUIRED));
        assert_eq!(errors.get(Field::Priority), Some(PRIORITY_REQUIRED));
        assert_eq!(errors.get(Field::Workload), Some(WORKLOAD_REQUIRED));
    }

    #[test]
    fn short_names_are_rejected_after_trimming() {
        for name in ["a", "ab", "  ab  ", "\tx "] {
            let errors = errors_of(&draft(name, "2025-06-20", "High", "1hr"));
            assert_eq!(errors.get(Field::Name), Some(NAME_TOO_SHORT), "{name:?}");
        }
    }

    #[test]
    fn past_date_is_the_only_error() {
        let errors = errors_of(&draft("New Task", "2025-06-14", "High", "1hr"));
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.get(Field::Date), Some(DATE_IN_PAST));
    }

    #[test]
    fn today_is_accepted() {
        let task = validate(&draft("New Task", "2025-06-15", "High", "1hr"), TODAY)
            .unwrap_or_else(|err| panic!("today must be valid: {err}"));
        assert_eq!(task.date, TODAY);
    }

    #[test]
    fn malformed_values_report_format_errors() {
        let mut bad = draft("New Task", "2025-13-01", "Urgent", "invalid");
        bad.time = "7pm".into();
        let errors = errors_of(&bad);
        assert_eq!(errors.get(Field::Date), Some(DATE_INVALID));
        assert_eq!(errors.get(Field::Time), Some(TIME_INVALID));
        assert_eq!(errors.get(Field::Priority), Some(PRIORITY_REQUIRED));
        assert_eq!(errors.get(Field::Workload), Some(WORKLOAD_FORMAT));
    }

    #[test]
    fn valid_draft_yields_normalized_task() {
        let mut ok = draft("  Write report ", "2025-07-01", "medium", "30min 2HR");
        ok.time = "14:30".into();
        let task = validate(&ok, TODAY).unwrap_or_else(|err| panic!("draft must be valid: {err}"));
        assert_eq!(task.name, "Write report");
        assert_eq!(task.time, Some(time!(14:30)));
        assert_eq!(task.priority, Priority::Medium);
        assert_eq!(task.workload.to_string(), "2hr 30min");
    }

    #[test]
    fn display_lists_errors_in_form_order() {
        let errors = errors_of(&draft("", "", "High", "1hr"));
        assert_eq!(
            errors.to_string(),
            "name: Task name is required; date: Due date is required"
        );
    }
}
