//! Domain types, validation and projections for taskmate tasks.

/// Editable task draft with per-field errors.
pub mod form;
/// Identifier types.
pub mod id;
/// Filtered, sorted and searched views over task lists.
pub mod projection;
/// Case-insensitive task search.
pub mod text_matcher;
/// Draft validation rules.
pub mod validate;
/// Date and time wire encodings.
pub mod wire;
/// Workload parsing and formatting.
pub mod workload;
/// Digest of tasks that still need attention.
pub mod workplan;

use crate::id::TaskId;
use crate::workload::{Workload, WorkloadError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use time::macros::time;
use time::{Date, PrimitiveDateTime, Time};

/// Clock time used as the due instant of tasks that only carry a date.
pub const END_OF_DAY: Time = time!(23:59:59.999_999_999);

/// Task priority, ranked High before Medium before Low.
///
/// Deserialization goes through [`FromStr`], so wire labels are matched
/// case-insensitively just like typed input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Priority {
    /// Most urgent.
    High,
    /// Default urgency.
    Medium,
    /// Least urgent.
    Low,
}

impl Priority {
    /// Every priority in rank order.
    pub const ALL: [Self; 3] = [Self::High, Self::Medium, Self::Low];

    /// Sort rank; lower sorts first.
    #[must_use]
    pub const fn rank(self) -> u8 {
        match self {
            Self::High => 0,
            Self::Medium => 1,
            Self::Low => 2,
        }
    }

    /// Wire / display label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for priority labels outside High/Medium/Low.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown priority: {0}")]
pub struct PriorityError(pub String);

impl FromStr for Priority {
    type Err = PriorityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| PriorityError(trimmed.to_owned()))
    }
}

impl<'de> Deserialize<'de> for Priority {
    fn deserialize<D>(d: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(d)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Task as returned by the task service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Identifier assigned by the service.
    pub id: TaskId,
    /// Task name.
    pub name: String,
    /// Due date.
    #[serde(with = "wire::date")]
    pub date: Date,
    /// Optional due time on [`date`](Self::date).
    #[serde(default, with = "wire::clock_time", skip_serializing_if = "Option::is_none")]
    pub time: Option<Time>,
    /// Priority.
    pub priority: Priority,
    /// Workload string as stored by the service.
    pub workload: String,
    /// Completion flag.
    #[serde(default, deserialize_with = "wire::flag::deserialize")]
    pub completed: bool,
    /// Owner of a task shared with the current user.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_username: Option<String>,
}

impl Task {
    /// Due instant; date-only tasks are due at the end of their day.
    #[must_use]
    pub fn due_at(&self) -> PrimitiveDateTime {
        self.date.with_time(self.time.unwrap_or(END_OF_DAY))
    }

    /// Overdue means past due and not completed. Never stored.
    #[must_use]
    pub fn is_overdue(&self, now: PrimitiveDateTime) -> bool {
        !self.completed && self.due_at() < now
    }

    /// Parse the stored workload string.
    ///
    /// # Errors
    /// Returns [`WorkloadError`] when the service holds a malformed value.
    pub fn workload(&self) -> Result<Workload, WorkloadError> {
        Workload::parse(&self.workload)
    }

    /// True for tasks shared with the current user by someone else.
    #[must_use]
    pub const fn is_shared_with_me(&self) -> bool {
        self.owner_username.is_some()
    }
}

/// Validated payload for creating a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewTask {
    /// Trimmed task name.
    pub name: String,
    /// Due date.
    #[serde(with = "wire::date")]
    pub date: Date,
    /// Optional due time.
    #[serde(with = "wire::clock_time")]
    pub time: Option<Time>,
    /// Priority.
    pub priority: Priority,
    /// Canonical workload.
    pub workload: Workload,
}

/// Partial update sent to the task service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TaskPatch {
    /// New completion flag.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

impl TaskPatch {
    /// Patch that only sets the completion flag.
    #[must_use]
    pub const fn completed(completed: bool) -> Self {
        Self {
            completed: Some(completed),
        }
    }
}
