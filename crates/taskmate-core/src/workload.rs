//! Free-text effort estimates such as `2hr 30min`.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::iter::Sum;
use std::str::FromStr;
use thiserror::Error;

/// Reasons a workload string is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkloadError {
    /// Input was empty or whitespace only.
    #[error("workload is empty")]
    Empty,
    /// Input contained something other than hour/minute tokens.
    #[error("unrecognised workload token: {token}")]
    InvalidToken {
        /// Offending token as typed.
        token: String,
    },
    /// The same unit appeared twice.
    #[error("workload repeats the {unit} component")]
    DuplicateUnit {
        /// Unit name (`hours` or `minutes`).
        unit: &'static str,
    },
}

/// Effort estimate split into hours and minutes.
///
/// Components are kept as entered (`90min` stays 90 minutes); use
/// [`Workload::normalized`] to carry minutes into hours.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Workload {
    /// Whole hours.
    pub hours: u32,
    /// Whole minutes.
    pub minutes: u32,
}

#[derive(Clone, Copy)]
enum Unit {
    Hours,
    Minutes,
}

impl Unit {
    fn from_suffix(suffix: &str) -> Option<Self> {
        match suffix {
            "hr" | "hrs" | "hour" | "hours" => Some(Self::Hours),
            "min" | "mins" | "minute" | "minutes" => Some(Self::Minutes),
            _ => None,
        }
    }

    const fn name(self) -> &'static str {
        match self {
            Self::Hours => "hours",
            Self::Minutes => "minutes",
        }
    }
}

impl Workload {
    /// Construct a workload from its components.
    #[must_use]
    pub const fn new(hours: u32, minutes: u32) -> Self {
        Self { hours, minutes }
    }

    /// Build a normalized workload from a minute total.
    #[must_use]
    pub fn from_minutes(total: u64) -> Self {
        let hours = u32::try_from(total / 60).unwrap_or(u32::MAX);
        let minutes = u32::try_from(total % 60).unwrap_or(0);
        Self { hours, minutes }
    }

    /// Parse `N hr` / `N min` tokens (either order, case-insensitive).
    ///
    /// The number may be glued to the unit (`2hr`) or separated by
    /// whitespace (`2 hours`). At least one component is required.
    ///
    /// # Errors
    /// Returns [`WorkloadError`] for blank input, unknown tokens, or a
    /// repeated unit.
    pub fn parse(text: &str) -> Result<Self, WorkloadError> {
        let lowered = text.to_lowercase();
        let mut tokens = lowered.split_whitespace().peekable();
        if tokens.peek().is_none() {
            return Err(WorkloadError::Empty);
        }

        let mut hours = None;
        let mut minutes = None;
        while let Some(token) = tokens.next() {
            let digits_end = token
                .find(|c: char| !c.is_ascii_digit())
                .unwrap_or(token.len());
            if digits_end == 0 {
                return Err(invalid(token));
            }
            let (number, suffix) = token.split_at(digits_end);
            let value: u32 = number.parse().map_err(|_| invalid(token))?;

            let unit = if suffix.is_empty() {
                let next = tokens.next().ok_or_else(|| invalid(token))?;
                Unit::from_suffix(next).ok_or_else(|| invalid(next))?
            } else {
                Unit::from_suffix(suffix).ok_or_else(|| invalid(token))?
            };

            let slot = match unit {
                Unit::Hours => &mut hours,
                Unit::Minutes => &mut minutes,
            };
            if slot.replace(value).is_some() {
                return Err(WorkloadError::DuplicateUnit { unit: unit.name() });
            }
        }

        Ok(Self {
            hours: hours.unwrap_or(0),
            minutes: minutes.unwrap_or(0),
        })
    }

    /// Total effort in minutes.
    #[must_use]
    pub fn total_minutes(self) -> u64 {
        u64::from(self.hours) * 60 + u64::from(self.minutes)
    }

    /// Same duration with minutes below 60.
    #[must_use]
    pub fn normalized(self) -> Self {
        Self::from_minutes(self.total_minutes())
    }

    /// True when both components are zero.
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.hours == 0 && self.minutes == 0
    }
}

fn invalid(token: &str) -> WorkloadError {
    WorkloadError::InvalidToken {
        token: token.to_owned(),
    }
}

/// Render a workload as `<N>hr <N>min`, omitting zero components.
///
/// A zero duration renders as `0min` so the output always parses back.
#[must_use]
pub fn format(hours: u32, minutes: u32) -> String {
    match (hours, minutes) {
        (0, 0) => "0min".to_owned(),
        (h, 0) => format!("{h}hr"),
        (0, m) => format!("{m}min"),
        (h, m) => format!("{h}hr {m}min"),
    }
}

impl fmt::Display for Workload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format(self.hours, self.minutes))
    }
}

impl FromStr for Workload {
    type Err = WorkloadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Sum for Workload {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        Self::from_minutes(iter.map(Self::total_minutes).sum())
    }
}

impl Serialize for Workload {
    fn serialize<S>(&self, s: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        s.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Workload {
    fn deserialize<D>(d: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(d)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
