use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use thiserror::Error;

/// Error returned when an identifier cannot be parsed from user input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("identifier must not be empty")]
pub struct IdError;

/// Server-assigned identifier as it appears on the wire.
///
/// The task service hands out either numeric or string ids; the original
/// form is kept so it can be echoed back unchanged.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
#[serde(untagged)]
enum RawId {
    Number(u64),
    Text(String),
}

impl RawId {
    fn parse(s: &str) -> Result<Self, IdError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(IdError);
        }
        // Only canonical decimals become numbers so "007" survives as text.
        match trimmed.parse::<u64>() {
            Ok(n) if n.to_string() == trimmed => Ok(Self::Number(n)),
            _ => Ok(Self::Text(trimmed.to_owned())),
        }
    }
}

impl fmt::Display for RawId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => n.fmt(f),
            Self::Text(s) => s.fmt(f),
        }
    }
}

macro_rules! opaque_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(RawId);

        impl $name {
            /// Build an identifier from a numeric wire value.
            #[must_use]
            pub const fn from_number(n: u64) -> Self {
                Self(RawId::Number(n))
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl FromStr for $name {
            type Err = IdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                RawId::parse(s).map(Self)
            }
        }
    };
}

opaque_id!(
    /// Identifier of a task, assigned by the task service on create.
    TaskId
);
opaque_id!(
    /// Identifier of the signed-in user.
    UserId
);
opaque_id!(
    /// Identifier of a friend that can receive shared tasks.
    FriendId
);
