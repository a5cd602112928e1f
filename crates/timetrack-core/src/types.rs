//! Core type definitions with validation.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Validation errors for caller-supplied input.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InputError {
    /// The provided value was empty.
    #[error("{field} cannot be empty")]
    Empty { field: &'static str },

    /// An identifier was zero or negative.
    #[error("{field} must be a positive integer, got {value}")]
    NonPositiveId { field: &'static str, value: i64 },

    /// A write referenced a category that does not exist.
    #[error("category {id} does not exist")]
    UnknownCategory { id: i64 },

    /// Unknown activity status string.
    #[error("invalid activity status: {value}")]
    InvalidStatus { value: String },

    /// Unknown period name.
    #[error("invalid period: {value} (expected today, yesterday, weekly or monthly)")]
    InvalidPeriod { value: String },

    /// Unknown ordering.
    #[error("invalid order: {value} (expected asc or desc)")]
    InvalidOrder { value: String },

    /// Explicit bounds where the start lies after the end.
    #[error("invalid range: start {start} is after end {end}")]
    InvalidRange {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
}

/// Lifecycle status of an activity.
///
/// `Started` is the only non-terminal state; an activity moves to `Finished` once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityStatus {
    Started,
    Finished,
}

impl ActivityStatus {
    /// String representation for database storage.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Started => "started",
            Self::Finished => "finished",
        }
    }
}

impl fmt::Display for ActivityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ActivityStatus {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "started" => Ok(Self::Started),
            "finished" => Ok(Self::Finished),
            _ => Err(InputError::InvalidStatus {
                value: s.to_string(),
            }),
        }
    }
}

/// Generates a validated integer ID newtype with common trait implementations.
macro_rules! define_int_id {
    (
        $(#[$meta:meta])*
        $name:ident, $field_name:literal
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(try_from = "i64", into = "i64")]
        pub struct $name(i64);

        impl $name {
            /// Creates a new ID after validation.
            pub fn new(id: i64) -> Result<Self, InputError> {
                if id <= 0 {
                    return Err(InputError::NonPositiveId {
                        field: $field_name,
                        value: id,
                    });
                }
                Ok(Self(id))
            }

            /// The lowest valid ID.
            pub const FIRST: Self = Self(1);

            /// Returns the raw integer value.
            pub const fn get(self) -> i64 {
                self.0
            }

            /// The ID after this one; saturates at `i64::MAX`.
            #[must_use]
            pub const fn next(self) -> Self {
                Self(self.0.saturating_add(1))
            }
        }

        impl TryFrom<i64> for $name {
            type Error = InputError;

            fn try_from(value: i64) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }
    };
}

define_int_id!(
    /// A validated activity identifier.
    ///
    /// Activity IDs are assigned by the store on creation and are always positive.
    ActivityId, "activity ID"
);

define_int_id!(
    /// A validated category identifier.
    ///
    /// Categories are seeded out-of-band; the engine only ever reads them.
    CategoryId, "category ID"
);
