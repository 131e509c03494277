//! Numeric identifiers for forum entities
//!
//! ID Format:
//! - Topics: `t-{n}` (e.g., `t-12`)
//! - Answers: `r-{n}` (e.g., `r-3`)
//! - Users: `u-{n}`
//! - Courses: `c-{n}`
//!
//! The prefix is only a display convention. Parsing accepts either the
//! prefixed form or the bare number, so `t-12` and `12` name the same topic.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum IdError {
    #[error("Invalid {kind} ID: expected '{prefix}-{{number}}' or a number, got '{value}'")]
    Invalid {
        kind: &'static str,
        prefix: &'static str,
        value: String,
    },
}

/// Declares a numeric ID newtype with a display prefix.
macro_rules! numeric_id {
    ($(#[$doc:meta])* $name:ident, $kind:literal, $prefix:literal) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(u64);

        impl $name {
            pub const fn new(value: u64) -> Self {
                Self(value)
            }

            /// Returns the raw number
            pub const fn get(self) -> u64 {
                self.0
            }

            /// Returns the ID that follows this one, or `None` past `u64::MAX`
            pub const fn next(self) -> Option<Self> {
                match self.0.checked_add(1) {
                    Some(value) => Some(Self(value)),
                    None => None,
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "-{}"), self.0)
            }
        }

        impl FromStr for $name {
            type Err = IdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let s = s.trim();
                let digits = s.strip_prefix(concat!($prefix, "-")).unwrap_or(s);
                digits.parse::<u64>().map(Self).map_err(|_| IdError::Invalid {
                    kind: $kind,
                    prefix: $prefix,
                    value: s.to_string(),
                })
            }
        }

        impl From<u64> for $name {
            fn from(value: u64) -> Self {
                Self(value)
            }
        }
    };
}

numeric_id!(
    /// Identifier of a discussion topic
    TopicId,
    "topic",
    "t"
);

numeric_id!(
    /// Identifier of an answer posted to a topic
    AnswerId,
    "answer",
    "r"
);

numeric_id!(
    /// Identifier of a registered user
    UserId,
    "user",
    "u"
);

numeric_id!(
    /// Identifier of a course
    CourseId,
    "course",
    "c"
);
