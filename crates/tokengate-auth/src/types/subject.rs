//! Token subject (user identifier).

use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque user identifier carried in the `user_id` claim.
///
/// Serialized untagged so numeric ids stay JSON numbers and string ids stay
/// strings. `Id(1)` and `Name("1")` are different subjects.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Subject {
    /// Numeric identifier.
    Id(i64),
    /// String identifier (UUID, username, ...).
    Name(String),
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "{id}"),
            Self::Name(name) => f.write_str(name),
        }
    }
}

impl From<i64> for Subject {
    fn from(id: i64) -> Self {
        Self::Id(id)
    }
}

impl From<String> for Subject {
    fn from(name: String) -> Self {
        Self::Name(name)
    }
}

impl From<&str> for Subject {
    fn from(name: &str) -> Self {
        Self::Name(name.to_string())
    }
}
