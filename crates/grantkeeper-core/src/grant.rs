//! The grant value type.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A named permission kind: an immutable key/value pair.
///
/// Two grants are equal when both their key and value are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Grant {
    key: String,
    value: String,
}

impl Grant {
    /// Create a new grant.
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// The grant key.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The grant value.
    pub fn value(&self) -> &str {
        &self.value
    }
}

impl fmt::Display for Grant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.key, self.value)
    }
}
