//! Unix-second timestamps.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A point in time as whole seconds since the Unix epoch.
///
/// Zero is the "unset" sentinel used by grant records: an `expires_at` of
/// zero means the grant never expires.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(pub i64);

impl Timestamp {
    /// The unset timestamp.
    pub const ZERO: Self = Self(0);

    /// Create a timestamp from Unix seconds.
    pub const fn from_secs(secs: i64) -> Self {
        Self(secs)
    }

    /// Get the Unix seconds.
    pub const fn as_secs(&self) -> i64 {
        self.0
    }

    /// Whether this is the unset sentinel.
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// The current wall-clock time.
    pub fn now() -> Self {
        use std::time::{SystemTime, UNIX_EPOCH};
        match SystemTime::now().duration_since(UNIX_EPOCH) {
            Ok(d) => Self(d.as_secs() as i64),
            // Clock set before 1970.
            Err(e) => Self(-(e.duration().as_secs() as i64)),
        }
    }
}

impl fmt::Debug for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Timestamp({})", self.0)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for Timestamp {
    fn from(secs: i64) -> Self {
        Self(secs)
    }
}
