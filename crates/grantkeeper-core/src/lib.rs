//! # Grantkeeper Core
//!
//! Pure data model for grant tracking: grants, grant issuances, and the
//! per-player tracker that partitions them into active and expired sets.
//!
//! This crate contains no I/O, no storage, no networking.
//!
//! ## Key Types
//!
//! - [`Grant`] - An immutable key/value pair naming a permission kind
//! - [`GrantInfo`] - One issuance of a grant to a player, with audit fields
//! - [`Timestamp`] - Unix seconds, zero meaning "unset"
//! - [`Tracker`] - A player's active and expired grant issuances
//! - [`TrackerSnapshot`] - Serializable view of a tracker
//!
//! ## Document Shape
//!
//! Grant issuances are stored and transmitted as:
//!
//! ```text
//! {
//!   "_id": "...",
//!   "grant": { "key": "...", "value": "..." },
//!   "added_by": "...", "added_at": 1700000000,
//!   "expires_at": 0,
//!   "scopes": ["..."],
//!   "revoked_by": "...", "revoked_at": 1700000100   // only when revoked
//! }
//! ```

pub mod error;
pub mod grant;
pub mod info;
pub mod time;
pub mod tracker;

pub use error::{CoreError, Result};
pub use grant::Grant;
pub use info::GrantInfo;
pub use time::Timestamp;
pub use tracker::{Tracker, TrackerSnapshot};
