//! # Grantkeeper Bus
//!
//! Cross-instance notification for Grantkeeper.
//!
//! ## Overview
//!
//! Service instances tell each other (and any other interested service)
//! about grant lookups by publishing a [`LookupNotice`] on a subject of a
//! [`MessageBus`]. Delivery is best-effort: there is no acknowledgment, and
//! a failed publish never surfaces to the code that requested it.
//!
//! The [`Publisher`] enforces this. It owns a background worker that drains
//! a bounded queue, so callers enqueue and return immediately; every failure
//! on the way to the bus ends in a log line.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use grantkeeper_bus::{LookupNotice, MemoryBus, Publisher, LOOKUP_SUBJECT};
//! use grantkeeper_core::TrackerSnapshot;
//!
//! async fn example() {
//!     let bus = Arc::new(MemoryBus::new());
//!     let publisher = Publisher::spawn(bus, 1024);
//!
//!     let notice = LookupNotice {
//!         service_id: "grantkeeper-1".into(),
//!         player_id: "player-1".into(),
//!         body: TrackerSnapshot::default(),
//!     };
//!     publisher.publish(LOOKUP_SUBJECT, &notice);
//! }
//! ```

pub mod error;
pub mod messages;
pub mod publisher;
pub mod transport;

pub use error::{BusError, Result};
pub use messages::{encode, LookupNotice, LOOKUP_SUBJECT};
pub use publisher::Publisher;
pub use transport::{memory::MemoryBus, MessageBus};
