//! # Grantkeeper Store
//!
//! Document store abstraction for grant issuance records. Provides a
//! trait-based query interface with SQLite and in-memory implementations.
//!
//! ## Overview
//!
//! Grant issuances are persisted as schemaless documents by an external
//! issuance path. This crate only needs to find them again: the
//! [`GrantStore`] trait exposes a filtered query returning a [`Cursor`]
//! of raw [`Document`]s, which callers decode into their own types.
//!
//! ## Key Types
//!
//! - [`GrantStore`] - The async query trait
//! - [`SqliteStore`] - SQLite-based persistent storage
//! - [`MemoryStore`] - In-memory storage for tests
//! - [`Filter`] - Query filter
//! - [`Cursor`] - Query results, one `Result` per document
//!
//! ## Usage
//!
//! ```rust,no_run
//! use grantkeeper_store::{Filter, GrantStore, SqliteStore};
//!
//! async fn example() {
//!     let store = SqliteStore::open("grants.db").unwrap();
//!
//!     let cursor = store.find(&Filter::source_id("player-1")).await.unwrap();
//!     for doc in cursor {
//!         let doc = doc.unwrap();
//!         println!("{:?}", doc.get("_id"));
//!     }
//! }
//! ```

pub mod error;
pub mod memory;
pub mod migration;
pub mod sqlite;
pub mod traits;

pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use traits::{Cursor, Document, Filter, GrantStore};
