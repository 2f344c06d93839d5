//! # Grantkeeper Testkit
//!
//! Testing utilities for Grantkeeper.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Fixtures**: a fully wired in-memory service and a grant document builder
//! - **Generators**: Proptest strategies for property-based testing
//!
//! End-to-end scenarios live in this crate's `tests/` directory.
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use grantkeeper_testkit::generators::{grant_info_from_params, GrantInfoParams};
//!
//! proptest! {
//!     #[test]
//!     fn never_expiring_grants_stay_active(params: GrantInfoParams) {
//!         let gi = grant_info_from_params(&params);
//!         prop_assume!(gi.revoked_at().is_none() && gi.expires_at().is_zero());
//!         prop_assert!(!gi.is_expired());
//!     }
//! }
//! ```
//!
//! ## Test Fixtures
//!
//! ```rust,ignore
//! use grantkeeper_testkit::fixtures::{grant_doc, TestFixture};
//!
//! let fixture = TestFixture::new();
//! fixture.add_player("p1", "Alice", false);
//! fixture.add_grant(grant_doc("g1", "p1").expires_at(1).build());
//! ```

pub mod fixtures;
pub mod generators;

pub use fixtures::{grant_doc, GrantDoc, TestFixture};
pub use generators::{grant_info_from_params, GrantInfoParams};
