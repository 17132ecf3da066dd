//! # hwage Testkit
//!
//! Testing utilities for hwage.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Golden vectors**: Stanzas with every intermediate value computed independently
//! - **Generators**: Proptest strategies for property-based testing
//! - **Fixtures**: Software identities, stanza sets, and instrumented devices
//!
//! ## Golden Vectors
//!
//! Golden vectors pin the exact bytes of the X25519 recipient stanza:
//!
//! ```rust
//! use hwage_testkit::vectors::verify_all_vectors;
//!
//! for report in verify_all_vectors() {
//!     assert!(report.passed(), "{}: {:?}", report.name, report.mismatch);
//! }
//! ```
//!
//! ## Property Testing
//!
//! Use the generators with proptest:
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use hwage_testkit::generators::{stanza_set_from_params, StanzaSetParams};
//!
//! proptest! {
//!     #[test]
//!     fn finds_our_stanza(params: StanzaSetParams) {
//!         let (fixture, stanzas) = stanza_set_from_params(&params);
//!         prop_assert!(fixture.identity().unwrap_stanzas(&stanzas).is_ok());
//!     }
//! }
//! ```
//!
//! ## Test Fixtures
//!
//! Quickly set up test scenarios:
//!
//! ```rust
//! use hwage_core::FileKey;
//! use hwage_testkit::fixtures::TestFixture;
//!
//! let fixture = TestFixture::new();
//! let file_key = FileKey::generate();
//! let stanza = fixture.wrap(&file_key);
//! assert_eq!(fixture.identity().unwrap_stanzas(&[stanza]).unwrap(), file_key);
//! ```

pub mod fixtures;
pub mod generators;
pub mod vectors;

pub use fixtures::{
    multi_party_fixtures, non_candidate_stanzas, CountingDevice, FailingDevice, TestFixture,
};
pub use generators::{stanza_set_from_params, StanzaSetParams};
pub use vectors::{all_vectors, verify_all_vectors, GoldenVector, VectorReport};
