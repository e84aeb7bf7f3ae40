//! # Polyverse Testkit
//!
//! Testing utilities for Polyverse.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Golden vectors**: Fixed events with their expected canonical form, id,
//!   and signature, for checking other clients against this one
//! - **Generators**: Proptest strategies for property-based testing
//! - **Fixtures**: Seeded authors that sign well-formed events
//!
//! ## Golden Vectors
//!
//! ```rust
//! use polyverse_testkit::vectors::verify_all_vectors;
//!
//! for (name, ok, id) in verify_all_vectors() {
//!     assert!(ok, "{name}: {id}");
//! }
//! ```
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use polyverse_testkit::generators::{event_from_params, EventParams};
//!
//! proptest! {
//!     #[test]
//!     fn id_is_deterministic(params: EventParams) {
//!         let (a, _) = event_from_params(&params);
//!         let (b, _) = event_from_params(&params);
//!         prop_assert_eq!(a.id, b.id);
//!     }
//! }
//! ```
//!
//! ## Test Fixtures
//!
//! ```rust
//! use polyverse_testkit::fixtures::TestFixture;
//!
//! let alice = TestFixture::with_seed([1; 32]);
//! let post = alice.make_post(1_700_000_000, "hello");
//! assert!(post.verify(&alice.public_key()));
//! ```

pub mod fixtures;
pub mod generators;
pub mod vectors;

pub use fixtures::{multi_party_fixtures, TestFixture, FIXTURE_TIME};
pub use generators::{event_from_params, EventParams};
pub use vectors::{all_vectors, event_from_vector, verify_all_vectors, GoldenVector};
