//! # Polyverse Bundles
//!
//! Declarative moderation policy. A bundle is a named, versioned document of
//! allow lists, block lists, regex patterns, and author filters. Feeds pick a
//! bundle per request and drop whatever it rejects.
//!
//! ## Key Types
//!
//! - [`Bundle`] - The policy document, as exchanged in JSON
//! - [`CompiledBundle`] - A validated bundle with patterns compiled once
//! - [`Decision`] - An evaluation result with the rule that decided it
//! - [`BundleRegistry`] - Loaded bundles by id, cached per version
//!
//! ## Usage
//!
//! ```rust
//! use polyverse_bundles::BundleRegistry;
//!
//! let registry = BundleRegistry::with_defaults().unwrap();
//! let strict = registry.default_bundle().unwrap();
//! assert!(!strict.evaluate("Buy now limited time offer!", "did:key:abc"));
//! assert!(strict.evaluate("Discussion about decentralized systems", "did:key:abc"));
//! ```

pub mod bundle;
pub mod defaults;
pub mod error;
pub mod filters;
pub mod matcher;
pub mod registry;

pub use bundle::{validate, AllowLists, BlockLists, Bundle, BundleMetadata, BundleValidationError, Filters};
pub use defaults::{default_bundles, DEFAULT_BUNDLE_ID};
pub use error::{BundleError, Result};
pub use filters::{check_filters, FilterViolation};
pub use matcher::{evaluate, CompiledBundle, Decision, MatchedRule, MAX_PATTERNS, MAX_PATTERN_LEN};
pub use registry::BundleRegistry;
