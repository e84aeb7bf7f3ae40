//! # Polyverse Core
//!
//! Pure primitives for Polyverse events: the event model, canonicalization,
//! Ed25519 signatures, and content-addressed ids.
//!
//! This crate performs no I/O. Every function is a pure computation over its
//! inputs.
//!
//! ## Key Types
//!
//! - [`UnsignedEvent`] - An event's logical fields, before signing
//! - [`SignedEvent`] - An event with its content id and signature
//! - [`EventContent`] - The closed, kind-specific payload of an event
//! - [`EventId`] - Content-addressed identifier (SHA-256, URL-safe base64)
//! - [`Keypair`] - Ed25519 signing key
//!
//! ## Canonicalization
//!
//! Ids and signatures are computed over canonical JSON with a fixed key
//! order. See the [`canonical`] module.

pub mod canonical;
pub mod crypto;
pub mod error;
pub mod event;
pub mod identity;
pub mod types;
pub mod validation;

pub use canonical::{canonical_bytes, canonical_string};
pub use crypto::{generate_keypair, sign, verify, EncodedKeypair, Keypair, PublicKey, Sha256Hash, Signature};
pub use error::{CoreError, Result, VerifyError};
pub use event::{Body, EventContent, EventKind, EventRef, MediaRef, SignedEvent, UnsignedEvent};
pub use identity::{assign, assign_with_secret, compute_id, verify_detailed};
pub use types::{AuthorProfile, Did, EventId, DID_KEY_PREFIX};
pub use validation::validate_unsigned;
