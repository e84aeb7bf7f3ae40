//! Strong type definitions for Polyverse.
//!
//! Identifiers are newtypes so an author handle can never be passed where an
//! event id is expected.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::crypto::{PublicKey, Sha256Hash};
use crate::error::{CoreError, Result};

/// Content-addressed event identifier: URL-safe base64 (no padding) of the
/// SHA-256 of the event's canonical bytes.
///
/// Ids received over the wire are kept verbatim; whether they match the
/// content is decided by verification, not parsing.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(String);

impl EventId {
    /// Encode a digest as an event id.
    pub fn from_hash(hash: &Sha256Hash) -> Self {
        Self(URL_SAFE_NO_PAD.encode(hash.as_bytes()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Debug for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EventId({})", self.0)
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for EventId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for EventId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Prefix of self-certifying author handles that embed the public key.
pub const DID_KEY_PREFIX: &str = "did:key:";

/// A decentralized identifier naming an event's author.
///
/// Treated as an opaque key everywhere except [`Did::public_key`].
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Did(String);

impl Did {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Build a `did:key:<base64 public key>` handle.
    pub fn from_public_key(key: &PublicKey) -> Self {
        Self(format!("{DID_KEY_PREFIX}{}", key.to_base64()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Extract the signing key from a `did:key` handle.
    ///
    /// Other DID methods need an external resolver and fail with
    /// [`CoreError::InvalidKey`].
    pub fn public_key(&self) -> Result<PublicKey> {
        let encoded = self.0.strip_prefix(DID_KEY_PREFIX).ok_or_else(|| {
            CoreError::InvalidKey(format!("unsupported DID method: {}", self.0))
        })?;
        PublicKey::from_base64(encoded)
    }
}

impl fmt::Debug for Did {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Did({})", self.0)
    }
}

impl fmt::Display for Did {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Did {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for Did {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Author metadata owned by the feed service, not by the event.
///
/// Ranking and moderation filters read it; nothing in the signed payload
/// depends on it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthorProfile {
    pub did: Did,
    #[serde(default)]
    pub reputation: f64,
    #[serde(default)]
    pub follower_count: u64,
    #[serde(default)]
    pub verified: bool,
}

impl AuthorProfile {
    /// A profile with no reputation, no followers, unverified.
    pub fn unknown(did: Did) -> Self {
        Self {
            did,
            reputation: 0.0,
            follower_count: 0,
            verified: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::Keypair;

    #[test]
    fn test_event_id_is_url_safe() {
        // 0xfb 0xff produce '+' and '/' in standard base64.
        let hash = Sha256Hash([0xfb; 32]);
        let id = EventId::from_hash(&hash);
        assert_eq!(id.as_str().len(), 43);
        assert!(!id.as_str().contains(['+', '/', '=']));
    }

    #[test]
    fn test_did_key_roundtrip() {
        let keypair = Keypair::from_seed(&[9u8; 32]);
        let did = Did::from_public_key(&keypair.public_key());
        assert!(did.as_str().starts_with(DID_KEY_PREFIX));
        assert_eq!(did.public_key().unwrap(), keypair.public_key());
    }

    #[test]
    fn test_did_other_methods_unresolvable() {
        let did = Did::new("did:web:example.com");
        assert!(matches!(did.public_key(), Err(CoreError::InvalidKey(_))));
        assert!(Did::new("did:key:short").public_key().is_err());
    }

    #[test]
    fn test_display() {
        let id = EventId::from("abc");
        assert_eq!(format!("{id}"), "abc");
        assert_eq!(format!("{id:?}"), "EventId(abc)");
    }
}
