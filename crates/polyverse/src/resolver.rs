//! Author key resolution for the publish path.

use std::collections::HashMap;

use polyverse_core::{Did, PublicKey};

/// Maps an author DID to the key that must have signed its events.
pub trait KeyResolver: Send + Sync {
    /// The author's verification key, or `None` if it cannot be determined.
    fn resolve(&self, did: &Did) -> Option<PublicKey>;
}

/// Resolves self-certifying `did:key:<base64 public key>` handles.
#[derive(Debug, Default, Clone, Copy)]
pub struct DidKeyResolver;

impl KeyResolver for DidKeyResolver {
    fn resolve(&self, did: &Did) -> Option<PublicKey> {
        did.public_key().ok()
    }
}

/// Fixed DID-to-key table, consulted before `did:key` decoding.
///
/// Lets deployments accept DID methods that carry no key material.
#[derive(Debug, Default, Clone)]
pub struct StaticKeyResolver {
    keys: HashMap<Did, PublicKey>,
}

impl StaticKeyResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, did: Did, key: PublicKey) -> &mut Self {
        self.keys.insert(did, key);
        self
    }
}

impl KeyResolver for StaticKeyResolver {
    fn resolve(&self, did: &Did) -> Option<PublicKey> {
        self.keys
            .get(did)
            .copied()
            .or_else(|| DidKeyResolver.resolve(did))
    }
}
