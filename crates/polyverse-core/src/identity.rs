//! Event identity: content ids and signatures derived from canonical bytes.
//!
//! An event's `id` is the SHA-256 of its canonical bytes and its `sig` is an
//! Ed25519 signature over the same bytes. Both are computed before either
//! field exists, so neither can influence the other.
//!
//! Verification recomputes the canonical bytes from the logical fields and
//! requires both that the signature verifies and that the stated id matches.
//! A valid signature alongside a stale id is rejected.

use tracing::trace;

use crate::canonical::canonical_bytes;
use crate::crypto::{Keypair, PublicKey, Sha256Hash, Signature};
use crate::error::{Result, VerifyError};
use crate::event::{SignedEvent, UnsignedEvent};
use crate::types::EventId;

/// Content id of canonical bytes.
pub fn compute_id(canonical: &[u8]) -> EventId {
    EventId::from_hash(&Sha256Hash::hash(canonical))
}

/// Sign an event and assign its id.
pub fn assign(event: UnsignedEvent, keypair: &Keypair) -> SignedEvent {
    let canonical = canonical_bytes(&event);
    let id = compute_id(&canonical);
    let sig = keypair.sign(&canonical);
    trace!(event_id = %id, kind = %event.kind(), "assigned event identity");

    SignedEvent {
        id,
        sig: sig.to_base64(),
        event,
    }
}

/// Sign with a base64 private key.
pub fn assign_with_secret(event: UnsignedEvent, private_key: &str) -> Result<SignedEvent> {
    let keypair = Keypair::from_secret_base64(private_key)?;
    Ok(assign(event, &keypair))
}

/// Check both the signature and the id.
pub fn verify(signed: &SignedEvent, public_key: &PublicKey) -> bool {
    verify_detailed(signed, public_key).is_ok()
}

/// Check both the signature and the id, reporting which failed.
///
/// The signature is checked first. An undecodable signature is a
/// [`VerifyError::SignatureMismatch`].
pub fn verify_detailed(
    signed: &SignedEvent,
    public_key: &PublicKey,
) -> std::result::Result<(), VerifyError> {
    let canonical = canonical_bytes(&signed.event);

    let signature =
        Signature::from_base64(&signed.sig).map_err(|_| VerifyError::SignatureMismatch)?;
    public_key.verify(&canonical, &signature)?;

    if compute_id(&canonical) != signed.id {
        return Err(VerifyError::IdentityMismatch);
    }

    Ok(())
}

impl UnsignedEvent {
    /// Sign this event and assign its id.
    pub fn sign(self, keypair: &Keypair) -> SignedEvent {
        assign(self, keypair)
    }

    /// The id this event will have once signed.
    pub fn compute_id(&self) -> EventId {
        compute_id(&canonical_bytes(self))
    }
}

impl SignedEvent {
    /// Verify against an author key.
    pub fn verify(&self, public_key: &PublicKey) -> bool {
        verify(self, public_key)
    }
}
