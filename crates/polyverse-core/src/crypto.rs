//! Cryptographic primitives: Ed25519 signing and SHA-256 hashing.
//!
//! Key material crosses the boundary as standard base64. The private key uses
//! the 64-byte `seed || public key` layout so keys exported by other
//! Ed25519 libraries (tweetnacl, libsodium) load unchanged.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use ed25519_dalek::{Signature as DalekSignature, Signer, SigningKey, Verifier, VerifyingKey};
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

use crate::error::{CoreError, Result, VerifyError};

/// Length of an encoded private key (`seed || public key`).
pub const SECRET_KEY_LEN: usize = 64;

/// Length of a public key.
pub const PUBLIC_KEY_LEN: usize = 32;

/// Length of a signature.
pub const SIGNATURE_LEN: usize = 64;

/// A 32-byte SHA-256 hash.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Sha256Hash(pub [u8; 32]);

impl Sha256Hash {
    /// Compute the SHA-256 hash of data.
    pub fn hash(data: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(data);
        Self(hasher.finalize().into())
    }

    /// Get raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Convert to hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Debug for Sha256Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SHA256({}...)", &self.to_hex()[..8])
    }
}

impl AsRef<[u8]> for Sha256Hash {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// A 32-byte Ed25519 public key.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct PublicKey(pub [u8; PUBLIC_KEY_LEN]);

impl PublicKey {
    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; PUBLIC_KEY_LEN]) -> Self {
        Self(bytes)
    }

    /// Get raw bytes.
    pub const fn as_bytes(&self) -> &[u8; PUBLIC_KEY_LEN] {
        &self.0
    }

    /// Encode as standard base64.
    pub fn to_base64(&self) -> String {
        STANDARD.encode(self.0)
    }

    /// Parse from standard base64.
    pub fn from_base64(s: &str) -> Result<Self> {
        let bytes = STANDARD
            .decode(s)
            .map_err(|e| CoreError::InvalidKey(format!("public key is not base64: {e}")))?;
        let arr: [u8; PUBLIC_KEY_LEN] = bytes.as_slice().try_into().map_err(|_| {
            CoreError::InvalidKey(format!(
                "public key must be {PUBLIC_KEY_LEN} bytes, got {}",
                bytes.len()
            ))
        })?;
        Ok(Self(arr))
    }

    /// Verify a signature over a message.
    ///
    /// A public key that is not a valid curve point simply fails to verify.
    pub fn verify(&self, message: &[u8], signature: &Signature) -> std::result::Result<(), VerifyError> {
        let verifying_key =
            VerifyingKey::from_bytes(&self.0).map_err(|_| VerifyError::SignatureMismatch)?;
        let sig = DalekSignature::from_bytes(&signature.0);
        verifying_key
            .verify(message, &sig)
            .map_err(|_| VerifyError::SignatureMismatch)
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({}...)", &self.to_base64()[..8])
    }
}

impl From<[u8; PUBLIC_KEY_LEN]> for PublicKey {
    fn from(bytes: [u8; PUBLIC_KEY_LEN]) -> Self {
        Self(bytes)
    }
}

/// A 64-byte Ed25519 signature.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Signature(pub [u8; SIGNATURE_LEN]);

impl Signature {
    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; SIGNATURE_LEN]) -> Self {
        Self(bytes)
    }

    /// Get raw bytes.
    pub const fn as_bytes(&self) -> &[u8; SIGNATURE_LEN] {
        &self.0
    }

    /// Encode as standard base64.
    pub fn to_base64(&self) -> String {
        STANDARD.encode(self.0)
    }

    /// Parse from standard base64. Truncated or padded-out signatures are
    /// rejected here rather than at verification time.
    pub fn from_base64(s: &str) -> Result<Self> {
        let bytes = STANDARD
            .decode(s)
            .map_err(|e| CoreError::EncodingError(format!("signature is not base64: {e}")))?;
        let arr: [u8; SIGNATURE_LEN] = bytes.as_slice().try_into().map_err(|_| {
            CoreError::EncodingError(format!(
                "signature must be {SIGNATURE_LEN} bytes, got {}",
                bytes.len()
            ))
        })?;
        Ok(Self(arr))
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Sig({}...)", &self.to_base64()[..8])
    }
}

impl From<[u8; SIGNATURE_LEN]> for Signature {
    fn from(bytes: [u8; SIGNATURE_LEN]) -> Self {
        Self(bytes)
    }
}

/// A keypair for signing events.
#[derive(Clone)]
pub struct Keypair {
    signing_key: SigningKey,
}

impl Keypair {
    /// Generate a new keypair from the operating system's CSPRNG.
    ///
    /// # Panics
    ///
    /// Panics if the OS cannot provide randomness. There is no way to
    /// continue safely without an entropy source.
    pub fn generate() -> Self {
        let signing_key = SigningKey::generate(&mut OsRng);
        Self { signing_key }
    }

    /// Create from a 32-byte seed.
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(seed),
        }
    }

    /// Load from the 64-byte `seed || public key` layout.
    ///
    /// Fails with [`CoreError::InvalidKey`] on a wrong length or when the
    /// public half does not belong to the seed.
    pub fn from_secret_bytes(bytes: &[u8]) -> Result<Self> {
        let arr: &[u8; SECRET_KEY_LEN] = bytes.try_into().map_err(|_| {
            CoreError::InvalidKey(format!(
                "private key must be {SECRET_KEY_LEN} bytes, got {}",
                bytes.len()
            ))
        })?;
        let signing_key = SigningKey::from_keypair_bytes(arr)
            .map_err(|_| CoreError::InvalidKey("public half does not match seed".into()))?;
        Ok(Self { signing_key })
    }

    /// Load from a standard base64 private key.
    pub fn from_secret_base64(s: &str) -> Result<Self> {
        let bytes = STANDARD
            .decode(s)
            .map_err(|e| CoreError::InvalidKey(format!("private key is not base64: {e}")))?;
        Self::from_secret_bytes(&bytes)
    }

    /// Get the public key.
    pub fn public_key(&self) -> PublicKey {
        PublicKey(self.signing_key.verifying_key().to_bytes())
    }

    /// The 64-byte `seed || public key` secret.
    pub fn secret_bytes(&self) -> [u8; SECRET_KEY_LEN] {
        self.signing_key.to_keypair_bytes()
    }

    /// Sign a message. Ed25519 signatures are deterministic.
    pub fn sign(&self, message: &[u8]) -> Signature {
        Signature(self.signing_key.sign(message).to_bytes())
    }

    /// Export both halves as base64 text.
    pub fn encode(&self) -> EncodedKeypair {
        EncodedKeypair {
            public_key: self.public_key().to_base64(),
            private_key: STANDARD.encode(self.secret_bytes()),
        }
    }
}

impl fmt::Debug for Keypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Keypair({:?})", self.public_key())
    }
}

/// A keypair as it is handed to clients and key stores.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncodedKeypair {
    pub public_key: String,
    pub private_key: String,
}

impl fmt::Debug for EncodedKeypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncodedKeypair")
            .field("public_key", &self.public_key)
            .field("private_key", &"<redacted>")
            .finish()
    }
}

/// Generate a fresh keypair.
pub fn generate_keypair() -> Keypair {
    Keypair::generate()
}

/// Sign `message` with a base64 private key.
pub fn sign(message: &[u8], private_key: &str) -> Result<Signature> {
    Ok(Keypair::from_secret_base64(private_key)?.sign(message))
}

/// Verify a base64 signature under a base64 public key.
///
/// Never errors: malformed encodings, truncated signatures, and mismatched
/// keys all return `false`.
pub fn verify(message: &[u8], signature: &str, public_key: &str) -> bool {
    let Ok(public_key) = PublicKey::from_base64(public_key) else {
        return false;
    };
    let Ok(signature) = Signature::from_base64(signature) else {
        return false;
    };
    public_key.verify(message, &signature).is_ok()
}
