//! Error types for Polyverse core.

use thiserror::Error;

/// Errors raised while building, parsing, or signing events.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Schema violation: missing field, wrong type, non-positive timestamp,
    /// or a body shape that is not valid for the event kind.
    #[error("malformed event: {0}")]
    MalformedEvent(String),

    /// Key material has the wrong length or encoding.
    #[error("invalid key: {0}")]
    InvalidKey(String),

    #[error("encoding error: {0}")]
    EncodingError(String),
}

/// Why a signed event failed verification.
///
/// Verification failures are expected outcomes, so callers usually only
/// look at [`crate::identity::verify`]'s boolean. The detailed form exists
/// for logging and for the publish path, which reports which check failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum VerifyError {
    #[error("signature does not verify under the author key")]
    SignatureMismatch,

    #[error("event id does not match its canonical content")]
    IdentityMismatch,
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
