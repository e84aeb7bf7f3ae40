//! Error types for the feed service.

use polyverse_bundles::BundleError;
use polyverse_core::{CoreError, EventId, VerifyError};
use polyverse_feed::FeedError;
use polyverse_store::StoreError;
use thiserror::Error;

/// Errors that can occur during service operations.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Malformed event or key material.
    #[error("{0}")]
    Core(#[from] CoreError),

    /// Signature or id verification failed.
    #[error("verification failed: {0}")]
    Verify(#[from] VerifyError),

    /// Bundle lookup or load failure.
    #[error("{0}")]
    Bundle(#[from] BundleError),

    /// Ranking request error.
    #[error("{0}")]
    Feed(#[from] FeedError),

    /// Storage error.
    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    /// No public key can be derived for the author.
    #[error("cannot resolve a key for author {0}")]
    UnresolvableAuthor(String),

    /// Event is not stored.
    #[error("event not found: {0}")]
    EventNotFound(EventId),

    /// The request is missing or contradicts required parameters.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Worker task failed.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    /// HTTP status for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            ServiceError::Core(CoreError::EncodingError(_)) => 500,
            ServiceError::Core(_) => 400,
            ServiceError::Verify(_) | ServiceError::UnresolvableAuthor(_) => 422,
            ServiceError::Bundle(BundleError::UnknownBundle(_)) => 404,
            ServiceError::Bundle(BundleError::Config(_)) => 400,
            ServiceError::Feed(FeedError::NotFound(_)) => 404,
            ServiceError::Feed(_) => 400,
            ServiceError::EventNotFound(_) => 404,
            ServiceError::BadRequest(_) => 400,
            ServiceError::Store(_) | ServiceError::Internal(_) => 500,
        }
    }

    /// Stable machine-readable error kind.
    pub fn code(&self) -> &'static str {
        match self {
            ServiceError::Core(CoreError::MalformedEvent(_)) => "malformed_event",
            ServiceError::Core(CoreError::InvalidKey(_)) => "invalid_key",
            ServiceError::Core(CoreError::EncodingError(_)) => "encoding_error",
            ServiceError::Verify(VerifyError::SignatureMismatch) => "signature_mismatch",
            ServiceError::Verify(VerifyError::IdentityMismatch) => "identity_mismatch",
            ServiceError::Bundle(BundleError::UnknownBundle(_)) => "unknown_bundle",
            ServiceError::Bundle(BundleError::Config(_)) => "bundle_config",
            ServiceError::Feed(FeedError::UnknownAlgorithm(_)) => "unknown_algorithm",
            ServiceError::Feed(FeedError::NotFound(_)) | ServiceError::EventNotFound(_) => {
                "not_found"
            }
            ServiceError::Feed(FeedError::InvalidLimit { .. }) => "invalid_limit",
            ServiceError::Feed(FeedError::InvalidCursor(_)) => "invalid_cursor",
            ServiceError::UnresolvableAuthor(_) => "unresolvable_author",
            ServiceError::BadRequest(_) => "bad_request",
            ServiceError::Store(_) | ServiceError::Internal(_) => "internal",
        }
    }
}

/// Result type for service operations.
pub type Result<T> = std::result::Result<T, ServiceError>;
