//! Error types for moderation bundles.

use thiserror::Error;

/// Errors that can occur while loading or looking up bundles.
#[derive(Debug, Error)]
pub enum BundleError {
    /// The bundle failed validation or one of its patterns could not be
    /// compiled. A bundle is never partially loaded.
    #[error("bundle config error: {0}")]
    Config(String),

    /// No bundle with this id is registered.
    #[error("unknown bundle: {0}")]
    UnknownBundle(String),
}

/// Result type for bundle operations.
pub type Result<T> = std::result::Result<T, BundleError>;
