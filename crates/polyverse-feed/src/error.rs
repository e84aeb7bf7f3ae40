//! Error types for feed ranking.

use thiserror::Error;

/// Errors that can occur while ranking or explaining a feed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FeedError {
    /// The algorithm name is not registered.
    #[error("unknown algorithm: {0}")]
    UnknownAlgorithm(String),

    /// The event is not in the candidate set.
    #[error("event not found: {0}")]
    NotFound(String),

    /// Page size outside `1..=max`.
    #[error("limit {limit} out of range 1..={max}")]
    InvalidLimit { limit: usize, max: usize },

    /// Cursor is not a non-negative integer offset.
    #[error("invalid cursor: {0}")]
    InvalidCursor(String),
}

/// Result type for feed operations.
pub type Result<T> = std::result::Result<T, FeedError>;
