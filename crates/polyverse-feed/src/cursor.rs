//! Offset cursors and page-size bounds.

use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};

use crate::error::{FeedError, Result};

/// Page size used when a request names none.
pub const DEFAULT_LIMIT: usize = 20;

/// Largest page a request may ask for.
pub const MAX_LIMIT: usize = 100;

/// Position in a ranked feed. Opaque on the wire; an offset internally.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Cursor(usize);

impl Cursor {
    pub const START: Cursor = Cursor(0);

    pub fn offset(self) -> usize {
        self.0
    }

    pub(crate) fn at(offset: usize) -> Self {
        Self(offset)
    }
}

impl FromStr for Cursor {
    type Err = FeedError;

    fn from_str(s: &str) -> Result<Self> {
        s.parse::<usize>()
            .map(Cursor)
            .map_err(|_| FeedError::InvalidCursor(s.to_string()))
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for Cursor {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A validated page size in `1..=max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limit(usize);

impl Limit {
    pub fn new(limit: usize, max: usize) -> Result<Self> {
        if limit == 0 || limit > max {
            return Err(FeedError::InvalidLimit { limit, max });
        }
        Ok(Self(limit))
    }

    /// `requested` if given, otherwise `default`, bounded by `max`.
    pub fn or_default(requested: Option<usize>, default: usize, max: usize) -> Result<Self> {
        Self::new(requested.unwrap_or(default), max)
    }

    pub fn get(self) -> usize {
        self.0
    }
}

impl Default for Limit {
    fn default() -> Self {
        Self(DEFAULT_LIMIT)
    }
}
