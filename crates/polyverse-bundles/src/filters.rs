//! Author and length filters.
//!
//! Bundle filters depend on author metadata that events do not carry, so
//! they are checked separately from the content rules, by whoever owns the
//! author profiles.

use polyverse_core::AuthorProfile;
use serde::Serialize;
use std::fmt;

use crate::bundle::Filters;

/// Why an event failed a bundle's filters.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "filter", rename_all = "snake_case")]
pub enum FilterViolation {
    ContentTooLong { length: usize, max: usize },
    ReputationTooLow { reputation: f64, min: f64 },
    Unverified,
}

impl fmt::Display for FilterViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterViolation::ContentTooLong { length, max } => {
                write!(f, "content is {length} characters, limit is {max}")
            }
            FilterViolation::ReputationTooLow { reputation, min } => {
                write!(f, "author reputation {reputation} is below {min}")
            }
            FilterViolation::Unverified => f.write_str("author is not verified"),
        }
    }
}

/// Check content and author against a bundle's filters.
///
/// Length is counted in characters. An author with no profile is treated as
/// unverified with zero reputation.
pub fn check_filters(
    filters: &Filters,
    content: &str,
    author: Option<&AuthorProfile>,
) -> Result<(), FilterViolation> {
    if let Some(max) = filters.max_content_length {
        let length = content.chars().count();
        if length > max {
            return Err(FilterViolation::ContentTooLong { length, max });
        }
    }

    let reputation = author.map_or(0.0, |a| a.reputation);
    if let Some(min) = filters.min_author_reputation {
        if reputation < min {
            return Err(FilterViolation::ReputationTooLow { reputation, min });
        }
    }

    if filters.require_verified == Some(true) && !author.is_some_and(|a| a.verified) {
        return Err(FilterViolation::Unverified);
    }

    Ok(())
}
