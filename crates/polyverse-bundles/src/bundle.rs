//! Bundle definitions: the declarative policy document.
//!
//! Bundles are exchanged as JSON with camelCase keys. Every list and filter
//! is optional; missing identity or metadata fields parse as empty strings
//! so that [`validate`] can report all of them at once.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{BundleError, Result};

/// A named, versioned moderation policy.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bundle {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub allow_lists: AllowLists,
    #[serde(default)]
    pub block_lists: BlockLists,
    #[serde(default)]
    pub filters: Filters,
    #[serde(default)]
    pub metadata: BundleMetadata,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllowLists {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub authors: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub domains: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keywords: Vec<String>,
}

impl AllowLists {
    /// Whether any list that gates content is non-empty.
    ///
    /// Domains are carried in the document but not evaluated.
    pub fn is_active(&self) -> bool {
        !self.keywords.is_empty() || !self.authors.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockLists {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub authors: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub domains: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keywords: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub regex_patterns: Vec<String>,
}

/// Author and length thresholds. Applied by the caller, which owns author
/// metadata; see [`crate::filters::check_filters`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Filters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_author_reputation: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_content_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub require_verified: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleMetadata {
    #[serde(default)]
    pub maintainer: String,
    #[serde(default)]
    pub last_updated: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transparency_url: Option<String>,
}

impl Bundle {
    /// Parse a bundle document. Does not validate.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| BundleError::Config(format!("invalid bundle JSON: {e}")))
    }
}

/// A required field that is missing or empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BundleValidationError {
    MissingId,
    MissingName,
    MissingDescription,
    MissingVersion,
    MissingMaintainer,
    MissingLastUpdated,
}

impl fmt::Display for BundleValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BundleValidationError::MissingId => "Bundle ID is required",
            BundleValidationError::MissingName => "Bundle name is required",
            BundleValidationError::MissingDescription => "Bundle description is required",
            BundleValidationError::MissingVersion => "Bundle version is required",
            BundleValidationError::MissingMaintainer => "Bundle maintainer is required",
            BundleValidationError::MissingLastUpdated => "Bundle lastUpdated is required",
        })
    }
}

/// Check required fields, reporting every missing one in a fixed order.
pub fn validate(bundle: &Bundle) -> Vec<BundleValidationError> {
    let checks = [
        (&bundle.id, BundleValidationError::MissingId),
        (&bundle.name, BundleValidationError::MissingName),
        (&bundle.description, BundleValidationError::MissingDescription),
        (&bundle.version, BundleValidationError::MissingVersion),
        (&bundle.metadata.maintainer, BundleValidationError::MissingMaintainer),
        (&bundle.metadata.last_updated, BundleValidationError::MissingLastUpdated),
    ];

    checks
        .into_iter()
        .filter(|(field, _)| field.is_empty())
        .map(|(_, err)| err)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_six_errors_in_order() {
        let errors = validate(&Bundle::default());
        assert_eq!(
            errors,
            vec![
                BundleValidationError::MissingId,
                BundleValidationError::MissingName,
                BundleValidationError::MissingDescription,
                BundleValidationError::MissingVersion,
                BundleValidationError::MissingMaintainer,
                BundleValidationError::MissingLastUpdated,
            ]
        );
    }

    #[test]
    fn test_partial_document() {
        let bundle = Bundle::from_json(
            r#"{"id":"t","name":"T","description":"","version":"1",
                "metadata":{"maintainer":"m"}}"#,
        )
        .unwrap();
        assert_eq!(
            validate(&bundle),
            vec![
                BundleValidationError::MissingDescription,
                BundleValidationError::MissingLastUpdated,
            ]
        );
        assert_eq!(
            BundleValidationError::MissingLastUpdated.to_string(),
            "Bundle lastUpdated is required"
        );
    }

    #[test]
    fn test_camel_case_document() {
        let bundle = Bundle::from_json(
            r#"{"id":"t","blockLists":{"regexPatterns":["a|b"]},
                "filters":{"minAuthorReputation":0.5,"requireVerified":true}}"#,
        )
        .unwrap();
        assert_eq!(bundle.block_lists.regex_patterns, vec!["a|b".to_string()]);
        assert_eq!(bundle.filters.min_author_reputation, Some(0.5));
        assert_eq!(bundle.filters.require_verified, Some(true));
        assert!(!bundle.allow_lists.is_active());
    }

    #[test]
    fn test_bad_json_is_config_error() {
        assert!(matches!(Bundle::from_json("{"), Err(BundleError::Config(_))));
    }
}
