//! Request and response types for the service operations.
//!
//! These mirror the HTTP surface (`POST /event`, `GET /feed`,
//! `GET /explain`, `POST /labels`) without binding to a transport.

use polyverse_bundles::{FilterViolation, MatchedRule};
use polyverse_core::{Did, EventId};
use polyverse_feed::Algorithm;
use serde::{Deserialize, Serialize};

use crate::error::ServiceError;

/// Outcome of an accepted publish.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PublishStatus {
    /// Newly stored.
    Accepted,
    /// Already stored; nothing changed.
    Duplicate,
}

/// Response to `POST /event`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishReceipt {
    pub status: PublishStatus,
    pub event_id: EventId,
}

impl PublishReceipt {
    pub fn status_code(&self) -> u16 {
        match self.status {
            PublishStatus::Accepted => 201,
            PublishStatus::Duplicate => 200,
        }
    }
}

/// Query for `GET /feed`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedQuery {
    /// Algorithm name; the configured default when absent.
    #[serde(default)]
    pub algo: Option<String>,
    #[serde(default)]
    pub cursor: Option<String>,
    #[serde(default)]
    pub limit: Option<usize>,
    /// Moderation bundle id; the registry default when absent.
    #[serde(default)]
    pub bundle: Option<String>,
    /// Only events whose text carries this hashtag (with or without `#`).
    #[serde(default)]
    pub hashtag: Option<String>,
}

impl FeedQuery {
    pub fn algo(mut self, algo: impl Into<String>) -> Self {
        self.algo = Some(algo.into());
        self
    }

    pub fn cursor(mut self, cursor: impl Into<String>) -> Self {
        self.cursor = Some(cursor.into());
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn bundle(mut self, bundle: impl Into<String>) -> Self {
        self.bundle = Some(bundle.into());
        self
    }

    pub fn hashtag(mut self, hashtag: impl Into<String>) -> Self {
        self.hashtag = Some(hashtag.into());
        self
    }
}

/// Query for `GET /explain`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExplainQuery {
    pub event_id: EventId,
    #[serde(default)]
    pub algo: Option<String>,
    /// Bundle that shaped the candidate set being explained.
    #[serde(default)]
    pub bundle: Option<String>,
}

impl ExplainQuery {
    pub fn new(event_id: EventId) -> Self {
        Self {
            event_id,
            algo: None,
            bundle: None,
        }
    }

    pub fn algo(mut self, algo: impl Into<String>) -> Self {
        self.algo = Some(algo.into());
        self
    }
}

/// Body of `POST /labels`: a stored event or inline content.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelRequest {
    pub bundle_id: String,
    #[serde(default)]
    pub event_id: Option<EventId>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub author: Option<Did>,
}

impl LabelRequest {
    pub fn for_event(bundle_id: impl Into<String>, event_id: EventId) -> Self {
        Self {
            bundle_id: bundle_id.into(),
            event_id: Some(event_id),
            ..Default::default()
        }
    }

    pub fn for_content(
        bundle_id: impl Into<String>,
        content: impl Into<String>,
        author: impl Into<Did>,
    ) -> Self {
        Self {
            bundle_id: bundle_id.into(),
            event_id: None,
            content: Some(content.into()),
            author: Some(author.into()),
        }
    }
}

/// Response to `POST /labels`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabelDecision {
    pub allowed: bool,
    pub bundle_id: String,
    pub bundle_version: String,
    /// The content rule that decided the outcome.
    pub evidence: MatchedRule,
    /// Set when content rules allowed the event but a filter rejected it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<FilterViolation>,
}

/// Per-event result of [`crate::FeedService::verify_batch`].
#[derive(Debug)]
pub struct VerifyOutcome {
    pub event_id: EventId,
    pub result: Result<(), ServiceError>,
}

impl VerifyOutcome {
    pub fn is_valid(&self) -> bool {
        self.result.is_ok()
    }
}

/// Response to `GET /healthz`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Health {
    pub events: u64,
    pub bundles: Vec<String>,
    pub default_bundle: String,
    pub algorithms: Vec<Algorithm>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_receipt_wire_form() {
        let receipt = PublishReceipt {
            status: PublishStatus::Duplicate,
            event_id: EventId::from("abc"),
        };
        assert_eq!(receipt.status_code(), 200);
        assert_eq!(
            serde_json::to_value(&receipt).unwrap(),
            json!({"status": "duplicate", "event_id": "abc"})
        );
    }

    #[test]
    fn test_feed_query_from_params() {
        let query: FeedQuery =
            serde_json::from_value(json!({"algo": "chronological", "limit": 5})).unwrap();
        assert_eq!(query, FeedQuery::default().algo("chronological").limit(5));
    }

    #[test]
    fn test_label_decision_omits_absent_filter() {
        let decision = LabelDecision {
            allowed: true,
            bundle_id: "default-strict".into(),
            bundle_version: "1.0.0".into(),
            evidence: MatchedRule::Default,
            filter: None,
        };
        let value = serde_json::to_value(&decision).unwrap();
        assert!(value.get("filter").is_none());
        assert_eq!(value["allowed"], true);
    }
}
