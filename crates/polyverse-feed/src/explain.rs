//! Per-event score breakdowns.
//!
//! An explanation is recomputed from the same candidate set and context the
//! ranker used, so its factors and total match the ranked score exactly.

use std::collections::HashMap;

use polyverse_core::{AuthorProfile, Did, EventId, SignedEvent};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::algorithm::{Algorithm, Factor, ModelHash, ScoringContext};
use crate::error::{FeedError, Result};
use crate::ranker::{eligible, FeedRanker};

/// Why an event scored what it did.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankingExplanation {
    pub event_id: EventId,
    pub algorithm: Algorithm,
    pub factors: Vec<Factor>,
    pub total_score: f64,
    pub model_hash: ModelHash,
    /// Set when the algorithm drops the event before scoring.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub excluded: Option<String>,
}

impl RankingExplanation {
    pub fn is_excluded(&self) -> bool {
        self.excluded.is_some()
    }
}

impl FeedRanker {
    /// Explain how `event_id` scores under `algorithm` within `candidates`.
    pub fn explain(
        &self,
        event_id: &EventId,
        algorithm: Algorithm,
        candidates: &[SignedEvent],
        authors: &HashMap<Did, AuthorProfile>,
        now: i64,
    ) -> Result<RankingExplanation> {
        let event = candidates
            .iter()
            .find(|e| &e.id == event_id)
            .ok_or_else(|| FeedError::NotFound(event_id.to_string()))?;

        let strategy = self.registry().strategy(algorithm);
        let model_hash = strategy.model_hash();

        if let Some(reason) = strategy.exclusion(event, now) {
            debug!(event_id = %event_id, algorithm = %algorithm, reason = %reason, "explained excluded event");
            return Ok(RankingExplanation {
                event_id: event_id.clone(),
                algorithm,
                factors: Vec::new(),
                total_score: 0.0,
                model_hash,
                excluded: Some(reason),
            });
        }

        let eligible = eligible(strategy, candidates, now);
        let ctx = ScoringContext::new(now, &eligible, authors);
        let score = strategy.score(event, &ctx);

        debug!(event_id = %event_id, algorithm = %algorithm, total = score.total, "explained event");

        Ok(RankingExplanation {
            event_id: event_id.clone(),
            algorithm,
            factors: score.factors,
            total_score: score.total,
            model_hash,
            excluded: None,
        })
    }

    /// [`FeedRanker::explain`] with the algorithm given by name.
    pub fn explain_named(
        &self,
        event_id: &EventId,
        algorithm: &str,
        candidates: &[SignedEvent],
        authors: &HashMap<Did, AuthorProfile>,
        now: i64,
    ) -> Result<RankingExplanation> {
        self.explain(event_id, algorithm.parse()?, candidates, authors, now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ranker::RankingRequest;
    use polyverse_core::{Keypair, UnsignedEvent};

    const NOW: i64 = 1_700_000_000;

    fn post(author: &str, created_at: i64, text: &str) -> SignedEvent {
        UnsignedEvent::post(created_at, author, text)
            .unwrap()
            .sign(&Keypair::from_seed(&[3u8; 32]))
    }

    fn candidates() -> Vec<SignedEvent> {
        vec![
            post("did:key:a", NOW - 3600, "a first post with some text"),
            post("did:key:a", NOW - 7200, "a second post"),
            post("did:key:b", NOW - 60, "b posts once"),
            post("did:key:c", NOW - 2 * 86400, "c is stale"),
        ]
    }

    #[test]
    fn test_explanation_matches_ranked_score() {
        let events = candidates();
        let authors = HashMap::new();
        let ranker = FeedRanker::new();
        let page = ranker.rank(&events, &authors, &RankingRequest::new(Algorithm::TimeDecayDiversity, NOW));

        for item in &page.items {
            let explanation = ranker
                .explain(&item.event.id, Algorithm::TimeDecayDiversity, &events, &authors, NOW)
                .unwrap();
            assert_eq!(explanation.total_score, item.score);
            assert_eq!(explanation.factors, item.factors);
            assert_eq!(explanation.model_hash, page.model_hash);
        }
    }

    #[test]
    fn test_weighted_breakdown() {
        let events = candidates();
        let explanation = FeedRanker::new()
            .explain(&events[0].id, Algorithm::TimeDecayDiversity, &events, &HashMap::new(), NOW)
            .unwrap();

        let names: Vec<_> = explanation.factors.iter().map(|f| f.factor.as_str()).collect();
        assert_eq!(names, vec!["recency", "author_diversity", "content_quality"]);
        let weights: Vec<_> = explanation.factors.iter().map(|f| f.weight).collect();
        assert_eq!(weights, vec![0.6, 0.3, 0.1]);

        // 95 recency, 50 diversity (two posts by a), 13.5 quality.
        let expected = 95.0 * 0.6 + 50.0 * 0.3 + 13.5 * 0.1;
        assert!((explanation.total_score - expected).abs() < 1e-9);
    }

    #[test]
    fn test_excluded_event_is_explained() {
        let events = candidates();
        let explanation = FeedRanker::new()
            .explain(&events[3].id, Algorithm::TimeDecayDiversity, &events, &HashMap::new(), NOW)
            .unwrap();
        assert!(explanation.is_excluded());
        assert!(explanation.factors.is_empty());
        assert_eq!(explanation.total_score, 0.0);
    }

    #[test]
    fn test_errors() {
        let events = candidates();
        let ranker = FeedRanker::new();
        assert_eq!(
            ranker.explain(&EventId::from("missing"), Algorithm::Chronological, &events, &HashMap::new(), NOW),
            Err(FeedError::NotFound("missing".into()))
        );
        assert_eq!(
            ranker.explain_named(&events[0].id, "viral", &events, &HashMap::new(), NOW),
            Err(FeedError::UnknownAlgorithm("viral".into()))
        );
    }

    #[test]
    fn test_wire_shape() {
        let events = candidates();
        let explanation = FeedRanker::new()
            .explain_named(&events[2].id, "community_weighted", &events, &HashMap::new(), NOW)
            .unwrap();
        let json = serde_json::to_value(&explanation).unwrap();
        assert_eq!(json["eventId"], events[2].id.as_str());
        assert_eq!(json["algorithm"], "community_weighted");
        assert!(json["totalScore"].is_number());
        assert_eq!(json["factors"][0]["factor"], "reputation");
        assert!(json.get("excluded").is_none());

        let back: RankingExplanation = serde_json::from_value(json).unwrap();
        assert_eq!(back, explanation);
    }
}
