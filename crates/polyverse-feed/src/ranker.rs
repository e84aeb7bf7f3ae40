//! Score, sort, and paginate a candidate snapshot.
//!
//! The ranker never filters by moderation policy; callers hand it the
//! candidates that already passed their bundle. Everything here is a pure
//! function of the candidate slice, the author map, and the request.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use polyverse_core::{AuthorProfile, Did, SignedEvent};
use serde::Serialize;
use tracing::debug;

use crate::algorithm::{Algorithm, Factor, ModelHash, Score, ScoringContext, ScoringStrategy};
use crate::cursor::{Cursor, Limit, DEFAULT_LIMIT, MAX_LIMIT};
use crate::error::Result;
use crate::registry::AlgorithmRegistry;

/// One page request against a candidate set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankingRequest {
    pub algorithm: Algorithm,
    pub cursor: Cursor,
    pub limit: Limit,
    /// Reference time for recency, Unix seconds.
    pub now: i64,
}

impl RankingRequest {
    /// First page with the default limit.
    pub fn new(algorithm: Algorithm, now: i64) -> Self {
        Self {
            algorithm,
            cursor: Cursor::START,
            limit: Limit::default(),
            now,
        }
    }

    /// Build from raw query parameters, bounded by [`MAX_LIMIT`].
    pub fn parse(algo: &str, cursor: Option<&str>, limit: Option<usize>, now: i64) -> Result<Self> {
        Ok(Self {
            algorithm: algo.parse()?,
            cursor: cursor.map(str::parse::<Cursor>).transpose()?.unwrap_or_default(),
            limit: Limit::or_default(limit, DEFAULT_LIMIT, MAX_LIMIT)?,
            now,
        })
    }

    pub fn with_cursor(mut self, cursor: Cursor) -> Self {
        self.cursor = cursor;
        self
    }

    pub fn with_limit(mut self, limit: Limit) -> Self {
        self.limit = limit;
        self
    }
}

/// A ranked event with the score that placed it.
#[derive(Debug, Clone, Serialize)]
pub struct RankedEvent {
    pub event: SignedEvent,
    pub score: f64,
    pub factors: Vec<Factor>,
}

/// One page of a ranked feed.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedPage {
    pub algorithm: Algorithm,
    pub model_hash: ModelHash,
    pub items: Vec<RankedEvent>,
    /// Where the next page starts; `None` on the last page.
    pub next_cursor: Option<Cursor>,
    /// Eligible events across all pages.
    pub total: usize,
}

/// Ranks candidate snapshots with the registered algorithms.
#[derive(Debug, Default, Clone)]
pub struct FeedRanker {
    registry: AlgorithmRegistry,
}

impl FeedRanker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn registry(&self) -> &AlgorithmRegistry {
        &self.registry
    }

    /// Rank `candidates` and return the requested page.
    ///
    /// Duplicate ids are ranked once. Events the algorithm excludes never
    /// appear and do not count toward `total`.
    pub fn rank(
        &self,
        candidates: &[SignedEvent],
        authors: &HashMap<Did, AuthorProfile>,
        request: &RankingRequest,
    ) -> FeedPage {
        let strategy = self.registry.strategy(request.algorithm);
        let ordered = ordered(strategy, candidates, authors, request.now);
        let total = ordered.len();

        let start = request.cursor.offset().min(total);
        let end = start.saturating_add(request.limit.get()).min(total);
        let next_cursor = (end < total).then(|| Cursor::at(end));

        let items = ordered[start..end]
            .iter()
            .map(|(event, score)| RankedEvent {
                event: (*event).clone(),
                score: score.total,
                factors: score.factors.clone(),
            })
            .collect();

        debug!(
            algorithm = %request.algorithm,
            candidates = candidates.len(),
            total,
            offset = start,
            returned = end - start,
            "ranked feed"
        );

        FeedPage {
            algorithm: request.algorithm,
            model_hash: strategy.model_hash(),
            items,
            next_cursor,
            total,
        }
    }
}

/// Candidates that survive deduplication and the strategy's exclusion, in
/// input order.
pub(crate) fn eligible<'a>(
    strategy: &dyn ScoringStrategy,
    candidates: &'a [SignedEvent],
    now: i64,
) -> Vec<&'a SignedEvent> {
    let mut seen = HashSet::new();
    candidates
        .iter()
        .filter(|event| seen.insert(&event.id))
        .filter(|event| strategy.exclusion(event, now).is_none())
        .collect()
}

/// Total descending, then newest first, then id ascending.
fn compare(a: &(&SignedEvent, Score), b: &(&SignedEvent, Score)) -> Ordering {
    b.1.total
        .total_cmp(&a.1.total)
        .then_with(|| b.0.created_at().cmp(&a.0.created_at()))
        .then_with(|| a.0.id.cmp(&b.0.id))
}

fn ordered<'a>(
    strategy: &dyn ScoringStrategy,
    candidates: &'a [SignedEvent],
    authors: &HashMap<Did, AuthorProfile>,
    now: i64,
) -> Vec<(&'a SignedEvent, Score)> {
    let eligible = eligible(strategy, candidates, now);
    let ctx = ScoringContext::new(now, &eligible, authors);
    let mut scored: Vec<_> = eligible
        .iter()
        .map(|&event| (event, strategy.score(event, &ctx)))
        .collect();
    scored.sort_by(compare);
    scored
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FeedError;
    use polyverse_core::{Keypair, UnsignedEvent};
    use proptest::prelude::*;

    const NOW: i64 = 1_700_000_000;

    fn keys() -> Keypair {
        Keypair::from_seed(&[7u8; 32])
    }

    fn post(author: &str, created_at: i64, text: &str) -> SignedEvent {
        UnsignedEvent::post(created_at, author, text).unwrap().sign(&keys())
    }

    fn ids(page: &FeedPage) -> Vec<String> {
        page.items.iter().map(|i| i.event.id.to_string()).collect()
    }

    #[test]
    fn test_chronological_orders_newest_first() {
        let events = vec![
            post("a", NOW - 30, "old"),
            post("b", NOW - 10, "new"),
            post("c", NOW - 20, "mid"),
        ];
        let ranker = FeedRanker::new();
        let page = ranker.rank(
            &events,
            &HashMap::new(),
            &RankingRequest::new(Algorithm::Chronological, NOW),
        );
        let texts: Vec<_> = page.items.iter().map(|i| i.event.text().unwrap()).collect();
        assert_eq!(texts, vec!["new", "mid", "old"]);
        assert_eq!(page.total, 3);
        assert!(page.next_cursor.is_none());
    }

    #[test]
    fn test_ties_break_by_id() {
        let events = vec![
            post("a", NOW, "same time one"),
            post("b", NOW, "same time two"),
        ];
        let page = FeedRanker::new().rank(
            &events,
            &HashMap::new(),
            &RankingRequest::new(Algorithm::Chronological, NOW),
        );
        let mut expected = ids(&page);
        expected.sort();
        assert_eq!(ids(&page), expected);
    }

    #[test]
    fn test_stale_events_never_ranked() {
        let events = vec![
            post("a", NOW - 25 * 3600, "stale but long and detailed content"),
            post("b", NOW - 60, "fresh"),
        ];
        let page = FeedRanker::new().rank(
            &events,
            &HashMap::new(),
            &RankingRequest::new(Algorithm::TimeDecayDiversity, NOW),
        );
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].event.text(), Some("fresh"));
    }

    #[test]
    fn test_duplicates_ranked_once() {
        let event = post("a", NOW, "hello");
        let events = vec![event.clone(), event.clone(), post("b", NOW, "world")];
        let page = FeedRanker::new().rank(
            &events,
            &HashMap::new(),
            &RankingRequest::new(Algorithm::TimeDecayDiversity, NOW),
        );
        assert_eq!(page.total, 2);
        // Duplicates must not halve author diversity.
        let diversity = page.items.iter().find(|i| i.event.id == event.id).unwrap().factors[1].score;
        assert_eq!(diversity, 100.0);
    }

    #[test]
    fn test_cursor_past_end_is_empty() {
        let events = vec![post("a", NOW, "only")];
        let request = RankingRequest::new(Algorithm::Chronological, NOW)
            .with_cursor("5".parse().unwrap());
        let page = FeedRanker::new().rank(&events, &HashMap::new(), &request);
        assert!(page.items.is_empty());
        assert!(page.next_cursor.is_none());
        assert_eq!(page.total, 1);
    }

    #[test]
    fn test_parse_request() {
        let request = RankingRequest::parse("author_weighted", Some("4"), Some(10), NOW).unwrap();
        assert_eq!(request.algorithm, Algorithm::CommunityWeighted);
        assert_eq!(request.cursor.offset(), 4);
        assert_eq!(request.limit.get(), 10);

        let request = RankingRequest::parse("chronological", None, None, NOW).unwrap();
        assert_eq!(request.cursor, Cursor::START);
        assert_eq!(request.limit.get(), DEFAULT_LIMIT);

        assert!(matches!(
            RankingRequest::parse("hot", None, None, NOW),
            Err(FeedError::UnknownAlgorithm(_))
        ));
        assert!(matches!(
            RankingRequest::parse("chronological", Some("x"), None, NOW),
            Err(FeedError::InvalidCursor(_))
        ));
        assert!(matches!(
            RankingRequest::parse("chronological", None, Some(500), NOW),
            Err(FeedError::InvalidLimit { .. })
        ));
    }

    #[test]
    fn test_page_serializes_camel_case() {
        let events = vec![post("a", NOW, "one"), post("b", NOW - 1, "two")];
        let request = RankingRequest::new(Algorithm::Chronological, NOW)
            .with_limit(Limit::new(1, MAX_LIMIT).unwrap());
        let page = FeedRanker::new().rank(&events, &HashMap::new(), &request);
        let json = serde_json::to_value(&page).unwrap();
        assert_eq!(json["algorithm"], "chronological");
        assert_eq!(json["nextCursor"], "1");
        assert_eq!(json["modelHash"].as_str().unwrap().len(), 64);
        assert_eq!(json["items"][0]["event"]["body"]["text"], "one");
    }

    fn candidate_set() -> impl Strategy<Value = Vec<SignedEvent>> {
        prop::collection::vec((0usize..4, 0i64..(30 * 3600), "[a-z ]{1,40}"), 0..12).prop_map(
            |specs| {
                specs
                    .into_iter()
                    .map(|(author, age, text)| post(&format!("did:key:author{author}"), NOW - age, &text))
                    .collect()
            },
        )
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn prop_pages_do_not_tear(events in candidate_set(), alg_idx in 0usize..3, limit in 1usize..5) {
            let ranker = FeedRanker::new();
            let authors = HashMap::new();
            let algorithm = Algorithm::ALL[alg_idx];

            let everything = ranker.rank(
                &events,
                &authors,
                &RankingRequest::new(algorithm, NOW).with_limit(Limit::new(MAX_LIMIT, MAX_LIMIT).unwrap()),
            );

            let mut paged = Vec::new();
            let mut cursor = Cursor::START;
            loop {
                let request = RankingRequest::new(algorithm, NOW)
                    .with_cursor(cursor)
                    .with_limit(Limit::new(limit, MAX_LIMIT).unwrap());
                let page = ranker.rank(&events, &authors, &request);
                prop_assert!(page.items.len() <= limit);
                paged.extend(ids(&page));
                match page.next_cursor {
                    Some(next) => cursor = next,
                    None => break,
                }
            }

            prop_assert_eq!(paged, ids(&everything));
        }

        #[test]
        fn prop_ranking_is_idempotent(events in candidate_set()) {
            let ranker = FeedRanker::new();
            let request = RankingRequest::new(Algorithm::TimeDecayDiversity, NOW);
            let first = ranker.rank(&events, &HashMap::new(), &request);
            let second = ranker.rank(&events, &HashMap::new(), &request);
            prop_assert_eq!(ids(&first), ids(&second));
        }

        #[test]
        fn prop_cutoff_holds(events in candidate_set()) {
            let page = FeedRanker::new().rank(
                &events,
                &HashMap::new(),
                &RankingRequest::new(Algorithm::TimeDecayDiversity, NOW)
                    .with_limit(Limit::new(MAX_LIMIT, MAX_LIMIT).unwrap()),
            );
            for item in &page.items {
                prop_assert!(NOW - item.event.created_at() <= 24 * 3600);
            }
        }
    }
}
