//! # Polyverse Feed
//!
//! Ranking for Polyverse feeds. A request names an algorithm, a cursor, and a
//! page size; the ranker scores a candidate snapshot, sorts it
//! deterministically, and returns one page. The same scoring can be replayed
//! for a single event as a [`RankingExplanation`].
//!
//! ## Key Types
//!
//! - [`Algorithm`] - Registered ranking algorithms
//! - [`ScoringStrategy`] - The scoring interface each algorithm implements
//! - [`FeedRanker`] - Score, sort, and paginate
//! - [`RankingExplanation`] - Weighted factors and model hash for one event
//!
//! ## Ordering
//!
//! Total score descending, then `created_at` descending, then event id
//! ascending. Identical inputs always produce identical pages.

pub mod algorithm;
pub mod cursor;
pub mod error;
pub mod explain;
pub mod ranker;
pub mod registry;
pub mod strategies;

pub use algorithm::{Algorithm, Factor, ModelHash, Score, ScoringContext, ScoringStrategy};
pub use cursor::{Cursor, Limit, DEFAULT_LIMIT, MAX_LIMIT};
pub use error::{FeedError, Result};
pub use explain::RankingExplanation;
pub use ranker::{FeedPage, FeedRanker, RankedEvent, RankingRequest};
pub use registry::AlgorithmRegistry;
pub use strategies::{Chronological, CommunityWeighted, TimeDecayDiversity, RECENCY_WINDOW_SECS};
