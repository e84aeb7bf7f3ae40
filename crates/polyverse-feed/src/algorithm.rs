//! Ranking algorithms and the scoring interface they implement.
//!
//! Each [`Algorithm`] maps to exactly one [`ScoringStrategy`]. A strategy
//! scores a single event against a [`ScoringContext`] built from the whole
//! eligible candidate set, so factors that depend on the set (like author
//! diversity) are computed the same way for ranking and for explanation.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use polyverse_core::{AuthorProfile, Did, SignedEvent, Sha256Hash};
use serde::{Deserialize, Serialize};

use crate::error::FeedError;

/// A registered ranking algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Algorithm {
    /// Recency within the last 24 hours, balanced by author diversity and
    /// content quality.
    TimeDecayDiversity,
    /// Author reputation and reach, plus timestamp.
    CommunityWeighted,
    /// Newest first.
    Chronological,
}

impl Algorithm {
    pub const ALL: [Algorithm; 3] = [
        Algorithm::TimeDecayDiversity,
        Algorithm::CommunityWeighted,
        Algorithm::Chronological,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Algorithm::TimeDecayDiversity => "time_decay_diversity",
            Algorithm::CommunityWeighted => "community_weighted",
            Algorithm::Chronological => "chronological",
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Algorithm {
    type Err = FeedError;

    /// Parse a registered name. `author_weighted` is accepted as the older
    /// name of `community_weighted`.
    fn from_str(s: &str) -> Result<Self, FeedError> {
        match s {
            "time_decay_diversity" => Ok(Algorithm::TimeDecayDiversity),
            "community_weighted" | "author_weighted" => Ok(Algorithm::CommunityWeighted),
            "chronological" => Ok(Algorithm::Chronological),
            other => Err(FeedError::UnknownAlgorithm(other.to_string())),
        }
    }
}

/// One weighted term of a score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Factor {
    pub factor: String,
    pub score: f64,
    pub weight: f64,
    pub rationale: String,
}

impl Factor {
    pub fn new(factor: &str, score: f64, weight: f64, rationale: impl Into<String>) -> Self {
        Self {
            factor: factor.to_string(),
            score,
            weight,
            rationale: rationale.into(),
        }
    }

    pub fn weighted(&self) -> f64 {
        self.score * self.weight
    }
}

/// A scored event: the factors and their weighted sum.
#[derive(Debug, Clone, PartialEq)]
pub struct Score {
    pub total: f64,
    pub factors: Vec<Factor>,
}

impl Score {
    pub fn from_factors(factors: Vec<Factor>) -> Self {
        let total = factors.iter().map(Factor::weighted).sum();
        Self { total, factors }
    }
}

/// Identifies one exact scoring formula.
///
/// Hex SHA-256 over a domain tag and the formula descriptor, so any change to
/// a weight or term changes the hash.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModelHash(String);

impl ModelHash {
    pub fn of_descriptor(descriptor: &str) -> Self {
        let mut input = b"polyverse-model-v1:".to_vec();
        input.extend_from_slice(descriptor.as_bytes());
        Self(Sha256Hash::hash(&input).to_hex())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ModelHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Inputs shared by every event scored in one request.
#[derive(Debug, Clone)]
pub struct ScoringContext<'a> {
    /// Reference time, Unix seconds.
    pub now: i64,
    /// Caller-owned author metadata. Authors missing here are unknown.
    pub authors: &'a HashMap<Did, AuthorProfile>,
    /// Events per author in the eligible set.
    author_counts: HashMap<&'a Did, usize>,
}

impl<'a> ScoringContext<'a> {
    pub fn new(
        now: i64,
        eligible: &[&'a SignedEvent],
        authors: &'a HashMap<Did, AuthorProfile>,
    ) -> Self {
        let mut author_counts = HashMap::new();
        for &event in eligible {
            *author_counts.entry(event.author()).or_insert(0) += 1;
        }
        Self {
            now,
            authors,
            author_counts,
        }
    }

    /// Number of eligible events by this author.
    pub fn author_count(&self, did: &Did) -> usize {
        self.author_counts.get(did).copied().unwrap_or(0)
    }

    pub fn author(&self, did: &Did) -> Option<&'a AuthorProfile> {
        self.authors.get(did)
    }
}

/// A pure scoring function for one algorithm.
pub trait ScoringStrategy: Send + Sync {
    fn algorithm(&self) -> Algorithm;

    /// Human-readable formula, including every weight. Hashed into the
    /// model hash.
    fn descriptor(&self) -> &'static str;

    fn model_hash(&self) -> ModelHash {
        ModelHash::of_descriptor(self.descriptor())
    }

    /// Why an event is excluded before scoring, if it is.
    fn exclusion(&self, _event: &SignedEvent, _now: i64) -> Option<String> {
        None
    }

    fn score(&self, event: &SignedEvent, ctx: &ScoringContext<'_>) -> Score;
}
