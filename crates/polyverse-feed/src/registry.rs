//! Algorithm registry: every [`Algorithm`] maps to exactly one strategy.

use crate::algorithm::{Algorithm, ScoringStrategy};
use crate::error::Result;
use crate::strategies::{Chronological, CommunityWeighted, TimeDecayDiversity};

/// The registered scoring strategies.
#[derive(Debug, Default, Clone)]
pub struct AlgorithmRegistry {
    time_decay_diversity: TimeDecayDiversity,
    community_weighted: CommunityWeighted,
    chronological: Chronological,
}

impl AlgorithmRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn strategy(&self, algorithm: Algorithm) -> &dyn ScoringStrategy {
        match algorithm {
            Algorithm::TimeDecayDiversity => &self.time_decay_diversity,
            Algorithm::CommunityWeighted => &self.community_weighted,
            Algorithm::Chronological => &self.chronological,
        }
    }

    /// Look up a strategy by registered name.
    pub fn get(&self, name: &str) -> Result<&dyn ScoringStrategy> {
        let algorithm: Algorithm = name.parse()?;
        Ok(self.strategy(algorithm))
    }

    pub fn algorithms(&self) -> &'static [Algorithm] {
        &Algorithm::ALL
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FeedError;

    #[test]
    fn test_every_algorithm_maps_to_itself() {
        let registry = AlgorithmRegistry::new();
        for &alg in registry.algorithms() {
            assert_eq!(registry.strategy(alg).algorithm(), alg);
        }
    }

    #[test]
    fn test_lookup_by_name() {
        let registry = AlgorithmRegistry::new();
        assert_eq!(
            registry.get("author_weighted").unwrap().algorithm(),
            Algorithm::CommunityWeighted
        );
        assert!(matches!(
            registry.get("nope"),
            Err(FeedError::UnknownAlgorithm(name)) if name == "nope"
        ));
    }
}
