//! The registered scoring strategies.

use polyverse_core::SignedEvent;

use crate::algorithm::{Algorithm, Factor, Score, ScoringContext, ScoringStrategy};

/// Events older than this are excluded by [`TimeDecayDiversity`].
pub const RECENCY_WINDOW_SECS: i64 = 24 * 60 * 60;

const SECS_PER_HOUR: f64 = 3600.0;

/// Fresh, varied, substantial content from the last day.
#[derive(Debug, Default, Clone, Copy)]
pub struct TimeDecayDiversity;

impl TimeDecayDiversity {
    const RECENCY_WEIGHT: f64 = 0.6;
    const DIVERSITY_WEIGHT: f64 = 0.3;
    const QUALITY_WEIGHT: f64 = 0.1;

    fn age_hours(event: &SignedEvent, now: i64) -> f64 {
        (now - event.created_at()).max(0) as f64 / SECS_PER_HOUR
    }

    fn content_quality(event: &SignedEvent) -> f64 {
        let Some(body) = event.event.body() else {
            return 0.0;
        };
        let chars = body.text.as_deref().map_or(0, |t| t.chars().count());
        let mut quality = (chars as f64 / 2.0).min(100.0);
        if !body.media_items().is_empty() {
            quality += 20.0;
        }
        quality.min(100.0)
    }
}

impl ScoringStrategy for TimeDecayDiversity {
    fn algorithm(&self) -> Algorithm {
        Algorithm::TimeDecayDiversity
    }

    fn descriptor(&self) -> &'static str {
        "time_decay_diversity/v1: window=86400s; \
         recency=max(0,100-5*age_hours)*0.6; \
         author_diversity=100/author_events*0.3; \
         content_quality=min(100,min(100,chars/2)+20*has_media)*0.1"
    }

    fn exclusion(&self, event: &SignedEvent, now: i64) -> Option<String> {
        let age = now - event.created_at();
        (age > RECENCY_WINDOW_SECS).then(|| {
            format!("older than 24 hours ({age}s before the reference time)")
        })
    }

    fn score(&self, event: &SignedEvent, ctx: &ScoringContext<'_>) -> Score {
        let age_hours = Self::age_hours(event, ctx.now);
        let recency = (100.0 - 5.0 * age_hours).max(0.0);

        let author_events = ctx.author_count(event.author()).max(1);
        let diversity = 100.0 / author_events as f64;

        let quality = Self::content_quality(event);

        Score::from_factors(vec![
            Factor::new(
                "recency",
                recency,
                Self::RECENCY_WEIGHT,
                format!("posted {age_hours:.2} hours ago"),
            ),
            Factor::new(
                "author_diversity",
                diversity,
                Self::DIVERSITY_WEIGHT,
                format!("author has {author_events} event(s) in this feed"),
            ),
            Factor::new(
                "content_quality",
                quality,
                Self::QUALITY_WEIGHT,
                "text length and attached media",
            ),
        ])
    }
}

/// Established, widely followed authors first.
///
/// The timestamp term is in raw Unix seconds and dominates the total; the
/// formula is kept as published so existing model hashes stay valid.
#[derive(Debug, Default, Clone, Copy)]
pub struct CommunityWeighted;

impl CommunityWeighted {
    const REPUTATION_WEIGHT: f64 = 0.6;
    const FOLLOWER_WEIGHT: f64 = 0.3;
    const TIMESTAMP_WEIGHT: f64 = 0.1;
}

impl ScoringStrategy for CommunityWeighted {
    fn algorithm(&self) -> Algorithm {
        Algorithm::CommunityWeighted
    }

    fn descriptor(&self) -> &'static str {
        "community_weighted/v1: reputation*0.6; follower_count*0.3; created_at*0.1"
    }

    fn score(&self, event: &SignedEvent, ctx: &ScoringContext<'_>) -> Score {
        let (reputation, followers, known) = match ctx.author(event.author()) {
            Some(profile) => (profile.reputation, profile.follower_count as f64, true),
            None => (0.0, 0.0, false),
        };
        let author_note = if known { "" } else { " (unknown author)" };

        Score::from_factors(vec![
            Factor::new(
                "reputation",
                reputation,
                Self::REPUTATION_WEIGHT,
                format!("author reputation {reputation}{author_note}"),
            ),
            Factor::new(
                "follower_count",
                followers,
                Self::FOLLOWER_WEIGHT,
                format!("{followers} followers{author_note}"),
            ),
            Factor::new(
                "timestamp",
                event.created_at() as f64,
                Self::TIMESTAMP_WEIGHT,
                "creation time in Unix seconds",
            ),
        ])
    }
}

/// Newest first.
#[derive(Debug, Default, Clone, Copy)]
pub struct Chronological;

impl ScoringStrategy for Chronological {
    fn algorithm(&self) -> Algorithm {
        Algorithm::Chronological
    }

    fn descriptor(&self) -> &'static str {
        "chronological/v1: created_at*1.0"
    }

    fn score(&self, event: &SignedEvent, _ctx: &ScoringContext<'_>) -> Score {
        Score::from_factors(vec![Factor::new(
            "timestamp",
            event.created_at() as f64,
            1.0,
            "creation time in Unix seconds",
        )])
    }
}
