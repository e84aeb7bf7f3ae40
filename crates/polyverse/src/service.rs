//! The feed service: verified publishing, moderated ranked feeds, and
//! explanations over one event store.

use std::collections::HashMap;
use std::sync::Arc;

use polyverse_bundles::{check_filters, Bundle, BundleRegistry, CompiledBundle};
use polyverse_core::{validate_unsigned, verify_detailed, AuthorProfile, Did, EventId, SignedEvent};
use polyverse_feed::{
    Algorithm, Cursor, FeedPage, FeedRanker, Limit, RankingExplanation, RankingRequest,
};
use polyverse_store::{EventStore, EventStoreExt, InsertResult, MemoryStore, SqliteStore};
use tracing::{debug, info, warn};

use crate::api::{
    ExplainQuery, FeedQuery, Health, LabelDecision, LabelRequest, PublishReceipt, PublishStatus,
    VerifyOutcome,
};
use crate::config::{FeedConfig, ModerationConfig, ServiceConfig, StoreBackend, StoreConfig};
use crate::error::{Result, ServiceError};
use crate::resolver::{DidKeyResolver, KeyResolver};

/// Events returned by [`FeedService::author_events`] when no limit is given.
pub const DEFAULT_AUTHOR_EVENTS: usize = 50;

/// Source of the reference time, Unix seconds.
pub type Clock = fn() -> i64;

/// The feed service.
///
/// Publishing verifies before it stores, so the store only ever holds
/// events whose id and signature check out. Reads take a snapshot of recent
/// events, drop what the request's bundle rejects, and rank the rest.
pub struct FeedService<S: EventStore> {
    store: Arc<S>,
    bundles: BundleRegistry,
    ranker: FeedRanker,
    resolver: Arc<dyn KeyResolver>,
    feed: FeedConfig,
    moderation: ModerationConfig,
    clock: Clock,
}

impl<S: EventStore> FeedService<S> {
    /// Create a service with the built-in bundles plus any configured bundle
    /// files, resolving authors as `did:key` handles.
    pub fn new(store: S, config: &ServiceConfig) -> Result<Self> {
        let mut bundles = BundleRegistry::with_defaults()?;
        for path in &config.moderation.bundle_files {
            bundles.load_file(path)?;
        }
        bundles.set_default(&config.moderation.default_bundle)?;

        Ok(Self {
            store: Arc::new(store),
            bundles,
            ranker: FeedRanker::new(),
            resolver: Arc::new(DidKeyResolver),
            feed: config.feed.clone(),
            moderation: config.moderation.clone(),
            clock: now_secs,
        })
    }

    /// Replace the author key resolver.
    pub fn with_resolver(mut self, resolver: impl KeyResolver + 'static) -> Self {
        self.resolver = Arc::new(resolver);
        self
    }

    /// Replace the clock used for recency and candidate windows.
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn bundles(&self) -> &BundleRegistry {
        &self.bundles
    }

    /// Load or replace a moderation bundle.
    pub fn load_bundle(&mut self, bundle: Bundle) -> Result<Arc<CompiledBundle>> {
        Ok(self.bundles.load(bundle)?)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Publish
    // ─────────────────────────────────────────────────────────────────────────

    /// Verify and store a signed event.
    ///
    /// Nothing is written unless the event is well formed, its author key
    /// resolves, and both its signature and id verify.
    pub async fn publish(&self, event: &SignedEvent) -> Result<PublishReceipt> {
        validate_unsigned(&event.event)?;

        let key = self.resolver.resolve(event.author()).ok_or_else(|| {
            warn!(event_id = %event.id, author = %event.author(), "rejected event: unresolvable author");
            ServiceError::UnresolvableAuthor(event.author().to_string())
        })?;

        if let Err(err) = verify_detailed(event, &key) {
            warn!(event_id = %event.id, author = %event.author(), error = %err, "rejected event");
            return Err(err.into());
        }

        let status = match self.store.insert(event).await? {
            InsertResult::Inserted => {
                info!(event_id = %event.id, kind = %event.kind(), author = %event.author(), "accepted event");
                PublishStatus::Accepted
            }
            InsertResult::AlreadyExists => {
                debug!(event_id = %event.id, "duplicate event");
                PublishStatus::Duplicate
            }
        };

        Ok(PublishReceipt {
            status,
            event_id: event.id.clone(),
        })
    }

    /// Parse a wire JSON event and publish it.
    pub async fn publish_json(&self, json: &str) -> Result<PublishReceipt> {
        let event = SignedEvent::from_json(json).map_err(|err| {
            warn!(error = %err, "rejected malformed event");
            err
        })?;
        self.publish(&event).await
    }

    /// Check many events in parallel without storing any.
    ///
    /// Outcomes are returned in input order.
    pub async fn verify_batch(&self, events: Vec<SignedEvent>) -> Vec<VerifyOutcome> {
        let tasks: Vec<_> = events
            .into_iter()
            .map(|event| {
                let resolver = Arc::clone(&self.resolver);
                let event_id = event.id.clone();
                let handle = tokio::task::spawn_blocking(move || verify_one(resolver.as_ref(), &event));
                (event_id, handle)
            })
            .collect();

        let mut outcomes = Vec::with_capacity(tasks.len());
        for (event_id, handle) in tasks {
            let result = match handle.await {
                Ok(result) => result,
                Err(e) => Err(ServiceError::Internal(format!("verification task failed: {e}"))),
            };
            outcomes.push(VerifyOutcome { event_id, result });
        }
        outcomes
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Read
    // ─────────────────────────────────────────────────────────────────────────

    /// One page of the ranked, moderated feed.
    pub async fn feed(&self, query: &FeedQuery) -> Result<FeedPage> {
        let algorithm = self.algorithm(query.algo.as_deref())?;
        let cursor = match query.cursor.as_deref() {
            Some(raw) => raw.parse::<Cursor>()?,
            None => Cursor::START,
        };
        let limit = Limit::or_default(query.limit, self.feed.default_limit, self.feed.max_limit)?;
        let bundle = self.bundles.resolve(query.bundle.as_deref())?;
        let now = (self.clock)();

        let (mut events, authors) = self.candidates(&bundle, now).await?;
        if let Some(tag) = query.hashtag.as_deref() {
            events.retain(|e| has_hashtag(e.text().unwrap_or_default(), tag));
        }

        let request = RankingRequest {
            algorithm,
            cursor,
            limit,
            now,
        };
        Ok(self.ranker.rank(&events, &authors, &request))
    }

    /// Score breakdown for one event within the moderated candidate set.
    pub async fn explain(&self, query: &ExplainQuery) -> Result<RankingExplanation> {
        let algorithm = self.algorithm(query.algo.as_deref())?;
        let bundle = self.bundles.resolve(query.bundle.as_deref())?;
        let now = (self.clock)();

        let (events, authors) = self.candidates(&bundle, now).await?;
        Ok(self
            .ranker
            .explain(&query.event_id, algorithm, &events, &authors, now)?)
    }

    /// Moderation decision for a stored event or inline content.
    pub async fn labels(&self, request: &LabelRequest) -> Result<LabelDecision> {
        let bundle = self.bundles.get(&request.bundle_id)?;

        let (content, author) = match (&request.event_id, &request.content) {
            (Some(id), None) => {
                let event = self.event(id).await?;
                (event.text().unwrap_or_default().to_string(), event.author().clone())
            }
            (None, Some(content)) => {
                let author = request.author.clone().ok_or_else(|| {
                    ServiceError::BadRequest("content labels require an author".into())
                })?;
                (content.clone(), author)
            }
            (Some(_), Some(_)) => {
                return Err(ServiceError::BadRequest(
                    "give either event_id or content, not both".into(),
                ))
            }
            (None, None) => {
                return Err(ServiceError::BadRequest("event_id or content is required".into()))
            }
        };

        let decision = bundle.evaluate_detailed(&content, author.as_str());
        let filter = if decision.allowed && self.moderation.apply_filters {
            let profile = self.store.author(&author).await?;
            check_filters(&bundle.bundle().filters, &content, profile.as_ref()).err()
        } else {
            None
        };

        Ok(LabelDecision {
            allowed: decision.allowed && filter.is_none(),
            bundle_id: decision.bundle_id,
            bundle_version: decision.bundle_version,
            evidence: decision.matched,
            filter,
        })
    }

    /// A stored event by id.
    pub async fn event(&self, id: &EventId) -> Result<SignedEvent> {
        self.store
            .get(id)
            .await?
            .ok_or_else(|| ServiceError::EventNotFound(id.clone()))
    }

    /// An author's events, newest first.
    ///
    /// This is the reverse of the indexer's oldest-first author listing. With
    /// a `limit`, newest first keeps the latest events rather than the
    /// earliest; callers wanting history order reverse the page.
    pub async fn author_events(&self, author: &Did, limit: Option<usize>) -> Result<Vec<SignedEvent>> {
        let limit = Limit::or_default(
            limit,
            DEFAULT_AUTHOR_EVENTS.min(self.feed.max_limit),
            self.feed.max_limit,
        )?;
        Ok(self.store.by_author(author, limit.get()).await?)
    }

    /// Record author metadata used by ranking and filters.
    pub async fn upsert_author(&self, profile: &AuthorProfile) -> Result<()> {
        Ok(self.store.upsert_author(profile).await?)
    }

    pub async fn health(&self) -> Result<Health> {
        Ok(Health {
            events: self.store.count().await?,
            bundles: self.bundles.all().iter().map(|b| b.id().to_string()).collect(),
            default_bundle: self.bundles.default_id().to_string(),
            algorithms: Algorithm::ALL.to_vec(),
        })
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Internals
    // ─────────────────────────────────────────────────────────────────────────

    fn algorithm(&self, name: Option<&str>) -> Result<Algorithm> {
        match name {
            Some(name) => Ok(name.parse()?),
            None => Ok(self.feed.default_algorithm),
        }
    }

    /// Recent events that pass `bundle`, with their authors' profiles.
    async fn candidates(
        &self,
        bundle: &CompiledBundle,
        now: i64,
    ) -> Result<(Vec<SignedEvent>, HashMap<Did, AuthorProfile>)> {
        let since = now.saturating_sub(self.feed.candidate_window_secs);
        let snapshot = self.store.snapshot(since, self.feed.candidate_limit).await?;
        let fetched = snapshot.events.len();

        let authors = snapshot.authors;
        let events: Vec<SignedEvent> = snapshot
            .events
            .into_iter()
            .filter(|event| self.passes(bundle, event, &authors))
            .collect();

        debug!(
            bundle_id = bundle.id(),
            fetched,
            kept = events.len(),
            "moderated candidates"
        );
        Ok((events, authors))
    }

    fn passes(
        &self,
        bundle: &CompiledBundle,
        event: &SignedEvent,
        authors: &HashMap<Did, AuthorProfile>,
    ) -> bool {
        let text = event.text().unwrap_or_default();
        if !bundle.evaluate(text, event.author().as_str()) {
            return false;
        }
        if self.moderation.apply_filters {
            let profile = authors.get(event.author());
            if let Err(violation) = check_filters(&bundle.bundle().filters, text, profile) {
                debug!(event_id = %event.id, %violation, "filtered event");
                return false;
            }
        }
        true
    }
}

impl FeedService<Arc<dyn EventStore>> {
    /// Open the configured store and build a service over it.
    pub fn from_config(config: &ServiceConfig) -> Result<Self> {
        let store = open_store(&config.store)?;
        Self::new(store, config)
    }
}

/// Open the store selected by `config`.
pub fn open_store(config: &StoreConfig) -> Result<Arc<dyn EventStore>> {
    let store: Arc<dyn EventStore> = match config.backend {
        StoreBackend::Memory => Arc::new(MemoryStore::new()),
        StoreBackend::Sqlite => Arc::new(SqliteStore::open(&config.path)?),
    };
    Ok(store)
}

fn verify_one(resolver: &dyn KeyResolver, event: &SignedEvent) -> Result<()> {
    validate_unsigned(&event.event)?;
    let key = resolver
        .resolve(event.author())
        .ok_or_else(|| ServiceError::UnresolvableAuthor(event.author().to_string()))?;
    verify_detailed(event, &key)?;
    Ok(())
}

/// Whether `text` contains `#tag` as a whole word, ignoring ASCII case.
///
/// Every `#` opens a tag, so `##rust` and `#go#rust` both carry `rust`.
fn has_hashtag(text: &str, tag: &str) -> bool {
    let tag = tag.trim_start_matches('#');
    if tag.is_empty() {
        return false;
    }
    text.split('#')
        .skip(1)
        .filter_map(|rest| rest.split(|c: char| !(c.is_alphanumeric() || c == '_')).next())
        .any(|word| word.eq_ignore_ascii_case(tag))
}

fn now_secs() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}
