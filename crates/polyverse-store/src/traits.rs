//! EventStore trait: the abstract interface for event persistence.
//!
//! The feed service is storage-agnostic. Implementations include SQLite
//! (primary) and in-memory (for tests and single-process deployments).

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use polyverse_core::{AuthorProfile, Did, EventId, SignedEvent};

use crate::error::Result;

/// Result of inserting an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertResult {
    /// Event was inserted.
    Inserted,
    /// An event with this id is already stored (idempotent, not an error).
    AlreadyExists,
}

/// The candidate set handed to ranking for one request.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    /// Newest first.
    pub events: Vec<SignedEvent>,
    /// Profiles for the authors of `events` that the store knows about.
    pub authors: HashMap<Did, AuthorProfile>,
}

/// Async interface for event persistence.
///
/// Stores only ever receive events that have already been verified. Ids are
/// content addresses, so inserting the same id twice is always the same
/// event and returns `AlreadyExists`.
#[async_trait]
pub trait EventStore: Send + Sync {
    // ─────────────────────────────────────────────────────────────────────────
    // Event Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Insert a verified event.
    async fn insert(&self, event: &SignedEvent) -> Result<InsertResult>;

    /// Get an event by id.
    async fn get(&self, id: &EventId) -> Result<Option<SignedEvent>>;

    /// Check if an event exists.
    async fn has(&self, id: &EventId) -> Result<bool>;

    /// Events by one author, newest first.
    async fn by_author(&self, author: &Did, limit: usize) -> Result<Vec<SignedEvent>>;

    /// Events with `created_at >= since`, newest first, ties broken by id.
    async fn recent(&self, since: i64, limit: usize) -> Result<Vec<SignedEvent>>;

    /// Number of stored events.
    async fn count(&self) -> Result<u64>;

    // ─────────────────────────────────────────────────────────────────────────
    // Author Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Insert or replace an author's profile.
    async fn upsert_author(&self, profile: &AuthorProfile) -> Result<()>;

    /// Get one author's profile.
    async fn author(&self, did: &Did) -> Result<Option<AuthorProfile>>;

    /// Get profiles for several authors. Unknown authors are absent from the
    /// map.
    async fn authors(&self, dids: &[Did]) -> Result<HashMap<Did, AuthorProfile>>;
}

/// Shared stores are stores, so a service can hold `Arc<dyn EventStore>`
/// chosen at runtime.
#[async_trait]
impl<S: EventStore + ?Sized> EventStore for Arc<S> {
    async fn insert(&self, event: &SignedEvent) -> Result<InsertResult> {
        (**self).insert(event).await
    }

    async fn get(&self, id: &EventId) -> Result<Option<SignedEvent>> {
        (**self).get(id).await
    }

    async fn has(&self, id: &EventId) -> Result<bool> {
        (**self).has(id).await
    }

    async fn by_author(&self, author: &Did, limit: usize) -> Result<Vec<SignedEvent>> {
        (**self).by_author(author, limit).await
    }

    async fn recent(&self, since: i64, limit: usize) -> Result<Vec<SignedEvent>> {
        (**self).recent(since, limit).await
    }

    async fn count(&self) -> Result<u64> {
        (**self).count().await
    }

    async fn upsert_author(&self, profile: &AuthorProfile) -> Result<()> {
        (**self).upsert_author(profile).await
    }

    async fn author(&self, did: &Did) -> Result<Option<AuthorProfile>> {
        (**self).author(did).await
    }

    async fn authors(&self, dids: &[Did]) -> Result<HashMap<Did, AuthorProfile>> {
        (**self).authors(dids).await
    }
}

/// Extension trait for common store patterns.
pub trait EventStoreExt: EventStore {
    /// Fetch recent events together with their authors' profiles.
    fn snapshot(
        &self,
        since: i64,
        limit: usize,
    ) -> impl std::future::Future<Output = Result<Snapshot>> + Send;
}

impl<S: EventStore + ?Sized> EventStoreExt for S {
    async fn snapshot(&self, since: i64, limit: usize) -> Result<Snapshot> {
        let events = self.recent(since, limit).await?;

        let mut dids: Vec<Did> = events.iter().map(|e| e.author().clone()).collect();
        dids.sort();
        dids.dedup();

        let authors = self.authors(&dids).await?;
        Ok(Snapshot { events, authors })
    }
}
