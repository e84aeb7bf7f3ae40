//! In-memory implementation of the EventStore trait.

use std::cmp::Reverse;
use std::collections::{BTreeSet, HashMap};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use polyverse_core::{AuthorProfile, Did, EventId, SignedEvent};

use crate::error::Result;
use crate::traits::{EventStore, InsertResult};

/// In-memory store.
///
/// Events live in a map keyed by id, with an index ordered newest first and
/// then by id.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<MemoryStoreInner>,
}

#[derive(Default)]
struct MemoryStoreInner {
    events: HashMap<EventId, SignedEvent>,
    by_time: BTreeSet<(Reverse<i64>, EventId)>,
    authors: HashMap<Did, AuthorProfile>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    // Writers never panic mid-update, so a poisoned lock still holds
    // consistent maps.
    fn read(&self) -> RwLockReadGuard<'_, MemoryStoreInner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, MemoryStoreInner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl MemoryStoreInner {
    fn newest_first(&self) -> impl Iterator<Item = &SignedEvent> {
        self.by_time.iter().filter_map(|(_, id)| self.events.get(id))
    }
}

#[async_trait]
impl EventStore for MemoryStore {
    async fn insert(&self, event: &SignedEvent) -> Result<InsertResult> {
        let mut inner = self.write();

        if inner.events.contains_key(&event.id) {
            return Ok(InsertResult::AlreadyExists);
        }

        inner.by_time.insert((Reverse(event.created_at()), event.id.clone()));
        inner.events.insert(event.id.clone(), event.clone());
        Ok(InsertResult::Inserted)
    }

    async fn get(&self, id: &EventId) -> Result<Option<SignedEvent>> {
        Ok(self.read().events.get(id).cloned())
    }

    async fn has(&self, id: &EventId) -> Result<bool> {
        Ok(self.read().events.contains_key(id))
    }

    async fn by_author(&self, author: &Did, limit: usize) -> Result<Vec<SignedEvent>> {
        let inner = self.read();
        Ok(inner
            .newest_first()
            .filter(|e| e.author() == author)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn recent(&self, since: i64, limit: usize) -> Result<Vec<SignedEvent>> {
        let inner = self.read();
        Ok(inner
            .newest_first()
            .filter(|e| e.created_at() >= since)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn count(&self) -> Result<u64> {
        Ok(self.read().events.len() as u64)
    }

    async fn upsert_author(&self, profile: &AuthorProfile) -> Result<()> {
        self.write()
            .authors
            .insert(profile.did.clone(), profile.clone());
        Ok(())
    }

    async fn author(&self, did: &Did) -> Result<Option<AuthorProfile>> {
        Ok(self.read().authors.get(did).cloned())
    }

    async fn authors(&self, dids: &[Did]) -> Result<HashMap<Did, AuthorProfile>> {
        let inner = self.read();
        Ok(dids
            .iter()
            .filter_map(|d| inner.authors.get(d).map(|p| (d.clone(), p.clone())))
            .collect())
    }
}
