//! Test fixtures and helpers.
//!
//! A fixture is one author: a seeded keypair, its `did:key` handle, and a
//! private store. Events are built directly from their fields and signed, so
//! every `make_*` helper yields a well-formed event.

use polyverse_core::{
    Body, Did, EventContent, EventId, EventRef, Keypair, PublicKey, SignedEvent, UnsignedEvent,
};
use polyverse_store::{EventStore, MemoryStore, Result};

/// A fixed instant (2023-11-14T22:13:20Z) for deterministic timestamps.
pub const FIXTURE_TIME: i64 = 1_700_000_000;

/// A test author with a keypair and memory store.
pub struct TestFixture {
    pub keypair: Keypair,
    pub did: Did,
    pub store: MemoryStore,
}

impl TestFixture {
    /// Create a new test fixture with a random keypair.
    pub fn new() -> Self {
        Self::from_keypair(Keypair::generate())
    }

    /// Create with a deterministic keypair from seed.
    pub fn with_seed(seed: [u8; 32]) -> Self {
        Self::from_keypair(Keypair::from_seed(&seed))
    }

    fn from_keypair(keypair: Keypair) -> Self {
        let did = Did::from_public_key(&keypair.public_key());
        Self {
            keypair,
            did,
            store: MemoryStore::new(),
        }
    }

    pub fn public_key(&self) -> PublicKey {
        self.keypair.public_key()
    }

    /// Sign arbitrary content as this author.
    pub fn sign(&self, created_at: i64, content: EventContent, refs: Vec<EventRef>) -> SignedEvent {
        UnsignedEvent {
            created_at,
            author_did: self.did.clone(),
            content,
            refs,
        }
        .sign(&self.keypair)
    }

    /// Create a text post.
    pub fn make_post(&self, created_at: i64, text: &str) -> SignedEvent {
        self.sign(created_at, EventContent::text_post(text), Vec::new())
    }

    /// Create a text post with one attachment.
    pub fn make_media_post(&self, created_at: i64, text: &str, cid: &str, mime: &str) -> SignedEvent {
        let body = Body::text(text).with_media(cid, mime);
        self.sign(created_at, EventContent::Post(Some(body)), Vec::new())
    }

    /// Create a reply to another event.
    pub fn make_reply(&self, created_at: i64, parent: &EventId, text: &str) -> SignedEvent {
        self.sign(
            created_at,
            EventContent::text_post(text),
            vec![EventRef::new("reply", parent.as_str())],
        )
    }

    /// Create a repost, quoting when `quote` is given.
    pub fn make_repost(&self, created_at: i64, target: &EventId, quote: Option<&str>) -> SignedEvent {
        self.sign(
            created_at,
            EventContent::Repost(quote.map(Body::text)),
            vec![EventRef::new("repost", target.as_str())],
        )
    }

    /// Create a like.
    pub fn make_like(&self, created_at: i64, target: &EventId) -> SignedEvent {
        self.sign(
            created_at,
            EventContent::Like,
            vec![EventRef::new("like", target.as_str())],
        )
    }

    /// Create a follow.
    pub fn make_follow(&self, created_at: i64, target: &Did) -> SignedEvent {
        self.sign(
            created_at,
            EventContent::Follow,
            vec![EventRef::new("follow", target.as_str())],
        )
    }

    /// Create a profile update.
    pub fn make_profile(&self, created_at: i64, bio: &str) -> SignedEvent {
        self.sign(created_at, EventContent::Profile(Some(Body::text(bio))), Vec::new())
    }

    /// Insert events into this fixture's store.
    pub async fn store_all(&self, events: &[SignedEvent]) -> Result<()> {
        for event in events {
            self.store.insert(event).await?;
        }
        Ok(())
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Create multiple test fixtures for multi-party tests.
pub fn multi_party_fixtures(count: usize) -> Vec<TestFixture> {
    (0..count)
        .map(|i| {
            let mut seed = [0u8; 32];
            seed[0] = i as u8;
            TestFixture::with_seed(seed)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use polyverse_core::{validate_unsigned, EventKind};

    #[test]
    fn test_fixture_events_are_well_formed() {
        let fixture = TestFixture::with_seed([3; 32]);
        let post = fixture.make_post(FIXTURE_TIME, "hello");
        let events = vec![
            fixture.make_media_post(FIXTURE_TIME, "pic", "bafy", "image/png"),
            fixture.make_reply(FIXTURE_TIME + 1, &post.id, "re"),
            fixture.make_repost(FIXTURE_TIME + 2, &post.id, None),
            fixture.make_repost(FIXTURE_TIME + 3, &post.id, Some("quoted")),
            fixture.make_like(FIXTURE_TIME + 4, &post.id),
            fixture.make_follow(FIXTURE_TIME + 5, &Did::new("did:web:example.com")),
            fixture.make_profile(FIXTURE_TIME + 6, "bio"),
            post,
        ];

        for event in &events {
            assert!(validate_unsigned(&event.event).is_ok());
            assert!(event.verify(&fixture.public_key()), "{:?}", event.kind());
            assert_eq!(event.author(), &fixture.did);
        }
        assert_eq!(events[4].kind(), EventKind::Like);
        assert!(events[1].references(events[7].id.as_str()));
    }

    #[test]
    fn test_seeded_fixtures_are_stable() {
        let a = TestFixture::with_seed([5; 32]);
        let b = TestFixture::with_seed([5; 32]);
        assert_eq!(a.did, b.did);
        assert_eq!(a.make_post(FIXTURE_TIME, "x").id, b.make_post(FIXTURE_TIME, "x").id);
    }

    #[tokio::test]
    async fn test_store_all_is_idempotent() {
        let fixture = TestFixture::new();
        let post = fixture.make_post(FIXTURE_TIME, "once");

        fixture.store_all(&[post.clone(), post.clone()]).await.unwrap();
        assert_eq!(fixture.store.count().await.unwrap(), 1);
        assert!(fixture.store.has(&post.id).await.unwrap());
    }

    #[test]
    fn test_multi_party() {
        let parties = multi_party_fixtures(3);

        // Each party has unique keys
        let dids: Vec<_> = parties.iter().map(|p| p.did.clone()).collect();
        assert_ne!(dids[0], dids[1]);
        assert_ne!(dids[1], dids[2]);
        assert_ne!(dids[0], dids[2]);
    }
}
