//! End-to-end tests: publish through the service, then read feeds,
//! explanations, and labels back.

use polyverse::bundles::MatchedRule;
use polyverse::core::{AuthorProfile, Body, EventContent, Keypair};
use polyverse::store::{EventStore, MemoryStore, SqliteStore};
use polyverse::{
    Algorithm, Did, ExplainQuery, FeedQuery, FeedService, LabelRequest, PublishStatus,
    ServiceConfig, ServiceError, SignedEvent, StaticKeyResolver, StoreBackend, UnsignedEvent,
};

const NOW: i64 = 1_700_000_000;

fn fixed_now() -> i64 {
    NOW
}

struct Author {
    keys: Keypair,
    did: Did,
}

impl Author {
    fn new(seed: u8) -> Self {
        let keys = Keypair::from_seed(&[seed; 32]);
        let did = Did::from_public_key(&keys.public_key());
        Self { keys, did }
    }

    fn post(&self, age_secs: i64, text: &str) -> SignedEvent {
        UnsignedEvent::post(NOW - age_secs, self.did.clone(), text)
            .unwrap()
            .sign(&self.keys)
    }
}

fn service() -> FeedService<MemoryStore> {
    service_with(&ServiceConfig::default())
}

fn service_with(config: &ServiceConfig) -> FeedService<MemoryStore> {
    FeedService::new(MemoryStore::new(), config)
        .unwrap()
        .with_clock(fixed_now)
}

fn texts(page: &polyverse::FeedPage) -> Vec<String> {
    page.items
        .iter()
        .map(|i| i.event.text().unwrap_or_default().to_string())
        .collect()
}

#[tokio::test]
async fn test_publish_then_feed() {
    let svc = service();
    let alice = Author::new(1);
    let bob = Author::new(2);

    let events = vec![
        alice.post(60, "privacy by default"),
        alice.post(120, "decentralized storage notes"),
        bob.post(30, "privacy matters to everyone"),
        bob.post(10, "Buy now limited time offer on privacy tools"),
        bob.post(5, "just some unrelated thoughts"),
    ];
    for event in &events {
        let receipt = svc.publish(event).await.unwrap();
        assert_eq!(receipt.status, PublishStatus::Accepted);
        assert_eq!(receipt.status_code(), 201);
        assert_eq!(receipt.event_id, event.id);
    }

    let again = svc.publish(&events[0]).await.unwrap();
    assert_eq!(again.status, PublishStatus::Duplicate);
    assert_eq!(again.status_code(), 200);
    assert_eq!(svc.store().count().await.unwrap(), 5);

    // default-strict drops the spam pattern and anything off its allow list.
    let page = svc.feed(&FeedQuery::default()).await.unwrap();
    assert_eq!(page.algorithm, Algorithm::TimeDecayDiversity);
    assert_eq!(page.total, 3);
    let shown = texts(&page);
    assert!(!shown.iter().any(|t| t.contains("Buy now")));
    assert!(!shown.iter().any(|t| t.contains("unrelated")));
}

#[tokio::test]
async fn test_rejected_events_are_never_stored() {
    let svc = service();
    let alice = Author::new(3);
    let good = alice.post(10, "privacy first");
    let other = alice.post(20, "privacy second");

    let mut tampered = good.clone();
    tampered.event.created_at += 1;
    let err = svc.publish(&tampered).await.unwrap_err();
    assert!(matches!(err, ServiceError::Verify(_)));
    assert_eq!(err.status_code(), 422);
    assert_eq!(err.code(), "signature_mismatch");

    let mut stale_id = good.clone();
    stale_id.id = other.id.clone();
    let err = svc.publish(&stale_id).await.unwrap_err();
    assert_eq!(err.code(), "identity_mismatch");

    let mallory = Author::new(4);
    let mut wrong_key = mallory.post(10, "privacy first");
    wrong_key.event.author_did = alice.did.clone();
    let err = svc.publish(&wrong_key).await.unwrap_err();
    assert_eq!(err.status_code(), 422);

    let web = UnsignedEvent::post(NOW, "did:web:example.com", "privacy")
        .unwrap()
        .sign(&alice.keys);
    let err = svc.publish(&web).await.unwrap_err();
    assert!(matches!(err, ServiceError::UnresolvableAuthor(_)));

    let err = svc.publish_json(r#"{"id":"x","kind":"post"}"#).await.unwrap_err();
    assert_eq!(err.status_code(), 400);
    assert_eq!(err.code(), "malformed_event");

    let follow_with_body = r#"{"id":"x","kind":"follow","created_at":1,"author_did":"did:key:a","body":{"text":"hi"},"refs":[],"sig":"s"}"#;
    assert_eq!(svc.publish_json(follow_with_body).await.unwrap_err().status_code(), 400);

    assert_eq!(svc.store().count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_static_resolver_accepts_other_did_methods() {
    let alice = Author::new(5);
    let did = Did::new("did:web:alice.example");
    let mut resolver = StaticKeyResolver::new();
    resolver.insert(did.clone(), alice.keys.public_key());

    let svc = service().with_resolver(resolver);
    let event = UnsignedEvent::post(NOW, did, "privacy")
        .unwrap()
        .sign(&alice.keys);
    assert_eq!(svc.publish(&event).await.unwrap().status, PublishStatus::Accepted);
}

#[tokio::test]
async fn test_publish_json_roundtrip() {
    let svc = service();
    let alice = Author::new(6);
    let quote = UnsignedEvent::with_refs(
        NOW - 5,
        alice.did.clone(),
        EventContent::Repost(Some(Body::text("privacy quote").with_media("bafyimage", "image/png"))),
        vec![polyverse::core::EventRef::new("repost", "some-event")],
    )
    .unwrap()
    .sign(&alice.keys);

    let receipt = svc.publish_json(&quote.to_json().unwrap()).await.unwrap();
    assert_eq!(receipt.event_id, quote.id);
    assert_eq!(svc.event(&quote.id).await.unwrap(), quote);
}

#[tokio::test]
async fn test_pages_do_not_tear() {
    let svc = service();
    let authors: Vec<Author> = (10..14).map(Author::new).collect();
    for (i, author) in authors.iter().enumerate() {
        for j in 0..3 {
            let event = author.post((i * 7 + j * 13) as i64 * 60, &format!("privacy note {i}-{j}"));
            svc.publish(&event).await.unwrap();
        }
    }

    for algo in ["time_decay_diversity", "community_weighted", "chronological"] {
        let whole = svc.feed(&FeedQuery::default().algo(algo).limit(50)).await.unwrap();
        assert_eq!(whole.total, 12);

        let mut paged = Vec::new();
        let mut query = FeedQuery::default().algo(algo).limit(5);
        loop {
            let page = svc.feed(&query).await.unwrap();
            paged.extend(page.items.iter().map(|i| i.event.id.clone()));
            match page.next_cursor {
                Some(cursor) => query = query.cursor(cursor.to_string()),
                None => break,
            }
        }
        let expected: Vec<_> = whole.items.iter().map(|i| i.event.id.clone()).collect();
        assert_eq!(paged, expected, "{algo}");
    }
}

#[tokio::test]
async fn test_feed_request_errors() {
    let svc = service();
    let err = svc.feed(&FeedQuery::default().algo("trending")).await.unwrap_err();
    assert_eq!(err.code(), "unknown_algorithm");
    assert_eq!(err.status_code(), 400);

    let err = svc.feed(&FeedQuery::default().limit(0)).await.unwrap_err();
    assert_eq!(err.code(), "invalid_limit");

    let err = svc.feed(&FeedQuery::default().cursor("-3")).await.unwrap_err();
    assert_eq!(err.code(), "invalid_cursor");

    let err = svc.feed(&FeedQuery::default().bundle("missing")).await.unwrap_err();
    assert_eq!(err.status_code(), 404);
}

#[tokio::test]
async fn test_stale_events_excluded_from_time_decay() {
    let svc = service();
    let alice = Author::new(20);
    let stale = alice.post(25 * 3600, "privacy from yesterday");
    let fresh = alice.post(60, "privacy today");
    svc.publish(&stale).await.unwrap();
    svc.publish(&fresh).await.unwrap();

    let page = svc.feed(&FeedQuery::default()).await.unwrap();
    assert_eq!(texts(&page), vec!["privacy today"]);

    let page = svc.feed(&FeedQuery::default().algo("chronological")).await.unwrap();
    assert_eq!(page.total, 2);

    let explanation = svc.explain(&ExplainQuery::new(stale.id.clone())).await.unwrap();
    assert!(explanation.excluded.is_some());
}

#[tokio::test]
async fn test_explain_matches_feed() {
    let svc = service();
    let alice = Author::new(21);
    let bob = Author::new(22);
    for event in [
        alice.post(600, "privacy and decentralized identity"),
        alice.post(1200, "privacy again"),
        bob.post(60, "privacy once"),
    ] {
        svc.publish(&event).await.unwrap();
    }

    let page = svc.feed(&FeedQuery::default()).await.unwrap();
    for item in &page.items {
        let explanation = svc
            .explain(&ExplainQuery::new(item.event.id.clone()))
            .await
            .unwrap();
        assert_eq!(explanation.total_score, item.score);
        assert_eq!(explanation.factors, item.factors);
        assert_eq!(explanation.model_hash, page.model_hash);
    }

    let err = svc
        .explain(&ExplainQuery::new("missing".into()))
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), 404);

    let err = svc
        .explain(&ExplainQuery::new(page.items[0].event.id.clone()).algo("viral"))
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), 400);
}

#[tokio::test]
async fn test_community_weighted_uses_profiles() {
    let svc = service();
    let known = Author::new(30);
    let stranger = Author::new(31);
    svc.upsert_author(&AuthorProfile {
        did: known.did.clone(),
        reputation: 0.9,
        follower_count: 1000,
        verified: true,
    })
    .await
    .unwrap();

    let a = stranger.post(0, "privacy from a stranger");
    let b = known.post(0, "privacy from someone known");
    svc.publish(&a).await.unwrap();
    svc.publish(&b).await.unwrap();

    let page = svc
        .feed(&FeedQuery::default().algo("author_weighted"))
        .await
        .unwrap();
    assert_eq!(page.algorithm, Algorithm::CommunityWeighted);
    assert_eq!(page.items[0].event.id, b.id);
    let expected = 0.9 * 0.6 + 1000.0 * 0.3 + NOW as f64 * 0.1;
    assert!((page.items[0].score - expected).abs() < 1e-3);
}

#[tokio::test]
async fn test_hashtag_feed() {
    let svc = service();
    let alice = Author::new(40);
    svc.publish(&alice.post(10, "privacy tips #security")).await.unwrap();
    svc.publish(&alice.post(20, "privacy and #Rust")).await.unwrap();
    svc.publish(&alice.post(30, "privacy without tags")).await.unwrap();

    let page = svc
        .feed(&FeedQuery::default().hashtag("rust"))
        .await
        .unwrap();
    assert_eq!(texts(&page), vec!["privacy and #Rust"]);
}

#[tokio::test]
async fn test_filters_apply_when_enabled() {
    let mut config = ServiceConfig::default();
    config.moderation.apply_filters = true;
    config.moderation.default_bundle = "family-friendly".into();
    let svc = service_with(&config);

    let parent = Author::new(50);
    svc.publish(&parent.post(10, "learning with the kids")).await.unwrap();

    // Unknown authors fail family-friendly's reputation filter.
    let page = svc.feed(&FeedQuery::default()).await.unwrap();
    assert_eq!(page.total, 0);

    svc.upsert_author(&AuthorProfile {
        did: parent.did.clone(),
        reputation: 0.8,
        follower_count: 3,
        verified: true,
    })
    .await
    .unwrap();
    let page = svc.feed(&FeedQuery::default()).await.unwrap();
    assert_eq!(page.total, 1);
}

#[tokio::test]
async fn test_labels() {
    let svc = service();
    let alice = Author::new(60);

    let decision = svc
        .labels(&LabelRequest::for_content(
            "default-strict",
            "Buy now limited time offer!",
            alice.did.clone(),
        ))
        .await
        .unwrap();
    assert!(!decision.allowed);
    assert_eq!(
        decision.evidence,
        MatchedRule::BlockPattern("buy now|limited time|special offer".into())
    );

    let event = alice.post(10, "Discussion about decentralized systems");
    svc.publish(&event).await.unwrap();
    let decision = svc
        .labels(&LabelRequest::for_event("default-strict", event.id.clone()))
        .await
        .unwrap();
    assert!(decision.allowed);
    assert_eq!(decision.evidence, MatchedRule::AllowKeyword("decentralized".into()));
    assert_eq!(decision.bundle_version, "1.0.0");

    let err = svc
        .labels(&LabelRequest::for_event("nope", event.id.clone()))
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), 404);

    let err = svc
        .labels(&LabelRequest::for_event("default-strict", "missing".into()))
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), 404);

    let err = svc
        .labels(&LabelRequest {
            bundle_id: "default-strict".into(),
            ..Default::default()
        })
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), 400);
}

#[tokio::test]
async fn test_verify_batch() {
    let svc = service();
    let alice = Author::new(70);
    let good = alice.post(1, "privacy one");
    let mut bad = alice.post(2, "privacy two");
    bad.event.content = EventContent::text_post("privacy edited");

    let outcomes = svc
        .verify_batch(vec![good.clone(), bad.clone(), good.clone()])
        .await;
    let valid: Vec<bool> = outcomes.iter().map(|o| o.is_valid()).collect();
    assert_eq!(valid, vec![true, false, true]);
    assert_eq!(outcomes[1].event_id, bad.id);
    assert_eq!(svc.store().count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_author_events_and_health() {
    let svc = service();
    let alice = Author::new(80);
    let bob = Author::new(81);
    for i in 0..3 {
        svc.publish(&alice.post(i * 10, &format!("privacy {i}"))).await.unwrap();
    }
    svc.publish(&bob.post(5, "privacy bob")).await.unwrap();

    let events = svc.author_events(&alice.did, None).await.unwrap();
    let texts: Vec<_> = events.iter().map(|e| e.text().unwrap_or_default()).collect();
    assert_eq!(texts, ["privacy 0", "privacy 1", "privacy 2"]);

    let latest = svc.author_events(&alice.did, Some(1)).await.unwrap();
    assert_eq!(latest.len(), 1);
    assert_eq!(latest[0].created_at(), NOW);

    let health = svc.health().await.unwrap();
    assert_eq!(health.events, 4);
    assert_eq!(health.default_bundle, "default-strict");
    assert_eq!(health.bundles.len(), 3);
    assert_eq!(health.algorithms.len(), 3);
}

#[tokio::test]
async fn test_sqlite_backend_persists() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("feed.db");
    let alice = Author::new(90);
    let event = alice.post(10, "privacy on disk");

    {
        let svc = FeedService::new(SqliteStore::open(&path).unwrap(), &ServiceConfig::default())
            .unwrap()
            .with_clock(fixed_now);
        svc.publish(&event).await.unwrap();
    }

    let mut config = ServiceConfig::default();
    config.store.backend = StoreBackend::Sqlite;
    config.store.path = path.clone();
    let svc = FeedService::from_config(&config).unwrap().with_clock(fixed_now);
    assert_eq!(svc.event(&event.id).await.unwrap(), event);

    let page = svc.feed(&FeedQuery::default()).await.unwrap();
    assert_eq!(texts(&page), vec!["privacy on disk"]);
}
