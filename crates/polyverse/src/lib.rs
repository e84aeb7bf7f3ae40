//! # Polyverse
//!
//! The feed service for Polyverse: signed, content-addressed social events
//! published by independent clients, moderated by declarative bundles, and
//! ranked by interchangeable algorithms.
//!
//! ## Pipeline
//!
//! - **Publish**: schema check, author key resolution, signature and id
//!   verification, then an idempotent store insert. A rejected event is
//!   never written.
//! - **Feed**: snapshot recent events, drop what the bundle rejects, rank,
//!   paginate.
//! - **Explain**: replay the ranking score for one event.
//! - **Labels**: the moderation decision for one event or inline content,
//!   with the rule that decided it.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use polyverse::{FeedQuery, FeedService, ServiceConfig};
//! use polyverse::core::{Did, Keypair, UnsignedEvent};
//! use polyverse::store::MemoryStore;
//!
//! async fn example() -> polyverse::Result<()> {
//!     let service = FeedService::new(MemoryStore::new(), &ServiceConfig::default())?;
//!
//!     let keypair = Keypair::generate();
//!     let author = Did::from_public_key(&keypair.public_key());
//!     let event = UnsignedEvent::post(1_700_000_000, author, "privacy matters")?.sign(&keypair);
//!
//!     let receipt = service.publish(&event).await?;
//!     assert_eq!(receipt.status_code(), 201);
//!
//!     let page = service.feed(&FeedQuery::default().algo("chronological")).await?;
//!     for item in page.items {
//!         println!("{} {}", item.score, item.event.id);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Re-exports
//!
//! - `polyverse::core` - Events, canonical form, keys, identity
//! - `polyverse::store` - Event storage (SQLite and in-memory)
//! - `polyverse::bundles` - Moderation bundles
//! - `polyverse::feed` - Ranking and explanations

pub mod api;
pub mod config;
pub mod error;
pub mod logging;
pub mod resolver;
pub mod service;

// Re-export component crates
pub use polyverse_bundles as bundles;
pub use polyverse_core as core;
pub use polyverse_feed as feed;
pub use polyverse_store as store;

pub use api::{
    ExplainQuery, FeedQuery, Health, LabelDecision, LabelRequest, PublishReceipt, PublishStatus,
    VerifyOutcome,
};
pub use config::{
    load_config, ConfigError, FeedConfig, LoggingConfig, ModerationConfig, ServiceConfig,
    StoreBackend, StoreConfig,
};
pub use error::{Result, ServiceError};
pub use logging::init_tracing;
pub use resolver::{DidKeyResolver, KeyResolver, StaticKeyResolver};
pub use service::{open_store, Clock, FeedService, DEFAULT_AUTHOR_EVENTS};

// Re-export commonly used types
pub use polyverse_core::{Did, EventId, EventKind, Keypair, SignedEvent, UnsignedEvent};
pub use polyverse_feed::{Algorithm, FeedPage, RankingExplanation};
