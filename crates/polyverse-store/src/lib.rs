//! # Polyverse Store
//!
//! Storage abstraction for Polyverse events and author profiles, with SQLite
//! and in-memory implementations.
//!
//! ## Key Types
//!
//! - [`EventStore`] - The async trait for all storage operations
//! - [`SqliteStore`] - SQLite-based persistent storage
//! - [`MemoryStore`] - In-memory storage
//! - [`Snapshot`] - A candidate set with author profiles, for ranking
//!
//! ## Usage
//!
//! ```rust,no_run
//! use polyverse_store::{EventStore, EventStoreExt, SqliteStore};
//!
//! async fn example() {
//!     let store = SqliteStore::open("polyverse.db").unwrap();
//!
//!     // let event: SignedEvent = ...;  (verified)
//!     // store.insert(&event).await.unwrap();
//!
//!     let snapshot = store.snapshot(0, 500).await.unwrap();
//!     println!("{} candidates", snapshot.events.len());
//! }
//! ```
//!
//! ## Design Notes
//!
//! - **Verified input only**: the store does not check signatures
//! - **Idempotent inserts**: inserting the same id twice returns `AlreadyExists`
//! - **Newest first**: time-ordered reads break timestamp ties by id

pub mod error;
pub mod memory;
pub mod migration;
pub mod sqlite;
pub mod traits;

pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use traits::{EventStore, EventStoreExt, InsertResult, Snapshot};
