//! SQLite implementation of the EventStore trait.
//!
//! This is the primary storage backend. It uses rusqlite with bundled SQLite,
//! wrapped in async via `tokio::task::spawn_blocking`.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};

use polyverse_core::{
    AuthorProfile, Body, Did, EventContent, EventId, EventKind, EventRef, SignedEvent,
    UnsignedEvent,
};

use crate::error::{Result, StoreError};
use crate::migration::{self, now_secs};
use crate::traits::{EventStore, InsertResult};

const EVENT_COLUMNS: &str = "event_id, kind, created_at, author_did, body, refs, sig";

/// SQLite-based store.
///
/// Thread-safe via an internal Mutex. All operations run on the blocking
/// pool.
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open a SQLite database at the given path, creating and migrating it as
    /// needed.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let mut conn = Connection::open(path)?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open an in-memory SQLite database.
    pub fn open_memory() -> Result<Self> {
        let mut conn = Connection::open_in_memory()?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run a closure against the connection on the blocking pool.
    async fn run<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let mut conn = conn.lock().map_err(|e| {
                StoreError::Database(rusqlite::Error::SqliteFailure(
                    rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_LOCKED),
                    Some(format!("mutex poisoned: {e}")),
                ))
            })?;
            f(&mut *conn)
        })
        .await
        .map_err(|e| {
            StoreError::Database(rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_ERROR),
                Some(format!("spawn_blocking failed: {e}")),
            ))
        })?
    }
}

/// An `events` row before it is checked back into a [`SignedEvent`].
struct EventRow {
    event_id: String,
    kind: String,
    created_at: i64,
    author_did: String,
    body: Option<Vec<u8>>,
    refs: Vec<u8>,
    sig: String,
}

fn read_event_row(row: &Row<'_>) -> rusqlite::Result<EventRow> {
    Ok(EventRow {
        event_id: row.get("event_id")?,
        kind: row.get("kind")?,
        created_at: row.get("created_at")?,
        author_did: row.get("author_did")?,
        body: row.get("body")?,
        refs: row.get("refs")?,
        sig: row.get("sig")?,
    })
}

impl TryFrom<EventRow> for SignedEvent {
    type Error = StoreError;

    fn try_from(row: EventRow) -> Result<Self> {
        let kind: EventKind = row
            .kind
            .parse()
            .map_err(|e| StoreError::InvalidData(format!("event {}: {e}", row.event_id)))?;
        let body = row.body.as_deref().map(decode_body).transpose()?;
        let refs = decode_refs(&row.refs)?;

        let content = EventContent::from_parts(kind, body)
            .map_err(|e| StoreError::InvalidData(format!("event {}: {e}", row.event_id)))?;
        let event = UnsignedEvent::with_refs(row.created_at, row.author_did, content, refs)
            .map_err(|e| StoreError::InvalidData(format!("event {}: {e}", row.event_id)))?;

        Ok(SignedEvent {
            id: EventId::from(row.event_id),
            sig: row.sig,
            event,
        })
    }
}

fn encode_body(body: &Body) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    ciborium::into_writer(body, &mut buf).map_err(|e| StoreError::Serialization(e.to_string()))?;
    Ok(buf)
}

fn decode_body(bytes: &[u8]) -> Result<Body> {
    ciborium::from_reader(bytes).map_err(|e| StoreError::Serialization(e.to_string()))
}

fn encode_refs(refs: &[EventRef]) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    ciborium::into_writer(refs, &mut buf).map_err(|e| StoreError::Serialization(e.to_string()))?;
    Ok(buf)
}

fn decode_refs(bytes: &[u8]) -> Result<Vec<EventRef>> {
    ciborium::from_reader(bytes).map_err(|e| StoreError::Serialization(e.to_string()))
}

fn query_events(
    conn: &Connection,
    sql: &str,
    params: impl rusqlite::Params,
) -> Result<Vec<SignedEvent>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map(params, read_event_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    rows.into_iter().map(SignedEvent::try_from).collect()
}

fn sql_limit(limit: usize) -> i64 {
    i64::try_from(limit).unwrap_or(i64::MAX)
}

fn read_author_row(row: &Row<'_>) -> rusqlite::Result<AuthorProfile> {
    let did: String = row.get("did")?;
    let followers: i64 = row.get("follower_count")?;
    Ok(AuthorProfile {
        did: Did::new(did),
        reputation: row.get("reputation")?,
        follower_count: u64::try_from(followers).unwrap_or(0),
        verified: row.get("verified")?,
    })
}

#[async_trait]
impl EventStore for SqliteStore {
    async fn insert(&self, event: &SignedEvent) -> Result<InsertResult> {
        let event = event.clone();

        self.run(move |conn| {
            let body = event.event.body().map(encode_body).transpose()?;
            let refs = encode_refs(&event.event.refs)?;

            let changed = conn.execute(
                "INSERT OR IGNORE INTO events (
                    event_id, kind, created_at, author_did, body, refs, sig, ingested_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    event.id.as_str(),
                    event.kind().as_str(),
                    event.created_at(),
                    event.author().as_str(),
                    body,
                    refs,
                    event.sig,
                    now_secs(),
                ],
            )?;

            Ok(if changed == 0 {
                InsertResult::AlreadyExists
            } else {
                InsertResult::Inserted
            })
        })
        .await
    }

    async fn get(&self, id: &EventId) -> Result<Option<SignedEvent>> {
        let id = id.clone();

        self.run(move |conn| {
            let row = conn
                .query_row(
                    &format!("SELECT {EVENT_COLUMNS} FROM events WHERE event_id = ?1"),
                    params![id.as_str()],
                    read_event_row,
                )
                .optional()?;
            row.map(SignedEvent::try_from).transpose()
        })
        .await
    }

    async fn has(&self, id: &EventId) -> Result<bool> {
        let id = id.clone();

        self.run(move |conn| {
            let found: Option<i64> = conn
                .query_row(
                    "SELECT 1 FROM events WHERE event_id = ?1",
                    params![id.as_str()],
                    |row| row.get(0),
                )
                .optional()?;
            Ok(found.is_some())
        })
        .await
    }

    async fn by_author(&self, author: &Did, limit: usize) -> Result<Vec<SignedEvent>> {
        let author = author.clone();

        self.run(move |conn| {
            query_events(
                conn,
                &format!(
                    "SELECT {EVENT_COLUMNS} FROM events WHERE author_did = ?1
                     ORDER BY created_at DESC, event_id ASC LIMIT ?2"
                ),
                params![author.as_str(), sql_limit(limit)],
            )
        })
        .await
    }

    async fn recent(&self, since: i64, limit: usize) -> Result<Vec<SignedEvent>> {
        self.run(move |conn| {
            query_events(
                conn,
                &format!(
                    "SELECT {EVENT_COLUMNS} FROM events WHERE created_at >= ?1
                     ORDER BY created_at DESC, event_id ASC LIMIT ?2"
                ),
                params![since, sql_limit(limit)],
            )
        })
        .await
    }

    async fn count(&self) -> Result<u64> {
        self.run(|conn| {
            let n: i64 = conn.query_row("SELECT COUNT(*) FROM events", [], |row| row.get(0))?;
            Ok(u64::try_from(n).unwrap_or(0))
        })
        .await
    }

    async fn upsert_author(&self, profile: &AuthorProfile) -> Result<()> {
        let profile = profile.clone();

        self.run(move |conn| {
            conn.execute(
                "INSERT INTO authors (did, reputation, follower_count, verified, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 ON CONFLICT(did) DO UPDATE SET
                    reputation = excluded.reputation,
                    follower_count = excluded.follower_count,
                    verified = excluded.verified,
                    updated_at = excluded.updated_at",
                params![
                    profile.did.as_str(),
                    profile.reputation,
                    i64::try_from(profile.follower_count).unwrap_or(i64::MAX),
                    profile.verified,
                    now_secs(),
                ],
            )?;
            Ok(())
        })
        .await
    }

    async fn author(&self, did: &Did) -> Result<Option<AuthorProfile>> {
        let did = did.clone();

        self.run(move |conn| {
            conn.query_row(
                "SELECT did, reputation, follower_count, verified FROM authors WHERE did = ?1",
                params![did.as_str()],
                read_author_row,
            )
            .optional()
            .map_err(StoreError::from)
        })
        .await
    }

    async fn authors(&self, dids: &[Did]) -> Result<HashMap<Did, AuthorProfile>> {
        if dids.is_empty() {
            return Ok(HashMap::new());
        }
        let dids: Vec<String> = dids.iter().map(|d| d.as_str().to_string()).collect();

        self.run(move |conn| {
            let placeholders = vec!["?"; dids.len()].join(", ");
            let mut stmt = conn.prepare(&format!(
                "SELECT did, reputation, follower_count, verified FROM authors
                 WHERE did IN ({placeholders})"
            ))?;
            let profiles = stmt
                .query_map(params_from_iter(dids.iter()), read_author_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(profiles.into_iter().map(|p| (p.did.clone(), p)).collect())
        })
        .await
    }
}
