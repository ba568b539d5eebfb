//! Session Store — pluggable registry of live document sessions.
//!
//! Default: `InMemorySessionStore`. State lives only for the lifetime of the
//! process; nothing is persisted. Sessions idle for longer than the TTL are
//! dropped, and the number of live sessions is capped.
//!
//! `AppState` holds an `Arc<dyn SessionStore>`. Each session sits behind its own
//! `Mutex`, so one request mutates and recomputes a document atomically while
//! requests for other documents proceed.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use tokio::sync::{Mutex, RwLock};
use tokio::time::Instant;
use tracing::debug;
use uuid::Uuid;

use crate::session::coordinator::DocumentSession;

/// A session plus bookkeeping the engine itself does not care about.
#[derive(Debug)]
pub struct StoredSession {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub document: DocumentSession,
}

impl StoredSession {
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

pub type SharedSession = Arc<Mutex<StoredSession>>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("session limit of {limit} reached")]
    Full { limit: usize },
}

// ────────────────────────────────────────────────────────────────────────────
// Trait definition
// ────────────────────────────────────────────────────────────────────────────

#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Registers a new session and returns its handle.
    async fn insert(&self, document: DocumentSession) -> Result<SharedSession, StoreError>;

    /// Looks up a live session. Counts as activity for expiry.
    async fn get(&self, id: Uuid) -> Option<SharedSession>;

    /// Returns true if a session was removed.
    async fn remove(&self, id: Uuid) -> bool;

    /// Drops idle sessions; returns how many were dropped.
    async fn evict_expired(&self) -> usize;

    async fn len(&self) -> usize;
}

// ────────────────────────────────────────────────────────────────────────────
// InMemorySessionStore
// ────────────────────────────────────────────────────────────────────────────

struct Entry {
    session: SharedSession,
    last_seen: Instant,
}

pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<Uuid, Entry>>,
    ttl: Duration,
    max_sessions: usize,
}

impl InMemorySessionStore {
    pub fn new(ttl: Duration, max_sessions: usize) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            ttl,
            max_sessions,
        }
    }

    fn is_expired(&self, entry: &Entry, now: Instant) -> bool {
        now.duration_since(entry.last_seen) >= self.ttl
    }

    fn sweep(&self, sessions: &mut HashMap<Uuid, Entry>, now: Instant) -> usize {
        let before = sessions.len();
        sessions.retain(|_, entry| !self.is_expired(entry, now));
        before - sessions.len()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn insert(&self, document: DocumentSession) -> Result<SharedSession, StoreError> {
        let now = Instant::now();
        let mut sessions = self.sessions.write().await;
        if sessions.len() >= self.max_sessions {
            self.sweep(&mut sessions, now);
            if sessions.len() >= self.max_sessions {
                return Err(StoreError::Full {
                    limit: self.max_sessions,
                });
            }
        }

        let created = Utc::now();
        let id = Uuid::new_v4();
        let session = Arc::new(Mutex::new(StoredSession {
            id,
            created_at: created,
            updated_at: created,
            document,
        }));
        sessions.insert(
            id,
            Entry {
                session: Arc::clone(&session),
                last_seen: now,
            },
        );
        Ok(session)
    }

    async fn get(&self, id: Uuid) -> Option<SharedSession> {
        let now = Instant::now();
        let mut sessions = self.sessions.write().await;
        let expired = self.is_expired(sessions.get(&id)?, now);
        if expired {
            sessions.remove(&id);
            debug!(session = %id, "Session expired");
            return None;
        }
        let entry = sessions.get_mut(&id)?;
        entry.last_seen = now;
        Some(Arc::clone(&entry.session))
    }

    async fn remove(&self, id: Uuid) -> bool {
        self.sessions.write().await.remove(&id).is_some()
    }

    async fn evict_expired(&self) -> usize {
        let mut sessions = self.sessions.write().await;
        self.sweep(&mut sessions, Instant::now())
    }

    async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}
