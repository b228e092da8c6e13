//! Session storage.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::debug;

use crate::session::UserSession;

/// Where user sessions live between updates.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Snapshot of a user's session.
    async fn get(&self, user_id: i64) -> Option<UserSession>;

    /// Insert or replace a session.
    async fn put(&self, session: UserSession);

    /// Remove one session, returning it.
    async fn expire(&self, user_id: i64) -> Option<UserSession>;

    /// Remove and return every session idle for longer than `timeout`.
    async fn expired(&self, now: DateTime<Utc>, timeout: Duration) -> Vec<UserSession>;

    /// Number of live sessions.
    async fn len(&self) -> usize;
}

/// Process-local session store. Sessions do not survive a restart.
#[derive(Default)]
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<i64, UserSession>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get(&self, user_id: i64) -> Option<UserSession> {
        self.sessions.read().await.get(&user_id).cloned()
    }

    async fn put(&self, session: UserSession) {
        self.sessions.write().await.insert(session.user_id, session);
    }

    async fn expire(&self, user_id: i64) -> Option<UserSession> {
        self.sessions.write().await.remove(&user_id)
    }

    async fn expired(&self, now: DateTime<Utc>, timeout: Duration) -> Vec<UserSession> {
        let mut sessions = self.sessions.write().await;
        let stale: Vec<i64> = sessions
            .values()
            .filter(|s| s.is_expired(now, timeout))
            .map(|s| s.user_id)
            .collect();

        let removed: Vec<UserSession> = stale.iter().filter_map(|id| sessions.remove(id)).collect();
        if !removed.is_empty() {
            debug!(count = removed.len(), remaining = sessions.len(), "Expired sessions");
        }
        removed
    }

    async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}
