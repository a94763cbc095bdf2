//! Session storage backends
//!
//! `MemoryStore` keeps sessions in process and is meant for development, the
//! CLI and tests. `RedisStore` (see `redis_store`) persists them with a TTL.

use super::SessionContext;
use crate::error::Result;
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// Session store trait for abstracting storage backends
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Get a session by key
    async fn get(&self, session_key: &str) -> Result<Option<SessionContext>>;

    /// Save a session
    async fn save(&self, session: &SessionContext) -> Result<()>;

    /// Delete a session
    async fn delete(&self, session_key: &str) -> Result<bool>;

    /// Check if a session exists
    async fn exists(&self, session_key: &str) -> Result<bool>;

    /// Number of stored sessions
    async fn count(&self) -> Result<usize>;

    /// Remove sessions idle for longer than the TTL
    async fn cleanup_expired(&self) -> Result<usize>;
}

fn is_production() -> bool {
    std::env::var("AGROCAM_ENV")
        .map(|v| v.eq_ignore_ascii_case("production"))
        .unwrap_or(false)
}

/// In-memory session store
pub struct MemoryStore {
    sessions: Arc<RwLock<HashMap<String, SessionContext>>>,
    ttl_hours: i64,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// Create a store with a 24 hour idle TTL
    #[must_use]
    pub fn new() -> Self {
        if is_production() {
            warn!("MemoryStore in production: sessions are lost on restart, configure redis_url");
        }
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            ttl_hours: 24,
        }
    }

    /// Set the idle TTL
    #[must_use]
    pub fn with_ttl_hours(mut self, ttl_hours: i64) -> Self {
        self.ttl_hours = ttl_hours;
        self
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn get(&self, session_key: &str) -> Result<Option<SessionContext>> {
        let sessions = self.sessions.read().await;
        Ok(sessions.get(session_key).cloned())
    }

    async fn save(&self, session: &SessionContext) -> Result<()> {
        let mut sessions = self.sessions.write().await;
        sessions.insert(session.session_key.clone(), session.clone());
        Ok(())
    }

    async fn delete(&self, session_key: &str) -> Result<bool> {
        let mut sessions = self.sessions.write().await;
        Ok(sessions.remove(session_key).is_some())
    }

    async fn exists(&self, session_key: &str) -> Result<bool> {
        let sessions = self.sessions.read().await;
        Ok(sessions.contains_key(session_key))
    }

    async fn count(&self) -> Result<usize> {
        let sessions = self.sessions.read().await;
        Ok(sessions.len())
    }

    async fn cleanup_expired(&self) -> Result<usize> {
        let cutoff = Utc::now() - chrono::Duration::hours(self.ttl_hours);
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, session| session.last_activity > cutoff);
        let removed = before - sessions.len();
        if removed > 0 {
            debug!(removed, remaining = sessions.len(), "Cleaned up expired sessions");
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_store() {
        let store = MemoryStore::new();
        assert_eq!(store.count().await.unwrap(), 0);

        let mut session = SessionContext::new("cli:local:amina");
        session.add_user_message("Quand planter le maïs ?");
        store.save(&session).await.unwrap();

        assert!(store.exists("cli:local:amina").await.unwrap());
        let loaded = store.get("cli:local:amina").await.unwrap().unwrap();
        assert_eq!(loaded.message_count(), 1);

        assert!(store.delete("cli:local:amina").await.unwrap());
        assert!(!store.exists("cli:local:amina").await.unwrap());
        assert!(!store.delete("cli:local:amina").await.unwrap());
    }

    #[tokio::test]
    async fn test_cleanup_expired() {
        let store = MemoryStore::new().with_ttl_hours(1);
        let mut stale = SessionContext::new("old");
        stale.last_activity = Utc::now() - chrono::Duration::hours(2);
        store.save(&stale).await.unwrap();
        store.save(&SessionContext::new("fresh")).await.unwrap();

        assert_eq!(store.cleanup_expired().await.unwrap(), 1);
        assert!(store.exists("fresh").await.unwrap());
        assert!(!store.exists("old").await.unwrap());
    }
}
