//! Redis-backed session store

use super::{SessionContext, SessionStore};
use crate::error::{Error, Result};
use async_trait::async_trait;
use tracing::debug;

/// Key prefix of stored sessions
pub const DEFAULT_PREFIX: &str = "agrocam:session:";

/// Sessions serialized as JSON under `agrocam:session:<key>`, expired by Redis
pub struct RedisStore {
    client: redis::Client,
    prefix: String,
    ttl_seconds: u64,
}

impl RedisStore {
    /// Connect lazily to `redis_url` with a 24 hour TTL
    pub fn new(redis_url: &str) -> Result<Self> {
        Self::with_options(redis_url, DEFAULT_PREFIX, 24 * 3600)
    }

    /// Custom prefix and TTL
    pub fn with_options(redis_url: &str, prefix: &str, ttl_seconds: u64) -> Result<Self> {
        let client = redis::Client::open(redis_url).map_err(|e| Error::Session(e.to_string()))?;
        Ok(Self {
            client,
            prefix: prefix.to_string(),
            ttl_seconds,
        })
    }

    fn build_key(&self, session_key: &str) -> String {
        format!("{}{}", self.prefix, session_key)
    }

    async fn connection(&self) -> Result<redis::aio::MultiplexedConnection> {
        self.client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| Error::Session(format!("Redis connection failed: {}", e)))
    }
}

#[async_trait]
impl SessionStore for RedisStore {
    async fn get(&self, session_key: &str) -> Result<Option<SessionContext>> {
        let mut conn = self.connection().await?;
        let data: Option<String> = redis::cmd("GET")
            .arg(self.build_key(session_key))
            .query_async(&mut conn)
            .await
            .map_err(|e| Error::Session(format!("Redis GET failed: {}", e)))?;

        data.map(|json| {
            serde_json::from_str(&json)
                .map_err(|e| Error::Internal(format!("Failed to deserialize session: {}", e)))
        })
        .transpose()
    }

    async fn save(&self, session: &SessionContext) -> Result<()> {
        let mut conn = self.connection().await?;
        let json = serde_json::to_string(session)
            .map_err(|e| Error::Internal(format!("Failed to serialize session: {}", e)))?;

        redis::cmd("SETEX")
            .arg(self.build_key(&session.session_key))
            .arg(self.ttl_seconds)
            .arg(&json)
            .query_async::<()>(&mut conn)
            .await
            .map_err(|e| Error::Session(format!("Redis SETEX failed: {}", e)))?;

        debug!(session_key = %session.session_key, ttl = self.ttl_seconds, "Session saved to Redis");
        Ok(())
    }

    async fn delete(&self, session_key: &str) -> Result<bool> {
        let mut conn = self.connection().await?;
        let deleted: i64 = redis::cmd("DEL")
            .arg(self.build_key(session_key))
            .query_async(&mut conn)
            .await
            .map_err(|e| Error::Session(format!("Redis DEL failed: {}", e)))?;
        Ok(deleted > 0)
    }

    async fn exists(&self, session_key: &str) -> Result<bool> {
        let mut conn = self.connection().await?;
        let exists: i64 = redis::cmd("EXISTS")
            .arg(self.build_key(session_key))
            .query_async(&mut conn)
            .await
            .map_err(|e| Error::Session(format!("Redis EXISTS failed: {}", e)))?;
        Ok(exists > 0)
    }

    async fn count(&self) -> Result<usize> {
        let mut conn = self.connection().await?;
        let keys: Vec<String> = redis::cmd("KEYS")
            .arg(format!("{}*", self.prefix))
            .query_async(&mut conn)
            .await
            .map_err(|e| Error::Session(format!("Redis KEYS failed: {}", e)))?;
        Ok(keys.len())
    }

    async fn cleanup_expired(&self) -> Result<usize> {
        // SETEX expires keys on the server
        Ok(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_url_is_rejected() {
        assert!(matches!(
            RedisStore::new("not a url"),
            Err(Error::Session(_))
        ));
    }

    #[test]
    fn test_key_prefix() {
        let store = RedisStore::new("redis://127.0.0.1:6379").unwrap();
        assert_eq!(store.build_key("api:web:u1"), "agrocam:session:api:web:u1");
    }

    // Requires a running Redis: cargo test --features redis-tests
    #[cfg(feature = "redis-tests")]
    #[tokio::test]
    async fn test_redis_round_trip() {
        let store = RedisStore::new("redis://127.0.0.1:6379").unwrap();
        let mut session = SessionContext::new("test:redis:key");
        session.add_user_message("Bonjour");
        store.save(&session).await.unwrap();

        let loaded = store.get("test:redis:key").await.unwrap().unwrap();
        assert_eq!(loaded.message_count(), 1);
        assert!(store.delete("test:redis:key").await.unwrap());
    }
}
