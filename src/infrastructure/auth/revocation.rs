use std::sync::Arc;

use chrono::Utc;
use dashmap::DashMap;
use deadpool_redis::Pool;
use redis::AsyncCommands;

use crate::errors::AuthError;

const SESSION_DENY_PREFIX: &str = "session_deny";

/// Deny-list of logged-out session ids.
///
/// Entries live until the session token would have expired anyway. Redis is
/// used when configured so that every worker and instance sees a logout;
/// otherwise the list is kept in process memory.
#[derive(Clone)]
pub enum RevocationStore {
    Redis(Pool),
    Memory(Arc<DashMap<String, i64>>),
}

impl RevocationStore {
    pub fn in_memory() -> Self {
        RevocationStore::Memory(Arc::new(DashMap::new()))
    }

    fn key(sid: &str) -> String {
        format!("{}:{}", SESSION_DENY_PREFIX, sid)
    }

    pub async fn revoke(&self, sid: &str, ttl_secs: u64) -> Result<(), AuthError> {
        if ttl_secs == 0 {
            return Ok(());
        }

        match self {
            RevocationStore::Redis(pool) => {
                let mut conn = pool
                    .get()
                    .await
                    .map_err(|e| AuthError::RedisConnection(e.to_string()))?;
                let _: () = conn
                    .set_ex(Self::key(sid), 1, ttl_secs)
                    .await
                    .map_err(|e| AuthError::RedisOperation(e.to_string()))?;
            }
            RevocationStore::Memory(map) => {
                let expires_at = Utc::now().timestamp() + i64::try_from(ttl_secs).unwrap_or(i64::MAX / 2);
                map.insert(sid.to_string(), expires_at);
            }
        }

        tracing::debug!(sid, ttl_secs, "session revoked");
        Ok(())
    }

    pub async fn is_revoked(&self, sid: &str) -> Result<bool, AuthError> {
        match self {
            RevocationStore::Redis(pool) => {
                let mut conn = pool
                    .get()
                    .await
                    .map_err(|e| AuthError::RedisConnection(e.to_string()))?;
                let revoked: bool = conn
                    .exists(Self::key(sid))
                    .await
                    .map_err(|e| AuthError::RedisOperation(e.to_string()))?;
                Ok(revoked)
            }
            RevocationStore::Memory(map) => {
                let now = Utc::now().timestamp();
                Ok(map.get(sid).is_some_and(|expires_at| *expires_at > now))
            }
        }
    }

    /// Drops expired in-memory entries; Redis expires its own keys.
    pub fn purge_expired(&self) -> usize {
        match self {
            RevocationStore::Redis(_) => 0,
            RevocationStore::Memory(map) => {
                let now = Utc::now().timestamp();
                let mut purged = 0;
                map.retain(|_, expires_at| {
                    let live = *expires_at > now;
                    purged += usize::from(!live);
                    live
                });
                purged
            }
        }
    }
}
