//! Redis cache backend.
//!
//! The connection is made once at startup and shared by every lookup. A
//! `ConnectionManager` multiplexes commands over that connection and
//! reconnects on its own, so clones can be used from several tasks.

use async_trait::async_trait;
use redis::AsyncCommands;
use redis::aio::ConnectionManager;

use crate::error::{AppError, Result};
use crate::models::{CacheConfig, CachePolicy};
use crate::storage::CacheStore;

/// Redis-backed cache.
#[derive(Clone)]
pub struct RedisCache {
    conn: ConnectionManager,
    policy: CachePolicy,
}

impl RedisCache {
    /// Connect and verify the server answers `PING`.
    ///
    /// Fails with [`AppError::CacheUnavailable`] when the server cannot be
    /// reached within the configured timeout.
    pub async fn connect(config: &CacheConfig) -> Result<Self> {
        let address = config.address();
        log::info!("Connecting to cache at {}", address);

        let client = redis::Client::open(config.url())
            .map_err(|e| AppError::cache_unavailable(&address, e))?;

        let mut conn = tokio::time::timeout(config.timeout(), client.get_connection_manager())
            .await
            .map_err(|_| AppError::cache_unavailable(&address, "connection timed out"))?
            .map_err(|e| AppError::cache_unavailable(&address, e))?;

        let pong: String = tokio::time::timeout(
            config.timeout(),
            redis::cmd("PING").query_async(&mut conn),
        )
        .await
        .map_err(|_| AppError::cache_unavailable(&address, "PING timed out"))?
        .map_err(|e| AppError::cache_unavailable(&address, e))?;

        log::debug!("Cache answered {}", pong);

        Ok(Self {
            conn,
            policy: config.policy.clone(),
        })
    }
}

#[async_trait]
impl CacheStore for RedisCache {
    async fn lookup(&self, key: &str) -> Result<Option<String>> {
        let mut conn = self.conn.clone();
        let value: Option<String> = conn.get(key).await?;
        Ok(value)
    }

    async fn store(&self, key: &str, value: &str) -> bool {
        let mut conn = self.conn.clone();
        let result: redis::RedisResult<()> = match self.policy.ttl_secs {
            Some(ttl) => conn.set_ex(key, value, ttl).await,
            None => conn.set(key, value).await,
        };

        match result {
            Ok(()) => true,
            Err(e) => {
                log::warn!("Cache write failed for '{}': {}", key, e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unreachable_server_is_cache_unavailable() {
        let config = CacheConfig {
            host: "127.0.0.1".to_string(),
            port: 1,
            timeout_secs: 1,
            password_env: "TIMESCHD_TEST_UNSET_PASSWORD".to_string(),
            ..CacheConfig::default()
        };

        let err = match RedisCache::connect(&config).await {
            Ok(_) => panic!("connected to a closed port"),
            Err(e) => e,
        };
        match err {
            AppError::CacheUnavailable { address, .. } => assert_eq!(address, "127.0.0.1:1/0"),
            other => panic!("unexpected error: {other}"),
        }
    }
}
