//! Key-value cache backends for directory lookups.
//!
//! Values are JSON text stored under plain string keys:
//!
//! ```text
//! "CAROL ZANDER" -> {"teacher":[{"email":"...","phone":"..."}],"cache":false}
//! ```
//!
//! - `RedisCache`: network cache, connected once at startup
//! - `MemoryCache`: in-process map, for tests and offline runs

pub mod memory;
pub mod redis_cache;

use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};

use crate::error::Result;

// Re-export for convenience
pub use memory::MemoryCache;
pub use redis_cache::RedisCache;

/// Trait for cache backends.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Read the raw value stored under `key`.
    async fn lookup(&self, key: &str) -> Result<Option<String>>;

    /// Write `value` under `key`; returns whether the write succeeded.
    async fn store(&self, key: &str, value: &str) -> bool;
}

/// Read and decode a JSON value.
pub async fn lookup_json<T: DeserializeOwned>(
    cache: &dyn CacheStore,
    key: &str,
) -> Result<Option<T>> {
    match cache.lookup(key).await? {
        Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
        None => Ok(None),
    }
}

/// Encode and write a JSON value.
///
/// Returns the encoded text when the write succeeded.
pub async fn store_json<T: Serialize + ?Sized>(
    cache: &dyn CacheStore,
    key: &str,
    value: &T,
) -> Result<Option<String>> {
    let encoded = serde_json::to_string(value)?;
    if cache.store(key, &encoded).await {
        Ok(Some(encoded))
    } else {
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DirectoryResponse;

    #[tokio::test]
    async fn test_json_round_trip() {
        let cache = MemoryCache::new();
        let response: DirectoryResponse =
            serde_json::from_str(r#"{"teacher":[{"email":"czander@uw.edu"}],"cache":false}"#)
                .unwrap();

        let encoded = store_json(&cache, "CAROL ZANDER", &response)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(cache.lookup("CAROL ZANDER").await.unwrap(), Some(encoded));

        let decoded: DirectoryResponse = lookup_json(&cache, "CAROL ZANDER")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(decoded, response);
    }

    #[tokio::test]
    async fn test_store_json_reports_failed_write() {
        let cache = MemoryCache::read_only();
        let stored = store_json(&cache, "k", &serde_json::json!({"a": 1}))
            .await
            .unwrap();
        assert!(stored.is_none());
        assert!(lookup_json::<serde_json::Value>(&cache, "k").await.unwrap().is_none());
    }
}
