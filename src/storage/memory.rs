//! In-process cache backend.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::Result;
use crate::storage::CacheStore;

/// Map-backed cache. Entries live as long as the value.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, String>>,
    read_only: bool,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// A cache whose writes always fail.
    pub fn read_only() -> Self {
        Self {
            entries: Mutex::default(),
            read_only: true,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl CacheStore for MemoryCache {
    async fn lookup(&self, key: &str) -> Result<Option<String>> {
        let entries = match self.entries.lock() {
            Ok(entries) => entries,
            Err(poisoned) => poisoned.into_inner(),
        };
        Ok(entries.get(key).cloned())
    }

    async fn store(&self, key: &str, value: &str) -> bool {
        if self.read_only {
            return false;
        }
        match self.entries.lock() {
            Ok(mut entries) => {
                entries.insert(key.to_string(), value.to_string());
                true
            }
            Err(_) => false,
        }
    }
}
