// src/services/enrichment.rs

//! Instructor enrichment with a cache-aside directory lookup.

use std::sync::Arc;

use crate::error::{AppError, Result};
use crate::models::{CachePolicy, DirectoryResponse, Instructor};
use crate::services::DirectoryApi;
use crate::storage::{CacheStore, lookup_json, store_json};
use crate::utils::Retry;

/// Resolves instructor names to contact details, preferring the cache.
pub struct InstructorEnricher {
    cache: Arc<dyn CacheStore>,
    directory: Arc<dyn DirectoryApi>,
    policy: CachePolicy,
    retry: Retry,
}

impl InstructorEnricher {
    pub fn new(
        cache: Arc<dyn CacheStore>,
        directory: Arc<dyn DirectoryApi>,
        policy: CachePolicy,
        retry: Retry,
    ) -> Self {
        Self {
            cache,
            directory,
            policy,
            retry,
        }
    }

    /// Look up a name, consulting the cache before the directory.
    ///
    /// A cached entry comes back with `cache = Some(true)`. On a miss the
    /// directory is queried; a usable answer is stamped `cache = Some(false)`
    /// and written back. An unusable answer (error or no teacher entries) is
    /// returned unchanged and never cached.
    pub async fn get_data(&self, first_name: &str, last_name: &str) -> Result<DirectoryResponse> {
        let key = self.policy.key(first_name, last_name);

        let cached: Option<DirectoryResponse> = self
            .retry
            .run(AppError::is_transient, || {
                lookup_json::<DirectoryResponse>(self.cache.as_ref(), &key)
            })
            .await?;

        if let Some(mut data) = cached {
            log::info!("Data for '{}' already exists in cache", key);
            data.cache = Some(true);
            return Ok(data);
        }

        log::info!("Data for '{}' does not exist in cache", key);
        let mut data = self
            .retry
            .run(AppError::is_transient, || {
                self.directory.fetch(first_name, last_name)
            })
            .await?;

        if data.is_usable() {
            data.cache = Some(false);
            if let Some(encoded) = store_json(self.cache.as_ref(), &key, &data).await? {
                log::info!("Added data for '{}' to cache", key);
                return Ok(serde_json::from_str(&encoded)?);
            }
        }

        log::debug!("Data for {} {}: {:?}", first_name, last_name, data);
        Ok(data)
    }

    /// Fill in email and phone for a parsed instructor.
    ///
    /// Directory misses leave the contact fields unset. Names without both a
    /// first and a last part are not looked up.
    pub async fn enrich(&self, instructor: &mut Instructor) -> Result<()> {
        if !instructor.is_resolved() {
            if !instructor.is_unset() {
                log::debug!("Skipping directory lookup for '{}'", instructor.full_name());
            }
            return Ok(());
        }

        let data = self
            .get_data(&instructor.first_name, &instructor.last_name)
            .await?;

        match data.primary_contact() {
            Some(contact) => {
                instructor.email = contact.email.clone();
                instructor.phone_number = contact.phone.clone();
            }
            None => log::debug!("No directory entry for {}", instructor.full_name()),
        }
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;

    use crate::storage::MemoryCache;

    /// Directory double that answers from a fixed JSON body.
    pub(crate) struct FakeDirectory {
        pub body: String,
        pub calls: AtomicUsize,
    }

    impl FakeDirectory {
        pub(crate) fn new(body: &str) -> Self {
            Self {
                body: body.to_string(),
                calls: AtomicUsize::new(0),
            }
        }

        pub(crate) fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl DirectoryApi for FakeDirectory {
        async fn fetch(&self, _first: &str, _last: &str) -> Result<DirectoryResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(serde_json::from_str(&self.body)?)
        }
    }

    pub(crate) const ZANDER: &str =
        r#"{"teacher":[{"email":"czander@uw.edu","phone":"206-555-0100"}]}"#;

    pub(crate) fn enricher(
        cache: Arc<dyn CacheStore>,
        directory: Arc<dyn DirectoryApi>,
    ) -> InstructorEnricher {
        InstructorEnricher::new(
            cache,
            directory,
            CachePolicy::default(),
            Retry::new(1, Duration::ZERO, 1.0),
        )
    }

    #[tokio::test]
    async fn test_cache_round_trip_flips_flag() {
        let cache = Arc::new(MemoryCache::new());
        let directory = Arc::new(FakeDirectory::new(ZANDER));
        let enricher = enricher(cache.clone(), directory.clone());

        let first = enricher.get_data("CAROL", "ZANDER").await.unwrap();
        assert_eq!(first.cache, Some(false));

        let second = enricher.get_data("CAROL", "ZANDER").await.unwrap();
        assert!(second.from_cache());
        assert!(!first.from_cache());
        assert_eq!(directory.calls(), 1);

        let mut expected = second.clone();
        expected.cache = Some(false);
        assert_eq!(first, expected);
    }

    #[tokio::test]
    async fn test_stored_value_matches_returned() {
        let cache = Arc::new(MemoryCache::new());
        let enricher = enricher(cache.clone(), Arc::new(FakeDirectory::new(ZANDER)));

        let returned = enricher.get_data("CAROL", "ZANDER").await.unwrap();
        let raw = cache.lookup("CAROL ZANDER").await.unwrap().unwrap();
        assert_eq!(raw, serde_json::to_string(&returned).unwrap());
    }

    #[tokio::test]
    async fn test_error_response_is_not_cached() {
        let cache = Arc::new(MemoryCache::new());
        let directory = Arc::new(FakeDirectory::new(r#"{"error":"not found"}"#));
        let enricher = enricher(cache.clone(), directory.clone());

        let data = enricher.get_data("JOHN", "SMITH").await.unwrap();
        assert!(data.error.is_some());
        assert_eq!(data.cache, None);
        assert!(cache.is_empty());

        enricher.get_data("JOHN", "SMITH").await.unwrap();
        assert_eq!(directory.calls(), 2);
    }

    #[tokio::test]
    async fn test_failed_write_returns_fresh_response() {
        let enricher = enricher(
            Arc::new(MemoryCache::read_only()),
            Arc::new(FakeDirectory::new(ZANDER)),
        );

        let data = enricher.get_data("CAROL", "ZANDER").await.unwrap();
        assert!(data.is_usable());
        assert_eq!(data.cache, Some(false));
    }

    #[tokio::test]
    async fn test_enrich_sets_contact() {
        let enricher = enricher(
            Arc::new(MemoryCache::new()),
            Arc::new(FakeDirectory::new(ZANDER)),
        );
        let mut instructor = Instructor::from_cell_text("ZANDER,CAROL ANN");

        enricher.enrich(&mut instructor).await.unwrap();
        assert_eq!(instructor.email.as_deref(), Some("czander@uw.edu"));
        assert_eq!(instructor.phone_number.as_deref(), Some("206-555-0100"));
        assert_eq!(instructor.middle_name.as_deref(), Some("ANN"));
    }

    #[tokio::test]
    async fn test_enrich_miss_leaves_contact_unset() {
        let enricher = enricher(
            Arc::new(MemoryCache::new()),
            Arc::new(FakeDirectory::new(r#"{"error":"not found"}"#)),
        );
        let mut instructor = Instructor::from_cell_text("SMITH,JOHN");

        enricher.enrich(&mut instructor).await.unwrap();
        assert_eq!(instructor.email, None);
        assert_eq!(instructor.phone_number, None);
    }

    #[tokio::test]
    async fn test_enrich_skips_unset_instructor() {
        let directory = Arc::new(FakeDirectory::new(ZANDER));
        let enricher = enricher(Arc::new(MemoryCache::new()), directory.clone());

        enricher.enrich(&mut Instructor::default()).await.unwrap();
        assert_eq!(directory.calls(), 0);
    }

    #[tokio::test]
    async fn test_enrich_skips_placeholder_name() {
        let cache = Arc::new(MemoryCache::new());
        let directory = Arc::new(FakeDirectory::new(ZANDER));
        let enricher = enricher(cache.clone(), directory.clone());
        let mut instructor = Instructor::from_cell_text("STAFF");

        enricher.enrich(&mut instructor).await.unwrap();
        assert_eq!(instructor.last_name, "STAFF");
        assert_eq!(instructor.email, None);
        assert_eq!(directory.calls(), 0);
        assert!(cache.is_empty());
    }
}
