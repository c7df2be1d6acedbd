//! In-process cache backend built on `moka`.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use moka::{Expiry, future::Cache};
use serde_json::Value;
use tracing::debug;

use crate::cache::{CacheBackend, CacheError, pattern::glob_matches, physical_key};

#[derive(Debug, Clone)]
struct CachedValue {
    value: Value,
    ttl: Duration,
}

/// Expires each entry after the TTL it was stored with.
#[derive(Debug, Clone, Copy)]
struct PerEntryTtl;

impl Expiry<String, CachedValue> for PerEntryTtl {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &CachedValue,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &CachedValue,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

#[derive(Debug, Clone)]
pub struct MokaCacheBackend {
    cache: Cache<String, CachedValue>,
}

impl MokaCacheBackend {
    #[must_use]
    pub fn new(max_capacity: u64) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_capacity)
            .expire_after(PerEntryTtl)
            .build();

        Self { cache }
    }
}

#[async_trait]
impl CacheBackend for MokaCacheBackend {
    async fn get(&self, namespace: &str, key: &str) -> Result<Option<Value>, CacheError> {
        Ok(self
            .cache
            .get(&physical_key(namespace, key))
            .await
            .map(|cached| cached.value))
    }

    async fn set(
        &self,
        namespace: &str,
        key: &str,
        value: Value,
        ttl: Duration,
    ) -> Result<(), CacheError> {
        self.cache
            .insert(physical_key(namespace, key), CachedValue { value, ttl })
            .await;

        Ok(())
    }

    async fn delete(&self, namespace: &str, key: &str) -> Result<(), CacheError> {
        self.cache.invalidate(&physical_key(namespace, key)).await;

        Ok(())
    }

    async fn delete_matching(&self, namespace: &str, pattern: &str) -> Result<u64, CacheError> {
        let prefix = physical_key(namespace, "");

        self.cache.run_pending_tasks().await;

        let matching: Vec<String> = self
            .cache
            .iter()
            .filter_map(|(key, _value)| {
                let logical = key.strip_prefix(prefix.as_str())?;

                glob_matches(pattern, logical).then(|| (*key).clone())
            })
            .collect();

        for key in &matching {
            self.cache.invalidate(key).await;
        }

        debug!(namespace, pattern, removed = matching.len(), "cache keys invalidated");

        Ok(u64::try_from(matching.len()).unwrap_or(u64::MAX))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use testresult::TestResult;

    use super::*;

    const TTL: Duration = Duration::from_secs(60);

    #[tokio::test]
    async fn set_then_get_returns_value() -> TestResult {
        let backend = MokaCacheBackend::new(100);

        backend
            .set("products", "slug:mug", json!({ "name": "Mug" }), TTL)
            .await?;

        let value = backend.get("products", "slug:mug").await?;

        assert_eq!(value, Some(json!({ "name": "Mug" })));

        Ok(())
    }

    #[tokio::test]
    async fn namespaces_do_not_collide() -> TestResult {
        let backend = MokaCacheBackend::new(100);

        backend.set("products", "slug:mug", json!(1), TTL).await?;

        assert_eq!(backend.get("orders", "slug:mug").await?, None);

        Ok(())
    }

    #[tokio::test]
    async fn entries_expire_after_their_ttl() -> TestResult {
        let backend = MokaCacheBackend::new(100);

        backend
            .set("products", "slug:mug", json!(1), Duration::from_millis(20))
            .await?;

        tokio::time::sleep(Duration::from_millis(60)).await;

        assert_eq!(backend.get("products", "slug:mug").await?, None);

        Ok(())
    }

    #[tokio::test]
    async fn delete_removes_single_key() -> TestResult {
        let backend = MokaCacheBackend::new(100);

        backend.set("products", "slug:mug", json!(1), TTL).await?;
        backend.set("products", "slug:cup", json!(2), TTL).await?;

        backend.delete("products", "slug:mug").await?;

        assert_eq!(backend.get("products", "slug:mug").await?, None);
        assert_eq!(backend.get("products", "slug:cup").await?, Some(json!(2)));

        Ok(())
    }

    #[tokio::test]
    async fn delete_matching_only_touches_matching_keys() -> TestResult {
        let backend = MokaCacheBackend::new(100);

        backend
            .set("products", "list:q=all:skip=0:limit=20", json!([]), TTL)
            .await?;
        backend
            .set("products", "list:q=mug:skip=0:limit=20", json!([]), TTL)
            .await?;
        backend.set("products", "slug:mug", json!(1), TTL).await?;
        backend.set("orders", "list:all", json!(1), TTL).await?;

        let removed = backend.delete_matching("products", "list:*").await?;

        assert_eq!(removed, 2);
        assert_eq!(
            backend
                .get("products", "list:q=all:skip=0:limit=20")
                .await?,
            None
        );
        assert_eq!(backend.get("products", "slug:mug").await?, Some(json!(1)));
        assert_eq!(backend.get("orders", "list:all").await?, Some(json!(1)));

        Ok(())
    }
}
