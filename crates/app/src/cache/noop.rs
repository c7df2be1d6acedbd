//! Cache backend used when caching is switched off.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::cache::{CacheBackend, CacheError};

#[derive(Debug, Clone, Copy, Default)]
pub struct NoopCacheBackend;

#[async_trait]
impl CacheBackend for NoopCacheBackend {
    async fn get(&self, _namespace: &str, _key: &str) -> Result<Option<Value>, CacheError> {
        Ok(None)
    }

    async fn set(
        &self,
        _namespace: &str,
        _key: &str,
        _value: Value,
        _ttl: Duration,
    ) -> Result<(), CacheError> {
        Ok(())
    }

    async fn delete(&self, _namespace: &str, _key: &str) -> Result<(), CacheError> {
        Ok(())
    }

    async fn delete_matching(&self, _namespace: &str, _pattern: &str) -> Result<u64, CacheError> {
        Ok(0)
    }
}
