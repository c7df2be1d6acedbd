//! Cache backend trait.

use std::time::Duration;

use async_trait::async_trait;
use mockall::automock;
use serde_json::Value;

use crate::cache::CacheError;

#[automock]
#[async_trait]
pub trait CacheBackend: Send + Sync {
    /// Look up a value.
    async fn get(&self, namespace: &str, key: &str) -> Result<Option<Value>, CacheError>;

    /// Store a value that expires after `ttl`.
    async fn set(
        &self,
        namespace: &str,
        key: &str,
        value: Value,
        ttl: Duration,
    ) -> Result<(), CacheError>;

    /// Remove a single key.
    async fn delete(&self, namespace: &str, key: &str) -> Result<(), CacheError>;

    /// Remove every key in `namespace` matching a glob pattern, returning how many were removed.
    async fn delete_matching(&self, namespace: &str, pattern: &str) -> Result<u64, CacheError>;
}
