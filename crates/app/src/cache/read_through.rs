//! Best-effort cache facade used by services.

use std::{fmt, sync::Arc, time::Duration};

use serde::{Serialize, de::DeserializeOwned};
use tracing::{debug, warn};

use crate::cache::{CacheBackend, NoopCacheBackend};

/// Wraps a [`CacheBackend`] so that cache failures never reach callers.
///
/// Reads that fail or cannot be decoded are treated as misses. Writes and
/// invalidations log their failure and carry on.
#[derive(Clone)]
pub struct ReadThroughCache {
    backend: Arc<dyn CacheBackend>,
    ttl: Duration,
}

impl fmt::Debug for ReadThroughCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReadThroughCache")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl ReadThroughCache {
    #[must_use]
    pub fn new(backend: Arc<dyn CacheBackend>, ttl: Duration) -> Self {
        Self { backend, ttl }
    }

    /// A cache that never stores anything.
    #[must_use]
    pub fn disabled() -> Self {
        Self::new(Arc::new(NoopCacheBackend), Duration::ZERO)
    }

    pub async fn fetch<T: DeserializeOwned>(&self, namespace: &str, key: &str) -> Option<T> {
        let value = match self.backend.get(namespace, key).await {
            Ok(Some(value)) => value,
            Ok(None) => {
                debug!(namespace, key, "cache miss");

                return None;
            }
            Err(source) => {
                warn!(namespace, key, "cache read failed: {source}");

                return None;
            }
        };

        match serde_json::from_value(value) {
            Ok(decoded) => {
                debug!(namespace, key, "cache hit");

                Some(decoded)
            }
            Err(source) => {
                warn!(namespace, key, "discarding undecodable cache entry: {source}");

                None
            }
        }
    }

    pub async fn store<T: Serialize + Sync>(&self, namespace: &str, key: &str, value: &T) {
        let value = match serde_json::to_value(value) {
            Ok(value) => value,
            Err(source) => {
                warn!(namespace, key, "failed to encode cache entry: {source}");

                return;
            }
        };

        if let Err(source) = self.backend.set(namespace, key, value, self.ttl).await {
            warn!(namespace, key, "cache write failed: {source}");
        }
    }

    pub async fn invalidate(&self, namespace: &str, key: &str) {
        if let Err(source) = self.backend.delete(namespace, key).await {
            warn!(namespace, key, "cache delete failed: {source}");
        }
    }

    pub async fn invalidate_matching(&self, namespace: &str, pattern: &str) {
        if let Err(source) = self.backend.delete_matching(namespace, pattern).await {
            warn!(namespace, pattern, "cache pattern delete failed: {source}");
        }
    }
}
