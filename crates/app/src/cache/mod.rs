//! Read-through cache for catalog reads.
//!
//! Entries are stored under `bazaar:{namespace}:{key}` and are never
//! authoritative: any backend failure degrades to a miss.

use std::{sync::Arc, time::Duration};

mod backend;
mod errors;
mod in_memory;
mod noop;
mod pattern;
mod read_through;

pub use backend::*;
pub use errors::CacheError;
pub use in_memory::MokaCacheBackend;
pub use noop::NoopCacheBackend;
pub use read_through::ReadThroughCache;

/// Prefix applied to every physical cache key.
pub const CACHE_KEY_PREFIX: &str = "bazaar";

/// Default time-to-live for cached entries.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(300);

/// Default maximum number of cached entries.
pub const DEFAULT_CACHE_CAPACITY: u64 = 10_000;

/// Cache construction settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheSettings {
    pub enabled: bool,
    pub ttl: Duration,
    pub max_capacity: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl: DEFAULT_CACHE_TTL,
            max_capacity: DEFAULT_CACHE_CAPACITY,
        }
    }
}

impl ReadThroughCache {
    /// Build the process-wide cache handle from settings.
    #[must_use]
    pub fn from_settings(settings: CacheSettings) -> Self {
        if !settings.enabled {
            return Self::disabled();
        }

        Self::new(
            Arc::new(MokaCacheBackend::new(settings.max_capacity)),
            settings.ttl,
        )
    }
}

pub(crate) fn physical_key(namespace: &str, key: &str) -> String {
    format!("{CACHE_KEY_PREFIX}:{namespace}:{key}")
}
