//! Cache Config

use std::time::Duration;

use clap::Args;

use bazaar_app::cache::CacheSettings;

/// Catalog read-through cache settings.
#[derive(Debug, Args)]
pub struct CacheConfig {
    /// Serve catalog reads from the in-process cache
    #[arg(long, env = "CACHE_ENABLED", default_value_t = true)]
    pub cache_enabled: bool,

    /// Lifetime of a cached entry in seconds
    #[arg(long, env = "CACHE_TTL_SECONDS", default_value_t = 300_u64)]
    pub cache_ttl_seconds: u64,

    /// Maximum number of cached entries
    #[arg(long, env = "CACHE_MAX_CAPACITY", default_value_t = 10_000_u64)]
    pub cache_max_capacity: u64,
}

impl CacheConfig {
    #[must_use]
    pub fn settings(&self) -> CacheSettings {
        CacheSettings {
            enabled: self.cache_enabled,
            ttl: Duration::from_secs(self.cache_ttl_seconds),
            max_capacity: self.cache_max_capacity,
        }
    }
}
