//! Cache errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("failed to encode or decode cached value")]
    Serialization(#[from] serde_json::Error),

    #[error("cache backend unavailable: {0}")]
    Unavailable(String),
}
