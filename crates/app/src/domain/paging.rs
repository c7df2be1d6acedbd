//! Offset pagination shared by list operations.

use serde::{Deserialize, Serialize};

/// A window into an ordered result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub skip: u32,
    pub limit: u32,
}

impl Page {
    #[must_use]
    pub const fn new(skip: u32, limit: u32) -> Self {
        Self { skip, limit }
    }

    /// Build a page from optional request values, defaulting and clamping the limit into
    /// `1..=max_limit`.
    #[must_use]
    pub fn clamped(skip: Option<u32>, limit: Option<u32>, default_limit: u32, max_limit: u32) -> Self {
        Self {
            skip: skip.unwrap_or(0),
            limit: limit.unwrap_or(default_limit).clamp(1, max_limit.max(1)),
        }
    }

    pub(crate) fn offset(self) -> i64 {
        i64::from(self.skip)
    }

    pub(crate) fn row_limit(self) -> i64 {
        i64::from(self.limit)
    }
}
