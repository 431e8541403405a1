use std::time::Duration;

use async_trait::async_trait;

use crate::error::Result;

/// Minimal key/value surface the listing layer needs from a distributed
/// cache. Values are opaque serialized strings; every call is fallible and
/// callers decide how to absorb failures.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Single-key, single-value write with an expiry. Last write wins.
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<()>;

    /// Remove every key starting with `prefix` and report how many were
    /// removed. An empty prefix clears the whole namespace.
    async fn delete_prefix(&self, prefix: &str) -> Result<u64>;
}
