//! Read-through cache in front of the listing computations.
//!
//! The cache is an optimization only. Every read has a recompute path and
//! every write is best-effort, so a broken or unreachable cache degrades
//! latency and nothing else.

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::{Serialize, de::DeserializeOwned};
use tracing::{debug, warn};

use crate::database::cache::{CacheKeys, ListingEntity};
use crate::database::ports::cache::CacheStore;
use crate::error::Result;

/// Expiry applied to each kind of cached listing value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListingTtls {
    /// Assembled pages.
    pub page: Duration,
    /// Unfiltered counts read from table statistics.
    pub approximate_count: Duration,
    /// Exact counts of a filtered listing.
    pub exact_count: Duration,
}

impl Default for ListingTtls {
    fn default() -> Self {
        Self {
            page: Duration::from_secs(5 * 60),
            approximate_count: Duration::from_secs(30 * 60),
            exact_count: Duration::from_secs(5 * 60),
        }
    }
}

/// Outcome of a single cache read.
#[derive(Debug, Clone, PartialEq)]
pub enum CacheLookup<T> {
    Hit(T),
    /// Absent, expired or undecodable. Safe to overwrite.
    Miss,
    /// The store failed; the caller computes directly and skips the write.
    Unavailable,
}

#[derive(Clone)]
pub struct ListingCache {
    store: Arc<dyn CacheStore>,
    ttls: ListingTtls,
}

impl fmt::Debug for ListingCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListingCache")
            .field("store", &std::any::type_name_of_val(self.store.as_ref()))
            .field("ttls", &self.ttls)
            .finish()
    }
}

impl ListingCache {
    pub fn new(store: Arc<dyn CacheStore>, ttls: ListingTtls) -> Self {
        Self { store, ttls }
    }

    pub fn ttls(&self) -> &ListingTtls {
        &self.ttls
    }

    pub async fn lookup<T>(&self, key: &str) -> CacheLookup<T>
    where
        T: DeserializeOwned,
    {
        match self.store.get(key).await {
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(value) => CacheLookup::Hit(value),
                Err(err) => {
                    warn!(
                        key,
                        error = %err,
                        "Discarding undecodable cache entry"
                    );
                    CacheLookup::Miss
                }
            },
            Ok(None) => CacheLookup::Miss,
            Err(err) => {
                warn!(
                    key,
                    error = %err,
                    "Cache read failed, computing directly"
                );
                CacheLookup::Unavailable
            }
        }
    }

    /// Serialize and store `value`. Failures are logged and dropped.
    pub async fn write<T>(&self, key: &str, value: &T, ttl: Duration)
    where
        T: Serialize + Sync,
    {
        let raw = match serde_json::to_string(value) {
            Ok(raw) => raw,
            Err(err) => {
                warn!(key, error = %err, "Skipping cache write");
                return;
            }
        };

        if let Err(err) = self.store.set(key, &raw, ttl).await {
            warn!(key, error = %err, "Cache write failed");
        }
    }

    /// Return the cached value for `key` or compute, store and return it.
    ///
    /// Only errors from `compute` reach the caller.
    pub async fn read_through<T, F, Fut>(
        &self,
        key: &str,
        ttl: Duration,
        compute: F,
    ) -> Result<T>
    where
        T: Serialize + DeserializeOwned + Send + Sync,
        F: FnOnce() -> Fut + Send,
        Fut: Future<Output = Result<T>> + Send,
    {
        let writable = match self.lookup(key).await {
            CacheLookup::Hit(value) => {
                debug!(key, "Serving listing value from cache");
                return Ok(value);
            }
            CacheLookup::Miss => true,
            CacheLookup::Unavailable => false,
        };

        let value = compute().await?;
        if writable {
            self.write(key, &value, ttl).await;
        }
        Ok(value)
    }

    /// Drop every cached page and count of `entity`. Returns the number of
    /// removed entries, `0` when the store is unreachable.
    pub async fn invalidate(&self, entity: ListingEntity) -> u64 {
        let prefix = CacheKeys::listing_prefix(entity);
        match self.store.delete_prefix(&prefix).await {
            Ok(removed) => {
                debug!(prefix, removed, "Invalidated listing cache");
                removed
            }
            Err(err) => {
                warn!(
                    prefix,
                    error = %err,
                    "Listing cache invalidation failed"
                );
                0
            }
        }
    }

    /// Clear the whole cache namespace. Unlike the request paths, this is
    /// an operator action and reports store failures.
    pub async fn flush(&self) -> Result<u64> {
        self.store.delete_prefix("").await
    }
}
