//! Chooses between the statistics estimate and an exact filtered count.

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;
use vitrine_model::SearchTerm;

use crate::database::cache::{CacheKeys, ListingEntity};
use crate::error::Result;
use crate::listing::cache_aside::{ListingCache, ListingTtls};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountPolicy {
    /// No filter: the store's maintained row estimate for the paged table.
    Statistics,
    /// Filtered: an exact `COUNT` with the listing's own predicate.
    Exact,
}

impl CountPolicy {
    pub fn for_search(search: Option<&SearchTerm>) -> Self {
        match search {
            Some(_) => CountPolicy::Exact,
            None => CountPolicy::Statistics,
        }
    }

    pub fn ttl(&self, ttls: &ListingTtls) -> Duration {
        match self {
            CountPolicy::Statistics => ttls.approximate_count,
            CountPolicy::Exact => ttls.exact_count,
        }
    }
}

/// The two ways a listing can produce its total.
#[async_trait]
pub trait CountSource: Send + Sync {
    async fn approximate_count(&self) -> Result<u64>;

    async fn exact_count(&self, search: &SearchTerm) -> Result<u64>;
}

/// Resolve the total for `search` through its own count cache entry,
/// independent of the page cache.
pub async fn resolve_count<S>(
    cache: &ListingCache,
    entity: ListingEntity,
    search: Option<&SearchTerm>,
    source: &S,
) -> Result<u64>
where
    S: CountSource + ?Sized,
{
    let policy = CountPolicy::for_search(search);
    let key = CacheKeys::listing_count(entity, search);
    debug!(?policy, key, "Resolving listing count");

    cache
        .read_through(&key, policy.ttl(cache.ttls()), || async move {
            match search {
                Some(term) => source.exact_count(term).await,
                None => source.approximate_count().await,
            }
        })
        .await
}
