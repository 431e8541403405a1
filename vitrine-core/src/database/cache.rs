use std::fmt;
use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use redis::{AsyncCommands, aio::ConnectionManager};
use tracing::{debug, info, warn};
use vitrine_model::{ListingRequest, Pagination, SearchTerm};

use crate::database::ports::cache::CacheStore;
use crate::error::{CatalogError, Result};

const SCAN_BATCH: usize = 200;

/// Connection settings for [`RedisCache`].
#[derive(Debug, Clone)]
pub struct RedisSettings {
    pub url: String,
    /// Prefix applied to every key so several deployments can share one
    /// Redis database.
    pub namespace: String,
    pub connect_timeout: Duration,
    pub response_timeout: Duration,
}

impl RedisSettings {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            namespace: "vitrine-cache".to_string(),
            connect_timeout: Duration::from_secs(2),
            response_timeout: Duration::from_secs(2),
        }
    }
}

#[derive(Clone)]
pub struct RedisCache {
    conn: ConnectionManager,
    namespace: String,
    response_timeout: Duration,
}

impl fmt::Debug for RedisCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisCache")
            .field("connection", &"ConnectionManager")
            .field("namespace", &self.namespace)
            .field("response_timeout", &self.response_timeout)
            .finish()
    }
}

impl RedisCache {
    /// Connect, waiting at most `connect_timeout` for the first connection.
    pub async fn connect(settings: &RedisSettings) -> Result<Self> {
        info!(
            namespace = %settings.namespace,
            "Connecting to Redis cache"
        );

        let client = redis::Client::open(settings.url.as_str())?;

        let conn = tokio::time::timeout(
            settings.connect_timeout,
            ConnectionManager::new(client),
        )
        .await
        .map_err(|_| {
            CatalogError::Cache(format!(
                "Redis connection timed out after {:?}",
                settings.connect_timeout
            ))
        })??;

        info!("Successfully connected to Redis cache");

        Ok(Self {
            conn,
            namespace: settings.namespace.clone(),
            response_timeout: settings.response_timeout,
        })
    }

    fn namespaced(&self, key: &str) -> String {
        format!("{}:{}", self.namespace, key)
    }

    async fn bounded<T, F>(&self, op: &'static str, fut: F) -> Result<T>
    where
        F: Future<Output = redis::RedisResult<T>>,
    {
        match tokio::time::timeout(self.response_timeout, fut).await {
            Ok(result) => result.map_err(|e| {
                CatalogError::Cache(format!("Redis {op} failed: {e}"))
            }),
            Err(_) => Err(CatalogError::Cache(format!(
                "Redis {op} timed out after {:?}",
                self.response_timeout
            ))),
        }
    }
}

#[async_trait]
impl CacheStore for RedisCache {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let key = self.namespaced(key);
        debug!("Cache GET: {}", key);

        let mut conn = self.conn.clone();
        let data: Option<String> =
            self.bounded("GET", conn.get(&key)).await?;

        match data {
            Some(_) => debug!("Cache HIT: {}", key),
            None => debug!("Cache MISS: {}", key),
        }
        Ok(data)
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<()> {
        let key = self.namespaced(key);
        debug!("Cache SET: {} (TTL: {:?})", key, ttl);

        let mut conn = self.conn.clone();
        // SETEX rejects a zero expiry.
        let secs = ttl.as_secs().max(1);
        self.bounded("SETEX", conn.set_ex::<_, _, ()>(&key, value, secs))
            .await
    }

    async fn delete_prefix(&self, prefix: &str) -> Result<u64> {
        let pattern = format!("{}*", escape_glob(&self.namespaced(prefix)));
        debug!("Cache DELETE pattern: {}", pattern);

        let mut conn = self.conn.clone();
        let mut cursor: u64 = 0;
        let mut removed: u64 = 0;
        loop {
            let (next, keys): (u64, Vec<String>) = self
                .bounded(
                    "SCAN",
                    redis::cmd("SCAN")
                        .arg(cursor)
                        .arg("MATCH")
                        .arg(&pattern)
                        .arg("COUNT")
                        .arg(SCAN_BATCH)
                        .query_async(&mut conn),
                )
                .await?;

            if !keys.is_empty() {
                let deleted: u64 =
                    self.bounded("DEL", conn.del(&keys)).await?;
                removed += deleted;
            }

            if next == 0 {
                break;
            }
            cursor = next;
        }

        if removed > 0 {
            warn!("Deleted {} cache keys matching {}", removed, pattern);
        }
        Ok(removed)
    }
}

/// Escape Redis glob metacharacters so a key prefix matches literally.
fn escape_glob(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        if matches!(ch, '*' | '?' | '[' | ']' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

/// Cache store used when no Redis is configured or reachable: every read
/// misses and every write is dropped.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopCache;

#[async_trait]
impl CacheStore for NoopCache {
    async fn get(&self, _key: &str) -> Result<Option<String>> {
        Ok(None)
    }

    async fn set(
        &self,
        _key: &str,
        _value: &str,
        _ttl: Duration,
    ) -> Result<()> {
        Ok(())
    }

    async fn delete_prefix(&self, _prefix: &str) -> Result<u64> {
        Ok(0)
    }
}

/// Listing families sharing the page/count cache layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListingEntity {
    ProductColors,
    Orders,
}

impl ListingEntity {
    pub fn prefix(&self) -> &'static str {
        match self {
            ListingEntity::ProductColors => "product-colors",
            ListingEntity::Orders => "orders",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct CacheKeys;

impl CacheKeys {
    /// Key for one listing page. Every field of the request participates,
    /// and the pagination mode is tagged so offset and cursor requests can
    /// never collide. The free-form search term goes last.
    pub fn listing_page<K: fmt::Display>(
        entity: ListingEntity,
        request: &ListingRequest<K>,
    ) -> String {
        let mode = match &request.pagination {
            Pagination::Offset { skip } => format!("skip={skip}"),
            Pagination::After { cursor } => format!("after={cursor}"),
        };
        format!(
            "{}:v1:page:{}:{}:{}",
            entity.prefix(),
            request.limit,
            mode,
            Self::search_segment(request.search.as_ref())
        )
    }

    /// Key for a listing's total count; shared by every page size and
    /// offset of the same search.
    pub fn listing_count(
        entity: ListingEntity,
        search: Option<&SearchTerm>,
    ) -> String {
        format!(
            "{}:v1:count:{}",
            entity.prefix(),
            Self::search_segment(search)
        )
    }

    /// Prefix matching every page and count key of `entity`.
    pub fn listing_prefix(entity: ListingEntity) -> String {
        format!("{}:", entity.prefix())
    }

    fn search_segment(search: Option<&SearchTerm>) -> String {
        match search {
            Some(term) => format!("q:{term}"),
            None => "all".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn term(raw: &str) -> Option<SearchTerm> {
        SearchTerm::parse(Some(raw))
    }

    #[test]
    fn identical_requests_share_a_key() {
        let a = ListingRequest::<u32>::offset(term("blue"), 12, 24);
        let b = ListingRequest::<u32>::offset(term(" blue "), 12, 24);
        assert_eq!(
            CacheKeys::listing_page(ListingEntity::ProductColors, &a),
            CacheKeys::listing_page(ListingEntity::ProductColors, &b)
        );
    }

    #[test]
    fn every_parameter_changes_the_key() {
        let requests = [
            ListingRequest::<u32>::offset(None, 12, 0),
            ListingRequest::offset(None, 10, 0),
            ListingRequest::offset(None, 12, 12),
            ListingRequest::offset(term("all"), 12, 0),
            ListingRequest::offset(term("blue"), 12, 0),
            ListingRequest::after(None, 12, 0),
            ListingRequest::after(None, 12, 12),
        ];
        let keys: HashSet<String> = requests
            .iter()
            .map(|r| CacheKeys::listing_page(ListingEntity::Orders, r))
            .collect();
        assert_eq!(keys.len(), requests.len());
    }

    #[test]
    fn entities_do_not_share_keys() {
        let request = ListingRequest::<u32>::offset(None, 12, 0);
        assert_ne!(
            CacheKeys::listing_page(ListingEntity::Orders, &request),
            CacheKeys::listing_page(ListingEntity::ProductColors, &request)
        );
        assert_eq!(
            CacheKeys::listing_count(ListingEntity::Orders, None),
            "orders:v1:count:all"
        );
    }

    #[test]
    fn listing_keys_fall_under_their_prefix() {
        let prefix = CacheKeys::listing_prefix(ListingEntity::Orders);
        let request = ListingRequest::<u32>::after(term("ana"), 10, 5);
        assert!(
            CacheKeys::listing_page(ListingEntity::Orders, &request)
                .starts_with(&prefix)
        );
        assert!(
            CacheKeys::listing_count(
                ListingEntity::Orders,
                term("ana").as_ref(),
            )
            .starts_with(&prefix)
        );
    }

    #[test]
    fn glob_metacharacters_are_escaped() {
        assert_eq!(escape_glob("ns:a*b?[c]"), "ns:a\\*b\\?\\[c\\]");
    }
}
