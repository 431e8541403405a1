use std::sync::Arc;

use anyhow::{Context, anyhow};
use tracing::{info, warn};
use vitrine_config::{Config, ListingConfig};
use vitrine_core::database::ports::cache::CacheStore;
use vitrine_core::database::{
    NoopCache, PoolSettings, PostgresDatabase, RedisCache, RedisSettings,
};
use vitrine_core::{AppUnitOfWork, ListingCache, ListingTtls};

use crate::infra::app_state::AppState;

pub fn listing_ttls(listing: &ListingConfig) -> ListingTtls {
    ListingTtls {
        page: listing.cache_ttl,
        approximate_count: listing.count_cache_ttl,
        exact_count: listing.cache_ttl,
    }
}

pub async fn connect_database(
    config: &Config,
) -> anyhow::Result<PostgresDatabase> {
    let url = config.database.primary_url.as_deref().ok_or_else(|| {
        anyhow!("no database configured; set DATABASE_URL or DB_HOST")
    })?;
    let settings = PoolSettings {
        max_connections: config.database.max_connections,
        min_connections: config.database.min_connections,
        ..PoolSettings::default()
    };
    PostgresDatabase::new(url, settings)
        .await
        .context("failed to connect to PostgreSQL")
}

/// Connect the listing cache store. Redis being absent or unreachable is not
/// fatal: the server runs on [`NoopCache`] and computes every listing.
pub async fn connect_cache(config: &Config) -> (Arc<dyn CacheStore>, bool) {
    let Some(redis) = config.redis.as_ref() else {
        info!("Redis not configured; listing cache disabled");
        return (Arc::new(NoopCache), false);
    };

    let settings = RedisSettings {
        url: redis.url.clone(),
        namespace: redis.namespace.clone(),
        connect_timeout: redis.connect_timeout,
        response_timeout: redis.response_timeout,
    };
    match RedisCache::connect(&settings).await {
        Ok(cache) => (Arc::new(cache), true),
        Err(e) => {
            warn!(error = %e, "Redis unavailable; listing cache disabled");
            (Arc::new(NoopCache), false)
        }
    }
}

pub async fn listing_cache(config: &Config) -> (ListingCache, bool) {
    let (store, enabled) = connect_cache(config).await;
    (ListingCache::new(store, listing_ttls(&config.listing)), enabled)
}

pub async fn build_state(
    config: &Config,
) -> anyhow::Result<(AppState, PostgresDatabase)> {
    let postgres = connect_database(config).await?;
    let unit_of_work = AppUnitOfWork::from_postgres(&postgres)
        .map_err(|e| anyhow!("failed to wire repositories: {e}"))?;
    let (cache, cache_enabled) = listing_cache(config).await;

    let state = AppState::new(
        unit_of_work,
        cache,
        config.listing.clone(),
        config.cors.clone(),
        cache_enabled,
    );
    Ok((state, postgres))
}
