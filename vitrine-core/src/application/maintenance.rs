use std::fmt;
use std::sync::Arc;

use tracing::info;

use crate::database::ports::maintenance::{
    MaintenancePort, QueryPlan, TableActivity,
};
use crate::database::ports::statistics::CatalogTable;
use crate::error::Result;
use crate::listing::cache_aside::ListingCache;

/// Plans of the listing hot paths and the live-tuple view of the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostics {
    pub plans: Vec<QueryPlan>,
    pub activity: Vec<TableActivity>,
}

/// Operator tasks against the store: refreshing the statistics the
/// unfiltered counts read and explaining the hot queries.
#[derive(Clone)]
pub struct StoreMaintenance {
    port: Arc<dyn MaintenancePort>,
}

impl fmt::Debug for StoreMaintenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreMaintenance")
            .field("port", &std::any::type_name_of_val(self.port.as_ref()))
            .finish()
    }
}

impl StoreMaintenance {
    pub fn new(port: Arc<dyn MaintenancePort>) -> Self {
        Self { port }
    }

    pub async fn analyze_tables(&self) -> Result<Vec<CatalogTable>> {
        self.port.analyze(&CatalogTable::ALL).await?;
        info!("Refreshed statistics for {} tables", CatalogTable::ALL.len());
        Ok(CatalogTable::ALL.to_vec())
    }

    pub async fn diagnose(&self) -> Result<Diagnostics> {
        let plans = self.port.explain_hot_queries().await?;
        let activity = self.port.table_activity(&CatalogTable::ALL).await?;
        Ok(Diagnostics { plans, activity })
    }
}

/// Operator tasks against the listing cache. Needs no database.
#[derive(Debug, Clone)]
pub struct CacheMaintenance {
    cache: ListingCache,
}

impl CacheMaintenance {
    pub fn new(cache: ListingCache) -> Self {
        Self { cache }
    }

    /// Drops every listing entry. Unlike listing reads, a cache failure
    /// here is reported to the caller.
    pub async fn flush(&self) -> Result<u64> {
        let removed = self.cache.flush().await?;
        info!("Flushed {} cache entries", removed);
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::ports::cache::CacheStore;
    use crate::database::ports::statistics::TableStatisticsPort;
    use crate::listing::ListingTtls;
    use crate::testing::{FailingCache, InMemoryCatalog, MemoryCache};

    #[tokio::test]
    async fn analyze_refreshes_stale_estimates() {
        let catalog = Arc::new(InMemoryCatalog::new());
        catalog.add_order(None, vitrine_model::OrderStatus::Pending).await;
        catalog.set_row_estimate(CatalogTable::Orders, 500).await;
        let maintenance = StoreMaintenance::new(catalog.clone());

        maintenance.analyze_tables().await.unwrap();

        assert_eq!(catalog.analyzed_tables().await, CatalogTable::ALL.to_vec());
        assert_eq!(
            catalog
                .approximate_row_count(CatalogTable::Orders)
                .await
                .unwrap(),
            1
        );
    }

    #[tokio::test]
    async fn diagnose_covers_every_table() {
        let catalog = Arc::new(InMemoryCatalog::new());
        let report = StoreMaintenance::new(catalog).diagnose().await.unwrap();
        assert_eq!(report.activity.len(), CatalogTable::ALL.len());
        assert!(!report.plans.is_empty());
    }

    #[tokio::test]
    async fn flush_removes_listing_entries() {
        let store = Arc::new(MemoryCache::new());
        let ttl = std::time::Duration::from_secs(60);
        store.set("product_colors:a", "[]", ttl).await.unwrap();
        store.set("orders:b", "[]", ttl).await.unwrap();
        let cache = ListingCache::new(store.clone(), ListingTtls::default());

        let removed = CacheMaintenance::new(cache).flush().await.unwrap();

        assert_eq!(removed, 2);
        assert_eq!(store.get("orders:b").await.unwrap(), None);
    }

    #[tokio::test]
    async fn flush_reports_cache_failures() {
        let cache = ListingCache::new(
            Arc::new(FailingCache::default()),
            ListingTtls::default(),
        );
        assert!(CacheMaintenance::new(cache).flush().await.is_err());
    }
}
