use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::instrument;
use vitrine_model::{
    ListingRequest, Page, Pagination, ProductColorID, ProductColorListItem,
    SearchTerm,
};

use crate::database::cache::{CacheKeys, ListingEntity};
use crate::database::ports::product_colors::ProductColorsRepository;
use crate::database::ports::statistics::{CatalogTable, TableStatisticsPort};
use crate::error::Result;
use crate::listing::cache_aside::ListingCache;
use crate::listing::count_policy::{self, CountSource};
use crate::listing::{aggregates, mode_label, narrowing};

/// Catalog listing: product colors ordered by product name, each with its
/// product, color and cheapest SKU price.
#[derive(Clone)]
pub struct ProductColorListingService {
    repository: Arc<dyn ProductColorsRepository>,
    statistics: Arc<dyn TableStatisticsPort>,
    cache: ListingCache,
}

impl fmt::Debug for ProductColorListingService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProductColorListingService")
            .field(
                "repository",
                &std::any::type_name_of_val(self.repository.as_ref()),
            )
            .field("cache", &self.cache)
            .finish()
    }
}

impl ProductColorListingService {
    pub fn new(
        repository: Arc<dyn ProductColorsRepository>,
        statistics: Arc<dyn TableStatisticsPort>,
        cache: ListingCache,
    ) -> Self {
        Self {
            repository,
            statistics,
            cache,
        }
    }

    #[instrument(
        name = "product_colors.list",
        skip(self, request),
        fields(
            limit = request.limit,
            mode = mode_label(&request.pagination),
            filtered = request.is_filtered(),
        ),
        err
    )]
    pub async fn list(
        &self,
        request: &ListingRequest<ProductColorID>,
    ) -> Result<Page<ProductColorListItem>> {
        let key =
            CacheKeys::listing_page(ListingEntity::ProductColors, request);
        self.cache
            .read_through(&key, self.cache.ttls().page, || {
                self.compute(request)
            })
            .await
    }

    async fn compute(
        &self,
        request: &ListingRequest<ProductColorID>,
    ) -> Result<Page<ProductColorListItem>> {
        if !request.is_first_page() {
            return Ok(Page::new(self.fetch_page(request).await?, None));
        }

        let (data, count) = tokio::try_join!(
            self.fetch_page(request),
            count_policy::resolve_count(
                &self.cache,
                ListingEntity::ProductColors,
                request.search.as_ref(),
                self,
            ),
        )?;
        Ok(Page::new(data, Some(count)))
    }

    async fn fetch_page(
        &self,
        request: &ListingRequest<ProductColorID>,
    ) -> Result<Vec<ProductColorListItem>> {
        let search = request.search.as_ref();
        let ids = match request.pagination {
            Pagination::Offset { skip } => {
                self.repository
                    .page_ids_by_offset(search, skip, request.limit)
                    .await?
            }
            Pagination::After { cursor } => {
                self.repository
                    .page_ids_after(search, cursor, request.limit)
                    .await?
            }
        };
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let (records, prices) = tokio::try_join!(
            self.repository.hydrate(&ids),
            self.repository.min_prices(&ids),
        )?;

        Ok(narrowing::restore_order(&ids, records, |record| record.id)
            .into_iter()
            .map(|record| {
                let price = prices.get(&record.id).copied();
                aggregates::product_color_item(record, price)
            })
            .collect())
    }
}

#[async_trait]
impl CountSource for ProductColorListingService {
    async fn approximate_count(&self) -> Result<u64> {
        self.statistics
            .approximate_row_count(CatalogTable::ProductColors)
            .await
    }

    async fn exact_count(&self, search: &SearchTerm) -> Result<u64> {
        self.repository.count_matching(search).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listing::ListingTtls;
    use crate::testing::{InMemoryCatalog, MemoryCache};

    async fn seeded() -> (Arc<InMemoryCatalog>, Arc<MemoryCache>) {
        let catalog = Arc::new(InMemoryCatalog::new());
        for (code, name) in [("B-1", "Boot"), ("A-1", "Anorak"), ("C-1", "Cap")]
        {
            let product = catalog.add_product(code, name).await;
            for color in ["Red", "Blue"] {
                let pc = catalog.add_product_color(&product, color).await;
                catalog.add_sku(pc, "M", 30.0).await;
                catalog.add_sku(pc, "L", 20.0).await;
            }
        }
        (catalog, Arc::new(MemoryCache::new()))
    }

    fn service(
        catalog: &Arc<InMemoryCatalog>,
        cache: &Arc<MemoryCache>,
    ) -> ProductColorListingService {
        ProductColorListingService::new(
            catalog.clone(),
            catalog.clone(),
            ListingCache::new(cache.clone(), ListingTtls::default()),
        )
    }

    #[tokio::test]
    async fn offset_pages_follow_product_name() {
        let (catalog, cache) = seeded().await;
        let page = service(&catalog, &cache)
            .list(&ListingRequest::offset(None, 4, 0))
            .await
            .unwrap();

        let names: Vec<&str> =
            page.data.iter().map(|i| i.product.name.as_str()).collect();
        assert_eq!(names, ["Anorak", "Anorak", "Boot", "Boot"]);
        assert!(page.data.iter().all(|item| item.price == 20.0));
        assert_eq!(page.count, Some(6));
    }

    #[tokio::test]
    async fn product_color_without_skus_is_priced_zero() {
        let (catalog, cache) = seeded().await;
        let product = catalog.add_product("D-1", "Duffel").await;
        let bare = catalog.add_product_color(&product, "Green").await;

        let term = SearchTerm::parse(Some("duffel"));
        let page = service(&catalog, &cache)
            .list(&ListingRequest::offset(term, 10, 0))
            .await
            .unwrap();

        assert_eq!(page.len(), 1);
        assert_eq!(page.data[0].id, bare);
        assert_eq!(page.data[0].price, 0.0);
        assert_eq!(page.count, Some(1));
    }

    #[tokio::test]
    async fn filtered_first_page_uses_exact_count() {
        let (catalog, cache) = seeded().await;
        let term = SearchTerm::parse(Some("bo"));
        let page = service(&catalog, &cache)
            .list(&ListingRequest::offset(term, 12, 0))
            .await
            .unwrap();

        assert_eq!(page.len(), 2);
        assert_eq!(page.count, Some(2));
        assert_eq!(catalog.exact_count_calls(), 1);
        assert_eq!(catalog.approximate_count_calls(), 0);
    }
}
