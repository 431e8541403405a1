use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, instrument};
use vitrine_model::{
    ListingRequest, OrderID, OrderListItem, OrderStatus, Page, Pagination,
    SearchTerm,
};

use crate::database::cache::{CacheKeys, ListingEntity};
use crate::database::ports::orders::{OrderListingPort, OrderStatusWritePort};
use crate::database::ports::statistics::{CatalogTable, TableStatisticsPort};
use crate::error::{CatalogError, Result};
use crate::listing::cache_aside::ListingCache;
use crate::listing::count_policy::{self, CountSource};
use crate::listing::{aggregates, mode_label, narrowing};

/// Order listing in ascending id order with per-order line-item totals,
/// plus the status writes that invalidate it.
#[derive(Clone)]
pub struct OrderListingService {
    reads: Arc<dyn OrderListingPort>,
    writes: Arc<dyn OrderStatusWritePort>,
    statistics: Arc<dyn TableStatisticsPort>,
    cache: ListingCache,
}

impl fmt::Debug for OrderListingService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OrderListingService")
            .field("reads", &std::any::type_name_of_val(self.reads.as_ref()))
            .field("writes", &std::any::type_name_of_val(self.writes.as_ref()))
            .field("cache", &self.cache)
            .finish()
    }
}

impl OrderListingService {
    pub fn new(
        reads: Arc<dyn OrderListingPort>,
        writes: Arc<dyn OrderStatusWritePort>,
        statistics: Arc<dyn TableStatisticsPort>,
        cache: ListingCache,
    ) -> Self {
        Self {
            reads,
            writes,
            statistics,
            cache,
        }
    }

    #[instrument(
        name = "orders.list",
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
        request: &ListingRequest<OrderID>,
    ) -> Result<Page<OrderListItem>> {
        let key = CacheKeys::listing_page(ListingEntity::Orders, request);
        self.cache
            .read_through(&key, self.cache.ttls().page, || {
                self.compute(request)
            })
            .await
    }

    async fn compute(
        &self,
        request: &ListingRequest<OrderID>,
    ) -> Result<Page<OrderListItem>> {
        if !request.is_first_page() {
            return Ok(Page::new(self.fetch_page(request).await?, None));
        }

        let (data, count) = tokio::try_join!(
            self.fetch_page(request),
            count_policy::resolve_count(
                &self.cache,
                ListingEntity::Orders,
                request.search.as_ref(),
                self,
            ),
        )?;
        Ok(Page::new(data, Some(count)))
    }

    async fn fetch_page(
        &self,
        request: &ListingRequest<OrderID>,
    ) -> Result<Vec<OrderListItem>> {
        let search = request.search.as_ref();
        let ids = match request.pagination {
            Pagination::Offset { skip } => {
                self.reads
                    .page_ids_by_offset(search, skip, request.limit)
                    .await?
            }
            Pagination::After { cursor } => {
                self.reads
                    .page_ids_after(search, cursor, request.limit)
                    .await?
            }
        };
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let (records, totals) = tokio::try_join!(
            self.reads.hydrate(&ids),
            self.reads.totals_by_order_ids(&ids),
        )?;

        Ok(narrowing::restore_order(&ids, records, |record| record.id)
            .into_iter()
            .map(|record| {
                let order_totals = totals.get(&record.id).copied();
                aggregates::order_item(record, order_totals)
            })
            .collect())
    }

    #[instrument(name = "orders.update_status", skip(self), err)]
    pub async fn update_status(
        &self,
        id: OrderID,
        status: OrderStatus,
    ) -> Result<()> {
        if !self.writes.update_status(id, status).await? {
            return Err(CatalogError::NotFound(format!("order {id}")));
        }
        self.cache.invalidate(ListingEntity::Orders).await;
        Ok(())
    }

    /// Set `status` on every order in `ids`. Unknown ids are ignored; the
    /// number of updated orders is returned.
    #[instrument(
        name = "orders.batch_update_status",
        skip(self, ids),
        fields(requested = ids.len()),
        err
    )]
    pub async fn batch_update_status(
        &self,
        ids: &[OrderID],
        status: OrderStatus,
    ) -> Result<u64> {
        if ids.is_empty() {
            return Ok(0);
        }

        let updated = self.writes.batch_update_status(ids, status).await?;
        if updated > 0 {
            self.cache.invalidate(ListingEntity::Orders).await;
        }
        info!(updated, %status, "Order statuses updated");
        Ok(updated)
    }
}

#[async_trait]
impl CountSource for OrderListingService {
    async fn approximate_count(&self) -> Result<u64> {
        self.statistics
            .approximate_row_count(CatalogTable::Orders)
            .await
    }

    async fn exact_count(&self, search: &SearchTerm) -> Result<u64> {
        self.reads.count_matching(search).await
    }
}
