use crate::application::maintenance::StoreMaintenance;
use crate::application::unit_of_work::AppUnitOfWork;
use crate::listing::cache_aside::ListingCache;
use crate::listing::{OrderListingService, ProductColorListingService};

/// Application services wired over one unit of work and one listing cache.
#[derive(Debug, Clone)]
pub struct CatalogServices {
    pub product_colors: ProductColorListingService,
    pub orders: OrderListingService,
    pub maintenance: StoreMaintenance,
}

impl CatalogServices {
    pub fn new(uow: &AppUnitOfWork, cache: ListingCache) -> Self {
        Self {
            product_colors: ProductColorListingService::new(
                uow.product_colors.clone(),
                uow.statistics.clone(),
                cache.clone(),
            ),
            orders: OrderListingService::new(
                uow.orders_read.clone(),
                uow.orders_write.clone(),
                uow.statistics.clone(),
                cache,
            ),
            maintenance: StoreMaintenance::new(uow.maintenance.clone()),
        }
    }
}
