use std::{fmt, sync::Arc};

use vitrine_config::{CorsConfig, ListingConfig};
use vitrine_core::{AppUnitOfWork, CatalogServices, ListingCache};

use crate::handlers::params::LimitBounds;

#[derive(Clone)]
pub struct AppState {
    pub unit_of_work: Arc<AppUnitOfWork>,
    pub services: Arc<CatalogServices>,
    pub listing: Arc<ListingConfig>,
    pub cors: Arc<CorsConfig>,
    /// False when running on the no-op cache store.
    pub cache_enabled: bool,
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState")
            .field("cache_enabled", &self.cache_enabled)
            .finish_non_exhaustive()
    }
}

impl AppState {
    pub fn new(
        unit_of_work: AppUnitOfWork,
        cache: ListingCache,
        listing: ListingConfig,
        cors: CorsConfig,
        cache_enabled: bool,
    ) -> Self {
        let services = CatalogServices::new(&unit_of_work, cache);
        Self {
            unit_of_work: Arc::new(unit_of_work),
            services: Arc::new(services),
            listing: Arc::new(listing),
            cors: Arc::new(cors),
            cache_enabled,
        }
    }

    pub fn unit_of_work(&self) -> &AppUnitOfWork {
        &self.unit_of_work
    }

    pub fn product_color_limits(&self) -> LimitBounds {
        LimitBounds {
            default: self.listing.product_colors_default_limit,
            max: self.listing.max_limit,
        }
    }

    pub fn order_limits(&self) -> LimitBounds {
        LimitBounds {
            default: self.listing.orders_default_limit,
            max: self.listing.max_limit,
        }
    }
}
