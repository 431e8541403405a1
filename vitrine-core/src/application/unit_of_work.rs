use std::any::type_name_of_val;
use std::fmt;
use std::sync::Arc;

use crate::database::ports::{
    maintenance::MaintenancePort,
    orders::{OrderListingPort, OrderStatusWritePort},
    product_colors::ProductColorsRepository,
    statistics::TableStatisticsPort,
};
use crate::database::postgres::PostgresDatabase;

/// Aggregates all repository ports used by application services.
#[derive(Clone)]
pub struct AppUnitOfWork {
    pub product_colors: Arc<dyn ProductColorsRepository>,
    pub orders_read: Arc<dyn OrderListingPort>,
    pub orders_write: Arc<dyn OrderStatusWritePort>,
    pub statistics: Arc<dyn TableStatisticsPort>,
    pub maintenance: Arc<dyn MaintenancePort>,
}

impl fmt::Debug for AppUnitOfWork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppUnitOfWork")
            .field(
                "product_colors",
                &type_name_of_val(self.product_colors.as_ref()),
            )
            .field("orders_read", &type_name_of_val(self.orders_read.as_ref()))
            .field(
                "orders_write",
                &type_name_of_val(self.orders_write.as_ref()),
            )
            .field("statistics", &type_name_of_val(self.statistics.as_ref()))
            .field(
                "maintenance",
                &type_name_of_val(self.maintenance.as_ref()),
            )
            .finish()
    }
}

#[derive(Default)]
pub struct AppUnitOfWorkBuilder {
    product_colors: Option<Arc<dyn ProductColorsRepository>>,
    orders_read: Option<Arc<dyn OrderListingPort>>,
    orders_write: Option<Arc<dyn OrderStatusWritePort>>,
    statistics: Option<Arc<dyn TableStatisticsPort>>,
    maintenance: Option<Arc<dyn MaintenancePort>>,
}

impl fmt::Debug for AppUnitOfWorkBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppUnitOfWorkBuilder")
            .field("product_colors", &self.product_colors.is_some())
            .field("orders_read", &self.orders_read.is_some())
            .field("orders_write", &self.orders_write.is_some())
            .field("statistics", &self.statistics.is_some())
            .field("maintenance", &self.maintenance.is_some())
            .finish()
    }
}

impl AppUnitOfWorkBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_product_colors(
        mut self,
        repo: Arc<dyn ProductColorsRepository>,
    ) -> Self {
        self.product_colors = Some(repo);
        self
    }
    pub fn with_orders_read(mut self, repo: Arc<dyn OrderListingPort>) -> Self {
        self.orders_read = Some(repo);
        self
    }
    pub fn with_orders_write(
        mut self,
        repo: Arc<dyn OrderStatusWritePort>,
    ) -> Self {
        self.orders_write = Some(repo);
        self
    }
    pub fn with_statistics(
        mut self,
        repo: Arc<dyn TableStatisticsPort>,
    ) -> Self {
        self.statistics = Some(repo);
        self
    }
    pub fn with_maintenance(mut self, repo: Arc<dyn MaintenancePort>) -> Self {
        self.maintenance = Some(repo);
        self
    }

    /// Build a validated AppUnitOfWork. Returns a string error naming the
    /// first missing port.
    pub fn build(self) -> Result<AppUnitOfWork, String> {
        Ok(AppUnitOfWork {
            product_colors: self
                .product_colors
                .ok_or_else(|| "missing ProductColorsRepository".to_string())?,
            orders_read: self
                .orders_read
                .ok_or_else(|| "missing OrderListingPort".to_string())?,
            orders_write: self
                .orders_write
                .ok_or_else(|| "missing OrderStatusWritePort".to_string())?,
            statistics: self
                .statistics
                .ok_or_else(|| "missing TableStatisticsPort".to_string())?,
            maintenance: self
                .maintenance
                .ok_or_else(|| "missing MaintenancePort".to_string())?,
        })
    }

    /// Populate the builder with Postgres-backed repository adapters.
    pub fn with_postgres(mut self, db: &PostgresDatabase) -> Self {
        self.product_colors = Some(Arc::new(db.product_colors()));

        let orders = Arc::new(db.orders());
        self.orders_read = Some(orders.clone());
        self.orders_write = Some(orders);

        self.statistics = Some(Arc::new(db.statistics()));
        self.maintenance = Some(Arc::new(db.maintenance()));
        self
    }
}

impl AppUnitOfWork {
    /// Compose all Postgres-backed repositories into a unit of work.
    pub fn from_postgres(db: &PostgresDatabase) -> Result<Self, String> {
        AppUnitOfWorkBuilder::new().with_postgres(db).build()
    }
}
