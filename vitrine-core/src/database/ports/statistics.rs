use async_trait::async_trait;

use crate::error::Result;

/// Tables of the catalog schema the engine reads statistics from or
/// maintains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CatalogTable {
    Products,
    ProductColors,
    Colors,
    Skus,
    Customers,
    Orders,
    OrderItems,
}

impl CatalogTable {
    pub const ALL: [CatalogTable; 7] = [
        CatalogTable::Products,
        CatalogTable::ProductColors,
        CatalogTable::Colors,
        CatalogTable::Skus,
        CatalogTable::Customers,
        CatalogTable::Orders,
        CatalogTable::OrderItems,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CatalogTable::Products => "products",
            CatalogTable::ProductColors => "product_colors",
            CatalogTable::Colors => "colors",
            CatalogTable::Skus => "skus",
            CatalogTable::Customers => "customers",
            CatalogTable::Orders => "orders",
            CatalogTable::OrderItems => "order_items",
        }
    }
}

/// Read-only port over the store's maintained cardinality statistics.
///
/// The value lags the true row count after bulk writes until the table is
/// analyzed again; it is advisory and never used for correctness.
#[async_trait]
pub trait TableStatisticsPort: Send + Sync {
    async fn approximate_row_count(&self, table: CatalogTable) -> Result<u64>;
}
