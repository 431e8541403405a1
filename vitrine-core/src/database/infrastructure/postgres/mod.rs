//! PostgreSQL infrastructure adapters implementing the database ports.

pub mod repositories;

pub use repositories::maintenance::PostgresMaintenanceRepository;
pub use repositories::orders::PostgresOrdersRepository;
pub use repositories::product_colors::PostgresProductColorsRepository;
pub use repositories::statistics::PostgresStatisticsRepository;
