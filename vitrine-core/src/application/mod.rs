pub mod maintenance;
pub mod services;
pub mod unit_of_work;

pub use maintenance::{CacheMaintenance, Diagnostics, StoreMaintenance};
pub use services::CatalogServices;
pub use unit_of_work::{AppUnitOfWork, AppUnitOfWorkBuilder};
