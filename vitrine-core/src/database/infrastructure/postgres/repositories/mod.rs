//! PostgreSQL-backed repository implementations.

pub mod maintenance;
pub mod orders;
pub mod product_colors;
pub mod statistics;
