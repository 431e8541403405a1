//! Core data model definitions shared across Vitrine crates.
#![allow(missing_docs)]

pub mod catalog;
pub mod error;
pub mod ids;
pub mod listing;
pub mod orders;
pub mod page;

// Intentionally curated re-exports for downstream consumers.
pub use catalog::{ColorSummary, ProductColorListItem, ProductSummary};
pub use error::{ModelError, Result as ModelResult};
pub use ids::{ColorID, CustomerID, OrderID, ProductColorID, ProductID, SkuID};
pub use listing::{CandidateKey, ListingRequest, Pagination, SearchTerm};
pub use orders::{CustomerSummary, OrderListItem, OrderStatus, OrderTotals};
pub use page::Page;
