//! # Vitrine Core
//!
//! Listing engine for the Vitrine catalog/orders admin backend.
//!
//! ## Overview
//!
//! - **Product color listing**: offset pages narrowed through a bounded,
//!   materialized candidate set of products, or keyset pages continuing
//!   after a previously seen id
//! - **Order listing**: the same two pagination modes with per-order
//!   line-item totals and derived averages
//! - **Count policy**: table statistics for unfiltered listings, exact
//!   counts for filtered ones, each cached with its own TTL
//! - **Cache-aside**: Redis-backed page and count cache that fails open
//! - **Maintenance**: `ANALYZE`, query plan diagnostics and cache flushes
//!
//! ## Architecture
//!
//! - [`database`]: ports, PostgreSQL adapters and the Redis cache store
//! - [`listing`]: narrowing, aggregates, count policy and orchestration
//! - [`application`]: unit of work and service composition

#![cfg_attr(docsrs, feature(doc_cfg))]
#![allow(missing_docs)]

/// Service composition over the repository ports
pub mod application;

/// Repository ports, PostgreSQL adapters and the cache store
pub mod database;

/// Error types and error handling utilities
pub mod error;

/// The paginated listing engine
pub mod listing;

/// In-memory port implementations for tests
#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

pub use application::{
    AppUnitOfWork, CacheMaintenance, CatalogServices, StoreMaintenance,
};
pub use error::{CatalogError, Result};
pub use listing::{
    ListingCache, ListingTtls, OrderListingService, ProductColorListingService,
};
