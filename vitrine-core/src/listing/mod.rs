//! The paginated listing engine: candidate narrowing, page fetching,
//! per-page aggregates, count policy and the cache-aside orchestration
//! shared by the product color and order listings.

pub mod aggregates;
pub mod cache_aside;
pub mod count_policy;
pub mod narrowing;
pub mod orders;
pub mod product_colors;

pub use cache_aside::{CacheLookup, ListingCache, ListingTtls};
pub use count_policy::{CountPolicy, CountSource};
pub use orders::OrderListingService;
pub use product_colors::ProductColorListingService;

use vitrine_model::Pagination;

/// Span label for a request's pagination mode.
pub(crate) fn mode_label<K>(pagination: &Pagination<K>) -> &'static str {
    match pagination {
        Pagination::Offset { .. } => "offset",
        Pagination::After { .. } => "cursor",
    }
}
