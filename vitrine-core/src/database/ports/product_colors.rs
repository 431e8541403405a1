use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use vitrine_model::{
    ColorSummary, ProductColorID, ProductColorListItem, ProductSummary,
    SearchTerm,
};

use crate::error::Result;

/// A product color hydrated with its relational joins, before the page's
/// price aggregate is attached.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductColorRecord {
    pub id: ProductColorID,
    pub product: ProductSummary,
    pub color: ColorSummary,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProductColorRecord {
    pub fn into_list_item(self, price: f64) -> ProductColorListItem {
        ProductColorListItem {
            id: self.id,
            product: self.product,
            color: self.color,
            price,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Read port backing the catalog listing.
///
/// The search predicate is a case-insensitive substring match against the
/// parent product's code or name.
#[async_trait]
pub trait ProductColorsRepository: Send + Sync {
    /// Offset mode: ids of the page in `(product name, product color id)`
    /// order, sliced from the narrowed candidate set.
    async fn page_ids_by_offset(
        &self,
        search: Option<&SearchTerm>,
        skip: u32,
        limit: u32,
    ) -> Result<Vec<ProductColorID>>;

    /// Cursor mode: ids strictly greater than `cursor` in ascending order.
    async fn page_ids_after(
        &self,
        search: Option<&SearchTerm>,
        cursor: ProductColorID,
        limit: u32,
    ) -> Result<Vec<ProductColorID>>;

    /// Full entities for `ids`. No ordering guarantee.
    async fn hydrate(
        &self,
        ids: &[ProductColorID],
    ) -> Result<Vec<ProductColorRecord>>;

    /// `MIN(price)` per product color over its SKUs. Ids without SKUs are
    /// absent from the map.
    async fn min_prices(
        &self,
        ids: &[ProductColorID],
    ) -> Result<HashMap<ProductColorID, f64>>;

    /// Exact number of product colors whose product matches `search`.
    async fn count_matching(&self, search: &SearchTerm) -> Result<u64>;
}
