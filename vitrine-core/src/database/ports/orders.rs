use std::collections::HashMap;

use async_trait::async_trait;
use vitrine_model::{
    CustomerSummary, OrderID, OrderStatus, OrderTotals, SearchTerm,
};

use crate::error::Result;

/// An order hydrated with its customer, before line-item aggregates.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderRecord {
    pub id: OrderID,
    pub status: OrderStatus,
    pub customer: CustomerSummary,
}

/// Read port backing the order listing. Orders are always paged in
/// ascending id order; the search predicate matches customer name or email.
#[async_trait]
pub trait OrderListingPort: Send + Sync {
    async fn page_ids_by_offset(
        &self,
        search: Option<&SearchTerm>,
        skip: u32,
        limit: u32,
    ) -> Result<Vec<OrderID>>;

    async fn page_ids_after(
        &self,
        search: Option<&SearchTerm>,
        cursor: OrderID,
        limit: u32,
    ) -> Result<Vec<OrderID>>;

    /// Orders for `ids` with their customer. No ordering guarantee.
    async fn hydrate(&self, ids: &[OrderID]) -> Result<Vec<OrderRecord>>;

    /// Line-item totals per order. Orders without items are absent.
    async fn totals_by_order_ids(
        &self,
        ids: &[OrderID],
    ) -> Result<HashMap<OrderID, OrderTotals>>;

    async fn count_matching(&self, search: &SearchTerm) -> Result<u64>;
}

/// Mutable order port, kept apart from the listing reads.
#[async_trait]
pub trait OrderStatusWritePort: Send + Sync {
    /// Returns `false` when no order has `id`.
    async fn update_status(
        &self,
        id: OrderID,
        status: OrderStatus,
    ) -> Result<bool>;

    /// Returns the number of orders updated.
    async fn batch_update_status(
        &self,
        ids: &[OrderID],
        status: OrderStatus,
    ) -> Result<u64>;
}
