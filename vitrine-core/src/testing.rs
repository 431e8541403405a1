//! In-memory port implementations for tests.
//!
//! [`InMemoryCatalog`] implements every repository port over plain vectors
//! with the same ordering, narrowing and counting rules as the Postgres
//! adapters. Ids are allocated from a sequence, so creation order is also
//! id order. Hydration deliberately returns rows in reverse to exercise the
//! callers' order restoration.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;
use vitrine_model::{
    CandidateKey, ColorID, ColorSummary, CustomerID, CustomerSummary, OrderID,
    OrderStatus, OrderTotals, ProductColorID, ProductID, ProductSummary,
    SearchTerm, SkuID,
};

use crate::application::unit_of_work::AppUnitOfWork;
use crate::database::ports::cache::CacheStore;
use crate::database::ports::maintenance::{
    MaintenancePort, QueryPlan, TableActivity,
};
use crate::database::ports::orders::{
    OrderListingPort, OrderRecord, OrderStatusWritePort,
};
use crate::database::ports::product_colors::{
    ProductColorRecord, ProductColorsRepository,
};
use crate::database::ports::statistics::{CatalogTable, TableStatisticsPort};
use crate::error::{CatalogError, Result};
use crate::listing::narrowing;

#[derive(Debug, Clone)]
struct SkuRow {
    id: SkuID,
    product_color_id: ProductColorID,
    price: f64,
}

#[derive(Debug, Clone)]
struct OrderItemRow {
    order_id: OrderID,
    sku_id: SkuID,
    quantity: u32,
}

#[derive(Debug, Default)]
struct CatalogState {
    products: Vec<ProductSummary>,
    colors: Vec<ColorSummary>,
    product_colors: Vec<ProductColorRecord>,
    skus: Vec<SkuRow>,
    customers: Vec<CustomerSummary>,
    orders: Vec<OrderRecord>,
    order_items: Vec<OrderItemRow>,
    row_estimates: HashMap<CatalogTable, u64>,
    analyzed: Vec<CatalogTable>,
}

impl CatalogState {
    fn row_count(&self, table: CatalogTable) -> u64 {
        let rows = match table {
            CatalogTable::Products => self.products.len(),
            CatalogTable::ProductColors => self.product_colors.len(),
            CatalogTable::Colors => self.colors.len(),
            CatalogTable::Skus => self.skus.len(),
            CatalogTable::Customers => self.customers.len(),
            CatalogTable::Orders => self.orders.len(),
            CatalogTable::OrderItems => self.order_items.len(),
        };
        rows as u64
    }

    fn product_matches(
        product: &ProductSummary,
        search: Option<&SearchTerm>,
    ) -> bool {
        search.is_none_or(|term| {
            term.matches(&product.code) || term.matches(&product.name)
        })
    }

    fn order_matches(order: &OrderRecord, search: Option<&SearchTerm>) -> bool {
        search.is_none_or(|term| {
            term.matches(&order.customer.name)
                || term.matches(&order.customer.email)
        })
    }
}

#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    state: RwLock<CatalogState>,
    sequence: AtomicU64,
    exact_counts: AtomicUsize,
    approximate_counts: AtomicUsize,
    page_queries: AtomicUsize,
    store_down: AtomicBool,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compose every port of a shared catalog into a unit of work.
    pub fn unit_of_work(catalog: &Arc<Self>) -> AppUnitOfWork {
        AppUnitOfWork {
            product_colors: catalog.clone(),
            orders_read: catalog.clone(),
            orders_write: catalog.clone(),
            statistics: catalog.clone(),
            maintenance: catalog.clone(),
        }
    }

    fn next_uuid(&self) -> Uuid {
        let next = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;
        Uuid::from_u128(u128::from(next))
    }

    fn timestamp(&self) -> DateTime<Utc> {
        let offset = self.sequence.load(Ordering::SeqCst) as i64;
        DateTime::from_timestamp(1_700_000_000 + offset, 0).unwrap_or_default()
    }

    fn check_store(&self) -> Result<()> {
        if self.store_down.load(Ordering::SeqCst) {
            Err(CatalogError::Database(sqlx::Error::PoolTimedOut))
        } else {
            Ok(())
        }
    }

    /// Make every subsequent port call fail like a lost database.
    pub fn set_store_down(&self, down: bool) {
        self.store_down.store(down, Ordering::SeqCst);
    }

    pub async fn add_product(&self, code: &str, name: &str) -> ProductSummary {
        let product = ProductSummary {
            id: ProductID(self.next_uuid()),
            code: code.to_string(),
            name: name.to_string(),
        };
        self.state.write().await.products.push(product.clone());
        product
    }

    /// Add a product color with a freshly created color of `color_name`.
    pub async fn add_product_color(
        &self,
        product: &ProductSummary,
        color_name: &str,
    ) -> ProductColorID {
        let color = ColorSummary {
            id: ColorID(self.next_uuid()),
            name: color_name.to_string(),
            code: Some(color_name.to_uppercase()),
        };
        let id = ProductColorID(self.next_uuid());
        let stamp = self.timestamp();
        let record = ProductColorRecord {
            id,
            product: product.clone(),
            color: color.clone(),
            created_at: stamp,
            updated_at: stamp,
        };

        let mut state = self.state.write().await;
        state.colors.push(color);
        state.product_colors.push(record);
        id
    }

    pub async fn add_sku(
        &self,
        product_color_id: ProductColorID,
        _size: &str,
        price: f64,
    ) -> SkuID {
        let id = SkuID(self.next_uuid());
        self.state.write().await.skus.push(SkuRow {
            id,
            product_color_id,
            price,
        });
        id
    }

    pub async fn add_customer(
        &self,
        name: &str,
        email: &str,
    ) -> CustomerSummary {
        let customer = CustomerSummary {
            id: Some(CustomerID(self.next_uuid())),
            name: name.to_string(),
            email: email.to_string(),
        };
        self.state.write().await.customers.push(customer.clone());
        customer
    }

    pub async fn add_order(
        &self,
        customer: Option<&CustomerSummary>,
        status: OrderStatus,
    ) -> OrderID {
        let id = OrderID(self.next_uuid());
        self.state.write().await.orders.push(OrderRecord {
            id,
            status,
            customer: customer.cloned().unwrap_or_default(),
        });
        id
    }

    pub async fn add_order_item(
        &self,
        order_id: OrderID,
        sku_id: SkuID,
        quantity: u32,
    ) {
        self.state.write().await.order_items.push(OrderItemRow {
            order_id,
            sku_id,
            quantity,
        });
    }

    /// Pin the statistics estimate of `table`, simulating statistics that
    /// lag behind bulk writes.
    pub async fn set_row_estimate(&self, table: CatalogTable, estimate: u64) {
        self.state
            .write()
            .await
            .row_estimates
            .insert(table, estimate);
    }

    pub async fn analyzed_tables(&self) -> Vec<CatalogTable> {
        self.state.read().await.analyzed.clone()
    }

    pub fn exact_count_calls(&self) -> usize {
        self.exact_counts.load(Ordering::SeqCst)
    }

    pub fn approximate_count_calls(&self) -> usize {
        self.approximate_counts.load(Ordering::SeqCst)
    }

    /// Id queries issued by the listings, both pagination modes.
    pub fn page_query_calls(&self) -> usize {
        self.page_queries.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProductColorsRepository for InMemoryCatalog {
    async fn page_ids_by_offset(
        &self,
        search: Option<&SearchTerm>,
        skip: u32,
        limit: u32,
    ) -> Result<Vec<ProductColorID>> {
        self.check_store()?;
        self.page_queries.fetch_add(1, Ordering::SeqCst);
        let state = self.state.read().await;

        let with_colors: HashSet<Uuid> = state
            .product_colors
            .iter()
            .map(|pc| pc.product.id.to_uuid())
            .collect();
        let candidates = narrowing::narrow(
            state
                .products
                .iter()
                .filter(|p| with_colors.contains(p.id.as_uuid()))
                .filter(|p| CatalogState::product_matches(p, search))
                .map(|p| CandidateKey::new(p.name.clone(), p.id.to_uuid()))
                .collect(),
            narrowing::candidate_budget(skip, limit),
        );
        let names: HashMap<Uuid, &str> = candidates
            .iter()
            .map(|c| (c.id, c.sort_key.as_str()))
            .collect();

        let mut rows: Vec<(&str, ProductColorID)> = state
            .product_colors
            .iter()
            .filter_map(|pc| {
                names
                    .get(pc.product.id.as_uuid())
                    .map(|name| (*name, pc.id))
            })
            .collect();
        rows.sort();

        Ok(rows
            .into_iter()
            .skip(skip as usize)
            .take(limit as usize)
            .map(|(_, id)| id)
            .collect())
    }

    async fn page_ids_after(
        &self,
        search: Option<&SearchTerm>,
        cursor: ProductColorID,
        limit: u32,
    ) -> Result<Vec<ProductColorID>> {
        self.check_store()?;
        self.page_queries.fetch_add(1, Ordering::SeqCst);
        let state = self.state.read().await;

        let mut ids: Vec<ProductColorID> = state
            .product_colors
            .iter()
            .filter(|pc| pc.id > cursor)
            .filter(|pc| CatalogState::product_matches(&pc.product, search))
            .map(|pc| pc.id)
            .collect();
        ids.sort();
        ids.truncate(limit as usize);
        Ok(ids)
    }

    async fn hydrate(
        &self,
        ids: &[ProductColorID],
    ) -> Result<Vec<ProductColorRecord>> {
        self.check_store()?;
        let wanted: HashSet<&ProductColorID> = ids.iter().collect();
        let state = self.state.read().await;
        Ok(state
            .product_colors
            .iter()
            .rev()
            .filter(|pc| wanted.contains(&pc.id))
            .cloned()
            .collect())
    }

    async fn min_prices(
        &self,
        ids: &[ProductColorID],
    ) -> Result<HashMap<ProductColorID, f64>> {
        self.check_store()?;
        let wanted: HashSet<&ProductColorID> = ids.iter().collect();
        let state = self.state.read().await;

        let mut prices: HashMap<ProductColorID, f64> = HashMap::new();
        for sku in state
            .skus
            .iter()
            .filter(|sku| wanted.contains(&sku.product_color_id))
        {
            prices
                .entry(sku.product_color_id)
                .and_modify(|min| *min = min.min(sku.price))
                .or_insert(sku.price);
        }
        Ok(prices)
    }

    async fn count_matching(&self, search: &SearchTerm) -> Result<u64> {
        self.check_store()?;
        self.exact_counts.fetch_add(1, Ordering::SeqCst);
        let state = self.state.read().await;
        Ok(state
            .product_colors
            .iter()
            .filter(|pc| {
                CatalogState::product_matches(&pc.product, Some(search))
            })
            .count() as u64)
    }
}

#[async_trait]
impl OrderListingPort for InMemoryCatalog {
    async fn page_ids_by_offset(
        &self,
        search: Option<&SearchTerm>,
        skip: u32,
        limit: u32,
    ) -> Result<Vec<OrderID>> {
        self.check_store()?;
        self.page_queries.fetch_add(1, Ordering::SeqCst);
        let state = self.state.read().await;

        let mut ids: Vec<OrderID> = state
            .orders
            .iter()
            .filter(|order| CatalogState::order_matches(order, search))
            .map(|order| order.id)
            .collect();
        ids.sort();
        Ok(ids
            .into_iter()
            .skip(skip as usize)
            .take(limit as usize)
            .collect())
    }

    async fn page_ids_after(
        &self,
        search: Option<&SearchTerm>,
        cursor: OrderID,
        limit: u32,
    ) -> Result<Vec<OrderID>> {
        self.check_store()?;
        self.page_queries.fetch_add(1, Ordering::SeqCst);
        let state = self.state.read().await;

        let mut ids: Vec<OrderID> = state
            .orders
            .iter()
            .filter(|order| order.id > cursor)
            .filter(|order| CatalogState::order_matches(order, search))
            .map(|order| order.id)
            .collect();
        ids.sort();
        ids.truncate(limit as usize);
        Ok(ids)
    }

    async fn hydrate(&self, ids: &[OrderID]) -> Result<Vec<OrderRecord>> {
        self.check_store()?;
        let wanted: HashSet<&OrderID> = ids.iter().collect();
        let state = self.state.read().await;
        Ok(state
            .orders
            .iter()
            .rev()
            .filter(|order| wanted.contains(&order.id))
            .cloned()
            .collect())
    }

    async fn totals_by_order_ids(
        &self,
        ids: &[OrderID],
    ) -> Result<HashMap<OrderID, OrderTotals>> {
        self.check_store()?;
        let wanted: HashSet<&OrderID> = ids.iter().collect();
        let state = self.state.read().await;
        let skus: HashMap<SkuID, &SkuRow> =
            state.skus.iter().map(|sku| (sku.id, sku)).collect();

        let mut totals: HashMap<OrderID, OrderTotals> = HashMap::new();
        let mut variants: HashMap<OrderID, HashSet<ProductColorID>> =
            HashMap::new();
        for item in state
            .order_items
            .iter()
            .filter(|item| wanted.contains(&item.order_id))
        {
            let Some(sku) = skus.get(&item.sku_id) else {
                continue;
            };
            let entry = totals.entry(item.order_id).or_default();
            entry.total_value += f64::from(item.quantity) * sku.price;
            entry.total_quantity += f64::from(item.quantity);
            variants
                .entry(item.order_id)
                .or_default()
                .insert(sku.product_color_id);
        }
        for (order_id, distinct) in variants {
            if let Some(entry) = totals.get_mut(&order_id) {
                entry.total_product_colors = distinct.len() as i64;
            }
        }
        Ok(totals)
    }

    async fn count_matching(&self, search: &SearchTerm) -> Result<u64> {
        self.check_store()?;
        self.exact_counts.fetch_add(1, Ordering::SeqCst);
        let state = self.state.read().await;
        Ok(state
            .orders
            .iter()
            .filter(|order| CatalogState::order_matches(order, Some(search)))
            .count() as u64)
    }
}

#[async_trait]
impl OrderStatusWritePort for InMemoryCatalog {
    async fn update_status(
        &self,
        id: OrderID,
        status: OrderStatus,
    ) -> Result<bool> {
        self.check_store()?;
        let mut state = self.state.write().await;
        match state.orders.iter_mut().find(|order| order.id == id) {
            Some(order) => {
                order.status = status;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn batch_update_status(
        &self,
        ids: &[OrderID],
        status: OrderStatus,
    ) -> Result<u64> {
        self.check_store()?;
        let wanted: HashSet<&OrderID> = ids.iter().collect();
        let mut state = self.state.write().await;
        let mut updated = 0;
        for order in state
            .orders
            .iter_mut()
            .filter(|order| wanted.contains(&order.id))
        {
            order.status = status;
            updated += 1;
        }
        Ok(updated)
    }
}

#[async_trait]
impl TableStatisticsPort for InMemoryCatalog {
    async fn approximate_row_count(&self, table: CatalogTable) -> Result<u64> {
        self.check_store()?;
        self.approximate_counts.fetch_add(1, Ordering::SeqCst);
        let state = self.state.read().await;
        Ok(state
            .row_estimates
            .get(&table)
            .copied()
            .unwrap_or_else(|| state.row_count(table)))
    }
}

#[async_trait]
impl MaintenancePort for InMemoryCatalog {
    async fn analyze(&self, tables: &[CatalogTable]) -> Result<()> {
        self.check_store()?;
        let mut state = self.state.write().await;
        for table in tables {
            state.row_estimates.remove(table);
            state.analyzed.push(*table);
        }
        Ok(())
    }

    async fn explain_hot_queries(&self) -> Result<Vec<QueryPlan>> {
        self.check_store()?;
        Ok(vec![QueryPlan {
            title: "in-memory scan".to_string(),
            lines: vec!["Seq Scan on memory".to_string()],
        }])
    }

    async fn table_activity(
        &self,
        tables: &[CatalogTable],
    ) -> Result<Vec<TableActivity>> {
        self.check_store()?;
        let state = self.state.read().await;
        Ok(tables
            .iter()
            .map(|table| TableActivity {
                table: table.as_str().to_string(),
                live_rows: state.row_count(*table) as i64,
                last_analyze: None,
            })
            .collect())
    }
}

#[derive(Debug, Clone)]
struct CachedEntry {
    value: String,
    ttl: Duration,
}

/// Process-local cache store with call counters. Entries never expire.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, CachedEntry>>,
    gets: AtomicUsize,
    hits: AtomicUsize,
    writes: AtomicUsize,
    deletes: AtomicUsize,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn gets(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }

    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Prefix deletions requested.
    pub fn deletes(&self) -> usize {
        self.deletes.load(Ordering::SeqCst)
    }

    pub async fn ttl_of(&self, key: &str) -> Option<Duration> {
        self.entries.lock().await.get(key).map(|entry| entry.ttl)
    }

    pub async fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> =
            self.entries.lock().await.keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Store a raw value, bypassing serialization.
    pub async fn insert_raw(&self, key: &str, value: &str) {
        self.entries.lock().await.insert(
            key.to_string(),
            CachedEntry {
                value: value.to_string(),
                ttl: Duration::ZERO,
            },
        );
    }
}

#[async_trait]
impl CacheStore for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        let value = self
            .entries
            .lock()
            .await
            .get(key)
            .map(|entry| entry.value.clone());
        if value.is_some() {
            self.hits.fetch_add(1, Ordering::SeqCst);
        }
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.entries.lock().await.insert(
            key.to_string(),
            CachedEntry {
                value: value.to_string(),
                ttl,
            },
        );
        Ok(())
    }

    async fn delete_prefix(&self, prefix: &str) -> Result<u64> {
        self.deletes.fetch_add(1, Ordering::SeqCst);
        let mut entries = self.entries.lock().await;
        let before = entries.len();
        entries.retain(|key, _| !key.starts_with(prefix));
        Ok((before - entries.len()) as u64)
    }
}

/// Cache store whose every call fails, like an unreachable Redis.
#[derive(Debug, Default)]
pub struct FailingCache {
    calls: AtomicUsize,
    writes: AtomicUsize,
}

impl FailingCache {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Write attempts, all of which failed.
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CacheStore for FailingCache {
    async fn get(&self, _key: &str) -> Result<Option<String>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(CatalogError::Cache("connection refused".to_string()))
    }

    async fn set(
        &self,
        _key: &str,
        _value: &str,
        _ttl: Duration,
    ) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.writes.fetch_add(1, Ordering::SeqCst);
        Err(CatalogError::Cache("connection refused".to_string()))
    }

    async fn delete_prefix(&self, _prefix: &str) -> Result<u64> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(CatalogError::Cache("connection refused".to_string()))
    }
}
