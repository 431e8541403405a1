use std::collections::HashMap;
use std::fmt;

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;
use vitrine_model::{
    CustomerID, CustomerSummary, OrderID, OrderStatus, OrderTotals,
    SearchTerm, ids::to_uuids,
};

use crate::database::ports::orders::{
    OrderListingPort, OrderRecord, OrderStatusWritePort,
};
use crate::error::{CatalogError, Result};

#[derive(Clone)]
pub struct PostgresOrdersRepository {
    pool: PgPool,
}

impl PostgresOrdersRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn pool(&self) -> &PgPool {
        &self.pool
    }
}

impl fmt::Debug for PostgresOrdersRepository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PostgresOrdersRepository")
            .field("pool_size", &self.pool.size())
            .field("idle_connections", &self.pool.num_idle())
            .finish()
    }
}

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: Uuid,
    status: String,
    customer_id: Option<Uuid>,
    customer_name: Option<String>,
    customer_email: Option<String>,
}

impl TryFrom<OrderRow> for OrderRecord {
    type Error = CatalogError;

    fn try_from(row: OrderRow) -> Result<Self> {
        let status = row.status.parse::<OrderStatus>().map_err(|e| {
            CatalogError::Internal(format!("order {}: {e}", row.id))
        })?;

        Ok(OrderRecord {
            id: OrderID(row.id),
            status,
            customer: CustomerSummary {
                id: row.customer_id.map(CustomerID),
                name: row.customer_name.unwrap_or_default(),
                email: row.customer_email.unwrap_or_default(),
            },
        })
    }
}

#[derive(sqlx::FromRow)]
struct OrderTotalsRow {
    order_id: Uuid,
    total_value: f64,
    total_quantity: f64,
    total_product_colors: i64,
}

/// Append `(c.name ILIKE $n OR c.email ILIKE $n)` for the customer alias `c`.
fn push_customer_search(
    sql_builder: &mut QueryBuilder<'_, Postgres>,
    search: &SearchTerm,
) {
    let pattern = search.like_pattern();
    sql_builder
        .push("(c.name ILIKE ")
        .push_bind(pattern.clone())
        .push(" OR c.email ILIKE ")
        .push_bind(pattern)
        .push(")");
}

fn page_ids_query<'a>(
    search: Option<&SearchTerm>,
    cursor: Option<OrderID>,
) -> QueryBuilder<'a, Postgres> {
    let mut sql_builder = QueryBuilder::<Postgres>::new(
        "SELECT o.id FROM orders o \
         LEFT JOIN customers c ON c.id = o.customer_id WHERE TRUE",
    );
    if let Some(cursor) = cursor {
        sql_builder.push(" AND o.id > ").push_bind(cursor.to_uuid());
    }
    if let Some(search) = search {
        sql_builder.push(" AND ");
        push_customer_search(&mut sql_builder, search);
    }
    sql_builder.push(" ORDER BY o.id ASC");
    sql_builder
}

#[async_trait]
impl OrderListingPort for PostgresOrdersRepository {
    async fn page_ids_by_offset(
        &self,
        search: Option<&SearchTerm>,
        skip: u32,
        limit: u32,
    ) -> Result<Vec<OrderID>> {
        let mut sql_builder = page_ids_query(search, None);
        sql_builder
            .push(" LIMIT ")
            .push_bind(i64::from(limit))
            .push(" OFFSET ")
            .push_bind(i64::from(skip));

        let ids: Vec<Uuid> = sql_builder
            .build_query_scalar()
            .fetch_all(self.pool())
            .await?;

        Ok(ids.into_iter().map(OrderID).collect())
    }

    async fn page_ids_after(
        &self,
        search: Option<&SearchTerm>,
        cursor: OrderID,
        limit: u32,
    ) -> Result<Vec<OrderID>> {
        let mut sql_builder = page_ids_query(search, Some(cursor));
        sql_builder.push(" LIMIT ").push_bind(i64::from(limit));

        let ids: Vec<Uuid> = sql_builder
            .build_query_scalar()
            .fetch_all(self.pool())
            .await?;

        Ok(ids.into_iter().map(OrderID).collect())
    }

    async fn hydrate(&self, ids: &[OrderID]) -> Result<Vec<OrderRecord>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query_as::<_, OrderRow>(
            r#"
            SELECT o.id, o.status,
                   c.id AS customer_id, c.name AS customer_name,
                   c.email AS customer_email
            FROM orders o
            LEFT JOIN customers c ON c.id = o.customer_id
            WHERE o.id = ANY($1)
            "#,
        )
        .bind(to_uuids(ids))
        .fetch_all(self.pool())
        .await?;

        rows.into_iter().map(OrderRecord::try_from).collect()
    }

    async fn totals_by_order_ids(
        &self,
        ids: &[OrderID],
    ) -> Result<HashMap<OrderID, OrderTotals>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = sqlx::query_as::<_, OrderTotalsRow>(
            r#"
            SELECT
                oi.order_id,
                COALESCE(SUM(oi.quantity * s.price), 0)::float8 AS total_value,
                COALESCE(SUM(oi.quantity), 0)::float8 AS total_quantity,
                COUNT(DISTINCT s.product_color_id)::bigint
                    AS total_product_colors
            FROM order_items oi
            INNER JOIN skus s ON s.id = oi.sku_id
            WHERE oi.order_id = ANY($1)
            GROUP BY oi.order_id
            "#,
        )
        .bind(to_uuids(ids))
        .fetch_all(self.pool())
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| {
                (
                    OrderID(row.order_id),
                    OrderTotals {
                        total_value: row.total_value,
                        total_quantity: row.total_quantity,
                        total_product_colors: row.total_product_colors,
                    },
                )
            })
            .collect())
    }

    async fn count_matching(&self, search: &SearchTerm) -> Result<u64> {
        let mut sql_builder = QueryBuilder::<Postgres>::new(
            "SELECT COUNT(*) FROM orders o \
             LEFT JOIN customers c ON c.id = o.customer_id WHERE ",
        );
        push_customer_search(&mut sql_builder, search);

        let count: i64 = sql_builder
            .build_query_scalar()
            .fetch_one(self.pool())
            .await?;

        Ok(count.max(0) as u64)
    }
}

#[async_trait]
impl OrderStatusWritePort for PostgresOrdersRepository {
    async fn update_status(
        &self,
        id: OrderID,
        status: OrderStatus,
    ) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE orders SET status = $1, updated_at = NOW() WHERE id = $2",
        )
        .bind(status.as_str())
        .bind(id.to_uuid())
        .execute(self.pool())
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn batch_update_status(
        &self,
        ids: &[OrderID],
        status: OrderStatus,
    ) -> Result<u64> {
        if ids.is_empty() {
            return Ok(0);
        }

        let result = sqlx::query(
            "UPDATE orders SET status = $1, updated_at = NOW() \
             WHERE id = ANY($2)",
        )
        .bind(status.as_str())
        .bind(to_uuids(ids))
        .execute(self.pool())
        .await?;

        tracing::info!(
            "Batch updated {} orders to {}",
            result.rows_affected(),
            status
        );
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cursor_and_search_compose_into_one_where_clause() {
        let term = SearchTerm::parse(Some("ana")).unwrap();
        let cursor = OrderID(Uuid::from_u128(7));
        let sql_builder = page_ids_query(Some(&term), Some(cursor));
        assert_eq!(
            sql_builder.sql(),
            "SELECT o.id FROM orders o LEFT JOIN customers c ON \
             c.id = o.customer_id WHERE TRUE AND o.id > $1 AND \
             (c.name ILIKE $2 OR c.email ILIKE $3) ORDER BY o.id ASC"
        );
    }
}
