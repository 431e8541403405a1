use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::info;

use crate::database::ports::maintenance::{
    MaintenancePort, QueryPlan, TableActivity,
};
use crate::database::ports::statistics::CatalogTable;
use crate::error::Result;

/// The listing hot paths, in the shape the listing repositories issue them.
const HOT_QUERIES: [(&str, &str); 4] = [
    (
        "product colors: narrowed offset page",
        r#"
        WITH p_ordered AS MATERIALIZED (
            SELECT p.id, p.name FROM products p
            ORDER BY p.name ASC, p.id ASC
            LIMIT 100
        )
        SELECT pc.id FROM product_colors pc
        INNER JOIN p_ordered ON p_ordered.id = pc.product_id
        ORDER BY p_ordered.name ASC, pc.id ASC
        LIMIT 12 OFFSET 0
        "#,
    ),
    (
        "product colors: minimum sku price",
        r#"
        SELECT s.product_color_id, MIN(s.price)::float8
        FROM skus s
        WHERE s.product_color_id IN (
            SELECT pc.id FROM product_colors pc ORDER BY pc.id LIMIT 12
        )
        GROUP BY s.product_color_id
        "#,
    ),
    (
        "orders: offset page",
        r#"
        SELECT o.id FROM orders o
        LEFT JOIN customers c ON c.id = o.customer_id
        ORDER BY o.id ASC
        LIMIT 10 OFFSET 0
        "#,
    ),
    (
        "orders: line item totals",
        r#"
        SELECT oi.order_id,
               SUM(oi.quantity * s.price)::float8,
               SUM(oi.quantity)::float8,
               COUNT(DISTINCT s.product_color_id)
        FROM order_items oi
        INNER JOIN skus s ON s.id = oi.sku_id
        WHERE oi.order_id IN (SELECT o.id FROM orders o ORDER BY o.id LIMIT 10)
        GROUP BY oi.order_id
        "#,
    ),
];

#[derive(Clone)]
pub struct PostgresMaintenanceRepository {
    pool: PgPool,
}

impl PostgresMaintenanceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl fmt::Debug for PostgresMaintenanceRepository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PostgresMaintenanceRepository")
            .field("pool_size", &self.pool.size())
            .field("idle_connections", &self.pool.num_idle())
            .finish()
    }
}

#[derive(sqlx::FromRow)]
struct TableActivityRow {
    table_name: String,
    live_rows: Option<i64>,
    last_analyze: Option<DateTime<Utc>>,
}

#[async_trait]
impl MaintenancePort for PostgresMaintenanceRepository {
    async fn analyze(&self, tables: &[CatalogTable]) -> Result<()> {
        for table in tables {
            // Table names come from a closed enum, never from input.
            let statement = format!("ANALYZE {}", table.as_str());
            sqlx::query(&statement).execute(&self.pool).await?;
            info!("Analyzed {}", table.as_str());
        }
        Ok(())
    }

    async fn explain_hot_queries(&self) -> Result<Vec<QueryPlan>> {
        let mut plans = Vec::with_capacity(HOT_QUERIES.len());
        for (title, query) in HOT_QUERIES {
            let statement =
                format!("EXPLAIN (ANALYZE, BUFFERS, FORMAT TEXT) {query}");
            let lines: Vec<String> = sqlx::query_scalar(&statement)
                .fetch_all(&self.pool)
                .await?;
            plans.push(QueryPlan {
                title: title.to_string(),
                lines,
            });
        }
        Ok(plans)
    }

    async fn table_activity(
        &self,
        tables: &[CatalogTable],
    ) -> Result<Vec<TableActivity>> {
        let names: Vec<&str> = tables.iter().map(|t| t.as_str()).collect();

        let rows = sqlx::query_as::<_, TableActivityRow>(
            r#"
            SELECT relname::text AS table_name,
                   n_live_tup AS live_rows,
                   last_analyze
            FROM pg_stat_user_tables
            WHERE relname::text = ANY($1)
            ORDER BY relname
            "#,
        )
        .bind(names)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| TableActivity {
                table: row.table_name,
                live_rows: row.live_rows.unwrap_or(0),
                last_analyze: row.last_analyze,
            })
            .collect())
    }
}
