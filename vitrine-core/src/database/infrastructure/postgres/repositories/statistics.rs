use std::fmt;

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;

use crate::database::ports::statistics::{CatalogTable, TableStatisticsPort};
use crate::error::Result;

/// Reads planner cardinality estimates from `pg_class`.
#[derive(Clone)]
pub struct PostgresStatisticsRepository {
    pool: PgPool,
}

impl PostgresStatisticsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl fmt::Debug for PostgresStatisticsRepository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PostgresStatisticsRepository")
            .field("pool_size", &self.pool.size())
            .field("idle_connections", &self.pool.num_idle())
            .finish()
    }
}

#[async_trait]
impl TableStatisticsPort for PostgresStatisticsRepository {
    async fn approximate_row_count(&self, table: CatalogTable) -> Result<u64> {
        // reltuples is -1 for tables that were never vacuumed or analyzed.
        let estimate: Option<i64> = sqlx::query_scalar(
            r#"
            SELECT GREATEST(COALESCE(c.reltuples, 0), 0)::bigint
            FROM pg_class c
            WHERE c.oid = to_regclass($1)::oid
            "#,
        )
        .bind(table.as_str())
        .fetch_optional(&self.pool)
        .await?;

        let estimate = estimate.unwrap_or(0).max(0) as u64;
        debug!("Estimated {} rows in {}", estimate, table.as_str());
        Ok(estimate)
    }
}
