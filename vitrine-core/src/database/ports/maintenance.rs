use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::database::ports::statistics::CatalogTable;
use crate::error::Result;

/// Execution plan of one of the listing hot paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryPlan {
    pub title: String,
    pub lines: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableActivity {
    pub table: String,
    pub live_rows: i64,
    pub last_analyze: Option<DateTime<Utc>>,
}

/// Operator-facing store maintenance: refreshing statistics and explaining
/// the listing queries against live data.
#[async_trait]
pub trait MaintenancePort: Send + Sync {
    async fn analyze(&self, tables: &[CatalogTable]) -> Result<()>;

    async fn explain_hot_queries(&self) -> Result<Vec<QueryPlan>>;

    async fn table_activity(
        &self,
        tables: &[CatalogTable],
    ) -> Result<Vec<TableActivity>>;
}
