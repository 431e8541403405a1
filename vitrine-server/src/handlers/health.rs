use axum::{Json, extract::State, http::StatusCode};
use serde_json::{Value, json};
use tracing::warn;
use vitrine_core::database::ports::statistics::{
    CatalogTable, TableStatisticsPort,
};

use crate::AppState;

/// `GET /health`: store reachability plus whether the cache is live.
pub async fn health_handler(
    State(state): State<AppState>,
) -> (StatusCode, Json<Value>) {
    let cache_status = if state.cache_enabled {
        "enabled"
    } else {
        "disabled"
    };
    let mut health_status = json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION"),
        "checks": {
            "cache": {
                "status": cache_status,
            }
        }
    });

    let status = match state
        .unit_of_work()
        .statistics
        .approximate_row_count(CatalogTable::ProductColors)
        .await
    {
        Ok(estimate) => {
            health_status["checks"]["database"] = json!({
                "status": "healthy",
                "product_colors_estimate": estimate,
            });
            StatusCode::OK
        }
        Err(e) => {
            warn!(error = %e, "health check could not reach the database");
            health_status["status"] = json!("unhealthy");
            health_status["checks"]["database"] = json!({
                "status": "unhealthy",
            });
            StatusCode::SERVICE_UNAVAILABLE
        }
    };

    (status, Json(health_status))
}
