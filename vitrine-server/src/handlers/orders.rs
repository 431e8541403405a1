use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};
use vitrine_model::{OrderID, OrderListItem, OrderStatus, Page};

use crate::AppState;
use crate::errors::AppResult;
use crate::handlers::params::{PageParams, listing_request};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderQuery {
    pub limit: Option<String>,
    pub skip: Option<String>,
    pub cursor: Option<String>,
    pub customer_name_or_email: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StatusUpdateRequest {
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct BatchStatusUpdateRequest {
    pub ids: Vec<String>,
    pub status: String,
}

#[derive(Debug, Serialize)]
pub struct StatusUpdateResponse {
    pub id: OrderID,
    pub status: OrderStatus,
}

#[derive(Debug, Serialize)]
pub struct BatchStatusUpdateResponse {
    pub updated: u64,
}

/// `GET /orders`
pub async fn list_orders(
    State(state): State<AppState>,
    Query(query): Query<OrderQuery>,
) -> AppResult<Json<Page<OrderListItem>>> {
    let request = listing_request::<OrderID>(
        PageParams {
            limit: query.limit.as_deref(),
            skip: query.skip.as_deref(),
            cursor: query.cursor.as_deref(),
            search: query.customer_name_or_email.as_deref(),
        },
        state.order_limits(),
    )?;

    let page = state.services.orders.list(&request).await?;
    Ok(Json(page))
}

/// `PATCH /orders/{id}`
pub async fn update_order_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<StatusUpdateRequest>,
) -> AppResult<Json<StatusUpdateResponse>> {
    let id: OrderID = id.parse()?;
    let status: OrderStatus = body.status.parse()?;

    state.services.orders.update_status(id, status).await?;
    Ok(Json(StatusUpdateResponse { id, status }))
}

/// `PATCH /orders`
pub async fn batch_update_order_status(
    State(state): State<AppState>,
    Json(body): Json<BatchStatusUpdateRequest>,
) -> AppResult<Json<BatchStatusUpdateResponse>> {
    let status: OrderStatus = body.status.parse()?;
    let ids = body
        .ids
        .iter()
        .map(|raw| raw.parse::<OrderID>())
        .collect::<Result<Vec<_>, _>>()?;

    let updated = state
        .services
        .orders
        .batch_update_status(&ids, status)
        .await?;
    Ok(Json(BatchStatusUpdateResponse { updated }))
}
