use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;
use vitrine_model::{Page, ProductColorID, ProductColorListItem};

use crate::AppState;
use crate::errors::AppResult;
use crate::handlers::params::{PageParams, listing_request};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductColorQuery {
    pub limit: Option<String>,
    pub skip: Option<String>,
    pub cursor: Option<String>,
    pub product_code_or_name: Option<String>,
}

/// `GET /product-colors`
pub async fn list_product_colors(
    State(state): State<AppState>,
    Query(query): Query<ProductColorQuery>,
) -> AppResult<Json<Page<ProductColorListItem>>> {
    let request = listing_request::<ProductColorID>(
        PageParams {
            limit: query.limit.as_deref(),
            skip: query.skip.as_deref(),
            cursor: query.cursor.as_deref(),
            search: query.product_code_or_name.as_deref(),
        },
        state.product_color_limits(),
    )?;

    let page = state.services.product_colors.list(&request).await?;
    Ok(Json(page))
}
