use axum::{
    Router,
    routing::{get, patch},
};

use crate::AppState;
use crate::handlers::{orders, product_colors};

/// Listing and order-status routes.
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .route(
            "/product-colors",
            get(product_colors::list_product_colors),
        )
        .route(
            "/orders",
            get(orders::list_orders).patch(orders::batch_update_order_status),
        )
        .route("/orders/{id}", patch(orders::update_order_status))
}
