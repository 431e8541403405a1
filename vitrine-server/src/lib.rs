//! # Vitrine Server
//!
//! HTTP admin API over the Vitrine listing engine: paginated product-color
//! and order listings plus order status updates.

pub mod errors;
pub mod handlers;
pub mod infra;
pub mod routes;

pub use infra::app_state::AppState;

use axum::{Router, routing::get};
use tower_http::trace::TraceLayer;

use crate::handlers::health::health_handler;
use crate::infra::cors::cors_layer;

pub fn create_app(state: AppState) -> Router {
    let cors = cors_layer(&state.cors);

    Router::new()
        .route("/health", get(health_handler))
        .merge(routes::create_api_router())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
