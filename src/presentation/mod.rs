// Presentation layer - HTTP routing and handlers
pub mod app_state;
pub mod handlers;

use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{get_chart, health_check, list_tanks, stream_dashboard};
use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub fn router(state: Arc<AppState>) -> Router {
    // Compression is handled in the response builders, not by a layer
    Router::new()
        .route("/healthz", get(health_check))
        .route("/tanks", get(list_tanks))
        .route("/tanks/:id/charts/:sensor", get(get_chart))
        .route("/dashboards/:id", get(stream_dashboard))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
