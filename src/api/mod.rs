//! HTTP surface exposing the analysis pipeline and the report history.
//!
//! The router is plain axum state-sharing: one [`AppState`] behind an
//! `Arc`, handlers in [`handlers`] returning `Result<Json, StatusCode>`.

pub mod handlers;
pub mod state;

use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;

pub use state::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/status", get(handlers::status))
        .route("/api/templates", get(handlers::templates))
        .route("/api/estimate", get(handlers::estimate))
        .route("/api/analyze", post(handlers::analyze))
        .route(
            "/api/reports",
            get(handlers::list_reports).delete(handlers::clear_reports),
        )
        .route(
            "/api/reports/:name",
            get(handlers::get_report).delete(handlers::delete_report),
        )
        .route("/api/metrics", get(handlers::metrics))
        .with_state(state)
}
