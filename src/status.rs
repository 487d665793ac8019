//! HTTP status surface for a running tracker

use axum::{Json, Router, extract::State, http::StatusCode, response::IntoResponse, routing::get};
use std::sync::Arc;

use crate::observability::MetricsSnapshot;
use crate::tracker::{StreamStatus, Tracker};

pub fn router(tracker: Arc<Tracker>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/streams", get(streams))
        .route("/metrics", get(metrics))
        .with_state(tracker)
}

pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

pub async fn streams(State(tracker): State<Arc<Tracker>>) -> Json<Vec<StreamStatus>> {
    Json(tracker.statuses())
}

pub async fn metrics(State(tracker): State<Arc<Tracker>>) -> Json<MetricsSnapshot> {
    Json(tracker.crawler().metrics().snapshot())
}
