//! Health check endpoint.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use axum::Json;
use axum::extract::State;
use serde::Serialize;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub consuming: bool,
}

/// GET /health — reports liveness and whether the poll loop is running.
pub async fn check(State(consuming): State<Arc<AtomicBool>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        consuming: consuming.load(Ordering::SeqCst),
    })
}
