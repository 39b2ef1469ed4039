pub mod admin;
pub mod links;

use std::sync::Arc;

use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::AppState;

/// GET / — service banner.
pub async fn root(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({ "message": format!("{} API is running", state.config.app_name) }))
}

/// GET /health
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "healthy" }))
}
