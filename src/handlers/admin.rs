use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::{
    models::{LinkSummary, ListParams},
    AppState,
};

/// GET /api/v1/admin/links?skip&limit
///
/// Paginated listing, newest first. A store failure shows up as an empty
/// list (logged service-side), never as an error response.
pub async fn list_links(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListParams>,
) -> Json<Vec<LinkSummary>> {
    Json(state.service.list(params.skip, params.limit).await)
}

/// DELETE /api/v1/admin/links/:code
pub async fn delete_link(
    State(state): State<Arc<AppState>>,
    Path(code): Path<String>,
) -> Response {
    if state.service.delete(&code).await {
        Json(json!({ "message": "Link deleted successfully" })).into_response()
    } else {
        (
            StatusCode::NOT_FOUND,
            Json(json!({ "detail": "Link not found" })),
        )
            .into_response()
    }
}

/// DELETE /api/v1/admin/links/clear/all
pub async fn clear_links(State(state): State<Arc<AppState>>) -> Response {
    if state.service.clear_all().await {
        Json(json!({ "message": "All links cleared successfully" })).into_response()
    } else {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "detail": "Failed to clear links" })),
        )
            .into_response()
    }
}
