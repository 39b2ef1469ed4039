use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::{
    error::LinkError,
    models::{ShortenRequest, ShortenResponse},
    AppState,
};

/// POST /api/v1/shorten
///
/// Creates a short link. 400 when the custom code is taken or the URL fails
/// the boundary check; 500 when the store is unreachable.
pub async fn shorten(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ShortenRequest>,
) -> Result<Json<ShortenResponse>, Response> {
    let url = req.url.trim().to_owned();
    if url.is_empty() || !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(json!({ "detail": "url must start with http:// or https://" })),
        )
            .into_response());
    }

    // Treat a blank custom code the same as none.
    let custom_code = req
        .custom_code
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty());

    let short_url = state
        .service
        .create(&url, custom_code)
        .await
        .map_err(IntoResponse::into_response)?;

    let short_code = short_url
        .rsplit('/')
        .next()
        .unwrap_or_default()
        .to_owned();

    Ok(Json(ShortenResponse {
        original_url: url,
        short_url,
        short_code,
    }))
}

/// GET /:code
///
/// Resolves the code, counts the click, and answers 302 with the original
/// URL in Location. 404 for unknown codes.
pub async fn redirect(
    State(state): State<Arc<AppState>>,
    Path(code): Path<String>,
) -> Result<Response, LinkError> {
    let original_url = state.service.resolve(&code).await?;
    Ok((StatusCode::FOUND, [(header::LOCATION, original_url)]).into_response())
}

/// GET /api/v1/stats/:code — read-only; does not count a click.
pub async fn stats(
    State(state): State<Arc<AppState>>,
    Path(code): Path<String>,
) -> Result<Json<crate::models::LinkStats>, LinkError> {
    Ok(Json(state.service.stats(&code).await?))
}
