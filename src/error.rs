use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Failure talking to the key-value store (connection, protocol, or
/// serialization of a stored record).
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(#[from] redis::RedisError),

    #[error("corrupt record in store: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Errors surfaced by the link service.
///
/// `DuplicateCode` and `NotFound` are client errors; `Store` is a server
/// error. The list/delete/clear operations never return `Store` — they
/// swallow it and degrade (empty list / `false`), logging instead.
#[derive(Debug, thiserror::Error)]
pub enum LinkError {
    #[error("custom code '{0}' already exists")]
    DuplicateCode(String),

    #[error("short code not found")]
    NotFound,

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl IntoResponse for LinkError {
    fn into_response(self) -> Response {
        let status = match &self {
            LinkError::DuplicateCode(_) => StatusCode::BAD_REQUEST,
            LinkError::NotFound => StatusCode::NOT_FOUND,
            LinkError::Store(e) => {
                tracing::error!("store error: {e:?}");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let detail = match &self {
            // Don't leak transport details to clients.
            LinkError::Store(_) => "internal server error".to_owned(),
            other => other.to_string(),
        };

        (status, Json(json!({ "detail": detail }))).into_response()
    }
}
