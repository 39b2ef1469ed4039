use serde::{Deserialize, Serialize};

/// The JSON document persisted under `short:<code>`.
///
/// `created_at` is kept as a string (`YYYY-MM-DD HH:MM:SS.ffffff`, UTC) so
/// records written by earlier deployments stay readable and the admin
/// listing can order lexicographically.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkRecord {
    pub original_url: String,
    pub created_at: String,
    pub clicks: u64,
}

/// POST /api/v1/shorten request body.
#[derive(Debug, Deserialize)]
pub struct ShortenRequest {
    pub url: String,
    pub custom_code: Option<String>,
}

/// POST /api/v1/shorten response body.
#[derive(Debug, Serialize)]
pub struct ShortenResponse {
    pub original_url: String,
    pub short_url: String,
    pub short_code: String,
}

/// GET /api/v1/stats/:code response body. Read-only view of one record.
#[derive(Debug, Clone, Serialize)]
pub struct LinkStats {
    pub short_code: String,
    pub original_url: String,
    pub clicks: u64,
    pub created_at: String,
}

/// One element of the admin listing.
#[derive(Debug, Clone, Serialize)]
pub struct LinkSummary {
    pub short_code: String,
    pub original_url: String,
    pub short_url: String,
    pub clicks: u64,
    pub created_at: String,
}

/// GET /api/v1/admin/links query parameters.
#[derive(Debug, Deserialize)]
pub struct ListParams {
    #[serde(default)]
    pub skip: usize,
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    15
}
