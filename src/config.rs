use anyhow::{Context, Result};
use axum::http::HeaderValue;

use crate::codegen::CodeStrategy;

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Store connection string, e.g. "redis://localhost:6379".
    /// "memory://" selects the in-process store (useful for local hacking).
    pub redis_url: String,

    /// Service name reported by the root endpoint
    pub app_name: String,

    /// Lowers the default log filter to debug when set
    pub debug: bool,

    /// Origins allowed by the CORS layer, comma-separated in the environment
    pub allowed_origins: Vec<String>,

    /// Host to bind the HTTP server to, e.g. "0.0.0.0"
    pub host: String,

    /// Port to listen on
    pub port: u16,

    /// Public base URL used when composing short links, e.g. "https://chop.example.com"
    /// Must NOT have a trailing slash.
    pub base_url: String,

    /// Number of characters in generated short codes
    pub short_code_length: usize,

    /// Seconds a link (and its reverse-lookup entry) lives in the store
    pub link_ttl_secs: u64,

    /// How codes are generated when the caller supplies none
    pub code_strategy: CodeStrategy,

    /// Reserved for future signing use; loaded so deployments can set it early
    pub secret_key: String,
}

impl AppConfig {
    /// Load configuration from environment variables (populated by dotenvy before this is called).
    pub fn from_env() -> Result<Self> {
        let port = std::env::var("PORT")
            .unwrap_or_else(|_| "8000".into())
            .parse::<u16>()
            .context("PORT must be a valid port number (1–65535)")?;

        let base_url = std::env::var("BASE_URL")
            .unwrap_or_else(|_| format!("http://localhost:{port}"))
            .trim_end_matches('/')
            .to_owned();

        let short_code_length = std::env::var("SHORT_CODE_LENGTH")
            .unwrap_or_else(|_| "6".into())
            .parse::<usize>()
            .context("SHORT_CODE_LENGTH must be a positive integer")?;

        if short_code_length == 0 {
            anyhow::bail!("SHORT_CODE_LENGTH must be at least 1");
        }

        let link_ttl_secs = std::env::var("LINK_TTL_SECS")
            .unwrap_or_else(|_| "31536000".into())
            .parse::<u64>()
            .context("LINK_TTL_SECS must be a number of seconds")?;

        let code_strategy = match std::env::var("CODE_STRATEGY")
            .unwrap_or_else(|_| "random".into())
            .to_ascii_lowercase()
            .as_str()
        {
            "random" => CodeStrategy::Random,
            "hash" => CodeStrategy::Hash,
            other => anyhow::bail!("CODE_STRATEGY must be 'random' or 'hash', got '{other}'"),
        };

        let allowed_origins = std::env::var("ALLOWED_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173,http://localhost:3000".into())
            .split(',')
            .map(|s| s.trim().trim_end_matches('/').to_owned())
            .filter(|s| !s.is_empty())
            .collect();

        let debug = std::env::var("DEBUG")
            .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        Ok(Self {
            redis_url: std::env::var("REDIS_URL")
                .unwrap_or_else(|_| "redis://localhost:6379".into()),
            app_name: std::env::var("APP_NAME").unwrap_or_else(|_| "ChopURL".into()),
            debug,
            allowed_origins,
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port,
            base_url,
            short_code_length,
            link_ttl_secs,
            code_strategy,
            secret_key: std::env::var("SECRET_KEY").unwrap_or_default(),
        })
    }

    /// Allowed origins as header values for the CORS layer. An entry that
    /// isn't a valid header value is dropped with a warning so a config typo
    /// is visible in the logs instead of silently disabling that origin.
    pub fn cors_origins(&self) -> Vec<HeaderValue> {
        self.allowed_origins
            .iter()
            .filter_map(|origin| match origin.parse::<HeaderValue>() {
                Ok(value) => Some(value),
                Err(_) => {
                    tracing::warn!("ignoring invalid ALLOWED_ORIGINS entry '{origin}'");
                    None
                }
            })
            .collect()
    }
}
