use std::sync::Arc;

use axum::{
    http::{header, Method},
    routing::{delete, get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use chopurl::{config::AppConfig, handlers, service::LinkService, store, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env (ignore error if file is absent — env vars may already be set)
    dotenvy::dotenv().ok();

    // Load configuration from environment
    let config = AppConfig::from_env()?;

    // Initialise structured logging
    let default_filter = if config.debug {
        "chopurl=debug,tower_http=debug"
    } else {
        "chopurl=info,tower_http=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        "Starting {} on {}:{}",
        config.app_name,
        config.host,
        config.port
    );
    tracing::info!("Base URL: {}", config.base_url);

    // Connect the key-value store and build the service around it
    let link_store = store::connect(&config.redis_url).await?;
    let service = LinkService::new(
        link_store,
        config.base_url.clone(),
        config.short_code_length,
        config.link_ttl_secs,
        config.code_strategy,
    );

    // CORS for the browser frontend
    let cors = CorsLayer::new()
        .allow_origin(config.cors_origins())
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE])
        .allow_credentials(true);

    let bind_addr = format!("{}:{}", config.host, config.port);
    let state = Arc::new(AppState { config, service });

    // ── Router ─────────────────────────────────────────────────────────────
    let api = Router::new()
        .route("/shorten", post(handlers::links::shorten))
        .route("/stats/:code", get(handlers::links::stats))
        .route("/admin/links", get(handlers::admin::list_links))
        .route("/admin/links/:code", delete(handlers::admin::delete_link))
        .route("/admin/links/clear/all", delete(handlers::admin::clear_links));

    let app = Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .nest("/api/v1", api)
        // Short-link redirect — must come LAST so the fixed routes take priority
        .route("/:code", get(handlers::links::redirect))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // ── Serve ──────────────────────────────────────────────────────────────
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}
