pub mod codegen;
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod service;
pub mod store;

/// Shared application state handed to every handler.
pub struct AppState {
    pub config: config::AppConfig,
    pub service: service::LinkService,
}
