//! HD Wallet API
//!
//! HTTP transport over the `hd-wallet` core. Handlers validate requests,
//! call into the core and shape the JSON responses; no cryptography lives
//! here.

pub mod config;
pub mod error;
pub mod services;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub use config::ServerConfig;
pub use error::{ApiError, Result};

/// Build the application router
pub fn app(config: Arc<ServerConfig>) -> Router {
    Router::new()
        .route("/generate-seed", get(services::wallet::generate_seed))
        .route("/generate-wallet", post(services::wallet::generate_wallet))
        .route("/validate-seed", post(services::wallet::validate_seed))
        .route("/health", get(services::health::check))
        .with_state(config)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
