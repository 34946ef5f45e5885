//! # Charadex HTTP API Module
//!
//! This module implements the JSON API server using axum.
//!
//! ## Endpoints
//!
//! - `GET /health` - Health check
//! - `GET /characters?<view>` - Filtered, sorted list (same parameters as a shared link)
//! - `GET /characters/{name}` - Exact-name detail
//! - `GET /favorites?<view>` - Starred characters with comments
//! - `POST /favorites` - Star by id
//! - `POST /favorites/toggle` - Star or unstar by id
//! - `DELETE /favorites/{id}` - Unstar, deleting the comment
//! - `PUT /favorites/{id}/comment` - Save a comment
//! - `DELETE /favorites/{id}/comment` - Delete a comment
//!
//! ## Configuration (Environment Variables)
//!
//! - `CHARADEX_CORS_ORIGINS`: Comma-separated list of allowed origins, or "*" for all (default: localhost only)

mod handlers;
mod types;

pub use handlers::{
    character_handler, characters_handler, comment_handler, delete_comment_handler,
    favorites_handler, health_handler, star_handler, toggle_handler, unstar_handler,
};
pub use types::{
    CharacterDetail, CharacterView, CharactersResponse, CommentRequest, CommentResponse,
    ErrorResponse, FavoriteEntry, FavoritesResponse, HealthResponse, StarRequest, StarResponse,
};

use crate::catalog::Catalog;
use crate::error::AppError;
use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method, header},
    routing::{get, post, put},
};
use charadex_core::FavoritesStore;
use std::sync::Arc;
use tokio::sync::RwLock;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Request bodies are tiny: an id or a comment.
const MAX_BODY_BYTES: usize = 64 * 1024;

// =============================================================================
// SERVER STATE
// =============================================================================

/// Shared server state: the record source and the single favorites writer.
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<Catalog>,
    pub favorites: Arc<RwLock<FavoritesStore>>,
}

impl AppState {
    #[must_use]
    pub fn new(catalog: Catalog, favorites: FavoritesStore) -> Self {
        Self {
            catalog: Arc::new(catalog),
            favorites: Arc::new(RwLock::new(favorites)),
        }
    }
}

// =============================================================================
// CORS CONFIGURATION
// =============================================================================

const CORS_METHODS: [Method; 5] = [
    Method::GET,
    Method::POST,
    Method::PUT,
    Method::DELETE,
    Method::OPTIONS,
];

/// Build CORS layer from `CHARADEX_CORS_ORIGINS`.
///
/// - `*`: allows all origins
/// - unset, or no valid entries: localhost only
/// - otherwise: the comma-separated list
fn build_cors_layer() -> CorsLayer {
    match std::env::var("CHARADEX_CORS_ORIGINS").ok().as_deref() {
        Some("*") => {
            tracing::warn!("CORS: Allowing ALL origins (CHARADEX_CORS_ORIGINS=*)");
            CorsLayer::permissive()
        }
        Some(origins) => {
            let allowed: Vec<HeaderValue> = origins
                .split(',')
                .filter_map(|s| {
                    let trimmed = s.trim();
                    match trimmed.parse::<HeaderValue>() {
                        Ok(hv) => {
                            tracing::info!("CORS: Allowing origin: {}", trimmed);
                            Some(hv)
                        }
                        Err(e) => {
                            tracing::warn!("CORS: Invalid origin '{}': {}", trimmed, e);
                            None
                        }
                    }
                })
                .collect();

            if allowed.is_empty() {
                tracing::warn!(
                    "CORS: No valid origins in CHARADEX_CORS_ORIGINS, defaulting to localhost only"
                );
                build_localhost_cors()
            } else {
                CorsLayer::new()
                    .allow_origin(allowed)
                    .allow_methods(CORS_METHODS)
                    .allow_headers([header::CONTENT_TYPE])
            }
        }
        None => build_localhost_cors(),
    }
}

fn build_localhost_cors() -> CorsLayer {
    let origins: Vec<HeaderValue> = [
        "http://localhost:3000",
        "http://localhost:5173",
        "http://127.0.0.1:3000",
        "http://127.0.0.1:5173",
    ]
    .into_iter()
    .filter_map(|o| o.parse::<HeaderValue>().ok())
    .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(CORS_METHODS)
        .allow_headers([header::CONTENT_TYPE])
}

// =============================================================================
// ROUTER CREATION
// =============================================================================

/// Create the axum router with all endpoints and middleware.
///
/// Middleware stack (outer to inner): tracing, CORS, body limit.
pub fn create_router(state: AppState) -> Router {
    let middleware = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(build_cors_layer())
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES));

    Router::new()
        .route("/health", get(handlers::health_handler))
        .route("/characters", get(handlers::characters_handler))
        .route("/characters/{name}", get(handlers::character_handler))
        .route(
            "/favorites",
            get(handlers::favorites_handler).post(handlers::star_handler),
        )
        .route("/favorites/toggle", post(handlers::toggle_handler))
        .route(
            "/favorites/{id}",
            axum::routing::delete(handlers::unstar_handler),
        )
        .route(
            "/favorites/{id}/comment",
            put(handlers::comment_handler).delete(handlers::delete_comment_handler),
        )
        .layer(middleware)
        .with_state(state)
}

// =============================================================================
// SERVER STARTUP
// =============================================================================

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Cannot listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown requested");
}

/// Start the HTTP server.
pub async fn run_server(
    addr: &str,
    catalog: Catalog,
    favorites: FavoritesStore,
) -> Result<(), AppError> {
    let state = AppState::new(catalog, favorites);
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| AppError::Io(format!("Bind failed: {}", e)))?;

    tracing::info!("Charadex HTTP server listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::Io(format!("Server error: {}", e)))
}
