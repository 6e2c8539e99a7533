// SPDX-FileCopyrightText: 2026 Modtag Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP server built on axum.
//!
//! Sets up routes, middleware, and shared state for the gateway.

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use modtag_core::{CatalogStore, ModtagError};
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;

/// Paging and search bounds applied to query parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogLimits {
    pub default_page_size: u32,
    pub max_page_size: u32,
    pub search_min_length: usize,
    pub search_default_limit: u32,
}

impl Default for CatalogLimits {
    fn default() -> Self {
        Self {
            default_page_size: modtag_core::constants::MODULES_PER_PAGE,
            max_page_size: 100,
            search_min_length: modtag_core::constants::MIN_SEARCH_QUERY_LENGTH,
            search_default_limit: modtag_core::constants::MODULES_PER_PAGE,
        }
    }
}

impl CatalogLimits {
    /// Requested page size, defaulted and clamped to `1..=max_page_size`.
    pub fn clamp_page_size(&self, requested: Option<u32>) -> u32 {
        requested
            .unwrap_or(self.default_page_size)
            .clamp(1, self.max_page_size.max(1))
    }

    /// Requested hits per search family, defaulted and clamped like page sizes.
    pub fn clamp_search_limit(&self, requested: Option<u32>) -> u32 {
        requested
            .unwrap_or(self.search_default_limit)
            .clamp(1, self.max_page_size.max(1))
    }
}

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct GatewayState {
    /// Catalog and vote persistence.
    pub store: Arc<dyn CatalogStore>,
    /// Paging and search bounds.
    pub limits: CatalogLimits,
    /// Process start time for uptime calculation.
    pub start_time: std::time::Instant,
}

impl GatewayState {
    pub fn new(store: Arc<dyn CatalogStore>, limits: CatalogLimits) -> Self {
        Self {
            store,
            limits,
            start_time: std::time::Instant::now(),
        }
    }
}

/// Gateway server configuration (mirrors ServerConfig from modtag-config).
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host address to bind.
    pub host: String,
    /// Port to bind; 0 picks a free port.
    pub port: u16,
    /// Allow any origin.
    pub cors_permissive: bool,
}

/// Build the application router.
///
/// Routes:
/// - GET /health
/// - GET, POST /api/modules
/// - GET /api/modules/{id}
/// - GET /api/tags/categories
/// - GET, POST, PUT, DELETE /api/tags/votes
/// - GET /api/tags/votes/user
/// - GET /api/search
pub fn build_router(state: GatewayState, cors_permissive: bool) -> Router {
    let public_routes = Router::new()
        .route("/health", get(handlers::get_health))
        .with_state(state.clone());

    let api_routes = Router::new()
        .route(
            "/api/modules",
            get(handlers::list_modules).post(handlers::create_module),
        )
        .route("/api/modules/{id}", get(handlers::get_module))
        .route("/api/tags/categories", get(handlers::list_categories))
        .route(
            "/api/tags/votes",
            post(handlers::post_votes)
                .put(handlers::put_votes)
                .get(handlers::get_vote_counts)
                .delete(handlers::delete_votes),
        )
        .route("/api/tags/votes/user", get(handlers::get_user_votes))
        .route("/api/search", get(handlers::search))
        .with_state(state);

    let app = Router::new()
        .merge(public_routes)
        .merge(api_routes)
        .layer(TraceLayer::new_for_http());

    if cors_permissive {
        app.layer(CorsLayer::permissive())
    } else {
        app
    }
}

/// Bind the listener without serving yet, so callers can learn the bound port.
pub async fn bind(config: &ServerConfig) -> Result<tokio::net::TcpListener, ModtagError> {
    let addr = format!("{}:{}", config.host, config.port);
    tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| ModtagError::Http {
            message: format!("failed to bind gateway to {addr}: {e}"),
            source: Some(Box::new(e)),
        })
}

/// Serve the API on an already bound listener until `shutdown` is cancelled.
pub async fn serve(
    listener: tokio::net::TcpListener,
    state: GatewayState,
    cors_permissive: bool,
    shutdown: CancellationToken,
) -> Result<(), ModtagError> {
    let app = build_router(state, cors_permissive);
    if let Ok(addr) = listener.local_addr() {
        tracing::info!(%addr, "gateway server listening");
    }

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .map_err(|e| ModtagError::Http {
            message: format!("gateway server error: {e}"),
            source: Some(Box::new(e)),
        })?;

    tracing::info!("gateway server stopped");
    Ok(())
}

/// Start the gateway HTTP server on the configured host:port.
pub async fn start_server(
    config: &ServerConfig,
    state: GatewayState,
    shutdown: CancellationToken,
) -> Result<(), ModtagError> {
    let listener = bind(config).await?;
    serve(listener, state, config.cors_permissive, shutdown).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_size_is_defaulted_and_clamped() {
        let limits = CatalogLimits::default();
        assert_eq!(limits.clamp_page_size(None), 20);
        assert_eq!(limits.clamp_page_size(Some(0)), 1);
        assert_eq!(limits.clamp_page_size(Some(500)), 100);
        assert_eq!(limits.clamp_page_size(Some(35)), 35);
    }

    #[test]
    fn search_limit_uses_its_own_default() {
        let limits = CatalogLimits {
            search_default_limit: 7,
            ..CatalogLimits::default()
        };
        assert_eq!(limits.clamp_search_limit(None), 7);
        assert_eq!(limits.clamp_search_limit(Some(1000)), 100);
    }

    #[test]
    fn server_config_debug() {
        let config = ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 3000,
            cors_permissive: true,
        };
        let debug = format!("{config:?}");
        assert!(debug.contains("127.0.0.1"));
    }
}
