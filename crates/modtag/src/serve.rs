// SPDX-FileCopyrightText: 2026 Modtag Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `modtag serve` and `modtag migrate` command implementations.
//!
//! `serve` opens SQLite storage, runs the gateway until SIGINT or SIGTERM,
//! then drains in-flight requests and checkpoints the database.

use std::sync::Arc;

use modtag_config::ModtagConfig;
use modtag_core::ModtagError;
use modtag_gateway::{CatalogLimits, GatewayState, ServerConfig};
use modtag_storage::SqliteStorage;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Runs the API server until a shutdown signal arrives.
pub async fn run_serve(config: ModtagConfig) -> Result<(), ModtagError> {
    init_tracing(&config.server.log_level);

    info!("starting modtag serve");

    let storage = Arc::new(SqliteStorage::new(config.storage.clone()));
    storage.initialize().await?;

    let limits = CatalogLimits {
        default_page_size: config.catalog.default_page_size,
        max_page_size: config.catalog.max_page_size,
        search_min_length: config.catalog.search_min_length,
        search_default_limit: config.catalog.search_default_limit,
    };
    let state = GatewayState::new(storage.clone(), limits);
    let server_config = ServerConfig {
        host: config.server.host.clone(),
        port: config.server.port,
        cors_permissive: config.server.cors_permissive,
    };

    let cancel = install_signal_handler();
    let served = modtag_gateway::start_server(&server_config, state, cancel).await;

    // Close storage even when the server failed, then report the first error.
    let closed = storage.close().await;
    served?;
    closed?;

    info!("modtag serve shutdown complete");
    Ok(())
}

/// Opens the configured database, applying any pending migrations.
pub async fn run_migrate(config: &ModtagConfig) -> Result<(), ModtagError> {
    init_tracing(&config.server.log_level);

    let storage = SqliteStorage::new(config.storage.clone());
    storage.initialize().await?;
    storage.close().await?;

    println!(
        "database at {} is up to date",
        config.storage.database_path
    );
    Ok(())
}

/// Returns a token cancelled on the first SIGINT or SIGTERM.
fn install_signal_handler() -> CancellationToken {
    let token = CancellationToken::new();
    let token_clone = token.clone();

    tokio::spawn(async move {
        let ctrl_c = tokio::signal::ctrl_c();

        #[cfg(unix)]
        {
            use tokio::signal::unix::{SignalKind, signal};
            match signal(SignalKind::terminate()) {
                Ok(mut sigterm) => {
                    tokio::select! {
                        _ = ctrl_c => {
                            info!("received SIGINT (Ctrl+C), initiating shutdown");
                        }
                        _ = sigterm.recv() => {
                            info!("received SIGTERM, initiating shutdown");
                        }
                    }
                }
                Err(e) => {
                    warn!(error = %e, "failed to install SIGTERM handler, listening for Ctrl+C only");
                    let _ = ctrl_c.await;
                    info!("received SIGINT (Ctrl+C), initiating shutdown");
                }
            }
        }

        #[cfg(not(unix))]
        {
            let _ = ctrl_c.await;
            info!("received Ctrl+C, initiating shutdown");
        }

        token_clone.cancel();
        debug!("shutdown signal handler completed");
    });

    token
}

/// Initializes the tracing subscriber with the given log level.
///
/// `RUST_LOG` takes precedence over the configured level.
pub fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("modtag={log_level},warn")));

    // A second init in the same process is ignored.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .try_init();
}
