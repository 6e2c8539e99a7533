// SPDX-FileCopyrightText: 2026 Modtag Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end integration testing.
//!
//! `TestHarness` opens a temp SQLite store, seeds a small taxonomy, and
//! serves the API on `127.0.0.1:0`. The server stops when the harness is
//! shut down or dropped.

use std::net::SocketAddr;
use std::sync::Arc;

use modtag_config::model::StorageConfig;
use modtag_core::types::{CategoryDraft, Module, ModuleDraft, SubcategoryDraft};
use modtag_core::{CatalogStore, ModtagError};
use modtag_gateway::{CatalogLimits, GatewayState, ServerConfig};
use modtag_storage::SqliteStorage;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Category and subcategory ids seeded by default.
pub const VIOLENCE: &str = "cat-1";
pub const GORE: &str = "sub-1";
pub const COMBAT: &str = "sub-2";
pub const TONE: &str = "cat-2";
pub const GRIM: &str = "sub-3";

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    seed_taxonomy: bool,
    modules: Vec<ModuleDraft>,
    limits: CatalogLimits,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            seed_taxonomy: true,
            modules: Vec::new(),
            limits: CatalogLimits::default(),
        }
    }

    /// Start with no categories at all.
    pub fn without_taxonomy(mut self) -> Self {
        self.seed_taxonomy = false;
        self
    }

    /// Insert a module before the server starts.
    pub fn with_module(mut self, name: &str, author: &str) -> Self {
        self.modules.push(ModuleDraft {
            name: name.to_string(),
            author: vec![author.to_string()],
            system: None,
            description: None,
            purchase_url: None,
        });
        self
    }

    /// Override paging and search bounds.
    pub fn with_limits(mut self, limits: CatalogLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Open the store, seed it, and start serving.
    pub async fn build(self) -> Result<TestHarness, ModtagError> {
        let temp_dir = tempfile::TempDir::new().map_err(ModtagError::storage)?;
        let db_path = temp_dir.path().join("test.db");

        let storage = Arc::new(SqliteStorage::new(StorageConfig {
            database_path: db_path.to_string_lossy().into_owned(),
            wal_mode: true,
        }));
        storage.initialize().await?;

        if self.seed_taxonomy {
            seed_taxonomy(storage.as_ref()).await?;
        }
        let mut modules = Vec::with_capacity(self.modules.len());
        for draft in &self.modules {
            modules.push(storage.create_module(draft).await?);
        }

        let listener = modtag_gateway::bind(&ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            cors_permissive: false,
        })
        .await?;
        let addr = listener.local_addr().map_err(|e| ModtagError::Http {
            message: format!("failed to read bound address: {e}"),
            source: Some(Box::new(e)),
        })?;

        let state = GatewayState::new(storage.clone(), self.limits);
        let shutdown = CancellationToken::new();
        let server = tokio::spawn(modtag_gateway::serve(
            listener,
            state,
            false,
            shutdown.clone(),
        ));
        tracing::debug!(%addr, "test harness serving");

        Ok(TestHarness {
            addr,
            storage,
            modules,
            shutdown,
            server: Some(server),
            _temp_dir: temp_dir,
        })
    }
}

async fn seed_taxonomy(store: &SqliteStorage) -> Result<(), ModtagError> {
    let categories = [(VIOLENCE, "Violence", 1), (TONE, "Tone", 2)];
    for (id, name, order_index) in categories {
        store
            .create_category(&CategoryDraft {
                id: Some(id.to_string()),
                name: name.to_string(),
                description: None,
                order_index,
            })
            .await?;
    }

    let subcategories = [
        (GORE, VIOLENCE, "Gore", 1),
        (COMBAT, VIOLENCE, "Combat", 2),
        (GRIM, TONE, "Grim", 1),
    ];
    for (id, category_id, name, order_index) in subcategories {
        store
            .create_subcategory(&SubcategoryDraft {
                id: Some(id.to_string()),
                category_id: category_id.to_string(),
                name: name.to_string(),
                description: None,
                order_index,
            })
            .await?;
    }
    Ok(())
}

/// A running API server over a temp database.
pub struct TestHarness {
    addr: SocketAddr,
    storage: Arc<SqliteStorage>,
    modules: Vec<Module>,
    shutdown: CancellationToken,
    server: Option<JoinHandle<Result<(), ModtagError>>>,
    /// Temp directory kept alive for cleanup on drop.
    _temp_dir: tempfile::TempDir,
}

impl TestHarness {
    /// Create a new builder for configuring the test harness.
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// Base URL of the running server, without a trailing slash.
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Direct access to the store, for seeding and assertions.
    pub fn store(&self) -> Arc<SqliteStorage> {
        self.storage.clone()
    }

    /// Modules inserted through [`TestHarnessBuilder::with_module`], in order.
    pub fn modules(&self) -> &[Module] {
        &self.modules
    }

    /// Stop the server and wait for it to exit.
    pub async fn shutdown(mut self) -> Result<(), ModtagError> {
        self.shutdown.cancel();
        if let Some(server) = self.server.take() {
            server
                .await
                .map_err(|e| ModtagError::Internal(format!("server task failed: {e}")))??;
        }
        self.storage.close().await
    }
}

impl Drop for TestHarness {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}
