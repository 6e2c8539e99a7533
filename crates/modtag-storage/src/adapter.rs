// SPDX-FileCopyrightText: 2026 Modtag Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the CatalogStore trait.

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::debug;

use modtag_config::model::StorageConfig;
use modtag_core::types::{
    CategoryDraft, DeleteOutcome, Module, ModuleDraft, ModulePage, ModuleQuery, ReplaceOutcome,
    SubcategoryDraft, SubcategoryWithCategory, TagCategory, TagSubcategory, TagVote, UserVote,
    VoteCount, VoteScope, VoteSubmission,
};
use modtag_core::{CatalogStore, HealthStatus, ModtagError};

use crate::database::Database;
use crate::queries;

/// SQLite-backed catalog store.
///
/// Wraps a [`Database`] handle and delegates all query operations to the
/// typed query modules. The database is lazily opened by [`SqliteStorage::initialize`].
pub struct SqliteStorage {
    config: StorageConfig,
    db: OnceCell<Database>,
}

impl SqliteStorage {
    /// Create a new SqliteStorage with the given configuration.
    ///
    /// The database connection is not opened until [`initialize`](Self::initialize) is called.
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            db: OnceCell::new(),
        }
    }

    /// Open the database and apply pending migrations.
    pub async fn initialize(&self) -> Result<(), ModtagError> {
        let path = self.config.database_path.clone();
        let db = Database::open_with(&path, self.config.wal_mode).await?;
        self.db.set(db).map_err(|_| ModtagError::Storage {
            source: "storage already initialized".into(),
        })?;
        debug!(path = %self.config.database_path, "SQLite storage initialized");
        Ok(())
    }

    /// Checkpoint the WAL. Safe to call when the store was never initialized.
    pub async fn close(&self) -> Result<(), ModtagError> {
        if let Some(db) = self.db.get() {
            db.close().await?;
        }
        Ok(())
    }

    /// Returns a reference to the underlying Database, or an error if not initialized.
    fn db(&self) -> Result<&Database, ModtagError> {
        self.db.get().ok_or_else(|| ModtagError::Storage {
            source: "storage not initialized -- call initialize() first".into(),
        })
    }
}

#[async_trait]
impl CatalogStore for SqliteStorage {
    fn name(&self) -> &str {
        "sqlite"
    }

    async fn health_check(&self) -> Result<HealthStatus, ModtagError> {
        let Ok(db) = self.db() else {
            return Ok(HealthStatus::Unhealthy("storage not initialized".into()));
        };
        let probe = db
            .connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("SELECT 1;")?;
                Ok(())
            })
            .await;
        Ok(match probe {
            Ok(()) => HealthStatus::Healthy,
            Err(e) => HealthStatus::Unhealthy(e.to_string()),
        })
    }

    // --- Module operations ---

    async fn list_modules(&self, query: &ModuleQuery) -> Result<ModulePage, ModtagError> {
        queries::modules::list_modules(self.db()?, query).await
    }

    async fn create_module(&self, draft: &ModuleDraft) -> Result<Module, ModtagError> {
        queries::modules::create_module(self.db()?, draft).await
    }

    async fn get_module(&self, id: &str) -> Result<Option<Module>, ModtagError> {
        queries::modules::get_module(self.db()?, id).await
    }

    async fn search_modules(&self, term: &str, limit: u32) -> Result<Vec<Module>, ModtagError> {
        queries::modules::search_modules(self.db()?, term, limit).await
    }

    // --- Taxonomy operations ---

    async fn list_categories(&self) -> Result<Vec<TagCategory>, ModtagError> {
        queries::tags::list_categories(self.db()?).await
    }

    async fn create_category(&self, draft: &CategoryDraft) -> Result<TagCategory, ModtagError> {
        queries::tags::create_category(self.db()?, draft).await
    }

    async fn create_subcategory(
        &self,
        draft: &SubcategoryDraft,
    ) -> Result<TagSubcategory, ModtagError> {
        queries::tags::create_subcategory(self.db()?, draft).await
    }

    async fn search_categories(
        &self,
        term: &str,
        limit: u32,
    ) -> Result<Vec<TagCategory>, ModtagError> {
        queries::tags::search_categories(self.db()?, term, limit).await
    }

    async fn search_subcategories(
        &self,
        term: &str,
        limit: u32,
    ) -> Result<Vec<SubcategoryWithCategory>, ModtagError> {
        queries::tags::search_subcategories(self.db()?, term, limit).await
    }

    // --- Vote operations ---

    async fn insert_votes(
        &self,
        submission: &VoteSubmission,
    ) -> Result<Vec<TagVote>, ModtagError> {
        queries::votes::insert_votes(self.db()?, submission).await
    }

    async fn replace_votes(
        &self,
        submission: &VoteSubmission,
    ) -> Result<ReplaceOutcome, ModtagError> {
        queries::votes::replace_votes(self.db()?, submission).await
    }

    async fn delete_votes(&self, scope: &VoteScope) -> Result<DeleteOutcome, ModtagError> {
        queries::votes::delete_votes(self.db()?, scope).await
    }

    async fn vote_counts(&self, module_id: &str) -> Result<Vec<VoteCount>, ModtagError> {
        queries::votes::vote_counts(self.db()?, module_id).await
    }

    async fn user_votes(&self, scope: &VoteScope) -> Result<Vec<UserVote>, ModtagError> {
        queries::votes::user_votes(self.db()?, scope).await
    }
}
