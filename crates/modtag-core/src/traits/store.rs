// SPDX-FileCopyrightText: 2026 Modtag Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Store trait for catalog and vote persistence backends.

use async_trait::async_trait;

use crate::error::ModtagError;
use crate::types::{
    CategoryDraft, DeleteOutcome, HealthStatus, Module, ModuleDraft, ModulePage, ModuleQuery,
    ReplaceOutcome, SubcategoryDraft, SubcategoryWithCategory, TagCategory, TagSubcategory,
    TagVote, UserVote, VoteCount, VoteScope, VoteSubmission,
};

/// Persistence backend behind the HTTP handlers.
///
/// Implementations own durable state. Submissions passed in are expected to
/// have gone through [`VoteSubmission::validate`] already.
#[async_trait]
pub trait CatalogStore: Send + Sync + 'static {
    /// Human-readable backend name.
    fn name(&self) -> &str;

    /// Performs a health check and returns the backend's current status.
    async fn health_check(&self) -> Result<HealthStatus, ModtagError>;

    // --- Modules ---

    /// Lists one page of modules, newest first, each annotated with its vote count.
    async fn list_modules(&self, query: &ModuleQuery) -> Result<ModulePage, ModtagError>;

    async fn create_module(&self, draft: &ModuleDraft) -> Result<Module, ModtagError>;

    async fn get_module(&self, id: &str) -> Result<Option<Module>, ModtagError>;

    /// Unpaged substring search used by the combined search endpoint.
    async fn search_modules(&self, term: &str, limit: u32) -> Result<Vec<Module>, ModtagError>;

    // --- Taxonomy ---

    /// All categories ordered by `order_index`, with nested subcategories.
    async fn list_categories(&self) -> Result<Vec<TagCategory>, ModtagError>;

    async fn create_category(&self, draft: &CategoryDraft) -> Result<TagCategory, ModtagError>;

    async fn create_subcategory(
        &self,
        draft: &SubcategoryDraft,
    ) -> Result<TagSubcategory, ModtagError>;

    async fn search_categories(
        &self,
        term: &str,
        limit: u32,
    ) -> Result<Vec<TagCategory>, ModtagError>;

    async fn search_subcategories(
        &self,
        term: &str,
        limit: u32,
    ) -> Result<Vec<SubcategoryWithCategory>, ModtagError>;

    // --- Votes ---

    /// Inserts rows for subcategories the session has not voted for yet.
    ///
    /// Returns only the newly inserted rows.
    async fn insert_votes(&self, submission: &VoteSubmission)
    -> Result<Vec<TagVote>, ModtagError>;

    /// Replaces the session's whole selection for the module in one transaction.
    async fn replace_votes(
        &self,
        submission: &VoteSubmission,
    ) -> Result<ReplaceOutcome, ModtagError>;

    /// Deletes every row in the scope. Deleting nothing is not an error.
    async fn delete_votes(&self, scope: &VoteScope) -> Result<DeleteOutcome, ModtagError>;

    /// Per-subcategory counts for a module, only for subcategories with votes.
    async fn vote_counts(&self, module_id: &str) -> Result<Vec<VoteCount>, ModtagError>;

    /// The rows one session holds for a module.
    async fn user_votes(&self, scope: &VoteScope) -> Result<Vec<UserVote>, ModtagError>;
}
