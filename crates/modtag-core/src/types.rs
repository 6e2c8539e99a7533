// SPDX-FileCopyrightText: 2026 Modtag Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain records shared by the store, the HTTP API, and the client.
//!
//! Field names follow the JSON the API emits, so the same structs are used
//! for rows read from SQLite and for request/response bodies.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::ModtagError;

/// Health status reported by store health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Store is fully operational.
    Healthy,
    /// Store is operational but experiencing issues.
    Degraded(String),
    /// Store is not operational.
    Unhealthy(String),
}

// --- Catalog ---

/// A tabletop game scenario or supplement that can be tagged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Module {
    pub id: String,
    pub name: String,
    /// Credited authors, stored as a list to support multiple authors.
    pub author: Vec<String>,
    pub system: Option<String>,
    pub description: Option<String>,
    pub purchase_url: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    /// Total vote rows for the module. Only present on list responses.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vote_count: Option<i64>,
}

/// The `author` field of a create request: a single name or a list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AuthorField {
    One(String),
    Many(Vec<String>),
}

impl AuthorField {
    /// Flattens into a list, dropping blank entries.
    pub fn into_list(self) -> Vec<String> {
        let list = match self {
            AuthorField::One(name) => vec![name],
            AuthorField::Many(names) => names,
        };
        list.into_iter()
            .map(|a| a.trim().to_string())
            .filter(|a| !a.is_empty())
            .collect()
    }
}

/// Body of `POST /api/modules` as received over the wire.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewModule {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub author: Option<AuthorField>,
    #[serde(default)]
    pub system: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub purchase_url: Option<String>,
}

impl NewModule {
    /// Checks the required fields and normalizes the optional ones.
    pub fn into_draft(self) -> Result<ModuleDraft, ModtagError> {
        let name = self
            .name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());
        let author = self.author.map(AuthorField::into_list).unwrap_or_default();

        match name {
            Some(name) if !author.is_empty() => Ok(ModuleDraft {
                name,
                author,
                system: non_blank(self.system),
                description: non_blank(self.description),
                purchase_url: non_blank(self.purchase_url),
            }),
            _ => Err(ModtagError::Validation(
                "module name and author are required".to_string(),
            )),
        }
    }
}

/// A validated module ready to be inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleDraft {
    pub name: String,
    pub author: Vec<String>,
    pub system: Option<String>,
    pub description: Option<String>,
    pub purchase_url: Option<String>,
}

/// Paging and filtering for the module list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleQuery {
    /// 1-based page number.
    pub page: u32,
    pub limit: u32,
    /// Case-insensitive substring filter over name, author, system and description.
    pub search: Option<String>,
}

impl ModuleQuery {
    /// Row offset of the first record on this page.
    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.limit)
    }
}

/// Pagination block of `GET /api/modules`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total: i64,
    #[serde(rename = "totalPages")]
    pub total_pages: u32,
}

impl Pagination {
    pub fn new(page: u32, limit: u32, total: i64) -> Self {
        let total_pages = if limit == 0 || total <= 0 {
            0
        } else {
            (total as u64).div_ceil(u64::from(limit)) as u32
        };
        Self {
            page,
            limit,
            total,
            total_pages,
        }
    }
}

/// One page of modules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModulePage {
    pub modules: Vec<Module>,
    pub pagination: Pagination,
}

// --- Taxonomy ---

/// Top-level grouping of content labels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagCategory {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub order_index: i64,
    pub created_at: String,
    /// Nested subcategories, present on the taxonomy listing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag_subcategories: Option<Vec<TagSubcategory>>,
}

/// A content label inside a category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagSubcategory {
    pub id: String,
    pub category_id: String,
    pub name: String,
    pub description: Option<String>,
    pub order_index: i64,
    pub created_at: String,
}

/// Minimal category reference nested inside subcategory payloads.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CategoryRef {
    pub id: String,
    pub name: String,
}

/// Subcategory metadata with its parent category, as nested in vote payloads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubcategoryDetail {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub tag_categories: CategoryRef,
}

/// A full subcategory row plus its parent category (tag search results).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubcategoryWithCategory {
    #[serde(flatten)]
    pub subcategory: TagSubcategory,
    pub tag_categories: CategoryRef,
}

/// Administrative input for a new category.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CategoryDraft {
    /// Explicit id; a UUID is generated when absent.
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub order_index: i64,
}

/// Administrative input for a new subcategory.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SubcategoryDraft {
    #[serde(default)]
    pub id: Option<String>,
    pub category_id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub order_index: i64,
}

// --- Votes ---

/// One stored vote row: session `session_id` asserts `subcategory_id` applies to `module_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagVote {
    pub id: String,
    pub module_id: String,
    pub subcategory_id: String,
    pub session_id: String,
    pub created_at: String,
}

/// Body of `POST`/`PUT /api/tags/votes`.
///
/// Missing fields deserialize as empty so the handler can answer with a
/// validation error instead of a body rejection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteSubmission {
    #[serde(default)]
    pub module_id: String,
    #[serde(default)]
    pub subcategory_ids: Vec<String>,
    #[serde(default)]
    pub session_id: String,
}

impl VoteSubmission {
    pub fn new(
        module_id: impl Into<String>,
        subcategory_ids: Vec<String>,
        session_id: impl Into<String>,
    ) -> Self {
        Self {
            module_id: module_id.into(),
            subcategory_ids,
            session_id: session_id.into(),
        }
    }

    /// Rejects missing ids and empty selections; drops duplicate subcategory ids.
    pub fn validate(self) -> Result<Self, ModtagError> {
        if self.module_id.trim().is_empty() || self.session_id.trim().is_empty() {
            return Err(ModtagError::Validation(
                "module_id and session_id are required".to_string(),
            ));
        }

        let mut seen = std::collections::HashSet::new();
        let subcategory_ids: Vec<String> = self
            .subcategory_ids
            .into_iter()
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty() && seen.insert(id.clone()))
            .collect();

        if subcategory_ids.is_empty() {
            return Err(ModtagError::Validation(
                "select at least one tag".to_string(),
            ));
        }

        Ok(Self {
            module_id: self.module_id,
            subcategory_ids,
            session_id: self.session_id,
        })
    }

    pub fn scope(&self) -> VoteScope {
        VoteScope {
            module_id: self.module_id.clone(),
            session_id: self.session_id.clone(),
        }
    }
}

/// A (module, session) pair: the unit of vote replacement.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteScope {
    #[serde(default)]
    pub module_id: String,
    #[serde(default)]
    pub session_id: String,
}

impl VoteScope {
    pub fn new(module_id: impl Into<String>, session_id: impl Into<String>) -> Self {
        Self {
            module_id: module_id.into(),
            session_id: session_id.into(),
        }
    }

    pub fn validate(self) -> Result<Self, ModtagError> {
        if self.module_id.trim().is_empty() || self.session_id.trim().is_empty() {
            return Err(ModtagError::Validation(
                "module_id and session_id are required".to_string(),
            ));
        }
        Ok(self)
    }
}

/// Result of deleting a session's votes for a module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DeleteOutcome {
    /// Rows matching the scope before the delete ran.
    pub found: u64,
    /// Rows the delete actually removed.
    pub deleted: u64,
}

/// Result of an atomic replace.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReplaceOutcome {
    pub deleted: u64,
    pub inserted: Vec<TagVote>,
}

/// Aggregated count for one subcategory of a module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteCount {
    pub subcategory_id: String,
    pub count: i64,
    pub tag_subcategories: SubcategoryDetail,
}

/// One of the calling session's own votes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserVote {
    pub subcategory_id: String,
    pub subcategory: SubcategoryDetail,
    pub created_at: String,
}

/// Per-subcategory statistic attached to module detail responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteStatistic {
    pub subcategory_id: String,
    pub vote_count: i64,
    pub percentage: u32,
    pub subcategory: SubcategoryDetail,
}

/// Module detail with its aggregated votes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleWithVotes {
    #[serde(flatten)]
    pub module: Module,
    pub vote_statistics: Vec<VoteStatistic>,
    pub total_votes: i64,
}

// --- Search ---

/// Which record families a search covers.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum SearchKind {
    #[default]
    All,
    Modules,
    Tags,
}

impl SearchKind {
    pub fn includes_modules(self) -> bool {
        matches!(self, SearchKind::All | SearchKind::Modules)
    }

    pub fn includes_tags(self) -> bool {
        matches!(self, SearchKind::All | SearchKind::Tags)
    }
}

/// Tag half of a combined search.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TagSearchResults {
    pub categories: Vec<TagCategory>,
    pub subcategories: Vec<SubcategoryWithCategory>,
}

/// Result families of a combined search; absent families were not requested.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SearchResults {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modules: Option<Vec<Module>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<TagSearchResults>,
}

/// Hit counts per family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SearchTotals {
    pub modules: usize,
    pub categories: usize,
    pub subcategories: usize,
}

impl SearchResults {
    pub fn totals(&self) -> SearchTotals {
        SearchTotals {
            modules: self.modules.as_ref().map_or(0, Vec::len),
            categories: self.tags.as_ref().map_or(0, |t| t.categories.len()),
            subcategories: self.tags.as_ref().map_or(0, |t| t.subcategories.len()),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn author_accepts_string_or_list() {
        let one: NewModule = serde_json::from_str(r#"{"name":"A","author":"Alice"}"#).unwrap();
        assert_eq!(one.into_draft().unwrap().author, vec!["Alice"]);

        let many: NewModule =
            serde_json::from_str(r#"{"name":"A","author":["Alice"," Bob "]}"#).unwrap();
        assert_eq!(many.into_draft().unwrap().author, vec!["Alice", "Bob"]);
    }

    #[test]
    fn module_without_name_or_author_is_rejected() {
        let missing_author: NewModule = serde_json::from_str(r#"{"name":"A"}"#).unwrap();
        assert!(matches!(
            missing_author.into_draft(),
            Err(ModtagError::Validation(_))
        ));

        let blank_name: NewModule =
            serde_json::from_str(r#"{"name":"  ","author":["Alice"]}"#).unwrap();
        assert!(blank_name.into_draft().is_err());

        let empty_authors: NewModule =
            serde_json::from_str(r#"{"name":"A","author":[""]}"#).unwrap();
        assert!(empty_authors.into_draft().is_err());
    }

    #[test]
    fn blank_optional_fields_become_none() {
        let draft = NewModule {
            name: Some("Module".into()),
            author: Some(AuthorField::One("Alice".into())),
            system: Some("  ".into()),
            description: Some("desc".into()),
            purchase_url: None,
        }
        .into_draft()
        .unwrap();
        assert_eq!(draft.system, None);
        assert_eq!(draft.description.as_deref(), Some("desc"));
    }

    #[test]
    fn empty_subcategory_set_is_rejected() {
        let sub = VoteSubmission::new("m1", vec![], "s1");
        let err = sub.validate().unwrap_err();
        assert!(err.to_string().contains("at least one"));
    }

    #[test]
    fn submission_requires_module_and_session() {
        assert!(VoteSubmission::new("", vec!["a".into()], "s1").validate().is_err());
        assert!(VoteSubmission::new("m1", vec!["a".into()], " ").validate().is_err());
    }

    #[test]
    fn submission_deduplicates_ids_in_order() {
        let sub = VoteSubmission::new(
            "m1",
            vec!["b".into(), "a".into(), "b".into(), " ".into()],
            "s1",
        )
        .validate()
        .unwrap();
        assert_eq!(sub.subcategory_ids, vec!["b", "a"]);
    }

    #[test]
    fn submission_with_missing_fields_deserializes_empty() {
        let sub: VoteSubmission = serde_json::from_str(r#"{"module_id":"m1"}"#).unwrap();
        assert!(sub.subcategory_ids.is_empty());
        assert!(sub.validate().is_err());
    }

    #[test]
    fn pagination_rounds_pages_up() {
        assert_eq!(Pagination::new(1, 20, 0).total_pages, 0);
        assert_eq!(Pagination::new(1, 20, 20).total_pages, 1);
        assert_eq!(Pagination::new(1, 20, 21).total_pages, 2);
        let json = serde_json::to_string(&Pagination::new(2, 10, 35)).unwrap();
        assert!(json.contains("\"totalPages\":4"));
    }

    #[test]
    fn module_query_offset() {
        let q = ModuleQuery {
            page: 3,
            limit: 20,
            search: None,
        };
        assert_eq!(q.offset(), 40);
        let first = ModuleQuery {
            page: 0,
            limit: 20,
            search: None,
        };
        assert_eq!(first.offset(), 0);
    }

    #[test]
    fn search_kind_parses_lowercase() {
        assert_eq!(SearchKind::from_str("all").unwrap(), SearchKind::All);
        assert_eq!(SearchKind::from_str("tags").unwrap(), SearchKind::Tags);
        assert!(SearchKind::from_str("users").is_err());
        assert_eq!(SearchKind::Modules.to_string(), "modules");
        assert!(SearchKind::All.includes_modules() && SearchKind::All.includes_tags());
        assert!(!SearchKind::Tags.includes_modules());
    }

    #[test]
    fn vote_count_list_absent_from_plain_module_json() {
        let module = Module {
            id: "m1".into(),
            name: "Test".into(),
            author: vec!["Alice".into()],
            system: None,
            description: None,
            purchase_url: None,
            created_at: "2026-01-01T00:00:00.000Z".into(),
            updated_at: "2026-01-01T00:00:00.000Z".into(),
            vote_count: None,
        };
        let json = serde_json::to_string(&module).unwrap();
        assert!(!json.contains("vote_count"));
    }

    #[test]
    fn search_totals_count_present_families() {
        let results = SearchResults {
            modules: Some(vec![]),
            tags: None,
        };
        assert_eq!(results.totals(), SearchTotals::default());
    }
}
