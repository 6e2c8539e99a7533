// SPDX-FileCopyrightText: 2026 Modtag Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `modtag taxonomy import` command implementation.
//!
//! Categories and subcategories are administrative data with no HTTP write
//! path, so they are bootstrapped from a TOML file straight into storage:
//!
//! ```toml
//! [[category]]
//! id = "violence"
//! name = "Violence"
//! order_index = 1
//!
//! [[category.subcategory]]
//! id = "gore"
//! name = "Gore"
//! order_index = 1
//! ```
//!
//! Entries that already exist (same id, or same name when no id is given)
//! are skipped, so importing the same file twice is harmless.

use std::path::Path;

use modtag_config::ModtagConfig;
use modtag_core::types::{CategoryDraft, SubcategoryDraft, TagCategory};
use modtag_core::{CatalogStore, ModtagError};
use modtag_storage::SqliteStorage;
use serde::Deserialize;
use tracing::{debug, info};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TaxonomyFile {
    #[serde(default, rename = "category")]
    pub categories: Vec<CategoryEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CategoryEntry {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub order_index: i64,
    #[serde(default, rename = "subcategory")]
    pub subcategories: Vec<SubcategoryEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SubcategoryEntry {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub order_index: i64,
}

/// Counts of rows created by one import.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub categories_created: usize,
    pub subcategories_created: usize,
    pub skipped: usize,
}

impl TaxonomyFile {
    pub fn parse(content: &str) -> Result<Self, ModtagError> {
        toml::from_str(content)
            .map_err(|e| ModtagError::Validation(format!("invalid taxonomy file: {e}")))
    }
}

/// Reads `file` and imports it into the configured database.
pub async fn run_import(config: &ModtagConfig, file: &Path) -> Result<(), ModtagError> {
    crate::serve::init_tracing(&config.server.log_level);

    let content = std::fs::read_to_string(file).map_err(|e| {
        ModtagError::Config(format!("failed to read {}: {e}", file.display()))
    })?;
    let taxonomy = TaxonomyFile::parse(&content)?;

    let storage = SqliteStorage::new(config.storage.clone());
    storage.initialize().await?;
    let imported = import(&storage, &taxonomy).await;
    storage.close().await?;
    let summary = imported?;

    println!(
        "imported {} categories and {} subcategories ({} already present)",
        summary.categories_created, summary.subcategories_created, summary.skipped
    );
    Ok(())
}

/// Creates every category and subcategory in `taxonomy` that is not stored yet.
pub async fn import(
    store: &dyn CatalogStore,
    taxonomy: &TaxonomyFile,
) -> Result<ImportSummary, ModtagError> {
    let mut existing = store.list_categories().await?;
    let mut summary = ImportSummary::default();

    for entry in &taxonomy.categories {
        let index = match find_category(&existing, entry.id.as_deref(), &entry.name) {
            Some(index) => {
                summary.skipped += 1;
                index
            }
            None => {
                let mut created = store
                    .create_category(&CategoryDraft {
                        id: entry.id.clone(),
                        name: entry.name.clone(),
                        description: entry.description.clone(),
                        order_index: entry.order_index,
                    })
                    .await?;
                created.tag_subcategories = Some(Vec::new());
                info!(category = %created.name, "category created");
                summary.categories_created += 1;
                existing.push(created);
                existing.len() - 1
            }
        };

        for sub in &entry.subcategories {
            let category = &existing[index];
            let present = category.tag_subcategories.iter().flatten().any(|s| match &sub.id {
                Some(id) => &s.id == id,
                None => s.name == sub.name,
            });
            if present {
                debug!(subcategory = %sub.name, "subcategory already present");
                summary.skipped += 1;
                continue;
            }

            let created = store
                .create_subcategory(&SubcategoryDraft {
                    id: sub.id.clone(),
                    category_id: category.id.clone(),
                    name: sub.name.clone(),
                    description: sub.description.clone(),
                    order_index: sub.order_index,
                })
                .await?;
            info!(category = %category.name, subcategory = %created.name, "subcategory created");
            summary.subcategories_created += 1;
            existing[index]
                .tag_subcategories
                .get_or_insert_with(Vec::new)
                .push(created);
        }
    }

    Ok(summary)
}

fn find_category(existing: &[TagCategory], id: Option<&str>, name: &str) -> Option<usize> {
    existing.iter().position(|c| match id {
        Some(id) => c.id == id,
        None => c.name == name,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use modtag_config::model::StorageConfig;

    const SAMPLE: &str = include_str!("../taxonomy.toml");

    async fn temp_store() -> (SqliteStorage, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let storage = SqliteStorage::new(StorageConfig {
            database_path: dir.path().join("t.db").to_string_lossy().into_owned(),
            wal_mode: true,
        });
        storage.initialize().await.unwrap();
        (storage, dir)
    }

    #[test]
    fn sample_file_parses() {
        let taxonomy = TaxonomyFile::parse(SAMPLE).unwrap();
        assert!(!taxonomy.categories.is_empty());
        assert!(taxonomy.categories.iter().all(|c| !c.subcategories.is_empty()));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = TaxonomyFile::parse("[[category]]\nname = \"Tone\"\ncolour = \"red\"\n")
            .unwrap_err();
        assert!(matches!(err, ModtagError::Validation(_)));
    }

    #[tokio::test]
    async fn import_is_idempotent() {
        let (store, _dir) = temp_store().await;
        let taxonomy = TaxonomyFile::parse(SAMPLE).unwrap();
        let expected_subs: usize = taxonomy.categories.iter().map(|c| c.subcategories.len()).sum();

        let first = import(&store, &taxonomy).await.unwrap();
        assert_eq!(first.categories_created, taxonomy.categories.len());
        assert_eq!(first.subcategories_created, expected_subs);
        assert_eq!(first.skipped, 0);

        let second = import(&store, &taxonomy).await.unwrap();
        assert_eq!(second.categories_created, 0);
        assert_eq!(second.subcategories_created, 0);
        assert_eq!(second.skipped, taxonomy.categories.len() + expected_subs);
    }

    #[tokio::test]
    async fn import_adds_to_existing_category_by_name() {
        let (store, _dir) = temp_store().await;
        let first = TaxonomyFile::parse(
            "[[category]]\nname = \"Tone\"\n[[category.subcategory]]\nname = \"Grim\"\n",
        )
        .unwrap();
        import(&store, &first).await.unwrap();

        let second = TaxonomyFile::parse(
            "[[category]]\nname = \"Tone\"\n[[category.subcategory]]\nname = \"Grim\"\n\
             [[category.subcategory]]\nname = \"Whimsical\"\norder_index = 2\n",
        )
        .unwrap();
        let summary = import(&store, &second).await.unwrap();
        assert_eq!(summary.categories_created, 0);
        assert_eq!(summary.subcategories_created, 1);

        let categories = store.list_categories().await.unwrap();
        assert_eq!(categories.len(), 1);
        let names: Vec<&str> = categories[0]
            .tag_subcategories
            .iter()
            .flatten()
            .map(|s| s.name.as_str())
            .collect();
        assert_eq!(names, vec!["Grim", "Whimsical"]);
    }
}
