// SPDX-FileCopyrightText: 2026 Modtag Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tag taxonomy queries: categories and their subcategories.

use std::collections::HashMap;

use modtag_core::ModtagError;
use modtag_core::types::{
    CategoryDraft, CategoryRef, SubcategoryDraft, SubcategoryWithCategory, TagCategory,
    TagSubcategory,
};
use rusqlite::{OptionalExtension, Row, params};

use crate::database::{Database, map_tr_err, now_timestamp};
use crate::queries::like_pattern;

fn category_from_row(row: &Row<'_>) -> rusqlite::Result<TagCategory> {
    Ok(TagCategory {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        order_index: row.get(3)?,
        created_at: row.get(4)?,
        tag_subcategories: None,
    })
}

fn subcategory_from_row(row: &Row<'_>) -> rusqlite::Result<TagSubcategory> {
    Ok(TagSubcategory {
        id: row.get(0)?,
        category_id: row.get(1)?,
        name: row.get(2)?,
        description: row.get(3)?,
        order_index: row.get(4)?,
        created_at: row.get(5)?,
    })
}

/// All categories by `order_index`, each with its subcategories by `order_index`.
pub async fn list_categories(db: &Database) -> Result<Vec<TagCategory>, ModtagError> {
    db.connection()
        .call(|conn| -> Result<Vec<TagCategory>, rusqlite::Error> {
            let mut stmt = conn.prepare(
                "SELECT id, category_id, name, description, order_index, created_at
                 FROM tag_subcategories ORDER BY category_id, order_index, name",
            )?;
            let mut by_category: HashMap<String, Vec<TagSubcategory>> = HashMap::new();
            for sub in stmt.query_map([], subcategory_from_row)? {
                let sub = sub?;
                by_category
                    .entry(sub.category_id.clone())
                    .or_default()
                    .push(sub);
            }

            let mut stmt = conn.prepare(
                "SELECT id, name, description, order_index, created_at
                 FROM tag_categories ORDER BY order_index, name",
            )?;
            let categories = stmt
                .query_map([], category_from_row)?
                .map(|cat| {
                    cat.map(|mut cat| {
                        cat.tag_subcategories =
                            Some(by_category.remove(&cat.id).unwrap_or_default());
                        cat
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;
            Ok(categories)
        })
        .await
        .map_err(map_tr_err)
}

/// Insert a category, generating an id when none is given.
pub async fn create_category(
    db: &Database,
    draft: &CategoryDraft,
) -> Result<TagCategory, ModtagError> {
    let category = TagCategory {
        id: draft
            .id
            .clone()
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
        name: draft.name.trim().to_string(),
        description: draft.description.clone(),
        order_index: draft.order_index,
        created_at: now_timestamp(),
        tag_subcategories: None,
    };
    if category.name.is_empty() {
        return Err(ModtagError::Validation(
            "category name is required".to_string(),
        ));
    }

    let row = category.clone();
    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> {
            conn.execute(
                "INSERT INTO tag_categories (id, name, description, order_index, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    row.id,
                    row.name,
                    row.description,
                    row.order_index,
                    row.created_at
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)?;
    Ok(category)
}

/// Insert a subcategory under an existing category.
pub async fn create_subcategory(
    db: &Database,
    draft: &SubcategoryDraft,
) -> Result<TagSubcategory, ModtagError> {
    let subcategory = TagSubcategory {
        id: draft
            .id
            .clone()
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
        category_id: draft.category_id.clone(),
        name: draft.name.trim().to_string(),
        description: draft.description.clone(),
        order_index: draft.order_index,
        created_at: now_timestamp(),
    };
    if subcategory.name.is_empty() {
        return Err(ModtagError::Validation(
            "subcategory name is required".to_string(),
        ));
    }

    let row = subcategory.clone();
    let inserted = db
        .connection()
        .call(move |conn| -> Result<bool, rusqlite::Error> {
            let parent: Option<String> = conn
                .query_row(
                    "SELECT id FROM tag_categories WHERE id = ?1",
                    params![row.category_id],
                    |r| r.get(0),
                )
                .optional()?;
            if parent.is_none() {
                return Ok(false);
            }
            conn.execute(
                "INSERT INTO tag_subcategories
                 (id, category_id, name, description, order_index, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    row.id,
                    row.category_id,
                    row.name,
                    row.description,
                    row.order_index,
                    row.created_at
                ],
            )?;
            Ok(true)
        })
        .await
        .map_err(map_tr_err)?;

    if !inserted {
        return Err(ModtagError::NotFound(format!(
            "category {}",
            draft.category_id
        )));
    }
    Ok(subcategory)
}

/// Categories whose name or description contains `term`.
pub async fn search_categories(
    db: &Database,
    term: &str,
    limit: u32,
) -> Result<Vec<TagCategory>, ModtagError> {
    let pattern = like_pattern(term);
    let limit = i64::from(limit);
    db.connection()
        .call(move |conn| -> Result<Vec<TagCategory>, rusqlite::Error> {
            let mut stmt = conn.prepare(
                "SELECT id, name, description, order_index, created_at FROM tag_categories
                 WHERE unicode_lower(name) LIKE ?1 ESCAPE '\\'
                    OR unicode_lower(description) LIKE ?1 ESCAPE '\\'
                 ORDER BY order_index, name LIMIT ?2",
            )?;
            let rows = stmt.query_map(params![pattern, limit], category_from_row)?;
            rows.collect()
        })
        .await
        .map_err(map_tr_err)
}

/// Subcategories whose name or description contains `term`, with their parent category.
pub async fn search_subcategories(
    db: &Database,
    term: &str,
    limit: u32,
) -> Result<Vec<SubcategoryWithCategory>, ModtagError> {
    let pattern = like_pattern(term);
    let limit = i64::from(limit);
    db.connection()
        .call(move |conn| -> Result<Vec<SubcategoryWithCategory>, rusqlite::Error> {
            let mut stmt = conn.prepare(
                "SELECT s.id, s.category_id, s.name, s.description, s.order_index, s.created_at,
                        c.name
                 FROM tag_subcategories s JOIN tag_categories c ON c.id = s.category_id
                 WHERE unicode_lower(s.name) LIKE ?1 ESCAPE '\\'
                    OR unicode_lower(s.description) LIKE ?1 ESCAPE '\\'
                 ORDER BY c.order_index, s.order_index, s.name LIMIT ?2",
            )?;
            let rows = stmt.query_map(params![pattern, limit], |row| {
                let subcategory = subcategory_from_row(row)?;
                let tag_categories = CategoryRef {
                    id: subcategory.category_id.clone(),
                    name: row.get(6)?,
                };
                Ok(SubcategoryWithCategory {
                    subcategory,
                    tag_categories,
                })
            })?;
            rows.collect()
        })
        .await
        .map_err(map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    async fn test_db() -> (Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("tags.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
        (db, dir)
    }

    fn category(id: &str, name: &str, order_index: i64) -> CategoryDraft {
        CategoryDraft {
            id: Some(id.to_string()),
            name: name.to_string(),
            description: None,
            order_index,
        }
    }

    fn subcategory(id: &str, category_id: &str, name: &str, order_index: i64) -> SubcategoryDraft {
        SubcategoryDraft {
            id: Some(id.to_string()),
            category_id: category_id.to_string(),
            name: name.to_string(),
            description: Some(format!("{name} content")),
            order_index,
        }
    }

    #[tokio::test]
    async fn categories_nest_subcategories_in_order() {
        let (db, _dir) = test_db().await;
        create_category(&db, &category("tone", "Tone", 2)).await.unwrap();
        create_category(&db, &category("violence", "Violence", 1))
            .await
            .unwrap();
        create_subcategory(&db, &subcategory("gore", "violence", "Gore", 2))
            .await
            .unwrap();
        create_subcategory(&db, &subcategory("combat", "violence", "Combat", 1))
            .await
            .unwrap();

        let categories = list_categories(&db).await.unwrap();
        assert_eq!(categories.len(), 2);
        assert_eq!(categories[0].id, "violence");
        let subs = categories[0].tag_subcategories.as_ref().unwrap();
        assert_eq!(
            subs.iter().map(|s| s.id.as_str()).collect::<Vec<_>>(),
            vec!["combat", "gore"]
        );
        assert_eq!(categories[1].tag_subcategories.as_deref(), Some(&[][..]));
    }

    #[tokio::test]
    async fn subcategory_requires_existing_category() {
        let (db, _dir) = test_db().await;
        let err = create_subcategory(&db, &subcategory("gore", "missing", "Gore", 0))
            .await
            .unwrap_err();
        assert!(matches!(err, ModtagError::NotFound(_)));
    }

    #[tokio::test]
    async fn blank_category_name_is_rejected() {
        let (db, _dir) = test_db().await;
        let err = create_category(&db, &category("x", "  ", 0)).await.unwrap_err();
        assert!(matches!(err, ModtagError::Validation(_)));
    }

    #[tokio::test]
    async fn generated_ids_are_unique() {
        let (db, _dir) = test_db().await;
        let draft = CategoryDraft {
            name: "Tone".into(),
            ..Default::default()
        };
        let a = create_category(&db, &draft).await.unwrap();
        let b = create_category(&db, &draft).await.unwrap();
        assert_ne!(a.id, b.id);
    }

    #[tokio::test]
    async fn search_finds_categories_and_subcategories() {
        let (db, _dir) = test_db().await;
        create_category(&db, &category("violence", "Violence", 0))
            .await
            .unwrap();
        create_subcategory(&db, &subcategory("gore", "violence", "Gore", 0))
            .await
            .unwrap();
        create_subcategory(&db, &subcategory("combat", "violence", "Combat", 1))
            .await
            .unwrap();

        let cats = search_categories(&db, "viol", 20).await.unwrap();
        assert_eq!(cats.len(), 1);
        assert!(cats[0].tag_subcategories.is_none());

        let subs = search_subcategories(&db, "GOR", 20).await.unwrap();
        assert_eq!(subs.len(), 1);
        assert_eq!(subs[0].subcategory.id, "gore");
        assert_eq!(subs[0].tag_categories.name, "Violence");

        let by_description = search_subcategories(&db, "content", 1).await.unwrap();
        assert_eq!(by_description.len(), 1);
    }

    #[tokio::test]
    async fn search_folds_non_ascii_case() {
        let (db, _dir) = test_db().await;
        create_category(&db, &category("themes", "Ésotérisme", 0))
            .await
            .unwrap();
        create_subcategory(&db, &subcategory("aether", "themes", "Ætherwyrd", 0))
            .await
            .unwrap();

        let cats = search_categories(&db, "ésoté", 20).await.unwrap();
        assert_eq!(cats.len(), 1);
        assert_eq!(cats[0].id, "themes");

        let subs = search_subcategories(&db, "ætherw", 20).await.unwrap();
        assert_eq!(subs.len(), 1);
        assert_eq!(subs[0].subcategory.id, "aether");
    }
}
