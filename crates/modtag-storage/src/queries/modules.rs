// SPDX-FileCopyrightText: 2026 Modtag Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Module catalog queries.

use modtag_core::ModtagError;
use modtag_core::types::{Module, ModuleDraft, ModulePage, ModuleQuery, Pagination};
use rusqlite::{Row, params};

use crate::database::{Database, map_tr_err, now_timestamp};
use crate::queries::like_pattern;

const MODULE_COLUMNS: &str = "m.id, m.name, m.author, m.system, m.description, m.purchase_url,
     m.created_at, m.updated_at";

const VOTE_COUNT_COLUMN: &str =
    "(SELECT COUNT(*) FROM tag_votes v WHERE v.module_id = m.id) AS vote_count";

/// Authors are matched per name, not against the stored JSON text.
const SEARCH_FILTER: &str = "(unicode_lower(m.name) LIKE ?1 ESCAPE '\\'
     OR EXISTS (SELECT 1 FROM json_each(m.author) a
                WHERE unicode_lower(a.value) LIKE ?1 ESCAPE '\\')
     OR unicode_lower(m.system) LIKE ?1 ESCAPE '\\'
     OR unicode_lower(m.description) LIKE ?1 ESCAPE '\\')";

/// Decode a module row selected with [`MODULE_COLUMNS`], optionally followed by a vote count.
fn module_from_row(row: &Row<'_>, with_count: bool) -> rusqlite::Result<Module> {
    let author_json: String = row.get(2)?;
    let author: Vec<String> = serde_json::from_str(&author_json).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(2, rusqlite::types::Type::Text, Box::new(e))
    })?;
    Ok(Module {
        id: row.get(0)?,
        name: row.get(1)?,
        author,
        system: row.get(3)?,
        description: row.get(4)?,
        purchase_url: row.get(5)?,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
        vote_count: if with_count { Some(row.get(8)?) } else { None },
    })
}

/// List one page of modules, newest first, each with its total vote count.
pub async fn list_modules(db: &Database, query: &ModuleQuery) -> Result<ModulePage, ModtagError> {
    let pattern = query
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(like_pattern);
    let limit = i64::from(query.limit);
    let offset = query.offset() as i64;
    let (page, page_size) = (query.page, query.limit);

    let (modules, total) = db
        .connection()
        .call(move |conn| -> Result<(Vec<Module>, i64), rusqlite::Error> {
            let filter = if pattern.is_some() {
                format!("WHERE {SEARCH_FILTER}")
            } else {
                String::new()
            };
            let total: i64 = match &pattern {
                Some(p) => conn.query_row(
                    &format!("SELECT COUNT(*) FROM modules m {filter}"),
                    params![p],
                    |row| row.get(0),
                )?,
                None => conn.query_row("SELECT COUNT(*) FROM modules", [], |row| row.get(0))?,
            };

            let sql = format!(
                "SELECT {MODULE_COLUMNS}, {VOTE_COUNT_COLUMN} FROM modules m {filter}
                 ORDER BY m.created_at DESC, m.rowid DESC
                 LIMIT ?{n} OFFSET ?{o}",
                n = if pattern.is_some() { 2 } else { 1 },
                o = if pattern.is_some() { 3 } else { 2 },
            );
            let mut stmt = conn.prepare(&sql)?;
            let modules = match &pattern {
                Some(p) => stmt
                    .query_map(params![p, limit, offset], |row| module_from_row(row, true))?
                    .collect::<Result<Vec<_>, _>>()?,
                None => stmt
                    .query_map(params![limit, offset], |row| module_from_row(row, true))?
                    .collect::<Result<Vec<_>, _>>()?,
            };
            Ok((modules, total))
        })
        .await
        .map_err(map_tr_err)?;

    Ok(ModulePage {
        modules,
        pagination: Pagination::new(page, page_size, total),
    })
}

/// Insert a new module and return the stored record.
pub async fn create_module(db: &Database, draft: &ModuleDraft) -> Result<Module, ModtagError> {
    let author_json = serde_json::to_string(&draft.author).map_err(ModtagError::storage)?;
    let now = now_timestamp();
    let module = Module {
        id: uuid::Uuid::new_v4().to_string(),
        name: draft.name.clone(),
        author: draft.author.clone(),
        system: draft.system.clone(),
        description: draft.description.clone(),
        purchase_url: draft.purchase_url.clone(),
        created_at: now.clone(),
        updated_at: now,
        vote_count: None,
    };

    let row = module.clone();
    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> {
            conn.execute(
                "INSERT INTO modules
                 (id, name, author, system, description, purchase_url, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    row.id,
                    row.name,
                    author_json,
                    row.system,
                    row.description,
                    row.purchase_url,
                    row.created_at,
                    row.updated_at,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)?;

    Ok(module)
}

/// Get a module by ID.
pub async fn get_module(db: &Database, id: &str) -> Result<Option<Module>, ModtagError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| -> Result<Option<Module>, rusqlite::Error> {
            let mut stmt =
                conn.prepare(&format!("SELECT {MODULE_COLUMNS} FROM modules m WHERE m.id = ?1"))?;
            match stmt.query_row(params![id], |row| module_from_row(row, false)) {
                Ok(module) => Ok(Some(module)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(map_tr_err)
}

/// Unpaged substring search, newest first.
pub async fn search_modules(
    db: &Database,
    term: &str,
    limit: u32,
) -> Result<Vec<Module>, ModtagError> {
    let pattern = like_pattern(term);
    let limit = i64::from(limit);
    db.connection()
        .call(move |conn| -> Result<Vec<Module>, rusqlite::Error> {
            let mut stmt = conn.prepare(&format!(
                "SELECT {MODULE_COLUMNS} FROM modules m WHERE {SEARCH_FILTER}
                 ORDER BY m.created_at DESC, m.rowid DESC LIMIT ?2"
            ))?;
            let rows = stmt.query_map(params![pattern, limit], |row| module_from_row(row, false))?;
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
        let db_path = dir.path().join("modules.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
        (db, dir)
    }

    fn draft(name: &str, author: &str) -> ModuleDraft {
        ModuleDraft {
            name: name.to_string(),
            author: vec![author.to_string()],
            system: Some("OSR".to_string()),
            description: None,
            purchase_url: None,
        }
    }

    fn query(page: u32, limit: u32, search: Option<&str>) -> ModuleQuery {
        ModuleQuery {
            page,
            limit,
            search: search.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn create_and_get_module() {
        let (db, _dir) = test_db().await;
        let created = create_module(&db, &draft("Tomb of Ash", "Alice")).await.unwrap();
        assert_eq!(created.author, vec!["Alice"]);

        let fetched = get_module(&db, &created.id).await.unwrap().unwrap();
        assert_eq!(fetched.name, "Tomb of Ash");
        assert_eq!(fetched.system.as_deref(), Some("OSR"));
        assert_eq!(fetched.vote_count, None);
    }

    #[tokio::test]
    async fn get_missing_module_returns_none() {
        let (db, _dir) = test_db().await;
        assert!(get_module(&db, "nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn list_is_newest_first_and_paged() {
        let (db, _dir) = test_db().await;
        for i in 0..5 {
            create_module(&db, &draft(&format!("Module {i}"), "Alice"))
                .await
                .unwrap();
        }

        let first = list_modules(&db, &query(1, 2, None)).await.unwrap();
        assert_eq!(first.modules.len(), 2);
        assert_eq!(first.modules[0].name, "Module 4");
        assert_eq!(first.modules[1].name, "Module 3");
        assert_eq!(first.pagination.total, 5);
        assert_eq!(first.pagination.total_pages, 3);

        let last = list_modules(&db, &query(3, 2, None)).await.unwrap();
        assert_eq!(last.modules.len(), 1);
        assert_eq!(last.modules[0].name, "Module 0");
        assert_eq!(last.modules[0].vote_count, Some(0));
    }

    #[tokio::test]
    async fn page_past_the_end_is_empty() {
        let (db, _dir) = test_db().await;
        create_module(&db, &draft("Only", "Alice")).await.unwrap();
        let page = list_modules(&db, &query(5, 20, None)).await.unwrap();
        assert!(page.modules.is_empty());
        assert_eq!(page.pagination.total, 1);
    }

    #[tokio::test]
    async fn list_search_matches_author_case_insensitively() {
        let (db, _dir) = test_db().await;
        create_module(&db, &draft("Tomb of Ash", "Alice")).await.unwrap();
        create_module(&db, &draft("Sunken Keep", "Bob")).await.unwrap();

        let page = list_modules(&db, &query(1, 20, Some("bob"))).await.unwrap();
        assert_eq!(page.pagination.total, 1);
        assert_eq!(page.modules[0].name, "Sunken Keep");
    }

    #[tokio::test]
    async fn list_search_folds_non_ascii_case() {
        let (db, _dir) = test_db().await;
        create_module(&db, &draft("Épée Noire", "Ærin Vale")).await.unwrap();
        create_module(&db, &draft("Tomb of Ash", "Alice")).await.unwrap();

        let by_name = list_modules(&db, &query(1, 20, Some("épée"))).await.unwrap();
        assert_eq!(by_name.pagination.total, 1);
        assert_eq!(by_name.modules[0].name, "Épée Noire");

        let by_author = search_modules(&db, "ærin", 20).await.unwrap();
        assert_eq!(by_author.len(), 1);
        assert_eq!(by_author[0].name, "Épée Noire");

        let upper = search_modules(&db, "ÉPÉE NOIRE", 20).await.unwrap();
        assert_eq!(upper.len(), 1);
    }

    #[tokio::test]
    async fn author_search_matches_names_not_json_text() {
        let (db, _dir) = test_db().await;
        let mut pair = draft("Duet", "Alice");
        pair.author.push("Carol".to_string());
        create_module(&db, &pair).await.unwrap();
        create_module(&db, &draft("Cleaver", "Bob \"Axe\" Ray")).await.unwrap();

        let separators = list_modules(&db, &query(1, 20, Some("\",\""))).await.unwrap();
        assert_eq!(separators.pagination.total, 0);
        assert!(search_modules(&db, "\",", 20).await.unwrap().is_empty());

        let quoted = search_modules(&db, "\"Axe\"", 20).await.unwrap();
        assert_eq!(quoted.len(), 1);
        assert_eq!(quoted[0].name, "Cleaver");
        assert_eq!(quoted[0].author, vec!["Bob \"Axe\" Ray"]);

        let second_author = search_modules(&db, "carol", 20).await.unwrap();
        assert_eq!(second_author.len(), 1);
        assert_eq!(second_author[0].name, "Duet");
    }

    #[tokio::test]
    async fn search_treats_wildcards_literally() {
        let (db, _dir) = test_db().await;
        create_module(&db, &draft("100% Dungeon", "Alice")).await.unwrap();
        create_module(&db, &draft("1000 Rooms", "Bob")).await.unwrap();

        let hits = search_modules(&db, "100%", 20).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "100% Dungeon");

        let limited = search_modules(&db, "100", 1).await.unwrap();
        assert_eq!(limited.len(), 1);
    }
}
