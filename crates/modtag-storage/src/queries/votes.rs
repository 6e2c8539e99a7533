// SPDX-FileCopyrightText: 2026 Modtag Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Vote queries.
//!
//! A session holds at most one row per (module, subcategory). Inserts skip
//! subcategories the session already voted for; replacement deletes and
//! re-inserts inside a single transaction.

use modtag_core::ModtagError;
use modtag_core::types::{
    CategoryRef, DeleteOutcome, ReplaceOutcome, SubcategoryDetail, TagVote, UserVote, VoteCount,
    VoteScope, VoteSubmission,
};
use rusqlite::{OptionalExtension, Row, Transaction, params, params_from_iter};
use tracing::debug;

use crate::database::{Database, map_tr_err, now_timestamp};
use crate::queries::placeholders;

/// Checks that the module and every subcategory exist.
///
/// The outer error is a database failure; the inner one is a domain error to
/// hand back to the caller untouched.
fn check_references(
    tx: &Transaction<'_>,
    submission: &VoteSubmission,
) -> rusqlite::Result<Result<(), ModtagError>> {
    let module: Option<String> = tx
        .query_row(
            "SELECT id FROM modules WHERE id = ?1",
            params![submission.module_id],
            |row| row.get(0),
        )
        .optional()?;
    if module.is_none() {
        return Ok(Err(ModtagError::NotFound(format!(
            "module {}",
            submission.module_id
        ))));
    }

    let sql = format!(
        "SELECT id FROM tag_subcategories WHERE id IN ({})",
        placeholders(1, submission.subcategory_ids.len())
    );
    let mut stmt = tx.prepare(&sql)?;
    let known = stmt
        .query_map(params_from_iter(submission.subcategory_ids.iter()), |row| {
            row.get::<_, String>(0)
        })?
        .collect::<Result<std::collections::HashSet<_>, _>>()?;
    if let Some(unknown) = submission
        .subcategory_ids
        .iter()
        .find(|id| !known.contains(*id))
    {
        return Ok(Err(ModtagError::Validation(format!(
            "unknown subcategory: {unknown}"
        ))));
    }
    Ok(Ok(()))
}

fn insert_rows(
    tx: &Transaction<'_>,
    submission: &VoteSubmission,
    subcategory_ids: &[String],
) -> rusqlite::Result<Vec<TagVote>> {
    let mut stmt = tx.prepare(
        "INSERT INTO tag_votes (id, module_id, subcategory_id, session_id, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
    )?;
    let created_at = now_timestamp();
    let mut inserted = Vec::with_capacity(subcategory_ids.len());
    for subcategory_id in subcategory_ids {
        let vote = TagVote {
            id: uuid::Uuid::new_v4().to_string(),
            module_id: submission.module_id.clone(),
            subcategory_id: subcategory_id.clone(),
            session_id: submission.session_id.clone(),
            created_at: created_at.clone(),
        };
        stmt.execute(params![
            vote.id,
            vote.module_id,
            vote.subcategory_id,
            vote.session_id,
            vote.created_at
        ])?;
        inserted.push(vote);
    }
    Ok(inserted)
}

fn delete_scope(tx: &Transaction<'_>, module_id: &str, session_id: &str) -> rusqlite::Result<u64> {
    let deleted = tx.execute(
        "DELETE FROM tag_votes WHERE module_id = ?1 AND session_id = ?2",
        params![module_id, session_id],
    )?;
    Ok(deleted as u64)
}

/// Insert rows for the subcategories this session has not voted for yet.
///
/// Returns only the new rows; an all-duplicate submission returns an empty list.
pub async fn insert_votes(
    db: &Database,
    submission: &VoteSubmission,
) -> Result<Vec<TagVote>, ModtagError> {
    let submission = submission.clone();
    let inserted = db
        .connection()
        .call(
            move |conn| -> Result<Result<Vec<TagVote>, ModtagError>, rusqlite::Error> {
                let tx = conn.transaction()?;
                if let Err(e) = check_references(&tx, &submission)? {
                    return Ok(Err(e));
                }

                let existing = {
                    let mut stmt = tx.prepare(
                        "SELECT subcategory_id FROM tag_votes
                         WHERE module_id = ?1 AND session_id = ?2",
                    )?;
                    stmt.query_map(
                        params![submission.module_id, submission.session_id],
                        |row| row.get::<_, String>(0),
                    )?
                    .collect::<Result<std::collections::HashSet<_>, _>>()?
                };
                let fresh: Vec<String> = submission
                    .subcategory_ids
                    .iter()
                    .filter(|id| !existing.contains(*id))
                    .cloned()
                    .collect();

                let inserted = insert_rows(&tx, &submission, &fresh)?;
                tx.commit()?;
                Ok(Ok(inserted))
            },
        )
        .await
        .map_err(map_tr_err)??;

    debug!(count = inserted.len(), "votes inserted");
    Ok(inserted)
}

/// Replace the session's selection for a module with exactly `submission.subcategory_ids`.
pub async fn replace_votes(
    db: &Database,
    submission: &VoteSubmission,
) -> Result<ReplaceOutcome, ModtagError> {
    let submission = submission.clone();
    let outcome = db
        .connection()
        .call(
            move |conn| -> Result<Result<ReplaceOutcome, ModtagError>, rusqlite::Error> {
                let tx = conn.transaction()?;
                if let Err(e) = check_references(&tx, &submission)? {
                    return Ok(Err(e));
                }
                let deleted = delete_scope(&tx, &submission.module_id, &submission.session_id)?;
                let inserted = insert_rows(&tx, &submission, &submission.subcategory_ids)?;
                tx.commit()?;
                Ok(Ok(ReplaceOutcome { deleted, inserted }))
            },
        )
        .await
        .map_err(map_tr_err)??;

    debug!(
        deleted = outcome.deleted,
        inserted = outcome.inserted.len(),
        "votes replaced"
    );
    Ok(outcome)
}

/// Delete every vote the session holds for the module.
pub async fn delete_votes(db: &Database, scope: &VoteScope) -> Result<DeleteOutcome, ModtagError> {
    let scope = scope.clone();
    db.connection()
        .call(move |conn| -> Result<DeleteOutcome, rusqlite::Error> {
            let tx = conn.transaction()?;
            let found: i64 = tx.query_row(
                "SELECT COUNT(*) FROM tag_votes WHERE module_id = ?1 AND session_id = ?2",
                params![scope.module_id, scope.session_id],
                |row| row.get(0),
            )?;
            let deleted = delete_scope(&tx, &scope.module_id, &scope.session_id)?;
            tx.commit()?;
            Ok(DeleteOutcome {
                found: found as u64,
                deleted,
            })
        })
        .await
        .map_err(map_tr_err)
}

fn detail_from_row(row: &Row<'_>, first: usize) -> rusqlite::Result<SubcategoryDetail> {
    Ok(SubcategoryDetail {
        id: row.get(first)?,
        name: row.get(first + 1)?,
        description: row.get(first + 2)?,
        tag_categories: CategoryRef {
            id: row.get(first + 3)?,
            name: row.get(first + 4)?,
        },
    })
}

/// Per-subcategory vote counts for a module, in taxonomy order.
pub async fn vote_counts(db: &Database, module_id: &str) -> Result<Vec<VoteCount>, ModtagError> {
    let module_id = module_id.to_string();
    db.connection()
        .call(move |conn| -> Result<Vec<VoteCount>, rusqlite::Error> {
            let mut stmt = conn.prepare(
                "SELECT COUNT(*), s.id, s.name, s.description, c.id, c.name
                 FROM tag_votes v
                 JOIN tag_subcategories s ON s.id = v.subcategory_id
                 JOIN tag_categories c ON c.id = s.category_id
                 WHERE v.module_id = ?1
                 GROUP BY s.id
                 ORDER BY c.order_index, s.order_index, s.name",
            )?;
            let rows = stmt.query_map(params![module_id], |row| {
                let detail = detail_from_row(row, 1)?;
                Ok(VoteCount {
                    subcategory_id: detail.id.clone(),
                    count: row.get(0)?,
                    tag_subcategories: detail,
                })
            })?;
            rows.collect()
        })
        .await
        .map_err(map_tr_err)
}

/// The rows one session holds for a module.
pub async fn user_votes(db: &Database, scope: &VoteScope) -> Result<Vec<UserVote>, ModtagError> {
    let scope = scope.clone();
    db.connection()
        .call(move |conn| -> Result<Vec<UserVote>, rusqlite::Error> {
            let mut stmt = conn.prepare(
                "SELECT v.created_at, s.id, s.name, s.description, c.id, c.name
                 FROM tag_votes v
                 JOIN tag_subcategories s ON s.id = v.subcategory_id
                 JOIN tag_categories c ON c.id = s.category_id
                 WHERE v.module_id = ?1 AND v.session_id = ?2
                 ORDER BY c.order_index, s.order_index, s.name",
            )?;
            let rows = stmt.query_map(params![scope.module_id, scope.session_id], |row| {
                let subcategory = detail_from_row(row, 1)?;
                Ok(UserVote {
                    subcategory_id: subcategory.id.clone(),
                    subcategory,
                    created_at: row.get(0)?,
                })
            })?;
            rows.collect()
        })
        .await
        .map_err(map_tr_err)
}
