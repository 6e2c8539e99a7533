// SPDX-FileCopyrightText: 2026 Modtag Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Local cache of the votes this client has cast.
//!
//! The server is the source of truth; this history only answers "did I vote
//! here, and with which session" without a round trip. At most one record
//! per module is kept.

use std::collections::HashSet;
use std::sync::Arc;

use modtag_core::ModtagError;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::local_store::{LocalStore, SESSION_ID_KEY, VOTE_HISTORY_KEY};
use crate::session::now_millis;

const DAY_MILLIS: i64 = 24 * 60 * 60 * 1000;

/// One module's last submitted selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalVoteRecord {
    pub module_id: String,
    pub module_name: String,
    pub subcategory_ids: Vec<String>,
    pub subcategory_names: Vec<String>,
    /// Distinct category names of the selection, comma separated.
    pub category_name: String,
    /// Epoch milliseconds of the last save.
    pub timestamp: i64,
    pub session_id: String,
}

/// Summary shown on the history page.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HistoryStats {
    pub total_votes: usize,
    pub unique_modules: usize,
    /// Oldest record timestamp, epoch milliseconds.
    pub oldest_vote: Option<i64>,
    pub session_id: Option<String>,
}

#[derive(Clone)]
pub struct VoteHistory {
    store: Arc<dyn LocalStore>,
}

impl VoteHistory {
    pub fn new(store: Arc<dyn LocalStore>) -> Self {
        Self { store }
    }

    /// Every record in insertion order. Unreadable history reads as empty.
    pub fn all(&self) -> Result<Vec<LocalVoteRecord>, ModtagError> {
        let Some(raw) = self.store.get(VOTE_HISTORY_KEY)? else {
            return Ok(Vec::new());
        };
        match serde_json::from_str(&raw) {
            Ok(records) => Ok(records),
            Err(e) => {
                warn!(error = %e, "local vote history is corrupt, ignoring it");
                Ok(Vec::new())
            }
        }
    }

    fn write(&self, records: &[LocalVoteRecord]) -> Result<(), ModtagError> {
        let json = serde_json::to_string(records).map_err(ModtagError::storage)?;
        self.store.set(VOTE_HISTORY_KEY, &json)
    }

    /// Records sorted newest first.
    pub fn sorted(&self) -> Result<Vec<LocalVoteRecord>, ModtagError> {
        let mut records = self.all()?;
        records.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(records)
    }

    pub fn for_module(&self, module_id: &str) -> Result<Option<LocalVoteRecord>, ModtagError> {
        Ok(self.all()?.into_iter().find(|r| r.module_id == module_id))
    }

    pub fn has_voted(&self, module_id: &str) -> Result<bool, ModtagError> {
        Ok(self.for_module(module_id)?.is_some())
    }

    /// Upserts by module id and stamps the current time.
    ///
    /// Replacing an existing record keeps that record's session id.
    pub fn save(&self, mut record: LocalVoteRecord) -> Result<LocalVoteRecord, ModtagError> {
        record.timestamp = now_millis();
        let mut records = self.all()?;
        match records.iter_mut().find(|r| r.module_id == record.module_id) {
            Some(existing) => {
                record.session_id = existing.session_id.clone();
                *existing = record.clone();
            }
            None => records.push(record.clone()),
        }
        self.write(&records)?;
        debug!(module_id = %record.module_id, "local vote saved");
        Ok(record)
    }

    /// Drops the module's record. Returns whether one existed.
    pub fn remove(&self, module_id: &str) -> Result<bool, ModtagError> {
        let mut records = self.all()?;
        let before = records.len();
        records.retain(|r| r.module_id != module_id);
        if records.len() == before {
            return Ok(false);
        }
        self.write(&records)?;
        Ok(true)
    }

    /// Keeps only records newer than `days` before now. Returns how many were dropped.
    pub fn cleanup_expired(&self, days: u32) -> Result<usize, ModtagError> {
        self.cleanup_expired_at(days, now_millis())
    }

    /// [`cleanup_expired`](Self::cleanup_expired) against an explicit clock.
    pub fn cleanup_expired_at(&self, days: u32, now: i64) -> Result<usize, ModtagError> {
        let cutoff = now - i64::from(days) * DAY_MILLIS;
        let mut records = self.all()?;
        let before = records.len();
        records.retain(|r| r.timestamp > cutoff);
        let dropped = before - records.len();
        if dropped > 0 {
            self.write(&records)?;
            debug!(dropped, days, "expired local votes removed");
        }
        Ok(dropped)
    }

    pub fn stats(&self) -> Result<HistoryStats, ModtagError> {
        let records = self.all()?;
        let unique_modules = records
            .iter()
            .map(|r| r.module_id.as_str())
            .collect::<HashSet<_>>()
            .len();
        Ok(HistoryStats {
            total_votes: records.len(),
            unique_modules,
            oldest_vote: records.iter().map(|r| r.timestamp).min(),
            session_id: self.store.get(SESSION_ID_KEY)?,
        })
    }

    /// Removes every record.
    pub fn clear(&self) -> Result<(), ModtagError> {
        self.store.remove(VOTE_HISTORY_KEY)
    }
}
