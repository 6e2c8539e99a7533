// SPDX-FileCopyrightText: 2026 Modtag Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Selection and submission state for voting on one module.
//!
//! The local history says whether this client voted on a module and with
//! which session; the server rows decide what the selection was.

use std::sync::Arc;

use modtag_core::ModtagError;
use modtag_core::types::{TagCategory, VoteScope, VoteSubmission};
use tracing::{debug, info, warn};

use crate::api::VotingApi;
use crate::history::{LocalVoteRecord, VoteHistory};
use crate::session::SessionManager;
use crate::state::StateCell;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VotingState {
    /// Selected subcategory ids in click order.
    pub selected: Vec<String>,
    pub submitting: bool,
    pub loading_previous: bool,
    pub has_voted: bool,
    /// This client's local record for the module, if any.
    pub existing_vote: Option<LocalVoteRecord>,
    pub error: Option<String>,
}

pub struct VotingStore {
    api: Arc<dyn VotingApi>,
    sessions: SessionManager,
    history: VoteHistory,
    state: StateCell<VotingState>,
}

impl VotingStore {
    pub fn new(api: Arc<dyn VotingApi>, sessions: SessionManager, history: VoteHistory) -> Self {
        Self {
            api,
            sessions,
            history,
            state: StateCell::default(),
        }
    }

    pub fn state(&self) -> &StateCell<VotingState> {
        &self.state
    }

    pub fn toggle_subcategory(&self, subcategory_id: &str) {
        self.state.update(|s| {
            if let Some(pos) = s.selected.iter().position(|id| id == subcategory_id) {
                s.selected.remove(pos);
            } else {
                s.selected.push(subcategory_id.to_string());
            }
        });
    }

    pub fn set_selection(&self, subcategory_ids: Vec<String>) {
        self.state.update(|s| s.selected = subcategory_ids);
    }

    /// Restores the previous selection for `module_id`.
    ///
    /// Without a local record nothing happens. With one, the server rows for
    /// the record's session replace the selection when there are any; a failed
    /// fetch keeps the local record's selection.
    pub async fn load_previous_vote(&self, module_id: &str) -> Result<(), ModtagError> {
        let Some(record) = self.history.for_module(module_id)? else {
            return Ok(());
        };

        self.state.update(|s| {
            s.existing_vote = Some(record.clone());
            s.has_voted = true;
            s.loading_previous = true;
            s.selected = record.subcategory_ids.clone();
        });

        let scope = VoteScope::new(module_id, record.session_id.clone());
        match self.api.user_votes(&scope).await {
            Ok(rows) if !rows.is_empty() => {
                let ids: Vec<String> = rows.into_iter().map(|r| r.subcategory_id).collect();
                if ids != record.subcategory_ids {
                    debug!(module_id, "local vote differs from server, using server rows");
                }
                self.state.update(|s| s.selected = ids);
            }
            Ok(_) => {}
            Err(e) => warn!(module_id, error = %e, "failed to load previous vote"),
        }
        self.state.update(|s| s.loading_previous = false);
        Ok(())
    }

    /// Submits the current selection for a module.
    ///
    /// An empty or blank selection is rejected before any request. When this client
    /// already voted on the module the server selection is replaced
    /// atomically; otherwise the votes are inserted. `taxonomy` supplies the
    /// names stored in the local record.
    pub async fn submit_vote(
        &self,
        module_id: &str,
        module_name: &str,
        taxonomy: &[TagCategory],
    ) -> Result<LocalVoteRecord, ModtagError> {
        let state = self.state.get();
        if state.selected.is_empty() {
            return Err(ModtagError::Validation(
                "select at least one tag".to_string(),
            ));
        }
        let existing = match state.existing_vote {
            Some(record) => Some(record),
            None => self.history.for_module(module_id)?,
        };
        let session_id = match &existing {
            Some(record) => record.session_id.clone(),
            None => self.sessions.session_id()?,
        };
        // The record keeps the same trimmed, deduplicated ids the server stores.
        let submission =
            VoteSubmission::new(module_id, state.selected.clone(), session_id).validate()?;

        self.state.update(|s| {
            s.submitting = true;
            s.error = None;
        });
        let sent = if existing.is_some() {
            self.api.replace_votes(&submission).await.map(|r| r.votes.len())
        } else {
            self.api.submit_votes(&submission).await.map(|r| r.votes.len())
        };
        let inserted = match sent {
            Ok(n) => n,
            Err(e) => {
                self.state.update(|s| {
                    s.submitting = false;
                    s.error = Some(e.to_string());
                });
                return Err(e);
            }
        };

        let (subcategory_names, category_name) = describe_selection(&submission.subcategory_ids, taxonomy);
        let record = self.history.save(LocalVoteRecord {
            module_id: module_id.to_string(),
            module_name: module_name.to_string(),
            subcategory_ids: submission.subcategory_ids.clone(),
            subcategory_names,
            category_name,
            timestamp: 0,
            session_id: submission.session_id.clone(),
        })?;
        info!(module_id, inserted, replaced = existing.is_some(), "vote submitted");

        self.state.update(|s| {
            s.submitting = false;
            s.has_voted = true;
            s.existing_vote = Some(record.clone());
            s.selected.clear();
        });
        Ok(record)
    }

    /// Withdraws this client's vote on a module so it can vote again.
    ///
    /// Deletes the server rows and the local record, then seeds an empty
    /// selection with the previous one.
    pub async fn revote(&self, module_id: &str) -> Result<(), ModtagError> {
        let existing = match self.state.get().existing_vote {
            Some(record) => Some(record),
            None => self.history.for_module(module_id)?,
        };
        let Some(record) = existing else {
            return Ok(());
        };

        self.state.update(|s| s.submitting = true);
        let scope = VoteScope::new(module_id, record.session_id.clone());
        if let Err(e) = self.api.delete_votes(&scope).await {
            self.state.update(|s| {
                s.submitting = false;
                s.error = Some(e.to_string());
            });
            return Err(e);
        }
        self.history.remove(module_id)?;
        info!(module_id, "vote withdrawn for revote");

        self.state.update(|s| {
            s.submitting = false;
            s.has_voted = false;
            s.existing_vote = None;
            if s.selected.is_empty() {
                s.selected = record.subcategory_ids.clone();
            }
        });
        Ok(())
    }

    pub fn reset(&self) {
        self.state.set(VotingState::default());
    }
}

/// Names of the selected subcategories and their distinct category names.
fn describe_selection(selected: &[String], taxonomy: &[TagCategory]) -> (Vec<String>, String) {
    let mut names = Vec::new();
    let mut categories: Vec<&str> = Vec::new();
    for category in taxonomy {
        for sub in category.tag_subcategories.iter().flatten() {
            if selected.contains(&sub.id) {
                names.push(sub.name.clone());
                if !categories.contains(&category.name.as_str()) {
                    categories.push(&category.name);
                }
            }
        }
    }
    (names, categories.join(", "))
}
