// SPDX-FileCopyrightText: 2026 Modtag Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Local vote history view.

use modtag_core::ModtagError;
use tracing::warn;

use crate::history::{HistoryStats, LocalVoteRecord, VoteHistory};
use crate::state::StateCell;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserState {
    /// Newest first.
    pub history: Vec<LocalVoteRecord>,
    pub stats: HistoryStats,
    pub loading: bool,
}

pub struct UserStore {
    history: VoteHistory,
    state: StateCell<UserState>,
}

impl UserStore {
    pub fn new(history: VoteHistory) -> Self {
        Self {
            history,
            state: StateCell::default(),
        }
    }

    pub fn state(&self) -> &StateCell<UserState> {
        &self.state
    }

    pub fn load_vote_history(&self) -> Result<(), ModtagError> {
        self.state.update(|s| s.loading = true);
        let loaded = self
            .history
            .sorted()
            .and_then(|records| Ok((records, self.history.stats()?)));
        match loaded {
            Ok((records, stats)) => {
                self.state.set(UserState {
                    history: records,
                    stats,
                    loading: false,
                });
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "failed to load local vote history");
                self.state.update(|s| s.loading = false);
                Err(e)
            }
        }
    }

    /// Forgets the local record for a module. Server votes are left alone.
    pub fn remove_vote(&self, module_id: &str) -> Result<(), ModtagError> {
        self.history.remove(module_id)?;
        self.load_vote_history()
    }

    /// Drops records older than `days_to_keep` days. Returns how many were dropped.
    pub fn cleanup_old_data(&self, days_to_keep: u32) -> Result<usize, ModtagError> {
        let dropped = self.history.cleanup_expired(days_to_keep)?;
        self.load_vote_history()?;
        Ok(dropped)
    }

    pub fn reset(&self) {
        self.state.set(UserState::default());
    }
}
