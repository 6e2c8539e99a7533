// SPDX-FileCopyrightText: 2026 Modtag Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-category vote results for one module.

use std::sync::Arc;

use modtag_core::ModtagError;
use modtag_core::stats::{CategoryResults, group_by_category, total_votes};

use crate::api::VotingApi;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResultsSummary {
    pub module_id: String,
    pub total_votes: i64,
    pub categories: Vec<CategoryResults>,
}

impl ResultsSummary {
    pub fn is_empty(&self) -> bool {
        self.total_votes == 0
    }
}

pub struct ResultsView {
    api: Arc<dyn VotingApi>,
}

impl ResultsView {
    pub fn new(api: Arc<dyn VotingApi>) -> Self {
        Self { api }
    }

    pub async fn load(&self, module_id: &str) -> Result<ResultsSummary, ModtagError> {
        let counts = self.api.vote_counts(module_id).await?;
        Ok(ResultsSummary {
            module_id: module_id.to_string(),
            total_votes: total_votes(&counts),
            categories: group_by_category(&counts),
        })
    }
}
