// SPDX-FileCopyrightText: 2026 Modtag Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Paged module listing state.

use std::sync::Arc;
use std::time::Duration;

use modtag_core::ModtagError;
use modtag_core::types::{Module, Pagination};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::api::VotingApi;
use crate::debounce::Debouncer;
use crate::state::StateCell;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModulesState {
    pub modules: Vec<Module>,
    pub pagination: Option<Pagination>,
    pub current_page: u32,
    /// Active search term; empty lists everything.
    pub search: String,
    pub loading: bool,
    pub error: Option<String>,
}

pub struct ModulesStore {
    api: Arc<dyn VotingApi>,
    page_size: u32,
    state: StateCell<ModulesState>,
}

impl ModulesStore {
    pub fn new(api: Arc<dyn VotingApi>, page_size: u32) -> Self {
        Self {
            api,
            page_size,
            state: StateCell::new(ModulesState {
                current_page: 1,
                ..ModulesState::default()
            }),
        }
    }

    pub fn state(&self) -> &StateCell<ModulesState> {
        &self.state
    }

    /// Loads one page. On failure the list is cleared and the error recorded.
    pub async fn fetch_modules(&self, page: u32, search: Option<&str>) -> Result<(), ModtagError> {
        let page = page.max(1);
        let search = search.map(str::trim).unwrap_or_default().to_string();
        self.state.update(|s| {
            s.loading = true;
            s.error = None;
        });

        let term = (!search.is_empty()).then_some(search.as_str());
        match self.api.list_modules(page, Some(self.page_size), term).await {
            Ok(result) => {
                self.state.update(|s| {
                    s.modules = result.modules;
                    s.pagination = Some(result.pagination);
                    s.current_page = page;
                    s.search = search;
                    s.loading = false;
                });
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, page, "failed to fetch modules");
                self.state.update(|s| {
                    s.modules.clear();
                    s.pagination = None;
                    s.loading = false;
                    s.error = Some(e.to_string());
                });
                Err(e)
            }
        }
    }

    /// Starts a new search from the first page.
    pub async fn search_modules(&self, query: &str) -> Result<(), ModtagError> {
        self.fetch_modules(1, Some(query)).await
    }

    /// Returns an input that searches once typing pauses for `delay`.
    ///
    /// Queries run one after another in settle order.
    pub fn debounced_search(self: &Arc<Self>, delay: Duration) -> SearchInput {
        let (debouncer, mut settled) = Debouncer::<String>::new(delay);
        let store = Arc::clone(self);
        let task = tokio::spawn(async move {
            let mut last = Ok(());
            while let Some(query) = settled.recv().await {
                debug!(query = %query, "search settled");
                last = store.search_modules(&query).await;
            }
            last
        });
        SearchInput { debouncer, task }
    }

    /// Moves to `page` when it is within the known page range.
    pub async fn go_to_page(&self, page: u32) -> Result<(), ModtagError> {
        let state = self.state.get();
        let total_pages = state.pagination.as_ref().map_or(1, |p| p.total_pages.max(1));
        if page < 1 || page > total_pages {
            return Ok(());
        }
        self.fetch_modules(page, Some(&state.search)).await
    }

    /// Reloads the current page and search.
    pub async fn refresh(&self) -> Result<(), ModtagError> {
        let state = self.state.get();
        self.fetch_modules(state.current_page, Some(&state.search))
            .await
    }

    pub fn reset(&self) {
        self.state.set(ModulesState {
            current_page: 1,
            ..ModulesState::default()
        });
    }
}

/// Typed search text feeding a [`ModulesStore`].
pub struct SearchInput {
    debouncer: Debouncer<String>,
    task: JoinHandle<Result<(), ModtagError>>,
}

impl SearchInput {
    /// Records the current query text, restarting the quiet period.
    pub fn input(&self, query: impl Into<String>) {
        self.debouncer.push(query.into());
    }

    /// Sends any pending query now and waits for the searches to finish.
    ///
    /// Returns the outcome of the last search.
    pub async fn finish(self) -> Result<(), ModtagError> {
        drop(self.debouncer);
        self.task
            .await
            .map_err(|e| ModtagError::Internal(format!("search task failed: {e}")))?
    }
}
