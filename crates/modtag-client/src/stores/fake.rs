// SPDX-FileCopyrightText: 2026 Modtag Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory [`VotingApi`] for store tests.

use std::collections::BTreeMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use modtag_core::ModtagError;
use modtag_core::api::{
    SearchResponse, VoteDeleteResponse, VoteInsertResponse, VoteReplaceResponse,
};
use modtag_core::types::{
    CategoryRef, Module, ModulePage, ModuleWithVotes, NewModule, Pagination, SearchKind,
    SearchResults, SubcategoryDetail, TagCategory, TagVote, UserVote, VoteCount, VoteScope,
    VoteSubmission,
};

use crate::api::VotingApi;

#[derive(Default)]
pub struct FakeApi {
    pub modules: Mutex<Vec<Module>>,
    /// (module, session) -> selected subcategory ids.
    pub votes: Mutex<BTreeMap<(String, String), Vec<String>>>,
    /// Names of the calls made, in order.
    pub calls: Mutex<Vec<String>>,
    pub fail: AtomicBool,
}

impl FakeApi {
    pub fn with_modules(count: usize) -> Self {
        let modules = (0..count)
            .map(|i| Module {
                id: format!("m{i}"),
                name: format!("Module {i}"),
                author: vec!["Alice".into()],
                system: None,
                description: None,
                purchase_url: None,
                created_at: String::new(),
                updated_at: String::new(),
                vote_count: Some(0),
            })
            .collect();
        Self {
            modules: Mutex::new(modules),
            ..Self::default()
        }
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn selection(&self, module: &str, session: &str) -> Option<Vec<String>> {
        self.votes
            .lock()
            .unwrap()
            .get(&(module.to_string(), session.to_string()))
            .cloned()
    }

    fn record(&self, call: &str) -> Result<(), ModtagError> {
        self.calls.lock().unwrap().push(call.to_string());
        if self.fail.load(Ordering::SeqCst) {
            return Err(ModtagError::Api {
                status: 500,
                message: "boom".into(),
            });
        }
        Ok(())
    }

    fn detail(id: &str) -> SubcategoryDetail {
        SubcategoryDetail {
            id: id.to_string(),
            name: id.to_uppercase(),
            description: None,
            tag_categories: CategoryRef {
                id: "cat-1".into(),
                name: "Violence".into(),
            },
        }
    }

    fn rows(submission: &VoteSubmission, ids: &[String]) -> Vec<TagVote> {
        ids.iter()
            .map(|id| TagVote {
                id: format!("v-{id}"),
                module_id: submission.module_id.clone(),
                subcategory_id: id.clone(),
                session_id: submission.session_id.clone(),
                created_at: String::new(),
            })
            .collect()
    }
}

#[async_trait]
impl VotingApi for FakeApi {
    async fn list_modules(
        &self,
        page: u32,
        limit: Option<u32>,
        search: Option<&str>,
    ) -> Result<ModulePage, ModtagError> {
        self.record("list_modules")?;
        let limit = limit.unwrap_or(20);
        let matching: Vec<Module> = self
            .modules
            .lock()
            .unwrap()
            .iter()
            .filter(|m| search.is_none_or(|s| m.name.to_lowercase().contains(&s.to_lowercase())))
            .cloned()
            .collect();
        let total = matching.len() as i64;
        let modules = matching
            .into_iter()
            .skip(((page.max(1) - 1) * limit) as usize)
            .take(limit as usize)
            .collect();
        Ok(ModulePage {
            modules,
            pagination: Pagination::new(page, limit, total),
        })
    }

    async fn get_module(&self, id: &str) -> Result<ModuleWithVotes, ModtagError> {
        self.record("get_module")?;
        let module = self
            .modules
            .lock()
            .unwrap()
            .iter()
            .find(|m| m.id == id)
            .cloned()
            .ok_or(ModtagError::Api {
                status: 404,
                message: "module not found".into(),
            })?;
        Ok(ModuleWithVotes {
            module,
            vote_statistics: vec![],
            total_votes: 0,
        })
    }

    async fn create_module(&self, _module: &NewModule) -> Result<Module, ModtagError> {
        self.record("create_module")?;
        Err(ModtagError::Internal("not supported by fake".into()))
    }

    async fn categories(&self) -> Result<Vec<TagCategory>, ModtagError> {
        self.record("categories")?;
        Ok(vec![])
    }

    async fn submit_votes(
        &self,
        submission: &VoteSubmission,
    ) -> Result<VoteInsertResponse, ModtagError> {
        self.record("submit_votes")?;
        let mut votes = self.votes.lock().unwrap();
        let entry = votes
            .entry((submission.module_id.clone(), submission.session_id.clone()))
            .or_default();
        let fresh: Vec<String> = submission
            .subcategory_ids
            .iter()
            .filter(|id| !entry.contains(id))
            .cloned()
            .collect();
        entry.extend(fresh.iter().cloned());
        Ok(VoteInsertResponse {
            message: "votes submitted successfully".into(),
            votes: Self::rows(submission, &fresh),
        })
    }

    async fn replace_votes(
        &self,
        submission: &VoteSubmission,
    ) -> Result<VoteReplaceResponse, ModtagError> {
        self.record("replace_votes")?;
        let previous = self.votes.lock().unwrap().insert(
            (submission.module_id.clone(), submission.session_id.clone()),
            submission.subcategory_ids.clone(),
        );
        Ok(VoteReplaceResponse {
            message: "votes replaced successfully".into(),
            deleted_count: previous.map_or(0, |p| p.len() as u64),
            votes: Self::rows(submission, &submission.subcategory_ids),
        })
    }

    async fn delete_votes(&self, scope: &VoteScope) -> Result<VoteDeleteResponse, ModtagError> {
        self.record("delete_votes")?;
        let removed = self
            .votes
            .lock()
            .unwrap()
            .remove(&(scope.module_id.clone(), scope.session_id.clone()))
            .map_or(0, |p| p.len() as u64);
        Ok(VoteDeleteResponse {
            message: "votes deleted successfully".into(),
            deleted_count: removed,
            found_count: removed,
        })
    }

    async fn vote_counts(&self, module_id: &str) -> Result<Vec<VoteCount>, ModtagError> {
        self.record("vote_counts")?;
        let mut counts: BTreeMap<String, i64> = BTreeMap::new();
        for ((module, _), ids) in self.votes.lock().unwrap().iter() {
            if module == module_id {
                for id in ids {
                    *counts.entry(id.clone()).or_default() += 1;
                }
            }
        }
        Ok(counts
            .into_iter()
            .map(|(id, count)| VoteCount {
                tag_subcategories: Self::detail(&id),
                subcategory_id: id,
                count,
            })
            .collect())
    }

    async fn user_votes(&self, scope: &VoteScope) -> Result<Vec<UserVote>, ModtagError> {
        self.record("user_votes")?;
        Ok(self
            .selection(&scope.module_id, &scope.session_id)
            .unwrap_or_default()
            .iter()
            .map(|id| UserVote {
                subcategory_id: id.clone(),
                subcategory: Self::detail(id),
                created_at: String::new(),
            })
            .collect())
    }

    async fn search(
        &self,
        query: &str,
        _kind: SearchKind,
        _limit: Option<u32>,
    ) -> Result<SearchResponse, ModtagError> {
        self.record("search")?;
        let results = SearchResults::default();
        Ok(SearchResponse {
            query: query.to_string(),
            total: results.totals(),
            results,
        })
    }
}
