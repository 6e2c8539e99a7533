// SPDX-FileCopyrightText: 2026 Modtag Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the Modtag JSON API.
//!
//! [`VotingApi`] is the seam the client stores depend on; [`HttpApiClient`]
//! implements it over reqwest. Non-success responses become
//! [`ModtagError::Api`] carrying the server's `error` message.

use std::time::Duration;

use async_trait::async_trait;
use modtag_core::ModtagError;
use modtag_core::api::{
    ErrorBody, SearchResponse, VoteDeleteResponse, VoteInsertResponse, VoteReplaceResponse,
};
use modtag_core::types::{
    Module, ModulePage, ModuleWithVotes, NewModule, SearchKind, TagCategory, UserVote, VoteCount,
    VoteScope, VoteSubmission,
};
use reqwest::{Method, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use tracing::debug;

/// Remote operations the client stores need.
#[async_trait]
pub trait VotingApi: Send + Sync {
    async fn list_modules(
        &self,
        page: u32,
        limit: Option<u32>,
        search: Option<&str>,
    ) -> Result<ModulePage, ModtagError>;

    async fn get_module(&self, id: &str) -> Result<ModuleWithVotes, ModtagError>;

    async fn create_module(&self, module: &NewModule) -> Result<Module, ModtagError>;

    async fn categories(&self) -> Result<Vec<TagCategory>, ModtagError>;

    async fn submit_votes(
        &self,
        submission: &VoteSubmission,
    ) -> Result<VoteInsertResponse, ModtagError>;

    async fn replace_votes(
        &self,
        submission: &VoteSubmission,
    ) -> Result<VoteReplaceResponse, ModtagError>;

    async fn delete_votes(&self, scope: &VoteScope) -> Result<VoteDeleteResponse, ModtagError>;

    async fn vote_counts(&self, module_id: &str) -> Result<Vec<VoteCount>, ModtagError>;

    async fn user_votes(&self, scope: &VoteScope) -> Result<Vec<UserVote>, ModtagError>;

    async fn search(
        &self,
        query: &str,
        kind: SearchKind,
        limit: Option<u32>,
    ) -> Result<SearchResponse, ModtagError>;
}

/// reqwest-backed [`VotingApi`].
#[derive(Debug, Clone)]
pub struct HttpApiClient {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpApiClient {
    /// Creates a client for the API rooted at `base_url`, e.g. `http://127.0.0.1:3000`.
    pub fn new(base_url: &str) -> Result<Self, ModtagError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| ModtagError::Config(format!("invalid API base url '{base_url}': {e}")))?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| ModtagError::Http {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn url(&self, path: &str, query: &[(&str, String)]) -> Result<Url, ModtagError> {
        let mut url = self
            .base_url
            .join(path)
            .map_err(|e| ModtagError::Config(format!("invalid API path '{path}': {e}")))?;
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }

    fn request(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<RequestBuilder, ModtagError> {
        Ok(self.client.request(method, self.url(path, query)?))
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ModtagError> {
        let response = request.send().await.map_err(|e| ModtagError::Http {
            message: format!("HTTP request failed: {e}"),
            source: Some(Box::new(e)),
        })?;

        let status = response.status();
        debug!(status = %status, url = %response.url(), "API response received");
        let body = response.text().await.map_err(|e| ModtagError::Http {
            message: format!("failed to read response body: {e}"),
            source: Some(Box::new(e)),
        })?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorBody>(&body)
                .map(|b| b.error)
                .unwrap_or_else(|_| format!("API returned {status}: {body}"));
            return Err(ModtagError::Api {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_str(&body).map_err(|e| ModtagError::Http {
            message: format!("failed to parse API response: {e}"),
            source: Some(Box::new(e)),
        })
    }
}

#[async_trait]
impl VotingApi for HttpApiClient {
    async fn list_modules(
        &self,
        page: u32,
        limit: Option<u32>,
        search: Option<&str>,
    ) -> Result<ModulePage, ModtagError> {
        let mut query = vec![("page", page.to_string())];
        if let Some(limit) = limit {
            query.push(("limit", limit.to_string()));
        }
        if let Some(search) = search.map(str::trim).filter(|s| !s.is_empty()) {
            query.push(("search", search.to_string()));
        }
        self.send(self.request(Method::GET, "/api/modules", &query)?)
            .await
    }

    async fn get_module(&self, id: &str) -> Result<ModuleWithVotes, ModtagError> {
        let mut url = self.url("/api/modules/", &[])?;
        url.path_segments_mut()
            .map_err(|_| ModtagError::Config("API base url cannot hold a path".to_string()))?
            .pop_if_empty()
            .push(id);
        self.send(self.client.get(url)).await
    }

    async fn create_module(&self, module: &NewModule) -> Result<Module, ModtagError> {
        self.send(self.request(Method::POST, "/api/modules", &[])?.json(module))
            .await
    }

    async fn categories(&self) -> Result<Vec<TagCategory>, ModtagError> {
        self.send(self.request(Method::GET, "/api/tags/categories", &[])?)
            .await
    }

    async fn submit_votes(
        &self,
        submission: &VoteSubmission,
    ) -> Result<VoteInsertResponse, ModtagError> {
        self.send(
            self.request(Method::POST, "/api/tags/votes", &[])?
                .json(submission),
        )
        .await
    }

    async fn replace_votes(
        &self,
        submission: &VoteSubmission,
    ) -> Result<VoteReplaceResponse, ModtagError> {
        self.send(
            self.request(Method::PUT, "/api/tags/votes", &[])?
                .json(submission),
        )
        .await
    }

    async fn delete_votes(&self, scope: &VoteScope) -> Result<VoteDeleteResponse, ModtagError> {
        self.send(
            self.request(Method::DELETE, "/api/tags/votes", &[])?
                .json(scope),
        )
        .await
    }

    async fn vote_counts(&self, module_id: &str) -> Result<Vec<VoteCount>, ModtagError> {
        let query = [("module_id", module_id.to_string())];
        self.send(self.request(Method::GET, "/api/tags/votes", &query)?)
            .await
    }

    async fn user_votes(&self, scope: &VoteScope) -> Result<Vec<UserVote>, ModtagError> {
        let query = [
            ("module_id", scope.module_id.clone()),
            ("session_id", scope.session_id.clone()),
        ];
        self.send(self.request(Method::GET, "/api/tags/votes/user", &query)?)
            .await
    }

    async fn search(
        &self,
        query: &str,
        kind: SearchKind,
        limit: Option<u32>,
    ) -> Result<SearchResponse, ModtagError> {
        let mut params = vec![("q", query.to_string()), ("type", kind.to_string())];
        if let Some(limit) = limit {
            params.push(("limit", limit.to_string()));
        }
        self.send(self.request(Method::GET, "/api/search", &params)?)
            .await
    }
}
