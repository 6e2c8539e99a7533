// SPDX-FileCopyrightText: 2026 Modtag Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers for the catalog, taxonomy, vote, and search endpoints.

use std::str::FromStr;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use modtag_core::api::{
    SearchResponse, VoteDeleteResponse, VoteInsertResponse, VoteReplaceResponse,
};
use modtag_core::types::{
    Module, ModulePage, ModuleQuery, ModuleWithVotes, NewModule, SearchKind, SearchResults,
    TagCategory, TagSearchResults, UserVote, VoteCount, VoteScope, VoteSubmission,
};
use modtag_core::{HealthStatus, vote_statistics};

use crate::error::ApiError;
use crate::server::GatewayState;

/// Response body for GET /health.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// "ok", "degraded", or "unavailable".
    pub status: String,
    /// Binary version.
    pub version: String,
    /// Seconds since the server started.
    pub uptime_secs: u64,
}

/// Query string of GET /api/modules.
#[derive(Debug, Default, Deserialize)]
pub struct ModuleListParams {
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub limit: Option<u32>,
    #[serde(default)]
    pub search: Option<String>,
}

/// Query string of GET /api/tags/votes.
#[derive(Debug, Default, Deserialize)]
pub struct VoteCountParams {
    #[serde(default)]
    pub module_id: Option<String>,
}

/// Query string of GET /api/tags/votes/user.
#[derive(Debug, Default, Deserialize)]
pub struct UserVoteParams {
    #[serde(default)]
    pub module_id: Option<String>,
    #[serde(default)]
    pub session_id: Option<String>,
}

/// Query string of GET /api/search.
#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub limit: Option<u32>,
}

fn required(value: Option<String>, name: &str) -> Result<String, ApiError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::BadRequest(format!("{name} is required")))
}

/// GET /health
pub async fn get_health(State(state): State<GatewayState>) -> Response {
    let health = state.store.health_check().await;
    let (code, status) = match health {
        Ok(HealthStatus::Healthy) => (StatusCode::OK, "ok"),
        Ok(HealthStatus::Degraded(reason)) => {
            tracing::warn!(%reason, "store degraded");
            (StatusCode::OK, "degraded")
        }
        Ok(HealthStatus::Unhealthy(reason)) => {
            tracing::warn!(%reason, "store unhealthy");
            (StatusCode::SERVICE_UNAVAILABLE, "unavailable")
        }
        Err(e) => {
            tracing::warn!(error = %e, "store health check failed");
            (StatusCode::SERVICE_UNAVAILABLE, "unavailable")
        }
    };
    (
        code,
        Json(HealthResponse {
            status: status.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime_secs: state.start_time.elapsed().as_secs(),
        }),
    )
        .into_response()
}

/// GET /api/modules
pub async fn list_modules(
    State(state): State<GatewayState>,
    Query(params): Query<ModuleListParams>,
) -> Result<Json<ModulePage>, ApiError> {
    let query = ModuleQuery {
        page: params.page.unwrap_or(1).max(1),
        limit: state.limits.clamp_page_size(params.limit),
        search: params
            .search
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty()),
    };
    let page = state.store.list_modules(&query).await?;
    Ok(Json(page))
}

/// POST /api/modules
pub async fn create_module(
    State(state): State<GatewayState>,
    Json(body): Json<NewModule>,
) -> Result<(StatusCode, Json<Module>), ApiError> {
    let draft = body.into_draft()?;
    let module = state.store.create_module(&draft).await?;
    tracing::info!(module_id = %module.id, name = %module.name, "module created");
    Ok((StatusCode::CREATED, Json(module)))
}

/// GET /api/modules/{id}
pub async fn get_module(
    State(state): State<GatewayState>,
    Path(id): Path<String>,
) -> Result<Json<ModuleWithVotes>, ApiError> {
    let module = state
        .store
        .get_module(&id)
        .await?
        .ok_or_else(|| ApiError::NotFound("module not found".to_string()))?;
    let counts = state.store.vote_counts(&id).await?;
    let (vote_statistics, total_votes) = vote_statistics(&counts);
    Ok(Json(ModuleWithVotes {
        module,
        vote_statistics,
        total_votes,
    }))
}

/// GET /api/tags/categories
pub async fn list_categories(
    State(state): State<GatewayState>,
) -> Result<Json<Vec<TagCategory>>, ApiError> {
    Ok(Json(state.store.list_categories().await?))
}

/// POST /api/tags/votes
///
/// Inserts only the subcategories this session has not voted for yet.
pub async fn post_votes(
    State(state): State<GatewayState>,
    Json(body): Json<VoteSubmission>,
) -> Result<(StatusCode, Json<VoteInsertResponse>), ApiError> {
    let submission = body.validate()?;
    let votes = state.store.insert_votes(&submission).await?;
    tracing::info!(
        module_id = %submission.module_id,
        inserted = votes.len(),
        "votes submitted"
    );
    if votes.is_empty() {
        return Ok((
            StatusCode::OK,
            Json(VoteInsertResponse {
                message: "no new votes to submit".to_string(),
                votes,
            }),
        ));
    }
    Ok((
        StatusCode::CREATED,
        Json(VoteInsertResponse {
            message: "votes submitted successfully".to_string(),
            votes,
        }),
    ))
}

/// PUT /api/tags/votes
///
/// Replaces the session's whole selection for the module atomically.
pub async fn put_votes(
    State(state): State<GatewayState>,
    Json(body): Json<VoteSubmission>,
) -> Result<Json<VoteReplaceResponse>, ApiError> {
    let submission = body.validate()?;
    let outcome = state.store.replace_votes(&submission).await?;
    tracing::info!(
        module_id = %submission.module_id,
        deleted = outcome.deleted,
        inserted = outcome.inserted.len(),
        "votes replaced"
    );
    Ok(Json(VoteReplaceResponse {
        message: "votes replaced successfully".to_string(),
        deleted_count: outcome.deleted,
        votes: outcome.inserted,
    }))
}

/// GET /api/tags/votes?module_id=
pub async fn get_vote_counts(
    State(state): State<GatewayState>,
    Query(params): Query<VoteCountParams>,
) -> Result<Json<Vec<VoteCount>>, ApiError> {
    let module_id = required(params.module_id, "module_id")?;
    Ok(Json(state.store.vote_counts(&module_id).await?))
}

/// DELETE /api/tags/votes
pub async fn delete_votes(
    State(state): State<GatewayState>,
    Json(body): Json<VoteScope>,
) -> Result<Json<VoteDeleteResponse>, ApiError> {
    let scope = body.validate()?;
    let outcome = state.store.delete_votes(&scope).await?;
    tracing::info!(
        module_id = %scope.module_id,
        found = outcome.found,
        deleted = outcome.deleted,
        "votes deleted"
    );
    Ok(Json(VoteDeleteResponse {
        message: "votes deleted successfully".to_string(),
        deleted_count: outcome.deleted,
        found_count: outcome.found,
    }))
}

/// GET /api/tags/votes/user?module_id=&session_id=
pub async fn get_user_votes(
    State(state): State<GatewayState>,
    Query(params): Query<UserVoteParams>,
) -> Result<Json<Vec<UserVote>>, ApiError> {
    let scope = VoteScope::new(
        required(params.module_id, "module_id")?,
        required(params.session_id, "session_id")?,
    );
    Ok(Json(state.store.user_votes(&scope).await?))
}

/// GET /api/search?q=&type=&limit=
pub async fn search(
    State(state): State<GatewayState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, ApiError> {
    let query = params.q.unwrap_or_default().trim().to_string();
    let min = state.limits.search_min_length;
    if query.chars().count() < min {
        return Err(ApiError::BadRequest(format!(
            "search query must be at least {min} characters"
        )));
    }
    let kind = match params.kind.as_deref() {
        None | Some("") => SearchKind::All,
        Some(raw) => SearchKind::from_str(raw).map_err(|_| {
            ApiError::BadRequest(format!(
                "invalid search type '{raw}' (expected all, modules, or tags)"
            ))
        })?,
    };
    let limit = state.limits.clamp_search_limit(params.limit);

    let mut results = SearchResults::default();
    if kind.includes_modules() {
        results.modules = Some(state.store.search_modules(&query, limit).await?);
    }
    if kind.includes_tags() {
        results.tags = Some(TagSearchResults {
            categories: state.store.search_categories(&query, limit).await?,
            subcategories: state.store.search_subcategories(&query, limit).await?,
        });
    }
    let total = results.totals();
    tracing::debug!(%query, %kind, ?total, "search served");

    Ok(Json(SearchResponse {
        query,
        results,
        total,
    }))
}
