// SPDX-FileCopyrightText: 2026 Modtag Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Response bodies of the vote and search endpoints.
//!
//! The gateway serializes these and the client deserializes them, so the
//! wire format is defined once.

use serde::{Deserialize, Serialize};

use crate::types::{SearchResults, SearchTotals, TagVote};

/// Response of `POST /api/tags/votes`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteInsertResponse {
    pub message: String,
    /// Rows actually inserted. Absent when nothing new was submitted.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub votes: Vec<TagVote>,
}

/// Response of `PUT /api/tags/votes`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteReplaceResponse {
    pub message: String,
    #[serde(rename = "deletedCount")]
    pub deleted_count: u64,
    pub votes: Vec<TagVote>,
}

/// Response of `DELETE /api/tags/votes`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteDeleteResponse {
    pub message: String,
    #[serde(rename = "deletedCount")]
    pub deleted_count: u64,
    #[serde(rename = "foundCount")]
    pub found_count: u64,
}

/// Response of `GET /api/search`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResponse {
    /// The trimmed query that was executed.
    pub query: String,
    pub results: SearchResults,
    pub total: SearchTotals,
}

/// Error body returned by every endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}
