// SPDX-FileCopyrightText: 2026 Modtag Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mapping from domain errors to HTTP responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use modtag_core::ModtagError;
use modtag_core::api::ErrorBody;
use thiserror::Error;

/// Error returned by every handler; rendered as `{"error": message}`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error(transparent)]
    Domain(#[from] ModtagError),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Domain(err) => match err {
                ModtagError::Validation(_) => StatusCode::BAD_REQUEST,
                ModtagError::NotFound(_) => StatusCode::NOT_FOUND,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    /// Client-facing message. Validation and not-found errors drop the variant prefix.
    fn message(&self) -> String {
        match self {
            ApiError::BadRequest(m) | ApiError::NotFound(m) => m.clone(),
            ApiError::Domain(ModtagError::Validation(m)) => m.clone(),
            ApiError::Domain(ModtagError::NotFound(what)) => format!("{what} not found"),
            ApiError::Domain(err) => err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(status = status.as_u16(), error = %self, "request rejected");
        }
        (
            status,
            Json(ErrorBody {
                error: self.message(),
            }),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_errors_map_to_status_codes() {
        assert_eq!(
            ApiError::from(ModtagError::Validation("x".into())).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(ModtagError::NotFound("module m1".into())).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::from(ModtagError::storage(std::io::Error::other("disk"))).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn messages_are_client_friendly() {
        assert_eq!(
            ApiError::from(ModtagError::Validation("select at least one tag".into())).message(),
            "select at least one tag"
        );
        assert_eq!(
            ApiError::from(ModtagError::NotFound("module m1".into())).message(),
            "module m1 not found"
        );
        assert_eq!(
            ApiError::from(ModtagError::storage(std::io::Error::other("disk full"))).message(),
            "storage error: disk full"
        );
    }

    #[test]
    fn response_carries_status() {
        let resp = ApiError::BadRequest("module_id is required".into()).into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}
