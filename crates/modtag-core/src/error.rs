// SPDX-FileCopyrightText: 2026 Modtag Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Modtag voting platform.

use thiserror::Error;

/// The primary error type shared by the store, the gateway, and the client.
#[derive(Debug, Error)]
pub enum ModtagError {
    /// Missing or malformed input (empty subcategory set, short search query).
    #[error("validation error: {0}")]
    Validation(String),

    /// The requested record does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Storage backend errors (database connection, query failure, serialization).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// Transport-level failure talking to the HTTP API.
    #[error("http error: {message}")]
    Http {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The HTTP API answered with a non-success status.
    #[error("api error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ModtagError {
    /// Shorthand for wrapping any error as a storage failure.
    pub fn storage(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        ModtagError::Storage {
            source: Box::new(err),
        }
    }

    /// Returns true for errors caused by the caller's input.
    pub fn is_client_error(&self) -> bool {
        match self {
            ModtagError::Validation(_) | ModtagError::NotFound(_) => true,
            ModtagError::Api { status, .. } => (400..500).contains(status),
            _ => false,
        }
    }
}
