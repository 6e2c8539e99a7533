// SPDX-FileCopyrightText: 2026 Modtag Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Modtag voting platform.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Modtag configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ModtagConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Module catalog paging and search limits.
    #[serde(default)]
    pub catalog: CatalogConfig,

    /// Settings for the command-line client.
    #[serde(default)]
    pub client: ClientConfig,
}

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Address to bind the server to.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Allow any origin to call the API (the web frontend is served separately).
    #[serde(default = "default_cors_permissive")]
    pub cors_permissive: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            log_level: default_log_level(),
            cors_permissive: default_cors_permissive(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_cors_permissive() -> bool {
    true
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("modtag").join("modtag.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("modtag.db"))
        .to_string_lossy()
        .into_owned()
}

fn default_wal_mode() -> bool {
    true
}

/// Module catalog limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CatalogConfig {
    /// Modules per page when the request gives no `limit`.
    #[serde(default = "default_page_size")]
    pub default_page_size: u32,

    /// Upper bound applied to a requested `limit`.
    #[serde(default = "default_max_page_size")]
    pub max_page_size: u32,

    /// Shortest accepted combined-search query, in characters.
    #[serde(default = "default_search_min_length")]
    pub search_min_length: usize,

    /// Hits per family when the search request gives no `limit`.
    #[serde(default = "default_search_limit")]
    pub search_default_limit: u32,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            default_page_size: default_page_size(),
            max_page_size: default_max_page_size(),
            search_min_length: default_search_min_length(),
            search_default_limit: default_search_limit(),
        }
    }
}

fn default_page_size() -> u32 {
    modtag_core::constants::MODULES_PER_PAGE
}

fn default_max_page_size() -> u32 {
    100
}

fn default_search_min_length() -> usize {
    modtag_core::constants::MIN_SEARCH_QUERY_LENGTH
}

fn default_search_limit() -> u32 {
    20
}

/// Command-line client configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ClientConfig {
    /// Base URL of the Modtag API.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// JSON file holding the session id and local vote history.
    #[serde(default = "default_local_store_path")]
    pub local_store_path: String,

    /// Local history older than this many days is removed by cleanup.
    #[serde(default = "default_retention_days")]
    pub history_retention_days: u32,

    /// Quiet period before a typed search query is sent.
    #[serde(default = "default_debounce_ms")]
    pub search_debounce_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            local_store_path: default_local_store_path(),
            history_retention_days: default_retention_days(),
            search_debounce_ms: default_debounce_ms(),
        }
    }
}

fn default_base_url() -> String {
    "http://127.0.0.1:3000".to_string()
}

fn default_local_store_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("modtag").join("local.json"))
        .unwrap_or_else(|| std::path::PathBuf::from("modtag-local.json"))
        .to_string_lossy()
        .into_owned()
}

fn default_retention_days() -> u32 {
    modtag_core::constants::HISTORY_RETENTION_DAYS
}

fn default_debounce_ms() -> u64 {
    modtag_core::constants::SEARCH_DEBOUNCE_MS
}
