// SPDX-FileCopyrightText: 2026 Modtag Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./modtag.toml` > `~/.config/modtag/modtag.toml` > `/etc/modtag/modtag.toml`
//! with environment variable overrides via `MODTAG_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::ModtagConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/modtag/modtag.toml` (system-wide)
/// 3. `~/.config/modtag/modtag.toml` (user XDG config)
/// 4. `./modtag.toml` (local directory)
/// 5. `MODTAG_*` environment variables
pub fn load_config() -> Result<ModtagConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<ModtagConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ModtagConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<ModtagConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ModtagConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used internally for config loading (exposed for diagnostic use).
///
/// Returns the Figment before extraction so callers can inspect metadata.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(ModtagConfig::default()))
        .merge(Toml::file("/etc/modtag/modtag.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("modtag/modtag.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("modtag.toml"))
        .merge(env_provider())
}

/// Create the environment variable provider using explicit `map()` for section-to-dot mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")` because key names contain
/// underscores: `MODTAG_STORAGE_DATABASE_PATH` must map to
/// `storage.database_path`, not `storage.database.path`.
pub(crate) fn env_provider() -> Env {
    Env::prefixed("MODTAG_").map(|key| map_env_key(key.as_str()).into())
}

/// Maps a lowercased, prefix-stripped env var name to its dotted config key.
pub(crate) fn map_env_key(key: &str) -> String {
    const SECTIONS: [&str; 4] = ["server", "storage", "catalog", "client"];
    for section in SECTIONS {
        if let Some(rest) = key.strip_prefix(section).and_then(|r| r.strip_prefix('_')) {
            return format!("{section}.{rest}");
        }
    }
    key.to_string()
}
