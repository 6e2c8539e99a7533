// SPDX-FileCopyrightText: 2026 Modtag Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde attributes,
//! such as valid bind addresses, non-empty paths, and consistent page sizes.

use crate::diagnostic::ConfigError;
use crate::model::ModtagConfig;

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &ModtagConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    let host = config.server.host.trim();
    if host.is_empty() {
        errors.push(ConfigError::Validation {
            message: "server.host must not be empty".to_string(),
        });
    } else {
        let is_valid_ip = host.parse::<std::net::IpAddr>().is_ok();
        let is_valid_hostname = host
            .chars()
            .all(|c| c.is_alphanumeric() || c == '.' || c == '-' || c == ':');
        if !is_valid_ip && !is_valid_hostname {
            errors.push(ConfigError::Validation {
                message: format!("server.host `{host}` is not a valid IP address or hostname"),
            });
        }
    }

    if config.server.port == 0 {
        errors.push(ConfigError::Validation {
            message: "server.port must be greater than 0".to_string(),
        });
    }

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.database_path must not be empty".to_string(),
        });
    }

    let catalog = &config.catalog;
    if catalog.default_page_size == 0 || catalog.max_page_size == 0 {
        errors.push(ConfigError::Validation {
            message: "catalog page sizes must be greater than 0".to_string(),
        });
    } else if catalog.default_page_size > catalog.max_page_size {
        errors.push(ConfigError::Validation {
            message: format!(
                "catalog.default_page_size ({}) exceeds catalog.max_page_size ({})",
                catalog.default_page_size, catalog.max_page_size
            ),
        });
    }

    if catalog.search_min_length == 0 {
        errors.push(ConfigError::Validation {
            message: "catalog.search_min_length must be at least 1".to_string(),
        });
    }

    if catalog.search_default_limit == 0 {
        errors.push(ConfigError::Validation {
            message: "catalog.search_default_limit must be greater than 0".to_string(),
        });
    }

    let base_url = config.client.base_url.trim();
    if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
        errors.push(ConfigError::Validation {
            message: format!("client.base_url `{base_url}` must start with http:// or https://"),
        });
    }

    if config.client.history_retention_days == 0 {
        errors.push(ConfigError::Validation {
            message: "client.history_retention_days must be at least 1".to_string(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn has_error(errors: &[ConfigError], needle: &str) -> bool {
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains(needle)))
    }

    #[test]
    fn default_config_validates() {
        let config = ModtagConfig::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn empty_database_path_fails_validation() {
        let mut config = ModtagConfig::default();
        config.storage.database_path = "".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(has_error(&errors, "database_path"));
    }

    #[test]
    fn default_page_size_above_max_fails_validation() {
        let mut config = ModtagConfig::default();
        config.catalog.default_page_size = 50;
        config.catalog.max_page_size = 10;
        let errors = validate_config(&config).unwrap_err();
        assert!(has_error(&errors, "exceeds"));
    }

    #[test]
    fn bad_base_url_fails_validation() {
        let mut config = ModtagConfig::default();
        config.client.base_url = "localhost:3000".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(has_error(&errors, "client.base_url"));
    }

    #[test]
    fn all_errors_are_collected() {
        let mut config = ModtagConfig::default();
        config.server.host = " ".to_string();
        config.server.port = 0;
        config.client.history_retention_days = 0;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn valid_custom_config_passes() {
        let mut config = ModtagConfig::default();
        config.server.host = "0.0.0.0".to_string();
        config.server.port = 8080;
        config.storage.database_path = "/tmp/test.db".to_string();
        config.client.base_url = "https://modtag.example".to_string();
        assert!(validate_config(&config).is_ok());
    }
}
