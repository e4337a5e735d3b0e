// SPDX-FileCopyrightText: 2026 Vendra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde
//! attributes, such as non-zero limits and known log levels.

use crate::diagnostic::ConfigError;
use crate::model::VendraConfig;

const KNOWN_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)`
/// with all collected validation errors (does not fail fast).
pub fn validate_config(config: &VendraConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if config.app.name.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "app.name must not be empty".to_string(),
        });
    }

    let level = config.app.log_level.to_lowercase();
    if !KNOWN_LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "app.log_level `{}` is not one of: {}",
                config.app.log_level,
                KNOWN_LOG_LEVELS.join(", ")
            ),
        });
    }

    if config.realtime.channel_capacity == 0 {
        errors.push(ConfigError::Validation {
            message: "realtime.channel_capacity must be at least 1".to_string(),
        });
    }

    if config.inbox.history_limit == 0 {
        errors.push(ConfigError::Validation {
            message: "inbox.history_limit must be at least 1".to_string(),
        });
    }

    if config.inbox.list_limit == 0 {
        errors.push(ConfigError::Validation {
            message: "inbox.list_limit must be at least 1".to_string(),
        });
    }

    if config.inbox.preview_length == 0 {
        errors.push(ConfigError::Validation {
            message: "inbox.preview_length must be at least 1".to_string(),
        });
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}
