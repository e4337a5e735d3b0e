// SPDX-FileCopyrightText: 2026 Vendra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Vendra workspace.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject
//! unrecognized config keys at startup, providing actionable error
//! messages.

use serde::{Deserialize, Serialize};

/// Top-level Vendra configuration.
///
/// Loaded from TOML files following the XDG hierarchy, with environment
/// variable overrides. All sections are optional and default to
/// sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct VendraConfig {
    /// Application identity and logging settings.
    #[serde(default)]
    pub app: AppConfig,

    /// Realtime channel settings.
    #[serde(default)]
    pub realtime: RealtimeConfig,

    /// Conversation inbox settings.
    #[serde(default)]
    pub inbox: InboxConfig,

    /// Kanban board settings.
    #[serde(default)]
    pub board: BoardConfig,
}

/// Application identity and logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Display name of the deployment.
    #[serde(default = "default_app_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            name: default_app_name(),
            log_level: default_log_level(),
        }
    }
}

fn default_app_name() -> String {
    "vendra".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Realtime channel configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RealtimeConfig {
    /// Buffer capacity for in-process event delivery.
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,

    /// Prefix prepended to topic keys on the wire.
    #[serde(default = "default_topic_prefix")]
    pub topic_prefix: String,
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            channel_capacity: default_channel_capacity(),
            topic_prefix: default_topic_prefix(),
        }
    }
}

fn default_channel_capacity() -> usize {
    256
}

fn default_topic_prefix() -> String {
    "vendra".to_string()
}

/// Conversation inbox configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct InboxConfig {
    /// Messages fetched per history load.
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,

    /// Maximum rows returned by the inbox listing.
    #[serde(default = "default_list_limit")]
    pub list_limit: usize,

    /// Characters kept in the last-message preview.
    #[serde(default = "default_preview_length")]
    pub preview_length: usize,
}

impl Default for InboxConfig {
    fn default() -> Self {
        Self {
            history_limit: default_history_limit(),
            list_limit: default_list_limit(),
            preview_length: default_preview_length(),
        }
    }
}

fn default_history_limit() -> usize {
    50
}

fn default_list_limit() -> usize {
    100
}

fn default_preview_length() -> usize {
    50
}

/// Kanban board configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BoardConfig {
    /// Whether a successful cross-column move triggers a full board
    /// refresh to reconcile server-derived state.
    #[serde(default = "default_refresh_after_move")]
    pub refresh_after_move: bool,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            refresh_after_move: default_refresh_after_move(),
        }
    }
}

fn default_refresh_after_move() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sensible() {
        let config = VendraConfig::default();
        assert_eq!(config.app.name, "vendra");
        assert_eq!(config.app.log_level, "info");
        assert_eq!(config.inbox.history_limit, 50);
        assert_eq!(config.inbox.list_limit, 100);
        assert_eq!(config.inbox.preview_length, 50);
        assert_eq!(config.realtime.channel_capacity, 256);
        assert!(config.board.refresh_after_move);
    }

    #[test]
    fn unknown_section_key_is_rejected() {
        let toml_str = r#"
[inbox]
history_limit = 25
histry_limit = 10
"#;
        let result = toml::from_str::<VendraConfig>(toml_str);
        assert!(result.is_err());
    }

    #[test]
    fn partial_sections_keep_defaults() {
        let toml_str = r#"
[app]
log_level = "debug"
"#;
        let config: VendraConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.app.log_level, "debug");
        assert_eq!(config.app.name, "vendra");
        assert_eq!(config.inbox.history_limit, 50);
    }
}
