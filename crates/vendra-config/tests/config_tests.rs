// SPDX-FileCopyrightText: 2026 Vendra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the Vendra configuration system.

use vendra_config::diagnostic::{ConfigError, suggest_key};
use vendra_config::{load_and_validate_str, load_config_from_str};

/// Valid TOML with all known fields deserializes successfully.
#[test]
fn valid_toml_deserializes_into_vendra_config() {
    let toml = r#"
[app]
name = "agency-crm"
log_level = "debug"

[realtime]
channel_capacity = 64
topic_prefix = "crm"

[inbox]
history_limit = 25
list_limit = 40
preview_length = 80

[board]
refresh_after_move = false
"#;

    let config = load_config_from_str(toml).expect("valid TOML should deserialize");
    assert_eq!(config.app.name, "agency-crm");
    assert_eq!(config.app.log_level, "debug");
    assert_eq!(config.realtime.channel_capacity, 64);
    assert_eq!(config.realtime.topic_prefix, "crm");
    assert_eq!(config.inbox.history_limit, 25);
    assert_eq!(config.inbox.list_limit, 40);
    assert_eq!(config.inbox.preview_length, 80);
    assert!(!config.board.refresh_after_move);
}

/// Unknown field in a section produces an UnknownKey diagnostic with a
/// fuzzy suggestion.
#[test]
fn unknown_field_produces_suggestion() {
    let toml = r#"
[inbox]
histry_limit = 10
"#;

    let errors = load_and_validate_str(toml).unwrap_err();
    assert!(!errors.is_empty());
    let has_suggestion = errors.iter().any(|e| {
        matches!(
            e,
            ConfigError::UnknownKey {
                key,
                suggestion: Some(s),
                ..
            } if key == "histry_limit" && s == "history_limit"
        )
    });
    assert!(has_suggestion, "expected a did-you-mean suggestion: {errors:?}");
}

/// Semantic validation runs after a successful parse.
#[test]
fn zero_history_limit_is_a_validation_error() {
    let toml = r#"
[inbox]
history_limit = 0
"#;

    let errors = load_and_validate_str(toml).unwrap_err();
    assert!(errors.iter().any(
        |e| matches!(e, ConfigError::Validation { message } if message.contains("history_limit"))
    ));
}

/// Wrong value type surfaces as an InvalidType diagnostic.
#[test]
fn wrong_type_produces_invalid_type_error() {
    let toml = r#"
[realtime]
channel_capacity = "lots"
"#;

    let errors = load_and_validate_str(toml).unwrap_err();
    assert!(
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::InvalidType { .. })),
        "expected InvalidType: {errors:?}"
    );
}

/// Empty input falls back to compiled defaults and validates.
#[test]
fn empty_toml_yields_defaults() {
    let config = load_and_validate_str("").expect("defaults should validate");
    assert_eq!(config.app.name, "vendra");
    assert_eq!(config.inbox.history_limit, 50);
}

#[test]
fn suggest_key_is_exposed_for_tooling() {
    assert_eq!(
        suggest_key("topik_prefix", &["topic_prefix", "channel_capacity"]),
        Some("topic_prefix".to_string())
    );
}
