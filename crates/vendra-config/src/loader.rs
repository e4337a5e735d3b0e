// SPDX-FileCopyrightText: 2026 Vendra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./vendra.toml` > `~/.config/vendra/vendra.toml`
//! > `/etc/vendra/vendra.toml` with environment variable overrides via
//! the `VENDRA_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::VendraConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/vendra/vendra.toml` (system-wide)
/// 3. `~/.config/vendra/vendra.toml` (user XDG config)
/// 4. `./vendra.toml` (local directory)
/// 5. `VENDRA_*` environment variables
pub fn load_config() -> Result<VendraConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<VendraConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(VendraConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<VendraConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(VendraConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used internally for config loading.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(VendraConfig::default()))
        .merge(Toml::file("/etc/vendra/vendra.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("vendra/vendra.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("vendra.toml"))
        .merge(env_provider())
}

/// Create the environment variable provider using explicit `map()` for
/// section-to-dot mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")` so that key names
/// containing underscores stay intact: `VENDRA_INBOX_HISTORY_LIMIT`
/// must map to `inbox.history_limit`, not `inbox.history.limit`.
fn env_provider() -> Env {
    Env::prefixed("VENDRA_").map(|key| {
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("app_", "app.", 1)
            .replacen("realtime_", "realtime.", 1)
            .replacen("inbox_", "inbox.", 1)
            .replacen("board_", "board.", 1);
        mapped.into()
    })
}
