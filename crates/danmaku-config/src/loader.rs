// SPDX-FileCopyrightText: 2026 Danmaku Bridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./danmaku.toml` > `~/.config/danmaku/danmaku.toml` > `/etc/danmaku/danmaku.toml`
//! with environment variable overrides via `DANMAKU_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::DanmakuConfig;

/// System-wide config file.
pub const SYSTEM_CONFIG_PATH: &str = "/etc/danmaku/danmaku.toml";

/// Config file looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "danmaku.toml";

/// Sections whose keys map `DANMAKU_<SECTION>_<KEY>` to `<section>.<key>`.
const SECTIONS: &[&str] = &["agent", "relay", "polling", "storage", "chat"];

/// Fields of a `[providers.<name>]` table.
const PROVIDER_FIELDS: &[&str] = &["api_key", "base_url"];

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/danmaku/danmaku.toml` (system-wide)
/// 3. `~/.config/danmaku/danmaku.toml` (user XDG config)
/// 4. `./danmaku.toml` (local directory)
/// 5. `DANMAKU_*` environment variables
pub fn load_config() -> Result<DanmakuConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<DanmakuConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(DanmakuConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<DanmakuConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(DanmakuConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used internally for config loading.
///
/// Returns the Figment before extraction so callers can inspect metadata.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(DanmakuConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG_PATH))
        .merge(Toml::file(user_config_path().unwrap_or_default()))
        .merge(Toml::file(LOCAL_CONFIG_FILE))
        .merge(env_provider())
}

/// `~/.config/danmaku/danmaku.toml`, when the platform has a config dir.
pub fn user_config_path() -> Option<std::path::PathBuf> {
    dirs::config_dir().map(|d| d.join("danmaku").join(LOCAL_CONFIG_FILE))
}

/// Create the environment variable provider using explicit `map()` for section-to-dot mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")` because key names contain
/// underscores: `DANMAKU_RELAY_ACCESS_KEY_ID` must map to `relay.access_key_id`.
fn env_provider() -> Env {
    Env::prefixed("DANMAKU_").map(|key| map_env_key(&key.as_str().to_ascii_lowercase()).into())
}

/// Map a lowercased, prefix-stripped env var name to a dotted config path.
///
/// `relay_base_url` becomes `relay.base_url`; `providers_openai_api_key`
/// becomes `providers.openai.api_key`. Unknown shapes pass through unchanged
/// so that `deny_unknown_fields` reports them.
pub fn map_env_key(key: &str) -> String {
    if let Some(rest) = key.strip_prefix("providers_") {
        for field in PROVIDER_FIELDS {
            let name = rest
                .strip_suffix(field)
                .and_then(|name| name.strip_suffix('_'));
            if let Some(name) = name.filter(|n| !n.is_empty()) {
                return format!("providers.{name}.{field}");
            }
        }
        return key.to_string();
    }

    for section in SECTIONS {
        let field = key
            .strip_prefix(section)
            .and_then(|rest| rest.strip_prefix('_'));
        if let Some(field) = field {
            return format!("{section}.{field}");
        }
    }

    key.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_section_keys_with_underscores() {
        assert_eq!(map_env_key("relay_access_key_id"), "relay.access_key_id");
        assert_eq!(map_env_key("polling_interval_ms"), "polling.interval_ms");
        assert_eq!(map_env_key("agent_log_level"), "agent.log_level");
        assert_eq!(map_env_key("chat_active_model"), "chat.active_model");
    }

    #[test]
    fn maps_provider_keys() {
        assert_eq!(
            map_env_key("providers_openai_api_key"),
            "providers.openai.api_key"
        );
        assert_eq!(
            map_env_key("providers_local_llm_base_url"),
            "providers.local_llm.base_url"
        );
    }

    #[test]
    fn leaves_unknown_keys_alone() {
        assert_eq!(map_env_key("providers_api_key"), "providers_api_key");
        assert_eq!(map_env_key("logging_level"), "logging_level");
    }
}
