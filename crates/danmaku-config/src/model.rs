// SPDX-FileCopyrightText: 2026 Danmaku Bridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the danmaku bridge.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use std::collections::BTreeMap;

use danmaku_core::types::{DEFAULT_RELAY_BASE_URL, RelaySettings};
use serde::{Deserialize, Serialize};

/// Top-level configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DanmakuConfig {
    /// Process identity and logging.
    #[serde(default)]
    pub agent: AgentConfig,

    /// Relay service connection and message tagging.
    #[serde(default)]
    pub relay: RelayConfig,

    /// Poll loop settings.
    #[serde(default)]
    pub polling: PollingConfig,

    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Chat transcript and active provider selection.
    #[serde(default)]
    pub chat: ChatConfig,

    /// Completion providers, keyed by name.
    #[serde(default)]
    pub providers: BTreeMap<String, ProviderEntryConfig>,
}

/// Process identity and logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    /// Display name used in logs.
    #[serde(default = "default_agent_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: default_agent_name(),
            log_level: default_log_level(),
        }
    }
}

fn default_agent_name() -> String {
    "danmaku".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Relay service configuration.
///
/// These values seed the persisted relay settings record the first time the
/// bridge runs; afterwards the stored record (edited via `danmaku configure`)
/// takes precedence.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RelayConfig {
    /// Base URL of the relay's HTTP API.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default)]
    pub access_key_id: String,

    #[serde(default)]
    pub access_key_secret: String,

    #[serde(default)]
    pub app_id: String,

    #[serde(default)]
    pub room_owner_auth_code: String,

    /// Source marker attached to every forwarded message.
    #[serde(default = "default_source_tag")]
    pub source_tag: String,

    /// Prefix prepended to forwarded messages, before the sender name.
    #[serde(default = "default_message_prefix")]
    pub message_prefix: String,

    /// Optional per-request timeout. Unset means the transport default.
    #[serde(default)]
    pub request_timeout_ms: Option<u64>,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            access_key_id: String::new(),
            access_key_secret: String::new(),
            app_id: String::new(),
            room_owner_auth_code: String::new(),
            source_tag: default_source_tag(),
            message_prefix: default_message_prefix(),
            request_timeout_ms: None,
        }
    }
}

impl RelayConfig {
    /// The relay settings record described by this section.
    pub fn settings(&self) -> RelaySettings {
        RelaySettings {
            base_url: self.base_url.clone(),
            access_key_id: self.access_key_id.clone(),
            access_key_secret: self.access_key_secret.clone(),
            app_id: self.app_id.clone(),
            room_owner_auth_code: self.room_owner_auth_code.clone(),
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_RELAY_BASE_URL.to_string()
}

fn default_source_tag() -> String {
    "bilibili_danmaku".to_string()
}

fn default_message_prefix() -> String {
    "[B站弹幕]".to_string()
}

/// Poll loop configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PollingConfig {
    /// Milliseconds between fetch-and-dispatch cycles.
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,

    /// Push credentials to the relay before `serve` starts polling.
    #[serde(default = "default_auto_configure")]
    pub auto_configure: bool,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
            auto_configure: default_auto_configure(),
        }
    }
}

fn default_interval_ms() -> u64 {
    3000
}

fn default_auto_configure() -> bool {
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
        .map(|p| p.join("danmaku").join("danmaku.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("danmaku.db"))
        .to_string_lossy()
        .into_owned()
}

fn default_wal_mode() -> bool {
    true
}

/// Chat transcript configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ChatConfig {
    /// Name of the provider (a key of `[providers]`) used for AI replies.
    #[serde(default)]
    pub active_provider: Option<String>,

    /// Model passed to the active provider.
    #[serde(default)]
    pub active_model: Option<String>,

    /// System prompt placed at the head of the transcript.
    #[serde(default)]
    pub system_prompt: Option<String>,

    /// Number of most recent transcript messages sent with each completion request.
    #[serde(default = "default_max_history")]
    pub max_history: usize,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            active_provider: None,
            active_model: None,
            system_prompt: None,
            max_history: default_max_history(),
        }
    }
}

fn default_max_history() -> usize {
    20
}

/// One OpenAI-compatible completion endpoint.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ProviderEntryConfig {
    /// API root, e.g. `https://api.openai.com/v1`.
    pub base_url: String,

    /// Bearer token. `None` for local servers that need no auth.
    #[serde(default)]
    pub api_key: Option<String>,
}
