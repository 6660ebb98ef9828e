// SPDX-FileCopyrightText: 2026 Danmaku Bridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde attributes,
//! such as URL schemes, non-zero intervals, and provider references.

use crate::diagnostic::ConfigError;
use crate::model::DanmakuConfig;

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &DanmakuConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    let mut fail = |message: String| errors.push(ConfigError::Validation { message });

    if !is_http_url(&config.relay.base_url) {
        fail(format!(
            "relay.base_url `{}` must be an http:// or https:// URL",
            config.relay.base_url
        ));
    }

    if config.relay.source_tag.trim().is_empty() {
        fail("relay.source_tag must not be empty".to_string());
    }

    if config.relay.request_timeout_ms == Some(0) {
        fail("relay.request_timeout_ms must be greater than 0 when set".to_string());
    }

    if config.polling.interval_ms == 0 {
        fail("polling.interval_ms must be greater than 0".to_string());
    }

    if config.storage.database_path.trim().is_empty() {
        fail("storage.database_path must not be empty".to_string());
    }

    if config.chat.max_history == 0 {
        fail("chat.max_history must be at least 1".to_string());
    }

    if let Some(active) = &config.chat.active_provider {
        if !config.providers.contains_key(active) {
            fail(format!(
                "chat.active_provider `{active}` has no matching [providers.{active}] table"
            ));
        }
    }

    for (name, provider) in &config.providers {
        if !is_http_url(&provider.base_url) {
            fail(format!(
                "providers.{name}.base_url `{}` must be an http:// or https:// URL",
                provider.base_url
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Whether `url` is an absolute http(s) URL with a host.
pub fn is_http_url(url: &str) -> bool {
    let url = url.trim();
    let rest = url
        .strip_prefix("http://")
        .or_else(|| url.strip_prefix("https://"));
    rest.is_some_and(|host| !host.is_empty() && !host.starts_with('/'))
}
