// SPDX-FileCopyrightText: 2026 Danmaku Bridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the danmaku bridge.

use thiserror::Error;

/// The primary error type used across the bridge crates.
#[derive(Debug, Error)]
pub enum DanmakuError {
    /// Configuration errors (invalid TOML, bad URLs, missing provider entries).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (database open, query failure, record decoding).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Relay service errors: transport failure, non-2xx response, malformed
    /// body, or an explicit non-success status reported by the relay.
    #[error("relay error: {message}")]
    Relay {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Completion provider errors (API failure, unknown provider, empty reply).
    #[error("provider error: {message}")]
    Provider {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Chat pipeline errors.
    #[error("chat error: {message}")]
    Chat { message: String },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl DanmakuError {
    /// Shorthand for a relay error without an underlying source.
    pub fn relay(message: impl Into<String>) -> Self {
        Self::Relay {
            message: message.into(),
            source: None,
        }
    }

    /// Shorthand for a provider error without an underlying source.
    pub fn provider(message: impl Into<String>) -> Self {
        Self::Provider {
            message: message.into(),
            source: None,
        }
    }

    /// The human-facing part of the error, without the category prefix.
    ///
    /// Used where the error is shown to the user behind a localized prefix
    /// of its own (the relay client's error slot, the chat transcript).
    pub fn detail(&self) -> String {
        match self {
            Self::Config(message) | Self::Internal(message) => message.clone(),
            Self::Storage { source } => source.to_string(),
            Self::Relay { message, .. }
            | Self::Provider { message, .. }
            | Self::Chat { message } => message.clone(),
        }
    }
}
