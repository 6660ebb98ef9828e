// SPDX-FileCopyrightText: 2026 Danmaku Bridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wire types for the relay's command endpoints.

use serde::Deserialize;

/// Value of [`ActionResponse::status`] when a command was accepted.
pub const STATUS_SUCCESS: &str = "success";

/// Body returned by `POST configure` and `POST stop`.
///
/// Failure replies carry `error` (non-2xx) or `message` (2xx with a
/// non-success status).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ActionResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ActionResponse {
    /// Whether the relay reported the command as accepted.
    pub fn is_success(&self) -> bool {
        self.status.as_deref() == Some(STATUS_SUCCESS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_default_to_none() {
        let reply: ActionResponse = serde_json::from_str("{}").unwrap();
        assert!(!reply.is_success());
        assert!(reply.message.is_none());
        assert!(reply.error.is_none());
    }

    #[test]
    fn success_status_is_recognized() {
        let reply: ActionResponse =
            serde_json::from_str(r#"{"status":"success","message":"ok"}"#).unwrap();
        assert!(reply.is_success());
    }
}
