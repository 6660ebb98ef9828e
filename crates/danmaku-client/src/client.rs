// SPDX-FileCopyrightText: 2026 Danmaku Bridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the relay service.
//!
//! Provides [`RelayClient`] which resolves endpoints against the configured
//! base URL, posts credentials, fetches buffered events, and converts every
//! failure into a localized message stored in the error slot.

use std::sync::Arc;
use std::time::Duration;

use arc_swap::{ArcSwap, ArcSwapOption};
use async_trait::async_trait;
use danmaku_core::{
    DanmakuError, DanmakuEvent, EventSource, RelayCredentials, RelaySettings, ServiceStatus,
};
use reqwest::Url;
use serde::de::DeserializeOwned;
use tracing::{debug, error, info};

use crate::types::ActionResponse;

/// A relay operation, used to pick the localized failure prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operation {
    Status,
    Configure,
    Fetch,
    Stop,
}

impl Operation {
    fn as_str(self) -> &'static str {
        match self {
            Self::Status => "status",
            Self::Configure => "configure",
            Self::Fetch => "messages",
            Self::Stop => "stop",
        }
    }

    /// Prefix written to the error slot; also the fallback message when a
    /// command is rejected without an explanation.
    fn failure_prefix(self) -> &'static str {
        match self {
            Self::Status => "获取弹幕服务状态失败",
            Self::Configure => "配置弹幕服务失败",
            Self::Fetch => "获取弹幕消息失败",
            Self::Stop => "停止弹幕服务失败",
        }
    }
}

/// HTTP client for the relay's status/configure/messages/stop endpoints.
///
/// Settings are read on every request, so [`EventSource::update_settings`]
/// takes effect immediately. Nothing is retried.
pub struct RelayClient {
    http: reqwest::Client,
    settings: ArcSwap<RelaySettings>,
    last_error: ArcSwapOption<String>,
}

impl RelayClient {
    /// Creates a client for the given settings.
    ///
    /// `timeout` bounds each request; `None` keeps the transport default.
    pub fn new(settings: RelaySettings, timeout: Option<Duration>) -> Result<Self, DanmakuError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(|e| DanmakuError::Relay {
            message: format!("failed to build HTTP client: {e}"),
            source: Some(Box::new(e)),
        })?;

        Ok(Self {
            http,
            settings: ArcSwap::from_pointee(settings),
            last_error: ArcSwapOption::empty(),
        })
    }

    /// Clears the error slot.
    pub fn clear_error(&self) {
        self.last_error.store(None);
    }

    /// Resolves `path` against the base URL, which is treated as a directory
    /// whether or not it ends with `/`.
    fn endpoint(&self, path: &str) -> Result<Url, DanmakuError> {
        let settings = self.settings.load();
        let mut base = settings.base_url.trim().to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        let base = Url::parse(&base).map_err(|e| DanmakuError::Relay {
            message: format!("invalid relay base URL `{}`: {e}", settings.base_url),
            source: Some(Box::new(e)),
        })?;
        base.join(path).map_err(|e| DanmakuError::Relay {
            message: format!("invalid relay endpoint `{path}`: {e}"),
            source: Some(Box::new(e)),
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, op: Operation) -> Result<T, DanmakuError> {
        let url = self.endpoint(op.as_str())?;
        let response = self.http.get(url).send().await.map_err(transport_err)?;

        let status = response.status();
        debug!(status = %status, endpoint = op.as_str(), "relay response received");
        if !status.is_success() {
            return Err(http_status_err(status));
        }

        let body = response.text().await.map_err(transport_err)?;
        serde_json::from_str(&body).map_err(|e| DanmakuError::Relay {
            message: format!("invalid response body: {e}"),
            source: Some(Box::new(e)),
        })
    }

    async fn post_command(
        &self,
        op: Operation,
        payload: Option<serde_json::Value>,
    ) -> Result<(), DanmakuError> {
        let url = self.endpoint(op.as_str())?;
        let mut request = self.http.post(url);
        if let Some(payload) = payload {
            request = request.json(&payload);
        }
        let response = request.send().await.map_err(transport_err)?;

        let status = response.status();
        debug!(status = %status, endpoint = op.as_str(), "relay response received");
        let body = response.text().await.map_err(transport_err)?;

        if !status.is_success() {
            let message = serde_json::from_str::<ActionResponse>(&body)
                .ok()
                .and_then(|reply| reply.error)
                .filter(|error| !error.is_empty());
            return Err(match message {
                Some(message) => DanmakuError::relay(message),
                None => http_status_err(status),
            });
        }

        let reply: ActionResponse = serde_json::from_str(&body).map_err(|e| DanmakuError::Relay {
            message: format!("invalid response body: {e}"),
            source: Some(Box::new(e)),
        })?;
        if reply.is_success() {
            Ok(())
        } else {
            let message = reply
                .message
                .filter(|message| !message.is_empty())
                .unwrap_or_else(|| op.failure_prefix().to_string());
            Err(DanmakuError::relay(message))
        }
    }

    /// Writes the localized failure message for `op` into the error slot.
    fn record_failure(&self, op: Operation, err: &DanmakuError) {
        let message = format!("{}: {}", op.failure_prefix(), err.detail());
        error!(endpoint = op.as_str(), error = %err, "relay request failed");
        self.last_error.store(Some(Arc::new(message)));
    }
}

#[async_trait]
impl EventSource for RelayClient {
    async fn status(&self) -> Option<ServiceStatus> {
        match self.get_json::<ServiceStatus>(Operation::Status).await {
            Ok(status) => Some(status),
            Err(e) => {
                self.record_failure(Operation::Status, &e);
                None
            }
        }
    }

    async fn configure(&self, credentials: &RelayCredentials) -> bool {
        match self
            .post_command(Operation::Configure, Some(credentials.to_payload()))
            .await
        {
            Ok(()) => {
                info!(app_id = credentials.app_id.as_str(), "relay configured");
                self.clear_error();
                true
            }
            Err(e) => {
                self.record_failure(Operation::Configure, &e);
                false
            }
        }
    }

    async fn fetch_events(&self) -> Option<Vec<DanmakuEvent>> {
        match self.get_json::<Vec<DanmakuEvent>>(Operation::Fetch).await {
            Ok(events) => {
                debug!(count = events.len(), "fetched relay events");
                Some(events)
            }
            Err(e) => {
                self.record_failure(Operation::Fetch, &e);
                None
            }
        }
    }

    async fn stop(&self) -> bool {
        match self.post_command(Operation::Stop, None).await {
            Ok(()) => {
                info!("relay stopped");
                self.clear_error();
                true
            }
            Err(e) => {
                self.record_failure(Operation::Stop, &e);
                false
            }
        }
    }

    fn last_error(&self) -> Option<String> {
        self.last_error.load_full().map(|message| message.as_ref().clone())
    }

    fn settings(&self) -> RelaySettings {
        self.settings.load().as_ref().clone()
    }

    fn update_settings(&self, settings: RelaySettings) {
        debug!(base_url = settings.base_url.as_str(), "relay settings updated");
        self.settings.store(Arc::new(settings));
    }
}

fn transport_err(e: reqwest::Error) -> DanmakuError {
    DanmakuError::Relay {
        message: e.to_string(),
        source: Some(Box::new(e)),
    }
}

fn http_status_err(status: reqwest::StatusCode) -> DanmakuError {
    DanmakuError::relay(format!("HTTP error! status: {}", status.as_u16()))
}
