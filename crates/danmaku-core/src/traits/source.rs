// SPDX-FileCopyrightText: 2026 Danmaku Bridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Event source trait for the live-stream relay service.

use async_trait::async_trait;

use crate::types::{DanmakuEvent, RelayCredentials, RelaySettings, ServiceStatus};

/// A source of live-stream events.
///
/// Operations never fail loudly: failures are recorded into a single error
/// slot readable via [`last_error`](EventSource::last_error) and reported as
/// `None` / `false`. Nothing is retried; the caller decides whether to try
/// again on the next tick or user action.
#[async_trait]
pub trait EventSource: Send + Sync {
    /// Returns the relay's running flag and buffered event count.
    async fn status(&self) -> Option<ServiceStatus>;

    /// Pushes credentials to the relay so it can connect to the live room.
    async fn configure(&self, credentials: &RelayCredentials) -> bool;

    /// Fetches the relay's pending events.
    async fn fetch_events(&self) -> Option<Vec<DanmakuEvent>>;

    /// Asks the relay to stop.
    async fn stop(&self) -> bool;

    /// The most recent user-visible failure, if any.
    fn last_error(&self) -> Option<String>;

    /// The connection settings used by the next request.
    fn settings(&self) -> RelaySettings;

    /// Replaces the connection settings for subsequent requests.
    fn update_settings(&self, settings: RelaySettings);
}
