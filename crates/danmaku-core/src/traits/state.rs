// SPDX-FileCopyrightText: 2026 Danmaku Bridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Persisted key-value state: the de-duplication watermark and the relay settings record.

use async_trait::async_trait;

use crate::error::DanmakuError;
use crate::types::RelaySettings;

/// Persistence for state that must survive restarts.
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Loads the last-processed event timestamp (0 when never written).
    async fn load_watermark(&self) -> Result<i64, DanmakuError>;

    /// Stores the last-processed event timestamp.
    async fn save_watermark(&self, timestamp: i64) -> Result<(), DanmakuError>;

    /// Loads the relay settings record, if one was ever saved.
    async fn load_relay_settings(&self) -> Result<Option<RelaySettings>, DanmakuError>;

    /// Replaces the relay settings record.
    async fn save_relay_settings(&self, settings: &RelaySettings) -> Result<(), DanmakuError>;
}
