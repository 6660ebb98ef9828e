// SPDX-FileCopyrightText: 2026 Danmaku Bridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory `StateStore` for tests.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use danmaku_core::{DanmakuError, RelaySettings, StateStore};

/// Watermark and settings held in memory, with every watermark write captured.
pub struct MemoryStateStore {
    watermark: Mutex<i64>,
    settings: Mutex<Option<RelaySettings>>,
    saved_watermarks: Mutex<Vec<i64>>,
    fail_saves: AtomicBool,
}

impl MemoryStateStore {
    /// Create an empty store (watermark 0, no settings).
    pub fn new() -> Self {
        Self::with_watermark(0)
    }

    /// Create a store whose persisted watermark is `watermark`.
    pub fn with_watermark(watermark: i64) -> Self {
        Self {
            watermark: Mutex::new(watermark),
            settings: Mutex::new(None),
            saved_watermarks: Mutex::new(Vec::new()),
            fail_saves: AtomicBool::new(false),
        }
    }

    /// Make every subsequent write fail with a storage error.
    pub fn fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }

    /// Every watermark passed to `save_watermark`, in call order.
    pub async fn saved_watermarks(&self) -> Vec<i64> {
        self.saved_watermarks.lock().await.clone()
    }

    fn check_writable(&self) -> Result<(), DanmakuError> {
        if self.fail_saves.load(Ordering::SeqCst) {
            Err(DanmakuError::Storage {
                source: "disk full".into(),
            })
        } else {
            Ok(())
        }
    }
}

impl Default for MemoryStateStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StateStore for MemoryStateStore {
    async fn load_watermark(&self) -> Result<i64, DanmakuError> {
        Ok(*self.watermark.lock().await)
    }

    async fn save_watermark(&self, timestamp: i64) -> Result<(), DanmakuError> {
        self.saved_watermarks.lock().await.push(timestamp);
        self.check_writable()?;
        *self.watermark.lock().await = timestamp;
        Ok(())
    }

    async fn load_relay_settings(&self) -> Result<Option<RelaySettings>, DanmakuError> {
        Ok(self.settings.lock().await.clone())
    }

    async fn save_relay_settings(&self, settings: &RelaySettings) -> Result<(), DanmakuError> {
        self.check_writable()?;
        *self.settings.lock().await = Some(settings.clone());
        Ok(())
    }
}
