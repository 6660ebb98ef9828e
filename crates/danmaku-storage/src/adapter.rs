// SPDX-FileCopyrightText: 2026 Danmaku Bridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the StateStore trait.

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::{debug, warn};

use danmaku_config::model::StorageConfig;
use danmaku_core::{DanmakuError, RelaySettings, StateStore};

use crate::database::Database;
use crate::queries::kv;

/// Key of the JSON relay settings record.
pub const RELAY_SETTINGS_KEY: &str = "bilibili-danmaku-config";

/// Key of the last-processed event timestamp.
pub const WATERMARK_KEY: &str = "bilibili-danmaku-last-timestamp";

/// SQLite-backed state store.
///
/// The database is lazily opened on the first call to
/// [`initialize`](SqliteStateStore::initialize).
pub struct SqliteStateStore {
    config: StorageConfig,
    db: OnceCell<Database>,
}

impl SqliteStateStore {
    /// Create a new store with the given configuration.
    ///
    /// The database connection is not opened until [`initialize`](Self::initialize) is called.
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            db: OnceCell::new(),
        }
    }

    /// Opens the database and runs migrations. Calling it twice is a no-op.
    pub async fn initialize(&self) -> Result<(), DanmakuError> {
        self.db
            .get_or_try_init(|| Database::open(&self.config.database_path, self.config.wal_mode))
            .await?;
        Ok(())
    }

    /// Checkpoints the WAL if the database was opened.
    pub async fn close(&self) -> Result<(), DanmakuError> {
        match self.db.get() {
            Some(db) => db.close().await,
            None => Ok(()),
        }
    }

    /// Forgets the watermark so every buffered event is treated as new.
    pub async fn reset_watermark(&self) -> Result<bool, DanmakuError> {
        kv::delete_value(self.db()?, WATERMARK_KEY).await
    }

    fn db(&self) -> Result<&Database, DanmakuError> {
        self.db.get().ok_or_else(|| DanmakuError::Storage {
            source: "storage not initialized -- call initialize() first".into(),
        })
    }
}

#[async_trait]
impl StateStore for SqliteStateStore {
    async fn load_watermark(&self) -> Result<i64, DanmakuError> {
        let raw = kv::get_value(self.db()?, WATERMARK_KEY).await?;
        Ok(match raw {
            Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
                warn!(value = raw.as_str(), "stored watermark is not a number, starting from 0");
                0
            }),
            None => 0,
        })
    }

    async fn save_watermark(&self, timestamp: i64) -> Result<(), DanmakuError> {
        kv::set_value(self.db()?, WATERMARK_KEY, &timestamp.to_string()).await?;
        debug!(timestamp, "watermark saved");
        Ok(())
    }

    async fn load_relay_settings(&self) -> Result<Option<RelaySettings>, DanmakuError> {
        let Some(raw) = kv::get_value(self.db()?, RELAY_SETTINGS_KEY).await? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(settings) => Ok(Some(settings)),
            Err(e) => {
                warn!(error = %e, "stored relay settings are unreadable, ignoring them");
                Ok(None)
            }
        }
    }

    async fn save_relay_settings(&self, settings: &RelaySettings) -> Result<(), DanmakuError> {
        let raw = serde_json::to_string(settings).map_err(|e| DanmakuError::Storage {
            source: Box::new(e),
        })?;
        kv::set_value(self.db()?, RELAY_SETTINGS_KEY, &raw).await
    }
}
