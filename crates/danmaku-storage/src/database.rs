// SPDX-FileCopyrightText: 2026 Danmaku Bridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup, WAL mode, and lifecycle.
//!
//! All writes are serialized through tokio-rusqlite's single background thread.
//! Do NOT create additional Connection instances for writes.

use std::path::Path;

use danmaku_core::DanmakuError;
use tokio_rusqlite::Connection;
use tracing::debug;

/// Handle to the bridge's SQLite database.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Opens (creating if needed) the database at `path`, applies PRAGMAs and
    /// runs pending migrations.
    pub async fn open(path: &str, wal_mode: bool) -> Result<Self, DanmakuError> {
        if let Some(parent) = Path::new(path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| DanmakuError::Storage {
                    source: Box::new(e),
                })?;
            }
        }

        let conn = Connection::open(path)
            .await
            .map_err(|e| DanmakuError::Storage {
                source: e.to_string().into(),
            })?;
        let db = Self { conn };
        db.prepare(wal_mode).await?;
        debug!(path, wal_mode, "database opened");
        Ok(db)
    }

    /// Opens a private in-memory database with the schema applied.
    pub async fn open_in_memory() -> Result<Self, DanmakuError> {
        let conn = Connection::open_in_memory()
            .await
            .map_err(|e| DanmakuError::Storage {
                source: e.to_string().into(),
            })?;
        let db = Self { conn };
        db.prepare(false).await?;
        Ok(db)
    }

    async fn prepare(&self, wal_mode: bool) -> Result<(), DanmakuError> {
        self.conn
            .call(move |conn| -> Result<(), DanmakuError> {
                let journal = if wal_mode { "WAL" } else { "DELETE" };
                conn.execute_batch(&format!(
                    "PRAGMA journal_mode = {journal};
                     PRAGMA synchronous = NORMAL;
                     PRAGMA busy_timeout = 5000;"
                ))
                .map_err(|e| DanmakuError::Storage {
                    source: Box::new(e),
                })?;
                crate::migrations::run_migrations(conn)
            })
            .await
            .map_err(map_tr_err)
    }

    /// The underlying single-writer connection.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Checkpoints the WAL so the main file is self-contained on exit.
    pub async fn close(&self) -> Result<(), DanmakuError> {
        self.conn
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)
    }
}

/// Converts a tokio-rusqlite error into [`DanmakuError::Storage`].
pub fn map_tr_err<E: std::fmt::Display>(e: tokio_rusqlite::Error<E>) -> DanmakuError {
    DanmakuError::Storage {
        source: e.to_string().into(),
    }
}
