// SPDX-FileCopyrightText: 2026 Danmaku Bridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Key-value CRUD operations on `kv_state`.

use danmaku_core::DanmakuError;
use rusqlite::params;

use crate::database::Database;

/// Read the value stored under `key`.
pub async fn get_value(db: &Database, key: &str) -> Result<Option<String>, DanmakuError> {
    let key = key.to_string();
    db.connection()
        .call(move |conn| {
            let result = conn.query_row(
                "SELECT value FROM kv_state WHERE key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            );
            match result {
                Ok(value) => Ok(Some(value)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(crate::database::map_tr_err::<rusqlite::Error>)
}

/// Insert or replace the value stored under `key`.
pub async fn set_value(db: &Database, key: &str, value: &str) -> Result<(), DanmakuError> {
    let key = key.to_string();
    let value = value.to_string();
    let now = chrono::Utc::now().to_rfc3339();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO kv_state (key, value, updated_at) VALUES (?1, ?2, ?3)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
                params![key, value, now],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err::<rusqlite::Error>)
}

/// Remove `key`. Returns whether a row was deleted.
pub async fn delete_value(db: &Database, key: &str) -> Result<bool, DanmakuError> {
    let key = key.to_string();
    db.connection()
        .call(move |conn| {
            let changed = conn.execute("DELETE FROM kv_state WHERE key = ?1", params![key])?;
            Ok(changed > 0)
        })
        .await
        .map_err(crate::database::map_tr_err::<rusqlite::Error>)
}
