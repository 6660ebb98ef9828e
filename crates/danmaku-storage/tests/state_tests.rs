// SPDX-FileCopyrightText: 2026 Danmaku Bridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Persistence of bridge state across store instances.

use danmaku_config::model::StorageConfig;
use danmaku_core::{RelaySettings, StateStore};
use danmaku_storage::SqliteStateStore;

fn config_for(dir: &tempfile::TempDir) -> StorageConfig {
    StorageConfig {
        database_path: dir
            .path()
            .join("nested")
            .join("danmaku.db")
            .to_string_lossy()
            .into_owned(),
        wal_mode: true,
    }
}

#[tokio::test]
async fn watermark_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();

    let first = SqliteStateStore::new(config_for(&dir));
    first.initialize().await.unwrap();
    first.save_watermark(1_700_000_123).await.unwrap();
    first.close().await.unwrap();
    drop(first);

    let second = SqliteStateStore::new(config_for(&dir));
    second.initialize().await.unwrap();
    assert_eq!(second.load_watermark().await.unwrap(), 1_700_000_123);
}

#[tokio::test]
async fn relay_settings_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let settings = RelaySettings {
        base_url: "http://10.0.0.2:12346/".to_string(),
        access_key_id: "ak".to_string(),
        access_key_secret: "sk".to_string(),
        app_id: "1700000000".to_string(),
        room_owner_auth_code: "AUTH".to_string(),
    };

    let store = SqliteStateStore::new(config_for(&dir));
    store.initialize().await.unwrap();
    store.save_relay_settings(&settings).await.unwrap();
    drop(store);

    let reopened = SqliteStateStore::new(config_for(&dir));
    reopened.initialize().await.unwrap();
    assert_eq!(
        reopened.load_relay_settings().await.unwrap(),
        Some(settings)
    );
}

#[tokio::test]
async fn initialize_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let store = SqliteStateStore::new(config_for(&dir));
    store.initialize().await.unwrap();
    store.save_watermark(7).await.unwrap();
    store.initialize().await.unwrap();
    assert_eq!(store.load_watermark().await.unwrap(), 7);
}
