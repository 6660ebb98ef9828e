// SPDX-FileCopyrightText: 2026 Danmaku Bridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite persistence layer for the danmaku bridge.
//!
//! Provides WAL-mode SQLite storage with embedded migrations, a single-writer
//! concurrency model via `tokio-rusqlite`, and a key-value table holding the
//! de-duplication watermark and the relay settings record.

pub mod adapter;
pub mod database;
pub mod migrations;
pub mod queries;

pub use adapter::{RELAY_SETTINGS_KEY, SqliteStateStore, WATERMARK_KEY};
pub use database::Database;
