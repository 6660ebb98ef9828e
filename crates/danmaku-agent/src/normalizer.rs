// SPDX-FileCopyrightText: 2026 Danmaku Bridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Timestamp watermark filter and display formatting for relay events.
//!
//! The watermark is the sole de-duplication mechanism: an event whose
//! timestamp is not strictly greater than the last processed one is dropped.
//! The check and the advance happen under one lock, so two overlapping poll
//! cycles can never both admit the same event.

use std::sync::Arc;

use danmaku_core::{DanmakuError, DanmakuEvent, EventKind, StateStore};
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Watermark state shared by every poll cycle.
pub struct Normalizer {
    watermark: Mutex<i64>,
    store: Arc<dyn StateStore>,
}

impl Normalizer {
    /// Create a normalizer starting from `watermark`.
    pub fn new(store: Arc<dyn StateStore>, watermark: i64) -> Self {
        Self {
            watermark: Mutex::new(watermark),
            store,
        }
    }

    /// Create a normalizer starting from the persisted watermark.
    pub async fn load(store: Arc<dyn StateStore>) -> Result<Self, DanmakuError> {
        let watermark = store.load_watermark().await?;
        debug!(watermark, "watermark loaded");
        Ok(Self::new(store, watermark))
    }

    /// The last processed timestamp.
    pub async fn watermark(&self) -> i64 {
        *self.watermark.lock().await
    }

    /// Decides whether `event` is new, advancing and persisting the watermark
    /// if it is.
    ///
    /// Persistence failures are logged; the in-memory watermark still moves so
    /// the event is not dispatched twice in this process.
    pub async fn admit(&self, event: &DanmakuEvent) -> bool {
        let mut watermark = self.watermark.lock().await;
        if event.timestamp <= *watermark {
            return false;
        }
        *watermark = event.timestamp;

        if let Err(e) = self.store.save_watermark(event.timestamp).await {
            warn!(
                error = %e,
                timestamp = event.timestamp,
                "failed to persist watermark"
            );
        }
        true
    }
}

/// Orders a batch by ascending timestamp. Equal timestamps keep relay order.
pub fn order_batch(events: &mut [DanmakuEvent]) {
    events.sort_by_key(|event| event.timestamp);
}

/// The human-readable content of an event.
pub fn format_content(kind: &EventKind) -> String {
    match kind {
        EventKind::Danmaku { text } => text.clone().unwrap_or_default(),
        EventKind::Gift {
            gift_name,
            gift_num,
            ..
        } => format!(
            "赠送 {} x{}",
            gift_name.as_deref().unwrap_or_default(),
            gift_num.unwrap_or(1)
        ),
        EventKind::Guard { guard_name, .. } => {
            format!("购买大航海: {}", guard_name.as_deref().unwrap_or_default())
        }
        EventKind::SuperChat { message, .. } => {
            format!("醒目留言: {}", message.as_deref().unwrap_or_default())
        }
        EventKind::Like => "点赞".to_string(),
        EventKind::Other { tag, message, msg } => message
            .as_deref()
            .filter(|s| !s.is_empty())
            .or_else(|| msg.as_deref().filter(|s| !s.is_empty()))
            .map(str::to_string)
            .unwrap_or_else(|| format!("收到{tag}事件")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use danmaku_test_utils::{MemoryStateStore, events};
    use tracing_test::traced_test;

    #[test]
    fn formats_known_tags() {
        assert_eq!(format_content(&events::danmaku(1, "a", "hi").kind), "hi");
        assert_eq!(
            format_content(&events::gift(1, "a", "Rocket", 5).kind),
            "赠送 Rocket x5"
        );
        assert_eq!(
            format_content(&events::guard(1, "a", "舰长").kind),
            "购买大航海: 舰长"
        );
        assert_eq!(
            format_content(&EventKind::SuperChat {
                message: Some("加油".to_string()),
                rmb: Some(30.0),
            }),
            "醒目留言: 加油"
        );
        assert_eq!(format_content(&events::like(1, "a").kind), "点赞");
    }

    #[test]
    fn chat_text_without_text_is_empty() {
        assert_eq!(format_content(&EventKind::Danmaku { text: None }), "");
    }

    #[test]
    fn unknown_tag_prefers_message_then_msg() {
        assert_eq!(
            format_content(&events::other(1, "a", "enter", Some("进入直播间")).kind),
            "进入直播间"
        );
        assert_eq!(
            format_content(&EventKind::Other {
                tag: "enter".to_string(),
                message: Some(String::new()),
                msg: Some("welcome".to_string()),
            }),
            "welcome"
        );
        assert_eq!(
            format_content(&events::other(1, "a", "follow", None).kind),
            "收到follow事件"
        );
    }

    #[test]
    fn ordering_is_stable() {
        let mut batch = vec![
            events::danmaku(7, "first", "x"),
            events::danmaku(3, "early", "y"),
            events::danmaku(7, "second", "z"),
        ];
        order_batch(&mut batch);
        let names: Vec<&str> = batch.iter().map(|e| e.uname.as_str()).collect();
        assert_eq!(names, vec!["early", "first", "second"]);
    }

    #[tokio::test]
    async fn admit_advances_and_persists() {
        let store = Arc::new(MemoryStateStore::new());
        let normalizer = Normalizer::new(store.clone(), 0);

        assert!(normalizer.admit(&events::like(5, "a")).await);
        assert!(!normalizer.admit(&events::like(5, "b")).await);
        assert!(!normalizer.admit(&events::like(4, "c")).await);
        assert!(normalizer.admit(&events::like(6, "d")).await);

        assert_eq!(normalizer.watermark().await, 6);
        assert_eq!(store.saved_watermarks().await, vec![5, 6]);
    }

    #[tokio::test]
    #[traced_test]
    async fn persistence_failure_does_not_block_admission() {
        let store = Arc::new(MemoryStateStore::new());
        store.fail_saves(true);
        let normalizer = Normalizer::new(store, 0);

        assert!(normalizer.admit(&events::like(9, "a")).await);
        assert_eq!(normalizer.watermark().await, 9);
        assert!(!normalizer.admit(&events::like(9, "a")).await);
        assert!(logs_contain("failed to persist watermark"));
    }

    #[tokio::test]
    async fn load_reads_persisted_watermark() {
        let store = Arc::new(MemoryStateStore::with_watermark(100));
        let normalizer = Normalizer::load(store).await.unwrap();
        assert_eq!(normalizer.watermark().await, 100);
        assert!(!normalizer.admit(&events::like(100, "a")).await);
    }
}
