// SPDX-FileCopyrightText: 2026 Danmaku Bridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock relay for deterministic testing.
//!
//! `MockEventSource` implements `EventSource` with scripted fetch results and
//! captured commands for assertion in tests.

use std::collections::VecDeque;
use std::sync::Mutex as StdMutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use danmaku_core::{DanmakuEvent, EventSource, RelayCredentials, RelaySettings, ServiceStatus};

/// A scripted relay.
///
/// Each `fetch_events()` pops the next scripted result. When the script is
/// exhausted the relay reports an empty buffer.
pub struct MockEventSource {
    batches: Mutex<VecDeque<Option<Vec<DanmakuEvent>>>>,
    status: StdMutex<Option<ServiceStatus>>,
    configure_ok: AtomicBool,
    stop_ok: AtomicBool,
    configured: Mutex<Vec<serde_json::Value>>,
    fetch_calls: AtomicUsize,
    stop_calls: AtomicUsize,
    settings: StdMutex<RelaySettings>,
    last_error: StdMutex<Option<String>>,
}

impl MockEventSource {
    /// Create a relay that accepts every command and has nothing buffered.
    pub fn new() -> Self {
        Self {
            batches: Mutex::new(VecDeque::new()),
            status: StdMutex::new(Some(ServiceStatus {
                running: true,
                message_count: 0,
            })),
            configure_ok: AtomicBool::new(true),
            stop_ok: AtomicBool::new(true),
            configured: Mutex::new(Vec::new()),
            fetch_calls: AtomicUsize::new(0),
            stop_calls: AtomicUsize::new(0),
            settings: StdMutex::new(RelaySettings::default()),
            last_error: StdMutex::new(None),
        }
    }

    /// Queue a batch for a future `fetch_events()`.
    pub async fn push_batch(&self, events: Vec<DanmakuEvent>) {
        self.batches.lock().await.push_back(Some(events));
    }

    /// Queue a failed fetch.
    pub async fn push_fetch_failure(&self) {
        self.batches.lock().await.push_back(None);
    }

    /// Set what `status()` reports.
    pub fn set_status(&self, status: Option<ServiceStatus>) {
        *lock(&self.status) = status;
    }

    /// Make `configure()` succeed or fail.
    pub fn set_configure_result(&self, ok: bool) {
        self.configure_ok.store(ok, Ordering::SeqCst);
    }

    /// Make `stop()` succeed or fail.
    pub fn set_stop_result(&self, ok: bool) {
        self.stop_ok.store(ok, Ordering::SeqCst);
    }

    /// Payloads passed to `configure()`, in call order.
    pub async fn configured_payloads(&self) -> Vec<serde_json::Value> {
        self.configured.lock().await.clone()
    }

    /// Number of `fetch_events()` calls so far.
    pub fn fetch_calls(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }

    /// Number of `stop()` calls so far.
    pub fn stop_calls(&self) -> usize {
        self.stop_calls.load(Ordering::SeqCst)
    }

    fn fail(&self, message: &str) {
        *lock(&self.last_error) = Some(message.to_string());
    }
}

impl Default for MockEventSource {
    fn default() -> Self {
        Self::new()
    }
}

fn lock<T>(mutex: &StdMutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[async_trait]
impl EventSource for MockEventSource {
    async fn status(&self) -> Option<ServiceStatus> {
        let status = *lock(&self.status);
        if status.is_none() {
            self.fail("获取弹幕服务状态失败: mock failure");
        }
        status
    }

    async fn configure(&self, credentials: &RelayCredentials) -> bool {
        self.configured.lock().await.push(credentials.to_payload());
        if self.configure_ok.load(Ordering::SeqCst) {
            *lock(&self.last_error) = None;
            true
        } else {
            self.fail("配置弹幕服务失败: mock failure");
            false
        }
    }

    async fn fetch_events(&self) -> Option<Vec<DanmakuEvent>> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        match self.batches.lock().await.pop_front() {
            Some(Some(events)) => Some(events),
            Some(None) => {
                self.fail("获取弹幕消息失败: mock failure");
                None
            }
            None => Some(Vec::new()),
        }
    }

    async fn stop(&self) -> bool {
        self.stop_calls.fetch_add(1, Ordering::SeqCst);
        if self.stop_ok.load(Ordering::SeqCst) {
            *lock(&self.last_error) = None;
            true
        } else {
            self.fail("停止弹幕服务失败: mock failure");
            false
        }
    }

    fn last_error(&self) -> Option<String> {
        lock(&self.last_error).clone()
    }

    fn settings(&self) -> RelaySettings {
        lock(&self.settings).clone()
    }

    fn update_settings(&self, settings: RelaySettings) {
        *lock(&self.settings) = settings;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events;

    #[tokio::test]
    async fn scripted_batches_then_empty() {
        let source = MockEventSource::new();
        source.push_batch(vec![events::like(1, "a")]).await;
        source.push_fetch_failure().await;

        assert_eq!(source.fetch_events().await.map(|b| b.len()), Some(1));
        assert!(source.fetch_events().await.is_none());
        assert!(source.last_error().unwrap().starts_with("获取弹幕消息失败"));
        assert_eq!(source.fetch_events().await, Some(Vec::new()));
        assert_eq!(source.fetch_calls(), 3);
    }

    #[tokio::test]
    async fn configure_records_payload_and_clears_error() {
        let source = MockEventSource::new();
        source.set_status(None);
        assert!(source.status().await.is_none());

        let settings = RelaySettings {
            app_id: "42".to_string(),
            ..RelaySettings::default()
        };
        assert!(source.configure(&settings.credentials()).await);
        assert!(source.last_error().is_none());
        assert_eq!(source.configured_payloads().await[0]["APP_ID"], "42");
    }
}
