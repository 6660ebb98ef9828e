// SPDX-FileCopyrightText: 2026 Danmaku Bridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The bridge facade: relay client, poll loop, watermark and dispatcher
//! behind one handle.

use std::sync::Arc;
use std::time::Duration;

use danmaku_core::{
    DanmakuError, DanmakuEvent, EventSource, RelaySettings, ServiceStatus, StateStore,
};
use tracing::{debug, info, warn};

use crate::dispatcher::Dispatcher;
use crate::normalizer::{self, Normalizer};
use crate::poller::{DEFAULT_POLL_INTERVAL, Poller};

/// What happened to a single event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessOutcome {
    /// At or below the watermark.
    Skipped,
    /// Appended to the transcript.
    Dispatched,
    /// Admitted, but the transcript rejected it.
    Failed,
}

/// Counts for one fetch-and-dispatch cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PollReport {
    pub fetched: usize,
    pub dispatched: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// State shared with the poll cycles spawned by the timer.
struct BridgeInner {
    source: Arc<dyn EventSource>,
    normalizer: Normalizer,
    dispatcher: Dispatcher,
}

impl BridgeInner {
    async fn process_message(&self, event: &DanmakuEvent) -> ProcessOutcome {
        if !self.normalizer.admit(event).await {
            crate::metrics::record_skipped();
            return ProcessOutcome::Skipped;
        }

        let content = normalizer::format_content(&event.kind);
        match self.dispatcher.dispatch(event, &content).await {
            Ok(()) => {
                crate::metrics::record_dispatched(event.kind.tag());
                ProcessOutcome::Dispatched
            }
            Err(e) => {
                warn!(
                    error = %e,
                    timestamp = event.timestamp,
                    uname = event.uname.as_str(),
                    "failed to process danmaku message"
                );
                crate::metrics::record_dispatch_failure();
                ProcessOutcome::Failed
            }
        }
    }

    async fn poll_once(&self) -> Option<PollReport> {
        let mut events = self.source.fetch_events().await?;
        crate::metrics::record_received(events.len());
        normalizer::order_batch(&mut events);

        let mut report = PollReport {
            fetched: events.len(),
            ..PollReport::default()
        };
        for event in &events {
            match self.process_message(event).await {
                ProcessOutcome::Skipped => report.skipped += 1,
                ProcessOutcome::Dispatched => report.dispatched += 1,
                ProcessOutcome::Failed => report.failed += 1,
            }
        }

        if report.fetched > 0 {
            debug!(
                fetched = report.fetched,
                dispatched = report.dispatched,
                skipped = report.skipped,
                failed = report.failed,
                "poll cycle finished"
            );
        }
        Some(report)
    }
}

/// Relays live-room events into the chat pipeline.
pub struct DanmakuBridge {
    inner: Arc<BridgeInner>,
    poller: Poller,
    store: Arc<dyn StateStore>,
    default_interval: Duration,
}

impl DanmakuBridge {
    /// Builds a bridge, restoring the persisted watermark and, when present,
    /// the persisted relay settings.
    pub async fn new(
        source: Arc<dyn EventSource>,
        store: Arc<dyn StateStore>,
        dispatcher: Dispatcher,
    ) -> Result<Self, DanmakuError> {
        if let Some(settings) = store.load_relay_settings().await? {
            debug!(base_url = settings.base_url.as_str(), "restored relay settings");
            source.update_settings(settings);
        }
        let normalizer = Normalizer::load(store.clone()).await?;

        Ok(Self {
            inner: Arc::new(BridgeInner {
                source,
                normalizer,
                dispatcher,
            }),
            poller: Poller::new(),
            store,
            default_interval: DEFAULT_POLL_INTERVAL,
        })
    }

    /// Interval used by [`start_polling`](Self::start_polling) when none is given.
    pub fn with_default_interval(mut self, interval: Duration) -> Self {
        self.default_interval = interval;
        self
    }

    /// Relay running flag and buffered count.
    pub async fn service_status(&self) -> Option<ServiceStatus> {
        self.inner.source.status().await
    }

    /// Pushes the current credentials to the relay.
    pub async fn configure_and_start_service(&self) -> bool {
        let credentials = self.inner.source.settings().credentials();
        self.inner.source.configure(&credentials).await
    }

    /// The relay's pending events, without dispatching them.
    pub async fn fetch_messages(&self) -> Option<Vec<DanmakuEvent>> {
        self.inner.source.fetch_events().await
    }

    /// Filters one event through the watermark and dispatches it if new.
    pub async fn process_message(&self, event: &DanmakuEvent) -> ProcessOutcome {
        self.inner.process_message(event).await
    }

    /// Runs one fetch-and-dispatch cycle. `None` when the fetch failed.
    pub async fn poll_once(&self) -> Option<PollReport> {
        self.inner.poll_once().await
    }

    /// Starts the poll loop. Returns `false` when already polling or when the
    /// interval is zero.
    pub fn start_polling(&self, interval: Option<Duration>) -> bool {
        let inner = self.inner.clone();
        self.poller
            .start(interval.unwrap_or(self.default_interval), move || {
                let inner = inner.clone();
                async move {
                    inner.poll_once().await;
                }
            })
    }

    /// Stops the poll loop. Safe to call when idle.
    pub fn stop_polling(&self) {
        self.poller.stop();
    }

    /// Asks the relay to stop; the poll loop is stopped only if it agreed.
    pub async fn stop_service(&self) -> bool {
        if !self.inner.source.stop().await {
            return false;
        }
        self.poller.stop();
        info!("relay stopped");
        true
    }

    pub fn is_polling(&self) -> bool {
        self.poller.is_polling()
    }

    /// The relay client's most recent failure.
    pub fn last_error(&self) -> Option<String> {
        self.inner.source.last_error()
    }

    /// Timestamp of the newest processed event.
    pub async fn watermark(&self) -> i64 {
        self.inner.normalizer.watermark().await
    }

    pub fn settings(&self) -> RelaySettings {
        self.inner.source.settings()
    }

    /// Persists a new settings record and applies it to subsequent requests.
    pub async fn update_settings(&self, settings: RelaySettings) -> Result<(), DanmakuError> {
        self.store.save_relay_settings(&settings).await?;
        self.inner.source.update_settings(settings);
        info!("relay settings updated");
        Ok(())
    }
}
