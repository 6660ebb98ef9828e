// SPDX-FileCopyrightText: 2026 Danmaku Bridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fixed-interval poll loop.
//!
//! Each tick spawns the poll cycle in its own task, so ticks keep their
//! wall-clock cadence even when a cycle outlasts the interval. Stopping
//! cancels the timer only; cycles already running finish on their own.

use std::future::Future;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Interval used when the caller does not choose one.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(3000);

/// A running timer. Exists only while polling.
struct PollSession {
    cancel: CancellationToken,
}

/// Idle/Polling state machine driving a recurring cycle.
#[derive(Default)]
pub struct Poller {
    session: Mutex<Option<PollSession>>,
}

impl Poller {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a timer is armed.
    pub fn is_polling(&self) -> bool {
        self.session().is_some()
    }

    /// Arms the timer. The first cycle runs one `interval` after this call.
    ///
    /// Returns `false` without touching the running timer when already polling,
    /// and `false` without arming anything when `interval` is zero.
    pub fn start<F, Fut>(&self, interval: Duration, cycle: F) -> bool
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        if interval.is_zero() {
            warn!("poll interval must be non-zero, not starting");
            return false;
        }

        let mut session = self.session();
        if session.is_some() {
            debug!("poller already running, ignoring start");
            return false;
        }

        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let first_tick = Instant::now() + interval;
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(first_tick, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => {
                        debug!("poll timer cancelled");
                        break;
                    }
                    _ = ticker.tick() => {
                        tokio::spawn(cycle());
                    }
                }
            }
        });

        info!(interval_ms = interval.as_millis() as u64, "polling started");
        *session = Some(PollSession { cancel });
        true
    }

    /// Cancels the timer and returns to idle. Safe to call when idle.
    ///
    /// Returns whether a timer was running.
    pub fn stop(&self) -> bool {
        match self.session().take() {
            Some(session) => {
                session.cancel.cancel();
                info!("polling stopped");
                true
            }
            None => false,
        }
    }

    fn session(&self) -> MutexGuard<'_, Option<PollSession>> {
        self.session
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting_cycle(
        counter: Arc<AtomicUsize>,
    ) -> impl Fn() -> std::future::Ready<()> + Send + Sync {
        move || {
            counter.fetch_add(1, Ordering::SeqCst);
            std::future::ready(())
        }
    }

    /// Lets spawned tasks observe the advanced clock.
    async fn settle() {
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn first_tick_fires_after_one_interval() {
        let poller = Poller::new();
        let ticks = Arc::new(AtomicUsize::new(0));
        assert!(poller.start(Duration::from_millis(3000), counting_cycle(ticks.clone())));
        settle().await;

        tokio::time::advance(Duration::from_millis(2999)).await;
        settle().await;
        assert_eq!(ticks.load(Ordering::SeqCst), 0);

        tokio::time::advance(Duration::from_millis(1)).await;
        settle().await;
        assert_eq!(ticks.load(Ordering::SeqCst), 1);

        tokio::time::advance(Duration::from_millis(3000)).await;
        settle().await;
        assert_eq!(ticks.load(Ordering::SeqCst), 2);
        poller.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn double_start_keeps_single_timer() {
        let poller = Poller::new();
        let ticks = Arc::new(AtomicUsize::new(0));
        assert!(poller.start(Duration::from_millis(100), counting_cycle(ticks.clone())));
        assert!(!poller.start(Duration::from_millis(100), counting_cycle(ticks.clone())));
        assert!(poller.is_polling());
        settle().await;

        tokio::time::advance(Duration::from_millis(100)).await;
        settle().await;
        assert_eq!(ticks.load(Ordering::SeqCst), 1);
        poller.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn stop_halts_ticks_and_is_idempotent() {
        let poller = Poller::new();
        let ticks = Arc::new(AtomicUsize::new(0));
        poller.start(Duration::from_millis(100), counting_cycle(ticks.clone()));
        settle().await;

        tokio::time::advance(Duration::from_millis(100)).await;
        settle().await;
        assert!(poller.stop());
        assert!(!poller.is_polling());
        assert!(!poller.stop());

        tokio::time::advance(Duration::from_millis(500)).await;
        settle().await;
        assert_eq!(ticks.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn stop_when_idle_is_a_no_op() {
        let poller = Poller::new();
        assert!(!poller.stop());
        assert!(!poller.is_polling());
    }

    #[tokio::test]
    async fn zero_interval_is_rejected() {
        let poller = Poller::new();
        let ticks = Arc::new(AtomicUsize::new(0));
        assert!(!poller.start(Duration::ZERO, counting_cycle(ticks.clone())));
        assert!(!poller.is_polling());

        assert!(poller.start(Duration::from_millis(100), counting_cycle(ticks)));
        assert!(poller.is_polling());
        poller.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn restart_after_stop() {
        let poller = Poller::new();
        let ticks = Arc::new(AtomicUsize::new(0));
        poller.start(Duration::from_millis(100), counting_cycle(ticks.clone()));
        poller.stop();
        assert!(poller.start(Duration::from_millis(100), counting_cycle(ticks.clone())));
        settle().await;

        tokio::time::advance(Duration::from_millis(100)).await;
        settle().await;
        assert_eq!(ticks.load(Ordering::SeqCst), 1);
        poller.stop();
    }
}
