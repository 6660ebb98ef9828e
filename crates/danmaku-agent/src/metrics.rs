// SPDX-FileCopyrightText: 2026 Danmaku Bridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Metric registration and recording helpers.
//!
//! Uses the metrics-rs facade so any installed recorder can collect these
//! counters. Without a recorder every call is a no-op.

use metrics::describe_counter;

/// Register all bridge metric descriptions.
pub fn register_metrics() {
    describe_counter!("danmaku_events_received_total", "Events fetched from the relay");
    describe_counter!(
        "danmaku_events_skipped_total",
        "Events discarded by the timestamp watermark"
    );
    describe_counter!(
        "danmaku_events_dispatched_total",
        "Events appended to the chat transcript"
    );
    describe_counter!(
        "danmaku_dispatch_failures_total",
        "Events whose dispatch to the transcript failed"
    );
    describe_counter!(
        "danmaku_ai_trigger_failures_total",
        "AI replies that could not be requested"
    );
}

/// Record a fetched batch.
pub fn record_received(count: usize) {
    metrics::counter!("danmaku_events_received_total").increment(count as u64);
}

/// Record an event rejected by the watermark.
pub fn record_skipped() {
    metrics::counter!("danmaku_events_skipped_total").increment(1);
}

/// Record a dispatched event.
pub fn record_dispatched(tag: &str) {
    metrics::counter!("danmaku_events_dispatched_total", "type" => tag.to_string()).increment(1);
}

/// Record a failed dispatch.
pub fn record_dispatch_failure() {
    metrics::counter!("danmaku_dispatch_failures_total").increment(1);
}

/// Record a failed AI trigger.
pub fn record_ai_trigger_failure() {
    metrics::counter!("danmaku_ai_trigger_failures_total").increment(1);
}
