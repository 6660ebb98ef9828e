// SPDX-FileCopyrightText: 2026 Danmaku Bridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Poll loop and dispatch pipeline for the danmaku bridge.
//!
//! The [`DanmakuBridge`] is the central coordinator that:
//! - Polls the relay on a fixed interval
//! - Filters events through the persisted timestamp watermark
//! - Formats each new event and appends it to the chat transcript
//! - Requests an AI reply from the active completion provider

pub mod bridge;
pub mod chat;
pub mod dispatcher;
pub mod metrics;
pub mod normalizer;
pub mod poller;
pub mod providers;
pub mod shutdown;

pub use bridge::{DanmakuBridge, PollReport, ProcessOutcome};
pub use chat::ChatStore;
pub use dispatcher::Dispatcher;
pub use normalizer::{Normalizer, format_content, order_batch};
pub use poller::{DEFAULT_POLL_INTERVAL, Poller};
pub use providers::{ProviderFactory, ProviderRegistry};
pub use shutdown::install_signal_handler;
