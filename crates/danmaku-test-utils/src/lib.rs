// SPDX-FileCopyrightText: 2026 Danmaku Bridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for danmaku bridge integration tests.
//!
//! Provides in-memory implementations of every trait seam so the poll loop,
//! normalizer and dispatcher can be exercised without a relay, a database
//! or a completion API.
//!
//! # Components
//!
//! - [`MockEventSource`] - Relay stand-in with scripted batches and call capture
//! - [`MockChatPipeline`] - Transcript that records handled and sent messages
//! - [`MockCompletionProvider`] / [`MockCatalog`] - Provider selection stand-ins
//! - [`MemoryStateStore`] - Watermark and settings held in memory
//! - [`events`] - Builders for relay events

pub mod events;
pub mod memory_state;
pub mod mock_chat;
pub mod mock_provider;
pub mod mock_source;

pub use memory_state::MemoryStateStore;
pub use mock_chat::{MockChatPipeline, SentRequest};
pub use mock_provider::{MockCatalog, MockCompletionProvider};
pub use mock_source::MockEventSource;
