// SPDX-FileCopyrightText: 2026 Danmaku Bridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Client for the local relay service that bridges a Bilibili live room.
//!
//! Provides [`RelayClient`], an [`EventSource`](danmaku_core::EventSource)
//! that talks to the relay's `status`, `configure`, `messages` and `stop`
//! endpoints and records failures into a single user-visible error slot.

pub mod client;
pub mod types;

pub use client::RelayClient;
