// SPDX-FileCopyrightText: 2026 Danmaku Bridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trait seams between the bridge and its collaborators.
//!
//! All traits use `#[async_trait]` for dynamic dispatch compatibility.

pub mod chat;
pub mod provider;
pub mod source;
pub mod state;

pub use chat::{ChatPipeline, SendOptions};
pub use provider::{CompletionProvider, ProviderCatalog};
pub use source::EventSource;
pub use state::StateStore;
