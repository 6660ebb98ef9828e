// SPDX-FileCopyrightText: 2026 Danmaku Bridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Chat pipeline trait: the transcript that relay messages are appended to.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::DanmakuError;
use crate::traits::provider::CompletionProvider;
use crate::types::{ChatMessage, ExternalMessageMeta, ProviderConfig};

/// Provider selection passed along with [`ChatPipeline::send`].
#[derive(Clone)]
pub struct SendOptions {
    pub provider: Arc<dyn CompletionProvider>,
    pub model: String,
    pub provider_config: Option<ProviderConfig>,
}

impl std::fmt::Debug for SendOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SendOptions")
            .field("provider", &self.provider.name())
            .field("model", &self.model)
            .field("provider_config", &self.provider_config)
            .finish()
    }
}

/// A chat transcript that accepts external messages and can request AI replies.
#[async_trait]
pub trait ChatPipeline: Send + Sync {
    /// Appends a message that originated outside the local chat input.
    async fn handle_external_message(
        &self,
        text: &str,
        metadata: ExternalMessageMeta,
    ) -> Result<(), DanmakuError>;

    /// Requests an AI reply to `text` using the given provider selection.
    async fn send(&self, text: &str, options: SendOptions) -> Result<(), DanmakuError>;

    /// Appends a message directly to the transcript, bypassing the normal append path.
    async fn push_message(&self, message: ChatMessage);

    /// A snapshot of the transcript.
    async fn messages(&self) -> Vec<ChatMessage>;
}
