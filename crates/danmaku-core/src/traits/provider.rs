// SPDX-FileCopyrightText: 2026 Danmaku Bridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Completion provider traits.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::DanmakuError;
use crate::types::{CompletionRequest, CompletionResponse, ProviderConfig};

/// A chat-completion backend.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Name of the provider instance.
    fn name(&self) -> &str;

    /// Sends a completion request and returns the full reply.
    async fn complete(&self, request: CompletionRequest)
    -> Result<CompletionResponse, DanmakuError>;
}

/// The set of configured providers plus the user's active selection.
#[async_trait]
pub trait ProviderCatalog: Send + Sync {
    /// Name of the currently selected provider.
    fn active_provider(&self) -> Option<String>;

    /// Currently selected model.
    fn active_model(&self) -> Option<String>;

    /// Connection settings for the named provider.
    fn provider_config(&self, name: &str) -> Option<ProviderConfig>;

    /// A ready-to-use instance of the named provider.
    async fn provider_instance(
        &self,
        name: &str,
    ) -> Result<Arc<dyn CompletionProvider>, DanmakuError>;
}
