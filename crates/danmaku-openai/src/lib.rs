// SPDX-FileCopyrightText: 2026 Danmaku Bridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! OpenAI-compatible completion provider for the danmaku bridge.
//!
//! This crate implements [`CompletionProvider`] for any server that speaks
//! the Chat Completions API (OpenAI, OpenRouter, Ollama, vLLM, ...).

pub mod client;
pub mod types;

use async_trait::async_trait;
use danmaku_core::error::DanmakuError;
use danmaku_core::traits::CompletionProvider;
use danmaku_core::types::{ChatRole, CompletionRequest, CompletionResponse, ProviderConfig};
use secrecy::SecretString;
use tracing::{debug, info};

use crate::client::OpenAiClient;
use crate::types::{ApiMessage, ChatCompletionRequest};

/// OpenAI-compatible provider implementing [`CompletionProvider`].
pub struct OpenAiProvider {
    name: String,
    client: OpenAiClient,
}

impl OpenAiProvider {
    /// Creates a provider from its connection settings.
    ///
    /// An empty API key is treated as no key.
    pub fn new(config: &ProviderConfig) -> Result<Self, DanmakuError> {
        let api_key = config
            .api_key
            .as_deref()
            .filter(|key| !key.is_empty())
            .map(|key| SecretString::from(key.to_string()));
        let client = OpenAiClient::new(&config.base_url, api_key)?;

        info!(
            provider = config.name.as_str(),
            endpoint = client.endpoint(),
            "OpenAI-compatible provider initialized"
        );

        Ok(Self {
            name: config.name.clone(),
            client,
        })
    }

    /// Converts a [`CompletionRequest`] into the wire request.
    ///
    /// Error-role transcript entries are local annotations and are not sent.
    fn to_api_request(request: &CompletionRequest) -> ChatCompletionRequest {
        let messages = request
            .messages
            .iter()
            .filter_map(|m| {
                let role = match m.role {
                    ChatRole::System => "system",
                    ChatRole::User => "user",
                    ChatRole::Assistant => "assistant",
                    ChatRole::Error => return None,
                };
                Some(ApiMessage {
                    role: role.to_string(),
                    content: m.content.clone(),
                })
            })
            .collect();

        ChatCompletionRequest {
            model: request.model.clone(),
            messages,
            stream: false,
        }
    }
}

#[async_trait]
impl CompletionProvider for OpenAiProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionResponse, DanmakuError> {
        let api_request = Self::to_api_request(&request);
        let response = self.client.complete(&api_request).await?;

        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| DanmakuError::provider("completion returned no message content"))?;

        debug!(
            provider = self.name.as_str(),
            chars = content.chars().count(),
            "completion received"
        );

        Ok(CompletionResponse {
            model: response.model.unwrap_or(request.model),
            content,
        })
    }
}
