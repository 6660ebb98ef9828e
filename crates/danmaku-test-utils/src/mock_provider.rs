// SPDX-FileCopyrightText: 2026 Danmaku Bridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock completion provider and provider catalog.
//!
//! `MockCompletionProvider` returns pre-configured responses and captures
//! every request; `MockCatalog` serves a fixed provider selection.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use danmaku_core::types::{CompletionRequest, CompletionResponse, ProviderConfig};
use danmaku_core::{CompletionProvider, DanmakuError, ProviderCatalog};

/// A mock completion provider that returns pre-configured responses.
///
/// Responses are popped from a FIFO queue. When the queue is empty,
/// a default "mock response" text is returned.
pub struct MockCompletionProvider {
    name: String,
    responses: Mutex<VecDeque<Result<String, String>>>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl MockCompletionProvider {
    /// Create a new mock provider with an empty response queue.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            responses: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Create a mock provider pre-loaded with the given responses.
    pub fn with_responses(name: &str, responses: Vec<String>) -> Self {
        Self {
            name: name.to_string(),
            responses: Mutex::new(responses.into_iter().map(Ok).collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Queue a failed completion.
    pub async fn add_failure(&self, message: &str) {
        self.responses
            .lock()
            .await
            .push_back(Err(message.to_string()));
    }

    /// Every request received so far.
    pub async fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().await.clone()
    }
}

#[async_trait]
impl CompletionProvider for MockCompletionProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionResponse, DanmakuError> {
        self.requests.lock().await.push(request.clone());
        let next = self
            .responses
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| Ok("mock response".to_string()));
        match next {
            Ok(content) => Ok(CompletionResponse {
                model: request.model,
                content,
            }),
            Err(message) => Err(DanmakuError::provider(message)),
        }
    }
}

/// A catalog serving one fixed provider selection.
pub struct MockCatalog {
    active_provider: Option<String>,
    active_model: Option<String>,
    provider: Option<Arc<dyn CompletionProvider>>,
}

impl MockCatalog {
    /// A catalog whose active selection is `provider` running `model`.
    pub fn new(provider: Arc<dyn CompletionProvider>, model: &str) -> Self {
        Self {
            active_provider: Some(provider.name().to_string()),
            active_model: Some(model.to_string()),
            provider: Some(provider),
        }
    }

    /// A catalog with nothing selected.
    pub fn empty() -> Self {
        Self {
            active_provider: None,
            active_model: None,
            provider: None,
        }
    }
}

#[async_trait]
impl ProviderCatalog for MockCatalog {
    fn active_provider(&self) -> Option<String> {
        self.active_provider.clone()
    }

    fn active_model(&self) -> Option<String> {
        self.active_model.clone()
    }

    fn provider_config(&self, name: &str) -> Option<ProviderConfig> {
        self.provider
            .as_ref()
            .filter(|p| p.name() == name)
            .map(|p| ProviderConfig {
                name: p.name().to_string(),
                base_url: "http://mock.invalid/v1".to_string(),
                api_key: None,
            })
    }

    async fn provider_instance(
        &self,
        name: &str,
    ) -> Result<Arc<dyn CompletionProvider>, DanmakuError> {
        self.provider
            .as_ref()
            .filter(|p| p.name() == name)
            .cloned()
            .ok_or_else(|| DanmakuError::provider(format!("unknown provider `{name}`")))
    }
}
