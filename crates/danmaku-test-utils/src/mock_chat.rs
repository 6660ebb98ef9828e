// SPDX-FileCopyrightText: 2026 Danmaku Bridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock chat pipeline for deterministic testing.
//!
//! `MockChatPipeline` implements `ChatPipeline`, keeping a transcript plus a
//! log of `send` calls so tests can assert what was dispatched and in which
//! order.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use danmaku_core::{ChatMessage, ChatPipeline, DanmakuError, ExternalMessageMeta, SendOptions};

/// One captured `send` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentRequest {
    pub text: String,
    pub provider: String,
    pub model: String,
}

/// A chat pipeline that records everything it is given.
pub struct MockChatPipeline {
    transcript: Mutex<Vec<ChatMessage>>,
    sent: Mutex<Vec<SentRequest>>,
    fail_external: AtomicBool,
    fail_send: AtomicBool,
}

impl MockChatPipeline {
    /// Create a pipeline with an empty transcript that accepts everything.
    pub fn new() -> Self {
        Self {
            transcript: Mutex::new(Vec::new()),
            sent: Mutex::new(Vec::new()),
            fail_external: AtomicBool::new(false),
            fail_send: AtomicBool::new(false),
        }
    }

    /// Make `handle_external_message` fail.
    pub fn fail_external(&self, fail: bool) {
        self.fail_external.store(fail, Ordering::SeqCst);
    }

    /// Make `send` fail.
    pub fn fail_send(&self, fail: bool) {
        self.fail_send.store(fail, Ordering::SeqCst);
    }

    /// All captured `send` calls.
    pub async fn sent(&self) -> Vec<SentRequest> {
        self.sent.lock().await.clone()
    }

    /// Contents of the user messages that arrived via `handle_external_message`.
    pub async fn external_texts(&self) -> Vec<String> {
        self.transcript
            .lock()
            .await
            .iter()
            .filter(|m| m.metadata.is_some())
            .map(|m| m.content.clone())
            .collect()
    }
}

impl Default for MockChatPipeline {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChatPipeline for MockChatPipeline {
    async fn handle_external_message(
        &self,
        text: &str,
        metadata: ExternalMessageMeta,
    ) -> Result<(), DanmakuError> {
        if self.fail_external.load(Ordering::SeqCst) {
            return Err(DanmakuError::Chat {
                message: "transcript unavailable".to_string(),
            });
        }
        self.transcript
            .lock()
            .await
            .push(ChatMessage::user(text).with_metadata(metadata));
        Ok(())
    }

    async fn send(&self, text: &str, options: SendOptions) -> Result<(), DanmakuError> {
        if self.fail_send.load(Ordering::SeqCst) {
            return Err(DanmakuError::provider("mock provider unavailable"));
        }
        self.sent.lock().await.push(SentRequest {
            text: text.to_string(),
            provider: options.provider.name().to_string(),
            model: options.model,
        });
        Ok(())
    }

    async fn push_message(&self, message: ChatMessage) {
        self.transcript.lock().await.push(message);
    }

    async fn messages(&self) -> Vec<ChatMessage> {
        self.transcript.lock().await.clone()
    }
}
