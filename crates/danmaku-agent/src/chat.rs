// SPDX-FileCopyrightText: 2026 Danmaku Bridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory chat transcript that relay messages are appended to.

use async_trait::async_trait;
use danmaku_core::types::CompletionRequest;
use danmaku_core::{
    ChatMessage, ChatPipeline, ChatRole, DanmakuError, ExternalMessageMeta, SendOptions,
};
use tokio::sync::Mutex;
use tracing::{debug, info};

/// Retained transcript entries per turn of request history.
const RETAINED_PER_TURN: usize = 4;

/// Floor on retained transcript entries, system prompt excluded.
const MIN_RETAINED_MESSAGES: usize = 32;

/// Ordered transcript plus the request-building rules for AI replies.
///
/// Only the newest entries are kept; the system prompt always stays first.
pub struct ChatStore {
    system_prompt: Option<String>,
    max_history: usize,
    retain_limit: usize,
    messages: Mutex<Vec<ChatMessage>>,
}

impl ChatStore {
    /// Create a transcript, seeded with the system prompt when one is given.
    pub fn new(system_prompt: Option<String>, max_history: usize) -> Self {
        let system_prompt = system_prompt.filter(|p| !p.trim().is_empty());
        let messages = system_prompt
            .iter()
            .map(|prompt| ChatMessage::system(prompt.clone()))
            .collect();
        let max_history = max_history.max(1);
        Self {
            system_prompt,
            max_history,
            retain_limit: max_history
                .saturating_mul(RETAINED_PER_TURN)
                .max(MIN_RETAINED_MESSAGES),
            messages: Mutex::new(messages),
        }
    }

    /// Appends and drops the oldest entries past the retention limit.
    fn append(&self, messages: &mut Vec<ChatMessage>, message: ChatMessage) {
        messages.push(message);
        let offset = usize::from(self.system_prompt.is_some());
        let excess = messages.len().saturating_sub(offset + self.retain_limit);
        if excess > 0 {
            messages.drain(offset..offset + excess);
        }
    }

    /// Builds the provider context: system prompt, then the most recent
    /// user/assistant turns. Error entries are local annotations and are skipped.
    fn context(&self, transcript: &[ChatMessage]) -> Vec<ChatMessage> {
        let turns: Vec<&ChatMessage> = transcript
            .iter()
            .filter(|m| matches!(m.role, ChatRole::User | ChatRole::Assistant))
            .collect();
        let start = turns.len().saturating_sub(self.max_history);

        self.system_prompt
            .iter()
            .map(|prompt| ChatMessage::system(prompt.clone()))
            .chain(turns[start..].iter().map(|m| ChatMessage::new(m.role, m.content.clone())))
            .collect()
    }
}

#[async_trait]
impl ChatPipeline for ChatStore {
    async fn handle_external_message(
        &self,
        text: &str,
        metadata: ExternalMessageMeta,
    ) -> Result<(), DanmakuError> {
        debug!(
            source = metadata.source.as_str(),
            event_type = metadata.event_type.as_str(),
            "external message appended"
        );
        let mut messages = self.messages.lock().await;
        self.append(&mut messages, ChatMessage::user(text).with_metadata(metadata));
        Ok(())
    }

    async fn send(&self, text: &str, options: SendOptions) -> Result<(), DanmakuError> {
        let request = {
            let mut messages = self.messages.lock().await;
            // Overlapping cycles can append later events after the tagged entry.
            let already_present = messages.last().is_some_and(|m| is_user_text(m, text))
                || messages
                    .iter()
                    .rev()
                    .any(|m| m.metadata.is_some() && is_user_text(m, text));
            if !already_present {
                self.append(&mut messages, ChatMessage::user(text));
            }
            CompletionRequest {
                model: options.model.clone(),
                messages: self.context(&messages),
            }
        };

        let response = options.provider.complete(request).await?;
        info!(
            provider = options.provider.name(),
            model = response.model.as_str(),
            reply = response.content.as_str(),
            "assistant replied"
        );
        let mut messages = self.messages.lock().await;
        self.append(&mut messages, ChatMessage::assistant(response.content));
        Ok(())
    }

    async fn push_message(&self, message: ChatMessage) {
        let mut messages = self.messages.lock().await;
        self.append(&mut messages, message);
    }

    async fn messages(&self) -> Vec<ChatMessage> {
        self.messages.lock().await.clone()
    }
}

fn is_user_text(message: &ChatMessage, text: &str) -> bool {
    message.role == ChatRole::User && message.content == text
}
