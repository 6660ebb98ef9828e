// SPDX-FileCopyrightText: 2026 Danmaku Bridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Delivers admitted events into the chat pipeline and requests an AI reply.

use std::sync::Arc;

use danmaku_core::{
    ChatMessage, ChatPipeline, DanmakuError, DanmakuEvent, ExternalMessageMeta, ProviderCatalog,
    SendOptions,
};
use tracing::{debug, warn};

/// Default prefix marking relay messages in the transcript.
pub const DEFAULT_MESSAGE_PREFIX: &str = "[B站弹幕]";

/// Default `source` marker in message metadata.
pub const DEFAULT_SOURCE_TAG: &str = "bilibili_danmaku";

/// Prefix of the transcript entry written when the AI reply cannot be requested.
pub const AI_TRIGGER_ERROR_PREFIX: &str = "处理弹幕消息时出错";

/// Builds transcript messages from events and hands them to the chat pipeline.
pub struct Dispatcher {
    chat: Arc<dyn ChatPipeline>,
    catalog: Arc<dyn ProviderCatalog>,
    message_prefix: String,
    source_tag: String,
}

impl Dispatcher {
    /// Create a dispatcher with the default prefix and source marker.
    pub fn new(chat: Arc<dyn ChatPipeline>, catalog: Arc<dyn ProviderCatalog>) -> Self {
        Self {
            chat,
            catalog,
            message_prefix: DEFAULT_MESSAGE_PREFIX.to_string(),
            source_tag: DEFAULT_SOURCE_TAG.to_string(),
        }
    }

    /// Overrides the transcript prefix.
    pub fn with_message_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.message_prefix = prefix.into();
        self
    }

    /// Overrides the metadata `source` marker.
    pub fn with_source_tag(mut self, source_tag: impl Into<String>) -> Self {
        self.source_tag = source_tag.into();
        self
    }

    /// `<prefix> <uname>: <content>`
    pub fn format_user_message(&self, uname: &str, content: &str) -> String {
        format!("{} {uname}: {content}", self.message_prefix)
    }

    /// Appends the event to the transcript, then requests an AI reply.
    ///
    /// Returns an error only when the transcript rejects the message; a failed
    /// AI request is recorded in the transcript instead.
    pub async fn dispatch(&self, event: &DanmakuEvent, content: &str) -> Result<(), DanmakuError> {
        let text = self.format_user_message(&event.uname, content);
        let metadata = ExternalMessageMeta {
            source: self.source_tag.clone(),
            uid: event.uid.clone(),
            uname: event.uname.clone(),
            room_id: event.room_id,
            timestamp: event.timestamp,
            event_type: event.kind.tag().to_string(),
        };

        self.chat.handle_external_message(&text, metadata).await?;
        debug!(timestamp = event.timestamp, "event appended to transcript");

        self.trigger_ai_response(&text).await;
        Ok(())
    }

    /// Requests an AI reply to `text`, writing an error-role message to the
    /// transcript if that is not possible.
    pub async fn trigger_ai_response(&self, text: &str) {
        if let Err(e) = self.request_reply(text).await {
            warn!(error = %e, "failed to trigger AI response for danmaku");
            crate::metrics::record_ai_trigger_failure();
            self.chat
                .push_message(ChatMessage::error(format!(
                    "{AI_TRIGGER_ERROR_PREFIX}: {}",
                    e.detail()
                )))
                .await;
        }
    }

    async fn request_reply(&self, text: &str) -> Result<(), DanmakuError> {
        let provider_name = self
            .catalog
            .active_provider()
            .ok_or_else(|| DanmakuError::provider("no active provider selected"))?;
        let model = self
            .catalog
            .active_model()
            .ok_or_else(|| DanmakuError::provider("no active model selected"))?;
        let provider_config = self.catalog.provider_config(&provider_name);
        let provider = self.catalog.provider_instance(&provider_name).await?;

        self.chat
            .send(
                text,
                SendOptions {
                    provider,
                    model,
                    provider_config,
                },
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use danmaku_core::{ChatRole, SenderId};
    use danmaku_test_utils::{MockCatalog, MockChatPipeline, MockCompletionProvider, events};
    use tracing_test::traced_test;

    fn dispatcher(chat: Arc<MockChatPipeline>, catalog: MockCatalog) -> Dispatcher {
        Dispatcher::new(chat, Arc::new(catalog))
    }

    fn catalog() -> MockCatalog {
        MockCatalog::new(Arc::new(MockCompletionProvider::new("openai")), "gpt-4o-mini")
    }

    #[tokio::test]
    async fn dispatch_appends_and_triggers_reply() {
        let chat = Arc::new(MockChatPipeline::new());
        let dispatcher = dispatcher(chat.clone(), catalog());

        dispatcher
            .dispatch(&events::danmaku(5, "Alice", "hi"), "hi")
            .await
            .unwrap();

        let transcript = chat.messages().await;
        assert_eq!(transcript.len(), 1);
        assert_eq!(transcript[0].content, "[B站弹幕] Alice: hi");
        let meta = transcript[0].metadata.as_ref().unwrap();
        assert_eq!(meta.source, "bilibili_danmaku");
        assert_eq!(meta.uname, "Alice");
        assert_eq!(meta.uid, SenderId::Numeric(1005));
        assert_eq!(meta.timestamp, 5);
        assert_eq!(meta.event_type, "danmaku");

        let sent = chat.sent().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].text, "[B站弹幕] Alice: hi");
        assert_eq!(sent[0].provider, "openai");
        assert_eq!(sent[0].model, "gpt-4o-mini");
    }

    #[tokio::test]
    async fn custom_prefix_and_source_tag() {
        let chat = Arc::new(MockChatPipeline::new());
        let dispatcher = dispatcher(chat.clone(), catalog())
            .with_message_prefix("[弹幕]")
            .with_source_tag("stage");

        dispatcher
            .dispatch(&events::like(1, "Bob"), "点赞")
            .await
            .unwrap();

        let transcript = chat.messages().await;
        assert_eq!(transcript[0].content, "[弹幕] Bob: 点赞");
        assert_eq!(transcript[0].metadata.as_ref().unwrap().source, "stage");
        assert_eq!(transcript[0].metadata.as_ref().unwrap().event_type, "like");
    }

    #[tokio::test]
    #[traced_test]
    async fn send_failure_pushes_one_error_message() {
        let chat = Arc::new(MockChatPipeline::new());
        chat.fail_send(true);
        let dispatcher = dispatcher(chat.clone(), catalog());

        let result = dispatcher.dispatch(&events::danmaku(1, "A", "x"), "x").await;
        assert!(result.is_ok());

        let errors: Vec<ChatMessage> = chat
            .messages()
            .await
            .into_iter()
            .filter(|m| m.role == ChatRole::Error)
            .collect();
        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors[0].content,
            "处理弹幕消息时出错: mock provider unavailable"
        );
        assert!(logs_contain("failed to trigger AI response for danmaku"));
    }

    #[tokio::test]
    async fn missing_provider_selection_is_reported_in_transcript() {
        let chat = Arc::new(MockChatPipeline::new());
        let dispatcher = dispatcher(chat.clone(), MockCatalog::empty());

        dispatcher
            .dispatch(&events::danmaku(1, "A", "x"), "x")
            .await
            .unwrap();

        let last = chat.messages().await.pop().unwrap();
        assert_eq!(last.role, ChatRole::Error);
        assert_eq!(last.content, "处理弹幕消息时出错: no active provider selected");
        assert!(chat.sent().await.is_empty());
    }

    #[tokio::test]
    async fn transcript_failure_propagates_without_reply() {
        let chat = Arc::new(MockChatPipeline::new());
        chat.fail_external(true);
        let dispatcher = dispatcher(chat.clone(), catalog());

        let err = dispatcher
            .dispatch(&events::danmaku(1, "A", "x"), "x")
            .await
            .unwrap_err();
        assert!(matches!(err, DanmakuError::Chat { .. }));
        assert!(chat.sent().await.is_empty());
        assert!(chat.messages().await.is_empty());
    }
}
