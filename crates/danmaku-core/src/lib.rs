// SPDX-FileCopyrightText: 2026 Danmaku Bridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the danmaku bridge.
//!
//! This crate provides the error type, the relay event model, and the trait
//! seams (event source, state store, chat pipeline, completion providers)
//! that the rest of the workspace is built against.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::DanmakuError;
pub use types::{
    ChatMessage, ChatRole, DanmakuEvent, EventKind, ExternalMessageMeta, RelayCredentials,
    RelaySettings, SenderId, ServiceStatus,
};

pub use traits::{
    ChatPipeline, CompletionProvider, EventSource, ProviderCatalog, SendOptions, StateStore,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn danmaku_error_has_all_variants() {
        let _config = DanmakuError::Config("test".into());
        let _storage = DanmakuError::Storage {
            source: Box::new(std::io::Error::other("test")),
        };
        let _relay = DanmakuError::Relay {
            message: "test".into(),
            source: None,
        };
        let _provider = DanmakuError::Provider {
            message: "test".into(),
            source: None,
        };
        let _chat = DanmakuError::Chat {
            message: "test".into(),
        };
        let _internal = DanmakuError::Internal("test".into());
    }

    #[test]
    fn known_tags_round_trip() {
        use std::str::FromStr;
        use types::KnownTag;

        for tag in [
            KnownTag::Danmaku,
            KnownTag::Gift,
            KnownTag::Guard,
            KnownTag::Superchat,
            KnownTag::Like,
        ] {
            let parsed = KnownTag::from_str(&tag.to_string()).expect("should parse back");
            assert_eq!(tag, parsed);
        }
        assert!(KnownTag::from_str("enter_room").is_err());
    }

    #[test]
    fn all_traits_are_exported() {
        // Compile-time check that every seam is reachable from the crate root.
        fn _assert_event_source<T: EventSource>() {}
        fn _assert_state_store<T: StateStore>() {}
        fn _assert_chat_pipeline<T: ChatPipeline>() {}
        fn _assert_completion_provider<T: CompletionProvider>() {}
        fn _assert_provider_catalog<T: ProviderCatalog>() {}
    }
}
