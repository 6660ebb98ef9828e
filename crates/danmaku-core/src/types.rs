// SPDX-FileCopyrightText: 2026 Danmaku Bridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain types shared by the relay client, the agent, and the chat pipeline.

use std::fmt;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

/// Default base URL of the local relay service.
pub const DEFAULT_RELAY_BASE_URL: &str = "http://localhost:12346/";

// --- Relay events ---

/// Identifier of the user who produced an event.
///
/// Usually numeric; the open-platform relay reports an opaque `open_id`
/// string for chat messages instead.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SenderId {
    Numeric(i64),
    Text(String),
}

impl Default for SenderId {
    fn default() -> Self {
        Self::Numeric(0)
    }
}

impl fmt::Display for SenderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Numeric(id) => write!(f, "{id}"),
            Self::Text(id) => f.write_str(id),
        }
    }
}

/// Event tags the relay is known to emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum KnownTag {
    Danmaku,
    Gift,
    Guard,
    Superchat,
    Like,
}

/// Tag-specific payload of a relay event.
#[derive(Debug, Clone, PartialEq)]
pub enum EventKind {
    /// Plain chat text.
    Danmaku { text: Option<String> },
    /// A gift was sent.
    Gift {
        gift_name: Option<String>,
        gift_num: Option<u32>,
        price: Option<f64>,
        paid: Option<bool>,
    },
    /// A membership ("大航海") tier was purchased.
    Guard {
        guard_name: Option<String>,
        guard_level: Option<u32>,
        price: Option<f64>,
    },
    /// A paid, highlighted message.
    SuperChat {
        message: Option<String>,
        rmb: Option<f64>,
    },
    /// A like reaction.
    Like,
    /// Any tag this crate does not know about.
    Other {
        tag: String,
        message: Option<String>,
        msg: Option<String>,
    },
}

impl EventKind {
    /// The wire tag of this event (`danmaku`, `gift`, ..., or the raw unknown tag).
    pub fn tag(&self) -> &str {
        match self {
            Self::Danmaku { .. } => KnownTag::Danmaku.as_ref(),
            Self::Gift { .. } => KnownTag::Gift.as_ref(),
            Self::Guard { .. } => KnownTag::Guard.as_ref(),
            Self::SuperChat { .. } => KnownTag::Superchat.as_ref(),
            Self::Like => KnownTag::Like.as_ref(),
            Self::Other { tag, .. } => tag,
        }
    }
}

/// A single event fetched from the relay. Immutable once received.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawEvent", into = "RawEvent")]
pub struct DanmakuEvent {
    pub uname: String,
    pub uid: SenderId,
    pub room_id: i64,
    pub timestamp: i64,
    pub kind: EventKind,
}

/// Flat wire shape of a relay event: a `type` tag plus every optional field.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct RawEvent {
    #[serde(rename = "type")]
    tag: String,
    #[serde(default)]
    uname: String,
    #[serde(default)]
    uid: SenderId,
    #[serde(default)]
    room_id: i64,
    #[serde(default)]
    timestamp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    msg: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    gift_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    gift_num: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    guard_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    guard_level: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    paid: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    rmb: Option<f64>,
}

impl From<RawEvent> for DanmakuEvent {
    fn from(raw: RawEvent) -> Self {
        let kind = match raw.tag.parse::<KnownTag>() {
            Ok(KnownTag::Danmaku) => EventKind::Danmaku { text: raw.msg },
            Ok(KnownTag::Gift) => EventKind::Gift {
                gift_name: raw.gift_name,
                gift_num: raw.gift_num,
                price: raw.price,
                paid: raw.paid,
            },
            Ok(KnownTag::Guard) => EventKind::Guard {
                guard_name: raw.guard_name,
                guard_level: raw.guard_level,
                price: raw.price,
            },
            Ok(KnownTag::Superchat) => EventKind::SuperChat {
                message: raw.message,
                rmb: raw.rmb,
            },
            Ok(KnownTag::Like) => EventKind::Like,
            Err(_) => EventKind::Other {
                tag: raw.tag,
                message: raw.message,
                msg: raw.msg,
            },
        };

        Self {
            uname: raw.uname,
            uid: raw.uid,
            room_id: raw.room_id,
            timestamp: raw.timestamp,
            kind,
        }
    }
}

impl From<DanmakuEvent> for RawEvent {
    fn from(event: DanmakuEvent) -> Self {
        let mut raw = RawEvent {
            tag: event.kind.tag().to_string(),
            uname: event.uname,
            uid: event.uid,
            room_id: event.room_id,
            timestamp: event.timestamp,
            ..RawEvent::default()
        };
        match event.kind {
            EventKind::Danmaku { text } => raw.msg = text,
            EventKind::Gift {
                gift_name,
                gift_num,
                price,
                paid,
            } => {
                raw.gift_name = gift_name;
                raw.gift_num = gift_num;
                raw.price = price;
                raw.paid = paid;
            }
            EventKind::Guard {
                guard_name,
                guard_level,
                price,
            } => {
                raw.guard_name = guard_name;
                raw.guard_level = guard_level;
                raw.price = price;
            }
            EventKind::SuperChat { message, rmb } => {
                raw.message = message;
                raw.rmb = rmb;
            }
            EventKind::Like => {}
            EventKind::Other { message, msg, .. } => {
                raw.message = message;
                raw.msg = msg;
            }
        }
        raw
    }
}

/// Relay service state as reported by `GET status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceStatus {
    pub running: bool,
    pub message_count: u64,
}

// --- Relay settings ---

/// The persisted, user-editable connection record for the relay.
///
/// Read by every outbound request. The secret is stored as plain text in
/// the record but never printed by `Debug`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelaySettings {
    #[serde(rename = "baseUrl")]
    pub base_url: String,
    #[serde(rename = "ACCESS_KEY_ID", default)]
    pub access_key_id: String,
    #[serde(rename = "ACCESS_KEY_SECRET", default)]
    pub access_key_secret: String,
    #[serde(rename = "APP_ID", default)]
    pub app_id: String,
    #[serde(rename = "ROOM_OWNER_AUTH_CODE", default)]
    pub room_owner_auth_code: String,
}

impl Default for RelaySettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_RELAY_BASE_URL.to_string(),
            access_key_id: String::new(),
            access_key_secret: String::new(),
            app_id: String::new(),
            room_owner_auth_code: String::new(),
        }
    }
}

impl fmt::Debug for RelaySettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RelaySettings")
            .field("base_url", &self.base_url)
            .field("access_key_id", &self.access_key_id)
            .field("access_key_secret", &"[REDACTED]")
            .field("app_id", &self.app_id)
            .field("room_owner_auth_code", &"[REDACTED]")
            .finish()
    }
}

impl RelaySettings {
    /// Builds the credential set posted to the relay's `configure` endpoint.
    pub fn credentials(&self) -> RelayCredentials {
        RelayCredentials {
            access_key_id: self.access_key_id.clone(),
            access_key_secret: SecretString::from(self.access_key_secret.clone()),
            app_id: self.app_id.clone(),
            room_owner_auth_code: SecretString::from(self.room_owner_auth_code.clone()),
        }
    }
}

/// Credentials for the relay's open-platform connection.
#[derive(Debug)]
pub struct RelayCredentials {
    pub access_key_id: String,
    pub access_key_secret: SecretString,
    pub app_id: String,
    pub room_owner_auth_code: SecretString,
}

impl RelayCredentials {
    /// The JSON body expected by `POST configure`.
    pub fn to_payload(&self) -> serde_json::Value {
        serde_json::json!({
            "ACCESS_KEY_ID": self.access_key_id,
            "ACCESS_KEY_SECRET": self.access_key_secret.expose_secret(),
            "APP_ID": self.app_id,
            "ROOM_OWNER_AUTH_CODE": self.room_owner_auth_code.expose_secret(),
        })
    }
}

// --- Chat pipeline ---

/// Role of a message in the chat transcript.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
    Error,
}

/// Metadata attached to a message that arrived from outside the local chat input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalMessageMeta {
    /// Marker distinguishing relay messages from locally typed chat.
    pub source: String,
    pub uid: SenderId,
    pub uname: String,
    pub room_id: i64,
    pub timestamp: i64,
    #[serde(rename = "type")]
    pub event_type: String,
}

/// One entry in the chat transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ExternalMessageMeta>,
}

impl ChatMessage {
    pub fn new(role: ChatRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            metadata: None,
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(ChatRole::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(ChatRole::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(ChatRole::Assistant, content)
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self::new(ChatRole::Error, content)
    }

    /// Attaches external-message metadata.
    pub fn with_metadata(mut self, metadata: ExternalMessageMeta) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

// --- Completion providers ---

/// Connection settings for one completion provider.
#[derive(Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    pub name: String,
    pub base_url: String,
    pub api_key: Option<String>,
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("name", &self.name)
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// A completion request sent to a provider.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
}

/// The provider's reply.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionResponse {
    pub model: String,
    pub content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(value: serde_json::Value) -> DanmakuEvent {
        serde_json::from_value(value).expect("event should decode")
    }

    #[test]
    fn decodes_chat_text() {
        let event = decode(serde_json::json!({
            "type": "danmaku",
            "uname": "alice",
            "msg": "hi",
            "uid": 42,
            "room_id": 1000,
            "timestamp": 5,
        }));
        assert_eq!(event.uname, "alice");
        assert_eq!(event.uid, SenderId::Numeric(42));
        assert_eq!(event.room_id, 1000);
        assert_eq!(event.timestamp, 5);
        assert_eq!(
            event.kind,
            EventKind::Danmaku {
                text: Some("hi".into())
            }
        );
        assert_eq!(event.kind.tag(), "danmaku");
    }

    #[test]
    fn decodes_string_sender_id() {
        let event = decode(serde_json::json!({
            "type": "danmaku",
            "uname": "bob",
            "msg": "yo",
            "uid": "open-id-abc",
            "room_id": 1,
            "timestamp": 9,
        }));
        assert_eq!(event.uid, SenderId::Text("open-id-abc".into()));
        assert_eq!(event.uid.to_string(), "open-id-abc");
    }

    #[test]
    fn decodes_gift_with_extra_fields() {
        let event = decode(serde_json::json!({
            "type": "gift",
            "uname": "carol",
            "uid": 7,
            "room_id": 1,
            "gift_name": "Rocket",
            "gift_num": 5,
            "price": 1000,
            "paid": true,
            "timestamp": 10,
        }));
        assert_eq!(
            event.kind,
            EventKind::Gift {
                gift_name: Some("Rocket".into()),
                gift_num: Some(5),
                price: Some(1000.0),
                paid: Some(true),
            }
        );
    }

    #[test]
    fn unknown_tag_becomes_other() {
        let event = decode(serde_json::json!({
            "type": "enter_room",
            "uname": "dave",
            "uid": 1,
            "room_id": 1,
            "timestamp": 1,
        }));
        assert_eq!(
            event.kind,
            EventKind::Other {
                tag: "enter_room".into(),
                message: None,
                msg: None,
            }
        );
        assert_eq!(event.kind.tag(), "enter_room");
    }

    #[test]
    fn encoded_event_keeps_wire_shape() {
        let event = decode(serde_json::json!({
            "type": "guard",
            "uname": "erin",
            "uid": 3,
            "room_id": 2,
            "guard_name": "舰长",
            "guard_level": 3,
            "timestamp": 4,
        }));
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["type"], "guard");
        assert_eq!(value["guard_name"], "舰长");
        assert!(value.get("msg").is_none());
    }

    #[test]
    fn relay_settings_persist_with_original_keys() {
        let settings = RelaySettings {
            access_key_id: "id".into(),
            access_key_secret: "secret".into(),
            app_id: "123".into(),
            room_owner_auth_code: "code".into(),
            ..RelaySettings::default()
        };
        let value = serde_json::to_value(&settings).unwrap();
        assert_eq!(value["baseUrl"], DEFAULT_RELAY_BASE_URL);
        assert_eq!(value["ACCESS_KEY_SECRET"], "secret");
        let back: RelaySettings = serde_json::from_value(value).unwrap();
        assert_eq!(back, settings);
    }

    #[test]
    fn relay_settings_debug_redacts_secrets() {
        let settings = RelaySettings {
            access_key_secret: "top-secret".into(),
            room_owner_auth_code: "auth-code".into(),
            ..RelaySettings::default()
        };
        let debug = format!("{settings:?}");
        assert!(!debug.contains("top-secret"));
        assert!(!debug.contains("auth-code"));
    }

    #[test]
    fn credentials_payload_uses_relay_field_names() {
        let settings = RelaySettings {
            access_key_id: "id".into(),
            access_key_secret: "secret".into(),
            app_id: "123".into(),
            room_owner_auth_code: "code".into(),
            ..RelaySettings::default()
        };
        let payload = settings.credentials().to_payload();
        assert_eq!(
            payload,
            serde_json::json!({
                "ACCESS_KEY_ID": "id",
                "ACCESS_KEY_SECRET": "secret",
                "APP_ID": "123",
                "ROOM_OWNER_AUTH_CODE": "code",
            })
        );
    }

    #[test]
    fn chat_role_serializes_lowercase() {
        let msg = ChatMessage::error("boom");
        let value = serde_json::to_value(&msg).unwrap();
        assert_eq!(value["role"], "error");
        assert_eq!(ChatRole::Assistant.to_string(), "assistant");
    }
}
