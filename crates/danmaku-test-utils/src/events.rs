// SPDX-FileCopyrightText: 2026 Danmaku Bridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Builders for relay events.

use danmaku_core::{DanmakuEvent, EventKind, SenderId};

/// Room id used by every builder.
pub const TEST_ROOM_ID: i64 = 21_452_505;

fn event(timestamp: i64, uname: &str, kind: EventKind) -> DanmakuEvent {
    DanmakuEvent {
        uname: uname.to_string(),
        uid: SenderId::Numeric(1000 + timestamp),
        room_id: TEST_ROOM_ID,
        timestamp,
        kind,
    }
}

/// A chat-text event.
pub fn danmaku(timestamp: i64, uname: &str, text: &str) -> DanmakuEvent {
    event(
        timestamp,
        uname,
        EventKind::Danmaku {
            text: Some(text.to_string()),
        },
    )
}

/// A gift event.
pub fn gift(timestamp: i64, uname: &str, gift_name: &str, gift_num: u32) -> DanmakuEvent {
    event(
        timestamp,
        uname,
        EventKind::Gift {
            gift_name: Some(gift_name.to_string()),
            gift_num: Some(gift_num),
            price: None,
            paid: None,
        },
    )
}

/// A membership purchase event.
pub fn guard(timestamp: i64, uname: &str, guard_name: &str) -> DanmakuEvent {
    event(
        timestamp,
        uname,
        EventKind::Guard {
            guard_name: Some(guard_name.to_string()),
            guard_level: None,
            price: None,
        },
    )
}

/// A like event.
pub fn like(timestamp: i64, uname: &str) -> DanmakuEvent {
    event(timestamp, uname, EventKind::Like)
}

/// An event with a tag the bridge does not know.
pub fn other(timestamp: i64, uname: &str, tag: &str, message: Option<&str>) -> DanmakuEvent {
    event(
        timestamp,
        uname,
        EventKind::Other {
            tag: tag.to_string(),
            message: message.map(str::to_string),
            msg: None,
        },
    )
}
