//! Client -> gateway events.
//!
//! Field names are camelCase. The legacy socket client spelled some fields
//! differently (`senderId`, `courseId`, `message`, ...) and sent `join` /
//! `joinCourseRoom` payloads as bare strings; both shapes decode to the same
//! types.

use serde::Deserialize;

use crate::error::{Result, RoomcastError};

/// One decoded inbound frame.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum InboundEvent {
    Join(Join),
    SendMessage(SendMessage),
    JoinCourseRoom(RoomRef),
    LeaveCourseRoom(RoomRef),
    Typing(Typing),
}

impl InboundEvent {
    /// Wire name, used for logging and metric labels.
    pub fn name(&self) -> &'static str {
        match self {
            InboundEvent::Join(_) => "join",
            InboundEvent::SendMessage(_) => "sendMessage",
            InboundEvent::JoinCourseRoom(_) => "joinCourseRoom",
            InboundEvent::LeaveCourseRoom(_) => "leaveCourseRoom",
            InboundEvent::Typing(_) => "typing",
        }
    }
}

/// Decode one text frame into an inbound event.
pub fn decode_inbound(text: &str) -> Result<InboundEvent> {
    serde_json::from_str(text)
        .map_err(|e| RoomcastError::BadRequest(format!("invalid event: {e}")))
}

/// `join` payload: the identity the client claims.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "JoinWire")]
pub struct Join {
    pub user_identity: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum JoinWire {
    Bare(String),
    Object {
        #[serde(rename = "userIdentity", alias = "userId")]
        user_identity: String,
    },
}

impl TryFrom<JoinWire> for Join {
    type Error = String;

    fn try_from(w: JoinWire) -> std::result::Result<Self, Self::Error> {
        let user_identity = match w {
            JoinWire::Bare(s) => s,
            JoinWire::Object { user_identity } => user_identity,
        };
        if user_identity.is_empty() {
            return Err("userIdentity must not be empty".into());
        }
        Ok(Self { user_identity })
    }
}

/// `joinCourseRoom` / `leaveCourseRoom` payload.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RoomWire")]
pub struct RoomRef {
    pub room_id: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RoomWire {
    Bare(String),
    Object {
        #[serde(rename = "roomId", alias = "courseId")]
        room_id: String,
    },
}

impl TryFrom<RoomWire> for RoomRef {
    type Error = String;

    fn try_from(w: RoomWire) -> std::result::Result<Self, Self::Error> {
        let room_id = match w {
            RoomWire::Bare(s) => s,
            RoomWire::Object { room_id } => room_id,
        };
        if room_id.is_empty() {
            return Err("roomId must not be empty".into());
        }
        Ok(Self { room_id })
    }
}

/// `sendMessage` payload: envelope fields minus `messageId` / `timestamp`.
///
/// `senderIdentity` is accepted for compatibility but the gateway stamps the
/// sender from the connection's bound identity.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessage {
    #[serde(default, alias = "senderId")]
    pub sender_identity: Option<String>,
    #[serde(default, alias = "recipientId")]
    pub recipient_identity: Option<String>,
    #[serde(default, alias = "courseId")]
    pub room_id: Option<String>,
    #[serde(alias = "message")]
    pub body: String,
    #[serde(default = "default_kind", alias = "type")]
    pub kind: String,
}

fn default_kind() -> String {
    "text".into()
}

/// `typing` payload.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Typing {
    #[serde(default, alias = "userId")]
    pub user_identity: Option<String>,
    #[serde(alias = "courseId")]
    pub room_id: String,
    pub is_typing: bool,
}
