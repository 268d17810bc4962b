//! Gateway -> client events.

use serde::{Deserialize, Serialize};

use crate::error::{Result, RoomcastError};
use crate::protocol::envelope::MessageEnvelope;

/// One outbound frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum OutboundEvent {
    UserOnline(PresenceChange),
    UserOffline(PresenceChange),
    ReceiveMessage(MessageEnvelope),
    UserTyping(TypingIndicator),
}

impl OutboundEvent {
    pub fn name(&self) -> &'static str {
        match self {
            OutboundEvent::UserOnline(_) => "userOnline",
            OutboundEvent::UserOffline(_) => "userOffline",
            OutboundEvent::ReceiveMessage(_) => "receiveMessage",
            OutboundEvent::UserTyping(_) => "userTyping",
        }
    }
}

/// Serialize once; the result is shared across every recipient of a fan-out.
pub fn encode_outbound(ev: &OutboundEvent) -> Result<String> {
    serde_json::to_string(ev)
        .map_err(|e| RoomcastError::Internal(format!("json encode failed: {e}")))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresenceChange {
    pub user_identity: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypingIndicator {
    pub user_identity: String,
    pub room_id: String,
    pub is_typing: bool,
}
