//! Message envelope: the unit routed between connections.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ulid::Ulid;

use crate::protocol::inbound::SendMessage;

/// Routing mode derived from an envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target<'a> {
    /// Deliver to one identity (plus sender echo).
    Direct(&'a str),
    /// Deliver to every member of a room (plus sender echo).
    Room(&'a str),
}

/// A routable message, as emitted in `receiveMessage`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageEnvelope {
    pub message_id: String,
    pub sender_identity: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipient_identity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room_id: Option<String>,
    pub body: String,
    pub kind: String,
    pub timestamp: DateTime<Utc>,
}

impl MessageEnvelope {
    /// Build an envelope from a client request, assigning a fresh
    /// `messageId` and `timestamp`. Empty recipient/room strings count as absent.
    pub fn stamp(sender_identity: impl Into<String>, req: SendMessage) -> Self {
        Self {
            message_id: Ulid::new().to_string(),
            sender_identity: sender_identity.into(),
            recipient_identity: req.recipient_identity.filter(|s| !s.is_empty()),
            room_id: req.room_id.filter(|s| !s.is_empty()),
            body: req.body,
            kind: req.kind,
            timestamp: Utc::now(),
        }
    }

    /// Direct mode wins when both a recipient and a room are present.
    /// `None` means the envelope is unroutable.
    pub fn target(&self) -> Option<Target<'_>> {
        if let Some(r) = self.recipient_identity.as_deref() {
            return Some(Target::Direct(r));
        }
        self.room_id.as_deref().map(Target::Room)
    }
}
