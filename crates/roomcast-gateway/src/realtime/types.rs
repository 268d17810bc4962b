use std::fmt;
use std::sync::Arc;

use axum::extract::ws::Message;

use roomcast_core::error::Result;
use roomcast_core::protocol::{encode_outbound, OutboundEvent};

/// Transport-assigned connection identifier. Never reused within a process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnId(u64);

impl ConnId {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for ConnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "c{}", self.0)
    }
}

/// Prepared message cached for broadcasting (serialize once, send N times).
#[derive(Debug, Clone)]
pub struct PreparedMsg(Arc<str>);

impl PreparedMsg {
    pub fn prepare(ev: &OutboundEvent) -> Result<Self> {
        Ok(Self(Arc::from(encode_outbound(ev)?)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Convert to axum::ws::Message for transport.
    /// axum's Text frame owns a String, so each recipient gets its own copy here.
    pub fn to_ws_message(&self) -> Message {
        Message::Text(self.0.to_string())
    }
}
