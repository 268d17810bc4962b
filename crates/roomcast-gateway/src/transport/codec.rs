//! Decode-once codec for the transport layer.
//!
//! - Text frames => `InboundEvent`
//! - Binary frames => rejected (the protocol is JSON text only)
//! - Ping/Pong collapse to a heartbeat, Close is surfaced for lifecycle management

use axum::extract::ws::Message;
use roomcast_core::{
    error::{Result, RoomcastError},
    protocol::{decode_inbound, InboundEvent},
};

#[derive(Debug)]
pub enum Inbound {
    Event(InboundEvent),
    /// Ping or Pong. The websocket layer answers pings on its own.
    Heartbeat,
    Close,
}

/// Cheap length check, applied before any parsing.
pub fn check_len(msg: &Message, max: usize) -> Result<()> {
    let len = frame_len(msg);
    if len > max {
        return Err(RoomcastError::PayloadTooLarge(len));
    }
    Ok(())
}

pub fn frame_len(msg: &Message) -> usize {
    match msg {
        Message::Text(s) => s.len(),
        Message::Binary(b) => b.len(),
        Message::Ping(v) => v.len(),
        Message::Pong(v) => v.len(),
        Message::Close(_) => 0,
    }
}

pub fn decode(msg: Message) -> Result<Inbound> {
    match msg {
        Message::Text(s) => Ok(Inbound::Event(decode_inbound(&s)?)),
        Message::Binary(_) => Err(RoomcastError::BadRequest(
            "binary frames are not supported".into(),
        )),
        Message::Ping(_) | Message::Pong(_) => Ok(Inbound::Heartbeat),
        Message::Close(_) => Ok(Inbound::Close),
    }
}
