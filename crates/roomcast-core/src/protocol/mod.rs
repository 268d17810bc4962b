//! Event protocol (JSON text frames).
//!
//! Every frame is one object of the form `{"event": <name>, "data": <payload>}`.
//! - `inbound`: events clients send (`join`, `sendMessage`, ...).
//! - `outbound`: events the gateway emits (`userOnline`, `receiveMessage`, ...).
//! - `envelope`: the routable message unit shared by both directions.
//!
//! Decoding is panic-free: malformed input is reported as `RoomcastError`.

pub mod envelope;
pub mod inbound;
pub mod outbound;

pub use envelope::{MessageEnvelope, Target};
pub use inbound::{decode_inbound, InboundEvent, Join, RoomRef, SendMessage, Typing};
pub use outbound::{encode_outbound, OutboundEvent, PresenceChange, TypingIndicator};
