//! roomcast gateway library entry.
//!
//! Wires the WebSocket transport, the lifecycle manager, the event router and
//! the in-memory presence/room stores into one service. Consumed by the
//! binary (`main.rs`) and by integration tests.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod app_state;
pub mod config;
pub mod obs;
pub mod ops;
pub mod realtime;
pub mod router;
pub mod transport;
