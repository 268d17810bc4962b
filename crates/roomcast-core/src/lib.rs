//! roomcast core: transport-agnostic event protocol and error types.
//!
//! This crate defines the wire-level contracts shared by the gateway and by
//! test clients. It carries no transport or runtime dependencies so the same
//! event types can be decoded in a browser bridge, a load tester, or the
//! gateway itself.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here.
//! Malformed client input surfaces as `RoomcastError` so one bad frame can
//! never take the process down.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod protocol;

/// Shared result type.
pub use error::{Result, RoomcastError};
