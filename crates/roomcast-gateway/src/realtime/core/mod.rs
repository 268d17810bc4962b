//! Shared in-memory stores for the gateway runtime.
//!
//! Connection registry (identity -> connection), room membership, and the
//! table of active connections' outbound queues. Each store is an owned,
//! injectable service with atomic per-key operations.

mod active;
mod registry;
mod rooms;

pub use active::{ActiveConnections, Delivery, Outbox};
pub use registry::ConnectionRegistry;
pub use rooms::RoomMembership;
