//! Realtime runtime for the roomcast gateway.
//!
//! Stores (registry, rooms, active connections), the event router that fans
//! events out across them, and the lifecycle manager that drives each
//! connection through its states.

pub mod core;
pub mod lifecycle;
pub mod router;
pub mod types;

pub use self::core::{ActiveConnections, ConnectionRegistry, Delivery, Outbox, RoomMembership};
pub use lifecycle::{Connection, ConnectionGuard, ConnectionState, DisconnectOutcome, LifecycleManager};
pub use router::EventRouter;
pub use types::{ConnId, PreparedMsg};
