//! Connection lifecycle: `connecting -> active -> closing -> closed`.
//!
//! The manager owns every state transition and is the only writer of presence
//! entries. Cleanup on disconnect runs from [`ConnectionGuard`]'s `Drop`, so it
//! happens exactly once on every exit path of a session task.

use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use roomcast_core::protocol::{InboundEvent, MessageEnvelope, OutboundEvent, PresenceChange};

use crate::realtime::core::Outbox;
use crate::realtime::router::EventRouter;
use crate::realtime::types::ConnId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Connecting,
    Active,
    Closing,
    Closed,
}

impl ConnectionState {
    pub fn as_str(self) -> &'static str {
        match self {
            ConnectionState::Connecting => "connecting",
            ConnectionState::Active => "active",
            ConnectionState::Closing => "closing",
            ConnectionState::Closed => "closed",
        }
    }
}

/// Per-connection state, exclusively owned by that connection's handler.
pub struct Connection {
    id: ConnId,
    identity: Option<String>,
    verified_identity: Option<String>,
    state: ConnectionState,
    outbox: Outbox,
}

impl Connection {
    pub fn id(&self) -> ConnId {
        self.id
    }

    /// Identity bound by the last accepted `join`.
    pub fn identity(&self) -> Option<&str> {
        self.identity.as_deref()
    }

    /// Identity established by the upgrade ticket, if any.
    pub fn verified_identity(&self) -> Option<&str> {
        self.verified_identity.as_deref()
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state == ConnectionState::Active
    }
}

/// What happened to a disconnecting connection's presence entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisconnectOutcome {
    /// Presence entry removed and `userOffline` broadcast.
    WentOffline,
    /// A newer connection owns the identity; nothing removed or announced.
    Superseded,
    /// Never joined.
    Anonymous,
    /// Cleanup already ran.
    AlreadyClosed,
}

pub struct LifecycleManager {
    router: EventRouter,
    next_id: AtomicU64,
    enforce_identity: bool,
}

impl LifecycleManager {
    /// `enforce_identity`: reject `join` claims that differ from the
    /// connection's verified identity.
    pub fn new(router: EventRouter, enforce_identity: bool) -> Self {
        Self {
            router,
            next_id: AtomicU64::new(1),
            enforce_identity,
        }
    }

    pub fn router(&self) -> &EventRouter {
        &self.router
    }

    /// New connection in `connecting` state. No registry side effects.
    pub fn on_connect(&self, outbox: Outbox, verified_identity: Option<String>) -> Connection {
        let id = ConnId::new(self.next_id.fetch_add(1, Ordering::Relaxed));
        tracing::info!(conn = %id, verified = verified_identity.as_deref(), "connection opened");
        Connection {
            id,
            identity: None,
            verified_identity,
            state: ConnectionState::Connecting,
            outbox,
        }
    }

    /// `on_connect` wrapped in a guard that runs `on_disconnect` when dropped.
    pub fn open(self: &Arc<Self>, outbox: Outbox, verified_identity: Option<String>) -> ConnectionGuard {
        let conn = self.on_connect(outbox, verified_identity);
        ConnectionGuard {
            manager: Arc::clone(self),
            conn,
        }
    }

    /// Bind `identity` to the connection and announce it.
    ///
    /// Overwrites any presence entry for the identity (latest connection wins);
    /// the superseded connection stays open. Returns false if the join was
    /// refused.
    pub fn on_join(&self, conn: &mut Connection, identity: &str) -> bool {
        let metrics = self.router.metrics();

        if matches!(conn.state, ConnectionState::Closing | ConnectionState::Closed) {
            metrics.dropped_events.inc(&[("reason", "inactive")]);
            return false;
        }
        if self.enforce_identity && conn.verified_identity.as_deref() != Some(identity) {
            tracing::warn!(
                conn = %conn.id,
                claimed = identity,
                verified = conn.verified_identity.as_deref(),
                "join identity does not match verified identity"
            );
            metrics.dropped_events.inc(&[("reason", "identity_mismatch")]);
            return false;
        }

        // Re-identifying as someone else releases the previous binding.
        if let Some(prev) = conn.identity.take().filter(|p| p != identity) {
            if self.router.registry().remove_if_current(&prev, conn.id) {
                self.announce(conn.id, OutboundEvent::UserOffline(PresenceChange { user_identity: prev }));
            }
        }

        // Deliverable before it is discoverable.
        if conn.state == ConnectionState::Connecting {
            self.router.active().insert(conn.id, conn.outbox.clone());
            metrics.connections_active.inc(&[]);
            conn.state = ConnectionState::Active;
        }

        if let Some(old) = self.router.registry().set(identity, conn.id) {
            tracing::debug!(conn = %conn.id, superseded = %old, identity, "identity moved to newer connection");
            metrics.presence_changes.inc(&[("change", "superseded")]);
        }
        conn.identity = Some(identity.to_string());

        tracing::info!(conn = %conn.id, identity, "joined");
        metrics.presence_changes.inc(&[("change", "online")]);
        self.announce(
            conn.id,
            OutboundEvent::UserOnline(PresenceChange {
                user_identity: identity.to_string(),
            }),
        );
        true
    }

    /// Apply one inbound event. Application events from a connection that is
    /// not `active` are dropped, never queued.
    pub fn handle(&self, conn: &mut Connection, ev: InboundEvent) {
        let metrics = self.router.metrics();
        metrics.inbound_events.inc(&[("event", ev.name())]);

        let ev = match ev {
            InboundEvent::Join(j) => {
                self.on_join(conn, &j.user_identity);
                return;
            }
            other => other,
        };

        let identity = match (conn.state, conn.identity.as_deref()) {
            (ConnectionState::Active, Some(identity)) => identity,
            (state, _) => {
                tracing::debug!(conn = %conn.id, state = state.as_str(), event = ev.name(), "event from inactive connection dropped");
                metrics.dropped_events.inc(&[("reason", "inactive")]);
                return;
            }
        };

        match ev {
            InboundEvent::SendMessage(req) => {
                if let Some(claimed) = req.sender_identity.as_deref().filter(|c| *c != identity) {
                    tracing::debug!(conn = %conn.id, claimed, identity, "sender identity overridden");
                }
                let env = MessageEnvelope::stamp(identity, req);
                self.router.route(conn.id, env);
            }
            InboundEvent::JoinCourseRoom(r) => self.router.join_room(conn.id, &r.room_id),
            InboundEvent::LeaveCourseRoom(r) => self.router.leave_room(conn.id, &r.room_id),
            InboundEvent::Typing(t) => {
                self.router.typing(conn.id, identity, &t.room_id, t.is_typing);
            }
            InboundEvent::Join(_) => {}
        }
    }

    /// Finalizer: release presence and memberships, then announce offline.
    ///
    /// Presence is removed only if it still points at this connection, so a
    /// late disconnect of a superseded connection neither removes the newer
    /// binding nor emits `userOffline`. Safe to call more than once.
    pub fn on_disconnect(&self, conn: &mut Connection) -> DisconnectOutcome {
        if matches!(conn.state, ConnectionState::Closing | ConnectionState::Closed) {
            return DisconnectOutcome::AlreadyClosed;
        }
        conn.state = ConnectionState::Closing;
        let metrics = self.router.metrics();

        let removed = conn
            .identity
            .as_deref()
            .is_some_and(|identity| self.router.registry().remove_if_current(identity, conn.id));

        let rooms = self.router.rooms().remove_connection_from_all_rooms(conn.id);
        if self.router.active().remove(conn.id).is_some() {
            metrics.connections_active.dec(&[]);
        }

        let outcome = match (conn.identity.as_deref(), removed) {
            (Some(identity), true) => {
                metrics.presence_changes.inc(&[("change", "offline")]);
                self.announce(
                    conn.id,
                    OutboundEvent::UserOffline(PresenceChange {
                        user_identity: identity.to_string(),
                    }),
                );
                DisconnectOutcome::WentOffline
            }
            (Some(identity), false) => {
                tracing::debug!(conn = %conn.id, identity, "stale disconnect; newer connection owns identity");
                metrics.presence_changes.inc(&[("change", "stale_disconnect")]);
                DisconnectOutcome::Superseded
            }
            (None, _) => DisconnectOutcome::Anonymous,
        };

        conn.state = ConnectionState::Closed;
        tracing::info!(conn = %conn.id, identity = conn.identity.as_deref(), rooms = rooms.len(), "connection closed");
        outcome
    }

    fn announce(&self, from: ConnId, ev: OutboundEvent) {
        self.router.broadcast_except(from, &ev);
    }
}

/// Owns a [`Connection`] for the lifetime of a session task and guarantees
/// `on_disconnect` runs when the task ends, however it ends.
pub struct ConnectionGuard {
    manager: Arc<LifecycleManager>,
    conn: Connection,
}

impl ConnectionGuard {
    pub fn handle(&mut self, ev: InboundEvent) {
        self.manager.handle(&mut self.conn, ev);
    }
}

impl Deref for ConnectionGuard {
    type Target = Connection;

    fn deref(&self) -> &Connection {
        &self.conn
    }
}

impl DerefMut for ConnectionGuard {
    fn deref_mut(&mut self) -> &mut Connection {
        &mut self.conn
    }
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        self.manager.on_disconnect(&mut self.conn);
    }
}
