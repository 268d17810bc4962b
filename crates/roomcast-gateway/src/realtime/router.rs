//! Event router: computes the target set for an outbound event and fans it out.
//!
//! Targets are always snapshotted before dispatch. Delivery to each recipient
//! is an independent `try_send`; a full or closed queue affects only that
//! recipient.

use std::sync::Arc;

use roomcast_core::protocol::{MessageEnvelope, OutboundEvent, Target, TypingIndicator};

use crate::obs::GatewayMetrics;
use crate::realtime::core::{ActiveConnections, ConnectionRegistry, Delivery, RoomMembership};
use crate::realtime::types::{ConnId, PreparedMsg};

pub struct EventRouter {
    registry: Arc<ConnectionRegistry>,
    rooms: Arc<RoomMembership>,
    active: Arc<ActiveConnections>,
    metrics: Arc<GatewayMetrics>,
}

impl EventRouter {
    pub fn new(
        registry: Arc<ConnectionRegistry>,
        rooms: Arc<RoomMembership>,
        active: Arc<ActiveConnections>,
        metrics: Arc<GatewayMetrics>,
    ) -> Self {
        Self {
            registry,
            rooms,
            active,
            metrics,
        }
    }

    /// Fresh, empty stores.
    pub fn in_memory(metrics: Arc<GatewayMetrics>) -> Self {
        Self::new(
            Arc::new(ConnectionRegistry::new()),
            Arc::new(RoomMembership::new()),
            Arc::new(ActiveConnections::new()),
            metrics,
        )
    }

    pub fn registry(&self) -> &ConnectionRegistry {
        &self.registry
    }

    pub fn rooms(&self) -> &RoomMembership {
        &self.rooms
    }

    pub fn active(&self) -> &ActiveConnections {
        &self.active
    }

    pub fn metrics(&self) -> &GatewayMetrics {
        &self.metrics
    }

    /// Route one envelope from `sender`. Returns the number of queued deliveries
    /// (sender echo included).
    ///
    /// - direct: recipient's current connection (if online), then echo to sender.
    /// - room: every member except the sender, then echo to sender.
    /// - neither: dropped.
    pub fn route(&self, sender: ConnId, env: MessageEnvelope) -> usize {
        let targets: Vec<ConnId> = match env.target() {
            Some(Target::Direct(recipient)) => match self.registry.get(recipient) {
                // A message to oneself is delivered once, as the echo.
                Some(c) if c != sender => vec![c],
                Some(_) => Vec::new(),
                None => {
                    tracing::debug!(%sender, recipient, "recipient offline; echo only");
                    Vec::new()
                }
            },
            Some(Target::Room(room)) => self
                .rooms
                .members_of(room)
                .into_iter()
                .filter(|c| *c != sender)
                .collect(),
            None => {
                tracing::debug!(%sender, message_id = %env.message_id, "unroutable envelope dropped");
                self.metrics.dropped_events.inc(&[("reason", "unroutable")]);
                return 0;
            }
        };

        let Some(msg) = self.prepare(&OutboundEvent::ReceiveMessage(env)) else {
            return 0;
        };

        let mut queued = self.fan_out(&targets, &msg);
        if self.deliver(sender, &msg) {
            queued += 1;
        }
        queued
    }

    /// Idempotent membership add. No event is emitted to other members.
    pub fn join_room(&self, conn: ConnId, room_id: &str) {
        if self.rooms.add(room_id, conn) {
            tracing::debug!(%conn, room_id, "joined room");
        }
    }

    /// Idempotent membership remove.
    pub fn leave_room(&self, conn: ConnId, room_id: &str) {
        if self.rooms.remove(room_id, conn) {
            tracing::debug!(%conn, room_id, "left room");
        }
    }

    /// Transient typing indicator to every other member of the room.
    /// Never echoed to the sending connection.
    pub fn typing(&self, sender: ConnId, user_identity: &str, room_id: &str, is_typing: bool) -> usize {
        let targets: Vec<ConnId> = self
            .rooms
            .members_of(room_id)
            .into_iter()
            .filter(|c| *c != sender)
            .collect();

        let ev = OutboundEvent::UserTyping(TypingIndicator {
            user_identity: user_identity.to_string(),
            room_id: room_id.to_string(),
            is_typing,
        });
        match self.prepare(&ev) {
            Some(msg) => self.fan_out(&targets, &msg),
            None => 0,
        }
    }

    /// Broadcast to every active connection except `skip`.
    pub fn broadcast_except(&self, skip: ConnId, ev: &OutboundEvent) -> usize {
        let Some(msg) = self.prepare(ev) else {
            return 0;
        };
        let mut queued = 0;
        for (conn, outbox) in self.active.snapshot_except(skip) {
            let outcome = outbox.deliver(&msg);
            if self.record(conn, outcome) {
                queued += 1;
            }
        }
        queued
    }

    /// Send primitive: look up the connection's outbox and try to enqueue.
    /// A connection that is no longer active is skipped silently.
    pub fn deliver(&self, conn: ConnId, msg: &PreparedMsg) -> bool {
        match self.active.get(conn) {
            Some(outbox) => {
                let outcome = outbox.deliver(msg);
                self.record(conn, outcome)
            }
            None => self.record(conn, Delivery::Closed),
        }
    }

    fn fan_out(&self, targets: &[ConnId], msg: &PreparedMsg) -> usize {
        targets.iter().filter(|c| self.deliver(**c, msg)).count()
    }

    fn record(&self, conn: ConnId, outcome: Delivery) -> bool {
        self.metrics.deliveries.inc(&[("outcome", outcome.as_str())]);
        if outcome != Delivery::Queued {
            tracing::debug!(%conn, outcome = outcome.as_str(), "delivery dropped");
        }
        outcome == Delivery::Queued
    }

    fn prepare(&self, ev: &OutboundEvent) -> Option<PreparedMsg> {
        match PreparedMsg::prepare(ev) {
            Ok(msg) => Some(msg),
            Err(e) => {
                tracing::error!(event = ev.name(), error = %e, "outbound encode failed");
                None
            }
        }
    }
}
