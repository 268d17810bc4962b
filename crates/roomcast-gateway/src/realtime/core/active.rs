use dashmap::DashMap;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

use crate::realtime::types::{ConnId, PreparedMsg};

/// One connection's outbound queue sender.
#[derive(Clone)]
pub struct Outbox {
    tx: mpsc::Sender<PreparedMsg>,
}

/// Result of a single fire-and-forget delivery attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Queued,
    /// Queue full: this one message is dropped for this recipient.
    QueueFull,
    /// Receiver gone (connection already closed).
    Closed,
}

impl Delivery {
    pub fn as_str(self) -> &'static str {
        match self {
            Delivery::Queued => "queued",
            Delivery::QueueFull => "queue_full",
            Delivery::Closed => "closed",
        }
    }
}

impl Outbox {
    pub fn new(tx: mpsc::Sender<PreparedMsg>) -> Self {
        Self { tx }
    }

    /// Never awaits: a slow recipient cannot stall a fan-out.
    pub fn deliver(&self, msg: &PreparedMsg) -> Delivery {
        match self.tx.try_send(msg.clone()) {
            Ok(()) => Delivery::Queued,
            Err(TrySendError::Full(_)) => Delivery::QueueFull,
            Err(TrySendError::Closed(_)) => Delivery::Closed,
        }
    }
}

/// Active connections: `ConnId -> Outbox`.
///
/// Only connections in the `active` lifecycle state are present, so
/// broadcasts never reach a connection that has not joined yet.
#[derive(Default)]
pub struct ActiveConnections {
    conns: DashMap<ConnId, Outbox>,
}

impl ActiveConnections {
    pub fn new() -> Self {
        Self {
            conns: DashMap::new(),
        }
    }

    pub fn insert(&self, conn: ConnId, outbox: Outbox) {
        self.conns.insert(conn, outbox);
    }

    pub fn remove(&self, conn: ConnId) -> Option<Outbox> {
        self.conns.remove(&conn).map(|(_, o)| o)
    }

    pub fn get(&self, conn: ConnId) -> Option<Outbox> {
        self.conns.get(&conn).map(|r| r.value().clone())
    }

    /// Copy of every active connection except `skip`, taken before fan-out so
    /// concurrent joins/leaves cannot skip or duplicate a delivery.
    pub fn snapshot_except(&self, skip: ConnId) -> Vec<(ConnId, Outbox)> {
        self.conns
            .iter()
            .filter(|r| *r.key() != skip)
            .map(|r| (*r.key(), r.value().clone()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.conns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conns.is_empty()
    }
}
