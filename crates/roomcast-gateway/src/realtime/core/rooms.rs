use dashmap::{DashMap, DashSet};

use crate::realtime::types::ConnId;

/// Room membership: room_id -> connections, connection -> room_ids.
///
/// Rooms are implicit: an entry exists only while it has members. The reverse
/// index keeps disconnect cleanup proportional to the rooms a connection joined.
#[derive(Default)]
pub struct RoomMembership {
    room_to_conns: DashMap<String, DashSet<ConnId>>,
    conn_to_rooms: DashMap<ConnId, DashSet<String>>,
}

impl RoomMembership {
    pub fn new() -> Self {
        Self {
            room_to_conns: DashMap::new(),
            conn_to_rooms: DashMap::new(),
        }
    }

    /// Idempotent set-add. Returns true if the connection was not yet a member.
    pub fn add(&self, room_id: &str, conn: ConnId) -> bool {
        let added = self
            .room_to_conns
            .entry(room_id.to_string())
            .or_insert_with(DashSet::new)
            .insert(conn);

        self.conn_to_rooms
            .entry(conn)
            .or_insert_with(DashSet::new)
            .insert(room_id.to_string());

        added
    }

    /// Idempotent set-remove. Returns true if the connection was a member.
    pub fn remove(&self, room_id: &str, conn: ConnId) -> bool {
        let removed = self.detach(room_id, conn);

        if let Some(set) = self.conn_to_rooms.get(&conn) {
            set.remove(room_id);
        }
        self.conn_to_rooms.remove_if(&conn, |_, set| set.is_empty());

        removed
    }

    /// Snapshot of the room's members (empty for unknown rooms).
    pub fn members_of(&self, room_id: &str) -> Vec<ConnId> {
        self.room_to_conns
            .get(room_id)
            .map(|set| set.iter().map(|c| *c.key()).collect())
            .unwrap_or_default()
    }

    pub fn rooms_of(&self, conn: ConnId) -> Vec<String> {
        self.conn_to_rooms
            .get(&conn)
            .map(|set| set.iter().map(|r| r.key().clone()).collect())
            .unwrap_or_default()
    }

    pub fn is_member(&self, room_id: &str, conn: ConnId) -> bool {
        self.room_to_conns
            .get(room_id)
            .is_some_and(|set| set.contains(&conn))
    }

    /// Disconnect cleanup. Returns the rooms the connection was removed from.
    pub fn remove_connection_from_all_rooms(&self, conn: ConnId) -> Vec<String> {
        let Some((_, rooms)) = self.conn_to_rooms.remove(&conn) else {
            return Vec::new();
        };

        let left: Vec<String> = rooms.iter().map(|r| r.key().clone()).collect();
        for r in &left {
            self.detach(r, conn);
        }
        left
    }

    /// Number of rooms with at least one member.
    pub fn room_count(&self) -> usize {
        self.room_to_conns.len()
    }

    fn detach(&self, room_id: &str, conn: ConnId) -> bool {
        let removed = self
            .room_to_conns
            .get(room_id)
            .is_some_and(|set| set.remove(&conn).is_some());
        // Prune under the shard lock so a concurrent `add` is never lost.
        self.room_to_conns.remove_if(room_id, |_, set| set.is_empty());
        removed
    }
}
