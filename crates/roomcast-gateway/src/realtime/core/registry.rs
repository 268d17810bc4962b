use dashmap::DashMap;

use crate::realtime::types::ConnId;

/// Connection registry: `user_identity -> ConnId`.
///
/// At most one live entry per identity; a later `set` supersedes the earlier
/// one ("most recent connection wins"). Every operation is atomic per key.
#[derive(Default)]
pub struct ConnectionRegistry {
    entries: DashMap<String, ConnId>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// Bind `identity` to `conn`. Returns the superseded connection, if any.
    pub fn set(&self, identity: &str, conn: ConnId) -> Option<ConnId> {
        self.entries
            .insert(identity.to_string(), conn)
            .filter(|prev| *prev != conn)
    }

    pub fn get(&self, identity: &str) -> Option<ConnId> {
        self.entries.get(identity).map(|r| *r.value())
    }

    /// Compare-and-remove: drops the entry only while it still points at `conn`.
    ///
    /// A delayed disconnect from a superseded connection therefore leaves the
    /// newer binding untouched.
    pub fn remove_if_current(&self, identity: &str, conn: ConnId) -> bool {
        self.entries
            .remove_if(identity, |_, current| *current == conn)
            .is_some()
    }

    pub fn is_online(&self, identity: &str) -> bool {
        self.entries.contains_key(identity)
    }

    /// Number of online identities.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
