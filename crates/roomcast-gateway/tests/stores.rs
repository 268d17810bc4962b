//! Connection registry and room membership semantics.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::sync::Arc;
use std::thread;

use roomcast_gateway::realtime::{ConnId, ConnectionRegistry, RoomMembership};

fn c(n: u64) -> ConnId {
    ConnId::new(n)
}

#[test]
fn later_set_supersedes_earlier() {
    let reg = ConnectionRegistry::new();
    assert_eq!(reg.set("alice", c(1)), None);
    assert_eq!(reg.set("alice", c(2)), Some(c(1)));
    assert_eq!(reg.get("alice"), Some(c(2)));
    assert_eq!(reg.len(), 1);
}

#[test]
fn setting_same_binding_reports_no_supersession() {
    let reg = ConnectionRegistry::new();
    reg.set("alice", c(1));
    assert_eq!(reg.set("alice", c(1)), None);
}

#[test]
fn remove_if_current_only_removes_matching_connection() {
    let reg = ConnectionRegistry::new();
    reg.set("alice", c(1));
    reg.set("alice", c(2));

    assert!(!reg.remove_if_current("alice", c(1)));
    assert_eq!(reg.get("alice"), Some(c(2)));

    assert!(reg.remove_if_current("alice", c(2)));
    assert!(!reg.is_online("alice"));
    assert!(!reg.remove_if_current("alice", c(2)));
    assert!(reg.is_empty());
}

#[test]
fn remove_if_current_races_with_set() {
    // A stale connection's removal racing against fresh binds must never
    // remove a binding it does not own.
    let reg = Arc::new(ConnectionRegistry::new());
    reg.set("alice", c(0));

    let writer = {
        let reg = Arc::clone(&reg);
        thread::spawn(move || {
            for n in 1..=1000 {
                reg.set("alice", c(n));
            }
        })
    };
    let stale = {
        let reg = Arc::clone(&reg);
        thread::spawn(move || {
            for _ in 0..1000 {
                reg.remove_if_current("alice", c(0));
            }
        })
    };
    writer.join().unwrap();
    stale.join().unwrap();

    assert_eq!(reg.get("alice"), Some(c(1000)));
}

#[test]
fn join_twice_leave_once_is_not_member() {
    let rooms = RoomMembership::new();
    assert!(rooms.add("math101", c(1)));
    assert!(!rooms.add("math101", c(1)));
    assert_eq!(rooms.members_of("math101"), vec![c(1)]);

    assert!(rooms.remove("math101", c(1)));
    assert!(!rooms.is_member("math101", c(1)));
    assert!(rooms.members_of("math101").is_empty());
    assert!(!rooms.remove("math101", c(1)));
}

#[test]
fn empty_rooms_disappear() {
    let rooms = RoomMembership::new();
    rooms.add("a", c(1));
    rooms.add("b", c(1));
    assert_eq!(rooms.room_count(), 2);

    rooms.remove("a", c(1));
    assert_eq!(rooms.room_count(), 1);
    assert_eq!(rooms.rooms_of(c(1)), vec!["b".to_string()]);
}

#[test]
fn unknown_room_has_no_members() {
    let rooms = RoomMembership::new();
    assert!(rooms.members_of("nowhere").is_empty());
    assert!(rooms.rooms_of(c(9)).is_empty());
}

#[test]
fn remove_connection_from_all_rooms_uses_reverse_index() {
    let rooms = RoomMembership::new();
    rooms.add("a", c(1));
    rooms.add("b", c(1));
    rooms.add("b", c(2));

    let mut left = rooms.remove_connection_from_all_rooms(c(1));
    left.sort();
    assert_eq!(left, vec!["a".to_string(), "b".to_string()]);

    assert!(rooms.rooms_of(c(1)).is_empty());
    assert!(rooms.members_of("a").is_empty());
    assert_eq!(rooms.members_of("b"), vec![c(2)]);
    assert_eq!(rooms.room_count(), 1);

    assert!(rooms.remove_connection_from_all_rooms(c(1)).is_empty());
}

#[test]
fn concurrent_add_and_remove_keep_indexes_consistent() {
    let rooms = Arc::new(RoomMembership::new());
    let handles: Vec<_> = (0..8u64)
        .map(|n| {
            let rooms = Arc::clone(&rooms);
            thread::spawn(move || {
                for _ in 0..200 {
                    rooms.add("hot", c(n));
                    rooms.remove("hot", c(n));
                }
                rooms.add("hot", c(n));
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    let mut members = rooms.members_of("hot");
    members.sort();
    assert_eq!(members, (0..8u64).map(c).collect::<Vec<_>>());
    for n in 0..8u64 {
        assert_eq!(rooms.rooms_of(c(n)), vec!["hot".to_string()]);
    }
}
