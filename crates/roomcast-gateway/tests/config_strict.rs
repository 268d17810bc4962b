#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use roomcast_gateway::{app_state::AppState, config};

#[test]
fn deny_unknown_fields_nested() {
    let bad = r#"
version: 1
gateway:
  listen: "0.0.0.0:8080"
  outbound_queu: 10 # typo should fail
"#;

    let err = config::load_from_str(bad).expect_err("must fail");
    assert_eq!(err.client_code().as_str(), "BAD_REQUEST");
}

#[test]
fn ok_minimal_config() {
    let cfg = config::load_from_str("version: 1\n").expect("must parse");
    assert_eq!(cfg.version, 1);
    assert_eq!(cfg.gateway.listen, "0.0.0.0:8080");
    assert_eq!(cfg.gateway.outbound_queue, 256);
    assert!(!cfg.identity.enforce);
    assert!(cfg.identity.tickets.is_empty());
}

#[test]
fn unsupported_version() {
    let err = config::load_from_str("version: 2\n").expect_err("must fail");
    assert_eq!(err.client_code().as_str(), "UNSUPPORTED_VERSION");
}

#[test]
fn idle_timeout_must_exceed_ping_interval() {
    let bad = r#"
version: 1
gateway:
  ping_interval_ms: 30000
  idle_timeout_ms: 20000
"#;
    assert!(config::load_from_str(bad).is_err());
}

#[test]
fn outbound_queue_range() {
    let bad = "version: 1\ngateway:\n  outbound_queue: 0\n";
    assert!(config::load_from_str(bad).is_err());
}

#[test]
fn enforce_without_tickets_is_rejected() {
    let bad = "version: 1\nidentity:\n  enforce: true\n";
    assert!(config::load_from_str(bad).is_err());
}

#[test]
fn ticket_resolution_advisory_and_enforced() {
    let advisory = config::load_from_str(
        r#"
version: 1
identity:
  tickets:
    t-alice: "alice"
"#,
    )
    .unwrap();
    let app = AppState::new(advisory).unwrap();
    assert_eq!(app.resolve_ticket(Some("t-alice")).unwrap().as_deref(), Some("alice"));
    assert_eq!(app.resolve_ticket(Some("nope")).unwrap(), None);
    assert_eq!(app.resolve_ticket(None).unwrap(), None);

    let enforced = config::load_from_str(
        r#"
version: 1
identity:
  enforce: true
  tickets:
    t-alice: "alice"
"#,
    )
    .unwrap();
    let app = AppState::new(enforced).unwrap();
    assert_eq!(app.resolve_ticket(Some("t-alice")).unwrap().as_deref(), Some("alice"));
    let err = app.resolve_ticket(Some("nope")).expect_err("unknown ticket");
    assert_eq!(err.client_code().as_str(), "AUTH_FAILED");
    assert!(app.resolve_ticket(None).is_err());
}

#[test]
fn websocket_ceiling_stays_above_frame_cap() {
    let cfg = config::load_from_str("version: 1\n").unwrap();
    assert_eq!(cfg.gateway.max_frame_bytes, 16384);
    assert_eq!(cfg.gateway.ws_message_ceiling(), 65536);

    let big = r#"
version: 1
gateway:
  max_frame_bytes: 1048576
"#;
    let cfg = config::load_from_str(big).unwrap();
    assert_eq!(cfg.gateway.ws_message_ceiling(), 4 * 1048576);
    assert_eq!(cfg.gateway.write_timeout().as_millis(), 20000);
}
