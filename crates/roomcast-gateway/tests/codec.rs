#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use axum::extract::ws::Message;
use roomcast_core::error::ClientCode;
use roomcast_gateway::transport::codec::{check_len, decode, Inbound};

#[test]
fn frames_over_the_cap_are_payload_too_large() {
    let msg = Message::Text("x".repeat(17));
    let err = check_len(&msg, 16).expect_err("must fail");
    assert_eq!(err.client_code(), ClientCode::PayloadTooLarge);
    assert_eq!(err.client_code().as_str(), "PAYLOAD_TOO_LARGE");
    assert_eq!(err.to_string(), "payload too large (17 bytes)");

    check_len(&Message::Text("x".repeat(16)), 16).unwrap();
    check_len(&Message::Close(None), 0).unwrap();
}

#[test]
fn ping_and_pong_are_plain_heartbeats() {
    assert!(matches!(decode(Message::Ping(vec![1, 2])).unwrap(), Inbound::Heartbeat));
    assert!(matches!(decode(Message::Pong(Vec::new())).unwrap(), Inbound::Heartbeat));
    assert!(matches!(decode(Message::Close(None)).unwrap(), Inbound::Close));
}

#[test]
fn binary_frames_are_bad_requests() {
    let err = decode(Message::Binary(vec![0])).expect_err("must fail");
    assert_eq!(err.client_code(), ClientCode::BadRequest);
}

#[test]
fn text_frames_decode_to_events() {
    let msg = Message::Text(r#"{"event":"join","data":"alice"}"#.into());
    match decode(msg).unwrap() {
        Inbound::Event(ev) => assert_eq!(ev.name(), "join"),
        other => panic!("expected event, got {other:?}"),
    }
}
