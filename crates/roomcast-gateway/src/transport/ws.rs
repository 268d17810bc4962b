//! WebSocket handler.
//!
//! Responsibilities:
//! - Upgrade HTTP -> WS, resolving the optional `ticket` into a verified identity
//! - Lifecycle: ping + idle deadline + bounded socket writes
//! - Size check before decode, decode once, hand events to the lifecycle manager
//! - Drain the connection's outbound queue onto the socket
//!
//! Cleanup is owned by `ConnectionGuard`: when the session future finishes or
//! is dropped, the connection leaves the registry and every room.

use std::time::Instant;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};
use futures_util::{stream::SplitSink, SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::mpsc;
use tokio::time::{Duration, Instant as TokioInstant};
use tracing::Instrument;

use crate::app_state::AppState;
use crate::realtime::{ConnectionGuard, Outbox, PreparedMsg};
use crate::transport::codec::{check_len, decode, Inbound};

#[derive(Debug, Deserialize)]
pub struct WsQuery {
    #[serde(default)]
    pub ticket: Option<String>,
}

pub async fn ws_upgrade(
    State(app): State<AppState>,
    ws: WebSocketUpgrade,
    Query(q): Query<WsQuery>,
) -> Response {
    if app.is_draining() {
        app.metrics().ws_upgrades.inc(&[("result", "draining")]);
        return (StatusCode::SERVICE_UNAVAILABLE, "draining").into_response();
    }

    let verified = match app.resolve_ticket(q.ticket.as_deref()) {
        Ok(v) => v,
        Err(e) => {
            tracing::warn!(code = e.client_code().as_str(), "upgrade refused");
            app.metrics().ws_upgrades.inc(&[("result", "refused")]);
            return (StatusCode::UNAUTHORIZED, e.client_code().as_str()).into_response();
        }
    };

    app.metrics().ws_upgrades.inc(&[("result", "accepted")]);
    let ceiling = app.cfg().gateway.ws_message_ceiling();
    ws.max_message_size(ceiling)
        .max_frame_size(ceiling)
        .on_upgrade(move |socket| run_session(app, verified, socket))
}

async fn run_session(app: AppState, verified: Option<String>, socket: WebSocket) {
    let (out_tx, out_rx) = mpsc::channel::<PreparedMsg>(app.cfg().gateway.outbound_queue);
    let conn = app.lifecycle().open(Outbox::new(out_tx), verified);
    let span = tracing::info_span!("conn", id = %conn.id());

    session_loop(app, conn, out_rx, socket).instrument(span).await;
}

async fn session_loop(
    app: AppState,
    mut conn: ConnectionGuard,
    mut out_rx: mpsc::Receiver<PreparedMsg>,
    socket: WebSocket,
) {
    let (mut ws_tx, mut ws_rx) = socket.split();

    let gw = &app.cfg().gateway;
    let ping_every = Duration::from_millis(gw.ping_interval_ms);
    let idle_timeout = Duration::from_millis(gw.idle_timeout_ms);
    let write_timeout = gw.write_timeout();
    let max_frame = gw.max_frame_bytes;

    let mut ping_tick = tokio::time::interval(ping_every);
    ping_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    // One deadline for the whole session, pushed back by inbound frames only.
    let idle = tokio::time::sleep(idle_timeout);
    tokio::pin!(idle);

    loop {
        tokio::select! {
            // outbound writer
            maybe_out = out_rx.recv() => {
                let Some(m) = maybe_out else { break; };
                if !send_bounded(&mut ws_tx, m.to_ws_message(), write_timeout).await {
                    break;
                }
            }

            // inbound reader
            incoming = ws_rx.next() => {
                let Some(Ok(msg)) = incoming else { break; };
                idle.as_mut().reset(TokioInstant::now() + idle_timeout);

                if let Err(e) = check_len(&msg, max_frame) {
                    tracing::warn!(code = e.client_code().as_str(), max_frame, error = %e, "oversize frame dropped");
                    app.metrics().dropped_events.inc(&[("reason", "oversize")]);
                    continue;
                }

                match decode(msg) {
                    Ok(Inbound::Event(ev)) => {
                        let name = ev.name();
                        let started = Instant::now();
                        conn.handle(ev);
                        app.metrics().event_duration.observe(&[("event", name)], started.elapsed());
                    }
                    Ok(Inbound::Heartbeat) => {}
                    Ok(Inbound::Close) => break,
                    Err(e) => {
                        tracing::debug!(code = e.client_code().as_str(), error = %e, "malformed event dropped");
                        app.metrics().dropped_events.inc(&[("reason", "malformed")]);
                    }
                }
            }

            _ = ping_tick.tick() => {
                if !send_bounded(&mut ws_tx, Message::Ping(Vec::new()), write_timeout).await {
                    break;
                }
            }

            () = &mut idle => {
                tracing::info!(state = conn.state().as_str(), "idle timeout");
                break;
            }
        }
    }

    let _ = tokio::time::timeout(write_timeout, ws_tx.close()).await;
    // `conn` drops here: presence, rooms and the offline broadcast are settled.
}

/// Socket write bounded by `limit`. False means the session should end.
async fn send_bounded(
    ws_tx: &mut SplitSink<WebSocket, Message>,
    msg: Message,
    limit: Duration,
) -> bool {
    match tokio::time::timeout(limit, ws_tx.send(msg)).await {
        Ok(Ok(())) => true,
        Ok(Err(e)) => {
            tracing::debug!(error = %e, "socket write failed");
            false
        }
        Err(_) => {
            tracing::warn!(timeout_ms = limit.as_millis() as u64, "socket write timed out");
            false
        }
    }
}
