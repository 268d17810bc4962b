//! roomcast gateway binary.
//!
//! - WebSocket endpoint: /v1/ws[?ticket=...]
//! - Ops: /healthz, /readyz, /metrics
//! - Config: $ROOMCAST_CONFIG (default ./roomcast.yaml)
//! - Ctrl-C: mark draining, stop accepting, drain in-flight connections

use std::net::SocketAddr;
use std::process::ExitCode;

use tracing_subscriber::{fmt, EnvFilter};

use roomcast_core::error::{Result, RoomcastError};
use roomcast_gateway::{app_state::AppState, config, router};

#[tokio::main]
async fn main() -> ExitCode {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "roomcast-gateway failed");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<()> {
    let cfg = config::load_from_env()?;
    let listen: SocketAddr = cfg
        .gateway
        .listen
        .parse()
        .map_err(|e| RoomcastError::BadRequest(format!("gateway.listen must be a valid SocketAddr: {e}")))?;

    let state = AppState::new(cfg)?;
    let app = router::build_router(state.clone());

    tracing::info!(%listen, "roomcast-gateway starting");
    let listener = tokio::net::TcpListener::bind(listen)
        .await
        .map_err(|e| RoomcastError::Internal(format!("bind {listen} failed: {e}")))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(state))
        .await
        .map_err(|e| RoomcastError::Internal(format!("server failed: {e}")))?;

    tracing::info!("roomcast-gateway stopped");
    Ok(())
}

async fn shutdown_signal(state: AppState) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "ctrl-c handler failed; graceful shutdown disabled");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown requested; draining");
    state.set_draining();
}
