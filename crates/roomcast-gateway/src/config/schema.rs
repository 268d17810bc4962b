use std::collections::HashMap;
use std::time::Duration;

use serde::Deserialize;
use roomcast_core::error::{Result, RoomcastError};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    pub version: u32,

    #[serde(default)]
    pub gateway: GatewaySection,

    #[serde(default)]
    pub identity: IdentitySection,
}

impl GatewayConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(RoomcastError::UnsupportedVersion);
        }
        self.gateway.validate()?;
        self.identity.validate()?;
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GatewaySection {
    #[serde(default = "default_listen")]
    pub listen: String,

    #[serde(default = "default_ping_interval_ms")]
    pub ping_interval_ms: u64,

    #[serde(default = "default_idle_timeout_ms")]
    pub idle_timeout_ms: u64,

    /// Per-connection outbound queue capacity (messages).
    #[serde(default = "default_outbound_queue")]
    pub outbound_queue: usize,

    #[serde(default = "default_max_frame_bytes")]
    pub max_frame_bytes: usize,
}

impl Default for GatewaySection {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            ping_interval_ms: default_ping_interval_ms(),
            idle_timeout_ms: default_idle_timeout_ms(),
            outbound_queue: default_outbound_queue(),
            max_frame_bytes: default_max_frame_bytes(),
        }
    }
}

impl GatewaySection {
    pub fn validate(&self) -> Result<()> {
        if !(5000..=120000).contains(&self.ping_interval_ms) {
            return Err(RoomcastError::BadRequest(
                "gateway.ping_interval_ms must be between 5000 and 120000".into(),
            ));
        }
        if !(10000..=600000).contains(&self.idle_timeout_ms) {
            return Err(RoomcastError::BadRequest(
                "gateway.idle_timeout_ms must be between 10000 and 600000".into(),
            ));
        }
        if self.idle_timeout_ms <= self.ping_interval_ms {
            return Err(RoomcastError::BadRequest(
                "gateway.idle_timeout_ms must be greater than ping_interval_ms".into(),
            ));
        }
        if !(1..=65536).contains(&self.outbound_queue) {
            return Err(RoomcastError::BadRequest(
                "gateway.outbound_queue must be between 1 and 65536".into(),
            ));
        }
        if self.max_frame_bytes == 0 {
            return Err(RoomcastError::BadRequest(
                "gateway.max_frame_bytes must be greater than 0".into(),
            ));
        }
        Ok(())
    }

    /// Hard cap handed to the websocket layer. Frames between
    /// `max_frame_bytes` and this ceiling are dropped by the session; frames
    /// above it close the connection before they are fully buffered.
    pub fn ws_message_ceiling(&self) -> usize {
        self.max_frame_bytes.saturating_mul(4).max(64 * 1024)
    }

    /// Bound on a single socket write. A peer that stops reading is cut off
    /// after this long.
    pub fn write_timeout(&self) -> Duration {
        Duration::from_millis(self.ping_interval_ms)
    }
}

fn default_listen() -> String {
    "0.0.0.0:8080".into()
}
fn default_ping_interval_ms() -> u64 {
    20000
}
fn default_idle_timeout_ms() -> u64 {
    60000
}
fn default_outbound_queue() -> usize {
    256
}
fn default_max_frame_bytes() -> usize {
    16384
}

/// Connection identity binding.
///
/// `tickets` maps an opaque upgrade ticket to the identity it proves. With
/// `enforce: false` the identity a client announces in `join` is advisory.
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct IdentitySection {
    #[serde(default)]
    pub enforce: bool,

    #[serde(default)]
    pub tickets: HashMap<String, String>,
}

impl IdentitySection {
    pub fn validate(&self) -> Result<()> {
        if self.enforce && self.tickets.is_empty() {
            return Err(RoomcastError::BadRequest(
                "identity.enforce requires at least one ticket".into(),
            ));
        }
        if self.tickets.values().any(String::is_empty) {
            return Err(RoomcastError::BadRequest(
                "identity.tickets must map to non-empty identities".into(),
            ));
        }
        Ok(())
    }

    /// Identity proven by `ticket`, if it is known.
    pub fn resolve(&self, ticket: &str) -> Option<&str> {
        self.tickets.get(ticket).map(String::as_str)
    }
}
