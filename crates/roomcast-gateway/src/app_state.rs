//! Shared application state for the roomcast gateway.

use std::sync::Arc;

use roomcast_core::error::{Result, RoomcastError};

use crate::config::GatewayConfig;
use crate::obs::GatewayMetrics;
use crate::realtime::{EventRouter, LifecycleManager};

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
    lifecycle: Arc<LifecycleManager>,
    metrics: Arc<GatewayMetrics>,
}

struct AppStateInner {
    cfg: GatewayConfig,
}

impl AppState {
    /// Build application state with fresh, empty stores.
    pub fn new(cfg: GatewayConfig) -> Result<Self> {
        cfg.validate()?;

        let metrics = Arc::new(GatewayMetrics::default());
        let router = EventRouter::in_memory(Arc::clone(&metrics));
        let lifecycle = Arc::new(LifecycleManager::new(router, cfg.identity.enforce));

        Ok(Self {
            inner: Arc::new(AppStateInner { cfg }),
            lifecycle,
            metrics,
        })
    }

    pub fn cfg(&self) -> &GatewayConfig {
        &self.inner.cfg
    }

    /// Map an upgrade ticket to a verified identity.
    ///
    /// Advisory mode: a missing or unknown ticket yields `Ok(None)`.
    /// Enforcing mode: it is `AuthFailed`.
    pub fn resolve_ticket(&self, ticket: Option<&str>) -> Result<Option<String>> {
        let identity = &self.cfg().identity;
        match ticket.and_then(|t| identity.resolve(t)) {
            Some(user) => Ok(Some(user.to_string())),
            None if identity.enforce => Err(RoomcastError::AuthFailed),
            None => Ok(None),
        }
    }

    pub fn lifecycle(&self) -> Arc<LifecycleManager> {
        Arc::clone(&self.lifecycle)
    }

    pub fn metrics(&self) -> &GatewayMetrics {
        &self.metrics
    }

    pub fn set_draining(&self) {
        self.metrics.set_draining();
    }

    pub fn is_draining(&self) -> bool {
        self.metrics.is_draining()
    }

    /// Store sizes rendered alongside the metric registry.
    pub fn metrics_extra(&self) -> Vec<(&'static str, u64)> {
        let router = self.lifecycle.router();
        vec![
            ("roomcast_identities_online", router.registry().len() as u64),
            ("roomcast_rooms_active", router.rooms().room_count() as u64),
            ("roomcast_connections_joined", router.active().len() as u64),
        ]
    }
}
