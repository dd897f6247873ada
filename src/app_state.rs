//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::config::HubConfig;
use crate::hub::HubHandle;

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Handle to the hub event loop.
    pub hub: HubHandle,
    /// Service configuration.
    pub config: Arc<HubConfig>,
    /// Process start time, for uptime reporting.
    pub started_at: DateTime<Utc>,
}

impl AppState {
    /// Builds the state from a hub handle and configuration.
    #[must_use]
    pub fn new(hub: HubHandle, config: HubConfig) -> Self {
        Self {
            hub,
            config: Arc::new(config),
            started_at: Utc::now(),
        }
    }
}
