use std::sync::Arc;
use std::time::Duration;

use userdir_core::context::RequestContext;
use userdir_core::identity::IdentityService;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// Registration, login, and profile operations.
    pub identity: Arc<IdentityService>,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
}

impl AppState {
    /// A fresh per-request context bounded by the configured request timeout.
    pub fn request_context(&self) -> RequestContext {
        RequestContext::with_timeout(Duration::from_secs(self.config.request_timeout_secs))
    }
}
