//! Shared application state passed to all Axum handlers.

use std::sync::Arc;

use fleetdesk_auth::JwtDecoder;
use fleetdesk_core::config::AppConfig;
use fleetdesk_service::Services;

/// Application state shared across all request handlers.
///
/// Cloning is cheap: every field is either an `Arc` or a service holding
/// `Arc`s.
#[derive(Clone)]
pub struct AppState {
    /// Loaded configuration.
    pub config: Arc<AppConfig>,
    /// Every back-office service.
    pub services: Services,
    /// Bearer token verification.
    pub jwt_decoder: Arc<JwtDecoder>,
}

impl AppState {
    /// Assemble the state from its parts.
    pub fn new(config: AppConfig, services: Services) -> Self {
        let jwt_decoder = Arc::new(JwtDecoder::new(&config.auth));
        Self {
            config: Arc::new(config),
            services,
            jwt_decoder,
        }
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("server", &self.config.server)
            .finish_non_exhaustive()
    }
}
