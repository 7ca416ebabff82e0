use std::sync::Arc;

use brainview_bfl::batch::BatchImageGenerator;
use brainview_core::store::CaseStore;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Case storage backend.
    pub cases: Arc<dyn CaseStore>,
    /// Image batch adapter bound to the configured provider.
    pub generator: Arc<BatchImageGenerator>,
}
