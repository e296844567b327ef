use std::sync::Arc;

use fleetdesk_core::gateway::QueryGateway;
use fleetdesk_core::importer::ErrorLog;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// Executes every statement the backend runs against the fleet schema.
    pub gateway: Arc<dyn QueryGateway>,
    /// Sink for hard import failures.
    pub error_log: Arc<dyn ErrorLog>,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
}
