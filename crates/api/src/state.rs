use std::sync::Arc;

use crate::config::ServerConfig;
use crate::ws::ChannelHub;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: reforma_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Per-request WebSocket channel hub (subscriptions + typing presence).
    pub hub: Arc<ChannelHub>,
    /// Event bus consumed by the notification dispatcher.
    pub event_bus: Arc<reforma_events::EventBus>,
}
