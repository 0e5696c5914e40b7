pub mod analytics;
pub mod api;
pub mod config;
pub mod db;
pub mod errors;
pub mod metrics;
pub mod models;
pub mod services;

use tokio::sync::broadcast;

use crate::api::ws_types::WsMessage;
use crate::config::AppConfig;

/// Capacity of the trade change feed; slower WebSocket clients lag.
const WS_CHANNEL_CAPACITY: usize = 256;

#[derive(Clone)]
pub struct AppState {
    pub db: sqlx::PgPool,
    pub config: AppConfig,
    pub ws_tx: broadcast::Sender<WsMessage>,
    pub metrics_handle: metrics_exporter_prometheus::PrometheusHandle,
}

impl AppState {
    pub fn new(db: sqlx::PgPool, config: AppConfig) -> Self {
        let (ws_tx, _) = broadcast::channel::<WsMessage>(WS_CHANNEL_CAPACITY);
        Self {
            db,
            config,
            ws_tx,
            metrics_handle: crate::metrics::init_metrics(),
        }
    }
}
