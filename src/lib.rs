pub mod api;
pub mod config;
pub mod engine;
pub mod errors;
pub mod metrics;
pub mod models;
pub mod store;
pub mod validation;

use crate::config::AppConfig;
use crate::engine::MarketEngine;

#[derive(Clone)]
pub struct AppState {
    pub engine: MarketEngine,
    pub config: AppConfig,
    pub metrics_handle: metrics_exporter_prometheus::PrometheusHandle,
}
