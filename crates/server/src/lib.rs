pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod store;
pub mod ws;

use config::Config;
use pairchat_shared::liveness::LivenessPolicy;
use std::sync::Arc;

pub struct AppState {
    pub db: sqlx::SqlitePool,
    pub config: Config,
    pub policy: LivenessPolicy,
    pub gateway: Arc<ws::gateway::GatewayState>,
}
