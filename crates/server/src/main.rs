use axum::http::{HeaderName, Method};
use pairchat_server::{config::Config, db, routes, ws, AppState};
use pairchat_shared::constants::APP_NAME;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

#[tokio::main]
async fn main() {
    // Load .env if present
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pairchat_server=info,tower_http=info".into()),
        )
        .init();

    let config = Config::from_env();
    let policy = config
        .liveness()
        .expect("Invalid presence/typing configuration");

    let pool = db::init_pool(&config.database_path)
        .await
        .expect("Failed to initialize database");

    let state = Arc::new(AppState {
        db: pool,
        config: config.clone(),
        policy,
        gateway: Arc::new(ws::gateway::GatewayState::new()),
    });

    // Stale presence never produces a write, so it is detected by polling.
    let sweep_every = Duration::from_millis(config.sweep_interval_ms.max(100) as u64);
    state
        .gateway
        .spawn_sweeper(state.db.clone(), policy, sweep_every);

    let app = routes::build_router(state.clone()).layer(
        ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(
            CorsLayer::new()
                .allow_origin(tower_http::cors::AllowOrigin::mirror_request())
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::DELETE,
                    Method::OPTIONS,
                ])
                .allow_headers([
                    HeaderName::from_static("content-type"),
                    HeaderName::from_static("cookie"),
                    HeaderName::from_static("authorization"),
                ])
                .allow_credentials(true),
        ),
    );

    let addr = format!("{}:{}", config.host, config.port);
    let listener = TcpListener::bind(&addr).await.expect("Failed to bind");

    tracing::info!(
        "{} server running on {} (heartbeat {}ms, stale after {}ms, typing cutoff {}ms)",
        APP_NAME,
        addr,
        policy.heartbeat_interval_ms,
        policy.stale_window_ms,
        policy.typing_cutoff_ms
    );

    axum::serve(listener, app).await.expect("Server error");
}
