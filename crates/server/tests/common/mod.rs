#![allow(dead_code)]

pub mod ws_helpers;

use axum::http::{HeaderName, HeaderValue};
use axum::Router;
use jsonwebtoken::{encode, EncodingKey, Header};
use pairchat_server::{config::Config, db, routes, ws, AppState};
use pairchat_shared::liveness::LivenessPolicy;
use serde::Serialize;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use std::sync::Arc;

pub const TEST_SECRET: &str = "test-secret";

/// Create an in-memory SQLite pool with schema applied.
pub async fn setup_test_db() -> SqlitePool {
    // One connection: every connection to `sqlite::memory:` is its own database.
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to create in-memory SQLite pool");

    db::apply_schema(&pool).await.unwrap();
    pool
}

pub fn test_config(policy: &LivenessPolicy) -> Config {
    Config {
        host: "127.0.0.1".into(),
        port: 0,
        database_path: ":memory:".into(),
        auth_secret: TEST_SECRET.into(),
        auth_issuer: None,
        heartbeat_interval_ms: policy.heartbeat_interval_ms,
        presence_stale_window_ms: policy.stale_window_ms,
        typing_debounce_ms: policy.typing_debounce_ms,
        typing_cutoff_ms: policy.typing_cutoff_ms,
        sweep_interval_ms: 5_000,
    }
}

pub fn create_test_state(pool: SqlitePool, policy: LivenessPolicy) -> Arc<AppState> {
    Arc::new(AppState {
        db: pool,
        config: test_config(&policy),
        policy,
        gateway: Arc::new(ws::gateway::GatewayState::new()),
    })
}

/// Build a test Axum app with the given pool and default liveness windows.
pub fn create_test_app(pool: SqlitePool) -> Router {
    create_test_app_with_policy(pool, LivenessPolicy::default())
}

pub fn create_test_app_with_policy(pool: SqlitePool, policy: LivenessPolicy) -> Router {
    routes::build_router(create_test_state(pool, policy))
}

#[derive(Serialize)]
struct TestClaims<'a> {
    sub: &'a str,
    exp: i64,
}

/// Sign a token the way the identity provider would.
pub fn mint_token(subject: &str) -> String {
    let claims = TestClaims {
        sub: subject,
        exp: chrono::Utc::now().timestamp() + 3600,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
    )
    .unwrap()
}

/// Create a registered user directly in the database. Returns (user_id, token).
pub async fn create_test_user(pool: &SqlitePool, email: &str, name: &str) -> (String, String) {
    let user_id = uuid::Uuid::new_v4().to_string();
    let external_id = format!("ext_{}", uuid::Uuid::new_v4().simple());
    let now = db::now_ms();

    sqlx::query(
        r#"INSERT INTO "users" (id, external_id, name, email, image_url, created_at, updated_at)
           VALUES (?, ?, ?, ?, NULL, ?, ?)"#,
    )
    .bind(&user_id)
    .bind(&external_id)
    .bind(name)
    .bind(email)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await
    .unwrap();

    (user_id, mint_token(&external_id))
}

pub fn auth_header(token: &str) -> (HeaderName, HeaderValue) {
    (
        HeaderName::from_static("authorization"),
        format!("Bearer {}", token).parse().unwrap(),
    )
}

/// Insert a message with an explicit timestamp, bypassing the API.
pub async fn insert_message(
    pool: &SqlitePool,
    conversation_id: &str,
    sender_id: &str,
    content: &str,
    created_at: i64,
) -> String {
    let id = uuid::Uuid::new_v4().to_string();
    sqlx::query(
        "INSERT INTO messages (id, conversation_id, sender_id, content, created_at, is_deleted) VALUES (?, ?, ?, ?, ?, 0)",
    )
    .bind(&id)
    .bind(conversation_id)
    .bind(sender_id)
    .bind(content)
    .bind(created_at)
    .execute(pool)
    .await
    .unwrap();
    id
}
