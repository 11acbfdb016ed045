use pairchat_shared::liveness::LivenessPolicy;
use std::env;

#[derive(Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_path: String,
    /// HS256 secret shared with the identity provider that signs session tokens.
    pub auth_secret: String,
    pub auth_issuer: Option<String>,
    pub heartbeat_interval_ms: i64,
    pub presence_stale_window_ms: i64,
    pub typing_debounce_ms: i64,
    pub typing_cutoff_ms: i64,
    /// How often stale presence and typing records are swept.
    pub sweep_interval_ms: i64,
}

fn env_ms(key: &str, default: i64) -> i64 {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = LivenessPolicy::default();
        Self {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3001),
            database_path: env::var("DATABASE_PATH").unwrap_or_else(|_| "./pairchat.db".into()),
            auth_secret: env::var("AUTH_SECRET").expect("AUTH_SECRET must be set"),
            auth_issuer: env::var("AUTH_ISSUER").ok().filter(|v| !v.is_empty()),
            heartbeat_interval_ms: env_ms(
                "PRESENCE_HEARTBEAT_INTERVAL_MS",
                defaults.heartbeat_interval_ms,
            ),
            presence_stale_window_ms: env_ms("PRESENCE_STALE_WINDOW_MS", defaults.stale_window_ms),
            typing_debounce_ms: env_ms("TYPING_DEBOUNCE_MS", defaults.typing_debounce_ms),
            typing_cutoff_ms: env_ms("TYPING_CUTOFF_MS", defaults.typing_cutoff_ms),
            sweep_interval_ms: env_ms("SWEEP_INTERVAL_MS", 5_000),
        }
    }

    pub fn liveness(&self) -> Result<LivenessPolicy, String> {
        LivenessPolicy::new(
            self.heartbeat_interval_ms,
            self.presence_stale_window_ms,
            self.typing_debounce_ms,
            self.typing_cutoff_ms,
        )
    }
}
