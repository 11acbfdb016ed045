use pairchat_shared::liveness::LivenessPolicy;
use sqlx::SqlitePool;
use std::sync::Arc;
use std::time::Duration;

use super::GatewayState;
use crate::db::now_ms;
use crate::store;
use crate::ws::events::ServerEvent;

impl GatewayState {
    /// Recompute who is typing in a conversation and push it to subscribers.
    pub async fn push_typers(&self, db: &SqlitePool, policy: &LivenessPolicy, conversation_id: &str) {
        match store::typing::typers(db, policy, conversation_id, None, now_ms()).await {
            Ok(typers) => {
                self.broadcast_conversation(
                    conversation_id,
                    &ServerEvent::Typing {
                        conversation_id: conversation_id.to_string(),
                        typers,
                    },
                    None,
                )
                .await;
            }
            Err(e) => tracing::warn!("Failed to load typers for {}: {:?}", conversation_id, e),
        }
    }

    /// Re-push the typer list once this user's record passes the cutoff, so
    /// a client that vanished mid-typing drops out without any further write.
    /// Each keystroke re-arms the timer.
    pub async fn schedule_typing_expiry(
        self: &Arc<Self>,
        conversation_id: String,
        user_id: String,
        db: SqlitePool,
        policy: LivenessPolicy,
    ) {
        let key = (conversation_id, user_id);
        let mut timers = self.typing_timers.write().await;
        if let Some(handle) = timers.remove(&key) {
            handle.abort();
        }

        let gw = Arc::clone(self);
        let task_key = key.clone();
        let delay = Duration::from_millis(policy.typing_cutoff_ms.max(0) as u64);
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            gw.push_typers(&db, &policy, &task_key.0).await;
            gw.typing_timers.write().await.remove(&task_key);
        });
        timers.insert(key, handle);
    }

    pub async fn cancel_typing_expiry(&self, conversation_id: &str, user_id: &str) {
        let key = (conversation_id.to_string(), user_id.to_string());
        if let Some(handle) = self.typing_timers.write().await.remove(&key) {
            handle.abort();
        }
    }

    /// Push presence changes that happened without any write (records going
    /// stale) and drop typing records nobody can see anymore.
    pub async fn sweep_once(&self, db: &SqlitePool, policy: &LivenessPolicy, now: i64) {
        match self.refresh_all_presence(db, policy, now).await {
            Ok(changed) => {
                for (user_id, online) in changed {
                    tracing::debug!("Presence for {} is now {}", user_id, online);
                    self.broadcast_all(&ServerEvent::Presence { user_id, online }, None)
                        .await;
                }
            }
            Err(e) => tracing::warn!("Presence sweep failed: {:?}", e),
        }

        match store::typing::sweep_stale(db, policy, now).await {
            Ok(0) => {}
            Ok(n) => tracing::debug!("Swept {} stale typing records", n),
            Err(e) => tracing::warn!("Typing sweep failed: {:?}", e),
        }
    }

    pub fn spawn_sweeper(
        self: &Arc<Self>,
        db: SqlitePool,
        policy: LivenessPolicy,
        every: Duration,
    ) -> tokio::task::JoinHandle<()> {
        let gw = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                gw.sweep_once(&db, &policy, now_ms()).await;
            }
        })
    }
}
