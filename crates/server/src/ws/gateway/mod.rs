mod broadcast;
mod timers;

use pairchat_shared::liveness::LivenessPolicy;
use sqlx::SqlitePool;
use std::collections::{HashMap, HashSet};
use tokio::sync::{mpsc, RwLock};

use crate::store;

pub type ClientId = u64;

/// (conversation_id, user_id)
type TypingKey = (String, String);

pub struct ConnectedClient {
    pub user_id: String,
    pub tx: mpsc::UnboundedSender<String>,
    pub subscribed_conversations: HashSet<String>,
}

pub struct GatewayState {
    next_id: RwLock<u64>,
    pub clients: RwLock<HashMap<ClientId, ConnectedClient>>,
    pub conversation_subs: RwLock<HashMap<String, HashSet<ClientId>>>,
    /// Last derived presence pushed to clients, used to only push changes.
    pub presence_snapshot: RwLock<HashMap<String, bool>>,
    pub typing_timers: RwLock<HashMap<TypingKey, tokio::task::JoinHandle<()>>>,
}

impl Default for GatewayState {
    fn default() -> Self {
        Self::new()
    }
}

impl GatewayState {
    pub fn new() -> Self {
        Self {
            next_id: RwLock::new(1),
            clients: RwLock::new(HashMap::new()),
            conversation_subs: RwLock::new(HashMap::new()),
            presence_snapshot: RwLock::new(HashMap::new()),
            typing_timers: RwLock::new(HashMap::new()),
        }
    }

    pub async fn next_client_id(&self) -> ClientId {
        let mut id = self.next_id.write().await;
        let current = *id;
        *id += 1;
        current
    }

    pub async fn register(
        &self,
        client_id: ClientId,
        user_id: String,
        tx: mpsc::UnboundedSender<String>,
    ) {
        let client = ConnectedClient {
            user_id,
            tx,
            subscribed_conversations: HashSet::new(),
        };
        self.clients.write().await.insert(client_id, client);
    }

    pub async fn unregister(&self, client_id: ClientId) -> Option<ConnectedClient> {
        let client = self.clients.write().await.remove(&client_id)?;

        let mut subs = self.conversation_subs.write().await;
        for conversation_id in &client.subscribed_conversations {
            if let Some(set) = subs.get_mut(conversation_id) {
                set.remove(&client_id);
                if set.is_empty() {
                    subs.remove(conversation_id);
                }
            }
        }

        Some(client)
    }

    pub async fn subscribe_conversation(&self, client_id: ClientId, conversation_id: &str) {
        self.conversation_subs
            .write()
            .await
            .entry(conversation_id.to_string())
            .or_default()
            .insert(client_id);

        if let Some(client) = self.clients.write().await.get_mut(&client_id) {
            client
                .subscribed_conversations
                .insert(conversation_id.to_string());
        }
    }

    pub async fn unsubscribe_conversation(&self, client_id: ClientId, conversation_id: &str) {
        let mut subs = self.conversation_subs.write().await;
        if let Some(set) = subs.get_mut(conversation_id) {
            set.remove(&client_id);
            if set.is_empty() {
                subs.remove(conversation_id);
            }
        }

        if let Some(client) = self.clients.write().await.get_mut(&client_id) {
            client.subscribed_conversations.remove(conversation_id);
        }
    }

    pub async fn is_subscribed(&self, client_id: ClientId, conversation_id: &str) -> bool {
        self.conversation_subs
            .read()
            .await
            .get(conversation_id)
            .is_some_and(|set| set.contains(&client_id))
    }

    /// Number of open connections for a user across devices and tabs.
    pub async fn connection_count(&self, user_id: &str) -> usize {
        self.clients
            .read()
            .await
            .values()
            .filter(|c| c.user_id == user_id)
            .count()
    }

    /// Derive one user's presence and record it. `Some` only when it changed.
    ///
    /// The snapshot lock is held across the read so a concurrent sweep can
    /// never record an older derivation after this one.
    pub async fn refresh_presence(
        &self,
        db: &SqlitePool,
        policy: &LivenessPolicy,
        user_id: &str,
        now: i64,
    ) -> Result<Option<bool>, sqlx::Error> {
        let mut snapshot = self.presence_snapshot.write().await;
        let online = store::presence::is_online(db, policy, user_id, now).await?;
        let previous = snapshot.insert(user_id.to_string(), online);
        Ok((previous.unwrap_or(false) != online).then_some(online))
    }

    /// Re-derive everyone's presence and return the users whose value changed.
    /// Same locking as `refresh_presence`.
    pub async fn refresh_all_presence(
        &self,
        db: &SqlitePool,
        policy: &LivenessPolicy,
        now: i64,
    ) -> Result<Vec<(String, bool)>, sqlx::Error> {
        let mut snapshot = self.presence_snapshot.write().await;
        let current = store::presence::all(db, policy, now).await?;
        Ok(diff_presence(&mut snapshot, &current))
    }
}

fn diff_presence(
    snapshot: &mut HashMap<String, bool>,
    current: &HashMap<String, bool>,
) -> Vec<(String, bool)> {
    let mut changed = Vec::new();
    for (user_id, &online) in current {
        if snapshot.get(user_id).copied().unwrap_or(false) != online {
            changed.push((user_id.clone(), online));
        }
    }
    for (user_id, &online) in snapshot.iter() {
        if online && !current.contains_key(user_id) {
            changed.push((user_id.clone(), false));
        }
    }
    *snapshot = current.clone();
    changed
}
