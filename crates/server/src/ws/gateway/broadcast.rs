use super::{ClientId, GatewayState};
use crate::ws::events::ServerEvent;

fn encode(event: &ServerEvent) -> Option<String> {
    serde_json::to_string(event)
        .map_err(|e| tracing::error!("Failed to encode gateway event: {}", e))
        .ok()
}

impl GatewayState {
    /// Push to every client that joined the conversation.
    pub async fn broadcast_conversation(
        &self,
        conversation_id: &str,
        event: &ServerEvent,
        exclude: Option<ClientId>,
    ) {
        let Some(msg) = encode(event) else { return };

        let subs = self.conversation_subs.read().await;
        let clients = self.clients.read().await;

        let Some(subscriber_ids) = subs.get(conversation_id) else { return };
        for cid in subscriber_ids.iter().filter(|&&cid| Some(cid) != exclude) {
            if let Some(client) = clients.get(cid) {
                let _ = client.tx.send(msg.clone());
            }
        }
    }

    pub async fn broadcast_all(&self, event: &ServerEvent, exclude: Option<ClientId>) {
        let Some(msg) = encode(event) else { return };

        let clients = self.clients.read().await;
        for (_, client) in clients.iter().filter(|(cid, _)| Some(**cid) != exclude) {
            let _ = client.tx.send(msg.clone());
        }
    }

    pub async fn send_to(&self, client_id: ClientId, event: &ServerEvent) {
        let Some(msg) = encode(event) else { return };

        if let Some(client) = self.clients.read().await.get(&client_id) {
            let _ = client.tx.send(msg);
        }
    }

    /// Push to every connection a set of users holds, whether or not they
    /// joined the conversation the event is about.
    pub async fn send_to_users(&self, user_ids: &[&str], event: &ServerEvent) {
        let Some(msg) = encode(event) else { return };

        let clients = self.clients.read().await;
        for client in clients.values().filter(|c| user_ids.contains(&c.user_id.as_str())) {
            let _ = client.tx.send(msg.clone());
        }
    }

    pub async fn send_to_user(&self, user_id: &str, event: &ServerEvent) {
        self.send_to_users(&[user_id], event).await;
    }
}
