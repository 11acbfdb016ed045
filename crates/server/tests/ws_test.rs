mod common;

use axum_test::TestServer;
use common::auth_header;
use common::ws_helpers::{
    drain_messages, recv_event, recv_json, send_json, start_server, start_server_with_http,
    ws_connect, WsStream,
};
use pairchat_server::db::now_ms;
use pairchat_shared::beacon::TypingDebouncer;
use pairchat_shared::liveness::LivenessPolicy;
use serde_json::{json, Value};
use std::time::{Duration, Instant};

struct Chat {
    base: String,
    http: TestServer,
    alice_id: String,
    alice_token: String,
    bob_token: String,
    conversation_id: String,
}

async fn setup(policy: LivenessPolicy) -> Chat {
    let (base, pool, http) = start_server_with_http(policy).await;
    let (alice_id, alice_token) = common::create_test_user(&pool, "alice@test.com", "alice").await;
    let (bob_id, bob_token) = common::create_test_user(&pool, "bob@test.com", "bob").await;

    let (h, v) = auth_header(&alice_token);
    let conversation_id = http
        .post("/api/conversations")
        .add_header(h, v)
        .json(&json!({ "otherUserId": bob_id }))
        .await
        .json::<Value>()["id"]
        .as_str()
        .unwrap()
        .to_string();

    Chat {
        base,
        http,
        alice_id,
        alice_token,
        bob_token,
        conversation_id,
    }
}

/// Connect, wait for `ready`, join the conversation and drop the backlog.
async fn join(chat: &Chat, token: &str) -> WsStream {
    let mut ws = ws_connect(&chat.base, token).await;
    recv_event(&mut ws, "ready").await.unwrap();
    send_json(
        &mut ws,
        &json!({"type": "join_conversation", "conversationId": chat.conversation_id}),
    )
    .await;
    tokio::time::sleep(Duration::from_millis(100)).await;
    drain_messages(&mut ws).await;
    ws
}

#[tokio::test]
async fn ping_gets_pong() {
    let (base, pool) = start_server().await;
    let (_, token) = common::create_test_user(&pool, "alice@test.com", "alice").await;

    let mut ws = ws_connect(&base, &token).await;
    recv_event(&mut ws, "ready").await.unwrap();

    send_json(&mut ws, &json!({"type": "ping"})).await;
    assert!(recv_event(&mut ws, "pong").await.is_some());
}

#[tokio::test]
async fn unauthenticated_connection_is_closed() {
    let (base, _pool) = start_server().await;

    let mut ws = ws_connect(&base, "garbage").await;

    assert!(recv_json(&mut ws).await.is_none());
}

#[tokio::test]
async fn ready_carries_presence_snapshot() {
    let (base, pool) = start_server().await;
    let (alice_id, alice_token) = common::create_test_user(&pool, "alice@test.com", "alice").await;
    let (bob_id, bob_token) = common::create_test_user(&pool, "bob@test.com", "bob").await;

    let mut alice = ws_connect(&base, &alice_token).await;
    recv_event(&mut alice, "ready").await.unwrap();

    let mut bob = ws_connect(&base, &bob_token).await;
    let ready = recv_event(&mut bob, "ready").await.unwrap();

    assert_eq!(ready["userId"], bob_id);
    assert_eq!(ready["presence"][&alice_id], true);
    assert_eq!(ready["presence"][&bob_id], true);
}

#[tokio::test]
async fn connect_and_last_disconnect_push_presence() {
    let (base, pool) = start_server().await;
    let (alice_id, alice_token) = common::create_test_user(&pool, "alice@test.com", "alice").await;
    let (_, bob_token) = common::create_test_user(&pool, "bob@test.com", "bob").await;

    let mut bob = ws_connect(&base, &bob_token).await;
    recv_event(&mut bob, "ready").await.unwrap();
    drain_messages(&mut bob).await;

    let mut tab1 = ws_connect(&base, &alice_token).await;
    let online = recv_event(&mut bob, "presence").await.unwrap();
    assert_eq!(online["userId"], alice_id);
    assert_eq!(online["online"], true);

    let mut tab2 = ws_connect(&base, &alice_token).await;
    recv_event(&mut tab2, "ready").await.unwrap();
    drain_messages(&mut tab1).await;

    // Closing one of two tabs keeps her online
    tab1.close(None).await.unwrap();
    tokio::time::sleep(Duration::from_millis(200)).await;
    let msgs = drain_messages(&mut bob).await;
    assert!(!msgs.iter().any(|m| m["type"] == "presence" && m["online"] == false));

    tab2.close(None).await.unwrap();
    let offline = recv_event(&mut bob, "presence").await.unwrap();
    assert_eq!(offline["userId"], alice_id);
    assert_eq!(offline["online"], false);
}

#[tokio::test]
async fn hidden_heartbeat_goes_offline() {
    let (base, pool) = start_server().await;
    let (alice_id, alice_token) = common::create_test_user(&pool, "alice@test.com", "alice").await;
    let (_, bob_token) = common::create_test_user(&pool, "bob@test.com", "bob").await;

    let mut alice = ws_connect(&base, &alice_token).await;
    recv_event(&mut alice, "ready").await.unwrap();
    let mut bob = ws_connect(&base, &bob_token).await;
    recv_event(&mut bob, "ready").await.unwrap();
    drain_messages(&mut bob).await;

    send_json(&mut alice, &json!({"type": "heartbeat", "online": false})).await;
    let event = recv_event(&mut bob, "presence").await.unwrap();
    assert_eq!(event["userId"], alice_id);
    assert_eq!(event["online"], false);

    send_json(&mut alice, &json!({"type": "heartbeat"})).await;
    let event = recv_event(&mut bob, "presence").await.unwrap();
    assert_eq!(event["online"], true);
}

#[tokio::test]
async fn sent_message_reaches_subscriber_with_unread_count() {
    let chat = setup(LivenessPolicy::default()).await;
    let mut bob = join(&chat, &chat.bob_token).await;
    tokio::time::sleep(Duration::from_millis(20)).await;

    let (h, v) = auth_header(&chat.alice_token);
    chat.http
        .post(&format!("/api/conversations/{}/messages", chat.conversation_id))
        .add_header(h, v)
        .json(&json!({ "content": " hi bob " }))
        .await
        .assert_status_ok();

    let event = recv_event(&mut bob, "message").await.unwrap();
    assert_eq!(event["message"]["content"], "hi bob");
    assert_eq!(event["message"]["senderId"], chat.alice_id);
    assert_eq!(event["message"]["sender"]["name"], "alice");

    let unread = recv_event(&mut bob, "unread_count").await.unwrap();
    assert_eq!(unread["conversationId"], chat.conversation_id);
    assert_eq!(unread["count"], 1);

    send_json(
        &mut bob,
        &json!({"type": "mark_read", "conversationId": chat.conversation_id}),
    )
    .await;
    let unread = recv_event(&mut bob, "unread_count").await.unwrap();
    assert_eq!(unread["count"], 0);
}

#[tokio::test]
async fn first_contact_notifies_other_user() {
    let (base, pool, http) = start_server_with_http(LivenessPolicy::default()).await;
    let (alice_id, alice_token) = common::create_test_user(&pool, "alice@test.com", "alice").await;
    let (bob_id, bob_token) = common::create_test_user(&pool, "bob@test.com", "bob").await;

    let mut bob = ws_connect(&base, &bob_token).await;
    recv_event(&mut bob, "ready").await.unwrap();

    let (h, v) = auth_header(&alice_token);
    let id = http
        .post("/api/conversations")
        .add_header(h, v)
        .json(&json!({ "otherUserId": bob_id }))
        .await
        .json::<Value>()["id"]
        .clone();

    let event = recv_event(&mut bob, "conversation_created").await.unwrap();
    assert_eq!(event["conversationId"], id);
    assert_eq!(event["userId"], alice_id);
}

#[tokio::test]
async fn racing_first_contacts_notify_once() {
    let (base, pool, http) = start_server_with_http(LivenessPolicy::default()).await;
    let (alice_id, alice_token) = common::create_test_user(&pool, "alice@test.com", "alice").await;
    let (bob_id, bob_token) = common::create_test_user(&pool, "bob@test.com", "bob").await;

    let mut alice = ws_connect(&base, &alice_token).await;
    recv_event(&mut alice, "ready").await.unwrap();
    let mut bob = ws_connect(&base, &bob_token).await;
    recv_event(&mut bob, "ready").await.unwrap();

    let (ha, va) = auth_header(&alice_token);
    let (hb, vb) = auth_header(&bob_token);
    let (a, b) = tokio::join!(
        async {
            http.post("/api/conversations")
                .add_header(ha, va)
                .json(&json!({ "otherUserId": bob_id }))
                .await
        },
        async {
            http.post("/api/conversations")
                .add_header(hb, vb)
                .json(&json!({ "otherUserId": alice_id }))
                .await
        },
    );
    assert_eq!(a.json::<Value>()["id"], b.json::<Value>()["id"]);

    tokio::time::sleep(Duration::from_millis(200)).await;
    let created = [drain_messages(&mut alice).await, drain_messages(&mut bob).await]
        .iter()
        .flatten()
        .filter(|e| e["type"] == "conversation_created")
        .count();
    assert_eq!(created, 1);
}

#[tokio::test]
async fn delete_and_reactions_are_pushed() {
    let chat = setup(LivenessPolicy::default()).await;
    let mut bob = join(&chat, &chat.bob_token).await;

    let (h, v) = auth_header(&chat.alice_token);
    let message_id = chat
        .http
        .post(&format!("/api/conversations/{}/messages", chat.conversation_id))
        .add_header(h.clone(), v.clone())
        .json(&json!({ "content": "hello" }))
        .await
        .json::<Value>()["id"]
        .as_str()
        .unwrap()
        .to_string();

    chat.http
        .post(&format!("/api/messages/{}/reactions", message_id))
        .add_header(h.clone(), v.clone())
        .json(&json!({ "emoji": "👍" }))
        .await
        .assert_status_ok();
    let added = recv_event(&mut bob, "reaction_add").await.unwrap();
    assert_eq!(added["messageId"], message_id);
    assert_eq!(added["userId"], chat.alice_id);
    assert_eq!(added["emoji"], "👍");

    chat.http
        .post(&format!("/api/messages/{}/reactions", message_id))
        .add_header(h.clone(), v.clone())
        .json(&json!({ "emoji": "👍" }))
        .await
        .assert_status_ok();
    assert!(recv_event(&mut bob, "reaction_remove").await.is_some());

    chat.http
        .delete(&format!("/api/messages/{}", message_id))
        .add_header(h, v)
        .await
        .assert_status(axum::http::StatusCode::NO_CONTENT);
    let deleted = recv_event(&mut bob, "message_delete").await.unwrap();
    assert_eq!(deleted["messageId"], message_id);
    assert_eq!(deleted["conversationId"], chat.conversation_id);
}

#[tokio::test]
async fn joining_foreign_conversation_is_refused() {
    let chat = setup(LivenessPolicy::default()).await;

    let mut bob = ws_connect(&chat.base, &chat.bob_token).await;
    recv_event(&mut bob, "ready").await.unwrap();

    send_json(
        &mut bob,
        &json!({"type": "join_conversation", "conversationId": "not-a-conversation"}),
    )
    .await;
    let error = recv_event(&mut bob, "error").await.unwrap();
    assert_eq!(error["message"], "Conversation not found");

    send_json(
        &mut bob,
        &json!({"type": "typing", "conversationId": "not-a-conversation", "active": true}),
    )
    .await;
    assert!(recv_event(&mut bob, "error").await.is_some());
}

#[tokio::test]
async fn keystroke_burst_shows_typing_until_debounce_stop() {
    let policy = LivenessPolicy::default();
    let chat = setup(policy).await;
    let mut alice = join(&chat, &chat.alice_token).await;
    let mut bob = join(&chat, &chat.bob_token).await;

    let mut debouncer = TypingDebouncer::new(policy.typing_debounce_ms);
    let start = Instant::now();

    // Keystrokes at 0, 200 and 400ms
    for i in 0..3 {
        if i > 0 {
            tokio::time::sleep(Duration::from_millis(200)).await;
        }
        let signal = debouncer.keystroke(now_ms());
        send_json(
            &mut alice,
            &json!({"type": "typing", "conversationId": chat.conversation_id, "active": signal.is_typing()}),
        )
        .await;
        let event = recv_event(&mut bob, "typing").await.unwrap();
        assert_eq!(event["typers"][0]["user"]["id"], chat.alice_id);
    }

    // Client-side idle timer sends the stop
    loop {
        if let Some(signal) = debouncer.poll(now_ms()) {
            send_json(
                &mut alice,
                &json!({"type": "typing", "conversationId": chat.conversation_id, "active": signal.is_typing()}),
            )
            .await;
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    let stopped = recv_event(&mut bob, "typing").await.unwrap();
    let elapsed = start.elapsed();
    assert_eq!(stopped["typers"], json!([]));
    assert!(elapsed >= Duration::from_millis(1_350), "stopped after {:?}", elapsed);
    assert!(elapsed < Duration::from_millis(2_500), "stopped after {:?}", elapsed);
}

#[tokio::test]
async fn vanished_typist_drops_out_after_cutoff() {
    let policy = LivenessPolicy::new(1_000, 2_000, 100, 300).unwrap();
    let chat = setup(policy).await;
    let mut alice = join(&chat, &chat.alice_token).await;
    let mut bob = join(&chat, &chat.bob_token).await;

    send_json(
        &mut alice,
        &json!({"type": "typing", "conversationId": chat.conversation_id, "active": true}),
    )
    .await;
    let start = Instant::now();
    let typing = recv_event(&mut bob, "typing").await.unwrap();
    assert_eq!(typing["typers"].as_array().unwrap().len(), 1);

    // No stop signal ever arrives
    let expired = recv_event(&mut bob, "typing").await.unwrap();
    assert_eq!(expired["typers"], json!([]));
    assert!(start.elapsed() >= Duration::from_millis(250));
}

#[tokio::test]
async fn disconnect_clears_typing() {
    let chat = setup(LivenessPolicy::default()).await;
    let mut alice = join(&chat, &chat.alice_token).await;
    let mut bob = join(&chat, &chat.bob_token).await;

    send_json(
        &mut alice,
        &json!({"type": "typing", "conversationId": chat.conversation_id, "active": true}),
    )
    .await;
    recv_event(&mut bob, "typing").await.unwrap();

    alice.close(None).await.unwrap();
    let cleared = recv_event(&mut bob, "typing").await.unwrap();
    assert_eq!(cleared["typers"], json!([]));

    let (h, v) = auth_header(&chat.bob_token);
    let typers: Vec<Value> = chat
        .http
        .get(&format!("/api/conversations/{}/typing", chat.conversation_id))
        .add_header(h, v)
        .await
        .json();
    assert!(typers.is_empty());
}
