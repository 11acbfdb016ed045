use sqlx::SqlitePool;

use crate::models::{Message, MessageWithSender, PublicUser};

const MESSAGE_COLUMNS: &str = "id, conversation_id, sender_id, content, created_at, is_deleted";

pub async fn find(db: &SqlitePool, message_id: &str) -> Result<Option<Message>, sqlx::Error> {
    sqlx::query_as::<_, Message>(&format!(
        "SELECT {} FROM messages WHERE id = ?",
        MESSAGE_COLUMNS
    ))
    .bind(message_id)
    .fetch_optional(db)
    .await
}

pub async fn insert(
    db: &SqlitePool,
    conversation_id: &str,
    sender_id: &str,
    content: &str,
    now: i64,
) -> Result<Message, sqlx::Error> {
    let message = Message {
        id: uuid::Uuid::new_v4().to_string(),
        conversation_id: conversation_id.to_string(),
        sender_id: sender_id.to_string(),
        content: content.to_string(),
        created_at: now,
        is_deleted: false,
    };

    sqlx::query(
        "INSERT INTO messages (id, conversation_id, sender_id, content, created_at, is_deleted) VALUES (?, ?, ?, ?, ?, 0)",
    )
    .bind(&message.id)
    .bind(&message.conversation_id)
    .bind(&message.sender_id)
    .bind(&message.content)
    .bind(message.created_at)
    .execute(db)
    .await?;

    Ok(message)
}

/// Whole history oldest-first with sender profiles. Deleted content is
/// replaced before it leaves the store.
pub async fn list_with_senders(
    db: &SqlitePool,
    conversation_id: &str,
) -> Result<Vec<MessageWithSender>, sqlx::Error> {
    let rows = sqlx::query_as::<_, (String, String, String, String, i64, bool, Option<String>, Option<String>)>(
        r#"SELECT m.id, m.conversation_id, m.sender_id, m.content, m.created_at, m.is_deleted, u.name, u.image_url
           FROM messages m
           LEFT JOIN "users" u ON u.id = m.sender_id
           WHERE m.conversation_id = ?
           ORDER BY m.created_at ASC, m.rowid ASC"#,
    )
    .bind(conversation_id)
    .fetch_all(db)
    .await?;

    Ok(rows
        .into_iter()
        .map(|(id, conversation_id, sender_id, content, created_at, is_deleted, name, image_url)| {
            let sender = name.map(|name| PublicUser {
                id: sender_id.clone(),
                name,
                image_url,
            });
            MessageWithSender {
                message: Message {
                    id,
                    conversation_id,
                    sender_id,
                    content,
                    created_at,
                    is_deleted,
                }
                .redacted(),
                sender,
            }
        })
        .collect())
}

pub async fn latest(db: &SqlitePool, conversation_id: &str) -> Result<Option<Message>, sqlx::Error> {
    let message = sqlx::query_as::<_, Message>(&format!(
        "SELECT {} FROM messages WHERE conversation_id = ? ORDER BY created_at DESC, rowid DESC LIMIT 1",
        MESSAGE_COLUMNS
    ))
    .bind(conversation_id)
    .fetch_optional(db)
    .await?;
    Ok(message.map(Message::redacted))
}

pub async fn soft_delete(db: &SqlitePool, message_id: &str) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE messages SET is_deleted = 1 WHERE id = ?")
        .bind(message_id)
        .execute(db)
        .await?;
    Ok(())
}
