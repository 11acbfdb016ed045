use pairchat_shared::liveness::is_unread;
use sqlx::SqlitePool;

use crate::models::ReadRecord;

pub async fn mark_read(
    db: &SqlitePool,
    conversation_id: &str,
    user_id: &str,
    now: i64,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"INSERT INTO conversation_reads (conversation_id, user_id, last_read_at) VALUES (?, ?, ?)
           ON CONFLICT(conversation_id, user_id) DO UPDATE SET last_read_at = excluded.last_read_at"#,
    )
    .bind(conversation_id)
    .bind(user_id)
    .bind(now)
    .execute(db)
    .await?;
    Ok(())
}

pub async fn get(
    db: &SqlitePool,
    conversation_id: &str,
    user_id: &str,
) -> Result<Option<ReadRecord>, sqlx::Error> {
    sqlx::query_as::<_, ReadRecord>(
        "SELECT conversation_id, user_id, last_read_at FROM conversation_reads WHERE conversation_id = ? AND user_id = ?",
    )
    .bind(conversation_id)
    .bind(user_id)
    .fetch_optional(db)
    .await
}

/// Recomputed from the full message log on every call, so it always agrees
/// with the messages a reader would see.
pub async fn unread_count(
    db: &SqlitePool,
    conversation_id: &str,
    user_id: &str,
) -> Result<i64, sqlx::Error> {
    let last_read = get(db, conversation_id, user_id)
        .await?
        .map(|r| r.last_read_at);

    let messages = sqlx::query_as::<_, (i64, String)>(
        "SELECT created_at, sender_id FROM messages WHERE conversation_id = ?",
    )
    .bind(conversation_id)
    .fetch_all(db)
    .await?;

    Ok(messages
        .iter()
        .filter(|(created_at, sender_id)| is_unread(*created_at, sender_id, last_read, user_id))
        .count() as i64)
}
