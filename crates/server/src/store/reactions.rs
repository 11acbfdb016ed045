use sqlx::SqlitePool;

use crate::models::Reaction;

/// Remove the reaction if present, otherwise add it. Returns `true` when the
/// reaction now exists.
pub async fn toggle(
    db: &SqlitePool,
    message_id: &str,
    user_id: &str,
    emoji: &str,
    now: i64,
) -> Result<bool, sqlx::Error> {
    let removed = sqlx::query(
        "DELETE FROM reactions WHERE message_id = ? AND user_id = ? AND emoji = ?",
    )
    .bind(message_id)
    .bind(user_id)
    .bind(emoji)
    .execute(db)
    .await?
    .rows_affected();

    if removed > 0 {
        return Ok(false);
    }

    sqlx::query(
        r#"INSERT INTO reactions (id, message_id, user_id, emoji, created_at) VALUES (?, ?, ?, ?, ?)
           ON CONFLICT(message_id, user_id, emoji) DO NOTHING"#,
    )
    .bind(uuid::Uuid::new_v4().to_string())
    .bind(message_id)
    .bind(user_id)
    .bind(emoji)
    .bind(now)
    .execute(db)
    .await?;
    Ok(true)
}

pub async fn for_message(db: &SqlitePool, message_id: &str) -> Result<Vec<Reaction>, sqlx::Error> {
    sqlx::query_as::<_, Reaction>(
        "SELECT id, message_id, user_id, emoji, created_at FROM reactions WHERE message_id = ? ORDER BY created_at ASC, rowid ASC",
    )
    .bind(message_id)
    .fetch_all(db)
    .await
}
