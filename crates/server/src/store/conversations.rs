use sqlx::SqlitePool;

use crate::models::{canonical_pair, Conversation};

pub async fn find(db: &SqlitePool, conversation_id: &str) -> Result<Option<Conversation>, sqlx::Error> {
    sqlx::query_as::<_, Conversation>(
        "SELECT id, user_low_id, user_high_id, created_at FROM conversations WHERE id = ?",
    )
    .bind(conversation_id)
    .fetch_optional(db)
    .await
}

/// The conversation only if `user_id` takes part in it.
pub async fn find_for_participant(
    db: &SqlitePool,
    conversation_id: &str,
    user_id: &str,
) -> Result<Option<Conversation>, sqlx::Error> {
    Ok(find(db, conversation_id)
        .await?
        .filter(|c| c.has_participant(user_id)))
}

pub async fn find_between(
    db: &SqlitePool,
    user_a: &str,
    user_b: &str,
) -> Result<Option<Conversation>, sqlx::Error> {
    let (low, high) = canonical_pair(user_a, user_b);
    sqlx::query_as::<_, Conversation>(
        "SELECT id, user_low_id, user_high_id, created_at FROM conversations WHERE user_low_id = ? AND user_high_id = ?",
    )
    .bind(low)
    .bind(high)
    .fetch_optional(db)
    .await
}

/// Insert-if-absent on the sorted pair. The UNIQUE constraint makes two
/// concurrent first contacts converge on the same row; exactly one of them
/// gets `true` back as the creator.
pub async fn get_or_create(
    db: &SqlitePool,
    user_a: &str,
    user_b: &str,
    now: i64,
) -> Result<(Conversation, bool), sqlx::Error> {
    let (low, high) = canonical_pair(user_a, user_b);
    let id = uuid::Uuid::new_v4().to_string();

    let inserted = sqlx::query(
        r#"INSERT INTO conversations (id, user_low_id, user_high_id, created_at)
           VALUES (?, ?, ?, ?)
           ON CONFLICT(user_low_id, user_high_id) DO NOTHING"#,
    )
    .bind(&id)
    .bind(low)
    .bind(high)
    .bind(now)
    .execute(db)
    .await?
    .rows_affected()
        > 0;

    if inserted {
        tracing::debug!("Created conversation {} between {} and {}", id, low, high);
    }

    let conversation = find_between(db, low, high)
        .await?
        .ok_or(sqlx::Error::RowNotFound)?;
    Ok((conversation, inserted))
}

pub async fn for_user(db: &SqlitePool, user_id: &str) -> Result<Vec<Conversation>, sqlx::Error> {
    sqlx::query_as::<_, Conversation>(
        "SELECT id, user_low_id, user_high_id, created_at FROM conversations WHERE user_low_id = ? OR user_high_id = ?",
    )
    .bind(user_id)
    .bind(user_id)
    .fetch_all(db)
    .await
}
