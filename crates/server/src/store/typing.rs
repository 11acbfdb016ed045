use pairchat_shared::liveness::LivenessPolicy;
use sqlx::SqlitePool;

use crate::models::{PublicUser, TypingUser};

/// `true` upserts the caller's record with `now`; `false` deletes it.
/// Deleting a missing record is a no-op.
pub async fn set_typing(
    db: &SqlitePool,
    conversation_id: &str,
    user_id: &str,
    is_typing: bool,
    now: i64,
) -> Result<(), sqlx::Error> {
    if is_typing {
        sqlx::query(
            r#"INSERT INTO typing (conversation_id, user_id, last_typed_at) VALUES (?, ?, ?)
               ON CONFLICT(conversation_id, user_id) DO UPDATE SET last_typed_at = excluded.last_typed_at"#,
        )
        .bind(conversation_id)
        .bind(user_id)
        .bind(now)
        .execute(db)
        .await?;
    } else {
        sqlx::query("DELETE FROM typing WHERE conversation_id = ? AND user_id = ?")
            .bind(conversation_id)
            .bind(user_id)
            .execute(db)
            .await?;
    }
    Ok(())
}

/// Users currently typing in the conversation, oldest keystroke first.
/// Records past the liveness cutoff are skipped even if never deleted.
pub async fn typers(
    db: &SqlitePool,
    policy: &LivenessPolicy,
    conversation_id: &str,
    exclude_user: Option<&str>,
    now: i64,
) -> Result<Vec<TypingUser>, sqlx::Error> {
    let rows = sqlx::query_as::<_, (i64, String, String, Option<String>)>(
        r#"SELECT t.last_typed_at, u.id, u.name, u.image_url
           FROM typing t
           JOIN "users" u ON u.id = t.user_id
           WHERE t.conversation_id = ?
           ORDER BY t.last_typed_at ASC"#,
    )
    .bind(conversation_id)
    .fetch_all(db)
    .await?;

    Ok(rows
        .into_iter()
        .filter(|(last_typed_at, id, _, _)| {
            policy.is_typing(*last_typed_at, now) && Some(id.as_str()) != exclude_user
        })
        .map(|(last_typed_at, id, name, image_url)| TypingUser {
            user: PublicUser { id, name, image_url },
            last_typed_at,
        })
        .collect())
}

/// Remove every typing record held by `user_id` and return the affected
/// conversations.
pub async fn clear_user(db: &SqlitePool, user_id: &str) -> Result<Vec<String>, sqlx::Error> {
    let conversations = sqlx::query_scalar::<_, String>(
        "SELECT conversation_id FROM typing WHERE user_id = ?",
    )
    .bind(user_id)
    .fetch_all(db)
    .await?;

    if !conversations.is_empty() {
        sqlx::query("DELETE FROM typing WHERE user_id = ?")
            .bind(user_id)
            .execute(db)
            .await?;
    }
    Ok(conversations)
}

/// Delete records that can no longer be shown to anyone.
pub async fn sweep_stale(
    db: &SqlitePool,
    policy: &LivenessPolicy,
    now: i64,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM typing WHERE last_typed_at <= ?")
        .bind(policy.typing_cutoff(now))
        .execute(db)
        .await?;
    Ok(result.rows_affected())
}
