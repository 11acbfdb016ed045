use pairchat_shared::liveness::LivenessPolicy;
use sqlx::SqlitePool;
use std::collections::HashMap;

use crate::models::PresenceRecord;

/// Upsert the user's presence record. The timestamp is refreshed whatever
/// the flag says, so an explicit offline is also a fresh sighting.
pub async fn set_online(
    db: &SqlitePool,
    user_id: &str,
    online: bool,
    now: i64,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"INSERT INTO presence (user_id, is_online, last_seen) VALUES (?, ?, ?)
           ON CONFLICT(user_id) DO UPDATE SET is_online = excluded.is_online, last_seen = excluded.last_seen"#,
    )
    .bind(user_id)
    .bind(online)
    .bind(now)
    .execute(db)
    .await?;
    Ok(())
}

pub async fn get(db: &SqlitePool, user_id: &str) -> Result<Option<PresenceRecord>, sqlx::Error> {
    sqlx::query_as::<_, PresenceRecord>(
        "SELECT user_id, is_online, last_seen FROM presence WHERE user_id = ?",
    )
    .bind(user_id)
    .fetch_optional(db)
    .await
}

/// No record means the user has never been seen, which reads as offline.
pub async fn is_online(
    db: &SqlitePool,
    policy: &LivenessPolicy,
    user_id: &str,
    now: i64,
) -> Result<bool, sqlx::Error> {
    Ok(get(db, user_id)
        .await?
        .map(|p| policy.is_online(p.is_online, p.last_seen, now))
        .unwrap_or(false))
}

pub async fn all(
    db: &SqlitePool,
    policy: &LivenessPolicy,
    now: i64,
) -> Result<HashMap<String, bool>, sqlx::Error> {
    let records = sqlx::query_as::<_, PresenceRecord>(
        "SELECT user_id, is_online, last_seen FROM presence",
    )
    .fetch_all(db)
    .await?;

    Ok(records
        .into_iter()
        .map(|p| {
            let online = policy.is_online(p.is_online, p.last_seen, now);
            (p.user_id, online)
        })
        .collect())
}
