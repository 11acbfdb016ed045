use sqlx::SqlitePool;

use crate::models::{PublicUser, User};

const USER_COLUMNS: &str = "id, external_id, name, email, image_url, created_at, updated_at";

/// Create the user on first login and refresh the mirrored profile on every
/// later one. Keyed by the provider's subject id.
pub async fn upsert_by_external_id(
    db: &SqlitePool,
    external_id: &str,
    name: &str,
    email: &str,
    image_url: Option<&str>,
    now: i64,
) -> Result<User, sqlx::Error> {
    sqlx::query(
        r#"INSERT INTO "users" (id, external_id, name, email, image_url, created_at, updated_at)
           VALUES (?, ?, ?, ?, ?, ?, ?)
           ON CONFLICT(external_id) DO UPDATE SET
               name = excluded.name,
               email = excluded.email,
               image_url = excluded.image_url,
               updated_at = excluded.updated_at"#,
    )
    .bind(uuid::Uuid::new_v4().to_string())
    .bind(external_id)
    .bind(name)
    .bind(email)
    .bind(image_url)
    .bind(now)
    .bind(now)
    .execute(db)
    .await?;

    sqlx::query_as::<_, User>(&format!(
        r#"SELECT {} FROM "users" WHERE external_id = ?"#,
        USER_COLUMNS
    ))
    .bind(external_id)
    .fetch_one(db)
    .await
}

pub async fn find(db: &SqlitePool, user_id: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!(r#"SELECT {} FROM "users" WHERE id = ?"#, USER_COLUMNS))
        .bind(user_id)
        .fetch_optional(db)
        .await
}

pub async fn find_public(db: &SqlitePool, user_id: &str) -> Result<Option<PublicUser>, sqlx::Error> {
    sqlx::query_as::<_, PublicUser>(r#"SELECT id, name, image_url FROM "users" WHERE id = ?"#)
        .bind(user_id)
        .fetch_optional(db)
        .await
}

/// `LIKE` pattern matching `query` as a literal substring.
fn contains_pattern(query: &str) -> String {
    let mut pattern = String::with_capacity(query.len() + 2);
    pattern.push('%');
    for c in query.to_lowercase().chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// Everyone but the caller, optionally filtered by a case-insensitive match
/// on name or email.
pub async fn search(
    db: &SqlitePool,
    exclude_user_id: &str,
    query: Option<&str>,
) -> Result<Vec<PublicUser>, sqlx::Error> {
    let pattern = match query.map(str::trim).filter(|q| !q.is_empty()) {
        Some(q) => contains_pattern(q),
        None => "%".to_string(),
    };

    sqlx::query_as::<_, PublicUser>(
        r#"SELECT id, name, image_url FROM "users"
           WHERE id != ? AND (LOWER(name) LIKE ? ESCAPE '\' OR LOWER(email) LIKE ? ESCAPE '\')
           ORDER BY name COLLATE NOCASE ASC"#,
    )
    .bind(exclude_user_id)
    .bind(&pattern)
    .bind(&pattern)
    .fetch_all(db)
    .await
}
