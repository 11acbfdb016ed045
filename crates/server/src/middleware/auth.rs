use axum::{
    extract::{FromRequestParts, OptionalFromRequestParts},
    http::{request::Parts, HeaderMap},
};
use axum_extra::extract::CookieJar;
use axum_extra::headers::{authorization::Bearer, Authorization, HeaderMapExt};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use std::convert::Infallible;
use std::sync::Arc;

use crate::config::Config;
use crate::error::ApiError;
use crate::models::{AuthUser, Identity};
use crate::AppState;

/// Cookie the identity provider sets on the browser session.
pub const SESSION_COOKIE: &str = "__session";

#[derive(Debug, Deserialize)]
struct Claims {
    sub: String,
}

/// Pull the session token from the `Authorization: Bearer` header, falling
/// back to the session cookie.
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    if let Some(Authorization(bearer)) = headers.typed_get::<Authorization<Bearer>>() {
        return Some(bearer.token().to_string());
    }
    CookieJar::from_headers(headers)
        .get(SESSION_COOKIE)
        .map(|c| c.value().to_string())
        .filter(|t| !t.is_empty())
}

/// Verify a provider-issued token and return the subject it was issued for.
pub fn verify_token(config: &Config, token: &str) -> Option<Identity> {
    let mut validation = Validation::new(Algorithm::HS256);
    if let Some(issuer) = &config.auth_issuer {
        validation.set_issuer(&[issuer]);
    }

    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.auth_secret.as_bytes()),
        &validation,
    )
    .map_err(|e| tracing::debug!("Rejected session token: {}", e))
    .ok()?;

    if data.claims.sub.is_empty() {
        return None;
    }
    Some(Identity {
        subject: data.claims.sub,
    })
}

/// Resolve a verified identity to its user record. `None` until the user has
/// synced their profile at least once.
pub async fn lookup_user(
    db: &sqlx::SqlitePool,
    identity: &Identity,
) -> Result<Option<AuthUser>, sqlx::Error> {
    sqlx::query_as::<_, (String, String)>(r#"SELECT id, name FROM "users" WHERE external_id = ?"#)
        .bind(&identity.subject)
        .fetch_optional(db)
        .await
        .map(|row| row.map(|(id, name)| AuthUser { id, name }))
}

impl FromRequestParts<Arc<AppState>> for Identity {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        session_token(&parts.headers)
            .and_then(|token| verify_token(&state.config, &token))
            .ok_or(ApiError::Unauthenticated)
    }
}

impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let identity = Identity::from_request_parts(parts, state).await?;
        lookup_user(&state.db, &identity)
            .await?
            .ok_or(ApiError::NotFound("User"))
    }
}

/// Queries fail closed: a missing or unknown identity, or a failed lookup,
/// yields `None` instead of a rejection, so handlers can answer with an empty
/// default.
impl OptionalFromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Option<Self>, Self::Rejection> {
        let identity = match session_token(&parts.headers)
            .and_then(|token| verify_token(&state.config, &token))
        {
            Some(identity) => identity,
            None => return Ok(None),
        };
        match lookup_user(&state.db, &identity).await {
            Ok(user) => Ok(user),
            Err(e) => {
                tracing::error!("Failed to resolve {}: {:?}", identity.subject, e);
                Ok(None)
            }
        }
    }
}
