//! Authentication extractors for Axum

use async_trait::async_trait;
use axum::{
    extract::{Extension, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};
use std::sync::Arc;
use tracing::{debug, warn};

use super::cookies::{read_cookie, ACCESS_TOKEN_COOKIE};
use crate::common::{is_valid_id, safe_email_log, safe_token_log, ApiError, AppState, EntityPrefix};
use crate::users::{User, UsersService};

/// Authenticated user extractor
///
/// Verifies the token on every request and loads the user it names. There
/// is no caching between requests.
#[derive(Debug, Clone)]
pub struct AuthedUser(pub User);

#[async_trait]
impl<S> FromRequestParts<S> for AuthedUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Extension(app_state): Extension<Arc<AppState>> =
            Extension::from_request_parts(parts, state)
                .await
                .map_err(|_| ApiError::InternalServer("missing app state".to_string()))?;

        resolve_user(&app_state, &parts.headers).await.map(AuthedUser)
    }
}

/// Token from the `access_token` cookie, else from `Authorization: Bearer`
pub fn extract_token(headers: &HeaderMap) -> Option<String> {
    if let Some(token) = read_cookie(headers, ACCESS_TOKEN_COOKIE) {
        return Some(token);
    }

    let header = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = header.trim().split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then(|| token.to_string())
}

/// Resolves the request's credentials to a stored user
pub async fn resolve_user(state: &AppState, headers: &HeaderMap) -> Result<User, ApiError> {
    let token = extract_token(headers).ok_or_else(|| {
        debug!("Authentication failed: no access token cookie or bearer header");
        ApiError::AuthenticationMissing
    })?;

    let claims = state.tokens.verify(&token)?;

    if !is_valid_id(EntityPrefix::User, &claims.sub) {
        warn!(
            token = %safe_token_log(&token),
            "Authentication failed: token subject is not a user id"
        );
        return Err(ApiError::InvalidToken);
    }

    match UsersService::new(state.db.clone()).find_by_id(&claims.sub).await? {
        Some(user) => {
            debug!(
                user_id = %user.id,
                email = %safe_email_log(&user.email),
                "User authentication successful via extractor"
            );
            Ok(user)
        }
        None => {
            warn!(user_id = %claims.sub, "Authentication failed: user not found in database");
            Err(ApiError::UserNotFound)
        }
    }
}
