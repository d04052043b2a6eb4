//! Google sign-in handlers

use axum::{
    extract::{Extension, Query},
    http::{header::SET_COOKIE, HeaderMap},
    response::{AppendHeaders, IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{error, info, warn};

use super::cookies::{
    access_token_cookie, clear_oauth_state_cookie, oauth_state_cookie, read_cookie,
    OAUTH_STATE_COOKIE,
};
use super::oauth::{decode_state, encode_state, safe_redirect_target};
use crate::common::{generate_raw_id, safe_email_log, ApiError, AppState};
use crate::services::{IdentityProvider, OAuthError};
use crate::users::UsersService;

const STATE_NONCE_LENGTH: usize = 32;

#[derive(Debug, Deserialize)]
pub struct OAuthLoginParams {
    /// Relative path to land on after sign-in
    pub next: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct OAuthCallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

fn configured_provider(state: &AppState) -> Result<Arc<dyn IdentityProvider>, ApiError> {
    state
        .identity_provider
        .clone()
        .ok_or_else(|| ApiError::ServiceUnavailable("Google OAuth is not configured".to_string()))
}

/// GET /auth/google/login - Start Google OAuth flow
/// Redirects the user-agent to Google's authorization page
pub async fn google_login(
    Extension(state): Extension<Arc<AppState>>,
    Query(params): Query<OAuthLoginParams>,
) -> Result<Response, ApiError> {
    let provider = configured_provider(&state)?;

    let nonce = generate_raw_id(STATE_NONCE_LENGTH);
    let oauth_state = encode_state(&nonce, params.next.as_deref());
    let auth_url = provider.authorization_url(&oauth_state);

    info!(provider = provider.name(), "Redirecting to identity provider");

    Ok((
        AppendHeaders([(
            SET_COOKIE,
            oauth_state_cookie(&nonce, state.config.cookie_secure),
        )]),
        Redirect::to(&auth_url),
    )
        .into_response())
}

/// GET /auth/google/callback - Handle OAuth callback from Google
/// Finds or creates the user, sets the session cookie and redirects
pub async fn google_callback(
    Extension(state): Extension<Arc<AppState>>,
    headers: HeaderMap,
    Query(params): Query<OAuthCallbackParams>,
) -> Result<Response, ApiError> {
    let (token, target) = complete_sign_in(&state, &headers, params)
        .await
        .map_err(into_callback_error)?;

    let secure = state.config.cookie_secure;
    Ok((
        AppendHeaders([
            (
                SET_COOKIE,
                access_token_cookie(&token, state.tokens.ttl_seconds(), secure),
            ),
            (SET_COOKIE, clear_oauth_state_cookie(secure)),
        ]),
        Redirect::to(&target),
    )
        .into_response())
}

/// Returns the issued token and the sanitized landing path
async fn complete_sign_in(
    state: &AppState,
    headers: &HeaderMap,
    params: OAuthCallbackParams,
) -> Result<(String, String), ApiError> {
    let provider = configured_provider(state)?;

    if let Some(provider_error) = params.error {
        let detail = match params.error_description {
            Some(description) => format!("{}: {}", provider_error, description),
            None => provider_error,
        };
        let e = OAuthError::ProviderError(detail);
        warn!(error = %e, "Identity provider returned an error");
        return Err(ApiError::OAuthExchangeFailed(format!(
            "Google auth failed: {}",
            e
        )));
    }

    let code = params
        .code
        .filter(|c| !c.trim().is_empty())
        .ok_or_else(|| ApiError::OAuthExchangeFailed("No authorization code provided".to_string()))?;

    let oauth_state = params
        .state
        .as_deref()
        .map(decode_state)
        .ok_or_else(|| ApiError::OAuthExchangeFailed("Missing state parameter".to_string()))?;

    let expected_nonce = read_cookie(headers, OAUTH_STATE_COOKIE);
    if expected_nonce.as_deref() != Some(oauth_state.nonce.as_str()) {
        warn!("OAuth state does not match the state cookie");
        return Err(ApiError::OAuthExchangeFailed(
            "OAuth state mismatch".to_string(),
        ));
    }

    let profile = provider.exchange_code(&code).await.map_err(|e| {
        error!(error = %e, "Failed to exchange authorization code");
        ApiError::OAuthExchangeFailed(format!("Google auth failed: {}", e))
    })?;

    let user = UsersService::new(state.db.clone())
        .resolve_provider_identity(provider.name(), &profile)
        .await?;

    let token = state.tokens.issue(&user.id)?;
    let target = safe_redirect_target(
        oauth_state.next.as_deref(),
        &state.config.login_redirect_path,
    );

    info!(
        user_id = %user.id,
        email = %safe_email_log(&user.email),
        provider = provider.name(),
        "User authentication successful via OAuth"
    );

    Ok((token, target))
}

/// Anything unexpected inside the callback is reported as a failed exchange
fn into_callback_error(e: ApiError) -> ApiError {
    match e {
        ApiError::OAuthExchangeFailed(_)
        | ApiError::DuplicateEmail
        | ApiError::Conflict(_)
        | ApiError::ServiceUnavailable(_) => e,
        other => {
            error!(error = %other, "Unexpected failure during OAuth callback");
            ApiError::OAuthExchangeFailed(format!("Google auth failed: {}", other))
        }
    }
}
