//! Registration, login, logout and profile handlers

use axum::{
    extract::{Extension, Json},
    http::{header::SET_COOKIE, StatusCode},
    response::{AppendHeaders, IntoResponse},
};
use std::sync::Arc;
use tracing::info;

use super::models::{LoginRequest, MeResponse, MessageResponse, RegisterRequest, TokenResponse, UserResponse};
use super::services::UsersService;
use crate::auth::cookies::{access_token_cookie, clear_access_token_cookie};
use crate::auth::AuthedUser;
use crate::common::{safe_email_log, ApiError, AppState};

/// POST /users/register
///
/// # Request Body
/// ```json
/// { "first_name": "A", "last_name": "B", "email": "a@b.com", "password": "longenough1" }
/// ```
///
/// Responds 201 with `{id, first_name, last_name, email}`.
pub async fn register(
    Extension(state): Extension<Arc<AppState>>,
    Json(request): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user = UsersService::new(state.db.clone())
        .register(request, state.config.bcrypt_cost)
        .await?;

    Ok((StatusCode::CREATED, Json(UserResponse::from(&user))))
}

/// POST /users/login
///
/// Sets the `access_token` cookie and returns the same token in the body.
pub async fn login(
    Extension(state): Extension<Arc<AppState>>,
    Json(request): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user = UsersService::new(state.db.clone())
        .authenticate(&request.email, &request.password, state.config.bcrypt_cost)
        .await?;

    let token = state.tokens.issue(&user.id)?;
    let cookie = access_token_cookie(&token, state.tokens.ttl_seconds(), state.config.cookie_secure);

    info!(
        user_id = %user.id,
        email = %safe_email_log(&user.email),
        "User login successful"
    );

    Ok((
        AppendHeaders([(SET_COOKIE, cookie)]),
        Json(TokenResponse::bearer(token)),
    ))
}

/// POST /users/logout
///
/// Clears the cookie. Tokens are stateless, so a copy of the token taken
/// before logout stays valid until it expires.
pub async fn logout(Extension(state): Extension<Arc<AppState>>) -> impl IntoResponse {
    info!("User logout");
    (
        AppendHeaders([(SET_COOKIE, clear_access_token_cookie(state.config.cookie_secure))]),
        Json(MessageResponse {
            message: "Logout successful".to_string(),
        }),
    )
}

/// GET /users/me
pub async fn me(AuthedUser(user): AuthedUser) -> Json<MeResponse> {
    Json(MeResponse::from(&user))
}

/// GET /
pub async fn root() -> Json<MessageResponse> {
    Json(MessageResponse {
        message: "Welcome to Brandbook API".to_string(),
    })
}
