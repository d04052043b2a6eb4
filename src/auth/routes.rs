//! Authentication routes

use axum::{routing::get, Router};

use super::handlers;

/// Creates and returns the OAuth router
///
/// # Routes
/// - `GET /auth/google/login` - Redirect to Google
/// - `GET /auth/google/callback` - Complete sign-in and set the session cookie
pub fn auth_routes() -> Router {
    Router::new()
        .route("/auth/google/login", get(handlers::google_login))
        .route("/auth/google/callback", get(handlers::google_callback))
}
