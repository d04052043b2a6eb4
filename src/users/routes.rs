use axum::{
    routing::{get, post},
    Router,
};

use super::handlers;

/// Creates the users router
///
/// # Routes
/// - `POST /users/register`
/// - `POST /users/login`
/// - `POST /users/logout`
/// - `GET /users/me` (authenticated)
pub fn users_routes() -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/users/register", post(handlers::register))
        .route("/users/login", post(handlers::login))
        .route("/users/logout", post(handlers::logout))
        .route("/users/me", get(handlers::me))
}
