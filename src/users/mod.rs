//! # Users Module
//!
//! Password registration and login, logout, and the current-user view.
//! Also owns the user store, including provider identity linking used by
//! the OAuth callback.

pub mod handlers;
pub mod models;
pub mod password;
pub mod routes;
pub mod services;
pub mod validators;

#[cfg(test)]
mod tests;

pub use models::User;
pub use routes::users_routes;
pub use services::UsersService;
