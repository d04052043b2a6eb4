//! # Auth Module
//!
//! This module handles authentication:
//! - Signed token issuance and verification
//! - Token extraction from the `access_token` cookie or a bearer header
//! - AuthedUser extractor for protected routes
//! - Google OAuth sign-in

pub mod cookies;
pub mod extractors;
pub mod handlers;
pub mod oauth;
pub mod routes;
pub mod tokens;


pub use extractors::AuthedUser;
pub use routes::auth_routes;
