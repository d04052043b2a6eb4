//! # Brandbooks Module
//!
//! Owner-scoped brandbooks with their items (logos, fonts, colours, merch)
//! and attached files.

pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;
pub mod validators;


pub use routes::brandbooks_routes;
pub use services::BrandbooksService;
