// src/services/mod.rs
//
// Integrations with systems outside the process

pub mod google;
pub mod identity;

// Re-export commonly used types for convenience
pub use google::GoogleProvider;
pub use identity::{IdentityProvider, OAuthError, ProviderProfile};
