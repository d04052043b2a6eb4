// src/services/identity.rs
//! External identity provider seam used by the OAuth bridge.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OAuthError {
    #[error("provider returned an error: {0}")]
    ProviderError(String),

    #[error("HTTP request failed: {0}")]
    RequestFailed(String),

    #[error("code exchange rejected: {0}")]
    ExchangeRejected(String),

    #[error("provider did not respond within {0} seconds")]
    Timeout(u64),

    #[error("could not parse provider response: {0}")]
    SerializationError(String),
}

/// Provider profile normalized to the fields the user store cares about
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProviderProfile {
    /// Stable provider-assigned identifier (`sub`)
    pub subject: String,
    pub email: Option<String>,
    pub given_name: Option<String>,
    pub family_name: Option<String>,
    pub picture: Option<String>,
}

/// An OAuth 2.0 / OpenID Connect identity provider.
///
/// Implementations are constructed explicitly and handed to `AppState`,
/// so tests can swap in a fake.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Short provider name stored in `users.provider`
    fn name(&self) -> &'static str;

    /// Authorization URL the user-agent is redirected to. `state` is echoed
    /// back on the callback.
    fn authorization_url(&self, state: &str) -> String;

    /// Exchanges an authorization code for the caller's profile
    async fn exchange_code(&self, code: &str) -> Result<ProviderProfile, OAuthError>;
}
