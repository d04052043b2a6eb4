// src/services/google.rs
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, error, info};

use super::identity::{IdentityProvider, OAuthError, ProviderProfile};
use crate::common::config::GoogleOAuthConfig;

const AUTHORIZATION_ENDPOINT: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const TOKEN_ENDPOINT: &str = "https://oauth2.googleapis.com/token";
const USERINFO_ENDPOINT: &str = "https://openidconnect.googleapis.com/v1/userinfo";
const SCOPES: &str = "openid email profile";

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[allow(dead_code)]
    token_type: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GoogleUserInfo {
    sub: String,
    email: Option<String>,
    given_name: Option<String>,
    family_name: Option<String>,
    picture: Option<String>,
}

impl From<GoogleUserInfo> for ProviderProfile {
    fn from(info: GoogleUserInfo) -> Self {
        ProviderProfile {
            subject: info.sub,
            email: info.email,
            given_name: info.given_name,
            family_name: info.family_name,
            picture: info.picture,
        }
    }
}

/// Google sign-in over the authorization-code flow
#[derive(Debug, Clone)]
pub struct GoogleProvider {
    config: GoogleOAuthConfig,
    client: Client,
    timeout: Duration,
}

impl GoogleProvider {
    pub fn new(config: GoogleOAuthConfig, timeout: Duration) -> Result<Self, OAuthError> {
        let client = Client::builder()
            .timeout(timeout)
            .no_proxy()
            .build()
            .map_err(|e| OAuthError::RequestFailed(e.to_string()))?;

        Ok(Self {
            config,
            client,
            timeout,
        })
    }

    async fn exchange(&self, code: &str) -> Result<ProviderProfile, OAuthError> {
        let params = [
            ("code", code),
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("redirect_uri", self.config.redirect_uri.as_str()),
            ("grant_type", "authorization_code"),
        ];

        debug!("Exchanging authorization code for tokens");

        let response = self
            .client
            .post(TOKEN_ENDPOINT)
            .form(&params)
            .send()
            .await
            .map_err(|e| OAuthError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            error!(status = %status, error = %error_text, "Token exchange failed");
            return Err(OAuthError::ExchangeRejected(format!(
                "HTTP {}: {}",
                status, error_text
            )));
        }

        let tokens = response
            .json::<TokenResponse>()
            .await
            .map_err(|e| OAuthError::SerializationError(e.to_string()))?;

        let response = self
            .client
            .get(USERINFO_ENDPOINT)
            .bearer_auth(&tokens.access_token)
            .send()
            .await
            .map_err(|e| OAuthError::RequestFailed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(OAuthError::ExchangeRejected(format!(
                "userinfo returned HTTP {}",
                response.status()
            )));
        }

        let info = response
            .json::<GoogleUserInfo>()
            .await
            .map_err(|e| OAuthError::SerializationError(e.to_string()))?;

        info!("Exchanged Google authorization code for profile");
        Ok(info.into())
    }
}

#[async_trait]
impl IdentityProvider for GoogleProvider {
    fn name(&self) -> &'static str {
        "google"
    }

    fn authorization_url(&self, state: &str) -> String {
        format!(
            "{}?client_id={}&redirect_uri={}&response_type=code&scope={}&state={}&access_type=online&prompt=select_account",
            AUTHORIZATION_ENDPOINT,
            urlencoding::encode(&self.config.client_id),
            urlencoding::encode(&self.config.redirect_uri),
            urlencoding::encode(SCOPES),
            urlencoding::encode(state)
        )
    }

    async fn exchange_code(&self, code: &str) -> Result<ProviderProfile, OAuthError> {
        // the client timeout bounds each request, this bounds the whole exchange
        tokio::time::timeout(self.timeout, self.exchange(code))
            .await
            .map_err(|_| OAuthError::Timeout(self.timeout.as_secs()))?
    }
}
