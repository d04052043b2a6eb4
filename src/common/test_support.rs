//! Helpers shared by the module test suites: an in-memory store, a fake
//! identity provider and request/response plumbing for `oneshot`.

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Request, Response},
    Router,
};
use serde_json::Value;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    SqlitePool,
};
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::{Arc, Mutex};

use super::config::AppConfig;
use super::migrations::run_migrations;
use super::state::AppState;
use crate::services::{IdentityProvider, OAuthError, ProviderProfile};

pub const TEST_SECRET: &str = "test_secret_key_for_unit_tests";

/// One connection, otherwise every pooled connection gets its own empty
/// in-memory database.
pub async fn test_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(
            SqliteConnectOptions::from_str("sqlite::memory:")
                .expect("sqlite url")
                .foreign_keys(true),
        )
        .await
        .expect("in-memory sqlite");
    run_migrations(&pool, false).await.expect("migrations");
    pool
}

pub fn test_config() -> AppConfig {
    let vars: HashMap<&str, &str> = [
        ("JWT_SECRET", TEST_SECRET),
        ("BCRYPT_COST", "4"),
        ("GOOGLE_CLIENT_ID", "test-client"),
        ("GOOGLE_CLIENT_SECRET", "test-secret"),
    ]
    .into_iter()
    .collect();
    AppConfig::from_lookup(|key| vars.get(key).map(|v| v.to_string())).expect("test config")
}

pub async fn test_state(provider: Option<Arc<dyn IdentityProvider>>) -> Arc<AppState> {
    Arc::new(AppState::new(test_pool().await, test_config(), provider))
}

pub async fn test_app(provider: Option<Arc<dyn IdentityProvider>>) -> (Router, Arc<AppState>) {
    let state = test_state(provider).await;
    (crate::build_app(state.clone()), state)
}

/// Identity provider returning a canned profile, recording every code
pub struct FakeProvider {
    profile: Result<ProviderProfile, String>,
    pub codes: Mutex<Vec<String>>,
}

impl FakeProvider {
    pub fn returning(profile: ProviderProfile) -> Arc<Self> {
        Arc::new(Self {
            profile: Ok(profile),
            codes: Mutex::new(Vec::new()),
        })
    }

    pub fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self {
            profile: Err(message.to_string()),
            codes: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl IdentityProvider for FakeProvider {
    fn name(&self) -> &'static str {
        "google"
    }

    fn authorization_url(&self, state: &str) -> String {
        format!("https://accounts.example/authorize?state={}", state)
    }

    async fn exchange_code(&self, code: &str) -> Result<ProviderProfile, OAuthError> {
        self.codes.lock().unwrap().push(code.to_string());
        self.profile
            .clone()
            .map_err(OAuthError::ExchangeRejected)
    }
}

pub fn google_profile(subject: &str, email: &str) -> ProviderProfile {
    ProviderProfile {
        subject: subject.to_string(),
        email: Some(email.to_string()),
        given_name: Some("Grace".to_string()),
        family_name: Some("Hopper".to_string()),
        picture: Some("https://lh3.googleusercontent.com/a/grace".to_string()),
    }
}

// ============================================================================
// Requests
// ============================================================================

pub fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn authed_json_request(method: &str, uri: &str, token: &str, body: Value) -> Request<Body> {
    let mut request = json_request(method, uri, body);
    request.headers_mut().insert(
        header::AUTHORIZATION,
        format!("Bearer {}", token).parse().unwrap(),
    );
    request
}

pub fn authed_request(method: &str, uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap()
}

pub fn get_request(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

pub fn set_cookies(response: &Response<Body>) -> Vec<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .map(|v| v.to_str().unwrap().to_string())
        .collect()
}

pub fn location(response: &Response<Body>) -> String {
    response
        .headers()
        .get(header::LOCATION)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string()
}

// ============================================================================
// Fixtures
// ============================================================================

/// Registers a password user through the router and returns a bearer token
pub async fn register_and_login(app: &Router, email: &str) -> String {
    use tower::ServiceExt;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/users/register",
            serde_json::json!({
                "first_name": "Ada",
                "last_name": "Lovelace",
                "email": email,
                "password": "correct horse battery",
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), 201);

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/users/login",
            serde_json::json!({ "email": email, "password": "correct horse battery" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    body_json(response).await["access_token"]
        .as_str()
        .unwrap()
        .to_string()
}
