// src/common/config.rs
//! Environment-sourced configuration

use jsonwebtoken::Algorithm;
use std::env;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;
use tracing::warn;

const DEFAULT_JWT_SECRET: &str = "dev_secret_change_me";
/// One year
const MAX_JWT_EXPIRES_MIN: i64 = 525_600;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name} has an invalid value: {value}")]
    Invalid { name: &'static str, value: String },

    #[error("JWT_ALG must be an HMAC algorithm (HS256, HS384, HS512), got {0}")]
    UnsupportedAlgorithm(String),
}

/// Google client credentials, present only when both halves are set
#[derive(Debug, Clone)]
pub struct GoogleOAuthConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt_secret: String,
    pub jwt_algorithm: Algorithm,
    pub jwt_expires_min: i64,
    pub google: Option<GoogleOAuthConfig>,
    pub oauth_redirect_uri: String,
    pub oauth_timeout: Duration,
    pub login_redirect_path: String,
    pub cookie_secure: bool,
    pub bcrypt_cost: u32,
    pub cors_origins: Vec<String>,
    pub port: u16,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key lookup; `from_env` passes the
    /// process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let database_url =
            get("DATABASE_URL").unwrap_or_else(|| "sqlite://brandbook.db".to_string());

        let jwt_secret = get("JWT_SECRET").unwrap_or_else(|| {
            warn!("JWT_SECRET not set, using the development secret");
            DEFAULT_JWT_SECRET.to_string()
        });

        let alg_raw = get("JWT_ALG").unwrap_or_else(|| "HS256".to_string());
        let jwt_algorithm = parse_hmac_algorithm(&alg_raw)?;

        let jwt_expires_min = parse_or("JWT_EXPIRES_MIN", get("JWT_EXPIRES_MIN"), 60i64)?;
        if !(1..=MAX_JWT_EXPIRES_MIN).contains(&jwt_expires_min) {
            return Err(ConfigError::Invalid {
                name: "JWT_EXPIRES_MIN",
                value: jwt_expires_min.to_string(),
            });
        }

        let oauth_redirect_uri = get("OAUTH_REDIRECT_URI")
            .unwrap_or_else(|| "http://127.0.0.1:8000/auth/google/callback".to_string());

        let google = match (get("GOOGLE_CLIENT_ID"), get("GOOGLE_CLIENT_SECRET")) {
            (Some(client_id), Some(client_secret)) => Some(GoogleOAuthConfig {
                client_id,
                client_secret,
                redirect_uri: oauth_redirect_uri.clone(),
            }),
            _ => None,
        };

        let oauth_timeout_secs = parse_or("OAUTH_TIMEOUT_SECS", get("OAUTH_TIMEOUT_SECS"), 10u64)?;

        let login_redirect_path =
            get("LOGIN_REDIRECT_PATH").unwrap_or_else(|| "/frontend/index.html".to_string());

        let cookie_secure = match get("COOKIE_SECURE") {
            Some(raw) => parse_bool("COOKIE_SECURE", &raw)?,
            None => oauth_redirect_uri.starts_with("https://"),
        };

        let bcrypt_cost = parse_or("BCRYPT_COST", get("BCRYPT_COST"), bcrypt::DEFAULT_COST)?;
        if !(4..=31).contains(&bcrypt_cost) {
            return Err(ConfigError::Invalid {
                name: "BCRYPT_COST",
                value: bcrypt_cost.to_string(),
            });
        }

        let cors_origins = get("CORS_ORIGINS")
            .unwrap_or_else(|| "http://localhost:3000,http://127.0.0.1:8000".to_string())
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        let port = parse_or("PORT", get("PORT"), 8000u16)?;

        Ok(Self {
            database_url,
            jwt_secret,
            jwt_algorithm,
            jwt_expires_min,
            google,
            oauth_redirect_uri,
            oauth_timeout: Duration::from_secs(oauth_timeout_secs),
            login_redirect_path,
            cookie_secure,
            bcrypt_cost,
            cors_origins,
            port,
        })
    }

    pub fn token_ttl_seconds(&self) -> i64 {
        self.jwt_expires_min * 60
    }

    pub fn uses_default_secret(&self) -> bool {
        self.jwt_secret == DEFAULT_JWT_SECRET
    }
}

fn parse_hmac_algorithm(raw: &str) -> Result<Algorithm, ConfigError> {
    match Algorithm::from_str(raw.trim()) {
        Ok(alg @ (Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512)) => Ok(alg),
        _ => Err(ConfigError::UnsupportedAlgorithm(raw.to_string())),
    }
}

fn parse_or<T: FromStr>(
    name: &'static str,
    raw: Option<String>,
    default: T,
) -> Result<T, ConfigError> {
    match raw {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
        None => Ok(default),
    }
}

fn parse_bool(name: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(true),
        "0" | "false" | "no" => Ok(false),
        _ => Err(ConfigError::Invalid {
            name,
            value: raw.to_string(),
        }),
    }
}
