//! Signed bearer tokens

use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

use crate::common::{AppConfig, ApiError};

/// JWT claims structure
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Claims {
    /// User id
    pub sub: String,
    /// Issued-at, unix seconds
    pub iat: i64,
    /// Expiry, unix seconds
    pub exp: i64,
}

/// Issues and verifies tokens with one deployment-wide secret and algorithm
#[derive(Clone)]
pub struct TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    algorithm: Algorithm,
    ttl_seconds: i64,
}

impl TokenCodec {
    pub fn new(secret: &[u8], algorithm: Algorithm, ttl_seconds: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            algorithm,
            ttl_seconds,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            config.jwt_secret.as_bytes(),
            config.jwt_algorithm,
            config.token_ttl_seconds(),
        )
    }

    pub fn ttl_seconds(&self) -> i64 {
        self.ttl_seconds
    }

    pub fn issue(&self, user_id: &str) -> Result<String, ApiError> {
        self.issue_at(user_id, Utc::now().timestamp())
    }

    /// Issues a token as if it were `issued_at`
    pub fn issue_at(&self, user_id: &str, issued_at: i64) -> Result<String, ApiError> {
        let exp = issued_at.checked_add(self.ttl_seconds).ok_or_else(|| {
            error!(user_id = %user_id, "Token expiry overflows");
            ApiError::InternalServer("jwt error".to_string())
        })?;
        let claims = Claims {
            sub: user_id.to_string(),
            iat: issued_at,
            exp,
        };

        encode(&Header::new(self.algorithm), &claims, &self.encoding).map_err(|e| {
            error!(error = %e, user_id = %user_id, "JWT encoding error");
            ApiError::InternalServer("jwt error".to_string())
        })
    }

    /// Checks signature, algorithm and expiry. Any failure is `InvalidToken`.
    pub fn verify(&self, token: &str) -> Result<Claims, ApiError> {
        let mut validation = Validation::new(self.algorithm);
        validation.leeway = 0;

        let decoded = decode::<Claims>(token, &self.decoding, &validation).map_err(|e| {
            warn!(error = %e, "JWT token validation failed");
            ApiError::InvalidToken
        })?;

        if decoded.claims.sub.trim().is_empty() {
            warn!("JWT token has an empty subject");
            return Err(ApiError::InvalidToken);
        }

        Ok(decoded.claims)
    }
}
