//! bcrypt hashing, run off the async workers

use crate::common::ApiError;
use std::sync::OnceLock;
use tracing::error;

/// bcrypt only reads this many bytes; longer input would be silently cut
pub const MAX_PASSWORD_BYTES: usize = 72;

static DUMMY_HASH: OnceLock<String> = OnceLock::new();

pub async fn hash_password(password: String, cost: u32) -> Result<String, ApiError> {
    tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
        .await
        .map_err(|e| {
            error!(error = %e, "Password hashing task failed");
            ApiError::InternalServer("Failed to hash password".to_string())
        })?
        .map_err(|e| {
            error!(error = %e, "Password hashing error");
            ApiError::InternalServer("Failed to hash password".to_string())
        })
}

/// False on mismatch and on a stored hash bcrypt cannot parse
pub async fn verify_password(password: String, hash: String) -> Result<bool, ApiError> {
    let outcome = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
        .await
        .map_err(|e| {
            error!(error = %e, "Password verification task failed");
            ApiError::InternalServer("Failed to verify password".to_string())
        })?;

    match outcome {
        Ok(valid) => Ok(valid),
        Err(e) => {
            error!(error = %e, "Stored password hash is unreadable");
            Ok(false)
        }
    }
}

/// Spends the same bcrypt work as a real check against a fixed hash made
/// at `cost`, so a login for an unknown account takes as long as one with
/// a wrong password.
pub async fn burn_verify(password: String, cost: u32) -> Result<(), ApiError> {
    tokio::task::spawn_blocking(move || {
        let hash = DUMMY_HASH
            .get_or_init(|| bcrypt::hash("brandbook-unused-password", cost).unwrap_or_default());
        let _ = bcrypt::verify(password, hash);
    })
    .await
    .map_err(|e| {
        error!(error = %e, "Password verification task failed");
        ApiError::InternalServer("Failed to verify password".to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_hash_then_verify() {
        let hash = hash_password("longenough1".to_string(), 4).await.unwrap();
        assert_ne!(hash, "longenough1");
        assert!(verify_password("longenough1".to_string(), hash.clone())
            .await
            .unwrap());
        assert!(!verify_password("longenough2".to_string(), hash).await.unwrap());
    }

    #[tokio::test]
    async fn test_hashes_are_salted() {
        let a = hash_password("same-password".to_string(), 4).await.unwrap();
        let b = hash_password("same-password".to_string(), 4).await.unwrap();
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn test_garbage_hash_is_a_mismatch() {
        assert!(!verify_password("whatever1".to_string(), "not-a-hash".to_string())
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_burn_verify_uses_a_real_hash() {
        burn_verify("whatever1".to_string(), 4).await.unwrap();
        let hash = DUMMY_HASH.get().unwrap();
        assert!(hash.starts_with("$2"));
        assert!(!verify_password("whatever1".to_string(), hash.clone())
            .await
            .unwrap());
    }
}
