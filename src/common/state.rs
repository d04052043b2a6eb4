// Application state shared across all modules

use sqlx::SqlitePool;
use std::sync::Arc;

use super::config::AppConfig;
use crate::auth::tokens::TokenCodec;
use crate::services::IdentityProvider;

/// Database pool, token codec, identity provider and configuration.
///
/// Built once in `main` and never mutated afterwards; handlers receive it
/// as `Extension<Arc<AppState>>`.
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub config: Arc<AppConfig>,
    pub tokens: TokenCodec,
    /// `None` when Google credentials are not configured
    pub identity_provider: Option<Arc<dyn IdentityProvider>>,
}

impl AppState {
    pub fn new(
        db: SqlitePool,
        config: AppConfig,
        identity_provider: Option<Arc<dyn IdentityProvider>>,
    ) -> Self {
        let tokens = TokenCodec::from_config(&config);
        Self {
            db,
            config: Arc::new(config),
            tokens,
            identity_provider,
        }
    }
}
