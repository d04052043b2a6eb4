use super::models::{RegisterRequest, User};
use super::password::{burn_verify, hash_password, verify_password, MAX_PASSWORD_BYTES};
use super::validators::RegistrationValidator;
use crate::common::{
    generate_user_id, normalize_email, safe_email_log, ApiError, Validator,
};
use crate::services::ProviderProfile;
use sqlx::SqlitePool;
use tracing::{debug, info, warn};

const USER_COLUMNS: &str = "id, first_name, last_name, email, password_hash, provider, provider_id, avatar_url, created_at";

/// User store access plus the credential checks built on it
pub struct UsersService {
    db: SqlitePool,
}

impl UsersService {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    // ============================================================================
    // Lookups
    // ============================================================================

    pub async fn find_by_id(&self, user_id: &str) -> Result<Option<User>, ApiError> {
        sqlx::query_as::<_, User>(&format!("SELECT {} FROM users WHERE id = ?", USER_COLUMNS))
            .bind(user_id)
            .fetch_optional(&self.db)
            .await
            .map_err(ApiError::DatabaseError)
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, ApiError> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE email = ?",
            USER_COLUMNS
        ))
        .bind(normalize_email(email))
        .fetch_optional(&self.db)
        .await
        .map_err(ApiError::DatabaseError)
    }

    pub async fn find_by_provider(
        &self,
        provider: &str,
        provider_id: &str,
    ) -> Result<Option<User>, ApiError> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE provider = ? AND provider_id = ?",
            USER_COLUMNS
        ))
        .bind(provider)
        .bind(provider_id)
        .fetch_optional(&self.db)
        .await
        .map_err(ApiError::DatabaseError)
    }

    async fn get_by_id(&self, user_id: &str) -> Result<User, ApiError> {
        self.find_by_id(user_id)
            .await?
            .ok_or_else(|| ApiError::InternalServer("User vanished after write".to_string()))
    }

    // ============================================================================
    // Password credentials
    // ============================================================================

    /// Creates a password account. The email's uniqueness is left to the
    /// store so two concurrent registrations cannot both succeed.
    pub async fn register(&self, request: RegisterRequest, bcrypt_cost: u32) -> Result<User, ApiError> {
        RegistrationValidator.validate(&request).into_result()?;

        let email = normalize_email(&request.email);
        let password_hash = hash_password(request.password, bcrypt_cost).await?;
        let user_id = generate_user_id();
        let now = chrono::Utc::now().to_rfc3339();

        sqlx::query(
            r#"
            INSERT INTO users (id, first_name, last_name, email, password_hash, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&user_id)
        .bind(request.first_name.trim())
        .bind(request.last_name.trim())
        .bind(&email)
        .bind(&password_hash)
        .bind(&now)
        .execute(&self.db)
        .await
        .map_err(|e| ApiError::from_write(e, "Account already exists"))?;

        info!(user_id = %user_id, email = %safe_email_log(&email), "Registered new user");

        self.get_by_id(&user_id).await
    }

    /// Checks an email/password pair. Unknown email, OAuth-only account and
    /// wrong password all produce the same `InvalidCredentials` after the
    /// same amount of bcrypt work.
    pub async fn authenticate(
        &self,
        email: &str,
        password: &str,
        bcrypt_cost: u32,
    ) -> Result<User, ApiError> {
        // anything longer could only match through truncation
        if password.len() > MAX_PASSWORD_BYTES {
            burn_verify(password.to_string(), bcrypt_cost).await?;
            return Err(ApiError::InvalidCredentials);
        }

        let user = match self.find_by_email(email).await? {
            Some(user) => user,
            None => {
                debug!(email = %safe_email_log(email), "Login for unknown email");
                burn_verify(password.to_string(), bcrypt_cost).await?;
                return Err(ApiError::InvalidCredentials);
            }
        };

        let Some(hash) = user.password_hash.clone() else {
            debug!(user_id = %user.id, "Login for account without a password");
            burn_verify(password.to_string(), bcrypt_cost).await?;
            return Err(ApiError::InvalidCredentials);
        };

        if !verify_password(password.to_string(), hash).await? {
            warn!(user_id = %user.id, "Login with wrong password");
            return Err(ApiError::InvalidCredentials);
        }

        Ok(user)
    }

    // ============================================================================
    // Provider identities
    // ============================================================================

    /// Maps a provider profile onto a local user: first by the
    /// (provider, subject) pair, then by email, otherwise a new account.
    pub async fn resolve_provider_identity(
        &self,
        provider: &str,
        profile: &ProviderProfile,
    ) -> Result<User, ApiError> {
        let email = profile
            .email
            .as_deref()
            .map(normalize_email)
            .filter(|e| !e.is_empty());

        let (subject, email) = match (profile.subject.trim(), email) {
            (subject, Some(email)) if !subject.is_empty() => (subject.to_string(), email),
            _ => {
                return Err(ApiError::OAuthExchangeFailed(format!(
                    "Missing email/sub from {}",
                    provider
                )))
            }
        };

        if let Some(user) = self.find_by_provider(provider, &subject).await? {
            debug!(user_id = %user.id, provider = %provider, "Matched user by provider identity");
            return self.backfill_provider_fields(user, provider, &subject, profile).await;
        }

        if let Some(user) = self.find_by_email(&email).await? {
            info!(
                user_id = %user.id,
                email = %safe_email_log(&email),
                provider = %provider,
                "Linking existing account to provider identity"
            );
            return self.backfill_provider_fields(user, provider, &subject, profile).await;
        }

        self.create_from_provider(provider, &subject, &email, profile).await
    }

    async fn create_from_provider(
        &self,
        provider: &str,
        subject: &str,
        email: &str,
        profile: &ProviderProfile,
    ) -> Result<User, ApiError> {
        let user_id = generate_user_id();
        let now = chrono::Utc::now().to_rfc3339();
        let first_name = non_empty(profile.given_name.as_deref()).unwrap_or("Google");
        let last_name = non_empty(profile.family_name.as_deref()).unwrap_or("User");

        sqlx::query(
            r#"
            INSERT INTO users (id, first_name, last_name, email, password_hash, provider, provider_id, avatar_url, created_at)
            VALUES (?, ?, ?, ?, NULL, ?, ?, ?, ?)
            "#,
        )
        .bind(&user_id)
        .bind(first_name)
        .bind(last_name)
        .bind(email)
        .bind(provider)
        .bind(subject)
        .bind(profile.picture.as_deref())
        .bind(&now)
        .execute(&self.db)
        .await
        .map_err(|e| ApiError::from_write(e, "Provider identity is already linked to another account"))?;

        info!(
            user_id = %user_id,
            email = %safe_email_log(email),
            provider = %provider,
            "Created user from provider identity"
        );

        self.get_by_id(&user_id).await
    }

    /// Fills provider, provider_id and avatar when missing or changed.
    /// Writes nothing when the stored profile already matches.
    async fn backfill_provider_fields(
        &self,
        mut user: User,
        provider: &str,
        subject: &str,
        profile: &ProviderProfile,
    ) -> Result<User, ApiError> {
        let mut changed = false;

        if user.provider.as_deref().map_or(true, str::is_empty) {
            user.provider = Some(provider.to_string());
            changed = true;
        }
        if user.provider_id.as_deref().map_or(true, str::is_empty) {
            user.provider_id = Some(subject.to_string());
            changed = true;
        }
        if let Some(picture) = non_empty(profile.picture.as_deref()) {
            if user.avatar_url.as_deref() != Some(picture) {
                user.avatar_url = Some(picture.to_string());
                changed = true;
            }
        }

        if !changed {
            return Ok(user);
        }

        sqlx::query("UPDATE users SET provider = ?, provider_id = ?, avatar_url = ? WHERE id = ?")
            .bind(&user.provider)
            .bind(&user.provider_id)
            .bind(&user.avatar_url)
            .bind(&user.id)
            .execute(&self.db)
            .await
            .map_err(|e| {
                ApiError::from_write(e, "Provider identity is already linked to another account")
            })?;

        debug!(user_id = %user.id, "Backfilled provider fields");
        Ok(user)
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
