// src/users/tests.rs

#[cfg(test)]
mod tests {
    use serde_json::json;
    use tower::ServiceExt;

    use crate::common::test_support::*;
    use crate::common::ApiError;
    use crate::services::ProviderProfile;
    use crate::users::models::RegisterRequest;
    use crate::users::UsersService;

    async fn user_count(service_pool: &sqlx::SqlitePool) -> i64 {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
            .fetch_one(service_pool)
            .await
            .unwrap()
    }

    fn registration(email: &str, password: &str) -> serde_json::Value {
        json!({
            "first_name": "Ada",
            "last_name": "Lovelace",
            "email": email,
            "password": password,
        })
    }

    // ========================================================================
    // HTTP flows
    // ========================================================================

    #[tokio::test]
    async fn test_root_welcome() {
        let (app, _) = test_app(None).await;
        let response = app.oneshot(get_request("/")).await.unwrap();

        assert_eq!(response.status(), 200);
        assert_eq!(
            body_json(response).await["message"],
            "Welcome to Brandbook API"
        );
    }

    #[tokio::test]
    async fn test_register_login_me_round_trip() {
        let (app, _) = test_app(None).await;

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/users/register",
                registration("Ada@Example.com", "correct horse battery"),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), 201);
        let body = body_json(response).await;
        assert!(body["id"].as_str().unwrap().starts_with("U_"));
        assert_eq!(body["email"], "ada@example.com");
        assert!(body.get("password_hash").is_none());
        assert!(body.get("password").is_none());

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/users/login",
                json!({ "email": "ada@example.com", "password": "correct horse battery" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), 200);
        let cookies = set_cookies(&response);
        assert!(cookies[0].starts_with("access_token="));
        assert!(cookies[0].contains("HttpOnly"));
        let body = body_json(response).await;
        assert_eq!(body["token_type"], "bearer");
        let token = body["access_token"].as_str().unwrap().to_string();

        let response = app
            .oneshot(authed_request("GET", "/users/me", &token))
            .await
            .unwrap();
        assert_eq!(response.status(), 200);
        let me = body_json(response).await;
        assert_eq!(me["email"], "ada@example.com");
        assert_eq!(me["name"], "Ada Lovelace");
        assert_eq!(me["first_name"], "Ada");
    }

    #[tokio::test]
    async fn test_login_cookie_alone_authenticates() {
        let (app, _) = test_app(None).await;
        register_and_login(&app, "cookie@example.com").await;

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/users/login",
                json!({ "email": "cookie@example.com", "password": "correct horse battery" }),
            ))
            .await
            .unwrap();
        let cookie = set_cookies(&response)[0]
            .split(';')
            .next()
            .unwrap()
            .to_string();

        let request = axum::http::Request::builder()
            .uri("/users/me")
            .header("cookie", cookie)
            .body(axum::body::Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), 200);
    }

    #[tokio::test]
    async fn test_duplicate_email_is_conflict() {
        let (app, state) = test_app(None).await;
        register_and_login(&app, "dup@example.com").await;

        let response = app
            .oneshot(json_request(
                "POST",
                "/users/register",
                registration("  DUP@example.com ", "another long password"),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), 409);
        let body = body_json(response).await;
        assert_eq!(body["code"], "DUPLICATE_EMAIL");
        assert_eq!(body["error"], "Email is already registered");
        assert_eq!(user_count(&state.db).await, 1);
    }

    #[tokio::test]
    async fn test_register_rejects_short_password() {
        let (app, state) = test_app(None).await;

        let response = app
            .oneshot(json_request(
                "POST",
                "/users/register",
                registration("short@example.com", "short"),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), 422);
        assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
        assert_eq!(user_count(&state.db).await, 0);
    }

    #[tokio::test]
    async fn test_register_rejects_password_over_72_bytes() {
        let (app, state) = test_app(None).await;

        // 41 chars but 82 bytes
        let multibyte = "é".repeat(41);
        let long_ascii = format!("{}SECRET-ONE", "a".repeat(72));
        for password in [long_ascii.as_str(), multibyte.as_str()] {
            let response = app
                .clone()
                .oneshot(json_request(
                    "POST",
                    "/users/register",
                    registration("long@example.com", password),
                ))
                .await
                .unwrap();
            assert_eq!(response.status(), 422);
        }
        assert_eq!(user_count(&state.db).await, 0);
    }

    #[tokio::test]
    async fn test_shared_72_byte_prefix_does_not_log_in() {
        let (app, _) = test_app(None).await;
        let password = "a".repeat(72);

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/users/register",
                registration("prefix@example.com", &password),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), 201);

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/users/login",
                json!({
                    "email": "prefix@example.com",
                    "password": format!("{}totally-different", password),
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), 401);
        assert_eq!(body_json(response).await["code"], "INVALID_CREDENTIALS");

        let response = app
            .oneshot(json_request(
                "POST",
                "/users/login",
                json!({ "email": "prefix@example.com", "password": password }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), 200);
    }

    #[tokio::test]
    async fn test_wrong_password_and_unknown_email_are_indistinguishable() {
        let (app, _) = test_app(None).await;
        register_and_login(&app, "known@example.com").await;

        let wrong_password = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/users/login",
                json!({ "email": "known@example.com", "password": "not the password" }),
            ))
            .await
            .unwrap();
        let unknown_email = app
            .oneshot(json_request(
                "POST",
                "/users/login",
                json!({ "email": "nobody@example.com", "password": "not the password" }),
            ))
            .await
            .unwrap();

        assert_eq!(wrong_password.status(), 401);
        assert_eq!(wrong_password.status(), unknown_email.status());
        assert!(set_cookies(&wrong_password).is_empty());

        let a = body_json(wrong_password).await;
        let b = body_json(unknown_email).await;
        assert_eq!(a, b);
        assert_eq!(a["code"], "INVALID_CREDENTIALS");
    }

    #[tokio::test]
    async fn test_logout_clears_cookie() {
        let (app, _) = test_app(None).await;
        let response = app
            .oneshot(json_request("POST", "/users/logout", json!({})))
            .await
            .unwrap();

        assert_eq!(response.status(), 200);
        let cookies = set_cookies(&response);
        assert_eq!(cookies.len(), 1);
        assert!(cookies[0].starts_with("access_token=;"));
        assert!(cookies[0].contains("Max-Age=0"));
        assert!(cookies[0].contains("Path=/"));
    }

    // ========================================================================
    // Provider identity resolution
    // ========================================================================

    #[tokio::test]
    async fn test_provider_identity_creates_user() {
        let pool = test_pool().await;
        let service = UsersService::new(pool.clone());

        let user = service
            .resolve_provider_identity("google", &google_profile("sub-1", "Grace@Example.com"))
            .await
            .unwrap();

        assert_eq!(user.email, "grace@example.com");
        assert_eq!(user.first_name, "Grace");
        assert_eq!(user.provider.as_deref(), Some("google"));
        assert_eq!(user.provider_id.as_deref(), Some("sub-1"));
        assert!(user.password_hash.is_none());
        assert_eq!(user_count(&pool).await, 1);
    }

    #[tokio::test]
    async fn test_provider_identity_defaults_missing_names() {
        let service = UsersService::new(test_pool().await);
        let profile = ProviderProfile {
            subject: "sub-2".to_string(),
            email: Some("noname@example.com".to_string()),
            ..Default::default()
        };

        let user = service
            .resolve_provider_identity("google", &profile)
            .await
            .unwrap();
        assert_eq!(user.full_name(), "Google User");
        assert!(user.avatar_url.is_none());
    }

    #[tokio::test]
    async fn test_provider_identity_is_idempotent() {
        let pool = test_pool().await;
        let service = UsersService::new(pool.clone());
        let profile = google_profile("sub-1", "grace@example.com");

        let first = service
            .resolve_provider_identity("google", &profile)
            .await
            .unwrap();
        let second = service
            .resolve_provider_identity("google", &profile)
            .await
            .unwrap();

        assert_eq!(first, second);
        assert_eq!(user_count(&pool).await, 1);
    }

    #[tokio::test]
    async fn test_provider_identity_matches_pair_even_if_email_changed() {
        let pool = test_pool().await;
        let service = UsersService::new(pool.clone());

        let first = service
            .resolve_provider_identity("google", &google_profile("sub-1", "old@example.com"))
            .await
            .unwrap();
        let second = service
            .resolve_provider_identity("google", &google_profile("sub-1", "new@example.com"))
            .await
            .unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(user_count(&pool).await, 1);
    }

    #[tokio::test]
    async fn test_provider_identity_links_password_account_by_email() {
        let pool = test_pool().await;
        let service = UsersService::new(pool.clone());
        let registered = service
            .register(
                RegisterRequest {
                    first_name: "Grace".to_string(),
                    last_name: "Hopper".to_string(),
                    email: "grace@example.com".to_string(),
                    password: "correct horse battery".to_string(),
                },
                4,
            )
            .await
            .unwrap();

        let linked = service
            .resolve_provider_identity("google", &google_profile("sub-9", "GRACE@example.com"))
            .await
            .unwrap();

        assert_eq!(linked.id, registered.id);
        assert_eq!(linked.provider.as_deref(), Some("google"));
        assert_eq!(linked.provider_id.as_deref(), Some("sub-9"));
        assert_eq!(
            linked.avatar_url.as_deref(),
            Some("https://lh3.googleusercontent.com/a/grace")
        );
        assert_eq!(user_count(&pool).await, 1);

        // the password still works after linking
        let user = service
            .authenticate("grace@example.com", "correct horse battery", 4)
            .await
            .unwrap();
        assert_eq!(user.id, registered.id);
        assert_eq!(user.provider_id.as_deref(), Some("sub-9"));
    }

    #[tokio::test]
    async fn test_provider_identity_requires_email_and_subject() {
        let service = UsersService::new(test_pool().await);

        let no_email = ProviderProfile {
            subject: "sub-1".to_string(),
            ..Default::default()
        };
        let no_subject = ProviderProfile {
            subject: " ".to_string(),
            email: Some("x@example.com".to_string()),
            ..Default::default()
        };

        for profile in [no_email, no_subject] {
            match service.resolve_provider_identity("google", &profile).await {
                Err(ApiError::OAuthExchangeFailed(msg)) => {
                    assert_eq!(msg, "Missing email/sub from google")
                }
                other => panic!("expected OAuthExchangeFailed, got {:?}", other),
            }
        }
    }

    #[tokio::test]
    async fn test_oauth_only_account_cannot_password_login() {
        let service = UsersService::new(test_pool().await);
        service
            .resolve_provider_identity("google", &google_profile("sub-1", "grace@example.com"))
            .await
            .unwrap();

        assert!(matches!(
            service
                .authenticate("grace@example.com", "anything at all", 4)
                .await,
            Err(ApiError::InvalidCredentials)
        ));
    }
}
