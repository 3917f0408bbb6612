//! Integration tests per gli endpoints di autenticazione
//!
//! Test per:
//! - GET /api/health
//! - POST /api/auth/register, /api/auth/login
//! - POST /api/auth/forgot-password, /api/auth/reset-password
//! - middleware di autenticazione
//!
//! I test in `offline_tests` non toccano il database: usano un pool lazy e percorsi
//! che falliscono prima di qualsiasi query.
//! I test in `auth_tests` usano `#[sqlx::test]` che:
//! - Crea automaticamente un database di test isolato
//! - Applica le migrations da `migrations/`
//! - Applica i fixtures specificati da `fixtures/`
//! - Pulisce il database al termine
//!
//! Richiedono `DATABASE_URL`.

mod common;

#[cfg(test)]
mod offline_tests {
    use super::common::*;
    use petconnect::entities::UserRole;
    use serde_json::json;

    #[tokio::test]
    async fn test_health() {
        let server = create_test_server(create_offline_state());
        let response = server.get("/api/health").await;
        response.assert_status_ok();
        let body: serde_json::Value = response.json();
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_register_weak_password() {
        let server = create_test_server(create_offline_state());
        let body = json!({
            "username": "newowner",
            "email": "new@example.com",
            "password": "short",
            "first_name": "New",
            "last_name": "Owner"
        });

        let response = server.post("/api/auth/register").json(&body).await;

        response.assert_status_bad_request();
        let error: serde_json::Value = response.json();
        assert_eq!(error["error"], "Validation error");
    }

    #[tokio::test]
    async fn test_register_invalid_email_and_username() {
        let server = create_test_server(create_offline_state());
        let body = json!({
            "username": "a b",
            "email": "not-an-email",
            "password": "Password123",
            "first_name": "New",
            "last_name": "Owner"
        });

        let response = server.post("/api/auth/register").json(&body).await;
        response.assert_status_bad_request();
    }

    #[tokio::test]
    async fn test_register_missing_fields() {
        let server = create_test_server(create_offline_state());
        let body = json!({ "username": "newowner" });

        let response = server.post("/api/auth/register").json(&body).await;
        response.assert_status_unprocessable_entity();
    }

    #[tokio::test]
    async fn test_login_empty_credentials() {
        let server = create_test_server(create_offline_state());
        let body = json!({ "login": "", "password": "" });

        let response = server.post("/api/auth/login").json(&body).await;
        response.assert_status_unauthorized();
    }

    #[tokio::test]
    async fn test_forgot_password_invalid_email() {
        let server = create_test_server(create_offline_state());
        let body = json!({ "email": "nope" });

        let response = server.post("/api/auth/forgot-password").json(&body).await;
        response.assert_status_bad_request();
    }

    #[tokio::test]
    async fn test_reset_password_malformed_token() {
        let server = create_test_server(create_offline_state());
        let body = json!({ "token": "abc", "new_password": "Password123" });

        let response = server.post("/api/auth/reset-password").json(&body).await;
        response.assert_status_bad_request();
    }

    #[tokio::test]
    async fn test_protected_route_without_token() {
        let server = create_test_server(create_offline_state());
        let response = server.get("/api/users/me").await;
        response.assert_status_unauthorized();
    }

    #[tokio::test]
    async fn test_protected_route_with_invalid_token() {
        let server = create_test_server(create_offline_state());
        let response = server
            .get("/api/pets")
            .add_header(auth_header(), "Bearer invalid_token_here")
            .await;
        response.assert_status_unauthorized();
    }

    #[tokio::test]
    async fn test_protected_route_with_non_bearer_scheme() {
        let server = create_test_server(create_offline_state());
        let response = server
            .get("/api/pets")
            .add_header(auth_header(), "Basic YWxhZGRpbjpvcGVuc2VzYW1l")
            .await;
        response.assert_status_unauthorized();
    }

    #[tokio::test]
    async fn test_token_signed_with_other_secret() {
        use chrono::{Duration, Utc};
        use jsonwebtoken::{EncodingKey, Header, encode};

        let now = Utc::now();
        let claims = json!({
            "id": 1,
            "username": "admin",
            "role": UserRole::Admin,
            "iat": now.timestamp(),
            "exp": (now + Duration::hours(1)).timestamp(),
        });
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"another-secret"),
        )
        .unwrap();

        let server = create_test_server(create_offline_state());
        let response = server
            .get("/api/users")
            .add_header(auth_header(), bearer(&token))
            .await;
        response.assert_status_unauthorized();
    }
}

#[cfg(test)]
mod auth_tests {
    use super::common::*;
    use petconnect::entities::UserRole;
    use serde_json::json;
    use sqlx::PgPool;

    fn registration(username: &str, email: &str) -> serde_json::Value {
        json!({
            "username": username,
            "email": email,
            "password": "TestLogin123",
            "first_name": "Giulia",
            "last_name": "Russo",
            "phone": "+39 347 0000000"
        })
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("clinics", "users")))]
    async fn test_register_and_login_success(pool: PgPool) -> sqlx::Result<()> {
        let state = create_test_state(pool);
        let server = create_test_server(state.clone());

        // Prima registriamo un nuovo utente
        let register_response = server
            .post("/api/auth/register")
            .json(&registration("logintest", "LoginTest@Example.com"))
            .await;
        register_response.assert_status(axum::http::StatusCode::CREATED);
        let user: serde_json::Value = register_response.json();
        assert_eq!(user["role"], "OWNER");
        assert_eq!(user["email"], "logintest@example.com");
        assert!(user.get("password").is_none());

        // Poi facciamo login con le stesse credenziali
        let response = server
            .post("/api/auth/login")
            .json(&json!({ "login": "logintest", "password": "TestLogin123" }))
            .await;
        response.assert_status_ok();

        // Verifica che ci siano il cookie e l'header Authorization
        let headers = response.headers();
        let cookie = headers.get("set-cookie").unwrap().to_str().unwrap();
        assert!(cookie.starts_with("token="));
        assert!(cookie.contains("HttpOnly"));
        let auth = headers.get("authorization").unwrap().to_str().unwrap();
        assert!(auth.starts_with("Bearer "));

        let body: serde_json::Value = response.json();
        assert_eq!(body["token_type"], "Bearer");
        assert_eq!(body["expires_in"], 86400);
        assert_eq!(body["user"]["username"], "logintest");

        // Il token restituito apre le rotte protette
        let token = body["token"].as_str().unwrap();
        let me = server
            .get("/api/users/me")
            .add_header(auth_header(), bearer(token))
            .await;
        me.assert_status_ok();
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("clinics", "users")))]
    async fn test_login_with_email(pool: PgPool) -> sqlx::Result<()> {
        let server = create_test_server(create_test_state(pool));
        server
            .post("/api/auth/register")
            .json(&registration("emaillogin", "emaillogin@example.com"))
            .await
            .assert_status(axum::http::StatusCode::CREATED);

        let response = server
            .post("/api/auth/login")
            .json(&json!({ "login": "EmailLogin@example.com", "password": "TestLogin123" }))
            .await;
        response.assert_status_ok();
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("clinics", "users")))]
    async fn test_login_wrong_password(pool: PgPool) -> sqlx::Result<()> {
        let server = create_test_server(create_test_state(pool));
        server
            .post("/api/auth/register")
            .json(&registration("wrongpw", "wrongpw@example.com"))
            .await
            .assert_status(axum::http::StatusCode::CREATED);

        let response = server
            .post("/api/auth/login")
            .json(&json!({ "login": "wrongpw", "password": "Wrong12345" }))
            .await;
        response.assert_status_unauthorized();
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("clinics", "users")))]
    async fn test_login_nonexistent_user(pool: PgPool) -> sqlx::Result<()> {
        let server = create_test_server(create_test_state(pool));
        let response = server
            .post("/api/auth/login")
            .json(&json!({ "login": "nonexistent", "password": "password123" }))
            .await;
        response.assert_status_unauthorized();
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("clinics", "users")))]
    async fn test_register_duplicate_username_and_email(pool: PgPool) -> sqlx::Result<()> {
        let server = create_test_server(create_test_state(pool));

        let response = server
            .post("/api/auth/register")
            .json(&registration("anna", "other@example.com"))
            .await;
        response.assert_status_conflict();

        let response = server
            .post("/api/auth/register")
            .json(&registration("anna2", "ANNA@example.com"))
            .await;
        response.assert_status_conflict();
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("clinics", "users")))]
    async fn test_inactive_staff_token_rejected(pool: PgPool) -> sqlx::Result<()> {
        let server = create_test_server(create_test_state(pool));
        let token = create_test_jwt(INACTIVE_VET_ID, "dr.former", UserRole::Vet);

        let response = server
            .get("/api/users/me")
            .add_header(auth_header(), bearer(&token))
            .await;
        response.assert_status_unauthorized();
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("clinics", "users")))]
    async fn test_cookie_authentication(pool: PgPool) -> sqlx::Result<()> {
        let server = create_test_server(create_test_state(pool));
        let response = server
            .get("/api/users/me")
            .add_header(
                axum_test::http::HeaderName::from_static("cookie"),
                format!("token={}", anna_token()),
            )
            .await;
        response.assert_status_ok();
        let me: serde_json::Value = response.json();
        assert_eq!(me["username"], "anna");
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("clinics", "users")))]
    async fn test_forgot_password_unknown_email_is_ok(pool: PgPool) -> sqlx::Result<()> {
        let server = create_test_server(create_test_state(pool));
        let response = server
            .post("/api/auth/forgot-password")
            .json(&json!({ "email": "nobody@example.com" }))
            .await;
        response.assert_status_ok();
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("clinics", "users")))]
    async fn test_forgot_password_same_answer_when_smtp_fails(pool: PgPool) -> sqlx::Result<()> {
        let server =
            create_test_server(create_test_state_with_mailer(pool, unreachable_mailer()));

        let registered = server
            .post("/api/auth/forgot-password")
            .json(&json!({ "email": "anna@example.com" }))
            .await;
        registered.assert_status_ok();

        let unknown = server
            .post("/api/auth/forgot-password")
            .json(&json!({ "email": "nobody@example.com" }))
            .await;
        unknown.assert_status_ok();

        let registered: serde_json::Value = registered.json();
        let unknown: serde_json::Value = unknown.json();
        assert_eq!(registered, unknown);
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("clinics", "users")))]
    async fn test_password_reset_flow(pool: PgPool) -> sqlx::Result<()> {
        let server = create_test_server(create_test_state(pool.clone()));
        server
            .post("/api/auth/register")
            .json(&registration("forgetful", "forgetful@example.com"))
            .await
            .assert_status(axum::http::StatusCode::CREATED);

        server
            .post("/api/auth/forgot-password")
            .json(&json!({ "email": "forgetful@example.com" }))
            .await
            .assert_status_ok();

        // Il link arriva via email: il token si legge dal database
        let token: String = sqlx::query_scalar(
            "SELECT t.token FROM password_reset_tokens t JOIN users u ON u.user_id = t.user_id \
             WHERE u.username = 'forgetful' AND t.used_at IS NULL",
        )
        .fetch_one(&pool)
        .await?;

        let reset = json!({ "token": token, "new_password": "BrandNew456" });
        server
            .post("/api/auth/reset-password")
            .json(&reset)
            .await
            .assert_status_ok();

        // Il token è monouso
        server
            .post("/api/auth/reset-password")
            .json(&reset)
            .await
            .assert_status_bad_request();

        server
            .post("/api/auth/login")
            .json(&json!({ "login": "forgetful", "password": "TestLogin123" }))
            .await
            .assert_status_unauthorized();
        server
            .post("/api/auth/login")
            .json(&json!({ "login": "forgetful", "password": "BrandNew456" }))
            .await
            .assert_status_ok();
        Ok(())
    }
}
