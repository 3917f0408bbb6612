//! Integration tests per gli endpoints degli utenti
//!
//! Test per:
//! - GET/PATCH/DELETE /api/users/me, PUT /api/users/me/password
//! - GET /api/users?role=..., GET /api/users/{user_id}

mod common;

#[cfg(test)]
mod user_tests {
    use super::common::*;
    use axum::http::StatusCode;
    use serde_json::json;
    use sqlx::PgPool;

    #[sqlx::test(fixtures(path = "../fixtures", scripts("clinics", "users")))]
    async fn test_get_me_hides_secrets(pool: PgPool) -> sqlx::Result<()> {
        let server = create_test_server(create_test_state(pool));
        let response = server
            .get("/api/users/me")
            .add_header(auth_header(), bearer(&vet_rossi_token()))
            .await;

        response.assert_status_ok();
        let me: serde_json::Value = response.json();
        assert_eq!(me["id"], VET_ROSSI_ID);
        assert_eq!(me["role"], "VET");
        assert_eq!(me["license_number"], "VET-0001");
        assert!(me.get("password").is_none());
        assert!(me.get("signing_key").is_none());
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("clinics", "users")))]
    async fn test_update_me(pool: PgPool) -> sqlx::Result<()> {
        let server = create_test_server(create_test_state(pool));
        let response = server
            .patch("/api/users/me")
            .add_header(auth_header(), bearer(&anna_token()))
            .json(&json!({ "first_name": "Annalisa", "phone": "+39 333 7654321" }))
            .await;

        response.assert_status_ok();
        let me: serde_json::Value = response.json();
        assert_eq!(me["first_name"], "Annalisa");
        assert_eq!(me["last_name"], "Bianchi");
        assert_eq!(me["phone"], "+39 333 7654321");
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("clinics", "users")))]
    async fn test_update_me_cannot_change_role_fields(pool: PgPool) -> sqlx::Result<()> {
        let server = create_test_server(create_test_state(pool));
        // is_active e clinic_id non sono deserializzati su /me
        let response = server
            .patch("/api/users/me")
            .add_header(auth_header(), bearer(&staff_token()))
            .json(&json!({ "last_name": "Neri-Bruni", "is_active": false, "clinic_id": 2 }))
            .await;

        response.assert_status_ok();
        let me: serde_json::Value = response.json();
        assert_eq!(me["is_active"], true);
        assert_eq!(me["clinic_id"], 1);
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("clinics", "users")))]
    async fn test_update_me_email_taken(pool: PgPool) -> sqlx::Result<()> {
        let server = create_test_server(create_test_state(pool));
        let response = server
            .patch("/api/users/me")
            .add_header(auth_header(), bearer(&anna_token()))
            .json(&json!({ "email": "marco@example.com" }))
            .await;
        response.assert_status_conflict();
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("clinics", "users")))]
    async fn test_change_password(pool: PgPool) -> sqlx::Result<()> {
        let server = create_test_server(create_test_state(pool));
        let register = server
            .post("/api/auth/register")
            .json(&json!({
                "username": "pwchange",
                "email": "pwchange@example.com",
                "password": "OldPassword1",
                "first_name": "Pia",
                "last_name": "Conti"
            }))
            .await;
        register.assert_status(StatusCode::CREATED);

        let login: serde_json::Value = server
            .post("/api/auth/login")
            .json(&json!({ "login": "pwchange", "password": "OldPassword1" }))
            .await
            .json();
        let token = login["token"].as_str().unwrap().to_string();

        server
            .put("/api/users/me/password")
            .add_header(auth_header(), bearer(&token))
            .json(&json!({ "current_password": "WrongOld1", "new_password": "NewPassword2" }))
            .await
            .assert_status_unauthorized();

        server
            .put("/api/users/me/password")
            .add_header(auth_header(), bearer(&token))
            .json(&json!({ "current_password": "OldPassword1", "new_password": "NewPassword2" }))
            .await
            .assert_status_ok();

        server
            .post("/api/auth/login")
            .json(&json!({ "login": "pwchange", "password": "NewPassword2" }))
            .await
            .assert_status_ok();
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("clinics", "users", "pets")))]
    async fn test_delete_me_refused_while_owning_pets(pool: PgPool) -> sqlx::Result<()> {
        let server = create_test_server(create_test_state(pool));
        let response = server
            .delete("/api/users/me")
            .add_header(auth_header(), bearer(&anna_token()))
            .await;
        response.assert_status_conflict();
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("clinics", "users")))]
    async fn test_delete_me_owner_without_pets(pool: PgPool) -> sqlx::Result<()> {
        let server = create_test_server(create_test_state(pool));
        let response = server
            .delete("/api/users/me")
            .add_header(auth_header(), bearer(&marco_token()))
            .await;

        response.assert_status_ok();
        let cookie = response.headers().get("set-cookie").unwrap().to_str().unwrap();
        assert!(cookie.contains("Max-Age=0"));

        // Il token non è più valido: l'utente non esiste
        server
            .get("/api/users/me")
            .add_header(auth_header(), bearer(&marco_token()))
            .await
            .assert_status_unauthorized();
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("clinics", "users")))]
    async fn test_delete_me_forbidden_for_staff(pool: PgPool) -> sqlx::Result<()> {
        let server = create_test_server(create_test_state(pool));
        let response = server
            .delete("/api/users/me")
            .add_header(auth_header(), bearer(&vet_rossi_token()))
            .await;
        response.assert_status_forbidden();
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("clinics", "users")))]
    async fn test_list_users_admin_only(pool: PgPool) -> sqlx::Result<()> {
        let server = create_test_server(create_test_state(pool));

        let response = server
            .get("/api/users")
            .add_query_param("role", "VET")
            .add_header(auth_header(), bearer(&admin_token()))
            .await;
        response.assert_status_ok();
        let vets: Vec<serde_json::Value> = response.json();
        assert_eq!(vets.len(), 3);
        assert!(vets.iter().all(|u| u["role"] == "VET"));

        server
            .get("/api/users")
            .add_header(auth_header(), bearer(&anna_token()))
            .await
            .assert_status_forbidden();
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("clinics", "users")))]
    async fn test_get_user_by_id(pool: PgPool) -> sqlx::Result<()> {
        let server = create_test_server(create_test_state(pool));

        let response = server
            .get(&format!("/api/users/{}", OWNER_ANNA_ID))
            .add_header(auth_header(), bearer(&admin_token()))
            .await;
        response.assert_status_ok();
        let user: serde_json::Value = response.json();
        assert_eq!(user["username"], "anna");

        server
            .get("/api/users/9999")
            .add_header(auth_header(), bearer(&admin_token()))
            .await
            .assert_status_not_found();

        server
            .get(&format!("/api/users/{}", OWNER_MARCO_ID))
            .add_header(auth_header(), bearer(&anna_token()))
            .await
            .assert_status_forbidden();
        Ok(())
    }
}
