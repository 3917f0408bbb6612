//! Integration tests per i pet
//!
//! Test per:
//! - anagrafica (/api/pets)
//! - foto (/api/pets/{pet_id}/photo)

mod common;

#[cfg(test)]
mod pet_tests {
    use super::common::*;
    use axum::http::StatusCode;
    use serde_json::json;
    use sqlx::PgPool;

    fn new_pet() -> serde_json::Value {
        json!({
            "name": "Birba",
            "species": "DOG",
            "breed_id": 1,
            "sex": "FEMALE",
            "date_of_birth": "2023-09-01",
            "microchip_number": "981000000000099",
            "microchip_implanted_on": "2023-11-01"
        })
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("clinics", "users", "pets")))]
    async fn test_owner_sees_only_own_pets(pool: PgPool) -> sqlx::Result<()> {
        let server = create_test_server(create_test_state(pool));

        // il filtro owner_id viene ignorato per gli owner
        let response = server
            .get("/api/pets")
            .add_query_param("owner_id", OWNER_MARCO_ID)
            .add_header(auth_header(), bearer(&anna_token()))
            .await;
        response.assert_status_ok();
        let pets: Vec<serde_json::Value> = response.json();
        assert_eq!(pets.len(), 1);
        assert_eq!(pets[0]["name"], "Fido");

        let response = server
            .get("/api/pets")
            .add_header(auth_header(), bearer(&vet_verdi_token()))
            .await;
        let pets: Vec<serde_json::Value> = response.json();
        assert_eq!(pets.len(), 2);

        server
            .get("/api/pets/2")
            .add_header(auth_header(), bearer(&anna_token()))
            .await
            .assert_status_forbidden();

        server
            .get("/api/pets/2")
            .add_header(auth_header(), bearer(&staff_token()))
            .await
            .assert_status_ok();

        server
            .get("/api/pets/99")
            .add_header(auth_header(), bearer(&admin_token()))
            .await
            .assert_status_not_found();
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("clinics", "users", "pets")))]
    async fn test_owner_registers_pet(pool: PgPool) -> sqlx::Result<()> {
        let server = create_test_server(create_test_state(pool));

        let mut body = new_pet();
        // un owner non può registrare pet per altri
        body["owner_id"] = json!(OWNER_MARCO_ID);
        let response = server
            .post("/api/pets")
            .add_header(auth_header(), bearer(&anna_token()))
            .json(&body)
            .await;
        response.assert_status(StatusCode::CREATED);
        let pet: serde_json::Value = response.json();
        assert_eq!(pet["owner_id"], OWNER_ANNA_ID);
        assert_eq!(pet["species"], "DOG");
        assert!(pet["photo_url"].is_null());

        // stesso microchip
        server
            .post("/api/pets")
            .add_header(auth_header(), bearer(&marco_token()))
            .json(&new_pet())
            .await
            .assert_status_conflict();
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("clinics", "users", "pets")))]
    async fn test_create_pet_rules(pool: PgPool) -> sqlx::Result<()> {
        let server = create_test_server(create_test_state(pool));

        server
            .post("/api/pets")
            .add_header(auth_header(), bearer(&vet_rossi_token()))
            .json(&new_pet())
            .await
            .assert_status_forbidden();

        // razza di un'altra specie
        let mut wrong_breed = new_pet();
        wrong_breed["breed_id"] = json!(2);
        server
            .post("/api/pets")
            .add_header(auth_header(), bearer(&anna_token()))
            .json(&wrong_breed)
            .await
            .assert_status_bad_request();

        let mut unborn = new_pet();
        unborn["date_of_birth"] = json!("2999-01-01");
        unborn["microchip_implanted_on"] = serde_json::Value::Null;
        server
            .post("/api/pets")
            .add_header(auth_header(), bearer(&anna_token()))
            .json(&unborn)
            .await
            .assert_status_bad_request();

        // l'admin deve indicare un owner
        server
            .post("/api/pets")
            .add_header(auth_header(), bearer(&admin_token()))
            .json(&new_pet())
            .await
            .assert_status_bad_request();

        let mut for_marco = new_pet();
        for_marco["owner_id"] = json!(OWNER_MARCO_ID);
        let response = server
            .post("/api/pets")
            .add_header(auth_header(), bearer(&admin_token()))
            .json(&for_marco)
            .await;
        response.assert_status(StatusCode::CREATED);
        let pet: serde_json::Value = response.json();
        assert_eq!(pet["owner_id"], OWNER_MARCO_ID);
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("clinics", "users", "pets")))]
    async fn test_update_pet(pool: PgPool) -> sqlx::Result<()> {
        let server = create_test_server(create_test_state(pool));

        let response = server
            .patch("/api/pets/2")
            .add_header(auth_header(), bearer(&marco_token()))
            .json(&json!({
                "microchip_number": "981000000000002",
                "microchip_implanted_on": "2023-08-01"
            }))
            .await;
        response.assert_status_ok();
        let pet: serde_json::Value = response.json();
        assert_eq!(pet["microchip_number"], "981000000000002");
        assert_eq!(pet["name"], "Micio");

        // microchip già di Fido
        server
            .patch("/api/pets/2")
            .add_header(auth_header(), bearer(&marco_token()))
            .json(&json!({ "microchip_number": "981000000000001" }))
            .await
            .assert_status_conflict();

        // impianto prima della nascita
        server
            .patch("/api/pets/2")
            .add_header(auth_header(), bearer(&marco_token()))
            .json(&json!({ "microchip_implanted_on": "2020-01-01" }))
            .await
            .assert_status_bad_request();

        server
            .patch("/api/pets/2")
            .add_header(auth_header(), bearer(&vet_verdi_token()))
            .json(&json!({ "name": "Mici" }))
            .await
            .assert_status_forbidden();
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("clinics", "users", "pets")))]
    async fn test_delete_pet(pool: PgPool) -> sqlx::Result<()> {
        let server = create_test_server(create_test_state(pool));

        server
            .delete("/api/pets/2")
            .add_header(auth_header(), bearer(&anna_token()))
            .await
            .assert_status_forbidden();

        server
            .delete("/api/pets/2")
            .add_header(auth_header(), bearer(&marco_token()))
            .await
            .assert_status(StatusCode::NO_CONTENT);

        server
            .get("/api/pets/2")
            .add_header(auth_header(), bearer(&admin_token()))
            .await
            .assert_status_not_found();
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("clinics", "users", "pets", "records")))]
    async fn test_delete_pet_with_records_is_refused(pool: PgPool) -> sqlx::Result<()> {
        let server = create_test_server(create_test_state(pool));
        server
            .delete("/api/pets/1")
            .add_header(auth_header(), bearer(&anna_token()))
            .await
            .assert_status_conflict();
        Ok(())
    }
}

#[cfg(test)]
mod photo_tests {
    use super::common::*;
    use axum::body::Bytes;
    use sqlx::PgPool;

    // header PNG seguito da qualche byte: il contenuto non viene decodificato
    const PNG: &[u8] = &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a, 1, 2, 3, 4];

    #[sqlx::test(fixtures(path = "../fixtures", scripts("clinics", "users", "pets")))]
    async fn test_upload_and_download_photo(pool: PgPool) -> sqlx::Result<()> {
        let server = create_test_server(create_test_state(pool));

        server
            .get("/api/pets/1/photo")
            .add_header(auth_header(), bearer(&anna_token()))
            .await
            .assert_status_not_found();

        let response = server
            .put("/api/pets/1/photo")
            .add_header(auth_header(), bearer(&anna_token()))
            .content_type("image/png")
            .bytes(Bytes::from_static(PNG))
            .await;
        response.assert_status_ok();
        let pet: serde_json::Value = response.json();
        assert_eq!(pet["photo_url"], "/api/pets/1/photo");

        // lo staff può vedere la foto
        let response = server
            .get("/api/pets/1/photo")
            .add_header(auth_header(), bearer(&vet_rossi_token()))
            .await;
        response.assert_status_ok();
        assert_eq!(response.header("content-type"), "image/png");
        assert_eq!(response.as_bytes().as_ref(), PNG);

        // la nuova foto sostituisce la precedente
        server
            .put("/api/pets/1/photo")
            .add_header(auth_header(), bearer(&anna_token()))
            .content_type("image/jpeg")
            .bytes(Bytes::from_static(b"\xff\xd8\xff\xe0jpeg"))
            .await
            .assert_status_ok();
        let response = server
            .get("/api/pets/1/photo")
            .add_header(auth_header(), bearer(&anna_token()))
            .await;
        assert_eq!(response.header("content-type"), "image/jpeg");
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("clinics", "users", "pets")))]
    async fn test_photo_rejections(pool: PgPool) -> sqlx::Result<()> {
        let server = create_test_server(create_test_state(pool));

        server
            .put("/api/pets/1/photo")
            .add_header(auth_header(), bearer(&anna_token()))
            .content_type("application/pdf")
            .bytes(Bytes::from_static(b"%PDF-1.7"))
            .await
            .assert_status(axum::http::StatusCode::UNSUPPORTED_MEDIA_TYPE);

        server
            .put("/api/pets/1/photo")
            .add_header(auth_header(), bearer(&anna_token()))
            .content_type("image/png")
            .bytes(Bytes::new())
            .await
            .assert_status_bad_request();

        server
            .put("/api/pets/1/photo")
            .add_header(auth_header(), bearer(&marco_token()))
            .content_type("image/png")
            .bytes(Bytes::from_static(PNG))
            .await
            .assert_status_forbidden();

        // oltre il limite di 1 MiB della configurazione di test
        for size in [1024 * 1024 + 1, 2 * 1024 * 1024] {
            let response = server
                .put("/api/pets/1/photo")
                .add_header(auth_header(), bearer(&anna_token()))
                .content_type("image/png")
                .bytes(Bytes::from(vec![0u8; size]))
                .await;
            response.assert_status(axum::http::StatusCode::PAYLOAD_TOO_LARGE);
            let error: serde_json::Value = response.json();
            assert_eq!(error["error"], "Photo is too large");
            assert_eq!(error["details"], "Maximum size is 1048576 bytes");
        }

        // esattamente al limite è accettata
        server
            .put("/api/pets/1/photo")
            .add_header(auth_header(), bearer(&anna_token()))
            .content_type("image/png")
            .bytes(Bytes::from(vec![0u8; 1024 * 1024]))
            .await
            .assert_status_ok();
        Ok(())
    }
}
