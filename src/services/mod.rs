//! Services module - Coordinatore per tutti i service handler HTTP
//!
//! Questo modulo organizza i service handlers in sotto-moduli separati per una migliore manutenibilità.
//! Ogni modulo gestisce gli endpoint HTTP per una specifica risorsa.

pub mod auth;
pub mod breed;
pub mod certificate;
pub mod clinic;
pub mod pet;
pub mod record;
pub mod staff;
pub mod user;

// Re-exports per facilitare l'import
pub use auth::{forgot_password, login_user, register_user, reset_password};
pub use breed::{create_breed, list_breeds};
pub use certificate::{
    ahc_eligibility, get_certificate, issue_certificate, list_pet_certificates, rabies_status,
    verify_certificate,
};
pub use clinic::{
    create_clinic, delete_clinic, get_clinic, list_clinic_staff, list_clinics, update_clinic,
};
pub use pet::{
    create_pet, delete_pet, get_pet, get_pet_photo, list_pets, update_pet, upload_pet_photo,
};
pub use record::{
    create_record, delete_record, get_record, list_pet_records, sign_record, update_record,
    verify_record,
};
pub use staff::{create_staff, deactivate_staff, get_staff, list_staff, update_staff};
pub use user::{change_password, delete_my_account, get_me, get_user_by_id, list_users, update_me};

use crate::AppState;
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde_json::json;
use std::sync::Arc;

/// Health check
pub async fn health(State(_state): State<Arc<AppState>>) -> impl IntoResponse {
    (StatusCode::OK, Json(json!({ "status": "ok" })))
}
