//! PetConnect server library - espone i moduli principali per i test

pub mod core;
pub mod domain;
pub mod dtos;
pub mod entities;
pub mod mailer;
pub mod repositories;
pub mod services;
pub mod storage;

// Re-export dei tipi principali per facilitare l'import
pub use crate::core::{AppError, AppState, auth, config};
pub use services::health;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method, header},
    middleware,
    routing::{get, post, put},
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::warn;

/// Crea il router principale dell'applicazione, con tutte le rotte sotto `/api`
pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = cors_layer(&state.config.cors_allowed_origin);

    let api = Router::new()
        .route("/health", get(health))
        .nest("/auth", configure_auth_routes())
        .nest("/users", configure_user_routes(state.clone()))
        .nest("/clinics", configure_clinic_routes(state.clone()))
        .nest("/staff", configure_staff_routes(state.clone()))
        .nest("/breeds", configure_breed_routes(state.clone()))
        .nest("/pets", configure_pet_routes(state.clone()))
        .nest("/records", configure_record_routes(state.clone()))
        .nest("/certificates", configure_certificate_routes(state.clone()));

    Router::new()
        .nest("/api", api)
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// CORS per il frontend configurato; un'origine non valida disabilita le richieste cross-origin
fn cors_layer(origin: &str) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true);
    match origin.parse::<HeaderValue>() {
        Ok(origin) => layer.allow_origin(origin),
        Err(_) => {
            warn!("Invalid CORS_ALLOWED_ORIGIN '{}', cross-origin requests disabled", origin);
            layer
        }
    }
}

/// Configura le routes di autenticazione (pubbliche)
fn configure_auth_routes() -> Router<Arc<AppState>> {
    use crate::services::*;
    Router::new()
        .route("/register", post(register_user))
        .route("/login", post(login_user))
        .route("/forgot-password", post(forgot_password))
        .route("/reset-password", post(reset_password))
}

/// Configura le routes per il profilo e la gestione degli utenti
fn configure_user_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    use crate::core::authentication_middleware;
    use crate::services::*;

    Router::new()
        .route("/", get(list_users))
        .route("/me", get(get_me).patch(update_me).delete(delete_my_account))
        .route("/me/password", put(change_password))
        .route("/{user_id}", get(get_user_by_id))
        .layer(middleware::from_fn_with_state(
            state,
            authentication_middleware,
        ))
}

fn configure_clinic_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    use crate::core::authentication_middleware;
    use crate::services::*;

    Router::new()
        .route("/", get(list_clinics).post(create_clinic))
        .route(
            "/{clinic_id}",
            get(get_clinic).patch(update_clinic).delete(delete_clinic),
        )
        .route("/{clinic_id}/staff", get(list_clinic_staff))
        .layer(middleware::from_fn_with_state(
            state,
            authentication_middleware,
        ))
}

fn configure_staff_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    use crate::core::authentication_middleware;
    use crate::services::*;

    Router::new()
        .route("/", get(list_staff).post(create_staff))
        .route(
            "/{staff_id}",
            get(get_staff).patch(update_staff).delete(deactivate_staff),
        )
        .layer(middleware::from_fn_with_state(
            state,
            authentication_middleware,
        ))
}

fn configure_breed_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    use crate::core::authentication_middleware;
    use crate::services::*;

    Router::new()
        .route("/", get(list_breeds).post(create_breed))
        .layer(middleware::from_fn_with_state(
            state,
            authentication_middleware,
        ))
}

/// Configura le routes dei pet, incluse cartelle cliniche, stato antirabbico e certificati
fn configure_pet_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    use crate::core::authentication_middleware;
    use crate::services::*;

    // oltre il limite l'handler riceve una BytesRejection e risponde 413 in JSON
    let photo_limit = state.config.max_photo_bytes;

    Router::new()
        .route("/", get(list_pets).post(create_pet))
        .route("/{pet_id}", get(get_pet).patch(update_pet).delete(delete_pet))
        .route(
            "/{pet_id}/photo",
            get(get_pet_photo)
                .put(upload_pet_photo)
                .layer(DefaultBodyLimit::max(photo_limit)),
        )
        .route(
            "/{pet_id}/records",
            get(list_pet_records).post(create_record),
        )
        .route("/{pet_id}/rabies-status", get(rabies_status))
        .route("/{pet_id}/ahc-eligibility", get(ahc_eligibility))
        .route("/{pet_id}/certificates", get(list_pet_certificates))
        .layer(middleware::from_fn_with_state(
            state,
            authentication_middleware,
        ))
}

fn configure_record_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    use crate::core::authentication_middleware;
    use crate::services::*;

    Router::new()
        .route(
            "/{record_id}",
            get(get_record).patch(update_record).delete(delete_record),
        )
        .route("/{record_id}/sign", post(sign_record))
        .route("/{record_id}/verify", get(verify_record))
        .layer(middleware::from_fn_with_state(
            state,
            authentication_middleware,
        ))
}

fn configure_certificate_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    use crate::core::authentication_middleware;
    use crate::services::*;

    Router::new()
        .route("/", post(issue_certificate))
        .route("/{certificate_id}", get(get_certificate))
        .route("/{certificate_id}/verify", get(verify_certificate))
        .layer(middleware::from_fn_with_state(
            state,
            authentication_middleware,
        ))
}
