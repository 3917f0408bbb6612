//! Certificate services - Stato antirabbico, idoneità e rilascio degli AHC
//!
//! Un Animal Health Certificate viene emesso solo se tutti i requisiti sono soddisfatti,
//! ed è firmato con la chiave del vet che lo rilascia.

use super::pet::load_pet;
use crate::core::{AppError, AppState, require_role};
use crate::domain::policy::ensure_can_view_pet;
use crate::domain::signing::{self, CertificatePayload};
use crate::domain::{AhcAssessment, RabiesWindow, ahc, rabies};
use crate::dtos::{
    CertificateDTO, CreateCertificateDTO, EligibilityQuery, IssueCertificateRequestDTO,
    RabiesStatusDTO, RabiesStatusQuery, SignatureVerificationDTO,
};
use crate::entities::{Certificate, User, UserRole};
use crate::repositories::{Create, Read};
use axum::{
    Extension,
    extract::{Json, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::{Datelike, NaiveDate, Utc};
use rand::RngCore;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};
use validator::Validate;

/// Finestre antirabbiche del pet, calcolate dai soli record firmati
async fn rabies_windows(state: &AppState, pet_id: &i32) -> Result<Vec<RabiesWindow>, AppError> {
    let records = state.record.list_signed_rabies_by_pet(pet_id).await?;
    Ok(rabies::windows_from_records(&records))
}

/// `AHC-<anno>-<pet>-<8 hex>`
fn certificate_number(issue_date: NaiveDate, pet_id: i32) -> String {
    let mut suffix = [0u8; 4];
    rand::rng().fill_bytes(&mut suffix);
    format!(
        "AHC-{}-{}-{}",
        issue_date.year(),
        pet_id,
        hex::encode_upper(suffix)
    )
}

fn payload(certificate: &Certificate) -> String {
    CertificatePayload {
        certificate_number: &certificate.certificate_number,
        pet_id: certificate.pet_id,
        vet_id: certificate.vet_id,
        clinic_id: certificate.clinic_id,
        rabies_record_id: certificate.rabies_record_id,
        destination_country: &certificate.destination_country,
        issue_date: certificate.issue_date,
        travel_date: certificate.travel_date,
        entry_valid_until: certificate.entry_valid_until,
        onward_valid_until: certificate.onward_valid_until,
    }
    .canonical()
}

async fn load_certificate(state: &AppState, certificate_id: &i32) -> Result<Certificate, AppError> {
    state
        .certificate
        .read(certificate_id)
        .await?
        .ok_or_else(|| {
            warn!("Certificate {} not found", certificate_id);
            AppError::not_found("Certificate not found")
        })
}

#[instrument(skip(state, current_user), fields(user_id = %current_user.user_id, pet_id = %pet_id, on = ?params.on))]
pub async fn rabies_status(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    Path(pet_id): Path<i32>,
    Query(params): Query<RabiesStatusQuery>, // query params ?on=2025-05-01
) -> Result<Json<RabiesStatusDTO>, AppError> {
    let pet = load_pet(&state, &pet_id).await?;
    ensure_can_view_pet(&current_user, &pet)?;

    let on = params.on.unwrap_or_else(|| Utc::now().date_naive());
    let windows = rabies_windows(&state, &pet.pet_id).await?;
    let status = rabies::status_on(&windows, on);
    debug!("Rabies status: {:?}", status);

    Ok(Json(RabiesStatusDTO {
        pet_id: pet.pet_id,
        on,
        status,
        vaccinations: windows,
    }))
}

#[instrument(skip(state, current_user), fields(user_id = %current_user.user_id, pet_id = %pet_id, travel_date = %params.travel_date))]
pub async fn ahc_eligibility(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    Path(pet_id): Path<i32>,
    Query(params): Query<EligibilityQuery>, // query params ?travel_date=...&issue_date=...
) -> Result<Json<AhcAssessment>, AppError> {
    let pet = load_pet(&state, &pet_id).await?;
    ensure_can_view_pet(&current_user, &pet)?;

    let today = Utc::now().date_naive();
    let windows = rabies_windows(&state, &pet.pet_id).await?;
    let assessment = ahc::assess(
        &pet,
        &windows,
        params.issue_date.unwrap_or(today),
        params.travel_date,
        today,
    );
    info!(
        "Eligibility computed: eligible={} reasons={}",
        assessment.eligible,
        assessment.reasons.len()
    );
    Ok(Json(assessment))
}

#[instrument(skip(state, current_user, body), fields(user_id = %current_user.user_id, pet_id = %body.pet_id, destination = %body.destination_country))]
pub async fn issue_certificate(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    Json(body): Json<IssueCertificateRequestDTO>,
) -> Result<impl IntoResponse, AppError> {
    info!("Issuing AHC");
    // 1. Solo un vet assegnato ad una clinica può rilasciare certificati
    // 2. Valutare l'idoneità: se fallisce, 422 con tutti i motivi
    // 3. Calcolare le scadenze, generare il numero, firmare e salvare
    require_role(&current_user, &[UserRole::Vet])?;
    body.validate()?;

    let clinic_id = current_user
        .clinic_id
        .ok_or_else(|| AppError::forbidden("Vet is not assigned to a clinic"))?;
    let key = current_user.signing_key.as_deref().ok_or_else(|| {
        error!("Vet {} has no signing key", current_user.user_id);
        AppError::internal_server_error("Vet has no signing key")
    })?;

    let pet = load_pet(&state, &body.pet_id).await?;
    let today = Utc::now().date_naive();
    let issue_date = body.issue_date.unwrap_or(today);
    let windows = rabies_windows(&state, &pet.pet_id).await?;
    let assessment = ahc::assess(&pet, &windows, issue_date, body.travel_date, today);

    let (rabies, entry_valid_until, onward_valid_until) = match (
        assessment.eligible,
        assessment.rabies,
        assessment.entry_valid_until,
        assessment.onward_valid_until,
    ) {
        (true, Some(rabies), Some(entry), Some(onward)) => (rabies, entry, onward),
        _ => {
            warn!("Pet not eligible: {}", assessment.reasons_summary());
            return Err(AppError::unprocessable("Pet is not eligible for an AHC")
                .with_details(assessment.reasons_summary()));
        }
    };

    let mut number = certificate_number(issue_date, pet.pet_id);
    while state.certificate.find_by_number(&number).await?.is_some() {
        debug!("Certificate number collision, generating a new one");
        number = certificate_number(issue_date, pet.pet_id);
    }
    let signature = signing::sign(
        key,
        &CertificatePayload {
            certificate_number: &number,
            pet_id: pet.pet_id,
            vet_id: current_user.user_id,
            clinic_id,
            rabies_record_id: rabies.record_id,
            destination_country: &body.destination_country,
            issue_date,
            travel_date: body.travel_date,
            entry_valid_until,
            onward_valid_until,
        }
        .canonical(),
    )?;

    let new_certificate = CreateCertificateDTO {
        certificate_number: number,
        pet_id: pet.pet_id,
        vet_id: current_user.user_id,
        clinic_id,
        rabies_record_id: rabies.record_id,
        destination_country: body.destination_country,
        issue_date,
        travel_date: body.travel_date,
        entry_valid_until,
        onward_valid_until,
        signature,
    };
    let certificate = state.certificate.create(&new_certificate).await?;
    info!("Certificate {} issued", certificate.certificate_number);
    Ok((StatusCode::CREATED, Json(CertificateDTO::from(certificate))))
}

#[instrument(skip(state, current_user), fields(user_id = %current_user.user_id, certificate_id = %certificate_id))]
pub async fn get_certificate(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    Path(certificate_id): Path<i32>,
) -> Result<Json<CertificateDTO>, AppError> {
    let certificate = load_certificate(&state, &certificate_id).await?;
    let pet = load_pet(&state, &certificate.pet_id).await?;
    ensure_can_view_pet(&current_user, &pet)?;
    Ok(Json(CertificateDTO::from(certificate)))
}

#[instrument(skip(state, current_user), fields(user_id = %current_user.user_id, pet_id = %pet_id))]
pub async fn list_pet_certificates(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    Path(pet_id): Path<i32>,
) -> Result<Json<Vec<CertificateDTO>>, AppError> {
    let pet = load_pet(&state, &pet_id).await?;
    ensure_can_view_pet(&current_user, &pet)?;

    let certificates = state.certificate.list_by_pet(&pet.pet_id).await?;
    debug!("Found {} certificates", certificates.len());
    Ok(Json(certificates.into_iter().map(CertificateDTO::from).collect()))
}

#[instrument(skip(state, current_user), fields(user_id = %current_user.user_id, certificate_id = %certificate_id))]
pub async fn verify_certificate(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    Path(certificate_id): Path<i32>,
) -> Result<Json<SignatureVerificationDTO>, AppError> {
    let certificate = load_certificate(&state, &certificate_id).await?;
    let pet = load_pet(&state, &certificate.pet_id).await?;
    ensure_can_view_pet(&current_user, &pet)?;

    let vet = state
        .user
        .read(&certificate.vet_id)
        .await?
        .ok_or_else(|| AppError::internal_server_error("Issuing vet not found"))?;
    let key = vet
        .signing_key
        .as_deref()
        .ok_or_else(|| AppError::internal_server_error("Vet has no signing key"))?;
    let valid = signing::verify(key, &payload(&certificate), &certificate.signature)?;
    if !valid {
        warn!("Certificate signature does not match its content");
    }

    Ok(Json(SignatureVerificationDTO {
        document: "certificate".to_string(),
        id: certificate.certificate_id,
        signed_by: Some(certificate.vet_id),
        signed_at: Some(certificate.created_at),
        valid,
    }))
}
