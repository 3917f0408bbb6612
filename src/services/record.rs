//! Record services - Cartelle cliniche, firma e verifica
//!
//! Un record appartiene al vet che l'ha scritto: solo lui lo modifica e lo firma.
//! Una volta firmato il record è immutabile.

use super::pet::load_pet;
use crate::core::{AppError, AppState, require_role};
use crate::domain::policy::{self, ensure_can_view_pet};
use crate::domain::signing;
use crate::dtos::record::check_vaccine_presence;
use crate::dtos::{
    CreateRecordDTO, CreateRecordRequestDTO, RecordDTO, SignatureVerificationDTO, UpdateRecordDTO,
};
use crate::entities::{Pet, Record, User, UserRole};
use crate::repositories::{Create, Delete, Read, Update};
use axum::{
    Extension,
    extract::{Json, Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::{NaiveDate, Utc};
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};
use validator::Validate;

async fn load_record(state: &AppState, record_id: &i32) -> Result<Record, AppError> {
    state.record.read(record_id).await?.ok_or_else(|| {
        warn!("Record {} not found", record_id);
        AppError::not_found("Record not found")
    })
}

fn ensure_not_future(visit_date: NaiveDate) -> Result<(), AppError> {
    if visit_date > Utc::now().date_naive() {
        return Err(AppError::bad_request("Visit date cannot be in the future"));
    }
    Ok(())
}

fn ensure_after_birth(visit_date: NaiveDate, pet: &Pet) -> Result<(), AppError> {
    if visit_date < pet.date_of_birth {
        return Err(AppError::bad_request("Visit date precedes the date of birth"));
    }
    Ok(())
}

fn ensure_author(user: &User, record: &Record) -> Result<(), AppError> {
    if !policy::is_record_author(user, record) {
        warn!("User {} is not the author of record {}", user.user_id, record.record_id);
        return Err(AppError::forbidden("Only the authoring vet can modify this record"));
    }
    Ok(())
}

fn ensure_unsigned(record: &Record) -> Result<(), AppError> {
    if record.is_signed() {
        warn!("Record {} is signed", record.record_id);
        return Err(AppError::conflict("Signed records cannot be modified"));
    }
    Ok(())
}

/// Chiave di firma di un vet, errore se manca
fn signing_key(vet: &User) -> Result<&str, AppError> {
    vet.signing_key.as_deref().ok_or_else(|| {
        error!("Vet {} has no signing key", vet.user_id);
        AppError::internal_server_error("Vet has no signing key")
    })
}

#[instrument(skip(state, current_user), fields(user_id = %current_user.user_id, pet_id = %pet_id))]
pub async fn list_pet_records(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    Path(pet_id): Path<i32>,
) -> Result<Json<Vec<RecordDTO>>, AppError> {
    let pet = load_pet(&state, &pet_id).await?;
    ensure_can_view_pet(&current_user, &pet)?;

    let records = state.record.list_by_pet(&pet.pet_id).await?;
    debug!("Found {} records", records.len());
    Ok(Json(records.into_iter().map(RecordDTO::from).collect()))
}

#[instrument(skip(state, current_user, body), fields(user_id = %current_user.user_id, pet_id = %pet_id, record_type = ?body.record_type))]
pub async fn create_record(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    Path(pet_id): Path<i32>,
    Json(body): Json<CreateRecordRequestDTO>,
) -> Result<impl IntoResponse, AppError> {
    debug!("Creating record");
    // 1. Solo i vet scrivono record, nella clinica a cui sono assegnati
    // 2. Validare il DTO (dettagli vaccino solo per VACCINATION) e la data della visita
    // 3. Il pet deve esistere
    require_role(&current_user, &[UserRole::Vet])?;
    body.validate()?;
    ensure_not_future(body.visit_date)?;

    let clinic_id = current_user.clinic_id.ok_or_else(|| {
        warn!("Vet without clinic");
        AppError::forbidden("Vet is not assigned to a clinic")
    })?;
    let pet = load_pet(&state, &pet_id).await?;

    ensure_after_birth(body.visit_date, &pet)?;

    let new_record = CreateRecordDTO {
        pet_id: pet.pet_id,
        vet_id: current_user.user_id,
        clinic_id,
        record_type: body.record_type,
        title: body.title,
        description: body.description,
        visit_date: body.visit_date,
        vaccine: body.vaccine,
    };
    let record = state.record.create(&new_record).await?;
    info!("Record {} created", record.record_id);
    Ok((StatusCode::CREATED, Json(RecordDTO::from(record))))
}

#[instrument(skip(state, current_user), fields(user_id = %current_user.user_id, record_id = %record_id))]
pub async fn get_record(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    Path(record_id): Path<i32>,
) -> Result<Json<RecordDTO>, AppError> {
    let record = load_record(&state, &record_id).await?;
    let pet = load_pet(&state, &record.pet_id).await?;
    ensure_can_view_pet(&current_user, &pet)?;
    Ok(Json(RecordDTO::from(record)))
}

#[instrument(skip(state, current_user, body), fields(user_id = %current_user.user_id, record_id = %record_id))]
pub async fn update_record(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    Path(record_id): Path<i32>,
    Json(body): Json<UpdateRecordDTO>,
) -> Result<Json<RecordDTO>, AppError> {
    body.validate()?;

    let record = load_record(&state, &record_id).await?;
    ensure_author(&current_user, &record)?;
    ensure_unsigned(&record)?;

    if body.vaccine.is_some() {
        check_vaccine_presence(record.record_type, true)
            .map_err(|e| AppError::bad_request("Validation error").with_details(e.to_string()))?;
    }
    if let Some(visit_date) = body.visit_date {
        ensure_not_future(visit_date)?;
        let pet = load_pet(&state, &record.pet_id).await?;
        ensure_after_birth(visit_date, &pet)?;
    }

    // il repository aggiorna solo record non firmati: una firma concorrente dà RowNotFound
    let updated = state
        .record
        .update(&record.record_id, &body)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => AppError::conflict("Signed records cannot be modified"),
            other => other.into(),
        })?;
    info!("Record updated");
    Ok(Json(RecordDTO::from(updated)))
}

#[instrument(skip(state, current_user), fields(user_id = %current_user.user_id, record_id = %record_id))]
pub async fn delete_record(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    Path(record_id): Path<i32>,
) -> Result<StatusCode, AppError> {
    let record = load_record(&state, &record_id).await?;
    if !policy::can_delete_record(&current_user, &record) {
        warn!("User cannot delete record");
        return Err(AppError::forbidden("You cannot delete this record"));
    }
    ensure_unsigned(&record)?;

    state
        .record
        .delete(&record.record_id)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => AppError::conflict("Signed records cannot be modified"),
            other => other.into(),
        })?;
    info!("Record deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state, current_user), fields(user_id = %current_user.user_id, record_id = %record_id))]
pub async fn sign_record(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    Path(record_id): Path<i32>,
) -> Result<Json<RecordDTO>, AppError> {
    info!("Signing record");
    // 1. Solo il vet autore firma, e una sola volta
    // 2. HMAC-SHA256 del payload canonico con la chiave del vet
    // 3. Salvare firma e timestamp solo se il record è ancora non firmato
    let record = load_record(&state, &record_id).await?;
    ensure_author(&current_user, &record)?;
    if record.is_signed() {
        warn!("Record already signed");
        return Err(AppError::conflict("Record is already signed"));
    }

    let signature = signing::sign(
        signing_key(&current_user)?,
        &signing::record_payload(&record),
    )?;
    let signed = state
        .record
        .set_signature(&record.record_id, &signature, Utc::now())
        .await?
        .ok_or_else(|| AppError::conflict("Record is already signed"))?;

    info!("Record signed");
    Ok(Json(RecordDTO::from(signed)))
}

#[instrument(skip(state, current_user), fields(user_id = %current_user.user_id, record_id = %record_id))]
pub async fn verify_record(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    Path(record_id): Path<i32>,
) -> Result<Json<SignatureVerificationDTO>, AppError> {
    let record = load_record(&state, &record_id).await?;
    let pet = load_pet(&state, &record.pet_id).await?;
    ensure_can_view_pet(&current_user, &pet)?;

    let valid = match &record.signature {
        Some(signature) => {
            let vet = state
                .user
                .read(&record.vet_id)
                .await?
                .ok_or_else(|| AppError::internal_server_error("Record author not found"))?;
            signing::verify(
                signing_key(&vet)?,
                &signing::record_payload(&record),
                signature,
            )?
        }
        None => false,
    };

    if record.is_signed() && !valid {
        warn!("Record signature does not match its content");
    }
    Ok(Json(SignatureVerificationDTO {
        document: "record".to_string(),
        id: record.record_id,
        signed_by: record.is_signed().then_some(record.vet_id),
        signed_at: record.signed_at,
        valid,
    }))
}
