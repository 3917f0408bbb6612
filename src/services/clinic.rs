//! Clinic services - Anagrafica delle cliniche veterinarie

use crate::core::{AppError, AppState, require_role};
use crate::domain::policy;
use crate::dtos::{ClinicDTO, CreateClinicDTO, UpdateClinicDTO, UserDTO};
use crate::entities::{User, UserRole};
use crate::repositories::{Create, Delete, Read, Update};
use axum::{
    Extension,
    extract::{Json, Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use validator::Validate;

#[instrument(skip(state))]
pub async fn list_clinics(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<ClinicDTO>>, AppError> {
    let clinics = state.clinic.list().await?;
    debug!("Found {} clinics", clinics.len());
    Ok(Json(clinics.into_iter().map(ClinicDTO::from).collect()))
}

#[instrument(skip(state), fields(clinic_id = %clinic_id))]
pub async fn get_clinic(
    State(state): State<Arc<AppState>>,
    Path(clinic_id): Path<i32>,
) -> Result<Json<ClinicDTO>, AppError> {
    let clinic = state
        .clinic
        .read(&clinic_id)
        .await?
        .ok_or_else(|| AppError::not_found("Clinic not found"))?;
    Ok(Json(ClinicDTO::from(clinic)))
}

#[instrument(skip(state, current_user, body), fields(user_id = %current_user.user_id))]
pub async fn create_clinic(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    Json(body): Json<CreateClinicDTO>,
) -> Result<impl IntoResponse, AppError> {
    require_role(&current_user, &[UserRole::Admin])?;
    body.validate()?;

    if state.clinic.find_by_email(&body.email).await?.is_some() {
        warn!("Clinic email already registered");
        return Err(AppError::conflict("Clinic email already registered"));
    }

    let clinic = state.clinic.create(&body).await?;
    info!("Clinic {} created", clinic.clinic_id);
    Ok((StatusCode::CREATED, Json(ClinicDTO::from(clinic))))
}

#[instrument(skip(state, current_user, body), fields(user_id = %current_user.user_id, clinic_id = %clinic_id))]
pub async fn update_clinic(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    Path(clinic_id): Path<i32>,
    Json(body): Json<UpdateClinicDTO>,
) -> Result<Json<ClinicDTO>, AppError> {
    require_role(&current_user, &[UserRole::Admin])?;
    body.validate()?;

    if let Some(email) = &body.email {
        if let Some(other) = state.clinic.find_by_email(email).await? {
            if other.clinic_id != clinic_id {
                return Err(AppError::conflict("Clinic email already registered"));
            }
        }
    }

    // RowNotFound diventa 404
    let clinic = state.clinic.update(&clinic_id, &body).await?;
    info!("Clinic updated");
    Ok(Json(ClinicDTO::from(clinic)))
}

#[instrument(skip(state, current_user), fields(user_id = %current_user.user_id, clinic_id = %clinic_id))]
pub async fn delete_clinic(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    Path(clinic_id): Path<i32>,
) -> Result<StatusCode, AppError> {
    require_role(&current_user, &[UserRole::Admin])?;

    if state.clinic.read(&clinic_id).await?.is_none() {
        return Err(AppError::not_found("Clinic not found"));
    }

    let staff = state.user.count_by_clinic(&clinic_id).await?;
    if staff > 0 {
        warn!("Clinic still has {} staff members", staff);
        return Err(AppError::conflict("Clinic still has staff assigned")
            .with_details(format!("{staff} staff members")));
    }

    // record e certificati emessi dalla clinica bloccano la cancellazione (23503 -> 409)
    state.clinic.delete(&clinic_id).await?;
    info!("Clinic deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state, current_user), fields(user_id = %current_user.user_id, clinic_id = %clinic_id))]
pub async fn list_clinic_staff(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    Path(clinic_id): Path<i32>,
) -> Result<Json<Vec<UserDTO>>, AppError> {
    let is_colleague = current_user.role.is_staff() && current_user.clinic_id == Some(clinic_id);
    if !current_user.is_admin() && !is_colleague {
        warn!("User cannot list staff of clinic {}", clinic_id);
        return Err(AppError::forbidden("You cannot view the staff of this clinic"));
    }

    if state.clinic.read(&clinic_id).await?.is_none() {
        return Err(AppError::not_found("Clinic not found"));
    }

    let staff = state.user.list_staff(Some(clinic_id)).await?;
    let staff: Vec<UserDTO> = staff
        .into_iter()
        .filter(|s| policy::can_view_staff(&current_user, s))
        .map(UserDTO::from)
        .collect();
    debug!("Found {} staff members", staff.len());
    Ok(Json(staff))
}
