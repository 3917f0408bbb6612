//! Staff services - Vet e personale di clinica, gestiti dall'admin
//!
//! Lo staff non si registra da solo: l'admin crea l'account, assegna la clinica e,
//! per i vet, il server genera la chiave di firma. Gli account non vengono mai
//! cancellati (i record firmati restano legati al vet), solo disattivati.

use crate::core::{AppError, AppState, require_role};
use crate::domain::{policy, signing};
use crate::dtos::{
    CreateStaffRequestDTO, CreateUserDTO, StaffListQuery, UpdateStaffRequestDTO, UpdateUserDTO,
    UserDTO,
};
use crate::entities::{User, UserRole};
use crate::repositories::{Create, Read, Update};
use axum::{
    Extension,
    extract::{Json, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};
use validator::Validate;

/// Carica un membro dello staff, 404 se l'id non è di un vet o di personale di clinica
async fn load_staff(state: &AppState, staff_id: &i32) -> Result<User, AppError> {
    state
        .user
        .read(staff_id)
        .await?
        .filter(|u| u.role.is_staff())
        .ok_or_else(|| {
            warn!("Staff member {} not found", staff_id);
            AppError::not_found("Staff member not found")
        })
}

#[instrument(skip(state, current_user), fields(user_id = %current_user.user_id, clinic_id = ?params.clinic_id))]
pub async fn list_staff(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    Query(params): Query<StaffListQuery>, // query params /staff?clinic_id=1
) -> Result<Json<Vec<UserDTO>>, AppError> {
    require_role(
        &current_user,
        &[UserRole::Admin, UserRole::Vet, UserRole::ClinicStaff],
    )?;

    // lo staff vede solo la propria clinica, qualunque sia il filtro richiesto
    let clinic_filter = if current_user.is_admin() {
        params.clinic_id
    } else {
        current_user.clinic_id
    };

    let staff: Vec<UserDTO> = state
        .user
        .list_staff(clinic_filter)
        .await?
        .into_iter()
        .filter(|s| policy::can_view_staff(&current_user, s))
        .map(UserDTO::from)
        .collect();
    debug!("Found {} staff members", staff.len());
    Ok(Json(staff))
}

#[instrument(skip(state, current_user), fields(user_id = %current_user.user_id, staff_id = %staff_id))]
pub async fn get_staff(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    Path(staff_id): Path<i32>,
) -> Result<Json<UserDTO>, AppError> {
    let staff = load_staff(&state, &staff_id).await?;
    if !policy::can_view_staff(&current_user, &staff) {
        warn!("User cannot view staff member {}", staff_id);
        return Err(AppError::forbidden("You cannot view this staff member"));
    }
    Ok(Json(UserDTO::from(staff)))
}

#[instrument(skip(state, current_user, body), fields(user_id = %current_user.user_id, username = %body.username, role = ?body.role))]
pub async fn create_staff(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    Json(body): Json<CreateStaffRequestDTO>,
) -> Result<impl IntoResponse, AppError> {
    info!("Creating staff member");
    // 1. Solo admin, DTO valido (ruolo VET/CLINIC_STAFF, licenza coerente col ruolo)
    // 2. Username, email e numero di licenza univoci; la clinica deve esistere
    // 3. Per i vet generare la chiave di firma
    // 4. Creare l'utente e inviare l'email di benvenuto (un errore di invio non annulla la creazione)
    require_role(&current_user, &[UserRole::Admin])?;
    body.validate()?;

    let (by_username, by_email, clinic) = futures::future::try_join3(
        state.user.find_by_username(&body.username),
        state.user.find_by_email(&body.email),
        state.clinic.read(&body.clinic_id),
    )
    .await?;

    if by_username.is_some() {
        return Err(AppError::conflict("Username already exists"));
    }
    if by_email.is_some() {
        return Err(AppError::conflict("Email already registered"));
    }
    let clinic = clinic.ok_or_else(|| AppError::not_found("Clinic not found"))?;

    if let Some(license) = &body.license_number {
        if state.user.find_by_license_number(license).await?.is_some() {
            return Err(AppError::conflict("License number already registered"));
        }
    }

    let signing_key = (body.role == UserRole::Vet).then(signing::generate_signing_key);
    let password_hash = User::hash_password(&body.password)?;

    let new_staff = CreateUserDTO {
        username: body.username,
        email: body.email,
        password: password_hash,
        first_name: body.first_name,
        last_name: body.last_name,
        phone: body.phone,
        role: body.role,
        clinic_id: Some(clinic.clinic_id),
        license_number: body.license_number,
        signing_key,
    };
    let staff = state.user.create(&new_staff).await?;
    info!("Staff member {} created in clinic {}", staff.user_id, clinic.clinic_id);

    if let Err(e) = state
        .mailer
        .send_staff_welcome(&staff.email, &staff.full_name(), &staff.username, &clinic.name)
        .await
    {
        error!("Welcome email not delivered: {}", e);
    }

    Ok((StatusCode::CREATED, Json(UserDTO::from(staff))))
}

#[instrument(skip(state, current_user, body), fields(user_id = %current_user.user_id, staff_id = %staff_id))]
pub async fn update_staff(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    Path(staff_id): Path<i32>,
    Json(body): Json<UpdateStaffRequestDTO>,
) -> Result<Json<UserDTO>, AppError> {
    require_role(&current_user, &[UserRole::Admin])?;
    body.validate()?;

    let staff = load_staff(&state, &staff_id).await?;

    if body.license_number.is_some() && staff.role != UserRole::Vet {
        return Err(AppError::bad_request("Only vets have a license number"));
    }
    if let Some(email) = &body.email {
        if let Some(other) = state.user.find_by_email(email).await? {
            if other.user_id != staff.user_id {
                return Err(AppError::conflict("Email already registered"));
            }
        }
    }
    if let Some(license) = &body.license_number {
        if let Some(other) = state.user.find_by_license_number(license).await? {
            if other.user_id != staff.user_id {
                return Err(AppError::conflict("License number already registered"));
            }
        }
    }
    if let Some(clinic_id) = body.clinic_id {
        if state.clinic.read(&clinic_id).await?.is_none() {
            return Err(AppError::not_found("Clinic not found"));
        }
    }

    let update = UpdateUserDTO {
        email: body.email,
        first_name: body.first_name,
        last_name: body.last_name,
        phone: body.phone,
        clinic_id: body.clinic_id,
        license_number: body.license_number,
        is_active: body.is_active,
    };
    let updated = state.user.update(&staff.user_id, &update).await?;
    info!("Staff member updated");
    Ok(Json(UserDTO::from(updated)))
}

#[instrument(skip(state, current_user), fields(user_id = %current_user.user_id, staff_id = %staff_id))]
pub async fn deactivate_staff(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    Path(staff_id): Path<i32>,
) -> Result<Json<UserDTO>, AppError> {
    require_role(&current_user, &[UserRole::Admin])?;

    let staff = load_staff(&state, &staff_id).await?;
    if !staff.is_active {
        debug!("Staff member already inactive");
        return Ok(Json(UserDTO::from(staff)));
    }

    let update = UpdateUserDTO {
        is_active: Some(false),
        ..Default::default()
    };
    let updated = state.user.update(&staff.user_id, &update).await?;
    info!("Staff member deactivated");
    Ok(Json(UserDTO::from(updated)))
}
