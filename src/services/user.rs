//! User services - Profilo personale e consultazione utenti lato admin

use crate::core::{AppError, AppState, require_role};
use crate::dtos::{ChangePasswordDTO, UpdateUserDTO, UserDTO, UserListQuery};
use crate::entities::{User, UserRole};
use crate::repositories::{Delete, Read, Update};
use axum::{
    Extension,
    extract::{Json, Path, Query, State},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::IntoResponse,
};
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use validator::Validate;

#[instrument(skip(current_user), fields(user_id = %current_user.user_id))]
pub async fn get_me(Extension(current_user): Extension<User>) -> Json<UserDTO> {
    Json(UserDTO::from(current_user))
}

#[instrument(skip(state, current_user, body), fields(user_id = %current_user.user_id))]
pub async fn update_me(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    Json(body): Json<UpdateUserDTO>,
) -> Result<Json<UserDTO>, AppError> {
    debug!("Updating own profile");
    // 1. Validare i campi forniti
    // 2. Se cambia l'email, verificare che non appartenga ad un altro utente
    // 3. Applicare l'update parziale (i campi riservati all'admin non sono deserializzati)
    body.validate()?;
    if body.is_empty() {
        return Err(AppError::bad_request("Nothing to update"));
    }

    if let Some(email) = &body.email {
        if let Some(other) = state.user.find_by_email(email).await? {
            if other.user_id != current_user.user_id {
                warn!("Email already used by user {}", other.user_id);
                return Err(AppError::conflict("Email already registered"));
            }
        }
    }

    let updated = state.user.update(&current_user.user_id, &body).await?;
    info!("Profile updated");
    Ok(Json(UserDTO::from(updated)))
}

#[instrument(skip(state, current_user, body), fields(user_id = %current_user.user_id))]
pub async fn change_password(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    Json(body): Json<ChangePasswordDTO>,
) -> Result<impl IntoResponse, AppError> {
    body.validate()?;

    if !current_user.verify_password(&body.current_password) {
        warn!("Wrong current password");
        return Err(AppError::unauthorized("Current password is not correct"));
    }
    if body.current_password == body.new_password {
        return Err(AppError::bad_request("New password must differ from the current one"));
    }

    let password_hash = User::hash_password(&body.new_password)?;
    state
        .user
        .update_password(&current_user.user_id, &password_hash)
        .await?;

    info!("Password changed");
    Ok((StatusCode::OK, Json(json!({ "message": "Password updated" }))))
}

#[instrument(skip(state, current_user), fields(user_id = %current_user.user_id, username = %current_user.username))]
pub async fn delete_my_account(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>, // ottenuto dall'autenticazione tramite token jwt
) -> Result<impl IntoResponse, AppError> {
    info!("User account deletion initiated");
    // 1. Solo gli owner possono cancellare il proprio account, lo staff viene disattivato dall'admin
    // 2. Un owner con pet registrati non può essere cancellato (i record clinici restano legati al pet)
    // 3. Cancellare l'utente e invalidare il cookie
    require_role(&current_user, &[UserRole::Owner])?;

    let pets = state.pet.count_by_owner(&current_user.user_id).await?;
    if pets > 0 {
        warn!("Owner still has {} pets", pets);
        return Err(AppError::conflict("Remove or transfer your pets before deleting the account")
            .with_details(format!("{pets} pets registered")));
    }

    state.user.delete(&current_user.user_id).await?;

    // Cookie con Max-Age=0 per forzare il logout lato client
    let cookie = "token=; HttpOnly; Secure; SameSite=Lax; Path=/; Max-Age=0";
    let mut headers = HeaderMap::new();
    headers.insert(header::SET_COOKIE, HeaderValue::from_static(cookie));

    info!("Account deleted successfully");
    Ok((StatusCode::OK, headers, Json(json!({ "message": "Account deleted" }))))
}

#[instrument(skip(state, current_user), fields(user_id = %current_user.user_id, role = ?params.role))]
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    Query(params): Query<UserListQuery>, // query params /users?role=VET
) -> Result<Json<Vec<UserDTO>>, AppError> {
    require_role(&current_user, &[UserRole::Admin])?;

    let users = state.user.list(params.role).await?;
    info!("Found {} users", users.len());
    Ok(Json(users.into_iter().map(UserDTO::from).collect()))
}

#[instrument(skip(state, current_user), fields(user_id = %user_id))]
pub async fn get_user_by_id(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    Path(user_id): Path<i32>, // parametro dalla URL /users/{user_id}
) -> Result<Json<UserDTO>, AppError> {
    require_role(&current_user, &[UserRole::Admin])?;

    let user = state.user.read(&user_id).await?.ok_or_else(|| {
        warn!("User not found");
        AppError::not_found("User not found")
    })?;
    Ok(Json(UserDTO::from(user)))
}
