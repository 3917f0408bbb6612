//! Auth services - Login, registrazione degli owner e reset della password

use crate::core::auth::TOKEN_TTL_HOURS;
use crate::core::{AppError, AppState, encode_jwt};
use crate::dtos::{
    CreateUserDTO, ForgotPasswordDTO, LoginDTO, RegisterRequestDTO, ResetPasswordDTO, TokenDTO,
    UserDTO,
};
use crate::entities::{User, UserRole};
use crate::repositories::Create;
use axum::{
    extract::{Json, State},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::IntoResponse,
};
use chrono::{Duration, Utc};
use rand::RngCore;
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};
use validator::Validate;

const RESET_TOKEN_BYTES: usize = 32;

fn header_value(value: &str) -> Result<HeaderValue, AppError> {
    HeaderValue::from_str(value).map_err(|_| AppError::internal_server_error("Invalid header value"))
}

/// Token di reset: 32 byte casuali in hex
fn new_reset_token() -> String {
    let mut raw = [0u8; RESET_TOKEN_BYTES];
    rand::rng().fill_bytes(&mut raw);
    hex::encode(raw)
}

#[instrument(skip(state, body), fields(login = %body.login))]
pub async fn login_user(
    State(state): State<Arc<AppState>>,
    Json(body): Json<LoginDTO>, // JSON body
) -> Result<impl IntoResponse, AppError> {
    debug!("Login attempt");
    // 1. Verificare che login e password siano presenti (fail-fast prima della query DB)
    // 2. Cercare l'utente per username, oppure per email se il login contiene '@'
    // 3. Verificare la password e che l'account sia attivo
    // 4. Generare il token JWT e restituirlo nel body, nell'header Authorization e in un cookie HttpOnly
    if body.login.trim().is_empty() || body.password.is_empty() {
        warn!("Login attempted with empty credentials");
        return Err(AppError::unauthorized("Invalid username or password"));
    }

    let user = if body.login.contains('@') {
        state.user.find_by_email(&body.login).await?
    } else {
        state.user.find_by_username(&body.login).await?
    };

    let user = match user {
        Some(user) if user.verify_password(&body.password) => user,
        _ => {
            warn!("Invalid credentials");
            return Err(AppError::unauthorized("Invalid username or password"));
        }
    };

    if !user.is_active {
        warn!("Login attempt on disabled account {}", user.user_id);
        return Err(AppError::unauthorized("Account is disabled"));
    }

    let token = encode_jwt(&user, &state.config.jwt_secret)?;
    let max_age = TOKEN_TTL_HOURS * 60 * 60;

    let cookie_value = format!(
        "token={}; HttpOnly; Secure; SameSite=Lax; Path=/; Max-Age={}",
        token, max_age
    );

    let mut headers = HeaderMap::new();
    headers.insert(header::SET_COOKIE, header_value(&cookie_value)?);
    headers.insert(
        header::AUTHORIZATION,
        header_value(&format!("Bearer {}", token))?,
    );

    info!("User {} logged in", user.user_id);
    Ok((
        StatusCode::OK,
        headers,
        Json(TokenDTO {
            token,
            token_type: "Bearer".to_string(),
            expires_in: max_age,
            user: UserDTO::from(user),
        }),
    ))
}

#[instrument(skip(state, body), fields(username = %body.username))]
pub async fn register_user(
    State(state): State<Arc<AppState>>,
    Json(body): Json<RegisterRequestDTO>, // JSON body
) -> Result<impl IntoResponse, AppError> {
    debug!("Registering new owner");
    // 1. Validare il DTO (username, email, robustezza password)
    // 2. Controllare che username ed email non siano già usati
    // 3. Hashare la password e creare l'utente con ruolo OWNER
    body.validate()?;

    let (by_username, by_email) = futures::future::try_join(
        state.user.find_by_username(&body.username),
        state.user.find_by_email(&body.email),
    )
    .await?;

    if by_username.is_some() {
        warn!("Username already taken");
        return Err(AppError::conflict("Username already exists"));
    }
    if by_email.is_some() {
        warn!("Email already registered");
        return Err(AppError::conflict("Email already registered"));
    }

    let password_hash = User::hash_password(&body.password)?;

    let new_user = CreateUserDTO {
        username: body.username,
        email: body.email,
        password: password_hash,
        first_name: body.first_name,
        last_name: body.last_name,
        phone: body.phone,
        role: UserRole::Owner,
        clinic_id: None,
        license_number: None,
        signing_key: None,
    };

    let created_user = state.user.create(&new_user).await?;
    info!("Owner {} registered", created_user.user_id);

    Ok((StatusCode::CREATED, Json(UserDTO::from(created_user))))
}

#[instrument(skip(state, body))]
pub async fn forgot_password(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ForgotPasswordDTO>,
) -> Result<impl IntoResponse, AppError> {
    // La risposta è sempre la stessa, così non si può sapere se l'email è registrata
    body.validate()?;

    match state.user.find_by_email(&body.email).await? {
        Some(user) if user.is_active => {
            let token = new_reset_token();
            let ttl = state.config.reset_token_ttl_minutes;
            state
                .reset_token
                .create(&token, &user.user_id, Utc::now() + Duration::minutes(ttl))
                .await?;

            let link = format!(
                "{}/reset-password?token={}",
                state.config.frontend_url.trim_end_matches('/'),
                token
            );
            // un errore SMTP non deve cambiare la risposta
            match state
                .mailer
                .send_password_reset(&user.email, &user.first_name, &link, ttl)
                .await
            {
                Ok(()) => info!("Password reset requested for user {}", user.user_id),
                Err(e) => error!("Reset email for user {} not delivered: {}", user.user_id, e),
            }
        }
        Some(user) => warn!("Password reset requested for disabled user {}", user.user_id),
        None => debug!("Password reset requested for unknown email"),
    }

    Ok((
        StatusCode::OK,
        Json(json!({ "message": "If the email is registered, a reset link has been sent" })),
    ))
}

#[instrument(skip(state, body))]
pub async fn reset_password(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ResetPasswordDTO>,
) -> Result<impl IntoResponse, AppError> {
    body.validate()?;

    let token = state
        .reset_token
        .read(&body.token)
        .await?
        .filter(|t| t.is_usable(Utc::now()))
        .ok_or_else(|| {
            warn!("Invalid or expired reset token");
            AppError::bad_request("Invalid or expired reset token")
        })?;

    let password_hash = User::hash_password(&body.new_password)?;
    let consumed = state
        .reset_token
        .consume_and_set_password(&token.token, &token.user_id, &password_hash)
        .await?;
    if !consumed {
        warn!("Reset token consumed concurrently");
        return Err(AppError::bad_request("Invalid or expired reset token"));
    }

    info!("Password reset for user {}", token.user_id);
    Ok((StatusCode::OK, Json(json!({ "message": "Password updated" }))))
}
