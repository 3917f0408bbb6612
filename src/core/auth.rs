use crate::core::{AppError, AppState};
use crate::entities::{User, UserRole};
use crate::repositories::Read;
use axum::extract::State;
use axum::{Error, body::Body, extract::Request, http, http::Response, middleware::Next};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, TokenData, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

/// Durata del token in ore
pub const TOKEN_TTL_HOURS: i64 = 24;

// struct che codifica il contenuto del token jwt
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub exp: usize, // Expiry time of the token
    pub iat: usize, // Issued at time of the token
    pub id: i32,
    pub username: String,
    pub role: UserRole,
}

#[instrument(skip(user, secret), fields(username = %user.username, id = %user.user_id))]
pub fn encode_jwt(user: &User, secret: &str) -> Result<String, Error> {
    debug!("Encoding JWT token for user");
    let now = Utc::now();
    let exp = (now + Duration::hours(TOKEN_TTL_HOURS)).timestamp() as usize;
    let iat = now.timestamp() as usize;
    let claim = Claims {
        iat,
        exp,
        id: user.user_id,
        username: user.username.clone(),
        role: user.role,
    };

    encode(
        &Header::default(),
        &claim,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map(|token| {
        info!("JWT token encoded successfully");
        token
    })
    .map_err(|e| {
        error!("Failed to encode JWT token: {:?}", e);
        Error::new("Error in encoding jwt token")
    })
}

#[instrument(skip(jwt_token, secret))]
pub fn decode_jwt(jwt_token: &str, secret: &str) -> Result<TokenData<Claims>, Error> {
    debug!("Decoding JWT token");
    decode::<Claims>(
        jwt_token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| {
        debug!("JWT token decoded successfully for user: {}", data.claims.username);
        data
    })
    .map_err(|e| {
        warn!("Failed to decode JWT token: {:?}", e);
        Error::new("Error in decoding jwt token")
    })
}

/// Estrae il token da `Authorization: Bearer <token>` o, in mancanza, dal cookie `token`
fn extract_token(req: &Request) -> Result<String, AppError> {
    if let Some(header) = req.headers().get(http::header::AUTHORIZATION) {
        let value = header.to_str().map_err(|_| {
            warn!("Invalid authorization header format");
            AppError::unauthorized("Invalid authorization header")
        })?;
        let mut parts = value.split_whitespace();
        return match (parts.next(), parts.next()) {
            (Some(scheme), Some(token)) if scheme.eq_ignore_ascii_case("bearer") => {
                Ok(token.to_string())
            }
            _ => {
                warn!("Authorization header is not a bearer token");
                Err(AppError::unauthorized("Authorization header must be 'Bearer <token>'"))
            }
        };
    }

    req.headers()
        .get_all(http::header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().strip_prefix("token="))
        .find(|token| !token.is_empty())
        .map(str::to_string)
        .ok_or_else(|| {
            warn!("Missing authorization header");
            AppError::unauthorized("Please add the JWT token to the header")
        })
}

#[instrument(skip(state, req, next))]
pub async fn authentication_middleware(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response<Body>, AppError> {
    debug!("Running authentication middleware");
    let token = extract_token(&req)?;
    let token_data = decode_jwt(&token, &state.config.jwt_secret)
        .map_err(|_| AppError::unauthorized("Unable to decode token"))?;

    // Fetch the user details from the database
    let current_user = match state.user.read(&token_data.claims.id).await? {
        Some(user) if user.is_active => {
            debug!("User authenticated: {}", user.username);
            user
        }
        Some(user) => {
            warn!("Inactive user {} tried to authenticate", user.user_id);
            return Err(AppError::unauthorized("Account is disabled"));
        }
        None => {
            warn!("User not found in database: {}", token_data.claims.id);
            return Err(AppError::unauthorized("You are not an authorized user"));
        }
    };
    req.extensions_mut().insert(current_user);
    // lo user si recupera negli handler con Extension<User>
    Ok(next.run(req).await)
}

/// Helper function per verificare che un utente abbia uno dei ruoli richiesti
///
/// # Returns
/// * `Ok(())` se il ruolo è permesso
/// * `Err(AppError)` 403 se il ruolo non è tra quelli permessi
pub fn require_role(user: &User, allowed_roles: &[UserRole]) -> Result<(), AppError> {
    if !allowed_roles.contains(&user.role) {
        warn!(
            "User {} has insufficient role {:?}, required one of: {:?}",
            user.user_id, user.role, allowed_roles
        );
        return Err(AppError::forbidden("Insufficient role").with_details(format!(
            "This action requires one of the following roles: {:?}",
            allowed_roles
        )));
    }
    debug!("Role check passed for user {} with role {:?}", user.user_id, user.role);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";

    fn user(role: UserRole) -> User {
        User {
            user_id: 42,
            username: "dr.verdi".to_string(),
            email: "verdi@example.com".to_string(),
            password: String::new(),
            first_name: "Luca".to_string(),
            last_name: "Verdi".to_string(),
            phone: None,
            role,
            clinic_id: Some(1),
            license_number: Some("VET-0042".to_string()),
            signing_key: None,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_jwt_roundtrip_carries_role() {
        let token = encode_jwt(&user(UserRole::Vet), SECRET).unwrap();
        let data = decode_jwt(&token, SECRET).unwrap();
        assert_eq!(data.claims.id, 42);
        assert_eq!(data.claims.role, UserRole::Vet);
        assert!(data.claims.exp > data.claims.iat);
    }

    #[test]
    fn test_jwt_wrong_secret_rejected() {
        let token = encode_jwt(&user(UserRole::Owner), SECRET).unwrap();
        assert!(decode_jwt(&token, "another-secret").is_err());
    }

    #[test]
    fn test_require_role() {
        let vet = user(UserRole::Vet);
        assert!(require_role(&vet, &[UserRole::Vet, UserRole::Admin]).is_ok());
        let err = require_role(&vet, &[UserRole::Admin]).unwrap_err();
        assert_eq!(err.status(), http::StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_extract_token_from_header_and_cookie() {
        let req = Request::builder()
            .header(http::header::AUTHORIZATION, "Bearer abc.def.ghi")
            .body(Body::empty())
            .unwrap();
        assert_eq!(extract_token(&req).unwrap(), "abc.def.ghi");

        let req = Request::builder()
            .header(http::header::COOKIE, "theme=dark; token=xyz")
            .body(Body::empty())
            .unwrap();
        assert_eq!(extract_token(&req).unwrap(), "xyz");

        let req = Request::builder()
            .header(http::header::AUTHORIZATION, "Basic Zm9vOmJhcg==")
            .body(Body::empty())
            .unwrap();
        assert_eq!(extract_token(&req).unwrap_err().status(), http::StatusCode::UNAUTHORIZED);

        let req = Request::builder().body(Body::empty()).unwrap();
        assert!(extract_token(&req).is_err());
    }
}
