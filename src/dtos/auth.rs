//! Auth DTOs - Data Transfer Objects per login, registrazione e reset password

use super::user::UserDTO;
use super::validation::{PHONE_RE, USERNAME_RE, validate_password};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// DTO per il login: `login` accetta username oppure email
#[derive(Deserialize, Debug)]
pub struct LoginDTO {
    pub login: String,
    pub password: String,
}

/// Registrazione self-service: crea sempre un Owner
#[derive(Deserialize, Debug, Clone, Validate)]
pub struct RegisterRequestDTO {
    #[validate(regex(path = *USERNAME_RE, message = "Username must be 3-50 characters: letters, digits, '_', '.', '-'"))]
    pub username: String,
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(custom(function = "validate_password"))]
    pub password: String,
    #[validate(length(min = 1, max = 100, message = "First name must be between 1 and 100 characters"))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100, message = "Last name must be between 1 and 100 characters"))]
    pub last_name: String,
    #[validate(regex(path = *PHONE_RE, message = "Invalid phone number"))]
    pub phone: Option<String>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct TokenDTO {
    pub token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub user: UserDTO,
}

#[derive(Deserialize, Debug, Validate)]
pub struct ForgotPasswordDTO {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
}

#[derive(Deserialize, Debug, Validate)]
pub struct ResetPasswordDTO {
    #[validate(length(equal = 64, message = "Invalid reset token"))]
    pub token: String,
    #[validate(custom(function = "validate_password"))]
    pub new_password: String,
}
