//! User DTOs - Data Transfer Objects per utenti

use super::validation::{PHONE_RE, validate_password};
use crate::entities::{User, UserRole};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

// struct per gestire io col client, password e chiave di firma non escono mai
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct UserDTO {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub role: UserRole,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clinic_id: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license_number: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserDTO {
    fn from(value: User) -> Self {
        Self {
            id: value.user_id,
            username: value.username,
            email: value.email,
            first_name: value.first_name,
            last_name: value.last_name,
            phone: value.phone,
            role: value.role,
            clinic_id: value.clinic_id,
            license_number: value.license_number,
            is_active: value.is_active,
            created_at: value.created_at,
        }
    }
}

/// DTO per creare un nuovo utente (password già hashata)
#[derive(Debug, Clone)]
pub struct CreateUserDTO {
    pub username: String,
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub role: UserRole,
    pub clinic_id: Option<i32>,
    pub license_number: Option<String>,
    pub signing_key: Option<String>,
}

/// DTO per aggiornare un utente (solo i campi `Some` vengono modificati)
#[derive(Serialize, Deserialize, Debug, Clone, Default, Validate)]
pub struct UpdateUserDTO {
    #[validate(email(message = "Invalid email address"))]
    pub email: Option<String>,
    #[validate(length(min = 1, max = 100, message = "First name must be between 1 and 100 characters"))]
    pub first_name: Option<String>,
    #[validate(length(min = 1, max = 100, message = "Last name must be between 1 and 100 characters"))]
    pub last_name: Option<String>,
    #[validate(regex(path = *PHONE_RE, message = "Invalid phone number"))]
    pub phone: Option<String>,
    // campi riservati all'admin, ignorati su /users/me
    #[serde(skip)]
    pub clinic_id: Option<i32>,
    #[serde(skip)]
    pub license_number: Option<String>,
    #[serde(skip)]
    pub is_active: Option<bool>,
}

impl UpdateUserDTO {
    pub fn is_empty(&self) -> bool {
        self.email.is_none()
            && self.first_name.is_none()
            && self.last_name.is_none()
            && self.phone.is_none()
            && self.clinic_id.is_none()
            && self.license_number.is_none()
            && self.is_active.is_none()
    }
}

#[derive(Deserialize, Debug, Validate)]
pub struct ChangePasswordDTO {
    pub current_password: String,
    #[validate(custom(function = "validate_password"))]
    pub new_password: String,
}
