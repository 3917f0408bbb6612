//! Staff DTOs - Vet e personale di clinica gestiti dall'admin

use super::validation::{LICENSE_RE, PHONE_RE, USERNAME_RE, validate_password};
use crate::entities::UserRole;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

#[derive(Serialize, Deserialize, Debug, Clone, Validate)]
#[validate(schema(function = "validate_staff_role"))]
pub struct CreateStaffRequestDTO {
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
    pub role: UserRole,
    pub clinic_id: i32,
    #[validate(regex(path = *LICENSE_RE, message = "License number must be 4-32 uppercase letters, digits or '-'"))]
    pub license_number: Option<String>,
}

/// Solo VET e CLINIC_STAFF; il numero di licenza è obbligatorio per i vet e vietato per gli altri
fn validate_staff_role(dto: &CreateStaffRequestDTO) -> Result<(), ValidationError> {
    match (dto.role, dto.license_number.is_some()) {
        (UserRole::Vet, true) | (UserRole::ClinicStaff, false) => Ok(()),
        (UserRole::Vet, false) => {
            let mut err = ValidationError::new("license_required");
            err.message = Some("Vets must have a license number".into());
            Err(err)
        }
        (UserRole::ClinicStaff, true) => {
            let mut err = ValidationError::new("license_not_allowed");
            err.message = Some("Only vets have a license number".into());
            Err(err)
        }
        _ => {
            let mut err = ValidationError::new("invalid_staff_role");
            err.message = Some("Staff role must be VET or CLINIC_STAFF".into());
            Err(err)
        }
    }
}

/// DTO admin per aggiornare un membro dello staff
#[derive(Serialize, Deserialize, Debug, Clone, Validate)]
pub struct UpdateStaffRequestDTO {
    #[validate(email(message = "Invalid email address"))]
    pub email: Option<String>,
    #[validate(length(min = 1, max = 100, message = "First name must be between 1 and 100 characters"))]
    pub first_name: Option<String>,
    #[validate(length(min = 1, max = 100, message = "Last name must be between 1 and 100 characters"))]
    pub last_name: Option<String>,
    #[validate(regex(path = *PHONE_RE, message = "Invalid phone number"))]
    pub phone: Option<String>,
    pub clinic_id: Option<i32>,
    #[validate(regex(path = *LICENSE_RE, message = "License number must be 4-32 uppercase letters, digits or '-'"))]
    pub license_number: Option<String>,
    pub is_active: Option<bool>,
}
