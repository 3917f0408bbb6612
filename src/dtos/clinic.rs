//! Clinic DTOs - Data Transfer Objects per cliniche

use super::validation::PHONE_RE;
use crate::entities::Clinic;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Serialize, Deserialize, Debug)]
pub struct ClinicDTO {
    pub id: i32,
    pub name: String,
    pub address: String,
    pub city: String,
    pub phone: Option<String>,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl From<Clinic> for ClinicDTO {
    fn from(value: Clinic) -> Self {
        Self {
            id: value.clinic_id,
            name: value.name,
            address: value.address,
            city: value.city,
            phone: value.phone,
            email: value.email,
            created_at: value.created_at,
        }
    }
}

/// DTO per creare una nuova clinica (senza clinic_id)
#[derive(Serialize, Deserialize, Debug, Clone, Validate)]
pub struct CreateClinicDTO {
    #[validate(length(min = 2, max = 120, message = "Clinic name must be between 2 and 120 characters"))]
    pub name: String,
    #[validate(length(min = 3, max = 255, message = "Address must be between 3 and 255 characters"))]
    pub address: String,
    #[validate(length(min = 2, max = 120, message = "City must be between 2 and 120 characters"))]
    pub city: String,
    #[validate(regex(path = *PHONE_RE, message = "Invalid phone number"))]
    pub phone: Option<String>,
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
}

/// DTO per aggiornare una clinica (solo i campi `Some` vengono modificati)
#[derive(Serialize, Deserialize, Debug, Clone, Validate)]
pub struct UpdateClinicDTO {
    #[validate(length(min = 2, max = 120, message = "Clinic name must be between 2 and 120 characters"))]
    pub name: Option<String>,
    #[validate(length(min = 3, max = 255, message = "Address must be between 3 and 255 characters"))]
    pub address: Option<String>,
    #[validate(length(min = 2, max = 120, message = "City must be between 2 and 120 characters"))]
    pub city: Option<String>,
    #[validate(regex(path = *PHONE_RE, message = "Invalid phone number"))]
    pub phone: Option<String>,
    #[validate(email(message = "Invalid email address"))]
    pub email: Option<String>,
}
