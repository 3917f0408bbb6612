//! Pet DTOs - Data Transfer Objects per animali

use super::validation::MICROCHIP_RE;
use crate::entities::{Pet, PetSex, Species};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

#[derive(Serialize, Deserialize, Debug)]
pub struct PetDTO {
    pub id: i32,
    pub owner_id: i32,
    pub name: String,
    pub species: Species,
    pub breed_id: Option<i32>,
    pub sex: PetSex,
    pub date_of_birth: NaiveDate,
    pub microchip_number: Option<String>,
    pub microchip_implanted_on: Option<NaiveDate>,
    pub photo_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<Pet> for PetDTO {
    fn from(value: Pet) -> Self {
        Self {
            photo_url: value
                .photo_key
                .as_ref()
                .map(|_| format!("/api/pets/{}/photo", value.pet_id)),
            id: value.pet_id,
            owner_id: value.owner_id,
            name: value.name,
            species: value.species,
            breed_id: value.breed_id,
            sex: value.sex,
            date_of_birth: value.date_of_birth,
            microchip_number: value.microchip_number,
            microchip_implanted_on: value.microchip_implanted_on,
            created_at: value.created_at,
        }
    }
}

/// Body di POST /pets; l'owner è l'utente autenticato (o `owner_id` se admin)
#[derive(Serialize, Deserialize, Debug, Clone, Validate)]
#[validate(schema(function = "validate_microchip_dates"))]
pub struct CreatePetRequestDTO {
    pub owner_id: Option<i32>,
    #[validate(length(min = 1, max = 100, message = "Pet name must be between 1 and 100 characters"))]
    pub name: String,
    pub species: Species,
    pub breed_id: Option<i32>,
    #[serde(default)]
    pub sex: PetSex,
    pub date_of_birth: NaiveDate,
    #[validate(regex(path = *MICROCHIP_RE, message = "Microchip number must be exactly 15 digits"))]
    pub microchip_number: Option<String>,
    pub microchip_implanted_on: Option<NaiveDate>,
}

fn validate_microchip_dates(dto: &CreatePetRequestDTO) -> Result<(), ValidationError> {
    check_microchip(
        dto.microchip_number.as_deref(),
        dto.microchip_implanted_on,
        Some(dto.date_of_birth),
    )
}

/// La data di impianto richiede un microchip e non può precedere la nascita
fn check_microchip(
    number: Option<&str>,
    implanted_on: Option<NaiveDate>,
    born: Option<NaiveDate>,
) -> Result<(), ValidationError> {
    if implanted_on.is_some() && number.is_none() {
        let mut err = ValidationError::new("implant_without_microchip");
        err.message = Some("Implant date requires a microchip number".into());
        return Err(err);
    }
    if let (Some(implanted), Some(born)) = (implanted_on, born) {
        if implanted < born {
            let mut err = ValidationError::new("implant_before_birth");
            err.message = Some("Microchip cannot be implanted before birth".into());
            return Err(err);
        }
    }
    Ok(())
}

/// DTO per creare un pet lato repository
#[derive(Debug, Clone)]
pub struct CreatePetDTO {
    pub owner_id: i32,
    pub name: String,
    pub species: Species,
    pub breed_id: Option<i32>,
    pub sex: PetSex,
    pub date_of_birth: NaiveDate,
    pub microchip_number: Option<String>,
    pub microchip_implanted_on: Option<NaiveDate>,
}

/// DTO per aggiornare un pet (solo i campi `Some` vengono modificati)
#[derive(Serialize, Deserialize, Debug, Clone, Default, Validate)]
pub struct UpdatePetDTO {
    #[validate(length(min = 1, max = 100, message = "Pet name must be between 1 and 100 characters"))]
    pub name: Option<String>,
    pub breed_id: Option<i32>,
    pub sex: Option<PetSex>,
    pub date_of_birth: Option<NaiveDate>,
    #[validate(regex(path = *MICROCHIP_RE, message = "Microchip number must be exactly 15 digits"))]
    pub microchip_number: Option<String>,
    pub microchip_implanted_on: Option<NaiveDate>,
}

impl UpdatePetDTO {
    /// Verifica la coerenza del microchip dopo aver applicato l'update al pet esistente
    pub fn check_against(&self, current: &Pet) -> Result<(), ValidationError> {
        let number = self
            .microchip_number
            .as_deref()
            .or(current.microchip_number.as_deref());
        let implanted = self.microchip_implanted_on.or(current.microchip_implanted_on);
        let born = self.date_of_birth.unwrap_or(current.date_of_birth);
        check_microchip(number, implanted, Some(born))
    }
}
