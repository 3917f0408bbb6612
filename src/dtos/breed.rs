//! Breed DTOs - Data Transfer Objects per razze

use crate::entities::Species;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// DTO per creare una nuova razza (senza breed_id)
#[derive(Serialize, Deserialize, Debug, Clone, Validate)]
pub struct CreateBreedDTO {
    #[validate(length(min = 2, max = 100, message = "Breed name must be between 2 and 100 characters"))]
    pub name: String,
    pub species: Species,
}
