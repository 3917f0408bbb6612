//! Pet entity - Entità animale domestico

use super::enums::{PetSex, Species};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, sqlx::FromRow)]
pub struct Pet {
    pub pet_id: i32,
    pub owner_id: i32,
    pub name: String,
    pub species: Species,
    pub breed_id: Option<i32>,
    pub sex: PetSex,
    pub date_of_birth: NaiveDate,
    // 15 cifre ISO 11784
    pub microchip_number: Option<String>,
    pub microchip_implanted_on: Option<NaiveDate>,
    // chiave del file nello storage delle foto
    pub photo_key: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
