//! Breed entity - Entità razza

use super::enums::Species;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, sqlx::FromRow)]
pub struct Breed {
    pub breed_id: i32,
    pub name: String,
    pub species: Species,
}
