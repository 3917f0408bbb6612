//! Query DTOs - Data Transfer Objects per i query parameters

use crate::entities::{Species, UserRole};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// GET /users?role=VET
#[derive(Serialize, Deserialize, Debug, Default)]
pub struct UserListQuery {
    #[serde(default)]
    pub role: Option<UserRole>,
}

/// GET /staff?clinic_id=1
#[derive(Serialize, Deserialize, Debug, Default)]
pub struct StaffListQuery {
    #[serde(default)]
    pub clinic_id: Option<i32>,
}

/// GET /breeds?species=DOG
#[derive(Serialize, Deserialize, Debug, Default)]
pub struct BreedListQuery {
    #[serde(default)]
    pub species: Option<Species>,
}

/// GET /pets?owner_id=3 (ignorato per gli owner)
#[derive(Serialize, Deserialize, Debug, Default)]
pub struct PetListQuery {
    #[serde(default)]
    pub owner_id: Option<i32>,
}

/// GET /pets/{id}/rabies-status?on=2025-05-01
#[derive(Serialize, Deserialize, Debug, Default)]
pub struct RabiesStatusQuery {
    #[serde(default)]
    pub on: Option<NaiveDate>,
}

/// GET /pets/{id}/ahc-eligibility?travel_date=...&issue_date=...
#[derive(Serialize, Deserialize, Debug)]
pub struct EligibilityQuery {
    pub travel_date: NaiveDate,
    #[serde(default)]
    pub issue_date: Option<NaiveDate>,
}
