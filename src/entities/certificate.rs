//! Certificate entity - Animal Health Certificate (AHC) per i viaggi

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, sqlx::FromRow)]
pub struct Certificate {
    pub certificate_id: i32,
    pub certificate_number: String,
    pub pet_id: i32,
    pub vet_id: i32,
    pub clinic_id: i32,
    pub rabies_record_id: i32,
    pub destination_country: String,
    pub issue_date: NaiveDate,
    pub travel_date: NaiveDate,
    pub entry_valid_until: NaiveDate,
    pub onward_valid_until: NaiveDate,
    pub signature: String,
    pub created_at: DateTime<Utc>,
}
