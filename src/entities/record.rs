//! Record entity - Entità cartella clinica (visita, vaccino, trattamento, intervento)

use super::enums::{RecordType, VaccineKind};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, sqlx::FromRow)]
pub struct Record {
    pub record_id: i32,
    pub pet_id: i32,
    pub vet_id: i32,
    pub clinic_id: i32,
    pub record_type: RecordType,
    pub title: String,
    pub description: String,
    pub visit_date: NaiveDate,
    // campi presenti solo per record_type = VACCINATION
    pub vaccine_kind: Option<VaccineKind>,
    pub vaccine_name: Option<String>,
    pub batch_number: Option<String>,
    pub validity_years: Option<i16>,
    pub signature: Option<String>,
    pub signed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Record {
    pub fn is_signed(&self) -> bool {
        self.signature.is_some()
    }

    pub fn is_rabies_vaccination(&self) -> bool {
        self.record_type == RecordType::Vaccination
            && self.vaccine_kind == Some(VaccineKind::Rabies)
    }
}
