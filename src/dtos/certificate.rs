//! Certificate DTOs - Data Transfer Objects per certificati AHC

use super::validation::COUNTRY_RE;
use crate::domain::{RabiesStatus, RabiesWindow};
use crate::entities::Certificate;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Serialize, Deserialize, Debug)]
pub struct CertificateDTO {
    pub id: i32,
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

impl From<Certificate> for CertificateDTO {
    fn from(value: Certificate) -> Self {
        Self {
            id: value.certificate_id,
            certificate_number: value.certificate_number,
            pet_id: value.pet_id,
            vet_id: value.vet_id,
            clinic_id: value.clinic_id,
            rabies_record_id: value.rabies_record_id,
            destination_country: value.destination_country,
            issue_date: value.issue_date,
            travel_date: value.travel_date,
            entry_valid_until: value.entry_valid_until,
            onward_valid_until: value.onward_valid_until,
            signature: value.signature,
            created_at: value.created_at,
        }
    }
}

/// Body di POST /certificates; `issue_date` di default è oggi
#[derive(Serialize, Deserialize, Debug, Clone, Validate)]
pub struct IssueCertificateRequestDTO {
    pub pet_id: i32,
    #[validate(regex(path = *COUNTRY_RE, message = "Destination must be an ISO 3166 alpha-2 code, e.g. FR"))]
    pub destination_country: String,
    pub travel_date: NaiveDate,
    pub issue_date: Option<NaiveDate>,
}

/// Risposta di GET /pets/{pet_id}/rabies-status
#[derive(Serialize, Debug)]
pub struct RabiesStatusDTO {
    pub pet_id: i32,
    pub on: NaiveDate,
    #[serde(flatten)]
    pub status: RabiesStatus,
    /// Tutte le vaccinazioni firmate, in ordine cronologico
    pub vaccinations: Vec<RabiesWindow>,
}

/// DTO per creare un certificato lato repository (già firmato)
#[derive(Debug, Clone)]
pub struct CreateCertificateDTO {
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
}
