//! Record DTOs - Data Transfer Objects per cartelle cliniche e vaccini

use crate::entities::{Record, RecordType, VaccineKind};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

#[derive(Serialize, Deserialize, Debug, Clone, Validate)]
pub struct VaccineDetailsDTO {
    pub kind: VaccineKind,
    #[validate(length(min = 2, max = 120, message = "Vaccine name must be between 2 and 120 characters"))]
    pub name: String,
    #[validate(length(min = 1, max = 64, message = "Batch number must be between 1 and 64 characters"))]
    pub batch_number: Option<String>,
    #[validate(range(min = 1, max = 3, message = "Vaccine validity must be between 1 and 3 years"))]
    pub validity_years: i16,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct RecordDTO {
    pub id: i32,
    pub pet_id: i32,
    pub vet_id: i32,
    pub clinic_id: i32,
    pub record_type: RecordType,
    pub title: String,
    pub description: String,
    pub visit_date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vaccine: Option<VaccineDetailsDTO>,
    pub signed: bool,
    pub signature: Option<String>,
    pub signed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Record> for RecordDTO {
    fn from(value: Record) -> Self {
        let vaccine = match (value.vaccine_kind, value.vaccine_name.clone(), value.validity_years) {
            (Some(kind), Some(name), Some(validity_years)) => Some(VaccineDetailsDTO {
                kind,
                name,
                batch_number: value.batch_number.clone(),
                validity_years,
            }),
            _ => None,
        };
        Self {
            id: value.record_id,
            pet_id: value.pet_id,
            vet_id: value.vet_id,
            clinic_id: value.clinic_id,
            record_type: value.record_type,
            title: value.title,
            description: value.description,
            visit_date: value.visit_date,
            vaccine,
            signed: value.signature.is_some(),
            signature: value.signature,
            signed_at: value.signed_at,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

/// Body di POST /pets/{pet_id}/records
#[derive(Serialize, Deserialize, Debug, Clone, Validate)]
#[validate(schema(function = "validate_vaccine_presence"))]
pub struct CreateRecordRequestDTO {
    pub record_type: RecordType,
    #[validate(length(min = 1, max = 200, message = "Title must be between 1 and 200 characters"))]
    pub title: String,
    #[serde(default)]
    #[validate(length(max = 10000, message = "Description must be at most 10000 characters"))]
    pub description: String,
    pub visit_date: NaiveDate,
    #[validate(nested)]
    pub vaccine: Option<VaccineDetailsDTO>,
}

fn validate_vaccine_presence(dto: &CreateRecordRequestDTO) -> Result<(), ValidationError> {
    check_vaccine_presence(dto.record_type, dto.vaccine.is_some())
}

/// I dettagli del vaccino sono obbligatori per VACCINATION e vietati altrimenti
pub fn check_vaccine_presence(record_type: RecordType, has_vaccine: bool) -> Result<(), ValidationError> {
    match (record_type, has_vaccine) {
        (RecordType::Vaccination, false) => {
            let mut err = ValidationError::new("vaccine_required");
            err.message = Some("Vaccination records need vaccine details".into());
            Err(err)
        }
        (RecordType::Vaccination, true) | (_, false) => Ok(()),
        (_, true) => {
            let mut err = ValidationError::new("vaccine_not_allowed");
            err.message = Some("Only vaccination records carry vaccine details".into());
            Err(err)
        }
    }
}

/// DTO per creare un record lato repository
#[derive(Debug, Clone)]
pub struct CreateRecordDTO {
    pub pet_id: i32,
    pub vet_id: i32,
    pub clinic_id: i32,
    pub record_type: RecordType,
    pub title: String,
    pub description: String,
    pub visit_date: NaiveDate,
    pub vaccine: Option<VaccineDetailsDTO>,
}

/// DTO per aggiornare un record non firmato (solo i campi `Some` vengono modificati)
#[derive(Serialize, Deserialize, Debug, Clone, Default, Validate)]
pub struct UpdateRecordDTO {
    #[validate(length(min = 1, max = 200, message = "Title must be between 1 and 200 characters"))]
    pub title: Option<String>,
    #[validate(length(max = 10000, message = "Description must be at most 10000 characters"))]
    pub description: Option<String>,
    pub visit_date: Option<NaiveDate>,
    #[validate(nested)]
    pub vaccine: Option<VaccineDetailsDTO>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct SignatureVerificationDTO {
    pub document: String,
    pub id: i32,
    pub signed_by: Option<i32>,
    pub signed_at: Option<DateTime<Utc>>,
    pub valid: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vaccine() -> VaccineDetailsDTO {
        VaccineDetailsDTO {
            kind: VaccineKind::Rabies,
            name: "Nobivac Rabies".to_string(),
            batch_number: Some("A1".to_string()),
            validity_years: 3,
        }
    }

    fn request(record_type: RecordType, vaccine: Option<VaccineDetailsDTO>) -> CreateRecordRequestDTO {
        CreateRecordRequestDTO {
            record_type,
            title: "Visit".to_string(),
            description: String::new(),
            visit_date: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            vaccine,
        }
    }

    #[test]
    fn test_vaccination_requires_details() {
        assert!(request(RecordType::Vaccination, Some(vaccine())).validate().is_ok());
        assert!(request(RecordType::Vaccination, None).validate().is_err());
    }

    #[test]
    fn test_other_records_reject_details() {
        assert!(request(RecordType::Surgery, None).validate().is_ok());
        assert!(request(RecordType::Examination, Some(vaccine())).validate().is_err());
    }

    #[test]
    fn test_validity_years_range() {
        let mut v = vaccine();
        v.validity_years = 5;
        assert!(request(RecordType::Vaccination, Some(v)).validate().is_err());
    }
}
