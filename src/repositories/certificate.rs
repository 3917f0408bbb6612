//! CertificateRepository - Repository per i certificati AHC

use super::{Create, Read};
use crate::dtos::CreateCertificateDTO;
use crate::entities::Certificate;
use sqlx::{Error, PgPool};
use tracing::{info, instrument};

const CERTIFICATE_COLUMNS: &str = "certificate_id, certificate_number, pet_id, vet_id, clinic_id, \
     rabies_record_id, destination_country, issue_date, travel_date, entry_valid_until, \
     onward_valid_until, signature, created_at";

pub struct CertificateRepository {
    connection_pool: PgPool,
}

impl CertificateRepository {
    pub fn new(connection_pool: PgPool) -> Self {
        Self { connection_pool }
    }

    #[instrument(skip(self))]
    pub async fn list_by_pet(&self, pet_id: &i32) -> Result<Vec<Certificate>, Error> {
        let sql = format!(
            "SELECT {CERTIFICATE_COLUMNS} FROM certificates WHERE pet_id = $1 ORDER BY issue_date DESC, certificate_id DESC"
        );
        sqlx::query_as::<_, Certificate>(&sql)
            .bind(pet_id)
            .fetch_all(&self.connection_pool)
            .await
    }

    pub async fn find_by_number(&self, number: &str) -> Result<Option<Certificate>, Error> {
        let sql = format!("SELECT {CERTIFICATE_COLUMNS} FROM certificates WHERE certificate_number = $1");
        sqlx::query_as::<_, Certificate>(&sql)
            .bind(number)
            .fetch_optional(&self.connection_pool)
            .await
    }
}

impl Create<Certificate, CreateCertificateDTO> for CertificateRepository {
    #[instrument(skip(self, data), fields(pet_id = %data.pet_id, number = %data.certificate_number))]
    async fn create(&self, data: &CreateCertificateDTO) -> Result<Certificate, Error> {
        let sql = format!(
            "INSERT INTO certificates (certificate_number, pet_id, vet_id, clinic_id, rabies_record_id, \
             destination_country, issue_date, travel_date, entry_valid_until, onward_valid_until, signature) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) RETURNING {CERTIFICATE_COLUMNS}"
        );
        let certificate = sqlx::query_as::<_, Certificate>(&sql)
            .bind(&data.certificate_number)
            .bind(data.pet_id)
            .bind(data.vet_id)
            .bind(data.clinic_id)
            .bind(data.rabies_record_id)
            .bind(&data.destination_country)
            .bind(data.issue_date)
            .bind(data.travel_date)
            .bind(data.entry_valid_until)
            .bind(data.onward_valid_until)
            .bind(&data.signature)
            .fetch_one(&self.connection_pool)
            .await?;
        info!("Certificate created with id {}", certificate.certificate_id);
        Ok(certificate)
    }
}

impl Read<Certificate, i32> for CertificateRepository {
    #[instrument(skip(self), fields(certificate_id = %id))]
    async fn read(&self, id: &i32) -> Result<Option<Certificate>, Error> {
        let sql = format!("SELECT {CERTIFICATE_COLUMNS} FROM certificates WHERE certificate_id = $1");
        sqlx::query_as::<_, Certificate>(&sql)
            .bind(id)
            .fetch_optional(&self.connection_pool)
            .await
    }
}
