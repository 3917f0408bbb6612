//! RecordRepository - Repository per cartelle cliniche e vaccini

use super::{Create, Delete, Read, Update};
use crate::dtos::{CreateRecordDTO, UpdateRecordDTO};
use crate::entities::Record;
use chrono::{DateTime, Utc};
use sqlx::{Error, PgPool};
use tracing::{debug, info, instrument, warn};

const RECORD_COLUMNS: &str = "record_id, pet_id, vet_id, clinic_id, record_type, title, description, \
     visit_date, vaccine_kind, vaccine_name, batch_number, validity_years, signature, signed_at, \
     created_at, updated_at";

pub struct RecordRepository {
    connection_pool: PgPool,
}

impl RecordRepository {
    pub fn new(connection_pool: PgPool) -> Self {
        Self { connection_pool }
    }

    /// Record del pet, dal più recente
    #[instrument(skip(self))]
    pub async fn list_by_pet(&self, pet_id: &i32) -> Result<Vec<Record>, Error> {
        let sql = format!(
            "SELECT {RECORD_COLUMNS} FROM records WHERE pet_id = $1 ORDER BY visit_date DESC, record_id DESC"
        );
        sqlx::query_as::<_, Record>(&sql)
            .bind(pet_id)
            .fetch_all(&self.connection_pool)
            .await
    }

    /// Vaccinazioni antirabbiche firmate, in ordine cronologico
    #[instrument(skip(self))]
    pub async fn list_signed_rabies_by_pet(&self, pet_id: &i32) -> Result<Vec<Record>, Error> {
        let sql = format!(
            "SELECT {RECORD_COLUMNS} FROM records \
             WHERE pet_id = $1 AND record_type = 'VACCINATION' AND vaccine_kind = 'RABIES' \
             AND signature IS NOT NULL ORDER BY visit_date, record_id"
        );
        let records = sqlx::query_as::<_, Record>(&sql)
            .bind(pet_id)
            .fetch_all(&self.connection_pool)
            .await?;
        debug!("Found {} signed rabies vaccinations", records.len());
        Ok(records)
    }

    /// Salva la firma solo se il record non è già firmato.
    /// Restituisce `None` se qualcun altro l'ha firmato nel frattempo.
    #[instrument(skip(self, signature))]
    pub async fn set_signature(
        &self,
        record_id: &i32,
        signature: &str,
        signed_at: DateTime<Utc>,
    ) -> Result<Option<Record>, Error> {
        let sql = format!(
            "UPDATE records SET signature = $1, signed_at = $2 \
             WHERE record_id = $3 AND signature IS NULL RETURNING {RECORD_COLUMNS}"
        );
        let record = sqlx::query_as::<_, Record>(&sql)
            .bind(signature)
            .bind(signed_at)
            .bind(record_id)
            .fetch_optional(&self.connection_pool)
            .await?;
        match record {
            Some(_) => info!("Record signed"),
            None => warn!("Record was already signed"),
        }
        Ok(record)
    }
}

impl Create<Record, CreateRecordDTO> for RecordRepository {
    #[instrument(skip(self, data), fields(pet_id = %data.pet_id, vet_id = %data.vet_id, record_type = ?data.record_type))]
    async fn create(&self, data: &CreateRecordDTO) -> Result<Record, Error> {
        debug!("Creating new record");
        let sql = format!(
            "INSERT INTO records (pet_id, vet_id, clinic_id, record_type, title, description, visit_date, \
             vaccine_kind, vaccine_name, batch_number, validity_years) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) RETURNING {RECORD_COLUMNS}"
        );
        let vaccine = data.vaccine.as_ref();
        let record = sqlx::query_as::<_, Record>(&sql)
            .bind(data.pet_id)
            .bind(data.vet_id)
            .bind(data.clinic_id)
            .bind(data.record_type)
            .bind(&data.title)
            .bind(&data.description)
            .bind(data.visit_date)
            .bind(vaccine.map(|v| v.kind))
            .bind(vaccine.map(|v| v.name.clone()))
            .bind(vaccine.and_then(|v| v.batch_number.clone()))
            .bind(vaccine.map(|v| v.validity_years))
            .fetch_one(&self.connection_pool)
            .await?;
        info!("Record created with id {}", record.record_id);
        Ok(record)
    }
}

impl Read<Record, i32> for RecordRepository {
    #[instrument(skip(self), fields(record_id = %id))]
    async fn read(&self, id: &i32) -> Result<Option<Record>, Error> {
        let sql = format!("SELECT {RECORD_COLUMNS} FROM records WHERE record_id = $1");
        sqlx::query_as::<_, Record>(&sql)
            .bind(id)
            .fetch_optional(&self.connection_pool)
            .await
    }
}

impl Update<Record, UpdateRecordDTO, i32> for RecordRepository {
    /// Aggiorna solo record non firmati: su un record firmato restituisce RowNotFound
    #[instrument(skip(self, data), fields(record_id = %id))]
    async fn update(&self, id: &i32, data: &UpdateRecordDTO) -> Result<Record, Error> {
        debug!("Updating record");
        let current = self.read(id).await?.ok_or(Error::RowNotFound)?;

        if data.title.is_none()
            && data.description.is_none()
            && data.visit_date.is_none()
            && data.vaccine.is_none()
        {
            debug!("No fields to update, returning current record");
            return Ok(current);
        }

        let mut query_builder = sqlx::QueryBuilder::new("UPDATE records SET ");
        let mut separated = query_builder.separated(", ");
        if let Some(ref title) = data.title {
            separated.push("title = ");
            separated.push_bind_unseparated(title);
        }
        if let Some(ref description) = data.description {
            separated.push("description = ");
            separated.push_bind_unseparated(description);
        }
        if let Some(visit_date) = data.visit_date {
            separated.push("visit_date = ");
            separated.push_bind_unseparated(visit_date);
        }
        if let Some(ref vaccine) = data.vaccine {
            separated.push("vaccine_kind = ");
            separated.push_bind_unseparated(vaccine.kind);
            separated.push("vaccine_name = ");
            separated.push_bind_unseparated(&vaccine.name);
            separated.push("batch_number = ");
            separated.push_bind_unseparated(&vaccine.batch_number);
            separated.push("validity_years = ");
            separated.push_bind_unseparated(vaccine.validity_years);
        }
        separated.push("updated_at = NOW()");

        query_builder.push(" WHERE signature IS NULL AND record_id = ");
        query_builder.push_bind(id);
        query_builder.push(" RETURNING ");
        query_builder.push(RECORD_COLUMNS);

        let record = query_builder
            .build_query_as::<Record>()
            .fetch_optional(&self.connection_pool)
            .await?
            .ok_or(Error::RowNotFound)?;
        info!("Record updated");
        Ok(record)
    }
}

impl Delete<i32> for RecordRepository {
    /// Cancella solo record non firmati
    #[instrument(skip(self), fields(record_id = %id))]
    async fn delete(&self, id: &i32) -> Result<(), Error> {
        let result = sqlx::query("DELETE FROM records WHERE record_id = $1 AND signature IS NULL")
            .bind(id)
            .execute(&self.connection_pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(Error::RowNotFound);
        }
        info!("Record deleted");
        Ok(())
    }
}
