//! ClinicRepository - Repository per la gestione delle cliniche

use super::{Create, Delete, Read, Update};
use crate::dtos::{CreateClinicDTO, UpdateClinicDTO};
use crate::entities::Clinic;
use sqlx::{Error, PgPool};
use tracing::{debug, info, instrument};

const CLINIC_COLUMNS: &str = "clinic_id, name, address, city, phone, email, created_at, updated_at";

pub struct ClinicRepository {
    connection_pool: PgPool,
}

impl ClinicRepository {
    pub fn new(connection_pool: PgPool) -> Self {
        Self { connection_pool }
    }

    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<Clinic>, Error> {
        let sql = format!("SELECT {CLINIC_COLUMNS} FROM clinics ORDER BY name");
        sqlx::query_as::<_, Clinic>(&sql)
            .fetch_all(&self.connection_pool)
            .await
    }

    #[instrument(skip(self))]
    pub async fn find_by_email(&self, email: &str) -> Result<Option<Clinic>, Error> {
        let sql = format!("SELECT {CLINIC_COLUMNS} FROM clinics WHERE email = $1");
        sqlx::query_as::<_, Clinic>(&sql)
            .bind(email.to_lowercase())
            .fetch_optional(&self.connection_pool)
            .await
    }
}

impl Create<Clinic, CreateClinicDTO> for ClinicRepository {
    #[instrument(skip(self, data), fields(name = %data.name))]
    async fn create(&self, data: &CreateClinicDTO) -> Result<Clinic, Error> {
        debug!("Creating new clinic");
        let sql = format!(
            "INSERT INTO clinics (name, address, city, phone, email) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {CLINIC_COLUMNS}"
        );
        let clinic = sqlx::query_as::<_, Clinic>(&sql)
            .bind(&data.name)
            .bind(&data.address)
            .bind(&data.city)
            .bind(&data.phone)
            .bind(data.email.to_lowercase())
            .fetch_one(&self.connection_pool)
            .await?;
        info!("Clinic created with id {}", clinic.clinic_id);
        Ok(clinic)
    }
}

impl Read<Clinic, i32> for ClinicRepository {
    #[instrument(skip(self), fields(clinic_id = %id))]
    async fn read(&self, id: &i32) -> Result<Option<Clinic>, Error> {
        let sql = format!("SELECT {CLINIC_COLUMNS} FROM clinics WHERE clinic_id = $1");
        sqlx::query_as::<_, Clinic>(&sql)
            .bind(id)
            .fetch_optional(&self.connection_pool)
            .await
    }
}

impl Update<Clinic, UpdateClinicDTO, i32> for ClinicRepository {
    #[instrument(skip(self, data), fields(clinic_id = %id))]
    async fn update(&self, id: &i32, data: &UpdateClinicDTO) -> Result<Clinic, Error> {
        debug!("Updating clinic");
        let current = self.read(id).await?.ok_or(Error::RowNotFound)?;

        if data.name.is_none()
            && data.address.is_none()
            && data.city.is_none()
            && data.phone.is_none()
            && data.email.is_none()
        {
            debug!("No fields to update, returning current clinic");
            return Ok(current);
        }

        let mut query_builder = sqlx::QueryBuilder::new("UPDATE clinics SET ");
        let mut separated = query_builder.separated(", ");
        if let Some(ref name) = data.name {
            separated.push("name = ");
            separated.push_bind_unseparated(name);
        }
        if let Some(ref address) = data.address {
            separated.push("address = ");
            separated.push_bind_unseparated(address);
        }
        if let Some(ref city) = data.city {
            separated.push("city = ");
            separated.push_bind_unseparated(city);
        }
        if let Some(ref phone) = data.phone {
            separated.push("phone = ");
            separated.push_bind_unseparated(phone);
        }
        if let Some(ref email) = data.email {
            separated.push("email = ");
            separated.push_bind_unseparated(email.to_lowercase());
        }
        separated.push("updated_at = NOW()");

        query_builder.push(" WHERE clinic_id = ");
        query_builder.push_bind(id);
        query_builder.push(" RETURNING ");
        query_builder.push(CLINIC_COLUMNS);

        let clinic = query_builder
            .build_query_as::<Clinic>()
            .fetch_one(&self.connection_pool)
            .await?;
        info!("Clinic updated");
        Ok(clinic)
    }
}

impl Delete<i32> for ClinicRepository {
    #[instrument(skip(self), fields(clinic_id = %id))]
    async fn delete(&self, id: &i32) -> Result<(), Error> {
        sqlx::query("DELETE FROM clinics WHERE clinic_id = $1")
            .bind(id)
            .execute(&self.connection_pool)
            .await?;
        info!("Clinic deleted");
        Ok(())
    }
}
