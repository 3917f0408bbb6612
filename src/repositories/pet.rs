//! PetRepository - Repository per la gestione degli animali

use super::{Create, Delete, Read, Update};
use crate::dtos::{CreatePetDTO, UpdatePetDTO};
use crate::entities::Pet;
use sqlx::{Error, PgPool};
use tracing::{debug, info, instrument};

const PET_COLUMNS: &str = "pet_id, owner_id, name, species, breed_id, sex, date_of_birth, \
     microchip_number, microchip_implanted_on, photo_key, created_at, updated_at";

pub struct PetRepository {
    connection_pool: PgPool,
}

impl PetRepository {
    pub fn new(connection_pool: PgPool) -> Self {
        Self { connection_pool }
    }

    /// Tutti i pet, o solo quelli di un owner
    #[instrument(skip(self))]
    pub async fn list(&self, owner_id: Option<i32>) -> Result<Vec<Pet>, Error> {
        let sql = format!(
            "SELECT {PET_COLUMNS} FROM pets WHERE ($1::INTEGER IS NULL OR owner_id = $1) ORDER BY name, pet_id"
        );
        let pets = sqlx::query_as::<_, Pet>(&sql)
            .bind(owner_id)
            .fetch_all(&self.connection_pool)
            .await?;
        debug!("Found {} pets", pets.len());
        Ok(pets)
    }

    pub async fn count_by_owner(&self, owner_id: &i32) -> Result<i64, Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM pets WHERE owner_id = $1")
            .bind(owner_id)
            .fetch_one(&self.connection_pool)
            .await
    }

    #[instrument(skip(self))]
    pub async fn find_by_microchip(&self, microchip_number: &str) -> Result<Option<Pet>, Error> {
        let sql = format!("SELECT {PET_COLUMNS} FROM pets WHERE microchip_number = $1");
        sqlx::query_as::<_, Pet>(&sql)
            .bind(microchip_number)
            .fetch_optional(&self.connection_pool)
            .await
    }

    /// Aggiorna (o rimuove con `None`) la chiave della foto
    #[instrument(skip(self))]
    pub async fn set_photo_key(&self, pet_id: &i32, photo_key: Option<&str>) -> Result<Pet, Error> {
        let sql = format!(
            "UPDATE pets SET photo_key = $1, updated_at = NOW() WHERE pet_id = $2 RETURNING {PET_COLUMNS}"
        );
        sqlx::query_as::<_, Pet>(&sql)
            .bind(photo_key)
            .bind(pet_id)
            .fetch_optional(&self.connection_pool)
            .await?
            .ok_or(Error::RowNotFound)
    }
}

impl Create<Pet, CreatePetDTO> for PetRepository {
    #[instrument(skip(self, data), fields(owner_id = %data.owner_id, name = %data.name))]
    async fn create(&self, data: &CreatePetDTO) -> Result<Pet, Error> {
        debug!("Creating new pet");
        let sql = format!(
            "INSERT INTO pets (owner_id, name, species, breed_id, sex, date_of_birth, \
             microchip_number, microchip_implanted_on) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING {PET_COLUMNS}"
        );
        let pet = sqlx::query_as::<_, Pet>(&sql)
            .bind(data.owner_id)
            .bind(&data.name)
            .bind(data.species)
            .bind(data.breed_id)
            .bind(data.sex)
            .bind(data.date_of_birth)
            .bind(&data.microchip_number)
            .bind(data.microchip_implanted_on)
            .fetch_one(&self.connection_pool)
            .await?;
        info!("Pet created with id {}", pet.pet_id);
        Ok(pet)
    }
}

impl Read<Pet, i32> for PetRepository {
    #[instrument(skip(self), fields(pet_id = %id))]
    async fn read(&self, id: &i32) -> Result<Option<Pet>, Error> {
        let sql = format!("SELECT {PET_COLUMNS} FROM pets WHERE pet_id = $1");
        sqlx::query_as::<_, Pet>(&sql)
            .bind(id)
            .fetch_optional(&self.connection_pool)
            .await
    }
}

impl Update<Pet, UpdatePetDTO, i32> for PetRepository {
    #[instrument(skip(self, data), fields(pet_id = %id))]
    async fn update(&self, id: &i32, data: &UpdatePetDTO) -> Result<Pet, Error> {
        debug!("Updating pet");
        let current = self.read(id).await?.ok_or(Error::RowNotFound)?;

        if data.name.is_none()
            && data.breed_id.is_none()
            && data.sex.is_none()
            && data.date_of_birth.is_none()
            && data.microchip_number.is_none()
            && data.microchip_implanted_on.is_none()
        {
            debug!("No fields to update, returning current pet");
            return Ok(current);
        }

        let mut query_builder = sqlx::QueryBuilder::new("UPDATE pets SET ");
        let mut separated = query_builder.separated(", ");
        if let Some(ref name) = data.name {
            separated.push("name = ");
            separated.push_bind_unseparated(name);
        }
        if let Some(breed_id) = data.breed_id {
            separated.push("breed_id = ");
            separated.push_bind_unseparated(breed_id);
        }
        if let Some(sex) = data.sex {
            separated.push("sex = ");
            separated.push_bind_unseparated(sex);
        }
        if let Some(date_of_birth) = data.date_of_birth {
            separated.push("date_of_birth = ");
            separated.push_bind_unseparated(date_of_birth);
        }
        if let Some(ref microchip_number) = data.microchip_number {
            separated.push("microchip_number = ");
            separated.push_bind_unseparated(microchip_number);
        }
        if let Some(implanted_on) = data.microchip_implanted_on {
            separated.push("microchip_implanted_on = ");
            separated.push_bind_unseparated(implanted_on);
        }
        separated.push("updated_at = NOW()");

        query_builder.push(" WHERE pet_id = ");
        query_builder.push_bind(id);
        query_builder.push(" RETURNING ");
        query_builder.push(PET_COLUMNS);

        let pet = query_builder
            .build_query_as::<Pet>()
            .fetch_one(&self.connection_pool)
            .await?;
        info!("Pet updated");
        Ok(pet)
    }
}

impl Delete<i32> for PetRepository {
    /// Fallisce con una foreign key violation se il pet ha record o certificati
    #[instrument(skip(self), fields(pet_id = %id))]
    async fn delete(&self, id: &i32) -> Result<(), Error> {
        sqlx::query("DELETE FROM pets WHERE pet_id = $1")
            .bind(id)
            .execute(&self.connection_pool)
            .await?;
        info!("Pet deleted");
        Ok(())
    }
}
