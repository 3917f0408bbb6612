//! BreedRepository - Repository per la gestione delle razze

use super::{Create, Read};
use crate::dtos::CreateBreedDTO;
use crate::entities::{Breed, Species};
use sqlx::{Error, PgPool};
use tracing::{info, instrument};

pub struct BreedRepository {
    connection_pool: PgPool,
}

impl BreedRepository {
    pub fn new(connection_pool: PgPool) -> Self {
        Self { connection_pool }
    }

    #[instrument(skip(self))]
    pub async fn list(&self, species: Option<Species>) -> Result<Vec<Breed>, Error> {
        sqlx::query_as::<_, Breed>(
            "SELECT breed_id, name, species FROM breeds \
             WHERE ($1::species IS NULL OR species = $1) ORDER BY species, name",
        )
        .bind(species)
        .fetch_all(&self.connection_pool)
        .await
    }

    /// Confronto case-insensitive sul nome
    pub async fn find_by_name(&self, name: &str, species: Species) -> Result<Option<Breed>, Error> {
        sqlx::query_as::<_, Breed>(
            "SELECT breed_id, name, species FROM breeds WHERE LOWER(name) = LOWER($1) AND species = $2",
        )
        .bind(name)
        .bind(species)
        .fetch_optional(&self.connection_pool)
        .await
    }
}

impl Create<Breed, CreateBreedDTO> for BreedRepository {
    #[instrument(skip(self, data), fields(name = %data.name, species = ?data.species))]
    async fn create(&self, data: &CreateBreedDTO) -> Result<Breed, Error> {
        let breed = sqlx::query_as::<_, Breed>(
            "INSERT INTO breeds (name, species) VALUES ($1, $2) RETURNING breed_id, name, species",
        )
        .bind(data.name.trim())
        .bind(data.species)
        .fetch_one(&self.connection_pool)
        .await?;
        info!("Breed created with id {}", breed.breed_id);
        Ok(breed)
    }
}

impl Read<Breed, i32> for BreedRepository {
    async fn read(&self, id: &i32) -> Result<Option<Breed>, Error> {
        sqlx::query_as::<_, Breed>("SELECT breed_id, name, species FROM breeds WHERE breed_id = $1")
            .bind(id)
            .fetch_optional(&self.connection_pool)
            .await
    }
}
