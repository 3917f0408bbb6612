//! UserRepository - Repository per la gestione degli utenti (owner, staff, admin)

use super::{Create, Delete, Read, Update};
use crate::dtos::{CreateUserDTO, UpdateUserDTO};
use crate::entities::{User, UserRole};
use sqlx::{Error, PgPool};
use tracing::{debug, info, instrument};

const USER_COLUMNS: &str = "user_id, username, email, password, first_name, last_name, phone, \
     role, clinic_id, license_number, signing_key, is_active, created_at, updated_at";

pub struct UserRepository {
    connection_pool: PgPool,
}

impl UserRepository {
    pub fn new(connection_pool: PgPool) -> UserRepository {
        Self { connection_pool }
    }

    /// Username univoco, confronto esatto
    #[instrument(skip(self))]
    pub async fn find_by_username(&self, username: &str) -> Result<Option<User>, Error> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE username = $1");
        sqlx::query_as::<_, User>(&sql)
            .bind(username)
            .fetch_optional(&self.connection_pool)
            .await
    }

    /// Le email sono salvate in minuscolo
    #[instrument(skip(self))]
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, Error> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
        sqlx::query_as::<_, User>(&sql)
            .bind(email.to_lowercase())
            .fetch_optional(&self.connection_pool)
            .await
    }

    #[instrument(skip(self))]
    pub async fn find_by_license_number(&self, license_number: &str) -> Result<Option<User>, Error> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE license_number = $1");
        sqlx::query_as::<_, User>(&sql)
            .bind(license_number)
            .fetch_optional(&self.connection_pool)
            .await
    }

    /// Lista utenti, opzionalmente filtrata per ruolo
    #[instrument(skip(self))]
    pub async fn list(&self, role: Option<UserRole>) -> Result<Vec<User>, Error> {
        let sql = format!(
            "SELECT {USER_COLUMNS} FROM users WHERE ($1::user_role IS NULL OR role = $1) ORDER BY user_id"
        );
        let users = sqlx::query_as::<_, User>(&sql)
            .bind(role)
            .fetch_all(&self.connection_pool)
            .await?;
        debug!("Found {} users", users.len());
        Ok(users)
    }

    /// Vet e personale di clinica, opzionalmente di una sola clinica
    #[instrument(skip(self))]
    pub async fn list_staff(&self, clinic_id: Option<i32>) -> Result<Vec<User>, Error> {
        let sql = format!(
            "SELECT {USER_COLUMNS} FROM users \
             WHERE role IN ('VET', 'CLINIC_STAFF') AND ($1::INTEGER IS NULL OR clinic_id = $1) \
             ORDER BY last_name, first_name"
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(clinic_id)
            .fetch_all(&self.connection_pool)
            .await
    }

    /// Numero di membri dello staff (attivi o no) assegnati alla clinica
    pub async fn count_by_clinic(&self, clinic_id: &i32) -> Result<i64, Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE clinic_id = $1")
            .bind(clinic_id)
            .fetch_one(&self.connection_pool)
            .await
    }

    #[instrument(skip(self, password_hash))]
    pub async fn update_password(&self, user_id: &i32, password_hash: &str) -> Result<(), Error> {
        let result = sqlx::query(
            "UPDATE users SET password = $1, updated_at = NOW() WHERE user_id = $2",
        )
        .bind(password_hash)
        .bind(user_id)
        .execute(&self.connection_pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(Error::RowNotFound);
        }
        info!("Password updated");
        Ok(())
    }
}

impl Create<User, CreateUserDTO> for UserRepository {
    #[instrument(skip(self, data), fields(username = %data.username, role = ?data.role))]
    async fn create(&self, data: &CreateUserDTO) -> Result<User, Error> {
        debug!("Creating new user");
        let sql = format!(
            "INSERT INTO users (username, email, password, first_name, last_name, phone, role, \
             clinic_id, license_number, signing_key) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) RETURNING {USER_COLUMNS}"
        );
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(&data.username)
            .bind(data.email.to_lowercase())
            .bind(&data.password)
            .bind(&data.first_name)
            .bind(&data.last_name)
            .bind(&data.phone)
            .bind(data.role)
            .bind(data.clinic_id)
            .bind(&data.license_number)
            .bind(&data.signing_key)
            .fetch_one(&self.connection_pool)
            .await?;
        info!("User created with id {}", user.user_id);
        Ok(user)
    }
}

impl Read<User, i32> for UserRepository {
    #[instrument(skip(self), fields(user_id = %id))]
    async fn read(&self, id: &i32) -> Result<Option<User>, Error> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE user_id = $1");
        sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.connection_pool)
            .await
    }
}

impl Update<User, UpdateUserDTO, i32> for UserRepository {
    #[instrument(skip(self, data), fields(user_id = %id))]
    async fn update(&self, id: &i32, data: &UpdateUserDTO) -> Result<User, Error> {
        debug!("Updating user");
        if data.is_empty() {
            debug!("No fields to update, returning current user");
            return self.read(id).await?.ok_or(Error::RowNotFound);
        }

        let mut query_builder = sqlx::QueryBuilder::new("UPDATE users SET ");
        let mut separated = query_builder.separated(", ");
        if let Some(ref email) = data.email {
            separated.push("email = ");
            separated.push_bind_unseparated(email.to_lowercase());
        }
        if let Some(ref first_name) = data.first_name {
            separated.push("first_name = ");
            separated.push_bind_unseparated(first_name);
        }
        if let Some(ref last_name) = data.last_name {
            separated.push("last_name = ");
            separated.push_bind_unseparated(last_name);
        }
        if let Some(ref phone) = data.phone {
            separated.push("phone = ");
            separated.push_bind_unseparated(phone);
        }
        if let Some(clinic_id) = data.clinic_id {
            separated.push("clinic_id = ");
            separated.push_bind_unseparated(clinic_id);
        }
        if let Some(ref license_number) = data.license_number {
            separated.push("license_number = ");
            separated.push_bind_unseparated(license_number);
        }
        if let Some(is_active) = data.is_active {
            separated.push("is_active = ");
            separated.push_bind_unseparated(is_active);
        }
        separated.push("updated_at = NOW()");

        query_builder.push(" WHERE user_id = ");
        query_builder.push_bind(id);
        query_builder.push(" RETURNING ");
        query_builder.push(USER_COLUMNS);

        let user = query_builder
            .build_query_as::<User>()
            .fetch_optional(&self.connection_pool)
            .await?
            .ok_or(Error::RowNotFound)?;
        info!("User updated");
        Ok(user)
    }
}

impl Delete<i32> for UserRepository {
    /// Hard delete: usato solo per gli owner senza pet, lo staff viene disattivato
    #[instrument(skip(self), fields(user_id = %user_id))]
    async fn delete(&self, user_id: &i32) -> Result<(), Error> {
        sqlx::query("DELETE FROM users WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.connection_pool)
            .await?;
        info!("User deleted");
        Ok(())
    }
}
