//! PasswordResetRepository - Token di reset password

use crate::entities::PasswordResetToken;
use chrono::{DateTime, Utc};
use sqlx::{Error, PgPool};
use tracing::{info, instrument};

pub struct PasswordResetRepository {
    connection_pool: PgPool,
}

impl PasswordResetRepository {
    pub fn new(connection_pool: PgPool) -> Self {
        Self { connection_pool }
    }

    /// Un nuovo token invalida quelli ancora aperti dello stesso utente
    #[instrument(skip(self, token))]
    pub async fn create(
        &self,
        token: &str,
        user_id: &i32,
        expires_at: DateTime<Utc>,
    ) -> Result<PasswordResetToken, Error> {
        let mut tx = self.connection_pool.begin().await?;

        sqlx::query(
            "UPDATE password_reset_tokens SET used_at = NOW() WHERE user_id = $1 AND used_at IS NULL",
        )
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

        let created = sqlx::query_as::<_, PasswordResetToken>(
            "INSERT INTO password_reset_tokens (token, user_id, expires_at) VALUES ($1, $2, $3) \
             RETURNING token, user_id, expires_at, used_at",
        )
        .bind(token)
        .bind(user_id)
        .bind(expires_at)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        info!("Password reset token created");
        Ok(created)
    }

    pub async fn read(&self, token: &str) -> Result<Option<PasswordResetToken>, Error> {
        sqlx::query_as::<_, PasswordResetToken>(
            "SELECT token, user_id, expires_at, used_at FROM password_reset_tokens WHERE token = $1",
        )
        .bind(token)
        .fetch_optional(&self.connection_pool)
        .await
    }

    /// Consuma il token e imposta la nuova password nella stessa transazione.
    /// Restituisce `false` se il token era già stato usato o è scaduto.
    #[instrument(skip(self, token, password_hash))]
    pub async fn consume_and_set_password(
        &self,
        token: &str,
        user_id: &i32,
        password_hash: &str,
    ) -> Result<bool, Error> {
        let mut tx = self.connection_pool.begin().await?;

        let consumed = sqlx::query(
            "UPDATE password_reset_tokens SET used_at = NOW() \
             WHERE token = $1 AND user_id = $2 AND used_at IS NULL AND expires_at > NOW()",
        )
        .bind(token)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

        if consumed.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(false);
        }

        sqlx::query("UPDATE users SET password = $1, updated_at = NOW() WHERE user_id = $2")
            .bind(password_hash)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        info!("Password reset completed");
        Ok(true)
    }
}
