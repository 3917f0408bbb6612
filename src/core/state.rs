//! Application State - Stato globale dell'applicazione
//!
//! Contiene tutti i repository, la configurazione e i servizi ausiliari (email, storage foto).

use crate::core::Config;
use crate::mailer::Mailer;
use crate::repositories::{
    BreedRepository, CertificateRepository, ClinicRepository, PasswordResetRepository,
    PetRepository, RecordRepository, UserRepository,
};
use crate::storage::PhotoStorage;
use sqlx::PgPool;

/// Stato globale dell'applicazione condiviso tra tutte le route e middleware
pub struct AppState {
    /// Repository per owner, staff e admin
    pub user: UserRepository,

    pub clinic: ClinicRepository,

    pub breed: BreedRepository,

    pub pet: PetRepository,

    /// Repository per cartelle cliniche e vaccini
    pub record: RecordRepository,

    pub certificate: CertificateRepository,

    /// Token di reset password
    pub reset_token: PasswordResetRepository,

    /// Configurazione (jwt secret, limiti upload, url frontend, ...)
    pub config: Config,

    pub mailer: Mailer,

    /// Storage delle foto dei pet
    pub photos: PhotoStorage,
}

impl AppState {
    /// Crea una nuova istanza di AppState inizializzando tutti i repository
    /// con il pool di connessioni fornito.
    ///
    /// # Arguments
    /// * `pool` - Pool di connessioni Postgres condiviso
    /// * `config` - Configurazione caricata da `Config::from_env`
    /// * `mailer` - Mailer SMTP o di solo logging
    pub fn new(pool: PgPool, config: Config, mailer: Mailer) -> Self {
        Self {
            user: UserRepository::new(pool.clone()),
            clinic: ClinicRepository::new(pool.clone()),
            breed: BreedRepository::new(pool.clone()),
            pet: PetRepository::new(pool.clone()),
            record: RecordRepository::new(pool.clone()),
            certificate: CertificateRepository::new(pool.clone()),
            reset_token: PasswordResetRepository::new(pool),
            photos: PhotoStorage::new(config.upload_dir.clone()),
            config,
            mailer,
        }
    }
}
