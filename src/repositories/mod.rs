//! Repositories module - Coordinatore per tutti i repository del progetto
//!
//! Ogni repository gestisce le operazioni di database per una specifica entità.

// ************************* NOTA SU SQLX ************************* //

/*
   Le query usano `sqlx::query_as::<_, T>` con `#[derive(sqlx::FromRow)]` sulle entità
   invece delle macro `query!`/`query_as!`: così il crate compila anche senza un database
   raggiungibile (niente DATABASE_URL a compile time, niente cache offline da tenere allineata).
   Lo schema vive in `migrations/` ed è la fonte di verità: se cambiate una colonna,
   aggiornate la costante `*_COLUMNS` del repository e la struct dell'entità.

   Come per le macro, il risultato si sceglie con:
   .execute()         -> INSERT/UPDATE/DELETE senza RETURNING
   .fetch_optional()  -> zero o una riga
   .fetch_one()       -> esattamente una riga (RowNotFound altrimenti)
   .fetch_all()       -> tutte le righe
   e l'errore viene propagato con `?` fino al service, che lo converte in AppError.
*/

// ************************* MODULI REPOSITORY ************************* //

pub mod breed;
pub mod certificate;
pub mod clinic;
pub mod password_reset;
pub mod pet;
pub mod record;
pub mod traits;
pub mod user;

// Re-esportazione dei trait per facilitare l'import
pub use traits::{Create, Delete, Read, Update};

// Re-esportazione delle struct dei repository per facilitare l'import
pub use breed::BreedRepository;
pub use certificate::CertificateRepository;
pub use clinic::ClinicRepository;
pub use password_reset::PasswordResetRepository;
pub use pet::PetRepository;
pub use record::RecordRepository;
pub use user::UserRepository;
