//! Entities module - Entità del dominio applicativo
//!
//! Questo modulo contiene tutte le entità (models) che rappresentano i dati persistiti nel database.
//! Ogni entity corrisponde a una tabella nel database.

pub mod breed;
pub mod certificate;
pub mod clinic;
pub mod enums;
pub mod password_reset_token;
pub mod pet;
pub mod record;
pub mod user;

// Re-exports per facilitare l'import
pub use breed::Breed;
pub use certificate::Certificate;
pub use clinic::Clinic;
pub use enums::{PetSex, RecordType, Species, UserRole, VaccineKind};
pub use password_reset_token::PasswordResetToken;
pub use pet::Pet;
pub use record::Record;
pub use user::User;
