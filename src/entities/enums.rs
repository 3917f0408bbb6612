//! Enumerazioni - Tipi enumerati utilizzati nelle entità
//!
//! Ogni enum corrisponde a un tipo ENUM di postgres definito nelle migrations.

use serde::{Deserialize, Serialize};

// ********************* ENUMERAZIONI UTILI **********************//

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    Owner,
    Vet,
    ClinicStaff,
    Admin,
}

impl UserRole {
    /// Vet e personale di clinica sono "staff": sono legati ad una clinica
    pub fn is_staff(&self) -> bool {
        matches!(self, UserRole::Vet | UserRole::ClinicStaff)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "species", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Species {
    Dog,
    Cat,
    Ferret,
    Other,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default, sqlx::Type)]
#[sqlx(type_name = "pet_sex", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PetSex {
    Male,
    Female,
    #[default]
    Unknown,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "record_type", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecordType {
    Examination,
    Vaccination,
    Treatment,
    Surgery,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "vaccine_kind", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VaccineKind {
    Rabies,
    Other,
}

// nomi usati nella firma dei record: devono restare stabili anche se cambia il Debug
impl RecordType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordType::Examination => "EXAMINATION",
            RecordType::Vaccination => "VACCINATION",
            RecordType::Treatment => "TREATMENT",
            RecordType::Surgery => "SURGERY",
        }
    }
}

impl VaccineKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            VaccineKind::Rabies => "RABIES",
            VaccineKind::Other => "OTHER",
        }
    }
}
