//! Regole di accesso basate su ruolo e proprietà delle risorse

use crate::core::AppError;
use crate::entities::{Pet, Record, User, UserRole};
use tracing::warn;

/// Owner del pet, staff delle cliniche e admin possono leggere un pet e i suoi dati
pub fn can_view_pet(user: &User, pet: &Pet) -> bool {
    match user.role {
        UserRole::Owner => pet.owner_id == user.user_id,
        UserRole::Vet | UserRole::ClinicStaff | UserRole::Admin => true,
    }
}

/// Solo l'owner e gli admin modificano l'anagrafica del pet
pub fn can_edit_pet(user: &User, pet: &Pet) -> bool {
    match user.role {
        UserRole::Owner => pet.owner_id == user.user_id,
        UserRole::Admin => true,
        UserRole::Vet | UserRole::ClinicStaff => false,
    }
}

/// Solo il vet autore modifica (o firma) un proprio record
pub fn is_record_author(user: &User, record: &Record) -> bool {
    user.role == UserRole::Vet && record.vet_id == user.user_id
}

pub fn can_delete_record(user: &User, record: &Record) -> bool {
    is_record_author(user, record) || user.role == UserRole::Admin
}

/// Gli admin vedono tutto lo staff, lo staff solo i colleghi della propria clinica
pub fn can_view_staff(user: &User, staff: &User) -> bool {
    match user.role {
        UserRole::Admin => true,
        UserRole::Vet | UserRole::ClinicStaff => {
            user.clinic_id.is_some() && user.clinic_id == staff.clinic_id
        }
        UserRole::Owner => false,
    }
}

pub fn ensure_can_view_pet(user: &User, pet: &Pet) -> Result<(), AppError> {
    if can_view_pet(user, pet) {
        return Ok(());
    }
    warn!("User {} denied access to pet {}", user.user_id, pet.pet_id);
    Err(AppError::forbidden("You cannot access this pet"))
}

pub fn ensure_can_edit_pet(user: &User, pet: &Pet) -> Result<(), AppError> {
    if can_edit_pet(user, pet) {
        return Ok(());
    }
    warn!("User {} denied edit of pet {}", user.user_id, pet.pet_id);
    Err(AppError::forbidden("You cannot modify this pet"))
}
