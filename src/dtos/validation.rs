//! Regole di validazione condivise tra i DTO

use lazy_static::lazy_static;
use regex::Regex;
use validator::ValidationError;

lazy_static! {
    pub static ref USERNAME_RE: Regex = Regex::new(r"^[A-Za-z0-9_.-]{3,50}$").unwrap();
    pub static ref PHONE_RE: Regex = Regex::new(r"^\+?[0-9 ()-]{6,32}$").unwrap();
    pub static ref MICROCHIP_RE: Regex = Regex::new(r"^[0-9]{15}$").unwrap();
    pub static ref LICENSE_RE: Regex = Regex::new(r"^[A-Z0-9-]{4,32}$").unwrap();
    pub static ref COUNTRY_RE: Regex = Regex::new(r"^[A-Z]{2}$").unwrap();
}

/// Almeno 8 caratteri, con almeno una lettera e una cifra
pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    let long_enough = (8..=128).contains(&password.chars().count());
    let has_letter = password.chars().any(|c| c.is_alphabetic());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    if long_enough && has_letter && has_digit {
        Ok(())
    } else {
        let mut err = ValidationError::new("weak_password");
        err.message = Some(
            "Password must be 8-128 characters and contain at least one letter and one digit".into(),
        );
        Err(err)
    }
}
