//! Firma digitale di record e certificati
//!
//! Ogni vet ha una chiave segreta generata dal server (32 byte, hex). La firma è un
//! HMAC-SHA256 del payload canonico del documento, codificato in hex minuscolo.

use crate::entities::Record;
use chrono::NaiveDate;
use hmac::{Hmac, Mac};
use rand::RngCore;
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

const KEY_BYTES: usize = 32;

#[derive(Debug, Error)]
pub enum SigningError {
    #[error("signing key is not valid hex: {0}")]
    InvalidKey(#[from] hex::FromHexError),

    #[error("signing key has invalid length")]
    InvalidKeyLength,
}

/// Genera una nuova chiave di firma per un vet
pub fn generate_signing_key() -> String {
    let mut key = [0u8; KEY_BYTES];
    rand::rng().fill_bytes(&mut key);
    hex::encode(key)
}

fn mac_for(key_hex: &str) -> Result<HmacSha256, SigningError> {
    let key = hex::decode(key_hex)?;
    if key.len() != KEY_BYTES {
        return Err(SigningError::InvalidKeyLength);
    }
    HmacSha256::new_from_slice(&key).map_err(|_| SigningError::InvalidKeyLength)
}

pub fn sign(key_hex: &str, payload: &str) -> Result<String, SigningError> {
    let mut mac = mac_for(key_hex)?;
    mac.update(payload.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Confronto a tempo costante tramite `verify_slice`
pub fn verify(key_hex: &str, payload: &str, signature_hex: &str) -> Result<bool, SigningError> {
    let Ok(signature) = hex::decode(signature_hex.trim()) else {
        return Ok(false);
    };
    let mut mac = mac_for(key_hex)?;
    mac.update(payload.as_bytes());
    Ok(mac.verify_slice(&signature).is_ok())
}

/// Payload canonico di un record: campi separati da `|`, opzionali vuoti se assenti
pub fn record_payload(record: &Record) -> String {
    [
        "record".to_string(),
        record.record_id.to_string(),
        record.pet_id.to_string(),
        record.vet_id.to_string(),
        record.clinic_id.to_string(),
        record.record_type.as_str().to_string(),
        record.title.clone(),
        record.description.clone(),
        record.visit_date.to_string(),
        record
            .vaccine_kind
            .map(|k| k.as_str().to_string())
            .unwrap_or_default(),
        record.vaccine_name.clone().unwrap_or_default(),
        record.batch_number.clone().unwrap_or_default(),
        record
            .validity_years
            .map(|y| y.to_string())
            .unwrap_or_default(),
    ]
    .join("|")
}

/// Campi di un certificato coperti dalla firma
#[derive(Debug, Clone)]
pub struct CertificatePayload<'a> {
    pub certificate_number: &'a str,
    pub pet_id: i32,
    pub vet_id: i32,
    pub clinic_id: i32,
    pub rabies_record_id: i32,
    pub destination_country: &'a str,
    pub issue_date: NaiveDate,
    pub travel_date: NaiveDate,
    pub entry_valid_until: NaiveDate,
    pub onward_valid_until: NaiveDate,
}

impl CertificatePayload<'_> {
    pub fn canonical(&self) -> String {
        format!(
            "certificate|{}|{}|{}|{}|{}|{}|{}|{}|{}|{}",
            self.certificate_number,
            self.pet_id,
            self.vet_id,
            self.clinic_id,
            self.rabies_record_id,
            self.destination_country,
            self.issue_date,
            self.travel_date,
            self.entry_valid_until,
            self.onward_valid_until
        )
    }
}
