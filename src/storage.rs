//! Storage delle foto dei pet sul filesystem locale
//!
//! Layout su disco:
//! ```text
//! {base_path}/
//!   {key[0..2]}/     # primi 2 caratteri della chiave, per lo sharding
//!     {key[2..]}
//! ```

use axum::body::Bytes;
use rand::RngCore;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;
use tracing::{debug, instrument};

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Object not found: {0}")]
    NotFound(String),

    #[error("Invalid key: {0}")]
    InvalidKey(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Formati immagine accettati: (content type, estensione)
const ACCEPTED_IMAGES: &[(&str, &str)] = &[
    ("image/jpeg", "jpg"),
    ("image/png", "png"),
    ("image/webp", "webp"),
];

pub fn extension_for(content_type: &str) -> Option<&'static str> {
    ACCEPTED_IMAGES
        .iter()
        .find(|(ct, _)| content_type.eq_ignore_ascii_case(ct))
        .map(|(_, ext)| *ext)
}

pub fn content_type_for(key: &str) -> &'static str {
    let ext = key.rsplit('.').next().unwrap_or_default();
    ACCEPTED_IMAGES
        .iter()
        .find(|(_, e)| *e == ext)
        .map(|(ct, _)| *ct)
        .unwrap_or("application/octet-stream")
}

pub struct PhotoStorage {
    base_path: PathBuf,
}

impl PhotoStorage {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    /// Nuova chiave casuale con l'estensione richiesta
    pub fn new_key(extension: &str) -> String {
        let mut raw = [0u8; 16];
        rand::rng().fill_bytes(&mut raw);
        format!("{}.{}", hex::encode(raw), extension)
    }

    fn key_path(&self, key: &str) -> StorageResult<PathBuf> {
        let valid = key.len() > 2
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '.')
            && !key.starts_with('.');
        if !valid {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.base_path.join(&key[..2]).join(&key[2..]))
    }

    async fn ensure_parent(&self, path: &Path) -> StorageResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        Ok(())
    }

    #[instrument(skip(self, data), fields(size = data.len()))]
    pub async fn put(&self, key: &str, data: &[u8]) -> StorageResult<()> {
        let path = self.key_path(key)?;
        self.ensure_parent(&path).await?;
        fs::write(&path, data).await?;
        debug!("Stored photo {}", key);
        Ok(())
    }

    pub async fn get(&self, key: &str) -> StorageResult<Bytes> {
        let path = self.key_path(key)?;
        let data = fs::read(&path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                StorageError::NotFound(key.to_string())
            } else {
                StorageError::Io(e)
            }
        })?;
        Ok(Bytes::from(data))
    }

    /// Cancellare una chiave inesistente non è un errore
    pub async fn delete(&self, key: &str) -> StorageResult<()> {
        let path = self.key_path(key)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::Io(e)),
        }
    }
}
