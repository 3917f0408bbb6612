//! Trait comuni dei repository
//!
//! Ogni repository implementa solo le operazioni che ha senso esporre per la sua tabella.

/// Inserimento di una nuova riga
///
/// * `Entity` - riga restituita, con id e timestamp assegnati dal database
/// * `CreateDTO` - dati di creazione, senza id
pub trait Create<Entity, CreateDTO> {
    async fn create(&self, data: &CreateDTO) -> Result<Entity, sqlx::Error>;
}

/// Lettura per chiave primaria; `Ok(None)` se la riga non esiste
pub trait Read<Entity, Id> {
    async fn read(&self, id: &Id) -> Result<Option<Entity>, sqlx::Error>;
}

/// Aggiornamento parziale: solo i campi `Some(_)` del DTO vengono scritti.
/// Restituisce `sqlx::Error::RowNotFound` se la riga non esiste.
pub trait Update<Entity, UpdateDTO, Id> {
    async fn update(&self, id: &Id, data: &UpdateDTO) -> Result<Entity, sqlx::Error>;
}

/// Cancellazione per chiave primaria
pub trait Delete<Id> {
    async fn delete(&self, id: &Id) -> Result<(), sqlx::Error>;
}
