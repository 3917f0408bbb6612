//! Domain module - Regole di business pure, senza I/O
//!
//! - Finestre di validità antirabbica
//! - Idoneità AHC
//! - Firma dei record e dei certificati
//! - Regole di accesso

pub mod ahc;
pub mod policy;
pub mod rabies;
pub mod signing;

pub use ahc::{AhcAssessment, Ineligibility};
pub use rabies::{RabiesStatus, RabiesWindow};
