//! DTOs module - Data Transfer Objects
//!
//! Questo modulo contiene tutti i DTOs usati per la comunicazione client-server.
//! I DTOs separano la rappresentazione esterna (API) dalla rappresentazione interna (entities).
//! I `...RequestDTO` sono i body delle richieste, i `Create...DTO` sono quelli passati ai repository.

pub mod auth;
pub mod breed;
pub mod certificate;
pub mod clinic;
pub mod pet;
pub mod query;
pub mod record;
pub mod staff;
pub mod user;
pub mod validation;

// Re-exports per facilitare l'import
pub use auth::{ForgotPasswordDTO, LoginDTO, RegisterRequestDTO, ResetPasswordDTO, TokenDTO};
pub use breed::CreateBreedDTO;
pub use certificate::{
    CertificateDTO, CreateCertificateDTO, IssueCertificateRequestDTO, RabiesStatusDTO,
};
pub use clinic::{ClinicDTO, CreateClinicDTO, UpdateClinicDTO};
pub use pet::{CreatePetDTO, CreatePetRequestDTO, PetDTO, UpdatePetDTO};
pub use query::{
    BreedListQuery, EligibilityQuery, PetListQuery, RabiesStatusQuery, StaffListQuery,
    UserListQuery,
};
pub use record::{
    CreateRecordDTO, CreateRecordRequestDTO, RecordDTO, SignatureVerificationDTO,
    UpdateRecordDTO, VaccineDetailsDTO,
};
pub use staff::{CreateStaffRequestDTO, UpdateStaffRequestDTO};
pub use user::{ChangePasswordDTO, CreateUserDTO, UpdateUserDTO, UserDTO};
