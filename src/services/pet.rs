//! Pet services - Anagrafica degli animali e foto

use crate::core::{AppError, AppState};
use crate::domain::policy::{ensure_can_edit_pet, ensure_can_view_pet};
use crate::dtos::{CreatePetDTO, CreatePetRequestDTO, PetDTO, PetListQuery, UpdatePetDTO};
use crate::entities::{Pet, Species, User, UserRole};
use crate::repositories::{Create, Delete, Read, Update};
use crate::storage::{PhotoStorage, content_type_for, extension_for};
use axum::{
    Extension,
    body::Bytes,
    extract::{Json, Path, Query, State, rejection::BytesRejection},
    http::{HeaderMap, StatusCode, header},
    response::IntoResponse,
};
use axum_macros::debug_handler;
use chrono::{NaiveDate, Utc};
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};
use validator::Validate;

/// Carica un pet, 404 se non esiste
pub(crate) async fn load_pet(state: &AppState, pet_id: &i32) -> Result<Pet, AppError> {
    state.pet.read(pet_id).await?.ok_or_else(|| {
        warn!("Pet {} not found", pet_id);
        AppError::not_found("Pet not found")
    })
}

fn ensure_born(date_of_birth: NaiveDate) -> Result<(), AppError> {
    if date_of_birth > Utc::now().date_naive() {
        return Err(AppError::bad_request("Date of birth cannot be in the future"));
    }
    Ok(())
}

/// La razza deve esistere ed essere della stessa specie del pet
async fn ensure_breed(state: &AppState, breed_id: i32, species: Species) -> Result<(), AppError> {
    let breed = state
        .breed
        .read(&breed_id)
        .await?
        .ok_or_else(|| AppError::bad_request("Unknown breed"))?;
    if breed.species != species {
        return Err(AppError::bad_request("Breed does not belong to the pet species")
            .with_details(format!("{} is a {:?} breed", breed.name, breed.species)));
    }
    Ok(())
}

async fn ensure_microchip_free(
    state: &AppState,
    microchip_number: &str,
    pet_id: Option<i32>,
) -> Result<(), AppError> {
    if let Some(other) = state.pet.find_by_microchip(microchip_number).await? {
        if Some(other.pet_id) != pet_id {
            warn!("Microchip already registered to pet {}", other.pet_id);
            return Err(AppError::conflict("Microchip number already registered"));
        }
    }
    Ok(())
}

#[instrument(skip(state, current_user), fields(user_id = %current_user.user_id, owner_id = ?params.owner_id))]
pub async fn list_pets(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    Query(params): Query<PetListQuery>, // query params /pets?owner_id=3
) -> Result<Json<Vec<PetDTO>>, AppError> {
    // gli owner vedono solo i propri pet, il filtro viene ignorato
    let owner_filter = match current_user.role {
        UserRole::Owner => Some(current_user.user_id),
        _ => params.owner_id,
    };
    let pets = state.pet.list(owner_filter).await?;
    debug!("Found {} pets", pets.len());
    Ok(Json(pets.into_iter().map(PetDTO::from).collect()))
}

#[instrument(skip(state, current_user, body), fields(user_id = %current_user.user_id, species = ?body.species))]
pub async fn create_pet(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    Json(body): Json<CreatePetRequestDTO>,
) -> Result<impl IntoResponse, AppError> {
    debug!("Registering new pet");
    // 1. Owner: il pet è suo; admin: deve indicare un owner esistente; lo staff non registra pet
    // 2. Validare DTO, data di nascita, razza e unicità del microchip
    // 3. Creare il pet
    body.validate()?;

    let owner_id = match current_user.role {
        UserRole::Owner => current_user.user_id,
        UserRole::Admin => {
            let owner_id = body
                .owner_id
                .ok_or_else(|| AppError::bad_request("owner_id is required"))?;
            match state.user.read(&owner_id).await? {
                Some(owner) if owner.role == UserRole::Owner => owner.user_id,
                _ => return Err(AppError::bad_request("owner_id must reference a pet owner")),
            }
        }
        UserRole::Vet | UserRole::ClinicStaff => {
            warn!("Staff tried to register a pet");
            return Err(AppError::forbidden("Only owners and admins can register pets"));
        }
    };

    ensure_born(body.date_of_birth)?;
    if let Some(breed_id) = body.breed_id {
        ensure_breed(&state, breed_id, body.species).await?;
    }
    if let Some(microchip) = &body.microchip_number {
        ensure_microchip_free(&state, microchip, None).await?;
    }

    let new_pet = CreatePetDTO {
        owner_id,
        name: body.name,
        species: body.species,
        breed_id: body.breed_id,
        sex: body.sex,
        date_of_birth: body.date_of_birth,
        microchip_number: body.microchip_number,
        microchip_implanted_on: body.microchip_implanted_on,
    };
    let pet = state.pet.create(&new_pet).await?;
    info!("Pet {} registered for owner {}", pet.pet_id, owner_id);
    Ok((StatusCode::CREATED, Json(PetDTO::from(pet))))
}

#[instrument(skip(state, current_user), fields(user_id = %current_user.user_id, pet_id = %pet_id))]
pub async fn get_pet(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    Path(pet_id): Path<i32>,
) -> Result<Json<PetDTO>, AppError> {
    let pet = load_pet(&state, &pet_id).await?;
    ensure_can_view_pet(&current_user, &pet)?;
    Ok(Json(PetDTO::from(pet)))
}

#[instrument(skip(state, current_user, body), fields(user_id = %current_user.user_id, pet_id = %pet_id))]
pub async fn update_pet(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    Path(pet_id): Path<i32>,
    Json(body): Json<UpdatePetDTO>,
) -> Result<Json<PetDTO>, AppError> {
    body.validate()?;

    let pet = load_pet(&state, &pet_id).await?;
    ensure_can_edit_pet(&current_user, &pet)?;

    body.check_against(&pet)
        .map_err(|e| AppError::bad_request("Validation error").with_details(e.to_string()))?;
    if let Some(date_of_birth) = body.date_of_birth {
        ensure_born(date_of_birth)?;
    }
    if let Some(breed_id) = body.breed_id {
        ensure_breed(&state, breed_id, pet.species).await?;
    }
    if let Some(microchip) = &body.microchip_number {
        ensure_microchip_free(&state, microchip, Some(pet.pet_id)).await?;
    }

    let updated = state.pet.update(&pet.pet_id, &body).await?;
    info!("Pet updated");
    Ok(Json(PetDTO::from(updated)))
}

#[instrument(skip(state, current_user), fields(user_id = %current_user.user_id, pet_id = %pet_id))]
pub async fn delete_pet(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    Path(pet_id): Path<i32>,
) -> Result<StatusCode, AppError> {
    let pet = load_pet(&state, &pet_id).await?;
    ensure_can_edit_pet(&current_user, &pet)?;

    // un pet con storia clinica non si cancella (23503 -> 409)
    state.pet.delete(&pet.pet_id).await?;

    if let Some(key) = &pet.photo_key {
        if let Err(e) = state.photos.delete(key).await {
            error!("Unable to remove photo of deleted pet: {}", e);
        }
    }
    info!("Pet deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /pets/{pet_id}/photo con l'immagine come body grezzo
#[debug_handler]
#[instrument(skip(state, current_user, headers, body), fields(user_id = %current_user.user_id, pet_id = %pet_id))]
pub async fn upload_pet_photo(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    Path(pet_id): Path<i32>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<PetDTO>, AppError> {
    // 1. Content-Type deve essere un formato immagine accettato
    // 2. Dimensione entro il limite configurato (DefaultBodyLimit sulla rotta), body non vuoto
    // 3. Salvare il file con una nuova chiave, aggiornare il pet e rimuovere la foto precedente
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.split(';').next().unwrap_or_default().trim())
        .unwrap_or_default();
    let extension = extension_for(content_type).ok_or_else(|| {
        warn!("Unsupported photo type '{}'", content_type);
        AppError::unsupported_media_type("Photo must be JPEG, PNG or WebP")
    })?;

    let body = body.map_err(|rejection| match rejection.status() {
        StatusCode::PAYLOAD_TOO_LARGE => AppError::payload_too_large("Photo is too large")
            .with_details(format!("Maximum size is {} bytes", state.config.max_photo_bytes)),
        _ => {
            warn!("Unable to read photo body: {}", rejection.body_text());
            AppError::bad_request("Unable to read photo")
        }
    })?;
    if body.is_empty() {
        return Err(AppError::bad_request("Photo is empty"));
    }
    debug!("Photo of {} bytes", body.len());

    let pet = load_pet(&state, &pet_id).await?;
    ensure_can_edit_pet(&current_user, &pet)?;

    let key = PhotoStorage::new_key(extension);
    state.photos.put(&key, &body).await?;
    let updated = match state.pet.set_photo_key(&pet.pet_id, Some(&key)).await {
        Ok(updated) => updated,
        Err(e) => {
            // il file appena scritto resterebbe orfano
            if let Err(cleanup) = state.photos.delete(&key).await {
                error!("Unable to remove orphan photo: {}", cleanup);
            }
            return Err(e.into());
        }
    };

    if let Some(old_key) = &pet.photo_key {
        if let Err(e) = state.photos.delete(old_key).await {
            error!("Unable to remove previous photo: {}", e);
        }
    }

    info!("Photo stored");
    Ok(Json(PetDTO::from(updated)))
}

#[instrument(skip(state, current_user), fields(user_id = %current_user.user_id, pet_id = %pet_id))]
pub async fn get_pet_photo(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    Path(pet_id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let pet = load_pet(&state, &pet_id).await?;
    ensure_can_view_pet(&current_user, &pet)?;

    let key = pet
        .photo_key
        .ok_or_else(|| AppError::not_found("Pet has no photo"))?;
    let data = state.photos.get(&key).await?;
    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, content_type_for(&key)),
            (header::CACHE_CONTROL, "private, max-age=3600"),
        ],
        data,
    ))
}
