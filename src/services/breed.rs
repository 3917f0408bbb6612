//! Breed services - Catalogo delle razze per specie

use crate::core::{AppError, AppState, require_role};
use crate::dtos::{BreedListQuery, CreateBreedDTO};
use crate::entities::{Breed, User, UserRole};
use crate::repositories::Create;
use axum::{
    Extension,
    extract::{Json, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use validator::Validate;

#[instrument(skip(state), fields(species = ?params.species))]
pub async fn list_breeds(
    State(state): State<Arc<AppState>>,
    Query(params): Query<BreedListQuery>, // query params /breeds?species=DOG
) -> Result<Json<Vec<Breed>>, AppError> {
    let breeds = state.breed.list(params.species).await?;
    debug!("Found {} breeds", breeds.len());
    Ok(Json(breeds))
}

#[instrument(skip(state, current_user, body), fields(user_id = %current_user.user_id, species = ?body.species))]
pub async fn create_breed(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    Json(body): Json<CreateBreedDTO>,
) -> Result<impl IntoResponse, AppError> {
    require_role(&current_user, &[UserRole::Admin])?;
    body.validate()?;

    if state
        .breed
        .find_by_name(&body.name, body.species)
        .await?
        .is_some()
    {
        warn!("Breed already exists");
        return Err(AppError::conflict("Breed already exists for this species"));
    }

    let breed = state.breed.create(&body).await?;
    info!("Breed {} created", breed.breed_id);
    Ok((StatusCode::CREATED, Json(breed)))
}
