// Pet catalog endpoints. Browsing is public; every write requires the
// Shelter role and is scoped to the caller's own listings.
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;

use crate::catalog::{NewPet, Pet, PetFilters, PetPatch, PetRepository, PetWithShelter};
use crate::error::AppResult;
use crate::extractors::ShelterUser;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_pets).post(create_pet))
        .route("/my-pets", get(my_pets))
        .route(
            "/{id}",
            get(get_pet).put(update_pet).delete(delete_pet),
        )
}

async fn list_pets(
    State(state): State<AppState>,
    Query(filters): Query<PetFilters>,
) -> AppResult<Json<Vec<PetWithShelter>>> {
    let pets = PetRepository::new(state.db.clone()).list_public(&filters)?;
    Ok(Json(pets))
}

async fn my_pets(
    State(state): State<AppState>,
    ShelterUser(user): ShelterUser,
) -> AppResult<Json<Vec<Pet>>> {
    let pets = PetRepository::new(state.db.clone()).list_for_shelter(&user.id)?;
    Ok(Json(pets))
}

async fn get_pet(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<PetWithShelter>> {
    let pet = PetRepository::new(state.db.clone()).get(&id)?;
    Ok(Json(pet))
}

async fn create_pet(
    State(state): State<AppState>,
    ShelterUser(user): ShelterUser,
    Json(new_pet): Json<NewPet>,
) -> AppResult<impl IntoResponse> {
    let pet = PetRepository::new(state.db.clone()).create(&user.id, &new_pet)?;
    tracing::info!(pet_id = %pet.id, owner_id = %user.id, "Pet listing created");
    Ok((StatusCode::CREATED, Json(pet)))
}

async fn update_pet(
    State(state): State<AppState>,
    ShelterUser(user): ShelterUser,
    Path(id): Path<String>,
    Json(patch): Json<PetPatch>,
) -> AppResult<Json<Pet>> {
    let pet = PetRepository::new(state.db.clone()).update(&id, &user.id, &patch)?;
    Ok(Json(pet))
}

async fn delete_pet(
    State(state): State<AppState>,
    ShelterUser(user): ShelterUser,
    Path(id): Path<String>,
) -> AppResult<Json<serde_json::Value>> {
    PetRepository::new(state.db.clone()).delete(&id, &user.id)?;
    tracing::info!(pet_id = %id, owner_id = %user.id, "Pet listing deleted");
    Ok(Json(json!({ "message": "Pet listing deleted successfully." })))
}
