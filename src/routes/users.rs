// Profile and favorites endpoints for the authenticated account.
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;

use crate::auth::AccountRepository;
use crate::catalog::PetWithShelter;
use crate::db::models::PublicAccount;
use crate::error::{AppError, AppResult};
use crate::extractors::CurrentUser;
use crate::favorites::FavoriteRepository;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/me", get(profile).put(update_profile))
        .route("/favorites", get(list_favorites))
        .route(
            "/favorites/{pet_id}",
            post(add_favorite).delete(remove_favorite),
        )
}

/// The account behind the token, re-read from the database so revoked or
/// deleted accounts do not keep a working profile endpoint.
async fn profile(
    State(state): State<AppState>,
    user: CurrentUser,
) -> AppResult<Json<PublicAccount>> {
    let account = AccountRepository::new(state.db.clone())
        .find_by_id(&user.id)?
        .ok_or_else(|| AppError::NotFound("User not found.".into()))?;
    Ok(Json(account.into()))
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct UpdateProfileRequest {
    name: Option<String>,
    phone_number: Option<String>,
    address: Option<String>,
}

async fn update_profile(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(req): Json<UpdateProfileRequest>,
) -> AppResult<Json<PublicAccount>> {
    let account = AccountRepository::new(state.db.clone()).update_profile(
        &user.id,
        req.name.as_deref(),
        req.phone_number.as_deref(),
        req.address.as_deref(),
    )?;
    Ok(Json(account.into()))
}

async fn list_favorites(
    State(state): State<AppState>,
    user: CurrentUser,
) -> AppResult<Json<Vec<PetWithShelter>>> {
    let favorites = FavoriteRepository::new(state.db.clone()).list(&user.id)?;
    Ok(Json(favorites))
}

async fn add_favorite(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(pet_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    FavoriteRepository::new(state.db.clone()).add(&user.id, &pet_id)?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Pet added to favorites." })),
    ))
}

async fn remove_favorite(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(pet_id): Path<String>,
) -> AppResult<Json<serde_json::Value>> {
    FavoriteRepository::new(state.db.clone()).remove(&user.id, &pet_id)?;
    Ok(Json(json!({ "message": "Pet removed from favorites." })))
}
