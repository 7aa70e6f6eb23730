// Adoption application endpoints. Mutations go through ApplicationRepository
// transactions; the emails they trigger are fired after commit and never
// affect the response.
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::extractors::{CurrentUser, ShelterUser};
use crate::notify::{spawn_notify, templates};
use crate::state::AppState;
use crate::workflow::domain::{
    ApplicationForApplicant, ApplicationForShelter, Decision, NewApplication,
};
use crate::workflow::{Application, ApplicationRepository};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(submit))
        .route("/my-applications", get(my_applications))
        .route("/shelter-applications", get(shelter_applications))
        .route("/{id}", put(decide))
        .route("/{id}/withdraw", post(withdraw))
}

async fn submit(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(new_app): Json<NewApplication>,
) -> AppResult<impl IntoResponse> {
    let outcome = ApplicationRepository::new(state.db.clone()).submit(&user.id, &new_app)?;

    tracing::info!(
        application_id = %outcome.application.id,
        pet_id = %outcome.application.pet_id,
        "Adoption application submitted"
    );

    spawn_notify(
        state.notifier.clone(),
        templates::new_application(&outcome.shelter_email, &outcome.pet_name, &user.name),
    );

    Ok((StatusCode::CREATED, Json(outcome.application)))
}

async fn my_applications(
    State(state): State<AppState>,
    user: CurrentUser,
) -> AppResult<Json<Vec<ApplicationForApplicant>>> {
    let applications =
        ApplicationRepository::new(state.db.clone()).list_for_applicant(&user.id)?;
    Ok(Json(applications))
}

async fn shelter_applications(
    State(state): State<AppState>,
    ShelterUser(user): ShelterUser,
) -> AppResult<Json<Vec<ApplicationForShelter>>> {
    let applications = ApplicationRepository::new(state.db.clone()).list_for_shelter(&user.id)?;
    Ok(Json(applications))
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct DecisionRequest {
    status: String,
    shelter_notes: Option<String>,
}

async fn decide(
    State(state): State<AppState>,
    ShelterUser(user): ShelterUser,
    Path(id): Path<String>,
    Json(req): Json<DecisionRequest>,
) -> AppResult<Json<Application>> {
    let decision = match req.status.as_str() {
        "Approved" => Decision::Approved,
        "Rejected" => Decision::Rejected,
        _ => return Err(AppError::Validation("Invalid status value.".into())),
    };

    let outcome = ApplicationRepository::new(state.db.clone()).decide(
        &id,
        &user.id,
        decision,
        req.shelter_notes.as_deref(),
    )?;

    tracing::info!(
        application_id = %id,
        status = %decision.as_str(),
        "Adoption application decided"
    );

    spawn_notify(
        state.notifier.clone(),
        templates::application_decision(
            &outcome.applicant_email,
            &outcome.applicant_name,
            &outcome.pet_name,
            decision.as_str(),
            outcome.application.shelter_notes.as_deref(),
            &state.config.server.frontend_url,
        ),
    );

    Ok(Json(outcome.application))
}

async fn withdraw(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<Application>> {
    let application = ApplicationRepository::new(state.db.clone()).withdraw(&id, &user.id)?;
    tracing::info!(application_id = %id, "Adoption application withdrawn");
    Ok(Json(application))
}
