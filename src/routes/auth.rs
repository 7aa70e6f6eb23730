// Registration, login and the password reset flow.
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::auth::password::{generate_reset_token, hash_password, verify_password, MIN_PASSWORD_LEN};
use crate::auth::AccountRepository;
use crate::db::models::{PublicAccount, Role};
use crate::error::{AppError, AppResult};
use crate::notify::{spawn_notify, templates};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/forgot-password", post(forgot_password))
        .route("/reset-password/{token}", post(reset_password))
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct RegisterRequest {
    name: String,
    email: String,
    password: String,
    role: Option<String>,
    phone_number: Option<String>,
    address: Option<String>,
}

#[derive(Serialize)]
struct AuthResponse {
    token: String,
    user: PublicAccount,
}

async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> AppResult<impl IntoResponse> {
    if req.name.trim().is_empty() || req.email.trim().is_empty() || req.password.is_empty() {
        return Err(AppError::Validation(
            "Name, email, and password are required.".into(),
        ));
    }
    if req.password.len() < MIN_PASSWORD_LEN {
        return Err(AppError::Validation(
            "Password must be at least 6 characters long.".into(),
        ));
    }

    let role = match req.role.as_deref() {
        None => Role::Adopter,
        Some(raw) => match Role::parse(raw) {
            Some(Role::Admin) => {
                return Err(AppError::Forbidden(
                    "Admin registration is not allowed through this endpoint.".into(),
                ))
            }
            Some(role) => role,
            None => return Err(AppError::Validation("Invalid role specified.".into())),
        },
    };

    let password_hash =
        hash_password(&req.password).map_err(|e| AppError::Internal(e.to_string()))?;

    let accounts = AccountRepository::new(state.db.clone());
    let account = accounts.create(
        &req.name,
        &req.email,
        &password_hash,
        role,
        req.phone_number.as_deref(),
        req.address.as_deref(),
    )?;

    tracing::info!(account_id = %account.id, role = %role.as_str(), "Account registered");

    let token = state
        .tokens
        .issue(&account.id, &account.name, &account.email, account.role)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            token,
            user: account.into(),
        }),
    ))
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct LoginRequest {
    email: String,
    password: String,
}

/// Unknown email and wrong password produce the same response, so the
/// endpoint cannot be used to probe which addresses are registered.
async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    let accounts = AccountRepository::new(state.db.clone());
    let account = accounts
        .find_by_email(&req.email)?
        .ok_or(AppError::InvalidCredentials)?;

    if !verify_password(&req.password, &account.password_hash) {
        return Err(AppError::InvalidCredentials);
    }

    let token = state
        .tokens
        .issue(&account.id, &account.name, &account.email, account.role)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(Json(AuthResponse {
        token,
        user: account.into(),
    }))
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct ForgotPasswordRequest {
    email: String,
}

/// Always acknowledges with the same message, whether or not the address
/// matches an account.
async fn forgot_password(
    State(state): State<AppState>,
    Json(req): Json<ForgotPasswordRequest>,
) -> AppResult<Json<serde_json::Value>> {
    let accounts = AccountRepository::new(state.db.clone());

    if let Some(account) = accounts.find_by_email(&req.email)? {
        let token = generate_reset_token();
        accounts.store_reset_token(
            &account.id,
            &token,
            state.config.auth.reset_token_minutes,
        )?;

        let reset_url = format!(
            "{}/reset-password/{}",
            state.config.server.frontend_url, token
        );
        spawn_notify(
            state.notifier.clone(),
            templates::password_reset(&account.email, &reset_url),
        );
    }

    Ok(Json(json!({
        "message": "If an account with that email exists, a password reset link has been sent."
    })))
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct ResetPasswordRequest {
    password: String,
}

async fn reset_password(
    State(state): State<AppState>,
    Path(token): Path<String>,
    Json(req): Json<ResetPasswordRequest>,
) -> AppResult<Json<serde_json::Value>> {
    if req.password.len() < MIN_PASSWORD_LEN {
        return Err(AppError::Validation(
            "Password must be at least 6 characters long.".into(),
        ));
    }

    let accounts = AccountRepository::new(state.db.clone());
    let account = accounts.find_by_valid_reset_token(&token)?.ok_or_else(|| {
        AppError::Validation("Password reset token is invalid or has expired.".into())
    })?;

    let password_hash =
        hash_password(&req.password).map_err(|e| AppError::Internal(e.to_string()))?;
    accounts.apply_password_reset(&account.id, &password_hash)?;

    tracing::info!(account_id = %account.id, "Password reset completed");

    spawn_notify(
        state.notifier.clone(),
        templates::password_changed(&account.email),
    );

    Ok(Json(json!({ "message": "Password has been reset successfully." })))
}
