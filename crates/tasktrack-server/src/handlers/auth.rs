//! Signup and login.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::Deserialize;
use serde_json::json;

use tasktrack_auth::{hash_password, verify_password};
use tasktrack_core::{User, validate_email, validate_name, validate_password};
use tasktrack_storage::StorageError;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

pub async fn signup(
    State(state): State<AppState>,
    Json(body): Json<SignupRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let name = validate_name(body.name.as_deref().unwrap_or_default())?;
    let email = validate_email(body.email.as_deref().unwrap_or_default())?;
    let password = body.password.unwrap_or_default();
    validate_password(&password)?;

    let password_hash = hash_password(&password)?;
    let user = User::new(name, email, password_hash);

    let created = state.users.create_user(&user).await.map_err(|e| match e {
        StorageError::AlreadyExists { .. } => ApiError::conflict("Email already registered"),
        other => other.into(),
    })?;

    let token = state.jwt.issue(created.id)?;
    tracing::info!(user_id = %created.id, "user created");

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "User created successfully",
            "token": token,
            "user": created,
        })),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let email = validate_email(body.email.as_deref().unwrap_or_default())?;
    let password = body.password.unwrap_or_default();
    if password.is_empty() {
        return Err(ApiError::validation("Password required"));
    }

    // Unknown email and wrong password produce the identical response; the
    // login endpoint must not reveal which accounts exist.
    let user = state
        .users
        .find_by_email(&email)
        .await?
        .ok_or_else(invalid_credentials)?;

    if !verify_password(&password, &user.password_hash)? {
        return Err(invalid_credentials());
    }

    let token = state.jwt.issue(user.id)?;

    Ok((
        StatusCode::OK,
        Json(json!({
            "message": "Login successful",
            "token": token,
            "user": user,
        })),
    ))
}

fn invalid_credentials() -> ApiError {
    ApiError::unauthorized("Invalid credentials")
}
