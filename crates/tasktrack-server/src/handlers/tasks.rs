//! Task CRUD handlers.
//!
//! Every handler runs behind the auth middleware and reads the caller's
//! identity from the [`AuthContext`] extension; the raw token never reaches
//! this layer.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::{Extension, Json};
use serde_json::json;
use uuid::Uuid;

use tasktrack_auth::AuthContext;
use tasktrack_core::TaskFields;

use crate::error::ApiError;
use crate::state::AppState;

pub async fn list_tasks(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
) -> Result<impl IntoResponse, ApiError> {
    let list = state.tasks.list(ctx.user_id).await?;
    Ok((
        StatusCode::OK,
        Json(json!({
            "tasks": list.tasks,
            "fromCache": list.from_cache,
        })),
    ))
}

pub async fn create_task(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Json(fields): Json<TaskFields>,
) -> Result<impl IntoResponse, ApiError> {
    let task = state.tasks.create(ctx.user_id, fields).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Task created",
            "task": task,
        })),
    ))
}

pub async fn update_task(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<String>,
    Json(fields): Json<TaskFields>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_task_id(&id)?;
    let task = state.tasks.update(ctx.user_id, id, fields).await?;
    Ok((
        StatusCode::OK,
        Json(json!({
            "message": "Task updated",
            "task": task,
        })),
    ))
}

pub async fn delete_task(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_task_id(&id)?;
    state.tasks.delete(ctx.user_id, id).await?;
    Ok((StatusCode::OK, Json(json!({ "message": "Task deleted" }))))
}

/// A malformed id is a validation failure, not a lookup miss: reject it
/// before any store or cache call.
fn parse_task_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::validation("Invalid task ID"))
}
