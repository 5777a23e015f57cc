//! Authentication middleware.
//!
//! Validates the Bearer token, confirms the subject still exists, and
//! injects an [`AuthContext`] into request extensions for the handlers.
//! Rejections happen here, before any task-service code runs.

use axum::body::Body;
use axum::extract::State;
use axum::http::{Request, header::AUTHORIZATION};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use tasktrack_auth::AuthContext;

use crate::error::ApiError;
use crate::state::AppState;

pub async fn authenticate(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let auth_header = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let token = match auth_header.and_then(|h| h.strip_prefix("Bearer ")) {
        Some(t) if !t.is_empty() => t,
        _ => {
            tracing::debug!(path = %req.uri().path(), "missing or malformed Authorization header");
            return ApiError::unauthorized("No token provided").into_response();
        }
    };

    let claims = match state.jwt.verify(token) {
        Ok(claims) => claims,
        Err(e) => {
            tracing::debug!(error = %e, "token validation failed");
            return ApiError::unauthorized("Invalid or expired token").into_response();
        }
    };

    // The token subject must still resolve to a live account: deleting a
    // user revokes every token they ever held.
    let user = match state.users.find_user_by_id(claims.sub).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            tracing::debug!(user_id = %claims.sub, "token subject no longer exists");
            return ApiError::unauthorized("User not found").into_response();
        }
        Err(e) => {
            tracing::error!(error = %e, "user lookup failed during authentication");
            return ApiError::Internal.into_response();
        }
    };

    req.extensions_mut().insert(AuthContext {
        user_id: user.id,
        name: user.name,
        email: user.email,
    });
    next.run(req).await
}
