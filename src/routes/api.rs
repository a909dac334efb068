// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! API routes for signed-in users.

use crate::error::{AppError, Result};
use crate::middleware::Session;
use crate::models::UserResponse;
use crate::AppState;
use axum::{extract::State, routing::get, Extension, Json, Router};
use std::sync::Arc;

/// API routes (session required; enforced by the route guard).
pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/me", get(get_me))
}

/// Get the synchronized record of the signed-in user.
async fn get_me(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
) -> Result<Json<UserResponse>> {
    let user = state
        .db
        .get_user_by_external_id(&session.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {} not synchronized", session.user_id)))?;

    Ok(Json(user.into()))
}
