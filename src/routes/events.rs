// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Event routes. All of them sit behind the route guard.

use crate::actions::{DeleteEventAction, DeleteEventParams, EVENTS_PATH};
use crate::error::{AppError, Result};
use crate::middleware::Session;
use crate::models::{CreateEventRequest, EventResponse};
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    http::{HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Reports whether a list view came from the page cache.
pub const CACHE_HEADER: HeaderName = HeaderName::from_static("x-cache");

/// Event routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/events", get(list_events).post(create_event))
        .route("/events/{event_id}", get(get_event).delete(delete_event))
}

/// List all events, served from the page cache when possible.
async fn list_events(State(state): State<Arc<AppState>>) -> Result<Response> {
    if let Some(view) = state.page_cache.get(EVENTS_PATH) {
        return Ok(with_cache_header(Json(view), "hit"));
    }

    // Taken before the store read; a delete landing in between wins
    let generation = state.page_cache.generation(EVENTS_PATH);
    let events: Vec<EventResponse> = state
        .db
        .list_events()
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

    let view = serde_json::to_value(&events).map_err(anyhow::Error::from)?;
    if !state
        .page_cache
        .insert_if_generation(EVENTS_PATH, generation, view.clone())
    {
        tracing::debug!("Event list changed while rendering; not cached");
    }

    Ok(with_cache_header(Json(view), "miss"))
}

fn with_cache_header(body: impl IntoResponse, status: &'static str) -> Response {
    let mut response = body.into_response();
    response
        .headers_mut()
        .insert(CACHE_HEADER, HeaderValue::from_static(status));
    response
}

/// Create an event organized by the signed-in user.
async fn create_event(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
    Json(request): Json<CreateEventRequest>,
) -> Result<(StatusCode, Json<EventResponse>)> {
    let event = state
        .event_actions()
        .create_event(&session.user_id, request)
        .await?;
    Ok((StatusCode::CREATED, Json(event.into())))
}

async fn get_event(
    State(state): State<Arc<AppState>>,
    Path(event_id): Path<String>,
) -> Result<Json<EventResponse>> {
    let event = state
        .db
        .get_event(&event_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Event {} not found", event_id)))?;
    Ok(Json(event.into()))
}

#[derive(Deserialize)]
struct DeleteQuery {
    /// View to revalidate after deletion
    path: Option<String>,
}

#[derive(Serialize)]
pub struct DeleteEventResponse {
    pub success: bool,
}

/// Delete action: remove the event and revalidate the caller's view.
async fn delete_event(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
    Path(event_id): Path<String>,
    Query(query): Query<DeleteQuery>,
) -> Result<Json<DeleteEventResponse>> {
    let params = DeleteEventParams {
        event_id: event_id.clone(),
        path: query.path.unwrap_or_else(|| EVENTS_PATH.to_string()),
    };

    tracing::info!(
        event_id = %event_id,
        user_id = %session.user_id,
        "Delete event requested"
    );

    let deleted = state.event_actions().delete_event(params).await?;
    if !deleted {
        return Err(AppError::NotFound(format!("Event {} not found", event_id)));
    }

    Ok(Json(DeleteEventResponse { success: true }))
}
