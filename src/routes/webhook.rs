// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Webhook route for identity provider (Clerk) user lifecycle events.
//!
//! Deliveries are signed with Svix. The signature covers the raw request
//! body, so the body is taken as bytes and only parsed after verification.

use crate::actions::user;
use crate::error::{AppError, Result};
use crate::models::{NewUser, UserResponse, UserUpdate};
use crate::services::svix::{self, SignatureHeaders, WebhookVerifier};
use crate::services::PublicMetadata;
use crate::AppState;
use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Webhook routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/webhook/clerk", post(handle_event))
}

/// Signed event envelope.
#[derive(Deserialize, Debug)]
struct WebhookEvent {
    #[serde(rename = "type")]
    event_type: String,
    #[serde(default)]
    data: serde_json::Value,
}

#[derive(Deserialize, Debug)]
struct EmailAddress {
    email_address: String,
}

/// `data` of `user.created` / `user.updated` events.
#[derive(Deserialize, Debug, Default)]
#[serde(default)]
struct UserEventData {
    email_addresses: Vec<EmailAddress>,
    image_url: Option<String>,
    first_name: Option<String>,
    last_name: Option<String>,
    username: Option<String>,
}

/// Webhook response body.
#[derive(Serialize, Debug)]
pub struct WebhookResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserResponse>,
}

impl WebhookResponse {
    fn ok(user: Option<UserResponse>) -> Self {
        Self {
            message: "OK".to_string(),
            user,
        }
    }

    fn message(message: &str) -> Self {
        Self {
            message: message.to_string(),
            user: None,
        }
    }
}

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
}

/// Handle an incoming webhook delivery (POST).
async fn handle_event(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, Json<WebhookResponse>)> {
    let secret = state
        .config
        .webhook_secret
        .as_deref()
        .ok_or_else(|| AppError::Configuration("WEBHOOK_SECRET is not set".to_string()))?;
    let verifier = WebhookVerifier::new(secret)
        .map_err(|e| AppError::Configuration(format!("WEBHOOK_SECRET is invalid: {}", e)))?;

    let (Some(id), Some(timestamp), Some(signature)) = (
        header(&headers, svix::ID_HEADER),
        header(&headers, svix::TIMESTAMP_HEADER),
        header(&headers, svix::SIGNATURE_HEADER),
    ) else {
        tracing::warn!("Webhook rejected: missing svix headers");
        return Err(AppError::BadRequest("Missing svix headers".to_string()));
    };

    let signed = SignatureHeaders {
        id,
        timestamp,
        signature,
    };
    if let Err(e) = verifier.verify(&signed, &body) {
        tracing::warn!(svix_id = id, error = %e, "Error verifying webhook");
        return Err(AppError::BadRequest("Error verifying webhook".to_string()));
    }

    let event: WebhookEvent = serde_json::from_slice(&body).map_err(|e| {
        tracing::warn!(svix_id = id, error = %e, "Failed to parse webhook event");
        AppError::BadRequest("Invalid webhook payload".to_string())
    })?;

    tracing::info!(
        svix_id = id,
        event_type = %event.event_type,
        "Webhook event verified"
    );

    let Some(external_id) = event
        .data
        .get("id")
        .and_then(|v| v.as_str())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
    else {
        tracing::info!(event_type = %event.event_type, "Webhook event has no subject id");
        return Ok((StatusCode::OK, Json(WebhookResponse::message("No event Id"))));
    };

    match event.event_type.as_str() {
        "user.created" => {
            let data = parse_user_data(event.data)?;
            let email = data
                .email_addresses
                .into_iter()
                .next()
                .map(|e| e.email_address)
                .ok_or_else(|| {
                    AppError::BadRequest("user.created event has no email address".to_string())
                })?;
            let photo = data
                .image_url
                .filter(|url| !url.is_empty())
                .ok_or_else(|| {
                    AppError::BadRequest("user.created event has no image url".to_string())
                })?;

            let created = user::create_user(
                &state.db,
                &NewUser {
                    external_id: external_id.clone(),
                    email,
                    username: data.username,
                    first_name: data.first_name.unwrap_or_default(),
                    last_name: data.last_name.unwrap_or_default(),
                    photo,
                },
            )
            .await?;

            // Best effort: the record stays even if the identity provider
            // cannot be told about it.
            let metadata = PublicMetadata {
                user_id: created.id.to_hex(),
            };
            if let Err(e) = state
                .clerk
                .update_user_public_metadata(&external_id, &metadata)
                .await
            {
                tracing::warn!(
                    external_id = %external_id,
                    error = %e,
                    "Failed to patch identity provider metadata"
                );
            }

            Ok((
                StatusCode::OK,
                Json(WebhookResponse::ok(Some(created.into()))),
            ))
        }
        "user.updated" => {
            let data = parse_user_data(event.data)?;
            let update = UserUpdate {
                first_name: data.first_name.unwrap_or_default(),
                last_name: data.last_name.unwrap_or_default(),
                username: data.username.unwrap_or_default(),
                photo: data.image_url.unwrap_or_default(),
            };

            let updated = user::update_user(&state.db, &external_id, &update).await?;
            Ok((
                StatusCode::OK,
                Json(WebhookResponse::ok(updated.map(Into::into))),
            ))
        }
        "user.deleted" => {
            let deleted = user::delete_user(&state.db, &external_id).await?;
            Ok((
                StatusCode::OK,
                Json(WebhookResponse::ok(deleted.map(Into::into))),
            ))
        }
        other => {
            tracing::info!(event_type = other, "Unhandled event type");
            Ok((
                StatusCode::BAD_REQUEST,
                Json(WebhookResponse::message("Unhandled event type")),
            ))
        }
    }
}

fn parse_user_data(data: serde_json::Value) -> Result<UserEventData> {
    serde_json::from_value(data)
        .map_err(|e| AppError::BadRequest(format!("Invalid user payload: {}", e)))
}
