// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Event model for storage and API.

use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// An event stored in the `events` collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub image_url: String,
    /// RFC 3339, UTC
    pub start_date_time: String,
    /// RFC 3339, UTC
    pub end_date_time: String,
    #[serde(default)]
    pub price: String,
    #[serde(default)]
    pub is_free: bool,
    #[serde(default)]
    pub url: Option<String>,
    /// External (identity provider) id of the creating user
    pub organizer: String,
    pub created_at: String,
}

/// Request body for creating an event.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_schedule"))]
pub struct CreateEventRequest {
    #[validate(length(min = 3, max = 100))]
    pub title: String,
    #[serde(default)]
    #[validate(length(max = 400))]
    pub description: String,
    #[serde(default)]
    #[validate(length(max = 400))]
    pub location: String,
    #[serde(default)]
    pub image_url: String,
    pub start_date_time: DateTime<Utc>,
    pub end_date_time: DateTime<Utc>,
    #[serde(default)]
    pub price: String,
    #[serde(default)]
    pub is_free: bool,
    #[serde(default)]
    #[validate(url)]
    pub url: Option<String>,
}

fn validate_schedule(request: &CreateEventRequest) -> Result<(), ValidationError> {
    if request.end_date_time < request.start_date_time {
        return Err(ValidationError::new("end_before_start"));
    }
    Ok(())
}

/// Event as returned by the API.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct EventResponse {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub description: String,
    pub location: String,
    pub image_url: String,
    pub start_date_time: String,
    pub end_date_time: String,
    pub price: String,
    pub is_free: bool,
    pub url: Option<String>,
    pub organizer: String,
}

impl From<Event> for EventResponse {
    fn from(event: Event) -> Self {
        Self {
            id: event.id.to_hex(),
            title: event.title,
            description: event.description,
            location: event.location,
            image_url: event.image_url,
            start_date_time: event.start_date_time,
            end_date_time: event.end_date_time,
            price: event.price,
            is_free: event.is_free,
            url: event.url,
            organizer: event.organizer,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(start: &str, end: &str) -> CreateEventRequest {
        serde_json::from_value(serde_json::json!({
            "title": "Trail cleanup",
            "startDateTime": start,
            "endDateTime": end,
        }))
        .unwrap()
    }

    #[test]
    fn test_schedule_in_order_is_valid() {
        let req = request("2026-05-01T09:00:00Z", "2026-05-01T12:00:00Z");
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_end_before_start_is_rejected() {
        let req = request("2026-05-01T12:00:00Z", "2026-05-01T09:00:00Z");
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_short_title_and_bad_url_are_rejected() {
        let mut req = request("2026-05-01T09:00:00Z", "2026-05-01T12:00:00Z");
        req.title = "ab".to_string();
        req.url = Some("not a url".to_string());

        let errors = req.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("title"));
        assert!(fields.contains_key("url"));
    }
}
