// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Event actions invoked from the UI.
//!
//! Mutations revalidate the cached list view they affect.

use crate::cache::PageCache;
use crate::db::Database;
use crate::error::AppError;
use crate::models::{CreateEventRequest, Event};
use crate::time_utils::format_utc_rfc3339;
use mongodb::bson::oid::ObjectId;
use serde::Deserialize;
use std::future::Future;
use std::sync::Arc;
use validator::Validate;

/// Path of the event list view.
pub const EVENTS_PATH: &str = "/events";

/// Arguments of the delete action.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteEventParams {
    pub event_id: String,
    /// Path of the view to revalidate once the event is gone
    pub path: String,
}

/// Anything that can carry out a delete request.
pub trait DeleteEventAction {
    /// Delete the event and revalidate `params.path`.
    ///
    /// Resolves to `true` if an event was removed.
    fn delete_event(
        &self,
        params: DeleteEventParams,
    ) -> impl Future<Output = Result<bool, AppError>> + Send;
}

/// Event actions backed by the document store and the page cache.
#[derive(Clone)]
pub struct EventActions {
    db: Database,
    cache: Arc<PageCache>,
}

impl EventActions {
    pub fn new(db: Database, cache: Arc<PageCache>) -> Self {
        Self { db, cache }
    }

    /// Validate and store a new event organized by `organizer`.
    pub async fn create_event(
        &self,
        organizer: &str,
        request: CreateEventRequest,
    ) -> Result<Event, AppError> {
        request.validate()?;

        let event = Event {
            id: ObjectId::new(),
            title: request.title,
            description: request.description,
            location: request.location,
            image_url: request.image_url,
            start_date_time: format_utc_rfc3339(request.start_date_time),
            end_date_time: format_utc_rfc3339(request.end_date_time),
            price: request.price,
            is_free: request.is_free,
            url: request.url,
            organizer: organizer.to_string(),
            created_at: format_utc_rfc3339(chrono::Utc::now()),
        };

        self.db.create_event(&event).await?;
        self.cache.revalidate_path(EVENTS_PATH);

        tracing::info!(event_id = %event.id, organizer, "Event created");
        Ok(event)
    }
}

impl DeleteEventAction for EventActions {
    async fn delete_event(&self, params: DeleteEventParams) -> Result<bool, AppError> {
        let deleted = self.db.delete_event(&params.event_id).await?;
        self.cache.revalidate_path(&params.path);

        tracing::info!(
            event_id = %params.event_id,
            path = %params.path,
            deleted,
            "Event delete action completed"
        );
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request() -> CreateEventRequest {
        serde_json::from_value(json!({
            "title": "Night hike",
            "startDateTime": "2026-06-01T02:00:00Z",
            "endDateTime": "2026-06-01T05:00:00Z",
            "isFree": true,
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_delete_removes_event_and_revalidates_path() {
        let cache = Arc::new(PageCache::new());
        let actions = EventActions::new(Database::new_in_memory(), cache.clone());
        let event = actions.create_event("user_1", request()).await.unwrap();
        cache.insert_if_generation("/profile", 0, json!(["cached"]));

        let deleted = actions
            .delete_event(DeleteEventParams {
                event_id: event.id.to_hex(),
                path: "/profile".to_string(),
            })
            .await
            .unwrap();

        assert!(deleted);
        assert!(cache.get("/profile").is_none());
        assert_eq!(cache.generation("/profile"), 1);
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_request() {
        let actions = EventActions::new(Database::new_in_memory(), Arc::new(PageCache::new()));
        let mut req = request();
        req.title = String::new();

        let err = actions.create_event("user_1", req).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }
}
