// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-process document store used for tests and offline runs.
//!
//! Mirrors the MongoDB unique indexes on `externalId` and `email` so that
//! replayed or conflicting writes fail the same way they do in production.

use crate::error::AppError;
use crate::models::{Event, User, UserUpdate};
use mongodb::bson::oid::ObjectId;
use std::collections::HashMap;
use tokio::sync::RwLock;

#[derive(Default)]
pub struct MemoryStore {
    users: RwLock<HashMap<ObjectId, User>>,
    events: RwLock<HashMap<ObjectId, Event>>,
}

impl MemoryStore {
    pub(crate) async fn insert_user(&self, user: User) -> Result<(), AppError> {
        let mut users = self.users.write().await;

        if let Some(existing) = users
            .values()
            .find(|u| u.external_id == user.external_id || u.email == user.email)
        {
            let key = if existing.external_id == user.external_id {
                "externalId"
            } else {
                "email"
            };
            return Err(AppError::Constraint(format!("duplicate key on {}", key)));
        }

        users.insert(user.id, user);
        Ok(())
    }

    pub(crate) async fn find_user(&self, external_id: &str) -> Option<User> {
        self.users
            .read()
            .await
            .values()
            .find(|u| u.external_id == external_id)
            .cloned()
    }

    pub(crate) async fn update_user(
        &self,
        external_id: &str,
        update: &UserUpdate,
        now: String,
    ) -> Option<User> {
        let mut users = self.users.write().await;
        let user = users.values_mut().find(|u| u.external_id == external_id)?;

        user.first_name = update.first_name.clone();
        user.last_name = update.last_name.clone();
        user.username = Some(update.username.clone());
        user.photo = update.photo.clone();
        user.updated_at = now;

        Some(user.clone())
    }

    pub(crate) async fn remove_user(&self, external_id: &str) -> Option<User> {
        let mut users = self.users.write().await;
        let id = users
            .values()
            .find(|u| u.external_id == external_id)
            .map(|u| u.id)?;
        users.remove(&id)
    }

    pub(crate) async fn insert_event(&self, event: Event) {
        self.events.write().await.insert(event.id, event);
    }

    pub(crate) async fn find_event(&self, id: &ObjectId) -> Option<Event> {
        self.events.read().await.get(id).cloned()
    }

    pub(crate) async fn list_events(&self) -> Vec<Event> {
        let mut events: Vec<Event> = self.events.read().await.values().cloned().collect();
        // RFC 3339 UTC strings sort chronologically
        events.sort_by(|a, b| a.start_date_time.cmp(&b.start_date_time));
        events
    }

    pub(crate) async fn remove_event(&self, id: &ObjectId) -> bool {
        self.events.write().await.remove(id).is_some()
    }
}
