// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! MongoDB client wrapper with typed operations.
//!
//! Provides high-level operations for:
//! - Users (records synchronized from the identity provider)
//! - Events (created and managed by signed-in users)
//!
//! Uniqueness of `externalId` and `email` is enforced by the store through
//! unique indexes, not by application-level locking.

use crate::db::collections;
use crate::db::memory::MemoryStore;
use crate::error::AppError;
use crate::models::{Event, NewUser, User, UserUpdate};
use crate::time_utils::format_utc_rfc3339;
use futures_util::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId};
use mongodb::error::{ErrorKind, WriteFailure};
use mongodb::options::{FindOneAndUpdateOptions, FindOptions, IndexOptions, ReturnDocument};
use mongodb::{Client, Collection, IndexModel};
use std::sync::Arc;

/// MongoDB duplicate key error code.
const DUPLICATE_KEY: i32 = 11000;

/// Document database handle.
#[derive(Clone)]
pub struct Database {
    backend: Backend,
}

#[derive(Clone)]
enum Backend {
    Mongo(mongodb::Database),
    Memory(Arc<MemoryStore>),
}

impl Database {
    /// Connect to MongoDB and make sure the unique indexes exist.
    pub async fn connect(uri: &str, database: &str) -> Result<Self, AppError> {
        let client = Client::with_uri_str(uri)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to MongoDB: {}", e)))?;

        let db = client.database(database);
        let this = Self {
            backend: Backend::Mongo(db),
        };
        this.ensure_indexes().await?;

        tracing::info!(database, "Connected to MongoDB");
        Ok(this)
    }

    /// Create an in-process database (tests and offline mode).
    pub fn new_in_memory() -> Self {
        Self {
            backend: Backend::Memory(Arc::new(MemoryStore::default())),
        }
    }

    async fn ensure_indexes(&self) -> Result<(), AppError> {
        let Backend::Mongo(db) = &self.backend else {
            return Ok(());
        };

        let unique = || IndexOptions::builder().unique(true).build();
        let indexes = vec![
            IndexModel::builder()
                .keys(doc! { "externalId": 1 })
                .options(unique())
                .build(),
            IndexModel::builder()
                .keys(doc! { "email": 1 })
                .options(unique())
                .build(),
        ];

        db.collection::<User>(collections::USERS)
            .create_indexes(indexes, None)
            .await
            .map_err(|e| AppError::Database(format!("Failed to create user indexes: {}", e)))?;

        tracing::debug!("User indexes ensured");
        Ok(())
    }

    fn users(db: &mongodb::Database) -> Collection<User> {
        db.collection(collections::USERS)
    }

    fn events(db: &mongodb::Database) -> Collection<Event> {
        db.collection(collections::EVENTS)
    }

    // ─── User Operations ─────────────────────────────────────────

    /// Insert a new user record.
    pub async fn create_user(&self, new_user: &NewUser) -> Result<User, AppError> {
        let now = format_utc_rfc3339(chrono::Utc::now());
        let user = User {
            id: ObjectId::new(),
            external_id: new_user.external_id.clone(),
            email: new_user.email.clone(),
            username: new_user.username.clone(),
            first_name: new_user.first_name.clone(),
            last_name: new_user.last_name.clone(),
            photo: new_user.photo.clone(),
            created_at: now.clone(),
            updated_at: now,
        };

        match &self.backend {
            Backend::Mongo(db) => {
                Self::users(db)
                    .insert_one(&user, None)
                    .await
                    .map_err(map_write_error)?;
            }
            Backend::Memory(store) => store.insert_user(user.clone()).await?,
        }

        Ok(user)
    }

    /// Get a user by their identity provider id.
    pub async fn get_user_by_external_id(
        &self,
        external_id: &str,
    ) -> Result<Option<User>, AppError> {
        match &self.backend {
            Backend::Mongo(db) => Self::users(db)
                .find_one(doc! { "externalId": external_id }, None)
                .await
                .map_err(|e| AppError::Database(e.to_string())),
            Backend::Memory(store) => Ok(store.find_user(external_id).await),
        }
    }

    /// Overwrite the mutable profile fields of a user.
    ///
    /// Returns the updated record, or `None` if no user has that external id.
    pub async fn update_user(
        &self,
        external_id: &str,
        update: &UserUpdate,
    ) -> Result<Option<User>, AppError> {
        let now = format_utc_rfc3339(chrono::Utc::now());

        match &self.backend {
            Backend::Mongo(db) => {
                let options = FindOneAndUpdateOptions::builder()
                    .return_document(ReturnDocument::After)
                    .build();

                Self::users(db)
                    .find_one_and_update(
                        doc! { "externalId": external_id },
                        doc! {
                            "$set": {
                                "firstName": update.first_name.as_str(),
                                "lastName": update.last_name.as_str(),
                                "username": update.username.as_str(),
                                "photo": update.photo.as_str(),
                                "updatedAt": now,
                            }
                        },
                        options,
                    )
                    .await
                    .map_err(map_write_error)
            }
            Backend::Memory(store) => Ok(store.update_user(external_id, update, now).await),
        }
    }

    /// Delete a user by external id, returning the removed record.
    pub async fn delete_user(&self, external_id: &str) -> Result<Option<User>, AppError> {
        match &self.backend {
            Backend::Mongo(db) => Self::users(db)
                .find_one_and_delete(doc! { "externalId": external_id }, None)
                .await
                .map_err(|e| AppError::Database(e.to_string())),
            Backend::Memory(store) => Ok(store.remove_user(external_id).await),
        }
    }

    // ─── Event Operations ────────────────────────────────────────

    /// Insert a new event.
    pub async fn create_event(&self, event: &Event) -> Result<(), AppError> {
        match &self.backend {
            Backend::Mongo(db) => {
                Self::events(db)
                    .insert_one(event, None)
                    .await
                    .map_err(map_write_error)?;
            }
            Backend::Memory(store) => store.insert_event(event.clone()).await,
        }
        Ok(())
    }

    /// Get an event by its id (hex ObjectId).
    pub async fn get_event(&self, event_id: &str) -> Result<Option<Event>, AppError> {
        let id = parse_object_id(event_id)?;

        match &self.backend {
            Backend::Mongo(db) => Self::events(db)
                .find_one(doc! { "_id": id }, None)
                .await
                .map_err(|e| AppError::Database(e.to_string())),
            Backend::Memory(store) => Ok(store.find_event(&id).await),
        }
    }

    /// List all events, soonest first.
    pub async fn list_events(&self) -> Result<Vec<Event>, AppError> {
        match &self.backend {
            Backend::Mongo(db) => {
                let options = FindOptions::builder()
                    .sort(doc! { "startDateTime": 1 })
                    .build();

                Self::events(db)
                    .find(doc! {}, options)
                    .await
                    .map_err(|e| AppError::Database(e.to_string()))?
                    .try_collect()
                    .await
                    .map_err(|e| AppError::Database(e.to_string()))
            }
            Backend::Memory(store) => Ok(store.list_events().await),
        }
    }

    /// Delete an event. Returns `true` if a document was removed.
    pub async fn delete_event(&self, event_id: &str) -> Result<bool, AppError> {
        let id = parse_object_id(event_id)?;

        match &self.backend {
            Backend::Mongo(db) => {
                let result = Self::events(db)
                    .delete_one(doc! { "_id": id }, None)
                    .await
                    .map_err(|e| AppError::Database(e.to_string()))?;
                Ok(result.deleted_count > 0)
            }
            Backend::Memory(store) => Ok(store.remove_event(&id).await),
        }
    }
}

fn parse_object_id(raw: &str) -> Result<ObjectId, AppError> {
    ObjectId::parse_str(raw).map_err(|_| AppError::BadRequest(format!("Invalid id: {}", raw)))
}

/// Map a write error, separating uniqueness violations from other failures.
fn map_write_error(e: mongodb::error::Error) -> AppError {
    if let ErrorKind::Write(WriteFailure::WriteError(write_error)) = e.kind.as_ref() {
        if write_error.code == DUPLICATE_KEY {
            return AppError::Constraint(write_error.message.clone());
        }
    }
    AppError::Database(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(external_id: &str, email: &str) -> NewUser {
        NewUser {
            external_id: external_id.to_string(),
            email: email.to_string(),
            username: Some("ada".to_string()),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            photo: "https://img.example.com/ada.png".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_and_lookup_user() {
        let db = Database::new_in_memory();
        let created = db
            .create_user(&new_user("user_1", "ada@example.com"))
            .await
            .unwrap();

        let found = db.get_user_by_external_id("user_1").await.unwrap();
        assert_eq!(found, Some(created));
        assert!(db.get_user_by_external_id("user_2").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_external_id_is_constraint_violation() {
        let db = Database::new_in_memory();
        db.create_user(&new_user("user_1", "ada@example.com"))
            .await
            .unwrap();

        let err = db
            .create_user(&new_user("user_1", "other@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Constraint(_)));
    }

    #[tokio::test]
    async fn test_duplicate_email_is_constraint_violation() {
        let db = Database::new_in_memory();
        db.create_user(&new_user("user_1", "ada@example.com"))
            .await
            .unwrap();

        let err = db
            .create_user(&new_user("user_2", "ada@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Constraint(_)));
    }

    #[tokio::test]
    async fn test_update_missing_user_returns_none() {
        let db = Database::new_in_memory();
        let update = UserUpdate {
            first_name: String::new(),
            last_name: String::new(),
            username: String::new(),
            photo: String::new(),
        };
        assert!(db.update_user("nobody", &update).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_event_invalid_id_is_bad_request() {
        let db = Database::new_in_memory();
        let err = db.get_event("not-an-object-id").await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }
}
