// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! User synchronization actions.
//!
//! Translate identity-provider payloads into document-store writes. Store
//! failures, including uniqueness violations, propagate to the caller.

use crate::db::Database;
use crate::error::AppError;
use crate::models::{NewUser, User, UserUpdate};

/// Insert the record for a newly created identity.
pub async fn create_user(db: &Database, user: &NewUser) -> Result<User, AppError> {
    let created = db.create_user(user).await?;
    tracing::info!(
        external_id = %created.external_id,
        user_id = %created.id,
        "User created"
    );
    Ok(created)
}

/// Overwrite the profile fields of the record matching `external_id`.
pub async fn update_user(
    db: &Database,
    external_id: &str,
    update: &UserUpdate,
) -> Result<Option<User>, AppError> {
    let updated = db.update_user(external_id, update).await?;
    match &updated {
        Some(user) => tracing::info!(external_id, user_id = %user.id, "User updated"),
        None => tracing::warn!(external_id, "User update for unknown external id"),
    }
    Ok(updated)
}

/// Remove the record matching `external_id`.
pub async fn delete_user(db: &Database, external_id: &str) -> Result<Option<User>, AppError> {
    let deleted = db.delete_user(external_id).await?;
    match &deleted {
        Some(user) => tracing::info!(external_id, user_id = %user.id, "User deleted"),
        None => tracing::warn!(external_id, "User delete for unknown external id"),
    }
    Ok(deleted)
}
