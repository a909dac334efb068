// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Clerk backend API client.
//!
//! Only the calls the user synchronization flow needs are implemented:
//! patching a user's public metadata after their record is created.

use crate::error::AppError;
use serde::{Deserialize, Serialize};

/// Clerk backend API client.
#[derive(Clone)]
pub struct ClerkClient {
    http: reqwest::Client,
    base_url: String,
    secret_key: String,
}

/// Public metadata written back to the identity provider.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PublicMetadata {
    /// Internal id of the synchronized user record
    pub user_id: String,
}

#[derive(Serialize)]
struct UpdateMetadataRequest<'a> {
    public_metadata: &'a PublicMetadata,
}

impl ClerkClient {
    /// Create a client for the given API base URL (e.g. `https://api.clerk.com/v1`).
    pub fn new(base_url: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            secret_key: secret_key.into(),
        }
    }

    /// Merge `metadata` into the user's public metadata.
    ///
    /// PATCH {base}/users/{user_id}/metadata
    pub async fn update_user_public_metadata(
        &self,
        external_id: &str,
        metadata: &PublicMetadata,
    ) -> Result<(), AppError> {
        let url = format!(
            "{}/users/{}/metadata",
            self.base_url,
            urlencoding::encode(external_id)
        );

        let response = self
            .http
            .patch(&url)
            .bearer_auth(&self.secret_key)
            .json(&UpdateMetadataRequest {
                public_metadata: metadata,
            })
            .send()
            .await
            .map_err(|e| AppError::IdentityProvider(format!("Metadata update failed: {}", e)))?;

        self.check_response(response).await?;
        tracing::debug!(external_id, "Clerk public metadata updated");
        Ok(())
    }

    /// Check response status and return error if not successful.
    async fn check_response(&self, response: reqwest::Response) -> Result<(), AppError> {
        if response.status().is_success() {
            return Ok(());
        }

        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        if status.as_u16() == 429 {
            tracing::warn!("Clerk rate limit hit (429)");
        }

        Err(AppError::IdentityProvider(format!(
            "HTTP {}: {}",
            status, body
        )))
    }
}
