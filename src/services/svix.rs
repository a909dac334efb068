// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Svix webhook signature verification.
//!
//! The identity provider delivers webhooks through Svix. Each delivery carries
//! three headers:
//! - `svix-id`: unique message id
//! - `svix-timestamp`: seconds since the Unix epoch
//! - `svix-signature`: space-separated list of `v1,<base64 HMAC-SHA256>`
//!
//! The signed content is `"{id}.{timestamp}.{body}"` where `body` is the raw
//! request body exactly as received.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

pub const ID_HEADER: &str = "svix-id";
pub const TIMESTAMP_HEADER: &str = "svix-timestamp";
pub const SIGNATURE_HEADER: &str = "svix-signature";

const SECRET_PREFIX: &str = "whsec_";
const SIGNATURE_VERSION: &str = "v1";
/// Allowed clock skew between the sender and us, in seconds.
const TIMESTAMP_TOLERANCE_SECS: i64 = 5 * 60;

/// Signature-related header values of one delivery.
#[derive(Debug, Clone, Copy)]
pub struct SignatureHeaders<'a> {
    pub id: &'a str,
    pub timestamp: &'a str,
    pub signature: &'a str,
}

/// Reasons a delivery fails verification.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum VerifyError {
    #[error("signing secret is not valid base64")]
    InvalidSecret,

    #[error("timestamp header is not a number")]
    InvalidTimestamp,

    #[error("message timestamp too old")]
    TimestampTooOld,

    #[error("message timestamp too new")]
    TimestampTooNew,

    #[error("no matching signature found")]
    NoMatchingSignature,
}

/// Verifies Svix-signed payloads against a shared secret.
#[derive(Clone)]
pub struct WebhookVerifier {
    key: Vec<u8>,
}

impl std::fmt::Debug for WebhookVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebhookVerifier").finish_non_exhaustive()
    }
}

impl WebhookVerifier {
    /// Build a verifier from a `whsec_`-prefixed (or bare) base64 secret.
    pub fn new(secret: &str) -> Result<Self, VerifyError> {
        let encoded = secret.strip_prefix(SECRET_PREFIX).unwrap_or(secret);
        let key = BASE64
            .decode(encoded)
            .map_err(|_| VerifyError::InvalidSecret)?;
        Ok(Self { key })
    }

    /// Verify a delivery received now.
    pub fn verify(&self, headers: &SignatureHeaders<'_>, payload: &[u8]) -> Result<(), VerifyError> {
        self.verify_at(headers, payload, chrono::Utc::now().timestamp())
    }

    /// Verify a delivery against an explicit clock reading.
    pub fn verify_at(
        &self,
        headers: &SignatureHeaders<'_>,
        payload: &[u8],
        now: i64,
    ) -> Result<(), VerifyError> {
        let timestamp: i64 = headers
            .timestamp
            .trim()
            .parse()
            .map_err(|_| VerifyError::InvalidTimestamp)?;

        if timestamp < now - TIMESTAMP_TOLERANCE_SECS {
            return Err(VerifyError::TimestampTooOld);
        }
        if timestamp > now + TIMESTAMP_TOLERANCE_SECS {
            return Err(VerifyError::TimestampTooNew);
        }

        let expected = self.compute(headers.id, timestamp, payload)?;

        let matched = headers
            .signature
            .split_whitespace()
            .filter_map(|entry| entry.split_once(','))
            .filter(|(version, _)| *version == SIGNATURE_VERSION)
            .any(|(_, candidate)| bool::from(expected.as_bytes().ct_eq(candidate.as_bytes())));

        if matched {
            Ok(())
        } else {
            Err(VerifyError::NoMatchingSignature)
        }
    }

    /// Produce a `v1,<signature>` header value for a payload.
    pub fn sign(&self, msg_id: &str, timestamp: i64, payload: &[u8]) -> Result<String, VerifyError> {
        let signature = self.compute(msg_id, timestamp, payload)?;
        Ok(format!("{},{}", SIGNATURE_VERSION, signature))
    }

    fn compute(&self, msg_id: &str, timestamp: i64, payload: &[u8]) -> Result<String, VerifyError> {
        let mut mac =
            HmacSha256::new_from_slice(&self.key).map_err(|_| VerifyError::InvalidSecret)?;
        mac.update(format!("{}.{}.", msg_id, timestamp).as_bytes());
        mac.update(payload);
        Ok(BASE64.encode(mac.finalize().into_bytes()))
    }
}
