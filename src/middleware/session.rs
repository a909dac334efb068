// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Identity provider session tokens.
//!
//! Clerk issues short-lived RS256 JWTs, delivered in the `__session` cookie
//! for same-origin browser requests or as a Bearer token otherwise. They are
//! verified locally against the instance's PEM public key.

use crate::error::AppError;
use axum::http::{header, HeaderMap};
use axum_extra::extract::cookie::CookieJar;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

/// Cookie carrying the session token.
pub const SESSION_COOKIE: &str = "__session";

/// Session token claims.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SessionClaims {
    /// Subject (identity provider user id)
    pub sub: String,
    /// Session id
    #[serde(default)]
    pub sid: Option<String>,
    /// Expiration time (Unix timestamp)
    pub exp: usize,
    /// Issued at (Unix timestamp)
    pub iat: usize,
}

/// Established session, inserted into request extensions by the route guard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Identity provider user id
    pub user_id: String,
    pub session_id: Option<String>,
}

/// Verifies session tokens.
#[derive(Clone)]
pub struct SessionVerifier {
    key: Option<DecodingKey>,
    validation: Validation,
}

impl SessionVerifier {
    /// Build a verifier from a PEM-encoded RSA public key.
    pub fn from_rsa_pem(pem: &str) -> Result<Self, AppError> {
        let key = DecodingKey::from_rsa_pem(pem.as_bytes())
            .map_err(|e| AppError::Configuration(format!("Invalid session public key: {}", e)))?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.validate_nbf = true;

        Ok(Self {
            key: Some(key),
            validation,
        })
    }

    /// A verifier that rejects every token (no key configured).
    pub fn disabled() -> Self {
        Self {
            key: None,
            validation: Validation::new(Algorithm::RS256),
        }
    }

    /// Verify a token and return the session it represents.
    pub fn verify(&self, token: &str) -> Result<Session, AppError> {
        let key = self.key.as_ref().ok_or(AppError::Unauthorized)?;

        let token_data = decode::<SessionClaims>(token, key, &self.validation).map_err(|e| {
            tracing::debug!(error = %e, "Session token rejected");
            AppError::Unauthorized
        })?;

        if token_data.claims.sub.is_empty() {
            return Err(AppError::Unauthorized);
        }

        Ok(Session {
            user_id: token_data.claims.sub,
            session_id: token_data.claims.sid,
        })
    }
}

/// Extract the raw session token: cookie first, then Bearer header.
pub fn session_token(jar: &CookieJar, headers: &HeaderMap) -> Option<String> {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        return Some(cookie.value().to_string());
    }

    headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use std::time::{SystemTime, UNIX_EPOCH};

    const PRIVATE_KEY: &str = include_str!("../../tests/fixtures/session_test_key.pem");
    const PUBLIC_KEY: &str = include_str!("../../tests/fixtures/session_test_key.pub.pem");

    fn token(sub: &str, exp_offset: i64) -> String {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs() as i64;
        let claims = SessionClaims {
            sub: sub.to_string(),
            sid: Some("sess_1".to_string()),
            exp: (now + exp_offset) as usize,
            iat: now as usize,
        };
        encode(
            &Header::new(Algorithm::RS256),
            &claims,
            &EncodingKey::from_rsa_pem(PRIVATE_KEY.as_bytes()).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn test_valid_token_yields_session() {
        let verifier = SessionVerifier::from_rsa_pem(PUBLIC_KEY).unwrap();
        let session = verifier.verify(&token("user_abc", 600)).unwrap();

        assert_eq!(session.user_id, "user_abc");
        assert_eq!(session.session_id.as_deref(), Some("sess_1"));
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let verifier = SessionVerifier::from_rsa_pem(PUBLIC_KEY).unwrap();
        assert!(verifier.verify(&token("user_abc", -3600)).is_err());
    }

    #[test]
    fn test_garbage_and_disabled() {
        let verifier = SessionVerifier::from_rsa_pem(PUBLIC_KEY).unwrap();
        assert!(verifier.verify("not.a.jwt").is_err());

        let disabled = SessionVerifier::disabled();
        assert!(disabled.verify(&token("user_abc", 600)).is_err());
    }

    #[test]
    fn test_invalid_pem_is_configuration_error() {
        let err = SessionVerifier::from_rsa_pem("nope").err().unwrap();
        assert!(matches!(err, AppError::Configuration(_)));
    }

    #[test]
    fn test_token_extraction_prefers_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Bearer from-header"),
        );

        let empty = CookieJar::new();
        assert_eq!(
            session_token(&empty, &headers).as_deref(),
            Some("from-header")
        );

        let jar = CookieJar::new().add(axum_extra::extract::cookie::Cookie::new(
            SESSION_COOKIE,
            "from-cookie",
        ));
        assert_eq!(session_token(&jar, &headers).as_deref(), Some("from-cookie"));

        assert_eq!(session_token(&empty, &HeaderMap::new()), None);
    }
}
