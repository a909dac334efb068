// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.
//!
//! Everything is read once at startup. The webhook signing secret is kept
//! optional so that a missing secret surfaces on the webhook endpoint itself
//! rather than preventing the rest of the application from serving.

use std::env;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port
    pub port: u16,
    /// Frontend URL allowed by CORS
    pub frontend_url: String,
    /// Where unauthenticated browser requests are sent
    pub sign_in_url: String,

    // --- Document store ---
    pub mongodb_uri: String,
    pub mongodb_database: String,

    // --- Identity provider ---
    /// Base URL of the Clerk backend API
    pub clerk_api_url: String,
    /// Clerk secret key (Bearer credential for backend API calls)
    pub clerk_secret_key: String,
    /// PEM-encoded RSA public key used to verify session tokens
    pub clerk_jwt_key: String,
    /// Svix signing secret for user lifecycle webhooks (`whsec_...`)
    pub webhook_secret: Option<String>,
}

impl Config {
    /// Default config for testing only.
    ///
    /// The JWT key is left empty; tests that exercise sessions install
    /// their own key pair.
    pub fn test_default() -> Self {
        Self {
            port: 8080,
            frontend_url: "http://localhost:3000".to_string(),
            sign_in_url: "/sign-in".to_string(),
            mongodb_uri: "mongodb://localhost:27017".to_string(),
            mongodb_database: "evently-test".to_string(),
            clerk_api_url: "http://127.0.0.1:9/v1".to_string(),
            clerk_secret_key: "sk_test_secret".to_string(),
            clerk_jwt_key: String::new(),
            webhook_secret: Some("whsec_dGVzdF93ZWJob29rX3NpZ25pbmdfc2VjcmV0".to_string()),
        }
    }

    /// Load configuration from environment variables.
    ///
    /// A `.env` file in the working directory is honored for local development.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let port = match env::var("PORT") {
            Ok(raw) => raw.parse().map_err(|_| ConfigError::Invalid("PORT", raw))?,
            Err(_) => 8080,
        };

        Ok(Self {
            port,
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            sign_in_url: env::var("SIGN_IN_URL").unwrap_or_else(|_| "/sign-in".to_string()),

            mongodb_uri: required("MONGODB_URI")?,
            mongodb_database: env::var("MONGODB_DATABASE")
                .unwrap_or_else(|_| "evently".to_string()),

            clerk_api_url: env::var("CLERK_API_URL")
                .map(|v| v.trim_end_matches('/').to_string())
                .unwrap_or_else(|_| "https://api.clerk.com/v1".to_string()),
            clerk_secret_key: required("CLERK_SECRET_KEY")?,
            // PEM keys in env files commonly carry literal "\n" sequences
            clerk_jwt_key: required("CLERK_JWT_KEY")?.replace("\\n", "\n"),
            webhook_secret: env::var("WEBHOOK_SECRET")
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty()),
        })
    }
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    env::var(name)
        .map(|v| v.trim().to_string())
        .map_err(|_| ConfigError::Missing(name))
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {0}: {1:?}")]
    Invalid(&'static str, String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_env() {
        // Set required env vars for test
        env::set_var("MONGODB_URI", "mongodb://db.internal:27017");
        env::set_var("CLERK_SECRET_KEY", " sk_test_abc ");
        env::set_var(
            "CLERK_JWT_KEY",
            "-----BEGIN PUBLIC KEY-----\\nMIIB\\n-----END PUBLIC KEY-----",
        );
        env::set_var("WEBHOOK_SECRET", "");
        env::remove_var("PORT");

        let config = Config::from_env().expect("Config should load");

        assert_eq!(config.mongodb_uri, "mongodb://db.internal:27017");
        assert_eq!(config.mongodb_database, "evently");
        assert_eq!(config.clerk_secret_key, "sk_test_abc");
        assert!(config.clerk_jwt_key.contains('\n'));
        assert_eq!(config.webhook_secret, None);
        assert_eq!(config.port, 8080);
    }
}
