// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, HeaderMap, Request, StatusCode},
    routing::patch,
    Json, Router,
};
use evently::cache::PageCache;
use evently::config::Config;
use evently::db::Database;
use evently::middleware::session::SessionClaims;
use evently::middleware::{RouteGuard, SessionVerifier};
use evently::routes::create_router;
use evently::services::{ClerkClient, WebhookVerifier};
use evently::AppState;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

pub const SESSION_PRIVATE_KEY: &str = include_str!("../fixtures/session_test_key.pem");
pub const SESSION_PUBLIC_KEY: &str = include_str!("../fixtures/session_test_key.pub.pem");

/// Build app state around an in-memory database.
#[allow(dead_code)]
pub fn test_state(config: Config) -> Arc<AppState> {
    let clerk = ClerkClient::new(
        config.clerk_api_url.clone(),
        config.clerk_secret_key.clone(),
    );

    Arc::new(AppState {
        config,
        db: Database::new_in_memory(),
        clerk,
        session_verifier: SessionVerifier::from_rsa_pem(SESSION_PUBLIC_KEY)
            .expect("Failed to load test public key"),
        route_guard: RouteGuard::standard().expect("Invalid route patterns"),
        page_cache: Arc::new(PageCache::new()),
    })
}

/// Create a test app with offline dependencies.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app() -> (Router, Arc<AppState>) {
    create_test_app_with_config(Config::test_default())
}

#[allow(dead_code)]
pub fn create_test_app_with_config(config: Config) -> (Router, Arc<AppState>) {
    let state = test_state(config);
    (create_router(state.clone()), state)
}

/// Create a session token for `user_id`, signed with the test key.
#[allow(dead_code)]
pub fn create_session_token(user_id: &str) -> String {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs() as usize;

    let claims = SessionClaims {
        sub: user_id.to_string(),
        sid: Some("sess_test".to_string()),
        exp: now + 600,
        iat: now,
    };

    encode(
        &Header::new(Algorithm::RS256),
        &claims,
        &EncodingKey::from_rsa_pem(SESSION_PRIVATE_KEY.as_bytes()).unwrap(),
    )
    .unwrap()
}

/// Build a webhook request signed with the configured secret.
#[allow(dead_code)]
pub fn signed_webhook_request(config: &Config, msg_id: &str, body: &str) -> Request<Body> {
    let secret = config.webhook_secret.as_deref().expect("secret configured");
    let verifier = WebhookVerifier::new(secret).unwrap();
    let timestamp = chrono::Utc::now().timestamp();
    let signature = verifier
        .sign(msg_id, timestamp, body.as_bytes())
        .unwrap();

    Request::builder()
        .method("POST")
        .uri("/api/webhook/clerk")
        .header(header::CONTENT_TYPE, "application/json")
        .header("svix-id", msg_id)
        .header("svix-timestamp", timestamp.to_string())
        .header("svix-signature", signature)
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Read a response body as JSON.
#[allow(dead_code)]
pub async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// One metadata patch received by the fake identity provider.
#[derive(Debug, Clone)]
#[allow(dead_code)]
pub struct MetadataCall {
    pub user_id: String,
    pub authorization: Option<String>,
    pub body: serde_json::Value,
}

type FakeClerkState = (Arc<Mutex<Vec<MetadataCall>>>, StatusCode);

/// Local HTTP server standing in for the Clerk backend API.
#[allow(dead_code)]
pub struct FakeClerk {
    pub base_url: String,
    pub calls: Arc<Mutex<Vec<MetadataCall>>>,
}

#[allow(dead_code)]
impl FakeClerk {
    /// Start a server that answers metadata patches with `status`.
    pub async fn start(status: StatusCode) -> Self {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let app = Router::new()
            .route("/v1/users/{user_id}/metadata", patch(record_metadata))
            .with_state((calls.clone(), status));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{}/v1", addr),
            calls,
        }
    }

    pub fn calls(&self) -> Vec<MetadataCall> {
        self.calls.lock().unwrap().clone()
    }
}

async fn record_metadata(
    State((calls, status)): State<FakeClerkState>,
    Path(user_id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<serde_json::Value>,
) -> StatusCode {
    let authorization = headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .map(str::to_string);

    calls.lock().unwrap().push(MetadataCall {
        user_id,
        authorization,
        body,
    });
    status
}
