// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Route guard: decides which paths require an established session.
//!
//! Patterns use the path-to-regexp subset understood by the identity
//! provider's route matcher:
//! - literal text matches itself
//! - `(...)` is a raw regular expression group, e.g. `/events(.*)`
//! - `:name` matches one path segment
//!
//! Webhook endpoints are authenticated by signature, never by session, and
//! must stay out of the protected set.

use crate::error::AppError;
use crate::middleware::session::{session_token, Session};
use crate::AppState;
use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use regex::Regex;
use std::sync::Arc;

/// Paths that require a session.
pub const PROTECTED_ROUTES: &[&str] = &["/events(.*)", "/api/me(.*)"];

/// Paths never subject to session checks (take precedence over protected).
pub const IGNORED_ROUTES: &[&str] = &["/api/webhook(.*)", "/api/uploadthing(.*)"];

/// A compiled set of route patterns.
#[derive(Debug, Clone)]
pub struct RouteMatcher {
    patterns: Vec<Regex>,
}

impl RouteMatcher {
    pub fn new<I, S>(patterns: I) -> Result<Self, regex::Error>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = patterns
            .into_iter()
            .map(|p| Regex::new(&to_regex(p.as_ref())))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { patterns })
    }

    /// Whether any pattern matches the whole path.
    pub fn matches(&self, path: &str) -> bool {
        self.patterns.iter().any(|re| re.is_match(path))
    }
}

/// Translate a route pattern into an anchored regular expression.
fn to_regex(pattern: &str) -> String {
    let mut out = String::from("^");
    let mut chars = pattern.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '(' => {
                let mut depth = 1;
                out.push('(');
                for inner in chars.by_ref() {
                    match inner {
                        '(' => depth += 1,
                        ')' => depth -= 1,
                        _ => {}
                    }
                    out.push(inner);
                    if depth == 0 {
                        break;
                    }
                }
            }
            ':' if chars.peek().is_some_and(|n| n.is_ascii_alphabetic() || *n == '_') => {
                while chars
                    .peek()
                    .is_some_and(|n| n.is_ascii_alphanumeric() || *n == '_')
                {
                    chars.next();
                }
                out.push_str("([^/]+)");
            }
            other => out.push_str(&regex::escape(other.encode_utf8(&mut [0; 4]))),
        }
    }

    out.push('$');
    out
}

/// Classification of a request path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteClass {
    /// Requires a session
    Protected,
    /// Reachable without a session
    Public,
}

/// Fixed protected/ignored pattern sets, built at startup.
#[derive(Debug, Clone)]
pub struct RouteGuard {
    protected: RouteMatcher,
    ignored: RouteMatcher,
}

impl RouteGuard {
    pub fn new(protected: &[&str], ignored: &[&str]) -> Result<Self, regex::Error> {
        Ok(Self {
            protected: RouteMatcher::new(protected)?,
            ignored: RouteMatcher::new(ignored)?,
        })
    }

    /// The application's route rules.
    pub fn standard() -> Result<Self, regex::Error> {
        Self::new(PROTECTED_ROUTES, IGNORED_ROUTES)
    }

    pub fn classify(&self, path: &str) -> RouteClass {
        if self.ignored.matches(path) {
            return RouteClass::Public;
        }
        if self.protected.matches(path) {
            RouteClass::Protected
        } else {
            RouteClass::Public
        }
    }
}

/// Middleware enforcing the route guard.
///
/// Any valid session is attached to the request. Protected paths without one
/// are denied before the handler runs: browser navigations are redirected to
/// sign-in, everything else gets 401.
pub async fn require_session(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    let session: Option<Session> = session_token(&jar, request.headers())
        .and_then(|token| state.session_verifier.verify(&token).ok());

    let path = request.uri().path().to_string();
    let class = state.route_guard.classify(&path);

    match session {
        Some(session) => {
            request.extensions_mut().insert(session);
        }
        None if class == RouteClass::Protected => {
            tracing::info!(path = %path, "Denied unauthenticated request to protected route");
            return deny(&state, &request);
        }
        None => {}
    }

    next.run(request).await
}

fn deny(state: &AppState, request: &Request) -> Response {
    let path = request.uri().path();
    let wants_html = request
        .headers()
        .get(header::ACCEPT)
        .and_then(|h| h.to_str().ok())
        .is_some_and(|accept| accept.contains("text/html"));

    if path.starts_with("/api/") || !wants_html {
        return AppError::Unauthorized.into_response();
    }

    let return_to = request
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or(path);
    let location = format!(
        "{}?redirect_url={}",
        state.config.sign_in_url,
        urlencoding::encode(return_to)
    );
    Redirect::temporary(&location).into_response()
}
