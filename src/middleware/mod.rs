// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Middleware modules (route guard, sessions, security headers).

pub mod route_guard;
pub mod security;
pub mod session;

pub use route_guard::{require_session, RouteClass, RouteGuard, RouteMatcher};
pub use session::{Session, SessionVerifier};
