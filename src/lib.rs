// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Evently: event management backend.
//!
//! Users are synchronized from the identity provider through signed
//! webhooks; signed-in users create and manage events behind a route guard.

pub mod actions;
pub mod cache;
pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;
pub mod ui;

use actions::EventActions;
use cache::PageCache;
use config::Config;
use db::Database;
use middleware::{RouteGuard, SessionVerifier};
use services::ClerkClient;
use std::sync::Arc;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: Database,
    pub clerk: ClerkClient,
    pub session_verifier: SessionVerifier,
    pub route_guard: RouteGuard,
    pub page_cache: Arc<PageCache>,
}

impl AppState {
    /// Event actions bound to this state's store and cache.
    pub fn event_actions(&self) -> EventActions {
        EventActions::new(self.db.clone(), self.page_cache.clone())
    }
}
