// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Actions - the write paths behind webhooks and UI controls.

pub mod event;
pub mod user;

pub use event::{DeleteEventAction, DeleteEventParams, EventActions, EVENTS_PATH};
