// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Database layer (MongoDB, with an in-process store for offline use).

pub mod memory;
pub mod mongo;

pub use mongo::Database;

/// Collection names as constants.
pub mod collections {
    pub const USERS: &str = "users";
    pub const EVENTS: &str = "events";
}
