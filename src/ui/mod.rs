// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Client-side control state.

pub mod delete_confirmation;

pub use delete_confirmation::{ConfirmOutcome, DeleteConfirmation, DialogView};
