// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - integrations with external systems.

pub mod clerk;
pub mod svix;

pub use clerk::{ClerkClient, PublicMetadata};
pub use svix::{SignatureHeaders, VerifyError, WebhookVerifier};
