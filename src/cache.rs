// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Path-keyed cache of rendered list views.
//!
//! Views are cached under the request path that produced them. Mutating
//! actions call [`PageCache::revalidate_path`] with the path of the view
//! that displayed the mutated data, so the next request re-reads the store.

use dashmap::DashMap;
use serde_json::Value;

#[derive(Default)]
struct Slot {
    /// Bumped on every revalidation
    generation: u64,
    view: Option<Value>,
}

/// Shared cache of rendered views, keyed by normalized path.
///
/// A view and its path's generation live in one entry, so revalidation and
/// a conditional insert never interleave.
#[derive(Default)]
pub struct PageCache {
    slots: DashMap<String, Slot>,
}

impl PageCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached view for `path`, if still valid.
    pub fn get(&self, path: &str) -> Option<Value> {
        self.slots
            .get(&normalize(path))
            .and_then(|slot| slot.view.clone())
    }

    /// Store `view` for `path` unless the path was revalidated after
    /// `generation` was read. Returns whether the view was stored.
    ///
    /// Readers take the generation before reading the store, so a view built
    /// from data that a concurrent mutation has since invalidated is dropped.
    pub fn insert_if_generation(&self, path: &str, generation: u64, view: Value) -> bool {
        let mut slot = self.slots.entry(normalize(path)).or_default();
        if slot.generation != generation {
            return false;
        }
        slot.view = Some(view);
        true
    }

    /// Drop the cached view for `path` so it is rebuilt on next access.
    pub fn revalidate_path(&self, path: &str) {
        let key = normalize(path);
        let had_entry = {
            let mut slot = self.slots.entry(key.clone()).or_default();
            slot.generation += 1;
            slot.view.take().is_some()
        };

        tracing::debug!(path = %key, had_entry, "Path revalidated");
    }

    /// Number of times `path` has been revalidated.
    pub fn generation(&self, path: &str) -> u64 {
        self.slots
            .get(&normalize(path))
            .map(|slot| slot.generation)
            .unwrap_or(0)
    }
}

fn normalize(path: &str) -> String {
    let path = path.split(['?', '#']).next().unwrap_or("");
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{}", trimmed)
    }
}
