//! Recursion guard for nested schema expansion.
//!
//! The guard holds the content hash of every schema whose declaration is
//! currently being rendered. It is owned by one top-level render call and
//! passed down explicitly; nothing about it is global.

use std::collections::BTreeMap;
use std::ops::{Deref, DerefMut};

use sha2::{Digest, Sha256};

use crate::spec::Schema;

/// In-progress expansions keyed by schema content hash.
#[derive(Debug, Default)]
pub struct RecursionGuard {
    active: BTreeMap<String, String>,
}

/// Stable identity of a schema's content.
///
/// Every map in [`Schema`] is a `BTreeMap`, so the debug rendering is
/// deterministic for equal schemas.
pub fn content_hash(schema: &Schema) -> String {
    let mut hasher = Sha256::new();
    hasher.update(format!("{schema:?}").as_bytes());
    hex::encode(hasher.finalize())
}

impl RecursionGuard {
    /// A guard with nothing in progress.
    pub fn new() -> Self {
        Self::default()
    }

    /// Name of the declaration being expanded for this hash, if any.
    pub fn in_progress(&self, hash: &str) -> Option<&str> {
        self.active.get(hash).map(String::as_str)
    }

    /// Mark `hash` as being expanded under `name` until the returned scope drops.
    ///
    /// Entering a hash that is already active leaves the guard unchanged;
    /// callers check [`RecursionGuard::in_progress`] first.
    pub fn enter(&mut self, hash: String, name: impl Into<String>) -> Expansion<'_> {
        let owned = !self.active.contains_key(&hash);
        if owned {
            self.active.insert(hash.clone(), name.into());
        }
        Expansion {
            guard: self,
            hash,
            owned,
        }
    }

    /// True once every scope has been dropped.
    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    /// Number of expansions in progress.
    pub fn len(&self) -> usize {
        self.active.len()
    }
}

/// Scope of one expansion. Dropping it removes the hash it inserted.
#[derive(Debug)]
pub struct Expansion<'g> {
    guard: &'g mut RecursionGuard,
    hash: String,
    owned: bool,
}

impl Deref for Expansion<'_> {
    type Target = RecursionGuard;

    fn deref(&self) -> &RecursionGuard {
        self.guard
    }
}

impl DerefMut for Expansion<'_> {
    fn deref_mut(&mut self) -> &mut RecursionGuard {
        self.guard
    }
}

impl Drop for Expansion<'_> {
    fn drop(&mut self) {
        if self.owned {
            self.guard.active.remove(&self.hash);
        }
    }
}
