//! Per-note snapshot of previously seen outgoing links.
//!
//! # Invariants
//! - Keyed by vault-relative path; entries live for the owning service's
//!   lifetime and are never evicted.
//! - Recording always overwrites the previous snapshot, so removed links are
//!   reported as new again if they reappear.

use std::collections::{BTreeSet, HashMap};

/// Path-keyed store of link target sets.
#[derive(Debug, Default)]
pub struct LinkSnapshots {
    by_path: HashMap<String, BTreeSet<String>>,
}

impl LinkSnapshots {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `current` for `path` and returns links absent from the
    /// previous snapshot (all of them when none was stored).
    pub fn record(&mut self, path: &str, current: BTreeSet<String>) -> BTreeSet<String> {
        let previous = self.by_path.insert(path.to_string(), current.clone());
        match previous {
            Some(previous) => current.difference(&previous).cloned().collect(),
            None => current,
        }
    }

    /// Moves the snapshot of `old_path` to `new_path`, if present.
    pub fn rename(&mut self, old_path: &str, new_path: &str) {
        if let Some(links) = self.by_path.remove(old_path) {
            self.by_path.insert(new_path.to_string(), links);
        }
    }

    /// Stored snapshot for `path`.
    pub fn get(&self, path: &str) -> Option<&BTreeSet<String>> {
        self.by_path.get(path)
    }
}
