//! Lock and lockset registry
//!
//! Per-unit mutable store for everything the lockset analysis computes:
//! declared locks, the per-entry-point current locksets and the per-location
//! memory locksets. Lock ids are handed out once per name and survive
//! `reset`, so a re-analysis after a context reset sees identical identities.

use crate::features::lockset::domain::{Lock, LockId, Lockset};
use crate::shared::models::Span;
use rustc_hash::FxHashMap;
use tracing::debug;

#[derive(Debug, Default)]
pub struct LocksetRegistry {
    locks: Vec<Lock>,
    by_name: FxHashMap<String, LockId>,
    /// Current lockset per entry point, created lazily at first touch.
    current: FxHashMap<String, Lockset>,
    /// Memory lockset per location; absent means "never accessed" = `Top`.
    memory: FxHashMap<String, Lockset>,
}

impl LocksetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a lock, or return the existing id for a known name.
    pub fn declare_lock(&mut self, name: &str, span: Span) -> LockId {
        if let Some(&id) = self.by_name.get(name) {
            return id;
        }
        let id = self.locks.len() as LockId;
        debug!(lock = name, id, "declaring lock");
        self.locks.push(Lock {
            id,
            name: name.to_string(),
            span,
        });
        self.by_name.insert(name.to_string(), id);
        id
    }

    pub fn lock(&self, id: LockId) -> Option<&Lock> {
        self.locks.get(id as usize)
    }

    pub fn lock_named(&self, name: &str) -> Option<&Lock> {
        self.by_name.get(name).and_then(|&id| self.lock(id))
    }

    pub fn locks(&self) -> &[Lock] {
        &self.locks
    }

    /// Resolve a lockset to sorted lock names. `Top` resolves to every
    /// declared lock.
    pub fn lock_names(&self, set: &Lockset) -> Vec<String> {
        let mut names: Vec<String> = match set.as_finite() {
            Some(ids) => ids
                .iter()
                .filter_map(|&id| self.lock(id).map(|l| l.name.clone()))
                .collect(),
            None => self.locks.iter().map(|l| l.name.clone()).collect(),
        };
        names.sort();
        names
    }

    /// Current lockset of an entry point, created empty on first touch.
    pub fn current_lockset(&mut self, entry_point: &str) -> &Lockset {
        self.current
            .entry(entry_point.to_string())
            .or_insert_with(Lockset::empty)
    }

    pub fn acquire(&mut self, entry_point: &str, lock: LockId) {
        self.current
            .entry(entry_point.to_string())
            .or_insert_with(Lockset::empty)
            .insert(lock);
    }

    /// Remove a lock from the current lockset; `false` means the entry point
    /// did not hold it (the caller records the inconsistency and analysis
    /// continues).
    pub fn release(&mut self, entry_point: &str, lock: LockId) -> bool {
        self.current
            .entry(entry_point.to_string())
            .or_insert_with(Lockset::empty)
            .remove(lock)
    }

    /// Control-flow join: the current lockset becomes the intersection of
    /// the predecessor path locksets.
    pub fn merge_current<'a>(
        &mut self,
        entry_point: &str,
        paths: impl IntoIterator<Item = &'a Lockset>,
    ) {
        let merged = Lockset::intersect_all(paths);
        self.current.insert(entry_point.to_string(), merged);
    }

    /// Narrow a location's memory lockset by the lockset held at an access.
    pub fn record_access(&mut self, location: &str, held: &Lockset) {
        let entry = self
            .memory
            .entry(location.to_string())
            .or_insert(Lockset::Top);
        *entry = entry.intersect(held);
    }

    /// Memory lockset of a location; `Top` when never accessed.
    pub fn memory_lockset(&self, location: &str) -> Lockset {
        self.memory.get(location).cloned().unwrap_or(Lockset::Top)
    }

    pub fn accessed_locations(&self) -> impl Iterator<Item = (&str, &Lockset)> {
        self.memory.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Drop all computed locksets but keep lock identities.
    pub fn reset(&mut self) {
        self.current.clear();
        self.memory.clear();
    }
}
