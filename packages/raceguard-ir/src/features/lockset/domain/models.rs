//! Lock and lockset domain models
//!
//! A `Lockset` is the value the whole engine computes with: the set of locks
//! known to be held at a program point, or known to consistently guard a
//! memory location. Current locksets start empty and stay finite; memory
//! locksets start at `Top` ("every lock") and only ever narrow, so the
//! lattice needs the distinguished top element rather than a materialized
//! universe of locks.

use crate::shared::models::{AccessMode, Span};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Stable handle for a declared lock. Ids survive `reset`, so re-analysis
/// after a context reset sees the same identities.
pub type LockId = u32;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lock {
    pub id: LockId,
    pub name: String,
    pub span: Span,
}

/// Set of locks, with `Top` as the "all locks" lattice element.
///
/// Intersection is the only combining operation; both equality and iteration
/// order are insensitive to insertion order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Lockset {
    /// Every lock. Initial value of a memory lockset before any access
    /// narrows it. Identity of intersection.
    Top,
    Held(BTreeSet<LockId>),
}

impl Lockset {
    pub fn empty() -> Self {
        Lockset::Held(BTreeSet::new())
    }

    pub fn top() -> Self {
        Lockset::Top
    }

    pub fn singleton(lock: LockId) -> Self {
        let mut set = BTreeSet::new();
        set.insert(lock);
        Lockset::Held(set)
    }

    pub fn from_locks(locks: impl IntoIterator<Item = LockId>) -> Self {
        Lockset::Held(locks.into_iter().collect())
    }

    /// Add a lock. `Top` already contains every lock.
    pub fn insert(&mut self, lock: LockId) {
        if let Lockset::Held(set) = self {
            set.insert(lock);
        }
    }

    /// Drop a lock; returns whether it was held. `Top` reports every lock
    /// as held; current locksets are always finite.
    pub fn remove(&mut self, lock: LockId) -> bool {
        match self {
            Lockset::Top => true,
            Lockset::Held(set) => set.remove(&lock),
        }
    }

    pub fn contains(&self, lock: LockId) -> bool {
        match self {
            Lockset::Top => true,
            Lockset::Held(set) => set.contains(&lock),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Lockset::Top => false,
            Lockset::Held(set) => set.is_empty(),
        }
    }

    pub fn is_top(&self) -> bool {
        matches!(self, Lockset::Top)
    }

    pub fn as_finite(&self) -> Option<&BTreeSet<LockId>> {
        match self {
            Lockset::Top => None,
            Lockset::Held(set) => Some(set),
        }
    }

    pub fn intersect(&self, other: &Lockset) -> Lockset {
        match (self, other) {
            (Lockset::Top, _) => other.clone(),
            (_, Lockset::Top) => self.clone(),
            (Lockset::Held(a), Lockset::Held(b)) => {
                Lockset::Held(a.intersection(b).copied().collect())
            }
        }
    }

    /// Whether the two locksets share at least one lock.
    pub fn intersects(&self, other: &Lockset) -> bool {
        match (self, other) {
            (Lockset::Top, o) => !o.is_empty(),
            (s, Lockset::Top) => !s.is_empty(),
            (Lockset::Held(a), Lockset::Held(b)) => a.intersection(b).next().is_some(),
        }
    }

    /// Intersection over any number of locksets; the empty family yields
    /// `Top` (the identity). A reachable control-flow join always has at
    /// least one visited predecessor, so joins never see the empty family.
    pub fn intersect_all<'a>(sets: impl IntoIterator<Item = &'a Lockset>) -> Lockset {
        sets.into_iter()
            .fold(Lockset::Top, |acc, set| acc.intersect(set))
    }
}

/// One load or store observed by the flow analysis, with the lockset held
/// at that point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessSite {
    pub location: String,
    pub mode: AccessMode,
    pub held: Lockset,
    /// Procedure the access syntactically lives in (the entry point itself
    /// or a descended helper).
    pub procedure: String,
    pub span: Span,
}
