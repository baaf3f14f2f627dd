//! Shared state analysis
//!
//! Classifies memory locations across entry points. A location is *shared*
//! when at least two distinct entry points access it, and a *race candidate*
//! when it is shared, written at least once, and no lock is held at every
//! access. An entry point is *racing* when it touches at least one candidate.
//!
//! ## Algorithm
//!
//! 1. Feed every access site into the registry's memory locksets. The
//!    per-location lockset starts at Top and narrows by intersection, so
//!    the result is independent of the order entry points are analysed in.
//! 2. Group accesses by location, tracking accessor sets and write flags.
//! 3. Classify candidates against the stabilized memory locksets and
//!    derive the racing entry point set.
//!
//! Analyzer-owned variables (locks, locksets, access bookkeeping) are
//! excluded up front; instrumenting them would make later passes observe
//! their own writes.

use crate::features::lockset::{FlowOutcome, LocksetRegistry};
use crate::features::shared_state::domain::SharedLocation;
use crate::shared::IrIndex;
use rustc_hash::FxHashMap;
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// Outcome of the shared state analysis for one translation unit.
#[derive(Debug, Clone, Default)]
pub struct SharedStateReport {
    locations: BTreeMap<String, SharedLocation>,
    racing: BTreeSet<String>,
}

impl SharedStateReport {
    pub fn location(&self, name: &str) -> Option<&SharedLocation> {
        self.locations.get(name)
    }

    /// All analysed locations in name order.
    pub fn locations(&self) -> impl Iterator<Item = &SharedLocation> {
        self.locations.values()
    }

    pub fn is_shared(&self, name: &str) -> bool {
        self.locations.get(name).map_or(false, |l| l.is_shared())
    }

    pub fn is_race_candidate(&self, name: &str) -> bool {
        self.locations.get(name).map_or(false, |l| l.race_candidate)
    }

    pub fn race_candidates(&self) -> impl Iterator<Item = &SharedLocation> {
        self.locations.values().filter(|l| l.race_candidate)
    }

    /// Entry points that access at least one race candidate.
    pub fn racing_entry_points(&self) -> impl Iterator<Item = &str> {
        self.racing.iter().map(String::as_str)
    }

    pub fn is_racing(&self, entry_point: &str) -> bool {
        self.racing.contains(entry_point)
    }

    pub fn shared_count(&self) -> usize {
        self.locations.values().filter(|l| l.is_shared()).count()
    }

    pub fn candidate_count(&self) -> usize {
        self.locations.values().filter(|l| l.race_candidate).count()
    }
}

/// Cross-entry-point shared state analyser.
pub struct SharedStateAnalyser;

impl SharedStateAnalyser {
    pub fn new() -> Self {
        Self
    }

    /// Analyses the access sites of every entry point flow and narrows the
    /// registry's memory locksets as a side effect.
    pub fn analyse<'a>(
        &self,
        flows: impl IntoIterator<Item = &'a FlowOutcome>,
        index: &IrIndex,
        registry: &mut LocksetRegistry,
    ) -> SharedStateReport {
        let mut locations: BTreeMap<String, SharedLocation> = BTreeMap::new();
        let mut touched: FxHashMap<String, BTreeSet<String>> = FxHashMap::default();

        // Step 1: feed accesses into the registry and group them by location.
        for flow in flows {
            for access in &flow.accesses {
                if index.is_analyzer_owned(&access.location) {
                    continue;
                }
                registry.record_access(&access.location, &access.held);

                let entry = locations
                    .entry(access.location.clone())
                    .or_insert_with(|| SharedLocation::new(&access.location));
                entry.accessors.insert(flow.entry_point.clone());
                entry.has_write |= access.mode.is_write();

                touched
                    .entry(flow.entry_point.clone())
                    .or_default()
                    .insert(access.location.clone());
            }
        }

        // Step 2: classify candidates against the stabilized memory locksets.
        for location in locations.values_mut() {
            location.race_candidate = location.is_shared()
                && location.has_write
                && registry.memory_lockset(&location.name).is_empty();
        }

        // Step 3: an entry point races when it touches any candidate.
        let mut racing = BTreeSet::new();
        for (entry_point, names) in &touched {
            let races = names
                .iter()
                .any(|name| locations.get(name).map_or(false, |l| l.race_candidate));
            if races {
                racing.insert(entry_point.clone());
            }
        }

        let report = SharedStateReport { locations, racing };
        debug!(
            shared = report.shared_count(),
            candidates = report.candidate_count(),
            racing = report.racing.len(),
            "shared state analysis complete"
        );
        report
    }
}

impl Default for SharedStateAnalyser {
    fn default() -> Self {
        Self::new()
    }
}
