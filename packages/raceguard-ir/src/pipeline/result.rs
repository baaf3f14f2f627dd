//! Analysis run results

use crate::features::lockset::LocksetDiagnostic;
use crate::features::verification::{AssertionVerdict, RaceReport};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Counters accumulated over one engine run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStats {
    pub units: usize,
    pub entry_points: usize,
    /// Entry points whose flow was computed (all of them unless the run
    /// was restricted to a single entry point).
    pub analysed_entry_points: usize,
    pub shared_locations: usize,
    pub race_candidates: usize,
    pub racing_entry_points: usize,
    pub inlined_entry_points: usize,
    /// Unordered pairs of distinct racing entry points.
    pub pairs_considered: usize,
    /// Pairs that passed the policy and shared a location.
    pub pairs_built: usize,
    pub pairs_skipped: usize,
    pub verified: usize,
    pub violated: usize,
    pub unknown: usize,
}

impl RunStats {
    pub fn record_verdict(&mut self, verdict: AssertionVerdict) {
        match verdict {
            AssertionVerdict::Verified => self.verified += 1,
            AssertionVerdict::Violated => self.violated += 1,
            AssertionVerdict::Unknown => self.unknown += 1,
        }
    }
}

/// Everything one engine run produced.
#[derive(Debug, Clone, Default)]
pub struct AnalysisRun {
    /// Sorted by pair, then location. When `skip_race_free_pairs` is set,
    /// verified reports are filtered out; the stats still count them.
    pub reports: Vec<RaceReport>,
    pub diagnostics: Vec<LocksetDiagnostic>,
    pub stats: RunStats,
}

impl AnalysisRun {
    pub fn has_races(&self) -> bool {
        self.stats.violated > 0
    }

    pub fn races(&self) -> impl Iterator<Item = &RaceReport> {
        self.reports.iter().filter(|r| r.verdict.is_race())
    }

    /// Process-level outcome. Unknown-only runs count as success since no
    /// race was proven.
    pub fn outcome(&self) -> Outcome {
        if self.has_races() {
            Outcome::RacesFound
        } else {
            Outcome::Success
        }
    }
}

/// External contract of the tool, mapped straight to exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Success,
    RacesFound,
    FatalError,
}

impl Outcome {
    pub fn exit_code(self) -> i32 {
        match self {
            Outcome::Success => 0,
            Outcome::RacesFound => 1,
            Outcome::FatalError => 2,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Outcome::Success => "success",
            Outcome::RacesFound => "races found",
            Outcome::FatalError => "fatal error",
        };
        write!(f, "{text}")
    }
}
