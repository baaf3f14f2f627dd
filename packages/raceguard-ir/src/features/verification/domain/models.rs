//! Verification domain models

use crate::features::instrumentation::AccessModes;
use crate::features::pair_checking::EntryPointPair;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Answer for one race assertion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AssertionVerdict {
    /// Both sides hold a common lock at every access.
    Verified,
    /// No common lock and the analysis was precise.
    Violated,
    /// No common lock, but an opaque or recursive call widened the
    /// locksets. No race proven.
    Unknown,
}

impl AssertionVerdict {
    pub fn is_race(&self) -> bool {
        matches!(self, AssertionVerdict::Violated)
    }
}

impl fmt::Display for AssertionVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            AssertionVerdict::Verified => "verified",
            AssertionVerdict::Violated => "violated",
            AssertionVerdict::Unknown => "unknown",
        };
        write!(f, "{text}")
    }
}

/// One side of a reported conflict, with lock names already resolved so
/// printing needs no registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportedAccess {
    pub entry_point: String,
    pub modes: AccessModes,
    /// Sorted lock names held at every access.
    pub locks: Vec<String>,
}

/// Final answer for one location in one pair region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RaceReport {
    pub pair: EntryPointPair,
    pub location: String,
    pub verdict: AssertionVerdict,
    pub first: ReportedAccess,
    pub second: ReportedAccess,
}

impl RaceReport {
    pub fn conflict_kind(&self) -> &'static str {
        if self.first.modes.any_write() && self.second.modes.any_write() {
            "write/write"
        } else {
            "read/write"
        }
    }

    /// Lock names common to both sides. Non-empty exactly for verified
    /// reports.
    pub fn common_locks(&self) -> Vec<&str> {
        self.first
            .locks
            .iter()
            .filter(|name| self.second.locks.contains(name))
            .map(String::as_str)
            .collect()
    }
}

fn fmt_locks(locks: &[String]) -> String {
    if locks.is_empty() {
        "no locks".to_string()
    } else {
        locks
            .iter()
            .map(|name| format!("`{name}`"))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for RaceReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} race on `{}` between `{}` and `{}`: {}",
            self.conflict_kind(),
            self.location,
            self.first.entry_point,
            self.second.entry_point,
            self.verdict
        )?;
        match self.verdict {
            AssertionVerdict::Verified => {
                let common: Vec<String> =
                    self.common_locks().iter().map(|n| format!("`{n}`")).collect();
                write!(f, " (guarded by {})", common.join(", "))
            }
            AssertionVerdict::Violated => write!(
                f,
                " ({} holds {}, {} holds {})",
                self.first.entry_point,
                fmt_locks(&self.first.locks),
                self.second.entry_point,
                fmt_locks(&self.second.locks)
            ),
            AssertionVerdict::Unknown => write!(f, " (imprecise: unresolved calls)"),
        }
    }
}
