//! Pair checking domain models

use crate::features::instrumentation::AccessModes;
use crate::features::lockset::Lockset;
use crate::shared::naming;
use crate::shared::BasicBlock;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Canonical unordered pair of entry point names. The constructor orders
/// the fields, so `new(a, b)` and `new(b, a)` are the same value and hash
/// identically.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntryPointPair {
    first: String,
    second: String,
}

impl EntryPointPair {
    pub fn new(a: &str, b: &str) -> Self {
        if a <= b {
            Self {
                first: a.to_string(),
                second: b.to_string(),
            }
        } else {
            Self {
                first: b.to_string(),
                second: a.to_string(),
            }
        }
    }

    pub fn first(&self) -> &str {
        &self.first
    }

    pub fn second(&self) -> &str {
        &self.second
    }

    pub fn involves(&self, entry_point: &str) -> bool {
        self.first == entry_point || self.second == entry_point
    }

    /// Region name, `check${first}${second}`.
    pub fn region_name(&self) -> String {
        naming::pair_region_name(&self.first, &self.second)
    }
}

impl fmt::Display for EntryPointPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.first, self.second)
    }
}

/// One side of a race assertion: how an entry point touches the location
/// and which locks it consistently holds while doing so.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessClaim {
    pub entry_point: String,
    pub modes: AccessModes,
    pub locks: Lockset,
}

/// Race freedom obligation for one location in one pair region.
///
/// Only emitted when both sides touch the location and at least one side
/// writes it. Read/read conflicts are benign and never asserted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RaceAssertion {
    pub location: String,
    pub first: AccessClaim,
    pub second: AccessClaim,
}

impl RaceAssertion {
    pub fn is_write_write(&self) -> bool {
        self.first.modes.any_write() && self.second.modes.any_write()
    }

    pub fn conflict_kind(&self) -> &'static str {
        if self.is_write_write() {
            "write/write"
        } else {
            "read/write"
        }
    }
}

/// Sequential composition of two instrumented entry point bodies plus a
/// checking block that carries the pair's race assertions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairCheckingRegion {
    /// `check${first}${second}`.
    pub name: String,
    pub pair: EntryPointPair,
    pub blocks: Vec<BasicBlock>,
    pub assertions: Vec<RaceAssertion>,
    /// OR of both sides' imprecision flags.
    pub imprecise: bool,
}
