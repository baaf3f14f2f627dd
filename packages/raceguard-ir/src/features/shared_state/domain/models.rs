//! Shared state domain models

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A memory location accessed by more than one entry point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SharedLocation {
    pub name: String,
    /// Entry points that access the location, in stable order.
    pub accessors: BTreeSet<String>,
    pub has_write: bool,
    /// Shared, written, and its global memory lockset is empty: no single
    /// lock consistently guards it across all entry points.
    pub race_candidate: bool,
}

impl SharedLocation {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            accessors: BTreeSet::new(),
            has_write: false,
            race_candidate: false,
        }
    }

    pub fn is_shared(&self) -> bool {
        self.accessors.len() >= 2
    }
}
