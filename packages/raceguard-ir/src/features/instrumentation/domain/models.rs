//! Instrumentation domain models

use crate::features::lockset::Lockset;
use crate::shared::naming;
use crate::shared::{AccessMode, BasicBlock};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Marker constant for a watched location, named `WATCHED_ACCESS_{location}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchdogConstant {
    pub name: String,
    pub location: String,
}

impl WatchdogConstant {
    pub fn new(location: &str) -> Self {
        Self {
            name: naming::watchdog_constant_name(location),
            location: location.to_string(),
        }
    }
}

/// Access bookkeeping variable for one (location, entry point, mode)
/// combination, named `WRITTEN_{location}_${entry_point}` or
/// `READ_{location}_${entry_point}`.
///
/// `locks` starts at `Top` and narrows by intersection with the lockset
/// held at each recorded access, so it only ever shrinks. `accessed`
/// latches true on the first access.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessCheckingVariable {
    pub name: String,
    pub location: String,
    pub entry_point: String,
    pub mode: AccessMode,
    pub locks: Lockset,
    pub accessed: bool,
}

impl AccessCheckingVariable {
    pub fn new(location: &str, entry_point: &str, mode: AccessMode) -> Self {
        let name = match mode {
            AccessMode::Write => naming::write_access_variable_name(location, entry_point),
            AccessMode::Read => naming::read_access_variable_name(location, entry_point),
        };
        Self {
            name,
            location: location.to_string(),
            entry_point: entry_point.to_string(),
            mode,
            locks: Lockset::top(),
            accessed: false,
        }
    }

    pub fn record(&mut self, held: &Lockset) {
        self.accessed = true;
        self.locks = self.locks.intersect(held);
    }
}

/// Read/write modes observed for one location within one entry point.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessModes {
    pub read: bool,
    pub write: bool,
}

impl AccessModes {
    pub fn record(&mut self, mode: AccessMode) {
        match mode {
            AccessMode::Read => self.read = true,
            AccessMode::Write => self.write = true,
        }
    }

    pub fn any_write(&self) -> bool {
        self.write
    }
}

impl fmt::Display for AccessModes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.read, self.write) {
            (true, true) => write!(f, "read+write"),
            (false, true) => write!(f, "write"),
            (true, false) => write!(f, "read"),
            (false, false) => write!(f, "none"),
        }
    }
}

/// One racing entry point's body with `LogAccess` markers in front of every
/// load or store of a watched location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstrumentationRegion {
    /// Region name, same as the entry point name.
    pub name: String,
    pub entry_point: String,
    pub blocks: Vec<BasicBlock>,
    /// Watched locations this entry point touches, with the modes observed
    /// anywhere in its flow (helpers included).
    pub touched: BTreeMap<String, AccessModes>,
    /// True when the flow saw opaque or recursive calls; locksets may be
    /// wider than reality.
    pub imprecise: bool,
}

impl InstrumentationRegion {
    pub fn touches(&self, location: &str) -> bool {
        self.touched.contains_key(location)
    }

    /// Watched locations in name order.
    pub fn touched_locations(&self) -> impl Iterator<Item = &str> {
        self.touched.keys().map(String::as_str)
    }
}
