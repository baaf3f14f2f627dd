//! Entry point domain models

use crate::shared::models::Span;
use serde::{Deserialize, Serialize};
use std::fmt;

/// What an entry point does to the device lifecycle. Classified from the
/// registration calls reachable in its call tree; a role-aware concurrency
/// policy can exclude init/exit routines from pairing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeviceRole {
    /// Transitively performs a device-registration call.
    Registers,
    /// Transitively performs a device-unregistration call.
    Unregisters,
    Ordinary,
}

impl fmt::Display for DeviceRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceRole::Registers => write!(f, "registers"),
            DeviceRole::Unregisters => write!(f, "unregisters"),
            DeviceRole::Ordinary => write!(f, "ordinary"),
        }
    }
}

/// Pipeline stage an entry point has reached. Stages advance strictly in
/// order; `reset` rewinds to `Cataloged` without touching identities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EntryPointStage {
    Cataloged,
    SharedStateChecked,
    Instrumented,
}

/// A concurrently-invokable driver entry point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryPoint {
    pub name: String,
    /// Marked at most once; repeat requests are no-ops.
    pub inlined: bool,
    pub role: DeviceRole,
    /// Calls to unit-local procedures reachable from this entry point.
    pub call_sites: usize,
    pub span: Span,
}

impl EntryPoint {
    pub fn new(name: &str, span: Span) -> Self {
        Self {
            name: name.to_string(),
            inlined: false,
            role: DeviceRole::Ordinary,
            call_sites: 0,
            span,
        }
    }
}
