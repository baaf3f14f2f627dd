//! Lockset inconsistency diagnostics
//!
//! These describe suspicious locking discipline, not races. They never abort
//! an analysis run; the driver prints them alongside the race reports.

use crate::shared::models::Span;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LocksetDiagnostic {
    /// A release of a lock the entry point provably does not hold.
    ReleaseWithoutAcquire {
        entry_point: String,
        lock: String,
        procedure: String,
        span: Span,
    },
    /// The entry point can return while still holding locks.
    HeldAtExit {
        entry_point: String,
        locks: Vec<String>,
    },
    /// Recursion in the entry point's call tree; the cycle is not descended,
    /// which makes the flow results imprecise.
    RecursiveCall {
        entry_point: String,
        procedure: String,
    },
}

impl LocksetDiagnostic {
    pub fn entry_point(&self) -> &str {
        match self {
            LocksetDiagnostic::ReleaseWithoutAcquire { entry_point, .. }
            | LocksetDiagnostic::HeldAtExit { entry_point, .. }
            | LocksetDiagnostic::RecursiveCall { entry_point, .. } => entry_point,
        }
    }
}

impl fmt::Display for LocksetDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocksetDiagnostic::ReleaseWithoutAcquire {
                entry_point,
                lock,
                procedure,
                span,
            } => write!(
                f,
                "'{entry_point}' releases '{lock}' without holding it (in '{procedure}' at {span})"
            ),
            LocksetDiagnostic::HeldAtExit { entry_point, locks } => write!(
                f,
                "'{entry_point}' can return still holding [{}]",
                locks.join(", ")
            ),
            LocksetDiagnostic::RecursiveCall {
                entry_point,
                procedure,
            } => write!(
                f,
                "'{entry_point}' reaches recursive procedure '{procedure}'; results are imprecise"
            ),
        }
    }
}
