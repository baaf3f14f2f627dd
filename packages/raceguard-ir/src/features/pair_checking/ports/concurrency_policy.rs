//! Concurrency policy port

use crate::features::entry_points::{DeviceRole, EntryPoint};

/// Decides which entry point pairs can execute concurrently.
///
/// The pair builder only enumerates pairs the policy allows, so a policy
/// prunes the pair space before any region is built.
pub trait ConcurrencyPolicy: Send + Sync {
    fn may_run_concurrently(&self, first: &EntryPoint, second: &EntryPoint) -> bool;

    fn name(&self) -> &'static str;
}

/// Every pair of entry points may interleave. The sound default when
/// nothing is known about the driver's lifecycle.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllPairsPolicy;

impl ConcurrencyPolicy for AllPairsPolicy {
    fn may_run_concurrently(&self, _first: &EntryPoint, _second: &EntryPoint) -> bool {
        true
    }

    fn name(&self) -> &'static str {
        "all-pairs"
    }
}

/// Excludes pairs involving a registration or unregistration entry point.
/// The kernel serializes probe/remove against live file operations, so
/// such pairs cannot interleave in practice.
#[derive(Debug, Clone, Copy, Default)]
pub struct RoleAwarePolicy;

impl ConcurrencyPolicy for RoleAwarePolicy {
    fn may_run_concurrently(&self, first: &EntryPoint, second: &EntryPoint) -> bool {
        first.role == DeviceRole::Ordinary && second.role == DeviceRole::Ordinary
    }

    fn name(&self) -> &'static str {
        "role-aware"
    }
}
