//! Lockset race verifier
//!
//! Discharges assertions from the claims alone: a common lock in both
//! sides' locksets proves the accesses cannot interleave. Disjoint
//! locksets violate the assertion when the region is precise; when opaque
//! or recursive calls widened the analysis, the verdict is `Unknown`
//! rather than a claimed race.

use crate::features::lockset::LocksetRegistry;
use crate::features::pair_checking::{AccessClaim, PairCheckingRegion};
use crate::features::verification::domain::{AssertionVerdict, RaceReport, ReportedAccess};
use crate::features::verification::ports::RaceVerifier;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone, Copy, Default)]
pub struct LocksetVerifier;

impl LocksetVerifier {
    pub fn new() -> Self {
        Self
    }
}

impl RaceVerifier for LocksetVerifier {
    fn verify(&self, region: &PairCheckingRegion) -> Vec<AssertionVerdict> {
        region
            .assertions
            .iter()
            .map(|assertion| {
                if assertion.first.locks.intersects(&assertion.second.locks) {
                    AssertionVerdict::Verified
                } else if region.imprecise {
                    AssertionVerdict::Unknown
                } else {
                    AssertionVerdict::Violated
                }
            })
            .collect()
    }

    fn name(&self) -> &'static str {
        "lockset"
    }
}

fn reported(claim: &AccessClaim, registry: &LocksetRegistry) -> ReportedAccess {
    ReportedAccess {
        entry_point: claim.entry_point.clone(),
        modes: claim.modes,
        locks: registry.lock_names(&claim.locks),
    }
}

fn region_reports(
    verifier: &dyn RaceVerifier,
    region: &PairCheckingRegion,
    registry: &LocksetRegistry,
) -> Vec<RaceReport> {
    verifier
        .verify(region)
        .into_iter()
        .zip(&region.assertions)
        .map(|(verdict, assertion)| RaceReport {
            pair: region.pair.clone(),
            location: assertion.location.clone(),
            verdict,
            first: reported(&assertion.first, registry),
            second: reported(&assertion.second, registry),
        })
        .collect()
}

/// Verifies every region and assembles the reports, sorted by pair and
/// location so the output order never depends on scheduling.
#[cfg(feature = "parallel")]
pub fn verify_all(
    verifier: &dyn RaceVerifier,
    regions: &[Arc<PairCheckingRegion>],
    registry: &LocksetRegistry,
) -> Vec<RaceReport> {
    use rayon::prelude::*;

    let mut reports: Vec<RaceReport> = regions
        .par_iter()
        .flat_map_iter(|region| region_reports(verifier, region, registry))
        .collect();
    reports.sort_by(|a, b| (&a.pair, &a.location).cmp(&(&b.pair, &b.location)));
    debug!(regions = regions.len(), reports = reports.len(), verifier = verifier.name(), "verification complete");
    reports
}

#[cfg(not(feature = "parallel"))]
pub fn verify_all(
    verifier: &dyn RaceVerifier,
    regions: &[Arc<PairCheckingRegion>],
    registry: &LocksetRegistry,
) -> Vec<RaceReport> {
    let mut reports: Vec<RaceReport> = regions
        .iter()
        .flat_map(|region| region_reports(verifier, region, registry))
        .collect();
    reports.sort_by(|a, b| (&a.pair, &a.location).cmp(&(&b.pair, &b.location)));
    debug!(regions = regions.len(), reports = reports.len(), verifier = verifier.name(), "verification complete");
    reports
}
