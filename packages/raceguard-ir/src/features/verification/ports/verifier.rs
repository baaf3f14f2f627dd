//! Race verifier port

use crate::features::pair_checking::PairCheckingRegion;
use crate::features::verification::domain::AssertionVerdict;

/// Discharges the race assertions of a pair region.
///
/// Implementations return one verdict per assertion, parallel to
/// `region.assertions`. The built-in `LocksetVerifier` decides from the
/// claims alone; an SMT-backed implementation would re-encode the region's
/// blocks instead.
pub trait RaceVerifier: Send + Sync {
    fn verify(&self, region: &PairCheckingRegion) -> Vec<AssertionVerdict>;

    fn name(&self) -> &'static str;
}
