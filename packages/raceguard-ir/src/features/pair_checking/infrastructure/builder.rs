//! Pair region construction
//!
//! Enumerates the pairs of racing entry points worth checking and builds
//! one `PairCheckingRegion` per pair: both instrumented bodies composed
//! sequentially under uniquified labels, then a checking block with one
//! `AssertRaceFree` per conflicting location.
//!
//! ## Algorithm
//!
//! 1. Candidate pairs: unordered pairs of distinct racing entry points the
//!    policy allows, with at least one common touched location. Pairs with
//!    no common location are skipped without building anything.
//! 2. Assertions: for every common location where at least one side
//!    writes, claim both sides' modes and per-location locksets. Read/read
//!    overlap is benign and produces no assertion.
//! 3. Composition: labels on each side become `{entry_point}${label}`, the
//!    first body's exits fall through into the second body's entry, and
//!    the second body's exits lead to the checking block.

use crate::features::entry_points::EntryPointCatalogue;
use crate::features::instrumentation::{InstrumentationOutput, InstrumentationRegion};
use crate::features::pair_checking::domain::{
    AccessClaim, EntryPointPair, PairCheckingRegion, RaceAssertion,
};
use crate::features::pair_checking::ports::ConcurrencyPolicy;
use crate::features::shared_state::SharedStateReport;
use crate::shared::{BasicBlock, Instruction, Span};
use tracing::debug;

/// Label of the synthesized checking block. Side labels always carry a
/// `{entry_point}$` prefix, so this cannot collide with them.
const CHECK_BLOCK_LABEL: &str = "check";

pub struct PairRegionBuilder<'a> {
    output: &'a InstrumentationOutput,
    catalogue: &'a EntryPointCatalogue,
    policy: &'a dyn ConcurrencyPolicy,
}

impl<'a> PairRegionBuilder<'a> {
    pub fn new(
        output: &'a InstrumentationOutput,
        catalogue: &'a EntryPointCatalogue,
        policy: &'a dyn ConcurrencyPolicy,
    ) -> Self {
        Self {
            output,
            catalogue,
            policy,
        }
    }

    /// Unordered pairs of distinct racing entry points that the policy
    /// allows and that share at least one touched location, in canonical
    /// order.
    pub fn candidate_pairs(&self, report: &SharedStateReport) -> Vec<EntryPointPair> {
        let racing: Vec<&str> = report.racing_entry_points().collect();
        let mut pairs = Vec::new();
        for (i, a) in racing.iter().enumerate() {
            for b in &racing[i + 1..] {
                let (Some(first), Some(second)) =
                    (self.catalogue.get(a), self.catalogue.get(b))
                else {
                    continue;
                };
                if !self.policy.may_run_concurrently(first, second) {
                    debug!(first = *a, second = *b, policy = self.policy.name(), "pair excluded");
                    continue;
                }
                let (Some(first_region), Some(second_region)) =
                    (self.output.region(a), self.output.region(b))
                else {
                    continue;
                };
                if !share_location(first_region, second_region) {
                    continue;
                }
                pairs.push(EntryPointPair::new(a, b));
            }
        }
        pairs.sort();
        pairs
    }

    /// Builds the region for one pair. `None` when either side has no
    /// instrumented body or the sides touch nothing in common.
    pub fn build(&self, pair: &EntryPointPair) -> Option<PairCheckingRegion> {
        let first = self.output.region(pair.first())?;
        let second = self.output.region(pair.second())?;
        if !share_location(first, second) {
            return None;
        }

        let assertions = self.assertions(first, second);
        let blocks = compose_blocks(first, second, &assertions);
        Some(PairCheckingRegion {
            name: pair.region_name(),
            pair: pair.clone(),
            blocks,
            assertions,
            imprecise: first.imprecise || second.imprecise,
        })
    }

    fn assertions(
        &self,
        first: &InstrumentationRegion,
        second: &InstrumentationRegion,
    ) -> Vec<RaceAssertion> {
        let mut assertions = Vec::new();
        for (location, first_modes) in &first.touched {
            let Some(second_modes) = second.touched.get(location) else {
                continue;
            };
            if !first_modes.any_write() && !second_modes.any_write() {
                continue;
            }
            assertions.push(RaceAssertion {
                location: location.clone(),
                first: AccessClaim {
                    entry_point: first.entry_point.clone(),
                    modes: *first_modes,
                    locks: self.output.location_lockset(&first.entry_point, location),
                },
                second: AccessClaim {
                    entry_point: second.entry_point.clone(),
                    modes: *second_modes,
                    locks: self.output.location_lockset(&second.entry_point, location),
                },
            });
        }
        assertions
    }
}

fn share_location(first: &InstrumentationRegion, second: &InstrumentationRegion) -> bool {
    first.touched.keys().any(|location| second.touches(location))
}

fn side_label(entry_point: &str, label: &str) -> String {
    format!("{entry_point}${label}")
}

/// Clone one side's blocks under prefixed labels, rerouting its exits to
/// `next`.
fn reroute(region: &InstrumentationRegion, next: &str) -> Vec<BasicBlock> {
    region
        .blocks
        .iter()
        .map(|block| {
            let successors = if block.is_exit() {
                vec![next.to_string()]
            } else {
                block
                    .successors
                    .iter()
                    .map(|label| side_label(&region.entry_point, label))
                    .collect()
            };
            BasicBlock {
                label: side_label(&region.entry_point, &block.label),
                instructions: block.instructions.clone(),
                successors,
            }
        })
        .collect()
}

fn compose_blocks(
    first: &InstrumentationRegion,
    second: &InstrumentationRegion,
    assertions: &[RaceAssertion],
) -> Vec<BasicBlock> {
    let second_entry = second
        .blocks
        .first()
        .map(|block| side_label(&second.entry_point, &block.label))
        .unwrap_or_else(|| CHECK_BLOCK_LABEL.to_string());

    let mut blocks = reroute(first, &second_entry);
    blocks.extend(reroute(second, CHECK_BLOCK_LABEL));

    let mut check = BasicBlock::new(CHECK_BLOCK_LABEL);
    check.instructions = assertions
        .iter()
        .map(|assertion| Instruction::AssertRaceFree {
            location: assertion.location.clone(),
            span: Span::zero(),
        })
        .collect();
    blocks.push(check);
    blocks
}
