//! Static lockset analysis engine
//!
//! Drives the staged pipeline over a session:
//!
//! 1. Lockset flow per entry point (honoring a single-entry-point scope)
//! 2. Shared state analysis
//! 3. Instrumentation of racing entry points
//! 4. Auto-inlining of small entry points
//! 5. Pair region construction through the session cache
//! 6. Verification and report assembly
//!
//! The engine itself is immutable; all mutable state lives in the session,
//! so one engine can serve many sessions.

use crate::config::{AnalysisConfig, ConfigError, DomainProfile};
use crate::features::entry_points::EntryPointStage;
use crate::features::instrumentation::InstrumentationPass;
use crate::features::lockset::{LocksetDiagnostic, LocksetFlow};
use crate::features::pair_checking::{
    AllPairsPolicy, ConcurrencyPolicy, EntryPointPair, PairCheckingRegion, PairRegionBuilder,
};
use crate::features::shared_state::SharedStateAnalyser;
use crate::features::verification::{verify_all, AssertionVerdict, LocksetVerifier, RaceVerifier};
use crate::pipeline::context::AnalysisContext;
use crate::pipeline::error::Result;
use crate::pipeline::result::{AnalysisRun, RunStats};
use crate::pipeline::session::AnalysisSession;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub struct StaticLocksetAnalysis {
    config: AnalysisConfig,
    profile: DomainProfile,
    policy: Box<dyn ConcurrencyPolicy>,
    verifier: Box<dyn RaceVerifier>,
}

impl StaticLocksetAnalysis {
    /// Validates the configuration up front; a bad range never reaches
    /// the analysis.
    pub fn new(config: AnalysisConfig, profile: DomainProfile) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            profile,
            policy: Box::new(AllPairsPolicy),
            verifier: Box::new(LocksetVerifier::new()),
        })
    }

    pub fn with_policy(mut self, policy: Box<dyn ConcurrencyPolicy>) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_verifier(mut self, verifier: Box<dyn RaceVerifier>) -> Self {
        self.verifier = verifier;
        self
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn run(&self, session: &mut AnalysisSession) -> Result<AnalysisRun> {
        if let Some(name) = &self.config.analyse_only {
            if !session.has_entry_point(name) {
                return Err(ConfigError::UnknownEntryPoint(name.clone()).into());
            }
        }

        let mut stats = RunStats {
            units: session.contexts().len(),
            ..RunStats::default()
        };
        let mut diagnostics: Vec<LocksetDiagnostic> = Vec::new();

        // Steps 1-4 mutate each context in place.
        for context in session.contexts_mut() {
            stats.entry_points += context.catalogue.entry_points().len();
            self.analyse_unit(context, &mut stats, &mut diagnostics)?;
        }

        // Step 5: build pair regions through the session-wide cache.
        let print_pairs = self.config.print_pairs;
        let policy = self.policy.as_ref();
        let mut regions_by_unit: Vec<Vec<Arc<PairCheckingRegion>>> = Vec::new();
        let (cache, contexts) = session.cache_and_contexts();
        for context in contexts {
            let mut regions = Vec::new();
            if let (Some(report), Some(output)) =
                (&context.shared_report, &context.instrumentation)
            {
                let racing = report.racing_entry_points().count();
                stats.pairs_considered += racing * racing.saturating_sub(1) / 2;

                let builder = PairRegionBuilder::new(output, &context.catalogue, policy);
                for pair in builder.candidate_pairs(report) {
                    let region =
                        cache.get_or_build(pair.first(), pair.second(), |p| builder.build(p));
                    if let Some(region) = region {
                        if print_pairs {
                            info!(region = %region.name, assertions = region.assertions.len(), "pair region built");
                        }
                        regions.push(region);
                    }
                }
            }
            stats.pairs_built += regions.len();
            regions_by_unit.push(regions);
        }
        stats.pairs_skipped = stats.pairs_considered - stats.pairs_built;

        // Step 6: verify each unit's regions against its registry.
        let mut reports = Vec::new();
        for (context, regions) in session.contexts().iter().zip(&regions_by_unit) {
            let unit_reports = verify_all(self.verifier.as_ref(), regions, &context.registry);
            for report in &unit_reports {
                stats.record_verdict(report.verdict);
            }
            reports.extend(unit_reports);
        }

        if self.config.skip_race_free_pairs {
            reports.retain(|report| report.verdict != AssertionVerdict::Verified);
        }

        let run = AnalysisRun {
            reports,
            diagnostics,
            stats,
        };
        info!(
            outcome = %run.outcome(),
            violated = stats.violated,
            verified = stats.verified,
            unknown = stats.unknown,
            pairs = stats.pairs_built,
            "analysis run complete"
        );
        Ok(run)
    }

    /// Runs the pipeline through shared state analysis and lists the
    /// candidate pairs, without building or verifying any region.
    pub fn enumerate_pairs(&self, session: &mut AnalysisSession) -> Result<Vec<EntryPointPair>> {
        let mut stats = RunStats::default();
        let mut diagnostics = Vec::new();
        for context in session.contexts_mut() {
            self.analyse_unit(context, &mut stats, &mut diagnostics)?;
        }

        let mut pairs = Vec::new();
        for context in session.contexts() {
            if let (Some(report), Some(output)) =
                (&context.shared_report, &context.instrumentation)
            {
                let builder =
                    PairRegionBuilder::new(output, &context.catalogue, self.policy.as_ref());
                pairs.extend(builder.candidate_pairs(report));
            }
        }
        Ok(pairs)
    }

    fn analyse_unit(
        &self,
        context: &mut AnalysisContext,
        stats: &mut RunStats,
        diagnostics: &mut Vec<LocksetDiagnostic>,
    ) -> Result<()> {
        let selected: Vec<String> = context
            .catalogue
            .entry_points()
            .iter()
            .map(|ep| ep.name.clone())
            .filter(|name| {
                self.config
                    .analyse_only
                    .as_deref()
                    .map_or(true, |only| only == name)
            })
            .collect();

        // Step 1: lockset flow per selected entry point.
        for name in &selected {
            let flow = LocksetFlow::new(
                &context.program,
                &context.index,
                &self.profile,
                self.config.max_call_depth,
            );
            let outcome = flow.analyze(name, &mut context.registry)?;
            for diagnostic in &outcome.diagnostics {
                warn!(unit = context.unit(), "{diagnostic}");
            }
            diagnostics.extend(outcome.diagnostics.iter().cloned());
            context.flows.insert(name.clone(), outcome);
        }
        stats.analysed_entry_points += selected.len();

        // Step 2: shared state across the unit's flows.
        let report = SharedStateAnalyser::new().analyse(
            context.flows.values(),
            &context.index,
            &mut context.registry,
        );
        for name in &selected {
            context.advance_stage(name, EntryPointStage::SharedStateChecked);
        }
        stats.shared_locations += report.shared_count();
        stats.race_candidates += report.candidate_count();
        stats.racing_entry_points += report.racing_entry_points().count();

        // Step 3: instrument the racing entry points.
        let output = InstrumentationPass::new().run(&context.program, &report, &context.flows)?;
        for name in output.regions.keys() {
            context.advance_stage(name, EntryPointStage::Instrumented);
        }
        debug!(unit = context.unit(), regions = output.regions.len(), "unit instrumented");
        context.shared_report = Some(report);
        context.instrumentation = Some(output);

        // Step 4: mark small entry points for inlining. A bound of zero
        // disables this.
        if self.config.inline_bound > 0 {
            let small: Vec<String> = context
                .catalogue
                .entry_points()
                .iter()
                .filter(|ep| ep.call_sites <= self.config.inline_bound)
                .map(|ep| ep.name.clone())
                .collect();
            for name in small {
                if context.catalogue.inline(&name) {
                    stats.inlined_entry_points += 1;
                }
            }
        }
        Ok(())
    }
}
