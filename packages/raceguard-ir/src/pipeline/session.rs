//! Analysis session

use crate::config::DomainProfile;
use crate::features::pair_checking::PairRegionCache;
use crate::pipeline::context::AnalysisContext;
use crate::pipeline::error::{PipelineError, Result};
use crate::shared::Program;
use rustc_hash::FxHashMap;
use tracing::debug;

/// Owns every unit under analysis plus the cross-unit pair cache. All
/// state the analysis ever mutates hangs off a session, so two sessions
/// never interfere.
#[derive(Debug, Default)]
pub struct AnalysisSession {
    contexts: Vec<AnalysisContext>,
    by_entry_point: FxHashMap<String, usize>,
    pair_cache: PairRegionCache,
}

impl AnalysisSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a unit. Entry point names key pairing across the whole
    /// session, so a name colliding with an earlier unit is fatal.
    pub fn add_unit(&mut self, program: Program, profile: &DomainProfile) -> Result<()> {
        let context = AnalysisContext::new(program, profile)?;
        for ep in context.catalogue.entry_points() {
            if let Some(&existing) = self.by_entry_point.get(&ep.name) {
                return Err(PipelineError::DuplicateEntryPoint {
                    entry_point: ep.name.clone(),
                    first_unit: self.contexts[existing].unit().to_string(),
                    second_unit: context.unit().to_string(),
                });
            }
        }
        let slot = self.contexts.len();
        for ep in context.catalogue.entry_points() {
            self.by_entry_point.insert(ep.name.clone(), slot);
        }
        debug!(unit = context.unit(), entry_points = context.catalogue.entry_points().len(), "unit added");
        self.contexts.push(context);
        Ok(())
    }

    pub fn contexts(&self) -> &[AnalysisContext] {
        &self.contexts
    }

    pub fn contexts_mut(&mut self) -> &mut [AnalysisContext] {
        &mut self.contexts
    }

    pub fn context_of(&self, entry_point: &str) -> Option<&AnalysisContext> {
        self.by_entry_point
            .get(entry_point)
            .map(|&slot| &self.contexts[slot])
    }

    pub fn has_entry_point(&self, entry_point: &str) -> bool {
        self.by_entry_point.contains_key(entry_point)
    }

    pub fn entry_point_count(&self) -> usize {
        self.by_entry_point.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contexts.is_empty()
    }

    /// Split borrow for the pair building phase: the cache is written
    /// while the contexts are only read.
    pub fn cache_and_contexts(&mut self) -> (&mut PairRegionCache, &[AnalysisContext]) {
        (&mut self.pair_cache, &self.contexts)
    }

    pub fn pair_cache(&self) -> &PairRegionCache {
        &self.pair_cache
    }

    /// Rewinds every context and forgets cached pair regions. Lock and
    /// entry point identities survive.
    pub fn reset(&mut self) {
        for context in &mut self.contexts {
            context.reset_analysis();
        }
        self.pair_cache.clear();
    }
}
