//! Per-unit analysis context

use crate::config::DomainProfile;
use crate::features::entry_points::{EntryPointCatalogue, EntryPointStage};
use crate::features::instrumentation::InstrumentationOutput;
use crate::features::lockset::{FlowOutcome, LocksetRegistry};
use crate::features::shared_state::SharedStateReport;
use crate::pipeline::error::Result;
use crate::shared::{IrIndex, Program};
use rustc_hash::FxHashMap;

/// Analysis state for one translation unit: the program, its typed index,
/// the entry point catalogue, and everything the staged pipeline derives.
///
/// Lock identities and catalogued entry points survive `reset_analysis`;
/// only derived results are dropped.
#[derive(Debug)]
pub struct AnalysisContext {
    pub program: Program,
    pub index: IrIndex,
    pub catalogue: EntryPointCatalogue,
    pub registry: LocksetRegistry,
    pub flows: FxHashMap<String, FlowOutcome>,
    pub shared_report: Option<SharedStateReport>,
    pub instrumentation: Option<InstrumentationOutput>,
    stages: FxHashMap<String, EntryPointStage>,
}

impl AnalysisContext {
    pub fn new(program: Program, profile: &DomainProfile) -> Result<Self> {
        let index = IrIndex::build(&program)?;
        let catalogue = EntryPointCatalogue::collect(&program, &index, profile)?;
        let stages = catalogue
            .entry_points()
            .iter()
            .map(|ep| (ep.name.clone(), EntryPointStage::Cataloged))
            .collect();
        Ok(Self {
            program,
            index,
            catalogue,
            registry: LocksetRegistry::new(),
            flows: FxHashMap::default(),
            shared_report: None,
            instrumentation: None,
            stages,
        })
    }

    pub fn unit(&self) -> &str {
        &self.program.unit
    }

    pub fn stage(&self, entry_point: &str) -> Option<EntryPointStage> {
        self.stages.get(entry_point).copied()
    }

    /// Stages only move forward; a repeated earlier stage is a no-op.
    pub fn advance_stage(&mut self, entry_point: &str, stage: EntryPointStage) {
        if let Some(current) = self.stages.get_mut(entry_point) {
            if stage > *current {
                *current = stage;
            }
        }
    }

    /// Drops derived results and rewinds every entry point to
    /// `Cataloged`. Lock ids and the catalogue survive, so re-analysis
    /// reproduces identical verdicts.
    pub fn reset_analysis(&mut self) {
        self.registry.reset();
        self.catalogue.reset();
        self.flows.clear();
        self.shared_report = None;
        self.instrumentation = None;
        for stage in self.stages.values_mut() {
            *stage = EntryPointStage::Cataloged;
        }
    }
}
