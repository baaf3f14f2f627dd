//! Access instrumentation pass
//!
//! Rewrites racing entry point bodies so later passes can see which
//! watched locations each one touches. For every race candidate the pass
//! declares a watchdog constant, and for every (candidate, racing entry
//! point, mode) combination an access checking variable whose lockset is
//! the intersection over all such accesses in the entry point's flow.
//!
//! ## Algorithm
//!
//! 1. Declare one `WATCHED_ACCESS_{location}` constant per race candidate.
//! 2. For each racing entry point, replay its recorded accesses into the
//!    access checking variables and collect the touched-location map.
//! 3. Clone the entry point's body, inserting a `LogAccess` marker in
//!    front of every load or store of a watched location.
//!
//! Non-racing entry points are left untouched. A program with no racing
//! entry points produces empty output, which is a valid result.

use crate::features::instrumentation::domain::{
    AccessCheckingVariable, AccessModes, InstrumentationRegion, WatchdogConstant,
};
use crate::features::instrumentation::infrastructure::error::{InstrumentationError, Result};
use crate::features::lockset::{FlowOutcome, Lockset};
use crate::features::shared_state::SharedStateReport;
use crate::shared::naming;
use crate::shared::{AccessMode, BasicBlock, Instruction, Program};
use rustc_hash::FxHashMap;
use std::collections::BTreeMap;
use tracing::debug;

/// Everything the pass synthesizes for one translation unit.
#[derive(Debug, Clone, Default)]
pub struct InstrumentationOutput {
    /// One per race candidate, in location order.
    pub watchdogs: Vec<WatchdogConstant>,
    /// Access checking variables keyed by name.
    pub variables: BTreeMap<String, AccessCheckingVariable>,
    /// Instrumented regions keyed by entry point name.
    pub regions: BTreeMap<String, InstrumentationRegion>,
}

impl InstrumentationOutput {
    pub fn region(&self, entry_point: &str) -> Option<&InstrumentationRegion> {
        self.regions.get(entry_point)
    }

    pub fn regions(&self) -> impl Iterator<Item = &InstrumentationRegion> {
        self.regions.values()
    }

    pub fn variable(&self, name: &str) -> Option<&AccessCheckingVariable> {
        self.variables.get(name)
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Lockset guarding `location` inside `entry_point`: the intersection
    /// over the entry point's accesses in both modes. `Top` when the entry
    /// point never touches the location.
    pub fn location_lockset(&self, entry_point: &str, location: &str) -> Lockset {
        let names = [
            naming::write_access_variable_name(location, entry_point),
            naming::read_access_variable_name(location, entry_point),
        ];
        let mut held = Lockset::top();
        for name in &names {
            if let Some(variable) = self.variables.get(name) {
                if variable.accessed {
                    held = held.intersect(&variable.locks);
                }
            }
        }
        held
    }
}

/// Instruments racing entry points against the shared state report.
pub struct InstrumentationPass;

impl InstrumentationPass {
    pub fn new() -> Self {
        Self
    }

    pub fn run(
        &self,
        program: &Program,
        report: &SharedStateReport,
        flows: &FxHashMap<String, FlowOutcome>,
    ) -> Result<InstrumentationOutput> {
        // Step 1: one watchdog per race candidate.
        let watchdogs: Vec<WatchdogConstant> = report
            .race_candidates()
            .map(|location| WatchdogConstant::new(&location.name))
            .collect();

        let mut variables: BTreeMap<String, AccessCheckingVariable> = BTreeMap::new();
        let mut regions: BTreeMap<String, InstrumentationRegion> = BTreeMap::new();

        for entry_point in report.racing_entry_points() {
            let flow = flows
                .get(entry_point)
                .ok_or_else(|| InstrumentationError::MissingFlow(entry_point.to_string()))?;
            let procedure = program
                .procedure(entry_point)
                .ok_or_else(|| InstrumentationError::MissingProcedure(entry_point.to_string()))?;

            // Step 2: replay the flow's accesses. Helpers contribute here
            // even though only the entry body is cloned below.
            let mut touched: BTreeMap<String, AccessModes> = BTreeMap::new();
            for access in &flow.accesses {
                if !report.is_race_candidate(&access.location) {
                    continue;
                }
                touched
                    .entry(access.location.clone())
                    .or_default()
                    .record(access.mode);

                let name = match access.mode {
                    AccessMode::Write => {
                        naming::write_access_variable_name(&access.location, entry_point)
                    }
                    AccessMode::Read => {
                        naming::read_access_variable_name(&access.location, entry_point)
                    }
                };
                variables
                    .entry(name)
                    .or_insert_with(|| {
                        AccessCheckingVariable::new(&access.location, entry_point, access.mode)
                    })
                    .record(&access.held);
            }

            // Step 3: clone the body with LogAccess markers.
            let blocks = instrument_blocks(&procedure.blocks, report);
            regions.insert(
                entry_point.to_string(),
                InstrumentationRegion {
                    name: entry_point.to_string(),
                    entry_point: entry_point.to_string(),
                    blocks,
                    touched,
                    imprecise: !flow.is_precise(),
                },
            );
        }

        debug!(
            watchdogs = watchdogs.len(),
            variables = variables.len(),
            regions = regions.len(),
            "instrumentation complete"
        );
        Ok(InstrumentationOutput {
            watchdogs,
            variables,
            regions,
        })
    }
}

impl Default for InstrumentationPass {
    fn default() -> Self {
        Self::new()
    }
}

fn instrument_blocks(blocks: &[BasicBlock], report: &SharedStateReport) -> Vec<BasicBlock> {
    blocks
        .iter()
        .map(|block| {
            let mut instructions = Vec::with_capacity(block.instructions.len());
            for instruction in &block.instructions {
                if let Some((location, mode)) = instruction.accessed_location() {
                    if report.is_race_candidate(location) {
                        instructions.push(Instruction::LogAccess {
                            location: location.to_string(),
                            mode,
                            span: instruction.span(),
                        });
                    }
                }
                instructions.push(instruction.clone());
            }
            BasicBlock {
                label: block.label.clone(),
                instructions,
                successors: block.successors.clone(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::lockset::{AccessSite, LocksetRegistry};
    use crate::features::shared_state::SharedStateAnalyser;
    use crate::shared::{IrIndex, Operand, Procedure, Span, Variable};

    fn access(location: &str, mode: AccessMode, held: Lockset) -> AccessSite {
        AccessSite {
            location: location.to_string(),
            mode,
            held,
            procedure: "body".to_string(),
            span: Span::zero(),
        }
    }

    fn flow(entry_point: &str, accesses: Vec<AccessSite>) -> FlowOutcome {
        FlowOutcome {
            entry_point: entry_point.to_string(),
            accesses,
            exit_lockset: Lockset::empty(),
            diagnostics: Vec::new(),
            opaque_calls: 0,
            recursive_calls: 0,
            block_entry: Default::default(),
        }
    }

    fn store(location: &str) -> Instruction {
        Instruction::Store {
            location: location.to_string(),
            value: Operand::Literal(1),
            span: Span::zero(),
        }
    }

    fn body(name: &str, instructions: Vec<Instruction>) -> Procedure {
        let mut block = BasicBlock::new("entry");
        block.instructions = instructions;
        Procedure {
            name: name.to_string(),
            params: Vec::new(),
            attributes: Default::default(),
            blocks: vec![block],
            span: Span::zero(),
        }
    }

    struct Setup {
        program: Program,
        report: SharedStateReport,
        flows: FxHashMap<String, FlowOutcome>,
    }

    /// Two entry points racing on `counter`, one quiet entry point that
    /// only touches `private`.
    fn racing_setup() -> Setup {
        let mut program = Program::new("driver");
        program.procedures = vec![
            body("ioctl", vec![store("counter"), store("private")]),
            body("irq_handler", vec![store("counter")]),
            body("probe", vec![store("private_probe")]),
        ];
        let index = IrIndex::build(&program).unwrap();

        let flows_vec = vec![
            flow(
                "ioctl",
                vec![
                    access("counter", AccessMode::Write, Lockset::empty()),
                    access("private", AccessMode::Write, Lockset::empty()),
                ],
            ),
            flow("irq_handler", vec![access("counter", AccessMode::Read, Lockset::empty())]),
            flow("probe", vec![access("private_probe", AccessMode::Write, Lockset::empty())]),
        ];
        let mut registry = LocksetRegistry::new();
        let report = SharedStateAnalyser::new().analyse(&flows_vec, &index, &mut registry);

        let flows = flows_vec
            .into_iter()
            .map(|f| (f.entry_point.clone(), f))
            .collect();
        Setup {
            program,
            report,
            flows,
        }
    }

    #[test]
    fn test_only_racing_entry_points_get_regions() {
        let setup = racing_setup();
        let output = InstrumentationPass::new()
            .run(&setup.program, &setup.report, &setup.flows)
            .unwrap();

        assert_eq!(output.regions.len(), 2);
        assert!(output.region("ioctl").is_some());
        assert!(output.region("irq_handler").is_some());
        assert!(output.region("probe").is_none());

        assert_eq!(output.watchdogs.len(), 1);
        assert_eq!(output.watchdogs[0].name, "WATCHED_ACCESS_counter");

        let written = output.variable("WRITTEN_counter_$ioctl").unwrap();
        assert!(written.accessed);
        let read = output.variable("READ_counter_$irq_handler").unwrap();
        assert!(read.accessed);
        // ioctl never reads counter, so no READ variable for it.
        assert!(output.variable("READ_counter_$ioctl").is_none());
    }

    #[test]
    fn test_log_access_inserted_before_watched_stores_only() {
        let setup = racing_setup();
        let output = InstrumentationPass::new()
            .run(&setup.program, &setup.report, &setup.flows)
            .unwrap();

        let region = output.region("ioctl").unwrap();
        assert_eq!(region.blocks.len(), 1);
        let instructions = &region.blocks[0].instructions;
        // LogAccess(counter), Store(counter), Store(private). `private` is
        // not a candidate, so no marker in front of it.
        assert_eq!(instructions.len(), 3);
        assert!(matches!(
            &instructions[0],
            Instruction::LogAccess { location, mode, .. }
                if location == "counter" && *mode == AccessMode::Write
        ));
        assert!(matches!(
            &instructions[1],
            Instruction::Store { location, .. } if location == "counter"
        ));
        assert!(matches!(
            &instructions[2],
            Instruction::Store { location, .. } if location == "private"
        ));

        assert!(region.touches("counter"));
        assert!(!region.touches("private"));
    }

    #[test]
    fn test_no_racing_entry_points_yield_empty_output() {
        let mut program = Program::new("driver");
        program.procedures = vec![body("ioctl", vec![store("counter")])];
        let index = IrIndex::build(&program).unwrap();

        let mut registry = LocksetRegistry::new();
        let mutex = registry.declare_lock("dev_mutex", Span::zero());
        let flows_vec = vec![
            flow("ioctl", vec![access("counter", AccessMode::Write, Lockset::singleton(mutex))]),
            flow("read", vec![access("counter", AccessMode::Write, Lockset::singleton(mutex))]),
        ];
        let report = SharedStateAnalyser::new().analyse(&flows_vec, &index, &mut registry);
        let flows = flows_vec
            .into_iter()
            .map(|f| (f.entry_point.clone(), f))
            .collect();

        let output = InstrumentationPass::new()
            .run(&program, &report, &flows)
            .unwrap();
        assert!(output.is_empty());
        assert!(output.watchdogs.is_empty());
        assert!(output.variables.is_empty());
    }

    #[test]
    fn test_location_lockset_intersects_both_modes() {
        let mut program = Program::new("driver");
        program.procedures = vec![
            body("ioctl", vec![store("state")]),
            body("read", vec![store("state")]),
        ];
        let index = IrIndex::build(&program).unwrap();

        let mut registry = LocksetRegistry::new();
        let a = registry.declare_lock("lock_a", Span::zero());
        let b = registry.declare_lock("lock_b", Span::zero());
        let flows_vec = vec![
            flow(
                "ioctl",
                vec![
                    access("state", AccessMode::Read, Lockset::from_locks([a, b])),
                    access("state", AccessMode::Write, Lockset::singleton(a)),
                ],
            ),
            flow("read", vec![access("state", AccessMode::Write, Lockset::empty())]),
        ];
        let report = SharedStateAnalyser::new().analyse(&flows_vec, &index, &mut registry);
        let flows: FxHashMap<String, FlowOutcome> = flows_vec
            .into_iter()
            .map(|f| (f.entry_point.clone(), f))
            .collect();

        let output = InstrumentationPass::new()
            .run(&program, &report, &flows)
            .unwrap();
        assert_eq!(
            output.location_lockset("ioctl", "state"),
            Lockset::singleton(a)
        );
        assert_eq!(output.location_lockset("read", "state"), Lockset::empty());
        // Untouched combination stays vacuously Top.
        assert!(output.location_lockset("ioctl", "other").is_top());
    }

    #[test]
    fn test_imprecise_flag_mirrors_flow_outcome() {
        let mut program = Program::new("driver");
        program.procedures = vec![
            body("ioctl", vec![store("counter")]),
            body("read", vec![store("counter")]),
        ];
        let index = IrIndex::build(&program).unwrap();

        let mut opaque_flow = flow(
            "ioctl",
            vec![access("counter", AccessMode::Write, Lockset::empty())],
        );
        opaque_flow.opaque_calls = 1;
        let flows_vec = vec![
            opaque_flow,
            flow("read", vec![access("counter", AccessMode::Write, Lockset::empty())]),
        ];
        let mut registry = LocksetRegistry::new();
        let report = SharedStateAnalyser::new().analyse(&flows_vec, &index, &mut registry);
        let flows: FxHashMap<String, FlowOutcome> = flows_vec
            .into_iter()
            .map(|f| (f.entry_point.clone(), f))
            .collect();

        let output = InstrumentationPass::new()
            .run(&program, &report, &flows)
            .unwrap();
        assert!(output.region("ioctl").unwrap().imprecise);
        assert!(!output.region("read").unwrap().imprecise);
    }

    #[test]
    fn test_missing_procedure_is_an_error() {
        let program = Program::new("driver");
        let flows_vec = vec![
            flow("ioctl", vec![access("counter", AccessMode::Write, Lockset::empty())]),
            flow("read", vec![access("counter", AccessMode::Write, Lockset::empty())]),
        ];
        let index = IrIndex::build(&program).unwrap();
        let mut registry = LocksetRegistry::new();
        let report = SharedStateAnalyser::new().analyse(&flows_vec, &index, &mut registry);
        let flows: FxHashMap<String, FlowOutcome> = flows_vec
            .into_iter()
            .map(|f| (f.entry_point.clone(), f))
            .collect();

        let result = InstrumentationPass::new().run(&program, &report, &flows);
        assert!(matches!(
            result,
            Err(InstrumentationError::MissingProcedure(_))
        ));
    }

    #[test]
    fn test_missing_flow_is_an_error() {
        let mut program = Program::new("driver");
        program.procedures = vec![
            body("ioctl", vec![store("counter")]),
            body("read", vec![store("counter")]),
        ];
        let index = IrIndex::build(&program).unwrap();

        let flows_vec = vec![
            flow("ioctl", vec![access("counter", AccessMode::Write, Lockset::empty())]),
            flow("read", vec![access("counter", AccessMode::Write, Lockset::empty())]),
        ];
        let mut registry = LocksetRegistry::new();
        let report = SharedStateAnalyser::new().analyse(&flows_vec, &index, &mut registry);

        // Drop one racing entry point's flow before instrumenting.
        let flows: FxHashMap<String, FlowOutcome> = flows_vec
            .into_iter()
            .filter(|f| f.entry_point == "ioctl")
            .map(|f| (f.entry_point.clone(), f))
            .collect();

        let result = InstrumentationPass::new().run(&program, &report, &flows);
        assert!(matches!(result, Err(InstrumentationError::MissingFlow(_))));
    }

    #[test]
    fn test_analyzer_owned_variables_never_watched() {
        // An access checking variable from a previous run must not become
        // a watched location itself.
        let variable = Variable {
            name: "WRITTEN_counter_$ioctl".to_string(),
            attributes: crate::shared::AttributeSet::new()
                .with_flag(crate::shared::ATTR_ACCESS_CHECKING),
            span: Span::zero(),
        };
        let mut program = Program::new("driver");
        program.variables = vec![variable];
        program.procedures = vec![
            body("ioctl", vec![store("WRITTEN_counter_$ioctl")]),
            body("read", vec![store("WRITTEN_counter_$ioctl")]),
        ];
        let index = IrIndex::build(&program).unwrap();

        let flows_vec = vec![
            flow("ioctl", vec![access("WRITTEN_counter_$ioctl", AccessMode::Write, Lockset::empty())]),
            flow("read", vec![access("WRITTEN_counter_$ioctl", AccessMode::Write, Lockset::empty())]),
        ];
        let mut registry = LocksetRegistry::new();
        let report = SharedStateAnalyser::new().analyse(&flows_vec, &index, &mut registry);
        let flows: FxHashMap<String, FlowOutcome> = flows_vec
            .into_iter()
            .map(|f| (f.entry_point.clone(), f))
            .collect();

        let output = InstrumentationPass::new()
            .run(&program, &report, &flows)
            .unwrap();
        assert!(output.is_empty());
    }
}
