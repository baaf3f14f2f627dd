//! Lockset flow analysis
//!
//! Forward dataflow over an entry point's CFG, computing the set of locks
//! provably held at every program point.
//!
//! ## Algorithm
//! 1. Worklist fixpoint per procedure: entry state ∅, meet = lockset
//!    intersection, transfer inserts on acquire calls and removes on release
//!    calls. The lattice is finite and the transfer monotone, so the
//!    iteration terminates.
//! 2. Calls to unit-local procedures are descended with the caller's state,
//!    bounded by `max_call_depth`; cycles on the descent stack are not
//!    entered. Unknown callees leave the state unchanged but poison
//!    precision.
//! 3. After stabilization a recording pass replays the states once to
//!    collect access sites (location, mode, held lockset), emit
//!    release-without-acquire and held-at-exit diagnostics, and count the
//!    opaque calls that make the outcome imprecise.
//!
//! ## Performance
//! - Fixpoint: O(blocks × locks) iterations per procedure, sets are tiny
//! - Recording: one extra walk per reachable block
//! - Descent re-runs the callee fixpoint per call site; driver helpers are
//!   small and the depth bound caps the blowup

use super::error::{LocksetError, Result};
use super::registry::LocksetRegistry;
use crate::config::DomainProfile;
use crate::features::lockset::domain::{AccessSite, Lockset, LocksetDiagnostic};
use crate::shared::models::{
    BasicBlock, Instruction, IrIndex, Operand, Procedure, Program, Span,
};
use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::VecDeque;
use tracing::debug;

// ═══════════════════════════════════════════════════════════════════════════
// Outcome
// ═══════════════════════════════════════════════════════════════════════════

/// Everything the flow analysis learned about one entry point.
#[derive(Debug, Clone)]
pub struct FlowOutcome {
    pub entry_point: String,
    /// Every load and store reachable from the entry point, helpers
    /// included, with the lockset held at that point.
    pub accesses: Vec<AccessSite>,
    /// Intersection over the locksets of all reachable exit blocks.
    pub exit_lockset: Lockset,
    pub diagnostics: Vec<LocksetDiagnostic>,
    /// Calls the analysis could not see through.
    pub opaque_calls: usize,
    /// Call cycles the analysis refused to descend into.
    pub recursive_calls: usize,
    /// Lockset at entry of each reachable block of the entry point body.
    pub block_entry: FxHashMap<String, Lockset>,
}

impl FlowOutcome {
    /// Precise outcomes may prove races; imprecise ones only suspect them.
    pub fn is_precise(&self) -> bool {
        self.opaque_calls == 0 && self.recursive_calls == 0
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Flow analysis
// ═══════════════════════════════════════════════════════════════════════════

pub struct LocksetFlow<'a> {
    program: &'a Program,
    index: &'a IrIndex,
    profile: &'a DomainProfile,
    max_call_depth: usize,
}

/// Stabilized per-block states of one procedure fixpoint.
struct BlockStates {
    entry: Vec<Option<Lockset>>,
    exit: Vec<Option<Lockset>>,
}

/// Collector for the recording pass.
struct Recorder {
    entry_point: String,
    accesses: Vec<AccessSite>,
    diagnostics: Vec<LocksetDiagnostic>,
    opaque_calls: usize,
    recursive_calls: usize,
    seen_releases: FxHashSet<(String, Span, String)>,
    seen_recursion: FxHashSet<String>,
}

impl Recorder {
    fn new(entry_point: &str) -> Self {
        Self {
            entry_point: entry_point.to_string(),
            accesses: Vec::new(),
            diagnostics: Vec::new(),
            opaque_calls: 0,
            recursive_calls: 0,
            seen_releases: FxHashSet::default(),
            seen_recursion: FxHashSet::default(),
        }
    }
}

impl<'a> LocksetFlow<'a> {
    pub fn new(
        program: &'a Program,
        index: &'a IrIndex,
        profile: &'a DomainProfile,
        max_call_depth: usize,
    ) -> Self {
        Self {
            program,
            index,
            profile,
            max_call_depth,
        }
    }

    /// Run the full analysis for one entry point.
    pub fn analyze(
        &self,
        entry_point: &str,
        registry: &mut LocksetRegistry,
    ) -> Result<FlowOutcome> {
        let proc = self
            .index
            .procedure(self.program, entry_point)
            .ok_or_else(|| LocksetError::UnknownProcedure(entry_point.to_string()))?;

        // Step 1: fixpoint on the entry point body.
        let mut stack = vec![entry_point.to_string()];
        let states = self.fixpoint(proc, Lockset::empty(), registry, 0, &mut stack)?;

        // Step 2: recording pass over the stabilized states.
        let mut recorder = Recorder::new(entry_point);
        self.record(proc, &states, registry, 0, &mut stack, &mut recorder)?;

        // Step 3: exit lockset and held-at-exit diagnostic.
        let exit_lockset = exit_state(proc, &states).unwrap_or_else(Lockset::empty);
        if !exit_lockset.is_empty() {
            recorder.diagnostics.push(LocksetDiagnostic::HeldAtExit {
                entry_point: entry_point.to_string(),
                locks: registry.lock_names(&exit_lockset),
            });
        }

        // Step 4: the registry's current lockset becomes the merged exit
        // state, as if every exit path joined.
        let exit_outs: Vec<&Lockset> = proc
            .blocks
            .iter()
            .enumerate()
            .filter(|(_, b)| b.is_exit())
            .filter_map(|(i, _)| states.exit[i].as_ref())
            .collect();
        if exit_outs.is_empty() {
            registry.merge_current(entry_point, [&exit_lockset]);
        } else {
            registry.merge_current(entry_point, exit_outs);
        }

        let block_entry = proc
            .blocks
            .iter()
            .enumerate()
            .filter_map(|(i, b)| {
                states.entry[i]
                    .as_ref()
                    .map(|s| (b.label.clone(), s.clone()))
            })
            .collect();

        debug!(
            entry_point,
            accesses = recorder.accesses.len(),
            opaque = recorder.opaque_calls,
            "flow analysis finished"
        );

        Ok(FlowOutcome {
            entry_point: entry_point.to_string(),
            accesses: recorder.accesses,
            exit_lockset,
            diagnostics: recorder.diagnostics,
            opaque_calls: recorder.opaque_calls,
            recursive_calls: recorder.recursive_calls,
            block_entry,
        })
    }

    // ─────────────────────────── fixpoint ───────────────────────────

    fn fixpoint(
        &self,
        proc: &Procedure,
        entry_state: Lockset,
        registry: &mut LocksetRegistry,
        depth: usize,
        stack: &mut Vec<String>,
    ) -> Result<BlockStates> {
        if proc.blocks.is_empty() {
            return Err(LocksetError::EmptyProcedure(proc.name.clone()));
        }

        let label_index = label_index(proc)?;
        let preds = predecessors(proc, &label_index);

        let mut states = BlockStates {
            entry: vec![None; proc.blocks.len()],
            exit: vec![None; proc.blocks.len()],
        };

        let mut worklist: VecDeque<usize> = VecDeque::new();
        worklist.push_back(0);
        let mut queued = vec![false; proc.blocks.len()];
        queued[0] = true;

        while let Some(i) = worklist.pop_front() {
            queued[i] = false;

            // Meet over predecessors; the procedure entry contributes ∅.
            let mut incoming: Option<Lockset> = if i == 0 {
                Some(entry_state.clone())
            } else {
                None
            };
            for &p in preds.get(&i).map(Vec::as_slice).unwrap_or(&[]) {
                if let Some(out) = &states.exit[p] {
                    incoming = Some(match incoming {
                        Some(acc) => acc.intersect(out),
                        None => out.clone(),
                    });
                }
            }
            let Some(state_in) = incoming else {
                // No predecessor visited yet; a later out-state change
                // re-queues this block.
                continue;
            };

            let state_out =
                self.transfer_block(&proc.blocks[i], &state_in, registry, depth, stack, None)?;

            #[cfg(feature = "trace")]
            tracing::trace!(
                procedure = proc.name.as_str(),
                block = proc.blocks[i].label.as_str(),
                "block transferred"
            );

            let entry_changed = states.entry[i].as_ref() != Some(&state_in);
            let exit_changed = states.exit[i].as_ref() != Some(&state_out);
            states.entry[i] = Some(state_in);
            if exit_changed {
                states.exit[i] = Some(state_out);
                for succ in &proc.blocks[i].successors {
                    let j = label_index[succ.as_str()];
                    if !queued[j] {
                        queued[j] = true;
                        worklist.push_back(j);
                    }
                }
            } else if entry_changed {
                states.exit[i] = Some(state_out);
            }
        }

        Ok(states)
    }

    /// Replay the stabilized states once, collecting accesses and
    /// diagnostics.
    fn record(
        &self,
        proc: &Procedure,
        states: &BlockStates,
        registry: &mut LocksetRegistry,
        depth: usize,
        stack: &mut Vec<String>,
        recorder: &mut Recorder,
    ) -> Result<()> {
        for (i, block) in proc.blocks.iter().enumerate() {
            let Some(state_in) = states.entry[i].clone() else {
                continue; // unreachable block
            };
            self.transfer_block(block, &state_in, registry, depth, stack, Some(recorder))?;
        }
        Ok(())
    }

    // ─────────────────────────── transfer ───────────────────────────

    fn transfer_block(
        &self,
        block: &BasicBlock,
        state_in: &Lockset,
        registry: &mut LocksetRegistry,
        depth: usize,
        stack: &mut Vec<String>,
        mut recorder: Option<&mut Recorder>,
    ) -> Result<Lockset> {
        let proc_name = stack.last().cloned().unwrap_or_default();
        let mut state = state_in.clone();
        for instruction in &block.instructions {
            match instruction {
                Instruction::Call { callee, args, span } => {
                    state = self.apply_call(
                        callee,
                        args,
                        *span,
                        state,
                        registry,
                        depth,
                        stack,
                        recorder.as_deref_mut(),
                        &proc_name,
                    )?;
                }
                Instruction::Load { location, span, .. } => {
                    if let Some(rec) = recorder.as_deref_mut() {
                        rec.accesses.push(AccessSite {
                            location: location.clone(),
                            mode: crate::shared::models::AccessMode::Read,
                            held: state.clone(),
                            procedure: proc_name.clone(),
                            span: *span,
                        });
                    }
                }
                Instruction::Store { location, span, .. } => {
                    if let Some(rec) = recorder.as_deref_mut() {
                        rec.accesses.push(AccessSite {
                            location: location.clone(),
                            mode: crate::shared::models::AccessMode::Write,
                            held: state.clone(),
                            procedure: proc_name.clone(),
                            span: *span,
                        });
                    }
                }
                // Local data flow and previously synthesized bookkeeping
                // are invisible to the lockset walk.
                Instruction::Assign { .. }
                | Instruction::LogAccess { .. }
                | Instruction::AssertRaceFree { .. } => {}
            }
        }
        Ok(state)
    }

    #[allow(clippy::too_many_arguments)]
    fn apply_call(
        &self,
        callee: &str,
        args: &[Operand],
        span: Span,
        mut state: Lockset,
        registry: &mut LocksetRegistry,
        depth: usize,
        stack: &mut Vec<String>,
        mut recorder: Option<&mut Recorder>,
        proc_name: &str,
    ) -> Result<Lockset> {
        if self.profile.is_acquire(callee) {
            match lock_operand(args) {
                Some(lock_name) => {
                    let id = registry.declare_lock(lock_name, span);
                    state.insert(id);
                }
                // An acquire whose lock the IR does not name cannot be
                // tracked.
                None => {
                    if let Some(rec) = recorder {
                        rec.opaque_calls += 1;
                    }
                }
            }
            return Ok(state);
        }

        if self.profile.is_release(callee) {
            match lock_operand(args) {
                Some(lock_name) => {
                    let id = registry.declare_lock(lock_name, span);
                    let was_held = state.remove(id);
                    if !was_held {
                        if let Some(rec) = recorder {
                            let key = (proc_name.to_string(), span, lock_name.to_string());
                            if rec.seen_releases.insert(key) {
                                rec.diagnostics.push(
                                    LocksetDiagnostic::ReleaseWithoutAcquire {
                                        entry_point: rec.entry_point.clone(),
                                        lock: lock_name.to_string(),
                                        procedure: proc_name.to_string(),
                                        span,
                                    },
                                );
                            }
                        }
                    }
                }
                None => {
                    if let Some(rec) = recorder {
                        rec.opaque_calls += 1;
                    }
                }
            }
            return Ok(state);
        }

        // Other profile-classified calls (device registration) affect roles,
        // not locksets.
        if self.profile.classifies(callee) {
            return Ok(state);
        }

        if self.index.has_procedure(callee) {
            if stack.iter().any(|f| f == callee) {
                if let Some(rec) = recorder {
                    rec.recursive_calls += 1;
                    if rec.seen_recursion.insert(callee.to_string()) {
                        rec.diagnostics.push(LocksetDiagnostic::RecursiveCall {
                            entry_point: rec.entry_point.clone(),
                            procedure: callee.to_string(),
                        });
                    }
                }
                return Ok(state);
            }
            if depth + 1 > self.max_call_depth {
                if let Some(rec) = recorder {
                    rec.opaque_calls += 1;
                }
                return Ok(state);
            }

            let callee_proc = self
                .index
                .procedure(self.program, callee)
                .ok_or_else(|| LocksetError::UnknownProcedure(callee.to_string()))?;

            stack.push(callee.to_string());
            let callee_states =
                self.fixpoint(callee_proc, state.clone(), registry, depth + 1, stack)?;
            if let Some(rec) = recorder.as_deref_mut() {
                self.record(callee_proc, &callee_states, registry, depth + 1, stack, rec)?;
            }
            let exit = exit_state(callee_proc, &callee_states).unwrap_or(state);
            stack.pop();
            return Ok(exit);
        }

        // Externally defined and unclassified: the call is opaque.
        if let Some(rec) = recorder {
            rec.opaque_calls += 1;
        }
        Ok(state)
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// CFG helpers
// ═══════════════════════════════════════════════════════════════════════════

fn label_index(proc: &Procedure) -> Result<FxHashMap<&str, usize>> {
    let map: FxHashMap<&str, usize> = proc
        .blocks
        .iter()
        .enumerate()
        .map(|(i, b)| (b.label.as_str(), i))
        .collect();
    for block in &proc.blocks {
        for succ in &block.successors {
            if !map.contains_key(succ.as_str()) {
                return Err(LocksetError::UnknownBlock {
                    procedure: proc.name.clone(),
                    label: succ.clone(),
                });
            }
        }
    }
    Ok(map)
}

fn predecessors(
    proc: &Procedure,
    label_index: &FxHashMap<&str, usize>,
) -> FxHashMap<usize, Vec<usize>> {
    let mut preds: FxHashMap<usize, Vec<usize>> = FxHashMap::default();
    for (i, block) in proc.blocks.iter().enumerate() {
        for succ in &block.successors {
            preds.entry(label_index[succ.as_str()]).or_default().push(i);
        }
    }
    preds
}

/// Intersection over the out-states of all reachable exit blocks.
fn exit_state(proc: &Procedure, states: &BlockStates) -> Option<Lockset> {
    let outs: Vec<&Lockset> = proc
        .blocks
        .iter()
        .enumerate()
        .filter(|(_, b)| b.is_exit())
        .filter_map(|(i, _)| states.exit[i].as_ref())
        .collect();
    if outs.is_empty() {
        None
    } else {
        Some(Lockset::intersect_all(outs))
    }
}

/// First identifier operand names the lock.
fn lock_operand(args: &[Operand]) -> Option<&str> {
    args.iter().find_map(|a| match a {
        Operand::Var(name) => Some(name.as_str()),
        Operand::Literal(_) => None,
    })
}

// ═══════════════════════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::models::{
        AccessMode, AttributeSet, BasicBlock, Instruction, Operand, Procedure, Program, Variable,
        ATTR_ENTRY_POINT, ATTR_LOCK,
    };

    fn call(callee: &str, lock: &str) -> Instruction {
        Instruction::Call {
            callee: callee.into(),
            args: vec![Operand::Var(lock.into())],
            span: Span::zero(),
        }
    }

    fn store(location: &str) -> Instruction {
        Instruction::Store {
            location: location.into(),
            value: Operand::Literal(1),
            span: Span::zero(),
        }
    }

    fn load(location: &str) -> Instruction {
        Instruction::Load {
            dest: "tmp".into(),
            location: location.into(),
            span: Span::zero(),
        }
    }

    fn block(label: &str, instructions: Vec<Instruction>, successors: &[&str]) -> BasicBlock {
        BasicBlock {
            label: label.into(),
            instructions,
            successors: successors.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn entry_point(name: &str, blocks: Vec<BasicBlock>) -> Procedure {
        Procedure {
            name: name.into(),
            params: vec![],
            attributes: AttributeSet::new().with_flag(ATTR_ENTRY_POINT),
            blocks,
            span: Span::zero(),
        }
    }

    fn helper(name: &str, blocks: Vec<BasicBlock>) -> Procedure {
        Procedure {
            name: name.into(),
            params: vec![],
            attributes: AttributeSet::new(),
            blocks,
            span: Span::zero(),
        }
    }

    fn make_program(procedures: Vec<Procedure>) -> Program {
        let mut program = Program::new("unit.c");
        program.variables.push(Variable {
            name: "dev_lock".into(),
            attributes: AttributeSet::new().with_flag(ATTR_LOCK),
            span: Span::zero(),
        });
        program.procedures = procedures;
        program
    }

    fn analyze(program: &Program, ep: &str) -> (FlowOutcome, LocksetRegistry) {
        let index = IrIndex::build(program).unwrap();
        let profile = DomainProfile::linux();
        let mut registry = LocksetRegistry::new();
        let flow = LocksetFlow::new(program, &index, &profile, 16);
        let outcome = flow.analyze(ep, &mut registry).unwrap();
        (outcome, registry)
    }

    #[test]
    fn test_straight_line_lock_store_unlock() {
        let program = make_program(vec![entry_point(
            "ioctl",
            vec![block(
                "entry",
                vec![
                    call("mutex_lock", "dev_lock"),
                    store("counter"),
                    call("mutex_unlock", "dev_lock"),
                ],
                &[],
            )],
        )]);
        let (outcome, registry) = analyze(&program, "ioctl");

        assert_eq!(outcome.accesses.len(), 1);
        let access = &outcome.accesses[0];
        assert_eq!(access.location, "counter");
        assert!(access.mode.is_write());
        let lock = registry.lock_named("dev_lock").unwrap().id;
        assert!(access.held.contains(lock));
        assert!(outcome.exit_lockset.is_empty());
        assert!(outcome.diagnostics.is_empty());
        assert!(outcome.is_precise());
    }

    #[test]
    fn test_join_intersects_path_locksets() {
        // entry branches; only the left path locks, so after the join the
        // access is unprotected.
        let program = make_program(vec![entry_point(
            "ioctl",
            vec![
                block("entry", vec![], &["locked", "bare"]),
                block("locked", vec![call("mutex_lock", "dev_lock")], &["join"]),
                block("bare", vec![], &["join"]),
                block("join", vec![store("counter")], &[]),
            ],
        )]);
        let (outcome, _) = analyze(&program, "ioctl");

        assert!(outcome.accesses[0].held.is_empty());
        assert!(outcome.block_entry["join"].is_empty());
        // The join already dropped the lock, so nothing is held at exit.
        assert!(outcome.exit_lockset.is_empty());
    }

    #[test]
    fn test_both_paths_locking_keeps_the_lock() {
        let program = make_program(vec![entry_point(
            "ioctl",
            vec![
                block("entry", vec![], &["left", "right"]),
                block("left", vec![call("mutex_lock", "dev_lock")], &["join"]),
                block("right", vec![call("mutex_lock", "dev_lock")], &["join"]),
                block(
                    "join",
                    vec![store("counter"), call("mutex_unlock", "dev_lock")],
                    &[],
                ),
            ],
        )]);
        let (outcome, registry) = analyze(&program, "ioctl");
        let lock = registry.lock_named("dev_lock").unwrap().id;
        assert!(outcome.accesses[0].held.contains(lock));
        assert!(outcome.exit_lockset.is_empty());
    }

    #[test]
    fn test_loop_fixpoint_terminates_with_empty_head_state() {
        // The loop head joins the unlocked entry path with the locked
        // back edge, so its state is ∅.
        let program = make_program(vec![entry_point(
            "poll",
            vec![
                block("entry", vec![], &["head"]),
                block("head", vec![load("status")], &["body", "done"]),
                block("body", vec![call("mutex_lock", "dev_lock")], &["head"]),
                block("done", vec![], &[]),
            ],
        )]);
        let (outcome, _) = analyze(&program, "poll");
        assert!(outcome.block_entry["head"].is_empty());
        assert_eq!(outcome.accesses[0].location, "status");
        assert!(outcome.accesses[0].held.is_empty());
    }

    #[test]
    fn test_release_without_acquire_is_diagnosed_not_fatal() {
        let program = make_program(vec![entry_point(
            "ioctl",
            vec![block(
                "entry",
                vec![call("mutex_unlock", "dev_lock"), store("counter")],
                &[],
            )],
        )]);
        let (outcome, _) = analyze(&program, "ioctl");

        assert_eq!(outcome.accesses.len(), 1);
        assert!(matches!(
            outcome.diagnostics.as_slice(),
            [LocksetDiagnostic::ReleaseWithoutAcquire { lock, .. }] if lock == "dev_lock"
        ));
    }

    #[test]
    fn test_lock_held_at_exit_is_diagnosed() {
        let program = make_program(vec![entry_point(
            "open",
            vec![block("entry", vec![call("mutex_lock", "dev_lock")], &[])],
        )]);
        let (outcome, _) = analyze(&program, "open");

        assert!(!outcome.exit_lockset.is_empty());
        assert!(outcome
            .diagnostics
            .iter()
            .any(|d| matches!(d, LocksetDiagnostic::HeldAtExit { locks, .. }
                if locks == &["dev_lock"])));
    }

    #[test]
    fn test_helper_descent_carries_caller_lockset() {
        let program = make_program(vec![
            entry_point(
                "ioctl",
                vec![block(
                    "entry",
                    vec![
                        call("mutex_lock", "dev_lock"),
                        Instruction::Call {
                            callee: "update_stats".into(),
                            args: vec![],
                            span: Span::zero(),
                        },
                        call("mutex_unlock", "dev_lock"),
                    ],
                    &[],
                )],
            ),
            helper("update_stats", vec![block("entry", vec![store("stats")], &[])]),
        ]);
        let (outcome, registry) = analyze(&program, "ioctl");

        let access = outcome
            .accesses
            .iter()
            .find(|a| a.location == "stats")
            .unwrap();
        let lock = registry.lock_named("dev_lock").unwrap().id;
        assert!(access.held.contains(lock));
        assert_eq!(access.procedure, "update_stats");
        assert!(outcome.is_precise());
    }

    #[test]
    fn test_helper_acquiring_lock_affects_caller_state() {
        let program = make_program(vec![
            entry_point(
                "ioctl",
                vec![block(
                    "entry",
                    vec![
                        Instruction::Call {
                            callee: "take_lock".into(),
                            args: vec![],
                            span: Span::zero(),
                        },
                        store("counter"),
                        call("mutex_unlock", "dev_lock"),
                    ],
                    &[],
                )],
            ),
            helper(
                "take_lock",
                vec![block("entry", vec![call("mutex_lock", "dev_lock")], &[])],
            ),
        ]);
        let (outcome, registry) = analyze(&program, "ioctl");
        let lock = registry.lock_named("dev_lock").unwrap().id;
        let access = outcome
            .accesses
            .iter()
            .find(|a| a.location == "counter")
            .unwrap();
        assert!(access.held.contains(lock));
        assert!(outcome.exit_lockset.is_empty());
        assert!(outcome.diagnostics.is_empty());
    }

    #[test]
    fn test_recursion_is_not_descended_and_poisons_precision() {
        let program = make_program(vec![
            entry_point(
                "ioctl",
                vec![block(
                    "entry",
                    vec![Instruction::Call {
                        callee: "walk".into(),
                        args: vec![],
                        span: Span::zero(),
                    }],
                    &[],
                )],
            ),
            helper(
                "walk",
                vec![block(
                    "entry",
                    vec![
                        store("chain"),
                        Instruction::Call {
                            callee: "walk".into(),
                            args: vec![],
                            span: Span::zero(),
                        },
                    ],
                    &[],
                )],
            ),
        ]);
        let (outcome, _) = analyze(&program, "ioctl");

        assert!(outcome.recursive_calls > 0);
        assert!(!outcome.is_precise());
        assert!(outcome
            .diagnostics
            .iter()
            .any(|d| matches!(d, LocksetDiagnostic::RecursiveCall { procedure, .. }
                if procedure == "walk")));
        // The body before the recursive call is still recorded.
        assert!(outcome.accesses.iter().any(|a| a.location == "chain"));
    }

    #[test]
    fn test_unknown_callee_is_opaque() {
        let program = make_program(vec![entry_point(
            "ioctl",
            vec![block(
                "entry",
                vec![
                    Instruction::Call {
                        callee: "firmware_blob_op".into(),
                        args: vec![],
                        span: Span::zero(),
                    },
                    store("counter"),
                ],
                &[],
            )],
        )]);
        let (outcome, _) = analyze(&program, "ioctl");
        assert_eq!(outcome.opaque_calls, 1);
        assert!(!outcome.is_precise());
    }

    #[test]
    fn test_unknown_entry_point_is_an_error() {
        let program = make_program(vec![]);
        let index = IrIndex::build(&program).unwrap();
        let profile = DomainProfile::linux();
        let mut registry = LocksetRegistry::new();
        let flow = LocksetFlow::new(&program, &index, &profile, 16);
        assert!(matches!(
            flow.analyze("missing", &mut registry),
            Err(LocksetError::UnknownProcedure(name)) if name == "missing"
        ));
    }

    #[test]
    fn test_dangling_successor_label_is_an_error() {
        let program = make_program(vec![entry_point(
            "ioctl",
            vec![block("entry", vec![], &["nowhere"])],
        )]);
        let index = IrIndex::build(&program).unwrap();
        let profile = DomainProfile::linux();
        let mut registry = LocksetRegistry::new();
        let flow = LocksetFlow::new(&program, &index, &profile, 16);
        assert!(matches!(
            flow.analyze("ioctl", &mut registry),
            Err(LocksetError::UnknownBlock { label, .. }) if label == "nowhere"
        ));
    }

    #[test]
    fn test_reads_and_writes_are_distinguished() {
        let program = make_program(vec![entry_point(
            "read",
            vec![block(
                "entry",
                vec![load("buffer"), store("offset")],
                &[],
            )],
        )]);
        let (outcome, _) = analyze(&program, "read");
        assert_eq!(outcome.accesses[0].mode, AccessMode::Read);
        assert_eq!(outcome.accesses[1].mode, AccessMode::Write);
    }
}
