//! Entry point catalogue
//!
//! Scans a unit once and produces the set of entry points with their device
//! roles and call-site counts, backed by a petgraph call graph over the
//! unit-local procedures.
//!
//! ## Algorithm
//! 1. Validate tagging: a procedure cannot be both an entry point and a
//!    tagged helper, and every tag must name a cataloged entry point.
//! 2. Build the call graph (one node per procedure, one edge per call to a
//!    unit-local procedure).
//! 3. Tarjan SCC over the graph yields the recursive components the flow
//!    analysis will refuse to descend into.
//! 4. BFS from each entry point classifies its device role from the
//!    registration calls it can reach and counts its local call sites.

use super::error::{CatalogueError, Result};
use crate::config::DomainProfile;
use crate::features::entry_points::domain::{DeviceRole, EntryPoint};
use crate::shared::models::{Instruction, IrIndex, Program};
use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::Bfs;
use rustc_hash::FxHashMap;
use tracing::debug;

#[derive(Debug)]
pub struct EntryPointCatalogue {
    entry_points: Vec<EntryPoint>,
    by_name: FxHashMap<String, usize>,
    helpers_by_tag: FxHashMap<String, Vec<String>>,
    /// Strongly connected components with a cycle (self-loops included).
    recursive_components: Vec<Vec<String>>,
}

impl EntryPointCatalogue {
    pub fn collect(program: &Program, index: &IrIndex, profile: &DomainProfile) -> Result<Self> {
        // Step 1: tagging validation.
        for proc in &program.procedures {
            if proc.attributes.is_entry_point() && proc.attributes.helper_tag().is_some() {
                return Err(CatalogueError::AmbiguousTagging(proc.name.clone()));
            }
            if let Some(tag) = proc.attributes.helper_tag() {
                if !index.entry_points().iter().any(|ep| ep == tag) {
                    return Err(CatalogueError::DanglingTag {
                        procedure: proc.name.clone(),
                        tag: tag.to_string(),
                    });
                }
            }
        }
        if index.entry_points().is_empty() {
            return Err(CatalogueError::NoEntryPoints(program.unit.clone()));
        }

        // Step 2: call graph over unit-local procedures.
        let mut graph: DiGraph<String, ()> = DiGraph::new();
        let mut nodes: FxHashMap<&str, NodeIndex> = FxHashMap::default();
        for proc in &program.procedures {
            let idx = graph.add_node(proc.name.clone());
            nodes.insert(proc.name.as_str(), idx);
        }
        for proc in &program.procedures {
            let from = nodes[proc.name.as_str()];
            for block in &proc.blocks {
                for instruction in &block.instructions {
                    if let Instruction::Call { callee, .. } = instruction {
                        if let Some(&to) = nodes.get(callee.as_str()) {
                            graph.add_edge(from, to, ());
                        }
                    }
                }
            }
        }

        // Step 3: recursive components.
        let mut recursive_components = Vec::new();
        for component in tarjan_scc(&graph) {
            let cyclic = component.len() > 1
                || graph
                    .find_edge(component[0], component[0])
                    .is_some();
            if cyclic {
                recursive_components
                    .push(component.iter().map(|&n| graph[n].clone()).collect());
            }
        }

        // Step 4: role classification and call-site counts per entry point.
        let mut entry_points = Vec::new();
        let mut by_name = FxHashMap::default();
        for name in index.entry_points() {
            let proc = index
                .procedure(program, name)
                .expect("cataloged entry point exists in the unit");
            let mut ep = EntryPoint::new(name, proc.span);

            let mut registers = false;
            let mut unregisters = false;
            let mut call_sites = 0usize;
            let mut bfs = Bfs::new(&graph, nodes[name.as_str()]);
            while let Some(node) = bfs.next(&graph) {
                let reached = index
                    .procedure(program, &graph[node])
                    .expect("call graph node names a unit procedure");
                for block in &reached.blocks {
                    for instruction in &block.instructions {
                        if let Instruction::Call { callee, .. } = instruction {
                            if nodes.contains_key(callee.as_str()) {
                                call_sites += 1;
                            }
                            registers |= profile.is_register(callee);
                            unregisters |= profile.is_unregister(callee);
                        }
                    }
                }
            }
            // Registration wins when a routine does both.
            ep.role = if registers {
                DeviceRole::Registers
            } else if unregisters {
                DeviceRole::Unregisters
            } else {
                DeviceRole::Ordinary
            };
            ep.call_sites = call_sites;

            debug!(entry_point = name.as_str(), role = %ep.role, call_sites, "cataloged");
            by_name.insert(name.clone(), entry_points.len());
            entry_points.push(ep);
        }

        let helpers_by_tag = index
            .entry_points()
            .iter()
            .map(|ep| (ep.clone(), index.helpers_of(ep).to_vec()))
            .collect();

        Ok(Self {
            entry_points,
            by_name,
            helpers_by_tag,
            recursive_components,
        })
    }

    pub fn entry_points(&self) -> &[EntryPoint] {
        &self.entry_points
    }

    pub fn get(&self, name: &str) -> Option<&EntryPoint> {
        self.by_name.get(name).map(|&i| &self.entry_points[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// Helpers tagged as belonging to the named entry point's call tree.
    pub fn helpers_of(&self, name: &str) -> &[String] {
        self.helpers_by_tag
            .get(name)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Procedures counting toward entry-point analysis for `name`: every
    /// entry point plus the helpers tagged with `name`.
    pub fn count_related(&self, name: &str) -> usize {
        self.entry_points.len() + self.helpers_of(name).len()
    }

    /// Mark an entry point inlined. Returns `true` only on the first call;
    /// repeats are no-ops.
    pub fn inline(&mut self, name: &str) -> bool {
        match self.by_name.get(name) {
            Some(&i) if !self.entry_points[i].inlined => {
                self.entry_points[i].inlined = true;
                true
            }
            _ => false,
        }
    }

    pub fn recursive_components(&self) -> &[Vec<String>] {
        &self.recursive_components
    }

    pub fn is_recursive(&self, procedure: &str) -> bool {
        self.recursive_components
            .iter()
            .any(|c| c.iter().any(|p| p == procedure))
    }

    /// Rewind per-entry-point analysis marks, keeping identities.
    pub fn reset(&mut self) {
        for ep in &mut self.entry_points {
            ep.inlined = false;
        }
    }
}
