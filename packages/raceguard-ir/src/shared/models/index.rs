//! Typed IR index
//!
//! One ingestion walk over a unit sorts procedures and variables into typed
//! buckets (entry points, tagged helpers, checkers, lock variables, the
//! analyzer-owned bookkeeping classes). Every later phase consults the index
//! instead of re-scanning attributes.

use super::naming;
use super::program::{Procedure, Program, Variable};
use rustc_hash::{FxHashMap, FxHashSet};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IndexError {
    #[error("duplicate procedure '{0}' in unit")]
    DuplicateProcedure(String),
    #[error("duplicate variable '{0}' in unit")]
    DuplicateVariable(String),
}

#[derive(Debug, Default)]
pub struct IrIndex {
    procedures: FxHashMap<String, usize>,
    variables: FxHashMap<String, usize>,
    entry_points: Vec<String>,
    helpers_by_tag: FxHashMap<String, Vec<String>>,
    checkers: Vec<String>,
    lock_variables: Vec<String>,
    current_lockset_variables: Vec<String>,
    memory_lockset_variables: Vec<String>,
    write_access_variables: Vec<String>,
    read_access_variables: Vec<String>,
    watchdog_constants: Vec<String>,
    domain_specific_variables: Vec<String>,
    analyzer_owned: FxHashSet<String>,
}

impl IrIndex {
    pub fn build(program: &Program) -> Result<Self, IndexError> {
        let mut index = Self::default();

        for (i, proc) in program.procedures.iter().enumerate() {
            if index.procedures.insert(proc.name.clone(), i).is_some() {
                return Err(IndexError::DuplicateProcedure(proc.name.clone()));
            }
            if proc.attributes.is_entry_point() {
                index.entry_points.push(proc.name.clone());
            }
            if let Some(tag) = proc.attributes.helper_tag() {
                index
                    .helpers_by_tag
                    .entry(tag.to_string())
                    .or_default()
                    .push(proc.name.clone());
            }
            if proc.attributes.is_checker() {
                index.checkers.push(proc.name.clone());
            }
        }

        for (i, var) in program.variables.iter().enumerate() {
            if index.variables.insert(var.name.clone(), i).is_some() {
                return Err(IndexError::DuplicateVariable(var.name.clone()));
            }
            let attrs = &var.attributes;
            if attrs.is_lock() {
                index.lock_variables.push(var.name.clone());
            }
            if attrs.is_current_lockset() {
                index.current_lockset_variables.push(var.name.clone());
            }
            if attrs.is_memory_lockset() {
                index.memory_lockset_variables.push(var.name.clone());
            }
            if attrs.is_access_checking() {
                if naming::is_write_access_variable(&var.name) {
                    index.write_access_variables.push(var.name.clone());
                } else if naming::is_read_access_variable(&var.name) {
                    index.read_access_variables.push(var.name.clone());
                }
            }
            if attrs.is_watchdog() {
                index.watchdog_constants.push(var.name.clone());
            }
            if attrs.is_domain_specific() {
                index.domain_specific_variables.push(var.name.clone());
            }
            if attrs.is_analyzer_owned() {
                index.analyzer_owned.insert(var.name.clone());
            }
        }

        Ok(index)
    }

    pub fn procedure<'p>(&self, program: &'p Program, name: &str) -> Option<&'p Procedure> {
        self.procedures.get(name).map(|&i| &program.procedures[i])
    }

    pub fn variable<'p>(&self, program: &'p Program, name: &str) -> Option<&'p Variable> {
        self.variables.get(name).map(|&i| &program.variables[i])
    }

    pub fn has_procedure(&self, name: &str) -> bool {
        self.procedures.contains_key(name)
    }

    pub fn entry_points(&self) -> &[String] {
        &self.entry_points
    }

    /// Helpers tagged as belonging to the named entry point's call tree.
    pub fn helpers_of(&self, entry_point: &str) -> &[String] {
        self.helpers_by_tag
            .get(entry_point)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Procedures counting toward entry-point analysis for `name`: every
    /// entry point in the unit plus the helpers tagged with `name`.
    pub fn count_related(&self, name: &str) -> usize {
        self.entry_points.len() + self.helpers_of(name).len()
    }

    pub fn checkers(&self) -> &[String] {
        &self.checkers
    }

    pub fn lock_variables(&self) -> &[String] {
        &self.lock_variables
    }

    pub fn current_lockset_variables(&self) -> &[String] {
        &self.current_lockset_variables
    }

    pub fn memory_lockset_variables(&self) -> &[String] {
        &self.memory_lockset_variables
    }

    pub fn write_access_variables(&self) -> &[String] {
        &self.write_access_variables
    }

    pub fn read_access_variables(&self) -> &[String] {
        &self.read_access_variables
    }

    pub fn watchdog_constants(&self) -> &[String] {
        &self.watchdog_constants
    }

    pub fn domain_specific_variables(&self) -> &[String] {
        &self.domain_specific_variables
    }

    /// Bookkeeping state owned by the analyzer; never driver shared state.
    pub fn is_analyzer_owned(&self, variable: &str) -> bool {
        self.analyzer_owned.contains(variable)
    }
}
