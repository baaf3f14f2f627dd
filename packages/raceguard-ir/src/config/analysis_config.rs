//! Analysis configuration

use super::error::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};

pub const MIN_CALL_DEPTH: usize = 1;
pub const MAX_CALL_DEPTH: usize = 64;

/// Knobs of a single analysis run. All fields have serde defaults so a
/// partial YAML/JSON document configures only what it names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Restrict flow analysis and instrumentation to one entry point.
    pub analyse_only: Option<String>,
    /// Omit verified (race-free) assertions from the reports.
    pub skip_race_free_pairs: bool,
    /// Mark entry points with at most this many call sites as inlined;
    /// 0 disables auto-inlining.
    pub inline_bound: usize,
    /// Bound on nested helper descent during the flow analysis.
    pub max_call_depth: usize,
    /// Log every pair-checking region as it is built.
    pub print_pairs: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            analyse_only: None,
            skip_race_free_pairs: false,
            inline_bound: 0,
            max_call_depth: 16,
            print_pairs: false,
        }
    }
}

impl AnalysisConfig {
    pub fn validate(&self) -> ConfigResult<()> {
        if !(MIN_CALL_DEPTH..=MAX_CALL_DEPTH).contains(&self.max_call_depth) {
            return Err(ConfigError::range_with_hint(
                "max_call_depth",
                self.max_call_depth,
                MIN_CALL_DEPTH,
                MAX_CALL_DEPTH,
                "Helper descent needs at least one level; very deep bounds \
                 only slow the fixpoint down",
            ));
        }
        Ok(())
    }
}
