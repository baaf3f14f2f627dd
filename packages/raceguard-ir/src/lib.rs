/*
 * Raceguard IR - Static Lockset Race Analysis Engine
 *
 * Feature-First Hexagonal Architecture:
 * - shared/      : IR models (Program, Procedure, Instruction, Span)
 * - features/    : Vertical slices (lockset → entry_points → shared_state
 *                  → instrumentation → pair_checking → verification)
 * - pipeline/    : Session, engine, run results
 * - config/      : Analysis options and lock API profiles
 *
 * The engine finds data races in concurrent device driver code: every
 * entry point starts with an empty lockset, joins intersect, and a shared
 * location written without one consistently held lock is a race.
 */

// Crate-level lint configuration
#![allow(clippy::collapsible_if)] // Readability over brevity
#![allow(clippy::new_without_default)] // Default impl not always needed
#![allow(clippy::unnecessary_map_or)] // map_or style for compatibility

// ═══════════════════════════════════════════════════════════════════════════
// Module Exports - Feature-First Architecture
// ═══════════════════════════════════════════════════════════════════════════

/// Shared IR models and the typed index
pub mod shared;

/// Feature modules (lockset flow → pairs → verdicts)
pub mod features;

/// Pipeline orchestration
pub mod pipeline;

/// Configuration system
pub mod config;

/// Error types
pub mod errors;

// ═══════════════════════════════════════════════════════════════════════════
// Re-exports for Public API
// ═══════════════════════════════════════════════════════════════════════════

pub use config::{AnalysisConfig, DomainProfile};
pub use errors::{RaceguardError, Result};
pub use features::verification::{AssertionVerdict, RaceReport};
pub use pipeline::{AnalysisRun, AnalysisSession, Outcome, StaticLocksetAnalysis};
pub use shared::Program;
