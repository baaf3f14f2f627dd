//! Pipeline orchestration
//!
//! The session owns all mutable analysis state; the engine drives the
//! staged pipeline over it and produces an `AnalysisRun`.

pub mod context;
pub mod engine;
pub mod error;
pub mod result;
pub mod session;

pub use context::AnalysisContext;
pub use engine::StaticLocksetAnalysis;
pub use error::{PipelineError, Result as PipelineResult};
pub use result::{AnalysisRun, Outcome, RunStats};
pub use session::AnalysisSession;
