//! Instrumentation errors

use thiserror::Error;

#[derive(Debug, Error)]
pub enum InstrumentationError {
    /// A racing entry point has no flow outcome. The pipeline runs the
    /// lockset flow before instrumentation, so this is an internal bug.
    #[error("no flow outcome for entry point '{0}'")]
    MissingFlow(String),

    #[error("entry point '{0}' has no body in the program")]
    MissingProcedure(String),
}

pub type Result<T> = std::result::Result<T, InstrumentationError>;
