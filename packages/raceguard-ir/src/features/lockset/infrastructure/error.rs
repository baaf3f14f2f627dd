//! Lockset analysis errors

use thiserror::Error;

/// Errors of the lockset flow analysis. These mean malformed input, not
/// locking bugs; locking bugs surface as `LocksetDiagnostic`s.
#[derive(Debug, Error)]
pub enum LocksetError {
    #[error("Unknown procedure: {0}")]
    UnknownProcedure(String),

    #[error("Procedure '{0}' has no blocks")]
    EmptyProcedure(String),

    #[error("Procedure '{procedure}' references unknown block label '{label}'")]
    UnknownBlock { procedure: String, label: String },
}

pub type Result<T> = std::result::Result<T, LocksetError>;
