//! Error types for raceguard-ir
//!
//! Unified error handling across the crate. Feature modules keep their
//! own error enums; this is the surface the binary and library callers
//! see.

use crate::config::ConfigError;
use crate::pipeline::PipelineError;
use thiserror::Error;

/// Main error type for raceguard operations
#[derive(Debug, Error)]
pub enum RaceguardError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed program input
    #[error("parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Analysis pipeline error
    #[error("analysis error: {0}")]
    Analysis(#[from] PipelineError),

    /// Usage error with a fixed message, reported verbatim
    #[error("{0}")]
    Fatal(String),
}

impl RaceguardError {
    pub fn fatal(msg: impl Into<String>) -> Self {
        RaceguardError::Fatal(msg.into())
    }
}

/// Result type alias for raceguard operations
pub type Result<T> = std::result::Result<T, RaceguardError>;
