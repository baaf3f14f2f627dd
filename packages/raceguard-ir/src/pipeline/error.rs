//! Pipeline errors

use crate::config::ConfigError;
use crate::features::entry_points::CatalogueError;
use crate::features::instrumentation::InstrumentationError;
use crate::features::lockset::LocksetError;
use crate::shared::IndexError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Index(#[from] IndexError),

    #[error(transparent)]
    Catalogue(#[from] CatalogueError),

    #[error(transparent)]
    Flow(#[from] LocksetError),

    #[error(transparent)]
    Instrumentation(#[from] InstrumentationError),

    /// Entry point names are the session-wide pairing key, so two units
    /// must never declare the same one.
    #[error(
        "entry point '{entry_point}' is declared in both '{first_unit}' and '{second_unit}'"
    )]
    DuplicateEntryPoint {
        entry_point: String,
        first_unit: String,
        second_unit: String,
    },
}

pub type Result<T> = std::result::Result<T, PipelineError>;
