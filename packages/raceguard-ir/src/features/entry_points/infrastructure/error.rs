//! Catalogue errors

use thiserror::Error;

/// Fatal cataloguing failures. Analysis never starts on a unit that trips
/// one of these.
#[derive(Debug, Error)]
pub enum CatalogueError {
    #[error("No entry points found in unit '{0}'")]
    NoEntryPoints(String),

    #[error("Procedure '{0}' is tagged both as an entry point and as a helper")]
    AmbiguousTagging(String),

    #[error("Helper '{procedure}' is tagged to unknown entry point '{tag}'")]
    DanglingTag { procedure: String, tag: String },
}

pub type Result<T> = std::result::Result<T, CatalogueError>;
