//! Shared module - Common types and utilities
//!
//! This module contains types that are shared across all features:
//! the analysis IR, source spans and the attribute vocabulary.

pub mod models;

// Re-exports for convenience
pub use models::*;
