//! # Shared State Feature
//!
//! Cross-entry-point classification of memory locations.
//!
//! ## Architecture
//!
//! - `domain/`: shared location model
//! - `infrastructure/`: the analyser that narrows memory locksets and
//!   derives race candidates and racing entry points

pub mod domain;
pub mod infrastructure;

pub use domain::*;
pub use infrastructure::*;
