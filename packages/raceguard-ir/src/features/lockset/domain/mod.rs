//! Lockset domain models

pub mod diagnostics;
pub mod models;

pub use diagnostics::*;
pub use models::*;
