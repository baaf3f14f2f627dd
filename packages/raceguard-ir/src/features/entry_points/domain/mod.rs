//! Entry point domain models

pub mod entry_point;

pub use entry_point::*;
