//! Lockset infrastructure

pub mod error;
pub mod flow;
pub mod registry;

pub use error::*;
pub use flow::*;
pub use registry::*;
