//! Entry point infrastructure

pub mod catalogue;
pub mod error;

pub use catalogue::*;
pub use error::*;
