pub mod error;
pub mod pass;

pub use error::*;
pub use pass::*;
