pub mod builder;
pub mod cache;

pub use builder::*;
pub use cache::*;
