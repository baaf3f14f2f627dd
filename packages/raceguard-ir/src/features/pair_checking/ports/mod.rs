pub mod concurrency_policy;

pub use concurrency_policy::*;
