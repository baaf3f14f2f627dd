pub mod analyser;

pub use analyser::*;
