pub mod lockset_verifier;

pub use lockset_verifier::*;
