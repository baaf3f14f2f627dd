//! # Pair Checking Feature
//!
//! Composition of racing entry point pairs into checkable regions.
//!
//! ## Architecture
//!
//! - `domain/`: `EntryPointPair`, `RaceAssertion`, `PairCheckingRegion`
//! - `ports/`: `ConcurrencyPolicy` (which pairs can interleave)
//! - `infrastructure/`: `PairRegionBuilder`, `PairRegionCache`

pub mod domain;
pub mod infrastructure;
pub mod ports;

pub use domain::*;
pub use infrastructure::*;
pub use ports::*;
