//! Feature modules. Each feature is a vertical slice:
//!
//! - `domain/`: pure models, no external dependencies
//! - `ports/`: trait seams for pluggable behavior
//! - `infrastructure/`: the analyses and passes themselves

pub mod entry_points;
pub mod instrumentation;
pub mod lockset;
pub mod pair_checking;
pub mod shared_state;
pub mod verification;
