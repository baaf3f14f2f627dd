/// Verification Feature
///
/// Discharging race assertions into verdicts and reports.
///
/// ## Architecture
/// - **Domain**: `AssertionVerdict`, `RaceReport`
/// - **Ports**: `RaceVerifier`
/// - **Infrastructure**: `LocksetVerifier`, parallel `verify_all`
pub mod domain;
pub mod infrastructure;
pub mod ports;

pub use domain::*;
pub use infrastructure::*;
pub use ports::*;
