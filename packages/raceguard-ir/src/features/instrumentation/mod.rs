/// Instrumentation Feature
///
/// Access logging for racing entry points.
///
/// ## Architecture
/// - **Domain**: `WatchdogConstant`, `AccessCheckingVariable`,
///   `InstrumentationRegion`
/// - **Infrastructure**: `InstrumentationPass` (clones racing bodies with
///   `LogAccess` markers, synthesizes the access bookkeeping)
pub mod domain;
pub mod infrastructure;

pub use domain::*;
pub use infrastructure::*;
