/// Entry Point Feature
///
/// Cataloguing of concurrently-invokable driver entry points.
///
/// ## Architecture
/// - **Domain**: `EntryPoint`, `DeviceRole`, `EntryPointStage`
/// - **Infrastructure**: `EntryPointCatalogue` (tag validation, petgraph
///   call graph, Tarjan SCC recursion report, role classification)
pub mod domain;
pub mod infrastructure;

pub use domain::*;
pub use infrastructure::*;
