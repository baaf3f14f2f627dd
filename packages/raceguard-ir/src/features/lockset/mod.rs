/// Lockset Feature
///
/// Locks, the lockset lattice and the forward flow analysis.
///
/// ## Architecture
/// - **Domain**: `Lock`, `Lockset` (finite set or `Top`), `AccessSite`,
///   `LocksetDiagnostic`
/// - **Infrastructure**: `LocksetRegistry` (current + memory locksets),
///   `LocksetFlow` (worklist fixpoint with meet = intersection)
///
/// ## Invariants
/// - Current locksets start empty and stay finite
/// - Memory locksets start at `Top` and only narrow
/// - Joins intersect, regardless of predecessor visitation order
pub mod domain;
pub mod infrastructure;

pub use domain::*;
pub use infrastructure::*;
