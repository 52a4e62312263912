use crate::core::domain::Plane;
use crate::core::neighbors::NeighborMap;

/// A generic interface for neighbor-search strategies.
/// Implementations own a validated configuration, so running one cannot fail.
/// They must be thread-safe (Sync) so a single instance can be shared across workers.
pub trait NeighborSearch: Send + Sync {
    /// Computes the full neighbor map for the configured plane.
    fn execute(&self) -> NeighborMap;

    /// The plane this search was configured for.
    fn plane(&self) -> &Plane;

    /// Returns the name of the strategy (e.g., "Cell Index Method").
    fn name(&self) -> &str;
}
