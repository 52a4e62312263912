use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::core::domain::{CellCount, GridConfig, Plane};
use crate::core::error::Result;
use crate::core::neighbors::NeighborMap;
use crate::engine::search::NeighborSearch;

pub mod brute;
pub mod cim;

pub use brute::BruteForce;
pub use cim::CellIndexMethod;

/// How the grid search schedules its work. Both modes return identical maps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Execution {
    #[default]
    Sequential,
    /// Membership and stencil passes on the rayon pool, per-particle append shards.
    Parallel,
}

/// Grid-based neighbor map for `plane`.
///
/// Fails with a configuration error (and computes nothing) when the cell count
/// exceeds `ceil(side_length / interaction_radius)` or the radius is not positive.
pub fn build_neighbor_map(
    plane: &Plane,
    interaction_radius: f64,
    cell_count: CellCount,
    periodic: bool,
) -> Result<NeighborMap> {
    let config = GridConfig::new(cell_count, interaction_radius, periodic)?;
    let cim = CellIndexMethod::new(Arc::new(plane.clone()), config)?;
    Ok(cim.execute())
}

/// Brute-force neighbor map for `plane`; the correctness oracle for `build_neighbor_map`.
pub fn brute_force_neighbor_map(
    plane: &Plane,
    interaction_radius: f64,
    periodic: bool,
) -> Result<NeighborMap> {
    let brute = BruteForce::new(Arc::new(plane.clone()), interaction_radius, periodic)?;
    Ok(brute.execute())
}
