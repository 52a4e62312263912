use std::sync::Arc;
use std::time::Instant;

use log::{debug, info};

use crate::core::domain::{GridConfig, Plane};
use crate::core::error::Result;
use crate::core::neighbors::NeighborMap;
use crate::engine::aggregator;
use crate::engine::grid::{CellGrid, GridGeometry};
use crate::engine::search::NeighborSearch;
use crate::engine::stencil::HalfStencil;
use crate::solvers::Execution;

/// Cell Index Method over a single, validated plane + configuration.
///
/// All configuration errors surface from `new`; `execute` never fails.
pub struct CellIndexMethod {
    plane: Arc<Plane>,
    config: GridConfig,
    geometry: GridGeometry,
    execution: Execution,
}

impl CellIndexMethod {
    pub fn new(plane: Arc<Plane>, config: GridConfig) -> Result<Self> {
        let geometry = GridGeometry::new(&plane, &config)?;
        Ok(Self {
            plane,
            config,
            geometry,
            execution: Execution::Sequential,
        })
    }

    pub fn with_execution(mut self, execution: Execution) -> Self {
        self.execution = execution;
        self
    }

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    pub fn geometry(&self) -> &GridGeometry {
        &self.geometry
    }

    /// Builds the grid and returns it alongside the neighbor map, for diagnostics.
    pub fn execute_with_grid(&self) -> (CellGrid, NeighborMap) {
        let start = Instant::now();
        let stencil = HalfStencil::new(self.geometry.reach());
        let rc = self.geometry.interaction_radius();
        let period = self.geometry.period();

        let (grid, map) = match self.execution {
            Execution::Sequential => {
                let grid = CellGrid::build(&self.plane, self.geometry);
                let events = aggregator::collect_pair_events(&grid, &stencil);
                let candidates = aggregator::resolve_candidates(grid.particle_count(), &events);
                let map = aggregator::filter_candidates(&self.plane, &candidates, rc, period);
                (grid, map)
            }
            Execution::Parallel => {
                let grid = CellGrid::build_parallel(&self.plane, self.geometry);
                let events = aggregator::collect_pair_events_parallel(&grid, &stencil);
                let candidates =
                    aggregator::resolve_candidates_sharded(grid.particle_count(), &events);
                let map =
                    aggregator::filter_candidates_parallel(&self.plane, &candidates, rc, period);
                (grid, map)
            }
        };

        debug!(
            "cim: {} occupied cells, stencil of {} offsets",
            grid.occupied_cells(),
            stencil.offsets().len()
        );
        info!(
            "cim: {} particles, {} neighbor pairs in {:.3} ms",
            self.plane.len(),
            map.pair_count(),
            start.elapsed().as_secs_f64() * 1e3
        );
        (grid, map)
    }
}

impl NeighborSearch for CellIndexMethod {
    fn execute(&self) -> NeighborMap {
        self.execute_with_grid().1
    }

    fn plane(&self) -> &Plane {
        &self.plane
    }

    fn name(&self) -> &str {
        "Cell Index Method"
    }
}
