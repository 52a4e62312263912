use std::collections::HashMap;

use log::{debug, trace};
use nalgebra::Point2;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::core::domain::{CellCount, GridConfig, Particle, Plane};
use crate::core::error::{ConfigError, Result};
use crate::core::spatial;

// --- Cell Numbering ---

/// 1-based, row-major cell number in `[1, M²]`.
///
/// Row 0 is the top row (largest `y`), column 0 the left column:
/// `number = row * M + col + 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CellIndex(usize);

impl CellIndex {
    pub fn from_row_col(row: usize, col: usize, cell_count: usize) -> Self {
        Self(row * cell_count + col + 1)
    }

    pub fn get(self) -> usize {
        self.0
    }

    pub fn row(self, cell_count: usize) -> usize {
        (self.0 - 1) / cell_count
    }

    pub fn col(self, cell_count: usize) -> usize {
        (self.0 - 1) % cell_count
    }
}

// --- Geometry ---

/// Relative tolerance added to every disk before the membership test.
const MEMBERSHIP_SLACK: f64 = 1e-9;

/// Number of cells the forward scan must reach so that `reach * cell_size >= interaction_radius`.
///
/// Capped at `cell_count`: offsets past the grid width add nothing under either boundary policy.
pub fn stencil_reach(cell_size: f64, interaction_radius: f64, cell_count: usize) -> usize {
    let mut k = 1usize;
    while (k as f64) * cell_size < interaction_radius && k < cell_count {
        k += 1;
    }
    k
}

/// Grid sizing resolved against a concrete plane.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridGeometry {
    side_length: f64,
    cell_count: usize,
    cell_size: f64,
    interaction_radius: f64,
    periodic: bool,
    reach: usize,
}

impl GridGeometry {
    /// Validates `config` against `plane` and fixes the cell count.
    ///
    /// Fails with `CellCountTooLarge` when `M > ceil(L / r_c)`.
    pub fn new(plane: &Plane, config: &GridConfig) -> Result<Self> {
        config.validate()?;

        let side_length = plane.side_length();
        let max = spatial::auto_cell_count(side_length, config.interaction_radius);
        let cell_count = match config.cell_count {
            CellCount::Auto => max,
            CellCount::Fixed(0) => return Err(ConfigError::InvalidCellCount),
            CellCount::Fixed(m) => m,
        };
        if cell_count > max || cell_count.checked_mul(cell_count).is_none() {
            return Err(ConfigError::CellCountTooLarge {
                requested: cell_count,
                max,
            });
        }

        let cell_size = side_length / cell_count as f64;
        let reach = stencil_reach(cell_size, config.interaction_radius, cell_count);

        debug!(
            "grid: L={} M={} cell_size={:.4} r_c={} periodic={} reach={} max_radius={:.4}",
            side_length,
            cell_count,
            cell_size,
            config.interaction_radius,
            config.periodic,
            reach,
            plane.max_radius()
        );

        Ok(Self {
            side_length,
            cell_count,
            cell_size,
            interaction_radius: config.interaction_radius,
            periodic: config.periodic,
            reach,
        })
    }

    pub fn side_length(&self) -> f64 {
        self.side_length
    }

    pub fn cell_count(&self) -> usize {
        self.cell_count
    }

    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    pub fn interaction_radius(&self) -> f64 {
        self.interaction_radius
    }

    pub fn periodic(&self) -> bool {
        self.periodic
    }

    pub fn reach(&self) -> usize {
        self.reach
    }

    /// Period handed to the distance functions.
    pub fn period(&self) -> Option<f64> {
        self.periodic.then_some(self.side_length)
    }

    /// The cell containing `position`. Points on the far edges belong to the last row/column.
    pub fn home_cell(&self, position: &Point2<f64>) -> CellIndex {
        let last = (self.cell_count - 1) as isize;
        let row = (((self.side_length - position.y) / self.cell_size).floor() as isize).clamp(0, last);
        let col = ((position.x / self.cell_size).floor() as isize).clamp(0, last);
        CellIndex::from_row_col(row as usize, col as usize, self.cell_count)
    }

    /// Rectangle `(min, max)` of the cell at `(row, col)`.
    ///
    /// Indices outside `[0, M)` give the rectangle of the periodic image of the cell.
    fn cell_rect(&self, row: isize, col: isize) -> (Point2<f64>, Point2<f64>) {
        let s = self.cell_size;
        let min = Point2::new(col as f64 * s, self.side_length - (row + 1) as f64 * s);
        let max = Point2::new((col + 1) as f64 * s, self.side_length - row as f64 * s);
        (min, max)
    }

    /// Index span covered by `[coord - radius, coord + radius]` on one axis.
    ///
    /// Open grids clamp to `[0, M)`. Periodic grids keep unwrapped indices but only
    /// within `M / 2 + 1` cells of the center's cell, which still holds the nearest
    /// image of every column (or row), so the span never exceeds `M + 3` cells.
    fn axis_span(&self, coord: f64, radius: f64) -> (isize, isize) {
        let lo = ((coord - radius) / self.cell_size).floor() as isize;
        let hi = ((coord + radius) / self.cell_size).floor() as isize;
        if self.periodic {
            let center = (coord / self.cell_size).floor() as isize;
            let half = (self.cell_count / 2 + 1) as isize;
            (lo.max(center - half), hi.min(center + half))
        } else {
            let last = (self.cell_count - 1) as isize;
            (lo.max(0), hi.min(last))
        }
    }

    fn wrap(&self, row: isize, col: isize) -> CellIndex {
        let m = self.cell_count as isize;
        CellIndex::from_row_col(
            row.rem_euclid(m) as usize,
            col.rem_euclid(m) as usize,
            self.cell_count,
        )
    }

    /// Every cell the particle's disk overlaps, home cell included, sorted and unique.
    ///
    /// Without periodicity only cells inside the plane are tested. With it, the
    /// part of the disk that crosses an edge is tested against the image of the
    /// cells on the opposite edge.
    ///
    /// The disk is widened by a relative slack so that a cell it only touches is never
    /// lost to rounding; extra cells just add candidates the distance filter rejects.
    pub fn overlapping_cells(&self, particle: &Particle) -> Vec<CellIndex> {
        let center = particle.position();
        let radius = particle.radius() + MEMBERSHIP_SLACK * (self.side_length + particle.radius());

        let mut cells = vec![self.home_cell(center)];
        let (col_lo, col_hi) = self.axis_span(center.x, radius);
        let (row_lo, row_hi) = self.axis_span(self.side_length - center.y, radius);

        for row in row_lo..=row_hi {
            for col in col_lo..=col_hi {
                let (min, max) = self.cell_rect(row, col);
                if spatial::circle_overlaps_rect(center, radius, &min, &max) {
                    cells.push(self.wrap(row, col));
                }
            }
        }

        cells.sort_unstable();
        cells.dedup();
        cells
    }
}

// --- Membership ---

/// Cell → particles and particle → cells maps for one search.
///
/// Particles are referred to by their index in the plane.
#[derive(Debug, Clone)]
pub struct CellGrid {
    geometry: GridGeometry,
    members: HashMap<CellIndex, Vec<usize>>,
    cells_of: Vec<Vec<CellIndex>>,
}

impl CellGrid {
    pub fn build(plane: &Plane, geometry: GridGeometry) -> Self {
        let cells_of = plane
            .particles()
            .iter()
            .map(|p| geometry.overlapping_cells(p))
            .collect();
        Self::from_membership(geometry, cells_of)
    }

    /// Same result as `build`; each particle's cells are computed independently.
    pub fn build_parallel(plane: &Plane, geometry: GridGeometry) -> Self {
        let cells_of = plane
            .particles()
            .par_iter()
            .map(|p| geometry.overlapping_cells(p))
            .collect();
        Self::from_membership(geometry, cells_of)
    }

    fn from_membership(geometry: GridGeometry, cells_of: Vec<Vec<CellIndex>>) -> Self {
        let mut members: HashMap<CellIndex, Vec<usize>> = HashMap::new();
        for (i, cells) in cells_of.iter().enumerate() {
            for cell in cells {
                members.entry(*cell).or_default().push(i);
            }
        }
        trace!(
            "membership: {} particles over {} occupied cells",
            cells_of.len(),
            members.len()
        );
        Self {
            geometry,
            members,
            cells_of,
        }
    }

    pub fn geometry(&self) -> &GridGeometry {
        &self.geometry
    }

    /// Particles overlapping `cell`, in plane order.
    pub fn members(&self, cell: CellIndex) -> &[usize] {
        self.members.get(&cell).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn cells_of(&self, particle: usize) -> &[CellIndex] {
        &self.cells_of[particle]
    }

    pub fn particle_count(&self) -> usize {
        self.cells_of.len()
    }

    pub fn occupied_cells(&self) -> usize {
        self.members.len()
    }
}
