use serde::{Deserialize, Serialize};

use crate::engine::grid::CellIndex;

/// The four forward directions scanned from every cell.
///
/// Their mirror images (bottom, bottom-left, left, top-left) are never scanned:
/// each adjacent cell pair is reached from exactly one side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Top,
    TopRight,
    Right,
    BottomRight,
}

impl Direction {
    pub const FORWARD: [Direction; 4] = [
        Direction::Top,
        Direction::TopRight,
        Direction::Right,
        Direction::BottomRight,
    ];

    /// `(Δrow, Δcol)` with row 0 at the top.
    pub fn offset(self) -> (isize, isize) {
        match self {
            Direction::Top => (-1, 0),
            Direction::TopRight => (-1, 1),
            Direction::Right => (0, 1),
            Direction::BottomRight => (1, 1),
        }
    }
}

/// Steps from `(row, col)` by `(d_row, d_col)`.
///
/// Periodic grids wrap each axis independently (`M - 1 → 0` on columns, `0 → M - 1`
/// on rows), which matches `((index - 1 + Δrow·M + Δcol) mod M²) + 1` with the column
/// carried back into its own row. Open grids return `None` once the step leaves the grid.
pub fn step(
    cell: CellIndex,
    d_row: isize,
    d_col: isize,
    cell_count: usize,
    periodic: bool,
) -> Option<CellIndex> {
    let m = cell_count as isize;
    let row = cell.row(cell_count) as isize + d_row;
    let col = cell.col(cell_count) as isize + d_col;

    if periodic {
        Some(CellIndex::from_row_col(
            row.rem_euclid(m) as usize,
            col.rem_euclid(m) as usize,
            cell_count,
        ))
    } else if (0..m).contains(&row) && (0..m).contains(&col) {
        Some(CellIndex::from_row_col(row as usize, col as usize, cell_count))
    } else {
        None
    }
}

/// Forward half of the `(2k+1)²` neighborhood around a cell.
///
/// Offsets with `Δcol > 0`, plus the cells straight above (`Δcol = 0, Δrow < 0`).
/// With `k = 1` this is exactly top, top-right, right, bottom-right.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HalfStencil {
    offsets: Vec<(isize, isize)>,
}

impl HalfStencil {
    pub fn new(reach: usize) -> Self {
        let k = reach.max(1) as isize;
        if k == 1 {
            return Self {
                offsets: Direction::FORWARD.iter().map(|d| d.offset()).collect(),
            };
        }

        let mut offsets = Vec::with_capacity(((2 * k + 1) * (2 * k + 1) - 1) as usize / 2);
        for d_row in -k..0 {
            offsets.push((d_row, 0));
        }
        for d_col in 1..=k {
            for d_row in -k..=k {
                offsets.push((d_row, d_col));
            }
        }
        Self { offsets }
    }

    pub fn offsets(&self) -> &[(isize, isize)] {
        &self.offsets
    }

    /// Distinct cells the stencil reaches from `cell`, never `cell` itself.
    ///
    /// On small periodic grids several offsets can land on the same cell (or back on
    /// `cell`); those collapse so a source never visits a target twice.
    pub fn targets(&self, cell: CellIndex, cell_count: usize, periodic: bool) -> Vec<CellIndex> {
        let mut out: Vec<CellIndex> = self
            .offsets
            .iter()
            .filter_map(|&(d_row, d_col)| step(cell, d_row, d_col, cell_count, periodic))
            .filter(|target| *target != cell)
            .collect();
        out.sort_unstable();
        out.dedup();
        out
    }
}
