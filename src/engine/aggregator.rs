use std::collections::HashSet;

use log::trace;
use parking_lot::Mutex;
use rayon::prelude::*;

use crate::core::domain::Plane;
use crate::core::neighbors::NeighborMap;
use crate::core::spatial;
use crate::engine::grid::CellGrid;
use crate::engine::stencil::HalfStencil;

/// An unordered candidate pair, stored with `a < b`.
///
/// The stencil pass only emits events; both directions (`a → b`, `b → a`)
/// are written afterwards, so no candidate set is mutated mid-traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PairEvent {
    pub a: usize,
    pub b: usize,
}

impl PairEvent {
    /// `None` for a self-pair.
    pub fn new(p: usize, q: usize) -> Option<Self> {
        match p.cmp(&q) {
            std::cmp::Ordering::Less => Some(Self { a: p, b: q }),
            std::cmp::Ordering::Greater => Some(Self { a: q, b: p }),
            std::cmp::Ordering::Equal => None,
        }
    }
}

/// Events produced by one particle: co-members of each of its cells, then the
/// members of every forward-stencil cell.
fn events_for(grid: &CellGrid, stencil: &HalfStencil, p: usize, out: &mut Vec<PairEvent>) {
    let geometry = grid.geometry();
    for &cell in grid.cells_of(p) {
        out.extend(grid.members(cell).iter().filter_map(|&q| PairEvent::new(p, q)));

        for target in stencil.targets(cell, geometry.cell_count(), geometry.periodic()) {
            out.extend(grid.members(target).iter().filter_map(|&q| PairEvent::new(p, q)));
        }
    }
}

/// Runs the half-stencil pass over every particle.
pub fn collect_pair_events(grid: &CellGrid, stencil: &HalfStencil) -> Vec<PairEvent> {
    let mut events = Vec::new();
    for p in 0..grid.particle_count() {
        events_for(grid, stencil, p, &mut events);
    }
    trace!("stencil pass emitted {} pair events", events.len());
    events
}

/// Parallel stencil pass. The grid is read-only here, so particles are independent.
pub fn collect_pair_events_parallel(grid: &CellGrid, stencil: &HalfStencil) -> Vec<PairEvent> {
    let events: Vec<PairEvent> = (0..grid.particle_count())
        .into_par_iter()
        .flat_map_iter(|p| {
            let mut local = Vec::new();
            events_for(grid, stencil, p, &mut local);
            local
        })
        .collect();
    trace!("stencil pass emitted {} pair events", events.len());
    events
}

/// Raw candidate sets: for every event both endpoints learn about each other.
pub fn resolve_candidates(particle_count: usize, events: &[PairEvent]) -> Vec<HashSet<usize>> {
    let mut candidates = vec![HashSet::new(); particle_count];
    for e in events {
        candidates[e.a].insert(e.b);
        candidates[e.b].insert(e.a);
    }
    candidates
}

/// Same as `resolve_candidates`, with one append queue per particle.
///
/// Writers only contend on the two queues an event touches; queues are merged
/// into sets once every event has been appended.
pub fn resolve_candidates_sharded(particle_count: usize, events: &[PairEvent]) -> Vec<HashSet<usize>> {
    let shards: Vec<Mutex<Vec<usize>>> = (0..particle_count).map(|_| Mutex::new(Vec::new())).collect();

    events.par_iter().for_each(|e| {
        shards[e.a].lock().push(e.b);
        shards[e.b].lock().push(e.a);
    });

    shards
        .into_par_iter()
        .map(|shard| shard.into_inner().into_iter().collect())
        .collect()
}

/// Keeps the candidates whose border-to-border distance is within the interaction radius.
///
/// Each unordered pair is measured once (from its lower index) and written both ways,
/// so the result is symmetric by construction.
pub fn filter_candidates(
    plane: &Plane,
    candidates: &[HashSet<usize>],
    interaction_radius: f64,
    period: Option<f64>,
) -> NeighborMap {
    let particles = plane.particles();
    let mut map = NeighborMap::for_plane(plane);

    for (p, set) in candidates.iter().enumerate() {
        for &q in set.iter().filter(|&&q| q > p) {
            if spatial::within_interaction(&particles[p], &particles[q], interaction_radius, period) {
                map.insert_pair(particles[p].id(), particles[q].id());
            }
        }
    }
    map
}

/// Parallel filter. Each particle keeps the candidates it is within range of;
/// the distance is symmetric, so both sides of a pair reach the same verdict.
pub fn filter_candidates_parallel(
    plane: &Plane,
    candidates: &[HashSet<usize>],
    interaction_radius: f64,
    period: Option<f64>,
) -> NeighborMap {
    let particles = plane.particles();
    let kept: Vec<HashSet<usize>> = candidates
        .par_iter()
        .enumerate()
        .map(|(p, set)| {
            set.iter()
                .copied()
                .filter(|&q| {
                    q != p
                        && spatial::within_interaction(
                            &particles[p],
                            &particles[q],
                            interaction_radius,
                            period,
                        )
                })
                .collect()
        })
        .collect();
    NeighborMap::from_indices(plane, kept)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::domain::{CellCount, GridConfig, Particle};
    use crate::engine::grid::GridGeometry;

    fn plane_of(side: f64, specs: &[(f64, f64, f64)]) -> Plane {
        let particles = specs
            .iter()
            .enumerate()
            .map(|(i, &(r, x, y))| Particle::new(format!("p_{i}"), r, x, y).unwrap())
            .collect();
        Plane::new(side, particles).unwrap()
    }

    fn grid(plane: &Plane, m: usize, rc: f64, periodic: bool) -> CellGrid {
        let cfg = GridConfig::new(CellCount::Fixed(m), rc, periodic).unwrap();
        CellGrid::build(plane, GridGeometry::new(plane, &cfg).unwrap())
    }

    #[test]
    fn pair_event_normalizes_and_rejects_self() {
        assert_eq!(PairEvent::new(3, 1), Some(PairEvent { a: 1, b: 3 }));
        assert_eq!(PairEvent::new(2, 2), None);
    }

    #[test]
    fn candidates_include_same_and_forward_cells() {
        // 4x4 over L=10: particle 0 in cell 6, 1 in cell 7 (right), 2 far away in cell 16
        let plane = plane_of(10.0, &[(0.0, 3.0, 6.0), (0.0, 5.5, 6.0), (0.0, 9.0, 1.0)]);
        let g = grid(&plane, 4, 1.0, false);
        let stencil = HalfStencil::new(1);
        let cands = resolve_candidates(plane.len(), &collect_pair_events(&g, &stencil));
        assert!(cands[0].contains(&1));
        assert!(cands[1].contains(&0));
        assert!(cands[2].is_empty());
    }

    #[test]
    fn backward_neighbors_are_reached_through_the_mutual_update() {
        // Particle 1 sits left of particle 0; only 1's stencil points at 0's cell.
        let plane = plane_of(10.0, &[(0.0, 5.5, 6.0), (0.0, 3.0, 6.0)]);
        let g = grid(&plane, 4, 1.0, false);
        let cands = resolve_candidates(plane.len(), &collect_pair_events(&g, &HalfStencil::new(1)));
        assert!(cands[0].contains(&1));
        assert!(cands[1].contains(&0));
    }

    #[test]
    fn sharded_resolution_matches_sequential() {
        let plane = plane_of(
            10.0,
            &[(0.2, 1.0, 1.0), (0.1, 1.5, 1.2), (0.4, 4.9, 5.0), (0.3, 5.2, 5.1), (0.0, 9.9, 9.9)],
        );
        let g = grid(&plane, 5, 2.0, true);
        let stencil = HalfStencil::new(g.geometry().reach());
        let seq_events = collect_pair_events(&g, &stencil);
        let mut par_events = collect_pair_events_parallel(&g, &stencil);
        let mut sorted_seq = seq_events.clone();
        sorted_seq.sort_unstable();
        par_events.sort_unstable();
        assert_eq!(sorted_seq, par_events);

        assert_eq!(
            resolve_candidates(plane.len(), &seq_events),
            resolve_candidates_sharded(plane.len(), &seq_events)
        );
    }

    #[test]
    fn filter_drops_far_candidates() {
        // Same cell (cell size 5), but 3.0 apart with r_c = 1
        let plane = plane_of(10.0, &[(0.0, 1.0, 1.0), (0.0, 4.0, 1.0), (0.0, 1.5, 1.0)]);
        let g = grid(&plane, 2, 1.0, false);
        let cands = resolve_candidates(plane.len(), &collect_pair_events(&g, &HalfStencil::new(1)));
        assert!(cands[0].contains(&1));

        let map = filter_candidates(&plane, &cands, 1.0, None);
        let ids: Vec<_> = plane.particles().iter().map(|p| p.id()).collect();
        assert!(!map.are_neighbors(ids[0], ids[1]));
        assert!(map.are_neighbors(ids[0], ids[2]));

        let par = filter_candidates_parallel(&plane, &cands, 1.0, None);
        assert_eq!(map, par);
    }
}
