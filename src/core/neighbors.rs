use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::core::domain::{ParticleId, Plane};

/// Result of a neighbor search: particle id → ids of its interacting neighbors.
///
/// Every particle of the searched plane has an entry, possibly empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NeighborMap {
    entries: HashMap<ParticleId, HashSet<ParticleId>>,
}

impl NeighborMap {
    /// An empty entry for every particle of `plane`.
    pub fn for_plane(plane: &Plane) -> Self {
        let entries = plane
            .particles()
            .iter()
            .map(|p| (p.id(), HashSet::new()))
            .collect();
        Self { entries }
    }

    /// Builds the map from index-based neighbor sets (index = position in `plane`).
    pub fn from_indices(plane: &Plane, sets: Vec<HashSet<usize>>) -> Self {
        let particles = plane.particles();
        let entries = sets
            .into_iter()
            .enumerate()
            .map(|(i, set)| {
                let ids = set.into_iter().map(|j| particles[j].id()).collect();
                (particles[i].id(), ids)
            })
            .collect();
        Self { entries }
    }

    /// Records the unordered pair `{a, b}`. Self-pairs are ignored.
    pub fn insert_pair(&mut self, a: ParticleId, b: ParticleId) {
        if a == b {
            return;
        }
        self.entries.entry(a).or_default().insert(b);
        self.entries.entry(b).or_default().insert(a);
    }

    pub fn neighbors_of(&self, id: ParticleId) -> Option<&HashSet<ParticleId>> {
        self.entries.get(&id)
    }

    pub fn are_neighbors(&self, a: ParticleId, b: ParticleId) -> bool {
        self.entries.get(&a).is_some_and(|set| set.contains(&b))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ParticleId, &HashSet<ParticleId>)> {
        self.entries.iter()
    }

    /// Number of unordered neighbor pairs.
    pub fn pair_count(&self) -> usize {
        self.entries.values().map(HashSet::len).sum::<usize>() / 2
    }

    /// Pairs `(p, q)` with `q ∈ neighbors(p)` but `p ∉ neighbors(q)`.
    pub fn asymmetric_pairs(&self) -> Vec<(ParticleId, ParticleId)> {
        let mut out = Vec::new();
        for (p, set) in &self.entries {
            for q in set {
                if !self.are_neighbors(*q, *p) {
                    out.push((*p, *q));
                }
            }
        }
        out
    }

    pub fn is_symmetric(&self) -> bool {
        self.asymmetric_pairs().is_empty()
    }

    pub fn is_irreflexive(&self) -> bool {
        self.entries.iter().all(|(p, set)| !set.contains(p))
    }
}
