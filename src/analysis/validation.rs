use std::collections::HashSet;

use log::warn;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::domain::{ParticleId, Plane};
use crate::core::neighbors::NeighborMap;
use crate::engine::search::NeighborSearch;

/// One particle whose neighbor set differs between two searches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Disagreement {
    pub particle: ParticleId,
    /// In the reference set, absent from the candidate set.
    pub missing: Vec<ParticleId>,
    /// In the candidate set, absent from the reference set.
    pub unexpected: Vec<ParticleId>,
}

/// The grid result disagrees with the oracle: a correctness bug, never a user error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConsistencyError {
    #[error("neighbor maps disagree for {} particle(s)", .0.len())]
    Mismatch(Vec<Disagreement>),
}

/// Per-particle set differences between `candidate` and `reference`.
///
/// Particles present in only one of the maps are compared against an empty set.
pub fn compare(candidate: &NeighborMap, reference: &NeighborMap) -> Vec<Disagreement> {
    let empty = HashSet::new();
    let ids: HashSet<ParticleId> = candidate
        .iter()
        .chain(reference.iter())
        .map(|(id, _)| *id)
        .collect();

    let mut out: Vec<Disagreement> = ids
        .into_iter()
        .filter_map(|id| {
            let got = candidate.neighbors_of(id).unwrap_or(&empty);
            let want = reference.neighbors_of(id).unwrap_or(&empty);
            if got == want {
                return None;
            }
            let mut missing: Vec<_> = want.difference(got).copied().collect();
            let mut unexpected: Vec<_> = got.difference(want).copied().collect();
            missing.sort();
            unexpected.sort();
            Some(Disagreement {
                particle: id,
                missing,
                unexpected,
            })
        })
        .collect();
    out.sort_by_key(|d| d.particle);
    out
}

pub fn ensure_consistent(candidate: &NeighborMap, reference: &NeighborMap) -> Result<(), ConsistencyError> {
    let diffs = compare(candidate, reference);
    if diffs.is_empty() {
        Ok(())
    } else {
        warn!("{} particle(s) disagree with the reference search", diffs.len());
        Err(ConsistencyError::Mismatch(diffs))
    }
}

/// Runs both searches and checks their maps are set-for-set identical.
pub fn cross_check(
    candidate: &dyn NeighborSearch,
    reference: &dyn NeighborSearch,
) -> Result<NeighborMap, ConsistencyError> {
    let got = candidate.execute();
    let want = reference.execute();
    ensure_consistent(&got, &want)?;
    Ok(got)
}

/// Summary numbers for a neighbor map, used in logs and reports.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NeighborStats {
    pub particles: usize,
    pub pairs: usize,
    pub mean_neighbors: f64,
    pub max_neighbors: usize,
    pub isolated: usize,
}

impl NeighborStats {
    pub fn from_map(map: &NeighborMap) -> Self {
        let particles = map.len();
        if particles == 0 {
            return Self::default();
        }
        let degrees: Vec<usize> = map.iter().map(|(_, set)| set.len()).collect();
        let total: usize = degrees.iter().sum();
        Self {
            particles,
            pairs: total / 2,
            mean_neighbors: total as f64 / particles as f64,
            max_neighbors: degrees.iter().copied().max().unwrap_or(0),
            isolated: degrees.iter().filter(|&&d| d == 0).count(),
        }
    }
}

/// Human-readable summary of a disagreement, using particle labels.
pub fn describe(plane: &Plane, diffs: &[Disagreement]) -> String {
    let label = |id: &ParticleId| {
        plane
            .particle(*id)
            .map(|p| p.label().to_string())
            .unwrap_or_else(|| id.to_string())
    };
    diffs
        .iter()
        .map(|d| {
            format!(
                "{}: missing [{}] unexpected [{}]",
                label(&d.particle),
                d.missing.iter().map(label).collect::<Vec<_>>().join(", "),
                d.unexpected.iter().map(label).collect::<Vec<_>>().join(", "),
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
