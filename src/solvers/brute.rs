use std::sync::Arc;

use crate::core::domain::Plane;
use crate::core::error::{ConfigError, Result};
use crate::core::neighbors::NeighborMap;
use crate::core::spatial;
use crate::engine::search::NeighborSearch;

/// O(n²) reference search. Every pair is measured with the same distance
/// function the grid filter uses; there is no cell count to misconfigure.
pub struct BruteForce {
    plane: Arc<Plane>,
    interaction_radius: f64,
    periodic: bool,
}

impl BruteForce {
    pub fn new(plane: Arc<Plane>, interaction_radius: f64, periodic: bool) -> Result<Self> {
        if !interaction_radius.is_finite() || interaction_radius <= 0.0 {
            return Err(ConfigError::InvalidInteractionRadius(interaction_radius));
        }
        Ok(Self {
            plane,
            interaction_radius,
            periodic,
        })
    }
}

impl NeighborSearch for BruteForce {
    fn execute(&self) -> NeighborMap {
        let atoms = self.plane.particles();
        let n = atoms.len();
        let period = self.periodic.then_some(self.plane.side_length());
        let mut map = NeighborMap::for_plane(&self.plane);

        for i in 0..n {
            for j in (i + 1)..n {
                if spatial::within_interaction(&atoms[i], &atoms[j], self.interaction_radius, period) {
                    map.insert_pair(atoms[i].id(), atoms[j].id());
                }
            }
        }
        map
    }

    fn plane(&self) -> &Plane {
        &self.plane
    }

    fn name(&self) -> &str {
        "Brute Force"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::domain::Particle;

    #[test]
    fn rejects_non_positive_radius() {
        let plane = Arc::new(Plane::new(5.0, vec![Particle::new("a", 0.0, 1.0, 1.0).unwrap()]).unwrap());
        assert!(BruteForce::new(plane, -1.0, false).is_err());
    }

    #[test]
    fn wrap_only_counts_when_periodic() {
        let a = Particle::new("a", 0.0, 0.5, 5.0).unwrap();
        let b = Particle::new("b", 0.0, 9.5, 5.0).unwrap();
        let (ia, ib) = (a.id(), b.id());
        let plane = Arc::new(Plane::new(10.0, vec![a, b]).unwrap());

        let open = BruteForce::new(plane.clone(), 1.0, false).unwrap().execute();
        assert!(!open.are_neighbors(ia, ib));

        let torus = BruteForce::new(plane, 1.0, true).unwrap().execute();
        assert!(torus.are_neighbors(ia, ib));
        assert!(torus.are_neighbors(ib, ia));
    }
}
