#![allow(dead_code)]

use cellindex::core::domain::{Particle, Plane};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Plane from `(radius, x, y)` triples, labelled `p_0`, `p_1`, ...
pub fn plane_of(side_length: f64, disks: &[(f64, f64, f64)]) -> Plane {
    let particles = disks
        .iter()
        .enumerate()
        .map(|(i, &(r, x, y))| Particle::new(format!("p_{}", i), r, x, y).unwrap())
        .collect();
    Plane::new(side_length, particles).unwrap()
}

/// Point particles (radius 0).
pub fn points(side_length: f64, coords: &[(f64, f64)]) -> Plane {
    let disks: Vec<_> = coords.iter().map(|&(x, y)| (0.0, x, y)).collect();
    plane_of(side_length, &disks)
}

/// Seeded random plane with radii drawn from `[r_min, r_max)` (or exactly `r_min` when equal).
pub fn random_plane(seed: u64, count: usize, side_length: f64, r_min: f64, r_max: f64) -> Plane {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let disks: Vec<_> = (0..count)
        .map(|_| {
            let r = if r_max > r_min { rng.gen_range(r_min..r_max) } else { r_min };
            let x = rng.gen_range(0.0..side_length);
            let y = rng.gen_range(0.0..side_length);
            (r, x, y)
        })
        .collect();
    plane_of(side_length, &disks)
}

/// Id of the particle labelled `label`.
pub fn id_of(plane: &Plane, label: &str) -> cellindex::ParticleId {
    plane
        .particles()
        .iter()
        .find(|p| p.label() == label)
        .map(|p| p.id())
        .unwrap()
}
