use cellindex::core::domain::{CellCount, GridConfig, Particle, Plane};
use cellindex::engine::search::NeighborSearch;
use cellindex::solvers::{BruteForce, CellIndexMethod, Execution};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::sync::Arc;
use std::time::Instant;

fn random_plane(count: usize, side_length: f64, seed: u64) -> Plane {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let particles = (0..count)
        .map(|i| {
            let r = rng.gen_range(0.1..0.5);
            let x = rng.gen_range(0.0..side_length);
            let y = rng.gen_range(0.0..side_length);
            Particle::new(format!("p_{}", i), r, x, y).unwrap()
        })
        .collect();
    Plane::new(side_length, particles).unwrap()
}

fn time<S: NeighborSearch>(search: &S) -> usize {
    let start = Instant::now();
    let map = search.execute();
    println!("{:<24} took: {:?} ({} pairs)", search.name(), start.elapsed(), map.pair_count());
    map.pair_count()
}

fn main() {
    let side_length = 100.0;
    let interaction_radius = 1.0;

    for &count in &[1_000, 5_000, 20_000] {
        println!("--- N = {} ---", count);
        let plane = Arc::new(random_plane(count, side_length, 42));

        for &periodic in &[false, true] {
            let config = GridConfig::new(CellCount::Auto, interaction_radius, periodic).unwrap();
            let sequential = CellIndexMethod::new(plane.clone(), config).unwrap();
            let parallel = CellIndexMethod::new(plane.clone(), config)
                .unwrap()
                .with_execution(Execution::Parallel);
            let brute = BruteForce::new(plane.clone(), interaction_radius, periodic).unwrap();

            println!("periodic = {}", periodic);
            let a = time(&sequential);
            let b = time(&parallel);
            let c = time(&brute);
            assert_eq!(a, b);
            assert_eq!(a, c);
        }
    }
}
