//! Cell Index Method neighbor search for disk-shaped particles in a square plane.
//!
//! The grid search (`solvers::cim`) bins particles into a uniform grid, scans a
//! forward half-stencil of nearby cells and filters the resulting candidates by
//! exact border-to-border distance, optionally under periodic boundaries.
//! `solvers::brute` computes the same relation pair by pair and serves as its oracle.

pub mod analysis;
pub mod core;
pub mod engine;
pub mod interface;
pub mod solvers;

pub use crate::core::{CellCount, ConfigError, GridConfig, NeighborMap, Particle, ParticleId, Plane};
pub use crate::engine::search::NeighborSearch;
pub use crate::solvers::{brute_force_neighbor_map, build_neighbor_map, BruteForce, CellIndexMethod, Execution};
