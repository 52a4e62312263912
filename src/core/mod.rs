//! Foundational types: particles, the plane, configuration, geometry primitives
//! and the neighbor map every search produces.

pub mod domain;
pub mod error;
pub mod neighbors;
pub mod spatial;

pub use domain::{CellCount, GridConfig, GridConfigDraft, Particle, ParticleId, Plane};
pub use error::{ConfigError, Result};
pub use neighbors::NeighborMap;
