use std::collections::HashMap;
use std::fmt;

use nalgebra::Point2;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::error::{ConfigError, Result};

// --- Identity ---

/// Opaque, stable identity of a particle.
///
/// Two particles at the same position with the same radius are still distinct
/// as long as their ids differ. All maps and sets are keyed by this token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParticleId(Uuid);

impl ParticleId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ParticleId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for ParticleId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl fmt::Display for ParticleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// --- Particle ---

/// A disk in the plane. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Particle {
    id: ParticleId,
    label: String,
    radius: f64,
    position: Point2<f64>,
}

impl Particle {
    /// Creates a particle with a fresh identity.
    ///
    /// `label` is the human-readable identifier used in output (e.g. `p_0`);
    /// it does not need to be unique.
    pub fn new(label: impl Into<String>, radius: f64, x: f64, y: f64) -> Result<Self> {
        Self::with_id(ParticleId::new(), label, radius, x, y)
    }

    pub fn with_id(
        id: ParticleId,
        label: impl Into<String>,
        radius: f64,
        x: f64,
        y: f64,
    ) -> Result<Self> {
        let label = label.into();
        if !radius.is_finite() || radius < 0.0 {
            return Err(ConfigError::InvalidRadius { label, radius });
        }
        if !x.is_finite() || !y.is_finite() {
            return Err(ConfigError::InvalidPosition { label });
        }
        Ok(Self {
            id,
            label,
            radius,
            position: Point2::new(x, y),
        })
    }

    pub fn id(&self) -> ParticleId {
        self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn position(&self) -> &Point2<f64> {
        &self.position
    }

    pub fn x(&self) -> f64 {
        self.position.x
    }

    pub fn y(&self) -> f64 {
        self.position.y
    }
}

// --- Plane ---

#[derive(Deserialize)]
struct RawPlane {
    side_length: f64,
    particles: Vec<Particle>,
}

/// A square region `[0, side_length]²` holding an ordered set of particles.
///
/// **Invariant**: every particle center lies inside the square (edges included),
/// the plane is non-empty, and no id appears twice.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "RawPlane")]
pub struct Plane {
    side_length: f64,
    particles: Vec<Particle>,
    #[serde(skip_serializing)]
    index: HashMap<ParticleId, usize>,
}

impl Plane {
    pub fn new(side_length: f64, particles: Vec<Particle>) -> Result<Self> {
        if !side_length.is_finite() || side_length <= 0.0 {
            return Err(ConfigError::InvalidSideLength(side_length));
        }
        if particles.is_empty() {
            return Err(ConfigError::EmptyPlane);
        }

        let mut index = HashMap::with_capacity(particles.len());
        for (i, p) in particles.iter().enumerate() {
            let inside = |c: f64| (0.0..=side_length).contains(&c);
            if !inside(p.x()) || !inside(p.y()) {
                return Err(ConfigError::ParticleOutOfBounds {
                    label: p.label.clone(),
                    x: p.x(),
                    y: p.y(),
                    side_length,
                });
            }
            if index.insert(p.id, i).is_some() {
                return Err(ConfigError::DuplicateParticle(p.id));
            }
        }

        Ok(Self {
            side_length,
            particles,
            index,
        })
    }

    pub fn side_length(&self) -> f64 {
        self.side_length
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    /// Always false for a constructed plane; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn index_of(&self, id: ParticleId) -> Option<usize> {
        self.index.get(&id).copied()
    }

    pub fn particle(&self, id: ParticleId) -> Option<&Particle> {
        self.index_of(id).map(|i| &self.particles[i])
    }

    pub fn max_radius(&self) -> f64 {
        self.particles.iter().map(|p| p.radius).fold(0.0, f64::max)
    }
}

impl TryFrom<RawPlane> for Plane {
    type Error = ConfigError;

    fn try_from(raw: RawPlane) -> Result<Self> {
        Plane::new(raw.side_length, raw.particles)
    }
}

// --- Configuration Types ---

/// How many cells per side the grid uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CellCount {
    /// `ceil(side_length / interaction_radius)`, resolved against the plane.
    Auto,
    Fixed(usize),
}

impl Default for CellCount {
    fn default() -> Self {
        CellCount::Auto
    }
}

/// Fully resolved neighbor-search configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridConfig {
    pub cell_count: CellCount,
    pub interaction_radius: f64,
    pub periodic: bool,
}

impl GridConfig {
    pub fn new(cell_count: CellCount, interaction_radius: f64, periodic: bool) -> Result<Self> {
        let config = Self {
            cell_count,
            interaction_radius,
            periodic,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn builder() -> GridConfigDraft {
        GridConfigDraft::default()
    }

    /// Plane-independent checks. The cell-count upper bound needs the plane
    /// and is enforced by `GridGeometry::new`.
    pub fn validate(&self) -> Result<()> {
        if !self.interaction_radius.is_finite() || self.interaction_radius <= 0.0 {
            return Err(ConfigError::InvalidInteractionRadius(self.interaction_radius));
        }
        if self.cell_count == CellCount::Fixed(0) {
            return Err(ConfigError::InvalidCellCount);
        }
        Ok(())
    }
}

/// Staged construction of a `GridConfig`. Unset fields are reported by `build`.
#[derive(Debug, Clone, Default)]
pub struct GridConfigDraft {
    cell_count: Option<CellCount>,
    interaction_radius: Option<f64>,
    periodic: Option<bool>,
}

impl GridConfigDraft {
    pub fn cell_count(mut self, count: usize) -> Self {
        self.cell_count = Some(CellCount::Fixed(count));
        self
    }

    pub fn auto_cell_count(mut self) -> Self {
        self.cell_count = Some(CellCount::Auto);
        self
    }

    pub fn interaction_radius(mut self, radius: f64) -> Self {
        self.interaction_radius = Some(radius);
        self
    }

    pub fn periodic(mut self, periodic: bool) -> Self {
        self.periodic = Some(periodic);
        self
    }

    pub fn build(self) -> Result<GridConfig> {
        let cell_count = self.cell_count.ok_or(ConfigError::MissingField("cell_count"))?;
        let interaction_radius = self
            .interaction_radius
            .ok_or(ConfigError::MissingField("interaction_radius"))?;
        // Open boundaries unless told otherwise, like the input format's default.
        let periodic = self.periodic.unwrap_or(false);
        GridConfig::new(cell_count, interaction_radius, periodic)
    }
}
