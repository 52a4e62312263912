use thiserror::Error;

use crate::core::domain::ParticleId;

/// Crate-wide result type alias.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Rejections raised while validating a plane or a grid configuration.
///
/// Every variant is fatal: nothing is computed once one of these is returned.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("side length must be a positive finite number, got {0}")]
    InvalidSideLength(f64),

    #[error("a plane needs at least one particle")]
    EmptyPlane,

    #[error("particle {label} at ({x}, {y}) lies outside the plane [0, {side_length}]")]
    ParticleOutOfBounds {
        label: String,
        x: f64,
        y: f64,
        side_length: f64,
    },

    #[error("particle {label} has an invalid radius {radius}")]
    InvalidRadius { label: String, radius: f64 },

    #[error("particle {label} has non-finite coordinates")]
    InvalidPosition { label: String },

    #[error("particle id {0} appears more than once")]
    DuplicateParticle(ParticleId),

    #[error("interaction radius must be a positive finite number, got {0}")]
    InvalidInteractionRadius(f64),

    #[error("cell count must be at least 1")]
    InvalidCellCount,

    /// Cells smaller than the interaction radius make the neighbor scan unsound.
    #[error("cell count {requested} too large for given interaction radius / plane size (max {max})")]
    CellCountTooLarge { requested: usize, max: usize },

    #[error("missing required configuration field `{0}`")]
    MissingField(&'static str),
}
