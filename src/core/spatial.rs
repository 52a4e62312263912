use nalgebra::{Point2, Vector2};

use crate::core::domain::Particle;

/// Folds a separation along one axis into `[0, period / 2]` (Minimum Image Convention).
#[inline]
pub fn minimum_image(delta: f64, period: f64) -> f64 {
    let d = delta.abs();
    if d > period / 2.0 {
        period - d
    } else {
        d
    }
}

/// Center-to-center distance.
/// If `period` is provided, applies the Minimum Image Convention on both axes.
#[inline]
pub fn center_distance(p1: &Point2<f64>, p2: &Point2<f64>, period: Option<f64>) -> f64 {
    match period {
        Some(l) => {
            let d = Vector2::new(
                minimum_image(p1.x - p2.x, l),
                minimum_image(p1.y - p2.y, l),
            );
            d.norm()
        }
        None => nalgebra::distance(p1, p2),
    }
}

/// Border-to-border distance: center distance minus both radii.
///
/// Negative when the disks overlap. The radii are summed before subtracting so
/// that `border_distance(a, b) == border_distance(b, a)` holds bit for bit.
#[inline]
pub fn border_distance(a: &Particle, b: &Particle, period: Option<f64>) -> f64 {
    center_distance(a.position(), b.position(), period) - (a.radius() + b.radius())
}

/// The neighbor predicate shared by every search strategy.
#[inline]
pub fn within_interaction(a: &Particle, b: &Particle, interaction_radius: f64, period: Option<f64>) -> bool {
    border_distance(a, b, period) <= interaction_radius
}

/// Closest-point test between a disk and an axis-aligned rectangle.
///
/// The center is clamped onto the rectangle; the disk overlaps it iff the clamped
/// point is within `radius` of the center. Touching counts as overlap.
#[inline]
pub fn circle_overlaps_rect(
    center: &Point2<f64>,
    radius: f64,
    min: &Point2<f64>,
    max: &Point2<f64>,
) -> bool {
    let nearest = Point2::new(center.x.clamp(min.x, max.x), center.y.clamp(min.y, max.y));
    nalgebra::distance_squared(&nearest, center) <= radius * radius
}

/// Smallest cell count per side for which the neighbor scan stays correct:
/// `ceil(side_length / interaction_radius)`, never below 1.
pub fn auto_cell_count(side_length: f64, interaction_radius: f64) -> usize {
    ((side_length / interaction_radius).ceil() as usize).max(1)
}
