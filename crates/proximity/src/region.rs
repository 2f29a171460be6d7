use foundation::{GeoPoint, haversine_m};
use serde::Serialize;

/// Circular area of interest: a center and a radius in meters.
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct Region {
    center: GeoPoint,
    radius_m: f64,
}

impl Region {
    pub fn new(center: GeoPoint, radius_m: f64) -> Self {
        Self {
            center,
            radius_m: sanitize_radius(radius_m),
        }
    }

    pub fn center(&self) -> GeoPoint {
        self.center
    }

    pub fn radius_m(&self) -> f64 {
        self.radius_m
    }

    pub fn set_center(&mut self, center: GeoPoint) {
        self.center = center;
    }

    pub fn set_radius(&mut self, meters: f64) {
        self.radius_m = sanitize_radius(meters);
    }

    /// Inclusive: a point exactly on the boundary is inside.
    pub fn contains(&self, point: GeoPoint) -> bool {
        haversine_m(self.center, point) <= self.radius_m
    }
}

/// Clamps a requested radius to a usable value.
///
/// Negative and non-finite inputs become `0.0`, a degenerate region that only
/// contains points coincident with the center.
pub fn sanitize_radius(meters: f64) -> f64 {
    if meters.is_finite() && meters >= 0.0 {
        return meters;
    }
    tracing::debug!(requested = meters, "invalid radius clamped to 0");
    0.0
}
