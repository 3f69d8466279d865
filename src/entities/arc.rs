//! Arc entity

use super::circle::check_radius;
use super::EntityCommon;
use crate::error::ArgumentError;
use crate::types::{normalize_angle, Vector3};

/// A circular arc, counter-clockwise from start to end angle.
/// Angles are in degrees, normalized to `[0, 360)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Arc {
    pub common: EntityCommon,
    /// Center in OCS (10)
    pub center: Vector3,
    /// Thickness (39)
    pub thickness: f64,
    radius: f64,
    start_angle: f64,
    end_angle: f64,
}

impl Arc {
    pub fn new() -> Self {
        Arc {
            common: EntityCommon::new(),
            center: Vector3::ZERO,
            thickness: 0.0,
            radius: 1.0,
            start_angle: 0.0,
            end_angle: 180.0,
        }
    }

    pub fn from_center(
        center: Vector3,
        radius: f64,
        start_angle: f64,
        end_angle: f64,
    ) -> Result<Self, ArgumentError> {
        let mut arc = Arc {
            center,
            ..Self::new()
        };
        arc.set_radius(radius)?;
        arc.set_start_angle(start_angle);
        arc.set_end_angle(end_angle);
        Ok(arc)
    }

    /// Radius (40)
    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn set_radius(&mut self, radius: f64) -> Result<(), ArgumentError> {
        self.radius = check_radius(radius)?;
        Ok(())
    }

    /// Start angle (50)
    pub fn start_angle(&self) -> f64 {
        self.start_angle
    }

    pub fn set_start_angle(&mut self, degrees: f64) {
        self.start_angle = normalize_angle(degrees);
    }

    /// End angle (51)
    pub fn end_angle(&self) -> f64 {
        self.end_angle
    }

    pub fn set_end_angle(&mut self, degrees: f64) {
        self.end_angle = normalize_angle(degrees);
    }

    /// Included angle in degrees
    pub fn sweep(&self) -> f64 {
        let sweep = self.end_angle - self.start_angle;
        if sweep <= 0.0 {
            sweep + 360.0
        } else {
            sweep
        }
    }
}

impl Default for Arc {
    fn default() -> Self {
        Self::new()
    }
}

super::impl_entity!(Arc, "ARC");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_angles_are_normalized() {
        let arc = Arc::from_center(Vector3::ZERO, 2.0, -90.0, 450.0).unwrap();
        assert_eq!(arc.start_angle(), 270.0);
        assert_eq!(arc.end_angle(), 90.0);
        assert_eq!(arc.sweep(), 180.0);
    }

    #[test]
    fn test_zero_radius_rejected() {
        let err = Arc::from_center(Vector3::ZERO, 0.0, 0.0, 90.0).unwrap_err();
        assert_eq!(err.field, "radius");
    }
}
