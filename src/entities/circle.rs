//! Circle entity

use super::EntityCommon;
use crate::error::ArgumentError;
use crate::types::Vector3;

/// Reject radii that are zero, negative or not finite
pub(crate) fn check_radius(radius: f64) -> Result<f64, ArgumentError> {
    if radius.is_finite() && radius > 0.0 {
        Ok(radius)
    } else {
        Err(ArgumentError::new(
            "radius",
            format!("must be greater than zero, got {}", radius),
        ))
    }
}

/// A full circle
#[derive(Debug, Clone, PartialEq)]
pub struct Circle {
    pub common: EntityCommon,
    /// Center in OCS (10)
    pub center: Vector3,
    /// Thickness (39)
    pub thickness: f64,
    radius: f64,
}

impl Circle {
    pub fn new() -> Self {
        Circle {
            common: EntityCommon::new(),
            center: Vector3::ZERO,
            thickness: 0.0,
            radius: 1.0,
        }
    }

    pub fn from_center(center: Vector3, radius: f64) -> Result<Self, ArgumentError> {
        let mut circle = Circle {
            center,
            ..Self::new()
        };
        circle.set_radius(radius)?;
        Ok(circle)
    }

    /// Radius (40), always positive
    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn set_radius(&mut self, radius: f64) -> Result<(), ArgumentError> {
        self.radius = check_radius(radius)?;
        Ok(())
    }
}

impl Default for Circle {
    fn default() -> Self {
        Self::new()
    }
}

super::impl_entity!(Circle, "CIRCLE");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_radius_boundary() {
        let mut circle = Circle::new();
        assert!(circle.set_radius(f64::MIN_POSITIVE).is_ok());
        assert!(circle.set_radius(5e-324).is_ok());
        assert!(circle.set_radius(0.0).is_err());
        assert!(circle.set_radius(-1.0).is_err());
        assert_eq!(circle.radius(), 5e-324);
    }
}
