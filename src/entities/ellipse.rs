//! Ellipse entity

use super::EntityCommon;
use crate::error::ArgumentError;
use crate::types::Vector3;

/// An ellipse or elliptical arc. Parameters are in radians (41/42),
/// as DXF stores them.
#[derive(Debug, Clone, PartialEq)]
pub struct Ellipse {
    pub common: EntityCommon,
    /// Center in WCS (10)
    pub center: Vector3,
    /// Start parameter (41)
    pub start_parameter: f64,
    /// End parameter (42)
    pub end_parameter: f64,
    major_axis: Vector3,
    ratio: f64,
}

impl Ellipse {
    pub fn new() -> Self {
        Ellipse {
            common: EntityCommon::new(),
            center: Vector3::ZERO,
            start_parameter: 0.0,
            end_parameter: std::f64::consts::TAU,
            major_axis: Vector3::UNIT_X,
            ratio: 1.0,
        }
    }

    pub fn from_center_axes(
        center: Vector3,
        major_axis: Vector3,
        ratio: f64,
    ) -> Result<Self, ArgumentError> {
        let mut ellipse = Ellipse {
            center,
            ..Self::new()
        };
        ellipse.set_major_axis(major_axis)?;
        ellipse.set_ratio(ratio)?;
        Ok(ellipse)
    }

    /// Endpoint of the major axis relative to the center (11)
    pub fn major_axis(&self) -> Vector3 {
        self.major_axis
    }

    pub fn set_major_axis(&mut self, axis: Vector3) -> Result<(), ArgumentError> {
        if axis.is_zero() || !axis.is_finite() {
            return Err(ArgumentError::new("major_axis", "the major axis cannot be zero"));
        }
        self.major_axis = axis;
        Ok(())
    }

    /// Minor to major axis ratio (40), in `(0, 1]`
    pub fn ratio(&self) -> f64 {
        self.ratio
    }

    pub fn set_ratio(&mut self, ratio: f64) -> Result<(), ArgumentError> {
        if !(ratio > 0.0 && ratio <= 1.0) {
            return Err(ArgumentError::new(
                "ratio",
                format!("must be in (0, 1], got {}", ratio),
            ));
        }
        self.ratio = ratio;
        Ok(())
    }

    /// Whether start and end parameters describe the whole ellipse
    pub fn is_full(&self) -> bool {
        (self.end_parameter - self.start_parameter - std::f64::consts::TAU).abs() < 1e-10
    }
}

impl Default for Ellipse {
    fn default() -> Self {
        Self::new()
    }
}

super::impl_entity!(Ellipse, "ELLIPSE");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ratio_bounds() {
        let mut e = Ellipse::new();
        assert!(e.set_ratio(1.0).is_ok());
        assert!(e.set_ratio(1.0 + f64::EPSILON).is_err());
        assert!(e.set_ratio(0.0).is_err());
        assert!(e.set_major_axis(Vector3::ZERO).is_err());
        assert!(e.is_full());
    }
}
