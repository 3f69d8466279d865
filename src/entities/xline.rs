//! Construction line entity

use super::ray::check_direction;
use super::EntityCommon;
use crate::error::ArgumentError;
use crate::types::Vector3;

/// Infinite line in both directions
#[derive(Debug, Clone, PartialEq)]
pub struct XLine {
    pub common: EntityCommon,
    /// Point on the line (10)
    pub base_point: Vector3,
    direction: Vector3,
}

impl XLine {
    pub fn new(base_point: Vector3, direction: Vector3) -> Result<Self, ArgumentError> {
        Ok(XLine {
            common: EntityCommon::new(),
            base_point,
            direction: check_direction(direction)?,
        })
    }

    /// Unit direction (11)
    pub fn direction(&self) -> Vector3 {
        self.direction
    }

    pub fn set_direction(&mut self, direction: Vector3) -> Result<(), ArgumentError> {
        self.direction = check_direction(direction)?;
        Ok(())
    }
}

impl Default for XLine {
    fn default() -> Self {
        XLine {
            common: EntityCommon::new(),
            base_point: Vector3::ZERO,
            direction: Vector3::UNIT_X,
        }
    }
}

super::impl_entity!(XLine, "XLINE");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_normalized() {
        let xline = XLine::new(Vector3::ZERO, Vector3::new(0.0, 3.0, 0.0)).unwrap();
        assert_eq!(xline.direction(), Vector3::UNIT_Y);
        assert!(XLine::new(Vector3::ZERO, Vector3::ZERO).is_err());
    }
}
