//! Ray entity

use super::EntityCommon;
use crate::error::ArgumentError;
use crate::types::Vector3;

pub(crate) fn check_direction(direction: Vector3) -> Result<Vector3, ArgumentError> {
    direction
        .normalized()
        .ok_or_else(|| ArgumentError::new("direction", "the direction vector cannot be zero"))
}

/// Semi-infinite line
#[derive(Debug, Clone, PartialEq)]
pub struct Ray {
    pub common: EntityCommon,
    /// Start point (10)
    pub base_point: Vector3,
    direction: Vector3,
}

impl Ray {
    pub fn new(base_point: Vector3, direction: Vector3) -> Result<Self, ArgumentError> {
        Ok(Ray {
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

impl Default for Ray {
    fn default() -> Self {
        Ray {
            common: EntityCommon::new(),
            base_point: Vector3::ZERO,
            direction: Vector3::UNIT_X,
        }
    }
}

super::impl_entity!(Ray, "RAY");
