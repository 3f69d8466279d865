//! Point entity

use super::EntityCommon;
use crate::types::{normalize_angle, Vector3};

/// A point entity
#[derive(Debug, Clone, PartialEq)]
pub struct Point {
    pub common: EntityCommon,
    /// Location (10)
    pub location: Vector3,
    /// Thickness (39)
    pub thickness: f64,
    rotation: f64,
}

impl Point {
    pub fn new() -> Self {
        Point {
            common: EntityCommon::new(),
            location: Vector3::ZERO,
            thickness: 0.0,
            rotation: 0.0,
        }
    }

    pub fn at(location: Vector3) -> Self {
        Point {
            location,
            ..Self::new()
        }
    }

    /// Angle of the X axis of the UCS used when the point was drawn (50), degrees
    pub fn rotation(&self) -> f64 {
        self.rotation
    }

    pub fn set_rotation(&mut self, degrees: f64) {
        self.rotation = normalize_angle(degrees);
    }
}

impl Default for Point {
    fn default() -> Self {
        Self::new()
    }
}

super::impl_entity!(Point, "POINT");
