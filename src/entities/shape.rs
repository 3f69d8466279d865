//! Shape entity

use super::text::{check_oblique, check_positive};
use super::EntityCommon;
use crate::error::ArgumentError;
use crate::types::{normalize_angle, Vector3};

/// Reference to a shape in an SHX shape file
#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    pub common: EntityCommon,
    /// Shape name (2)
    pub name: String,
    /// Insertion point (10)
    pub insertion_point: Vector3,
    /// Thickness (39)
    pub thickness: f64,
    size: f64,
    rotation: f64,
    width_factor: f64,
    oblique_angle: f64,
}

impl Shape {
    pub fn new(name: impl Into<String>, insertion_point: Vector3) -> Self {
        Shape {
            common: EntityCommon::new(),
            name: name.into(),
            insertion_point,
            thickness: 0.0,
            size: 1.0,
            rotation: 0.0,
            width_factor: 1.0,
            oblique_angle: 0.0,
        }
    }

    /// Size (40)
    pub fn size(&self) -> f64 {
        self.size
    }

    pub fn set_size(&mut self, size: f64) -> Result<(), ArgumentError> {
        self.size = check_positive("size", size)?;
        Ok(())
    }

    /// Rotation in degrees (50)
    pub fn rotation(&self) -> f64 {
        self.rotation
    }

    pub fn set_rotation(&mut self, degrees: f64) {
        self.rotation = normalize_angle(degrees);
    }

    /// Relative X scale (41)
    pub fn width_factor(&self) -> f64 {
        self.width_factor
    }

    pub fn set_width_factor(&mut self, factor: f64) -> Result<(), ArgumentError> {
        self.width_factor = check_positive("width_factor", factor)?;
        Ok(())
    }

    /// Oblique angle in degrees (51)
    pub fn oblique_angle(&self) -> f64 {
        self.oblique_angle
    }

    pub fn set_oblique_angle(&mut self, degrees: f64) -> Result<(), ArgumentError> {
        self.oblique_angle = check_oblique(degrees)?;
        Ok(())
    }
}

impl Default for Shape {
    fn default() -> Self {
        Self::new("", Vector3::ZERO)
    }
}

super::impl_entity!(Shape, "SHAPE");
