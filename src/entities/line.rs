//! Line entity

use super::EntityCommon;
use crate::types::Vector3;

/// A line segment between two points
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    pub common: EntityCommon,
    /// Start point (10)
    pub start: Vector3,
    /// End point (11)
    pub end: Vector3,
    /// Thickness (39)
    pub thickness: f64,
}

impl Line {
    pub fn new() -> Self {
        Line {
            common: EntityCommon::new(),
            start: Vector3::ZERO,
            end: Vector3::ZERO,
            thickness: 0.0,
        }
    }

    pub fn from_points(start: Vector3, end: Vector3) -> Self {
        Line {
            start,
            end,
            ..Self::new()
        }
    }

    pub fn from_coords(x1: f64, y1: f64, z1: f64, x2: f64, y2: f64, z2: f64) -> Self {
        Self::from_points(Vector3::new(x1, y1, z1), Vector3::new(x2, y2, z2))
    }

    pub fn length(&self) -> f64 {
        self.start.distance(&self.end)
    }
}

impl Default for Line {
    fn default() -> Self {
        Self::new()
    }
}

super::impl_entity!(Line, "LINE");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_creation() {
        let line = Line::from_coords(0.0, 0.0, 0.0, 3.0, 4.0, 0.0);
        assert_eq!(line.length(), 5.0);
        assert_eq!(line.common.layer, "0");
    }
}
