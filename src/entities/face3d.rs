//! 3D face entity

use bitflags::bitflags;

use super::EntityCommon;
use crate::types::Vector3;

bitflags! {
    /// Invisible edge flags (group code 70)
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct InvisibleEdgeFlags: i16 {
        const FIRST = 1;
        const SECOND = 2;
        const THIRD = 4;
        const FOURTH = 8;
    }
}

/// Three or four sided face. A triangle repeats the third corner.
#[derive(Debug, Clone, PartialEq)]
pub struct Face3D {
    pub common: EntityCommon,
    /// Corners (10, 11, 12, 13)
    pub first_corner: Vector3,
    pub second_corner: Vector3,
    pub third_corner: Vector3,
    pub fourth_corner: Vector3,
    pub invisible_edges: InvisibleEdgeFlags,
}

impl Face3D {
    pub fn new() -> Self {
        Face3D {
            common: EntityCommon::new(),
            first_corner: Vector3::ZERO,
            second_corner: Vector3::ZERO,
            third_corner: Vector3::ZERO,
            fourth_corner: Vector3::ZERO,
            invisible_edges: InvisibleEdgeFlags::empty(),
        }
    }

    pub fn triangle(a: Vector3, b: Vector3, c: Vector3) -> Self {
        Face3D {
            first_corner: a,
            second_corner: b,
            third_corner: c,
            fourth_corner: c,
            ..Self::new()
        }
    }

    pub fn is_triangle(&self) -> bool {
        self.third_corner == self.fourth_corner
    }
}

impl Default for Face3D {
    fn default() -> Self {
        Self::new()
    }
}

super::impl_entity!(Face3D, "3DFACE");
