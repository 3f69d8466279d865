//! SOLID and TRACE entities
//!
//! Both share the `AcDbTrace` subclass layout; they differ only in name.

use super::EntityCommon;
use crate::types::Vector3;

macro_rules! filled_quad {
    ($(#[$doc:meta])* $ty:ident, $name:expr) => {
        $(#[$doc])*
        #[derive(Debug, Clone, PartialEq)]
        pub struct $ty {
            pub common: EntityCommon,
            /// Corners in OCS (10, 11, 12, 13)
            pub first_corner: Vector3,
            pub second_corner: Vector3,
            pub third_corner: Vector3,
            pub fourth_corner: Vector3,
            /// Thickness (39)
            pub thickness: f64,
        }

        impl $ty {
            pub fn new() -> Self {
                $ty {
                    common: EntityCommon::new(),
                    first_corner: Vector3::ZERO,
                    second_corner: Vector3::ZERO,
                    third_corner: Vector3::ZERO,
                    fourth_corner: Vector3::ZERO,
                    thickness: 0.0,
                }
            }

            pub fn from_corners(corners: [Vector3; 4]) -> Self {
                let [first_corner, second_corner, third_corner, fourth_corner] = corners;
                $ty {
                    first_corner,
                    second_corner,
                    third_corner,
                    fourth_corner,
                    ..Self::new()
                }
            }
        }

        impl Default for $ty {
            fn default() -> Self {
                Self::new()
            }
        }

        super::impl_entity!($ty, $name);
    };
}

filled_quad!(
    /// Filled triangle or quadrilateral. Corners 3 and 4 are drawn crosswise.
    Solid,
    "SOLID"
);

filled_quad!(
    /// Wide line segment
    Trace,
    "TRACE"
);
