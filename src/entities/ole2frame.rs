//! OLE2FRAME entity

use super::EntityCommon;
use crate::types::Vector3;

/// OLE object type (group code 71)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OleObjectType {
    Link,
    #[default]
    Embedded,
    Static,
}

impl OleObjectType {
    pub fn from_value(value: i16) -> Self {
        match value {
            1 => OleObjectType::Link,
            3 => OleObjectType::Static,
            _ => OleObjectType::Embedded,
        }
    }

    pub fn value(&self) -> i16 {
        match self {
            OleObjectType::Link => 1,
            OleObjectType::Embedded => 2,
            OleObjectType::Static => 3,
        }
    }
}

/// Embedded OLE2 object with its binary payload
#[derive(Debug, Clone, PartialEq)]
pub struct Ole2Frame {
    pub common: EntityCommon,
    /// OLE version (70)
    pub version: i16,
    /// Source application name (3)
    pub source_application: String,
    /// Upper-left corner (10)
    pub upper_left_corner: Vector3,
    /// Lower-right corner (11)
    pub lower_right_corner: Vector3,
    pub object_type: OleObjectType,
    /// Tile mode descriptor (72): false for model space
    pub in_paper_space: bool,
    /// Payload, written as 310 chunks after the length (90)
    pub binary_data: Vec<u8>,
}

impl Ole2Frame {
    pub fn new() -> Self {
        Ole2Frame {
            common: EntityCommon::new(),
            version: 2,
            source_application: String::new(),
            upper_left_corner: Vector3::ZERO,
            lower_right_corner: Vector3::ZERO,
            object_type: OleObjectType::Embedded,
            in_paper_space: false,
            binary_data: Vec::new(),
        }
    }
}

impl Default for Ole2Frame {
    fn default() -> Self {
        Self::new()
    }
}

super::impl_entity!(Ole2Frame, "OLE2FRAME");
