//! Wipeout entity

use bitflags::bitflags;

use super::EntityCommon;
use crate::types::{Handle, Vector2, Vector3};

bitflags! {
    /// Image display flags (group code 70)
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct WipeoutDisplayFlags: i16 {
        const SHOW_IMAGE = 1;
        const SHOW_NOT_ALIGNED = 2;
        const USE_CLIPPING_BOUNDARY = 4;
        const TRANSPARENCY_ON = 8;
    }
}

impl Default for WipeoutDisplayFlags {
    fn default() -> Self {
        WipeoutDisplayFlags::SHOW_IMAGE
            | WipeoutDisplayFlags::SHOW_NOT_ALIGNED
            | WipeoutDisplayFlags::USE_CLIPPING_BOUNDARY
    }
}

/// Clip boundary type (group code 71)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WipeoutClipType {
    Rectangular,
    #[default]
    Polygonal,
}

impl WipeoutClipType {
    pub fn from_value(value: i16) -> Self {
        if value == 1 {
            WipeoutClipType::Rectangular
        } else {
            WipeoutClipType::Polygonal
        }
    }

    pub fn value(&self) -> i16 {
        match self {
            WipeoutClipType::Rectangular => 1,
            WipeoutClipType::Polygonal => 2,
        }
    }
}

/// Area masking the objects drawn behind it
#[derive(Debug, Clone, PartialEq)]
pub struct Wipeout {
    pub common: EntityCommon,
    /// Class version (90)
    pub class_version: i32,
    /// Insertion point (10)
    pub insertion_point: Vector3,
    /// One pixel along the image U axis (11)
    pub u_vector: Vector3,
    /// One pixel along the image V axis (12)
    pub v_vector: Vector3,
    /// Image size in pixels (13)
    pub size: Vector2,
    /// Image definition (340), normally null for wipeouts
    pub definition: Handle,
    /// Image definition reactor (360)
    pub definition_reactor: Handle,
    pub flags: WipeoutDisplayFlags,
    /// Clipping state (280)
    pub clipping_enabled: bool,
    /// Brightness (281)
    pub brightness: i16,
    /// Contrast (282)
    pub contrast: i16,
    /// Fade (283)
    pub fade: i16,
    pub clip_type: WipeoutClipType,
    /// Clip boundary vertices in pixel space (14, repeated)
    pub clip_boundary: Vec<Vector2>,
    /// Clip inside mode (290)
    pub clip_inside: bool,
}

impl Wipeout {
    pub fn new() -> Self {
        Wipeout {
            common: EntityCommon::new(),
            class_version: 0,
            insertion_point: Vector3::ZERO,
            u_vector: Vector3::UNIT_X,
            v_vector: Vector3::UNIT_Y,
            size: Vector2::new(1.0, 1.0),
            definition: Handle::NULL,
            definition_reactor: Handle::NULL,
            flags: WipeoutDisplayFlags::default(),
            clipping_enabled: true,
            brightness: 50,
            contrast: 50,
            fade: 0,
            clip_type: WipeoutClipType::Polygonal,
            clip_boundary: Vec::new(),
            clip_inside: false,
        }
    }

    /// Rectangular wipeout covering `width` x `height` from `corner`
    pub fn rectangle(corner: Vector3, width: f64, height: f64) -> Self {
        Wipeout {
            insertion_point: corner,
            u_vector: Vector3::new(width, 0.0, 0.0),
            v_vector: Vector3::new(0.0, height, 0.0),
            clip_type: WipeoutClipType::Rectangular,
            clip_boundary: vec![Vector2::new(-0.5, -0.5), Vector2::new(0.5, 0.5)],
            ..Self::new()
        }
    }
}

impl Default for Wipeout {
    fn default() -> Self {
        Self::new()
    }
}

super::impl_entity!(Wipeout, "WIPEOUT");
