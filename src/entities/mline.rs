//! Multiline entity

use bitflags::bitflags;

use super::EntityCommon;
use crate::types::{Handle, Vector3};

/// Justification (group code 70)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MLineJustification {
    Top,
    #[default]
    Zero,
    Bottom,
}

impl MLineJustification {
    pub fn from_value(value: i16) -> Self {
        match value {
            0 => MLineJustification::Top,
            2 => MLineJustification::Bottom,
            _ => MLineJustification::Zero,
        }
    }

    pub fn value(&self) -> i16 {
        *self as i16
    }
}

bitflags! {
    /// Multiline flags (group code 71)
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct MLineFlags: i16 {
        const HAS_VERTICES = 1;
        const CLOSED = 2;
        const NO_START_CAPS = 4;
        const NO_END_CAPS = 8;
    }
}

/// Element parameters at one vertex
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MLineSegment {
    /// Element parameters (41 after 74)
    pub parameters: Vec<f64>,
    /// Area fill parameters (42 after 75)
    pub area_fill_parameters: Vec<f64>,
}

/// Multiline vertex
#[derive(Debug, Clone, PartialEq)]
pub struct MLineVertex {
    /// Position (11)
    pub position: Vector3,
    /// Direction of the segment starting here (12)
    pub direction: Vector3,
    /// Miter direction (13)
    pub miter: Vector3,
    /// One entry per style element
    pub segments: Vec<MLineSegment>,
}

impl MLineVertex {
    pub fn new(position: Vector3) -> Self {
        MLineVertex {
            position,
            direction: Vector3::UNIT_X,
            miter: Vector3::UNIT_Y,
            segments: Vec::new(),
        }
    }
}

/// Multiline: parallel lines defined by an MLINESTYLE
#[derive(Debug, Clone, PartialEq)]
pub struct MLine {
    pub common: EntityCommon,
    /// Style name (2)
    pub style_name: String,
    /// MLINESTYLE object (340)
    pub style: Handle,
    /// Scale factor (40)
    pub scale: f64,
    pub justification: MLineJustification,
    pub flags: MLineFlags,
    /// Start point (10)
    pub start_point: Vector3,
    pub vertices: Vec<MLineVertex>,
}

impl MLine {
    pub fn new() -> Self {
        MLine {
            common: EntityCommon::new(),
            style_name: "Standard".to_string(),
            style: Handle::NULL,
            scale: 1.0,
            justification: MLineJustification::Zero,
            flags: MLineFlags::HAS_VERTICES,
            start_point: Vector3::ZERO,
            vertices: Vec::new(),
        }
    }

    /// Number of style elements (73)
    pub fn element_count(&self) -> usize {
        self.vertices.first().map(|v| v.segments.len()).unwrap_or(0)
    }

    pub fn is_closed(&self) -> bool {
        self.flags.contains(MLineFlags::CLOSED)
    }
}

impl Default for MLine {
    fn default() -> Self {
        Self::new()
    }
}

super::impl_entity!(MLine, "MLINE");
