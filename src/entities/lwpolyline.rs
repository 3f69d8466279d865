//! Lightweight polyline entity

use super::EntityCommon;
use crate::types::Vector2;

/// Vertex of a lightweight polyline
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LwVertex {
    /// Location in OCS (10/20)
    pub location: Vector2,
    /// Start width (40)
    pub start_width: f64,
    /// End width (41)
    pub end_width: f64,
    /// Bulge (42), tangent of a quarter of the included angle
    pub bulge: f64,
}

impl LwVertex {
    pub fn new(location: Vector2) -> Self {
        LwVertex {
            location,
            start_width: 0.0,
            end_width: 0.0,
            bulge: 0.0,
        }
    }

    pub fn with_bulge(location: Vector2, bulge: f64) -> Self {
        LwVertex {
            bulge,
            ..Self::new(location)
        }
    }
}

/// Planar polyline with vertices stored inline (AC1014+)
#[derive(Debug, Clone, PartialEq)]
pub struct LwPolyline {
    pub common: EntityCommon,
    pub vertices: Vec<LwVertex>,
    /// Closed flag (bit 1 of 70)
    pub is_closed: bool,
    /// Linetype generation flag (bit 128 of 70)
    pub plinegen: bool,
    /// Constant width (43)
    pub constant_width: f64,
    /// Elevation (38)
    pub elevation: f64,
    /// Thickness (39)
    pub thickness: f64,
}

impl LwPolyline {
    pub fn new() -> Self {
        LwPolyline {
            common: EntityCommon::new(),
            vertices: Vec::new(),
            is_closed: false,
            plinegen: false,
            constant_width: 0.0,
            elevation: 0.0,
            thickness: 0.0,
        }
    }

    pub fn from_points(points: impl IntoIterator<Item = Vector2>, closed: bool) -> Self {
        LwPolyline {
            vertices: points.into_iter().map(LwVertex::new).collect(),
            is_closed: closed,
            ..Self::new()
        }
    }

    pub fn add_vertex(&mut self, vertex: LwVertex) {
        self.vertices.push(vertex);
    }

    /// Value of group code 70
    pub fn flags(&self) -> i16 {
        let mut flags = 0;
        if self.is_closed {
            flags |= 1;
        }
        if self.plinegen {
            flags |= 128;
        }
        flags
    }

    pub fn set_flags(&mut self, flags: i16) {
        self.is_closed = flags & 1 != 0;
        self.plinegen = flags & 128 != 0;
    }
}

impl Default for LwPolyline {
    fn default() -> Self {
        Self::new()
    }
}

super::impl_entity!(LwPolyline, "LWPOLYLINE");
