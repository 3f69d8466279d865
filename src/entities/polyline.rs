//! POLYLINE family: 2D/3D polylines, polyface and polygon meshes
//!
//! All four share the DXF name `POLYLINE`; the variant is chosen from the
//! flag bits of group code 70. Vertices are separate `VERTEX` records and
//! the sequence ends with a `SEQEND` record, each with its own handle.

use bitflags::bitflags;

use super::EntityCommon;
use crate::types::{Handle, Vector3};

bitflags! {
    /// Polyline flags (group code 70)
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct PolylineFlags: i16 {
        const CLOSED = 1;
        const CURVE_FIT = 2;
        const SPLINE_FIT = 4;
        const POLYLINE_3D = 8;
        const POLYGON_MESH = 16;
        /// Polygon mesh closed in N direction
        const CLOSED_N = 32;
        const POLYFACE_MESH = 64;
        /// Continuous linetype pattern around vertices
        const LINETYPE_CONTINUOUS = 128;
    }
}

bitflags! {
    /// Vertex flags (group code 70)
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct VertexFlags: i16 {
        const CURVE_FIT_EXTRA = 1;
        const CURVE_FIT_TANGENT = 2;
        const SPLINE_VERTEX = 8;
        const SPLINE_CONTROL = 16;
        const POLYLINE_3D = 32;
        const POLYGON_MESH = 64;
        const POLYFACE_MESH = 128;
    }
}

/// Curves and smooth surface type (group code 75)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SmoothSurfaceType {
    #[default]
    None,
    Quadratic,
    Cubic,
    Bezier,
}

impl SmoothSurfaceType {
    pub fn from_value(value: i16) -> Self {
        match value {
            5 => SmoothSurfaceType::Quadratic,
            6 => SmoothSurfaceType::Cubic,
            8 => SmoothSurfaceType::Bezier,
            _ => SmoothSurfaceType::None,
        }
    }

    pub fn value(&self) -> i16 {
        match self {
            SmoothSurfaceType::None => 0,
            SmoothSurfaceType::Quadratic => 5,
            SmoothSurfaceType::Cubic => 6,
            SmoothSurfaceType::Bezier => 8,
        }
    }
}

/// End-of-sequence marker that closes vertex and attribute lists
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Seqend {
    pub common: EntityCommon,
}

super::impl_entity!(Seqend, "SEQEND");

/// Vertex of a 2D polyline
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Vertex2D {
    pub common: EntityCommon,
    /// Location in OCS (10)
    pub location: Vector3,
    /// Start width (40)
    pub start_width: f64,
    /// End width (41)
    pub end_width: f64,
    /// Bulge (42)
    pub bulge: f64,
    pub flags: VertexFlags,
    /// Curve fit tangent direction (50), degrees
    pub curve_tangent: f64,
}

impl Vertex2D {
    pub fn new(location: Vector3) -> Self {
        Vertex2D {
            location,
            ..Default::default()
        }
    }
}

super::impl_entity!(Vertex2D, "VERTEX");

/// Vertex of a 3D polyline
#[derive(Debug, Clone, PartialEq)]
pub struct Vertex3D {
    pub common: EntityCommon,
    /// Location in WCS (10)
    pub location: Vector3,
    pub flags: VertexFlags,
}

impl Vertex3D {
    pub fn new(location: Vector3) -> Self {
        Vertex3D {
            common: EntityCommon::new(),
            location,
            flags: VertexFlags::POLYLINE_3D,
        }
    }
}

super::impl_entity!(Vertex3D, "VERTEX");

/// Location vertex of a polyface mesh
#[derive(Debug, Clone, PartialEq)]
pub struct PolyfaceVertex {
    pub common: EntityCommon,
    pub location: Vector3,
    pub flags: VertexFlags,
}

impl PolyfaceVertex {
    pub fn new(location: Vector3) -> Self {
        PolyfaceVertex {
            common: EntityCommon::new(),
            location,
            flags: VertexFlags::POLYGON_MESH | VertexFlags::POLYFACE_MESH,
        }
    }
}

super::impl_entity!(PolyfaceVertex, "VERTEX");

/// Face record of a polyface mesh.
///
/// Indices are 1-based into the mesh's vertex list; a negative index
/// marks the edge starting at that vertex as invisible, 0 means unused.
#[derive(Debug, Clone, PartialEq)]
pub struct PolyfaceFace {
    pub common: EntityCommon,
    /// Vertex indices (71-74)
    pub indices: [i16; 4],
}

impl PolyfaceFace {
    pub fn new(indices: [i16; 4]) -> Self {
        PolyfaceFace {
            common: EntityCommon::new(),
            indices,
        }
    }

    /// Number of indices in use
    pub fn corner_count(&self) -> usize {
        self.indices.iter().take_while(|&&i| i != 0).count()
    }
}

super::impl_entity!(PolyfaceFace, "VERTEX");

/// Vertex of a polygon mesh
#[derive(Debug, Clone, PartialEq)]
pub struct PolygonMeshVertex {
    pub common: EntityCommon,
    pub location: Vector3,
    pub flags: VertexFlags,
}

impl PolygonMeshVertex {
    pub fn new(location: Vector3) -> Self {
        PolygonMeshVertex {
            common: EntityCommon::new(),
            location,
            flags: VertexFlags::POLYGON_MESH,
        }
    }
}

super::impl_entity!(PolygonMeshVertex, "VERTEX");

fn collect_handles<'a>(
    vertices: impl Iterator<Item = &'a EntityCommon>,
    seqend: &Seqend,
) -> Vec<Handle> {
    vertices
        .map(|c| c.handle)
        .chain(std::iter::once(seqend.common.handle))
        .collect()
}

/// 2D polyline (elevation and vertices in OCS)
#[derive(Debug, Clone, PartialEq)]
pub struct Polyline2D {
    pub common: EntityCommon,
    pub vertices: Vec<Vertex2D>,
    pub flags: PolylineFlags,
    /// Z of the dummy point (30)
    pub elevation: f64,
    /// Thickness (39)
    pub thickness: f64,
    /// Default start width (40)
    pub start_width: f64,
    /// Default end width (41)
    pub end_width: f64,
    /// Smooth surface type (75)
    pub smooth_surface: SmoothSurfaceType,
    pub seqend: Seqend,
}

impl Polyline2D {
    pub fn new() -> Self {
        Polyline2D {
            common: EntityCommon::new(),
            vertices: Vec::new(),
            flags: PolylineFlags::empty(),
            elevation: 0.0,
            thickness: 0.0,
            start_width: 0.0,
            end_width: 0.0,
            smooth_surface: SmoothSurfaceType::None,
            seqend: Seqend::default(),
        }
    }

    pub fn is_closed(&self) -> bool {
        self.flags.contains(PolylineFlags::CLOSED)
    }

    pub fn owned_handles(&self) -> Vec<Handle> {
        collect_handles(self.vertices.iter().map(|v| &v.common), &self.seqend)
    }
}

impl Default for Polyline2D {
    fn default() -> Self {
        Self::new()
    }
}

super::impl_entity!(Polyline2D, "POLYLINE");

/// 3D polyline
#[derive(Debug, Clone, PartialEq)]
pub struct Polyline3D {
    pub common: EntityCommon,
    pub vertices: Vec<Vertex3D>,
    pub flags: PolylineFlags,
    pub smooth_surface: SmoothSurfaceType,
    pub seqend: Seqend,
}

impl Polyline3D {
    pub fn new() -> Self {
        Polyline3D {
            common: EntityCommon::new(),
            vertices: Vec::new(),
            flags: PolylineFlags::POLYLINE_3D,
            smooth_surface: SmoothSurfaceType::None,
            seqend: Seqend::default(),
        }
    }

    pub fn from_points(points: impl IntoIterator<Item = Vector3>, closed: bool) -> Self {
        let mut polyline = Self::new();
        polyline.vertices = points.into_iter().map(Vertex3D::new).collect();
        polyline.flags.set(PolylineFlags::CLOSED, closed);
        polyline
    }

    pub fn owned_handles(&self) -> Vec<Handle> {
        collect_handles(self.vertices.iter().map(|v| &v.common), &self.seqend)
    }
}

impl Default for Polyline3D {
    fn default() -> Self {
        Self::new()
    }
}

super::impl_entity!(Polyline3D, "POLYLINE");

/// Polyface mesh: location vertices followed by face records
#[derive(Debug, Clone, PartialEq)]
pub struct PolyfaceMesh {
    pub common: EntityCommon,
    pub vertices: Vec<PolyfaceVertex>,
    pub faces: Vec<PolyfaceFace>,
    pub flags: PolylineFlags,
    pub seqend: Seqend,
}

impl PolyfaceMesh {
    pub fn new() -> Self {
        PolyfaceMesh {
            common: EntityCommon::new(),
            vertices: Vec::new(),
            faces: Vec::new(),
            flags: PolylineFlags::POLYFACE_MESH,
            seqend: Seqend::default(),
        }
    }

    pub fn owned_handles(&self) -> Vec<Handle> {
        let records = self
            .vertices
            .iter()
            .map(|v| &v.common)
            .chain(self.faces.iter().map(|f| &f.common));
        collect_handles(records, &self.seqend)
    }
}

impl Default for PolyfaceMesh {
    fn default() -> Self {
        Self::new()
    }
}

super::impl_entity!(PolyfaceMesh, "POLYLINE");

/// M x N polygon mesh
#[derive(Debug, Clone, PartialEq)]
pub struct PolygonMesh {
    pub common: EntityCommon,
    pub vertices: Vec<PolygonMeshVertex>,
    pub flags: PolylineFlags,
    /// Vertex count in M direction (71)
    pub m_count: i16,
    /// Vertex count in N direction (72)
    pub n_count: i16,
    /// Smooth surface M density (73)
    pub m_density: i16,
    /// Smooth surface N density (74)
    pub n_density: i16,
    pub smooth_surface: SmoothSurfaceType,
    pub seqend: Seqend,
}

impl PolygonMesh {
    pub fn new() -> Self {
        PolygonMesh {
            common: EntityCommon::new(),
            vertices: Vec::new(),
            flags: PolylineFlags::POLYGON_MESH,
            m_count: 0,
            n_count: 0,
            m_density: 0,
            n_density: 0,
            smooth_surface: SmoothSurfaceType::None,
            seqend: Seqend::default(),
        }
    }

    pub fn owned_handles(&self) -> Vec<Handle> {
        collect_handles(self.vertices.iter().map(|v| &v.common), &self.seqend)
    }
}

impl Default for PolygonMesh {
    fn default() -> Self {
        Self::new()
    }
}

super::impl_entity!(PolygonMesh, "POLYLINE");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_owned_handles_include_seqend() {
        let mut p = Polyline3D::from_points([Vector3::ZERO, Vector3::UNIT_X], false);
        p.vertices[0].common.handle = Handle::new(0x20);
        p.vertices[1].common.handle = Handle::new(0x21);
        p.seqend.common.handle = Handle::new(0x22);
        assert_eq!(
            p.owned_handles(),
            vec![Handle::new(0x20), Handle::new(0x21), Handle::new(0x22)]
        );
    }

    #[test]
    fn test_face_corner_count() {
        assert_eq!(PolyfaceFace::new([1, 2, -3, 0]).corner_count(), 3);
        assert_eq!(SmoothSurfaceType::from_value(6), SmoothSurfaceType::Cubic);
    }
}
