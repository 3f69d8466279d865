//! Subdivision mesh entity (MESH, AC1024+)

use super::EntityCommon;
use crate::types::Vector3;

/// Mesh edge between two vertex indices
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshEdge {
    pub start: usize,
    pub end: usize,
    /// Crease value (140), 0 for a smooth edge
    pub crease: f64,
}

impl MeshEdge {
    pub fn new(start: usize, end: usize) -> Self {
        MeshEdge {
            start,
            end,
            crease: 0.0,
        }
    }
}

/// Subdivision surface mesh
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    pub common: EntityCommon,
    /// Object version (71)
    pub version: i16,
    /// Blend crease (72)
    pub blend_crease: bool,
    /// Subdivision level (91)
    pub subdivision_level: i32,
    /// Vertex positions (10)
    pub vertices: Vec<Vector3>,
    /// Faces as lists of vertex indices
    pub faces: Vec<Vec<usize>>,
    pub edges: Vec<MeshEdge>,
}

impl Mesh {
    pub fn new() -> Self {
        Mesh {
            common: EntityCommon::new(),
            version: 2,
            blend_crease: false,
            subdivision_level: 0,
            vertices: Vec::new(),
            faces: Vec::new(),
            edges: Vec::new(),
        }
    }

    /// Size of the flattened face list (93): each face contributes its
    /// corner count plus the indices
    pub fn face_list_size(&self) -> usize {
        self.faces.iter().map(|f| f.len() + 1).sum()
    }
}

impl Default for Mesh {
    fn default() -> Self {
        Self::new()
    }
}

super::impl_entity!(Mesh, "MESH");
