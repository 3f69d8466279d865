//! Hatch entity and boundary path types

use bitflags::bitflags;

use super::EntityCommon;
use crate::error::ArgumentError;
use crate::types::{Color, Handle, Vector2};

/// Hatch pattern type (group code 76)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HatchPatternType {
    UserDefined,
    #[default]
    Predefined,
    Custom,
}

impl HatchPatternType {
    pub fn from_value(value: i16) -> Self {
        match value {
            0 => HatchPatternType::UserDefined,
            2 => HatchPatternType::Custom,
            _ => HatchPatternType::Predefined,
        }
    }

    pub fn value(&self) -> i16 {
        match self {
            HatchPatternType::UserDefined => 0,
            HatchPatternType::Predefined => 1,
            HatchPatternType::Custom => 2,
        }
    }
}

/// Hatch style (group code 75)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HatchStyleType {
    /// Odd parity area
    #[default]
    Normal,
    /// Outermost area only
    Outer,
    /// Entire area
    Ignore,
}

impl HatchStyleType {
    pub fn from_value(value: i16) -> Self {
        match value {
            1 => HatchStyleType::Outer,
            2 => HatchStyleType::Ignore,
            _ => HatchStyleType::Normal,
        }
    }

    pub fn value(&self) -> i16 {
        match self {
            HatchStyleType::Normal => 0,
            HatchStyleType::Outer => 1,
            HatchStyleType::Ignore => 2,
        }
    }
}

bitflags! {
    /// Boundary path flags (group code 92)
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct BoundaryPathFlags: i32 {
        const EXTERNAL = 1;
        const POLYLINE = 2;
        const DERIVED = 4;
        const TEXTBOX = 8;
        const OUTERMOST = 16;
        const NOT_CLOSED = 32;
        const SELF_INTERSECTING = 64;
        const TEXT_ISLAND = 128;
        const DUPLICATE = 256;
    }
}

/// Line edge (edge type 1)
#[derive(Debug, Clone, PartialEq)]
pub struct LineEdge {
    pub start: Vector2,
    pub end: Vector2,
}

/// Circular arc edge (edge type 2). Angles in degrees.
#[derive(Debug, Clone, PartialEq)]
pub struct ArcEdge {
    pub center: Vector2,
    pub radius: f64,
    pub start_angle: f64,
    pub end_angle: f64,
    pub counter_clockwise: bool,
}

impl ArcEdge {
    pub fn circle(center: Vector2, radius: f64) -> Self {
        ArcEdge {
            center,
            radius,
            start_angle: 0.0,
            end_angle: 360.0,
            counter_clockwise: true,
        }
    }
}

/// Elliptic arc edge (edge type 3). Angles in degrees.
#[derive(Debug, Clone, PartialEq)]
pub struct EllipseEdge {
    pub center: Vector2,
    /// Major axis endpoint relative to the center
    pub major_axis: Vector2,
    pub minor_axis_ratio: f64,
    pub start_angle: f64,
    pub end_angle: f64,
    pub counter_clockwise: bool,
}

/// Spline edge (edge type 4)
#[derive(Debug, Clone, PartialEq)]
pub struct SplineEdge {
    pub degree: i32,
    pub rational: bool,
    pub periodic: bool,
    pub knots: Vec<f64>,
    pub control_points: Vec<Vector2>,
    /// Weights, present only for rational splines
    pub weights: Vec<f64>,
    pub fit_points: Vec<Vector2>,
    pub start_tangent: Option<Vector2>,
    pub end_tangent: Option<Vector2>,
}

/// Polyline boundary vertex
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BulgeVertex {
    pub location: Vector2,
    pub bulge: f64,
}

/// Polyline edge: the only edge of a path flagged `POLYLINE`
#[derive(Debug, Clone, PartialEq)]
pub struct PolylineEdge {
    pub vertices: Vec<BulgeVertex>,
    pub is_closed: bool,
}

impl PolylineEdge {
    pub fn new(points: impl IntoIterator<Item = Vector2>, is_closed: bool) -> Self {
        PolylineEdge {
            vertices: points
                .into_iter()
                .map(|location| BulgeVertex {
                    location,
                    bulge: 0.0,
                })
                .collect(),
            is_closed,
        }
    }

    pub fn has_bulge(&self) -> bool {
        self.vertices.iter().any(|v| v.bulge != 0.0)
    }
}

/// Boundary path edge
#[derive(Debug, Clone, PartialEq)]
pub enum BoundaryEdge {
    Line(LineEdge),
    Arc(ArcEdge),
    Ellipse(EllipseEdge),
    Spline(SplineEdge),
    Polyline(PolylineEdge),
}

impl BoundaryEdge {
    /// Edge type code (72); polylines have none
    pub fn edge_type(&self) -> Option<i16> {
        match self {
            BoundaryEdge::Line(_) => Some(1),
            BoundaryEdge::Arc(_) => Some(2),
            BoundaryEdge::Ellipse(_) => Some(3),
            BoundaryEdge::Spline(_) => Some(4),
            BoundaryEdge::Polyline(_) => None,
        }
    }

    /// Whether this edge already forms a closed loop on its own
    pub fn is_closed_loop(&self) -> bool {
        match self {
            BoundaryEdge::Arc(arc) => (arc.end_angle - arc.start_angle).abs() >= 360.0,
            BoundaryEdge::Ellipse(e) => (e.end_angle - e.start_angle).abs() >= 360.0,
            BoundaryEdge::Polyline(p) => p.is_closed,
            BoundaryEdge::Line(_) | BoundaryEdge::Spline(_) => false,
        }
    }
}

/// One loop of a hatch boundary
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BoundaryPath {
    pub flags: BoundaryPathFlags,
    edges: Vec<BoundaryEdge>,
    /// Source boundary objects (330) of an associative hatch
    pub boundary_handles: Vec<Handle>,
}

impl BoundaryPath {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn external() -> Self {
        BoundaryPath {
            flags: BoundaryPathFlags::EXTERNAL,
            ..Self::default()
        }
    }

    pub fn edges(&self) -> &[BoundaryEdge] {
        &self.edges
    }

    /// Append an edge.
    ///
    /// A full circle, full ellipse or closed polyline must be the only
    /// edge of its path. A polyline, open or closed, is written in its own
    /// path form and cannot share a path either.
    pub fn add_edge(&mut self, edge: BoundaryEdge) -> Result<(), ArgumentError> {
        let is_polyline = matches!(edge, BoundaryEdge::Polyline(_));
        let holds_polyline = self.edges.iter().any(|e| matches!(e, BoundaryEdge::Polyline(_)));
        if (is_polyline && !self.edges.is_empty()) || holds_polyline {
            return Err(ArgumentError::new(
                "edges",
                "polyline boundary cannot combine with other entities",
            ));
        }
        let mixes = if edge.is_closed_loop() {
            !self.edges.is_empty()
        } else {
            self.edges.iter().any(BoundaryEdge::is_closed_loop)
        };
        if mixes {
            return Err(ArgumentError::new(
                "edges",
                "closed loop cannot combine with other entities",
            ));
        }
        if is_polyline {
            self.flags |= BoundaryPathFlags::POLYLINE;
        }
        self.edges.push(edge);
        Ok(())
    }

    pub fn is_polyline(&self) -> bool {
        self.flags.contains(BoundaryPathFlags::POLYLINE)
    }
}

/// Pattern definition line. Angle in degrees.
#[derive(Debug, Clone, PartialEq)]
pub struct HatchPatternLine {
    pub angle: f64,
    pub base_point: Vector2,
    pub offset: Vector2,
    /// Positive for dashes, negative for gaps
    pub dash_lengths: Vec<f64>,
}

/// Hatch pattern
#[derive(Debug, Clone, PartialEq)]
pub struct HatchPattern {
    /// Pattern name (2)
    pub name: String,
    pub lines: Vec<HatchPatternLine>,
}

impl HatchPattern {
    pub fn new(name: impl Into<String>) -> Self {
        HatchPattern {
            name: name.into(),
            lines: Vec::new(),
        }
    }

    pub fn solid() -> Self {
        Self::new("SOLID")
    }
}

/// Gradient stop
#[derive(Debug, Clone, PartialEq)]
pub struct GradientColorEntry {
    /// Position (463)
    pub value: f64,
    pub color: Color,
}

/// Gradient fill (codes 450-470)
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HatchGradientPattern {
    pub enabled: bool,
    pub reserved: i32,
    /// Angle in radians (460)
    pub angle: f64,
    pub shift: f64,
    pub is_single_color: bool,
    pub color_tint: f64,
    pub colors: Vec<GradientColorEntry>,
    /// Gradient name such as `LINEAR` (470)
    pub name: String,
}

/// Hatch entity
#[derive(Debug, Clone, PartialEq)]
pub struct Hatch {
    pub common: EntityCommon,
    /// Z of the elevation point (30)
    pub elevation: f64,
    pub pattern: HatchPattern,
    /// Solid fill flag (70)
    pub is_solid: bool,
    /// Associativity flag (71)
    pub is_associative: bool,
    pub pattern_type: HatchPatternType,
    /// Pattern angle in degrees (52)
    pub pattern_angle: f64,
    /// Pattern scale or spacing (41)
    pub pattern_scale: f64,
    /// Double flag for user-defined patterns (77)
    pub is_double: bool,
    pub style: HatchStyleType,
    pub paths: Vec<BoundaryPath>,
    /// Seed points in OCS (10/20 after 98)
    pub seed_points: Vec<Vector2>,
    /// Pixel size (47)
    pub pixel_size: f64,
    pub gradient: HatchGradientPattern,
}

impl Hatch {
    pub fn new() -> Self {
        Hatch {
            common: EntityCommon::new(),
            elevation: 0.0,
            pattern: HatchPattern::new("ANSI31"),
            is_solid: false,
            is_associative: false,
            pattern_type: HatchPatternType::Predefined,
            pattern_angle: 0.0,
            pattern_scale: 1.0,
            is_double: false,
            style: HatchStyleType::Normal,
            paths: Vec::new(),
            seed_points: Vec::new(),
            pixel_size: 0.0,
            gradient: HatchGradientPattern::default(),
        }
    }

    pub fn solid() -> Self {
        Hatch {
            pattern: HatchPattern::solid(),
            is_solid: true,
            ..Self::new()
        }
    }

    pub fn add_path(&mut self, path: BoundaryPath) {
        self.paths.push(path);
    }
}

impl Default for Hatch {
    fn default() -> Self {
        Self::new()
    }
}

super::impl_entity!(Hatch, "HATCH");

#[cfg(test)]
mod tests {
    use super::*;

    fn line(x: f64) -> BoundaryEdge {
        BoundaryEdge::Line(LineEdge {
            start: Vector2::new(x, 0.0),
            end: Vector2::new(x + 1.0, 0.0),
        })
    }

    #[test]
    fn test_circle_cannot_follow_line() {
        let mut path = BoundaryPath::new();
        path.add_edge(line(0.0)).unwrap();
        let err = path
            .add_edge(BoundaryEdge::Arc(ArcEdge::circle(Vector2::ZERO, 1.0)))
            .unwrap_err();
        assert_eq!(err.reason, "closed loop cannot combine with other entities");
        assert_eq!(path.edges().len(), 1);
    }

    #[test]
    fn test_line_cannot_follow_circle() {
        let mut path = BoundaryPath::new();
        path.add_edge(BoundaryEdge::Arc(ArcEdge::circle(Vector2::ZERO, 1.0)))
            .unwrap();
        assert!(path.add_edge(line(0.0)).is_err());
    }

    #[test]
    fn test_open_edges_combine() {
        let mut path = BoundaryPath::new();
        path.add_edge(line(0.0)).unwrap();
        path.add_edge(BoundaryEdge::Arc(ArcEdge {
            center: Vector2::ZERO,
            radius: 1.0,
            start_angle: 0.0,
            end_angle: 90.0,
            counter_clockwise: true,
        }))
        .unwrap();
        assert_eq!(path.edges().len(), 2);
    }

    #[test]
    fn test_polyline_sets_flag() {
        let mut path = BoundaryPath::external();
        path.add_edge(BoundaryEdge::Polyline(PolylineEdge::new(
            [Vector2::ZERO, Vector2::new(1.0, 0.0), Vector2::new(1.0, 1.0)],
            true,
        )))
        .unwrap();
        assert!(path.is_polyline());
        assert!(path.flags.contains(BoundaryPathFlags::EXTERNAL));
    }

    fn open_polyline() -> BoundaryEdge {
        BoundaryEdge::Polyline(PolylineEdge::new([Vector2::ZERO, Vector2::new(5.0, 0.0)], false))
    }

    #[test]
    fn test_open_polyline_cannot_follow_line() {
        let mut path = BoundaryPath::new();
        path.add_edge(line(0.0)).unwrap();
        let err = path.add_edge(open_polyline()).unwrap_err();
        assert_eq!(err.field, "edges");
        assert_eq!(err.reason, "polyline boundary cannot combine with other entities");
        assert_eq!(path.edges().len(), 1);
        assert!(!path.is_polyline());
    }

    #[test]
    fn test_nothing_follows_open_polyline() {
        let mut path = BoundaryPath::new();
        path.add_edge(open_polyline()).unwrap();
        assert!(path.add_edge(line(0.0)).is_err());
        assert!(path.add_edge(open_polyline()).is_err());
        assert_eq!(path.edges().len(), 1);
    }
}
