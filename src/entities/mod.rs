//! Entity object model
//!
//! Every concrete entity embeds an [`EntityCommon`] (composition, not
//! inheritance) and the closed set of variants is the [`EntityType`] enum.
//! Fields that carry invariants are private and go through validating
//! setters that return [`ArgumentError`]; the DXF mapper turns those errors
//! into `EntityValidation` errors with the offending group code.

use crate::error::ArgumentError;
use crate::types::{Color, Handle, LineWeight, Transparency, Vector3};
use crate::xdata::ExtendedData;

pub mod arc;
pub mod attribute;
pub mod circle;
pub mod dimension;
pub mod ellipse;
pub mod face3d;
pub mod hatch;
pub mod insert;
pub mod line;
pub mod lwpolyline;
pub mod mesh;
pub mod mline;
pub mod mtext;
pub mod ole2frame;
pub mod point;
pub mod polyline;
pub mod ray;
pub mod shape;
pub mod solid;
pub mod spline;
pub mod text;
pub mod underlay;
pub mod unknown_entity;
pub mod wipeout;
pub mod xline;

pub use arc::Arc;
pub use attribute::{Attribute, AttributeDefinition, AttributeFlags, AttributeValue};
pub use circle::Circle;
pub use dimension::*;
pub use ellipse::Ellipse;
pub use face3d::{Face3D, InvisibleEdgeFlags};
pub use hatch::*;
pub use insert::Insert;
pub use line::Line;
pub use lwpolyline::{LwPolyline, LwVertex};
pub use mesh::{Mesh, MeshEdge};
pub use mline::{MLine, MLineFlags, MLineJustification, MLineSegment, MLineVertex};
pub use mtext::{AttachmentPoint, DrawingDirection, LineSpacingStyle, MText};
pub use ole2frame::Ole2Frame;
pub use point::Point;
pub use polyline::*;
pub use ray::Ray;
pub use shape::Shape;
pub use solid::{Solid, Trace};
pub use spline::{Spline, SplineFlags};
pub use text::{Text, TextHorizontalAlignment, TextVerticalAlignment};
pub use underlay::{Underlay, UnderlayDisplayFlags, UnderlayKind};
pub use unknown_entity::UnknownEntity;
pub use wipeout::Wipeout;
pub use xline::XLine;

/// Default line type name ("inherit from layer")
pub const BY_LAYER: &str = "ByLayer";
/// Line type name for "inherit from block"
pub const BY_BLOCK: &str = "ByBlock";

/// Behavior shared by all entities
pub trait Entity {
    fn common(&self) -> &EntityCommon;
    fn common_mut(&mut self) -> &mut EntityCommon;

    /// Name written after group code 0
    fn dxf_name(&self) -> &str;

    fn handle(&self) -> Handle {
        self.common().handle
    }

    fn layer(&self) -> &str {
        &self.common().layer
    }
}

/// Properties every entity has (the `AcDbEntity` subclass plus object bookkeeping)
#[derive(Debug, Clone, PartialEq)]
pub struct EntityCommon {
    /// Unique handle, null until assigned
    pub handle: Handle,
    /// Owning block record (330)
    pub owner: Handle,
    pub reactors: Vec<Handle>,
    pub xdictionary: Handle,
    pub extended_data: ExtendedData,
    /// Layer name (8)
    pub layer: String,
    /// Line type name (6)
    pub linetype: String,
    /// Color (62 / 420)
    pub color: Color,
    /// Line weight (370)
    pub line_weight: LineWeight,
    /// Transparency (440)
    pub transparency: Transparency,
    /// Visibility (60)
    pub invisible: bool,
    /// Entity lives in paper space (67)
    pub paper_space: bool,
    linetype_scale: f64,
    normal: Vector3,
}

impl EntityCommon {
    pub fn new() -> Self {
        EntityCommon {
            handle: Handle::NULL,
            owner: Handle::NULL,
            reactors: Vec::new(),
            xdictionary: Handle::NULL,
            extended_data: ExtendedData::new(),
            layer: "0".to_string(),
            linetype: BY_LAYER.to_string(),
            color: Color::ByLayer,
            line_weight: LineWeight::ByLayer,
            transparency: Transparency::ByLayer,
            invisible: false,
            paper_space: false,
            linetype_scale: 1.0,
            normal: Vector3::UNIT_Z,
        }
    }

    pub fn with_layer(layer: impl Into<String>) -> Self {
        EntityCommon {
            layer: layer.into(),
            ..Self::new()
        }
    }

    /// Line type scale (48)
    pub fn linetype_scale(&self) -> f64 {
        self.linetype_scale
    }

    pub fn set_linetype_scale(&mut self, scale: f64) -> Result<(), ArgumentError> {
        if !(scale.is_finite() && scale > 0.0) {
            return Err(ArgumentError::new(
                "linetype_scale",
                format!("must be greater than zero, got {}", scale),
            ));
        }
        self.linetype_scale = scale;
        Ok(())
    }

    /// Extrusion direction (210), always unit length
    pub fn normal(&self) -> Vector3 {
        self.normal
    }

    pub fn set_normal(&mut self, normal: Vector3) -> Result<(), ArgumentError> {
        self.normal = normal
            .normalized()
            .ok_or_else(|| ArgumentError::new("normal", "the normal vector cannot be zero"))?;
        Ok(())
    }
}

impl Default for EntityCommon {
    fn default() -> Self {
        Self::new()
    }
}

/// Implements [`Entity`] and [`CadObject`](crate::cad_object::CadObject)
/// for a struct with a `common: EntityCommon` field.
macro_rules! impl_entity {
    ($ty:ty, $name:expr) => {
        impl $crate::entities::Entity for $ty {
            fn common(&self) -> &$crate::entities::EntityCommon {
                &self.common
            }
            fn common_mut(&mut self) -> &mut $crate::entities::EntityCommon {
                &mut self.common
            }
            fn dxf_name(&self) -> &str {
                $name
            }
        }
        $crate::impl_cad_object!($ty, common);
    };
}
pub(crate) use impl_entity;

/// Closed set of entity variants
#[derive(Debug, Clone, PartialEq)]
pub enum EntityType {
    Point(Point),
    Line(Line),
    Circle(Circle),
    Arc(Arc),
    Ellipse(Ellipse),
    LwPolyline(LwPolyline),
    Polyline2D(Polyline2D),
    Polyline3D(Polyline3D),
    PolyfaceMesh(PolyfaceMesh),
    PolygonMesh(PolygonMesh),
    Face3D(Face3D),
    Solid(Solid),
    Trace(Trace),
    Mesh(Mesh),
    Hatch(Hatch),
    Dimension(Dimension),
    Text(Text),
    MText(MText),
    Insert(Insert),
    AttributeDefinition(AttributeDefinition),
    Ray(Ray),
    XLine(XLine),
    Shape(Shape),
    Ole2Frame(Ole2Frame),
    Underlay(Underlay),
    Wipeout(Wipeout),
    Spline(Spline),
    MLine(MLine),
    /// Entity without a typed model, kept verbatim
    Unknown(UnknownEntity),
}

macro_rules! dispatch {
    ($self:expr, $e:ident => $body:expr) => {
        match $self {
            EntityType::Point($e) => $body,
            EntityType::Line($e) => $body,
            EntityType::Circle($e) => $body,
            EntityType::Arc($e) => $body,
            EntityType::Ellipse($e) => $body,
            EntityType::LwPolyline($e) => $body,
            EntityType::Polyline2D($e) => $body,
            EntityType::Polyline3D($e) => $body,
            EntityType::PolyfaceMesh($e) => $body,
            EntityType::PolygonMesh($e) => $body,
            EntityType::Face3D($e) => $body,
            EntityType::Solid($e) => $body,
            EntityType::Trace($e) => $body,
            EntityType::Mesh($e) => $body,
            EntityType::Hatch($e) => $body,
            EntityType::Dimension($e) => $body,
            EntityType::Text($e) => $body,
            EntityType::MText($e) => $body,
            EntityType::Insert($e) => $body,
            EntityType::AttributeDefinition($e) => $body,
            EntityType::Ray($e) => $body,
            EntityType::XLine($e) => $body,
            EntityType::Shape($e) => $body,
            EntityType::Ole2Frame($e) => $body,
            EntityType::Underlay($e) => $body,
            EntityType::Wipeout($e) => $body,
            EntityType::Spline($e) => $body,
            EntityType::MLine($e) => $body,
            EntityType::Unknown($e) => $body,
        }
    };
}

impl EntityType {
    pub fn as_entity(&self) -> &dyn Entity {
        dispatch!(self, e => e)
    }

    pub fn as_entity_mut(&mut self) -> &mut dyn Entity {
        dispatch!(self, e => e)
    }

    pub fn as_object(&self) -> &dyn crate::cad_object::CadObject {
        dispatch!(self, e => e)
    }

    pub fn as_object_mut(&mut self) -> &mut dyn crate::cad_object::CadObject {
        dispatch!(self, e => e)
    }

    pub fn common(&self) -> &EntityCommon {
        self.as_entity().common()
    }

    pub fn common_mut(&mut self) -> &mut EntityCommon {
        self.as_entity_mut().common_mut()
    }

    pub fn handle(&self) -> Handle {
        self.common().handle
    }

    pub fn dxf_name(&self) -> &str {
        self.as_entity().dxf_name()
    }

    /// Text style referenced by this entity, if it has one
    pub fn text_style(&self) -> Option<&str> {
        match self {
            EntityType::Text(e) => Some(&e.style),
            EntityType::MText(e) => Some(&e.style),
            EntityType::AttributeDefinition(e) => Some(&e.text.style),
            _ => None,
        }
    }

    /// Handles of the sub-records owned by this entity (vertices,
    /// attributes, sequence terminators)
    pub fn owned_handles(&self) -> Vec<Handle> {
        match self {
            EntityType::Polyline2D(p) => p.owned_handles(),
            EntityType::Polyline3D(p) => p.owned_handles(),
            EntityType::PolyfaceMesh(p) => p.owned_handles(),
            EntityType::PolygonMesh(p) => p.owned_handles(),
            EntityType::Insert(i) => i.owned_handles(),
            _ => Vec::new(),
        }
    }

    /// Common properties of the owned sub-records, in file order
    pub fn sub_records_mut(&mut self) -> Vec<&mut EntityCommon> {
        fn chain<'a>(
            records: impl Iterator<Item = &'a mut EntityCommon>,
            seqend: &'a mut Seqend,
        ) -> Vec<&'a mut EntityCommon> {
            records.chain(std::iter::once(&mut seqend.common)).collect()
        }
        match self {
            EntityType::Polyline2D(p) => chain(p.vertices.iter_mut().map(|v| &mut v.common), &mut p.seqend),
            EntityType::Polyline3D(p) => chain(p.vertices.iter_mut().map(|v| &mut v.common), &mut p.seqend),
            EntityType::PolyfaceMesh(p) => chain(
                p.vertices
                    .iter_mut()
                    .map(|v| &mut v.common)
                    .chain(p.faces.iter_mut().map(|f| &mut f.common)),
                &mut p.seqend,
            ),
            EntityType::PolygonMesh(p) => chain(p.vertices.iter_mut().map(|v| &mut v.common), &mut p.seqend),
            EntityType::Insert(i) if i.has_attributes() => {
                chain(i.attributes.iter_mut().map(|a| &mut a.text.common), &mut i.seqend)
            }
            _ => Vec::new(),
        }
    }
}
