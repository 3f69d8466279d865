//! Dimension entity types
//!
//! The group code 10 definition point is stored once, on the base. For
//! radial, angular and ordinate dimensions it is user geometry; for aligned
//! and linear dimensions it is derived from the measured points and the
//! dimension line offset and is recomputed by [`Dimension::rebuild_block`].
//! Changing geometry through the setters marks the dimension stale; the
//! anonymous `*D` block is only regenerated on an explicit rebuild.

use bitflags::bitflags;

use super::{EntityCommon, EntityType, Line, MText};
use super::mtext::{AttachmentPoint, LineSpacingStyle};
use crate::types::{normalize_angle, Vector3};

/// Dimension kind (low bits of group code 70)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DimensionType {
    /// Rotated, horizontal, or vertical linear dimension
    Linear = 0,
    Aligned = 1,
    /// Angle between two lines
    Angular = 2,
    Diameter = 3,
    Radius = 4,
    /// Angle defined by a vertex and two points
    Angular3Point = 5,
    Ordinate = 6,
}

impl DimensionType {
    /// Decode the kind from the raw group code 70 value
    pub fn from_flags(flags: i16) -> Option<Self> {
        match flags & 0x0F {
            0 => Some(DimensionType::Linear),
            1 => Some(DimensionType::Aligned),
            2 => Some(DimensionType::Angular),
            3 => Some(DimensionType::Diameter),
            4 => Some(DimensionType::Radius),
            5 => Some(DimensionType::Angular3Point),
            6 => Some(DimensionType::Ordinate),
            _ => None,
        }
    }
}

bitflags! {
    /// Upper bits of group code 70
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct DimensionFlags: i16 {
        /// Block is referenced by this dimension only
        const BLOCK_REFERENCE = 32;
        /// Ordinate dimension measures X
        const ORDINATE_X = 64;
        /// Text was positioned by the user
        const USER_TEXT_POSITION = 128;
    }
}

/// Properties shared by all dimension kinds (`AcDbDimension`)
#[derive(Debug, Clone, PartialEq)]
pub struct DimensionBase {
    pub common: EntityCommon,
    /// Object version (280)
    pub version: i16,
    /// Anonymous block holding the rendered geometry (2)
    pub block_name: String,
    /// Dimension style name (3)
    pub style: String,
    /// Definition point in WCS (10)
    pub definition_point: Vector3,
    /// Middle of the dimension text in OCS (11)
    pub text_middle_point: Vector3,
    /// Insertion point for clones (12)
    pub insertion_point: Vector3,
    pub flags: DimensionFlags,
    pub attachment_point: AttachmentPoint,
    pub line_spacing_style: LineSpacingStyle,
    /// Line spacing factor (41)
    pub line_spacing_factor: f64,
    /// Measurement computed when the block was built (42)
    pub actual_measurement: f64,
    /// Text override (1); empty means the measurement, `<>` embeds it
    pub text: String,
    /// Text rotation in degrees (53)
    pub text_rotation: f64,
    /// Horizontal direction in degrees (51)
    pub horizontal_direction: f64,
    stale: bool,
}

impl DimensionBase {
    pub fn new() -> Self {
        DimensionBase {
            common: EntityCommon::new(),
            version: 0,
            block_name: String::new(),
            style: "Standard".to_string(),
            definition_point: Vector3::ZERO,
            text_middle_point: Vector3::ZERO,
            insertion_point: Vector3::ZERO,
            flags: DimensionFlags::BLOCK_REFERENCE,
            attachment_point: AttachmentPoint::MiddleCenter,
            line_spacing_style: LineSpacingStyle::AtLeast,
            line_spacing_factor: 1.0,
            actual_measurement: 0.0,
            text: String::new(),
            text_rotation: 0.0,
            horizontal_direction: 0.0,
            stale: true,
        }
    }

    /// Whether the derived state and block are out of date
    pub fn is_stale(&self) -> bool {
        self.stale
    }

    pub fn mark_stale(&mut self) {
        self.stale = true;
    }

    /// Accept the stored derived state as current (used after reading)
    pub(crate) fn mark_fresh(&mut self) {
        self.stale = false;
    }
}

impl Default for DimensionBase {
    fn default() -> Self {
        Self::new()
    }
}

/// Accessors for geometry that invalidates the dimension block
macro_rules! geometry {
    ($($(#[$doc:meta])* $field:ident, $setter:ident;)+) => {
        $(
            $(#[$doc])*
            pub fn $field(&self) -> Vector3 {
                self.$field
            }

            pub fn $setter(&mut self, point: Vector3) {
                self.$field = point;
                self.base.mark_stale();
            }
        )+
    };
}

fn perpendicular(direction: Vector3) -> Vector3 {
    Vector3::new(-direction.y, direction.x, 0.0)
        .normalized()
        .unwrap_or(Vector3::UNIT_Y)
}

fn angle_between(a: Vector3, b: Vector3) -> f64 {
    let denom = a.length() * b.length();
    if denom == 0.0 {
        return 0.0;
    }
    (a.dot(&b) / denom).clamp(-1.0, 1.0).acos().to_degrees()
}

/// Measures the distance between two points along a line parallel to them
#[derive(Debug, Clone, PartialEq)]
pub struct DimensionAligned {
    pub base: DimensionBase,
    first_point: Vector3,
    second_point: Vector3,
    /// Oblique angle of the extension lines in degrees (52)
    pub ext_line_rotation: f64,
}

impl DimensionAligned {
    pub fn new(first_point: Vector3, second_point: Vector3, offset: f64) -> Self {
        let mut dim = DimensionAligned {
            base: DimensionBase::new(),
            first_point,
            second_point,
            ext_line_rotation: 0.0,
        };
        dim.set_offset(offset);
        dim
    }

    geometry! {
        /// First extension line origin (13)
        first_point, set_first_point;
        /// Second extension line origin (14)
        second_point, set_second_point;
    }

    fn normal_direction(&self) -> Vector3 {
        perpendicular(self.second_point - self.first_point)
    }

    /// Signed distance of the dimension line from the measured points
    pub fn offset(&self) -> f64 {
        (self.base.definition_point - self.second_point).dot(&self.normal_direction())
    }

    pub fn set_offset(&mut self, offset: f64) {
        self.base.definition_point = self.second_point + self.normal_direction() * offset;
        self.base.mark_stale();
    }

    pub fn measurement(&self) -> f64 {
        self.first_point.distance(&self.second_point)
    }
}

impl Default for DimensionAligned {
    fn default() -> Self {
        Self::new(Vector3::ZERO, Vector3::UNIT_X, 0.0)
    }
}

/// Distance between two points projected on a rotated axis
#[derive(Debug, Clone, PartialEq)]
pub struct DimensionLinear {
    pub base: DimensionBase,
    first_point: Vector3,
    second_point: Vector3,
    rotation: f64,
    /// Oblique angle of the extension lines in degrees (52)
    pub ext_line_rotation: f64,
}

impl DimensionLinear {
    pub fn new(first_point: Vector3, second_point: Vector3, rotation: f64, offset: f64) -> Self {
        let mut dim = DimensionLinear {
            base: DimensionBase::new(),
            first_point,
            second_point,
            rotation: normalize_angle(rotation),
            ext_line_rotation: 0.0,
        };
        dim.set_offset(offset);
        dim
    }

    pub fn horizontal(first_point: Vector3, second_point: Vector3, offset: f64) -> Self {
        Self::new(first_point, second_point, 0.0, offset)
    }

    pub fn vertical(first_point: Vector3, second_point: Vector3, offset: f64) -> Self {
        Self::new(first_point, second_point, 90.0, offset)
    }

    geometry! {
        /// First extension line origin (13)
        first_point, set_first_point;
        /// Second extension line origin (14)
        second_point, set_second_point;
    }

    /// Dimension line angle in degrees (50)
    pub fn rotation(&self) -> f64 {
        self.rotation
    }

    pub fn set_rotation(&mut self, degrees: f64) {
        self.rotation = normalize_angle(degrees);
        self.base.mark_stale();
    }

    fn axis(&self) -> Vector3 {
        let r = self.rotation.to_radians();
        Vector3::new(r.cos(), r.sin(), 0.0)
    }

    /// Signed distance of the dimension line from the first point
    pub fn offset(&self) -> f64 {
        (self.base.definition_point - self.first_point).dot(&perpendicular(self.axis()))
    }

    pub fn set_offset(&mut self, offset: f64) {
        let axis = self.axis();
        let origin = self.first_point + perpendicular(axis) * offset;
        self.base.definition_point = origin + axis * (self.second_point - origin).dot(&axis);
        self.base.mark_stale();
    }

    pub fn measurement(&self) -> f64 {
        (self.second_point - self.first_point).dot(&self.axis()).abs()
    }
}

impl Default for DimensionLinear {
    fn default() -> Self {
        Self::new(Vector3::ZERO, Vector3::UNIT_X, 0.0, 0.0)
    }
}

/// Radius of an arc or circle. The definition point is the center.
#[derive(Debug, Clone, PartialEq)]
pub struct DimensionRadius {
    pub base: DimensionBase,
    chord_point: Vector3,
    /// Leader length (40)
    pub leader_length: f64,
}

impl DimensionRadius {
    pub fn new(center: Vector3, chord_point: Vector3) -> Self {
        let mut base = DimensionBase::new();
        base.definition_point = center;
        DimensionRadius {
            base,
            chord_point,
            leader_length: 0.0,
        }
    }

    geometry! {
        /// Point on the curve (15)
        chord_point, set_chord_point;
    }

    pub fn center(&self) -> Vector3 {
        self.base.definition_point
    }

    pub fn set_center(&mut self, center: Vector3) {
        self.base.definition_point = center;
        self.base.mark_stale();
    }

    pub fn measurement(&self) -> f64 {
        self.center().distance(&self.chord_point)
    }
}

impl Default for DimensionRadius {
    fn default() -> Self {
        Self::new(Vector3::ZERO, Vector3::UNIT_X)
    }
}

/// Diameter of a circle. The definition point is the far chord point.
#[derive(Debug, Clone, PartialEq)]
pub struct DimensionDiameter {
    pub base: DimensionBase,
    chord_point: Vector3,
    /// Leader length (40)
    pub leader_length: f64,
}

impl DimensionDiameter {
    pub fn new(center: Vector3, chord_point: Vector3) -> Self {
        let mut base = DimensionBase::new();
        base.definition_point = center * 2.0 - chord_point;
        DimensionDiameter {
            base,
            chord_point,
            leader_length: 0.0,
        }
    }

    geometry! {
        /// Point on the circle (15)
        chord_point, set_chord_point;
    }

    pub fn center(&self) -> Vector3 {
        self.base.definition_point.midpoint(&self.chord_point)
    }

    pub fn measurement(&self) -> f64 {
        self.base.definition_point.distance(&self.chord_point)
    }
}

impl Default for DimensionDiameter {
    fn default() -> Self {
        Self::new(Vector3::ZERO, Vector3::UNIT_X)
    }
}

/// Angle between two lines. The definition point is the end of the second line.
#[derive(Debug, Clone, PartialEq)]
pub struct DimensionAngular2Ln {
    pub base: DimensionBase,
    first_line_start: Vector3,
    first_line_end: Vector3,
    second_line_start: Vector3,
    arc_point: Vector3,
}

impl DimensionAngular2Ln {
    pub fn new(
        first_line: (Vector3, Vector3),
        second_line: (Vector3, Vector3),
        arc_point: Vector3,
    ) -> Self {
        let mut base = DimensionBase::new();
        base.definition_point = second_line.1;
        DimensionAngular2Ln {
            base,
            first_line_start: first_line.0,
            first_line_end: first_line.1,
            second_line_start: second_line.0,
            arc_point,
        }
    }

    geometry! {
        /// (13)
        first_line_start, set_first_line_start;
        /// (14)
        first_line_end, set_first_line_end;
        /// (15)
        second_line_start, set_second_line_start;
        /// Point on the dimension arc (16)
        arc_point, set_arc_point;
    }

    pub fn second_line_end(&self) -> Vector3 {
        self.base.definition_point
    }

    pub fn measurement(&self) -> f64 {
        angle_between(
            self.first_line_end - self.first_line_start,
            self.base.definition_point - self.second_line_start,
        )
    }
}

impl Default for DimensionAngular2Ln {
    fn default() -> Self {
        Self::new(
            (Vector3::ZERO, Vector3::UNIT_X),
            (Vector3::ZERO, Vector3::UNIT_Y),
            Vector3::new(1.0, 1.0, 0.0),
        )
    }
}

/// Angle at a vertex. The definition point lies on the dimension arc.
#[derive(Debug, Clone, PartialEq)]
pub struct DimensionAngular3Pt {
    pub base: DimensionBase,
    first_point: Vector3,
    second_point: Vector3,
    angle_vertex: Vector3,
}

impl DimensionAngular3Pt {
    pub fn new(
        angle_vertex: Vector3,
        first_point: Vector3,
        second_point: Vector3,
        arc_point: Vector3,
    ) -> Self {
        let mut base = DimensionBase::new();
        base.definition_point = arc_point;
        DimensionAngular3Pt {
            base,
            first_point,
            second_point,
            angle_vertex,
        }
    }

    geometry! {
        /// (13)
        first_point, set_first_point;
        /// (14)
        second_point, set_second_point;
        /// (15)
        angle_vertex, set_angle_vertex;
    }

    pub fn measurement(&self) -> f64 {
        angle_between(
            self.first_point - self.angle_vertex,
            self.second_point - self.angle_vertex,
        )
    }
}

impl Default for DimensionAngular3Pt {
    fn default() -> Self {
        Self::new(
            Vector3::ZERO,
            Vector3::UNIT_X,
            Vector3::UNIT_Y,
            Vector3::new(1.0, 1.0, 0.0),
        )
    }
}

/// X or Y distance of a feature from the origin, which is the definition point
#[derive(Debug, Clone, PartialEq)]
pub struct DimensionOrdinate {
    pub base: DimensionBase,
    feature_location: Vector3,
    leader_endpoint: Vector3,
}

impl DimensionOrdinate {
    pub fn new(feature_location: Vector3, leader_endpoint: Vector3, is_x_type: bool) -> Self {
        let mut base = DimensionBase::new();
        base.flags.set(DimensionFlags::ORDINATE_X, is_x_type);
        DimensionOrdinate {
            base,
            feature_location,
            leader_endpoint,
        }
    }

    geometry! {
        /// (13)
        feature_location, set_feature_location;
        /// (14)
        leader_endpoint, set_leader_endpoint;
    }

    pub fn is_x_type(&self) -> bool {
        self.base.flags.contains(DimensionFlags::ORDINATE_X)
    }

    pub fn origin(&self) -> Vector3 {
        self.base.definition_point
    }

    pub fn set_origin(&mut self, origin: Vector3) {
        self.base.definition_point = origin;
        self.base.mark_stale();
    }

    /// Rotation of the ordinate axes in degrees (stored as code 51)
    pub fn rotation(&self) -> f64 {
        self.base.horizontal_direction
    }

    pub fn set_rotation(&mut self, degrees: f64) {
        self.base.horizontal_direction = normalize_angle(degrees);
        self.base.mark_stale();
    }

    pub fn measurement(&self) -> f64 {
        let r = self.rotation().to_radians();
        let delta = self.feature_location - self.origin();
        if self.is_x_type() {
            (delta.x * r.cos() + delta.y * r.sin()).abs()
        } else {
            (delta.y * r.cos() - delta.x * r.sin()).abs()
        }
    }
}

impl Default for DimensionOrdinate {
    fn default() -> Self {
        Self::new(Vector3::ZERO, Vector3::UNIT_X, true)
    }
}

/// All dimension kinds; one `DIMENSION` record in the file
#[derive(Debug, Clone, PartialEq)]
pub enum Dimension {
    Aligned(DimensionAligned),
    Linear(DimensionLinear),
    Radius(DimensionRadius),
    Diameter(DimensionDiameter),
    Angular2Ln(DimensionAngular2Ln),
    Angular3Pt(DimensionAngular3Pt),
    Ordinate(DimensionOrdinate),
}

impl Dimension {
    pub fn base(&self) -> &DimensionBase {
        match self {
            Dimension::Aligned(d) => &d.base,
            Dimension::Linear(d) => &d.base,
            Dimension::Radius(d) => &d.base,
            Dimension::Diameter(d) => &d.base,
            Dimension::Angular2Ln(d) => &d.base,
            Dimension::Angular3Pt(d) => &d.base,
            Dimension::Ordinate(d) => &d.base,
        }
    }

    pub fn base_mut(&mut self) -> &mut DimensionBase {
        match self {
            Dimension::Aligned(d) => &mut d.base,
            Dimension::Linear(d) => &mut d.base,
            Dimension::Radius(d) => &mut d.base,
            Dimension::Diameter(d) => &mut d.base,
            Dimension::Angular2Ln(d) => &mut d.base,
            Dimension::Angular3Pt(d) => &mut d.base,
            Dimension::Ordinate(d) => &mut d.base,
        }
    }

    pub fn dimension_type(&self) -> DimensionType {
        match self {
            Dimension::Aligned(_) => DimensionType::Aligned,
            Dimension::Linear(_) => DimensionType::Linear,
            Dimension::Radius(_) => DimensionType::Radius,
            Dimension::Diameter(_) => DimensionType::Diameter,
            Dimension::Angular2Ln(_) => DimensionType::Angular,
            Dimension::Angular3Pt(_) => DimensionType::Angular3Point,
            Dimension::Ordinate(_) => DimensionType::Ordinate,
        }
    }

    /// Value of group code 70
    pub fn type_flags(&self) -> i16 {
        self.dimension_type() as i16 | self.base().flags.bits()
    }

    /// Empty dimension of the given kind, used by the reader
    pub fn of_type(kind: DimensionType) -> Self {
        match kind {
            DimensionType::Aligned => Dimension::Aligned(Default::default()),
            DimensionType::Linear => Dimension::Linear(Default::default()),
            DimensionType::Radius => Dimension::Radius(Default::default()),
            DimensionType::Diameter => Dimension::Diameter(Default::default()),
            DimensionType::Angular => Dimension::Angular2Ln(Default::default()),
            DimensionType::Angular3Point => Dimension::Angular3Pt(Default::default()),
            DimensionType::Ordinate => Dimension::Ordinate(Default::default()),
        }
    }

    pub fn measurement(&self) -> f64 {
        match self {
            Dimension::Aligned(d) => d.measurement(),
            Dimension::Linear(d) => d.measurement(),
            Dimension::Radius(d) => d.measurement(),
            Dimension::Diameter(d) => d.measurement(),
            Dimension::Angular2Ln(d) => d.measurement(),
            Dimension::Angular3Pt(d) => d.measurement(),
            Dimension::Ordinate(d) => d.measurement(),
        }
    }

    pub fn is_stale(&self) -> bool {
        self.base().is_stale()
    }

    /// Recompute the derived points and measurement and return the
    /// entities of the dimension block. Clears the stale flag.
    ///
    /// The caller owns placing the entities in the `*D` block named by
    /// `base().block_name`.
    pub fn rebuild_block(&mut self) -> Vec<EntityType> {
        let mut lines: Vec<(Vector3, Vector3)> = Vec::new();
        let text_point = match self {
            Dimension::Aligned(d) => {
                let offset = d.offset();
                d.set_offset(offset);
                let shift = d.base.definition_point - d.second_point;
                let first_on_line = d.first_point + shift;
                lines.push((d.first_point, first_on_line));
                lines.push((d.second_point, d.base.definition_point));
                lines.push((first_on_line, d.base.definition_point));
                first_on_line.midpoint(&d.base.definition_point)
            }
            Dimension::Linear(d) => {
                let offset = d.offset();
                d.set_offset(offset);
                let axis = d.axis();
                let def = d.base.definition_point;
                let first_on_line = def - axis * (d.second_point - d.first_point).dot(&axis);
                lines.push((d.first_point, first_on_line));
                lines.push((d.second_point, def));
                lines.push((first_on_line, def));
                first_on_line.midpoint(&def)
            }
            Dimension::Radius(d) => {
                lines.push((d.center(), d.chord_point));
                let outward = (d.chord_point - d.center())
                    .normalized()
                    .unwrap_or(Vector3::UNIT_X);
                d.chord_point + outward * d.leader_length
            }
            Dimension::Diameter(d) => {
                lines.push((d.base.definition_point, d.chord_point));
                d.center()
            }
            Dimension::Angular2Ln(d) => {
                lines.push((d.first_line_start, d.first_line_end));
                lines.push((d.second_line_start, d.base.definition_point));
                d.arc_point
            }
            Dimension::Angular3Pt(d) => {
                lines.push((d.angle_vertex, d.first_point));
                lines.push((d.angle_vertex, d.second_point));
                d.base.definition_point
            }
            Dimension::Ordinate(d) => {
                lines.push((d.feature_location, d.leader_endpoint));
                d.leader_endpoint
            }
        };

        let measurement = self.measurement();
        let base = self.base_mut();
        base.text_middle_point = text_point;
        base.actual_measurement = measurement;
        base.mark_fresh();

        let layer = base.common.layer.clone();
        let label = if base.text.is_empty() {
            format_measurement(measurement)
        } else {
            base.text.replace("<>", &format_measurement(measurement))
        };

        let mut entities: Vec<EntityType> = lines
            .into_iter()
            .map(|(start, end)| {
                let mut line = Line::from_points(start, end);
                line.common.layer = layer.clone();
                EntityType::Line(line)
            })
            .collect();
        let mut text = MText::new();
        text.common.layer = layer;
        text.insertion_point = text_point;
        text.value = label;
        text.attachment_point = base.attachment_point;
        text.set_rotation(base.text_rotation);
        entities.push(EntityType::MText(text));
        entities
    }
}

fn format_measurement(value: f64) -> String {
    let rounded = (value * 10_000.0).round() / 10_000.0;
    format!("{}", rounded)
}

impl super::Entity for Dimension {
    fn common(&self) -> &EntityCommon {
        &self.base().common
    }

    fn common_mut(&mut self) -> &mut EntityCommon {
        &mut self.base_mut().common
    }

    fn dxf_name(&self) -> &str {
        "DIMENSION"
    }
}

crate::impl_cad_object!(DimensionAligned, base.common);
crate::impl_cad_object!(DimensionLinear, base.common);
crate::impl_cad_object!(DimensionRadius, base.common);
crate::impl_cad_object!(DimensionDiameter, base.common);
crate::impl_cad_object!(DimensionAngular2Ln, base.common);
crate::impl_cad_object!(DimensionAngular3Pt, base.common);
crate::impl_cad_object!(DimensionOrdinate, base.common);

impl crate::cad_object::CadObject for Dimension {
    fn handle(&self) -> crate::types::Handle {
        self.base().common.handle
    }
    fn set_handle(&mut self, handle: crate::types::Handle) {
        self.base_mut().common.handle = handle;
    }
    fn owner(&self) -> crate::types::Handle {
        self.base().common.owner
    }
    fn set_owner(&mut self, owner: crate::types::Handle) {
        self.base_mut().common.owner = owner;
    }
    fn reactors(&self) -> &[crate::types::Handle] {
        &self.base().common.reactors
    }
    fn reactors_mut(&mut self) -> &mut Vec<crate::types::Handle> {
        &mut self.base_mut().common.reactors
    }
    fn xdictionary(&self) -> crate::types::Handle {
        self.base().common.xdictionary
    }
    fn set_xdictionary(&mut self, handle: crate::types::Handle) {
        self.base_mut().common.xdictionary = handle;
    }
    fn extended_data(&self) -> &crate::xdata::ExtendedData {
        &self.base().common.extended_data
    }
    fn extended_data_mut(&mut self) -> &mut crate::xdata::ExtendedData {
        &mut self.base_mut().common.extended_data
    }
}
