//! Entity records
//!
//! Each entity type is a list of subclass sections; the `AcDbEntity`
//! section and the bookkeeping head are shared and handled by
//! [`read_as`] / [`write_as`].

use super::{
    read_bookkeeping, read_sections, read_xdata, split_xdata, unknown_record, write_bookkeeping,
    write_sections, write_xdata, FieldCursor, RecordWriter, Subclass,
};
use crate::cad_object::CadObject;
use crate::entities::*;
use crate::error::{ArgumentError, DxfError, Result};
use crate::io::dxf::framer::Record;
use crate::io::dxf::ParseMode;
use crate::types::{Color, DxfVersion, LineWeight, Transparency, Vector2, Vector3};

/// Longest MTEXT value chunk (codes 3 and 1)
const MTEXT_CHUNK: usize = 250;

fn no_fields<T>(_: &mut T, _: &mut FieldCursor<'_>) -> Result<()> {
    Ok(())
}

fn no_output<T>(_: &T, _: &mut RecordWriter<'_>) -> Result<()> {
    Ok(())
}

/// Read one entity record through its subclass template
fn read_as<T: Entity + CadObject + 'static>(
    mut target: T,
    record: &Record,
    template: &'static [Subclass<T>],
) -> Result<T> {
    let (body, xdata) = split_xdata(&record.tags);
    let mut owner_seen = false;
    read_sections(&mut target, &record.name, body, template, &["AcDbEntity"], |t, tag, c| {
        if read_bookkeeping(&mut *t, 5, &mut owner_seen, tag, c)? {
            return Ok(true);
        }
        read_common_field(t.common_mut(), tag, c)
    })?;
    target.common_mut().extended_data = read_xdata(&record.name, xdata)?;
    Ok(target)
}

fn write_as<T: Entity + CadObject + 'static>(
    target: &T,
    name: &str,
    template: &'static [Subclass<T>],
    w: &mut RecordWriter<'_>,
) -> Result<()> {
    w.start(name)?;
    write_bookkeeping(target, 5, w)?;
    w.marker("AcDbEntity")?;
    write_common(target.common(), w)?;
    write_sections(target, template, w)?;
    write_xdata(&target.common().extended_data, w)
}

/// `AcDbEntity` fields; returns whether the tag was taken
pub(super) fn read_common_field(common: &mut EntityCommon, tag: &crate::io::dxf::lexer::Tag, c: &mut FieldCursor<'_>) -> Result<bool> {
    match tag.code {
        8 => common.layer = c.string(tag),
        6 => common.linetype = c.string(tag),
        62 => {
            let index = c.i16(tag)?;
            // a true color read first wins over its ACI approximation
            if !matches!(common.color, Color::Rgb { .. }) {
                common.color = Color::from_index(index);
            }
        }
        420 => common.color = Color::from_true_color(c.i32(tag)?),
        370 => common.line_weight = LineWeight::from_value(c.i16(tag)?),
        440 => common.transparency = Transparency::from_raw(c.i32(tag)?),
        48 => {
            let scale = c.f64(tag)?;
            c.check(48, common.set_linetype_scale(scale))?;
        }
        60 => common.invisible = c.i16(tag)? != 0,
        67 => common.paper_space = c.i16(tag)? != 0,
        _ => return Ok(false),
    }
    Ok(true)
}

pub(super) fn write_common(common: &EntityCommon, w: &mut RecordWriter<'_>) -> Result<()> {
    if common.paper_space {
        w.i16(67, 1)?;
    }
    w.string(8, &common.layer)?;
    if !common.linetype.eq_ignore_ascii_case(BY_LAYER) {
        w.string(6, &common.linetype)?;
    }
    if !common.color.is_by_layer() {
        w.i16(62, common.color.aci())?;
        if let Some(rgb) = common.color.true_color() {
            if w.at_least(DxfVersion::AC1018) {
                w.i32(420, rgb)?;
            }
        }
    }
    if w.at_least(DxfVersion::AC1015) && common.line_weight != LineWeight::ByLayer {
        w.i16(370, common.line_weight.value())?;
    }
    w.double_or(48, common.linetype_scale(), 1.0)?;
    if common.invisible {
        w.i16(60, 1)?;
    }
    if w.at_least(DxfVersion::AC1018) {
        if let Some(raw) = common.transparency.to_raw() {
            w.i32(440, raw)?;
        }
    }
    Ok(())
}

fn read_normal(common: &mut EntityCommon, tag: &crate::io::dxf::lexer::Tag, c: &mut FieldCursor<'_>) -> Result<()> {
    let normal = c.point3(tag)?;
    c.check(210, common.set_normal(normal))
}

fn read_checked<T>(
    c: &FieldCursor<'_>,
    tag: &crate::io::dxf::lexer::Tag,
    set: impl FnOnce(f64) -> std::result::Result<T, ArgumentError>,
) -> Result<T> {
    let value = c.f64(tag)?;
    c.check(tag.code, set(value))
}

// LINE, CIRCLE, ARC, ELLIPSE, POINT

fn read_line(e: &mut Line, c: &mut FieldCursor<'_>) -> Result<()> {
    while let Some(tag) = c.next() {
        match tag.code {
            39 => e.thickness = c.f64(tag)?,
            10 => e.start = c.point3(tag)?,
            11 => e.end = c.point3(tag)?,
            210 => read_normal(&mut e.common, tag, c)?,
            _ => c.skip(tag),
        }
    }
    Ok(())
}

fn write_line(e: &Line, w: &mut RecordWriter<'_>) -> Result<()> {
    w.double_or(39, e.thickness, 0.0)?;
    w.point3(10, e.start)?;
    w.point3(11, e.end)?;
    w.normal(e.common.normal())
}

const LINE: &[Subclass<Line>] = &[Subclass {
    marker: "AcDbLine",
    read: read_line,
    write: write_line,
}];

fn read_circle(e: &mut Circle, c: &mut FieldCursor<'_>) -> Result<()> {
    while let Some(tag) = c.next() {
        match tag.code {
            39 => e.thickness = c.f64(tag)?,
            10 => e.center = c.point3(tag)?,
            40 => read_checked(c, tag, |v| e.set_radius(v))?,
            210 => read_normal(&mut e.common, tag, c)?,
            _ => c.skip(tag),
        }
    }
    Ok(())
}

fn write_circle(e: &Circle, w: &mut RecordWriter<'_>) -> Result<()> {
    w.double_or(39, e.thickness, 0.0)?;
    w.point3(10, e.center)?;
    w.double(40, e.radius())?;
    w.normal(e.common.normal())
}

const CIRCLE: &[Subclass<Circle>] = &[Subclass {
    marker: "AcDbCircle",
    read: read_circle,
    write: write_circle,
}];

fn read_arc_circle(e: &mut Arc, c: &mut FieldCursor<'_>) -> Result<()> {
    while let Some(tag) = c.next() {
        match tag.code {
            39 => e.thickness = c.f64(tag)?,
            10 => e.center = c.point3(tag)?,
            40 => read_checked(c, tag, |v| e.set_radius(v))?,
            210 => read_normal(&mut e.common, tag, c)?,
            _ => c.skip(tag),
        }
    }
    Ok(())
}

fn write_arc_circle(e: &Arc, w: &mut RecordWriter<'_>) -> Result<()> {
    w.double_or(39, e.thickness, 0.0)?;
    w.point3(10, e.center)?;
    w.double(40, e.radius())?;
    w.normal(e.common.normal())
}

fn read_arc(e: &mut Arc, c: &mut FieldCursor<'_>) -> Result<()> {
    while let Some(tag) = c.next() {
        match tag.code {
            50 => e.set_start_angle(c.f64(tag)?),
            51 => e.set_end_angle(c.f64(tag)?),
            _ => c.skip(tag),
        }
    }
    Ok(())
}

fn write_arc(e: &Arc, w: &mut RecordWriter<'_>) -> Result<()> {
    w.double(50, e.start_angle())?;
    w.double(51, e.end_angle())
}

const ARC: &[Subclass<Arc>] = &[
    Subclass {
        marker: "AcDbCircle",
        read: read_arc_circle,
        write: write_arc_circle,
    },
    Subclass {
        marker: "AcDbArc",
        read: read_arc,
        write: write_arc,
    },
];

fn read_ellipse(e: &mut Ellipse, c: &mut FieldCursor<'_>) -> Result<()> {
    while let Some(tag) = c.next() {
        match tag.code {
            10 => e.center = c.point3(tag)?,
            11 => {
                let axis = c.point3(tag)?;
                c.check(11, e.set_major_axis(axis))?;
            }
            210 => read_normal(&mut e.common, tag, c)?,
            40 => read_checked(c, tag, |v| e.set_ratio(v))?,
            41 => e.start_parameter = c.f64(tag)?,
            42 => e.end_parameter = c.f64(tag)?,
            _ => c.skip(tag),
        }
    }
    Ok(())
}

fn write_ellipse(e: &Ellipse, w: &mut RecordWriter<'_>) -> Result<()> {
    w.point3(10, e.center)?;
    w.point3(11, e.major_axis())?;
    w.normal(e.common.normal())?;
    w.double(40, e.ratio())?;
    w.double(41, e.start_parameter)?;
    w.double(42, e.end_parameter)
}

const ELLIPSE: &[Subclass<Ellipse>] = &[Subclass {
    marker: "AcDbEllipse",
    read: read_ellipse,
    write: write_ellipse,
}];

fn read_point(e: &mut Point, c: &mut FieldCursor<'_>) -> Result<()> {
    while let Some(tag) = c.next() {
        match tag.code {
            10 => e.location = c.point3(tag)?,
            39 => e.thickness = c.f64(tag)?,
            210 => read_normal(&mut e.common, tag, c)?,
            50 => e.set_rotation(c.f64(tag)?),
            _ => c.skip(tag),
        }
    }
    Ok(())
}

fn write_point(e: &Point, w: &mut RecordWriter<'_>) -> Result<()> {
    w.point3(10, e.location)?;
    w.double_or(39, e.thickness, 0.0)?;
    w.normal(e.common.normal())?;
    w.double_or(50, e.rotation(), 0.0)
}

const POINT: &[Subclass<Point>] = &[Subclass {
    marker: "AcDbPoint",
    read: read_point,
    write: write_point,
}];

// RAY, XLINE, SHAPE

macro_rules! infinite_line {
    ($const:ident, $ty:ty, $marker:expr, $read:ident, $write:ident) => {
        fn $read(e: &mut $ty, c: &mut FieldCursor<'_>) -> Result<()> {
            while let Some(tag) = c.next() {
                match tag.code {
                    10 => e.base_point = c.point3(tag)?,
                    11 => {
                        let direction = c.point3(tag)?;
                        c.check(11, e.set_direction(direction))?;
                    }
                    _ => c.skip(tag),
                }
            }
            Ok(())
        }

        fn $write(e: &$ty, w: &mut RecordWriter<'_>) -> Result<()> {
            w.point3(10, e.base_point)?;
            w.point3(11, e.direction())
        }

        const $const: &[Subclass<$ty>] = &[Subclass {
            marker: $marker,
            read: $read,
            write: $write,
        }];
    };
}

infinite_line!(RAY, Ray, "AcDbRay", read_ray, write_ray);
infinite_line!(XLINE, XLine, "AcDbXline", read_xline, write_xline);

fn read_shape(e: &mut Shape, c: &mut FieldCursor<'_>) -> Result<()> {
    while let Some(tag) = c.next() {
        match tag.code {
            39 => e.thickness = c.f64(tag)?,
            10 => e.insertion_point = c.point3(tag)?,
            40 => read_checked(c, tag, |v| e.set_size(v))?,
            2 => e.name = c.string(tag),
            50 => e.set_rotation(c.f64(tag)?),
            41 => read_checked(c, tag, |v| e.set_width_factor(v))?,
            51 => read_checked(c, tag, |v| e.set_oblique_angle(v))?,
            210 => read_normal(&mut e.common, tag, c)?,
            _ => c.skip(tag),
        }
    }
    Ok(())
}

fn write_shape(e: &Shape, w: &mut RecordWriter<'_>) -> Result<()> {
    w.double_or(39, e.thickness, 0.0)?;
    w.point3(10, e.insertion_point)?;
    w.double(40, e.size())?;
    w.string(2, &e.name)?;
    w.double_or(50, e.rotation(), 0.0)?;
    w.double_or(41, e.width_factor(), 1.0)?;
    w.double_or(51, e.oblique_angle(), 0.0)?;
    w.normal(e.common.normal())
}

const SHAPE: &[Subclass<Shape>] = &[Subclass {
    marker: "AcDbShape",
    read: read_shape,
    write: write_shape,
}];

// SOLID, TRACE, 3DFACE

macro_rules! quad {
    ($const:ident, $ty:ty, $read:ident, $write:ident) => {
        fn $read(e: &mut $ty, c: &mut FieldCursor<'_>) -> Result<()> {
            while let Some(tag) = c.next() {
                match tag.code {
                    10 => e.first_corner = c.point3(tag)?,
                    11 => e.second_corner = c.point3(tag)?,
                    12 => e.third_corner = c.point3(tag)?,
                    13 => e.fourth_corner = c.point3(tag)?,
                    39 => e.thickness = c.f64(tag)?,
                    210 => read_normal(&mut e.common, tag, c)?,
                    _ => c.skip(tag),
                }
            }
            Ok(())
        }

        fn $write(e: &$ty, w: &mut RecordWriter<'_>) -> Result<()> {
            w.point3(10, e.first_corner)?;
            w.point3(11, e.second_corner)?;
            w.point3(12, e.third_corner)?;
            w.point3(13, e.fourth_corner)?;
            w.double_or(39, e.thickness, 0.0)?;
            w.normal(e.common.normal())
        }

        const $const: &[Subclass<$ty>] = &[Subclass {
            marker: "AcDbTrace",
            read: $read,
            write: $write,
        }];
    };
}

quad!(SOLID, Solid, read_solid, write_solid);
quad!(TRACE, Trace, read_trace, write_trace);

fn read_face(e: &mut Face3D, c: &mut FieldCursor<'_>) -> Result<()> {
    while let Some(tag) = c.next() {
        match tag.code {
            10 => e.first_corner = c.point3(tag)?,
            11 => e.second_corner = c.point3(tag)?,
            12 => e.third_corner = c.point3(tag)?,
            13 => e.fourth_corner = c.point3(tag)?,
            70 => e.invisible_edges = InvisibleEdgeFlags::from_bits_truncate(c.i16(tag)?),
            _ => c.skip(tag),
        }
    }
    Ok(())
}

fn write_face(e: &Face3D, w: &mut RecordWriter<'_>) -> Result<()> {
    w.point3(10, e.first_corner)?;
    w.point3(11, e.second_corner)?;
    w.point3(12, e.third_corner)?;
    w.point3(13, e.fourth_corner)?;
    w.i16_or(70, e.invisible_edges.bits(), 0)
}

const FACE3D: &[Subclass<Face3D>] = &[Subclass {
    marker: "AcDbFace",
    read: read_face,
    write: write_face,
}];

// LWPOLYLINE

fn read_lwpolyline(e: &mut LwPolyline, c: &mut FieldCursor<'_>) -> Result<()> {
    while let Some(tag) = c.next() {
        match tag.code {
            90 | 91 => {}
            70 => e.set_flags(c.i16(tag)?),
            43 => e.constant_width = c.f64(tag)?,
            38 => e.elevation = c.f64(tag)?,
            39 => e.thickness = c.f64(tag)?,
            10 => {
                let location = c.point2(tag)?;
                e.vertices.push(LwVertex::new(location));
            }
            40 | 41 | 42 => {
                let value = c.f64(tag)?;
                match e.vertices.last_mut() {
                    Some(v) if tag.code == 40 => v.start_width = value,
                    Some(v) if tag.code == 41 => v.end_width = value,
                    Some(v) => v.bulge = value,
                    None => tracing::trace!(code = tag.code, "vertex value before the first vertex"),
                }
            }
            210 => read_normal(&mut e.common, tag, c)?,
            _ => c.skip(tag),
        }
    }
    Ok(())
}

fn write_lwpolyline(e: &LwPolyline, w: &mut RecordWriter<'_>) -> Result<()> {
    w.i32(90, e.vertices.len() as i32)?;
    w.i16(70, e.flags())?;
    w.double_or(43, e.constant_width, 0.0)?;
    w.double_or(38, e.elevation, 0.0)?;
    w.double_or(39, e.thickness, 0.0)?;
    for v in &e.vertices {
        w.point2(10, v.location)?;
        w.double_or(40, v.start_width, 0.0)?;
        w.double_or(41, v.end_width, 0.0)?;
        w.double_or(42, v.bulge, 0.0)?;
    }
    w.normal(e.common.normal())
}

const LWPOLYLINE: &[Subclass<LwPolyline>] = &[Subclass {
    marker: "AcDbPolyline",
    read: read_lwpolyline,
    write: write_lwpolyline,
}];

// TEXT, ATTRIB, ATTDEF, MTEXT

/// Main `AcDbText` section; vertical alignment (73) is left for the second one
fn read_text_fields(e: &mut Text, c: &mut FieldCursor<'_>) -> Result<()> {
    while let Some(tag) = c.next() {
        match tag.code {
            39 => e.thickness = c.f64(tag)?,
            10 => e.insertion_point = c.point3(tag)?,
            40 => read_checked(c, tag, |v| e.set_height(v))?,
            1 => e.value = c.string(tag),
            50 => e.set_rotation(c.f64(tag)?),
            41 => read_checked(c, tag, |v| e.set_width_factor(v))?,
            51 => read_checked(c, tag, |v| e.set_oblique_angle(v))?,
            7 => e.style = c.string(tag),
            71 => e.generation_flags = c.i16(tag)?,
            72 => e.horizontal_alignment = TextHorizontalAlignment::from_value(c.i16(tag)?),
            11 => e.alignment_point = Some(c.point3(tag)?),
            210 => read_normal(&mut e.common, tag, c)?,
            _ => c.skip(tag),
        }
    }
    Ok(())
}

fn write_text_fields(e: &Text, w: &mut RecordWriter<'_>) -> Result<()> {
    w.double_or(39, e.thickness, 0.0)?;
    w.point3(10, e.insertion_point)?;
    w.double(40, e.height())?;
    w.string(1, &e.value)?;
    w.double_or(50, e.rotation(), 0.0)?;
    w.double_or(41, e.width_factor(), 1.0)?;
    w.double_or(51, e.oblique_angle(), 0.0)?;
    w.string(7, &e.style)?;
    w.i16_or(71, e.generation_flags, 0)?;
    w.i16_or(72, e.horizontal_alignment.value(), 0)?;
    if let Some(point) = e.alignment_point {
        w.point3(11, point)?;
    }
    w.normal(e.common.normal())
}

fn read_text_alignment(e: &mut Text, c: &mut FieldCursor<'_>) -> Result<()> {
    while let Some(tag) = c.next() {
        match tag.code {
            73 => e.vertical_alignment = TextVerticalAlignment::from_value(c.i16(tag)?),
            _ => c.skip(tag),
        }
    }
    Ok(())
}

fn write_text_alignment(e: &Text, w: &mut RecordWriter<'_>) -> Result<()> {
    w.i16_or(73, e.vertical_alignment.value(), 0)
}

const TEXT: &[Subclass<Text>] = &[
    Subclass {
        marker: "AcDbText",
        read: read_text_fields,
        write: write_text_fields,
    },
    Subclass {
        marker: "AcDbText",
        read: read_text_alignment,
        write: write_text_alignment,
    },
];

fn read_attrib_text(e: &mut Attribute, c: &mut FieldCursor<'_>) -> Result<()> {
    read_text_fields(&mut e.text, c)
}

fn write_attrib_text(e: &Attribute, w: &mut RecordWriter<'_>) -> Result<()> {
    write_text_fields(&e.text, w)
}

fn read_attrib(e: &mut Attribute, c: &mut FieldCursor<'_>) -> Result<()> {
    let mut tag_seen = false;
    while let Some(tag) = c.next() {
        match tag.code {
            280 if !tag_seen => e.version = c.i16(tag)?,
            280 => e.lock_position = c.i16(tag)? != 0,
            2 => {
                e.tag = c.string(tag);
                tag_seen = true;
            }
            70 => e.flags = AttributeFlags::from_bits_truncate(c.i16(tag)?),
            73 => e.field_length = c.i16(tag)?,
            74 => e.text.vertical_alignment = TextVerticalAlignment::from_value(c.i16(tag)?),
            _ => c.skip(tag),
        }
    }
    Ok(())
}

fn write_attrib(e: &Attribute, w: &mut RecordWriter<'_>) -> Result<()> {
    if w.at_least(DxfVersion::AC1021) {
        w.i16(280, e.version)?;
    }
    w.string(2, &e.tag)?;
    w.i16(70, e.flags.bits())?;
    w.i16_or(73, e.field_length, 0)?;
    w.i16_or(74, e.text.vertical_alignment.value(), 0)?;
    if w.at_least(DxfVersion::AC1021) {
        w.i16(280, e.lock_position as i16)?;
    }
    Ok(())
}

const ATTRIB: &[Subclass<Attribute>] = &[
    Subclass {
        marker: "AcDbText",
        read: read_attrib_text,
        write: write_attrib_text,
    },
    Subclass {
        marker: "AcDbAttribute",
        read: read_attrib,
        write: write_attrib,
    },
];

fn read_attdef_text(e: &mut AttributeDefinition, c: &mut FieldCursor<'_>) -> Result<()> {
    read_text_fields(&mut e.text, c)
}

fn write_attdef_text(e: &AttributeDefinition, w: &mut RecordWriter<'_>) -> Result<()> {
    write_text_fields(&e.text, w)
}

fn read_attdef(e: &mut AttributeDefinition, c: &mut FieldCursor<'_>) -> Result<()> {
    let mut tag_seen = false;
    while let Some(tag) = c.next() {
        match tag.code {
            280 if !tag_seen => e.version = c.i16(tag)?,
            280 => e.lock_position = c.i16(tag)? != 0,
            3 => e.prompt = c.string(tag),
            2 => {
                e.tag = c.string(tag);
                tag_seen = true;
            }
            70 => e.flags = AttributeFlags::from_bits_truncate(c.i16(tag)?),
            73 => e.field_length = c.i16(tag)?,
            74 => e.text.vertical_alignment = TextVerticalAlignment::from_value(c.i16(tag)?),
            _ => c.skip(tag),
        }
    }
    Ok(())
}

fn write_attdef(e: &AttributeDefinition, w: &mut RecordWriter<'_>) -> Result<()> {
    if w.at_least(DxfVersion::AC1021) {
        w.i16(280, e.version)?;
    }
    w.string(3, &e.prompt)?;
    w.string(2, &e.tag)?;
    w.i16(70, e.flags.bits())?;
    w.i16_or(73, e.field_length, 0)?;
    w.i16_or(74, e.text.vertical_alignment.value(), 0)?;
    if w.at_least(DxfVersion::AC1021) {
        w.i16(280, e.lock_position as i16)?;
    }
    Ok(())
}

const ATTDEF: &[Subclass<AttributeDefinition>] = &[
    Subclass {
        marker: "AcDbText",
        read: read_attdef_text,
        write: write_attdef_text,
    },
    Subclass {
        marker: "AcDbAttributeDefinition",
        read: read_attdef,
        write: write_attdef,
    },
];

fn read_mtext(e: &mut MText, c: &mut FieldCursor<'_>) -> Result<()> {
    let mut chunks = String::new();
    let mut value_seen = false;
    while let Some(tag) = c.next() {
        match tag.code {
            10 => e.insertion_point = c.point3(tag)?,
            40 => read_checked(c, tag, |v| e.set_height(v))?,
            41 => e.rectangle_width = c.f64(tag)?,
            46 => e.rectangle_height = c.f64(tag)?,
            71 => e.attachment_point = AttachmentPoint::from_value(c.i16(tag)?),
            72 => e.drawing_direction = DrawingDirection::from_value(c.i16(tag)?),
            3 => chunks.push_str(&c.string(tag)),
            1 => {
                chunks.push_str(&c.string(tag));
                value_seen = true;
            }
            7 => e.style = c.string(tag),
            210 => read_normal(&mut e.common, tag, c)?,
            11 => e.set_direction(c.point3(tag)?),
            50 => e.set_rotation(c.f64(tag)?),
            73 => e.line_spacing_style = LineSpacingStyle::from_value(c.i16(tag)?),
            44 => read_checked(c, tag, |v| e.set_line_spacing_factor(v))?,
            _ => c.skip(tag),
        }
    }
    if value_seen || !chunks.is_empty() {
        e.value = chunks;
    }
    Ok(())
}

/// Text longer than one chunk goes out as `3` chunks ending with a `1`
fn write_chunked(value: &str, w: &mut RecordWriter<'_>) -> Result<()> {
    let chars: Vec<char> = value.chars().collect();
    let mut rest = &chars[..];
    while rest.len() > MTEXT_CHUNK {
        let (head, tail) = rest.split_at(MTEXT_CHUNK);
        w.string(3, &head.iter().collect::<String>())?;
        rest = tail;
    }
    w.string(1, &rest.iter().collect::<String>())
}

fn write_mtext(e: &MText, w: &mut RecordWriter<'_>) -> Result<()> {
    w.point3(10, e.insertion_point)?;
    w.double(40, e.height())?;
    w.double(41, e.rectangle_width)?;
    if w.at_least(DxfVersion::AC1018) {
        w.double_or(46, e.rectangle_height, 0.0)?;
    }
    w.i16(71, e.attachment_point.value())?;
    w.i16(72, e.drawing_direction.value())?;
    write_chunked(&e.value, w)?;
    w.string(7, &e.style)?;
    w.normal(e.common.normal())?;
    w.double_or(50, e.rotation(), 0.0)?;
    w.i16(73, e.line_spacing_style.value())?;
    w.double(44, e.line_spacing_factor())
}

const MTEXT: &[Subclass<MText>] = &[Subclass {
    marker: "AcDbMText",
    read: read_mtext,
    write: write_mtext,
}];

// INSERT

fn read_insert_fields(e: &mut Insert, c: &mut FieldCursor<'_>) -> Result<()> {
    while let Some(tag) = c.next() {
        match tag.code {
            66 => {}
            2 => e.block_name = c.string(tag),
            10 => e.insertion_point = c.point3(tag)?,
            41 => read_checked(c, tag, |v| e.set_x_scale(v))?,
            42 => read_checked(c, tag, |v| e.set_y_scale(v))?,
            43 => read_checked(c, tag, |v| e.set_z_scale(v))?,
            50 => e.set_rotation(c.f64(tag)?),
            70 => e.column_count = c.i16(tag)?,
            71 => e.row_count = c.i16(tag)?,
            44 => e.column_spacing = c.f64(tag)?,
            45 => e.row_spacing = c.f64(tag)?,
            210 => read_normal(&mut e.common, tag, c)?,
            _ => c.skip(tag),
        }
    }
    Ok(())
}

fn write_insert_fields(e: &Insert, w: &mut RecordWriter<'_>) -> Result<()> {
    if e.has_attributes() {
        w.i16(66, 1)?;
    }
    w.string(2, &e.block_name)?;
    w.point3(10, e.insertion_point)?;
    w.double_or(41, e.x_scale(), 1.0)?;
    w.double_or(42, e.y_scale(), 1.0)?;
    w.double_or(43, e.z_scale(), 1.0)?;
    w.double_or(50, e.rotation(), 0.0)?;
    w.i16_or(70, e.column_count, 1)?;
    w.i16_or(71, e.row_count, 1)?;
    w.double_or(44, e.column_spacing, 0.0)?;
    w.double_or(45, e.row_spacing, 0.0)?;
    w.normal(e.common.normal())
}

const INSERT: &[Subclass<Insert>] = &[Subclass {
    marker: "AcDbBlockReference|AcDbMInsertBlock",
    read: read_insert_fields,
    write: write_insert_fields,
}];

const SEQEND: &[Subclass<Seqend>] = &[];

fn read_seqend(record: &Record) -> Result<Seqend> {
    match &record.seqend {
        Some(seqend) => read_as(Seqend::default(), seqend, SEQEND),
        None => Ok(Seqend::default()),
    }
}

fn read_insert(record: &Record) -> Result<Insert> {
    let mut insert = read_as(Insert::default(), record, INSERT)?;
    for child in &record.children {
        insert.attributes.push(read_as(Attribute::default(), child, ATTRIB)?);
    }
    insert.seqend = read_seqend(record)?;
    Ok(insert)
}

fn write_insert(e: &Insert, w: &mut RecordWriter<'_>) -> Result<()> {
    write_as(e, "INSERT", INSERT, w)?;
    if e.has_attributes() {
        for attribute in &e.attributes {
            write_as(attribute, "ATTRIB", ATTRIB, w)?;
        }
        write_as(&e.seqend, "SEQEND", SEQEND, w)?;
    }
    Ok(())
}

// POLYLINE and VERTEX

fn read_polyline_2d(e: &mut Polyline2D, c: &mut FieldCursor<'_>) -> Result<()> {
    while let Some(tag) = c.next() {
        match tag.code {
            66 | 71 | 72 | 73 | 74 => {}
            10 => e.elevation = c.point3(tag)?.z,
            39 => e.thickness = c.f64(tag)?,
            70 => e.flags = PolylineFlags::from_bits_truncate(c.i16(tag)?),
            40 => e.start_width = c.f64(tag)?,
            41 => e.end_width = c.f64(tag)?,
            75 => e.smooth_surface = SmoothSurfaceType::from_value(c.i16(tag)?),
            210 => read_normal(&mut e.common, tag, c)?,
            _ => c.skip(tag),
        }
    }
    Ok(())
}

fn write_polyline_2d(e: &Polyline2D, w: &mut RecordWriter<'_>) -> Result<()> {
    w.i16(66, 1)?;
    w.point3(10, Vector3::new(0.0, 0.0, e.elevation))?;
    w.double_or(39, e.thickness, 0.0)?;
    w.i16(70, e.flags.bits())?;
    w.double_or(40, e.start_width, 0.0)?;
    w.double_or(41, e.end_width, 0.0)?;
    w.i16_or(75, e.smooth_surface.value(), 0)?;
    w.normal(e.common.normal())
}

const POLYLINE_2D: &[Subclass<Polyline2D>] = &[Subclass {
    marker: "AcDb2dPolyline",
    read: read_polyline_2d,
    write: write_polyline_2d,
}];

fn read_polyline_3d(e: &mut Polyline3D, c: &mut FieldCursor<'_>) -> Result<()> {
    while let Some(tag) = c.next() {
        match tag.code {
            66 | 10 | 71 | 72 | 73 | 74 => {}
            70 => e.flags = PolylineFlags::from_bits_truncate(c.i16(tag)?),
            75 => e.smooth_surface = SmoothSurfaceType::from_value(c.i16(tag)?),
            210 => read_normal(&mut e.common, tag, c)?,
            _ => c.skip(tag),
        }
    }
    Ok(())
}

fn write_polyline_3d(e: &Polyline3D, w: &mut RecordWriter<'_>) -> Result<()> {
    w.i16(66, 1)?;
    w.point3(10, Vector3::ZERO)?;
    w.i16(70, (e.flags | PolylineFlags::POLYLINE_3D).bits())?;
    w.i16_or(75, e.smooth_surface.value(), 0)?;
    w.normal(e.common.normal())
}

const POLYLINE_3D: &[Subclass<Polyline3D>] = &[Subclass {
    marker: "AcDb3dPolyline",
    read: read_polyline_3d,
    write: write_polyline_3d,
}];

fn read_polyface(e: &mut PolyfaceMesh, c: &mut FieldCursor<'_>) -> Result<()> {
    while let Some(tag) = c.next() {
        match tag.code {
            // counts are implied by the vertex run
            66 | 10 | 71 | 72 | 73 | 74 | 75 => {}
            70 => e.flags = PolylineFlags::from_bits_truncate(c.i16(tag)?),
            210 => read_normal(&mut e.common, tag, c)?,
            _ => c.skip(tag),
        }
    }
    Ok(())
}

fn write_polyface(e: &PolyfaceMesh, w: &mut RecordWriter<'_>) -> Result<()> {
    w.i16(66, 1)?;
    w.point3(10, Vector3::ZERO)?;
    w.i16(70, (e.flags | PolylineFlags::POLYFACE_MESH).bits())?;
    w.i16(71, e.vertices.len() as i16)?;
    w.i16(72, e.faces.len() as i16)?;
    w.normal(e.common.normal())
}

const POLYFACE: &[Subclass<PolyfaceMesh>] = &[Subclass {
    marker: "AcDbPolyFaceMesh",
    read: read_polyface,
    write: write_polyface,
}];

fn read_polygon_mesh(e: &mut PolygonMesh, c: &mut FieldCursor<'_>) -> Result<()> {
    while let Some(tag) = c.next() {
        match tag.code {
            66 | 10 => {}
            70 => e.flags = PolylineFlags::from_bits_truncate(c.i16(tag)?),
            71 => e.m_count = c.i16(tag)?,
            72 => e.n_count = c.i16(tag)?,
            73 => e.m_density = c.i16(tag)?,
            74 => e.n_density = c.i16(tag)?,
            75 => e.smooth_surface = SmoothSurfaceType::from_value(c.i16(tag)?),
            210 => read_normal(&mut e.common, tag, c)?,
            _ => c.skip(tag),
        }
    }
    Ok(())
}

fn write_polygon_mesh(e: &PolygonMesh, w: &mut RecordWriter<'_>) -> Result<()> {
    w.i16(66, 1)?;
    w.point3(10, Vector3::ZERO)?;
    w.i16(70, (e.flags | PolylineFlags::POLYGON_MESH).bits())?;
    w.i16(71, e.m_count)?;
    w.i16(72, e.n_count)?;
    w.i16_or(73, e.m_density, 0)?;
    w.i16_or(74, e.n_density, 0)?;
    w.i16_or(75, e.smooth_surface.value(), 0)?;
    w.normal(e.common.normal())
}

const POLYGON_MESH: &[Subclass<PolygonMesh>] = &[Subclass {
    marker: "AcDbPolygonMesh",
    read: read_polygon_mesh,
    write: write_polygon_mesh,
}];

fn read_vertex_2d(e: &mut Vertex2D, c: &mut FieldCursor<'_>) -> Result<()> {
    while let Some(tag) = c.next() {
        match tag.code {
            10 => e.location = c.point3(tag)?,
            40 => e.start_width = c.f64(tag)?,
            41 => e.end_width = c.f64(tag)?,
            42 => e.bulge = c.f64(tag)?,
            70 => e.flags = VertexFlags::from_bits_truncate(c.i16(tag)?),
            50 => e.curve_tangent = c.f64(tag)?,
            _ => c.skip(tag),
        }
    }
    Ok(())
}

fn write_vertex_2d(e: &Vertex2D, w: &mut RecordWriter<'_>) -> Result<()> {
    w.point3(10, e.location)?;
    w.double_or(40, e.start_width, 0.0)?;
    w.double_or(41, e.end_width, 0.0)?;
    w.double_or(42, e.bulge, 0.0)?;
    w.i16(70, e.flags.bits())?;
    w.double_or(50, e.curve_tangent, 0.0)
}

const VERTEX_2D: &[Subclass<Vertex2D>] = &[
    Subclass {
        marker: "AcDbVertex",
        read: no_fields,
        write: no_output,
    },
    Subclass {
        marker: "AcDb2dVertex",
        read: read_vertex_2d,
        write: write_vertex_2d,
    },
];

/// Vertex types that only carry a location and flags
macro_rules! located_vertex {
    ($const:ident, $ty:ty, $marker:expr, $read:ident, $write:ident) => {
        fn $read(e: &mut $ty, c: &mut FieldCursor<'_>) -> Result<()> {
            while let Some(tag) = c.next() {
                match tag.code {
                    10 => e.location = c.point3(tag)?,
                    70 => e.flags = VertexFlags::from_bits_truncate(c.i16(tag)?),
                    _ => c.skip(tag),
                }
            }
            Ok(())
        }

        fn $write(e: &$ty, w: &mut RecordWriter<'_>) -> Result<()> {
            w.point3(10, e.location)?;
            w.i16(70, e.flags.bits())
        }

        const $const: &[Subclass<$ty>] = &[
            Subclass {
                marker: "AcDbVertex",
                read: no_fields,
                write: no_output,
            },
            Subclass {
                marker: $marker,
                read: $read,
                write: $write,
            },
        ];
    };
}

located_vertex!(VERTEX_3D, Vertex3D, "AcDb3dPolylineVertex", read_vertex_3d, write_vertex_3d);
located_vertex!(
    POLYFACE_VERTEX,
    PolyfaceVertex,
    "AcDbPolyFaceMeshVertex",
    read_polyface_vertex,
    write_polyface_vertex
);
located_vertex!(
    MESH_VERTEX,
    PolygonMeshVertex,
    "AcDbPolygonMeshVertex",
    read_mesh_vertex,
    write_mesh_vertex
);

fn read_face_record(e: &mut PolyfaceFace, c: &mut FieldCursor<'_>) -> Result<()> {
    while let Some(tag) = c.next() {
        match tag.code {
            10 | 70 => {}
            71..=74 => e.indices[(tag.code - 71) as usize] = c.i16(tag)?,
            _ => c.skip(tag),
        }
    }
    Ok(())
}

fn write_face_record(e: &PolyfaceFace, w: &mut RecordWriter<'_>) -> Result<()> {
    w.point3(10, Vector3::ZERO)?;
    w.i16(70, VertexFlags::POLYFACE_MESH.bits())?;
    for (code, index) in (71..).zip(e.indices) {
        if code == 71 || index != 0 {
            w.i16(code, index)?;
        }
    }
    Ok(())
}

const FACE_RECORD: &[Subclass<PolyfaceFace>] = &[
    Subclass {
        marker: "AcDbVertex",
        read: no_fields,
        write: no_output,
    },
    Subclass {
        marker: "AcDbFaceRecord",
        read: read_face_record,
        write: write_face_record,
    },
];

/// POLYLINE records become one of four types, picked by the flags (70)
fn read_polyline(record: &Record) -> Result<EntityType> {
    let flags = PolylineFlags::from_bits_truncate(record.find_i16(70).unwrap_or(0));
    let seqend = read_seqend(record)?;

    let entity = if flags.contains(PolylineFlags::POLYFACE_MESH) {
        let mut mesh = read_as(PolyfaceMesh::default(), record, POLYFACE)?;
        for child in &record.children {
            let child_flags = VertexFlags::from_bits_truncate(child.find_i16(70).unwrap_or(0));
            if child_flags.contains(VertexFlags::POLYGON_MESH) {
                mesh.vertices
                    .push(read_as(PolyfaceVertex::new(Vector3::ZERO), child, POLYFACE_VERTEX)?);
            } else {
                mesh.faces.push(read_as(PolyfaceFace::new([0; 4]), child, FACE_RECORD)?);
            }
        }
        mesh.seqend = seqend;
        EntityType::PolyfaceMesh(mesh)
    } else if flags.contains(PolylineFlags::POLYGON_MESH) {
        let mut mesh = read_as(PolygonMesh::default(), record, POLYGON_MESH)?;
        for child in &record.children {
            mesh.vertices
                .push(read_as(PolygonMeshVertex::new(Vector3::ZERO), child, MESH_VERTEX)?);
        }
        mesh.seqend = seqend;
        EntityType::PolygonMesh(mesh)
    } else if flags.contains(PolylineFlags::POLYLINE_3D) {
        let mut polyline = read_as(Polyline3D::default(), record, POLYLINE_3D)?;
        for child in &record.children {
            polyline
                .vertices
                .push(read_as(Vertex3D::new(Vector3::ZERO), child, VERTEX_3D)?);
        }
        polyline.seqend = seqend;
        EntityType::Polyline3D(polyline)
    } else {
        let mut polyline = read_as(Polyline2D::default(), record, POLYLINE_2D)?;
        for child in &record.children {
            polyline.vertices.push(read_as(Vertex2D::default(), child, VERTEX_2D)?);
        }
        polyline.seqend = seqend;
        EntityType::Polyline2D(polyline)
    };
    Ok(entity)
}

fn write_run<H, V>(
    head: &H,
    head_template: &'static [Subclass<H>],
    vertices: &[V],
    vertex_template: &'static [Subclass<V>],
    seqend: &Seqend,
    w: &mut RecordWriter<'_>,
) -> Result<()>
where
    H: Entity + CadObject + 'static,
    V: Entity + CadObject + 'static,
{
    write_as(head, "POLYLINE", head_template, w)?;
    for vertex in vertices {
        write_as(vertex, "VERTEX", vertex_template, w)?;
    }
    write_as(seqend, "SEQEND", SEQEND, w)
}

// SPLINE

fn read_spline(e: &mut Spline, c: &mut FieldCursor<'_>) -> Result<()> {
    while let Some(tag) = c.next() {
        match tag.code {
            72 | 73 | 74 => {}
            210 => read_normal(&mut e.common, tag, c)?,
            70 => e.flags = SplineFlags::from_bits_truncate(c.i16(tag)?),
            71 => {
                let degree = c.i16(tag)?;
                c.check(71, e.set_degree(degree))?;
            }
            42 => e.knot_tolerance = c.f64(tag)?,
            43 => e.control_point_tolerance = c.f64(tag)?,
            44 => e.fit_tolerance = c.f64(tag)?,
            12 => e.start_tangent = Some(c.point3(tag)?),
            13 => e.end_tangent = Some(c.point3(tag)?),
            40 => e.knots.push(c.f64(tag)?),
            41 => e.weights.push(c.f64(tag)?),
            10 => e.control_points.push(c.point3(tag)?),
            11 => e.fit_points.push(c.point3(tag)?),
            _ => c.skip(tag),
        }
    }
    Ok(())
}

fn write_spline(e: &Spline, w: &mut RecordWriter<'_>) -> Result<()> {
    w.normal(e.common.normal())?;
    w.i16(70, e.flags.bits())?;
    w.i16(71, e.degree())?;
    w.i16(72, e.knots.len() as i16)?;
    w.i16(73, e.control_points.len() as i16)?;
    w.i16(74, e.fit_points.len() as i16)?;
    w.double(42, e.knot_tolerance)?;
    w.double(43, e.control_point_tolerance)?;
    if !e.fit_points.is_empty() {
        w.double(44, e.fit_tolerance)?;
    }
    if let Some(tangent) = e.start_tangent {
        w.point3(12, tangent)?;
    }
    if let Some(tangent) = e.end_tangent {
        w.point3(13, tangent)?;
    }
    for knot in &e.knots {
        w.double(40, *knot)?;
    }
    for weight in &e.weights {
        w.double(41, *weight)?;
    }
    for point in &e.control_points {
        w.point3(10, *point)?;
    }
    for point in &e.fit_points {
        w.point3(11, *point)?;
    }
    Ok(())
}

const SPLINE: &[Subclass<Spline>] = &[Subclass {
    marker: "AcDbSpline",
    read: read_spline,
    write: write_spline,
}];

// HATCH

fn missing(c: &FieldCursor<'_>, code: i32, what: &'static str) -> DxfError {
    DxfError::EntityValidation {
        entity: c.record().to_string(),
        code,
        source: ArgumentError::new(what, "expected group code is missing"),
    }
}

fn next_f64(c: &mut FieldCursor<'_>, code: i32) -> Result<f64> {
    match c.next_if(code) {
        Some(tag) => c.f64(tag),
        None => Ok(0.0),
    }
}

fn next_i32(c: &mut FieldCursor<'_>, code: i32) -> Result<i32> {
    match c.next_if(code) {
        Some(tag) => c.i32(tag),
        None => Ok(0),
    }
}

/// Entry count; negative counts read as zero
fn next_count(c: &mut FieldCursor<'_>, code: i32) -> Result<usize> {
    Ok(next_i32(c, code)?.max(0) as usize)
}

fn tag_count(c: &FieldCursor<'_>, tag: &crate::io::dxf::lexer::Tag) -> Result<usize> {
    Ok(c.i32(tag)?.max(0) as usize)
}

fn next_flag(c: &mut FieldCursor<'_>, code: i32) -> Result<bool> {
    match c.next_if(code) {
        Some(tag) => Ok(c.i16(tag)? != 0),
        None => Ok(false),
    }
}

fn next_point2(c: &mut FieldCursor<'_>, code: i32) -> Result<Option<Vector2>> {
    match c.next_if(code) {
        Some(tag) => Ok(Some(c.point2(tag)?)),
        None => Ok(None),
    }
}

fn read_edge(c: &mut FieldCursor<'_>) -> Result<BoundaryEdge> {
    let kind = match c.next_if(72) {
        Some(tag) => c.i16(tag)?,
        None => return Err(missing(c, 72, "edge_type")),
    };
    let edge = match kind {
        1 => BoundaryEdge::Line(LineEdge {
            start: next_point2(c, 10)?.unwrap_or_default(),
            end: next_point2(c, 11)?.unwrap_or_default(),
        }),
        2 => BoundaryEdge::Arc(ArcEdge {
            center: next_point2(c, 10)?.unwrap_or_default(),
            radius: next_f64(c, 40)?,
            start_angle: next_f64(c, 50)?,
            end_angle: next_f64(c, 51)?,
            counter_clockwise: next_flag(c, 73)?,
        }),
        3 => BoundaryEdge::Ellipse(EllipseEdge {
            center: next_point2(c, 10)?.unwrap_or_default(),
            major_axis: next_point2(c, 11)?.unwrap_or_default(),
            minor_axis_ratio: next_f64(c, 40)?,
            start_angle: next_f64(c, 50)?,
            end_angle: next_f64(c, 51)?,
            counter_clockwise: next_flag(c, 73)?,
        }),
        4 => BoundaryEdge::Spline(read_spline_edge(c)?),
        other => {
            return c.check(
                72,
                Err(ArgumentError::new("edge_type", format!("unknown edge type {}", other))),
            )
        }
    };
    Ok(edge)
}

fn read_spline_edge(c: &mut FieldCursor<'_>) -> Result<SplineEdge> {
    let degree = next_i32(c, 94)?;
    let rational = next_flag(c, 73)?;
    let periodic = next_flag(c, 74)?;
    let knot_count = next_count(c, 95)?;
    let point_count = next_count(c, 96)?;
    let mut edge = SplineEdge {
        degree,
        rational,
        periodic,
        knots: Vec::new(),
        control_points: Vec::new(),
        weights: Vec::new(),
        fit_points: Vec::new(),
        start_tangent: None,
        end_tangent: None,
    };
    while edge.knots.len() < knot_count {
        match c.next_if(40) {
            Some(tag) => edge.knots.push(c.f64(tag)?),
            None => return Err(c.short_count(95, knot_count, edge.knots.len())),
        }
    }
    while edge.control_points.len() < point_count {
        match next_point2(c, 10)? {
            Some(point) => edge.control_points.push(point),
            None => return Err(c.short_count(96, point_count, edge.control_points.len())),
        }
        if let Some(tag) = c.next_if(42) {
            edge.weights.push(c.f64(tag)?);
        }
    }
    if c.peek_code() == Some(97) {
        let fit_count = next_count(c, 97)?;
        while edge.fit_points.len() < fit_count {
            match next_point2(c, 11)? {
                Some(point) => edge.fit_points.push(point),
                None => return Err(c.short_count(97, fit_count, edge.fit_points.len())),
            }
        }
        edge.start_tangent = next_point2(c, 12)?;
        edge.end_tangent = next_point2(c, 13)?;
    }
    Ok(edge)
}

fn read_boundary_path(c: &mut FieldCursor<'_>) -> Result<BoundaryPath> {
    let mut path = BoundaryPath::new();
    path.flags = BoundaryPathFlags::from_bits_truncate(next_i32(c, 92)?);
    if path.is_polyline() {
        let has_bulge = next_flag(c, 72)?;
        let is_closed = next_flag(c, 73)?;
        let count = next_count(c, 93)?;
        let mut vertices = Vec::new();
        while vertices.len() < count {
            let location = match next_point2(c, 10)? {
                Some(point) => point,
                None => return Err(c.short_count(93, count, vertices.len())),
            };
            let bulge = if has_bulge { next_f64(c, 42)? } else { 0.0 };
            vertices.push(BulgeVertex { location, bulge });
        }
        let edge = BoundaryEdge::Polyline(PolylineEdge {
            vertices,
            is_closed,
        });
        c.check(92, path.add_edge(edge))?;
    } else {
        let count = next_count(c, 93)?;
        while path.edges().len() < count {
            if c.peek_code() != Some(72) {
                return Err(c.short_count(93, count, path.edges().len()));
            }
            let edge = read_edge(c)?;
            c.check(72, path.add_edge(edge))?;
        }
    }
    let handles = next_i32(c, 97)?;
    for _ in 0..handles {
        match c.next_if(330) {
            Some(tag) => path.boundary_handles.push(c.handle(tag)?),
            None => break,
        }
    }
    Ok(path)
}

fn read_pattern_line(c: &mut FieldCursor<'_>, angle: f64) -> Result<HatchPatternLine> {
    let base_point = Vector2::new(next_f64(c, 43)?, next_f64(c, 44)?);
    let offset = Vector2::new(next_f64(c, 45)?, next_f64(c, 46)?);
    let dashes = c
        .next_if(79)
        .map(|tag| c.i16(tag))
        .transpose()?
        .unwrap_or(0);
    let mut dash_lengths = Vec::new();
    for _ in 0..dashes {
        match c.next_if(49) {
            Some(tag) => dash_lengths.push(c.f64(tag)?),
            None => break,
        }
    }
    Ok(HatchPatternLine {
        angle,
        base_point,
        offset,
        dash_lengths,
    })
}

fn read_hatch(e: &mut Hatch, c: &mut FieldCursor<'_>) -> Result<()> {
    while let Some(tag) = c.next() {
        match tag.code {
            10 => e.elevation = c.point3(tag)?.z,
            210 => read_normal(&mut e.common, tag, c)?,
            2 => e.pattern.name = c.string(tag),
            70 => e.is_solid = c.i16(tag)? != 0,
            71 => e.is_associative = c.i16(tag)? != 0,
            91 => {
                let declared = tag_count(c, tag)?;
                let mut found = 0;
                while found < declared {
                    if c.peek_code() != Some(92) {
                        return Err(c.short_count(91, declared, found));
                    }
                    let path = read_boundary_path(c)?;
                    e.paths.push(path);
                    found += 1;
                }
            }
            75 => e.style = HatchStyleType::from_value(c.i16(tag)?),
            76 => e.pattern_type = HatchPatternType::from_value(c.i16(tag)?),
            52 => e.pattern_angle = c.f64(tag)?,
            41 => e.pattern_scale = c.f64(tag)?,
            77 => e.is_double = c.i16(tag)? != 0,
            78 => {
                for _ in 0..c.i16(tag)? {
                    let angle = match c.next_if(53) {
                        Some(t) => c.f64(t)?,
                        None => break,
                    };
                    let line = read_pattern_line(c, angle)?;
                    e.pattern.lines.push(line);
                }
            }
            47 => e.pixel_size = c.f64(tag)?,
            98 => {
                for _ in 0..c.i32(tag)? {
                    match next_point2(c, 10)? {
                        Some(point) => e.seed_points.push(point),
                        None => break,
                    }
                }
            }
            450 => e.gradient.enabled = c.i32(tag)? != 0,
            451 => e.gradient.reserved = c.i32(tag)?,
            452 => e.gradient.is_single_color = c.i32(tag)? != 0,
            453 => {}
            460 => e.gradient.angle = c.f64(tag)?,
            461 => e.gradient.shift = c.f64(tag)?,
            462 => e.gradient.color_tint = c.f64(tag)?,
            463 => e.gradient.colors.push(GradientColorEntry {
                value: c.f64(tag)?,
                color: Color::ByLayer,
            }),
            63 => {
                let color = Color::from_index(c.i16(tag)?);
                if let Some(entry) = e.gradient.colors.last_mut() {
                    entry.color = color;
                }
            }
            421 => {
                let color = Color::from_true_color(c.i32(tag)?);
                if let Some(entry) = e.gradient.colors.last_mut() {
                    entry.color = color;
                }
            }
            470 => e.gradient.name = c.string(tag),
            _ => c.skip(tag),
        }
    }
    Ok(())
}

fn write_edge(edge: &BoundaryEdge, w: &mut RecordWriter<'_>) -> Result<()> {
    let kind = match edge.edge_type() {
        Some(kind) => kind,
        None => return Ok(()),
    };
    w.i16(72, kind)?;
    match edge {
        BoundaryEdge::Line(line) => {
            w.point2(10, line.start)?;
            w.point2(11, line.end)?;
        }
        BoundaryEdge::Arc(arc) => {
            w.point2(10, arc.center)?;
            w.double(40, arc.radius)?;
            w.double(50, arc.start_angle)?;
            w.double(51, arc.end_angle)?;
            w.i16(73, arc.counter_clockwise as i16)?;
        }
        BoundaryEdge::Ellipse(ellipse) => {
            w.point2(10, ellipse.center)?;
            w.point2(11, ellipse.major_axis)?;
            w.double(40, ellipse.minor_axis_ratio)?;
            w.double(50, ellipse.start_angle)?;
            w.double(51, ellipse.end_angle)?;
            w.i16(73, ellipse.counter_clockwise as i16)?;
        }
        BoundaryEdge::Spline(spline) => {
            w.i32(94, spline.degree)?;
            w.i16(73, spline.rational as i16)?;
            w.i16(74, spline.periodic as i16)?;
            w.i32(95, spline.knots.len() as i32)?;
            w.i32(96, spline.control_points.len() as i32)?;
            for knot in &spline.knots {
                w.double(40, *knot)?;
            }
            for (i, point) in spline.control_points.iter().enumerate() {
                w.point2(10, *point)?;
                if let Some(weight) = spline.weights.get(i) {
                    w.double(42, *weight)?;
                }
            }
            if w.at_least(DxfVersion::AC1021) {
                w.i32(97, spline.fit_points.len() as i32)?;
                for point in &spline.fit_points {
                    w.point2(11, *point)?;
                }
                if let Some(tangent) = spline.start_tangent {
                    w.point2(12, tangent)?;
                }
                if let Some(tangent) = spline.end_tangent {
                    w.point2(13, tangent)?;
                }
            }
        }
        BoundaryEdge::Polyline(_) => {}
    }
    Ok(())
}

fn write_boundary_path(path: &BoundaryPath, w: &mut RecordWriter<'_>) -> Result<()> {
    let polyline = path.edges().iter().find_map(|edge| match edge {
        BoundaryEdge::Polyline(p) => Some(p),
        _ => None,
    });
    match polyline {
        Some(polyline) => {
            w.i32(92, (path.flags | BoundaryPathFlags::POLYLINE).bits())?;
            let has_bulge = polyline.has_bulge();
            w.i16(72, has_bulge as i16)?;
            w.i16(73, polyline.is_closed as i16)?;
            w.i32(93, polyline.vertices.len() as i32)?;
            for vertex in &polyline.vertices {
                w.point2(10, vertex.location)?;
                if has_bulge {
                    w.double(42, vertex.bulge)?;
                }
            }
        }
        None => {
            w.i32(92, (path.flags - BoundaryPathFlags::POLYLINE).bits())?;
            w.i32(93, path.edges().len() as i32)?;
            for edge in path.edges() {
                write_edge(edge, w)?;
            }
        }
    }
    w.i32(97, path.boundary_handles.len() as i32)?;
    for handle in &path.boundary_handles {
        w.handle(330, *handle)?;
    }
    Ok(())
}

fn write_hatch(e: &Hatch, w: &mut RecordWriter<'_>) -> Result<()> {
    w.point3(10, Vector3::new(0.0, 0.0, e.elevation))?;
    w.point3(210, e.common.normal())?;
    w.string(2, &e.pattern.name)?;
    w.i16(70, e.is_solid as i16)?;
    w.i16(71, e.is_associative as i16)?;
    w.i32(91, e.paths.len() as i32)?;
    for path in &e.paths {
        write_boundary_path(path, w)?;
    }
    w.i16(75, e.style.value())?;
    w.i16(76, e.pattern_type.value())?;
    if !e.is_solid {
        w.double(52, e.pattern_angle)?;
        w.double(41, e.pattern_scale)?;
        w.i16(77, e.is_double as i16)?;
        w.i16(78, e.pattern.lines.len() as i16)?;
        for line in &e.pattern.lines {
            w.double(53, line.angle)?;
            w.double(43, line.base_point.x)?;
            w.double(44, line.base_point.y)?;
            w.double(45, line.offset.x)?;
            w.double(46, line.offset.y)?;
            w.i16(79, line.dash_lengths.len() as i16)?;
            for dash in &line.dash_lengths {
                w.double(49, *dash)?;
            }
        }
    }
    w.double_or(47, e.pixel_size, 0.0)?;
    w.i32(98, e.seed_points.len() as i32)?;
    for seed in &e.seed_points {
        w.point2(10, *seed)?;
    }
    if w.at_least(DxfVersion::AC1018) && e.gradient.enabled {
        let g = &e.gradient;
        w.i32(450, 1)?;
        w.i32(451, g.reserved)?;
        w.i32(452, g.is_single_color as i32)?;
        w.i32(453, g.colors.len() as i32)?;
        w.double(460, g.angle)?;
        w.double(461, g.shift)?;
        w.double(462, g.color_tint)?;
        for entry in &g.colors {
            w.double(463, entry.value)?;
            w.i16(63, entry.color.aci())?;
            if let Some(rgb) = entry.color.true_color() {
                w.i32(421, rgb)?;
            }
        }
        w.string(470, &g.name)?;
    }
    Ok(())
}

const HATCH: &[Subclass<Hatch>] = &[Subclass {
    marker: "AcDbHatch",
    read: read_hatch,
    write: write_hatch,
}];

// MLINE, MESH

fn read_mline(e: &mut MLine, c: &mut FieldCursor<'_>) -> Result<()> {
    while let Some(tag) = c.next() {
        match tag.code {
            72 | 73 => {}
            2 => e.style_name = c.string(tag),
            340 => e.style = c.handle(tag)?,
            40 => e.scale = c.f64(tag)?,
            70 => e.justification = MLineJustification::from_value(c.i16(tag)?),
            71 => e.flags = MLineFlags::from_bits_truncate(c.i16(tag)?),
            10 => e.start_point = c.point3(tag)?,
            210 => read_normal(&mut e.common, tag, c)?,
            11 => e.vertices.push(MLineVertex::new(c.point3(tag)?)),
            12 | 13 | 74 | 75 => {
                let vertex = match e.vertices.last_mut() {
                    Some(vertex) => vertex,
                    None => {
                        c.skip(tag);
                        continue;
                    }
                };
                match tag.code {
                    12 => vertex.direction = c.point3(tag)?,
                    13 => vertex.miter = c.point3(tag)?,
                    74 => {
                        let mut segment = MLineSegment::default();
                        for _ in 0..c.i16(tag)? {
                            match c.next_if(41) {
                                Some(t) => segment.parameters.push(c.f64(t)?),
                                None => break,
                            }
                        }
                        vertex.segments.push(segment);
                    }
                    _ => {
                        let count = c.i16(tag)?;
                        let mut fills = Vec::new();
                        for _ in 0..count {
                            match c.next_if(42) {
                                Some(t) => fills.push(c.f64(t)?),
                                None => break,
                            }
                        }
                        if let Some(segment) = vertex.segments.last_mut() {
                            segment.area_fill_parameters = fills;
                        }
                    }
                }
            }
            _ => c.skip(tag),
        }
    }
    Ok(())
}

fn write_mline(e: &MLine, w: &mut RecordWriter<'_>) -> Result<()> {
    w.string(2, &e.style_name)?;
    w.opt_handle(340, e.style)?;
    w.double(40, e.scale)?;
    w.i16(70, e.justification.value())?;
    w.i16(71, e.flags.bits())?;
    w.i16(72, e.vertices.len() as i16)?;
    w.i16(73, e.element_count() as i16)?;
    w.point3(10, e.start_point)?;
    w.point3(210, e.common.normal())?;
    for vertex in &e.vertices {
        w.point3(11, vertex.position)?;
        w.point3(12, vertex.direction)?;
        w.point3(13, vertex.miter)?;
        for segment in &vertex.segments {
            w.i16(74, segment.parameters.len() as i16)?;
            for p in &segment.parameters {
                w.double(41, *p)?;
            }
            w.i16(75, segment.area_fill_parameters.len() as i16)?;
            for p in &segment.area_fill_parameters {
                w.double(42, *p)?;
            }
        }
    }
    Ok(())
}

const MLINE: &[Subclass<MLine>] = &[Subclass {
    marker: "AcDbMline",
    read: read_mline,
    write: write_mline,
}];

fn next_index(c: &mut FieldCursor<'_>) -> Result<Option<usize>> {
    match c.next_if(90) {
        Some(tag) => Ok(Some(c.i32(tag)?.max(0) as usize)),
        None => Ok(None),
    }
}

fn read_mesh(e: &mut Mesh, c: &mut FieldCursor<'_>) -> Result<()> {
    while let Some(tag) = c.next() {
        match tag.code {
            71 => e.version = c.i16(tag)?,
            72 => e.blend_crease = c.i16(tag)? != 0,
            91 => e.subdivision_level = c.i32(tag)?,
            92 => {
                let declared = tag_count(c, tag)?;
                let mut found = 0;
                while found < declared {
                    match c.next_if(10) {
                        Some(t) => e.vertices.push(c.point3(t)?),
                        None => return Err(c.short_count(92, declared, found)),
                    }
                    found += 1;
                }
            }
            93 => {
                // total of face sizes and indices
                let declared = tag_count(c, tag)?;
                let mut found = 0;
                while found < declared {
                    let size = match next_index(c)? {
                        Some(size) => size,
                        None => return Err(c.short_count(93, declared, found)),
                    };
                    found += 1;
                    let mut face = Vec::with_capacity(size.min(c.remaining()));
                    while face.len() < size {
                        match next_index(c)? {
                            Some(index) => face.push(index),
                            None => return Err(c.short_count(93, declared, found)),
                        }
                        found += 1;
                    }
                    e.faces.push(face);
                }
            }
            94 => {
                let declared = tag_count(c, tag)?;
                let mut found = 0;
                while found < declared {
                    match (next_index(c)?, next_index(c)?) {
                        (Some(start), Some(end)) => e.edges.push(MeshEdge::new(start, end)),
                        _ => return Err(c.short_count(94, declared, found)),
                    }
                    found += 1;
                }
            }
            95 => {
                for i in 0..c.i32(tag)?.max(0) as usize {
                    let crease = match c.next_if(140) {
                        Some(t) => c.f64(t)?,
                        None => break,
                    };
                    if let Some(edge) = e.edges.get_mut(i) {
                        edge.crease = crease;
                    }
                }
            }
            _ => c.skip(tag),
        }
    }
    Ok(())
}

fn write_mesh(e: &Mesh, w: &mut RecordWriter<'_>) -> Result<()> {
    w.i16(71, e.version)?;
    w.i16(72, e.blend_crease as i16)?;
    w.i32(91, e.subdivision_level)?;
    w.i32(92, e.vertices.len() as i32)?;
    for vertex in &e.vertices {
        w.point3(10, *vertex)?;
    }
    w.i32(93, e.face_list_size() as i32)?;
    for face in &e.faces {
        w.i32(90, face.len() as i32)?;
        for index in face {
            w.i32(90, *index as i32)?;
        }
    }
    w.i32(94, e.edges.len() as i32)?;
    for edge in &e.edges {
        w.i32(90, edge.start as i32)?;
        w.i32(90, edge.end as i32)?;
    }
    w.i32(95, e.edges.len() as i32)?;
    for edge in &e.edges {
        w.double(140, edge.crease)?;
    }
    w.i32(90, 0)
}

const MESH: &[Subclass<Mesh>] = &[Subclass {
    marker: "AcDbSubDMesh",
    read: read_mesh,
    write: write_mesh,
}];

// UNDERLAY, WIPEOUT, OLE2FRAME

fn read_underlay(e: &mut Underlay, c: &mut FieldCursor<'_>) -> Result<()> {
    let mut scale = e.scale();
    let mut scale_seen = false;
    while let Some(tag) = c.next() {
        match tag.code {
            340 => e.definition = c.handle(tag)?,
            10 => e.insertion_point = c.point3(tag)?,
            41 | 42 | 43 => {
                let value = c.f64(tag)?;
                match tag.code {
                    41 => scale.x = value,
                    42 => scale.y = value,
                    _ => scale.z = value,
                }
                scale_seen = true;
            }
            50 => e.set_rotation(c.f64(tag)?),
            210 => read_normal(&mut e.common, tag, c)?,
            280 => e.flags = UnderlayDisplayFlags::from_bits_truncate(c.i16(tag)?),
            281 => {
                let contrast = c.i16(tag)?;
                c.check(281, e.set_contrast(contrast))?;
            }
            282 => {
                let fade = c.i16(tag)?;
                c.check(282, e.set_fade(fade))?;
            }
            11 => e.clip_boundary.push(c.point2(tag)?),
            _ => c.skip(tag),
        }
    }
    if scale_seen {
        c.check(41, e.set_scale(scale))?;
    }
    Ok(())
}

fn write_underlay(e: &Underlay, w: &mut RecordWriter<'_>) -> Result<()> {
    w.opt_handle(340, e.definition)?;
    w.point3(10, e.insertion_point)?;
    let scale = e.scale();
    w.double(41, scale.x)?;
    w.double(42, scale.y)?;
    w.double(43, scale.z)?;
    w.double_or(50, e.rotation(), 0.0)?;
    w.normal(e.common.normal())?;
    w.i16(280, e.flags.bits())?;
    w.i16(281, e.contrast())?;
    w.i16(282, e.fade())?;
    for point in &e.clip_boundary {
        w.point2(11, *point)?;
    }
    Ok(())
}

const UNDERLAY: &[Subclass<Underlay>] = &[Subclass {
    marker: "AcDbUnderlayReference",
    read: read_underlay,
    write: write_underlay,
}];

fn read_wipeout(e: &mut Wipeout, c: &mut FieldCursor<'_>) -> Result<()> {
    while let Some(tag) = c.next() {
        match tag.code {
            91 => {}
            90 => e.class_version = c.i32(tag)?,
            10 => e.insertion_point = c.point3(tag)?,
            11 => e.u_vector = c.point3(tag)?,
            12 => e.v_vector = c.point3(tag)?,
            13 => e.size = c.point2(tag)?,
            340 => e.definition = c.handle(tag)?,
            70 => e.flags = wipeout::WipeoutDisplayFlags::from_bits_truncate(c.i16(tag)?),
            280 => e.clipping_enabled = c.i16(tag)? != 0,
            281 => e.brightness = c.i16(tag)?,
            282 => e.contrast = c.i16(tag)?,
            283 => e.fade = c.i16(tag)?,
            360 => e.definition_reactor = c.handle(tag)?,
            71 => e.clip_type = wipeout::WipeoutClipType::from_value(c.i16(tag)?),
            14 => e.clip_boundary.push(c.point2(tag)?),
            290 => e.clip_inside = c.bool(tag)?,
            _ => c.skip(tag),
        }
    }
    Ok(())
}

fn write_wipeout(e: &Wipeout, w: &mut RecordWriter<'_>) -> Result<()> {
    w.i32(90, e.class_version)?;
    w.point3(10, e.insertion_point)?;
    w.point3(11, e.u_vector)?;
    w.point3(12, e.v_vector)?;
    w.point2(13, e.size)?;
    w.opt_handle(340, e.definition)?;
    w.i16(70, e.flags.bits())?;
    w.i16(280, e.clipping_enabled as i16)?;
    w.i16(281, e.brightness)?;
    w.i16(282, e.contrast)?;
    w.i16(283, e.fade)?;
    w.opt_handle(360, e.definition_reactor)?;
    w.i16(71, e.clip_type.value())?;
    w.i32(91, e.clip_boundary.len() as i32)?;
    for point in &e.clip_boundary {
        w.point2(14, *point)?;
    }
    if w.at_least(DxfVersion::AC1024) {
        w.bool(290, e.clip_inside)?;
    }
    Ok(())
}

const WIPEOUT: &[Subclass<Wipeout>] = &[
    Subclass {
        marker: "AcDbRasterImage",
        read: read_wipeout,
        write: write_wipeout,
    },
    Subclass {
        marker: "AcDbWipeout",
        read: no_fields,
        write: no_output,
    },
];

fn read_ole2frame(e: &mut Ole2Frame, c: &mut FieldCursor<'_>) -> Result<()> {
    while let Some(tag) = c.next() {
        match tag.code {
            // data length and the closing "OLE" marker
            90 | 1 => {}
            70 => e.version = c.i16(tag)?,
            3 => e.source_application = c.string(tag),
            10 => e.upper_left_corner = c.point3(tag)?,
            11 => e.lower_right_corner = c.point3(tag)?,
            71 => e.object_type = ole2frame::OleObjectType::from_value(c.i16(tag)?),
            72 => e.in_paper_space = c.i16(tag)? != 0,
            310 => e.binary_data.extend(c.binary(tag)?),
            _ => c.skip(tag),
        }
    }
    Ok(())
}

fn write_ole2frame(e: &Ole2Frame, w: &mut RecordWriter<'_>) -> Result<()> {
    w.i16(70, e.version)?;
    w.opt_string(3, &e.source_application)?;
    w.point3(10, e.upper_left_corner)?;
    w.point3(11, e.lower_right_corner)?;
    w.i16(71, e.object_type.value())?;
    w.i16(72, e.in_paper_space as i16)?;
    w.i32(90, e.binary_data.len() as i32)?;
    w.binary(310, &e.binary_data)?;
    w.string(1, "OLE")
}

const OLE2FRAME: &[Subclass<Ole2Frame>] = &[Subclass {
    marker: "AcDbOle2Frame",
    read: read_ole2frame,
    write: write_ole2frame,
}];

// DIMENSION

fn read_dimension_base(d: &mut Dimension, c: &mut FieldCursor<'_>) -> Result<()> {
    let mut direction = None;
    let base = d.base_mut();
    while let Some(tag) = c.next() {
        match tag.code {
            280 => base.version = c.i16(tag)?,
            2 => base.block_name = c.string(tag),
            3 => base.style = c.string(tag),
            10 => base.definition_point = c.point3(tag)?,
            11 => base.text_middle_point = c.point3(tag)?,
            12 => base.insertion_point = c.point3(tag)?,
            70 => base.flags = DimensionFlags::from_bits_truncate(c.i16(tag)?),
            71 => base.attachment_point = AttachmentPoint::from_value(c.i16(tag)?),
            72 => base.line_spacing_style = LineSpacingStyle::from_value(c.i16(tag)?),
            41 => base.line_spacing_factor = c.f64(tag)?,
            42 => base.actual_measurement = c.f64(tag)?,
            1 => base.text = c.string(tag),
            53 => base.text_rotation = c.f64(tag)?,
            51 => direction = Some(c.f64(tag)?),
            210 => read_normal(&mut base.common, tag, c)?,
            _ => c.skip(tag),
        }
    }
    if let Some(angle) = direction {
        match d {
            Dimension::Ordinate(ordinate) => ordinate.set_rotation(angle),
            other => other.base_mut().horizontal_direction = angle,
        }
    }
    Ok(())
}

fn write_dimension_base(d: &Dimension, w: &mut RecordWriter<'_>) -> Result<()> {
    let base = d.base();
    if w.at_least(DxfVersion::AC1021) {
        w.i16(280, base.version)?;
    }
    w.string(2, &base.block_name)?;
    w.point3(10, base.definition_point)?;
    w.point3(11, base.text_middle_point)?;
    if base.insertion_point != Vector3::ZERO {
        w.point3(12, base.insertion_point)?;
    }
    w.i16(70, d.type_flags())?;
    if w.at_least(DxfVersion::AC1015) {
        w.i16(71, base.attachment_point.value())?;
        w.i16(72, base.line_spacing_style.value())?;
        w.double(41, base.line_spacing_factor)?;
    }
    if w.at_least(DxfVersion::AC1012) {
        w.double(42, base.actual_measurement)?;
    }
    w.opt_string(1, &base.text)?;
    w.double_or(53, base.text_rotation, 0.0)?;
    w.double_or(51, base.horizontal_direction, 0.0)?;
    w.normal(base.common.normal())?;
    w.string(3, &base.style)
}

const DIMENSION_BASE: Subclass<Dimension> = Subclass {
    marker: "AcDbDimension",
    read: read_dimension_base,
    write: write_dimension_base,
};

/// Reader for the points of one dimension kind; tags of other kinds stay
/// with the cursor
macro_rules! dimension_points {
    ($read:ident, $write:ident, $variant:ident, { $($code:expr => $get:ident / $set:ident),+ $(,)? }) => {
        fn $read(d: &mut Dimension, c: &mut FieldCursor<'_>) -> Result<()> {
            if let Dimension::$variant(dim) = d {
                while let Some(tag) = c.next() {
                    match tag.code {
                        $($code => {
                            let point = c.point3(tag)?;
                            dim.$set(point);
                        })+
                        _ => c.skip(tag),
                    }
                }
            }
            Ok(())
        }

        fn $write(d: &Dimension, w: &mut RecordWriter<'_>) -> Result<()> {
            if let Dimension::$variant(dim) = d {
                $(w.point3($code, dim.$get())?;)+
            }
            Ok(())
        }
    };
}

fn read_aligned(d: &mut Dimension, c: &mut FieldCursor<'_>) -> Result<()> {
    if let Dimension::Aligned(dim) = d {
        while let Some(tag) = c.next() {
            match tag.code {
                13 => dim.set_first_point(c.point3(tag)?),
                14 => dim.set_second_point(c.point3(tag)?),
                52 => dim.ext_line_rotation = c.f64(tag)?,
                _ => c.skip(tag),
            }
        }
    }
    Ok(())
}

fn write_aligned(d: &Dimension, w: &mut RecordWriter<'_>) -> Result<()> {
    if let Dimension::Aligned(dim) = d {
        w.point3(13, dim.first_point())?;
        w.point3(14, dim.second_point())?;
        w.double_or(52, dim.ext_line_rotation, 0.0)?;
    }
    Ok(())
}

fn read_linear(d: &mut Dimension, c: &mut FieldCursor<'_>) -> Result<()> {
    if let Dimension::Linear(dim) = d {
        while let Some(tag) = c.next() {
            match tag.code {
                13 => dim.set_first_point(c.point3(tag)?),
                14 => dim.set_second_point(c.point3(tag)?),
                50 => dim.set_rotation(c.f64(tag)?),
                52 => dim.ext_line_rotation = c.f64(tag)?,
                _ => c.skip(tag),
            }
        }
    }
    Ok(())
}

fn write_linear(d: &Dimension, w: &mut RecordWriter<'_>) -> Result<()> {
    if let Dimension::Linear(dim) = d {
        w.point3(13, dim.first_point())?;
        w.point3(14, dim.second_point())?;
        w.double_or(50, dim.rotation(), 0.0)?;
        w.double_or(52, dim.ext_line_rotation, 0.0)?;
    }
    Ok(())
}

fn read_radial(d: &mut Dimension, c: &mut FieldCursor<'_>) -> Result<()> {
    while let Some(tag) = c.next() {
        match (tag.code, &mut *d) {
            (15, Dimension::Radius(dim)) => dim.set_chord_point(c.point3(tag)?),
            (15, Dimension::Diameter(dim)) => dim.set_chord_point(c.point3(tag)?),
            (40, Dimension::Radius(dim)) => dim.leader_length = c.f64(tag)?,
            (40, Dimension::Diameter(dim)) => dim.leader_length = c.f64(tag)?,
            _ => c.skip(tag),
        }
    }
    Ok(())
}

fn write_radial(d: &Dimension, w: &mut RecordWriter<'_>) -> Result<()> {
    let (chord, leader) = match d {
        Dimension::Radius(dim) => (dim.chord_point(), dim.leader_length),
        Dimension::Diameter(dim) => (dim.chord_point(), dim.leader_length),
        _ => return Ok(()),
    };
    w.point3(15, chord)?;
    w.double(40, leader)
}

dimension_points!(read_angular_2ln, write_angular_2ln, Angular2Ln, {
    13 => first_line_start / set_first_line_start,
    14 => first_line_end / set_first_line_end,
    15 => second_line_start / set_second_line_start,
    16 => arc_point / set_arc_point,
});

dimension_points!(read_angular_3pt, write_angular_3pt, Angular3Pt, {
    13 => first_point / set_first_point,
    14 => second_point / set_second_point,
    15 => angle_vertex / set_angle_vertex,
});

dimension_points!(read_ordinate, write_ordinate, Ordinate, {
    13 => feature_location / set_feature_location,
    14 => leader_endpoint / set_leader_endpoint,
});

const DIM_ALIGNED: &[Subclass<Dimension>] = &[
    DIMENSION_BASE,
    Subclass {
        marker: "AcDbAlignedDimension",
        read: read_aligned,
        write: write_aligned,
    },
];

const DIM_LINEAR: &[Subclass<Dimension>] = &[
    DIMENSION_BASE,
    Subclass {
        marker: "AcDbAlignedDimension",
        read: read_linear,
        write: write_linear,
    },
    Subclass {
        marker: "AcDbRotatedDimension",
        read: no_fields,
        write: no_output,
    },
];

const DIM_RADIUS: &[Subclass<Dimension>] = &[
    DIMENSION_BASE,
    Subclass {
        marker: "AcDbRadialDimension",
        read: read_radial,
        write: write_radial,
    },
];

const DIM_DIAMETER: &[Subclass<Dimension>] = &[
    DIMENSION_BASE,
    Subclass {
        marker: "AcDbDiametricDimension",
        read: read_radial,
        write: write_radial,
    },
];

const DIM_ANGULAR_2LN: &[Subclass<Dimension>] = &[
    DIMENSION_BASE,
    Subclass {
        marker: "AcDb2LineAngularDimension",
        read: read_angular_2ln,
        write: write_angular_2ln,
    },
];

const DIM_ANGULAR_3PT: &[Subclass<Dimension>] = &[
    DIMENSION_BASE,
    Subclass {
        marker: "AcDb3PointAngularDimension",
        read: read_angular_3pt,
        write: write_angular_3pt,
    },
];

const DIM_ORDINATE: &[Subclass<Dimension>] = &[
    DIMENSION_BASE,
    Subclass {
        marker: "AcDbOrdinateDimension",
        read: read_ordinate,
        write: write_ordinate,
    },
];

fn dimension_template(kind: DimensionType) -> &'static [Subclass<Dimension>] {
    match kind {
        DimensionType::Aligned => DIM_ALIGNED,
        DimensionType::Linear => DIM_LINEAR,
        DimensionType::Radius => DIM_RADIUS,
        DimensionType::Diameter => DIM_DIAMETER,
        DimensionType::Angular => DIM_ANGULAR_2LN,
        DimensionType::Angular3Point => DIM_ANGULAR_3PT,
        DimensionType::Ordinate => DIM_ORDINATE,
    }
}

/// The kind comes from the low bits of 70; the stored block and
/// measurement are taken as current. Without a block (2) the dimension
/// stays stale so the writer generates one.
fn read_dimension(record: &Record) -> Result<Dimension> {
    let flags = record.find_i16(70).unwrap_or(0);
    let kind = DimensionType::from_flags(flags).unwrap_or_else(|| {
        tracing::warn!(flags, position = %record.position, "unknown dimension type, read as linear");
        DimensionType::Linear
    });
    let mut dimension = read_as(Dimension::of_type(kind), record, dimension_template(kind))?;
    let base = dimension.base_mut();
    if base.block_name.is_empty() {
        base.mark_stale();
    } else {
        base.mark_fresh();
    }
    Ok(dimension)
}

// Unknown entities

/// Keep an entity without a typed model: bookkeeping and `AcDbEntity`
/// fields are decoded, everything else is kept as read
fn read_unknown(record: &Record) -> Result<UnknownEntity> {
    let mut entity = UnknownEntity::new(record.name.as_str());
    let (body, xdata) = split_xdata(&record.tags);
    let mut c = FieldCursor::new(&record.name, body.iter().collect());
    let mut owner_seen = false;
    let mut in_common = true;
    while let Some(tag) = c.next() {
        if tag.code == 100 {
            in_common = tag.as_str() == "AcDbEntity";
            if in_common {
                continue;
            }
        } else if in_common
            && (read_bookkeeping(&mut entity, 5, &mut owner_seen, tag, &mut c)?
                || read_common_field(&mut entity.common, tag, &mut c)?)
        {
            continue;
        }
        entity.tags.push((tag.code, tag.value.clone()));
    }
    entity.common.extended_data = read_xdata(&record.name, xdata)?;
    Ok(entity)
}

fn write_unknown(e: &UnknownEntity, w: &mut RecordWriter<'_>) -> Result<()> {
    w.start(&e.dxf_name)?;
    write_bookkeeping(e, 5, w)?;
    w.marker("AcDbEntity")?;
    write_common(&e.common, w)?;
    w.tags(&e.tags)?;
    write_xdata(&e.common.extended_data, w)
}

/// Build an entity from its framed record.
///
/// Records without a typed model are kept as [`UnknownEntity`] in lenient
/// mode and rejected in strict mode.
pub(crate) fn read_entity(record: &Record, mode: ParseMode) -> Result<EntityType> {
    let entity = match record.name.as_str() {
        "POINT" => EntityType::Point(read_as(Point::default(), record, POINT)?),
        "LINE" => EntityType::Line(read_as(Line::default(), record, LINE)?),
        "CIRCLE" => EntityType::Circle(read_as(Circle::default(), record, CIRCLE)?),
        "ARC" => EntityType::Arc(read_as(Arc::default(), record, ARC)?),
        "ELLIPSE" => EntityType::Ellipse(read_as(Ellipse::default(), record, ELLIPSE)?),
        "LWPOLYLINE" => EntityType::LwPolyline(read_as(LwPolyline::default(), record, LWPOLYLINE)?),
        "POLYLINE" => read_polyline(record)?,
        "3DFACE" => EntityType::Face3D(read_as(Face3D::default(), record, FACE3D)?),
        "SOLID" => EntityType::Solid(read_as(Solid::default(), record, SOLID)?),
        "TRACE" => EntityType::Trace(read_as(Trace::default(), record, TRACE)?),
        "MESH" => EntityType::Mesh(read_as(Mesh::default(), record, MESH)?),
        "HATCH" => EntityType::Hatch(read_as(Hatch::default(), record, HATCH)?),
        "DIMENSION" => EntityType::Dimension(read_dimension(record)?),
        "TEXT" => EntityType::Text(read_as(Text::default(), record, TEXT)?),
        "MTEXT" => EntityType::MText(read_as(MText::default(), record, MTEXT)?),
        "INSERT" => EntityType::Insert(read_insert(record)?),
        "ATTDEF" => EntityType::AttributeDefinition(read_as(AttributeDefinition::default(), record, ATTDEF)?),
        "RAY" => EntityType::Ray(read_as(Ray::default(), record, RAY)?),
        "XLINE" => EntityType::XLine(read_as(XLine::default(), record, XLINE)?),
        "SHAPE" => EntityType::Shape(read_as(Shape::default(), record, SHAPE)?),
        "OLE2FRAME" => EntityType::Ole2Frame(read_as(Ole2Frame::default(), record, OLE2FRAME)?),
        "WIPEOUT" => EntityType::Wipeout(read_as(Wipeout::default(), record, WIPEOUT)?),
        "SPLINE" => EntityType::Spline(read_as(Spline::default(), record, SPLINE)?),
        "MLINE" => EntityType::MLine(read_as(MLine::default(), record, MLINE)?),
        name => match UnderlayKind::from_entity_name(name) {
            Some(kind) => EntityType::Underlay(read_as(Underlay::new(kind), record, UNDERLAY)?),
            None if mode == ParseMode::Strict => return Err(unknown_record(record.position)),
            None => {
                tracing::debug!(name, position = %record.position, "entity kept as unknown");
                EntityType::Unknown(read_unknown(record)?)
            }
        },
    };
    Ok(entity)
}

/// Oldest version that can hold the entity
pub(crate) fn min_version(entity: &EntityType) -> DxfVersion {
    match entity {
        EntityType::LwPolyline(_) | EntityType::Hatch(_) => DxfVersion::AC1014,
        EntityType::Wipeout(_) => DxfVersion::AC1015,
        EntityType::Ellipse(_)
        | EntityType::Spline(_)
        | EntityType::Ray(_)
        | EntityType::XLine(_)
        | EntityType::MText(_)
        | EntityType::MLine(_)
        | EntityType::Ole2Frame(_) => DxfVersion::AC1012,
        EntityType::Mesh(_) => DxfVersion::AC1024,
        EntityType::Underlay(u) if u.kind == UnderlayKind::Pdf => DxfVersion::AC1024,
        EntityType::Underlay(_) => DxfVersion::AC1021,
        _ => DxfVersion::AC1009,
    }
}

/// Write an entity with its sub-records
pub(crate) fn write_entity(entity: &EntityType, w: &mut RecordWriter<'_>) -> Result<()> {
    let required = min_version(entity);
    if w.version() < required {
        return Err(DxfError::UnsupportedVersion(format!(
            "{} needs {} or later, writing {}",
            entity.dxf_name(),
            required.as_str(),
            w.version().as_str()
        )));
    }
    match entity {
        EntityType::Point(e) => write_as(e, "POINT", POINT, w),
        EntityType::Line(e) => write_as(e, "LINE", LINE, w),
        EntityType::Circle(e) => write_as(e, "CIRCLE", CIRCLE, w),
        EntityType::Arc(e) => write_as(e, "ARC", ARC, w),
        EntityType::Ellipse(e) => write_as(e, "ELLIPSE", ELLIPSE, w),
        EntityType::LwPolyline(e) => write_as(e, "LWPOLYLINE", LWPOLYLINE, w),
        EntityType::Polyline2D(e) => write_run(e, POLYLINE_2D, &e.vertices, VERTEX_2D, &e.seqend, w),
        EntityType::Polyline3D(e) => write_run(e, POLYLINE_3D, &e.vertices, VERTEX_3D, &e.seqend, w),
        EntityType::PolyfaceMesh(e) => {
            write_as(e, "POLYLINE", POLYFACE, w)?;
            for vertex in &e.vertices {
                write_as(vertex, "VERTEX", POLYFACE_VERTEX, w)?;
            }
            for face in &e.faces {
                write_as(face, "VERTEX", FACE_RECORD, w)?;
            }
            write_as(&e.seqend, "SEQEND", SEQEND, w)
        }
        EntityType::PolygonMesh(e) => write_run(e, POLYGON_MESH, &e.vertices, MESH_VERTEX, &e.seqend, w),
        EntityType::Face3D(e) => write_as(e, "3DFACE", FACE3D, w),
        EntityType::Solid(e) => write_as(e, "SOLID", SOLID, w),
        EntityType::Trace(e) => write_as(e, "TRACE", TRACE, w),
        EntityType::Mesh(e) => write_as(e, "MESH", MESH, w),
        EntityType::Hatch(e) => write_as(e, "HATCH", HATCH, w),
        EntityType::Dimension(e) => write_as(e, "DIMENSION", dimension_template(e.dimension_type()), w),
        EntityType::Text(e) => write_as(e, "TEXT", TEXT, w),
        EntityType::MText(e) => write_as(e, "MTEXT", MTEXT, w),
        EntityType::Insert(e) => write_insert(e, w),
        EntityType::AttributeDefinition(e) => write_as(e, "ATTDEF", ATTDEF, w),
        EntityType::Ray(e) => write_as(e, "RAY", RAY, w),
        EntityType::XLine(e) => write_as(e, "XLINE", XLINE, w),
        EntityType::Shape(e) => write_as(e, "SHAPE", SHAPE, w),
        EntityType::Ole2Frame(e) => write_as(e, "OLE2FRAME", OLE2FRAME, w),
        EntityType::Underlay(e) => write_as(e, e.kind.entity_name(), UNDERLAY, w),
        EntityType::Wipeout(e) => write_as(e, "WIPEOUT", WIPEOUT, w),
        EntityType::Spline(e) => write_as(e, "SPLINE", SPLINE, w),
        EntityType::MLine(e) => write_as(e, "MLINE", MLINE, w),
        EntityType::Unknown(e) => write_unknown(e, w),
    }
}
