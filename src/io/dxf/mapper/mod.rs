//! Mapping between framed records and the document model
//!
//! Every record type is described by a list of [`Subclass`] sections, one
//! per `100` marker it carries, each pairing a reader and a writer for the
//! group codes of that section. Reading splits a record at its markers and
//! hands each chunk to the matching section; files without markers (R12)
//! feed the whole record through the sections in order, each one keeping
//! the codes it knows. Writing walks the same list, so both directions
//! share one description of the record.

pub(crate) mod classes;
pub(crate) mod entities;
pub(crate) mod header;
pub(crate) mod objects;
pub(crate) mod tables;

use super::lexer::Tag;
use super::value::DxfValue;
use super::writer::{DxfStreamWriter, DxfStreamWriterExt};
use crate::cad_object::CadObject;
use crate::error::{ArgumentError, DxfError, Position, Result};
use crate::types::{DxfVersion, Handle, Vector2, Vector3};
use crate::xdata::{ExtendedData, XDataValue};

/// Reads one subclass section of `T` from a cursor
pub(crate) type ReadFn<T> = fn(&mut T, &mut FieldCursor<'_>) -> Result<()>;
/// Writes one subclass section of `T`
pub(crate) type WriteFn<T> = fn(&T, &mut RecordWriter<'_>) -> Result<()>;

/// One `100` marker section of a record type
pub(crate) struct Subclass<T: 'static> {
    pub marker: &'static str,
    pub read: ReadFn<T>,
    pub write: WriteFn<T>,
}

/// Sequential reader over the tags of one record section.
///
/// Readers take the tags they understand and hand the rest back with
/// [`FieldCursor::skip`]; skipped tags go on to the next section when the
/// record has no markers.
pub(crate) struct FieldCursor<'a> {
    record: &'a str,
    tags: Vec<&'a Tag>,
    index: usize,
    leftover: Vec<&'a Tag>,
}

impl<'a> FieldCursor<'a> {
    pub fn new(record: &'a str, tags: Vec<&'a Tag>) -> Self {
        FieldCursor {
            record,
            tags,
            index: 0,
            leftover: Vec::new(),
        }
    }

    /// Name of the record being read, for error messages
    pub fn record(&self) -> &'a str {
        self.record
    }

    pub fn next(&mut self) -> Option<&'a Tag> {
        let tag = self.tags.get(self.index).copied();
        if tag.is_some() {
            self.index += 1;
        }
        tag
    }

    /// Tags left to read
    pub fn remaining(&self) -> usize {
        self.tags.len().saturating_sub(self.index)
    }

    pub fn peek_code(&self) -> Option<i32> {
        self.tags.get(self.index).map(|t| t.code)
    }

    /// Take the next tag only if it has `code`
    pub fn next_if(&mut self, code: i32) -> Option<&'a Tag> {
        if self.peek_code() == Some(code) {
            self.next()
        } else {
            None
        }
    }

    /// Hand a tag back as not understood by this section
    pub fn skip(&mut self, tag: &'a Tag) {
        self.leftover.push(tag);
    }

    /// Tags no reader took, including the unread rest
    pub fn into_leftover(mut self) -> Vec<&'a Tag> {
        let rest = self.tags.split_off(self.index.min(self.tags.len()));
        self.leftover.extend(rest);
        self.leftover
    }

    fn invalid(&self, tag: &Tag) -> DxfError {
        DxfError::InvalidValue {
            code: tag.code,
            value: tag.value.to_text(),
            position: tag.position,
        }
    }

    pub fn f64(&self, tag: &Tag) -> Result<f64> {
        tag.value.as_f64().ok_or_else(|| self.invalid(tag))
    }

    pub fn i16(&self, tag: &Tag) -> Result<i16> {
        tag.value.as_i16().ok_or_else(|| self.invalid(tag))
    }

    pub fn i32(&self, tag: &Tag) -> Result<i32> {
        tag.value.as_i32().ok_or_else(|| self.invalid(tag))
    }

    pub fn i64(&self, tag: &Tag) -> Result<i64> {
        tag.value.as_i64().ok_or_else(|| self.invalid(tag))
    }

    pub fn bool(&self, tag: &Tag) -> Result<bool> {
        tag.value.as_bool().ok_or_else(|| self.invalid(tag))
    }

    pub fn handle(&self, tag: &Tag) -> Result<Handle> {
        tag.value.as_handle().ok_or_else(|| self.invalid(tag))
    }

    pub fn string(&self, tag: &Tag) -> String {
        match tag.value.as_str() {
            Some(s) => s.to_string(),
            None => tag.value.to_text(),
        }
    }

    pub fn binary(&self, tag: &Tag) -> Result<Vec<u8>> {
        tag.value
            .as_binary()
            .map(<[u8]>::to_vec)
            .ok_or_else(|| self.invalid(tag))
    }

    /// Point whose X is `tag`; Y (+10) and Z (+20) are taken when they follow
    pub fn point3(&mut self, tag: &Tag) -> Result<Vector3> {
        let x = self.f64(tag)?;
        let y = match self.next_if(tag.code + 10) {
            Some(t) => self.f64(t)?,
            None => 0.0,
        };
        let z = match self.next_if(tag.code + 20) {
            Some(t) => self.f64(t)?,
            None => 0.0,
        };
        Ok(Vector3::new(x, y, z))
    }

    /// 2D point whose X is `tag`; a trailing Z is read and dropped
    pub fn point2(&mut self, tag: &Tag) -> Result<Vector2> {
        let p = self.point3(tag)?;
        Ok(p.xy())
    }

    /// Lift a field validation failure into a record error for `code`
    pub fn check<T>(&self, code: i32, result: std::result::Result<T, ArgumentError>) -> Result<T> {
        result.map_err(|source| DxfError::EntityValidation {
            entity: self.record.to_string(),
            code,
            source,
        })
    }

    /// Error for a count (`code`) that promises more entries than follow
    pub fn short_count(&self, code: i32, declared: usize, found: usize) -> DxfError {
        DxfError::EntityValidation {
            entity: self.record.to_string(),
            code,
            source: ArgumentError::new(
                "count",
                format!("declares {} entries but {} follow", declared, found),
            ),
        }
    }

    /// Trace the tags nobody took
    pub fn finish(self) {
        let record = self.record;
        for tag in self.into_leftover() {
            tracing::trace!(record, code = tag.code, position = %tag.position, "group code ignored");
        }
    }
}

/// Version-aware writer for the tags of one record
pub(crate) struct RecordWriter<'w> {
    out: &'w mut dyn DxfStreamWriter,
    version: DxfVersion,
}

impl<'w> RecordWriter<'w> {
    pub fn new(out: &'w mut dyn DxfStreamWriter, version: DxfVersion) -> Self {
        RecordWriter { out, version }
    }

    pub fn version(&self) -> DxfVersion {
        self.version
    }

    /// Whether `100` markers are written
    pub fn markers(&self) -> bool {
        self.version.has_subclass_markers()
    }

    /// Whether handles and owner pointers are written
    pub fn handles(&self) -> bool {
        self.version.has_subclass_markers()
    }

    pub fn at_least(&self, version: DxfVersion) -> bool {
        self.version >= version
    }

    pub fn start(&mut self, name: &str) -> Result<()> {
        self.out.write_entity_type(name)
    }

    pub fn marker(&mut self, name: &str) -> Result<()> {
        if self.markers() {
            self.out.write_subclass(name)?;
        }
        Ok(())
    }

    pub fn string(&mut self, code: i32, value: &str) -> Result<()> {
        self.out.write_string(code, value)
    }

    /// String written only when not empty
    pub fn opt_string(&mut self, code: i32, value: &str) -> Result<()> {
        if value.is_empty() {
            return Ok(());
        }
        self.out.write_string(code, value)
    }

    pub fn double(&mut self, code: i32, value: f64) -> Result<()> {
        self.out.write_double(code, value)
    }

    /// Real written only when it differs from its default
    pub fn double_or(&mut self, code: i32, value: f64, default: f64) -> Result<()> {
        if value == default {
            return Ok(());
        }
        self.out.write_double(code, value)
    }

    pub fn i16(&mut self, code: i32, value: i16) -> Result<()> {
        self.out.write_i16(code, value)
    }

    /// Integer written only when it differs from its default
    pub fn i16_or(&mut self, code: i32, value: i16, default: i16) -> Result<()> {
        if value == default {
            return Ok(());
        }
        self.out.write_i16(code, value)
    }

    pub fn i32(&mut self, code: i32, value: i32) -> Result<()> {
        self.out.write_i32(code, value)
    }

    pub fn i64(&mut self, code: i32, value: i64) -> Result<()> {
        self.out.write_i64(code, value)
    }

    pub fn bool(&mut self, code: i32, value: bool) -> Result<()> {
        self.out.write_bool(code, value)
    }

    pub fn handle(&mut self, code: i32, handle: Handle) -> Result<()> {
        self.out.write_handle(code, handle)
    }

    /// Handle reference written only when set
    pub fn opt_handle(&mut self, code: i32, handle: Handle) -> Result<()> {
        if handle.is_null() || !self.handles() {
            return Ok(());
        }
        self.out.write_handle(code, handle)
    }

    /// Binary data, split into chunks of 127 bytes
    pub fn binary(&mut self, code: i32, data: &[u8]) -> Result<()> {
        for chunk in data.chunks(127) {
            self.out.write_binary(code, chunk)?;
        }
        Ok(())
    }

    pub fn value(&mut self, code: i32, value: &DxfValue) -> Result<()> {
        self.out.write_value(code, value)
    }

    /// Raw `(code, value)` pairs as read
    pub fn tags(&mut self, tags: &[(i32, DxfValue)]) -> Result<()> {
        for (code, value) in tags {
            self.out.write_value(*code, value)?;
        }
        Ok(())
    }

    pub fn point3(&mut self, code: i32, point: Vector3) -> Result<()> {
        self.out.write_point3d(code, point)
    }

    pub fn point2(&mut self, code: i32, point: Vector2) -> Result<()> {
        self.out.write_point2d(code, point)
    }

    /// Extrusion direction (210), omitted when it is the Z axis
    pub fn normal(&mut self, normal: Vector3) -> Result<()> {
        if normal == Vector3::UNIT_Z {
            return Ok(());
        }
        self.out.write_point3d(210, normal)
    }
}

/// Split a record's tags at the first XData application name (1001)
pub(crate) fn split_xdata(tags: &[Tag]) -> (&[Tag], &[Tag]) {
    let at = tags.iter().position(|t| t.code == 1001).unwrap_or(tags.len());
    tags.split_at(at)
}

/// Split record tags into the part before the first marker and one chunk
/// per `100` marker
pub(crate) fn split_markers(tags: &[Tag]) -> (Vec<&Tag>, Vec<(&str, Vec<&Tag>)>) {
    let mut head = Vec::new();
    let mut chunks: Vec<(&str, Vec<&Tag>)> = Vec::new();
    for tag in tags {
        if tag.code == 100 {
            chunks.push((tag.as_str(), Vec::new()));
        } else if let Some((_, chunk)) = chunks.last_mut() {
            chunk.push(tag);
        } else {
            head.push(tag);
        }
    }
    (head, chunks)
}

/// Read the handle, owner and `102` groups shared by every record.
///
/// Returns whether `tag` was consumed. Only the first `330` is taken as the
/// owner; later ones belong to the record's own data.
pub(crate) fn read_bookkeeping(
    object: &mut dyn CadObject,
    handle_code: i32,
    owner_seen: &mut bool,
    tag: &Tag,
    c: &mut FieldCursor<'_>,
) -> Result<bool> {
    match tag.code {
        code if code == handle_code => {
            object.set_handle(c.handle(tag)?);
        }
        330 if !*owner_seen => {
            *owner_seen = true;
            object.set_owner(c.handle(tag)?);
        }
        102 => read_group(object, tag, c)?,
        _ => return Ok(false),
    }
    Ok(true)
}

fn read_group(object: &mut dyn CadObject, open: &Tag, c: &mut FieldCursor<'_>) -> Result<()> {
    let name = open.as_str();
    if !name.starts_with('{') {
        // a stray closing brace
        return Ok(());
    }
    while let Some(tag) = c.next() {
        if tag.code == 102 {
            break;
        }
        match (name, tag.code) {
            ("{ACAD_REACTORS", 330) => {
                let handle = c.handle(tag)?;
                object.reactors_mut().push(handle);
            }
            ("{ACAD_XDICTIONARY", 360) => object.set_xdictionary(c.handle(tag)?),
            _ => {
                tracing::trace!(group = name, code = tag.code, "application group entry ignored");
            }
        }
    }
    Ok(())
}

/// Write the handle, the `102` groups and the owner
pub(crate) fn write_bookkeeping(object: &dyn CadObject, handle_code: i32, w: &mut RecordWriter<'_>) -> Result<()> {
    if !w.handles() {
        return Ok(());
    }
    w.handle(handle_code, object.handle())?;
    if !object.reactors().is_empty() {
        w.string(102, "{ACAD_REACTORS")?;
        for reactor in object.reactors() {
            w.handle(330, *reactor)?;
        }
        w.string(102, "}")?;
    }
    if !object.xdictionary().is_null() {
        w.string(102, "{ACAD_XDICTIONARY")?;
        w.handle(360, object.xdictionary())?;
        w.string(102, "}")?;
    }
    w.handle(330, object.owner())
}

/// Decode the XData tail of a record
pub(crate) fn read_xdata(record: &str, tags: &[Tag]) -> Result<ExtendedData> {
    let mut data = ExtendedData::new();
    let refs: Vec<&Tag> = tags.iter().collect();
    let mut c = FieldCursor::new(record, refs);
    let mut application: Option<String> = None;
    let mut values = Vec::new();
    while let Some(tag) = c.next() {
        let value = match tag.code {
            1001 => {
                if let Some(app) = application.take() {
                    data.extend(&app, std::mem::take(&mut values));
                }
                application = Some(c.string(tag));
                continue;
            }
            1000 => XDataValue::String(c.string(tag)),
            1002 => XDataValue::ControlString(c.string(tag)),
            1003 => XDataValue::LayerName(c.string(tag)),
            1004 => XDataValue::BinaryData(c.binary(tag)?),
            1005 => XDataValue::Handle(c.handle(tag)?),
            1010 => XDataValue::Point3D(c.point3(tag)?),
            1011 => XDataValue::Position3D(c.point3(tag)?),
            1012 => XDataValue::Displacement3D(c.point3(tag)?),
            1013 => XDataValue::Direction3D(c.point3(tag)?),
            1040 => XDataValue::Real(c.f64(tag)?),
            1041 => XDataValue::Distance(c.f64(tag)?),
            1042 => XDataValue::ScaleFactor(c.f64(tag)?),
            1070 => XDataValue::Integer16(c.i16(tag)?),
            1071 => XDataValue::Integer32(c.i32(tag)?),
            code => {
                tracing::trace!(record, code, "unexpected XData group code ignored");
                continue;
            }
        };
        values.push(value);
    }
    if let Some(app) = application {
        data.extend(&app, values);
    }
    Ok(data)
}

/// Write every XData record of an object
pub(crate) fn write_xdata(data: &ExtendedData, w: &mut RecordWriter<'_>) -> Result<()> {
    for record in data.records() {
        w.string(1001, &record.application_name)?;
        for value in &record.values {
            match value {
                XDataValue::String(s) | XDataValue::ControlString(s) | XDataValue::LayerName(s) => {
                    w.string(value.code(), s)?
                }
                XDataValue::BinaryData(data) => w.binary(1004, data)?,
                XDataValue::Handle(h) => w.handle(1005, *h)?,
                XDataValue::Point3D(p)
                | XDataValue::Position3D(p)
                | XDataValue::Displacement3D(p)
                | XDataValue::Direction3D(p) => w.point3(value.code(), *p)?,
                XDataValue::Real(v) | XDataValue::Distance(v) | XDataValue::ScaleFactor(v) => {
                    w.double(value.code(), *v)?
                }
                XDataValue::Integer16(v) => w.i16(1070, *v)?,
                XDataValue::Integer32(v) => w.i32(1071, *v)?,
            }
        }
    }
    Ok(())
}

/// Collect raw `(code, value)` pairs
pub(crate) fn raw_tags(tags: &[Tag]) -> Vec<(i32, DxfValue)> {
    tags.iter().map(|t| (t.code, t.value.clone())).collect()
}

/// Read a record through its subclass sections.
///
/// `head` is called for every tag of the unmarked head and the sections the
/// caller claims in `common_markers`; it returns whether it took the tag.
pub(crate) fn read_sections<'a, T>(
    target: &mut T,
    record: &'a str,
    body: &'a [Tag],
    template: &'static [Subclass<T>],
    common_markers: &[&str],
    mut head: impl FnMut(&mut T, &'a Tag, &mut FieldCursor<'a>) -> Result<bool>,
) -> Result<()> {
    let (head_tags, chunks) = split_markers(body);

    let mut common_tags = head_tags;
    let mut sections = Vec::new();
    for (marker, tags) in chunks {
        if common_markers.iter().any(|m| m.eq_ignore_ascii_case(marker)) {
            common_tags.extend(tags);
        } else {
            sections.push((marker, tags));
        }
    }

    let mut c = FieldCursor::new(record, common_tags);
    while let Some(tag) = c.next() {
        if !head(target, tag, &mut c)? {
            c.skip(tag);
        }
    }
    let mut leftover = c.into_leftover();

    if sections.is_empty() {
        // no markers: every section sees what the previous ones left
        for section in template {
            let mut c = FieldCursor::new(record, leftover);
            (section.read)(target, &mut c)?;
            leftover = c.into_leftover();
        }
        FieldCursor::new(record, leftover).finish();
        return Ok(());
    }
    FieldCursor::new(record, leftover).finish();

    let mut next = 0;
    for (marker, tags) in sections {
        let found = template[next..]
            .iter()
            .position(|s| marker_matches(s.marker, marker))
            .map(|i| i + next)
            .or_else(|| template.iter().position(|s| marker_matches(s.marker, marker)));
        match found {
            Some(index) => {
                let mut c = FieldCursor::new(record, tags);
                (template[index].read)(target, &mut c)?;
                c.finish();
                next = index + 1;
            }
            None => {
                tracing::trace!(record, marker, "subclass section ignored");
            }
        }
    }
    Ok(())
}

/// Whether a file marker matches a section; sections may list
/// alternatives as `A|B`, the first one is written
fn marker_matches(section: &str, marker: &str) -> bool {
    section.split('|').any(|m| m.eq_ignore_ascii_case(marker))
}

/// Write the subclass sections of a record
pub(crate) fn write_sections<T>(target: &T, template: &'static [Subclass<T>], w: &mut RecordWriter<'_>) -> Result<()> {
    for section in template {
        let marker = section.marker.split('|').next().unwrap_or(section.marker);
        w.marker(marker)?;
        (section.write)(target, w)?;
    }
    Ok(())
}

/// Error for a record name the mapper has no type for
pub(crate) fn unknown_record(position: Position) -> DxfError {
    DxfError::UnknownCode { code: 0, position }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tag(code: i32, value: DxfValue) -> Tag {
        Tag::new(code, value, Position::text(0, 1))
    }

    #[test]
    fn test_point_recombination() {
        let tags = vec![
            tag(10, DxfValue::Double(1.0)),
            tag(20, DxfValue::Double(2.0)),
            tag(11, DxfValue::Double(5.0)),
            tag(21, DxfValue::Double(6.0)),
            tag(31, DxfValue::Double(7.0)),
        ];
        let mut c = FieldCursor::new("LINE", tags.iter().collect());
        let first = c.next().unwrap();
        assert_eq!(c.point3(first).unwrap(), Vector3::new(1.0, 2.0, 0.0));
        let second = c.next().unwrap();
        assert_eq!(c.point3(second).unwrap(), Vector3::new(5.0, 6.0, 7.0));
        assert!(c.next().is_none());
    }

    #[test]
    fn test_typed_getter_reports_code() {
        let t = tag(40, DxfValue::Str("abc".into()));
        let c = FieldCursor::new("CIRCLE", vec![&t]);
        assert!(matches!(c.f64(&t), Err(DxfError::InvalidValue { code: 40, .. })));
    }

    #[test]
    fn test_split_markers() {
        let tags = vec![
            tag(5, DxfValue::Handle(Handle::new(1))),
            tag(100, DxfValue::Str("AcDbEntity".into())),
            tag(8, DxfValue::Str("0".into())),
            tag(100, DxfValue::Str("AcDbLine".into())),
            tag(10, DxfValue::Double(0.0)),
        ];
        let (head, chunks) = split_markers(&tags);
        assert_eq!(head.len(), 1);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[1].0, "AcDbLine");
        assert_eq!(chunks[1].1.len(), 1);
    }

    #[test]
    fn test_xdata_groups_by_application() {
        let tags = vec![
            tag(1001, DxfValue::Str("APP".into())),
            tag(1000, DxfValue::Str("a".into())),
            tag(1010, DxfValue::Double(1.0)),
            tag(1020, DxfValue::Double(2.0)),
            tag(1030, DxfValue::Double(3.0)),
            tag(1001, DxfValue::Str("OTHER".into())),
            tag(1071, DxfValue::Int32(9)),
        ];
        let data = read_xdata("LINE", &tags).unwrap();
        assert_eq!(data.len(), 2);
        let app = data.get("APP").unwrap();
        assert_eq!(app.values[1], XDataValue::Point3D(Vector3::new(1.0, 2.0, 3.0)));
        assert_eq!(data.get("OTHER").unwrap().values, vec![XDataValue::Integer32(9)]);
    }
}
