//! HEADER section variables

use super::{FieldCursor, RecordWriter};
use crate::error::Result;
use crate::header::HeaderVariables;
use crate::io::dxf::lexer::Tag;
use crate::types::{DxfVersion, Vector3};

/// Decode the tags of a HEADER section, grouped by their `9 $NAME` tag
pub(crate) fn read_header(tags: &[Tag]) -> Result<HeaderVariables> {
    let mut header = HeaderVariables::new();
    let mut groups: Vec<(&str, Vec<&Tag>)> = Vec::new();
    for tag in tags {
        if tag.code == 9 {
            groups.push((tag.as_str(), Vec::new()));
            continue;
        }
        match groups.last_mut() {
            Some((_, values)) => values.push(tag),
            None => tracing::trace!(code = tag.code, position = %tag.position, "header value before any variable"),
        }
    }

    for (name, values) in groups {
        if HeaderVariables::is_typed(name) {
            read_typed(&mut header, name, values)?;
        } else {
            let raw = values.into_iter().map(|t| (t.code, t.value.clone())).collect();
            header.extra.insert(name.to_string(), raw);
        }
    }
    tracing::debug!(
        version = header.version.as_str(),
        extra = header.extra.len(),
        "header variables read"
    );
    Ok(header)
}

fn read_typed(h: &mut HeaderVariables, name: &str, values: Vec<&Tag>) -> Result<()> {
    let mut c = FieldCursor::new("HEADER", values);
    let name = name.to_ascii_uppercase();
    while let Some(tag) = c.next() {
        match (name.as_str(), tag.code) {
            ("$ACADVER", 1) => h.version = DxfVersion::from_version_string(tag.as_str()),
            ("$HANDSEED", 5) => h.handle_seed = c.handle(tag)?,
            ("$DWGCODEPAGE", 3) => h.code_page = c.string(tag),
            ("$INSBASE", 10) => h.insertion_base = c.point3(tag)?,
            ("$EXTMIN", 10) => h.extents_min = c.point3(tag)?,
            ("$EXTMAX", 10) => h.extents_max = c.point3(tag)?,
            ("$LTSCALE", 40) => h.linetype_scale = c.f64(tag)?,
            ("$CLAYER", 8) => h.current_layer = c.string(tag),
            ("$TEXTSTYLE", 7) => h.current_text_style = c.string(tag),
            ("$DIMSTYLE", 2) => h.current_dimstyle = c.string(tag),
            ("$CELTYPE", 6) => h.current_linetype = c.string(tag),
            ("$MEASUREMENT", 70) => h.measurement = c.i16(tag)?,
            ("$INSUNITS", 70) => h.insertion_units = c.i16(tag)?,
            _ => c.skip(tag),
        }
    }
    c.finish();
    Ok(())
}

fn point(w: &mut RecordWriter<'_>, name: &str, value: Vector3) -> Result<()> {
    w.string(9, name)?;
    w.point3(10, value)
}

/// Write the typed variables followed by the untyped ones in read order.
///
/// `$ACADVER` is the writer's target version, not the one read.
pub(crate) fn write_header(h: &HeaderVariables, w: &mut RecordWriter<'_>) -> Result<()> {
    let version = w.version();
    w.string(9, "$ACADVER")?;
    w.string(1, version.as_str())?;
    if w.handles() {
        w.string(9, "$HANDSEED")?;
        w.handle(5, h.handle_seed)?;
    }
    w.string(9, "$DWGCODEPAGE")?;
    w.string(3, &h.code_page)?;
    point(w, "$INSBASE", h.insertion_base)?;
    point(w, "$EXTMIN", h.extents_min)?;
    point(w, "$EXTMAX", h.extents_max)?;
    w.string(9, "$LTSCALE")?;
    w.double(40, h.linetype_scale)?;
    w.string(9, "$CLAYER")?;
    w.string(8, &h.current_layer)?;
    w.string(9, "$TEXTSTYLE")?;
    w.string(7, &h.current_text_style)?;
    w.string(9, "$DIMSTYLE")?;
    w.string(2, &h.current_dimstyle)?;
    w.string(9, "$CELTYPE")?;
    w.string(6, &h.current_linetype)?;
    if w.at_least(DxfVersion::AC1012) {
        w.string(9, "$MEASUREMENT")?;
        w.i16(70, h.measurement)?;
    }
    if w.at_least(DxfVersion::AC1015) {
        w.string(9, "$INSUNITS")?;
        w.i16(70, h.insertion_units)?;
    }
    for (name, tags) in &h.extra {
        w.string(9, name)?;
        w.tags(tags)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::dxf::lexer::{LexerOptions, TagStream};
    use crate::io::dxf::writer::DxfTextWriter;
    use crate::io::dxf::DxfValue;
    use crate::types::Handle;
    use std::io::Cursor;

    fn tags(text: &str) -> Vec<Tag> {
        TagStream::open(Cursor::new(text.as_bytes().to_vec()), LexerOptions::default())
            .unwrap()
            .collect::<Result<_>>()
            .unwrap()
    }

    fn written(h: &HeaderVariables, version: DxfVersion) -> String {
        let mut out = DxfTextWriter::new(Vec::new());
        {
            let mut w = RecordWriter::new(&mut out, version);
            write_header(h, &mut w).unwrap();
        }
        String::from_utf8(out.into_inner()).unwrap()
    }

    #[test]
    fn test_typed_and_extra_variables() {
        let text = "  9\n$ACADVER\n  1\nAC1015\n  9\n$ANGBASE\n 50\n0.0\n  9\n$INSBASE\n 10\n1.0\n 20\n2.0\n 30\n3.0\n  9\n$CLAYER\n  8\nWalls\n  9\n$HANDSEED\n  5\n2F\n";
        let h = read_header(&tags(text)).unwrap();
        assert_eq!(h.version, DxfVersion::AC1015);
        assert_eq!(h.insertion_base, Vector3::new(1.0, 2.0, 3.0));
        assert_eq!(h.current_layer, "Walls");
        assert_eq!(h.handle_seed, Handle::new(0x2F));
        assert_eq!(h.get_extra("$ANGBASE"), Some(&[(50, DxfValue::Double(0.0))][..]));
    }

    #[test]
    fn test_write_gates_by_version() {
        let mut h = HeaderVariables::new();
        h.set_extra("$ANGDIR", vec![(70, DxfValue::Int16(1))]);
        let r12 = written(&h, DxfVersion::AC1009);
        assert!(r12.contains("AC1009"));
        assert!(!r12.contains("$HANDSEED"));
        assert!(!r12.contains("$INSUNITS"));
        assert!(r12.contains("$ANGDIR"));

        let read = read_header(&tags(&written(&h, DxfVersion::AC1018))).unwrap();
        assert_eq!(read.version, DxfVersion::AC1018);
        assert_eq!(read.extents_min, h.extents_min);
        assert_eq!(read.extra, h.extra);
    }
}
