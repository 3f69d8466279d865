//! CLASSES section records

use super::{FieldCursor, RecordWriter};
use crate::classes::{DxfClass, DxfClassCollection, ProxyFlags};
use crate::error::Result;
use crate::io::dxf::framer::Record;
use crate::types::DxfVersion;

pub(crate) fn read_class(record: &Record) -> Result<DxfClass> {
    let mut class = DxfClass::new("", "", false);
    let mut c = FieldCursor::new(&record.name, record.tags.iter().collect());
    while let Some(tag) = c.next() {
        match tag.code {
            1 => class.dxf_name = c.string(tag),
            2 => class.cpp_class_name = c.string(tag),
            3 => class.application_name = c.string(tag),
            90 => class.proxy_flags = ProxyFlags::from_bits_retain(c.i32(tag)?),
            91 => class.instance_count = c.i32(tag)?,
            280 => class.was_zombie = c.i16(tag)? != 0,
            281 => class.is_an_entity = c.i16(tag)? != 0,
            _ => c.skip(tag),
        }
    }
    c.finish();
    Ok(class)
}

/// Write every class. Files before R13 have no CLASSES section.
pub(crate) fn write_classes(classes: &DxfClassCollection, w: &mut RecordWriter<'_>) -> Result<()> {
    for class in classes.iter() {
        w.start("CLASS")?;
        w.string(1, &class.dxf_name)?;
        w.string(2, &class.cpp_class_name)?;
        w.string(3, &class.application_name)?;
        w.i32(90, class.proxy_flags.bits())?;
        if w.at_least(DxfVersion::AC1018) {
            w.i32(91, class.instance_count)?;
        }
        w.i16(280, class.was_zombie as i16)?;
        w.i16(281, class.is_an_entity as i16)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::dxf::framer::Framer;
    use crate::io::dxf::lexer::{LexerOptions, TagStream};
    use crate::io::dxf::writer::DxfTextWriter;
    use crate::io::dxf::ParseMode;
    use std::io::Cursor;

    #[test]
    fn test_classes_round_trip() {
        let mut classes = DxfClassCollection::new();
        let mut class = DxfClass::new("PDFDEFINITION", "AcDbPdfDefinition", false);
        class.proxy_flags = ProxyFlags::ERASE_ALLOWED | ProxyFlags::R13_FORMAT_PROXY;
        class.instance_count = 2;
        classes.add_or_update(class.clone());

        let mut out = DxfTextWriter::new(Vec::new());
        {
            let mut w = RecordWriter::new(&mut out, DxfVersion::AC1018);
            write_classes(&classes, &mut w).unwrap();
        }
        let body = String::from_utf8(out.into_inner()).unwrap();
        let text = format!("  0\nSECTION\n  2\nCLASSES\n{}  0\nENDSEC\n  0\nEOF\n", body);
        let stream = TagStream::open(Cursor::new(text.into_bytes()), LexerOptions::default()).unwrap();
        let mut framer = Framer::new(stream, ParseMode::Strict);
        framer.next_section().unwrap();
        let record = framer.next_record().unwrap().unwrap();
        assert_eq!(read_class(&record).unwrap(), class);
    }
}
