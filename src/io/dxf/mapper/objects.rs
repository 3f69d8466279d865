//! OBJECTS section records

use super::{
    read_bookkeeping, read_sections, read_xdata, split_xdata, write_bookkeeping, write_sections, write_xdata,
    FieldCursor, RecordWriter, Subclass,
};
use crate::cad_object::CadObject;
use crate::entities::UnderlayKind;
use crate::error::Result;
use crate::io::dxf::framer::Record;
use crate::objects::*;
use crate::types::Color;

fn read_as<T: CadObject + 'static>(mut target: T, record: &Record, template: &'static [Subclass<T>]) -> Result<T> {
    let (body, xdata) = split_xdata(&record.tags);
    let mut owner_seen = false;
    read_sections(&mut target, &record.name, body, template, &[], |o, tag, c| {
        read_bookkeeping(&mut *o, 5, &mut owner_seen, tag, c)
    })?;
    *target.extended_data_mut() = read_xdata(&record.name, xdata)?;
    Ok(target)
}

fn write_as<T: CadObject + 'static>(
    target: &T,
    name: &str,
    template: &'static [Subclass<T>],
    w: &mut RecordWriter<'_>,
) -> Result<()> {
    w.start(name)?;
    write_bookkeeping(target, 5, w)?;
    write_sections(target, template, w)?;
    write_xdata(target.extended_data(), w)
}

// DICTIONARY

fn read_dictionary_fields(d: &mut Dictionary, c: &mut FieldCursor<'_>) -> Result<()> {
    let mut key: Option<String> = None;
    while let Some(tag) = c.next() {
        match tag.code {
            280 => d.hard_owner = c.i16(tag)? != 0,
            281 => d.cloning = DictionaryCloningFlags::from_value(c.i16(tag)?),
            3 => key = Some(c.string(tag)),
            350 | 360 => match key.take() {
                Some(key) => d.add_entry(key, c.handle(tag)?),
                None => {
                    tracing::warn!(code = tag.code, position = %tag.position, "dictionary entry without a key");
                }
            },
            _ => c.skip(tag),
        }
    }
    Ok(())
}

fn write_dictionary_fields(d: &Dictionary, w: &mut RecordWriter<'_>) -> Result<()> {
    if d.hard_owner {
        w.i16(280, 1)?;
    }
    w.i16(281, d.cloning.value())?;
    let code = if d.hard_owner { 360 } else { 350 };
    for (key, handle) in d.entries() {
        w.string(3, key)?;
        w.handle(code, *handle)?;
    }
    Ok(())
}

pub(crate) const DICTIONARY: &[Subclass<Dictionary>] = &[Subclass {
    marker: "AcDbDictionary",
    read: read_dictionary_fields,
    write: write_dictionary_fields,
}];

// XRECORD

fn read_xrecord_fields(x: &mut XRecord, c: &mut FieldCursor<'_>) -> Result<()> {
    if let Some(tag) = c.next_if(280) {
        x.cloning_flags = DictionaryCloningFlags::from_value(c.i16(tag)?);
    }
    while let Some(tag) = c.next() {
        x.entries.push((tag.code, tag.value.clone()));
    }
    Ok(())
}

fn write_xrecord_fields(x: &XRecord, w: &mut RecordWriter<'_>) -> Result<()> {
    w.i16(280, x.cloning_flags.value())?;
    w.tags(&x.entries)
}

pub(crate) const XRECORD: &[Subclass<XRecord>] = &[Subclass {
    marker: "AcDbXrecord",
    read: read_xrecord_fields,
    write: write_xrecord_fields,
}];

// MLINESTYLE

fn read_mlinestyle_fields(s: &mut MLineStyle, c: &mut FieldCursor<'_>) -> Result<()> {
    let mut in_elements = false;
    while let Some(tag) = c.next() {
        match tag.code {
            2 => s.name = c.string(tag),
            70 => s.flags = MLineStyleFlags::from_bits_truncate(c.i16(tag)?),
            3 => s.description = c.string(tag),
            51 => s.start_angle = c.f64(tag)?,
            52 => s.end_angle = c.f64(tag)?,
            71 => in_elements = true,
            49 => {
                in_elements = true;
                s.elements.push(MLineStyleElement::new(c.f64(tag)?));
            }
            62 => {
                let color = Color::from_index(c.i16(tag)?);
                match s.elements.last_mut() {
                    Some(element) if in_elements => element.color = color,
                    _ => s.fill_color = color,
                }
            }
            6 => {
                if let Some(element) = s.elements.last_mut() {
                    element.linetype = c.string(tag);
                }
            }
            _ => c.skip(tag),
        }
    }
    Ok(())
}

fn write_mlinestyle_fields(s: &MLineStyle, w: &mut RecordWriter<'_>) -> Result<()> {
    w.string(2, &s.name)?;
    w.i16(70, s.flags.bits())?;
    w.string(3, &s.description)?;
    w.i16(62, s.fill_color.aci())?;
    w.double(51, s.start_angle)?;
    w.double(52, s.end_angle)?;
    w.i16(71, s.elements.len() as i16)?;
    for element in &s.elements {
        w.double(49, element.offset)?;
        w.i16(62, element.color.aci())?;
        w.string(6, &element.linetype)?;
    }
    Ok(())
}

pub(crate) const MLINESTYLE: &[Subclass<MLineStyle>] = &[Subclass {
    marker: "AcDbMlineStyle",
    read: read_mlinestyle_fields,
    write: write_mlinestyle_fields,
}];

// PDFDEFINITION, DWFDEFINITION, DGNDEFINITION

fn read_underlay_definition_fields(d: &mut UnderlayDefinition, c: &mut FieldCursor<'_>) -> Result<()> {
    while let Some(tag) = c.next() {
        match tag.code {
            1 => d.file_path = c.string(tag),
            2 => d.page_name = c.string(tag),
            _ => c.skip(tag),
        }
    }
    Ok(())
}

fn write_underlay_definition_fields(d: &UnderlayDefinition, w: &mut RecordWriter<'_>) -> Result<()> {
    w.string(1, &d.file_path)?;
    w.string(2, &d.page_name)
}

pub(crate) const UNDERLAY_DEFINITION: &[Subclass<UnderlayDefinition>] = &[Subclass {
    marker: "AcDbUnderlayDefinition",
    read: read_underlay_definition_fields,
    write: write_underlay_definition_fields,
}];

// everything else

fn read_unknown(record: &Record) -> Result<UnknownObject> {
    let mut object = UnknownObject::new(record.name.as_str());
    let (body, xdata) = split_xdata(&record.tags);
    let mut c = FieldCursor::new(&record.name, body.iter().collect());
    let mut owner_seen = false;
    let mut in_data = false;
    while let Some(tag) = c.next() {
        if !in_data && tag.code != 100 && read_bookkeeping(&mut object, 5, &mut owner_seen, tag, &mut c)? {
            continue;
        }
        in_data = true;
        object.tags.push((tag.code, tag.value.clone()));
    }
    object.extended_data = read_xdata(&record.name, xdata)?;
    Ok(object)
}

fn write_unknown(object: &UnknownObject, w: &mut RecordWriter<'_>) -> Result<()> {
    w.start(&object.dxf_name)?;
    write_bookkeeping(object, 5, w)?;
    w.tags(&object.tags)?;
    write_xdata(&object.extended_data, w)
}

/// Decode one OBJECTS record. Types without a model are kept verbatim.
pub(crate) fn read_object(record: &Record) -> Result<ObjectType> {
    let object = match record.name.as_str() {
        "DICTIONARY" => ObjectType::Dictionary(read_as(Dictionary::new(), record, DICTIONARY)?),
        "XRECORD" => ObjectType::XRecord(read_as(XRecord::new(), record, XRECORD)?),
        "MLINESTYLE" => ObjectType::MLineStyle(read_as(MLineStyle::new(""), record, MLINESTYLE)?),
        name => match UnderlayKind::from_definition_name(name) {
            Some(kind) => ObjectType::UnderlayDefinition(read_as(
                UnderlayDefinition::new(kind, "", ""),
                record,
                UNDERLAY_DEFINITION,
            )?),
            None => {
                tracing::debug!(object = name, position = %record.position, "object kept as raw tags");
                ObjectType::Unknown(read_unknown(record)?)
            }
        },
    };
    Ok(object)
}

pub(crate) fn write_object(object: &ObjectType, w: &mut RecordWriter<'_>) -> Result<()> {
    match object {
        ObjectType::Dictionary(d) => write_as(d, "DICTIONARY", DICTIONARY, w),
        ObjectType::XRecord(x) => write_as(x, "XRECORD", XRECORD, w),
        ObjectType::MLineStyle(s) => write_as(s, "MLINESTYLE", MLINESTYLE, w),
        ObjectType::UnderlayDefinition(d) => write_as(d, d.kind.definition_name(), UNDERLAY_DEFINITION, w),
        ObjectType::Unknown(o) => write_unknown(o, w),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::dxf::framer::Framer;
    use crate::io::dxf::lexer::{LexerOptions, TagStream};
    use crate::io::dxf::writer::DxfTextWriter;
    use crate::io::dxf::{DxfValue, ParseMode};
    use crate::types::{DxfVersion, Handle};
    use std::io::Cursor;

    fn record(body: &str) -> Record {
        let text = format!("  0\nSECTION\n  2\nOBJECTS\n{}  0\nENDSEC\n  0\nEOF\n", body);
        let stream = TagStream::open(Cursor::new(text.into_bytes()), LexerOptions::default()).unwrap();
        let mut framer = Framer::new(stream, ParseMode::Strict);
        framer.next_section().unwrap();
        framer.next_record().unwrap().unwrap()
    }

    fn round_trip(object: &ObjectType) -> ObjectType {
        let mut out = DxfTextWriter::new(Vec::new());
        {
            let mut w = RecordWriter::new(&mut out, DxfVersion::AC1018);
            write_object(object, &mut w).unwrap();
        }
        let text = String::from_utf8(out.into_inner()).unwrap();
        read_object(&record(&text)).unwrap()
    }

    #[test]
    fn test_dictionary_entries_and_reactors() {
        let body = "  0\nDICTIONARY\n  5\nC\n102\n{ACAD_REACTORS\n330\n1\n102\n}\n330\n0\n100\nAcDbDictionary\n281\n1\n  3\nACAD_GROUP\n350\nD\n  3\nACAD_MLINESTYLE\n350\n17\n";
        let object = read_object(&record(body)).unwrap();
        let dict = object.as_dictionary().unwrap();
        assert_eq!(dict.handle, Handle::new(0xC));
        assert_eq!(dict.reactors, vec![Handle::new(1)]);
        assert_eq!(dict.cloning, DictionaryCloningFlags::KeepExisting);
        assert_eq!(dict.get("ACAD_MLINESTYLE"), Some(Handle::new(0x17)));
        assert_eq!(dict.len(), 2);
    }

    #[test]
    fn test_hard_owner_dictionary_writes_360() {
        let mut dict = Dictionary::new();
        dict.handle = Handle::new(0x40);
        dict.hard_owner = true;
        dict.add_entry("Item", Handle::new(0x41));
        let read = round_trip(&ObjectType::Dictionary(dict));
        let read = read.as_dictionary().unwrap();
        assert!(read.hard_owner);
        assert_eq!(read.get("Item"), Some(Handle::new(0x41)));
    }

    #[test]
    fn test_xrecord_keeps_entries_in_order() {
        let mut xrecord = XRecord::new();
        xrecord.handle = Handle::new(0x50);
        xrecord.add_string(1, "first");
        xrecord.add_double(40, 2.5);
        xrecord.add_int16(70, 3);
        match round_trip(&ObjectType::XRecord(xrecord.clone())) {
            ObjectType::XRecord(read) => assert_eq!(read.entries, xrecord.entries),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_mlinestyle_colors() {
        let mut style = MLineStyle::standard();
        style.handle = Handle::new(0x18);
        style.fill_color = Color::from_index(3);
        style.elements[1].color = Color::from_index(1);
        match round_trip(&ObjectType::MLineStyle(style)) {
            ObjectType::MLineStyle(read) => {
                assert_eq!(read.fill_color, Color::from_index(3));
                assert_eq!(read.elements.len(), 2);
                assert_eq!(read.elements[1].color, Color::from_index(1));
                assert_eq!(read.elements[0].offset, 0.5);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_underlay_definition_name() {
        let mut definition = UnderlayDefinition::new(UnderlayKind::Dgn, "site.dgn", "Default");
        definition.handle = Handle::new(0x60);
        let object = ObjectType::UnderlayDefinition(definition);
        assert_eq!(object.dxf_name(), "DGNDEFINITION");
        assert_eq!(round_trip(&object), object);
    }

    #[test]
    fn test_unknown_object_is_kept() {
        let body = "  0\nSCALE\n  5\n2A\n330\n29\n100\nAcDbScale\n 70\n0\n300\n1:1\n";
        let object = read_object(&record(body)).unwrap();
        match &object {
            ObjectType::Unknown(unknown) => {
                assert_eq!(unknown.owner, Handle::new(0x29));
                assert_eq!(unknown.tags[0], (100, DxfValue::Str("AcDbScale".into())));
                assert_eq!(unknown.tags.len(), 3);
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(round_trip(&object), object);
    }
}
