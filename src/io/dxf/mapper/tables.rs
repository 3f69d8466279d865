//! TABLES and BLOCKS records
//!
//! Table entries share the `AcDbSymbolTableRecord` section; DIMSTYLE keeps
//! its handle under 105 instead of 5. Tables without a typed model are
//! carried as raw entries.

use super::entities::{read_common_field, write_common};
use super::{
    read_bookkeeping, read_sections, read_xdata, split_xdata, write_bookkeeping, write_sections, write_xdata,
    FieldCursor, RecordWriter, Subclass,
};
use crate::error::Result;
use crate::io::dxf::framer::Record;
use crate::tables::*;
use crate::types::{Color, DxfVersion, Handle, LineWeight};

const TABLE_MARKERS: &[&str] = &["AcDbSymbolTableRecord"];

/// Handle group code of a table's entries
pub(crate) fn handle_code(table: &str) -> i32 {
    if table.eq_ignore_ascii_case("DIMSTYLE") {
        105
    } else {
        5
    }
}

fn read_entry<T: TableEntry + 'static>(mut entry: T, record: &Record, template: &'static [Subclass<T>]) -> Result<T> {
    let code = handle_code(T::TABLE_NAME);
    let (body, xdata) = split_xdata(&record.tags);
    let mut owner_seen = false;
    read_sections(&mut entry, &record.name, body, template, TABLE_MARKERS, |e, tag, c| {
        read_bookkeeping(&mut *e, code, &mut owner_seen, tag, c)
    })?;
    *entry.extended_data_mut() = read_xdata(&record.name, xdata)?;
    Ok(entry)
}

fn write_entry<T: TableEntry + 'static>(entry: &T, template: &'static [Subclass<T>], w: &mut RecordWriter<'_>) -> Result<()> {
    w.start(T::TABLE_NAME)?;
    write_bookkeeping(entry, handle_code(T::TABLE_NAME), w)?;
    w.marker("AcDbSymbolTableRecord")?;
    write_sections(entry, template, w)?;
    write_xdata(entry.extended_data(), w)
}

/// `0 TABLE` control record: table name and handle
pub(crate) fn read_table_head(record: &Record) -> (String, Handle) {
    let name = record.find_str(2).unwrap_or_default().to_ascii_uppercase();
    let handle = record
        .tags
        .iter()
        .find(|t| t.code == 5 || t.code == 105)
        .and_then(|t| t.as_handle())
        .unwrap_or(Handle::NULL);
    (name, handle)
}

fn write_table_head(name: &str, handle: Handle, count: usize, w: &mut RecordWriter<'_>) -> Result<()> {
    w.start("TABLE")?;
    w.string(2, name)?;
    if w.handles() {
        w.handle(5, handle)?;
        w.handle(330, Handle::NULL)?;
    }
    w.marker("AcDbSymbolTable")?;
    w.i16(70, count as i16)?;
    if name == "DIMSTYLE" && w.markers() {
        w.marker("AcDbDimStyleTable")?;
        w.i16(71, 0)?;
    }
    Ok(())
}

/// Write a typed table with its control record and ENDTAB
pub(crate) fn write_table<T: TableEntry + 'static>(
    table: &Table<T>,
    template: &'static [Subclass<T>],
    w: &mut RecordWriter<'_>,
) -> Result<()> {
    write_table_head(T::TABLE_NAME, table.handle(), table.len(), w)?;
    for entry in table.iter() {
        write_entry(entry, template, w)?;
    }
    w.start("ENDTAB")
}

// LAYER

fn read_layer_fields(e: &mut Layer, c: &mut FieldCursor<'_>) -> Result<()> {
    let mut true_color = None;
    while let Some(tag) = c.next() {
        match tag.code {
            2 => e.name = c.string(tag),
            70 => e.flags = LayerFlags::from_bits_truncate(c.i16(tag)?),
            62 => {
                let index = c.i16(tag)?;
                e.is_off = index < 0;
                e.color = Color::from_index(index.abs());
            }
            420 => true_color = Some(Color::from_true_color(c.i32(tag)?)),
            6 => e.linetype = c.string(tag),
            290 => e.is_plottable = c.bool(tag)?,
            370 => e.line_weight = LineWeight::from_value(c.i16(tag)?),
            390 => e.plot_style = c.handle(tag)?,
            347 => e.material = c.handle(tag)?,
            _ => c.skip(tag),
        }
    }
    if let Some(color) = true_color {
        e.color = color;
    }
    Ok(())
}

fn write_layer_fields(e: &Layer, w: &mut RecordWriter<'_>) -> Result<()> {
    w.string(2, &e.name)?;
    w.i16(70, e.flags.bits())?;
    w.i16(62, e.color_index())?;
    if w.at_least(DxfVersion::AC1018) {
        if let Some(rgb) = e.color.true_color() {
            w.i32(420, rgb)?;
        }
    }
    w.string(6, &e.linetype)?;
    if w.at_least(DxfVersion::AC1015) {
        w.bool(290, e.is_plottable)?;
        w.i16(370, e.line_weight.value())?;
        w.opt_handle(390, e.plot_style)?;
    }
    if w.at_least(DxfVersion::AC1018) {
        w.opt_handle(347, e.material)?;
    }
    Ok(())
}

pub(crate) const LAYER: &[Subclass<Layer>] = &[Subclass {
    marker: "AcDbLayerTableRecord",
    read: read_layer_fields,
    write: write_layer_fields,
}];

// LTYPE

fn read_linetype_fields(e: &mut LineType, c: &mut FieldCursor<'_>) -> Result<()> {
    while let Some(tag) = c.next() {
        match tag.code {
            // alignment, element count and total length follow from the elements
            72 | 73 | 40 => {}
            2 => e.name = c.string(tag),
            70 => e.flags = c.i16(tag)?,
            3 => e.description = c.string(tag),
            49 => e.elements.push(LineTypeElement {
                length: c.f64(tag)?,
                ..Default::default()
            }),
            74 | 75 | 340 | 46 | 50 | 44 | 45 | 9 => {
                let element = match e.elements.last_mut() {
                    Some(element) => element,
                    None => {
                        c.skip(tag);
                        continue;
                    }
                };
                match tag.code {
                    74 => element.complex_type = c.i16(tag)?,
                    75 => element.shape_number = c.i16(tag)?,
                    340 => element.style = c.handle(tag)?,
                    46 => element.scale = c.f64(tag)?,
                    50 => element.rotation = c.f64(tag)?,
                    44 => element.offset.0 = c.f64(tag)?,
                    45 => element.offset.1 = c.f64(tag)?,
                    _ => element.text = c.string(tag),
                }
            }
            _ => c.skip(tag),
        }
    }
    Ok(())
}

fn write_linetype_fields(e: &LineType, w: &mut RecordWriter<'_>) -> Result<()> {
    w.string(2, &e.name)?;
    w.i16(70, e.flags)?;
    w.string(3, &e.description)?;
    w.i16(72, 65)?;
    w.i16(73, e.elements.len() as i16)?;
    w.double(40, e.pattern_length())?;
    for element in &e.elements {
        w.double(49, element.length)?;
        if !w.at_least(DxfVersion::AC1012) {
            continue;
        }
        w.i16(74, element.complex_type)?;
        if element.is_complex() {
            w.i16(75, element.shape_number)?;
            w.opt_handle(340, element.style)?;
            w.double(46, element.scale)?;
            w.double(50, element.rotation)?;
            w.double(44, element.offset.0)?;
            w.double(45, element.offset.1)?;
            if element.complex_type & 2 != 0 {
                w.string(9, &element.text)?;
            }
        }
    }
    Ok(())
}

pub(crate) const LTYPE: &[Subclass<LineType>] = &[Subclass {
    marker: "AcDbLinetypeTableRecord",
    read: read_linetype_fields,
    write: write_linetype_fields,
}];

// STYLE

fn read_style_fields(e: &mut TextStyle, c: &mut FieldCursor<'_>) -> Result<()> {
    while let Some(tag) = c.next() {
        match tag.code {
            2 => e.name = c.string(tag),
            70 => e.flags = TextStyleFlags::from_bits_truncate(c.i16(tag)?),
            40 => e.height = c.f64(tag)?,
            41 => e.width_factor = c.f64(tag)?,
            50 => e.oblique_angle = c.f64(tag)?,
            71 => e.generation_flags = c.i16(tag)?,
            42 => e.last_height = c.f64(tag)?,
            3 => e.font_file = c.string(tag),
            4 => e.big_font_file = c.string(tag),
            _ => c.skip(tag),
        }
    }
    Ok(())
}

fn write_style_fields(e: &TextStyle, w: &mut RecordWriter<'_>) -> Result<()> {
    w.string(2, &e.name)?;
    w.i16(70, e.flags.bits())?;
    w.double(40, e.height)?;
    w.double(41, e.width_factor)?;
    w.double(50, e.oblique_angle)?;
    w.i16(71, e.generation_flags)?;
    w.double(42, e.last_height)?;
    w.string(3, &e.font_file)?;
    w.string(4, &e.big_font_file)
}

pub(crate) const STYLE: &[Subclass<TextStyle>] = &[Subclass {
    marker: "AcDbTextStyleTableRecord",
    read: read_style_fields,
    write: write_style_fields,
}];

// DIMSTYLE

fn read_dimstyle_fields(e: &mut DimStyle, c: &mut FieldCursor<'_>) -> Result<()> {
    while let Some(tag) = c.next() {
        match tag.code {
            2 => e.name = c.string(tag),
            70 => e.flags = c.i16(tag)?,
            3 => e.dimpost = c.string(tag),
            40 => e.dimscale = c.f64(tag)?,
            41 => e.dimasz = c.f64(tag)?,
            42 => e.dimexo = c.f64(tag)?,
            43 => e.dimdli = c.f64(tag)?,
            44 => e.dimexe = c.f64(tag)?,
            73 => e.dimtih = c.i16(tag)? != 0,
            74 => e.dimtoh = c.i16(tag)? != 0,
            77 => e.dimtad = c.i16(tag)?,
            140 => e.dimtxt = c.f64(tag)?,
            141 => e.dimcen = c.f64(tag)?,
            147 => e.dimgap = c.f64(tag)?,
            176 => e.dimclrd = c.i16(tag)?,
            177 => e.dimclre = c.i16(tag)?,
            178 => e.dimclrt = c.i16(tag)?,
            271 => e.dimdec = c.i16(tag)?,
            340 => e.text_style = c.handle(tag)?,
            _ => e.extra.push((tag.code, tag.value.clone())),
        }
    }
    Ok(())
}

fn write_dimstyle_fields(e: &DimStyle, w: &mut RecordWriter<'_>) -> Result<()> {
    w.string(2, &e.name)?;
    w.i16(70, e.flags)?;
    w.opt_string(3, &e.dimpost)?;
    w.double(40, e.dimscale)?;
    w.double(41, e.dimasz)?;
    w.double(42, e.dimexo)?;
    w.double(43, e.dimdli)?;
    w.double(44, e.dimexe)?;
    w.i16(73, e.dimtih as i16)?;
    w.i16(74, e.dimtoh as i16)?;
    w.i16(77, e.dimtad)?;
    w.double(140, e.dimtxt)?;
    w.double(141, e.dimcen)?;
    w.double(147, e.dimgap)?;
    w.i16(176, e.dimclrd)?;
    w.i16(177, e.dimclre)?;
    w.i16(178, e.dimclrt)?;
    if w.at_least(DxfVersion::AC1015) {
        w.i16(271, e.dimdec)?;
        w.opt_handle(340, e.text_style)?;
    }
    w.tags(&e.extra)
}

pub(crate) const DIMSTYLE: &[Subclass<DimStyle>] = &[Subclass {
    marker: "AcDbDimStyleTableRecord",
    read: read_dimstyle_fields,
    write: write_dimstyle_fields,
}];

// APPID

fn read_appid_fields(e: &mut AppId, c: &mut FieldCursor<'_>) -> Result<()> {
    while let Some(tag) = c.next() {
        match tag.code {
            2 => e.name = c.string(tag),
            70 => e.flags = c.i16(tag)?,
            _ => c.skip(tag),
        }
    }
    Ok(())
}

fn write_appid_fields(e: &AppId, w: &mut RecordWriter<'_>) -> Result<()> {
    w.string(2, &e.name)?;
    w.i16(70, e.flags)
}

pub(crate) const APPID: &[Subclass<AppId>] = &[Subclass {
    marker: "AcDbRegAppTableRecord",
    read: read_appid_fields,
    write: write_appid_fields,
}];

// BLOCK_RECORD

fn read_block_record_fields(e: &mut BlockRecord, c: &mut FieldCursor<'_>) -> Result<()> {
    while let Some(tag) = c.next() {
        match tag.code {
            2 => e.name = c.string(tag),
            340 => e.layout = c.handle(tag)?,
            70 => e.units = c.i16(tag)?,
            280 => e.explodable = c.i16(tag)? != 0,
            281 => e.scale_uniformly = c.i16(tag)? != 0,
            _ => c.skip(tag),
        }
    }
    Ok(())
}

fn write_block_record_fields(e: &BlockRecord, w: &mut RecordWriter<'_>) -> Result<()> {
    w.string(2, &e.name)?;
    w.opt_handle(340, e.layout)?;
    if w.at_least(DxfVersion::AC1018) {
        w.i16(70, e.units)?;
        w.i16(280, e.explodable as i16)?;
        w.i16(281, e.scale_uniformly as i16)?;
    }
    Ok(())
}

pub(crate) const BLOCK_RECORD: &[Subclass<BlockRecord>] = &[Subclass {
    marker: "AcDbBlockTableRecord",
    read: read_block_record_fields,
    write: write_block_record_fields,
}];

pub(crate) fn read_layer(record: &Record) -> Result<Layer> {
    read_entry(Layer::new(""), record, LAYER)
}

pub(crate) fn read_linetype(record: &Record) -> Result<LineType> {
    read_entry(LineType::new(""), record, LTYPE)
}

pub(crate) fn read_text_style(record: &Record) -> Result<TextStyle> {
    read_entry(TextStyle::new(""), record, STYLE)
}

pub(crate) fn read_dimstyle(record: &Record) -> Result<DimStyle> {
    read_entry(DimStyle::new(""), record, DIMSTYLE)
}

pub(crate) fn read_appid(record: &Record) -> Result<AppId> {
    read_entry(AppId::new(""), record, APPID)
}

pub(crate) fn read_block_record(record: &Record) -> Result<BlockRecord> {
    read_entry(BlockRecord::new(""), record, BLOCK_RECORD)
}

// VPORT, VIEW, UCS and unknown tables

/// Keep an entry as read, apart from its handle and owner
pub(crate) fn read_raw_entry(record: &Record) -> RawTableEntry {
    let mut entry = RawTableEntry {
        handle: Handle::NULL,
        owner: Handle::NULL,
        tags: Vec::new(),
    };
    let mut handle_seen = false;
    let mut owner_seen = false;
    for tag in &record.tags {
        match tag.code {
            5 | 105 if !handle_seen => {
                handle_seen = true;
                entry.handle = tag.as_handle().unwrap_or(Handle::NULL);
            }
            330 if !owner_seen => {
                owner_seen = true;
                entry.owner = tag.as_handle().unwrap_or(Handle::NULL);
            }
            _ => entry.tags.push((tag.code, tag.value.clone())),
        }
    }
    entry
}

pub(crate) fn write_raw_table(table: &RawTable, w: &mut RecordWriter<'_>) -> Result<()> {
    write_table_head(&table.name, table.handle, table.entries.len(), w)?;
    for entry in &table.entries {
        w.start(&table.name)?;
        if w.handles() {
            w.handle(handle_code(&table.name), entry.handle)?;
            w.handle(330, entry.owner)?;
            w.tags(&entry.tags)?;
        } else {
            // R12 has neither markers nor application groups
            let mut in_group = false;
            for (code, value) in &entry.tags {
                match *code {
                    102 => in_group = !in_group,
                    100 => {}
                    _ if in_group => {}
                    _ => w.value(*code, value)?,
                }
            }
        }
    }
    w.start("ENDTAB")
}

// BLOCKS section

fn read_block_begin_fields(e: &mut BlockBegin, c: &mut FieldCursor<'_>) -> Result<()> {
    while let Some(tag) = c.next() {
        match tag.code {
            // block name, read separately
            2 | 3 => {}
            70 => e.flags = BlockFlags::from_bits_truncate(c.i16(tag)?),
            10 => e.base_point = c.point3(tag)?,
            1 => e.xref_path = c.string(tag),
            4 => e.description = c.string(tag),
            _ => c.skip(tag),
        }
    }
    Ok(())
}

fn write_block_begin_fields(_: &BlockBegin, _: &mut RecordWriter<'_>) -> Result<()> {
    Ok(())
}

const BLOCK_BEGIN: &[Subclass<BlockBegin>] = &[Subclass {
    marker: "AcDbBlockBegin",
    read: read_block_begin_fields,
    write: write_block_begin_fields,
}];

const BLOCK_END: &[Subclass<BlockEnd>] = &[];

/// Read a BLOCK record; returns the block name with the record
pub(crate) fn read_block_begin(record: &Record) -> Result<(String, BlockBegin)> {
    let mut block = BlockBegin::default();
    let (body, xdata) = split_xdata(&record.tags);
    let mut owner_seen = false;
    read_sections(&mut block, &record.name, body, BLOCK_BEGIN, &["AcDbEntity"], |b, tag, c| {
        if read_bookkeeping(&mut *b, 5, &mut owner_seen, tag, c)? {
            return Ok(true);
        }
        read_common_field(&mut b.common, tag, c)
    })?;
    block.common.extended_data = read_xdata(&record.name, xdata)?;
    let name = record
        .find_str(2)
        .or_else(|| record.find_str(3))
        .unwrap_or_default()
        .to_string();
    Ok((name, block))
}

pub(crate) fn read_block_end(record: &Record) -> Result<BlockEnd> {
    let mut end = BlockEnd::default();
    let (body, xdata) = split_xdata(&record.tags);
    let mut owner_seen = false;
    read_sections(&mut end, &record.name, body, BLOCK_END, &["AcDbEntity", "AcDbBlockEnd"], |b, tag, c| {
        if read_bookkeeping(&mut *b, 5, &mut owner_seen, tag, c)? {
            return Ok(true);
        }
        read_common_field(&mut b.common, tag, c)
    })?;
    end.common.extended_data = read_xdata(&record.name, xdata)?;
    Ok(end)
}

/// BLOCK record of `record`, written with the block record's name
pub(crate) fn write_block_begin(record: &BlockRecord, w: &mut RecordWriter<'_>) -> Result<()> {
    let block = &record.block;
    w.start("BLOCK")?;
    write_bookkeeping(block, 5, w)?;
    w.marker("AcDbEntity")?;
    write_common(&block.common, w)?;
    write_sections(block, BLOCK_BEGIN, w)?;
    w.string(2, &record.name)?;
    w.i16(70, block.flags.bits())?;
    w.point3(10, block.base_point)?;
    w.string(3, &record.name)?;
    w.string(1, &block.xref_path)?;
    if w.at_least(DxfVersion::AC1018) {
        w.opt_string(4, &block.description)?;
    }
    write_xdata(&block.common.extended_data, w)
}

pub(crate) fn write_block_end(end: &BlockEnd, w: &mut RecordWriter<'_>) -> Result<()> {
    w.start("ENDBLK")?;
    write_bookkeeping(end, 5, w)?;
    w.marker("AcDbEntity")?;
    write_common(&end.common, w)?;
    w.marker("AcDbBlockEnd")?;
    write_xdata(&end.common.extended_data, w)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::dxf::framer::Framer;
    use crate::io::dxf::lexer::{LexerOptions, TagStream};
    use crate::io::dxf::writer::DxfTextWriter;
    use crate::io::dxf::ParseMode;
    use crate::types::Vector3;
    use std::io::Cursor;

    fn records(body: &str, section: &str) -> Vec<Record> {
        let text = format!("  0\nSECTION\n  2\n{}\n{}  0\nENDSEC\n  0\nEOF\n", section, body);
        let stream = TagStream::open(Cursor::new(text.into_bytes()), LexerOptions::default()).unwrap();
        let mut framer = Framer::new(stream, ParseMode::Strict);
        framer.next_section().unwrap();
        let mut out = Vec::new();
        while let Some(record) = framer.next_record().unwrap() {
            out.push(record);
        }
        out
    }

    fn written(version: DxfVersion, f: impl FnOnce(&mut RecordWriter<'_>) -> Result<()>) -> String {
        let mut out = DxfTextWriter::new(Vec::new());
        {
            let mut w = RecordWriter::new(&mut out, version);
            f(&mut w).unwrap();
        }
        String::from_utf8(out.into_inner()).unwrap()
    }

    #[test]
    fn test_layer_off_and_true_color() {
        let body = "  0\nLAYER\n  5\n10\n330\n2\n100\nAcDbSymbolTableRecord\n100\nAcDbLayerTableRecord\n  2\nWalls\n 70\n0\n 62\n-3\n420\n16711680\n  6\nDashed\n";
        let layer = read_layer(&records(body, "TABLES")[0]).unwrap();
        assert_eq!(layer.name, "Walls");
        assert_eq!(layer.handle, Handle::new(0x10));
        assert_eq!(layer.owner, Handle::new(2));
        assert!(layer.is_off);
        assert_eq!(layer.color, Color::from_rgb(255, 0, 0));
        assert_eq!(layer.linetype, "Dashed");
    }

    #[test]
    fn test_table_round_trip() {
        let mut table = Table::new();
        let mut dashed = LineType::new("Dashed");
        dashed.description = "__ __".into();
        dashed.elements = vec![LineTypeElement::dash(0.5), LineTypeElement::space(0.25)];
        table.add(dashed).unwrap();

        let text = written(DxfVersion::AC1015, |w| write_table(&table, LTYPE, w));
        let recs = records(&text, "TABLES");
        assert_eq!(recs.first().map(|r| r.name.as_str()), Some("TABLE"));
        assert_eq!(read_table_head(&recs[0]).0, "LTYPE");
        let read = read_linetype(&recs[1]).unwrap();
        assert_eq!(read.name, "Dashed");
        assert_eq!(read.elements.len(), 2);
        assert_eq!(read.pattern_length(), 0.75);
        assert_eq!(recs.last().map(|r| r.name.as_str()), Some("ENDTAB"));
    }

    #[test]
    fn test_dimstyle_uses_handle_105() {
        let mut table = Table::new();
        let mut style = DimStyle::standard();
        style.handle = Handle::new(0x27);
        style.extra.push((278, crate::io::dxf::DxfValue::Int16(44)));
        table.add(style).unwrap();

        let text = written(DxfVersion::AC1018, |w| write_table(&table, DIMSTYLE, w));
        assert!(text.contains("105\n27\n"));
        let read = read_dimstyle(&records(&text, "TABLES")[1]).unwrap();
        assert_eq!(read.handle, Handle::new(0x27));
        assert_eq!(read.extra, vec![(278, crate::io::dxf::DxfValue::Int16(44))]);
    }

    #[test]
    fn test_raw_table_drops_groups_for_r12() {
        let body = "  0\nVPORT\n  5\n29\n330\n8\n100\nAcDbSymbolTableRecord\n102\n{ACAD_XDICTIONARY\n360\n2A\n102\n}\n  2\n*Active\n";
        let entry = read_raw_entry(&records(body, "TABLES")[0]);
        assert_eq!(entry.handle, Handle::new(0x29));
        let mut table = RawTable::new("VPORT");
        table.entries.push(entry);

        let text = written(DxfVersion::AC1009, |w| write_raw_table(&table, w));
        assert!(!text.contains("AcDb"));
        assert!(!text.contains("ACAD_XDICTIONARY"));
        assert!(text.contains("*Active"));
    }

    #[test]
    fn test_block_begin_round_trip() {
        let mut record = BlockRecord::new("Door");
        record.block.base_point = Vector3::new(1.0, 2.0, 0.0);
        record.block.description = "a door".into();

        let text = written(DxfVersion::AC1018, |w| {
            write_block_begin(&record, w)?;
            write_block_end(&record.end, w)
        });
        let recs = records(&text, "BLOCKS");
        let (name, block) = read_block_begin(&recs[0]).unwrap();
        assert_eq!(name, "Door");
        assert_eq!(block.base_point, record.block.base_point);
        assert_eq!(block.description, "a door");
        assert!(read_block_end(&recs[1]).is_ok());
    }
}
