//! Section order and framing of a written file
//!
//! HEADER, CLASSES, TABLES, BLOCKS, ENTITIES, OBJECTS, then the sections
//! kept verbatim from the read file, then EOF. What each record looks like
//! is decided by the mapper; this module only decides what goes where for
//! the target version.

use super::stream_writer::DxfStreamWriter;
use crate::document::CadDocument;
use crate::error::Result;
use crate::io::dxf::mapper::{classes, entities, header, objects, tables, RecordWriter};
use crate::objects::ObjectType;
use crate::tables::RawTable;
use crate::types::DxfVersion;

/// Tables without a typed model that precede the given typed table
const RAW_BEFORE_LTYPE: &[&str] = &["VPORT"];
const RAW_BEFORE_APPID: &[&str] = &["VIEW", "UCS"];

/// Writes the sections of one document
pub(crate) struct SectionWriter<'a> {
    w: RecordWriter<'a>,
}

impl<'a> SectionWriter<'a> {
    pub fn new(out: &'a mut dyn DxfStreamWriter, version: DxfVersion) -> Self {
        SectionWriter {
            w: RecordWriter::new(out, version),
        }
    }

    /// Write every section and the EOF marker
    pub fn write_document(&mut self, document: &CadDocument) -> Result<()> {
        self.write_header(document)?;
        if self.w.at_least(DxfVersion::AC1012) {
            self.write_classes(document)?;
        }
        self.write_tables(document)?;
        self.write_blocks(document)?;
        self.write_entities(document)?;
        if self.w.at_least(DxfVersion::AC1012) {
            self.write_objects(document)?;
            self.write_raw_sections(document)?;
        }
        self.w.start("EOF")
    }

    fn begin(&mut self, name: &str) -> Result<()> {
        tracing::debug!(section = name, "writing section");
        self.w.start("SECTION")?;
        self.w.string(2, name)
    }

    fn end(&mut self) -> Result<()> {
        self.w.start("ENDSEC")
    }

    fn write_header(&mut self, document: &CadDocument) -> Result<()> {
        self.begin("HEADER")?;
        header::write_header(&document.header, &mut self.w)?;
        self.end()
    }

    fn write_classes(&mut self, document: &CadDocument) -> Result<()> {
        self.begin("CLASSES")?;
        classes::write_classes(&document.classes, &mut self.w)?;
        self.end()
    }

    fn write_raw(&mut self, document: &CadDocument, names: &[&str]) -> Result<()> {
        for name in names {
            if let Some(table) = document.raw_tables.iter().find(|t| t.name.eq_ignore_ascii_case(name)) {
                tables::write_raw_table(table, &mut self.w)?;
            }
        }
        Ok(())
    }

    fn write_tables(&mut self, document: &CadDocument) -> Result<()> {
        self.begin("TABLES")?;
        self.write_raw(document, RAW_BEFORE_LTYPE)?;
        tables::write_table(&document.line_types, tables::LTYPE, &mut self.w)?;
        tables::write_table(&document.layers, tables::LAYER, &mut self.w)?;
        tables::write_table(&document.text_styles, tables::STYLE, &mut self.w)?;
        self.write_raw(document, RAW_BEFORE_APPID)?;
        tables::write_table(&document.app_ids, tables::APPID, &mut self.w)?;
        tables::write_table(&document.dim_styles, tables::DIMSTYLE, &mut self.w)?;
        if self.w.at_least(DxfVersion::AC1012) {
            tables::write_table(&document.block_records, tables::BLOCK_RECORD, &mut self.w)?;
        }
        let placed = |t: &&RawTable| {
            RAW_BEFORE_LTYPE
                .iter()
                .chain(RAW_BEFORE_APPID)
                .any(|n| t.name.eq_ignore_ascii_case(n))
        };
        for table in document.raw_tables.iter().filter(|t| !placed(t)) {
            tables::write_raw_table(table, &mut self.w)?;
        }
        self.end()
    }

    fn write_blocks(&mut self, document: &CadDocument) -> Result<()> {
        self.begin("BLOCKS")?;
        for record in document.block_records.iter() {
            // R12 has no layout blocks in the BLOCKS section
            if record.is_layout() && !self.w.at_least(DxfVersion::AC1012) {
                continue;
            }
            tables::write_block_begin(record, &mut self.w)?;
            for entity in &record.entities {
                entities::write_entity(entity, &mut self.w)?;
            }
            tables::write_block_end(&record.end, &mut self.w)?;
        }
        self.end()
    }

    fn write_entities(&mut self, document: &CadDocument) -> Result<()> {
        self.begin("ENTITIES")?;
        for entity in document.entities() {
            entities::write_entity(entity, &mut self.w)?;
        }
        self.end()
    }

    /// The root dictionary goes first, the rest in document order
    fn write_objects(&mut self, document: &CadDocument) -> Result<()> {
        self.begin("OBJECTS")?;
        let root = document.root_dictionary();
        if let Some(object) = document.get_object(root) {
            objects::write_object(object, &mut self.w)?;
        }
        for object in document.objects().filter(|o: &&ObjectType| o.handle() != root || root.is_null()) {
            objects::write_object(object, &mut self.w)?;
        }
        self.end()
    }

    fn write_raw_sections(&mut self, document: &CadDocument) -> Result<()> {
        for section in &document.raw_sections {
            self.begin(&section.name)?;
            self.w.tags(&section.tags)?;
            self.end()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::dxf::writer::DxfTextWriter;

    fn written(document: &CadDocument, version: DxfVersion) -> String {
        let mut out = DxfTextWriter::new(Vec::new());
        SectionWriter::new(&mut out, version).write_document(document).unwrap();
        String::from_utf8(out.into_inner()).unwrap()
    }

    fn section_names(text: &str) -> Vec<String> {
        let lines: Vec<&str> = text.lines().collect();
        lines
            .windows(4)
            .filter(|w| w[0].trim() == "0" && w[1] == "SECTION" && w[2].trim() == "2")
            .map(|w| w[3].to_string())
            .collect()
    }

    #[test]
    fn test_section_order() {
        let doc = CadDocument::new();
        let text = written(&doc, DxfVersion::AC1018);
        assert_eq!(
            section_names(&text),
            vec!["HEADER", "CLASSES", "TABLES", "BLOCKS", "ENTITIES", "OBJECTS"]
        );
        assert!(text.ends_with("  0\nEOF\n"));
    }

    #[test]
    fn test_r12_has_no_objects_or_block_records() {
        let doc = CadDocument::new();
        let text = written(&doc, DxfVersion::AC1009);
        assert_eq!(section_names(&text), vec!["HEADER", "TABLES", "BLOCKS", "ENTITIES"]);
        assert!(!text.contains("BLOCK_RECORD"));
        assert!(!text.contains("*Model_Space"));
    }

    #[test]
    fn test_raw_sections_follow_objects() {
        let mut doc = CadDocument::new();
        doc.raw_sections.push(crate::document::RawSection {
            name: "THUMBNAILIMAGE".into(),
            tags: vec![(90, crate::io::dxf::DxfValue::Int32(0))],
        });
        let text = written(&doc, DxfVersion::AC1018);
        assert_eq!(section_names(&text).last().map(String::as_str), Some("THUMBNAILIMAGE"));
    }
}
