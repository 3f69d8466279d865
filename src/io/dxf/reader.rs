//! DXF file reader
//!
//! Drives the pipeline: the lexer turns the source into tags, the framer
//! groups them into sections and records, the mapper turns records into
//! document entries, and the resolver checks every reference once the whole
//! file is in memory.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use encoding_rs::Encoding;

use super::code_page::encoding_from_code_page;
use super::framer::{Framer, Record};
use super::lexer::{LexerOptions, TagStream};
use super::mapper::{classes, entities, header, objects, tables};
use super::{resolver, ParseMode};
use crate::document::{CadDocument, RawSection};
use crate::entities::EntityType;
use crate::error::{DxfError, Result};
use crate::notification::{Notification, NotificationCollection, NotificationType};
use crate::objects::ObjectType;
use crate::tables::{BlockRecord, RawTable};
use crate::types::DxfVersion;

/// Configuration for the DXF reader
#[derive(Debug, Clone)]
pub struct DxfReaderConfiguration {
    /// Lenient mode recovers from bad records, dangling references and
    /// unknown group codes; strict mode fails on the first one
    pub mode: ParseMode,
    /// Keep values of group codes missing from the type table as text
    pub keep_unknown_codes: bool,
    /// Decoding of non UTF-8 strings until `$DWGCODEPAGE` says otherwise
    pub default_encoding: Option<&'static Encoding>,
}

impl Default for DxfReaderConfiguration {
    fn default() -> Self {
        Self {
            mode: ParseMode::Lenient,
            keep_unknown_codes: true,
            default_encoding: None,
        }
    }
}

impl DxfReaderConfiguration {
    pub fn strict() -> Self {
        Self {
            mode: ParseMode::Strict,
            ..Self::default()
        }
    }
}

/// DXF file reader
pub struct DxfReader {
    source: Box<dyn Read>,
    config: DxfReaderConfiguration,
}

impl DxfReader {
    /// Reader over any byte source, text or binary
    pub fn from_reader<R: Read + 'static>(reader: R) -> Self {
        Self {
            source: Box::new(reader),
            config: DxfReaderConfiguration::default(),
        }
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self::from_reader(File::open(path)?))
    }

    /// Set the reader configuration
    pub fn with_configuration(mut self, config: DxfReaderConfiguration) -> Self {
        self.config = config;
        self
    }

    /// Read the whole file into a document
    pub fn read(self) -> Result<CadDocument> {
        let config = self.config;
        let options = LexerOptions {
            mode: config.mode,
            keep_unknown_codes: config.keep_unknown_codes,
            encoding: config.default_encoding,
        };
        let stream = TagStream::open(self.source, options)?;
        let mut state = ReadState {
            framer: Framer::new(stream, config.mode),
            mode: config.mode,
            document: CadDocument::empty(),
            notifications: NotificationCollection::new(),
        };
        state.read_sections()?;

        let ReadState {
            mut framer,
            mut document,
            mut notifications,
            ..
        } = state;
        if document.header.version == DxfVersion::Unknown {
            notifications.notify(NotificationType::Warning, "no recognized $ACADVER in the HEADER section");
        }
        document.notifications.append(&mut framer.notifications);
        document.notifications.append(&mut notifications);
        resolver::resolve(&mut document, config.mode)?;
        tracing::debug!(
            version = document.header.version.as_str(),
            entities = document.entity_count(),
            objects = document.object_count(),
            notifications = document.notifications.len(),
            "document read"
        );
        Ok(document)
    }
}

struct ReadState {
    framer: Framer,
    mode: ParseMode,
    document: CadDocument,
    notifications: NotificationCollection,
}

impl ReadState {
    fn read_sections(&mut self) -> Result<()> {
        while let Some(name) = self.framer.next_section()? {
            match name.to_ascii_uppercase().as_str() {
                "HEADER" => self.read_header()?,
                "CLASSES" => self.read_classes()?,
                "TABLES" => self.read_tables()?,
                "BLOCKS" => self.read_blocks()?,
                "ENTITIES" => self.read_entities()?,
                "OBJECTS" => self.read_objects()?,
                _ => {
                    let tags = self.framer.section_tags()?;
                    self.notifications.notify(
                        NotificationType::NotImplemented,
                        format!("{} section kept verbatim", name),
                    );
                    self.document.raw_sections.push(RawSection {
                        name,
                        tags: tags.into_iter().map(|tag| tag.into_pair()).collect(),
                    });
                }
            }
            if self.framer.is_eof() {
                break;
            }
        }
        Ok(())
    }

    /// Lenient mode turns a recoverable error into a diagnostic and `None`
    fn recover<T>(&mut self, result: Result<T>, record: &Record) -> Result<Option<T>> {
        match result {
            Ok(value) => Ok(Some(value)),
            Err(error) if self.mode == ParseMode::Lenient && error.is_recoverable() => {
                self.notifications.push(
                    Notification::new(
                        NotificationType::Error,
                        format!("{} skipped: {}", record.name, error),
                    )
                    .at(record.position),
                );
                Ok(None)
            }
            Err(error) => Err(error),
        }
    }

    fn add_entry(&mut self, added: Result<()>) -> Result<()> {
        match added {
            Err(error @ DxfError::DuplicateEntry { .. }) if self.mode == ParseMode::Lenient => {
                self.notifications.notify(NotificationType::Warning, format!("{}; later entry dropped", error));
                Ok(())
            }
            other => other,
        }
    }

    /// The HEADER section. `$DWGCODEPAGE` switches the lexer's decoding
    /// right away for files older than AC1021, so later strings decode
    /// with it.
    fn read_header(&mut self) -> Result<()> {
        let mut tags = Vec::new();
        let mut variable = String::new();
        let mut version = DxfVersion::Unknown;
        let mut code_page: Option<String> = None;
        let mut switched = false;

        while let Some(tag) = self.framer.next_tag()? {
            if tag.code == 9 {
                variable = tag.as_str().to_ascii_uppercase();
            } else {
                match (variable.as_str(), tag.code) {
                    ("$ACADVER", 1) => version = DxfVersion::from_version_string(tag.as_str()),
                    ("$DWGCODEPAGE", 3) => code_page = Some(tag.as_str().to_string()),
                    _ => {}
                }
            }
            tags.push(tag);

            if switched || version == DxfVersion::Unknown {
                continue;
            }
            if version >= DxfVersion::AC1021 {
                switched = true;
                continue;
            }
            if let Some(name) = &code_page {
                switched = true;
                match encoding_from_code_page(name) {
                    Some(encoding) => {
                        tracing::debug!(code_page = %name, encoding = encoding.name(), "switching text decoding");
                        self.framer.stream_mut().set_encoding(encoding);
                    }
                    None => self.notifications.notify(
                        NotificationType::Warning,
                        format!("unknown code page {}; strings decoded as UTF-8 or Latin-1", name),
                    ),
                }
            }
        }
        self.document.header = header::read_header(&tags)?;
        Ok(())
    }

    fn read_classes(&mut self) -> Result<()> {
        while let Some(record) = self.framer.next_record()? {
            if record.name != "CLASS" {
                tracing::trace!(record = %record.name, "unexpected record in CLASSES");
                continue;
            }
            if let Some(class) = self.recover(classes::read_class(&record), &record)? {
                self.document.classes.add_or_update(class);
            }
        }
        Ok(())
    }

    fn read_tables(&mut self) -> Result<()> {
        let mut current = String::new();
        let mut raw: Option<RawTable> = None;
        while let Some(record) = self.framer.next_record()? {
            match record.name.as_str() {
                "TABLE" => {
                    let (name, handle) = tables::read_table_head(&record);
                    tracing::debug!(table = %name, handle = %handle, "table start");
                    match name.as_str() {
                        "LAYER" => self.document.layers.set_handle(handle),
                        "LTYPE" => self.document.line_types.set_handle(handle),
                        "STYLE" => self.document.text_styles.set_handle(handle),
                        "DIMSTYLE" => self.document.dim_styles.set_handle(handle),
                        "APPID" => self.document.app_ids.set_handle(handle),
                        "BLOCK_RECORD" => self.document.block_records.set_handle(handle),
                        _ => {
                            let mut table = RawTable::new(name.clone());
                            table.handle = handle;
                            raw = Some(table);
                        }
                    }
                    current = name;
                }
                "ENDTAB" => {
                    if let Some(table) = raw.take() {
                        self.document.raw_tables.push(table);
                    }
                    current.clear();
                }
                _ => {
                    if let Some(table) = raw.as_mut() {
                        table.entries.push(tables::read_raw_entry(&record));
                        continue;
                    }
                    self.read_table_entry(&current, &record)?;
                }
            }
        }
        if let Some(table) = raw.take() {
            self.document.raw_tables.push(table);
        }
        Ok(())
    }

    fn read_table_entry(&mut self, table: &str, record: &Record) -> Result<()> {
        macro_rules! entry {
            ($read:path, $table:ident) => {{
                if let Some(entry) = self.recover($read(record), record)? {
                    let added = self.document.$table.add(entry);
                    self.add_entry(added)?;
                }
            }};
        }
        match table {
            "LAYER" => entry!(tables::read_layer, layers),
            "LTYPE" => entry!(tables::read_linetype, line_types),
            "STYLE" => entry!(tables::read_text_style, text_styles),
            "DIMSTYLE" => entry!(tables::read_dimstyle, dim_styles),
            "APPID" => entry!(tables::read_appid, app_ids),
            "BLOCK_RECORD" => entry!(tables::read_block_record, block_records),
            _ => tracing::trace!(record = %record.name, "table entry outside of a table"),
        }
        Ok(())
    }

    fn read_entity(&mut self, record: &Record) -> Result<Option<EntityType>> {
        let entity = entities::read_entity(record, self.mode);
        let entity = self.recover(entity, record)?;
        if let Some(EntityType::Unknown(_)) = &entity {
            self.notifications.push(
                Notification::new(
                    NotificationType::NotImplemented,
                    format!("{} entity kept verbatim", record.name),
                )
                .at(record.position),
            );
        }
        Ok(entity)
    }

    /// BLOCK / entities / ENDBLK runs. Files without a BLOCK_RECORD table
    /// (R12) get their block records from here.
    fn read_blocks(&mut self) -> Result<()> {
        let mut current: Option<String> = None;
        while let Some(record) = self.framer.next_record()? {
            match record.name.as_str() {
                "BLOCK" => {
                    let Some((name, begin)) = self.recover(tables::read_block_begin(&record), &record)? else {
                        continue;
                    };
                    match self.document.block_records.get_mut(&name) {
                        Some(block_record) => block_record.block = begin,
                        None => {
                            let mut block_record = BlockRecord::new(name.clone());
                            block_record.block = begin;
                            self.document.block_records.add(block_record)?;
                        }
                    }
                    current = Some(name);
                }
                "ENDBLK" => {
                    let end = self.recover(tables::read_block_end(&record), &record)?;
                    if let (Some(name), Some(end)) = (current.take(), end) {
                        if let Some(block_record) = self.document.block_records.get_mut(&name) {
                            block_record.end = end;
                        }
                    }
                }
                _ => {
                    let Some(mut entity) = self.read_entity(&record)? else {
                        continue;
                    };
                    let layout = current
                        .as_deref()
                        .and_then(|n| self.document.block_records.get(n))
                        .map(|r| (r.is_layout(), r.is_paper_space()));
                    match (layout, current.as_deref()) {
                        (Some((true, paper_space)), _) => {
                            entity.common_mut().paper_space = paper_space;
                            self.document.push_entity(entity);
                        }
                        (Some((false, _)), Some(name)) => {
                            if let Some(block_record) = self.document.block_records.get_mut(name) {
                                block_record.entities.push(entity);
                            }
                        }
                        _ => self.notifications.push(
                            Notification::new(
                                NotificationType::Warning,
                                format!("{} outside of a block dropped", record.name),
                            )
                            .at(record.position),
                        ),
                    }
                }
            }
        }
        Ok(())
    }

    fn read_entities(&mut self) -> Result<()> {
        while let Some(record) = self.framer.next_record()? {
            if let Some(entity) = self.read_entity(&record)? {
                self.document.push_entity(entity);
            }
        }
        Ok(())
    }

    fn read_objects(&mut self) -> Result<()> {
        while let Some(record) = self.framer.next_record()? {
            let Some(object) = self.recover(objects::read_object(&record), &record)? else {
                continue;
            };
            if let ObjectType::Unknown(_) = object {
                self.notifications.notify(
                    NotificationType::NotImplemented,
                    format!("{} object kept verbatim", record.name),
                );
            }
            // the first dictionary is the root dictionary
            if self.document.root_dictionary().is_null() && matches!(object, ObjectType::Dictionary(_)) {
                self.document.set_root_dictionary(object.handle());
            }
            self.document.push_object(object);
        }
        Ok(())
    }
}

/// Read a text or binary DXF file with the default configuration
pub fn read_dxf<P: AsRef<Path>>(path: P) -> Result<CadDocument> {
    DxfReader::from_file(path)?.read()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn read(text: &str, config: DxfReaderConfiguration) -> Result<CadDocument> {
        DxfReader::from_reader(Cursor::new(text.as_bytes().to_vec()))
            .with_configuration(config)
            .read()
    }

    const R12: &str = "  0\nSECTION\n  2\nHEADER\n  9\n$ACADVER\n  1\nAC1009\n  0\nENDSEC\n  0\nSECTION\n  2\nBLOCKS\n  0\nBLOCK\n  8\n0\n  2\nDOOR\n 70\n0\n 10\n0.0\n 20\n0.0\n 30\n0.0\n  3\nDOOR\n  0\nLINE\n  8\n0\n 10\n0.0\n 20\n0.0\n 30\n0.0\n 11\n1.0\n 21\n0.0\n 31\n0.0\n  0\nENDBLK\n  8\n0\n  0\nENDSEC\n  0\nSECTION\n  2\nENTITIES\n  0\nINSERT\n  8\n0\n  2\nDOOR\n 10\n5.0\n 20\n5.0\n 30\n0.0\n  0\nENDSEC\n  0\nEOF\n";

    #[test]
    fn test_r12_blocks_create_block_records() {
        let doc = read(R12, DxfReaderConfiguration::strict()).unwrap();
        assert_eq!(doc.version(), DxfVersion::AC1009);
        let door = doc.block_records.get("DOOR").unwrap();
        assert_eq!(door.entities.len(), 1);
        assert_eq!(doc.entity_count(), 1);
        assert!(doc.entities().all(|e| e.handle().is_valid()));
        assert!(doc.layers.contains("0"));
    }

    #[test]
    fn test_unknown_section_kept() {
        let text = "  0\nSECTION\n  2\nACDSDATA\n 70\n2\n  0\nACDSSCHEMA\n 90\n0\n  0\nENDSEC\n  0\nEOF\n";
        let doc = read(text, DxfReaderConfiguration::default()).unwrap();
        assert_eq!(doc.raw_sections.len(), 1);
        assert_eq!(doc.raw_sections[0].name, "ACDSDATA");
        assert_eq!(doc.raw_sections[0].tags.len(), 3);
        assert!(doc.notifications.has_type(NotificationType::NotImplemented));
    }

    #[test]
    fn test_bad_entity_skipped_only_in_lenient_mode() {
        let text = "  0\nSECTION\n  2\nENTITIES\n  0\nCIRCLE\n  8\n0\n 10\n0.0\n 20\n0.0\n 30\n0.0\n 40\n0.0\n  0\nLINE\n  8\n0\n 10\n0.0\n 20\n0.0\n 30\n0.0\n 11\n1.0\n 21\n0.0\n 31\n0.0\n  0\nENDSEC\n  0\nEOF\n";
        let doc = read(text, DxfReaderConfiguration::default()).unwrap();
        assert_eq!(doc.entity_count(), 1);
        assert!(doc.notifications.has_type(NotificationType::Error));

        let err = read(text, DxfReaderConfiguration::strict()).unwrap_err();
        assert!(matches!(err, DxfError::EntityValidation { code: 40, .. }));
    }

    #[test]
    fn test_code_page_switches_decoding() {
        let mut bytes = b"  0\nSECTION\n  2\nHEADER\n  9\n$ACADVER\n  1\nAC1015\n  9\n$DWGCODEPAGE\n  3\nANSI_1251\n  0\nENDSEC\n  0\nSECTION\n  2\nTABLES\n  0\nTABLE\n  2\nLAYER\n 70\n1\n  0\nLAYER\n  2\n".to_vec();
        bytes.push(0xC0);
        bytes.extend_from_slice(b"\n 70\n0\n 62\n7\n  6\nContinuous\n  0\nENDTAB\n  0\nENDSEC\n  0\nEOF\n");
        let doc = DxfReader::from_reader(Cursor::new(bytes)).read().unwrap();
        assert!(doc.layers.contains("\u{410}"));
    }

    #[test]
    fn test_first_dictionary_is_root() {
        let text = "  0\nSECTION\n  2\nOBJECTS\n  0\nDICTIONARY\n  5\nC\n330\n0\n100\nAcDbDictionary\n  3\nACAD_GROUP\n350\nD\n  0\nDICTIONARY\n  5\nD\n330\nC\n100\nAcDbDictionary\n  0\nENDSEC\n  0\nEOF\n";
        let doc = read(text, DxfReaderConfiguration::strict()).unwrap();
        assert_eq!(doc.root_dictionary().value(), 0xC);
        assert_eq!(doc.object_count(), 2);
    }
}
