//! DXF writer
//!
//! Writing prepares the document first: stale dimension blocks are rebuilt,
//! every record gets a unique handle and every reference is checked against
//! the document's tables. A reference to an entry the document does not
//! have is [`DxfError::MissingReference`]; the writer never drops one.

mod binary_writer;
mod section_writer;
mod stream_writer;
mod text_writer;

pub use binary_writer::DxfBinaryWriter;
pub use stream_writer::{DxfStreamWriter, DxfStreamWriterExt};
pub use text_writer::{format_real, DxfTextWriter, FULL_PRECISION};

pub(crate) use section_writer::SectionWriter;

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use encoding_rs::Encoding;

use super::code_page::encoding_from_code_page;
use crate::document::{is_sentinel_linetype, CadDocument};
use crate::entities::EntityType;
use crate::error::{DxfError, Result};
use crate::types::{DxfVersion, Handle};

/// Options of [`DxfWriter`]
#[derive(Debug, Clone)]
pub struct DxfWriterConfiguration {
    /// Dialect of the output
    pub version: DxfVersion,
    /// Write the binary dialect instead of text
    pub binary: bool,
    /// Regenerate the blocks of stale dimensions before writing
    pub rebuild_dimensions: bool,
    /// Decimals of reals in text output; [`FULL_PRECISION`] or more writes
    /// the shortest text that reads back to the same value
    pub precision: usize,
}

impl Default for DxfWriterConfiguration {
    fn default() -> Self {
        Self {
            version: DxfVersion::AC1032,
            binary: false,
            rebuild_dimensions: true,
            precision: FULL_PRECISION,
        }
    }
}

impl DxfWriterConfiguration {
    pub fn for_version(version: DxfVersion) -> Self {
        Self {
            version,
            ..Self::default()
        }
    }
}

/// DXF file writer
///
/// The writer borrows the document mutably: handles are assigned and stale
/// dimension blocks rebuilt in place.
pub struct DxfWriter<'a> {
    document: &'a mut CadDocument,
    config: DxfWriterConfiguration,
}

impl<'a> DxfWriter<'a> {
    /// Writer for text output in the document's own version
    pub fn new(document: &'a mut CadDocument) -> Self {
        let version = match document.version() {
            DxfVersion::Unknown => DxfVersion::AC1032,
            v => v,
        };
        Self {
            document,
            config: DxfWriterConfiguration::for_version(version),
        }
    }

    /// Writer for binary output in the document's own version
    pub fn new_binary(document: &'a mut CadDocument) -> Self {
        let mut writer = Self::new(document);
        writer.config.binary = true;
        writer
    }

    pub fn with_configuration(mut self, config: DxfWriterConfiguration) -> Self {
        self.config = config;
        self
    }

    pub fn configuration(&self) -> &DxfWriterConfiguration {
        &self.config
    }

    /// Write to a file
    pub fn write_to_file<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let file = File::create(path)?;
        self.write_to_writer(BufWriter::new(file))
    }

    /// Write to a byte vector
    pub fn write_to_vec(&mut self) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        self.write_to_writer(&mut buffer)?;
        Ok(buffer)
    }

    /// Write to any writer
    pub fn write_to_writer<W: Write>(&mut self, writer: W) -> Result<()> {
        let version = self.config.version;
        if version == DxfVersion::Unknown {
            return Err(DxfError::UnsupportedVersion(version.as_str().to_string()));
        }
        self.prepare()?;
        let encoding = self.encoding();
        let document: &CadDocument = self.document;

        if self.config.binary {
            let mut out = DxfBinaryWriter::new(writer)?
                .with_encoding(encoding)
                .with_single_byte_codes(version.has_single_byte_codes());
            SectionWriter::new(&mut out, version).write_document(document)?;
            out.flush()?;
        } else {
            let mut out = DxfTextWriter::new(writer)
                .with_encoding(encoding)
                .with_precision(self.config.precision);
            SectionWriter::new(&mut out, version).write_document(document)?;
            out.flush()?;
        }
        tracing::debug!(
            version = version.as_str(),
            binary = self.config.binary,
            entities = document.entity_count(),
            objects = document.object_count(),
            "document written"
        );
        Ok(())
    }

    /// Text encoding of string values: UTF-8 from AC1021 on, the header's
    /// code page before
    fn encoding(&self) -> Option<&'static Encoding> {
        if self.config.version >= DxfVersion::AC1021 {
            return None;
        }
        encoding_from_code_page(&self.document.header.code_page)
    }

    fn prepare(&mut self) -> Result<()> {
        if self.config.rebuild_dimensions {
            self.document.rebuild_dimension_blocks()?;
        }
        self.document.assign_handles();
        check_references(self.document)
    }
}

fn missing(kind: &'static str, reference: &str, owner: Handle) -> DxfError {
    DxfError::MissingReference {
        kind,
        reference: reference.to_string(),
        owner,
    }
}

/// Every name and handle an entity refers to must exist in the document
fn check_entity(document: &CadDocument, entity: &EntityType) -> Result<()> {
    let owner = entity.handle();
    let common = entity.common();
    if !document.layers.contains(&common.layer) {
        return Err(missing("layer", &common.layer, owner));
    }
    if !is_sentinel_linetype(&common.linetype) && !document.line_types.contains(&common.linetype) {
        return Err(missing("line type", &common.linetype, owner));
    }
    if let Some(style) = entity.text_style() {
        if !document.text_styles.contains(style) {
            return Err(missing("text style", style, owner));
        }
    }
    for application in common.extended_data.application_names() {
        if !document.app_ids.contains(application) {
            return Err(missing("application", application, owner));
        }
    }
    match entity {
        EntityType::Insert(insert) => {
            if !document.block_records.contains(&insert.block_name) {
                return Err(missing("block", &insert.block_name, owner));
            }
            for attribute in &insert.attributes {
                if !document.text_styles.contains(&attribute.text.style) {
                    return Err(missing("text style", &attribute.text.style, attribute.text.common.handle));
                }
            }
        }
        EntityType::Dimension(d) => {
            let base = d.base();
            if !document.dim_styles.contains(&base.style) {
                return Err(missing("dimension style", &base.style, owner));
            }
            if !base.block_name.is_empty() && !document.block_records.contains(&base.block_name) {
                return Err(missing("block", &base.block_name, owner));
            }
        }
        EntityType::MLine(m) => {
            if document.get_object(m.style).is_none() && document.mline_style(&m.style_name).is_none() {
                return Err(missing("multiline style", &m.style_name, owner));
            }
        }
        EntityType::Underlay(u) => {
            if !u.definition.is_null() && document.get_object(u.definition).is_none() {
                return Err(missing("underlay definition", &u.definition.to_string(), owner));
            }
        }
        _ => {}
    }
    Ok(())
}

fn check_references(document: &CadDocument) -> Result<()> {
    for entity in document.all_entities() {
        check_entity(document, entity)?;
    }
    for layer in document.layers.iter() {
        if !is_sentinel_linetype(&layer.linetype) && !document.line_types.contains(&layer.linetype) {
            return Err(missing("line type", &layer.linetype, layer.handle));
        }
    }
    Ok(())
}

/// Write a document to a text DXF file in its own version
pub fn write_dxf<P: AsRef<Path>>(document: &mut CadDocument, path: P) -> Result<()> {
    DxfWriter::new(document).write_to_file(path)
}

/// Write a document to a binary DXF file in its own version
pub fn write_binary_dxf<P: AsRef<Path>>(document: &mut CadDocument, path: P) -> Result<()> {
    DxfWriter::new_binary(document).write_to_file(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{Insert, Line};
    use crate::types::Vector3;

    fn line() -> EntityType {
        EntityType::Line(Line::from_coords(0.0, 0.0, 0.0, 1.0, 1.0, 0.0))
    }

    #[test]
    fn test_write_assigns_handles() {
        let mut doc = CadDocument::new();
        doc.push_entity(line());
        DxfWriter::new(&mut doc).write_to_vec().unwrap();
        assert!(doc.entities().all(|e| e.handle().is_valid()));
    }

    #[test]
    fn test_missing_layer_is_fatal() {
        let mut doc = CadDocument::new();
        let mut entity = line();
        entity.common_mut().layer = "NOWHERE".into();
        doc.push_entity(entity);
        let err = DxfWriter::new(&mut doc).write_to_vec().unwrap_err();
        assert!(matches!(err, DxfError::MissingReference { kind: "layer", .. }));
    }

    #[test]
    fn test_missing_block_is_fatal() {
        let mut doc = CadDocument::new();
        doc.push_entity(EntityType::Insert(Insert::new("GONE", Vector3::ZERO)));
        let err = DxfWriter::new(&mut doc).write_to_vec().unwrap_err();
        assert!(matches!(err, DxfError::MissingReference { kind: "block", .. }));
    }

    #[test]
    fn test_binary_output_starts_with_sentinel() {
        let mut doc = CadDocument::new();
        let bytes = DxfWriter::new_binary(&mut doc).write_to_vec().unwrap();
        assert!(bytes.starts_with(b"AutoCAD Binary DXF\r\n\x1a\0"));
    }

    #[test]
    fn test_code_page_for_old_versions() {
        let mut doc = CadDocument::new();
        doc.header.code_page = "ANSI_1251".into();
        let writer = DxfWriter::new(&mut doc)
            .with_configuration(DxfWriterConfiguration::for_version(DxfVersion::AC1018));
        assert_eq!(writer.encoding(), Some(encoding_rs::WINDOWS_1251));
        let writer = writer.with_configuration(DxfWriterConfiguration::default());
        assert_eq!(writer.encoding(), None);
    }
}
