//! Shared helpers for the integration tests.

#![allow(dead_code)]

pub mod builders;
pub mod comparison;

use std::io::Cursor;

use dxfcodec::io::dxf::{DxfReader, DxfReaderConfiguration, DxfWriter, DxfWriterConfiguration};
use dxfcodec::types::DxfVersion;
use dxfcodec::{CadDocument, Result};

/// Versions the writer emits, oldest first
pub const ALL_VERSIONS: [DxfVersion; 9] = DxfVersion::SUPPORTED;

pub fn write_text(doc: &mut CadDocument, version: DxfVersion) -> Vec<u8> {
    DxfWriter::new(doc)
        .with_configuration(DxfWriterConfiguration::for_version(version))
        .write_to_vec()
        .unwrap_or_else(|e| panic!("writing {} failed: {}", version, e))
}

pub fn write_binary(doc: &mut CadDocument, version: DxfVersion) -> Vec<u8> {
    let config = DxfWriterConfiguration {
        binary: true,
        ..DxfWriterConfiguration::for_version(version)
    };
    DxfWriter::new(doc)
        .with_configuration(config)
        .write_to_vec()
        .unwrap_or_else(|e| panic!("writing binary {} failed: {}", version, e))
}

pub fn try_read(bytes: &[u8], config: DxfReaderConfiguration) -> Result<CadDocument> {
    DxfReader::from_reader(Cursor::new(bytes.to_vec()))
        .with_configuration(config)
        .read()
}

/// Strict read of bytes the writer produced
pub fn read_back(bytes: &[u8]) -> CadDocument {
    try_read(bytes, DxfReaderConfiguration::strict()).unwrap_or_else(|e| panic!("read back failed: {}", e))
}

pub fn read_lenient(text: &str) -> CadDocument {
    try_read(text.as_bytes(), DxfReaderConfiguration::default()).unwrap()
}

pub fn read_strict(text: &str) -> Result<CadDocument> {
    try_read(text.as_bytes(), DxfReaderConfiguration::strict())
}

/// ASCII DXF from alternating code and value lines
pub fn dxf_text(pairs: &[(i32, &str)]) -> String {
    let mut text = String::new();
    for (code, value) in pairs {
        text.push_str(&format!("{:>3}\n{}\n", code, value));
    }
    text
}

/// A file with only an ENTITIES section holding `records`
pub fn entities_file(records: &[(i32, &str)]) -> String {
    let mut pairs = vec![(0, "SECTION"), (2, "ENTITIES")];
    pairs.extend_from_slice(records);
    pairs.extend_from_slice(&[(0, "ENDSEC"), (0, "EOF")]);
    dxf_text(&pairs)
}
