//! # dxfcodec
//!
//! Reading and writing of DXF drawings at the group code level, in both
//! the text and the binary dialect.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use dxfcodec::io::dxf::{DxfReader, DxfWriter};
//!
//! let mut doc = DxfReader::from_file("sample.dxf")?.read()?;
//! for entity in doc.entities() {
//!     println!("{} on layer {}", entity.dxf_name(), entity.common().layer);
//! }
//! DxfWriter::new(&mut doc).write_to_file("output.dxf")?;
//! # Ok::<(), dxfcodec::error::DxfError>(())
//! ```
//!
//! ## Architecture
//!
//! - `io::dxf::lexer` reads tags from text or binary sources
//! - `io::dxf::framer` groups tags into sections and records
//! - the mapper turns records into [`EntityType`], table entries and
//!   [`objects::ObjectType`]
//! - the resolver checks every name and handle reference of a [`CadDocument`]
//! - [`DxfWriter`] emits a document for any supported [`DxfVersion`]

#![allow(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod cad_object;
pub mod classes;
pub mod document;
pub mod entities;
pub mod error;
pub mod header;
pub mod io;
pub mod notification;
pub mod objects;
pub mod tables;
pub mod types;
pub mod xdata;

pub use error::{DxfError, Result};
pub use types::{Color, DxfVersion, Handle, LineWeight, Transparency, Vector2, Vector3};

pub use entities::{
    Arc, Circle, Dimension, Ellipse, Entity, EntityType, Hatch, Insert, Line, LwPolyline, MText,
    Point, Polyline2D, Polyline3D, Spline, Text,
};

pub use tables::{AppId, BlockRecord, DimStyle, Layer, LineType, Table, TableEntry, TextStyle};

pub use document::{CadDocument, DocumentHooks, XDataPolicy};
pub use header::HeaderVariables;
pub use notification::{Notification, NotificationCollection, NotificationType};

pub use io::dxf::{
    read_dxf, write_binary_dxf, write_dxf, DxfReader, DxfReaderConfiguration, DxfWriter,
    DxfWriterConfiguration, ParseMode,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_cad_document_creation() {
        let doc = CadDocument::new();
        assert_eq!(doc.version(), DxfVersion::AC1032);

        let doc = CadDocument::with_version(DxfVersion::AC1015);
        assert_eq!(doc.version(), DxfVersion::AC1015);
    }
}
