//! DXF (Drawing Exchange Format) reading and writing
//!
//! Reading runs in layers: [`lexer`] turns bytes into typed tags, [`framer`]
//! groups them into sections and records, `mapper` builds the document
//! model from records and `resolver` checks references across the whole
//! document. Writing runs the mapper backwards through a
//! [`DxfStreamWriter`].

pub mod code_page;
pub mod framer;
pub mod lexer;
pub(crate) mod mapper;
mod reader;
pub(crate) mod resolver;
pub mod value;
mod writer;

use std::path::{Path, PathBuf};

use rayon::prelude::*;

use crate::document::CadDocument;
use crate::error::Result;

pub use reader::{read_dxf, DxfReader, DxfReaderConfiguration};
pub use value::{DxfValue, GroupCodeValueType};
pub use writer::{
    format_real, write_binary_dxf, write_dxf, DxfBinaryWriter, DxfStreamWriter, DxfStreamWriterExt,
    DxfTextWriter, DxfWriter, DxfWriterConfiguration, FULL_PRECISION,
};

/// How the reader treats malformed input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParseMode {
    /// Recover where possible and record a notification
    #[default]
    Lenient,
    /// Fail on the first malformed record or dangling reference
    Strict,
}

/// Read several files in parallel. Results come back in input order.
pub fn read_many<P>(paths: &[P], config: &DxfReaderConfiguration) -> Vec<(PathBuf, Result<CadDocument>)>
where
    P: AsRef<Path> + Sync,
{
    paths
        .par_iter()
        .map(|path| {
            let path = path.as_ref();
            let document = DxfReader::from_file(path).and_then(|r| r.with_configuration(config.clone()).read());
            if let Err(error) = &document {
                tracing::warn!(path = %path.display(), %error, "read failed");
            }
            (path.to_path_buf(), document)
        })
        .collect()
}
