//! I/O for DXF files

pub mod dxf;

pub use dxf::{DxfReader, DxfWriter};
