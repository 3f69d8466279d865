//! Binary DXF writer

use std::io::Write;

use byteorder::{LittleEndian, WriteBytesExt};
use encoding_rs::Encoding;

use super::stream_writer::{encode_text, DxfStreamWriter};
use crate::error::{DxfError, Result};
use crate::io::dxf::lexer::BINARY_SENTINEL;
use crate::io::dxf::value::GroupCodeValueType;
use crate::types::Handle;

/// Binary DXF stream writer.
///
/// Values are written with the width their group code declares, whatever
/// integer method was used to write them.
pub struct DxfBinaryWriter<W: Write> {
    writer: W,
    encoding: Option<&'static Encoding>,
    single_byte_codes: bool,
}

impl<W: Write> DxfBinaryWriter<W> {
    /// Create a new binary DXF writer
    pub fn new(mut writer: W) -> Result<Self> {
        writer.write_all(BINARY_SENTINEL)?;
        Ok(Self {
            writer,
            encoding: None,
            single_byte_codes: false,
        })
    }

    /// Encode string values with a code page
    pub fn with_encoding(mut self, encoding: Option<&'static Encoding>) -> Self {
        self.encoding = encoding;
        self
    }

    /// Write group codes in one byte, as R12 files do
    pub fn with_single_byte_codes(mut self, single_byte_codes: bool) -> Self {
        self.single_byte_codes = single_byte_codes;
        self
    }

    fn write_code(&mut self, code: i32) -> Result<()> {
        if self.single_byte_codes {
            if (0..255).contains(&code) {
                self.writer.write_u8(code as u8)?;
            } else {
                self.writer.write_u8(255)?;
                self.writer.write_i16::<LittleEndian>(code as i16)?;
            }
        } else {
            self.writer.write_i16::<LittleEndian>(code as i16)?;
        }
        Ok(())
    }

    /// Write a null-terminated string
    fn write_null_string(&mut self, bytes: &[u8]) -> Result<()> {
        self.writer.write_all(bytes)?;
        self.writer.write_u8(0)?;
        Ok(())
    }

    /// Write an integer with the width of `code`
    fn write_integer(&mut self, code: i32, value: i64) -> Result<()> {
        self.write_code(code)?;
        match GroupCodeValueType::from_code(code) {
            GroupCodeValueType::Int16 => self.writer.write_i16::<LittleEndian>(value as i16)?,
            GroupCodeValueType::Int32 => self.writer.write_i32::<LittleEndian>(value as i32)?,
            GroupCodeValueType::Int64 => self.writer.write_i64::<LittleEndian>(value)?,
            GroupCodeValueType::Bool => self.writer.write_u8((value != 0) as u8)?,
            GroupCodeValueType::Double => self.writer.write_f64::<LittleEndian>(value as f64)?,
            _ => self.write_null_string(value.to_string().as_bytes())?,
        }
        Ok(())
    }

    /// Get the inner writer
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> DxfStreamWriter for DxfBinaryWriter<W> {
    fn write_string(&mut self, code: i32, value: &str) -> Result<()> {
        self.write_code(code)?;
        let bytes = encode_text(value, self.encoding);
        self.write_null_string(&bytes)
    }

    fn write_byte(&mut self, code: i32, value: u8) -> Result<()> {
        self.write_integer(code, value as i64)
    }

    fn write_i16(&mut self, code: i32, value: i16) -> Result<()> {
        self.write_integer(code, value as i64)
    }

    fn write_i32(&mut self, code: i32, value: i32) -> Result<()> {
        self.write_integer(code, value as i64)
    }

    fn write_i64(&mut self, code: i32, value: i64) -> Result<()> {
        self.write_integer(code, value)
    }

    fn write_double(&mut self, code: i32, value: f64) -> Result<()> {
        self.write_code(code)?;
        match GroupCodeValueType::from_code(code) {
            GroupCodeValueType::Double => self.writer.write_f64::<LittleEndian>(value)?,
            _ => self.write_null_string(value.to_string().as_bytes())?,
        }
        Ok(())
    }

    fn write_bool(&mut self, code: i32, value: bool) -> Result<()> {
        self.write_integer(code, value as i64)
    }

    fn write_handle(&mut self, code: i32, handle: Handle) -> Result<()> {
        self.write_code(code)?;
        // Handles are written as hex strings even in binary DXF
        let hex = format!("{:X}", handle.value());
        self.write_null_string(hex.as_bytes())
    }

    fn write_binary(&mut self, code: i32, data: &[u8]) -> Result<()> {
        if data.len() > u8::MAX as usize {
            return Err(DxfError::Custom(format!(
                "binary chunk of {} bytes for group code {} exceeds 255 bytes",
                data.len(),
                code
            )));
        }
        self.write_code(code)?;
        self.writer.write_u8(data.len() as u8)?;
        self.writer.write_all(data)?;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(buf: &[u8]) -> &[u8] {
        &buf[BINARY_SENTINEL.len()..]
    }

    #[test]
    fn test_binary_sentinel() {
        let mut buf = Vec::new();
        {
            let _writer = DxfBinaryWriter::new(&mut buf).unwrap();
        }
        assert!(buf.starts_with(BINARY_SENTINEL));
    }

    #[test]
    fn test_write_string() {
        let mut buf = Vec::new();
        {
            let mut writer = DxfBinaryWriter::new(&mut buf).unwrap();
            writer.write_string(0, "LINE").unwrap();
        }
        assert_eq!(body(&buf), b"\x00\x00LINE\x00");
    }

    #[test]
    fn test_write_double() {
        let mut buf = Vec::new();
        {
            let mut writer = DxfBinaryWriter::new(&mut buf).unwrap();
            writer.write_double(10, 1.5).unwrap();
        }
        let mut expected = vec![10, 0];
        expected.extend_from_slice(&1.5f64.to_le_bytes());
        assert_eq!(body(&buf), expected.as_slice());
    }

    #[test]
    fn test_integer_width_follows_code() {
        let mut buf = Vec::new();
        {
            let mut writer = DxfBinaryWriter::new(&mut buf).unwrap();
            writer.write_i16(62, 7).unwrap();
            writer.write_i16(90, 3).unwrap();
            writer.write_i16(290, 1).unwrap();
        }
        assert_eq!(
            body(&buf),
            &[62, 0, 7, 0, 90, 0, 3, 0, 0, 0, 0x22, 0x01, 1][..]
        );
    }

    #[test]
    fn test_single_byte_codes() {
        let mut buf = Vec::new();
        {
            let mut writer = DxfBinaryWriter::new(&mut buf).unwrap().with_single_byte_codes(true);
            writer.write_i16(70, 1).unwrap();
            writer.write_i16(1071, 2).unwrap();
        }
        assert_eq!(body(&buf), &[70, 1, 0, 255, 0x2F, 0x04, 2, 0, 0, 0][..]);
    }

    #[test]
    fn test_oversized_binary_chunk() {
        let mut buf = Vec::new();
        let mut writer = DxfBinaryWriter::new(&mut buf).unwrap();
        assert!(writer.write_binary(310, &[0u8; 300]).is_err());
    }
}
