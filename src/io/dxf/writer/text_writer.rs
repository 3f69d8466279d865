//! ASCII DXF writer

use std::io::Write;

use encoding_rs::Encoding;

use super::stream_writer::{encode_text, DxfStreamWriter};
use crate::error::Result;
use crate::io::dxf::lexer::encode_carets;
use crate::io::dxf::value::format_double;
use crate::types::Handle;

/// Precision at and above which reals are written in their shortest
/// round-trip form
pub const FULL_PRECISION: usize = 17;

/// ASCII DXF stream writer
pub struct DxfTextWriter<W: Write> {
    writer: W,
    encoding: Option<&'static Encoding>,
    precision: usize,
}

impl<W: Write> DxfTextWriter<W> {
    /// Create a new ASCII DXF writer producing UTF-8 with full precision
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            encoding: None,
            precision: FULL_PRECISION,
        }
    }

    /// Encode string values with a code page
    pub fn with_encoding(mut self, encoding: Option<&'static Encoding>) -> Self {
        self.encoding = encoding;
        self
    }

    /// Number of decimals written for reals
    pub fn with_precision(mut self, precision: usize) -> Self {
        self.precision = precision;
        self
    }

    /// Write a DXF code with proper formatting (right-aligned in 3-character field)
    fn write_code(&mut self, code: i32) -> Result<()> {
        writeln!(self.writer, "{:>3}", code)?;
        Ok(())
    }

    fn write_line(&mut self, code: i32, value: &str) -> Result<()> {
        self.write_code(code)?;
        writeln!(self.writer, "{}", value)?;
        Ok(())
    }

    /// Get the inner writer
    pub fn into_inner(self) -> W {
        self.writer
    }
}

/// Text of a real, rounded to `precision` decimals below [`FULL_PRECISION`]
pub fn format_real(value: f64, precision: usize) -> String {
    if precision >= FULL_PRECISION || !value.is_finite() {
        return format_double(value);
    }
    let formatted = format!("{:.*}", precision, value);
    if !formatted.contains('.') {
        return format!("{}.0", formatted);
    }
    let trimmed = formatted.trim_end_matches('0');
    if trimmed.ends_with('.') {
        format!("{}0", trimmed)
    } else {
        trimmed.to_string()
    }
}

impl<W: Write> DxfStreamWriter for DxfTextWriter<W> {
    fn write_string(&mut self, code: i32, value: &str) -> Result<()> {
        self.write_code(code)?;
        let escaped = encode_carets(value);
        self.writer.write_all(&encode_text(&escaped, self.encoding))?;
        self.writer.write_all(b"\n")?;
        Ok(())
    }

    fn write_byte(&mut self, code: i32, value: u8) -> Result<()> {
        self.write_line(code, &value.to_string())
    }

    fn write_i16(&mut self, code: i32, value: i16) -> Result<()> {
        self.write_line(code, &value.to_string())
    }

    fn write_i32(&mut self, code: i32, value: i32) -> Result<()> {
        self.write_line(code, &value.to_string())
    }

    fn write_i64(&mut self, code: i32, value: i64) -> Result<()> {
        self.write_line(code, &value.to_string())
    }

    fn write_double(&mut self, code: i32, value: f64) -> Result<()> {
        let text = format_real(value, self.precision);
        self.write_line(code, &text)
    }

    fn write_bool(&mut self, code: i32, value: bool) -> Result<()> {
        self.write_line(code, if value { "1" } else { "0" })
    }

    fn write_handle(&mut self, code: i32, handle: Handle) -> Result<()> {
        self.write_line(code, &format!("{:X}", handle.value()))
    }

    fn write_binary(&mut self, code: i32, data: &[u8]) -> Result<()> {
        self.write_code(code)?;
        for byte in data {
            write!(self.writer, "{:02X}", byte)?;
        }
        writeln!(self.writer)?;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::stream_writer::DxfStreamWriterExt;
    use super::*;
    use crate::types::Vector3;

    #[test]
    fn test_write_string() {
        let mut buf = Vec::new();
        {
            let mut writer = DxfTextWriter::new(&mut buf);
            writer.write_string(0, "LINE").unwrap();
        }
        let output = String::from_utf8(buf).unwrap();
        assert_eq!(output, "  0\nLINE\n");
    }

    #[test]
    fn test_write_code_formatting() {
        let mut buf = Vec::new();
        {
            let mut writer = DxfTextWriter::new(&mut buf);
            writer.write_i16(5, 100).unwrap();
            writer.write_i16(62, 7).unwrap();
            writer.write_i16(100, 1).unwrap();
        }
        let output = String::from_utf8(buf).unwrap();
        assert!(output.starts_with("  5\n"));
        assert!(output.contains(" 62\n"));
        assert!(output.contains("100\n"));
    }

    #[test]
    fn test_write_point3d() {
        let mut buf = Vec::new();
        {
            let mut writer = DxfTextWriter::new(&mut buf);
            writer.write_point3d(10, Vector3::new(1.0, 2.0, 3.0)).unwrap();
        }
        let output = String::from_utf8(buf).unwrap();
        assert_eq!(output, " 10\n1.0\n 20\n2.0\n 30\n3.0\n");
    }

    #[test]
    fn test_write_handle() {
        let mut buf = Vec::new();
        {
            let mut writer = DxfTextWriter::new(&mut buf);
            writer.write_handle(5, Handle::new(255)).unwrap();
        }
        let output = String::from_utf8(buf).unwrap();
        assert!(output.contains("FF\n"));
    }

    #[test]
    fn test_control_characters_are_escaped() {
        let mut buf = Vec::new();
        {
            let mut writer = DxfTextWriter::new(&mut buf);
            writer.write_string(1, "a\nb^c").unwrap();
        }
        assert_eq!(String::from_utf8(buf).unwrap(), "  1\na^Jb^ c\n");
    }

    #[test]
    fn test_reduced_precision() {
        assert_eq!(format_real(0.1 + 0.2, 17), "0.30000000000000004");
        assert_eq!(format_real(0.1 + 0.2, 6), "0.3");
        assert_eq!(format_real(2.0, 3), "2.0");
        assert_eq!(format_real(1.23456789, 4), "1.2346");
        assert_eq!(format_real(5.0, 0), "5.0");
    }

    #[test]
    fn test_code_page_output() {
        let mut buf = Vec::new();
        {
            let mut writer = DxfTextWriter::new(&mut buf).with_encoding(Some(encoding_rs::WINDOWS_1251));
            writer.write_string(8, "\u{410}").unwrap();
        }
        assert_eq!(buf, b"  8\n\xC0\n".to_vec());
    }
}
