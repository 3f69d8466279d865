//! DXF stream writer trait and common types

use encoding_rs::Encoding;

use crate::error::Result;
use crate::io::dxf::value::DxfValue;
use crate::types::{Handle, Vector2, Vector3};

/// Trait for writing DXF code/value pairs
pub trait DxfStreamWriter {
    /// Write a code/value pair with a string value
    fn write_string(&mut self, code: i32, value: &str) -> Result<()>;

    /// Write a code/value pair with a byte value (for codes 280-289)
    fn write_byte(&mut self, code: i32, value: u8) -> Result<()>;

    /// Write a code/value pair with an integer value
    fn write_i16(&mut self, code: i32, value: i16) -> Result<()>;

    /// Write a code/value pair with an i32 value
    fn write_i32(&mut self, code: i32, value: i32) -> Result<()>;

    /// Write a code/value pair with an i64 value
    fn write_i64(&mut self, code: i32, value: i64) -> Result<()>;

    /// Write a code/value pair with a double value
    fn write_double(&mut self, code: i32, value: f64) -> Result<()>;

    /// Write a code/value pair with a boolean value
    fn write_bool(&mut self, code: i32, value: bool) -> Result<()>;

    /// Write a code/value pair with a handle value
    fn write_handle(&mut self, code: i32, handle: Handle) -> Result<()>;

    /// Write binary data
    fn write_binary(&mut self, code: i32, data: &[u8]) -> Result<()>;

    /// Flush the writer
    fn flush(&mut self) -> Result<()>;
}

/// Extension trait for convenient writing operations
pub trait DxfStreamWriterExt: DxfStreamWriter {
    /// Write a 2D point (codes 10/20 or similar)
    fn write_point2d(&mut self, x_code: i32, point: Vector2) -> Result<()> {
        self.write_double(x_code, point.x)?;
        self.write_double(x_code + 10, point.y)?;
        Ok(())
    }

    /// Write a 3D point (codes 10/20/30 or similar)
    fn write_point3d(&mut self, x_code: i32, point: Vector3) -> Result<()> {
        self.write_double(x_code, point.x)?;
        self.write_double(x_code + 10, point.y)?;
        self.write_double(x_code + 20, point.z)?;
        Ok(())
    }

    /// Write a decoded value back under its code
    fn write_value(&mut self, code: i32, value: &DxfValue) -> Result<()> {
        match value {
            DxfValue::Str(s) | DxfValue::Unknown(s) => self.write_string(code, s),
            DxfValue::Double(v) => self.write_double(code, *v),
            DxfValue::Int16(v) => self.write_i16(code, *v),
            DxfValue::Int32(v) => self.write_i32(code, *v),
            DxfValue::Int64(v) => self.write_i64(code, *v),
            DxfValue::Bool(b) => self.write_bool(code, *b),
            DxfValue::Handle(h) => self.write_handle(code, *h),
            DxfValue::Binary(data) => self.write_binary(code, data),
        }
    }

    /// Write common entity header
    fn write_entity_type(&mut self, entity_type: &str) -> Result<()> {
        self.write_string(0, entity_type)
    }

    /// Write a subclass marker
    fn write_subclass(&mut self, marker: &str) -> Result<()> {
        self.write_string(100, marker)
    }

    /// Write section start
    fn write_section_start(&mut self, section_name: &str) -> Result<()> {
        self.write_string(0, "SECTION")?;
        self.write_string(2, section_name)?;
        Ok(())
    }

    /// Write section end
    fn write_section_end(&mut self) -> Result<()> {
        self.write_string(0, "ENDSEC")
    }

    /// Write end of file
    fn write_eof(&mut self) -> Result<()> {
        self.write_string(0, "EOF")
    }
}

impl<T: DxfStreamWriter + ?Sized> DxfStreamWriterExt for T {}

/// Encode a string value for output.
///
/// Without an encoding the text is written as UTF-8. With a code page,
/// characters it cannot represent are written as `\U+XXXX`.
pub(crate) fn encode_text(value: &str, encoding: Option<&'static Encoding>) -> Vec<u8> {
    let encoding = match encoding {
        Some(enc) if enc != encoding_rs::UTF_8 => enc,
        _ => return value.as_bytes().to_vec(),
    };
    let mut out = Vec::with_capacity(value.len());
    let mut buf = [0u8; 4];
    for c in value.chars() {
        if c.is_ascii() {
            out.push(c as u8);
            continue;
        }
        let (bytes, _, had_errors) = encoding.encode(c.encode_utf8(&mut buf));
        if had_errors {
            out.extend_from_slice(format!("\\U+{:04X}", c as u32).as_bytes());
        } else {
            out.extend_from_slice(&bytes);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_text_utf8() {
        assert_eq!(encode_text("été", None), "été".as_bytes());
    }

    #[test]
    fn test_encode_text_code_page() {
        assert_eq!(encode_text("caf\u{e9}", Some(encoding_rs::WINDOWS_1252)), vec![b'c', b'a', b'f', 0xE9]);
        assert_eq!(
            encode_text("a\u{4E2D}", Some(encoding_rs::WINDOWS_1252)),
            b"a\\U+4E2D".to_vec()
        );
    }
}
