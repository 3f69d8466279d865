//! ASCII dialect: group code and value on alternating lines

use std::io::BufRead;

use encoding_rs::Encoding;

use super::{decode_bytes, decode_carets, decode_unicode_escapes, Dialect, DxfStreamReader, LexerOptions, Tag};
use crate::error::{DxfError, Position, Result};
use crate::io::dxf::value::{decode_text, DxfValue, GroupCodeValueType};
use crate::io::dxf::ParseMode;

/// ASCII DXF tag reader
pub struct DxfTextReader<R: BufRead> {
    reader: R,
    options: LexerOptions,
    /// Bytes consumed so far
    offset: u64,
    /// Lines consumed so far
    line_number: u64,
    buffer: Vec<u8>,
}

impl<R: BufRead> DxfTextReader<R> {
    pub fn new(reader: R, options: LexerOptions) -> Self {
        DxfTextReader {
            reader,
            options,
            offset: 0,
            line_number: 0,
            buffer: Vec::with_capacity(256),
        }
    }

    /// Read one line without its terminator. `None` at end of input.
    fn read_line(&mut self) -> Result<Option<String>> {
        self.buffer.clear();
        let read = self.reader.read_until(b'\n', &mut self.buffer)?;
        if read == 0 {
            return Ok(None);
        }
        self.offset += read as u64;
        self.line_number += 1;

        let mut bytes = self.buffer.as_slice();
        if bytes.last() == Some(&b'\n') {
            bytes = &bytes[..bytes.len() - 1];
        }
        if bytes.last() == Some(&b'\r') {
            bytes = &bytes[..bytes.len() - 1];
        }
        if self.line_number == 1 && bytes.starts_with(&[0xEF, 0xBB, 0xBF]) {
            bytes = &bytes[3..];
        }
        Ok(Some(decode_bytes(bytes, self.options.encoding)))
    }

    fn decode_string(&self, raw: &str) -> String {
        let value = decode_carets(raw);
        if self.options.encoding.is_some() {
            decode_unicode_escapes(&value)
        } else {
            value
        }
    }
}

impl<R: BufRead> DxfStreamReader for DxfTextReader<R> {
    fn read_tag(&mut self) -> Result<Option<Tag>> {
        loop {
            let start = self.offset;
            let code_line = match self.read_line()? {
                Some(line) => line,
                None => return Ok(None),
            };
            let position = Position::text(start, self.line_number);
            let trimmed = code_line.trim();
            if trimmed.is_empty() {
                // Trailing blank lines after EOF are common
                if self.reader.fill_buf()?.iter().all(|b| b.is_ascii_whitespace()) {
                    return Ok(None);
                }
                return Err(DxfError::MalformedTag {
                    position,
                    message: "empty group code line".to_string(),
                });
            }
            let code = trimmed.parse::<i16>().map_err(|_| DxfError::MalformedTag {
                position,
                message: format!("invalid group code '{}'", trimmed),
            })? as i32;

            let raw = self.read_line()?.ok_or_else(|| DxfError::MalformedTag {
                position,
                message: format!("missing value for group code {}", code),
            })?;

            let value_type = GroupCodeValueType::from_code(code);
            if value_type == GroupCodeValueType::Unknown {
                match self.options.mode {
                    ParseMode::Strict => return Err(DxfError::UnknownCode { code, position }),
                    ParseMode::Lenient if !self.options.keep_unknown_codes => {
                        tracing::trace!(code, %position, "dropping unknown group code");
                        continue;
                    }
                    ParseMode::Lenient => {}
                }
            }

            let value = match value_type {
                GroupCodeValueType::String | GroupCodeValueType::Comment => {
                    DxfValue::Str(self.decode_string(&raw))
                }
                _ => match decode_text(code, &raw, position, true) {
                    Ok(value) => value,
                    Err(err) if self.options.mode == ParseMode::Lenient => {
                        // The mapper reports the bad value when it reaches the field
                        tracing::trace!(%err, "keeping undecodable value as text");
                        DxfValue::Unknown(raw)
                    }
                    Err(err) => return Err(err),
                },
            };
            return Ok(Some(Tag::new(code, value, position)));
        }
    }

    fn set_encoding(&mut self, encoding: &'static Encoding) {
        self.options.encoding = Some(encoding);
    }

    fn dialect(&self) -> Dialect {
        Dialect::Text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Handle;
    use std::io::Cursor;

    fn reader(data: &str) -> DxfTextReader<Cursor<Vec<u8>>> {
        DxfTextReader::new(Cursor::new(data.as_bytes().to_vec()), LexerOptions::default())
    }

    fn strict(data: &str) -> DxfTextReader<Cursor<Vec<u8>>> {
        let options = LexerOptions {
            mode: ParseMode::Strict,
            ..LexerOptions::default()
        };
        DxfTextReader::new(Cursor::new(data.as_bytes().to_vec()), options)
    }

    #[test]
    fn test_read_typed_pairs() {
        let mut r = reader("  0\r\nLINE\r\n  5\r\n2A\r\n 10\r\n1.5\r\n 70\r\n     3\r\n");
        let t = r.read_tag().unwrap().unwrap();
        assert!(t.is_start("LINE"));
        assert_eq!(t.position, Position::text(0, 1));
        assert_eq!(r.read_tag().unwrap().unwrap().value, DxfValue::Handle(Handle::new(0x2A)));
        let point = r.read_tag().unwrap().unwrap();
        assert_eq!(point.value, DxfValue::Double(1.5));
        assert_eq!(point.position.line, Some(5));
        assert_eq!(r.read_tag().unwrap().unwrap().value, DxfValue::Int16(3));
        assert!(r.read_tag().unwrap().is_none());
    }

    #[test]
    fn test_string_values_keep_spaces() {
        let mut r = reader("  1\n  two  spaces \n");
        assert_eq!(r.read_tag().unwrap().unwrap().as_str(), "  two  spaces ");
    }

    #[test]
    fn test_bad_code_is_malformed() {
        let mut r = reader("abc\nLINE\n");
        let err = r.read_tag().unwrap_err();
        assert!(matches!(err, DxfError::MalformedTag { position, .. } if position.line == Some(1)));

        let mut r = reader("99999\nx\n");
        assert!(matches!(r.read_tag().unwrap_err(), DxfError::MalformedTag { .. }));
    }

    #[test]
    fn test_missing_value_is_malformed() {
        let mut r = reader("  0\nLINE\n  8\n");
        r.read_tag().unwrap();
        let err = r.read_tag().unwrap_err();
        assert!(matches!(err, DxfError::MalformedTag { position, .. } if position.line == Some(3)));
    }

    #[test]
    fn test_trailing_blank_lines_end_stream() {
        let mut r = reader("  0\nEOF\n\n\n");
        r.read_tag().unwrap();
        assert!(r.read_tag().unwrap().is_none());
    }

    #[test]
    fn test_invalid_value_by_mode() {
        let mut lenient = reader(" 40\nabc\n");
        assert_eq!(lenient.read_tag().unwrap().unwrap().value, DxfValue::Unknown("abc".into()));

        let mut s = strict(" 40\nabc\n");
        assert!(matches!(s.read_tag().unwrap_err(), DxfError::InvalidValue { code: 40, .. }));
    }

    #[test]
    fn test_unknown_code_by_mode() {
        let mut lenient = reader(" 85\nopaque\n  0\nEOF\n");
        assert_eq!(lenient.read_tag().unwrap().unwrap().value, DxfValue::Unknown("opaque".into()));

        let options = LexerOptions {
            keep_unknown_codes: false,
            ..LexerOptions::default()
        };
        let mut dropping = DxfTextReader::new(Cursor::new(b" 85\nopaque\n  0\nEOF\n".to_vec()), options);
        assert!(dropping.read_tag().unwrap().unwrap().is_start("EOF"));

        let mut s = strict(" 85\nopaque\n");
        assert!(matches!(s.read_tag().unwrap_err(), DxfError::UnknownCode { code: 85, .. }));
    }

    #[test]
    fn test_code_page_decoding() {
        let mut data = b"  1\n".to_vec();
        data.extend_from_slice(&[0xC0, 0xE1, b'\n']);
        let mut r = DxfTextReader::new(Cursor::new(data), LexerOptions::default());
        r.set_encoding(encoding_rs::WINDOWS_1251);
        assert_eq!(r.read_tag().unwrap().unwrap().as_str(), "\u{410}\u{431}");
    }
}
