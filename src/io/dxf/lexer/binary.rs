//! Binary dialect: little-endian codes and natively encoded values

use std::io::{self, BufRead, Read};

use byteorder::{LittleEndian, ReadBytesExt};
use encoding_rs::Encoding;

use super::{decode_bytes, Dialect, DxfStreamReader, LexerOptions, Tag};
use crate::error::{DxfError, Position, Result};
use crate::io::dxf::value::{DxfValue, GroupCodeValueType};
use crate::io::dxf::ParseMode;
use crate::types::Handle;

/// Sentinel opening every binary DXF file
pub const BINARY_SENTINEL: &[u8] = b"AutoCAD Binary DXF\r\n\x1a\x00";

/// Binary DXF tag reader. The sentinel has already been consumed.
pub struct DxfBinaryReader<R: BufRead> {
    reader: R,
    options: LexerOptions,
    offset: u64,
    /// Pre-AC1012 files store group codes in one byte, with 255 escaping
    /// to a two-byte code
    single_byte_codes: bool,
}

impl<R: BufRead> DxfBinaryReader<R> {
    pub fn new(mut reader: R, offset: u64, options: LexerOptions) -> Result<Self> {
        // The first tag is (0, "SECTION"): a printable second byte means
        // the code took a single byte
        let probe = reader.fill_buf()?;
        let single_byte_codes = probe.len() >= 2 && probe[0] == 0 && (0x20..0x7F).contains(&probe[1]);
        tracing::debug!(single_byte_codes, "binary DXF code width detected");
        Ok(DxfBinaryReader {
            reader,
            options,
            offset,
            single_byte_codes,
        })
    }

    fn truncated(&self, position: Position, code: i32) -> DxfError {
        DxfError::MalformedTag {
            position,
            message: format!("stream ends inside the value of group code {}", code),
        }
    }

    /// Read the group code, `None` at a clean end of input
    fn read_code(&mut self) -> Result<Option<i32>> {
        if self.reader.fill_buf()?.is_empty() {
            return Ok(None);
        }
        let position = Position::binary(self.offset);
        let eof = |_: io::Error| DxfError::MalformedTag {
            position,
            message: "stream ends inside a group code".to_string(),
        };
        if self.single_byte_codes {
            let byte = self.reader.read_u8().map_err(eof)?;
            self.offset += 1;
            if byte == 255 {
                let code = self.reader.read_i16::<LittleEndian>().map_err(eof)?;
                self.offset += 2;
                Ok(Some(code as i32))
            } else {
                Ok(Some(byte as i32))
            }
        } else {
            let code = self.reader.read_i16::<LittleEndian>().map_err(eof)?;
            self.offset += 2;
            Ok(Some(code as i32))
        }
    }

    fn read_null_terminated(&mut self) -> io::Result<Vec<u8>> {
        let mut bytes = Vec::new();
        let read = self.reader.read_until(0, &mut bytes)?;
        self.offset += read as u64;
        if bytes.last() != Some(&0) {
            return Err(io::ErrorKind::UnexpectedEof.into());
        }
        bytes.pop();
        Ok(bytes)
    }

    fn read_value(&mut self, code: i32, value_type: GroupCodeValueType) -> io::Result<DxfValue> {
        let value = match value_type {
            GroupCodeValueType::String | GroupCodeValueType::Comment | GroupCodeValueType::Unknown => {
                let bytes = self.read_null_terminated()?;
                let text = decode_bytes(&bytes, self.options.encoding);
                if value_type == GroupCodeValueType::Unknown {
                    DxfValue::Unknown(text)
                } else {
                    DxfValue::Str(text)
                }
            }
            GroupCodeValueType::Handle => {
                let bytes = self.read_null_terminated()?;
                let text = String::from_utf8_lossy(&bytes);
                match Handle::parse_hex(text.trim()) {
                    Some(handle) => DxfValue::Handle(handle),
                    None if text.trim().is_empty() => DxfValue::Handle(Handle::NULL),
                    None => DxfValue::Unknown(text.into_owned()),
                }
            }
            GroupCodeValueType::Double => {
                self.offset += 8;
                DxfValue::Double(self.reader.read_f64::<LittleEndian>()?)
            }
            GroupCodeValueType::Int16 => {
                self.offset += 2;
                DxfValue::Int16(self.reader.read_i16::<LittleEndian>()?)
            }
            GroupCodeValueType::Int32 => {
                self.offset += 4;
                DxfValue::Int32(self.reader.read_i32::<LittleEndian>()?)
            }
            GroupCodeValueType::Int64 => {
                self.offset += 8;
                DxfValue::Int64(self.reader.read_i64::<LittleEndian>()?)
            }
            GroupCodeValueType::Bool => {
                self.offset += 1;
                DxfValue::Bool(self.reader.read_u8()? != 0)
            }
            GroupCodeValueType::Binary => {
                let length = self.reader.read_u8()? as usize;
                let mut data = vec![0u8; length];
                self.reader.read_exact(&mut data)?;
                self.offset += 1 + length as u64;
                DxfValue::Binary(data)
            }
        };
        tracing::trace!(code, "binary value decoded");
        Ok(value)
    }
}

impl<R: BufRead> DxfStreamReader for DxfBinaryReader<R> {
    fn read_tag(&mut self) -> Result<Option<Tag>> {
        loop {
            let position = Position::binary(self.offset);
            let code = match self.read_code()? {
                Some(code) => code,
                None => return Ok(None),
            };
            let value_type = GroupCodeValueType::from_code(code);
            if value_type == GroupCodeValueType::Unknown && self.options.mode == ParseMode::Strict {
                return Err(DxfError::UnknownCode { code, position });
            }
            let value = self
                .read_value(code, value_type)
                .map_err(|_| self.truncated(position, code))?;
            if let DxfValue::Unknown(raw) = &value {
                if value_type == GroupCodeValueType::Handle && self.options.mode == ParseMode::Strict {
                    return Err(DxfError::InvalidValue {
                        code,
                        value: raw.clone(),
                        position,
                    });
                }
                if value_type == GroupCodeValueType::Unknown && !self.options.keep_unknown_codes {
                    tracing::trace!(code, %position, "dropping unknown group code");
                    continue;
                }
            }
            return Ok(Some(Tag::new(code, value, position)));
        }
    }

    fn set_encoding(&mut self, encoding: &'static Encoding) {
        self.options.encoding = Some(encoding);
    }

    fn dialect(&self) -> Dialect {
        Dialect::Binary
    }
}
