//! Group code tag stream
//!
//! Turns a raw DXF source into a lazy, single-pass sequence of [`Tag`]s.
//! The dialect is picked from the first bytes: a file starting with the
//! binary sentinel is read by [`DxfBinaryReader`], anything else by
//! [`DxfTextReader`]. Both decode values through the group code type table
//! so the layers above only ever see typed values.

mod binary;
mod text;

pub use binary::{DxfBinaryReader, BINARY_SENTINEL};
pub use text::DxfTextReader;

use std::io::{BufReader, Cursor, Read};

use encoding_rs::Encoding;

use super::value::DxfValue;
use super::ParseMode;
use crate::error::{Position, Result};
use crate::types::Handle;

/// A group code and its decoded value, with the place it was read from
#[derive(Debug, Clone, PartialEq)]
pub struct Tag {
    pub code: i32,
    pub value: DxfValue,
    pub position: Position,
}

impl Tag {
    pub fn new(code: i32, value: DxfValue, position: Position) -> Self {
        Tag {
            code,
            value,
            position,
        }
    }

    /// A `0` tag with the given record name
    pub fn is_start(&self, name: &str) -> bool {
        self.code == 0 && self.value.as_str() == Some(name)
    }

    pub fn as_str(&self) -> &str {
        self.value.as_str().unwrap_or("")
    }

    pub fn as_handle(&self) -> Option<Handle> {
        self.value.as_handle()
    }

    pub fn into_pair(self) -> (i32, DxfValue) {
        (self.code, self.value)
    }
}

/// Dialect of a DXF source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    Text,
    Binary,
}

/// Options the lexers need from the reader configuration
#[derive(Debug, Clone, Copy)]
pub struct LexerOptions {
    pub mode: ParseMode,
    pub keep_unknown_codes: bool,
    pub encoding: Option<&'static Encoding>,
}

impl Default for LexerOptions {
    fn default() -> Self {
        LexerOptions {
            mode: ParseMode::Lenient,
            keep_unknown_codes: true,
            encoding: None,
        }
    }
}

/// Source of tags
pub trait DxfStreamReader {
    /// Read the next tag, `None` at the end of the stream
    fn read_tag(&mut self) -> Result<Option<Tag>>;

    /// Switch the decoding of string values, for files written in a code page
    fn set_encoding(&mut self, encoding: &'static Encoding);

    fn dialect(&self) -> Dialect;
}

/// Tag stream with one tag of lookahead.
///
/// Comments (999) are dropped here so the framer never sees them.
pub struct TagStream {
    reader: Box<dyn DxfStreamReader>,
    peeked: Option<Tag>,
    last_position: Position,
}

impl TagStream {
    pub fn new(reader: Box<dyn DxfStreamReader>) -> Self {
        TagStream {
            reader,
            peeked: None,
            last_position: Position::default(),
        }
    }

    /// Detect the dialect of `source` and open the matching reader
    pub fn open<R: Read + 'static>(mut source: R, options: LexerOptions) -> Result<Self> {
        let mut prefix = Vec::with_capacity(BINARY_SENTINEL.len());
        (&mut source)
            .take(BINARY_SENTINEL.len() as u64)
            .read_to_end(&mut prefix)?;

        let reader: Box<dyn DxfStreamReader> = if prefix == BINARY_SENTINEL {
            tracing::debug!("binary DXF sentinel found");
            Box::new(DxfBinaryReader::new(
                BufReader::new(source),
                BINARY_SENTINEL.len() as u64,
                options,
            )?)
        } else {
            Box::new(DxfTextReader::new(
                BufReader::new(Cursor::new(prefix).chain(source)),
                options,
            ))
        };
        Ok(TagStream::new(reader))
    }

    pub fn dialect(&self) -> Dialect {
        self.reader.dialect()
    }

    pub fn set_encoding(&mut self, encoding: &'static Encoding) {
        self.reader.set_encoding(encoding);
    }

    pub fn read(&mut self) -> Result<Option<Tag>> {
        if let Some(tag) = self.peeked.take() {
            return Ok(Some(tag));
        }
        loop {
            match self.reader.read_tag()? {
                Some(tag) if tag.code == 999 => {
                    tracing::trace!(comment = tag.as_str(), "skipping comment");
                }
                Some(tag) => {
                    self.last_position = tag.position;
                    return Ok(Some(tag));
                }
                None => return Ok(None),
            }
        }
    }

    pub fn peek(&mut self) -> Result<Option<&Tag>> {
        if self.peeked.is_none() {
            self.peeked = self.read()?;
        }
        Ok(self.peeked.as_ref())
    }

    pub fn push_back(&mut self, tag: Tag) {
        self.peeked = Some(tag);
    }

    /// Position of the last tag handed out, used for end-of-stream errors
    pub fn last_position(&self) -> Position {
        self.last_position
    }
}

impl Iterator for TagStream {
    type Item = Result<Tag>;

    fn next(&mut self) -> Option<Self::Item> {
        self.read().transpose()
    }
}

/// Decode string bytes: UTF-8 first, then the code page, then Latin-1
pub(crate) fn decode_bytes(bytes: &[u8], encoding: Option<&'static Encoding>) -> String {
    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => match encoding {
            Some(enc) => enc.decode(bytes).0.into_owned(),
            None => bytes.iter().map(|&b| b as char).collect(),
        },
    }
}

/// Undo the caret escapes of control characters (`^J`, `^M`, ...) and `^ `
pub(crate) fn decode_carets(value: &str) -> String {
    if !value.contains('^') {
        return value.to_string();
    }
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '^' {
            out.push(c);
            continue;
        }
        match chars.peek().copied() {
            Some(' ') => {
                chars.next();
                out.push('^');
            }
            Some(n @ '@'..='_') => {
                chars.next();
                out.push(((n as u8) - b'@') as char);
            }
            _ => out.push('^'),
        }
    }
    out
}

/// Escape control characters and carets for the text dialect
pub(crate) fn encode_carets(value: &str) -> String {
    if !value.chars().any(|c| c == '^' || (c as u32) < 0x20) {
        return value.to_string();
    }
    let mut out = String::with_capacity(value.len() + 4);
    for c in value.chars() {
        match c {
            '^' => out.push_str("^ "),
            c if (c as u32) < 0x20 => {
                out.push('^');
                out.push(((c as u8) + b'@') as char);
            }
            c => out.push(c),
        }
    }
    out
}

/// Replace `\U+XXXX` sequences used by code page files for characters the
/// code page cannot represent
pub(crate) fn decode_unicode_escapes(value: &str) -> String {
    if !value.contains("\\U+") {
        return value.to_string();
    }
    let mut out = String::with_capacity(value.len());
    let mut rest = value;
    while let Some(index) = rest.find("\\U+") {
        out.push_str(&rest[..index]);
        let hex = rest.get(index + 3..index + 7);
        match hex
            .and_then(|h| u32::from_str_radix(h, 16).ok())
            .and_then(char::from_u32)
        {
            Some(c) => {
                out.push(c);
                rest = &rest[index + 7..];
            }
            None => {
                out.push_str("\\U+");
                rest = &rest[index + 3..];
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::dxf::DxfValue;

    #[test]
    fn test_open_detects_text() {
        let data = b"  0\nSECTION\n  2\nHEADER\n".to_vec();
        let mut stream = TagStream::open(Cursor::new(data), LexerOptions::default()).unwrap();
        assert_eq!(stream.dialect(), Dialect::Text);
        let first = stream.read().unwrap().unwrap();
        assert!(first.is_start("SECTION"));
        assert_eq!(stream.peek().unwrap().map(|t| t.code), Some(2));
        assert_eq!(stream.read().unwrap().unwrap().as_str(), "HEADER");
        assert!(stream.read().unwrap().is_none());
    }

    #[test]
    fn test_comments_are_skipped() {
        let data = b"999\nwritten by hand\n  0\nEOF\n".to_vec();
        let stream = TagStream::open(Cursor::new(data), LexerOptions::default()).unwrap();
        let tags: Vec<Tag> = stream.collect::<Result<_>>().unwrap();
        assert_eq!(tags.len(), 1);
        assert_eq!(tags[0].value, DxfValue::Str("EOF".into()));
    }

    #[test]
    fn test_open_detects_binary() {
        let mut data = BINARY_SENTINEL.to_vec();
        data.extend_from_slice(&[0, 0]);
        data.extend_from_slice(b"EOF\0");
        let mut stream = TagStream::open(Cursor::new(data), LexerOptions::default()).unwrap();
        assert_eq!(stream.dialect(), Dialect::Binary);
        assert!(stream.read().unwrap().unwrap().is_start("EOF"));
    }

    #[test]
    fn test_caret_escapes() {
        assert_eq!(decode_carets("Line1^JLine2^MLine3"), "Line1\nLine2\rLine3");
        assert_eq!(decode_carets("a^ b"), "a^b");
        assert_eq!(decode_carets("^"), "^");
        let original = "tab\there ^ caret\nnewline";
        assert_eq!(decode_carets(&encode_carets(original)), original);
    }

    #[test]
    fn test_unicode_escapes() {
        assert_eq!(decode_unicode_escapes("\\U+00E9t\\U+00E9"), "été");
        assert_eq!(decode_unicode_escapes("\\U+ZZ"), "\\U+ZZ");
    }

    #[test]
    fn test_decode_bytes_falls_back() {
        assert_eq!(decode_bytes(b"plain", None), "plain");
        assert_eq!(decode_bytes(&[0x63, 0x61, 0x66, 0xE9], None), "caf\u{e9}");
        assert_eq!(
            decode_bytes(&[0xC0], Some(encoding_rs::WINDOWS_1251)),
            "\u{410}"
        );
    }
}
