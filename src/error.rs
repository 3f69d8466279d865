//! Error types for the DXF codec
//!
//! Lexical and framing errors are always fatal and carry the stream
//! position. Validation and reference errors are recoverable in lenient
//! mode; the reader turns them into notifications instead of returning them.

use std::fmt;
use std::io;
use thiserror::Error;

use crate::types::Handle;

/// Location of a tag in the input stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    /// Byte offset of the first byte of the group code
    pub offset: u64,
    /// 1-based line number of the group code line (ASCII dialect only)
    pub line: Option<u64>,
}

impl Position {
    pub const fn binary(offset: u64) -> Self {
        Position { offset, line: None }
    }

    pub const fn text(offset: u64, line: u64) -> Self {
        Position {
            offset,
            line: Some(line),
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line {
            Some(line) => write!(f, "line {} (byte {})", line, self.offset),
            None => write!(f, "byte {}", self.offset),
        }
    }
}

/// Rejected value passed to a validating setter
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{field}: {reason}")]
pub struct ArgumentError {
    /// Name of the property that rejected the value
    pub field: &'static str,
    /// Human-readable reason
    pub reason: String,
}

impl ArgumentError {
    pub fn new(field: &'static str, reason: impl Into<String>) -> Self {
        ArgumentError {
            field,
            reason: reason.into(),
        }
    }
}

/// Main error type
#[derive(Debug, Error)]
pub enum DxfError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// A group code line could not be parsed, or a value is missing
    #[error("Malformed tag at {position}: {message}")]
    MalformedTag { position: Position, message: String },

    /// A value does not parse as the type its group code declares
    #[error("Invalid value {value:?} for group code {code} at {position}")]
    InvalidValue {
        code: i32,
        value: String,
        position: Position,
    },

    /// A group code outside the type table (strict mode only)
    #[error("Unknown group code {code} at {position}")]
    UnknownCode { code: i32, position: Position },

    /// Sections nested or closed illegally
    #[error("Unexpected {found} at {position} (current section: {section})")]
    UnexpectedSection {
        section: String,
        found: String,
        position: Position,
    },

    /// Stream ended in the middle of a record
    #[error("Unterminated {entity} starting at {position}")]
    UnterminatedEntity { entity: String, position: Position },

    /// A field value was rejected by the entity's validation
    #[error("Invalid {entity} (group code {code}): {source}")]
    EntityValidation {
        entity: String,
        code: i32,
        #[source]
        source: ArgumentError,
    },

    /// A stored reference has no definition in the document
    #[error("Dangling {kind} reference '{reference}' from {owner}")]
    DanglingReference {
        kind: &'static str,
        reference: String,
        owner: Handle,
    },

    /// Writer found a reference to a table entry or object that is not in this document
    #[error("{owner} references missing {kind} '{reference}'")]
    MissingReference {
        kind: &'static str,
        reference: String,
        owner: Handle,
    },

    #[error("Unsupported DXF version: {0}")]
    UnsupportedVersion(String),

    #[error("Encoding error: {0}")]
    Encoding(String),

    #[error("Duplicate {kind} '{name}'")]
    DuplicateEntry { kind: &'static str, name: String },

    /// XData for an application missing from the APPID table
    #[error("Application '{0}' is not registered")]
    UnregisteredApplication(String),

    #[error("Object not found: handle {0}")]
    ObjectNotFound(Handle),

    #[error("{0}")]
    Custom(String),
}

impl DxfError {
    /// Whether lenient mode may recover from this error
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            DxfError::EntityValidation { .. }
                | DxfError::DanglingReference { .. }
                | DxfError::UnterminatedEntity { .. }
                | DxfError::InvalidValue { .. }
                | DxfError::UnknownCode { .. }
        )
    }

    /// Stream position, for errors raised by the lexer or framer
    pub fn position(&self) -> Option<Position> {
        match self {
            DxfError::MalformedTag { position, .. }
            | DxfError::InvalidValue { position, .. }
            | DxfError::UnknownCode { position, .. }
            | DxfError::UnexpectedSection { position, .. }
            | DxfError::UnterminatedEntity { position, .. } => Some(*position),
            _ => None,
        }
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, DxfError>;

impl From<String> for DxfError {
    fn from(s: String) -> Self {
        DxfError::Custom(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_tag_mentions_line() {
        let err = DxfError::MalformedTag {
            position: Position::text(120, 7),
            message: "bad code".into(),
        };
        let text = err.to_string();
        assert!(text.contains("line 7"));
        assert!(text.contains("byte 120"));
        assert_eq!(err.position(), Some(Position::text(120, 7)));
    }

    #[test]
    fn test_entity_validation_display() {
        let err = DxfError::EntityValidation {
            entity: "ARC".into(),
            code: 40,
            source: ArgumentError::new("radius", "must be greater than zero"),
        };
        assert_eq!(
            err.to_string(),
            "Invalid ARC (group code 40): radius: must be greater than zero"
        );
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let dxf_err: DxfError = io_err.into();
        assert!(matches!(dxf_err, DxfError::Io(_)));
        assert!(!dxf_err.is_recoverable());
    }
}
