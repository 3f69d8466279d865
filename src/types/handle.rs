//! Object handles
//!
//! DXF identifies every object by a hexadecimal handle that is unique within
//! one document. Handles referenced from other objects (owner, reactors,
//! style pointers) are stored with the same type.

use std::fmt;
use std::str::FromStr;

/// A unique identifier for a DXF object
///
/// Handle 0 is reserved and means "no object" (unassigned during parsing,
/// or a null pointer in a reference field).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Handle(u64);

impl Handle {
    /// The null handle
    pub const NULL: Handle = Handle(0);

    /// Create a new handle from a raw value
    #[inline]
    pub const fn new(value: u64) -> Self {
        Handle(value)
    }

    /// Raw value
    #[inline]
    pub const fn value(&self) -> u64 {
        self.0
    }

    #[inline]
    pub const fn is_null(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_valid(&self) -> bool {
        self.0 != 0
    }

    /// Parse the hexadecimal text form used in group code values.
    ///
    /// Surrounding whitespace is ignored; an empty string is the null handle.
    pub fn parse_hex(text: &str) -> Option<Handle> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Some(Handle::NULL);
        }
        u64::from_str_radix(trimmed, 16).ok().map(Handle)
    }

    /// Upper-case hexadecimal form without prefix, as written to DXF
    pub fn to_hex(&self) -> String {
        format!("{:X}", self.0)
    }
}

impl From<u64> for Handle {
    fn from(value: u64) -> Self {
        Handle(value)
    }
}

impl From<Handle> for u64 {
    fn from(handle: Handle) -> Self {
        handle.0
    }
}

impl FromStr for Handle {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        u64::from_str_radix(s.trim(), 16).map(Handle)
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:X}", self.0)
    }
}

impl fmt::UpperHex for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::UpperHex::fmt(&self.0, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_handle() {
        assert!(Handle::NULL.is_null());
        assert!(!Handle::NULL.is_valid());
        assert_eq!(Handle::default(), Handle::NULL);
    }

    #[test]
    fn test_parse_hex() {
        assert_eq!(Handle::parse_hex("1F"), Some(Handle::new(0x1F)));
        assert_eq!(Handle::parse_hex("  abc \r"), Some(Handle::new(0xABC)));
        assert_eq!(Handle::parse_hex(""), Some(Handle::NULL));
        assert_eq!(Handle::parse_hex("XYZ"), None);
    }

    #[test]
    fn test_display_is_bare_hex() {
        let handle = Handle::new(0xABCD);
        assert_eq!(handle.to_string(), "ABCD");
        assert_eq!(handle.to_hex(), "ABCD");
        assert_eq!("abcd".parse::<Handle>().unwrap(), handle);
    }
}
