//! Group code value types and the typed value decoder
//!
//! Every group code has a fixed value type. The text dialect stores all
//! values as lines of text that are parsed according to that type; the
//! binary dialect stores them in native little-endian form.

use std::fmt;

use crate::error::{DxfError, Position, Result};
use crate::types::Handle;

/// Storage type of a group code's value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GroupCodeValueType {
    String,
    Double,
    Int16,
    Int32,
    Int64,
    /// 290-299; one byte in binary files
    Bool,
    /// Hexadecimal handle, written as a string
    Handle,
    /// Hexadecimal chunk in text files, length-prefixed bytes in binary files
    Binary,
    /// 999
    Comment,
    /// Not in the table
    Unknown,
}

impl GroupCodeValueType {
    /// Look up the value type of a group code
    pub fn from_code(code: i32) -> Self {
        use GroupCodeValueType::*;
        match code {
            0..=4 => String,
            5 => Handle,
            6..=9 => String,
            10..=59 => Double,
            60..=79 => Int16,
            90..=99 => Int32,
            100..=102 => String,
            105 => Handle,
            110..=149 => Double,
            160..=169 => Int64,
            170..=179 => Int16,
            210..=239 => Double,
            270..=289 => Int16,
            290..=299 => Bool,
            300..=309 => String,
            310..=319 => Binary,
            320..=369 => Handle,
            370..=389 => Int16,
            390..=399 => Handle,
            400..=409 => Int16,
            410..=419 => String,
            420..=429 => Int32,
            430..=439 => String,
            440..=459 => Int32,
            460..=469 => Double,
            470..=479 => String,
            480..=481 => Handle,
            999 => Comment,
            1000..=1003 => String,
            1004 => Binary,
            1005 => Handle,
            1006..=1009 => String,
            1010..=1059 => Double,
            1060..=1070 => Int16,
            1071 => Int32,
            _ => Unknown,
        }
    }

    /// Byte width of the value in a binary file; `None` for variable-length values
    pub fn binary_width(&self) -> Option<usize> {
        match self {
            GroupCodeValueType::Double | GroupCodeValueType::Int64 => Some(8),
            GroupCodeValueType::Int32 => Some(4),
            GroupCodeValueType::Int16 => Some(2),
            GroupCodeValueType::Bool => Some(1),
            _ => None,
        }
    }
}

/// A decoded group code value
#[derive(Debug, Clone, PartialEq)]
pub enum DxfValue {
    Str(String),
    Double(f64),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    Bool(bool),
    Handle(Handle),
    Binary(Vec<u8>),
    /// Value of a code outside the type table, kept as read
    Unknown(String),
}

impl DxfValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            DxfValue::Str(s) | DxfValue::Unknown(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            DxfValue::Double(v) => Some(v),
            DxfValue::Int16(v) => Some(v as f64),
            DxfValue::Int32(v) => Some(v as f64),
            _ => None,
        }
    }

    pub fn as_i16(&self) -> Option<i16> {
        match *self {
            DxfValue::Int16(v) => Some(v),
            DxfValue::Int32(v) => i16::try_from(v).ok(),
            DxfValue::Int64(v) => i16::try_from(v).ok(),
            DxfValue::Bool(b) => Some(b as i16),
            _ => None,
        }
    }

    pub fn as_i32(&self) -> Option<i32> {
        match *self {
            DxfValue::Int16(v) => Some(v as i32),
            DxfValue::Int32(v) => Some(v),
            DxfValue::Int64(v) => i32::try_from(v).ok(),
            DxfValue::Bool(b) => Some(b as i32),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            DxfValue::Int16(v) => Some(v as i64),
            DxfValue::Int32(v) => Some(v as i64),
            DxfValue::Int64(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match *self {
            DxfValue::Bool(b) => Some(b),
            DxfValue::Int16(v) => Some(v != 0),
            DxfValue::Int32(v) => Some(v != 0),
            _ => None,
        }
    }

    pub fn as_handle(&self) -> Option<Handle> {
        match self {
            DxfValue::Handle(h) => Some(*h),
            DxfValue::Str(s) | DxfValue::Unknown(s) => Handle::parse_hex(s),
            _ => None,
        }
    }

    pub fn as_binary(&self) -> Option<&[u8]> {
        match self {
            DxfValue::Binary(b) => Some(b),
            _ => None,
        }
    }

    /// Text the value is written as in the text dialect
    pub fn to_text(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for DxfValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DxfValue::Str(s) | DxfValue::Unknown(s) => f.write_str(s),
            DxfValue::Double(v) => f.write_str(&format_double(*v)),
            DxfValue::Int16(v) => write!(f, "{}", v),
            DxfValue::Int32(v) => write!(f, "{}", v),
            DxfValue::Int64(v) => write!(f, "{}", v),
            DxfValue::Bool(b) => write!(f, "{}", *b as u8),
            DxfValue::Handle(h) => write!(f, "{:X}", h.value()),
            DxfValue::Binary(bytes) => {
                for b in bytes {
                    write!(f, "{:02X}", b)?;
                }
                Ok(())
            }
        }
    }
}

/// Shortest text that parses back to exactly `value`, always with a decimal point
pub fn format_double(value: f64) -> String {
    if !value.is_finite() {
        return format!("{}", value);
    }
    let text = format!("{:?}", value);
    if text.contains('e') {
        // Debug formatting switches to exponent form outside 1e-5..1e16
        let mantissa_exp: Vec<&str> = text.splitn(2, 'e').collect();
        let mantissa = if mantissa_exp[0].contains('.') {
            mantissa_exp[0].to_string()
        } else {
            format!("{}.0", mantissa_exp[0])
        };
        return format!("{}E{}", mantissa, mantissa_exp.get(1).copied().unwrap_or("0"));
    }
    text
}

/// Decode a text-dialect value line for `code`.
///
/// With `keep_unknown` the values of codes outside the type table are
/// kept as [`DxfValue::Unknown`]; otherwise they are an
/// [`DxfError::UnknownCode`] error.
pub fn decode_text(code: i32, raw: &str, position: Position, keep_unknown: bool) -> Result<DxfValue> {
    let invalid = || DxfError::InvalidValue {
        code,
        value: raw.to_string(),
        position,
    };
    let value = match GroupCodeValueType::from_code(code) {
        GroupCodeValueType::String | GroupCodeValueType::Comment => DxfValue::Str(raw.to_string()),
        GroupCodeValueType::Double => DxfValue::Double(parse_double(raw).ok_or_else(invalid)?),
        GroupCodeValueType::Int16 => DxfValue::Int16(parse_int(raw).and_then(|v| i16::try_from(v).ok()).ok_or_else(invalid)?),
        GroupCodeValueType::Int32 => DxfValue::Int32(parse_int(raw).and_then(|v| i32::try_from(v).ok()).ok_or_else(invalid)?),
        GroupCodeValueType::Int64 => DxfValue::Int64(parse_int(raw).ok_or_else(invalid)?),
        GroupCodeValueType::Bool => DxfValue::Bool(parse_int(raw).ok_or_else(invalid)? != 0),
        GroupCodeValueType::Handle => {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                DxfValue::Handle(Handle::NULL)
            } else {
                DxfValue::Handle(Handle::parse_hex(trimmed).ok_or_else(invalid)?)
            }
        }
        GroupCodeValueType::Binary => DxfValue::Binary(parse_hex_bytes(raw).ok_or_else(invalid)?),
        GroupCodeValueType::Unknown => {
            if !keep_unknown {
                return Err(DxfError::UnknownCode { code, position });
            }
            DxfValue::Unknown(raw.to_string())
        }
    };
    Ok(value)
}

fn parse_double(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    trimmed.parse::<f64>().ok().or_else(|| {
        // Some writers emit a trailing or leading decimal separator only, e.g. "5." or ".5"
        let patched = if trimmed.ends_with('.') {
            format!("{}0", trimmed)
        } else {
            return None;
        };
        patched.parse::<f64>().ok()
    })
}

fn parse_int(raw: &str) -> Option<i64> {
    let trimmed = raw.trim();
    trimmed.parse::<i64>().ok().or_else(|| {
        // Integral values written as reals ("1.0") by some exporters
        let f = trimmed.parse::<f64>().ok()?;
        if f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
            Some(f as i64)
        } else {
            None
        }
    })
}

fn parse_hex_bytes(raw: &str) -> Option<Vec<u8>> {
    let trimmed = raw.trim();
    if trimmed.len() % 2 != 0 {
        return None;
    }
    (0..trimmed.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(trimmed.get(i..i + 2)?, 16).ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(code: i32, raw: &str) -> Result<DxfValue> {
        decode_text(code, raw, Position::text(0, 1), true)
    }

    #[test]
    fn test_code_table_ranges() {
        assert_eq!(GroupCodeValueType::from_code(0), GroupCodeValueType::String);
        assert_eq!(GroupCodeValueType::from_code(5), GroupCodeValueType::Handle);
        assert_eq!(GroupCodeValueType::from_code(39), GroupCodeValueType::Double);
        assert_eq!(GroupCodeValueType::from_code(62), GroupCodeValueType::Int16);
        assert_eq!(GroupCodeValueType::from_code(90), GroupCodeValueType::Int32);
        assert_eq!(GroupCodeValueType::from_code(160), GroupCodeValueType::Int64);
        assert_eq!(GroupCodeValueType::from_code(281), GroupCodeValueType::Int16);
        assert_eq!(GroupCodeValueType::from_code(290), GroupCodeValueType::Bool);
        assert_eq!(GroupCodeValueType::from_code(310), GroupCodeValueType::Binary);
        assert_eq!(GroupCodeValueType::from_code(330), GroupCodeValueType::Handle);
        assert_eq!(GroupCodeValueType::from_code(1071), GroupCodeValueType::Int32);
        assert_eq!(GroupCodeValueType::from_code(85), GroupCodeValueType::Unknown);
    }

    #[test]
    fn test_decode_typed_values() {
        assert_eq!(decode(10, " 1.5").unwrap(), DxfValue::Double(1.5));
        assert_eq!(decode(70, "  6").unwrap(), DxfValue::Int16(6));
        assert_eq!(decode(5, "1F").unwrap(), DxfValue::Handle(Handle::new(0x1F)));
        assert_eq!(decode(290, "1").unwrap(), DxfValue::Bool(true));
        assert_eq!(decode(310, "00FF10").unwrap(), DxfValue::Binary(vec![0, 0xFF, 0x10]));
        assert_eq!(decode(1, "  keep spaces ").unwrap(), DxfValue::Str("  keep spaces ".into()));
    }

    #[test]
    fn test_invalid_value_reports_code() {
        let err = decode(40, "abc").unwrap_err();
        assert!(matches!(err, DxfError::InvalidValue { code: 40, .. }));
        assert!(decode(70, "70000").is_err());
        assert!(decode(310, "ABC").is_err());
    }

    #[test]
    fn test_unknown_code_policy() {
        assert_eq!(decode(85, "x").unwrap(), DxfValue::Unknown("x".into()));
        let err = decode_text(85, "x", Position::text(0, 1), false).unwrap_err();
        assert!(matches!(err, DxfError::UnknownCode { code: 85, .. }));
    }

    #[test]
    fn test_format_double_round_trips() {
        for v in [0.0, 1.0, -2.5, 0.1, 1e-7, 123456789.125, 1e20, f64::MIN_POSITIVE] {
            let text = format_double(v);
            assert!(text.contains('.'), "{}", text);
            assert_eq!(text.parse::<f64>().unwrap(), v);
        }
        assert_eq!(format_double(10.0), "10.0");
    }
}
