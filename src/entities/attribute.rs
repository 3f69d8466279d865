//! Block attributes: definitions (ATTDEF) and instances (ATTRIB)

use std::fmt;

use bitflags::bitflags;

use super::{Entity, EntityCommon, Text};

bitflags! {
    /// Attribute flags (group code 70)
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct AttributeFlags: i16 {
        const INVISIBLE = 1;
        const CONSTANT = 2;
        /// Verification required on input
        const VERIFY = 4;
        /// Preset, no prompt on insertion
        const PRESET = 8;
    }
}

/// Value of an attribute.
///
/// DXF stores the value as text; it is classified as an integer, then a
/// real, falling back to plain text.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    Text(String),
    Real(f64),
    Integer(i32),
}

impl AttributeValue {
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.len() != raw.len() {
            return AttributeValue::Text(raw.to_string());
        }
        if let Ok(i) = trimmed.parse::<i32>() {
            return AttributeValue::Integer(i);
        }
        match trimmed.parse::<f64>() {
            Ok(f) if f.is_finite() => AttributeValue::Real(f),
            _ => AttributeValue::Text(raw.to_string()),
        }
    }
}

impl Default for AttributeValue {
    fn default() -> Self {
        AttributeValue::Text(String::new())
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeValue::Text(s) => f.write_str(s),
            AttributeValue::Real(r) => write!(f, "{}", r),
            AttributeValue::Integer(i) => write!(f, "{}", i),
        }
    }
}

macro_rules! attribute_entity {
    ($ty:ident, $name:expr) => {
        impl $ty {
            /// Raw value text (group code 1)
            pub fn raw_value(&self) -> &str {
                &self.text.value
            }

            pub fn value(&self) -> AttributeValue {
                AttributeValue::parse(&self.text.value)
            }

            pub fn set_value(&mut self, value: AttributeValue) {
                self.text.value = value.to_string();
            }

            pub fn is_invisible(&self) -> bool {
                self.flags.contains(AttributeFlags::INVISIBLE)
            }
        }

        impl Entity for $ty {
            fn common(&self) -> &EntityCommon {
                &self.text.common
            }
            fn common_mut(&mut self) -> &mut EntityCommon {
                &mut self.text.common
            }
            fn dxf_name(&self) -> &str {
                $name
            }
        }

        crate::impl_cad_object!($ty, text.common);
    };
}

/// Attribute template stored in a block definition
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AttributeDefinition {
    /// Text properties shared with TEXT (`AcDbText`)
    pub text: Text,
    /// Attribute version (280)
    pub version: i16,
    /// Prompt shown on insertion (3)
    pub prompt: String,
    /// Tag (2)
    pub tag: String,
    pub flags: AttributeFlags,
    /// Field length (73)
    pub field_length: i16,
    /// Lock position flag (280, second occurrence)
    pub lock_position: bool,
}

impl AttributeDefinition {
    pub fn new(tag: impl Into<String>, prompt: impl Into<String>, default: AttributeValue) -> Self {
        let mut def = AttributeDefinition {
            tag: tag.into(),
            prompt: prompt.into(),
            ..Default::default()
        };
        def.set_value(default);
        def
    }

    /// Attribute instance carrying this definition's default
    pub fn instantiate(&self) -> Attribute {
        Attribute {
            text: self.text.clone(),
            version: self.version,
            tag: self.tag.clone(),
            flags: self.flags,
            field_length: self.field_length,
            lock_position: self.lock_position,
        }
    }
}

attribute_entity!(AttributeDefinition, "ATTDEF");

/// Attribute instance owned by an INSERT
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Attribute {
    pub text: Text,
    /// Attribute version (280)
    pub version: i16,
    /// Tag (2)
    pub tag: String,
    pub flags: AttributeFlags,
    /// Field length (73)
    pub field_length: i16,
    /// Lock position flag (280, second occurrence)
    pub lock_position: bool,
}

impl Attribute {
    pub fn new(tag: impl Into<String>, value: AttributeValue) -> Self {
        let mut attribute = Attribute {
            tag: tag.into(),
            ..Default::default()
        };
        attribute.set_value(value);
        attribute
    }
}

attribute_entity!(Attribute, "ATTRIB");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_classification() {
        assert_eq!(AttributeValue::parse("42"), AttributeValue::Integer(42));
        assert_eq!(AttributeValue::parse("-2.5"), AttributeValue::Real(-2.5));
        assert_eq!(AttributeValue::parse("1e3"), AttributeValue::Real(1000.0));
        assert_eq!(
            AttributeValue::parse("DOOR-1"),
            AttributeValue::Text("DOOR-1".into())
        );
        assert_eq!(AttributeValue::parse(" 7"), AttributeValue::Text(" 7".into()));
        assert_eq!(AttributeValue::parse("inf"), AttributeValue::Text("inf".into()));
    }

    #[test]
    fn test_instantiate_copies_default() {
        let def = AttributeDefinition::new("PART", "Part number", AttributeValue::Integer(7));
        let attribute = def.instantiate();
        assert_eq!(attribute.tag, "PART");
        assert_eq!(attribute.value(), AttributeValue::Integer(7));
        assert_eq!(attribute.dxf_name(), "ATTRIB");
    }
}
