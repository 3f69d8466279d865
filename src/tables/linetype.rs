//! Line type table entry

use once_cell::sync::Lazy;

use super::TableEntry;
use crate::types::Handle;
use crate::xdata::ExtendedData;

/// One dash, gap, dot or embedded shape/text of a line type pattern
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LineTypeElement {
    /// Dash length (49): positive dash, negative gap, zero dot
    pub length: f64,
    /// Complex element type (74): 2 text, 4 shape
    pub complex_type: i16,
    /// Shape number or text index (75)
    pub shape_number: i16,
    /// Text style holding the shape or font (340)
    pub style: Handle,
    /// Scale (46)
    pub scale: f64,
    /// Rotation in degrees (50)
    pub rotation: f64,
    /// X and Y offsets (44, 45)
    pub offset: (f64, f64),
    /// Text string (9)
    pub text: String,
}

impl LineTypeElement {
    pub fn dash(length: f64) -> Self {
        LineTypeElement {
            length: length.abs(),
            ..Default::default()
        }
    }

    pub fn space(length: f64) -> Self {
        LineTypeElement {
            length: -length.abs(),
            ..Default::default()
        }
    }

    pub fn is_complex(&self) -> bool {
        self.complex_type != 0
    }
}

static BY_LAYER: Lazy<LineType> = Lazy::new(|| LineType::new("ByLayer"));

/// A line type table entry
#[derive(Debug, Clone, PartialEq)]
pub struct LineType {
    pub handle: Handle,
    pub owner: Handle,
    pub reactors: Vec<Handle>,
    pub xdictionary: Handle,
    pub extended_data: ExtendedData,
    /// Name (2)
    pub name: String,
    /// Standard flags (70)
    pub flags: i16,
    /// Description (3)
    pub description: String,
    pub elements: Vec<LineTypeElement>,
}

impl LineType {
    pub fn new(name: impl Into<String>) -> Self {
        LineType {
            handle: Handle::NULL,
            owner: Handle::NULL,
            reactors: Vec::new(),
            xdictionary: Handle::NULL,
            extended_data: ExtendedData::new(),
            name: name.into(),
            flags: 0,
            description: String::new(),
            elements: Vec::new(),
        }
    }

    pub fn continuous() -> Self {
        LineType {
            description: "Solid line".to_string(),
            ..Self::new("Continuous")
        }
    }

    /// Shared `ByLayer` entry, substituted for dangling line type references
    pub fn by_layer() -> &'static LineType {
        &BY_LAYER
    }

    /// Total pattern length (40)
    pub fn pattern_length(&self) -> f64 {
        self.elements.iter().map(|e| e.length.abs()).sum()
    }
}

impl TableEntry for LineType {
    const TABLE_NAME: &'static str = "LTYPE";

    fn name(&self) -> &str {
        &self.name
    }

    fn set_name(&mut self, name: String) {
        self.name = name;
    }

    fn is_standard(&self) -> bool {
        ["ByLayer", "ByBlock", "Continuous"]
            .iter()
            .any(|n| n.eq_ignore_ascii_case(&self.name))
    }
}

crate::impl_cad_object!(LineType);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pattern_length() {
        let mut lt = LineType::new("DASHED");
        lt.elements.push(LineTypeElement::dash(0.5));
        lt.elements.push(LineTypeElement::space(0.25));
        assert_eq!(lt.pattern_length(), 0.75);
        assert!(LineType::by_layer().is_standard());
    }
}
