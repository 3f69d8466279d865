//! MLineStyle object - multiline style definition

use bitflags::bitflags;

use crate::types::{Color, Handle};
use crate::xdata::ExtendedData;

bitflags! {
    /// Multiline style flags (70)
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct MLineStyleFlags: i16 {
        const FILL_ON = 1;
        const DISPLAY_JOINTS = 2;
        const START_SQUARE_CAP = 16;
        const START_INNER_ARCS_CAP = 32;
        const START_ROUND_CAP = 64;
        const END_SQUARE_CAP = 256;
        const END_INNER_ARCS_CAP = 512;
        const END_ROUND_CAP = 1024;
    }
}

/// One line of a multiline
#[derive(Debug, Clone, PartialEq)]
pub struct MLineStyleElement {
    /// Offset from the center line (49)
    pub offset: f64,
    /// Color (62)
    pub color: Color,
    /// Line type name (6)
    pub linetype: String,
}

impl MLineStyleElement {
    pub fn new(offset: f64) -> Self {
        MLineStyleElement {
            offset,
            color: Color::ByLayer,
            linetype: "BYLAYER".to_string(),
        }
    }

    pub fn with_color(offset: f64, color: Color) -> Self {
        MLineStyleElement {
            color,
            ..Self::new(offset)
        }
    }
}

/// Multiline style
///
/// Element count is implied by `elements` and written as group code 71.
/// Cap angles are in degrees.
#[derive(Debug, Clone, PartialEq)]
pub struct MLineStyle {
    pub handle: Handle,
    pub owner: Handle,
    pub reactors: Vec<Handle>,
    pub xdictionary: Handle,
    pub extended_data: ExtendedData,
    /// Name (2)
    pub name: String,
    /// Flags (70)
    pub flags: MLineStyleFlags,
    /// Description (3)
    pub description: String,
    /// Fill color (62)
    pub fill_color: Color,
    /// Start cap angle (51)
    pub start_angle: f64,
    /// End cap angle (52)
    pub end_angle: f64,
    pub elements: Vec<MLineStyleElement>,
}

impl MLineStyle {
    pub const DEFAULT_NAME: &'static str = "Standard";

    pub fn new(name: impl Into<String>) -> Self {
        MLineStyle {
            handle: Handle::NULL,
            owner: Handle::NULL,
            reactors: Vec::new(),
            xdictionary: Handle::NULL,
            extended_data: ExtendedData::new(),
            name: name.into(),
            flags: MLineStyleFlags::empty(),
            description: String::new(),
            fill_color: Color::ByLayer,
            start_angle: 90.0,
            end_angle: 90.0,
            elements: Vec::new(),
        }
    }

    /// The "Standard" style: two elements at +/-0.5
    pub fn standard() -> Self {
        let mut style = Self::new(Self::DEFAULT_NAME);
        style.elements.push(MLineStyleElement::with_color(0.5, Color::ByLayer));
        style.elements.push(MLineStyleElement::with_color(-0.5, Color::ByLayer));
        style
    }

    /// Distance between the outermost elements
    pub fn width(&self) -> f64 {
        let offsets = self.elements.iter().map(|e| e.offset);
        let max = offsets.clone().fold(f64::NEG_INFINITY, f64::max);
        let min = offsets.fold(f64::INFINITY, f64::min);
        if self.elements.is_empty() {
            0.0
        } else {
            max - min
        }
    }
}

crate::impl_cad_object!(MLineStyle);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_style() {
        let style = MLineStyle::standard();
        assert_eq!(style.name, "Standard");
        assert_eq!(style.elements.len(), 2);
        assert_eq!(style.width(), 1.0);
        assert_eq!(style.start_angle, 90.0);
    }

    #[test]
    fn test_empty_style_has_no_width() {
        assert_eq!(MLineStyle::new("Empty").width(), 0.0);
    }

    #[test]
    fn test_flags_bits() {
        let flags = MLineStyleFlags::FILL_ON | MLineStyleFlags::END_ROUND_CAP;
        assert_eq!(flags.bits(), 1025);
        assert_eq!(MLineStyleFlags::from_bits_truncate(1025), flags);
    }
}
