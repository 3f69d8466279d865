//! Entity and layer colors

use std::fmt;

/// A DXF color
///
/// Entities never carry "no color": inheritance is expressed with the
/// `ByLayer` / `ByBlock` sentinels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Color {
    /// Color by layer (ACI 256)
    #[default]
    ByLayer,
    /// Color by block (ACI 0)
    ByBlock,
    /// AutoCAD Color Index (1-255)
    Index(u8),
    /// True color (group code 420)
    Rgb { r: u8, g: u8, b: u8 },
}

impl Color {
    pub const RED: Color = Color::Index(1);
    pub const YELLOW: Color = Color::Index(2);
    pub const GREEN: Color = Color::Index(3);
    pub const CYAN: Color = Color::Index(4);
    pub const BLUE: Color = Color::Index(5);
    pub const MAGENTA: Color = Color::Index(6);
    pub const WHITE: Color = Color::Index(7);

    /// Create a color from an ACI value (group code 62).
    ///
    /// Negative values are used by layers to flag "off"; the sign is
    /// dropped here and handled by the layer itself.
    pub fn from_index(index: i16) -> Self {
        match index.unsigned_abs() {
            0 => Color::ByBlock,
            256 => Color::ByLayer,
            i @ 1..=255 => Color::Index(i as u8),
            _ => Color::ByLayer,
        }
    }

    pub const fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Color::Rgb { r, g, b }
    }

    /// Decode the packed 24-bit value of group code 420
    pub fn from_true_color(value: i32) -> Self {
        Color::Rgb {
            r: ((value >> 16) & 0xFF) as u8,
            g: ((value >> 8) & 0xFF) as u8,
            b: (value & 0xFF) as u8,
        }
    }

    /// Packed value for group code 420, if this is a true color
    pub fn true_color(&self) -> Option<i32> {
        match self {
            Color::Rgb { r, g, b } => Some(((*r as i32) << 16) | ((*g as i32) << 8) | (*b as i32)),
            _ => None,
        }
    }

    /// Value written to group code 62.
    ///
    /// True colors also need an ACI approximation for readers that ignore 420.
    pub fn aci(&self) -> i16 {
        match self {
            Color::ByBlock => 0,
            Color::ByLayer => 256,
            Color::Index(i) => *i as i16,
            Color::Rgb { r, g, b } => approximate_aci(*r, *g, *b),
        }
    }

    pub fn is_by_layer(&self) -> bool {
        matches!(self, Color::ByLayer)
    }

    pub fn is_by_block(&self) -> bool {
        matches!(self, Color::ByBlock)
    }
}

fn approximate_aci(r: u8, g: u8, b: u8) -> i16 {
    let brightness = (r as u16 + g as u16 + b as u16) / 3;
    if brightness < 32 {
        return 250;
    }
    if brightness > 224 {
        return 7;
    }
    match (r > 128, g > 128, b > 128) {
        (true, false, false) => 1,
        (true, true, false) => 2,
        (false, true, false) => 3,
        (false, true, true) => 4,
        (false, false, true) => 5,
        (true, false, true) => 6,
        _ => 8,
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::ByLayer => write!(f, "ByLayer"),
            Color::ByBlock => write!(f, "ByBlock"),
            Color::Index(i) => write!(f, "Index({})", i),
            Color::Rgb { r, g, b } => write!(f, "RGB({}, {}, {})", r, g, b),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_from_index() {
        assert_eq!(Color::from_index(0), Color::ByBlock);
        assert_eq!(Color::from_index(256), Color::ByLayer);
        assert_eq!(Color::from_index(1), Color::Index(1));
        assert_eq!(Color::from_index(-7), Color::Index(7));
    }

    #[test]
    fn test_true_color_packing() {
        let color = Color::from_rgb(255, 128, 64);
        let packed = color.true_color().unwrap();
        assert_eq!(packed, 0xFF8040);
        assert_eq!(Color::from_true_color(packed), color);
        assert_eq!(Color::RED.true_color(), None);
    }

    #[test]
    fn test_aci_for_sentinels() {
        assert_eq!(Color::ByLayer.aci(), 256);
        assert_eq!(Color::ByBlock.aci(), 0);
        assert_eq!(Color::BLUE.aci(), 5);
        assert_eq!(Color::from_rgb(250, 10, 10).aci(), 1);
    }
}
