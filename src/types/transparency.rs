//! Entity transparency (group code 440)

use std::fmt;

const BY_BLOCK_FLAG: i32 = 0x0100_0000;
const VALUE_FLAG: i32 = 0x0200_0000;

/// Entity transparency
///
/// The explicit form keeps the raw alpha byte stored in the file
/// (255 = opaque, 0 = fully transparent) so values survive a round trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Transparency {
    /// Inherit from the layer (group code 440 absent)
    #[default]
    ByLayer,
    /// Inherit from the block
    ByBlock,
    /// Explicit alpha
    Alpha(u8),
}

impl Transparency {
    pub const OPAQUE: Transparency = Transparency::Alpha(255);

    /// Build from a transparency percentage (0 = opaque, 90 = maximum)
    pub fn from_percent(percent: u8) -> Self {
        let pct = percent.min(90) as u32;
        Transparency::Alpha((255 - (pct * 255 + 50) / 100) as u8)
    }

    /// Transparency percentage for explicit values
    pub fn percent(&self) -> Option<u8> {
        match self {
            Transparency::Alpha(a) => Some(((255 - *a as u32) * 100 / 255) as u8),
            _ => None,
        }
    }

    /// Decode the packed value of group code 440
    pub fn from_raw(value: i32) -> Self {
        if value & VALUE_FLAG != 0 {
            Transparency::Alpha((value & 0xFF) as u8)
        } else if value & BY_BLOCK_FLAG != 0 {
            Transparency::ByBlock
        } else {
            Transparency::ByLayer
        }
    }

    /// Packed value for group code 440; `None` means the code is omitted
    pub fn to_raw(&self) -> Option<i32> {
        match self {
            Transparency::ByLayer => None,
            Transparency::ByBlock => Some(BY_BLOCK_FLAG),
            Transparency::Alpha(a) => Some(VALUE_FLAG | *a as i32),
        }
    }
}

impl fmt::Display for Transparency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transparency::ByLayer => write!(f, "ByLayer"),
            Transparency::ByBlock => write!(f, "ByBlock"),
            Transparency::Alpha(a) => write!(f, "Alpha({})", a),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_roundtrip() {
        for t in [Transparency::ByBlock, Transparency::Alpha(0), Transparency::Alpha(127)] {
            assert_eq!(Transparency::from_raw(t.to_raw().unwrap()), t);
        }
        assert_eq!(Transparency::ByLayer.to_raw(), None);
    }

    #[test]
    fn test_percent() {
        assert_eq!(Transparency::from_percent(0), Transparency::OPAQUE);
        assert_eq!(Transparency::from_percent(50).percent(), Some(50));
    }
}
