//! Line weights (group code 370)

use std::fmt;

/// Line weight in hundredths of a millimeter, or one of the inheritance
/// sentinels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LineWeight {
    /// Use the layer's line weight (-1)
    #[default]
    ByLayer,
    /// Use the block's line weight (-2)
    ByBlock,
    /// Application default weight (-3)
    Default,
    /// Explicit weight in 1/100 mm
    Value(i16),
}

/// The weights AutoCAD accepts, in 1/100 mm
pub const STANDARD_WEIGHTS: [i16; 24] = [
    0, 5, 9, 13, 15, 18, 20, 25, 30, 35, 40, 50, 53, 60, 70, 80, 90, 100, 106, 120, 140, 158, 200,
    211,
];

impl LineWeight {
    pub fn from_value(value: i16) -> Self {
        match value {
            -1 => LineWeight::ByLayer,
            -2 => LineWeight::ByBlock,
            -3 => LineWeight::Default,
            v => LineWeight::Value(v),
        }
    }

    /// Raw DXF value
    pub fn value(&self) -> i16 {
        match self {
            LineWeight::ByLayer => -1,
            LineWeight::ByBlock => -2,
            LineWeight::Default => -3,
            LineWeight::Value(v) => *v,
        }
    }

    /// True for sentinels and for the fixed set of standard weights
    pub fn is_standard(&self) -> bool {
        match self {
            LineWeight::Value(v) => STANDARD_WEIGHTS.contains(v),
            _ => true,
        }
    }

    pub fn millimeters(&self) -> Option<f64> {
        match self {
            LineWeight::Value(v) => Some(*v as f64 / 100.0),
            _ => None,
        }
    }
}

impl fmt::Display for LineWeight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LineWeight::ByLayer => write!(f, "ByLayer"),
            LineWeight::ByBlock => write!(f, "ByBlock"),
            LineWeight::Default => write!(f, "Default"),
            LineWeight::Value(v) => write!(f, "{:.2}mm", *v as f64 / 100.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentinels_roundtrip() {
        for raw in [-1, -2, -3, 0, 25, 211] {
            assert_eq!(LineWeight::from_value(raw).value(), raw);
        }
    }

    #[test]
    fn test_standard_weights() {
        assert!(LineWeight::Value(25).is_standard());
        assert!(!LineWeight::Value(26).is_standard());
        assert!(LineWeight::ByBlock.is_standard());
    }
}
