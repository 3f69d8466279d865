//! Multi-line text entity

use super::EntityCommon;
use crate::error::ArgumentError;
use crate::types::{normalize_angle, Vector3};

/// Attachment point (group code 71)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AttachmentPoint {
    #[default]
    TopLeft,
    TopCenter,
    TopRight,
    MiddleLeft,
    MiddleCenter,
    MiddleRight,
    BottomLeft,
    BottomCenter,
    BottomRight,
}

impl AttachmentPoint {
    pub fn from_value(value: i16) -> Self {
        match value {
            2 => AttachmentPoint::TopCenter,
            3 => AttachmentPoint::TopRight,
            4 => AttachmentPoint::MiddleLeft,
            5 => AttachmentPoint::MiddleCenter,
            6 => AttachmentPoint::MiddleRight,
            7 => AttachmentPoint::BottomLeft,
            8 => AttachmentPoint::BottomCenter,
            9 => AttachmentPoint::BottomRight,
            _ => AttachmentPoint::TopLeft,
        }
    }

    pub fn value(&self) -> i16 {
        *self as i16 + 1
    }
}

/// Drawing direction (group code 72)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DrawingDirection {
    #[default]
    LeftToRight,
    TopToBottom,
    ByStyle,
}

impl DrawingDirection {
    pub fn from_value(value: i16) -> Self {
        match value {
            3 => DrawingDirection::TopToBottom,
            5 => DrawingDirection::ByStyle,
            _ => DrawingDirection::LeftToRight,
        }
    }

    pub fn value(&self) -> i16 {
        match self {
            DrawingDirection::LeftToRight => 1,
            DrawingDirection::TopToBottom => 3,
            DrawingDirection::ByStyle => 5,
        }
    }
}

/// Line spacing style (group code 73)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineSpacingStyle {
    /// Taller characters override
    #[default]
    AtLeast,
    /// Taller characters are ignored
    Exact,
}

impl LineSpacingStyle {
    pub fn from_value(value: i16) -> Self {
        if value == 2 {
            LineSpacingStyle::Exact
        } else {
            LineSpacingStyle::AtLeast
        }
    }

    pub fn value(&self) -> i16 {
        match self {
            LineSpacingStyle::AtLeast => 1,
            LineSpacingStyle::Exact => 2,
        }
    }
}

/// Smallest accepted line spacing factor
pub const MIN_LINE_SPACING: f64 = 0.25;
/// Largest accepted line spacing factor
pub const MAX_LINE_SPACING: f64 = 4.0;

/// A multi-line text entity
#[derive(Debug, Clone, PartialEq)]
pub struct MText {
    pub common: EntityCommon,
    /// Text content with inline formatting codes (1 and 3)
    pub value: String,
    /// Insertion point (10)
    pub insertion_point: Vector3,
    /// Reference rectangle width (41)
    pub rectangle_width: f64,
    /// Reference rectangle height (46)
    pub rectangle_height: f64,
    /// Text style name (7)
    pub style: String,
    pub attachment_point: AttachmentPoint,
    pub drawing_direction: DrawingDirection,
    pub line_spacing_style: LineSpacingStyle,
    height: f64,
    rotation: f64,
    line_spacing_factor: f64,
}

impl MText {
    pub fn new() -> Self {
        MText {
            common: EntityCommon::new(),
            value: String::new(),
            insertion_point: Vector3::ZERO,
            rectangle_width: 0.0,
            rectangle_height: 0.0,
            style: "Standard".to_string(),
            attachment_point: AttachmentPoint::TopLeft,
            drawing_direction: DrawingDirection::LeftToRight,
            line_spacing_style: LineSpacingStyle::AtLeast,
            height: 1.0,
            rotation: 0.0,
            line_spacing_factor: 1.0,
        }
    }

    pub fn with_value(value: impl Into<String>, insertion_point: Vector3) -> Self {
        MText {
            value: value.into(),
            insertion_point,
            ..Self::new()
        }
    }

    /// Nominal text height (40)
    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn set_height(&mut self, height: f64) -> Result<(), ArgumentError> {
        if !(height.is_finite() && height > 0.0) {
            return Err(ArgumentError::new(
                "height",
                format!("must be greater than zero, got {}", height),
            ));
        }
        self.height = height;
        Ok(())
    }

    /// Rotation in degrees (50)
    pub fn rotation(&self) -> f64 {
        self.rotation
    }

    pub fn set_rotation(&mut self, degrees: f64) {
        self.rotation = normalize_angle(degrees);
    }

    /// Set the rotation from an X axis direction vector (11)
    pub fn set_direction(&mut self, direction: Vector3) {
        self.set_rotation(direction.y.atan2(direction.x).to_degrees());
    }

    /// Line spacing factor (44), in `[0.25, 4.0]`
    pub fn line_spacing_factor(&self) -> f64 {
        self.line_spacing_factor
    }

    pub fn set_line_spacing_factor(&mut self, factor: f64) -> Result<(), ArgumentError> {
        if !(MIN_LINE_SPACING..=MAX_LINE_SPACING).contains(&factor) {
            return Err(ArgumentError::new(
                "line_spacing_factor",
                format!(
                    "must be between {} and {}, got {}",
                    MIN_LINE_SPACING, MAX_LINE_SPACING, factor
                ),
            ));
        }
        self.line_spacing_factor = factor;
        Ok(())
    }
}

impl Default for MText {
    fn default() -> Self {
        Self::new()
    }
}

super::impl_entity!(MText, "MTEXT");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_spacing_boundaries() {
        let mut text = MText::new();
        assert!(text.set_line_spacing_factor(0.25).is_ok());
        assert!(text.set_line_spacing_factor(4.0).is_ok());
        assert!(text.set_line_spacing_factor(f64::from_bits(0.25f64.to_bits() - 1)).is_err());
        assert!(text.set_line_spacing_factor(f64::from_bits(4.0f64.to_bits() + 1)).is_err());
        assert!(text.set_line_spacing_factor(f64::NAN).is_err());
        assert_eq!(text.line_spacing_factor(), 4.0);
    }

    #[test]
    fn test_direction_sets_rotation() {
        let mut text = MText::new();
        text.set_direction(Vector3::new(0.0, -1.0, 0.0));
        assert_eq!(text.rotation(), 270.0);
        assert_eq!(AttachmentPoint::from_value(5).value(), 5);
    }
}
