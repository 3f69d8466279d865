//! Single-line text entity

use super::EntityCommon;
use crate::error::ArgumentError;
use crate::types::{normalize_angle, Vector3};

/// Horizontal justification (group code 72)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextHorizontalAlignment {
    #[default]
    Left,
    Center,
    Right,
    /// Fit between the two points, adjusting height
    Aligned,
    Middle,
    /// Fit between the two points, adjusting width
    Fit,
}

impl TextHorizontalAlignment {
    pub fn from_value(value: i16) -> Self {
        match value {
            1 => TextHorizontalAlignment::Center,
            2 => TextHorizontalAlignment::Right,
            3 => TextHorizontalAlignment::Aligned,
            4 => TextHorizontalAlignment::Middle,
            5 => TextHorizontalAlignment::Fit,
            _ => TextHorizontalAlignment::Left,
        }
    }

    pub fn value(&self) -> i16 {
        *self as i16
    }
}

/// Vertical justification (group code 73)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextVerticalAlignment {
    #[default]
    Baseline,
    Bottom,
    Middle,
    Top,
}

impl TextVerticalAlignment {
    pub fn from_value(value: i16) -> Self {
        match value {
            1 => TextVerticalAlignment::Bottom,
            2 => TextVerticalAlignment::Middle,
            3 => TextVerticalAlignment::Top,
            _ => TextVerticalAlignment::Baseline,
        }
    }

    pub fn value(&self) -> i16 {
        *self as i16
    }
}

pub(crate) fn check_positive(field: &'static str, value: f64) -> Result<f64, ArgumentError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(ArgumentError::new(
            field,
            format!("must be greater than zero, got {}", value),
        ))
    }
}

/// Oblique angle in degrees must stay within +/-85
pub(crate) fn check_oblique(degrees: f64) -> Result<f64, ArgumentError> {
    let normalized = normalize_angle(degrees);
    let signed = if normalized > 180.0 {
        normalized - 360.0
    } else {
        normalized
    };
    if signed.abs() > 85.0 {
        return Err(ArgumentError::new(
            "oblique_angle",
            format!("must be between -85 and 85 degrees, got {}", degrees),
        ));
    }
    Ok(normalized)
}

/// A single-line text entity
#[derive(Debug, Clone, PartialEq)]
pub struct Text {
    pub common: EntityCommon,
    /// Text content (1)
    pub value: String,
    /// First alignment point (10)
    pub insertion_point: Vector3,
    /// Second alignment point (11), used unless left/baseline justified
    pub alignment_point: Option<Vector3>,
    /// Text style name (7)
    pub style: String,
    /// Thickness (39)
    pub thickness: f64,
    /// Text generation flags (71): 2 mirrored in X, 4 mirrored in Y
    pub generation_flags: i16,
    pub horizontal_alignment: TextHorizontalAlignment,
    pub vertical_alignment: TextVerticalAlignment,
    height: f64,
    width_factor: f64,
    rotation: f64,
    oblique_angle: f64,
}

impl Text {
    pub fn new() -> Self {
        Text {
            common: EntityCommon::new(),
            value: String::new(),
            insertion_point: Vector3::ZERO,
            alignment_point: None,
            style: "Standard".to_string(),
            thickness: 0.0,
            generation_flags: 0,
            horizontal_alignment: TextHorizontalAlignment::Left,
            vertical_alignment: TextVerticalAlignment::Baseline,
            height: 1.0,
            width_factor: 1.0,
            rotation: 0.0,
            oblique_angle: 0.0,
        }
    }

    pub fn with_value(value: impl Into<String>, insertion_point: Vector3) -> Self {
        Text {
            value: value.into(),
            insertion_point,
            ..Self::new()
        }
    }

    /// Text height (40)
    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn set_height(&mut self, height: f64) -> Result<(), ArgumentError> {
        self.height = check_positive("height", height)?;
        Ok(())
    }

    /// Relative X scale factor (41)
    pub fn width_factor(&self) -> f64 {
        self.width_factor
    }

    pub fn set_width_factor(&mut self, factor: f64) -> Result<(), ArgumentError> {
        self.width_factor = check_positive("width_factor", factor)?;
        Ok(())
    }

    /// Rotation in degrees (50)
    pub fn rotation(&self) -> f64 {
        self.rotation
    }

    pub fn set_rotation(&mut self, degrees: f64) {
        self.rotation = normalize_angle(degrees);
    }

    /// Oblique angle in degrees (51)
    pub fn oblique_angle(&self) -> f64 {
        self.oblique_angle
    }

    pub fn set_oblique_angle(&mut self, degrees: f64) -> Result<(), ArgumentError> {
        self.oblique_angle = check_oblique(degrees)?;
        Ok(())
    }
}

impl Default for Text {
    fn default() -> Self {
        Self::new()
    }
}

super::impl_entity!(Text, "TEXT");
