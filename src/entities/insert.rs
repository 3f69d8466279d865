//! Block reference entity (INSERT and MINSERT)

use super::polyline::Seqend;
use super::{Attribute, EntityCommon};
use crate::error::ArgumentError;
use crate::types::{normalize_angle, Handle, Vector3};

fn check_scale(field: &'static str, scale: f64) -> Result<f64, ArgumentError> {
    if scale == 0.0 || !scale.is_finite() {
        return Err(ArgumentError::new(
            field,
            format!("scale factor must be finite and non-zero, got {}", scale),
        ));
    }
    Ok(scale)
}

/// Reference to a block definition, with optional attributes and array layout
#[derive(Debug, Clone, PartialEq)]
pub struct Insert {
    pub common: EntityCommon,
    /// Referenced block name (2)
    pub block_name: String,
    /// Insertion point in OCS (10)
    pub insertion_point: Vector3,
    /// Column count (70)
    pub column_count: i16,
    /// Row count (71)
    pub row_count: i16,
    /// Column spacing (44)
    pub column_spacing: f64,
    /// Row spacing (45)
    pub row_spacing: f64,
    /// ATTRIB records following the insert
    pub attributes: Vec<Attribute>,
    /// Terminator written after the attributes
    pub seqend: Seqend,
    x_scale: f64,
    y_scale: f64,
    z_scale: f64,
    rotation: f64,
}

impl Insert {
    pub fn new(block_name: impl Into<String>, insertion_point: Vector3) -> Self {
        Insert {
            common: EntityCommon::new(),
            block_name: block_name.into(),
            insertion_point,
            column_count: 1,
            row_count: 1,
            column_spacing: 0.0,
            row_spacing: 0.0,
            attributes: Vec::new(),
            seqend: Seqend::default(),
            x_scale: 1.0,
            y_scale: 1.0,
            z_scale: 1.0,
            rotation: 0.0,
        }
    }

    /// X scale factor (41)
    pub fn x_scale(&self) -> f64 {
        self.x_scale
    }

    pub fn set_x_scale(&mut self, scale: f64) -> Result<(), ArgumentError> {
        self.x_scale = check_scale("x_scale", scale)?;
        Ok(())
    }

    /// Y scale factor (42)
    pub fn y_scale(&self) -> f64 {
        self.y_scale
    }

    pub fn set_y_scale(&mut self, scale: f64) -> Result<(), ArgumentError> {
        self.y_scale = check_scale("y_scale", scale)?;
        Ok(())
    }

    /// Z scale factor (43)
    pub fn z_scale(&self) -> f64 {
        self.z_scale
    }

    pub fn set_z_scale(&mut self, scale: f64) -> Result<(), ArgumentError> {
        self.z_scale = check_scale("z_scale", scale)?;
        Ok(())
    }

    /// Rotation in degrees (50)
    pub fn rotation(&self) -> f64 {
        self.rotation
    }

    pub fn set_rotation(&mut self, degrees: f64) {
        self.rotation = normalize_angle(degrees);
    }

    /// Attributes-follow flag (66)
    pub fn has_attributes(&self) -> bool {
        !self.attributes.is_empty()
    }

    /// Written as `AcDbMInsertBlock` when laid out as an array
    pub fn is_multiple(&self) -> bool {
        self.column_count > 1 || self.row_count > 1
    }

    pub fn attribute(&self, tag: &str) -> Option<&Attribute> {
        self.attributes
            .iter()
            .find(|a| a.tag.eq_ignore_ascii_case(tag))
    }

    pub fn owned_handles(&self) -> Vec<Handle> {
        if self.attributes.is_empty() {
            return Vec::new();
        }
        self.attributes
            .iter()
            .map(|a| a.text.common.handle)
            .chain(std::iter::once(self.seqend.common.handle))
            .collect()
    }
}

impl Default for Insert {
    fn default() -> Self {
        Self::new("", Vector3::ZERO)
    }
}

super::impl_entity!(Insert, "INSERT");

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::AttributeValue;

    #[test]
    fn test_zero_scale_rejected() {
        let mut insert = Insert::new("DOOR", Vector3::ZERO);
        assert!(insert.set_x_scale(0.0).is_err());
        insert.set_y_scale(-1.0).unwrap();
        assert_eq!(insert.y_scale(), -1.0);
    }

    #[test]
    fn test_owned_handles_only_with_attributes() {
        let mut insert = Insert::new("DOOR", Vector3::ZERO);
        assert!(insert.owned_handles().is_empty());
        insert
            .attributes
            .push(Attribute::new("WIDTH", AttributeValue::Integer(900)));
        assert_eq!(insert.owned_handles().len(), 2);
        assert!(insert.attribute("width").is_some());
    }
}
