//! PDF, DWF and DGN underlay references
//!
//! The referenced file lives in an underlay definition object in the
//! OBJECTS section; the entity points at it with group code 340.

use bitflags::bitflags;

use super::{Entity, EntityCommon};
use crate::error::ArgumentError;
use crate::types::{normalize_angle, Handle, Vector2, Vector3};

bitflags! {
    /// Display flags (group code 280)
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct UnderlayDisplayFlags: i16 {
        const CLIPPING = 1;
        const ON = 2;
        const MONOCHROME = 4;
        const ADJUST_FOR_BACKGROUND = 8;
        const CLIP_INSIDE = 16;
    }
}

impl Default for UnderlayDisplayFlags {
    fn default() -> Self {
        UnderlayDisplayFlags::ON
    }
}

/// File format of an underlay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum UnderlayKind {
    #[default]
    Pdf,
    Dwf,
    Dgn,
}

impl UnderlayKind {
    pub fn entity_name(&self) -> &'static str {
        match self {
            UnderlayKind::Pdf => "PDFUNDERLAY",
            UnderlayKind::Dwf => "DWFUNDERLAY",
            UnderlayKind::Dgn => "DGNUNDERLAY",
        }
    }

    pub fn definition_name(&self) -> &'static str {
        match self {
            UnderlayKind::Pdf => "PDFDEFINITION",
            UnderlayKind::Dwf => "DWFDEFINITION",
            UnderlayKind::Dgn => "DGNDEFINITION",
        }
    }

    /// Kind for an entity name. The generic `UNDERLAY` name is read as PDF.
    pub fn from_entity_name(name: &str) -> Option<Self> {
        match name {
            "PDFUNDERLAY" | "UNDERLAY" => Some(UnderlayKind::Pdf),
            "DWFUNDERLAY" => Some(UnderlayKind::Dwf),
            "DGNUNDERLAY" => Some(UnderlayKind::Dgn),
            _ => None,
        }
    }

    pub fn from_definition_name(name: &str) -> Option<Self> {
        match name {
            "PDFDEFINITION" => Some(UnderlayKind::Pdf),
            "DWFDEFINITION" => Some(UnderlayKind::Dwf),
            "DGNDEFINITION" => Some(UnderlayKind::Dgn),
            _ => None,
        }
    }
}

/// Underlay reference entity
#[derive(Debug, Clone, PartialEq)]
pub struct Underlay {
    pub common: EntityCommon,
    pub kind: UnderlayKind,
    /// Underlay definition object (340)
    pub definition: Handle,
    /// Insertion point (10)
    pub insertion_point: Vector3,
    pub flags: UnderlayDisplayFlags,
    /// Clip boundary vertices in OCS (11, repeated)
    pub clip_boundary: Vec<Vector2>,
    scale: Vector3,
    rotation: f64,
    contrast: i16,
    fade: i16,
}

impl Underlay {
    pub fn new(kind: UnderlayKind) -> Self {
        Underlay {
            common: EntityCommon::new(),
            kind,
            definition: Handle::NULL,
            insertion_point: Vector3::ZERO,
            flags: UnderlayDisplayFlags::default(),
            clip_boundary: Vec::new(),
            scale: Vector3::new(1.0, 1.0, 1.0),
            rotation: 0.0,
            contrast: 100,
            fade: 0,
        }
    }

    /// Scale factors (41, 42, 43)
    pub fn scale(&self) -> Vector3 {
        self.scale
    }

    pub fn set_scale(&mut self, scale: Vector3) -> Result<(), ArgumentError> {
        if scale.x == 0.0 || scale.y == 0.0 || scale.z == 0.0 || !scale.is_finite() {
            return Err(ArgumentError::new(
                "scale",
                "scale factors must be finite and non-zero",
            ));
        }
        self.scale = scale;
        Ok(())
    }

    /// Rotation in degrees (50)
    pub fn rotation(&self) -> f64 {
        self.rotation
    }

    pub fn set_rotation(&mut self, degrees: f64) {
        self.rotation = normalize_angle(degrees);
    }

    /// Contrast (281), 20 to 100
    pub fn contrast(&self) -> i16 {
        self.contrast
    }

    pub fn set_contrast(&mut self, contrast: i16) -> Result<(), ArgumentError> {
        if !(20..=100).contains(&contrast) {
            return Err(ArgumentError::new(
                "contrast",
                format!("must be between 20 and 100, got {}", contrast),
            ));
        }
        self.contrast = contrast;
        Ok(())
    }

    /// Fade (282), 0 to 80
    pub fn fade(&self) -> i16 {
        self.fade
    }

    pub fn set_fade(&mut self, fade: i16) -> Result<(), ArgumentError> {
        if !(0..=80).contains(&fade) {
            return Err(ArgumentError::new(
                "fade",
                format!("must be between 0 and 80, got {}", fade),
            ));
        }
        self.fade = fade;
        Ok(())
    }
}

impl Default for Underlay {
    fn default() -> Self {
        Self::new(UnderlayKind::Pdf)
    }
}

impl Entity for Underlay {
    fn common(&self) -> &EntityCommon {
        &self.common
    }

    fn common_mut(&mut self) -> &mut EntityCommon {
        &mut self.common
    }

    fn dxf_name(&self) -> &str {
        self.kind.entity_name()
    }
}

crate::impl_cad_object!(Underlay, common);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_checks() {
        let mut underlay = Underlay::new(UnderlayKind::Dgn);
        assert!(underlay.set_contrast(19).is_err());
        assert!(underlay.set_fade(81).is_err());
        assert!(underlay.set_scale(Vector3::new(1.0, 0.0, 1.0)).is_err());
        assert_eq!(underlay.dxf_name(), "DGNUNDERLAY");
        assert_eq!(UnderlayKind::from_entity_name("UNDERLAY"), Some(UnderlayKind::Pdf));
    }
}
