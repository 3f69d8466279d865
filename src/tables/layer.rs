//! Layer table entry

use bitflags::bitflags;
use once_cell::sync::Lazy;

use super::TableEntry;
use crate::types::{Color, Handle, LineWeight};
use crate::xdata::ExtendedData;

bitflags! {
    /// Standard flags (group code 70)
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct LayerFlags: i16 {
        const FROZEN = 1;
        /// Frozen by default in new viewports
        const FROZEN_NEW_VIEWPORTS = 2;
        const LOCKED = 4;
        const XREF_DEPENDENT = 16;
        const XREF_RESOLVED = 32;
        const REFERENCED = 64;
    }
}

static DEFAULT_LAYER: Lazy<Layer> = Lazy::new(|| Layer::new("0"));

/// A layer table entry
#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    pub handle: Handle,
    pub owner: Handle,
    pub reactors: Vec<Handle>,
    pub xdictionary: Handle,
    pub extended_data: ExtendedData,
    /// Layer name (2)
    pub name: String,
    pub flags: LayerFlags,
    /// Color (62 / 420), always an explicit color
    pub color: Color,
    /// Layer is off; written as a negative color index
    pub is_off: bool,
    /// Line type name (6)
    pub linetype: String,
    /// Plot flag (290)
    pub is_plottable: bool,
    /// Line weight (370)
    pub line_weight: LineWeight,
    /// Plot style name object (390)
    pub plot_style: Handle,
    /// Material object (347)
    pub material: Handle,
}

impl Layer {
    pub fn new(name: impl Into<String>) -> Self {
        Layer {
            handle: Handle::NULL,
            owner: Handle::NULL,
            reactors: Vec::new(),
            xdictionary: Handle::NULL,
            extended_data: ExtendedData::new(),
            name: name.into(),
            flags: LayerFlags::empty(),
            color: Color::WHITE,
            is_off: false,
            linetype: "Continuous".to_string(),
            is_plottable: true,
            line_weight: LineWeight::Default,
            plot_style: Handle::NULL,
            material: Handle::NULL,
        }
    }

    /// The shared layer "0" template, substituted for dangling layer references
    pub fn default_layer() -> &'static Layer {
        &DEFAULT_LAYER
    }

    pub fn is_frozen(&self) -> bool {
        self.flags.contains(LayerFlags::FROZEN)
    }

    pub fn is_locked(&self) -> bool {
        self.flags.contains(LayerFlags::LOCKED)
    }

    /// Value of group code 62
    pub fn color_index(&self) -> i16 {
        let index = match self.color {
            Color::Index(i) => i as i16,
            Color::Rgb { .. } => self.color.aci().max(1),
            Color::ByLayer | Color::ByBlock => 7,
        };
        if self.is_off {
            -index
        } else {
            index
        }
    }
}

impl TableEntry for Layer {
    const TABLE_NAME: &'static str = "LAYER";

    fn name(&self) -> &str {
        &self.name
    }

    fn set_name(&mut self, name: String) {
        self.name = name;
    }

    fn is_standard(&self) -> bool {
        self.name == "0"
    }
}

crate::impl_cad_object!(Layer);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_layer_is_shared() {
        let a = Layer::default_layer();
        let b = Layer::default_layer();
        assert!(std::ptr::eq(a, b));
        let mut copy = a.clone();
        copy.name = "X".into();
        assert_eq!(Layer::default_layer().name, "0");
    }

    #[test]
    fn test_off_layer_writes_negative_color() {
        let mut layer = Layer::new("Hidden");
        layer.color = Color::RED;
        layer.is_off = true;
        assert_eq!(layer.color_index(), -1);
    }
}
