//! Text style table entry

use bitflags::bitflags;
use once_cell::sync::Lazy;

use super::TableEntry;
use crate::types::Handle;
use crate::xdata::ExtendedData;

bitflags! {
    /// Standard flags (group code 70)
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct TextStyleFlags: i16 {
        /// Entry describes a shape file
        const SHAPE_FILE = 1;
        const VERTICAL = 4;
        const XREF_DEPENDENT = 16;
    }
}

static STANDARD: Lazy<TextStyle> = Lazy::new(TextStyle::standard);

/// A text style table entry
#[derive(Debug, Clone, PartialEq)]
pub struct TextStyle {
    pub handle: Handle,
    pub owner: Handle,
    pub reactors: Vec<Handle>,
    pub xdictionary: Handle,
    pub extended_data: ExtendedData,
    /// Name (2)
    pub name: String,
    pub flags: TextStyleFlags,
    /// Fixed height, 0 if not fixed (40)
    pub height: f64,
    /// Width factor (41)
    pub width_factor: f64,
    /// Oblique angle in degrees (50)
    pub oblique_angle: f64,
    /// Generation flags (71): 2 backward, 4 upside down
    pub generation_flags: i16,
    /// Last height used (42)
    pub last_height: f64,
    /// Primary font file (3)
    pub font_file: String,
    /// Big font file (4)
    pub big_font_file: String,
}

impl TextStyle {
    pub fn new(name: impl Into<String>) -> Self {
        TextStyle {
            handle: Handle::NULL,
            owner: Handle::NULL,
            reactors: Vec::new(),
            xdictionary: Handle::NULL,
            extended_data: ExtendedData::new(),
            name: name.into(),
            flags: TextStyleFlags::empty(),
            height: 0.0,
            width_factor: 1.0,
            oblique_angle: 0.0,
            generation_flags: 0,
            last_height: 2.5,
            font_file: "txt".to_string(),
            big_font_file: String::new(),
        }
    }

    pub fn standard() -> Self {
        Self::new("Standard")
    }

    /// Shared `Standard` entry, substituted for dangling style references
    pub fn default_style() -> &'static TextStyle {
        &STANDARD
    }

    pub fn has_fixed_height(&self) -> bool {
        self.height > 0.0
    }
}

impl TableEntry for TextStyle {
    const TABLE_NAME: &'static str = "STYLE";

    fn name(&self) -> &str {
        &self.name
    }

    fn set_name(&mut self, name: String) {
        self.name = name;
    }

    fn is_standard(&self) -> bool {
        self.name.eq_ignore_ascii_case("Standard")
    }
}

crate::impl_cad_object!(TextStyle);
