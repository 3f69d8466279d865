//! Dimension style table entry
//!
//! The commonly used DIM* variables are typed; every other variable code
//! is kept in `extra` in file order and written back after the typed ones.

use once_cell::sync::Lazy;

use super::TableEntry;
use crate::io::dxf::DxfValue;
use crate::types::Handle;
use crate::xdata::ExtendedData;

static STANDARD: Lazy<DimStyle> = Lazy::new(DimStyle::standard);

/// A dimension style table entry
#[derive(Debug, Clone, PartialEq)]
pub struct DimStyle {
    /// Handle, written with group code 105
    pub handle: Handle,
    pub owner: Handle,
    pub reactors: Vec<Handle>,
    pub xdictionary: Handle,
    pub extended_data: ExtendedData,
    /// Name (2)
    pub name: String,
    /// Standard flags (70)
    pub flags: i16,
    /// DIMPOST (3)
    pub dimpost: String,
    /// DIMSCALE (40)
    pub dimscale: f64,
    /// DIMASZ (41)
    pub dimasz: f64,
    /// DIMEXO (42)
    pub dimexo: f64,
    /// DIMDLI (43)
    pub dimdli: f64,
    /// DIMEXE (44)
    pub dimexe: f64,
    /// DIMTIH (73)
    pub dimtih: bool,
    /// DIMTOH (74)
    pub dimtoh: bool,
    /// DIMTAD (77)
    pub dimtad: i16,
    /// DIMTXT (140)
    pub dimtxt: f64,
    /// DIMCEN (141)
    pub dimcen: f64,
    /// DIMGAP (147)
    pub dimgap: f64,
    /// DIMCLRD (176)
    pub dimclrd: i16,
    /// DIMCLRE (177)
    pub dimclre: i16,
    /// DIMCLRT (178)
    pub dimclrt: i16,
    /// DIMDEC (271)
    pub dimdec: i16,
    /// DIMTXSTY (340), the text style used for dimension text
    pub text_style: Handle,
    /// Remaining variables in file order
    pub extra: Vec<(i32, DxfValue)>,
}

impl DimStyle {
    pub fn new(name: impl Into<String>) -> Self {
        DimStyle {
            handle: Handle::NULL,
            owner: Handle::NULL,
            reactors: Vec::new(),
            xdictionary: Handle::NULL,
            extended_data: ExtendedData::new(),
            name: name.into(),
            flags: 0,
            dimpost: String::new(),
            dimscale: 1.0,
            dimasz: 0.18,
            dimexo: 0.0625,
            dimdli: 0.38,
            dimexe: 0.18,
            dimtih: true,
            dimtoh: true,
            dimtad: 0,
            dimtxt: 0.18,
            dimcen: 0.09,
            dimgap: 0.09,
            dimclrd: 0,
            dimclre: 0,
            dimclrt: 0,
            dimdec: 4,
            text_style: Handle::NULL,
            extra: Vec::new(),
        }
    }

    pub fn standard() -> Self {
        Self::new("Standard")
    }

    /// Shared `Standard` entry, substituted for dangling style references
    pub fn default_style() -> &'static DimStyle {
        &STANDARD
    }
}

impl TableEntry for DimStyle {
    const TABLE_NAME: &'static str = "DIMSTYLE";

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

crate::impl_cad_object!(DimStyle);
