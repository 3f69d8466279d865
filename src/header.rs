//! HEADER section variables
//!
//! A handful of variables the codec itself depends on are typed. Every
//! other variable is kept as the ordered tag list it was read with and
//! written back unchanged after the typed ones.

use indexmap::IndexMap;

use crate::io::dxf::DxfValue;
use crate::types::{DxfVersion, Handle, Vector3};

/// Header variables
#[derive(Debug, Clone, PartialEq)]
pub struct HeaderVariables {
    /// `$ACADVER`
    pub version: DxfVersion,
    /// `$HANDSEED`: next handle to hand out, maintained by the writer
    pub handle_seed: Handle,
    /// `$DWGCODEPAGE`
    pub code_page: String,
    /// `$INSBASE`
    pub insertion_base: Vector3,
    /// `$EXTMIN`
    pub extents_min: Vector3,
    /// `$EXTMAX`
    pub extents_max: Vector3,
    /// `$LTSCALE`
    pub linetype_scale: f64,
    /// `$CLAYER`
    pub current_layer: String,
    /// `$TEXTSTYLE`
    pub current_text_style: String,
    /// `$DIMSTYLE`
    pub current_dimstyle: String,
    /// `$CELTYPE`
    pub current_linetype: String,
    /// `$MEASUREMENT` (0 imperial, 1 metric)
    pub measurement: i16,
    /// `$INSUNITS`
    pub insertion_units: i16,
    /// Variables without a typed field, by name (with the `$`)
    pub extra: IndexMap<String, Vec<(i32, DxfValue)>>,
}

impl HeaderVariables {
    /// Names of the typed variables, in the order they are written
    pub const TYPED: [&'static str; 13] = [
        "$ACADVER",
        "$HANDSEED",
        "$DWGCODEPAGE",
        "$INSBASE",
        "$EXTMIN",
        "$EXTMAX",
        "$LTSCALE",
        "$CLAYER",
        "$TEXTSTYLE",
        "$DIMSTYLE",
        "$CELTYPE",
        "$MEASUREMENT",
        "$INSUNITS",
    ];

    pub fn new() -> Self {
        HeaderVariables {
            version: DxfVersion::AC1032,
            handle_seed: Handle::NULL,
            code_page: "ANSI_1252".to_string(),
            insertion_base: Vector3::ZERO,
            extents_min: Vector3::new(1e20, 1e20, 1e20),
            extents_max: Vector3::new(-1e20, -1e20, -1e20),
            linetype_scale: 1.0,
            current_layer: "0".to_string(),
            current_text_style: "Standard".to_string(),
            current_dimstyle: "Standard".to_string(),
            current_linetype: "ByLayer".to_string(),
            measurement: 0,
            insertion_units: 0,
            extra: IndexMap::new(),
        }
    }

    pub fn is_typed(name: &str) -> bool {
        Self::TYPED.iter().any(|t| t.eq_ignore_ascii_case(name))
    }

    /// Raw tags of an untyped variable
    pub fn get_extra(&self, name: &str) -> Option<&[(i32, DxfValue)]> {
        self.extra.get(name).map(Vec::as_slice)
    }

    /// Set an untyped variable. Typed names are refused.
    pub fn set_extra(&mut self, name: impl Into<String>, tags: Vec<(i32, DxfValue)>) -> bool {
        let name = name.into();
        if Self::is_typed(&name) {
            return false;
        }
        self.extra.insert(name, tags);
        true
    }
}

impl Default for HeaderVariables {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let h = HeaderVariables::new();
        assert_eq!(h.version, DxfVersion::AC1032);
        assert_eq!(h.current_layer, "0");
        assert_eq!(h.linetype_scale, 1.0);
        assert!(h.extra.is_empty());
    }

    #[test]
    fn test_extra_refuses_typed_names() {
        let mut h = HeaderVariables::new();
        assert!(!h.set_extra("$clayer", vec![(8, DxfValue::Str("X".into()))]));
        assert!(h.set_extra("$ANGBASE", vec![(50, DxfValue::Double(0.0))]));
        assert_eq!(h.get_extra("$ANGBASE"), Some(&[(50, DxfValue::Double(0.0))][..]));
    }
}
