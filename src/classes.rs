//! CLASSES section records
//!
//! Each class names a custom object or entity type by its DXF record name
//! and the C++ class and application that define it.

use bitflags::bitflags;
use indexmap::IndexMap;

bitflags! {
    /// Operations allowed on proxies of a class (90)
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ProxyFlags: i32 {
        const ERASE_ALLOWED = 1;
        const TRANSFORM_ALLOWED = 2;
        const COLOR_CHANGE_ALLOWED = 4;
        const LAYER_CHANGE_ALLOWED = 8;
        const LINETYPE_CHANGE_ALLOWED = 16;
        const LINETYPE_SCALE_CHANGE_ALLOWED = 32;
        const VISIBILITY_CHANGE_ALLOWED = 64;
        const CLONING_ALLOWED = 128;
        const LINEWEIGHT_CHANGE_ALLOWED = 256;
        const PLOT_STYLE_NAME_CHANGE_ALLOWED = 512;
        const DISABLES_PROXY_WARNING_DIALOG = 1024;
        const R13_FORMAT_PROXY = 32768;
    }
}

/// A CLASS record
#[derive(Debug, Clone, PartialEq)]
pub struct DxfClass {
    /// Record name used after group code 0 by instances (1)
    pub dxf_name: String,
    /// C++ class name (2)
    pub cpp_class_name: String,
    /// Defining application (3)
    pub application_name: String,
    /// Proxy capabilities (90)
    pub proxy_flags: ProxyFlags,
    /// Number of instances (91, 2004+)
    pub instance_count: i32,
    /// Class was not loaded with the file (280)
    pub was_zombie: bool,
    /// Instances are entities rather than objects (281)
    pub is_an_entity: bool,
}

impl DxfClass {
    pub fn new(
        dxf_name: impl Into<String>,
        cpp_class_name: impl Into<String>,
        is_an_entity: bool,
    ) -> Self {
        DxfClass {
            dxf_name: dxf_name.into(),
            cpp_class_name: cpp_class_name.into(),
            application_name: "ObjectDBX Classes".to_string(),
            proxy_flags: ProxyFlags::empty(),
            instance_count: 0,
            was_zombie: false,
            is_an_entity,
        }
    }
}

/// Classes keyed by their DXF record name
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DxfClassCollection {
    classes: IndexMap<String, DxfClass>,
}

impl DxfClassCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a class, replacing an earlier one with the same record name
    pub fn add_or_update(&mut self, class: DxfClass) {
        self.classes.insert(class.dxf_name.to_uppercase(), class);
    }

    pub fn get(&self, dxf_name: &str) -> Option<&DxfClass> {
        self.classes.get(&dxf_name.to_uppercase())
    }

    pub fn contains(&self, dxf_name: &str) -> bool {
        self.classes.contains_key(&dxf_name.to_uppercase())
    }

    pub fn iter(&self) -> impl Iterator<Item = &DxfClass> {
        self.classes.values()
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub fn clear(&mut self) {
        self.classes.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_ignores_case() {
        let mut classes = DxfClassCollection::new();
        classes.add_or_update(DxfClass::new("MLINESTYLE", "AcDbMlineStyle", false));
        assert!(classes.contains("mlinestyle"));
        assert_eq!(classes.get("MLineStyle").map(|c| c.is_an_entity), Some(false));
    }

    #[test]
    fn test_update_keeps_position() {
        let mut classes = DxfClassCollection::new();
        classes.add_or_update(DxfClass::new("A", "AcDbA", false));
        classes.add_or_update(DxfClass::new("B", "AcDbB", true));
        let mut again = DxfClass::new("A", "AcDbA", false);
        again.instance_count = 4;
        classes.add_or_update(again);
        let names: Vec<&str> = classes.iter().map(|c| c.dxf_name.as_str()).collect();
        assert_eq!(names, vec!["A", "B"]);
        assert_eq!(classes.get("A").map(|c| c.instance_count), Some(4));
    }
}
