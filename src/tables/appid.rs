//! Application id table entry

use super::TableEntry;
use crate::types::Handle;
use crate::xdata::ExtendedData;

/// Registered application name; XData is keyed by these
#[derive(Debug, Clone, PartialEq)]
pub struct AppId {
    pub handle: Handle,
    pub owner: Handle,
    pub reactors: Vec<Handle>,
    pub xdictionary: Handle,
    pub extended_data: ExtendedData,
    /// Name (2)
    pub name: String,
    /// Standard flags (70)
    pub flags: i16,
}

impl AppId {
    pub fn new(name: impl Into<String>) -> Self {
        AppId {
            handle: Handle::NULL,
            owner: Handle::NULL,
            reactors: Vec::new(),
            xdictionary: Handle::NULL,
            extended_data: ExtendedData::new(),
            name: name.into(),
            flags: 0,
        }
    }

    pub fn acad() -> Self {
        Self::new("ACAD")
    }
}

impl TableEntry for AppId {
    const TABLE_NAME: &'static str = "APPID";

    fn name(&self) -> &str {
        &self.name
    }

    fn set_name(&mut self, name: String) {
        self.name = name;
    }

    fn is_standard(&self) -> bool {
        self.name.eq_ignore_ascii_case("ACAD")
    }
}

crate::impl_cad_object!(AppId);
