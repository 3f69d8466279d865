//! Underlay definitions (PDFDEFINITION, DWFDEFINITION, DGNDEFINITION)

use crate::entities::UnderlayKind;
use crate::types::Handle;
use crate::xdata::ExtendedData;

/// External file referenced by underlay entities
#[derive(Debug, Clone, PartialEq)]
pub struct UnderlayDefinition {
    pub handle: Handle,
    pub owner: Handle,
    pub reactors: Vec<Handle>,
    pub xdictionary: Handle,
    pub extended_data: ExtendedData,
    pub kind: UnderlayKind,
    /// Path of the referenced file (1)
    pub file_path: String,
    /// Page or sheet inside the file (2)
    pub page_name: String,
}

impl UnderlayDefinition {
    pub fn new(kind: UnderlayKind, file_path: impl Into<String>, page_name: impl Into<String>) -> Self {
        UnderlayDefinition {
            handle: Handle::NULL,
            owner: Handle::NULL,
            reactors: Vec::new(),
            xdictionary: Handle::NULL,
            extended_data: ExtendedData::new(),
            kind,
            file_path: file_path.into(),
            page_name: page_name.into(),
        }
    }

    pub fn pdf(file_path: impl Into<String>, page: impl Into<String>) -> Self {
        Self::new(UnderlayKind::Pdf, file_path, page)
    }

    /// Dictionary under the root dictionary that lists definitions of this kind
    pub fn dictionary_name(&self) -> &'static str {
        match self.kind {
            UnderlayKind::Pdf => "ACAD_PDFDEFINITIONS",
            UnderlayKind::Dwf => "ACAD_DWFDEFINITIONS",
            UnderlayKind::Dgn => "ACAD_DGNDEFINITIONS",
        }
    }
}

crate::impl_cad_object!(UnderlayDefinition);
