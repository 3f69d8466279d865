//! Entity without a typed model, kept for round-trip preservation.
//!
//! The common entity properties (handle, layer, color, ...) are mapped as
//! for any other entity; every remaining group code pair is kept verbatim
//! in file order and written back unchanged.

use super::{Entity, EntityCommon};
use crate::io::dxf::DxfValue;

/// An entity whose type is not directly supported
#[derive(Debug, Clone, PartialEq)]
pub struct UnknownEntity {
    pub common: EntityCommon,
    /// The name after group code 0 (e.g. `ACAD_PROXY_ENTITY`)
    pub dxf_name: String,
    /// Subclass data in file order, including `100` markers
    pub tags: Vec<(i32, DxfValue)>,
}

impl UnknownEntity {
    pub fn new(dxf_name: impl Into<String>) -> Self {
        UnknownEntity {
            common: EntityCommon::new(),
            dxf_name: dxf_name.into(),
            tags: Vec::new(),
        }
    }
}

impl Entity for UnknownEntity {
    fn common(&self) -> &EntityCommon {
        &self.common
    }

    fn common_mut(&mut self) -> &mut EntityCommon {
        &mut self.common
    }

    fn dxf_name(&self) -> &str {
        &self.dxf_name
    }
}

crate::impl_cad_object!(UnknownEntity, common);
