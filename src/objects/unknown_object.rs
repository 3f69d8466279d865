//! Objects kept as raw tag runs

use crate::io::dxf::DxfValue;
use crate::types::Handle;
use crate::xdata::ExtendedData;

/// An object type the codec has no model for
///
/// Everything after the bookkeeping codes (5, 102 groups, 330) is kept in
/// file order, subclass markers included, and written back unchanged.
#[derive(Debug, Clone, PartialEq)]
pub struct UnknownObject {
    pub handle: Handle,
    pub owner: Handle,
    pub reactors: Vec<Handle>,
    pub xdictionary: Handle,
    pub extended_data: ExtendedData,
    pub dxf_name: String,
    pub tags: Vec<(i32, DxfValue)>,
}

impl UnknownObject {
    pub fn new(dxf_name: impl Into<String>) -> Self {
        UnknownObject {
            handle: Handle::NULL,
            owner: Handle::NULL,
            reactors: Vec::new(),
            xdictionary: Handle::NULL,
            extended_data: ExtendedData::new(),
            dxf_name: dxf_name.into(),
            tags: Vec::new(),
        }
    }
}

crate::impl_cad_object!(UnknownObject);
