//! Base behavior shared by every serializable record
//!
//! Entities, table entries and objects all carry a handle, an owner
//! pointer, persistent reactors, an optional extension dictionary and
//! XData. The codec reads and writes this bookkeeping the same way for
//! every record, through this trait.

use crate::types::Handle;
use crate::xdata::ExtendedData;

/// Anything that appears as a handle-carrying record in a DXF file
pub trait CadObject {
    fn handle(&self) -> Handle;
    fn set_handle(&mut self, handle: Handle);

    /// Owner pointer (group code 330)
    fn owner(&self) -> Handle;
    fn set_owner(&mut self, owner: Handle);

    /// Persistent reactors (`102 {ACAD_REACTORS`)
    fn reactors(&self) -> &[Handle];
    fn reactors_mut(&mut self) -> &mut Vec<Handle>;

    /// Extension dictionary (`102 {ACAD_XDICTIONARY`)
    fn xdictionary(&self) -> Handle;
    fn set_xdictionary(&mut self, handle: Handle);

    fn extended_data(&self) -> &ExtendedData;
    fn extended_data_mut(&mut self) -> &mut ExtendedData;
}

/// Implement [`CadObject`] for a struct that stores the bookkeeping fields
/// either directly or in a nested field (e.g. `common`).
#[macro_export]
macro_rules! impl_cad_object {
    ($ty:ty) => {
        impl $crate::cad_object::CadObject for $ty {
            fn handle(&self) -> $crate::types::Handle {
                self.handle
            }
            fn set_handle(&mut self, handle: $crate::types::Handle) {
                self.handle = handle;
            }
            fn owner(&self) -> $crate::types::Handle {
                self.owner
            }
            fn set_owner(&mut self, owner: $crate::types::Handle) {
                self.owner = owner;
            }
            fn reactors(&self) -> &[$crate::types::Handle] {
                &self.reactors
            }
            fn reactors_mut(&mut self) -> &mut Vec<$crate::types::Handle> {
                &mut self.reactors
            }
            fn xdictionary(&self) -> $crate::types::Handle {
                self.xdictionary
            }
            fn set_xdictionary(&mut self, handle: $crate::types::Handle) {
                self.xdictionary = handle;
            }
            fn extended_data(&self) -> &$crate::xdata::ExtendedData {
                &self.extended_data
            }
            fn extended_data_mut(&mut self) -> &mut $crate::xdata::ExtendedData {
                &mut self.extended_data
            }
        }
    };
    ($ty:ty, $($path:ident).+) => {
        impl $crate::cad_object::CadObject for $ty {
            fn handle(&self) -> $crate::types::Handle {
                self.$($path).+.handle
            }
            fn set_handle(&mut self, handle: $crate::types::Handle) {
                self.$($path).+.handle = handle;
            }
            fn owner(&self) -> $crate::types::Handle {
                self.$($path).+.owner
            }
            fn set_owner(&mut self, owner: $crate::types::Handle) {
                self.$($path).+.owner = owner;
            }
            fn reactors(&self) -> &[$crate::types::Handle] {
                &self.$($path).+.reactors
            }
            fn reactors_mut(&mut self) -> &mut Vec<$crate::types::Handle> {
                &mut self.$($path).+.reactors
            }
            fn xdictionary(&self) -> $crate::types::Handle {
                self.$($path).+.xdictionary
            }
            fn set_xdictionary(&mut self, handle: $crate::types::Handle) {
                self.$($path).+.xdictionary = handle;
            }
            fn extended_data(&self) -> &$crate::xdata::ExtendedData {
                &self.$($path).+.extended_data
            }
            fn extended_data_mut(&mut self) -> &mut $crate::xdata::ExtendedData {
                &mut self.$($path).+.extended_data
            }
        }
    };
}
