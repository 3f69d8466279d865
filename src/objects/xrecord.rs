//! XRecord object - arbitrary application data

use super::DictionaryCloningFlags;
use crate::io::dxf::DxfValue;
use crate::types::Handle;
use crate::xdata::ExtendedData;

/// Free-form data attached to a dictionary entry
///
/// The payload is an ordered list of group code / value pairs, kept exactly
/// as read. Points stay as separate X/Y/Z tags.
///
/// ```
/// use dxfcodec::objects::XRecord;
///
/// let mut xrecord = XRecord::new();
/// xrecord.add_string(1, "Custom Data");
/// xrecord.add_double(40, 3.5);
/// xrecord.add_int32(90, 42);
/// assert_eq!(xrecord.entries.len(), 3);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct XRecord {
    pub handle: Handle,
    pub owner: Handle,
    pub reactors: Vec<Handle>,
    pub xdictionary: Handle,
    pub extended_data: ExtendedData,
    /// Cloning behavior (280)
    pub cloning_flags: DictionaryCloningFlags,
    pub entries: Vec<(i32, DxfValue)>,
}

impl XRecord {
    pub fn new() -> Self {
        XRecord {
            handle: Handle::NULL,
            owner: Handle::NULL,
            reactors: Vec::new(),
            xdictionary: Handle::NULL,
            extended_data: ExtendedData::new(),
            cloning_flags: DictionaryCloningFlags::KeepExisting,
            entries: Vec::new(),
        }
    }

    pub fn add_string(&mut self, code: i32, value: impl Into<String>) {
        self.entries.push((code, DxfValue::Str(value.into())));
    }

    pub fn add_double(&mut self, code: i32, value: f64) {
        self.entries.push((code, DxfValue::Double(value)));
    }

    pub fn add_int16(&mut self, code: i32, value: i16) {
        self.entries.push((code, DxfValue::Int16(value)));
    }

    pub fn add_int32(&mut self, code: i32, value: i32) {
        self.entries.push((code, DxfValue::Int32(value)));
    }

    pub fn add_handle(&mut self, code: i32, value: Handle) {
        self.entries.push((code, DxfValue::Handle(value)));
    }

    /// First value stored under `code`
    pub fn get(&self, code: i32) -> Option<&DxfValue> {
        self.entries.iter().find(|(c, _)| *c == code).map(|(_, v)| v)
    }
}

impl Default for XRecord {
    fn default() -> Self {
        Self::new()
    }
}

crate::impl_cad_object!(XRecord);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entries_keep_order() {
        let mut xrecord = XRecord::new();
        xrecord.add_int16(70, 3);
        xrecord.add_handle(330, Handle::new(0x1F));
        xrecord.add_string(1, "a");
        let codes: Vec<i32> = xrecord.entries.iter().map(|(c, _)| *c).collect();
        assert_eq!(codes, vec![70, 330, 1]);
        assert_eq!(xrecord.get(330), Some(&DxfValue::Handle(Handle::new(0x1F))));
        assert_eq!(xrecord.get(40), None);
    }
}
