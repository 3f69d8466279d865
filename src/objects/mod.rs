//! Non-graphical objects (OBJECTS section)

use crate::cad_object::CadObject;
use crate::types::Handle;
use crate::xdata::ExtendedData;

pub mod mlinestyle;
pub mod underlay_definition;
pub mod unknown_object;
pub mod xrecord;

pub use mlinestyle::{MLineStyle, MLineStyleElement, MLineStyleFlags};
pub use underlay_definition::UnderlayDefinition;
pub use unknown_object::UnknownObject;
pub use xrecord::XRecord;

/// Name of the root dictionary entry holding multiline styles
pub const ACAD_MLINESTYLE: &str = "ACAD_MLINESTYLE";

/// Duplicate record handling when a dictionary is cloned (281)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(i16)]
pub enum DictionaryCloningFlags {
    #[default]
    NotApplicable = 0,
    KeepExisting = 1,
    UseClone = 2,
    XrefName = 3,
    Name = 4,
    UnmangleName = 5,
}

impl DictionaryCloningFlags {
    pub fn from_value(value: i16) -> Self {
        match value {
            1 => DictionaryCloningFlags::KeepExisting,
            2 => DictionaryCloningFlags::UseClone,
            3 => DictionaryCloningFlags::XrefName,
            4 => DictionaryCloningFlags::Name,
            5 => DictionaryCloningFlags::UnmangleName,
            _ => DictionaryCloningFlags::NotApplicable,
        }
    }

    pub fn value(self) -> i16 {
        self as i16
    }
}

/// Named map from keys to object handles
///
/// Keys compare case-insensitively but keep their original spelling.
#[derive(Debug, Clone, PartialEq)]
pub struct Dictionary {
    pub handle: Handle,
    pub owner: Handle,
    pub reactors: Vec<Handle>,
    pub xdictionary: Handle,
    pub extended_data: ExtendedData,
    /// Entries are hard-owned (280); written with 360 instead of 350
    pub hard_owner: bool,
    /// Cloning behavior (281)
    pub cloning: DictionaryCloningFlags,
    entries: Vec<(String, Handle)>,
}

impl Dictionary {
    pub fn new() -> Self {
        Dictionary {
            handle: Handle::NULL,
            owner: Handle::NULL,
            reactors: Vec::new(),
            xdictionary: Handle::NULL,
            extended_data: ExtendedData::new(),
            hard_owner: false,
            cloning: DictionaryCloningFlags::KeepExisting,
            entries: Vec::new(),
        }
    }

    /// Add or replace an entry
    pub fn add_entry(&mut self, key: impl Into<String>, handle: Handle) {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| k.eq_ignore_ascii_case(&key)) {
            Some(entry) => entry.1 = handle,
            None => self.entries.push((key, handle)),
        }
    }

    pub fn get(&self, key: &str) -> Option<Handle> {
        self.entries
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, h)| *h)
    }

    pub fn remove(&mut self, key: &str) -> Option<Handle> {
        let index = self.entries.iter().position(|(k, _)| k.eq_ignore_ascii_case(key))?;
        Some(self.entries.remove(index).1)
    }

    /// Drop every entry pointing at `handle`
    pub fn remove_handle(&mut self, handle: Handle) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(_, h)| *h != handle);
        before != self.entries.len()
    }

    pub fn entries(&self) -> &[(String, Handle)] {
        &self.entries
    }

    pub fn entries_mut(&mut self) -> &mut Vec<(String, Handle)> {
        &mut self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for Dictionary {
    fn default() -> Self {
        Self::new()
    }
}

crate::impl_cad_object!(Dictionary);

/// Closed set of object variants
#[derive(Debug, Clone, PartialEq)]
pub enum ObjectType {
    Dictionary(Dictionary),
    XRecord(XRecord),
    MLineStyle(MLineStyle),
    UnderlayDefinition(UnderlayDefinition),
    /// Object without a typed model, kept verbatim
    Unknown(UnknownObject),
}

macro_rules! dispatch {
    ($self:expr, $o:ident => $body:expr) => {
        match $self {
            ObjectType::Dictionary($o) => $body,
            ObjectType::XRecord($o) => $body,
            ObjectType::MLineStyle($o) => $body,
            ObjectType::UnderlayDefinition($o) => $body,
            ObjectType::Unknown($o) => $body,
        }
    };
}

impl ObjectType {
    pub fn as_object(&self) -> &dyn CadObject {
        dispatch!(self, o => o)
    }

    pub fn as_object_mut(&mut self) -> &mut dyn CadObject {
        dispatch!(self, o => o)
    }

    pub fn handle(&self) -> Handle {
        self.as_object().handle()
    }

    /// Name written after group code 0
    pub fn dxf_name(&self) -> &str {
        match self {
            ObjectType::Dictionary(_) => "DICTIONARY",
            ObjectType::XRecord(_) => "XRECORD",
            ObjectType::MLineStyle(_) => "MLINESTYLE",
            ObjectType::UnderlayDefinition(d) => d.kind.definition_name(),
            ObjectType::Unknown(o) => &o.dxf_name,
        }
    }

    pub fn as_dictionary(&self) -> Option<&Dictionary> {
        match self {
            ObjectType::Dictionary(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_dictionary_mut(&mut self) -> Option<&mut Dictionary> {
        match self {
            ObjectType::Dictionary(d) => Some(d),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dictionary_keys_ignore_case() {
        let mut dict = Dictionary::new();
        assert!(dict.is_empty());

        dict.add_entry("ACAD_GROUP", Handle::new(0xD));
        dict.add_entry("acad_group", Handle::new(0xE));
        assert_eq!(dict.len(), 1);
        assert_eq!(dict.get("Acad_Group"), Some(Handle::new(0xE)));
        assert_eq!(dict.entries()[0].0, "ACAD_GROUP");
        assert_eq!(dict.get("MISSING"), None);
    }

    #[test]
    fn test_dictionary_remove_handle() {
        let mut dict = Dictionary::new();
        dict.add_entry("A", Handle::new(1));
        dict.add_entry("B", Handle::new(2));
        assert!(dict.remove_handle(Handle::new(1)));
        assert!(!dict.remove_handle(Handle::new(1)));
        assert_eq!(dict.remove("b"), Some(Handle::new(2)));
        assert!(dict.is_empty());
    }

    #[test]
    fn test_object_dispatch() {
        let mut obj = ObjectType::XRecord(XRecord::new());
        obj.as_object_mut().set_handle(Handle::new(0x2A));
        assert_eq!(obj.handle(), Handle::new(0x2A));
        assert_eq!(obj.dxf_name(), "XRECORD");
        assert!(obj.as_dictionary().is_none());
    }
}
