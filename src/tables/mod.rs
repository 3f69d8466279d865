//! Symbol tables
//!
//! Typed tables (layers, line types, text styles, dimension styles,
//! application ids and block records) are looked up by name, case
//! insensitively. Table types without a typed model (VPORT, VIEW, UCS and
//! anything unrecognized) are kept as [`RawTable`]s and written back as read.

use indexmap::IndexMap;

use crate::cad_object::CadObject;
use crate::error::{DxfError, Result};
use crate::io::dxf::DxfValue;
use crate::types::Handle;

pub mod appid;
pub mod block_record;
pub mod dimstyle;
pub mod layer;
pub mod linetype;
pub mod textstyle;

pub use appid::AppId;
pub use block_record::{BlockBegin, BlockEnd, BlockFlags, BlockRecord};
pub use dimstyle::DimStyle;
pub use layer::{Layer, LayerFlags};
pub use linetype::{LineType, LineTypeElement};
pub use textstyle::{TextStyle, TextStyleFlags};

/// Name of the model space block record
pub const MODEL_SPACE: &str = "*Model_Space";
/// Name of the paper space block record
pub const PAPER_SPACE: &str = "*Paper_Space";

/// Entry of a symbol table
pub trait TableEntry: CadObject {
    /// Table name (`2` after `0 TABLE`), also the entry's `0` name
    const TABLE_NAME: &'static str;

    fn name(&self) -> &str;

    fn set_name(&mut self, name: String);

    /// Entries the document creates itself and that cannot be removed
    fn is_standard(&self) -> bool {
        false
    }
}

/// Table of named entries with case-insensitive lookup
#[derive(Debug, Clone, PartialEq)]
pub struct Table<T: TableEntry> {
    entries: IndexMap<String, T>,
    handle: Handle,
}

fn key(name: &str) -> String {
    name.to_uppercase()
}

impl<T: TableEntry> Table<T> {
    pub fn new() -> Self {
        Table {
            entries: IndexMap::new(),
            handle: Handle::NULL,
        }
    }

    /// Handle of the table control object
    pub fn handle(&self) -> Handle {
        self.handle
    }

    pub fn set_handle(&mut self, handle: Handle) {
        self.handle = handle;
    }

    /// Add an entry. Names are unique regardless of case.
    pub fn add(&mut self, entry: T) -> Result<()> {
        let k = key(entry.name());
        if self.entries.contains_key(&k) {
            return Err(DxfError::DuplicateEntry {
                kind: T::TABLE_NAME,
                name: entry.name().to_string(),
            });
        }
        self.entries.insert(k, entry);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&T> {
        self.entries.get(&key(name))
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut T> {
        self.entries.get_mut(&key(name))
    }

    pub fn get_by_handle(&self, handle: Handle) -> Option<&T> {
        if handle.is_null() {
            return None;
        }
        self.entries.values().find(|e| e.handle() == handle)
    }

    pub fn remove(&mut self, name: &str) -> Option<T> {
        self.entries.shift_remove(&key(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(&key(name))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.entries.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.entries.values_mut()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.values().map(|e| e.name())
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl<T: TableEntry> Default for Table<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Table record kept verbatim
#[derive(Debug, Clone, PartialEq)]
pub struct RawTableEntry {
    pub handle: Handle,
    pub owner: Handle,
    /// Every pair after the handle and owner, in file order
    pub tags: Vec<(i32, DxfValue)>,
}

impl RawTableEntry {
    /// Entry name (first group code 2), if any
    pub fn name(&self) -> Option<&str> {
        self.tags.iter().find_map(|(code, value)| match (code, value) {
            (2, DxfValue::Str(s)) => Some(s.as_str()),
            _ => None,
        })
    }
}

/// Table without a typed model
#[derive(Debug, Clone, PartialEq)]
pub struct RawTable {
    /// Table name, e.g. `VPORT`
    pub name: String,
    pub handle: Handle,
    pub entries: Vec<RawTableEntry>,
}

impl RawTable {
    pub fn new(name: impl Into<String>) -> Self {
        RawTable {
            name: name.into(),
            handle: Handle::NULL,
            entries: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_add_and_get() {
        let mut table = Table::new();
        table.add(Layer::new("Walls")).unwrap();
        assert!(table.contains("WALLS"));
        assert!(table.get("walls").is_some());
        assert_eq!(table.names().collect::<Vec<_>>(), vec!["Walls"]);
    }

    #[test]
    fn test_table_duplicate_entry() {
        let mut table = Table::new();
        table.add(Layer::new("Walls")).unwrap();
        let err = table.add(Layer::new("WALLS")).unwrap_err();
        assert!(matches!(err, DxfError::DuplicateEntry { kind: "LAYER", .. }));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_get_by_handle() {
        let mut table = Table::new();
        let mut layer = Layer::new("A");
        layer.handle = Handle::new(0x40);
        table.add(layer).unwrap();
        assert_eq!(table.get_by_handle(Handle::new(0x40)).map(|l| l.name.as_str()), Some("A"));
        assert!(table.get_by_handle(Handle::NULL).is_none());
    }
}
