//! Block record table entry and its BLOCK/ENDBLK pair

use bitflags::bitflags;

use super::{TableEntry, MODEL_SPACE, PAPER_SPACE};
use crate::entities::{EntityCommon, EntityType};
use crate::types::{Handle, Vector3};
use crate::xdata::ExtendedData;

bitflags! {
    /// Block-type flags (group code 70 of BLOCK)
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct BlockFlags: i16 {
        const ANONYMOUS = 1;
        const HAS_ATTRIBUTES = 2;
        const XREF = 4;
        const XREF_OVERLAY = 8;
        const EXTERNAL = 16;
        const RESOLVED = 32;
        const REFERENCED = 64;
    }
}

/// The BLOCK record opening a block definition in the BLOCKS section
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BlockBegin {
    pub common: EntityCommon,
    /// Base point (10)
    pub base_point: Vector3,
    pub flags: BlockFlags,
    /// Description (4)
    pub description: String,
    /// Xref path (1)
    pub xref_path: String,
}

crate::impl_cad_object!(BlockBegin, common);

/// The ENDBLK record closing a block definition
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BlockEnd {
    pub common: EntityCommon,
}

crate::impl_cad_object!(BlockEnd, common);

/// A block record table entry together with its definition
#[derive(Debug, Clone, PartialEq)]
pub struct BlockRecord {
    pub handle: Handle,
    pub owner: Handle,
    pub reactors: Vec<Handle>,
    pub xdictionary: Handle,
    pub extended_data: ExtendedData,
    /// Block name (2)
    pub name: String,
    /// Layout object (340)
    pub layout: Handle,
    /// Insertion units (70)
    pub units: i16,
    /// Explodability (280)
    pub explodable: bool,
    /// Uniform scaling only (281)
    pub scale_uniformly: bool,
    pub block: BlockBegin,
    pub end: BlockEnd,
    /// Entities of the definition. Model and paper space keep theirs in
    /// the document's entity list instead.
    pub entities: Vec<EntityType>,
}

impl BlockRecord {
    pub fn new(name: impl Into<String>) -> Self {
        BlockRecord {
            handle: Handle::NULL,
            owner: Handle::NULL,
            reactors: Vec::new(),
            xdictionary: Handle::NULL,
            extended_data: ExtendedData::new(),
            name: name.into(),
            layout: Handle::NULL,
            units: 0,
            explodable: true,
            scale_uniformly: false,
            block: BlockBegin::default(),
            end: BlockEnd::default(),
            entities: Vec::new(),
        }
    }

    pub fn model_space() -> Self {
        Self::new(MODEL_SPACE)
    }

    pub fn paper_space() -> Self {
        Self::new(PAPER_SPACE)
    }

    pub fn is_model_space(&self) -> bool {
        self.name.eq_ignore_ascii_case(MODEL_SPACE)
    }

    pub fn is_paper_space(&self) -> bool {
        self.name.to_ascii_uppercase().starts_with("*PAPER_SPACE")
    }

    pub fn is_layout(&self) -> bool {
        self.is_model_space() || self.is_paper_space()
    }

    pub fn is_anonymous(&self) -> bool {
        self.block.flags.contains(BlockFlags::ANONYMOUS) || self.name.starts_with('*')
    }

    /// Handles of the records this entry owns: BLOCK, ENDBLK, entities and
    /// the entities' own sub-records
    pub fn owned_handles(&self) -> Vec<Handle> {
        let mut handles = vec![self.block.common.handle, self.end.common.handle];
        for entity in &self.entities {
            handles.push(entity.handle());
            handles.extend(entity.owned_handles());
        }
        handles
    }
}

impl TableEntry for BlockRecord {
    const TABLE_NAME: &'static str = "BLOCK_RECORD";

    fn name(&self) -> &str {
        &self.name
    }

    fn set_name(&mut self, name: String) {
        self.name = name;
    }

    fn is_standard(&self) -> bool {
        self.is_layout()
    }
}

crate::impl_cad_object!(BlockRecord);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_names() {
        assert!(BlockRecord::model_space().is_model_space());
        assert!(BlockRecord::new("*Paper_Space0").is_paper_space());
        assert!(BlockRecord::new("*D3").is_anonymous());
        assert!(!BlockRecord::new("DOOR").is_layout());
    }
}
