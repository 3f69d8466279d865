//! The in-memory drawing
//!
//! A [`CadDocument`] owns every table, block, entity and object of one DXF
//! file. Entities of model and paper space live in the document's entity
//! list; entities of other blocks live in their [`BlockRecord`].

use std::fmt;
use std::sync::Arc;

use ahash::AHashSet;
use tracing::{debug, warn};

use crate::cad_object::CadObject;
use crate::classes::DxfClassCollection;
use crate::entities::{Dimension, EntityType, BY_BLOCK, BY_LAYER};
use crate::error::{DxfError, Result};
use crate::header::HeaderVariables;
use crate::io::dxf::DxfValue;
use crate::notification::NotificationCollection;
use crate::objects::{Dictionary, MLineStyle, ObjectType, ACAD_MLINESTYLE};
use crate::tables::{
    AppId, BlockFlags, BlockRecord, DimStyle, Layer, LineType, RawTable, Table, TableEntry,
    TextStyle, MODEL_SPACE, PAPER_SPACE,
};
use crate::types::{DxfVersion, Handle};
use crate::xdata::ExtendedDataRecord;

/// Interceptor for a name change: `(old, proposed) -> final`
pub type NameHook = Arc<dyn Fn(&str, &str) -> String + Send + Sync>;

/// Decides whether an unknown application may be registered
pub type AppRegisterHook = Arc<dyn Fn(&str) -> bool + Send + Sync>;

/// Callbacks invoked by the document's reference setters
///
/// Each name hook receives the current and the proposed value and returns
/// the value that is actually stored. Unset hooks accept the proposal.
#[derive(Clone, Default)]
pub struct DocumentHooks {
    pub on_layer_change: Option<NameHook>,
    pub on_linetype_change: Option<NameHook>,
    pub on_text_style_change: Option<NameHook>,
    pub on_dimstyle_change: Option<NameHook>,
    pub on_xdata_app_register: Option<AppRegisterHook>,
}

impl DocumentHooks {
    fn apply(hook: &Option<NameHook>, old: &str, proposed: &str) -> String {
        match hook {
            Some(f) => f(old, proposed),
            None => proposed.to_string(),
        }
    }

    fn allow_register(&self, name: &str) -> bool {
        self.on_xdata_app_register.as_ref().map_or(true, |f| f(name))
    }
}

impl fmt::Debug for DocumentHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocumentHooks")
            .field("on_layer_change", &self.on_layer_change.is_some())
            .field("on_linetype_change", &self.on_linetype_change.is_some())
            .field("on_text_style_change", &self.on_text_style_change.is_some())
            .field("on_dimstyle_change", &self.on_dimstyle_change.is_some())
            .field("on_xdata_app_register", &self.on_xdata_app_register.is_some())
            .finish()
    }
}

/// What happens to XData of an application missing from the APPID table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum XDataPolicy {
    /// Add the application to the APPID table
    #[default]
    AutoRegister,
    /// Refuse the XData
    Reject,
}

/// A section kept as raw tags (THUMBNAILIMAGE, ACDSDATA, unknown names)
#[derive(Debug, Clone, PartialEq)]
pub struct RawSection {
    pub name: String,
    pub tags: Vec<(i32, DxfValue)>,
}

/// A DXF drawing
#[derive(Debug, Clone)]
pub struct CadDocument {
    pub header: HeaderVariables,
    pub classes: DxfClassCollection,
    pub layers: Table<Layer>,
    pub line_types: Table<LineType>,
    pub text_styles: Table<TextStyle>,
    pub dim_styles: Table<DimStyle>,
    pub app_ids: Table<AppId>,
    pub block_records: Table<BlockRecord>,
    /// VPORT, VIEW, UCS and unrecognized tables, kept verbatim
    pub raw_tables: Vec<RawTable>,
    /// Sections without a model, in file order
    pub raw_sections: Vec<RawSection>,
    /// Diagnostics of the last read or write
    pub notifications: NotificationCollection,
    pub hooks: DocumentHooks,
    pub xdata_policy: XDataPolicy,
    entities: Vec<EntityType>,
    objects: Vec<ObjectType>,
    root_dictionary: Handle,
    next_handle: u64,
    /// Set once `next_handle` ran past `u64::MAX`; from then on every
    /// allocation searches for a free value
    handles_wrapped: bool,
}

impl CadDocument {
    /// A drawing with the standard entries every DXF file has: layer "0",
    /// the ByLayer/ByBlock/Continuous line types, the Standard text and
    /// dimension styles, the ACAD application, model and paper space, and
    /// the root dictionary with the Standard multiline style.
    pub fn new() -> Self {
        let mut doc = Self::empty();
        doc.ensure_standard_entries();
        doc.assign_handles();
        doc
    }

    pub fn with_version(version: DxfVersion) -> Self {
        let mut doc = Self::new();
        doc.header.version = version;
        doc
    }

    /// A drawing with no tables, blocks or objects. The reader starts here.
    pub fn empty() -> Self {
        CadDocument {
            header: HeaderVariables::new(),
            classes: DxfClassCollection::new(),
            layers: Table::new(),
            line_types: Table::new(),
            text_styles: Table::new(),
            dim_styles: Table::new(),
            app_ids: Table::new(),
            block_records: Table::new(),
            raw_tables: Vec::new(),
            raw_sections: Vec::new(),
            notifications: NotificationCollection::new(),
            hooks: DocumentHooks::default(),
            xdata_policy: XDataPolicy::default(),
            entities: Vec::new(),
            objects: Vec::new(),
            root_dictionary: Handle::NULL,
            next_handle: 1,
            handles_wrapped: false,
        }
    }

    pub fn version(&self) -> DxfVersion {
        self.header.version
    }

    /// Add whichever standard entries are missing. Returns how many were added.
    pub fn ensure_standard_entries(&mut self) -> usize {
        let mut added = 0;
        let mut add = |ok: bool| {
            if ok {
                added += 1;
            }
        };

        add(self.layers.add(Layer::default_layer().clone()).is_ok());
        add(self.line_types.add(LineType::by_layer().clone()).is_ok());
        add(self.line_types.add(LineType::new(BY_BLOCK)).is_ok());
        add(self.line_types.add(LineType::continuous()).is_ok());
        add(self.text_styles.add(TextStyle::default_style().clone()).is_ok());
        add(self.dim_styles.add(DimStyle::default_style().clone()).is_ok());
        add(self.app_ids.add(AppId::acad()).is_ok());
        add(self.block_records.add(BlockRecord::model_space()).is_ok());
        add(self.block_records.add(BlockRecord::paper_space()).is_ok());

        if self.root_dictionary.is_null() && self.objects.is_empty() {
            let mut root = Dictionary::new();
            root.handle = self.allocate_handle();
            self.root_dictionary = root.handle;

            let mut styles = Dictionary::new();
            styles.handle = self.allocate_handle();
            styles.owner = root.handle;
            root.add_entry(ACAD_MLINESTYLE, styles.handle);

            let mut standard = MLineStyle::standard();
            standard.handle = self.allocate_handle();
            standard.owner = styles.handle;
            styles.add_entry(MLineStyle::DEFAULT_NAME, standard.handle);

            self.objects.push(ObjectType::Dictionary(root));
            self.objects.push(ObjectType::Dictionary(styles));
            self.objects.push(ObjectType::MLineStyle(standard));
            added += 3;
        }
        added
    }

    /// Hand out a fresh handle
    pub fn allocate_handle(&mut self) -> Handle {
        if self.next_handle == u64::MAX || self.handles_wrapped {
            if !self.handles_wrapped {
                warn!("handle space exhausted, reusing free handles");
                self.handles_wrapped = true;
            }
            let taken = self.taken_handles();
            self.next_handle = free_handle(&taken, self.next_handle);
        }
        let handle = Handle::new(self.next_handle);
        self.next_handle += 1;
        handle
    }

    fn taken_handles(&mut self) -> AHashSet<u64> {
        let mut taken = AHashSet::new();
        self.walk_handles(&mut |h: &mut Handle| {
            if !h.is_null() {
                taken.insert(h.value());
            }
        });
        taken
    }

    /// Next value [`allocate_handle`](Self::allocate_handle) would return
    pub fn next_handle(&self) -> u64 {
        self.next_handle
    }

    pub(crate) fn set_next_handle(&mut self, next: u64) {
        self.next_handle = next.max(1);
    }

    pub fn model_space_handle(&self) -> Handle {
        self.block_records
            .get(MODEL_SPACE)
            .map_or(Handle::NULL, |b| b.handle)
    }

    pub fn paper_space_handle(&self) -> Handle {
        self.block_records
            .get(PAPER_SPACE)
            .map_or(Handle::NULL, |b| b.handle)
    }

    // ---- entities ----

    /// Add an entity to model space (or paper space when its `paper_space`
    /// flag is set).
    ///
    /// Handles are assigned to the entity and its sub-records. Layers, line
    /// types, text styles and dimension styles it names are created when
    /// missing. Inserts must name an existing block.
    pub fn add_entity(&mut self, mut entity: EntityType) -> Result<Handle> {
        self.prepare_entity(&mut entity)?;
        let owner = if entity.common().paper_space {
            self.paper_space_handle()
        } else {
            self.model_space_handle()
        };
        set_owner_tree(&mut entity, owner);
        let handle = entity.handle();
        self.entities.push(entity);
        Ok(handle)
    }

    /// Add an entity to the definition of block `block_name`
    pub fn add_entity_to_block(&mut self, block_name: &str, mut entity: EntityType) -> Result<Handle> {
        if !self.block_records.contains(block_name) {
            return Err(DxfError::MissingReference {
                kind: "block",
                reference: block_name.to_string(),
                owner: entity.handle(),
            });
        }
        self.prepare_entity(&mut entity)?;
        let handle = entity.handle();
        let record = self
            .block_records
            .get_mut(block_name)
            .ok_or(DxfError::ObjectNotFound(handle))?;
        set_owner_tree(&mut entity, record.handle);
        if record.is_layout() {
            entity.common_mut().paper_space = record.is_paper_space();
            self.entities.push(entity);
        } else {
            record.entities.push(entity);
        }
        Ok(handle)
    }

    fn prepare_entity(&mut self, entity: &mut EntityType) -> Result<()> {
        if let EntityType::Insert(insert) = &*entity {
            if !self.block_records.contains(&insert.block_name) {
                return Err(DxfError::MissingReference {
                    kind: "block",
                    reference: insert.block_name.clone(),
                    owner: insert.common.handle,
                });
            }
        }
        self.ensure_entity_references(entity)?;
        if entity.handle().is_null() {
            let handle = self.allocate_handle();
            entity.common_mut().handle = handle;
        }
        for common in entity.sub_records_mut() {
            if common.handle.is_null() {
                common.handle = self.allocate_handle();
            }
        }
        Ok(())
    }

    /// Create the table entries `entity` names but the document lacks
    fn ensure_entity_references(&mut self, entity: &EntityType) -> Result<()> {
        self.ensure_layer(&entity.common().layer)?;
        self.ensure_linetype(&entity.common().linetype)?;
        if let Some(style) = entity.text_style() {
            self.ensure_text_style(style)?;
        }
        match entity {
            EntityType::Dimension(d) => {
                let name = d.base().style.clone();
                self.ensure_dimstyle(&name)?;
            }
            EntityType::Insert(i) => {
                for attribute in &i.attributes {
                    let style = attribute.text.style.clone();
                    self.ensure_text_style(&style)?;
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn ensure_layer(&mut self, name: &str) -> Result<()> {
        if name.is_empty() || self.layers.contains(name) {
            return Ok(());
        }
        let mut layer = Layer::new(name);
        layer.handle = self.allocate_handle();
        self.layers.add(layer)
    }

    fn ensure_linetype(&mut self, name: &str) -> Result<()> {
        if name.is_empty() || is_sentinel_linetype(name) || self.line_types.contains(name) {
            return Ok(());
        }
        let mut linetype = LineType::new(name);
        linetype.handle = self.allocate_handle();
        self.line_types.add(linetype)
    }

    fn ensure_text_style(&mut self, name: &str) -> Result<()> {
        if name.is_empty() || self.text_styles.contains(name) {
            return Ok(());
        }
        let mut style = TextStyle::new(name);
        style.handle = self.allocate_handle();
        self.text_styles.add(style)
    }

    fn ensure_dimstyle(&mut self, name: &str) -> Result<()> {
        if name.is_empty() || self.dim_styles.contains(name) {
            return Ok(());
        }
        let mut style = DimStyle::new(name);
        style.handle = self.allocate_handle();
        self.dim_styles.add(style)
    }

    /// Model and paper space entities, in file order
    pub fn entities(&self) -> impl Iterator<Item = &EntityType> {
        self.entities.iter()
    }

    pub fn entities_mut(&mut self) -> impl Iterator<Item = &mut EntityType> {
        self.entities.iter_mut()
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Entity lists of the document and of every block, mutable
    pub(crate) fn all_entities_mut(&mut self) -> impl Iterator<Item = &mut EntityType> {
        self.entities.iter_mut().chain(
            self.block_records
                .iter_mut()
                .flat_map(|record| record.entities.iter_mut()),
        )
    }

    pub(crate) fn all_entities(&self) -> impl Iterator<Item = &EntityType> {
        self.entities
            .iter()
            .chain(self.block_records.iter().flat_map(|record| record.entities.iter()))
    }

    /// Find an entity in model/paper space or in any block
    pub fn get_entity(&self, handle: Handle) -> Option<&EntityType> {
        if handle.is_null() {
            return None;
        }
        self.all_entities().find(|e| e.handle() == handle)
    }

    pub fn get_entity_mut(&mut self, handle: Handle) -> Option<&mut EntityType> {
        if handle.is_null() {
            return None;
        }
        self.all_entities_mut().find(|e| e.handle() == handle)
    }

    pub(crate) fn entity_list_mut(&mut self) -> &mut Vec<EntityType> {
        &mut self.entities
    }

    pub(crate) fn push_entity(&mut self, entity: EntityType) {
        self.entities.push(entity);
    }

    /// Remove an entity and detach everything that pointed at it: reactor
    /// entries, dictionary entries and its extension dictionary.
    pub fn remove_entity(&mut self, handle: Handle) -> Option<EntityType> {
        if handle.is_null() {
            return None;
        }
        let removed = match self.entities.iter().position(|e| e.handle() == handle) {
            Some(index) => self.entities.remove(index),
            None => self.block_records.iter_mut().find_map(|record| {
                let index = record.entities.iter().position(|e| e.handle() == handle)?;
                Some(record.entities.remove(index))
            })?,
        };

        let mut gone: AHashSet<Handle> = AHashSet::new();
        gone.insert(handle);
        gone.extend(removed.owned_handles());

        let xdictionary = removed.common().xdictionary;
        if xdictionary.is_valid() {
            self.objects.retain(|o| o.handle() != xdictionary);
            gone.insert(xdictionary);
        }
        self.detach_handles(&gone);
        debug!(handle = %handle, detached = gone.len(), "removed entity");
        Some(removed)
    }

    fn detach_handles(&mut self, gone: &AHashSet<Handle>) {
        for entity in self.all_entities_mut() {
            entity.common_mut().reactors.retain(|h| !gone.contains(h));
        }
        for object in &mut self.objects {
            object.as_object_mut().reactors_mut().retain(|h| !gone.contains(h));
            if let ObjectType::Dictionary(dict) = object {
                dict.entries_mut().retain(|(_, h)| !gone.contains(h));
            }
        }
    }

    // ---- reference setters with hooks ----

    /// Move an entity to another layer. The layer hook decides the final
    /// name; the layer is created when missing.
    pub fn set_entity_layer(&mut self, handle: Handle, layer: &str) -> Result<String> {
        let hooks = self.hooks.clone();
        let entity = self
            .get_entity_mut(handle)
            .ok_or(DxfError::ObjectNotFound(handle))?;
        let common = entity.common_mut();
        let name = DocumentHooks::apply(&hooks.on_layer_change, &common.layer, layer);
        common.layer = name.clone();
        self.ensure_layer(&name)?;
        Ok(name)
    }

    pub fn set_entity_linetype(&mut self, handle: Handle, linetype: &str) -> Result<String> {
        let hooks = self.hooks.clone();
        let entity = self
            .get_entity_mut(handle)
            .ok_or(DxfError::ObjectNotFound(handle))?;
        let common = entity.common_mut();
        let name = DocumentHooks::apply(&hooks.on_linetype_change, &common.linetype, linetype);
        common.linetype = name.clone();
        self.ensure_linetype(&name)?;
        Ok(name)
    }

    /// Change the text style of a TEXT, MTEXT or ATTDEF
    pub fn set_entity_text_style(&mut self, handle: Handle, style: &str) -> Result<String> {
        let hooks = self.hooks.clone();
        let entity = self
            .get_entity_mut(handle)
            .ok_or(DxfError::ObjectNotFound(handle))?;
        let slot = match entity {
            EntityType::Text(t) => &mut t.style,
            EntityType::MText(t) => &mut t.style,
            EntityType::AttributeDefinition(a) => &mut a.text.style,
            other => {
                return Err(DxfError::Custom(format!(
                    "{} has no text style",
                    other.dxf_name()
                )))
            }
        };
        let name = DocumentHooks::apply(&hooks.on_text_style_change, slot, style);
        *slot = name.clone();
        self.ensure_text_style(&name)?;
        Ok(name)
    }

    /// Change the dimension style of a DIMENSION. The dimension becomes stale.
    pub fn set_dimension_style(&mut self, handle: Handle, style: &str) -> Result<String> {
        let hooks = self.hooks.clone();
        let entity = self
            .get_entity_mut(handle)
            .ok_or(DxfError::ObjectNotFound(handle))?;
        let base = match entity {
            EntityType::Dimension(d) => d.base_mut(),
            other => {
                return Err(DxfError::Custom(format!(
                    "{} is not a dimension",
                    other.dxf_name()
                )))
            }
        };
        let name = DocumentHooks::apply(&hooks.on_dimstyle_change, &base.style, style);
        base.style = name.clone();
        base.mark_stale();
        self.ensure_dimstyle(&name)?;
        Ok(name)
    }

    /// Whether XData of `application` may be stored, registering the
    /// application when the policy and hook allow it
    pub fn register_application(&mut self, application: &str) -> Result<()> {
        if self.app_ids.contains(application) {
            return Ok(());
        }
        if self.xdata_policy == XDataPolicy::Reject || !self.hooks.allow_register(application) {
            return Err(DxfError::UnregisteredApplication(application.to_string()));
        }
        let mut app = AppId::new(application);
        app.handle = self.allocate_handle();
        self.app_ids.add(app)
    }

    /// Attach XData to an entity or object
    pub fn add_xdata(&mut self, handle: Handle, record: ExtendedDataRecord) -> Result<()> {
        self.register_application(&record.application_name)?;
        if let Some(entity) = self.get_entity_mut(handle) {
            entity.common_mut().extended_data.insert(record);
            return Ok(());
        }
        let object = self
            .get_object_mut(handle)
            .ok_or(DxfError::ObjectNotFound(handle))?;
        object.as_object_mut().extended_data_mut().insert(record);
        Ok(())
    }

    // ---- blocks ----

    /// Add a block definition. Handles are assigned to the record, its
    /// BLOCK/ENDBLK pair and its entities.
    pub fn add_block(&mut self, mut record: BlockRecord) -> Result<Handle> {
        if self.block_records.contains(&record.name) {
            return Err(DxfError::DuplicateEntry {
                kind: BlockRecord::TABLE_NAME,
                name: record.name,
            });
        }
        if record.handle.is_null() {
            record.handle = self.allocate_handle();
        }
        for common in [&mut record.block.common, &mut record.end.common] {
            if common.handle.is_null() {
                common.handle = self.allocate_handle();
            }
            common.owner = record.handle;
        }
        let mut entities = std::mem::take(&mut record.entities);
        for entity in &mut entities {
            self.prepare_entity(entity)?;
            set_owner_tree(entity, record.handle);
        }
        record.entities = entities;
        let handle = record.handle;
        self.block_records.add(record)?;
        Ok(handle)
    }

    /// Regenerate the anonymous `*D` block of every stale dimension.
    /// Returns the number of dimensions rebuilt.
    pub fn rebuild_dimension_blocks(&mut self) -> Result<usize> {
        let mut taken: AHashSet<String> = self
            .block_records
            .names()
            .map(|n| n.to_uppercase())
            .collect();
        let mut counter = 0usize;
        let mut rebuilt: Vec<(String, Vec<EntityType>)> = Vec::new();

        let mut visit = |dimension: &mut Dimension| {
            if !dimension.is_stale() {
                return;
            }
            let entities = dimension.rebuild_block();
            let base = dimension.base_mut();
            let reuse = !base.block_name.is_empty()
                && base.block_name.starts_with("*D")
                && !rebuilt.iter().any(|(n, _)| n.eq_ignore_ascii_case(&base.block_name));
            if !reuse {
                loop {
                    let name = format!("*D{}", counter);
                    counter += 1;
                    if taken.insert(name.to_uppercase()) {
                        base.block_name = name;
                        break;
                    }
                }
            }
            rebuilt.push((base.block_name.clone(), entities));
        };

        for entity in self.entities.iter_mut() {
            if let EntityType::Dimension(d) = entity {
                visit(d);
            }
        }
        for record in self.block_records.iter_mut() {
            if record.name.starts_with("*D") {
                continue;
            }
            for entity in record.entities.iter_mut() {
                if let EntityType::Dimension(d) = entity {
                    visit(d);
                }
            }
        }

        let count = rebuilt.len();
        for (name, mut entities) in rebuilt {
            if !self.block_records.contains(&name) {
                let mut record = BlockRecord::new(name.clone());
                record.block.flags = BlockFlags::ANONYMOUS;
                record.handle = self.allocate_handle();
                record.block.common.handle = self.allocate_handle();
                record.block.common.owner = record.handle;
                record.end.common.handle = self.allocate_handle();
                record.end.common.owner = record.handle;
                self.block_records.add(record)?;
            }
            for entity in &mut entities {
                entity.common_mut().handle = self.allocate_handle();
                self.ensure_entity_references(entity)?;
            }
            if let Some(record) = self.block_records.get_mut(&name) {
                let owner = record.handle;
                for entity in &mut entities {
                    entity.common_mut().owner = owner;
                }
                record.entities = entities;
            }
        }
        if count > 0 {
            debug!(count, "rebuilt dimension blocks");
        }
        Ok(count)
    }

    // ---- objects ----

    pub fn objects(&self) -> impl Iterator<Item = &ObjectType> {
        self.objects.iter()
    }

    pub fn objects_mut(&mut self) -> impl Iterator<Item = &mut ObjectType> {
        self.objects.iter_mut()
    }

    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    pub fn get_object(&self, handle: Handle) -> Option<&ObjectType> {
        if handle.is_null() {
            return None;
        }
        self.objects.iter().find(|o| o.handle() == handle)
    }

    pub fn get_object_mut(&mut self, handle: Handle) -> Option<&mut ObjectType> {
        if handle.is_null() {
            return None;
        }
        self.objects.iter_mut().find(|o| o.handle() == handle)
    }

    /// Handle of the root (named object) dictionary
    pub fn root_dictionary(&self) -> Handle {
        self.root_dictionary
    }

    pub(crate) fn set_root_dictionary(&mut self, handle: Handle) {
        self.root_dictionary = handle;
    }

    pub(crate) fn push_object(&mut self, object: ObjectType) {
        self.objects.push(object);
    }

    /// Add an object under `key` in the dictionary `dictionary` of the root
    /// dictionary, creating that dictionary when needed
    pub fn add_named_object(&mut self, dictionary: &str, key: &str, mut object: ObjectType) -> Handle {
        if self.root_dictionary.is_null() {
            let mut root = Dictionary::new();
            root.handle = self.allocate_handle();
            self.root_dictionary = root.handle;
            self.objects.insert(0, ObjectType::Dictionary(root));
        }
        let root = self.root_dictionary;
        let existing = self
            .get_object(root)
            .and_then(ObjectType::as_dictionary)
            .and_then(|d| d.get(dictionary));
        let dict_handle = match existing {
            Some(h) => h,
            None => {
                let mut dict = Dictionary::new();
                dict.handle = self.allocate_handle();
                dict.owner = root;
                let h = dict.handle;
                if let Some(root_dict) = self.get_object_mut(root).and_then(ObjectType::as_dictionary_mut) {
                    root_dict.add_entry(dictionary, h);
                }
                self.objects.push(ObjectType::Dictionary(dict));
                h
            }
        };
        if object.handle().is_null() {
            let h = self.allocate_handle();
            object.as_object_mut().set_handle(h);
        }
        object.as_object_mut().set_owner(dict_handle);
        let handle = object.handle();
        if let Some(dict) = self.get_object_mut(dict_handle).and_then(ObjectType::as_dictionary_mut) {
            dict.add_entry(key, handle);
        }
        self.objects.push(object);
        handle
    }

    /// Handle of a multiline style by name
    pub fn mline_style(&self, name: &str) -> Option<Handle> {
        self.objects.iter().find_map(|o| match o {
            ObjectType::MLineStyle(s) if s.name.eq_ignore_ascii_case(name) => Some(s.handle),
            _ => None,
        })
    }

    // ---- handles ----

    /// Visit every handle slot of the document in writing order
    fn walk_handles(&mut self, f: &mut dyn FnMut(&mut Handle)) {
        fn touch(object: &mut dyn CadObject, f: &mut dyn FnMut(&mut Handle)) {
            let mut h = object.handle();
            f(&mut h);
            object.set_handle(h);
        }
        fn table<T: TableEntry>(table: &mut Table<T>, f: &mut dyn FnMut(&mut Handle)) {
            let mut h = table.handle();
            f(&mut h);
            table.set_handle(h);
            for entry in table.iter_mut() {
                touch(entry, f);
            }
        }
        fn entity(entity: &mut EntityType, f: &mut dyn FnMut(&mut Handle)) {
            f(&mut entity.common_mut().handle);
            for common in entity.sub_records_mut() {
                f(&mut common.handle);
            }
        }

        for raw in &mut self.raw_tables {
            f(&mut raw.handle);
            for entry in &mut raw.entries {
                f(&mut entry.handle);
            }
        }
        table(&mut self.line_types, f);
        table(&mut self.layers, f);
        table(&mut self.text_styles, f);
        table(&mut self.app_ids, f);
        table(&mut self.dim_styles, f);
        table(&mut self.block_records, f);
        for record in self.block_records.iter_mut() {
            f(&mut record.block.common.handle);
            for e in &mut record.entities {
                entity(e, f);
            }
            f(&mut record.end.common.handle);
        }
        for e in &mut self.entities {
            entity(e, f);
        }
        for object in &mut self.objects {
            touch(object.as_object_mut(), f);
        }
    }

    /// Give every record a unique handle and every owned record the right
    /// owner. Existing unique handles are kept; null and duplicate handles
    /// get fresh ones in walking order. Updates `$HANDSEED`.
    pub fn assign_handles(&mut self) -> usize {
        let mut taken = self.taken_handles();
        let max = taken.iter().copied().max().unwrap_or(0);
        let mut next = self.next_handle.max(max.saturating_add(1));

        let mut seen: AHashSet<u64> = AHashSet::new();
        let mut assigned = 0usize;
        self.walk_handles(&mut |h: &mut Handle| {
            if h.is_null() || !seen.insert(h.value()) {
                next = free_handle(&taken, next);
                *h = Handle::new(next);
                taken.insert(next);
                seen.insert(next);
                next += 1;
                assigned += 1;
            }
        });
        if next == u64::MAX || taken.iter().any(|&h| h >= next) {
            self.handles_wrapped = true;
            next = free_handle(&taken, next);
        }
        self.next_handle = next;
        self.header.handle_seed = Handle::new(next);
        self.fix_owners();
        if assigned > 0 {
            debug!(assigned, next, "assigned handles");
        }
        assigned
    }

    fn fix_owners(&mut self) {
        fn table<T: TableEntry>(table: &mut Table<T>) {
            let owner = table.handle();
            for entry in table.iter_mut() {
                entry.set_owner(owner);
            }
        }
        table(&mut self.line_types);
        table(&mut self.layers);
        table(&mut self.text_styles);
        table(&mut self.app_ids);
        table(&mut self.dim_styles);
        table(&mut self.block_records);
        for raw in &mut self.raw_tables {
            let owner = raw.handle;
            for entry in &mut raw.entries {
                entry.owner = owner;
            }
        }

        let model = self.model_space_handle();
        let paper = self.paper_space_handle();
        for record in self.block_records.iter_mut() {
            let owner = record.handle;
            record.block.common.owner = owner;
            record.end.common.owner = owner;
            for entity in &mut record.entities {
                set_owner_tree(entity, owner);
            }
        }
        for entity in &mut self.entities {
            let owner = if entity.common().paper_space { paper } else { model };
            set_owner_tree(entity, owner);
        }

        let owners: Vec<(Handle, Handle)> = self
            .objects
            .iter()
            .filter_map(ObjectType::as_dictionary)
            .flat_map(|d| d.entries().iter().map(move |(_, h)| (*h, d.handle)))
            .collect();
        for (child, owner) in owners {
            if let Some(object) = self.get_object_mut(child) {
                if object.as_object().owner().is_null() {
                    object.as_object_mut().set_owner(owner);
                }
            }
        }
    }
}

/// Set the owner of an entity and point its sub-records at it
/// First value from `start` on that is neither null, `u64::MAX` nor taken,
/// wrapping around to the low end
fn free_handle(taken: &AHashSet<u64>, start: u64) -> u64 {
    let mut candidate = start;
    while candidate == 0 || candidate == u64::MAX || taken.contains(&candidate) {
        candidate = candidate.wrapping_add(1);
    }
    candidate
}

fn set_owner_tree(entity: &mut EntityType, owner: Handle) {
    entity.common_mut().owner = owner;
    let parent = entity.handle();
    for common in entity.sub_records_mut() {
        common.owner = parent;
    }
}

/// Whether a line type name is one of the inherit sentinels
pub(crate) fn is_sentinel_linetype(name: &str) -> bool {
    name.eq_ignore_ascii_case(BY_LAYER) || name.eq_ignore_ascii_case(BY_BLOCK)
}

impl Default for CadDocument {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{Insert, Line, Polyline3D, Text};
    use crate::types::Vector3;
    use crate::xdata::XDataValue;

    fn line() -> EntityType {
        EntityType::Line(Line::from_coords(0.0, 0.0, 0.0, 1.0, 0.0, 0.0))
    }

    #[test]
    fn test_new_document_has_standard_entries() {
        let doc = CadDocument::new();
        assert!(doc.layers.contains("0"));
        assert!(doc.line_types.contains("ByLayer"));
        assert!(doc.line_types.contains("BYBLOCK"));
        assert!(doc.line_types.contains("Continuous"));
        assert!(doc.text_styles.contains("Standard"));
        assert!(doc.dim_styles.contains("Standard"));
        assert!(doc.app_ids.contains("ACAD"));
        assert!(doc.model_space_handle().is_valid());
        assert!(doc.paper_space_handle().is_valid());
        assert!(doc.mline_style("standard").is_some());
        assert!(doc.root_dictionary().is_valid());
    }

    #[test]
    fn test_add_entity_creates_layer_and_handle() {
        let mut doc = CadDocument::new();
        let mut entity = line();
        entity.common_mut().layer = "WALLS".into();
        let handle = doc.add_entity(entity).unwrap();
        assert!(handle.is_valid());
        assert!(doc.layers.contains("walls"));
        let stored = doc.get_entity(handle).unwrap();
        assert_eq!(stored.common().owner, doc.model_space_handle());
    }

    #[test]
    fn test_add_entity_assigns_sub_record_handles() {
        let mut doc = CadDocument::new();
        let poly = Polyline3D::from_points([Vector3::ZERO, Vector3::UNIT_X, Vector3::UNIT_Y], false);
        let handle = doc.add_entity(EntityType::Polyline3D(poly)).unwrap();
        let entity = doc.get_entity(handle).unwrap();
        let owned = entity.owned_handles();
        assert_eq!(owned.len(), 4);
        assert!(owned.iter().all(|h| h.is_valid() && *h != handle));
        if let EntityType::Polyline3D(p) = entity {
            assert!(p.vertices.iter().all(|v| v.common.owner == handle));
            assert_eq!(p.seqend.common.owner, handle);
        }
    }

    #[test]
    fn test_insert_requires_block() {
        let mut doc = CadDocument::new();
        let insert = Insert::new("DOOR", Vector3::ZERO);
        let err = doc.add_entity(EntityType::Insert(insert.clone())).unwrap_err();
        assert!(matches!(err, DxfError::MissingReference { kind: "block", .. }));

        doc.add_block(BlockRecord::new("DOOR")).unwrap();
        assert!(doc.add_entity(EntityType::Insert(insert)).is_ok());
    }

    #[test]
    fn test_layer_hook_can_replace_value() {
        let mut doc = CadDocument::new();
        doc.hooks.on_layer_change = Some(Arc::new(|_old: &str, proposed: &str| proposed.to_uppercase()));
        let handle = doc.add_entity(line()).unwrap();
        let final_name = doc.set_entity_layer(handle, "annotations").unwrap();
        assert_eq!(final_name, "ANNOTATIONS");
        assert_eq!(doc.get_entity(handle).unwrap().common().layer, "ANNOTATIONS");
        assert!(doc.layers.contains("ANNOTATIONS"));
    }

    #[test]
    fn test_text_style_hook_sees_old_value() {
        let mut doc = CadDocument::new();
        doc.hooks.on_text_style_change = Some(Arc::new(|old: &str, _proposed: &str| old.to_string()));
        let handle = doc.add_entity(EntityType::Text(Text::with_value("x", Vector3::ZERO))).unwrap();
        assert_eq!(doc.set_entity_text_style(handle, "Other").unwrap(), "Standard");
        assert!(!doc.text_styles.contains("Other"));
    }

    #[test]
    fn test_xdata_policy() {
        let mut doc = CadDocument::new();
        let handle = doc.add_entity(line()).unwrap();
        let record = ExtendedDataRecord::with_values("MYAPP", vec![XDataValue::String("v".into())]);
        doc.add_xdata(handle, record.clone()).unwrap();
        assert!(doc.app_ids.contains("MYAPP"));

        doc.xdata_policy = XDataPolicy::Reject;
        let other = ExtendedDataRecord::new("OTHERAPP");
        assert!(matches!(
            doc.add_xdata(handle, other),
            Err(DxfError::UnregisteredApplication(_))
        ));

        doc.xdata_policy = XDataPolicy::AutoRegister;
        doc.hooks.on_xdata_app_register = Some(Arc::new(|name: &str| name != "BLOCKED"));
        assert!(doc.add_xdata(handle, ExtendedDataRecord::new("BLOCKED")).is_err());
        assert!(doc.add_xdata(handle, ExtendedDataRecord::new("FINE")).is_ok());
    }

    #[test]
    fn test_remove_entity_cascades_reactors() {
        let mut doc = CadDocument::new();
        let first = doc.add_entity(line()).unwrap();
        let second = doc.add_entity(line()).unwrap();
        doc.get_entity_mut(second).unwrap().common_mut().reactors.push(first);
        let removed = doc.remove_entity(first).unwrap();
        assert_eq!(removed.handle(), first);
        assert!(doc.get_entity(first).is_none());
        assert!(doc.get_entity(second).unwrap().common().reactors.is_empty());
        assert!(doc.remove_entity(first).is_none());
    }

    #[test]
    fn test_assign_handles_fixes_duplicates() {
        let mut doc = CadDocument::new();
        let a = doc.add_entity(line()).unwrap();
        let b = doc.add_entity(line()).unwrap();
        doc.get_entity_mut(b).unwrap().common_mut().handle = a;
        let assigned = doc.assign_handles();
        assert_eq!(assigned, 1);
        let handles: Vec<Handle> = doc.entities().map(|e| e.handle()).collect();
        assert_eq!(handles[0], a);
        assert_ne!(handles[1], a);
        assert_eq!(doc.header.handle_seed.value(), doc.next_handle());
        assert_eq!(doc.assign_handles(), 0);
    }

    #[test]
    fn test_allocation_wraps_to_free_handles() {
        let mut doc = CadDocument::new();
        let taken = doc.taken_handles();
        doc.set_next_handle(u64::MAX);
        let a = doc.allocate_handle();
        let b = doc.allocate_handle();
        for h in [a, b] {
            assert!(h.is_valid());
            assert_ne!(h.value(), u64::MAX);
            assert!(!taken.contains(&h.value()));
        }
        assert_ne!(a, b);
    }

    #[test]
    fn test_assign_handles_next_to_highest_handle() {
        let mut doc = CadDocument::new();
        let a = doc.add_entity(line()).unwrap();
        let b = doc.add_entity(line()).unwrap();
        doc.get_entity_mut(a).unwrap().common_mut().handle = Handle::new(u64::MAX);
        doc.get_entity_mut(b).unwrap().common_mut().handle = Handle::new(u64::MAX);
        assert_eq!(doc.assign_handles(), 1);
        let handles: Vec<u64> = doc.entities().map(|e| e.handle().value()).collect();
        assert_eq!(handles[0], u64::MAX);
        assert_ne!(handles[1], u64::MAX);

        let fresh = doc.add_entity(line()).unwrap();
        assert!(!handles.contains(&fresh.value()));
        assert_eq!(doc.assign_handles(), 0);
    }

    #[test]
    fn test_rebuild_dimension_blocks_adds_record_once() {
        use crate::entities::DimensionAligned;

        let mut doc = CadDocument::new();
        let aligned = DimensionAligned::new(Vector3::ZERO, Vector3::new(10.0, 0.0, 0.0), 3.0);
        doc.add_entity(EntityType::Dimension(Dimension::Aligned(aligned))).unwrap();
        assert_eq!(doc.rebuild_dimension_blocks().unwrap(), 1);
        assert!(doc.block_records.iter().any(|r| r.name.starts_with("*D")));
        assert_eq!(doc.rebuild_dimension_blocks().unwrap(), 0);
    }
}
