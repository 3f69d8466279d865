//! Post-load reference resolution
//!
//! Records refer to each other by name (layers, line types, styles, blocks)
//! and by handle (reactors, extension dictionaries, definitions). A file may
//! define an entry after its first use, so nothing is checked while records
//! are mapped; this pass runs once the whole document is loaded.
//!
//! A reference without a definition is a [`DxfError::DanglingReference`]. In
//! lenient mode the table's default entry is substituted and the problem is
//! recorded; in strict mode the load fails.

use ahash::AHashSet;

use super::ParseMode;
use crate::document::{is_sentinel_linetype, CadDocument};
use crate::entities::{EntityCommon, EntityType, BY_LAYER};
use crate::error::{DxfError, Result};
use crate::notification::{NotificationCollection, NotificationType};
use crate::objects::{MLineStyle, ObjectType};
use crate::tables::{Table, TableEntry};
use crate::types::Handle;

fn upper_names<T: TableEntry>(table: &Table<T>) -> AHashSet<String> {
    table.names().map(str::to_uppercase).collect()
}

/// Lookup indices built from the loaded document
struct Index {
    layers: AHashSet<String>,
    line_types: AHashSet<String>,
    text_styles: AHashSet<String>,
    dim_styles: AHashSet<String>,
    blocks: AHashSet<String>,
    handles: AHashSet<Handle>,
    text_style_handles: AHashSet<Handle>,
    mline_styles: Vec<(String, Handle)>,
}

impl Index {
    fn build(document: &CadDocument) -> Self {
        let mut handles = AHashSet::new();
        fn entries<T: TableEntry>(table: &Table<T>, handles: &mut AHashSet<Handle>) {
            handles.insert(table.handle());
            handles.extend(table.iter().map(|e| e.handle()));
        }
        entries(&document.layers, &mut handles);
        entries(&document.line_types, &mut handles);
        entries(&document.text_styles, &mut handles);
        entries(&document.dim_styles, &mut handles);
        entries(&document.app_ids, &mut handles);
        entries(&document.block_records, &mut handles);
        for raw in &document.raw_tables {
            handles.insert(raw.handle);
            handles.extend(raw.entries.iter().map(|e| e.handle));
        }
        for record in document.block_records.iter() {
            handles.insert(record.block.common.handle);
            handles.insert(record.end.common.handle);
        }
        for entity in document.all_entities() {
            handles.insert(entity.handle());
            handles.extend(entity.owned_handles());
        }
        handles.extend(document.objects().map(ObjectType::handle));
        handles.remove(&Handle::NULL);

        let mline_styles = document
            .objects()
            .filter_map(|o| match o {
                ObjectType::MLineStyle(s) => Some((s.name.to_uppercase(), s.handle)),
                _ => None,
            })
            .collect();

        Index {
            layers: upper_names(&document.layers),
            line_types: upper_names(&document.line_types),
            text_styles: upper_names(&document.text_styles),
            dim_styles: upper_names(&document.dim_styles),
            blocks: upper_names(&document.block_records),
            text_style_handles: document.text_styles.iter().map(|s| s.handle).collect(),
            handles,
            mline_styles,
        }
    }

    fn max_handle(&self) -> u64 {
        self.handles.iter().map(|h| h.value()).max().unwrap_or(0)
    }

    fn mline_style(&self, name: &str) -> Option<Handle> {
        let name = name.to_uppercase();
        self.mline_styles.iter().find(|(n, _)| *n == name).map(|(_, h)| *h)
    }
}

struct Resolver {
    mode: ParseMode,
    index: Index,
    notifications: NotificationCollection,
    substituted: usize,
}

fn known(set: &AHashSet<String>, name: &str) -> bool {
    set.contains(&name.to_uppercase())
}

impl Resolver {
    fn dangling(&mut self, kind: &'static str, reference: String, owner: Handle) -> Result<()> {
        let error = DxfError::DanglingReference { kind, reference, owner };
        if self.mode == ParseMode::Strict {
            return Err(error);
        }
        self.notifications.recovered(&error, owner);
        self.substituted += 1;
        Ok(())
    }

    /// Replace a name without a definition by `fallback`
    fn name(&mut self, kind: &'static str, found: bool, slot: &mut String, fallback: &str, owner: Handle) -> Result<()> {
        if found {
            return Ok(());
        }
        let reference = std::mem::replace(slot, fallback.to_string());
        self.dangling(kind, reference, owner)
    }

    /// Clear a handle without a definition
    fn handle(&mut self, kind: &'static str, slot: &mut Handle, owner: Handle) -> Result<()> {
        if slot.is_null() || self.index.handles.contains(slot) {
            return Ok(());
        }
        let reference = slot.to_string();
        *slot = Handle::NULL;
        self.dangling(kind, reference, owner)
    }

    fn reactors(&mut self, reactors: &mut Vec<Handle>, owner: Handle) -> Result<()> {
        let missing: Vec<Handle> = reactors
            .iter()
            .copied()
            .filter(|h| !self.index.handles.contains(h))
            .collect();
        if missing.is_empty() {
            return Ok(());
        }
        reactors.retain(|h| !missing.contains(h));
        for reactor in missing {
            self.dangling("reactor", reactor.to_string(), owner)?;
        }
        Ok(())
    }

    fn common(&mut self, common: &mut EntityCommon) -> Result<()> {
        let owner = common.handle;
        let layer = known(&self.index.layers, &common.layer);
        self.name("layer", layer, &mut common.layer, "0", owner)?;
        let linetype = is_sentinel_linetype(&common.linetype) || known(&self.index.line_types, &common.linetype);
        self.name("line type", linetype, &mut common.linetype, BY_LAYER, owner)?;
        self.reactors(&mut common.reactors, owner)?;
        self.handle("extension dictionary", &mut common.xdictionary, owner)
    }

    fn text_style(&mut self, slot: &mut String, owner: Handle) -> Result<()> {
        let found = known(&self.index.text_styles, slot);
        self.name("text style", found, slot, "Standard", owner)
    }

    /// Resolve one entity. Returns `false` when the entity cannot be kept.
    fn entity(&mut self, entity: &mut EntityType) -> Result<bool> {
        self.common(entity.common_mut())?;
        for sub in entity.sub_records_mut() {
            self.common(sub)?;
        }
        let owner = entity.handle();
        match entity {
            EntityType::Text(t) => self.text_style(&mut t.style, owner)?,
            EntityType::MText(t) => self.text_style(&mut t.style, owner)?,
            EntityType::AttributeDefinition(a) => self.text_style(&mut a.text.style, owner)?,
            EntityType::Insert(insert) => {
                if !known(&self.index.blocks, &insert.block_name) {
                    // no default block to fall back to
                    self.dangling("block", insert.block_name.clone(), owner)?;
                    return Ok(false);
                }
                for attribute in &mut insert.attributes {
                    let handle = attribute.text.common.handle;
                    self.text_style(&mut attribute.text.style, handle)?;
                }
            }
            EntityType::Dimension(d) => {
                let base = d.base_mut();
                let style = known(&self.index.dim_styles, &base.style);
                self.name("dimension style", style, &mut base.style, "Standard", owner)?;
                if !base.block_name.is_empty() && !known(&self.index.blocks, &base.block_name) {
                    let reference = std::mem::take(&mut base.block_name);
                    base.mark_stale();
                    self.dangling("block", reference, owner)?;
                }
            }
            EntityType::MLine(m) => {
                if !self.index.handles.contains(&m.style) {
                    let by_name = self
                        .index
                        .mline_style(&m.style_name)
                        .or_else(|| self.index.mline_style(MLineStyle::DEFAULT_NAME));
                    match by_name {
                        Some(handle) if m.style.is_null() => m.style = handle,
                        _ => {
                            let reference = if m.style.is_null() { m.style_name.clone() } else { m.style.to_string() };
                            m.style = by_name.unwrap_or(Handle::NULL);
                            self.dangling("multiline style", reference, owner)?;
                        }
                    }
                }
            }
            EntityType::Underlay(u) => self.handle("underlay definition", &mut u.definition, owner)?,
            EntityType::Wipeout(w) => {
                self.handle("image definition", &mut w.definition, owner)?;
                self.handle("image definition reactor", &mut w.definition_reactor, owner)?;
            }
            _ => {}
        }
        Ok(true)
    }

    fn entities(&mut self, entities: &mut Vec<EntityType>, dropped: &mut usize) -> Result<()> {
        let mut kept = Vec::with_capacity(entities.len());
        for mut entity in entities.drain(..) {
            if self.entity(&mut entity)? {
                kept.push(entity);
            } else {
                *dropped += 1;
            }
        }
        *entities = kept;
        Ok(())
    }

    fn tables(&mut self, document: &mut CadDocument) -> Result<()> {
        for layer in document.layers.iter_mut() {
            let owner = layer.handle;
            let found = is_sentinel_linetype(&layer.linetype) || known(&self.index.line_types, &layer.linetype);
            self.name("line type", found, &mut layer.linetype, "Continuous", owner)?;
        }
        for style in document.dim_styles.iter_mut() {
            if !style.text_style.is_null() && !self.index.text_style_handles.contains(&style.text_style) {
                let reference = style.text_style.to_string();
                style.text_style = Handle::NULL;
                self.dangling("text style", reference, style.handle)?;
            }
        }
        Ok(())
    }

    fn objects(&mut self, document: &mut CadDocument) -> Result<()> {
        for object in document.objects_mut() {
            let owner = object.handle();
            let target = object.as_object_mut();
            let mut reactors = target.reactors().to_vec();
            self.reactors(&mut reactors, owner)?;
            *target.reactors_mut() = reactors;
            let mut xdictionary = target.xdictionary();
            self.handle("extension dictionary", &mut xdictionary, owner)?;
            target.set_xdictionary(xdictionary);

            if let ObjectType::Dictionary(dict) = object {
                let missing: Vec<(String, Handle)> = dict
                    .entries()
                    .iter()
                    .filter(|(_, h)| !self.index.handles.contains(h))
                    .cloned()
                    .collect();
                for (key, handle) in missing {
                    dict.remove(&key);
                    self.dangling("dictionary entry", format!("{} ({})", key, handle), owner)?;
                }
            }
        }
        Ok(())
    }
}

/// Application names used by XData anywhere in the document
fn xdata_applications(document: &CadDocument) -> Vec<String> {
    let mut seen = AHashSet::new();
    let mut names = Vec::new();
    let entities = document.all_entities().map(|e| &e.common().extended_data);
    let objects = document.objects().map(|o| o.as_object().extended_data());
    for data in entities.chain(objects) {
        for name in data.application_names() {
            if seen.insert(name.to_uppercase()) {
                names.push(name.to_string());
            }
        }
    }
    names
}

/// Register the applications XData refers to. Applications the document
/// refuses are stripped in lenient mode.
fn register_applications(document: &mut CadDocument, mode: ParseMode, notifications: &mut NotificationCollection) -> Result<()> {
    for name in xdata_applications(document) {
        if document.app_ids.contains(&name) {
            continue;
        }
        match document.register_application(&name) {
            Ok(()) => {
                notifications.notify(
                    NotificationType::Warning,
                    format!("application '{}' registered for its extended data", name),
                );
            }
            Err(error) if mode == ParseMode::Lenient => {
                notifications.recovered(&error, Handle::NULL);
                for entity in document.all_entities_mut() {
                    entity.common_mut().extended_data.remove(&name);
                }
                for object in document.objects_mut() {
                    object.as_object_mut().extended_data_mut().remove(&name);
                }
            }
            Err(error) => return Err(error),
        }
    }
    Ok(())
}

/// Resolve every reference of a freshly read document, then give records
/// without handles (R12 files) fresh ones.
pub(crate) fn resolve(document: &mut CadDocument, mode: ParseMode) -> Result<()> {
    let mut index = Index::build(document);
    let mut exhausted = NotificationCollection::new();
    let seed = document.header.handle_seed.value();
    let next = match index.max_handle().checked_add(1) {
        Some(next) if seed != u64::MAX => seed.max(next),
        _ => {
            // allocation wraps around to the free values
            exhausted.notify(
                NotificationType::Warning,
                "handle space exhausted, new handles reuse free values",
            );
            u64::MAX
        }
    };
    document.set_next_handle(next);
    // fallback targets of substitutions must exist
    let standard = document.ensure_standard_entries();
    if standard > 0 {
        tracing::debug!(added = standard, "standard entries added");
        index = Index::build(document);
    }

    let mut resolver = Resolver {
        mode,
        index,
        notifications: NotificationCollection::new(),
        substituted: 0,
    };

    resolver.tables(document)?;
    let mut dropped = 0usize;
    for record in document.block_records.iter_mut() {
        resolver.common(&mut record.block.common)?;
        resolver.entities(&mut record.entities, &mut dropped)?;
    }
    resolver.entities(document.entity_list_mut(), &mut dropped)?;
    resolver.objects(document)?;

    let mut notifications = std::mem::take(&mut resolver.notifications);
    notifications.append(&mut exhausted);
    register_applications(document, mode, &mut notifications)?;

    let next = match resolver.index.max_handle().checked_add(1) {
        Some(next) => document.next_handle().max(next),
        None => document.next_handle(),
    };
    document.set_next_handle(next);
    let assigned = document.assign_handles();

    if document.root_dictionary().is_null() {
        let root = document
            .objects()
            .find_map(|o| match o {
                ObjectType::Dictionary(d) if d.owner.is_null() => Some(d.handle),
                _ => None,
            });
        if let Some(root) = root {
            document.set_root_dictionary(root);
        }
    }

    tracing::debug!(
        substituted = resolver.substituted,
        dropped,
        assigned,
        "references resolved"
    );
    document.notifications.append(&mut notifications);
    Ok(())
}
