//! Comparison helpers for documents read back from DXF.

#![allow(dead_code)]

use std::collections::BTreeMap;

use dxfcodec::entities::EntityType;
use dxfcodec::types::Vector3;
use dxfcodec::CadDocument;

pub fn approx_eq(a: f64, b: f64, tol: f64) -> bool {
    (a - b).abs() <= tol
}

pub fn assert_vec3_eq(a: &Vector3, b: &Vector3, tol: f64) {
    assert!(
        approx_eq(a.x, b.x, tol) && approx_eq(a.y, b.y, tol) && approx_eq(a.z, b.z, tol),
        "{:?} != {:?} (tol {})",
        a,
        b,
        tol
    );
}

/// Count of entities per DXF name
pub fn entity_type_histogram(doc: &CadDocument) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for entity in doc.entities() {
        *counts.entry(entity.dxf_name().to_string()).or_insert(0) += 1;
    }
    counts
}

/// (layer, linetype, text style) of every entity, in document order
pub fn references(doc: &CadDocument) -> Vec<(String, String, Option<String>)> {
    doc.entities()
        .map(|e| {
            (
                e.common().layer.to_uppercase(),
                e.common().linetype.to_uppercase(),
                e.text_style().map(str::to_uppercase),
            )
        })
        .collect()
}

/// Field-by-field equality of two entity lists, reporting the first mismatch
pub fn assert_entities_equal(expected: &[&EntityType], actual: &[&EntityType]) {
    assert_eq!(expected.len(), actual.len(), "entity count differs");
    for (e, a) in expected.iter().zip(actual) {
        assert_eq!(e, a, "{} differs after round trip", e.dxf_name());
    }
}

/// All handles of the document's entities and their sub-records are set
/// and distinct
pub fn assert_unique_handles(doc: &CadDocument) {
    let mut seen = std::collections::HashSet::new();
    for entity in doc.entities() {
        let handles = std::iter::once(entity.handle()).chain(entity.owned_handles());
        for handle in handles {
            assert!(handle.is_valid(), "{} without a handle", entity.dxf_name());
            assert!(seen.insert(handle), "handle {} used twice", handle);
        }
    }
    for record in doc.block_records.iter() {
        for entity in &record.entities {
            assert!(seen.insert(entity.handle()), "handle {} used twice", entity.handle());
        }
    }
    for object in doc.objects() {
        assert!(seen.insert(object.handle()), "handle {} used twice", object.handle());
    }
}
