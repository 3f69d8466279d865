//! Write then read: every entity variant in both dialects, version
//! gating, and byte-stable ASCII output

mod common;

use common::builders::{create_all_entities_document, create_single_entity_doc};
use common::comparison::{assert_entities_equal, assert_unique_handles, entity_type_histogram, references};
use common::{read_back, write_binary, write_text};
use dxfcodec::entities::{
    ArcEdge, BoundaryEdge, BoundaryPath, Circle, EntityType, Hatch, Line, LineEdge, Mesh, PolylineEdge, Text,
};
use dxfcodec::io::dxf::{DxfWriter, DxfWriterConfiguration};
use dxfcodec::types::{Vector2, Vector3};
use dxfcodec::{CadDocument, DxfError, DxfVersion};

fn entities(doc: &CadDocument) -> Vec<&EntityType> {
    doc.entities().collect()
}

#[test]
fn test_every_entity_round_trips_as_text() {
    let mut doc = create_all_entities_document();
    let bytes = write_text(&mut doc, DxfVersion::AC1032);
    let read = read_back(&bytes);
    assert_entities_equal(&entities(&doc), &entities(&read));
    assert_unique_handles(&read);
}

#[test]
fn test_every_entity_round_trips_as_binary() {
    let mut doc = create_all_entities_document();
    let bytes = write_binary(&mut doc, DxfVersion::AC1032);
    assert!(bytes.starts_with(b"AutoCAD Binary DXF\r\n\x1a\0"));
    let read = read_back(&bytes);
    assert_entities_equal(&entities(&doc), &entities(&read));
    assert_unique_handles(&read);
}

#[test]
fn test_single_entity_documents() {
    let names = [
        "POINT", "LINE", "CIRCLE", "ARC", "ELLIPSE", "LWPOLYLINE", "POLYLINE", "3DFACE", "SOLID", "TRACE",
        "MESH", "HATCH", "DIMENSION", "TEXT", "MTEXT", "INSERT", "RAY", "XLINE", "SHAPE", "OLE2FRAME",
        "PDFUNDERLAY", "WIPEOUT", "SPLINE", "MLINE",
    ];
    for name in names {
        let mut doc = create_single_entity_doc(name).unwrap_or_else(|| panic!("no builder for {}", name));
        let bytes = write_text(&mut doc, DxfVersion::AC1032);
        let read = read_back(&bytes);
        assert_eq!(read.entity_count(), 1, "{}", name);
        assert_entities_equal(&entities(&doc), &entities(&read));
    }
}

#[test]
fn test_counts_and_references_survive() {
    let mut doc = create_all_entities_document();
    let bytes = write_text(&mut doc, DxfVersion::AC1032);
    let read = read_back(&bytes);
    assert_eq!(entity_type_histogram(&doc), entity_type_histogram(&read));
    assert_eq!(references(&doc), references(&read));
    assert_eq!(read.layers.get("Walls").map(|l| l.color), doc.layers.get("Walls").map(|l| l.color));
    assert!(read.block_records.contains("DOOR"));
}

#[test]
fn test_ascii_output_is_idempotent() {
    let mut doc = create_all_entities_document();
    let first = write_text(&mut doc, DxfVersion::AC1032);
    let mut read = read_back(&first);
    let second = write_text(&mut read, DxfVersion::AC1032);
    assert_eq!(String::from_utf8_lossy(&first), String::from_utf8_lossy(&second));
}

#[test]
fn test_binary_output_is_idempotent() {
    let mut doc = create_all_entities_document();
    let first = write_binary(&mut doc, DxfVersion::AC1032);
    let mut read = read_back(&first);
    assert_eq!(first, write_binary(&mut read, DxfVersion::AC1032));
}

#[test]
fn test_dimension_block_is_generated_before_writing() {
    let mut doc = create_single_entity_doc("DIMENSION").unwrap();
    assert!(doc.entities().all(|e| match e {
        EntityType::Dimension(d) => d.is_stale(),
        _ => true,
    }));
    let bytes = write_text(&mut doc, DxfVersion::AC1015);
    let read = read_back(&bytes);
    let EntityType::Dimension(dimension) = read.entities().next().unwrap() else {
        panic!("expected a DIMENSION");
    };
    let block = &dimension.base().block_name;
    assert!(block.starts_with("*D"), "{}", block);
    let record = read.block_records.get(block).unwrap();
    assert!(!record.entities.is_empty());
    assert!((dimension.base().actual_measurement - 10.0).abs() < 1e-9);
}

#[test]
fn test_older_versions_round_trip_the_entities_they_support() {
    for version in [DxfVersion::AC1012, DxfVersion::AC1015, DxfVersion::AC1018, DxfVersion::AC1021] {
        let mut doc = CadDocument::new();
        doc.add_entity(EntityType::Line(Line::from_coords(0.0, 0.0, 0.0, 3.0, 4.0, 0.0)))
            .unwrap();
        doc.add_entity(EntityType::Circle(Circle::from_center(Vector3::new(1.0, 1.0, 0.0), 2.0).unwrap()))
            .unwrap();
        doc.add_entity(EntityType::Text(Text::with_value("R", Vector3::ZERO))).unwrap();

        let bytes = write_text(&mut doc, version);
        let read = read_back(&bytes);
        assert_eq!(read.version(), version);
        assert_entities_equal(&entities(&doc), &entities(&read));
    }
}

#[test]
fn test_r12_output_has_no_subclass_markers() {
    let mut doc = CadDocument::new();
    doc.add_entity(EntityType::Line(Line::from_coords(0.0, 0.0, 0.0, 3.0, 4.0, 0.0)))
        .unwrap();
    let bytes = write_text(&mut doc, DxfVersion::AC1009);
    let text = String::from_utf8(bytes.clone()).unwrap();
    assert!(!text.contains("AcDbEntity"));
    assert!(!text.contains("\nCLASSES\n"));
    assert!(!text.contains("\nOBJECTS\n"));

    let read = read_back(&bytes);
    assert_eq!(read.version(), DxfVersion::AC1009);
    let EntityType::Line(line) = read.entities().next().unwrap() else {
        panic!("expected a LINE");
    };
    assert_eq!(line.end, Vector3::new(3.0, 4.0, 0.0));
    assert!(line.common.handle.is_valid());
}

#[test]
fn test_entity_newer_than_target_version_is_rejected() {
    let mut doc = CadDocument::new();
    doc.add_entity(EntityType::Mesh(Mesh::new())).unwrap();
    let err = DxfWriter::new(&mut doc)
        .with_configuration(DxfWriterConfiguration::for_version(DxfVersion::AC1018))
        .write_to_vec()
        .unwrap_err();
    assert!(matches!(err, DxfError::UnsupportedVersion(_)), "{:?}", err);
}

#[test]
fn test_missing_layer_is_fatal_on_write() {
    let mut doc = CadDocument::new();
    let mut line = Line::from_coords(0.0, 0.0, 0.0, 1.0, 0.0, 0.0);
    line.common.layer = "Nowhere".into();
    doc.add_entity(EntityType::Line(line)).unwrap();
    doc.layers.remove("Nowhere");
    let err = DxfWriter::new(&mut doc).write_to_vec().unwrap_err();
    assert!(matches!(err, DxfError::MissingReference { kind: "layer", .. }), "{:?}", err);
}

#[test]
fn test_header_extras_and_raw_sections_are_preserved() {
    let text = common::dxf_text(&[
        (0, "SECTION"),
        (2, "HEADER"),
        (9, "$ACADVER"),
        (1, "AC1018"),
        (9, "$ANGBASE"),
        (50, "0.5"),
        (9, "$LTSCALE"),
        (40, "2.0"),
        (0, "ENDSEC"),
        (0, "SECTION"),
        (2, "ACDSDATA"),
        (70, "2"),
        (71, "6"),
        (0, "ENDSEC"),
        (0, "EOF"),
    ]);
    let mut doc = common::read_lenient(&text);
    assert_eq!(doc.header.linetype_scale, 2.0);
    let bytes = write_text(&mut doc, DxfVersion::AC1018);
    let read = read_back(&bytes);
    assert_eq!(read.header.get_extra("$ANGBASE"), doc.header.get_extra("$ANGBASE"));
    assert!(read.header.get_extra("$ANGBASE").is_some());
    assert_eq!(read.header.linetype_scale, 2.0);
    assert_eq!(read.raw_sections, doc.raw_sections);
}

#[test]
fn test_hatch_paths_keep_every_edge() {
    let mut open = BoundaryPath::new();
    open.add_edge(BoundaryEdge::Polyline(PolylineEdge::new(
        [Vector2::ZERO, Vector2::new(4.0, 0.0)],
        false,
    )))
    .unwrap();
    // a polyline cannot join a path of edges, so it goes in its own path
    let mut edges = BoundaryPath::new();
    edges
        .add_edge(BoundaryEdge::Line(LineEdge {
            start: Vector2::new(4.0, 0.0),
            end: Vector2::new(4.0, 4.0),
        }))
        .unwrap();
    assert!(edges
        .add_edge(BoundaryEdge::Polyline(PolylineEdge::new(
            [Vector2::new(4.0, 4.0), Vector2::ZERO],
            false,
        )))
        .is_err());
    edges
        .add_edge(BoundaryEdge::Arc(ArcEdge {
            center: Vector2::new(2.0, 4.0),
            radius: 2.0,
            start_angle: 0.0,
            end_angle: 180.0,
            counter_clockwise: true,
        }))
        .unwrap();

    let mut hatch = Hatch::solid();
    hatch.paths.push(open);
    hatch.paths.push(edges);
    let mut doc = CadDocument::new();
    doc.add_entity(EntityType::Hatch(hatch.clone())).unwrap();

    let read = read_back(&write_text(&mut doc, DxfVersion::AC1015));
    let EntityType::Hatch(back) = read.entities().next().unwrap() else {
        panic!("expected a HATCH");
    };
    let counts: Vec<usize> = back.paths.iter().map(|p| p.edges().len()).collect();
    assert_eq!(counts, vec![1, 2]);
    assert!(back.paths[0].is_polyline());
    assert_eq!(back.paths[1].edges(), hatch.paths[1].edges());
}
