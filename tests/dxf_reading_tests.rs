//! Reading scenarios: tag runs in, typed document out

mod common;

use common::{entities_file, read_lenient, read_strict};
use dxfcodec::entities::{BoundaryEdge, EntityType};
use dxfcodec::io::dxf::DxfReader;
use dxfcodec::types::Vector3;
use dxfcodec::{DxfError, DxfVersion, NotificationType};

fn line_run(layer: &str) -> Vec<(i32, &str)> {
    vec![
        (0, "LINE"),
        (8, layer),
        (10, "0.0"),
        (20, "0.0"),
        (30, "0.0"),
        (11, "10.0"),
        (21, "0.0"),
        (31, "0.0"),
    ]
}

#[test]
fn test_dxf_reader_from_nonexistent_file() {
    let result = DxfReader::from_file("nonexistent.dxf");
    assert!(matches!(result, Err(DxfError::Io(_))));
}

#[test]
fn test_line_tag_run_decodes_to_line() {
    let doc = read_strict(&entities_file(&line_run("0"))).unwrap();
    assert_eq!(doc.entity_count(), 1);
    let EntityType::Line(line) = doc.entities().next().unwrap() else {
        panic!("expected a LINE");
    };
    assert_eq!(line.start, Vector3::new(0.0, 0.0, 0.0));
    assert_eq!(line.end, Vector3::new(10.0, 0.0, 0.0));
    assert_eq!(line.common.layer, "0");
    assert!(line.common.handle.is_valid());
}

#[test]
fn test_file_without_version_reads_with_warning() {
    let doc = read_lenient(&entities_file(&line_run("0")));
    assert_eq!(doc.version(), DxfVersion::Unknown);
    assert!(doc.notifications.has_type(NotificationType::Warning));
}

#[test]
fn test_arc_with_zero_radius_cites_code_40() {
    let arc = [
        (0, "ARC"),
        (8, "0"),
        (10, "1.0"),
        (20, "1.0"),
        (30, "0.0"),
        (40, "0.0"),
        (50, "0.0"),
        (51, "90.0"),
    ];
    let err = read_strict(&entities_file(&arc)).unwrap_err();
    match err {
        DxfError::EntityValidation { entity, code, .. } => {
            assert_eq!(entity, "ARC");
            assert_eq!(code, 40);
        }
        other => panic!("unexpected error {:?}", other),
    }

    let mut records = arc.to_vec();
    records.extend(line_run("0"));
    let doc = read_lenient(&entities_file(&records));
    assert_eq!(doc.entity_count(), 1);
    assert!(doc
        .notifications
        .of_type(NotificationType::Error)
        .iter()
        .any(|n| n.message.contains("ARC")));
}

fn hatch_with_edges(edges: &[(i32, &'static str)], count: &'static str) -> Vec<(i32, &'static str)> {
    let mut run = vec![
        (0, "HATCH"),
        (100, "AcDbEntity"),
        (8, "0"),
        (100, "AcDbHatch"),
        (10, "0.0"),
        (20, "0.0"),
        (30, "0.0"),
        (210, "0.0"),
        (220, "0.0"),
        (230, "1.0"),
        (2, "SOLID"),
        (70, "1"),
        (71, "0"),
        (91, "1"),
        (92, "1"),
        (93, count),
    ];
    run.extend_from_slice(edges);
    run.extend_from_slice(&[(97, "0"), (75, "0"), (76, "1"), (98, "0")]);
    run
}

const CIRCLE_EDGE: [(i32, &str); 7] = [
    (72, "2"),
    (10, "5.0"),
    (20, "5.0"),
    (40, "2.0"),
    (50, "0.0"),
    (51, "360.0"),
    (73, "1"),
];

const LINE_EDGE: [(i32, &str); 5] = [(72, "1"), (10, "0.0"), (20, "0.0"), (11, "10.0"), (21, "0.0")];

#[test]
fn test_hatch_path_mixing_circle_and_line_is_rejected() {
    let mut edges = CIRCLE_EDGE.to_vec();
    edges.extend_from_slice(&LINE_EDGE);
    let text = entities_file(&hatch_with_edges(&edges, "2"));

    let err = read_strict(&text).unwrap_err();
    match &err {
        DxfError::EntityValidation { entity, code, source } => {
            assert_eq!(entity, "HATCH");
            assert_eq!(*code, 72);
            assert!(source.to_string().contains("closed loop cannot combine with other entities"));
        }
        other => panic!("unexpected error {:?}", other),
    }

    let doc = read_lenient(&text);
    assert_eq!(doc.entity_count(), 0);
    assert!(doc.notifications.has_type(NotificationType::Error));
}

#[test]
fn test_hatch_with_single_circle_path() {
    let text = entities_file(&hatch_with_edges(&CIRCLE_EDGE, "1"));
    let doc = read_strict(&text).unwrap();
    let EntityType::Hatch(hatch) = doc.entities().next().unwrap() else {
        panic!("expected a HATCH");
    };
    assert_eq!(hatch.paths.len(), 1);
    assert!(matches!(hatch.paths[0].edges()[0], BoundaryEdge::Arc(ref a) if a.radius == 2.0));
}

#[test]
fn test_dangling_layer_by_mode() {
    let text = entities_file(&line_run("GHOST"));

    let doc = read_lenient(&text);
    assert_eq!(doc.entities().next().unwrap().common().layer, "0");
    assert!(doc
        .notifications
        .iter()
        .any(|n| n.message.contains("GHOST")));

    let err = read_strict(&text).unwrap_err();
    assert!(matches!(
        err,
        DxfError::DanglingReference { kind: "layer", ref reference, .. } if reference == "GHOST"
    ));
}

fn mtext_with_spacing(spacing: f64) -> String {
    let value = format!("{:?}", spacing);
    let run = [
        (0, "MTEXT"),
        (8, "0"),
        (10, "0.0"),
        (20, "0.0"),
        (30, "0.0"),
        (40, "2.5"),
        (44, value.as_str()),
        (1, "spaced"),
    ];
    entities_file(&run)
}

#[test]
fn test_line_spacing_boundaries() {
    for spacing in [0.25, 4.0] {
        let doc = read_strict(&mtext_with_spacing(spacing)).unwrap();
        let EntityType::MText(mtext) = doc.entities().next().unwrap() else {
            panic!("expected MTEXT");
        };
        assert_eq!(mtext.line_spacing_factor(), spacing);
    }

    let below = f64::from_bits(0.25f64.to_bits() - 1);
    let above = f64::from_bits(4.0f64.to_bits() + 1);
    for spacing in [below, above] {
        let err = read_strict(&mtext_with_spacing(spacing)).unwrap_err();
        assert!(
            matches!(err, DxfError::EntityValidation { code: 44, .. }),
            "{} accepted: {:?}",
            spacing,
            err
        );
    }
}

#[test]
fn test_smallest_positive_radius_is_accepted() {
    let radius = format!("{:?}", f64::MIN_POSITIVE);
    let circle = [
        (0, "CIRCLE"),
        (8, "0"),
        (10, "0.0"),
        (20, "0.0"),
        (30, "0.0"),
        (40, radius.as_str()),
    ];
    let doc = read_strict(&entities_file(&circle)).unwrap();
    let EntityType::Circle(c) = doc.entities().next().unwrap() else {
        panic!("expected CIRCLE");
    };
    assert_eq!(c.radius(), f64::MIN_POSITIVE);
}

#[test]
fn test_truncated_entity_by_mode() {
    let text = "  0\nSECTION\n  2\nENTITIES\n  0\nLINE\n  8\n0\n 10\n1.0\n";
    let err = read_strict(text).unwrap_err();
    assert!(matches!(err, DxfError::UnterminatedEntity { ref entity, .. } if entity == "LINE"));

    let doc = read_lenient(text);
    assert_eq!(doc.entity_count(), 0);
    assert!(doc.notifications.has_type(NotificationType::Error));
}

#[test]
fn test_malformed_code_is_fatal_with_line_number() {
    let text = "  0\nSECTION\n  2\nENTITIES\nabc\nLINE\n";
    for result in [read_strict(text), common::try_read(text.as_bytes(), Default::default())] {
        match result.unwrap_err() {
            DxfError::MalformedTag { position, .. } => assert_eq!(position.line, Some(5)),
            other => panic!("unexpected error {:?}", other),
        }
    }
}

#[test]
fn test_nested_section_is_rejected() {
    let text = "  0\nSECTION\n  2\nENTITIES\n  0\nSECTION\n  2\nBLOCKS\n  0\nENDSEC\n  0\nEOF\n";
    let err = read_strict(text).unwrap_err();
    assert!(matches!(err, DxfError::UnexpectedSection { .. }), "{:?}", err);
}

#[test]
fn test_polyline_vertices_and_seqend() {
    let run = [
        (0, "POLYLINE"),
        (8, "0"),
        (66, "1"),
        (10, "0.0"),
        (20, "0.0"),
        (30, "0.0"),
        (70, "1"),
        (0, "VERTEX"),
        (8, "0"),
        (10, "0.0"),
        (20, "0.0"),
        (30, "0.0"),
        (0, "VERTEX"),
        (8, "0"),
        (10, "5.0"),
        (20, "0.0"),
        (30, "0.0"),
        (42, "1.0"),
        (0, "VERTEX"),
        (8, "0"),
        (10, "5.0"),
        (20, "5.0"),
        (30, "0.0"),
        (0, "SEQEND"),
        (8, "0"),
    ];
    let doc = read_strict(&entities_file(&run)).unwrap();
    let EntityType::Polyline2D(polyline) = doc.entities().next().unwrap() else {
        panic!("expected a 2D polyline");
    };
    assert!(polyline.is_closed());
    assert_eq!(polyline.vertices.len(), 3);
    assert_eq!(polyline.vertices[1].bulge, 1.0);
    assert!(polyline.seqend.common.handle.is_valid());
    common::comparison::assert_unique_handles(&doc);
}

#[test]
fn test_unknown_entity_kept_in_lenient_mode() {
    let run = [(0, "ACME_WIDGET"), (8, "0"), (10, "1.0"), (20, "2.0"), (30, "0.0"), (1, "payload")];
    let doc = read_lenient(&entities_file(&run));
    let EntityType::Unknown(unknown) = doc.entities().next().unwrap() else {
        panic!("expected an unknown entity");
    };
    assert_eq!(unknown.dxf_name, "ACME_WIDGET");
    assert!(doc.notifications.has_type(NotificationType::NotImplemented));
    assert!(read_strict(&entities_file(&run)).is_err());
}

#[test]
fn test_highest_possible_handle_does_not_exhaust_allocation() {
    let mut run = line_run("0");
    run.insert(1, (5, "FFFFFFFFFFFFFFFF"));
    run.extend(line_run("0"));
    let mut doc = read_lenient(&entities_file(&run));

    let handles: Vec<u64> = doc.entities().map(|e| e.handle().value()).collect();
    assert_eq!(handles.len(), 2);
    assert_eq!(handles[0], u64::MAX);
    assert!(doc
        .notifications
        .of_type(NotificationType::Warning)
        .iter()
        .any(|n| n.message.contains("handle space exhausted")));
    common::comparison::assert_unique_handles(&doc);

    let read = common::read_back(&common::write_text(&mut doc, DxfVersion::AC1015));
    assert_eq!(read.entity_count(), 2);
    common::comparison::assert_unique_handles(&read);
}

/// Strict mode rejects the record citing `code`; lenient mode drops it and
/// keeps the LINE after it
fn assert_short_count(record: Vec<(i32, &'static str)>, code: i32) {
    let text = entities_file(&record);
    match read_strict(&text).unwrap_err() {
        DxfError::EntityValidation { code: cited, source, .. } => {
            assert_eq!(cited, code);
            assert_eq!(source.field, "count");
        }
        other => panic!("unexpected error {:?}", other),
    }

    let mut records = record;
    records.extend(line_run("0"));
    let doc = read_lenient(&entities_file(&records));
    assert_eq!(doc.entity_count(), 1);
    assert!(matches!(doc.entities().next(), Some(EntityType::Line(_))));
    assert!(doc.notifications.has_type(NotificationType::Error));
}

#[test]
fn test_hatch_path_count_beyond_data() {
    let mut run = hatch_with_edges(&LINE_EDGE, "1");
    let paths = run.iter().position(|&(code, _)| code == 91).unwrap();
    run[paths] = (91, "2147483647");
    assert_short_count(run, 91);

    // a declared path with no path data at all
    let mut run = hatch_with_edges(&[], "0");
    let start = run.iter().position(|&(code, _)| code == 91).unwrap();
    run.drain(start + 1..start + 3);
    run[start] = (91, "3000000");
    assert_short_count(run, 91);
}

#[test]
fn test_hatch_edge_count_beyond_data() {
    assert_short_count(hatch_with_edges(&LINE_EDGE, "5"), 93);
}

#[test]
fn test_hatch_polyline_vertex_count_beyond_data() {
    let mut run = hatch_with_edges(&[], "0");
    let start = run.iter().position(|&(code, _)| code == 92).unwrap();
    run.splice(
        start..start + 2,
        [(92, "2"), (72, "0"), (73, "1"), (93, "4"), (10, "0.0"), (20, "0.0"), (10, "1.0"), (20, "0.0")],
    );
    assert_short_count(run, 93);
}

#[test]
fn test_hatch_spline_edge_counts_beyond_data() {
    let knots = [(72, "4"), (94, "3"), (73, "0"), (74, "0"), (95, "1000000"), (96, "4"), (40, "0.0")];
    assert_short_count(hatch_with_edges(&knots, "1"), 95);

    let points = [
        (72, "4"),
        (94, "1"),
        (73, "0"),
        (74, "0"),
        (95, "2"),
        (96, "2147483647"),
        (40, "0.0"),
        (40, "1.0"),
        (10, "0.0"),
        (20, "0.0"),
    ];
    assert_short_count(hatch_with_edges(&points, "1"), 96);
}

fn mesh_run(tail: &[(i32, &'static str)]) -> Vec<(i32, &'static str)> {
    let mut run = vec![
        (0, "MESH"),
        (100, "AcDbEntity"),
        (8, "0"),
        (100, "AcDbSubDMesh"),
        (71, "2"),
        (72, "0"),
        (91, "0"),
    ];
    run.extend_from_slice(tail);
    run
}

#[test]
fn test_mesh_counts_beyond_data() {
    let vertices = [(92, "2147483647"), (10, "0.0"), (20, "0.0"), (30, "0.0")];
    assert_short_count(mesh_run(&vertices), 92);

    let faces = [
        (92, "1"),
        (10, "0.0"),
        (20, "0.0"),
        (30, "0.0"),
        (93, "2"),
        (90, "2147483647"),
        (90, "0"),
    ];
    assert_short_count(mesh_run(&faces), 93);
}

#[test]
fn test_mesh_with_matching_counts_reads() {
    let run = [
        (92, "3"),
        (10, "0.0"),
        (20, "0.0"),
        (30, "0.0"),
        (10, "1.0"),
        (20, "0.0"),
        (30, "0.0"),
        (10, "0.0"),
        (20, "1.0"),
        (30, "0.0"),
        (93, "4"),
        (90, "3"),
        (90, "0"),
        (90, "1"),
        (90, "2"),
        (94, "0"),
        (95, "0"),
    ];
    let doc = read_strict(&entities_file(&mesh_run(&run))).unwrap();
    let EntityType::Mesh(mesh) = doc.entities().next().unwrap() else {
        panic!("expected a MESH");
    };
    assert_eq!(mesh.vertices.len(), 3);
    assert_eq!(mesh.faces, vec![vec![0, 1, 2]]);
}
