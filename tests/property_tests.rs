//! Property tests for the value decoder, text escapes and handle assignment

mod common;

use proptest::prelude::*;

use dxfcodec::entities::{
    ArcEdge, BoundaryEdge, BoundaryPath, EntityType, Hatch, Line, LineEdge, PolylineEdge, Text,
};
use dxfcodec::error::Position;
use dxfcodec::io::dxf::value::decode_text;
use dxfcodec::io::dxf::{format_real, DxfValue, FULL_PRECISION};
use dxfcodec::types::{Handle, Vector2, Vector3};
use dxfcodec::{CadDocument, DxfVersion};

fn finite() -> impl Strategy<Value = f64> {
    prop::num::f64::NORMAL | prop::num::f64::SUBNORMAL | prop::num::f64::ZERO
}

/// Open edge of kind 0 (line), 1 (arc) or 2 (polyline) starting at `x`
fn open_edge(kind: u8, x: f64) -> BoundaryEdge {
    match kind {
        0 => BoundaryEdge::Line(LineEdge {
            start: Vector2::new(x, 0.0),
            end: Vector2::new(x + 1.0, 0.0),
        }),
        1 => BoundaryEdge::Arc(ArcEdge {
            center: Vector2::new(x, 0.0),
            radius: 1.0,
            start_angle: 0.0,
            end_angle: 90.0,
            counter_clockwise: true,
        }),
        _ => BoundaryEdge::Polyline(PolylineEdge::new([Vector2::new(x, 0.0), Vector2::new(x, 1.0)], false)),
    }
}

proptest! {
    #[test]
    fn doubles_survive_text_encoding(value in finite()) {
        let text = format_real(value, FULL_PRECISION);
        let decoded = decode_text(40, &text, Position::default(), false).unwrap();
        prop_assert_eq!(decoded, DxfValue::Double(value));
    }

    #[test]
    fn int16_codes_reject_out_of_range(value in 32768i64..1_000_000) {
        let decoded = decode_text(70, &value.to_string(), Position::default(), false);
        prop_assert!(decoded.is_err());
    }

    #[test]
    fn line_coordinates_round_trip(
        x1 in -1e9f64..1e9, y1 in -1e9f64..1e9, z1 in -1e3f64..1e3,
        x2 in -1e9f64..1e9, y2 in -1e9f64..1e9,
    ) {
        let mut doc = CadDocument::new();
        doc.add_entity(EntityType::Line(Line::from_coords(x1, y1, z1, x2, y2, 0.0))).unwrap();
        let bytes = common::write_text(&mut doc, DxfVersion::AC1015);
        let read = common::read_back(&bytes);
        let EntityType::Line(line) = read.entities().next().unwrap() else {
            panic!("expected a LINE");
        };
        prop_assert_eq!(line.start, Vector3::new(x1, y1, z1));
        prop_assert_eq!(line.end, Vector3::new(x2, y2, 0.0));
    }

    #[test]
    fn text_values_with_control_characters_round_trip(value in "[a-zA-Z0-9 ^_.,;:!?()\t\n-]{0,40}") {
        let mut doc = CadDocument::new();
        doc.add_entity(EntityType::Text(Text::with_value(value.clone(), Vector3::ZERO))).unwrap();
        let bytes = common::write_text(&mut doc, DxfVersion::AC1032);
        let read = common::read_back(&bytes);
        let EntityType::Text(text) = read.entities().next().unwrap() else {
            panic!("expected a TEXT");
        };
        prop_assert_eq!(&text.value, &value);
    }

    #[test]
    fn assigned_handles_are_unique(preset in prop::collection::vec(0u64..16, 1..40)) {
        let mut doc = CadDocument::new();
        for (i, raw) in preset.iter().enumerate() {
            let mut line = Line::from_coords(i as f64, 0.0, 0.0, i as f64, 1.0, 0.0);
            line.common.handle = Handle::new(*raw);
            doc.add_entity(EntityType::Line(line)).unwrap();
        }
        doc.assign_handles();
        common::comparison::assert_unique_handles(&doc);
        let max = doc.entities().map(|e| e.handle().value()).max().unwrap_or(0);
        prop_assert!(doc.header.handle_seed.value() > max);
    }

    #[test]
    fn handles_at_the_top_of_the_range_stay_unique(offsets in prop::collection::vec(0u64..4, 1..12)) {
        let mut doc = CadDocument::new();
        for (i, offset) in offsets.iter().enumerate() {
            let mut line = Line::from_coords(i as f64, 0.0, 0.0, i as f64, 1.0, 0.0);
            line.common.handle = Handle::new(u64::MAX - offset);
            doc.add_entity(EntityType::Line(line)).unwrap();
        }
        doc.assign_handles();
        doc.add_entity(EntityType::Line(Line::from_coords(0.0, 0.0, 0.0, 1.0, 1.0, 0.0))).unwrap();
        common::comparison::assert_unique_handles(&doc);
    }

    #[test]
    fn hatch_edges_survive_writing(kinds in prop::collection::vec(0u8..3, 1..6)) {
        let mut path = BoundaryPath::new();
        for (i, kind) in kinds.iter().enumerate() {
            let _ = path.add_edge(open_edge(*kind, i as f64 * 2.0));
        }
        let polylines = path.edges().iter().filter(|e| matches!(e, BoundaryEdge::Polyline(_))).count();
        prop_assert!(polylines == 0 || path.edges().len() == 1);

        let mut hatch = Hatch::solid();
        hatch.paths.push(path.clone());
        let mut doc = CadDocument::new();
        doc.add_entity(EntityType::Hatch(hatch)).unwrap();
        let read = common::read_back(&common::write_text(&mut doc, DxfVersion::AC1015));
        let EntityType::Hatch(back) = read.entities().next().unwrap() else {
            panic!("expected a HATCH");
        };
        prop_assert_eq!(back.paths[0].edges(), path.edges());
    }
}
