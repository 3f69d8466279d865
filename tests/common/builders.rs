//! Test document builders.
//!
//! `create_all_entities_document()` holds one instance of every entity
//! variant the codec models, laid out on a grid.

#![allow(dead_code)]

use dxfcodec::entities::*;
use dxfcodec::objects::{ObjectType, UnderlayDefinition};
use dxfcodec::tables::{BlockRecord, Layer};
use dxfcodec::types::{Color, Vector2, Vector3};
use dxfcodec::CadDocument;

/// Every modeled entity variant, one each, spaced 25 units apart
pub fn create_all_entities_document() -> CadDocument {
    let mut doc = CadDocument::new();
    let mut walls = Layer::new("Walls");
    walls.color = Color::RED;
    doc.layers.add(walls).unwrap();

    for entity in all_entities(&mut doc) {
        doc.add_entity(entity).unwrap();
    }
    doc
}

fn all_entities(doc: &mut CadDocument) -> Vec<EntityType> {
    let mut out = Vec::new();
    let sp = 25.0;
    let at = |i: usize| Vector3::new((i % 8) as f64 * sp, (i / 8) as f64 * sp, 0.0);

    let mut point = Point::at(at(0));
    point.common.color = Color::RED;
    out.push(EntityType::Point(point));

    let o = at(1);
    let mut line = Line::from_coords(o.x, o.y, 0.0, o.x + 10.0, o.y + 10.0, 0.0);
    line.common.layer = "Walls".into();
    out.push(EntityType::Line(line));

    out.push(EntityType::Circle(Circle::from_center(at(2), 5.0).unwrap()));
    out.push(EntityType::Arc(Arc::from_center(at(3), 5.0, 0.0, 180.0).unwrap()));
    out.push(EntityType::Ellipse(
        Ellipse::from_center_axes(at(4), Vector3::new(8.0, 0.0, 0.0), 0.5).unwrap(),
    ));

    let o = at(5);
    let mut lw = LwPolyline::from_points(
        [
            Vector2::new(o.x, o.y),
            Vector2::new(o.x + 10.0, o.y),
            Vector2::new(o.x + 10.0, o.y + 5.0),
        ],
        true,
    );
    lw.constant_width = 0.25;
    out.push(EntityType::LwPolyline(lw));

    let o = at(6);
    let mut pl = Polyline2D::new();
    for (dx, bulge) in [(0.0, 0.0), (5.0, 0.5), (10.0, 0.0)] {
        let mut v = Vertex2D::new(Vector3::new(o.x + dx, o.y, 0.0));
        v.bulge = bulge;
        pl.vertices.push(v);
    }
    out.push(EntityType::Polyline2D(pl));

    let o = at(7);
    out.push(EntityType::Polyline3D(Polyline3D::from_points(
        [o, o + Vector3::new(5.0, 0.0, 2.0), o + Vector3::new(5.0, 5.0, 4.0)],
        false,
    )));

    let o = at(8);
    let mut pf = PolyfaceMesh::new();
    for (dx, dy) in [(0.0, 0.0), (5.0, 0.0), (5.0, 5.0), (0.0, 5.0)] {
        pf.vertices.push(PolyfaceVertex::new(o + Vector3::new(dx, dy, 0.0)));
    }
    pf.faces.push(PolyfaceFace::new([1, 2, 3, 0]));
    pf.faces.push(PolyfaceFace::new([1, 3, -4, 0]));
    out.push(EntityType::PolyfaceMesh(pf));

    let o = at(9);
    let mut pm = PolygonMesh::new();
    pm.m_count = 2;
    pm.n_count = 2;
    for (dx, dy) in [(0.0, 0.0), (0.0, 5.0), (5.0, 0.0), (5.0, 5.0)] {
        pm.vertices.push(PolygonMeshVertex::new(o + Vector3::new(dx, dy, 1.0)));
    }
    out.push(EntityType::PolygonMesh(pm));

    let o = at(10);
    out.push(EntityType::Face3D(Face3D::triangle(
        o,
        o + Vector3::new(5.0, 0.0, 0.0),
        o + Vector3::new(0.0, 5.0, 3.0),
    )));

    let o = at(11);
    let corners = [
        o,
        o + Vector3::new(5.0, 0.0, 0.0),
        o + Vector3::new(0.0, 5.0, 0.0),
        o + Vector3::new(5.0, 5.0, 0.0),
    ];
    out.push(EntityType::Solid(Solid::from_corners(corners)));
    let o = at(12);
    out.push(EntityType::Trace(Trace::from_corners([
        o,
        o + Vector3::new(5.0, 0.0, 0.0),
        o + Vector3::new(0.0, 1.0, 0.0),
        o + Vector3::new(5.0, 1.0, 0.0),
    ])));

    let o = at(13);
    let mut mesh = Mesh::new();
    mesh.vertices = vec![
        o,
        o + Vector3::new(5.0, 0.0, 0.0),
        o + Vector3::new(5.0, 5.0, 0.0),
        o + Vector3::new(0.0, 5.0, 0.0),
    ];
    mesh.faces = vec![vec![0, 1, 2, 3]];
    out.push(EntityType::Mesh(mesh));

    let o = at(14);
    let mut hatch = Hatch::solid();
    let mut path = BoundaryPath::external();
    path.add_edge(BoundaryEdge::Polyline(PolylineEdge::new(
        [
            Vector2::new(o.x, o.y),
            Vector2::new(o.x + 10.0, o.y),
            Vector2::new(o.x + 10.0, o.y + 10.0),
        ],
        true,
    )))
    .unwrap();
    hatch.paths.push(path);
    out.push(EntityType::Hatch(hatch));

    let o = at(15);
    let aligned = DimensionAligned::new(o, o + Vector3::new(10.0, 0.0, 0.0), 3.0);
    out.push(EntityType::Dimension(Dimension::Aligned(aligned)));
    let o = at(16);
    let radius = DimensionRadius::new(o, o + Vector3::new(4.0, 0.0, 0.0));
    out.push(EntityType::Dimension(Dimension::Radius(radius)));

    let mut text = Text::with_value("Hello", at(17));
    text.set_height(2.5).unwrap();
    out.push(EntityType::Text(text));

    let mut mtext = MText::with_value("First\\PSecond", at(18));
    mtext.set_line_spacing_factor(1.5).unwrap();
    out.push(EntityType::MText(mtext));

    // block with an attribute definition, inserted with its attribute
    let mut door = BlockRecord::new("DOOR");
    door.entities.push(EntityType::Line(Line::from_coords(0.0, 0.0, 0.0, 0.0, 2.0, 0.0)));
    door.entities.push(EntityType::AttributeDefinition(AttributeDefinition::new(
        "WIDTH",
        "Door width",
        AttributeValue::Real(0.9),
    )));
    doc.add_block(door).unwrap();
    let mut insert = Insert::new("DOOR", at(19));
    insert.attributes.push(Attribute::new("WIDTH", AttributeValue::Real(0.9)));
    out.push(EntityType::Insert(insert));

    out.push(EntityType::Ray(Ray::new(at(20), Vector3::new(1.0, 1.0, 0.0)).unwrap()));
    out.push(EntityType::XLine(XLine::new(at(21), Vector3::UNIT_Y).unwrap()));
    out.push(EntityType::Shape(Shape::new("BOX", at(22))));

    let o = at(23);
    let mut ole = Ole2Frame::new();
    ole.source_application = "Paint".into();
    ole.upper_left_corner = o + Vector3::new(0.0, 5.0, 0.0);
    ole.lower_right_corner = o + Vector3::new(5.0, 0.0, 0.0);
    ole.binary_data = (0u8..=200).collect();
    out.push(EntityType::Ole2Frame(ole));

    let definition = doc.add_named_object(
        "ACAD_PDFDEFINITIONS",
        "plan - 1",
        ObjectType::UnderlayDefinition(UnderlayDefinition::pdf("plan.pdf", "1")),
    );
    let mut underlay = Underlay::new(UnderlayKind::Pdf);
    underlay.definition = definition;
    underlay.insertion_point = at(24);
    out.push(EntityType::Underlay(underlay));

    out.push(EntityType::Wipeout(Wipeout::rectangle(at(25), 6.0, 4.0)));

    let o = at(26);
    let spline = Spline::from_control_points(
        3,
        vec![
            o,
            o + Vector3::new(2.0, 4.0, 0.0),
            o + Vector3::new(6.0, 4.0, 0.0),
            o + Vector3::new(8.0, 0.0, 0.0),
        ],
    )
    .unwrap();
    out.push(EntityType::Spline(spline));

    let o = at(27);
    let mut mline = MLine::new();
    mline.start_point = o;
    for dx in [0.0, 10.0] {
        let mut vertex = MLineVertex::new(o + Vector3::new(dx, 0.0, 0.0));
        for _ in 0..2 {
            vertex.segments.push(MLineSegment {
                parameters: vec![0.0, 0.0],
                area_fill_parameters: Vec::new(),
            });
        }
        mline.vertices.push(vertex);
    }
    out.push(EntityType::MLine(mline));

    out
}

/// Document with a single entity of the given DXF name, `None` when the
/// name has no builder
pub fn create_single_entity_doc(entity_name: &str) -> Option<CadDocument> {
    let mut doc = CadDocument::new();
    let entity = all_entities(&mut doc)
        .into_iter()
        .find(|e| e.dxf_name().eq_ignore_ascii_case(entity_name))?;
    doc.add_entity(entity).ok()?;
    Some(doc)
}
