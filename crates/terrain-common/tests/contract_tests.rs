//! Tests for the geometry contracts exchanged with readers and writers.

use terrain_common::{BboxParseError, BoundingBox, Point3, Polyline, ReferenceSystem};

// ============================================================================
// BoundingBox parsing
// ============================================================================

#[test]
fn test_parse_bbox_integer() {
    let bbox: BoundingBox = "0,0,100,100".parse().unwrap();
    assert_eq!(bbox, BoundingBox::new(0.0, 0.0, 100.0, 100.0));
}

#[test]
fn test_parse_bbox_with_whitespace() {
    let bbox: BoundingBox = " 350000.5, 5700000 ,351000,5701000.25 ".parse().unwrap();
    assert_eq!(bbox.min_x, 350000.5);
    assert_eq!(bbox.max_y, 5701000.25);
}

#[test]
fn test_parse_bbox_scientific_notation() {
    let bbox: BoundingBox = "1e-6,2e-6,1e6,2e6".parse().unwrap();
    assert!((bbox.min_x - 1e-6).abs() < 1e-10);
    assert!((bbox.max_x - 1e6).abs() < 0.001);
}

#[test]
fn test_parse_bbox_invalid_format_too_few() {
    let result = "0,0,100".parse::<BoundingBox>();
    assert!(matches!(result, Err(BboxParseError::InvalidFormat(_))));
}

#[test]
fn test_parse_bbox_invalid_number() {
    let result = "0,abc,100,100".parse::<BoundingBox>();
    assert!(matches!(result, Err(BboxParseError::InvalidNumber(ref s)) if s == "abc"));
}

// ============================================================================
// BoundingBox geometry
// ============================================================================

#[test]
fn test_bbox_dimensions() {
    let bbox = BoundingBox::new(-10.0, 20.0, 30.0, 25.0);
    assert_eq!(bbox.width(), 40.0);
    assert_eq!(bbox.height(), 5.0);
}

#[test]
fn test_bbox_contains_edges() {
    let bbox = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
    assert!(bbox.contains_point(0.0, 0.0));
    assert!(bbox.contains_point(10.0, 10.0));
    assert!(!bbox.contains_point(10.0001, 5.0));
}

#[test]
fn test_bbox_expand() {
    let bbox = BoundingBox::new(0.0, 0.0, 10.0, 4.0).expand(0.5, 1.0);
    assert_eq!(bbox, BoundingBox::new(-0.5, -1.0, 10.5, 5.0));
}

// ============================================================================
// Points, polylines and reference systems
// ============================================================================

#[test]
fn test_polyline_single_vertex_has_zero_length() {
    let line = Polyline::new(vec![Point3::new(5.0, 5.0, 1.0)]);
    assert_eq!(line.length(), 0.0);
    assert_eq!(line.segments().count(), 0);
}

#[test]
fn test_point_from_tuple() {
    let p: Point3 = (1.0, 2.0, 3.0).into();
    assert_eq!(p, Point3::new(1.0, 2.0, 3.0));
}

#[test]
fn test_reference_system_serializes_as_plain_string() {
    let srs = ReferenceSystem::epsg(25832);
    assert_eq!(serde_json::to_string(&srs).unwrap(), "\"EPSG:25832\"");
    let back: ReferenceSystem = serde_json::from_str("\"epsg:25832\"").unwrap();
    assert!(back.matches(&srs));
}

#[test]
fn test_polyline_serialization() {
    let line = Polyline::from_xy(&[(0.0, 0.0), (1.0, 1.0)]);
    let json = serde_json::to_value(&line).unwrap();
    assert_eq!(json["vertices"][1]["x"], 1.0);
}
