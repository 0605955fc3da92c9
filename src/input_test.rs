#![allow(clippy::float_cmp)]

use super::*;

// =============================================================
// Tool
// =============================================================

#[test]
fn tool_default_is_select() {
    assert_eq!(Tool::default(), Tool::Select);
}

#[test]
fn draw_tools_compare_by_kind() {
    assert_eq!(Tool::Draw(DrawKind::Circle), Tool::Draw(DrawKind::Circle));
    assert_ne!(Tool::Draw(DrawKind::Circle), Tool::Draw(DrawKind::Line));
    assert_ne!(Tool::Draw(DrawKind::Line), Tool::Pan);
}

// =============================================================
// DrawKind
// =============================================================

#[test]
fn draw_kind_maps_to_object_kind() {
    assert_eq!(DrawKind::Rectangle.object_kind(), ObjectKind::Rectangle);
    assert_eq!(DrawKind::Polygon.object_kind(), ObjectKind::Polygon);
}

#[test]
fn build_from_drag() {
    let start = Point::new(1.0, 1.0);
    let end = Point::new(4.0, 5.0);
    assert_eq!(DrawKind::Line.build(start, end, &[]), Shape::Line { x1: 1.0, y1: 1.0, x2: 4.0, y2: 5.0 });
    assert_eq!(DrawKind::Circle.build(start, end, &[]), Shape::Circle { x: 1.0, y: 1.0, radius: 5.0 });
    assert_eq!(
        DrawKind::Ellipse.build(start, end, &[]),
        Shape::Ellipse { x: 1.0, y: 1.0, xradius: 3.0, yradius: 4.0, rotation: 0.0 }
    );
}

#[test]
fn point_lands_at_release_with_default_radius() {
    let shape = DrawKind::Point.build(Point::new(0.0, 0.0), Point::new(2.0, 3.0), &[]);
    assert_eq!(shape, Shape::Point { x: 2.0, y: 3.0, radius: DEFAULT_POINT_RADIUS, marker: PointMarker::Cross });
}

#[test]
fn polygon_uses_vertices() {
    let vertices = [Point::new(0.0, 0.0), Point::new(5.0, 0.0), Point::new(5.0, 5.0)];
    let shape = DrawKind::Polygon.build(vertices[0], vertices[2], &vertices);
    assert_eq!(shape, Shape::Polygon { points: vertices.to_vec() });
}

// =============================================================
// Keys and state
// =============================================================

#[test]
fn escape_key_variants() {
    assert!(Key("Escape".into()).is_escape());
    assert!(Key("esc".into()).is_escape());
    assert!(!Key("Delete".into()).is_escape());
}

#[test]
fn input_state_default_is_idle() {
    let state = InputState::default();
    assert!(state.is_idle());
    assert!(!state.is_drawing());
}

#[test]
fn window_extent_of_points() {
    assert_eq!(window_extent(&[]), 0.0);
    assert_eq!(window_extent(&[Point::new(3.0, 3.0)]), 0.0);
    assert_eq!(window_extent(&[Point::new(0.0, 0.0), Point::new(1.0, 5.0), Point::new(-2.0, 1.0)]), 5.0);
}
