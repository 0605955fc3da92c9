#![allow(clippy::float_cmp)]

use super::*;
use crate::object::Shape;

fn dot(x: f64) -> CanvasObject {
    CanvasObject::point(x, 0.0, 1.0)
}

fn x_of(obj: &CanvasObject) -> f64 {
    match obj.shape {
        Shape::Point { x, .. } => x,
        _ => f64::NAN,
    }
}

// =============================================================
// Add / lookup / delete
// =============================================================

#[test]
fn add_then_delete_then_lookup_fails() {
    let mut c = Canvas::new();
    c.add(CanvasObject::rectangle(0.0, 0.0, 10.0, 10.0), Some("r1"));
    assert!(c.get_object_by_tag("r1").is_ok());
    c.delete_object_by_tag("r1").unwrap();
    assert!(matches!(c.get_object_by_tag("r1"), Err(CanvasError::NotFound(tag)) if tag == "r1"));
    assert!(c.is_empty());
}

#[test]
fn generated_tags_are_unique() {
    let mut c = Canvas::new();
    c.add(dot(0.0), Some("@2"));
    let a = c.add(dot(1.0), None);
    let b = c.add(dot(2.0), None);
    assert_eq!(a, "@1");
    assert_eq!(b, "@3");
    assert_eq!(c.len(), 3);
}

#[test]
fn duplicate_tag_replaces_and_goes_on_top() {
    let mut c = Canvas::new();
    c.add(dot(1.0), Some("a"));
    c.add(dot(2.0), Some("b"));
    c.add(dot(3.0), Some("a"));
    assert_eq!(c.len(), 2);
    assert_eq!(c.tags(), ["b", "a"]);
    assert_eq!(x_of(c.get_object_by_tag("a").unwrap()), 3.0_f64);
}

#[test]
fn delete_missing_is_not_found() {
    let mut c = Canvas::new();
    assert!(matches!(c.delete_object_by_tag("nope"), Err(CanvasError::NotFound(_))));
}

#[test]
fn tolerant_bulk_delete_counts() {
    let mut c = Canvas::new();
    c.add(dot(0.0), Some("a"));
    c.add(dot(0.0), Some("b"));
    assert_eq!(c.delete_objects_by_tag(&["a", "gone", "b"]), 2);
    assert_eq!(c.delete_objects_by_tag(&["a"]), 0);
}

#[test]
fn prefix_query_and_delete() {
    let mut c = Canvas::new();
    c.add(dot(1.0), Some("peak0001"));
    c.add(dot(2.0), Some("ruler"));
    c.add(dot(3.0), Some("peak0002"));

    let peaks: Vec<&str> = c.get_objects_by_tag_prefix("peak").into_iter().map(|(t, _)| t).collect();
    assert_eq!(peaks, ["peak0001", "peak0002"]);

    assert_eq!(c.delete_objects_by_tag_prefix("peak"), 2);
    assert_eq!(c.tags(), ["ruler"]);
    assert_eq!(c.delete_all_objects(), 1);
    assert!(c.is_empty());
}

// =============================================================
// Ordering and ownership
// =============================================================

#[test]
fn raise_and_lower() {
    let mut c = Canvas::new();
    for tag in ["a", "b", "c"] {
        c.add(dot(0.0), Some(tag));
    }
    c.raise_object("a").unwrap();
    assert_eq!(c.tags(), ["b", "c", "a"]);
    c.lower_object("c").unwrap();
    assert_eq!(c.tags(), ["c", "b", "a"]);
    assert!(c.raise_object("zzz").is_err());
}

#[test]
fn move_object_transfers_ownership() {
    let mut src = Canvas::new();
    let mut dst = Canvas::new();
    src.add(dot(7.0), Some("m"));
    dst.add(dot(1.0), Some("x"));

    let tag = src.move_object_to("m", &mut dst, None).unwrap();
    assert_eq!(tag, "m");
    assert!(!src.has_tag("m"));
    assert_eq!(dst.tags(), ["x", "m"]);

    let renamed = dst.move_object_to("m", &mut src, Some("moved")).unwrap();
    assert_eq!(renamed, "moved");
    assert_eq!(x_of(src.get_object_by_tag("moved").unwrap()), 7.0_f64);
    assert!(dst.move_object_to("m", &mut src, None).is_err());
}

#[test]
fn objects_of_kind_walks_nested_canvases() {
    let mut inner = Canvas::new();
    inner.add(CanvasObject::line(0.0, 0.0, 2.0, 0.0), None);
    let mut c = Canvas::new();
    c.add(CanvasObject::line(0.0, 0.0, 1.0, 0.0), None);
    c.add(CanvasObject::canvas(inner), None);
    c.add(CanvasObject::compound(vec![CanvasObject::line(0.0, 0.0, 3.0, 0.0)]), None);
    c.add(dot(0.0), None);

    assert_eq!(c.objects_of_kind(ObjectKind::Line).len(), 3);
    assert_eq!(c.objects_of_kind(ObjectKind::Point).len(), 1);
    assert_eq!(c.objects_of_kind(ObjectKind::Canvas).len(), 1);
}

// =============================================================
// Snapshots
// =============================================================

#[test]
fn json_snapshot_preserves_order_and_nesting() {
    let mut inner = Canvas::new();
    inner.add(CanvasObject::text(1.0, 2.0, "M31", 12.0), Some("label"));
    let mut c = Canvas::new();
    c.add(dot(1.0), Some("b"));
    c.add(CanvasObject::canvas(inner), Some("layer"));
    c.add(dot(2.0), Some("a"));

    let json = c.to_json().unwrap();
    let back = Canvas::from_json(&json).unwrap();
    assert_eq!(back.tags(), ["b", "layer", "a"]);
    assert_eq!(back, c);
}

#[test]
fn malformed_snapshot_is_an_error() {
    assert!(matches!(Canvas::from_json("{\"objects\": 3}"), Err(CanvasError::Json(_))));
}
