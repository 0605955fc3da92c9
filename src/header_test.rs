#![allow(clippy::float_cmp)]

use super::*;

#[test]
fn insert_uppercases_keys() {
    let mut h = Header::new();
    h.insert("ctype1", "RA---TAN");
    assert_eq!(h.get_str("CTYPE1"), Some("RA---TAN"));
    assert_eq!(h.get_str("ctype1"), Some("RA---TAN"));
}

#[test]
fn insert_replaces_in_place() {
    let mut h = Header::new();
    h.insert("A", 1_i64);
    h.insert("B", 2_i64);
    h.insert("A", 3_i64);
    assert_eq!(h.len(), 2);
    assert_eq!(h.keys().collect::<Vec<_>>(), vec!["A", "B"]);
    assert_eq!(h.get_f64("A"), Some(3.0));
}

#[test]
fn remove_reindexes_later_cards() {
    let mut h = Header::new();
    h.insert("A", 1_i64);
    h.insert("B", 2_i64);
    h.insert("C", 3_i64);
    assert_eq!(h.remove("a"), Some(HeaderValue::Int(1)));
    assert_eq!(h.get_f64("B"), Some(2.0));
    assert_eq!(h.get_f64("C"), Some(3.0));
    assert!(!h.contains("A"));
    assert_eq!(h.remove("A"), None);
}

#[test]
fn get_f64_accepts_int_and_float_only() {
    let mut h = Header::new();
    h.insert("I", 2_i64);
    h.insert("F", 2.5);
    h.insert("S", "2.5");
    h.insert("B", true);
    assert_eq!(h.get_f64("I"), Some(2.0));
    assert_eq!(h.get_f64("F"), Some(2.5));
    assert_eq!(h.get_f64("S"), None);
    assert_eq!(h.get_f64("B"), None);
}

#[test]
fn get_str_trims() {
    let mut h = Header::new();
    h.insert("RADESYS", "  FK5   ");
    assert_eq!(h.get_str("RADESYS"), Some("FK5"));
}

#[test]
fn from_json_str_parses_scalars() {
    let h = Header::from_json_str(r#"{"CTYPE1": "RA---TAN", "NAXIS": 2, "CDELT1": -0.001, "SIMPLE": true}"#).unwrap();
    assert_eq!(h.get_str("CTYPE1"), Some("RA---TAN"));
    assert_eq!(h.get("NAXIS"), Some(&HeaderValue::Int(2)));
    assert_eq!(h.get_f64("CDELT1"), Some(-0.001));
    assert_eq!(h.get("SIMPLE"), Some(&HeaderValue::Bool(true)));
}

#[test]
fn from_json_str_rejects_nested_values() {
    let err = Header::from_json_str(r#"{"BAD": [1, 2]}"#).unwrap_err();
    assert!(matches!(err, HeaderError::UnsupportedValue { ref key } if key == "BAD"));
}

#[test]
fn from_json_str_rejects_non_object() {
    assert!(matches!(Header::from_json_str("[1]"), Err(HeaderError::NotAnObject)));
    assert!(matches!(Header::from_json_str("{"), Err(HeaderError::Json(_))));
}

#[test]
fn collects_from_iterator() {
    let h: Header = vec![("crval1", 10.0), ("crval2", 20.0)].into_iter().collect();
    assert_eq!(h.get_f64("CRVAL1"), Some(10.0));
    assert_eq!(h.len(), 2);
}

#[test]
fn from_json_str_keeps_card_order() {
    let h = Header::from_json_str(r#"{"SIMPLE": true, "NAXIS": 2, "CTYPE1": "RA---TAN", "BITPIX": 16}"#).unwrap();
    assert_eq!(h.keys().collect::<Vec<_>>(), vec!["SIMPLE", "NAXIS", "CTYPE1", "BITPIX"]);
}

#[test]
fn serde_round_trip_keeps_order_and_types() {
    let mut h = Header::new();
    h.insert("NAXIS", 2_i64);
    h.insert("CTYPE1", "RA---TAN");
    h.insert("CDELT1", -0.5);
    h.insert("SIMPLE", true);

    let json = serde_json::to_string(&h).unwrap();
    let back: Header = serde_json::from_str(&json).unwrap();
    assert_eq!(back, h);
    assert_eq!(back.keys().collect::<Vec<_>>(), vec!["NAXIS", "CTYPE1", "CDELT1", "SIMPLE"]);
    assert_eq!(back.get("NAXIS"), Some(&HeaderValue::Int(2)));
    assert_eq!(back.get("CDELT1"), Some(&HeaderValue::Float(-0.5)));
}
