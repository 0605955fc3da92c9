#![allow(clippy::float_cmp)]

use super::*;

fn approx_eq(a: f64, b: f64, tol: f64) -> bool {
    (a - b).abs() < tol
}

fn base() -> Header {
    let mut h = Header::new();
    h.insert("CTYPE1", "RA---TAN");
    h.insert("CTYPE2", "DEC--TAN");
    h.insert("CRPIX1", 10.0);
    h.insert("CRPIX2", 20.0);
    h.insert("CRVAL1", 45.0);
    h.insert("CRVAL2", -10.0);
    h
}

#[test]
fn cd_matrix_takes_priority() {
    let mut h = base();
    h.insert("CD1_1", -0.001);
    h.insert("CD2_2", 0.002);
    h.insert("PC1_1", 5.0);
    h.insert("CDELT1", 7.0);
    h.insert("CDELT2", 7.0);
    let p = LinearParams::from_header(&h).unwrap();
    assert_eq!(p.matrix_source, MatrixSource::Cd);
    assert_eq!(p.matrix, [[-0.001, 0.0], [0.0, 0.002]]);
}

#[test]
fn pc_matrix_is_scaled_by_cdelt() {
    let mut h = base();
    h.insert("PC1_2", 0.5);
    h.insert("CDELT1", 2.0);
    h.insert("CDELT2", 3.0);
    let p = LinearParams::from_header(&h).unwrap();
    assert_eq!(p.matrix_source, MatrixSource::Pc);
    assert_eq!(p.matrix, [[2.0, 1.0], [0.0, 3.0]]);
}

#[test]
fn cdelt_with_crota2() {
    let mut h = base();
    h.insert("CDELT1", -1.0);
    h.insert("CDELT2", 1.0);
    h.insert("CROTA2", 90.0);
    let p = LinearParams::from_header(&h).unwrap();
    assert_eq!(p.matrix_source, MatrixSource::Cdelt);
    assert!(approx_eq(p.matrix[0][0], 0.0, 1e-15));
    assert!(approx_eq(p.matrix[0][1], -1.0, 1e-15));
    assert!(approx_eq(p.matrix[1][0], -1.0, 1e-15));
    assert!(approx_eq(p.matrix[1][1], 0.0, 1e-15));
}

#[test]
fn missing_scale_keywords_is_an_error() {
    let err = LinearParams::from_header(&base()).unwrap_err();
    assert!(matches!(err, WcsError::MissingKeyword(_)));
}

#[test]
fn missing_reference_keyword_is_named() {
    let mut h = base();
    h.insert("CD1_1", 1.0);
    h.insert("CD2_2", 1.0);
    h.remove("CRVAL2");
    let err = LinearParams::from_header(&h).unwrap_err();
    assert!(matches!(err, WcsError::MissingKeyword(ref k) if k == "CRVAL2"));
}

#[test]
fn singular_matrix_is_rejected() {
    let mut h = base();
    h.insert("CD1_1", 1.0);
    h.insert("CD1_2", 2.0);
    h.insert("CD2_1", 2.0);
    h.insert("CD2_2", 4.0);
    assert!(matches!(LinearParams::from_header(&h), Err(WcsError::SingularMatrix)));
}

#[test]
fn projection_code_and_distortion_suffix() {
    let mut h = base();
    h.insert("CD1_1", 1.0);
    h.insert("CD2_2", 1.0);
    h.insert("CTYPE1", "RA---TAN-SIP");
    assert_eq!(LinearParams::from_header(&h).unwrap().projection, "TAN");
    h.insert("CTYPE1", "GLON-ZEA");
    assert_eq!(LinearParams::from_header(&h).unwrap().projection, "ZEA");
    h.insert("CTYPE1", "LINEAR");
    assert!(matches!(LinearParams::from_header(&h), Err(WcsError::UnsupportedProjection(_))));
}

#[test]
fn intermediate_round_trip_respects_origin() {
    let mut h = base();
    h.insert("CD1_1", 0.5);
    h.insert("CD1_2", 0.1);
    h.insert("CD2_1", -0.2);
    h.insert("CD2_2", 0.4);
    let p = LinearParams::from_header(&h).unwrap();

    assert_eq!(p.pixel_to_intermediate(10.0, 20.0, 1.0), (0.0, 0.0));
    assert_eq!(p.pixel_to_intermediate(9.0, 19.0, 0.0), (0.0, 0.0));

    let (x, y) = p.pixel_to_intermediate(3.0, 7.5, 0.0);
    let (px, py) = p.intermediate_to_pixel(x, y, 0.0).unwrap();
    assert!(approx_eq(px, 3.0, 1e-12) && approx_eq(py, 7.5, 1e-12));
}

#[test]
fn axis_count_follows_declared_and_ctype_keys() {
    let mut h = base();
    h.insert("CD1_1", 1.0);
    h.insert("CD2_2", 1.0);
    assert_eq!(LinearParams::from_header(&h).unwrap().naxis, 2);
    h.insert("CTYPE3", "VELO");
    h.insert("CRVAL3", 100.0);
    h.insert("CDELT3", 2.0);
    h.insert("CRPIX3", 1.0);
    let p = LinearParams::from_header(&h).unwrap();
    assert_eq!(p.naxis, 3);
    assert_eq!(p.extra_pix_to_world(2, 1.0, 1.0), 100.0);
    assert_eq!(p.extra_pix_to_world(2, 3.0, 0.0), 106.0);
    assert_eq!(p.extra_world_to_pix(2, 106.0, 0.0), 3.0);
}

#[test]
fn rotate_composes_with_matrix() {
    let m = [[1.0, 0.0], [0.0, 1.0]];
    let r = rotate(&m, 90.0);
    assert!(approx_eq(r[0][0], 0.0, 1e-15) && approx_eq(r[0][1], -1.0, 1e-15));
    assert!(approx_eq(r[1][0], 1.0, 1e-15) && approx_eq(r[1][1], 0.0, 1e-15));
    let back = rotate(&r, -90.0);
    assert!(approx_eq(back[0][0], 1.0, 1e-15) && approx_eq(back[1][1], 1.0, 1e-15));
}

#[test]
fn invert_singular_is_none() {
    assert!(invert(&[[1.0, 2.0], [2.0, 4.0]]).is_none());
    let inv = invert(&[[2.0, 0.0], [0.0, 4.0]]).unwrap();
    assert_eq!(inv, [[0.5, 0.0], [0.0, 0.25]]);
}
