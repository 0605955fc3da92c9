//! End-to-end scenarios through the public API.
#![allow(clippy::float_cmp)]

use ginga_core::angle::{dms_str_to_deg, eq_to_eq2000, hms_str_to_deg};
use ginga_core::fit::{FitConfig, WcsCorrection, apply_correction, fit_wcs};
use ginga_core::input::{Button, DrawKind, Modifiers, Tool};
use ginga_core::wcs::{WcsConfig, resolve_system};
use ginga_core::{
    Action, Canvas, CanvasError, CanvasObject, CoordSystem, CoordsConvention, CoreConfig, Header, Point,
    ViewerCore, WcsFactory,
};

fn init_tracing() {
    // Already installed by an earlier test in this binary.
    let _ = tracing_subscriber::fmt().with_test_writer().with_max_level(tracing::Level::DEBUG).try_init();
}

fn approx_eq(a: f64, b: f64, tol: f64) -> bool {
    (a - b).abs() < tol
}

fn tan_header() -> Header {
    let mut h = Header::new();
    h.insert("CTYPE1", "RA---TAN");
    h.insert("CTYPE2", "DEC--TAN");
    h.insert("CRPIX1", 512.0);
    h.insert("CRPIX2", 512.0);
    h.insert("CRVAL1", 83.8);
    h.insert("CRVAL2", -5.4);
    h.insert("CD1_1", -0.5 / 3600.0);
    h.insert("CD1_2", 0.0);
    h.insert("CD2_1", 0.0);
    h.insert("CD2_2", 0.5 / 3600.0);
    h
}

// =============================================================================
// Angles
// =============================================================================

#[test]
fn sexagesimal_strings_parse_exactly() {
    assert_eq!(hms_str_to_deg("12:30:00.000").unwrap(), 187.5);
    assert_eq!(dms_str_to_deg("-45:30:00.00").unwrap(), -45.5);
}

#[test]
fn precessing_from_j2000_is_identity() {
    let (ra, dec) = eq_to_eq2000(10.684, 41.269, 2000.0);
    assert!(approx_eq(ra, 10.684, 1e-9));
    assert!(approx_eq(dec, 41.269, 1e-9));
}

// =============================================================================
// Frame resolution
// =============================================================================

#[test]
fn bare_ra_header_is_icrs() {
    let mut h = Header::new();
    h.insert("CTYPE1", "RA---TAN");
    assert_eq!(resolve_system(&h, None), CoordSystem::Icrs);
    assert_eq!(WcsFactory::default().load_header(&h).system(), CoordSystem::Icrs);
}

#[test]
fn equinox_alone_is_fk5_unless_a_cutoff_is_configured() {
    let mut h = Header::new();
    h.insert("CTYPE1", "RA---TAN");
    h.insert("EQUINOX", 1950.0);
    assert_eq!(WcsFactory::default().load_header(&h).system(), CoordSystem::Fk5);

    let legacy = WcsFactory::new(WcsConfig { fk4_equinox_cutoff: Some(1984.0), ..WcsConfig::default() });
    assert_eq!(legacy.load_header(&h).system(), CoordSystem::Fk4);
}

// =============================================================================
// Fitting
// =============================================================================

#[test]
fn fit_recovers_two_arcsec_ra_shift() {
    init_tracing();
    let sky = [(83.79, -5.41), (83.81, -5.41), (83.81, -5.39), (83.795, -5.385)];
    let shift = WcsCorrection { delta_ra_arcsec: 2.0, ..WcsCorrection::default() };
    let truth = WcsFactory::default().load_header(&apply_correction(&tan_header(), &shift).unwrap());
    let pixels: Vec<(f64, f64)> = sky
        .iter()
        .map(|&(ra, dec)| truth.radectopix(ra, dec, CoordsConvention::Data, None).unwrap())
        .collect();

    let ctx = WcsFactory::default().load_header(&tan_header());
    let result = fit_wcs(&ctx, &sky, &pixels, CoordsConvention::Data, &FitConfig::default()).unwrap();
    assert!(approx_eq(result.correction.delta_ra_arcsec, 2.0, 0.01), "{result:?}");
    assert!(approx_eq(result.correction.delta_dec_arcsec, 0.0, 0.01), "{result:?}");
    assert!(approx_eq(result.correction.delta_theta_deg, 0.0, 1e-3), "{result:?}");
}

// =============================================================================
// Canvas
// =============================================================================

#[test]
fn deleted_tag_is_not_found() {
    let mut canvas = Canvas::new();
    canvas.add(CanvasObject::rectangle(0.0, 0.0, 10.0, 10.0), Some("r1"));
    canvas.delete_object_by_tag("r1").unwrap();
    assert!(matches!(canvas.get_object_by_tag("r1"), Err(CanvasError::NotFound(_))));
}

#[test]
fn canvas_snapshot_survives_json() {
    let mut canvas = Canvas::new();
    canvas.add(CanvasObject::circle(5.0, 5.0, 2.0), Some("c"));
    canvas.add(CanvasObject::text(1.0, 1.0, "M42", 12.0), Some("label"));
    let restored = Canvas::from_json(&canvas.to_json().unwrap()).unwrap();
    assert_eq!(restored, canvas);
    assert_eq!(restored.tags(), ["c", "label"]);
}

// =============================================================================
// Viewer
// =============================================================================

#[test]
fn drawn_object_maps_to_sky() {
    init_tracing();
    let mut core = ViewerCore::new(&CoreConfig::default());
    core.resize_window(1024.0, 1024.0).unwrap();
    core.load_header(&tan_header());
    core.set_pan(511.0, 511.0).unwrap();

    core.set_tool(Tool::Draw(DrawKind::Circle));
    let m = Modifiers::default();
    core.pointer_down(Point::new(512.0, 512.0), Button::Primary, m);
    core.pointer_move(Point::new(530.0, 512.0), m);
    let actions = core.pointer_up(Point::new(540.0, 512.0), Button::Primary, m);
    let [Action::DrawEvent { tag }] = actions.as_slice() else {
        panic!("expected one draw event, got {actions:?}");
    };

    let centre = core.canvas().get_object_by_tag(tag).unwrap().stored_control_points()[0];
    let (ra, dec) = core.pixtoradec(centre.x, centre.y).unwrap();
    assert!(approx_eq(ra, 83.8, 1e-9), "{ra}");
    assert!(approx_eq(dec, -5.4, 1e-9), "{dec}");
}
