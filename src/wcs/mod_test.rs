#![allow(clippy::float_cmp)]

use super::*;

fn approx_eq(a: f64, b: f64, tol: f64) -> bool {
    (a - b).abs() < tol
}

/// 100×100 TAN image, 1″ pixels, reference at the image centre.
fn tan_header() -> Header {
    let mut h = Header::new();
    h.insert("NAXIS", 2_i64);
    h.insert("CTYPE1", "RA---TAN");
    h.insert("CTYPE2", "DEC--TAN");
    h.insert("CRPIX1", 50.5);
    h.insert("CRPIX2", 50.5);
    h.insert("CRVAL1", 150.0);
    h.insert("CRVAL2", 30.0);
    h.insert("CD1_1", -1.0 / 3600.0);
    h.insert("CD1_2", 0.0);
    h.insert("CD2_1", 0.0);
    h.insert("CD2_2", 1.0 / 3600.0);
    h
}

fn zenithal() -> WcsConfig {
    WcsConfig { backend: BackendKind::Zenithal, ..WcsConfig::default() }
}

// =============================================================
// Frame resolution
// =============================================================

#[test]
fn ra_tan_without_frame_keywords_is_icrs() {
    let ctx = WcsFactory::default().load_header(&tan_header());
    assert_eq!(ctx.system(), CoordSystem::Icrs);
    assert_eq!(ctx.equinox(), None);
}

#[test]
fn equinox_alone_resolves_to_fk5() {
    let mut h = tan_header();
    h.insert("EQUINOX", 1950.0);
    let ctx = WcsFactory::default().load_header(&h);
    assert_eq!(ctx.system(), CoordSystem::Fk5);
    assert_eq!(ctx.equinox(), Some(1950.0));
}

#[test]
fn equinox_below_configured_cutoff_resolves_to_fk4() {
    let mut h = tan_header();
    h.insert("EQUINOX", 1950.0);
    assert_eq!(resolve_system(&h, Some(1984.0)), CoordSystem::Fk4);
    h.insert("EQUINOX", 2000.0);
    assert_eq!(resolve_system(&h, Some(1984.0)), CoordSystem::Fk5);
}

#[test]
fn epoch_is_used_when_equinox_missing() {
    let mut h = tan_header();
    h.insert("EPOCH", 1950.0);
    let ctx = WcsFactory::default().load_header(&h);
    assert_eq!(ctx.system(), CoordSystem::Fk5);
    assert_eq!(ctx.equinox(), Some(1950.0));
}

#[test]
fn radesys_wins_over_equinox() {
    let mut h = tan_header();
    h.insert("EQUINOX", 2000.0);
    h.insert("RADESYS", "FK4");
    assert_eq!(resolve_system(&h, None), CoordSystem::Fk4);
    h.insert("RADESYS", "icrs");
    assert_eq!(resolve_system(&h, None), CoordSystem::Icrs);
}

#[test]
fn radecsys_is_consulted_when_radesys_absent() {
    let mut h = tan_header();
    h.insert("RADECSYS", "FK5");
    assert_eq!(resolve_system(&h, None), CoordSystem::Fk5);
}

#[test]
fn unrecognised_radesys_falls_through_to_equinox() {
    let mut h = tan_header();
    h.insert("RADESYS", "GAPPT");
    assert_eq!(resolve_system(&h, None), CoordSystem::Icrs);
    h.insert("EQUINOX", 2000.0);
    assert_eq!(resolve_system(&h, None), CoordSystem::Fk5);
}

#[test]
fn galactic_and_ecliptic_axis_types() {
    let mut h = tan_header();
    h.insert("CTYPE1", "GLON-TAN");
    h.insert("CTYPE2", "GLAT-TAN");
    assert_eq!(resolve_system(&h, None), CoordSystem::Galactic);
    h.insert("CTYPE1", "ELON-TAN");
    h.insert("CTYPE2", "ELAT-TAN");
    assert_eq!(resolve_system(&h, None), CoordSystem::Ecliptic);
}

#[test]
fn missing_ctype1_is_raw_and_unusable() {
    let mut h = tan_header();
    h.remove("CTYPE1");
    let ctx = WcsFactory::default().load_header(&h);
    assert_eq!(ctx.system(), CoordSystem::Raw);
    assert!(!ctx.is_usable());
    assert_eq!(ctx.backend_name(), None);
    assert_eq!(ctx.pixel_scale_deg(), None);
}

// =============================================================
// Unusable contexts
// =============================================================

#[test]
fn conversions_on_unusable_context_fail_with_no_usable_wcs() {
    let ctx = WcsFactory::default().load_header(&Header::new());
    let err = ctx.pixtoradec(&[1.0, 1.0], CoordsConvention::Fits).unwrap_err();
    assert!(matches!(err, WcsError::NoUsableWcs));
    assert_eq!(err.to_string(), "No usable WCS");

    assert!(matches!(
        ctx.radectopix(10.0, 10.0, CoordsConvention::Data, None),
        Err(WcsError::NoUsableWcs)
    ));
    assert!(matches!(
        ctx.pixtosystem(&[1.0, 1.0], CoordSystem::Galactic, CoordsConvention::Data),
        Err(WcsError::NoUsableWcs)
    ));
}

#[test]
fn backend_construction_failure_leaves_context_unusable() {
    let mut h = tan_header();
    h.insert("CTYPE1", "RA---XYZ");
    let ctx = WcsFactory::default().load_header(&h);
    assert!(!ctx.is_usable());
    assert_eq!(ctx.system(), CoordSystem::Icrs);
}

#[test]
fn barebones_rejects_sin_but_zenithal_accepts_it() {
    let mut h = tan_header();
    h.insert("CTYPE1", "RA---SIN");
    h.insert("CTYPE2", "DEC--SIN");
    assert!(!WcsFactory::default().load_header(&h).is_usable());
    let ctx = WcsFactory::new(zenithal()).load_header(&h);
    assert!(ctx.is_usable());
    assert_eq!(ctx.backend_name(), Some("zenithal"));
}

// =============================================================
// Pixel conventions
// =============================================================

#[test]
fn reference_pixel_maps_to_crval_in_both_conventions() {
    for config in [WcsConfig::default(), zenithal()] {
        let ctx = WcsFactory::new(config).load_header(&tan_header());
        let (ra, dec) = ctx.pixtoradec(&[50.5, 50.5], CoordsConvention::Fits).unwrap();
        assert!(approx_eq(ra, 150.0, 1e-10), "{config:?}: ra = {ra}");
        assert!(approx_eq(dec, 30.0, 1e-10), "{config:?}: dec = {dec}");

        let (ra, dec) = ctx.pixtoradec(&[49.5, 49.5], CoordsConvention::Data).unwrap();
        assert!(approx_eq(ra, 150.0, 1e-10), "{config:?}: ra = {ra}");
        assert!(approx_eq(dec, 30.0, 1e-10), "{config:?}: dec = {dec}");
    }
}

#[test]
fn radectopix_returns_requested_convention() {
    for config in [WcsConfig::default(), zenithal()] {
        let ctx = WcsFactory::new(config).load_header(&tan_header());
        let (x, y) = ctx.radectopix(150.0, 30.0, CoordsConvention::Fits, None).unwrap();
        assert!(approx_eq(x, 50.5, 1e-9) && approx_eq(y, 50.5, 1e-9), "{config:?}");
        let (x, y) = ctx.radectopix(150.0, 30.0, CoordsConvention::Data, None).unwrap();
        assert!(approx_eq(x, 49.5, 1e-9) && approx_eq(y, 49.5, 1e-9), "{config:?}");
    }
}

#[test]
fn backends_agree_on_tan() {
    let bare = WcsFactory::default().load_header(&tan_header());
    let zen = WcsFactory::new(zenithal()).load_header(&tan_header());
    for &(x, y) in &[(0.0, 0.0), (99.0, 0.0), (10.0, 80.0), (49.5, 99.0)] {
        let a = bare.pixtoradec(&[x, y], CoordsConvention::Data).unwrap();
        let b = zen.pixtoradec(&[x, y], CoordsConvention::Data).unwrap();
        assert!(approx_eq(a.0, b.0, 1e-9) && approx_eq(a.1, b.1, 1e-9), "{a:?} vs {b:?}");
    }
}

#[test]
fn pixel_sky_round_trip() {
    let ctx = WcsFactory::default().load_header(&tan_header());
    for &(x, y) in &[(0.0, 0.0), (99.0, 99.0), (12.25, 73.5)] {
        let (ra, dec) = ctx.pixtoradec(&[x, y], CoordsConvention::Data).unwrap();
        let (x2, y2) = ctx.radectopix(ra, dec, CoordsConvention::Data, None).unwrap();
        assert!(approx_eq(x, x2, 1e-8) && approx_eq(y, y2, 1e-8));
    }
}

#[test]
fn east_is_left_with_negative_cd1_1() {
    let ctx = WcsFactory::default().load_header(&tan_header());
    let (ra_left, _) = ctx.pixtoradec(&[0.0, 49.5], CoordsConvention::Data).unwrap();
    assert!(ra_left > 150.0);
}

#[test]
fn too_few_axes_rejected() {
    let ctx = WcsFactory::default().load_header(&tan_header());
    assert!(matches!(
        ctx.pixtoradec(&[1.0], CoordsConvention::Data),
        Err(WcsError::TooFewAxes(1))
    ));
}

#[test]
fn far_side_position_is_a_conversion_error() {
    let ctx = WcsFactory::default().load_header(&tan_header());
    let err = ctx.radectopix(330.0, -30.0, CoordsConvention::Data, None).unwrap_err();
    assert!(matches!(err, WcsError::Conversion(ProjectionError::BehindPlane)));
    assert!(std::error::Error::source(&err).is_some());
}

// =============================================================
// Extra axes
// =============================================================

fn cube_header() -> Header {
    let mut h = tan_header();
    h.insert("NAXIS", 3_i64);
    h.insert("CTYPE3", "FREQ");
    h.insert("CRPIX3", 1.0);
    h.insert("CRVAL3", 1.0e9);
    h.insert("CDELT3", 1.0e6);
    h
}

#[test]
fn cube_accepts_two_or_three_pixel_coordinates() {
    let ctx = WcsFactory::default().load_header(&cube_header());
    let a = ctx.pixtoradec(&[49.5, 49.5], CoordsConvention::Data).unwrap();
    let b = ctx.pixtoradec(&[49.5, 49.5, 7.0], CoordsConvention::Data).unwrap();
    assert!(approx_eq(a.0, 150.0, 1e-10) && approx_eq(b.0, 150.0, 1e-10));
}

#[test]
fn radectopix_with_extra_axes_returns_first_two() {
    let ctx = WcsFactory::default().load_header(&cube_header());
    let extra = [1.0e9 + 5.0e6];
    let (x, y) = ctx.radectopix(150.0, 30.0, CoordsConvention::Fits, Some(&extra)).unwrap();
    assert!(approx_eq(x, 50.5, 1e-9) && approx_eq(y, 50.5, 1e-9));
}

// =============================================================
// Sky systems
// =============================================================

#[test]
fn pixtosystem_identity_for_native_frame() {
    let ctx = WcsFactory::default().load_header(&tan_header());
    let (lon, lat) = ctx.pixtosystem(&[49.5, 49.5], CoordSystem::Icrs, CoordsConvention::Data).unwrap();
    assert!(approx_eq(lon, 150.0, 1e-10) && approx_eq(lat, 30.0, 1e-10));
}

#[test]
fn pixtosystem_galactic_round_trips_through_native() {
    let ctx = WcsFactory::default().load_header(&tan_header());
    let (l, b) = ctx.pixtosystem(&[49.5, 49.5], CoordSystem::Galactic, CoordsConvention::Data).unwrap();
    let (ra, dec) = frames::convert(l, b, SkyFrame::new(CoordSystem::Galactic), ctx.sky_frame()).unwrap();
    assert!(approx_eq(ra, 150.0, 1e-9) && approx_eq(dec, 30.0, 1e-9));
    assert!(b > 0.0, "field at ra=150 dec=30 lies north of the galactic plane");
}

#[test]
fn coord_system_parses_case_insensitively() {
    assert_eq!("ICRS".parse::<CoordSystem>().unwrap(), CoordSystem::Icrs);
    assert_eq!(" Galactic ".parse::<CoordSystem>().unwrap(), CoordSystem::Galactic);
    assert_eq!("fk4-no-e".parse::<CoordSystem>().unwrap(), CoordSystem::Fk4);
    assert!(matches!("nope".parse::<CoordSystem>(), Err(WcsError::UnknownSystem(_))));
    assert_eq!(CoordSystem::Ecliptic.to_string(), "ecliptic");
}

#[test]
fn backend_kind_parses() {
    assert_eq!("Zenithal".parse::<BackendKind>().unwrap(), BackendKind::Zenithal);
    assert!(matches!("astropy".parse::<BackendKind>(), Err(WcsError::UnknownBackend(_))));
}

// =============================================================
// Header handling
// =============================================================

#[test]
fn degree_units_are_normalised() {
    let mut h = tan_header();
    h.insert("CUNIT1", "DEGREE");
    h.insert("CUNIT2", "deg");
    let ctx = WcsFactory::default().load_header(&h);
    assert_eq!(ctx.header().get_str("CUNIT1"), Some("deg"));
    assert_eq!(ctx.header().get_str("CUNIT2"), Some("deg"));
}

#[test]
fn with_header_keeps_configuration() {
    let ctx = WcsFactory::new(zenithal()).load_header(&tan_header());
    let mut h = tan_header();
    h.insert("CRVAL1", 151.0);
    let next = ctx.with_header(&h);
    assert_eq!(next.backend_name(), Some("zenithal"));
    let (ra, _) = next.pixtoradec(&[49.5, 49.5], CoordsConvention::Data).unwrap();
    assert!(approx_eq(ra, 151.0, 1e-10));
    let (ra, _) = ctx.pixtoradec(&[49.5, 49.5], CoordsConvention::Data).unwrap();
    assert!(approx_eq(ra, 150.0, 1e-10));
}

#[test]
fn pixel_scale_from_matrix() {
    let ctx = WcsFactory::default().load_header(&tan_header());
    let scale = ctx.pixel_scale_deg().unwrap();
    assert!(approx_eq(scale * 3600.0, 1.0, 1e-12));
}

#[test]
fn shared_context_is_send_and_sync() {
    fn assert_send_sync<T: Send + Sync>(_: &T) {}
    let ctx = WcsFactory::default().load_shared(&tan_header());
    assert_send_sync(&ctx);
}
