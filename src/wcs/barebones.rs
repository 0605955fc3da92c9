//! Self-contained gnomonic (TAN) backend.
//!
//! Needs nothing beyond the linear keywords, so a viewer always has a
//! working WCS for the common case. Works in the 1-based FITS pixel
//! convention internally.
//!
//! The tangent-plane formulas assume the default native pole, so a header
//! whose `LONPOLE` differs from it is rejected; the zenithal backend handles
//! those.

#[cfg(test)]
#[path = "barebones_test.rs"]
mod barebones_test;

use super::linear::LinearParams;
use super::{ProjectionError, WcsBackend, WcsError};

const ORIGIN: f64 = 1.0;

#[derive(Debug, Clone)]
pub struct BarebonesBackend {
    linear: LinearParams,
}

impl BarebonesBackend {
    /// # Errors
    ///
    /// Returns [`WcsError::UnsupportedProjection`] for anything but `TAN`,
    /// and [`WcsError::UnsupportedLonpole`] for a non-default `LONPOLE`.
    pub fn new(linear: LinearParams) -> Result<Self, WcsError> {
        if linear.projection != "TAN" {
            return Err(WcsError::UnsupportedProjection(linear.projection));
        }
        let default_lonpole = if linear.crval[1] >= 90.0 { 0.0 } else { 180.0 };
        if let Some(lonpole) = linear.lonpole {
            let diff = (lonpole - default_lonpole).rem_euclid(360.0);
            if diff > 1e-9 && diff < 360.0 - 1e-9 {
                return Err(WcsError::UnsupportedLonpole(lonpole));
            }
        }
        Ok(Self { linear })
    }
}

impl WcsBackend for BarebonesBackend {
    fn name(&self) -> &'static str {
        "barebones"
    }

    fn pixel_origin(&self) -> f64 {
        ORIGIN
    }

    fn naxis(&self) -> usize {
        self.linear.naxis
    }

    fn linear(&self) -> &LinearParams {
        &self.linear
    }

    fn pix_to_world(&self, pix: &[f64]) -> Result<Vec<f64>, ProjectionError> {
        let lin = &self.linear;
        let (x, y) = lin.pixel_to_intermediate(axis(pix, 0), axis(pix, 1), ORIGIN);
        let (ra, dec) = tan_deproject(
            x.to_radians(),
            y.to_radians(),
            lin.crval[0].to_radians(),
            lin.crval[1].to_radians(),
        );

        let mut world = Vec::with_capacity(lin.naxis);
        world.push(ra.to_degrees().rem_euclid(360.0));
        world.push(dec.to_degrees());
        world.extend((2..lin.naxis).map(|i| lin.extra_pix_to_world(i, axis(pix, i), ORIGIN)));
        Ok(world)
    }

    fn world_to_pix(&self, world: &[f64]) -> Result<Vec<f64>, ProjectionError> {
        let lin = &self.linear;
        let (xi, eta) = tan_project(
            axis(world, 0).to_radians(),
            axis(world, 1).to_radians(),
            lin.crval[0].to_radians(),
            lin.crval[1].to_radians(),
        )
        .ok_or(ProjectionError::BehindPlane)?;
        let (px, py) = lin.intermediate_to_pixel(xi.to_degrees(), eta.to_degrees(), ORIGIN)?;

        let mut pix = Vec::with_capacity(lin.naxis);
        pix.push(px);
        pix.push(py);
        pix.extend((2..lin.naxis).map(|i| lin.extra_world_to_pix(i, axis(world, i), ORIGIN)));
        Ok(pix)
    }
}

fn axis(values: &[f64], i: usize) -> f64 {
    values.get(i).copied().unwrap_or(0.0)
}

/// Gnomonic projection of `(ra, dec)` about `(ra0, dec0)`; all radians.
/// Returns standard coordinates `(ξ, η)`, or `None` when the position is
/// 90° or more from the tangent point.
#[must_use]
pub fn tan_project(ra: f64, dec: f64, ra0: f64, dec0: f64) -> Option<(f64, f64)> {
    let (sin_dec, cos_dec) = dec.sin_cos();
    let (sin_dec0, cos_dec0) = dec0.sin_cos();
    let (sin_da, cos_da) = (ra - ra0).sin_cos();

    let cos_c = sin_dec * sin_dec0 + cos_dec * cos_dec0 * cos_da;
    if cos_c <= 1e-12 {
        return None;
    }

    let xi = cos_dec * sin_da / cos_c;
    let eta = (sin_dec * cos_dec0 - cos_dec * sin_dec0 * cos_da) / cos_c;
    Some((xi, eta))
}

/// Inverse of [`tan_project`]; all radians.
#[must_use]
pub fn tan_deproject(xi: f64, eta: f64, ra0: f64, dec0: f64) -> (f64, f64) {
    let (sin_dec0, cos_dec0) = dec0.sin_cos();
    let denom = cos_dec0 - eta * sin_dec0;
    let ra = ra0 + xi.atan2(denom);
    let dec = (sin_dec0 + eta * cos_dec0).atan2(xi.hypot(denom));
    (ra, dec)
}
