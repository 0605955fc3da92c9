//! Zenithal projection family with the full native spherical rotation.
//!
//! Pixel → intermediate (x, y) → native (φ, θ) → celestial (α, δ), following
//! Calabretta & Greisen (2002). The reference point is the native pole, so
//! `(α_p, δ_p) = (CRVAL1, CRVAL2)` and `φ_p` is `LONPOLE` (default 180°, or
//! 0° when the reference point is the celestial pole).
//!
//! Works in the 0-based pixel convention internally.

#[cfg(test)]
#[path = "zenithal_test.rs"]
mod zenithal_test;

use std::f64::consts::{FRAC_PI_2, PI};

use super::linear::LinearParams;
use super::{ProjectionError, WcsBackend, WcsError};

const ORIGIN: f64 = 0.0;

/// Degrees per radian, the `180/π` factor in every R(θ).
const R0: f64 = 180.0 / PI;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZenithalProjection {
    /// Gnomonic.
    Tan,
    /// Orthographic (near hemisphere only).
    Sin,
    /// Zenithal equidistant.
    Arc,
    /// Stereographic.
    Stg,
    /// Zenithal equal-area.
    Zea,
}

impl ZenithalProjection {
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "TAN" => Some(Self::Tan),
            "SIN" => Some(Self::Sin),
            "ARC" => Some(Self::Arc),
            "STG" => Some(Self::Stg),
            "ZEA" => Some(Self::Zea),
            _ => None,
        }
    }

    /// Radial distance in the projection plane (degrees) for native
    /// latitude `theta` (radians).
    ///
    /// # Errors
    ///
    /// [`ProjectionError::BehindPlane`] where the projection diverges or
    /// folds over.
    pub fn radius(self, theta: f64) -> Result<f64, ProjectionError> {
        let (sin_t, cos_t) = theta.sin_cos();
        match self {
            Self::Tan if sin_t <= 1e-12 => Err(ProjectionError::BehindPlane),
            Self::Tan => Ok(R0 * cos_t / sin_t),
            Self::Sin if sin_t < 0.0 => Err(ProjectionError::BehindPlane),
            Self::Sin => Ok(R0 * cos_t),
            Self::Arc => Ok(R0 * (FRAC_PI_2 - theta)),
            Self::Stg if 1.0 + sin_t <= 1e-12 => Err(ProjectionError::BehindPlane),
            Self::Stg => Ok(R0 * 2.0 * cos_t / (1.0 + sin_t)),
            Self::Zea => Ok(R0 * (2.0 * (1.0 - sin_t)).max(0.0).sqrt()),
        }
    }

    /// Native latitude (radians) for radial distance `r` (degrees).
    ///
    /// # Errors
    ///
    /// [`ProjectionError::OutOfBounds`] beyond the projection boundary.
    pub fn theta(self, r: f64) -> Result<f64, ProjectionError> {
        let rho = r / R0;
        match self {
            Self::Tan => Ok(1.0_f64.atan2(rho)),
            Self::Sin if rho > 1.0 => Err(ProjectionError::OutOfBounds),
            Self::Sin => Ok(rho.acos()),
            Self::Arc if rho > PI => Err(ProjectionError::OutOfBounds),
            Self::Arc => Ok(FRAC_PI_2 - rho),
            Self::Stg => Ok(FRAC_PI_2 - 2.0 * (rho / 2.0).atan()),
            Self::Zea if rho > 2.0 => Err(ProjectionError::OutOfBounds),
            Self::Zea => Ok(FRAC_PI_2 - 2.0 * (rho / 2.0).asin()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ZenithalBackend {
    linear: LinearParams,
    projection: ZenithalProjection,
    /// Celestial coordinates of the native pole, radians.
    alpha_p: f64,
    delta_p: f64,
    /// Native longitude of the celestial pole, radians.
    phi_p: f64,
}

impl ZenithalBackend {
    /// # Errors
    ///
    /// Returns [`WcsError::UnsupportedProjection`] for non-zenithal codes.
    pub fn new(linear: LinearParams) -> Result<Self, WcsError> {
        let projection = ZenithalProjection::from_code(&linear.projection)
            .ok_or_else(|| WcsError::UnsupportedProjection(linear.projection.clone()))?;
        let alpha_p = linear.crval[0].to_radians();
        let delta_p = linear.crval[1].to_radians();
        let default_lonpole = if linear.crval[1] >= 90.0 { 0.0 } else { 180.0 };
        let phi_p = linear.lonpole.unwrap_or(default_lonpole).to_radians();
        Ok(Self { linear, projection, alpha_p, delta_p, phi_p })
    }

    #[must_use]
    pub fn projection(&self) -> ZenithalProjection {
        self.projection
    }

    /// Native (φ, θ) → celestial (α, δ); radians.
    fn native_to_celestial(&self, phi: f64, theta: f64) -> (f64, f64) {
        let (sin_t, cos_t) = theta.sin_cos();
        let (sin_dp, cos_dp) = self.delta_p.sin_cos();
        let (sin_dphi, cos_dphi) = (phi - self.phi_p).sin_cos();

        let alpha = self.alpha_p + (-cos_t * sin_dphi).atan2(sin_t * cos_dp - cos_t * sin_dp * cos_dphi);
        let delta = (sin_t * sin_dp + cos_t * cos_dp * cos_dphi).clamp(-1.0, 1.0).asin();
        (alpha, delta)
    }

    /// Celestial (α, δ) → native (φ, θ); radians.
    fn celestial_to_native(&self, alpha: f64, delta: f64) -> (f64, f64) {
        let (sin_d, cos_d) = delta.sin_cos();
        let (sin_dp, cos_dp) = self.delta_p.sin_cos();
        let (sin_da, cos_da) = (alpha - self.alpha_p).sin_cos();

        let phi = self.phi_p + (-cos_d * sin_da).atan2(sin_d * cos_dp - cos_d * sin_dp * cos_da);
        let theta = (sin_d * sin_dp + cos_d * cos_dp * cos_da).clamp(-1.0, 1.0).asin();
        (phi, theta)
    }
}

impl WcsBackend for ZenithalBackend {
    fn name(&self) -> &'static str {
        "zenithal"
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

        let r = x.hypot(y);
        let phi = if r == 0.0 { 0.0 } else { x.atan2(-y) };
        let theta = self.projection.theta(r)?;
        let (alpha, delta) = self.native_to_celestial(phi, theta);

        let mut world = Vec::with_capacity(lin.naxis);
        world.push(alpha.to_degrees().rem_euclid(360.0));
        world.push(delta.to_degrees());
        world.extend((2..lin.naxis).map(|i| lin.extra_pix_to_world(i, axis(pix, i), ORIGIN)));
        Ok(world)
    }

    fn world_to_pix(&self, world: &[f64]) -> Result<Vec<f64>, ProjectionError> {
        let lin = &self.linear;
        let (phi, theta) = self.celestial_to_native(axis(world, 0).to_radians(), axis(world, 1).to_radians());
        let r = self.projection.radius(theta)?;
        let (sin_phi, cos_phi) = phi.sin_cos();
        let (px, py) = lin.intermediate_to_pixel(r * sin_phi, -r * cos_phi, ORIGIN)?;

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
