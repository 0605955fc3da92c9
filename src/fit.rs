//! WCS correction fit.
//!
//! Given reference sky positions and the pixel positions at which they were
//! actually observed, find the shift of the reference value and the rotation
//! of the linear matrix that bring the WCS prediction onto the observations.
//!
//! DESIGN
//! ======
//! The objective is the sum of squared pixel distances between each observed
//! pixel and the pixel predicted by a trial WCS. A trial is built by applying
//! a [`WcsCorrection`] to a copy of the header and loading a fresh context
//! through [`WcsContext::with_header`], so the caller's context is never
//! touched. The three parameters are searched by [`NelderMead`] from zero.
//!
//! A single point fixes position but not orientation, so with fewer than
//! [`MIN_POINTS_FOR_ROTATION`] points only the shift is fitted and the
//! rotation is held at zero.
//!
//! ERROR HANDLING
//! ==============
//! Empty or mismatched reference lists and an unusable starting context are
//! errors. Trials whose WCS cannot be built, or that push a reference point
//! off the projection, score [`FIT_PENALTY`] so the search backs away.

#[cfg(test)]
#[path = "fit_test.rs"]
mod fit_test;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::consts::{ARCSEC_PER_DEG, FIT_PENALTY, MIN_POINTS_FOR_ROTATION};
use crate::header::Header;
use crate::simplex::NelderMead;
use crate::wcs::linear::{self, LinearParams, MatrixSource};
use crate::wcs::{CoordsConvention, WcsContext, WcsError};

#[derive(Debug, thiserror::Error)]
pub enum FitError {
    #[error("no reference points given")]
    NoReferencePoints,
    #[error("reference lists differ in length: {sky} sky positions, {pixel} pixel positions")]
    LengthMismatch { sky: usize, pixel: usize },
    #[error(transparent)]
    Wcs(#[from] WcsError),
}

/// Search settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitConfig {
    pub max_iterations: usize,
    /// Parameter tolerance (arcsec for shifts, degrees for rotation).
    pub xatol: f64,
    /// Objective tolerance in squared pixels.
    pub fatol: f64,
    /// Initial simplex edges for `(Δra, Δdec, Δθ)`.
    pub initial_step: [f64; 3],
}

impl Default for FitConfig {
    fn default() -> Self {
        Self { max_iterations: 2000, xatol: 1e-6, fatol: 1e-12, initial_step: [1.0, 1.0, 0.01] }
    }
}

/// Shift of `CRVAL` and rotation of the linear matrix.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct WcsCorrection {
    pub delta_ra_arcsec: f64,
    pub delta_dec_arcsec: f64,
    pub delta_theta_deg: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitResult {
    pub correction: WcsCorrection,
    /// Final sum of squared pixel residuals.
    pub residual: f64,
    pub iterations: usize,
    pub converged: bool,
    /// `false` when too few points were given to constrain rotation.
    pub rotation_fitted: bool,
}

/// Fit a correction to `context` from matched reference positions.
///
/// `sky` holds `(ra, dec)` in degrees in the context's native frame;
/// `pixels` the observed positions in `convention`.
///
/// # Errors
///
/// [`FitError::NoReferencePoints`], [`FitError::LengthMismatch`], or
/// [`FitError::Wcs`] when `context` is unusable.
pub fn fit_wcs(
    context: &WcsContext,
    sky: &[(f64, f64)],
    pixels: &[(f64, f64)],
    convention: CoordsConvention,
    config: &FitConfig,
) -> Result<FitResult, FitError> {
    if sky.len() != pixels.len() {
        return Err(FitError::LengthMismatch { sky: sky.len(), pixel: pixels.len() });
    }
    if sky.is_empty() {
        return Err(FitError::NoReferencePoints);
    }
    if !context.is_usable() {
        return Err(WcsError::NoUsableWcs.into());
    }

    let points = sky.len();
    let rotation_fitted = points >= MIN_POINTS_FOR_ROTATION;
    info!(points, rotation_fitted, "fit: starting");
    if !rotation_fitted {
        warn!(points, "fit: too few reference points to constrain rotation; fitting shift only");
    }

    let header = context.header();
    let objective = |params: &[f64]| {
        let correction = correction_from(params);
        let Ok(trial_header) = apply_correction(header, &correction) else {
            return FIT_PENALTY;
        };
        let trial = context.with_header(&trial_header);
        residual(&trial, sky, pixels, convention)
    };

    let dims = if rotation_fitted { 3 } else { 2 };
    let search = NelderMead {
        max_iterations: config.max_iterations,
        xatol: config.xatol,
        fatol: config.fatol,
        initial_step: config.initial_step[..dims].to_vec(),
    };
    let min = search.minimize(objective, &vec![0.0; dims]);

    let result = FitResult {
        correction: correction_from(&min.x),
        residual: min.value,
        iterations: min.iterations,
        converged: min.converged,
        rotation_fitted,
    };
    info!(
        residual = result.residual,
        iterations = result.iterations,
        converged = result.converged,
        delta_ra_arcsec = result.correction.delta_ra_arcsec,
        delta_dec_arcsec = result.correction.delta_dec_arcsec,
        delta_theta_deg = result.correction.delta_theta_deg,
        "fit: finished"
    );
    Ok(result)
}

fn correction_from(params: &[f64]) -> WcsCorrection {
    WcsCorrection {
        delta_ra_arcsec: params.first().copied().unwrap_or(0.0),
        delta_dec_arcsec: params.get(1).copied().unwrap_or(0.0),
        delta_theta_deg: params.get(2).copied().unwrap_or(0.0),
    }
}

/// Sum of squared pixel distances between predicted and observed positions.
/// Unusable contexts and unprojectable points score [`FIT_PENALTY`].
#[must_use]
pub fn residual(context: &WcsContext, sky: &[(f64, f64)], pixels: &[(f64, f64)], convention: CoordsConvention) -> f64 {
    let mut total = 0.0;
    for (&(ra, dec), &(px, py)) in sky.iter().zip(pixels) {
        match context.radectopix(ra, dec, convention, None) {
            Ok((x, y)) => total += (x - px).powi(2) + (y - py).powi(2),
            Err(_) => return FIT_PENALTY,
        }
    }
    total
}

/// Copy of `header` with `correction` applied: `CRVAL` shifted by the
/// arcsecond offsets, and the celestial matrix left-multiplied by a rotation
/// of `delta_theta_deg`.
///
/// A `CD` matrix is rotated in place. A `PC`/`CDELT` description is rewritten
/// as the equivalent `CD` matrix (dropping `PCi_j` and `CROTA2`) so that the
/// rotation applies to the sky, not to the unscaled matrix.
///
/// # Errors
///
/// [`FitError::Wcs`] when the header's linear keywords cannot be read.
pub fn apply_correction(header: &Header, correction: &WcsCorrection) -> Result<Header, FitError> {
    let params = LinearParams::from_header(header)?;
    let mut out = header.clone();

    out.insert("CRVAL1", params.crval[0] + correction.delta_ra_arcsec / ARCSEC_PER_DEG);
    out.insert("CRVAL2", params.crval[1] + correction.delta_dec_arcsec / ARCSEC_PER_DEG);

    if correction.delta_theta_deg == 0.0 {
        return Ok(out);
    }

    let rotated = linear::rotate(&params.matrix, correction.delta_theta_deg);
    if params.matrix_source != MatrixSource::Cd {
        for key in ["PC1_1", "PC1_2", "PC2_1", "PC2_2", "CROTA2"] {
            out.remove(key);
        }
    }
    out.insert("CD1_1", rotated[0][0]);
    out.insert("CD1_2", rotated[0][1]);
    out.insert("CD2_1", rotated[1][0]);
    out.insert("CD2_2", rotated[1][1]);
    Ok(out)
}
