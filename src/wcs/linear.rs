//! Linear part of a FITS WCS: reference pixel, reference value, and the 2×2
//! matrix mapping pixel offsets to intermediate world coordinates (degrees).
//!
//! Matrix precedence follows the FITS papers:
//! 1. `CDi_j` if any of the four keys is present (missing ones are 0),
//! 2. else `PCi_j` (missing ones are identity) scaled by `CDELTi`,
//! 3. else `CDELTi` with an optional `CROTA2` rotation.
//!
//! Axes beyond the first two are treated as independent linear axes.

#[cfg(test)]
#[path = "linear_test.rs"]
mod linear_test;

use tracing::warn;

use super::{ProjectionError, WcsError};
use crate::header::Header;

/// Where the celestial matrix came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatrixSource {
    Cd,
    Pc,
    Cdelt,
}

/// 2×2 matrix stored row-major.
pub type Matrix2 = [[f64; 2]; 2];

/// Parsed linear WCS keywords.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearParams {
    /// Number of world axes (at least 2).
    pub naxis: usize,
    /// `CTYPEi`, uppercased and trimmed; empty when absent.
    pub ctype: Vec<String>,
    /// `CRPIXi` in the 1-based FITS pixel convention.
    pub crpix: Vec<f64>,
    pub crval: Vec<f64>,
    /// `CDELTi` for the linear extra axes (celestial axes use `matrix`).
    pub cdelt: Vec<f64>,
    /// Degrees of intermediate world coordinate per pixel.
    pub matrix: Matrix2,
    pub matrix_source: MatrixSource,
    /// Projection code from `CTYPE1`, e.g. `TAN`.
    pub projection: String,
    /// `LONPOLE` in degrees, if present.
    pub lonpole: Option<f64>,
}

impl LinearParams {
    /// Parse the linear keywords from a header.
    ///
    /// # Errors
    ///
    /// Returns [`WcsError::MissingKeyword`] when a reference keyword or every
    /// scale keyword is absent, [`WcsError::UnsupportedProjection`] when
    /// `CTYPE1` carries no projection code, and [`WcsError::SingularMatrix`]
    /// when the matrix cannot be inverted.
    pub fn from_header(header: &Header) -> Result<Self, WcsError> {
        let naxis = axis_count(header);

        let ctype: Vec<String> = (1..=naxis)
            .map(|i| {
                header
                    .get_str(&format!("CTYPE{i}"))
                    .unwrap_or("")
                    .to_ascii_uppercase()
            })
            .collect();

        let mut crpix = Vec::with_capacity(naxis);
        let mut crval = Vec::with_capacity(naxis);
        let mut cdelt = Vec::with_capacity(naxis);
        for i in 1..=naxis {
            let (pix_key, val_key) = (format!("CRPIX{i}"), format!("CRVAL{i}"));
            if i <= 2 {
                crpix.push(header.get_f64(&pix_key).ok_or(WcsError::MissingKeyword(pix_key))?);
                crval.push(header.get_f64(&val_key).ok_or(WcsError::MissingKeyword(val_key))?);
            } else {
                crpix.push(header.get_f64(&pix_key).unwrap_or(0.0));
                crval.push(header.get_f64(&val_key).unwrap_or(0.0));
            }
            cdelt.push(header.get_f64(&format!("CDELT{i}")).unwrap_or(1.0));
        }

        let (matrix_source, raw) = read_matrix(header);
        let matrix = match matrix_source {
            MatrixSource::Cd => raw,
            MatrixSource::Pc => {
                let (d1, d2) = (cdelt[0], cdelt[1]);
                [[d1 * raw[0][0], d1 * raw[0][1]], [d2 * raw[1][0], d2 * raw[1][1]]]
            }
            MatrixSource::Cdelt => {
                if !header.contains("CDELT1") || !header.contains("CDELT2") {
                    return Err(WcsError::MissingKeyword("CDELT1/CDELT2 or CDi_j".into()));
                }
                let rho = header.get_f64("CROTA2").unwrap_or(0.0).to_radians();
                let (sin_rho, cos_rho) = rho.sin_cos();
                let (d1, d2) = (cdelt[0], cdelt[1]);
                [[d1 * cos_rho, -d2 * sin_rho], [d1 * sin_rho, d2 * cos_rho]]
            }
        };
        if determinant(&matrix).abs() < 1e-300 {
            return Err(WcsError::SingularMatrix);
        }

        let projection = projection_code(&ctype[0])?;

        Ok(Self {
            naxis,
            ctype,
            crpix,
            crval,
            cdelt,
            matrix,
            matrix_source,
            projection,
            lonpole: header.get_f64("LONPOLE"),
        })
    }

    /// Pixel → intermediate world coordinates (degrees) for the two celestial
    /// axes. `origin` is the pixel index of the first pixel in the caller's
    /// convention (1 for FITS, 0 for zero-based).
    #[must_use]
    pub fn pixel_to_intermediate(&self, px: f64, py: f64, origin: f64) -> (f64, f64) {
        let u = px - (self.crpix[0] - 1.0 + origin);
        let v = py - (self.crpix[1] - 1.0 + origin);
        let m = &self.matrix;
        (m[0][0] * u + m[0][1] * v, m[1][0] * u + m[1][1] * v)
    }

    /// Inverse of [`Self::pixel_to_intermediate`].
    ///
    /// # Errors
    ///
    /// Returns [`ProjectionError::SingularMatrix`] if the matrix has no inverse.
    pub fn intermediate_to_pixel(&self, x: f64, y: f64, origin: f64) -> Result<(f64, f64), ProjectionError> {
        let inv = invert(&self.matrix).ok_or(ProjectionError::SingularMatrix)?;
        let u = inv[0][0] * x + inv[0][1] * y;
        let v = inv[1][0] * x + inv[1][1] * y;
        Ok((u + self.crpix[0] - 1.0 + origin, v + self.crpix[1] - 1.0 + origin))
    }

    /// World value of linear axis `axis` (0-based, ≥ 2) at pixel `p`.
    #[must_use]
    pub fn extra_pix_to_world(&self, axis: usize, p: f64, origin: f64) -> f64 {
        self.crval[axis] + self.cdelt[axis] * (p - (self.crpix[axis] - 1.0 + origin))
    }

    /// Pixel of linear axis `axis` (0-based, ≥ 2) at world value `w`.
    #[must_use]
    pub fn extra_world_to_pix(&self, axis: usize, w: f64, origin: f64) -> f64 {
        let cdelt = if self.cdelt[axis] == 0.0 { 1.0 } else { self.cdelt[axis] };
        (w - self.crval[axis]) / cdelt + self.crpix[axis] - 1.0 + origin
    }

    /// Mean pixel scale in degrees per pixel.
    #[must_use]
    pub fn pixel_scale_deg(&self) -> f64 {
        determinant(&self.matrix).abs().sqrt()
    }
}

/// Read the raw celestial matrix and report its source. For `Pc` the result
/// is the unscaled PC matrix; for `Cdelt` it is the identity.
#[must_use]
pub fn read_matrix(header: &Header) -> (MatrixSource, Matrix2) {
    let keys = |prefix: &str| -> [Option<f64>; 4] {
        [
            header.get_f64(&format!("{prefix}1_1")),
            header.get_f64(&format!("{prefix}1_2")),
            header.get_f64(&format!("{prefix}2_1")),
            header.get_f64(&format!("{prefix}2_2")),
        ]
    };

    let cd = keys("CD");
    if cd.iter().any(Option::is_some) {
        let [a, b, c, d] = cd.map(|v| v.unwrap_or(0.0));
        return (MatrixSource::Cd, [[a, b], [c, d]]);
    }

    let pc = keys("PC");
    if pc.iter().any(Option::is_some) {
        let [a, b, c, d] = pc;
        return (
            MatrixSource::Pc,
            [[a.unwrap_or(1.0), b.unwrap_or(0.0)], [c.unwrap_or(0.0), d.unwrap_or(1.0)]],
        );
    }

    (MatrixSource::Cdelt, [[1.0, 0.0], [0.0, 1.0]])
}

#[must_use]
pub fn determinant(m: &Matrix2) -> f64 {
    m[0][0] * m[1][1] - m[0][1] * m[1][0]
}

/// Invert a 2×2 matrix. Returns `None` if singular.
#[must_use]
pub fn invert(m: &Matrix2) -> Option<Matrix2> {
    let det = determinant(m);
    if det.abs() < 1e-300 {
        return None;
    }
    let inv_det = 1.0 / det;
    Some([
        [m[1][1] * inv_det, -m[0][1] * inv_det],
        [-m[1][0] * inv_det, m[0][0] * inv_det],
    ])
}

/// Left-multiply `m` by a counter-clockwise rotation of `theta_deg`.
#[must_use]
pub fn rotate(m: &Matrix2, theta_deg: f64) -> Matrix2 {
    let (s, c) = theta_deg.to_radians().sin_cos();
    [
        [c * m[0][0] - s * m[1][0], c * m[0][1] - s * m[1][1]],
        [s * m[0][0] + c * m[1][0], s * m[0][1] + c * m[1][1]],
    ]
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn axis_count(header: &Header) -> usize {
    let declared = ["WCSAXES", "NAXIS"]
        .iter()
        .filter_map(|k| header.get_f64(k))
        .fold(0.0_f64, f64::max);
    let mut naxis = if declared.is_finite() && declared > 0.0 { declared as usize } else { 0 };
    while header.contains(&format!("CTYPE{}", naxis + 1)) {
        naxis += 1;
    }
    naxis.max(2)
}

/// Projection code from an axis type such as `RA---TAN` or `GLON-SIN-SIP`.
fn projection_code(ctype: &str) -> Result<String, WcsError> {
    let mut parts = ctype.split('-').filter(|p| !p.is_empty());
    let axis = parts.next().unwrap_or("");
    let Some(code) = parts.next() else {
        return Err(WcsError::UnsupportedProjection(ctype.to_string()));
    };
    if let Some(suffix) = parts.next() {
        warn!(ctype, suffix, "wcs: distortion suffix ignored, using the undistorted projection");
    }
    if axis.is_empty() {
        return Err(WcsError::UnsupportedProjection(ctype.to_string()));
    }
    Ok(code.to_string())
}
