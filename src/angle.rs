//! Angle codec: sexagesimal strings and tuples ⇄ decimal degrees.
//!
//! Right ascension is expressed in hours/minutes/seconds of time (24h = 360°),
//! declination and other latitudes in signed degrees/arcminutes/arcseconds.
//! Every tuple decomposition works on an integer count of the smallest unit
//! and splits it with division and remainder, so a value that rounds up to
//! a full minute carries into the minute field instead of printing `60`.
//!
//! The module also hosts the IAU 1976 precession matrix and the small set of
//! spherical helpers that the WCS layer shares.

#[cfg(test)]
#[path = "angle_test.rs"]
mod angle_test;

use nalgebra::{Matrix3, Vector3};

use crate::consts::{ARCSEC_PER_DEG, TIME_SEC_PER_DEG};

/// Resolution used by tuple decompositions: one microsecond of time or
/// one micro-arcsecond.
const MICRO: f64 = 1.0e6;
const MICRO_UNITS: i64 = 1_000_000;

/// Highest number of decimal places honoured by [`SexagesimalFormat`].
const MAX_PRECISION: usize = 9;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AngleError {
    #[error("latitude out of range: {0} (must be within ±90°)")]
    Range(f64),
    #[error("cannot parse angle from '{0}'")]
    Parse(String),
}

/// Layout of a sexagesimal string produced by [`ra_deg_to_string`] and
/// [`dec_deg_to_string`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SexagesimalFormat {
    /// Character placed between fields.
    pub separator: char,
    /// Decimal places of the seconds field.
    pub precision: usize,
}

impl SexagesimalFormat {
    /// `HH:MM:SS.sss`
    pub const RA: Self = Self { separator: ':', precision: 3 };
    /// `±DD:MM:SS.ss`
    pub const DEC: Self = Self { separator: ':', precision: 2 };
}

// =============================================================================
// TUPLES → DEGREES
// =============================================================================

/// Convert hours, minutes and seconds of time to degrees.
#[must_use]
pub fn hms_to_deg(hour: f64, minute: f64, second: f64) -> f64 {
    hour * 15.0 + minute * 0.25 + second / TIME_SEC_PER_DEG
}

/// Convert a signed degrees/arcminutes/arcseconds triple to degrees.
///
/// Only the sign of `sign` matters; zero counts as positive.
#[must_use]
pub fn dms_to_deg(sign: i32, degree: f64, minute: f64, second: f64) -> f64 {
    let sign = if sign < 0 { -1.0 } else { 1.0 };
    sign * (degree + minute / 60.0 + second / ARCSEC_PER_DEG)
}

// =============================================================================
// STRINGS → DEGREES
// =============================================================================

/// Parse `HH:MM:SS.sss` (colon or whitespace separated, 1–3 fields) to degrees.
///
/// # Errors
///
/// Returns [`AngleError::Parse`] if a field is not a number or the field count
/// is outside 1–3.
pub fn hms_str_to_deg(text: &str) -> Result<f64, AngleError> {
    let fields = split_fields(text.trim(), text)?;
    Ok(hms_to_deg(fields[0], field_or_zero(&fields, 1), field_or_zero(&fields, 2)))
}

/// Parse `±DD:MM:SS.ss` to degrees. The sign character, if any, leads the
/// first field, so `-00:30:00` is half a degree south.
///
/// # Errors
///
/// Returns [`AngleError::Parse`] for malformed input.
pub fn dms_str_to_deg(text: &str) -> Result<f64, AngleError> {
    let trimmed = text.trim();
    let (sign, rest) = if let Some(rest) = trimmed.strip_prefix('-') {
        (-1, rest)
    } else if let Some(rest) = trimmed.strip_prefix('+') {
        (1, rest)
    } else {
        (1, trimmed)
    };

    let fields = split_fields(rest, text)?;
    if fields.iter().any(|v| *v < 0.0) {
        return Err(AngleError::Parse(text.to_string()));
    }
    Ok(dms_to_deg(sign, fields[0], field_or_zero(&fields, 1), field_or_zero(&fields, 2)))
}

/// Parse a right ascension given either as decimal degrees or as a
/// sexagesimal hour string.
///
/// # Errors
///
/// Returns [`AngleError::Parse`] when neither form parses.
pub fn parse_ra(text: &str) -> Result<f64, AngleError> {
    let trimmed = text.trim();
    if is_sexagesimal(trimmed) {
        hms_str_to_deg(trimmed)
    } else {
        trimmed
            .parse::<f64>()
            .map_err(|_| AngleError::Parse(text.to_string()))
    }
}

/// Parse a declination given either as decimal degrees or as a sexagesimal
/// degree string.
///
/// # Errors
///
/// Returns [`AngleError::Parse`] when neither form parses, or
/// [`AngleError::Range`] when the value lies outside ±90°.
pub fn parse_dec(text: &str) -> Result<f64, AngleError> {
    let trimmed = text.trim();
    let value = if is_sexagesimal(trimmed) {
        dms_str_to_deg(trimmed)?
    } else {
        trimmed
            .parse::<f64>()
            .map_err(|_| AngleError::Parse(text.to_string()))?
    };
    if value.abs() > 90.0 {
        return Err(AngleError::Range(value));
    }
    Ok(value)
}

fn is_sexagesimal(text: &str) -> bool {
    text.contains(':') || text.contains(char::is_whitespace)
}

fn split_fields(body: &str, original: &str) -> Result<Vec<f64>, AngleError> {
    let fields = body
        .split(|c: char| c == ':' || c.is_whitespace())
        .filter(|f| !f.is_empty())
        .map(|f| f.parse::<f64>().map_err(|_| AngleError::Parse(original.to_string())))
        .collect::<Result<Vec<_>, _>>()?;

    if fields.is_empty() || fields.len() > 3 {
        return Err(AngleError::Parse(original.to_string()));
    }
    Ok(fields)
}

fn field_or_zero(fields: &[f64], index: usize) -> f64 {
    fields.get(index).copied().unwrap_or(0.0)
}

// =============================================================================
// DEGREES → TUPLES
// =============================================================================

/// Split a right ascension in degrees into `(hour, minute, second)`.
///
/// The value is not wrapped; use [`ra_deg_to_string`] for display.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
pub fn deg_to_hms(ra_deg: f64) -> (i32, i32, f64) {
    let total = (ra_deg * TIME_SEC_PER_DEG * MICRO).round() as i64;
    let (hour, minute, micros) = split_micro(total);
    (hour as i32, minute as i32, micros as f64 / MICRO)
}

/// Split a signed angle in degrees into `(sign, degree, minute, second)`.
///
/// # Errors
///
/// Returns [`AngleError::Range`] if `is_latitude` and `|dec_deg| > 90`.
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
pub fn deg_to_dms(dec_deg: f64, is_latitude: bool) -> Result<(i32, i32, i32, f64), AngleError> {
    if is_latitude && (dec_deg.is_nan() || dec_deg.abs() > 90.0) {
        return Err(AngleError::Range(dec_deg));
    }
    let sign = if dec_deg < 0.0 { -1 } else { 1 };
    let total = (dec_deg.abs() * ARCSEC_PER_DEG * MICRO).round() as i64;
    let (degree, minute, micros) = split_micro(total);
    Ok((sign, degree as i32, minute as i32, micros as f64 / MICRO))
}

/// Divmod a micro-unit count into `(major, minute, micro-seconds)`.
fn split_micro(total: i64) -> (i64, i64, i64) {
    let per_minute = 60 * MICRO_UNITS;
    let per_major = 60 * per_minute;
    let major = total.div_euclid(per_major);
    let rem = total.rem_euclid(per_major);
    (major, rem / per_minute, rem % per_minute)
}

// =============================================================================
// DEGREES → STRINGS
// =============================================================================

/// Format a right ascension as `HH:MM:SS.sss`, wrapping into `[0, 360)` first.
#[must_use]
pub fn ra_deg_to_string(ra_deg: f64, format: SexagesimalFormat) -> String {
    let ra = ra_deg.rem_euclid(360.0);
    let (mut hour, minute, second, frac) = rounded_fields(ra * TIME_SEC_PER_DEG, format.precision);
    if hour >= 24 {
        hour -= 24;
    }
    join_fields("", hour, minute, second, frac, format)
}

/// Format a declination as `±DD:MM:SS.ss`.
///
/// # Errors
///
/// Returns [`AngleError::Range`] for `|dec_deg| > 90`.
pub fn dec_deg_to_string(dec_deg: f64, format: SexagesimalFormat) -> Result<String, AngleError> {
    if dec_deg.is_nan() || dec_deg.abs() > 90.0 {
        return Err(AngleError::Range(dec_deg));
    }
    let sign = if dec_deg < 0.0 { "-" } else { "+" };
    let (degree, minute, second, frac) = rounded_fields(dec_deg.abs() * ARCSEC_PER_DEG, format.precision);
    Ok(join_fields(sign, degree, minute, second, frac, format))
}

/// Round `total_seconds` at `precision` decimals, then divmod into
/// `(major, minute, whole seconds, fractional digits)`.
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn rounded_fields(total_seconds: f64, precision: usize) -> (i64, i64, i64, i64) {
    let precision = precision.min(MAX_PRECISION);
    let scale = 10_i64.pow(precision as u32);
    let units = (total_seconds * scale as f64).round() as i64;
    let per_minute = 60 * scale;
    let per_major = 60 * per_minute;

    let major = units / per_major;
    let rem = units % per_major;
    let minute = rem / per_minute;
    let rem = rem % per_minute;
    (major, minute, rem / scale, rem % scale)
}

fn join_fields(sign: &str, major: i64, minute: i64, second: i64, frac: i64, format: SexagesimalFormat) -> String {
    let sep = format.separator;
    let precision = format.precision.min(MAX_PRECISION);
    if precision == 0 {
        format!("{sign}{major:02}{sep}{minute:02}{sep}{second:02}")
    } else {
        format!("{sign}{major:02}{sep}{minute:02}{sep}{second:02}.{frac:0precision$}")
    }
}

// =============================================================================
// SPHERICAL HELPERS
// =============================================================================

/// Unit vector for a (lon, lat) pair in degrees.
#[must_use]
pub fn radec_to_unit(ra_deg: f64, dec_deg: f64) -> Vector3<f64> {
    let (sin_ra, cos_ra) = ra_deg.to_radians().sin_cos();
    let (sin_dec, cos_dec) = dec_deg.to_radians().sin_cos();
    Vector3::new(cos_dec * cos_ra, cos_dec * sin_ra, sin_dec)
}

/// (lon, lat) in degrees for a unit vector; lon is wrapped into `[0, 360)`.
///
/// The longitude quadrant follows the signs of the x and y components.
#[must_use]
pub fn unit_to_radec(v: &Vector3<f64>) -> (f64, f64) {
    let norm = v.norm();
    let z = if norm > 0.0 { v.z / norm } else { 0.0 };
    let dec = z.clamp(-1.0, 1.0).asin().to_degrees();
    let ra = v.y.atan2(v.x).to_degrees().rem_euclid(360.0);
    (ra, dec)
}

/// Great-circle distance between two positions, all in degrees.
#[must_use]
pub fn angular_separation(ra1_deg: f64, dec1_deg: f64, ra2_deg: f64, dec2_deg: f64) -> f64 {
    let (dec1, dec2) = (dec1_deg.to_radians(), dec2_deg.to_radians());
    let half_ddec = (dec2 - dec1) / 2.0;
    let half_dra = (ra2_deg - ra1_deg).to_radians() / 2.0;
    let a = half_ddec.sin().powi(2) + dec1.cos() * dec2.cos() * half_dra.sin().powi(2);
    (2.0 * a.sqrt().min(1.0).asin()).to_degrees()
}

/// Offset a sky position by tangent-plane displacements, all in degrees.
///
/// `delta_ra_deg` runs east along the local parallel and `delta_dec_deg`
/// north; the displacement is taken on the gnomonic plane at the start point.
#[must_use]
pub fn add_offset_radec(ra_deg: f64, dec_deg: f64, delta_ra_deg: f64, delta_dec_deg: f64) -> (f64, f64) {
    let xi = delta_ra_deg.to_radians().tan();
    let eta = delta_dec_deg.to_radians().tan();
    let (sin_dec0, cos_dec0) = dec_deg.to_radians().sin_cos();

    let denom = cos_dec0 - eta * sin_dec0;
    let ra = ra_deg + xi.atan2(denom).to_degrees();
    let dec = (sin_dec0 + eta * cos_dec0).atan2(xi.hypot(denom)).to_degrees();
    (ra.rem_euclid(360.0), dec)
}

// =============================================================================
// PRECESSION
// =============================================================================

/// IAU 1976 precession matrix rotating mean-equator vectors of
/// `from_equinox` to `to_equinox` (Julian years).
///
/// Angles ζ, z and θ follow Lieske et al. (1977), parameterized by Julian
/// centuries from J2000 to the starting epoch and by the interval.
#[must_use]
pub fn precession_matrix(from_equinox: f64, to_equinox: f64) -> Matrix3<f64> {
    let big_t = (from_equinox - 2000.0) / 100.0;
    let t = (to_equinox - from_equinox) / 100.0;

    let w = 2306.2181 + (1.39656 - 0.000_139 * big_t) * big_t;
    let zeta = (w + ((0.30188 - 0.000_344 * big_t) + 0.017_998 * t) * t) * t;
    let z = (w + ((1.09468 + 0.000_066 * big_t) + 0.018_203 * t) * t) * t;
    let theta = ((2004.3109 + (-0.85330 - 0.000_217 * big_t) * big_t)
        + ((-0.42665 - 0.000_217 * big_t) - 0.041_833 * t) * t)
        * t;

    let (sin_zeta, cos_zeta) = (zeta / ARCSEC_PER_DEG).to_radians().sin_cos();
    let (sin_z, cos_z) = (z / ARCSEC_PER_DEG).to_radians().sin_cos();
    let (sin_theta, cos_theta) = (theta / ARCSEC_PER_DEG).to_radians().sin_cos();

    Matrix3::new(
        cos_zeta * cos_theta * cos_z - sin_zeta * sin_z,
        -sin_zeta * cos_theta * cos_z - cos_zeta * sin_z,
        -sin_theta * cos_z,
        cos_zeta * cos_theta * sin_z + sin_zeta * cos_z,
        -sin_zeta * cos_theta * sin_z + cos_zeta * cos_z,
        -sin_theta * sin_z,
        cos_zeta * sin_theta,
        -sin_zeta * sin_theta,
        cos_theta,
    )
}

/// Precess an equatorial position from `equinox` to J2000.0.
#[must_use]
pub fn eq_to_eq2000(ra_deg: f64, dec_deg: f64, equinox: f64) -> (f64, f64) {
    let rotated = precession_matrix(equinox, 2000.0) * radec_to_unit(ra_deg, dec_deg);
    unit_to_radec(&rotated)
}
