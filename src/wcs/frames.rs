//! Sky ⇄ sky conversion between celestial reference frames.
//!
//! Every frame is related to ICRS by a rotation matrix; a conversion rotates
//! into ICRS and back out into the target. FK5 at J2000 is taken as ICRS
//! (the 20 mas frame bias is ignored) and the FK4 E-terms of aberration are
//! not modelled.

#[cfg(test)]
#[path = "frames_test.rs"]
mod frames_test;

use nalgebra::Matrix3;

use super::{CoordSystem, WcsError};
use crate::angle::{precession_matrix, radec_to_unit, unit_to_radec};
use crate::consts::OBLIQUITY_J2000_DEG;

/// Rotation from FK4 (B1950) to FK5 (J2000) equatorial unit vectors.
#[rustfmt::skip]
const FK4_TO_FK5: [f64; 9] = [
    0.999_925_678_2, -0.011_182_061_1, -0.004_857_947_7,
    0.011_182_061_0,  0.999_937_478_4, -0.000_027_176_5,
    0.004_857_947_9, -0.000_027_147_4,  0.999_988_199_7,
];

/// Rotation from ICRS to galactic unit vectors (Hipparcos definition).
#[rustfmt::skip]
const ICRS_TO_GALACTIC: [f64; 9] = [
    -0.054_875_560_416_215_4, -0.873_437_090_234_885_0, -0.483_835_015_548_713_2,
     0.494_109_427_875_583_7, -0.444_829_629_960_011_2,  0.746_982_244_497_218_9,
    -0.867_666_149_019_004_7, -0.198_076_373_431_201_5,  0.455_983_776_175_066_9,
];

/// A reference frame plus the equinox it is referred to, where relevant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SkyFrame {
    pub system: CoordSystem,
    /// Julian (fk5) or Besselian (fk4) year; ignored by other systems.
    pub equinox: Option<f64>,
}

impl SkyFrame {
    /// Frame at the system's standard equinox.
    #[must_use]
    pub fn new(system: CoordSystem) -> Self {
        Self { system, equinox: system.default_equinox() }
    }

    #[must_use]
    pub fn with_equinox(system: CoordSystem, equinox: f64) -> Self {
        Self { system, equinox: Some(equinox) }
    }

    /// Rotation taking this frame's unit vectors to ICRS.
    fn to_icrs(self) -> Result<Matrix3<f64>, WcsError> {
        match self.system {
            CoordSystem::Icrs => Ok(Matrix3::identity()),
            CoordSystem::Fk5 => Ok(precession_matrix(self.equinox.unwrap_or(2000.0), 2000.0)),
            CoordSystem::Fk4 => {
                let to_b1950 = precession_matrix(self.equinox.unwrap_or(1950.0), 1950.0);
                Ok(Matrix3::from_row_slice(&FK4_TO_FK5) * to_b1950)
            }
            CoordSystem::Galactic => Ok(Matrix3::from_row_slice(&ICRS_TO_GALACTIC).transpose()),
            CoordSystem::Ecliptic => Ok(icrs_to_ecliptic().transpose()),
            CoordSystem::Raw => Err(WcsError::RawFrame(self.system)),
        }
    }
}

#[rustfmt::skip]
fn icrs_to_ecliptic() -> Matrix3<f64> {
    let (s, c) = OBLIQUITY_J2000_DEG.to_radians().sin_cos();
    Matrix3::new(
        1.0, 0.0, 0.0,
        0.0, c, s,
        0.0, -s, c,
    )
}

/// Rotation taking unit vectors in `from` to unit vectors in `to`.
///
/// # Errors
///
/// [`WcsError::RawFrame`] when one side is `raw` and the frames differ.
pub fn rotation(from: SkyFrame, to: SkyFrame) -> Result<Matrix3<f64>, WcsError> {
    if from == to {
        return Ok(Matrix3::identity());
    }
    if from.system == CoordSystem::Raw || to.system == CoordSystem::Raw {
        let other = if from.system == CoordSystem::Raw { to.system } else { from.system };
        return Err(WcsError::RawFrame(other));
    }
    Ok(to.to_icrs()?.transpose() * from.to_icrs()?)
}

/// Convert a position in degrees from one frame to another.
///
/// # Errors
///
/// [`WcsError::RawFrame`] when one side is `raw` and the frames differ.
pub fn convert(lon_deg: f64, lat_deg: f64, from: SkyFrame, to: SkyFrame) -> Result<(f64, f64), WcsError> {
    if from == to {
        return Ok((lon_deg, lat_deg));
    }
    let m = rotation(from, to)?;
    Ok(unit_to_radec(&(m * radec_to_unit(lon_deg, lat_deg))))
}
