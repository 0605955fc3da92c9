//! World Coordinate System adapter.
//!
//! A [`WcsContext`] is built from a FITS [`Header`] by a [`WcsFactory`]. It
//! resolves the celestial reference frame from the axis types, normalises
//! unit strings, and constructs one of the projection backends selected by
//! [`WcsConfig`]. The adapter then offers pixel ⇄ sky conversion in either
//! pixel convention and sky ⇄ sky conversion into any supported frame.
//!
//! DESIGN
//! ======
//! Backends disagree on where pixel indices start: `barebones` works in the
//! 1-based FITS convention, `zenithal` in the 0-based one. Every backend
//! reports its origin through [`WcsBackend::pixel_origin`] and the adapter
//! shifts by `backend_origin - caller_origin` on the way in and the reverse
//! on the way out, so callers only ever reason about [`CoordsConvention`].
//!
//! Contexts are immutable. A header correction produces a new context via
//! [`WcsContext::with_header`]; viewers holding the old `Arc` keep a valid
//! view until they swap.
//!
//! ERROR HANDLING
//! ==============
//! Building a context never fails. A header without `CTYPE1` yields a `raw`
//! context without a backend; a backend that cannot be constructed is logged
//! at error level and also leaves the context unusable. The failure surfaces
//! as [`WcsError::NoUsableWcs`] on the first conversion attempt. Projection
//! failures during conversion are wrapped in [`WcsError::Conversion`].

#[cfg(test)]
#[path = "mod_test.rs"]
mod mod_test;

mod barebones;
pub mod frames;
pub mod linear;
mod zenithal;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, error};

pub use barebones::BarebonesBackend;
pub use frames::SkyFrame;
pub use linear::{LinearParams, MatrixSource};
pub use zenithal::{ZenithalBackend, ZenithalProjection};

use crate::header::Header;

// =============================================================================
// ERRORS
// =============================================================================

/// Failure inside a projection backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ProjectionError {
    #[error("position lies on the far side of the projection")]
    BehindPlane,
    #[error("pixel lies outside the projection boundary")]
    OutOfBounds,
    #[error("linear transform matrix is singular")]
    SingularMatrix,
}

#[derive(Debug, thiserror::Error)]
pub enum WcsError {
    #[error("No usable WCS")]
    NoUsableWcs,
    #[error("missing WCS keyword {0}")]
    MissingKeyword(String),
    #[error("unsupported projection '{0}'")]
    UnsupportedProjection(String),
    #[error("LONPOLE {0} is not supported by this backend")]
    UnsupportedLonpole(f64),
    #[error("WCS linear matrix is singular")]
    SingularMatrix,
    #[error("unknown coordinate system '{0}'")]
    UnknownSystem(String),
    #[error("unknown WCS backend '{0}'")]
    UnknownBackend(String),
    #[error("cannot convert between raw and {0} coordinates")]
    RawFrame(CoordSystem),
    #[error("expected at least 2 pixel axes, got {0}")]
    TooFewAxes(usize),
    #[error("coordinate conversion failed: {0}")]
    Conversion(#[from] ProjectionError),
}

// =============================================================================
// COORDINATE SYSTEMS
// =============================================================================

/// Celestial reference frame of a WCS or of a conversion target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoordSystem {
    Icrs,
    Fk5,
    Fk4,
    Galactic,
    Ecliptic,
    /// Frame could not be identified from the header.
    Raw,
}

impl CoordSystem {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Icrs => "icrs",
            Self::Fk5 => "fk5",
            Self::Fk4 => "fk4",
            Self::Galactic => "galactic",
            Self::Ecliptic => "ecliptic",
            Self::Raw => "raw",
        }
    }

    /// Equinox assumed when the header does not give one.
    #[must_use]
    pub fn default_equinox(self) -> Option<f64> {
        match self {
            Self::Fk5 => Some(2000.0),
            Self::Fk4 => Some(1950.0),
            Self::Icrs | Self::Galactic | Self::Ecliptic | Self::Raw => None,
        }
    }
}

impl fmt::Display for CoordSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CoordSystem {
    type Err = WcsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "icrs" => Ok(Self::Icrs),
            "fk5" | "j2000" => Ok(Self::Fk5),
            "fk4" | "fk4-no-e" | "b1950" => Ok(Self::Fk4),
            "galactic" | "gal" => Ok(Self::Galactic),
            "ecliptic" | "ecl" => Ok(Self::Ecliptic),
            "raw" => Ok(Self::Raw),
            other => Err(WcsError::UnknownSystem(other.to_string())),
        }
    }
}

/// Pixel indexing convention used by a caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoordsConvention {
    /// 0-based: the first pixel centre is at 0.
    #[default]
    Data,
    /// 1-based: the first pixel centre is at 1.
    Fits,
}

impl CoordsConvention {
    #[must_use]
    pub fn origin(self) -> f64 {
        match self {
            Self::Data => 0.0,
            Self::Fits => 1.0,
        }
    }
}

// =============================================================================
// BACKENDS
// =============================================================================

/// A projection engine mapping pixel vectors to world vectors.
///
/// Pixel vectors are in the backend's own origin (see `pixel_origin`) and
/// always have `naxis()` elements. World vectors carry degrees for the two
/// celestial axes followed by linear values for any extra axes.
pub trait WcsBackend: fmt::Debug + Send + Sync {
    fn name(&self) -> &'static str;

    /// Index of the first pixel in this backend's convention.
    fn pixel_origin(&self) -> f64;

    fn naxis(&self) -> usize;

    fn linear(&self) -> &LinearParams;

    /// # Errors
    ///
    /// Returns [`ProjectionError`] for pixels outside the projection domain.
    fn pix_to_world(&self, pix: &[f64]) -> Result<Vec<f64>, ProjectionError>;

    /// # Errors
    ///
    /// Returns [`ProjectionError`] for positions the projection cannot reach.
    fn world_to_pix(&self, world: &[f64]) -> Result<Vec<f64>, ProjectionError>;
}

/// Which backend a factory constructs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Self-contained gnomonic (TAN) math.
    #[default]
    Barebones,
    /// Full zenithal family with native spherical rotation.
    Zenithal,
}

impl BackendKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Barebones => "barebones",
            Self::Zenithal => "zenithal",
        }
    }

    /// Construct a backend of this kind from a header.
    ///
    /// # Errors
    ///
    /// Returns [`WcsError`] when the header lacks the keywords the backend
    /// needs or names a projection it does not implement.
    pub fn build(self, header: &Header) -> Result<Box<dyn WcsBackend>, WcsError> {
        let linear = LinearParams::from_header(header)?;
        Ok(match self {
            Self::Barebones => Box::new(BarebonesBackend::new(linear)?),
            Self::Zenithal => Box::new(ZenithalBackend::new(linear)?),
        })
    }
}

impl FromStr for BackendKind {
    type Err = WcsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "barebones" => Ok(Self::Barebones),
            "zenithal" => Ok(Self::Zenithal),
            other => Err(WcsError::UnknownBackend(other.to_string())),
        }
    }
}

/// Construction-time WCS settings.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct WcsConfig {
    pub backend: BackendKind,
    /// When set, an `EQUINOX` below this year resolves to `fk4` instead of
    /// `fk5`.
    pub fk4_equinox_cutoff: Option<f64>,
}

// =============================================================================
// FACTORY
// =============================================================================

/// Builds [`WcsContext`]s with a fixed configuration.
#[derive(Debug, Clone, Copy, Default)]
pub struct WcsFactory {
    config: WcsConfig,
}

impl WcsFactory {
    #[must_use]
    pub fn new(config: WcsConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &WcsConfig {
        &self.config
    }

    #[must_use]
    pub fn load_header(&self, header: &Header) -> WcsContext {
        WcsContext::load_header(header, &self.config)
    }

    /// Like [`Self::load_header`], wrapped for sharing between viewers.
    #[must_use]
    pub fn load_shared(&self, header: &Header) -> Arc<WcsContext> {
        Arc::new(self.load_header(header))
    }
}

// =============================================================================
// CONTEXT
// =============================================================================

/// An ingested header plus the projection built from it.
#[derive(Debug)]
pub struct WcsContext {
    header: Header,
    system: CoordSystem,
    equinox: Option<f64>,
    backend: Option<Box<dyn WcsBackend>>,
    config: WcsConfig,
}

impl WcsContext {
    /// Ingest a header. Never fails; check [`Self::is_usable`].
    #[must_use]
    pub fn load_header(header: &Header, config: &WcsConfig) -> Self {
        let header = fix_units(header);
        let system = resolve_system(&header, config.fk4_equinox_cutoff);
        let equinox = resolve_equinox(&header, system);

        let backend = if header.contains("CTYPE1") {
            match config.backend.build(&header) {
                Ok(backend) => Some(backend),
                Err(e) => {
                    error!(error = %e, backend = config.backend.as_str(), "wcs: backend construction failed");
                    None
                }
            }
        } else {
            None
        };

        debug!(
            %system,
            equinox,
            backend = backend.as_ref().map(|b| b.name()),
            "wcs: header loaded"
        );

        Self { header, system, equinox, backend, config: *config }
    }

    /// Build the successor context for a corrected header, keeping this
    /// context's configuration.
    #[must_use]
    pub fn with_header(&self, header: &Header) -> Self {
        Self::load_header(header, &self.config)
    }

    #[must_use]
    pub fn is_usable(&self) -> bool {
        self.backend.is_some()
    }

    #[must_use]
    pub fn system(&self) -> CoordSystem {
        self.system
    }

    #[must_use]
    pub fn equinox(&self) -> Option<f64> {
        self.equinox
    }

    #[must_use]
    pub fn sky_frame(&self) -> SkyFrame {
        SkyFrame { system: self.system, equinox: self.equinox }
    }

    #[must_use]
    pub fn backend_name(&self) -> Option<&'static str> {
        self.backend.as_ref().map(|b| b.name())
    }

    /// The header as ingested, after unit fix-ups.
    #[must_use]
    pub fn header(&self) -> &Header {
        &self.header
    }

    #[must_use]
    pub fn config(&self) -> &WcsConfig {
        &self.config
    }

    /// Mean pixel scale in degrees, if usable.
    #[must_use]
    pub fn pixel_scale_deg(&self) -> Option<f64> {
        self.backend.as_ref().map(|b| b.linear().pixel_scale_deg())
    }

    fn backend(&self) -> Result<&dyn WcsBackend, WcsError> {
        self.backend.as_deref().ok_or(WcsError::NoUsableWcs)
    }

    /// Pixel → native sky coordinates in degrees.
    ///
    /// Axes beyond those supplied are zero in the caller's convention.
    ///
    /// # Errors
    ///
    /// [`WcsError::NoUsableWcs`] if the context is unusable,
    /// [`WcsError::TooFewAxes`] for fewer than two coordinates, or
    /// [`WcsError::Conversion`] when the projection rejects the pixel.
    pub fn pixtoradec(&self, pixel: &[f64], convention: CoordsConvention) -> Result<(f64, f64), WcsError> {
        let backend = self.backend()?;
        if pixel.len() < 2 {
            return Err(WcsError::TooFewAxes(pixel.len()));
        }

        let shift = backend.pixel_origin() - convention.origin();
        let mut pix: Vec<f64> = pixel.iter().take(backend.naxis()).map(|p| p + shift).collect();
        pix.resize(backend.naxis(), shift);

        let world = backend.pix_to_world(&pix)?;
        Ok((world[0], world[1]))
    }

    /// Native sky coordinates in degrees → pixel.
    ///
    /// `extra_axes` gives world values for axes beyond the first two; missing
    /// ones are zero.
    ///
    /// # Errors
    ///
    /// [`WcsError::NoUsableWcs`] if the context is unusable, or
    /// [`WcsError::Conversion`] when the position cannot be projected.
    pub fn radectopix(
        &self,
        ra_deg: f64,
        dec_deg: f64,
        convention: CoordsConvention,
        extra_axes: Option<&[f64]>,
    ) -> Result<(f64, f64), WcsError> {
        let backend = self.backend()?;

        let mut world = vec![0.0; backend.naxis()];
        world[0] = ra_deg;
        world[1] = dec_deg;
        if let Some(extra) = extra_axes {
            for (slot, value) in world.iter_mut().skip(2).zip(extra) {
                *slot = *value;
            }
        }

        let pix = backend.world_to_pix(&world)?;
        let shift = convention.origin() - backend.pixel_origin();
        Ok((pix[0] + shift, pix[1] + shift))
    }

    /// Pixel → sky coordinates in `target`.
    ///
    /// # Errors
    ///
    /// As [`Self::pixtoradec`], plus [`WcsError::RawFrame`] when the native
    /// frame is `raw` and `target` is not.
    pub fn pixtosystem(
        &self,
        pixel: &[f64],
        target: CoordSystem,
        convention: CoordsConvention,
    ) -> Result<(f64, f64), WcsError> {
        let (lon, lat) = self.pixtoradec(pixel, convention)?;
        frames::convert(lon, lat, self.sky_frame(), SkyFrame::new(target))
    }

    /// Native sky coordinates → sky coordinates in `target`.
    ///
    /// # Errors
    ///
    /// [`WcsError::RawFrame`] when exactly one side is `raw`.
    pub fn native_to_system(&self, lon_deg: f64, lat_deg: f64, target: CoordSystem) -> Result<(f64, f64), WcsError> {
        frames::convert(lon_deg, lat_deg, self.sky_frame(), SkyFrame::new(target))
    }
}

// =============================================================================
// HEADER RESOLUTION
// =============================================================================

/// Celestial frame implied by a header.
///
/// `GLON-*` is galactic, `ELON-*` ecliptic. For `RA--*` the frame comes from
/// `RADESYS`, then `RADECSYS`, then `EQUINOX`/`EPOCH` (fk5, or fk4 below
/// `fk4_cutoff` when one is given), and is `icrs` if none is present.
#[must_use]
pub fn resolve_system(header: &Header, fk4_cutoff: Option<f64>) -> CoordSystem {
    let Some(ctype) = header.get_str("CTYPE1") else {
        return CoordSystem::Raw;
    };
    let ctype = ctype.to_ascii_uppercase();

    if ctype.starts_with("GLON") {
        return CoordSystem::Galactic;
    }
    if ctype.starts_with("ELON") {
        return CoordSystem::Ecliptic;
    }
    if !ctype.starts_with("RA-") {
        return CoordSystem::Raw;
    }

    for key in ["RADESYS", "RADECSYS"] {
        if let Some(name) = header.get_str(key) {
            match name.parse::<CoordSystem>() {
                Ok(system) if system != CoordSystem::Raw => return system,
                _ => debug!(key, value = name, "wcs: unrecognised reference system keyword"),
            }
        }
    }

    let equinox = header.get_f64("EQUINOX").or_else(|| header.get_f64("EPOCH"));
    match (equinox, fk4_cutoff) {
        (Some(eq), Some(cutoff)) if eq < cutoff => CoordSystem::Fk4,
        (Some(_), _) => CoordSystem::Fk5,
        (None, _) => CoordSystem::Icrs,
    }
}

fn resolve_equinox(header: &Header, system: CoordSystem) -> Option<f64> {
    match system {
        CoordSystem::Fk4 | CoordSystem::Fk5 => header
            .get_f64("EQUINOX")
            .or_else(|| header.get_f64("EPOCH"))
            .or_else(|| system.default_equinox()),
        _ => None,
    }
}

/// Copy of `header` with nonstandard degree units on `CUNITn` rewritten to
/// `deg`.
#[must_use]
pub fn fix_units(header: &Header) -> Header {
    let mut fixed = header.clone();
    for (key, value) in header.iter() {
        if !key.starts_with("CUNIT") {
            continue;
        }
        let Some(unit) = value.as_str() else { continue };
        if unit != "deg" && matches!(unit.to_ascii_uppercase().as_str(), "DEG" | "DEGREE" | "DEGREES") {
            debug!(key, from = unit, "wcs: normalised unit to 'deg'");
            fixed.insert(key, "deg");
        }
    }
    fixed
}
