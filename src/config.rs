//! Typed configuration for the viewer core.
//!
//! Values come from environment variables with defaults:
//!
//! - `GINGA_WCS_BACKEND`: `barebones` (default) or `zenithal`
//! - `GINGA_FK4_EQUINOX_CUTOFF`: year below which `EQUINOX` means `fk4`;
//!   unset keeps the plain rule (equinox alone means `fk5`)
//! - `GINGA_REDRAW_LAG_MS`: redraw debounce delay (default 10)
//! - `GINGA_FIT_MAX_ITER`: simplex iteration cap (default 2000)
//! - `GINGA_HIT_SLOP_PX`: hit-test tolerance in window pixels (default 8)
//!
//! An unknown backend name is an error. Malformed numbers fall back to the
//! default.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use std::env::VarError;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::consts::{DEFAULT_REDRAW_LAG_MS, HIT_SLOP_PX};
use crate::fit::FitConfig;
use crate::wcs::{BackendKind, WcsConfig};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} has an invalid value: {value:?}")]
    InvalidValue { var: &'static str, value: String },
    #[error("{0} is not valid unicode")]
    NotUnicode(&'static str),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoreConfig {
    pub wcs: WcsConfig,
    pub redraw_lag_ms: u64,
    pub fit: FitConfig,
    pub hit_slop_px: f64,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            wcs: WcsConfig::default(),
            redraw_lag_ms: DEFAULT_REDRAW_LAG_MS,
            fit: FitConfig::default(),
            hit_slop_px: HIT_SLOP_PX,
        }
    }
}

impl CoreConfig {
    /// Build a configuration from the process environment.
    ///
    /// # Errors
    ///
    /// [`ConfigError`] for an unknown backend or a non-unicode value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key))
    }

    /// Build a configuration reading variables through `lookup`.
    ///
    /// # Errors
    ///
    /// As [`Self::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Result<String, VarError>,
    {
        let defaults = Self::default();
        let read = |var: &'static str| -> Result<Option<String>, ConfigError> {
            match lookup(var) {
                Ok(value) => Ok(Some(value)),
                Err(VarError::NotPresent) => Ok(None),
                Err(VarError::NotUnicode(_)) => Err(ConfigError::NotUnicode(var)),
            }
        };

        let backend = match read("GINGA_WCS_BACKEND")? {
            Some(value) => match BackendKind::from_str(value.trim()) {
                Ok(kind) => kind,
                Err(_) => return Err(ConfigError::InvalidValue { var: "GINGA_WCS_BACKEND", value }),
            },
            None => defaults.wcs.backend,
        };
        let fk4_equinox_cutoff = match read("GINGA_FK4_EQUINOX_CUTOFF")?.map(|v| v.trim().parse::<f64>()) {
            Some(Ok(year)) if year.is_finite() => Some(year),
            _ => defaults.wcs.fk4_equinox_cutoff,
        };

        let config = Self {
            wcs: WcsConfig { backend, fk4_equinox_cutoff },
            redraw_lag_ms: parse_or(read("GINGA_REDRAW_LAG_MS")?.as_deref(), defaults.redraw_lag_ms),
            fit: FitConfig {
                max_iterations: parse_or(read("GINGA_FIT_MAX_ITER")?.as_deref(), defaults.fit.max_iterations),
                ..defaults.fit
            },
            hit_slop_px: Some(parse_or(read("GINGA_HIT_SLOP_PX")?.as_deref(), defaults.hit_slop_px))
                .filter(|s| s.is_finite() && *s >= 0.0)
                .unwrap_or(defaults.hit_slop_px),
        };
        debug!(?config, "config: loaded");
        Ok(config)
    }

    #[must_use]
    pub fn redraw_lag(&self) -> Duration {
        Duration::from_millis(self.redraw_lag_ms)
    }
}

/// Parse `value`, falling back to `default` when absent or malformed.
pub(crate) fn parse_or<T: FromStr>(value: Option<&str>, default: T) -> T {
    match value.map(|v| v.trim().parse::<T>()) {
        Some(Ok(parsed)) => parsed,
        _ => default,
    }
}
