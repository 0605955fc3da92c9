//! Shared numeric constants for the viewer core.

// ── Angles ──────────────────────────────────────────────────────

/// Arcseconds per degree.
pub const ARCSEC_PER_DEG: f64 = 3600.0;

/// Seconds of time per degree of right ascension (24h = 360°).
pub const TIME_SEC_PER_DEG: f64 = 240.0;

/// Mean obliquity of the ecliptic at J2000.0, in degrees (IAU 1976).
pub const OBLIQUITY_J2000_DEG: f64 = 23.439_291_1;

// ── Transform ───────────────────────────────────────────────────

/// Smallest scale factor `scale_by` will reach.
pub const MIN_SCALE: f64 = 1.0e-5;

/// Largest scale factor `scale_by` will reach.
pub const MAX_SCALE: f64 = 1.0e5;

// ── Hit-testing ─────────────────────────────────────────────────

/// Default window-space hit slop in pixels for handles and thin edges.
pub const HIT_SLOP_PX: f64 = 8.0;

/// Approximate glyph advance as a fraction of the font size.
pub const TEXT_ADVANCE_RATIO: f64 = 0.6;

// ── Drawing ─────────────────────────────────────────────────────

/// Drags shorter than this many window pixels do not create an object.
pub const MIN_DRAW_EXTENT_PX: f64 = 2.0;

/// Window-space radius of edit handles drawn on editing objects.
pub const HANDLE_RADIUS_PX: f64 = 4.0;

/// Default data-space radius of a newly drawn point.
pub const DEFAULT_POINT_RADIUS: f64 = 5.0;

// ── WCS fit ─────────────────────────────────────────────────────

/// Fewest reference points for which rotation is fitted.
pub const MIN_POINTS_FOR_ROTATION: usize = 3;

/// Objective value assigned to trial corrections that cannot be evaluated.
pub const FIT_PENALTY: f64 = 1.0e30;

// ── Redraw ──────────────────────────────────────────────────────

/// Default debounce delay between a redraw request and the repaint, in ms.
pub const DEFAULT_REDRAW_LAG_MS: u64 = 10;
