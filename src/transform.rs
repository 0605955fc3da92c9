//! Data ⇄ window coordinate transform.
//!
//! `data_to_window` composes, in order: translate by `-pan`, rotate
//! counter-clockwise by `rotation`, scale by `(scale_x, scale_y)`, reflect X
//! and/or Y, swap X↔Y, translate to the window centre. `window_to_data`
//! undoes the same steps in reverse.
//!
//! A third space, canvas coordinates, is window space measured from a
//! movable origin. Objects flagged `use_canvas_coords` are placed there and
//! skip the data pipeline, so they stay fixed to the viewport while the
//! image pans and zooms underneath.

#[cfg(test)]
#[path = "transform_test.rs"]
mod transform_test;

use serde::{Deserialize, Serialize};

use crate::consts::{MAX_SCALE, MIN_SCALE};

#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum TransformError {
    #[error("scale factors must be finite and positive, got ({0}, {1})")]
    InvalidScale(f64, f64),
    #[error("window size must be finite and non-negative, got {0}x{1}")]
    InvalidWindow(f64, f64),
    #[error("{0} must be finite")]
    NonFinite(&'static str),
    #[error("cannot fit an empty extent into the window")]
    EmptyExtent,
}

/// A point in data, window or canvas space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[must_use]
    pub fn offset(self, dx: f64, dy: f64) -> Self {
        Self { x: self.x + dx, y: self.y + dy }
    }

    #[must_use]
    pub fn distance(self, other: Self) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Per-viewer view state.
///
/// Scales are always positive and rotation is kept in `[0, 360)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pan: Point,
    scale_x: f64,
    scale_y: f64,
    rotation_deg: f64,
    flip_x: bool,
    flip_y: bool,
    swap_xy: bool,
    window_width: f64,
    window_height: f64,
    canvas_origin: Point,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            pan: Point::default(),
            scale_x: 1.0,
            scale_y: 1.0,
            rotation_deg: 0.0,
            flip_x: false,
            flip_y: false,
            swap_xy: false,
            window_width: 0.0,
            window_height: 0.0,
            canvas_origin: Point::default(),
        }
    }
}

impl Transform {
    /// Identity view of a `width × height` window.
    ///
    /// # Errors
    ///
    /// [`TransformError::InvalidWindow`] for negative or non-finite sizes.
    pub fn new(width: f64, height: f64) -> Result<Self, TransformError> {
        let mut t = Self::default();
        t.resize_window(width, height)?;
        Ok(t)
    }

    // =========================================================================
    // STATE
    // =========================================================================

    #[must_use]
    pub fn pan(&self) -> Point {
        self.pan
    }

    #[must_use]
    pub fn scale(&self) -> (f64, f64) {
        (self.scale_x, self.scale_y)
    }

    #[must_use]
    pub fn rotation(&self) -> f64 {
        self.rotation_deg
    }

    /// `(flip_x, flip_y, swap_xy)`.
    #[must_use]
    pub fn flip(&self) -> (bool, bool, bool) {
        (self.flip_x, self.flip_y, self.swap_xy)
    }

    #[must_use]
    pub fn window_size(&self) -> (f64, f64) {
        (self.window_width, self.window_height)
    }

    #[must_use]
    pub fn window_center(&self) -> Point {
        Point::new(self.window_width / 2.0, self.window_height / 2.0)
    }

    #[must_use]
    pub fn canvas_origin(&self) -> Point {
        self.canvas_origin
    }

    /// # Errors
    ///
    /// [`TransformError::NonFinite`] for NaN or infinite coordinates.
    pub fn set_pan(&mut self, pan: Point) -> Result<(), TransformError> {
        if !pan.is_finite() {
            return Err(TransformError::NonFinite("pan"));
        }
        self.pan = pan;
        Ok(())
    }

    /// # Errors
    ///
    /// [`TransformError::InvalidScale`] unless both factors are finite and
    /// positive.
    pub fn set_scale(&mut self, scale_x: f64, scale_y: f64) -> Result<(), TransformError> {
        let valid = |s: f64| s.is_finite() && s > 0.0;
        if !valid(scale_x) || !valid(scale_y) {
            return Err(TransformError::InvalidScale(scale_x, scale_y));
        }
        self.scale_x = scale_x;
        self.scale_y = scale_y;
        Ok(())
    }

    /// Multiply both scales by `factor`, clamping each into
    /// `[MIN_SCALE, MAX_SCALE]`.
    ///
    /// # Errors
    ///
    /// [`TransformError::InvalidScale`] unless `factor` is finite and positive.
    pub fn scale_by(&mut self, factor: f64) -> Result<(), TransformError> {
        if !factor.is_finite() || factor <= 0.0 {
            return Err(TransformError::InvalidScale(factor, factor));
        }
        self.scale_x = (self.scale_x * factor).clamp(MIN_SCALE, MAX_SCALE);
        self.scale_y = (self.scale_y * factor).clamp(MIN_SCALE, MAX_SCALE);
        Ok(())
    }

    /// Set the rotation, normalised into `[0, 360)`.
    ///
    /// # Errors
    ///
    /// [`TransformError::NonFinite`] for NaN or infinite angles.
    pub fn set_rotation(&mut self, degrees: f64) -> Result<(), TransformError> {
        if !degrees.is_finite() {
            return Err(TransformError::NonFinite("rotation"));
        }
        let normalized = degrees.rem_euclid(360.0);
        self.rotation_deg = if normalized >= 360.0 { 0.0 } else { normalized };
        Ok(())
    }

    pub fn set_flip(&mut self, flip_x: bool, flip_y: bool, swap_xy: bool) {
        self.flip_x = flip_x;
        self.flip_y = flip_y;
        self.swap_xy = swap_xy;
    }

    /// # Errors
    ///
    /// [`TransformError::InvalidWindow`] for negative or non-finite sizes.
    pub fn resize_window(&mut self, width: f64, height: f64) -> Result<(), TransformError> {
        let valid = |v: f64| v.is_finite() && v >= 0.0;
        if !valid(width) || !valid(height) {
            return Err(TransformError::InvalidWindow(width, height));
        }
        self.window_width = width;
        self.window_height = height;
        Ok(())
    }

    /// # Errors
    ///
    /// [`TransformError::NonFinite`] for NaN or infinite coordinates.
    pub fn set_canvas_origin(&mut self, origin: Point) -> Result<(), TransformError> {
        if !origin.is_finite() {
            return Err(TransformError::NonFinite("canvas origin"));
        }
        self.canvas_origin = origin;
        Ok(())
    }

    // =========================================================================
    // CONVERSIONS
    // =========================================================================

    #[must_use]
    pub fn data_to_window(&self, data: Point) -> Point {
        let v = self.vector_to_window(Point::new(data.x - self.pan.x, data.y - self.pan.y));
        let c = self.window_center();
        Point::new(v.x + c.x, v.y + c.y)
    }

    #[must_use]
    pub fn window_to_data(&self, window: Point) -> Point {
        let c = self.window_center();
        let v = self.vector_to_data(Point::new(window.x - c.x, window.y - c.y));
        Point::new(v.x + self.pan.x, v.y + self.pan.y)
    }

    /// Map a data-space displacement (rotation, scale, flips; no
    /// translation).
    #[must_use]
    pub fn vector_to_window(&self, v: Point) -> Point {
        let (sin, cos) = self.rotation_deg.to_radians().sin_cos();
        let mut x = (v.x * cos - v.y * sin) * self.scale_x;
        let mut y = (v.x * sin + v.y * cos) * self.scale_y;
        if self.flip_x {
            x = -x;
        }
        if self.flip_y {
            y = -y;
        }
        if self.swap_xy {
            std::mem::swap(&mut x, &mut y);
        }
        Point::new(x, y)
    }

    /// Inverse of [`Self::vector_to_window`].
    #[must_use]
    pub fn vector_to_data(&self, v: Point) -> Point {
        let (mut x, mut y) = (v.x, v.y);
        if self.swap_xy {
            std::mem::swap(&mut x, &mut y);
        }
        if self.flip_y {
            y = -y;
        }
        if self.flip_x {
            x = -x;
        }
        x /= self.scale_x;
        y /= self.scale_y;
        let (sin, cos) = self.rotation_deg.to_radians().sin_cos();
        Point::new(x * cos + y * sin, -x * sin + y * cos)
    }

    #[must_use]
    pub fn canvas_to_window(&self, p: Point) -> Point {
        Point::new(p.x + self.canvas_origin.x, p.y + self.canvas_origin.y)
    }

    #[must_use]
    pub fn window_to_canvas(&self, p: Point) -> Point {
        Point::new(p.x - self.canvas_origin.x, p.y - self.canvas_origin.y)
    }

    /// Place an object's stored point in window space.
    #[must_use]
    pub fn to_window(&self, p: Point, use_canvas_coords: bool) -> Point {
        if use_canvas_coords { self.canvas_to_window(p) } else { self.data_to_window(p) }
    }

    /// Inverse of [`Self::to_window`].
    #[must_use]
    pub fn from_window(&self, p: Point, use_canvas_coords: bool) -> Point {
        if use_canvas_coords { self.window_to_canvas(p) } else { self.window_to_data(p) }
    }

    /// Inverse of the displacement part of [`Self::to_window`].
    #[must_use]
    pub fn vector_from_window(&self, v: Point, use_canvas_coords: bool) -> Point {
        if use_canvas_coords { v } else { self.vector_to_data(v) }
    }

    // =========================================================================
    // VIEW OPERATIONS
    // =========================================================================

    /// Shift the view so content follows a pointer drag of `(dx, dy)` window
    /// pixels.
    pub fn pan_by_window_delta(&mut self, dx: f64, dy: f64) {
        let d = self.vector_to_data(Point::new(dx, dy));
        self.pan = Point::new(self.pan.x - d.x, self.pan.y - d.y);
    }

    /// Centre a `width × height` data extent and choose the largest uniform
    /// scale that shows all of it under the current rotation.
    ///
    /// # Errors
    ///
    /// [`TransformError::EmptyExtent`] when the extent or the window is empty.
    pub fn zoom_fit(&mut self, data_width: f64, data_height: f64) -> Result<(), TransformError> {
        let positive = |v: f64| v.is_finite() && v > 0.0;
        if !positive(data_width) || !positive(data_height) || !positive(self.window_width) || !positive(self.window_height) {
            return Err(TransformError::EmptyExtent);
        }

        let (sin, cos) = self.rotation_deg.to_radians().sin_cos();
        let mut extent_w = (data_width * cos).abs() + (data_height * sin).abs();
        let mut extent_h = (data_width * sin).abs() + (data_height * cos).abs();
        if self.swap_xy {
            std::mem::swap(&mut extent_w, &mut extent_h);
        }

        let scale = (self.window_width / extent_w).min(self.window_height / extent_h).clamp(MIN_SCALE, MAX_SCALE);
        self.pan = Point::new(data_width / 2.0, data_height / 2.0);
        self.scale_x = scale;
        self.scale_y = scale;
        Ok(())
    }

    /// Data coordinates of the window corners, clockwise from `(0, 0)`.
    #[must_use]
    pub fn visible_data_corners(&self) -> [Point; 4] {
        let (w, h) = (self.window_width, self.window_height);
        [
            self.window_to_data(Point::new(0.0, 0.0)),
            self.window_to_data(Point::new(w, 0.0)),
            self.window_to_data(Point::new(w, h)),
            self.window_to_data(Point::new(0.0, h)),
        ]
    }
}
