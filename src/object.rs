//! Canvas objects: kinds, geometry, style, and the capability traits.
//!
//! DESIGN
//! ======
//! There is one object type, [`CanvasObject`], whose geometry lives in a
//! [`Shape`] variant. Behaviour that differs per kind is a `match` on the
//! shape inside a capability trait implemented once:
//!
//! - [`HitTest`] answers "is this window point on me" and "where are my
//!   handles", delegating every coordinate to the [`Transform`].
//! - [`Container`] exposes children of compound objects and nested canvases.
//! - `render::Drawable` turns the shape into renderer calls.
//!
//! Geometry is stored in data coordinates, or in canvas coordinates when
//! `use_canvas_coords` is set. Radii, extents and angles are in the same
//! units as the coordinates they belong to. Text size is in window pixels.

#[cfg(test)]
#[path = "object_test.rs"]
mod object_test;

use serde::{Deserialize, Serialize};

use crate::canvas::Canvas;
use crate::hit::{point_in_polygon, polyline_distance, segment_distance};
use crate::transform::{Point, Transform};

/// Vertex count used to approximate circles and ellipses in window space.
const ELLIPSE_SEGMENTS: usize = 72;

// =============================================================================
// KINDS AND STYLE
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectKind {
    Point,
    Line,
    Rectangle,
    Circle,
    Ellipse,
    Polygon,
    Text,
    Image,
    Compound,
    Canvas,
}

impl ObjectKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Point => "point",
            Self::Line => "line",
            Self::Rectangle => "rectangle",
            Self::Circle => "circle",
            Self::Ellipse => "ellipse",
            Self::Polygon => "polygon",
            Self::Text => "text",
            Self::Image => "image",
            Self::Compound => "compound",
            Self::Canvas => "canvas",
        }
    }
}

/// Marker glyph for point objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointMarker {
    #[default]
    Cross,
    Plus,
    Circle,
    Square,
    Diamond,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineStyle {
    #[default]
    Solid,
    Dash,
}

/// Visual attributes shared by every kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Style {
    /// Outline color name or `#rrggbb`.
    pub color: String,
    /// Whether closed shapes are filled.
    pub fill: bool,
    /// Fill color; the outline color when absent.
    pub fill_color: Option<String>,
    /// Outline opacity in `[0, 1]`.
    pub alpha: f64,
    /// Fill opacity in `[0, 1]`.
    pub fill_alpha: f64,
    /// Outline width in window pixels.
    pub line_width: f64,
    pub line_style: LineStyle,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            color: "yellow".to_owned(),
            fill: false,
            fill_color: None,
            alpha: 1.0,
            fill_alpha: 1.0,
            line_width: 1.0,
            line_style: LineStyle::Solid,
        }
    }
}

impl Style {
    #[must_use]
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    #[must_use]
    pub fn filled(mut self, fill: bool) -> Self {
        self.fill = fill;
        self
    }

    /// The color used for fills.
    #[must_use]
    pub fn effective_fill_color(&self) -> &str {
        self.fill_color.as_deref().unwrap_or(&self.color)
    }
}

// =============================================================================
// SHAPES
// =============================================================================

/// Kind-specific geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Shape {
    Point { x: f64, y: f64, radius: f64, #[serde(default)] marker: PointMarker },
    Line { x1: f64, y1: f64, x2: f64, y2: f64 },
    /// Axis-aligned in data space between two opposite corners.
    Rectangle { x1: f64, y1: f64, x2: f64, y2: f64 },
    Circle { x: f64, y: f64, radius: f64 },
    /// `rotation` is counter-clockwise degrees applied to the radii.
    Ellipse { x: f64, y: f64, xradius: f64, yradius: f64, #[serde(default)] rotation: f64 },
    Polygon { points: Vec<Point> },
    /// Anchored at the left end of the baseline.
    Text { x: f64, y: f64, text: String, font_size: f64 },
    /// Placement extent of a raster; pixels are the host's concern.
    Image { x: f64, y: f64, width: f64, height: f64 },
    Compound { children: Vec<CanvasObject> },
    Canvas(Canvas),
}

impl Shape {
    #[must_use]
    pub fn kind(&self) -> ObjectKind {
        match self {
            Self::Point { .. } => ObjectKind::Point,
            Self::Line { .. } => ObjectKind::Line,
            Self::Rectangle { .. } => ObjectKind::Rectangle,
            Self::Circle { .. } => ObjectKind::Circle,
            Self::Ellipse { .. } => ObjectKind::Ellipse,
            Self::Polygon { .. } => ObjectKind::Polygon,
            Self::Text { .. } => ObjectKind::Text,
            Self::Image { .. } => ObjectKind::Image,
            Self::Compound { .. } => ObjectKind::Compound,
            Self::Canvas(_) => ObjectKind::Canvas,
        }
    }
}

/// A drawable entity on a canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanvasObject {
    pub shape: Shape,
    #[serde(default)]
    pub style: Style,
    /// Whether edit handles are shown and hit-tested.
    #[serde(default)]
    pub editing: bool,
    /// Coordinates are canvas (window) coordinates, not data coordinates.
    #[serde(default)]
    pub use_canvas_coords: bool,
}

impl CanvasObject {
    #[must_use]
    pub fn new(shape: Shape) -> Self {
        Self { shape, style: Style::default(), editing: false, use_canvas_coords: false }
    }

    #[must_use]
    pub fn point(x: f64, y: f64, radius: f64) -> Self {
        Self::new(Shape::Point { x, y, radius, marker: PointMarker::default() })
    }

    #[must_use]
    pub fn line(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self::new(Shape::Line { x1, y1, x2, y2 })
    }

    #[must_use]
    pub fn rectangle(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self::new(Shape::Rectangle { x1, y1, x2, y2 })
    }

    #[must_use]
    pub fn circle(x: f64, y: f64, radius: f64) -> Self {
        Self::new(Shape::Circle { x, y, radius })
    }

    #[must_use]
    pub fn ellipse(x: f64, y: f64, xradius: f64, yradius: f64, rotation: f64) -> Self {
        Self::new(Shape::Ellipse { x, y, xradius, yradius, rotation })
    }

    #[must_use]
    pub fn polygon(points: Vec<Point>) -> Self {
        Self::new(Shape::Polygon { points })
    }

    #[must_use]
    pub fn text(x: f64, y: f64, text: impl Into<String>, font_size: f64) -> Self {
        Self::new(Shape::Text { x, y, text: text.into(), font_size })
    }

    #[must_use]
    pub fn image(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self::new(Shape::Image { x, y, width, height })
    }

    #[must_use]
    pub fn compound(children: Vec<CanvasObject>) -> Self {
        Self::new(Shape::Compound { children })
    }

    #[must_use]
    pub fn canvas(canvas: Canvas) -> Self {
        Self::new(Shape::Canvas(canvas))
    }

    #[must_use]
    pub fn with_style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    #[must_use]
    pub fn with_editing(mut self, editing: bool) -> Self {
        self.editing = editing;
        self
    }

    #[must_use]
    pub fn with_canvas_coords(mut self, use_canvas_coords: bool) -> Self {
        self.use_canvas_coords = use_canvas_coords;
        self
    }

    #[must_use]
    pub fn kind(&self) -> ObjectKind {
        self.shape.kind()
    }

    // =========================================================================
    // EDITING
    // =========================================================================

    /// Handle positions in stored coordinates.
    ///
    /// Circles and ellipses expose their centre followed by one handle per
    /// radius; images expose the placement corner and the opposite corner.
    /// Containers have no handles of their own.
    #[must_use]
    pub fn stored_control_points(&self) -> Vec<Point> {
        match &self.shape {
            Shape::Point { x, y, .. } | Shape::Text { x, y, .. } => vec![Point::new(*x, *y)],
            Shape::Line { x1, y1, x2, y2 } | Shape::Rectangle { x1, y1, x2, y2 } => {
                vec![Point::new(*x1, *y1), Point::new(*x2, *y2)]
            }
            Shape::Circle { x, y, radius } => vec![Point::new(*x, *y), Point::new(x + radius, *y)],
            Shape::Ellipse { x, y, xradius, yradius, rotation } => {
                let (sin, cos) = rotation.to_radians().sin_cos();
                vec![
                    Point::new(*x, *y),
                    Point::new(x + xradius * cos, y + xradius * sin),
                    Point::new(x - yradius * sin, y + yradius * cos),
                ]
            }
            Shape::Polygon { points } => points.clone(),
            Shape::Image { x, y, width, height } => vec![Point::new(*x, *y), Point::new(x + width, y + height)],
            Shape::Compound { .. } | Shape::Canvas(_) => Vec::new(),
        }
    }

    /// Move handle `index` to `p` (stored coordinates).
    ///
    /// Moving the centre handle of a circle or ellipse moves the whole shape;
    /// moving a radius handle resizes it. Returns `false` when the object has
    /// no such handle.
    pub fn set_control_point(&mut self, index: usize, p: Point) -> bool {
        match &mut self.shape {
            Shape::Point { x, y, .. } | Shape::Text { x, y, .. } if index == 0 => {
                *x = p.x;
                *y = p.y;
            }
            Shape::Line { x1, y1, x2, y2 } | Shape::Rectangle { x1, y1, x2, y2 } => match index {
                0 => (*x1, *y1) = (p.x, p.y),
                1 => (*x2, *y2) = (p.x, p.y),
                _ => return false,
            },
            Shape::Circle { x, y, radius } => match index {
                0 => (*x, *y) = (p.x, p.y),
                1 => *radius = Point::new(*x, *y).distance(p),
                _ => return false,
            },
            Shape::Ellipse { x, y, xradius, yradius, .. } => match index {
                0 => (*x, *y) = (p.x, p.y),
                1 => *xradius = Point::new(*x, *y).distance(p),
                2 => *yradius = Point::new(*x, *y).distance(p),
                _ => return false,
            },
            Shape::Polygon { points } => match points.get_mut(index) {
                Some(vertex) => *vertex = p,
                None => return false,
            },
            Shape::Image { x, y, width, height } => match index {
                0 => (*x, *y) = (p.x, p.y),
                1 => (*width, *height) = (p.x - *x, p.y - *y),
                _ => return false,
            },
            _ => return false,
        }
        true
    }

    /// Translate by `(dx, dy)` stored units, recursing into containers.
    pub fn move_delta(&mut self, dx: f64, dy: f64) {
        match &mut self.shape {
            Shape::Point { x, y, .. }
            | Shape::Circle { x, y, .. }
            | Shape::Ellipse { x, y, .. }
            | Shape::Text { x, y, .. }
            | Shape::Image { x, y, .. } => {
                *x += dx;
                *y += dy;
            }
            Shape::Line { x1, y1, x2, y2 } | Shape::Rectangle { x1, y1, x2, y2 } => {
                *x1 += dx;
                *y1 += dy;
                *x2 += dx;
                *y2 += dy;
            }
            Shape::Polygon { points } => {
                for p in points {
                    *p = p.offset(dx, dy);
                }
            }
            Shape::Compound { children } => {
                for child in children {
                    child.move_delta(dx, dy);
                }
            }
            Shape::Canvas(canvas) => {
                for (_, child) in canvas.iter_mut() {
                    child.move_delta(dx, dy);
                }
            }
        }
    }

    /// Append `self` and its descendants, depth-first, to `out` when they
    /// match `kind` (all of them when `kind` is `None`).
    pub fn flatten_into<'a>(&'a self, kind: Option<ObjectKind>, out: &mut Vec<&'a CanvasObject>) {
        if kind.is_none_or(|k| k == self.kind()) {
            out.push(self);
        }
        for child in self.children() {
            child.flatten_into(kind, out);
        }
    }

    // =========================================================================
    // WINDOW GEOMETRY
    // =========================================================================

    /// Map a stored point to window space.
    #[must_use]
    pub fn to_window(&self, t: &Transform, p: Point) -> Point {
        t.to_window(p, self.use_canvas_coords)
    }

    /// Map a stored-space displacement to window space.
    #[must_use]
    pub fn vector_to_window(&self, t: &Transform, v: Point) -> Point {
        if self.use_canvas_coords { v } else { t.vector_to_window(v) }
    }

    /// Window length of a stored-space radius along the x axis.
    #[must_use]
    pub fn radius_to_window(&self, t: &Transform, radius: f64) -> f64 {
        let v = self.vector_to_window(t, Point::new(radius, 0.0));
        v.x.hypot(v.y)
    }

    /// Closed window-space outline of an area shape, or `None` for kinds
    /// without an interior.
    #[must_use]
    pub fn window_outline(&self, t: &Transform) -> Option<Vec<Point>> {
        let stored = match &self.shape {
            Shape::Rectangle { x1, y1, x2, y2 } => vec![
                Point::new(*x1, *y1),
                Point::new(*x2, *y1),
                Point::new(*x2, *y2),
                Point::new(*x1, *y2),
            ],
            Shape::Image { x, y, width, height } => vec![
                Point::new(*x, *y),
                Point::new(x + width, *y),
                Point::new(x + width, y + height),
                Point::new(*x, y + height),
            ],
            Shape::Circle { x, y, radius } => ellipse_points(*x, *y, *radius, *radius, 0.0),
            Shape::Ellipse { x, y, xradius, yradius, rotation } => ellipse_points(*x, *y, *xradius, *yradius, *rotation),
            Shape::Polygon { points } => points.clone(),
            _ => return None,
        };
        Some(stored.into_iter().map(|p| self.to_window(t, p)).collect())
    }

    /// Estimated window-space box of a text object: `(top_left, width, height)`.
    #[must_use]
    pub fn text_box(&self, t: &Transform) -> Option<(Point, f64, f64)> {
        let Shape::Text { x, y, text, font_size } = &self.shape else {
            return None;
        };
        let anchor = self.to_window(t, Point::new(*x, *y));
        #[allow(clippy::cast_precision_loss)]
        let width = text.chars().count() as f64 * font_size * crate::consts::TEXT_ADVANCE_RATIO;
        Some((Point::new(anchor.x, anchor.y - font_size), width, *font_size))
    }
}

fn ellipse_points(cx: f64, cy: f64, rx: f64, ry: f64, rotation_deg: f64) -> Vec<Point> {
    let (sin_r, cos_r) = rotation_deg.to_radians().sin_cos();
    (0..ELLIPSE_SEGMENTS)
        .map(|i| {
            #[allow(clippy::cast_precision_loss)]
            let a = std::f64::consts::TAU * i as f64 / ELLIPSE_SEGMENTS as f64;
            let (u, v) = (rx * a.cos(), ry * a.sin());
            Point::new(cx + u * cos_r - v * sin_r, cy + u * sin_r + v * cos_r)
        })
        .collect()
}

// =============================================================================
// CAPABILITIES
// =============================================================================

/// Window-space hit-testing.
pub trait HitTest {
    /// Whether window point `p` lies on or within `slop` pixels of the body.
    fn contains_point(&self, p: Point, t: &Transform, slop: f64) -> bool;

    /// Edit handle positions in window space.
    fn control_points(&self, t: &Transform) -> Vec<Point>;
}

/// Objects that own child objects.
pub trait Container {
    /// Children in drawing order, bottom first.
    fn children(&self) -> Vec<&CanvasObject>;
}

impl Container for CanvasObject {
    fn children(&self) -> Vec<&CanvasObject> {
        match &self.shape {
            Shape::Compound { children } => children.iter().collect(),
            Shape::Canvas(canvas) => canvas.children(),
            _ => Vec::new(),
        }
    }
}

impl HitTest for CanvasObject {
    fn contains_point(&self, p: Point, t: &Transform, slop: f64) -> bool {
        match &self.shape {
            Shape::Point { x, y, radius, .. } => {
                let centre = self.to_window(t, Point::new(*x, *y));
                centre.distance(p) <= self.radius_to_window(t, *radius) + slop
            }
            Shape::Line { x1, y1, x2, y2 } => {
                let a = self.to_window(t, Point::new(*x1, *y1));
                let b = self.to_window(t, Point::new(*x2, *y2));
                segment_distance(p, a, b) <= slop
            }
            Shape::Text { .. } => self.text_box(t).is_some_and(|(top_left, w, h)| {
                p.x >= top_left.x - slop && p.x <= top_left.x + w + slop && p.y >= top_left.y - slop && p.y <= top_left.y + h + slop
            }),
            Shape::Compound { .. } | Shape::Canvas(_) => {
                self.children().iter().any(|child| child.contains_point(p, t, slop))
            }
            Shape::Rectangle { .. } | Shape::Circle { .. } | Shape::Ellipse { .. } | Shape::Polygon { .. } | Shape::Image { .. } => {
                self.window_outline(t).is_some_and(|outline| {
                    point_in_polygon(p, &outline) || polyline_distance(p, &outline, true) <= slop
                })
            }
        }
    }

    fn control_points(&self, t: &Transform) -> Vec<Point> {
        self.stored_control_points().into_iter().map(|p| self.to_window(t, p)).collect()
    }
}
