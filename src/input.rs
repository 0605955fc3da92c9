//! Input model: tools, modifier keys, mouse buttons, and the gesture state machine.
//!
//! `Tool` and `Modifiers` capture the user's intent at the time of a pointer
//! event. `InputState` is the gesture being tracked between pointer-down and
//! pointer-up, carrying what the engine needs to apply incremental deltas and
//! to commit or discard the gesture on release.
//!
//! Drawing is the `Idle → Drawing → Idle` cycle: pointer-down enters it,
//! pointer-moves accumulate the extent (and vertices, for polygons), and
//! pointer-up or cancel leaves it.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use serde::{Deserialize, Serialize};

use crate::consts::DEFAULT_POINT_RADIUS;
use crate::object::{ObjectKind, PointMarker, Shape};
use crate::transform::Point;

/// Kinds of object that can be drawn interactively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DrawKind {
    Point,
    Line,
    Rectangle,
    Circle,
    Ellipse,
    /// Freehand outline; every pointer-move adds a vertex.
    Polygon,
}

impl DrawKind {
    #[must_use]
    pub fn object_kind(self) -> ObjectKind {
        match self {
            Self::Point => ObjectKind::Point,
            Self::Line => ObjectKind::Line,
            Self::Rectangle => ObjectKind::Rectangle,
            Self::Circle => ObjectKind::Circle,
            Self::Ellipse => ObjectKind::Ellipse,
            Self::Polygon => ObjectKind::Polygon,
        }
    }

    /// Build the shape for a gesture from `start` to `end`, both in stored
    /// coordinates. `vertices` is only used by polygons.
    #[must_use]
    pub fn build(self, start: Point, end: Point, vertices: &[Point]) -> Shape {
        match self {
            Self::Point => Shape::Point { x: end.x, y: end.y, radius: DEFAULT_POINT_RADIUS, marker: PointMarker::default() },
            Self::Line => Shape::Line { x1: start.x, y1: start.y, x2: end.x, y2: end.y },
            Self::Rectangle => Shape::Rectangle { x1: start.x, y1: start.y, x2: end.x, y2: end.y },
            Self::Circle => Shape::Circle { x: start.x, y: start.y, radius: start.distance(end) },
            Self::Ellipse => Shape::Ellipse {
                x: start.x,
                y: start.y,
                xradius: (end.x - start.x).abs(),
                yradius: (end.y - start.y).abs(),
                rotation: 0.0,
            },
            Self::Polygon => Shape::Polygon { points: vertices.to_vec() },
        }
    }
}

/// Which tool is currently active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tool {
    /// Move objects and drag the handles of objects being edited (default).
    #[default]
    Select,
    /// Drag to pan the view.
    Pan,
    /// Drag to draw a new object.
    Draw(DrawKind),
}

/// Keyboard/mouse modifier keys held during an event.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, Default)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

/// Mouse button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    /// Left mouse button (or single-finger tap).
    Primary,
    /// Middle mouse button; always pans.
    Middle,
    /// Right mouse button (or two-finger tap).
    Secondary,
}

/// A keyboard key name as reported by the host (e.g. `"Escape"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key(pub String);

impl Key {
    #[must_use]
    pub fn is_escape(&self) -> bool {
        self.0.eq_ignore_ascii_case("escape") || self.0.eq_ignore_ascii_case("esc")
    }
}

/// Gesture in progress.
///
/// Positions named `*_window` are window pixels; all others are in the
/// stored coordinates of the object involved.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum InputState {
    /// No gesture in progress; waiting for the next pointer-down.
    #[default]
    Idle,
    /// Dragging the view.
    Panning {
        /// Window position of the previous pointer event.
        last_window: Point,
    },
    /// Drawing a new object.
    Drawing {
        kind: DrawKind,
        /// Window position of the pointer-down.
        start_window: Point,
        /// Window position of the latest pointer event.
        current_window: Point,
        /// Window positions visited so far, starting with `start_window`.
        vertices_window: Vec<Point>,
    },
    /// Moving an existing object.
    DraggingObject {
        tag: String,
        /// Window position of the previous pointer event.
        last_window: Point,
        /// Whether the pointer has left its pointer-down position.
        moved: bool,
    },
    /// Moving one handle of an object being edited.
    DraggingControlPoint { tag: String, index: usize, last_window: Point, moved: bool },
}

impl InputState {
    #[must_use]
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    #[must_use]
    pub fn is_drawing(&self) -> bool {
        matches!(self, Self::Drawing { .. })
    }
}

/// Largest side of the window-space bounding box of `points`.
#[must_use]
pub fn window_extent(points: &[Point]) -> f64 {
    let Some(first) = points.first() else {
        return 0.0;
    };
    let (mut min, mut max) = (*first, *first);
    for p in points {
        min = Point::new(min.x.min(p.x), min.y.min(p.y));
        max = Point::new(max.x.max(p.x), max.y.max(p.y));
    }
    (max.x - min.x).max(max.y - min.y)
}
