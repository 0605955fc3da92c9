//! Window-space hit-testing over a canvas.
//!
//! Handles of objects being edited win over bodies, and within each pass the
//! topmost object wins. All distances are window pixels, so a slop of 8 px
//! feels the same at every zoom level.

#[cfg(test)]
#[path = "hit_test.rs"]
mod hit_test;

use crate::canvas::Canvas;
use crate::object::HitTest;
use crate::transform::{Point, Transform};

/// Which part of an object was hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitPart {
    Body,
    /// Index into the object's control points.
    ControlPoint(usize),
}

/// Result of a hit test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hit {
    pub tag: String,
    pub part: HitPart,
}

/// Find what lies under window point `p`.
///
/// Control points of editing objects are checked first (nearest handle of
/// the topmost editing object within `slop`), then bodies from top to bottom.
#[must_use]
pub fn hit_test(canvas: &Canvas, t: &Transform, p: Point, slop: f64) -> Option<Hit> {
    for (tag, object) in canvas.iter().rev().filter(|(_, o)| o.editing) {
        let nearest = object
            .control_points(t)
            .into_iter()
            .enumerate()
            .map(|(i, cp)| (i, cp.distance(p)))
            .filter(|(_, d)| *d <= slop)
            .min_by(|a, b| a.1.total_cmp(&b.1));
        if let Some((index, _)) = nearest {
            return Some(Hit { tag: tag.to_owned(), part: HitPart::ControlPoint(index) });
        }
    }

    canvas
        .iter()
        .rev()
        .find(|(_, o)| o.contains_point(p, t, slop))
        .map(|(tag, _)| Hit { tag: tag.to_owned(), part: HitPart::Body })
}

/// Tags of every object whose body contains `p`, topmost first.
#[must_use]
pub fn objects_at(canvas: &Canvas, t: &Transform, p: Point, slop: f64) -> Vec<String> {
    canvas.iter().rev().filter(|(_, o)| o.contains_point(p, t, slop)).map(|(tag, _)| tag.to_owned()).collect()
}

// =============================================================================
// GEOMETRY
// =============================================================================

/// Distance from `p` to the segment `a`–`b`.
#[must_use]
pub fn segment_distance(p: Point, a: Point, b: Point) -> f64 {
    let (dx, dy) = (b.x - a.x, b.y - a.y);
    let len_sq = dx * dx + dy * dy;
    if len_sq <= f64::EPSILON {
        return p.distance(a);
    }
    let u = (((p.x - a.x) * dx + (p.y - a.y) * dy) / len_sq).clamp(0.0, 1.0);
    p.distance(Point::new(a.x + u * dx, a.y + u * dy))
}

/// Distance from `p` to a polyline, closing it back to the first vertex when
/// `closed` is set. Infinite for an empty polyline.
#[must_use]
pub fn polyline_distance(p: Point, points: &[Point], closed: bool) -> f64 {
    match points {
        [] => f64::INFINITY,
        [only] => p.distance(*only),
        _ => {
            let open = points.windows(2).map(|w| segment_distance(p, w[0], w[1]));
            let closing = closed.then(|| segment_distance(p, points[points.len() - 1], points[0]));
            open.chain(closing).fold(f64::INFINITY, f64::min)
        }
    }
}

/// Even-odd point-in-polygon test.
#[must_use]
pub fn point_in_polygon(p: Point, polygon: &[Point]) -> bool {
    if polygon.len() < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = polygon.len() - 1;
    for (i, vi) in polygon.iter().enumerate() {
        let vj = polygon[j];
        if (vi.y > p.y) != (vj.y > p.y) && p.x < (vj.x - vi.x) * (p.y - vi.y) / (vj.y - vi.y) + vi.x {
            inside = !inside;
        }
        j = i;
    }
    inside
}
