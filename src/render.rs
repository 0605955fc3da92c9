//! Rendering: walks a canvas and hands window-space geometry to a renderer.
//!
//! The core never touches a drawing toolkit. Hosts implement [`Renderer`]
//! over whatever surface they have (Qt painter, Cairo, an HTML canvas) and
//! receive coordinates that are already in window pixels, together with the
//! object's [`Style`]. Nothing here mutates canvas or transform state.
//!
//! Renderer calls are fallible with the renderer's own error type; the first
//! failure stops the traversal and is returned to the caller.

#[cfg(test)]
#[path = "render_test.rs"]
mod render_test;

use crate::canvas::Canvas;
use crate::consts::HANDLE_RADIUS_PX;
use crate::object::{CanvasObject, Container, HitTest, PointMarker, Shape, Style};
use crate::transform::{Point, Transform};

/// Drawing primitives supplied by the host.
pub trait Renderer {
    type Error;

    fn draw_line(&mut self, a: Point, b: Point, style: &Style) -> Result<(), Self::Error>;

    /// Closed outline; filled when `style.fill` is set.
    fn draw_polygon(&mut self, points: &[Point], style: &Style) -> Result<(), Self::Error>;

    /// Ellipse through `centre + u·cos t + v·sin t`. `u` and `v` are
    /// conjugate semi-diameters, so rotation, flips and unequal scales
    /// are all already applied.
    fn draw_ellipse(&mut self, centre: Point, u: Point, v: Point, style: &Style) -> Result<(), Self::Error>;

    /// Text with `anchor` at the left end of the baseline.
    fn draw_text(&mut self, anchor: Point, text: &str, font_size: f64, style: &Style) -> Result<(), Self::Error>;

    fn draw_marker(&mut self, centre: Point, radius: f64, marker: PointMarker, style: &Style) -> Result<(), Self::Error>;

    /// Placement quad of an image, clockwise from the stored origin corner.
    /// Hosts that paint rasters override this.
    fn draw_image(&mut self, _corners: &[Point], _style: &Style) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// Something that can emit itself through a [`Renderer`].
pub trait Drawable {
    /// # Errors
    ///
    /// The first error returned by `renderer`.
    fn draw<R: Renderer + ?Sized>(&self, renderer: &mut R, t: &Transform) -> Result<(), R::Error>;
}

/// Draw every object bottom to top, then the edit handles of objects being
/// edited so handles are never hidden under other objects.
///
/// # Errors
///
/// The first error returned by `renderer`.
pub fn draw_canvas<R: Renderer + ?Sized>(canvas: &Canvas, t: &Transform, renderer: &mut R) -> Result<(), R::Error> {
    canvas.draw(renderer, t)?;
    for (_, object) in canvas.iter().filter(|(_, o)| o.editing) {
        draw_handles(object, renderer, t)?;
    }
    Ok(())
}

fn draw_handles<R: Renderer + ?Sized>(object: &CanvasObject, renderer: &mut R, t: &Transform) -> Result<(), R::Error> {
    for cp in object.control_points(t) {
        renderer.draw_marker(cp, HANDLE_RADIUS_PX, PointMarker::Square, &object.style)?;
    }
    Ok(())
}

impl Drawable for Canvas {
    fn draw<R: Renderer + ?Sized>(&self, renderer: &mut R, t: &Transform) -> Result<(), R::Error> {
        for child in self.children() {
            child.draw(renderer, t)?;
        }
        Ok(())
    }
}

impl Drawable for CanvasObject {
    fn draw<R: Renderer + ?Sized>(&self, renderer: &mut R, t: &Transform) -> Result<(), R::Error> {
        let style = &self.style;
        match &self.shape {
            Shape::Point { x, y, radius, marker } => {
                let centre = self.to_window(t, Point::new(*x, *y));
                renderer.draw_marker(centre, self.radius_to_window(t, *radius), *marker, style)
            }
            Shape::Line { x1, y1, x2, y2 } => {
                let a = self.to_window(t, Point::new(*x1, *y1));
                let b = self.to_window(t, Point::new(*x2, *y2));
                renderer.draw_line(a, b, style)
            }
            Shape::Circle { x, y, radius } => {
                let centre = self.to_window(t, Point::new(*x, *y));
                let u = self.vector_to_window(t, Point::new(*radius, 0.0));
                let v = self.vector_to_window(t, Point::new(0.0, *radius));
                renderer.draw_ellipse(centre, u, v, style)
            }
            Shape::Ellipse { x, y, xradius, yradius, rotation } => {
                let (sin, cos) = rotation.to_radians().sin_cos();
                let centre = self.to_window(t, Point::new(*x, *y));
                let u = self.vector_to_window(t, Point::new(xradius * cos, xradius * sin));
                let v = self.vector_to_window(t, Point::new(-yradius * sin, yradius * cos));
                renderer.draw_ellipse(centre, u, v, style)
            }
            Shape::Rectangle { .. } | Shape::Polygon { .. } => match self.window_outline(t) {
                Some(outline) => renderer.draw_polygon(&outline, style),
                None => Ok(()),
            },
            Shape::Image { .. } => match self.window_outline(t) {
                Some(corners) => renderer.draw_image(&corners, style),
                None => Ok(()),
            },
            Shape::Text { x, y, text, font_size } => {
                let anchor = self.to_window(t, Point::new(*x, *y));
                renderer.draw_text(anchor, text, *font_size, style)
            }
            Shape::Compound { children } => {
                for child in children {
                    child.draw(renderer, t)?;
                }
                Ok(())
            }
            Shape::Canvas(canvas) => canvas.draw(renderer, t),
        }
    }
}
