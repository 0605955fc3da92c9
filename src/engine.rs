//! Viewer core: one canvas, one transform, one redraw scheduler, the input
//! state machine, and an optional shared WCS context.
//!
//! DESIGN
//! ======
//! The host owns the window and the event loop. It forwards view changes and
//! pointer/key events here, and every handler returns the [`Action`]s it
//! produced. The same actions are also passed to each registered listener,
//! so hosts can either consume return values or subscribe once.
//!
//! Mutations never repaint directly. They request a redraw at the level they
//! invalidate (transform changes need [`RedrawLevel::Full`], object changes
//! only [`RedrawLevel::Overlay`]); the host calls [`ViewerCore::tick`] from
//! its loop and `RedrawNeeded` comes out once the debounce delay elapses.
//!
//! WCS corrections are copy-on-write: a corrected header produces a new
//! context and the previous `Arc` stays valid for other viewers.

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info};

use crate::canvas::{Canvas, CanvasError};
use crate::config::CoreConfig;
use crate::consts::MIN_DRAW_EXTENT_PX;
use crate::fit::{self, FitConfig, FitError, FitResult, WcsCorrection};
use crate::header::Header;
use crate::hit::{self, HitPart};
use crate::input::{Button, DrawKind, InputState, Key, Modifiers, Tool, window_extent};
use crate::object::{CanvasObject, Style};
use crate::redraw::{RedrawLevel, RedrawScheduler};
use crate::render::{self, Renderer};
use crate::transform::{Point, Transform, TransformError};
use crate::wcs::{CoordsConvention, WcsContext, WcsError, WcsFactory};

/// Events emitted to the host.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// An interactively drawn object was committed under `tag`.
    DrawEvent { tag: String },
    /// An object was moved or reshaped by dragging.
    EditEvent { tag: String },
    /// The debounce delay elapsed; repaint at this level.
    RedrawNeeded(RedrawLevel),
}

type Listener = Box<dyn FnMut(&Action)>;

pub struct ViewerCore {
    canvas: Canvas,
    transform: Transform,
    redraw: RedrawScheduler,
    input: InputState,
    tool: Tool,
    draw_style: Style,
    wcs: Option<Arc<WcsContext>>,
    factory: WcsFactory,
    fit_config: FitConfig,
    hit_slop: f64,
    listeners: Vec<Listener>,
}

impl Default for ViewerCore {
    fn default() -> Self {
        Self::new(&CoreConfig::default())
    }
}

impl ViewerCore {
    #[must_use]
    pub fn new(config: &CoreConfig) -> Self {
        Self {
            canvas: Canvas::new(),
            transform: Transform::default(),
            redraw: RedrawScheduler::new(config.redraw_lag()),
            input: InputState::default(),
            tool: Tool::default(),
            draw_style: Style::default(),
            wcs: None,
            factory: WcsFactory::new(config.wcs),
            fit_config: config.fit.clone(),
            hit_slop: config.hit_slop_px,
            listeners: Vec::new(),
        }
    }

    /// Register a callback that receives every emitted action.
    pub fn add_listener(&mut self, listener: impl FnMut(&Action) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    fn emit(&mut self, actions: Vec<Action>) -> Vec<Action> {
        for action in &actions {
            for listener in &mut self.listeners {
                listener(action);
            }
        }
        actions
    }

    // --- Queries ---

    #[must_use]
    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    /// Direct canvas access. Changes made here do not schedule a redraw.
    pub fn canvas_mut(&mut self) -> &mut Canvas {
        &mut self.canvas
    }

    #[must_use]
    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    #[must_use]
    pub fn input_state(&self) -> &InputState {
        &self.input
    }

    #[must_use]
    pub fn tool(&self) -> Tool {
        self.tool
    }

    #[must_use]
    pub fn wcs(&self) -> Option<&Arc<WcsContext>> {
        self.wcs.as_ref()
    }

    #[must_use]
    pub fn redraw_pending(&self) -> Option<RedrawLevel> {
        self.redraw.pending_level()
    }

    // --- WCS ---

    /// Build a WCS context for a newly displayed image.
    pub fn load_header(&mut self, header: &Header) -> Arc<WcsContext> {
        let context = self.factory.load_shared(header);
        info!(
            system = %context.system(),
            usable = context.is_usable(),
            backend = context.backend_name().unwrap_or("none"),
            "engine: header loaded"
        );
        self.wcs = Some(Arc::clone(&context));
        self.redraw.request(RedrawLevel::Full);
        context
    }

    /// Share a context already built for another viewer of the same image.
    pub fn set_wcs(&mut self, context: Arc<WcsContext>) {
        self.wcs = Some(context);
        self.redraw.request(RedrawLevel::Overlay);
    }

    fn current_wcs(&self) -> Result<&WcsContext, WcsError> {
        self.wcs.as_deref().ok_or(WcsError::NoUsableWcs)
    }

    /// Data pixel → sky, in the context's native frame.
    ///
    /// # Errors
    ///
    /// [`WcsError::NoUsableWcs`] without a usable context, or the conversion
    /// error.
    pub fn pixtoradec(&self, x: f64, y: f64) -> Result<(f64, f64), WcsError> {
        self.current_wcs()?.pixtoradec(&[x, y], CoordsConvention::Data)
    }

    /// Sky → data pixel.
    ///
    /// # Errors
    ///
    /// As [`Self::pixtoradec`].
    pub fn radectopix(&self, ra_deg: f64, dec_deg: f64) -> Result<(f64, f64), WcsError> {
        self.current_wcs()?.radectopix(ra_deg, dec_deg, CoordsConvention::Data, None)
    }

    /// Fit a shift/rotation correction to the current context.
    ///
    /// # Errors
    ///
    /// [`FitError`] for bad input or an unusable context.
    pub fn fit_wcs(&self, sky: &[(f64, f64)], pixels: &[(f64, f64)]) -> Result<FitResult, FitError> {
        let context = self.current_wcs()?;
        fit::fit_wcs(context, sky, pixels, CoordsConvention::Data, &self.fit_config)
    }

    /// Replace the context with one built from the corrected header.
    ///
    /// # Errors
    ///
    /// [`FitError`] without a context or when the header cannot be rewritten.
    pub fn apply_wcs_correction(&mut self, correction: &WcsCorrection) -> Result<Arc<WcsContext>, FitError> {
        let current = self.current_wcs()?;
        let header = fit::apply_correction(current.header(), correction)?;
        let corrected = Arc::new(current.with_header(&header));
        info!(?correction, "engine: wcs correction applied");
        self.wcs = Some(Arc::clone(&corrected));
        self.redraw.request(RedrawLevel::Overlay);
        Ok(corrected)
    }

    // --- View ---

    /// # Errors
    ///
    /// [`TransformError`] for non-finite coordinates.
    pub fn set_pan(&mut self, x: f64, y: f64) -> Result<(), TransformError> {
        self.transform.set_pan(Point::new(x, y))?;
        self.redraw.request(RedrawLevel::Full);
        Ok(())
    }

    /// # Errors
    ///
    /// [`TransformError`] unless both scales are finite and positive.
    pub fn set_scale(&mut self, scale_x: f64, scale_y: f64) -> Result<(), TransformError> {
        self.transform.set_scale(scale_x, scale_y)?;
        self.redraw.request(RedrawLevel::Full);
        Ok(())
    }

    /// # Errors
    ///
    /// [`TransformError`] for a non-finite angle.
    pub fn set_rotation(&mut self, degrees: f64) -> Result<(), TransformError> {
        self.transform.set_rotation(degrees)?;
        self.redraw.request(RedrawLevel::Full);
        Ok(())
    }

    pub fn set_flip(&mut self, flip_x: bool, flip_y: bool, swap_xy: bool) {
        self.transform.set_flip(flip_x, flip_y, swap_xy);
        self.redraw.request(RedrawLevel::Full);
    }

    /// # Errors
    ///
    /// [`TransformError`] for a negative or non-finite size.
    pub fn resize_window(&mut self, width: f64, height: f64) -> Result<(), TransformError> {
        self.transform.resize_window(width, height)?;
        self.redraw.request(RedrawLevel::Full);
        Ok(())
    }

    /// # Errors
    ///
    /// [`TransformError::EmptyExtent`] for an empty image or window.
    pub fn zoom_fit(&mut self, data_width: f64, data_height: f64) -> Result<(), TransformError> {
        self.transform.zoom_fit(data_width, data_height)?;
        self.redraw.request(RedrawLevel::Full);
        Ok(())
    }

    #[must_use]
    pub fn data_to_window(&self, p: Point) -> Point {
        self.transform.data_to_window(p)
    }

    #[must_use]
    pub fn window_to_data(&self, p: Point) -> Point {
        self.transform.window_to_data(p)
    }

    // --- Objects ---

    pub fn add_object(&mut self, object: CanvasObject, tag: Option<&str>) -> String {
        let tag = self.canvas.add(object, tag);
        self.redraw.request(RedrawLevel::Overlay);
        tag
    }

    /// # Errors
    ///
    /// [`CanvasError::NotFound`] if no object carries `tag`.
    pub fn delete_object_by_tag(&mut self, tag: &str) -> Result<CanvasObject, CanvasError> {
        let object = self.canvas.delete_object_by_tag(tag)?;
        if matches!(&self.input, InputState::DraggingObject { tag: t, .. } | InputState::DraggingControlPoint { tag: t, .. } if t == tag)
        {
            self.input = InputState::Idle;
        }
        self.redraw.request(RedrawLevel::Overlay);
        Ok(object)
    }

    /// Style given to objects committed by the draw tool.
    pub fn set_draw_style(&mut self, style: Style) {
        self.draw_style = style;
    }

    // --- Tool ---

    /// Switch tools. A gesture in progress is abandoned.
    pub fn set_tool(&mut self, tool: Tool) {
        if !self.input.is_idle() {
            self.cancel_gesture();
        }
        self.tool = tool;
    }

    /// Abort an in-progress drawing without adding an object. Returns
    /// whether a drawing was in progress.
    pub fn cancel_drawing(&mut self) -> bool {
        if !self.input.is_drawing() {
            return false;
        }
        self.cancel_gesture();
        true
    }

    fn cancel_gesture(&mut self) {
        debug!(state = ?self.input, "engine: gesture cancelled");
        self.input = InputState::Idle;
        self.redraw.request(RedrawLevel::Overlay);
    }

    // --- Input events ---

    pub fn pointer_down(&mut self, p: Point, button: Button, _modifiers: Modifiers) -> Vec<Action> {
        if !self.input.is_idle() {
            return Vec::new();
        }
        self.input = match (button, self.tool) {
            (Button::Middle, _) | (Button::Primary, Tool::Pan) => InputState::Panning { last_window: p },
            (Button::Primary, Tool::Draw(kind)) => {
                InputState::Drawing { kind, start_window: p, current_window: p, vertices_window: vec![p] }
            }
            (Button::Primary, Tool::Select) => match hit::hit_test(&self.canvas, &self.transform, p, self.hit_slop) {
                Some(hit) => match hit.part {
                    HitPart::ControlPoint(index) => {
                        InputState::DraggingControlPoint { tag: hit.tag, index, last_window: p, moved: false }
                    }
                    HitPart::Body => InputState::DraggingObject { tag: hit.tag, last_window: p, moved: false },
                },
                None => InputState::Panning { last_window: p },
            },
            (Button::Secondary, _) => InputState::Idle,
        };
        Vec::new()
    }

    pub fn pointer_move(&mut self, p: Point, _modifiers: Modifiers) -> Vec<Action> {
        match &mut self.input {
            InputState::Idle => {}
            InputState::Panning { last_window } => {
                let (dx, dy) = (p.x - last_window.x, p.y - last_window.y);
                *last_window = p;
                self.transform.pan_by_window_delta(dx, dy);
                self.redraw.request(RedrawLevel::Full);
            }
            InputState::Drawing { kind, current_window, vertices_window, .. } => {
                *current_window = p;
                if *kind == DrawKind::Polygon {
                    vertices_window.push(p);
                }
                self.redraw.request(RedrawLevel::Overlay);
            }
            InputState::DraggingObject { tag, last_window, moved } => {
                if p == *last_window {
                    return Vec::new();
                }
                let delta = Point::new(p.x - last_window.x, p.y - last_window.y);
                *last_window = p;
                *moved = true;
                if let Ok(object) = self.canvas.get_object_by_tag_mut(tag) {
                    let d = self.transform.vector_from_window(delta, object.use_canvas_coords);
                    object.move_delta(d.x, d.y);
                }
                self.redraw.request(RedrawLevel::Overlay);
            }
            InputState::DraggingControlPoint { tag, index, last_window, moved } => {
                if p == *last_window {
                    return Vec::new();
                }
                *last_window = p;
                *moved = true;
                if let Ok(object) = self.canvas.get_object_by_tag_mut(tag) {
                    let stored = self.transform.from_window(p, object.use_canvas_coords);
                    object.set_control_point(*index, stored);
                }
                self.redraw.request(RedrawLevel::Overlay);
            }
        }
        Vec::new()
    }

    pub fn pointer_up(&mut self, p: Point, _button: Button, modifiers: Modifiers) -> Vec<Action> {
        if !self.input.is_idle() {
            self.pointer_move(p, modifiers);
        }
        let actions = match std::mem::take(&mut self.input) {
            InputState::Drawing { kind, start_window, current_window, vertices_window } => {
                self.commit_drawing(kind, start_window, current_window, &vertices_window)
            }
            InputState::DraggingObject { tag, moved: true, .. } | InputState::DraggingControlPoint { tag, moved: true, .. }
                if self.canvas.has_tag(&tag) =>
            {
                vec![Action::EditEvent { tag }]
            }
            _ => Vec::new(),
        };
        self.emit(actions)
    }

    fn commit_drawing(&mut self, kind: DrawKind, start: Point, end: Point, vertices: &[Point]) -> Vec<Action> {
        let extent = if kind == DrawKind::Polygon { window_extent(vertices) } else { window_extent(&[start, end]) };
        let too_few_vertices = kind == DrawKind::Polygon && vertices.len() < 3;
        if kind != DrawKind::Point && (extent < MIN_DRAW_EXTENT_PX || too_few_vertices) {
            debug!(?kind, extent, "engine: drawing discarded");
            self.redraw.request(RedrawLevel::Overlay);
            return Vec::new();
        }

        let to_data = |w: Point| self.transform.window_to_data(w);
        let data_vertices: Vec<Point> = vertices.iter().copied().map(to_data).collect();
        let shape = kind.build(to_data(start), to_data(end), &data_vertices);
        let object = CanvasObject::new(shape).with_style(self.draw_style.clone());
        let tag = self.canvas.add(object, None);
        debug!(%tag, ?kind, "engine: drawing committed");
        self.redraw.request(RedrawLevel::Overlay);
        vec![Action::DrawEvent { tag }]
    }

    pub fn key_down(&mut self, key: &Key, _modifiers: Modifiers) -> Vec<Action> {
        if key.is_escape() {
            self.cancel_drawing();
        }
        Vec::new()
    }

    // --- Redraw ---

    /// Fire `RedrawNeeded` if the debounce delay has elapsed.
    pub fn tick(&mut self) -> Vec<Action> {
        self.tick_at(Instant::now())
    }

    pub fn tick_at(&mut self, now: Instant) -> Vec<Action> {
        let actions = match self.redraw.poll_at(now) {
            Some(level) => vec![Action::RedrawNeeded(level)],
            None => Vec::new(),
        };
        self.emit(actions)
    }

    /// When the host should call [`Self::tick`] next.
    #[must_use]
    pub fn next_redraw_deadline(&self) -> Option<Instant> {
        self.redraw.next_deadline()
    }

    // --- Render ---

    /// The object the draw tool would commit right now, for rubber-band
    /// feedback.
    #[must_use]
    pub fn drawing_preview(&self) -> Option<CanvasObject> {
        let InputState::Drawing { kind, start_window, current_window, vertices_window } = &self.input else {
            return None;
        };
        let to_data = |w: Point| self.transform.window_to_data(w);
        let data_vertices: Vec<Point> = vertices_window.iter().copied().map(to_data).collect();
        let shape = kind.build(to_data(*start_window), to_data(*current_window), &data_vertices);
        Some(CanvasObject::new(shape).with_style(self.draw_style.clone()))
    }

    /// Draw the canvas, then any drawing in progress.
    ///
    /// # Errors
    ///
    /// The first error returned by `renderer`.
    pub fn render<R: Renderer + ?Sized>(&self, renderer: &mut R) -> Result<(), R::Error> {
        render::draw_canvas(&self.canvas, &self.transform, renderer)?;
        if let Some(preview) = self.drawing_preview() {
            render::Drawable::draw(&preview, renderer, &self.transform)?;
        }
        Ok(())
    }
}
