//! Toolkit-independent core of an astronomical image viewer.
//!
//! This crate owns the parts of the viewer that carry real math and no
//! windowing toolkit: sexagesimal/degree conversion and precession, the
//! World Coordinate System (WCS) adapter over pluggable projection backends,
//! a simplex-based WCS correction fit, the pan/zoom/rotate/flip coordinate
//! transform between data and window space, and a scene graph of drawable
//! canvas objects with hit-testing and an interactive drawing state machine.
//!
//! The host GUI feeds pointer events and FITS header metadata in, and gets
//! back sky coordinates, window coordinates, and [`engine::Action`]s. It
//! supplies a [`render::Renderer`] to turn transformed geometry into pixels.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`angle`] | Sexagesimal codec, angular helpers, IAU 1976 precession |
//! | [`header`] | Ordered FITS header keyword store |
//! | [`wcs`] | WCS context, frame resolution, projection backends, sky frames |
//! | [`simplex`] | Nelder–Mead minimizer |
//! | [`fit`] | WCS shift/rotation correction fit |
//! | [`transform`] | Data ↔ window coordinate transform |
//! | [`redraw`] | Debounced redraw scheduling |
//! | [`object`] | Canvas object kinds, geometry, and capability traits |
//! | [`canvas`] | Tagged, ordered object container |
//! | [`hit`] | Window-space hit-testing |
//! | [`input`] | Input event types and the gesture state machine |
//! | [`render`] | Renderer interface and scene traversal |
//! | [`engine`] | Viewer core wiring all of the above together |
//! | [`config`] | Typed configuration loaded from the environment |
//! | [`consts`] | Shared numeric constants |

pub mod angle;
pub mod canvas;
pub mod config;
pub mod consts;
pub mod engine;
pub mod fit;
pub mod header;
pub mod hit;
pub mod input;
pub mod object;
pub mod redraw;
pub mod render;
pub mod simplex;
pub mod transform;
pub mod wcs;

pub use canvas::{Canvas, CanvasError};
pub use config::CoreConfig;
pub use engine::{Action, ViewerCore};
pub use header::{Header, HeaderValue};
pub use object::{CanvasObject, ObjectKind, Shape, Style};
pub use transform::{Point, Transform};
pub use wcs::{CoordSystem, CoordsConvention, WcsContext, WcsError, WcsFactory};
