//! Easel Canvas
//!
//! Retained-mode 2D drawing engine behind a canvas-style API:
//!
//! - **Recording**: scripts issue path, paint and transform calls through a
//!   [`CanvasContext`]; drawing calls append immutable [`Command`]s carrying a
//!   snapshot of the state at the time of the call
//! - **Replay**: a [`DrawingSurface`] renders its command list on demand
//!   against any [`DrawBackend`]
//! - **Partial invalidation**: `clear_rect` drops commands whose bounds lie
//!   inside the cleared area
//!
//! # Example
//!
//! ```rust
//! use std::rc::Rc;
//!
//! use easel_canvas::headless::{HeadlessHost, RecordingBackend};
//! use easel_canvas::{DrawingSurface, Size};
//!
//! let host = Rc::new(HeadlessHost::new(Size::new(200.0, 100.0)));
//! let mut surface = DrawingSurface::new(host).unwrap();
//!
//! let mut ctx = surface.context();
//! ctx.set_fill_style("tomato");
//! ctx.fill_rect(10.0, 10.0, 50.0, 20.0);
//!
//! let mut backend = RecordingBackend::new();
//! assert_eq!(surface.render(&mut backend), 1);
//! ```

pub mod backend;
pub mod bridge;
pub mod command;
pub mod config;
pub mod context;
pub mod error;
pub mod headless;
pub mod path;
pub mod registry;
pub mod state;
pub mod surface;

pub use backend::{DrawBackend, HostSurface, ModifierScope, TextMetrics};
pub use command::Command;
pub use config::CanvasConfig;
pub use context::CanvasContext;
pub use error::{CanvasError, DrawError, Result};
pub use path::{Geometry, PathBuilder, PathSegment};
pub use registry::{SurfaceId, SurfaceRegistry};
pub use state::{DrawingState, StateSnapshot, StateStack};
pub use surface::{CommandList, DrawingSurface};

// Paint values used throughout the public API
pub use easel_paint::{
    Affine2D, Color, Font, FontStyle, FontWeight, LineCap, LineJoin, Pen, Point, Rect, Size,
    TextAlign, TextBaseline,
};
