//! Host and backend seams
//!
//! The engine never rasterizes. It talks to two collaborators:
//!
//! - [`HostSurface`]: the widget that owns the drawing area. It reports its
//!   size, accepts redraw requests and measures text.
//! - [`DrawBackend`]: an immediate-mode draw call set used while replaying
//!   recorded commands.
//!
//! ```text
//! CanvasContext ──records──▶ CommandList ──render──▶ DrawBackend
//!       │                        │
//!       └─measure_text──▶ HostSurface ◀──invalidate──┘
//! ```

use easel_paint::{Affine2D, Color, Font, Pen, Point, Rect, Size};

use crate::error::DrawError;
use crate::path::Geometry;

/// Measured extent of a run of text
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TextMetrics {
    /// Advance width in pixels
    pub width: f32,
    /// Line box height in pixels
    pub height: f32,
    /// Distance from the top of the line box to the alphabetic baseline
    pub baseline: f32,
}

/// The rectangular, invalidatable region a surface draws into
pub trait HostSurface {
    /// Current size of the drawing area
    fn size(&self) -> Size;

    /// Ask the host to repaint; hosts may coalesce requests
    fn invalidate(&self);

    /// Measure `text` laid out on a single line in `font`
    fn measure_text(&self, text: &str, font: &Font) -> TextMetrics;
}

/// Immediate-mode drawing calls a backend must provide
pub trait DrawBackend {
    /// Push a transform, combined with any transform already pushed
    fn push_transform(&mut self, transform: Affine2D);

    /// Pop the top transform from the stack
    fn pop_transform(&mut self);

    /// Push an opacity value (multiplied with parent)
    fn push_opacity(&mut self, opacity: f32);

    /// Pop the top opacity from the stack
    fn pop_opacity(&mut self);

    fn fill_rect(&mut self, rect: Rect, paint: Color) -> Result<(), DrawError>;

    fn stroke_rect(&mut self, rect: Rect, pen: &Pen, paint: Color) -> Result<(), DrawError>;

    fn fill_geometry(&mut self, geometry: &Geometry, paint: Color) -> Result<(), DrawError>;

    fn stroke_geometry(
        &mut self,
        geometry: &Geometry,
        pen: &Pen,
        paint: Color,
    ) -> Result<(), DrawError>;

    /// Draw a single line of text whose line box has its top-left at `position`
    fn draw_text(
        &mut self,
        text: &str,
        font: &Font,
        position: Point,
        paint: Color,
    ) -> Result<(), DrawError>;
}

/// Transform and opacity modifiers pushed for one command.
///
/// Whatever was pushed is popped again when the scope drops, so the backend
/// stack stays balanced on every exit path, including draw errors.
pub struct ModifierScope<'a> {
    backend: &'a mut dyn DrawBackend,
    pushed_transform: bool,
    pushed_opacity: bool,
}

impl<'a> ModifierScope<'a> {
    /// Push `transform` unless it is the identity and `opacity` unless it is 1.0
    pub fn enter(backend: &'a mut dyn DrawBackend, transform: Affine2D, opacity: f32) -> Self {
        let pushed_transform = !transform.is_identity();
        if pushed_transform {
            backend.push_transform(transform);
        }
        let pushed_opacity = opacity < 1.0;
        if pushed_opacity {
            backend.push_opacity(opacity);
        }
        Self {
            backend,
            pushed_transform,
            pushed_opacity,
        }
    }

    pub fn backend(&mut self) -> &mut dyn DrawBackend {
        &mut *self.backend
    }
}

impl Drop for ModifierScope<'_> {
    fn drop(&mut self) {
        if self.pushed_opacity {
            self.backend.pop_opacity();
        }
        if self.pushed_transform {
            self.backend.pop_transform();
        }
    }
}
