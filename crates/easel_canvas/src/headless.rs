//! Headless host and recording backend
//!
//! Window-less stand-ins for the two collaborators: `HeadlessHost` reports a
//! fixed size, counts redraw requests and measures text with fixed per-glyph
//! metrics. `RecordingBackend` logs every draw call it receives as a
//! [`DrawOp`]. Tests and demos run the engine end to end with them.

use std::cell::Cell;

use easel_paint::{Affine2D, Color, Font, Pen, Point, Rect, Size};

use crate::backend::{DrawBackend, HostSurface, TextMetrics};
use crate::error::DrawError;
use crate::path::Geometry;

/// Average advance of one glyph as a share of the font size
const GLYPH_ADVANCE: f32 = 0.6;
/// Line box height as a share of the font size
const LINE_HEIGHT: f32 = 1.2;
/// Baseline offset from the top of the line box as a share of the font size
const ASCENT: f32 = 0.95;

/// Host region with no window behind it
#[derive(Debug)]
pub struct HeadlessHost {
    size: Cell<Size>,
    invalidations: Cell<usize>,
}

impl HeadlessHost {
    pub fn new(size: Size) -> Self {
        Self {
            size: Cell::new(size),
            invalidations: Cell::new(0),
        }
    }

    /// Simulate a host resize
    pub fn resize(&self, size: Size) {
        self.size.set(size);
    }

    /// Number of redraw requests received so far
    pub fn invalidations(&self) -> usize {
        self.invalidations.get()
    }
}

impl HostSurface for HeadlessHost {
    fn size(&self) -> Size {
        self.size.get()
    }

    fn invalidate(&self) {
        self.invalidations.set(self.invalidations.get() + 1);
    }

    fn measure_text(&self, text: &str, font: &Font) -> TextMetrics {
        let glyphs = text.chars().count() as f32;
        TextMetrics {
            width: glyphs * font.size * GLYPH_ADVANCE,
            height: font.size * LINE_HEIGHT,
            baseline: font.size * ASCENT,
        }
    }
}

/// One call received by a [`RecordingBackend`]
#[derive(Clone, Debug, PartialEq)]
pub enum DrawOp {
    PushTransform(Affine2D),
    PopTransform,
    PushOpacity(f32),
    PopOpacity,
    FillRect {
        rect: Rect,
        paint: Color,
    },
    StrokeRect {
        rect: Rect,
        pen: Pen,
        paint: Color,
    },
    FillGeometry {
        bounds: Rect,
        paint: Color,
    },
    StrokeGeometry {
        bounds: Rect,
        pen: Pen,
        paint: Color,
    },
    DrawText {
        text: String,
        font: Font,
        position: Point,
        paint: Color,
    },
}

/// Backend that records draw calls instead of rasterizing them
#[derive(Debug, Default)]
pub struct RecordingBackend {
    ops: Vec<DrawOp>,
    transforms: Vec<Affine2D>,
    opacities: Vec<f32>,
    fail_draws: bool,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject every draw call with a backend error; modifiers still apply
    pub fn failing(mut self) -> Self {
        self.fail_draws = true;
        self
    }

    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    /// Draw calls only, without modifier pushes and pops
    pub fn draws(&self) -> impl Iterator<Item = &DrawOp> {
        self.ops.iter().filter(|op| {
            !matches!(
                op,
                DrawOp::PushTransform(_)
                    | DrawOp::PopTransform
                    | DrawOp::PushOpacity(_)
                    | DrawOp::PopOpacity
            )
        })
    }

    /// Open (transform, opacity) scopes
    pub fn depths(&self) -> (usize, usize) {
        (self.transforms.len(), self.opacities.len())
    }

    /// Product of all pushed transforms
    pub fn current_transform(&self) -> Affine2D {
        self.transforms
            .iter()
            .fold(Affine2D::IDENTITY, |acc, t| acc.then(t))
    }

    /// Product of all pushed opacities
    pub fn current_opacity(&self) -> f32 {
        self.opacities.iter().product()
    }

    pub fn clear(&mut self) {
        self.ops.clear();
    }

    fn draw(&mut self, op: DrawOp) -> Result<(), DrawError> {
        if self.fail_draws {
            return Err(DrawError::Backend(format!("rejected {:?}", op)));
        }
        self.ops.push(op);
        Ok(())
    }
}

impl DrawBackend for RecordingBackend {
    fn push_transform(&mut self, transform: Affine2D) {
        self.transforms.push(transform);
        self.ops.push(DrawOp::PushTransform(transform));
    }

    fn pop_transform(&mut self) {
        if self.transforms.pop().is_none() {
            tracing::warn!("pop_transform on empty stack");
        }
        self.ops.push(DrawOp::PopTransform);
    }

    fn push_opacity(&mut self, opacity: f32) {
        self.opacities.push(opacity);
        self.ops.push(DrawOp::PushOpacity(opacity));
    }

    fn pop_opacity(&mut self) {
        if self.opacities.pop().is_none() {
            tracing::warn!("pop_opacity on empty stack");
        }
        self.ops.push(DrawOp::PopOpacity);
    }

    fn fill_rect(&mut self, rect: Rect, paint: Color) -> Result<(), DrawError> {
        self.draw(DrawOp::FillRect { rect, paint })
    }

    fn stroke_rect(&mut self, rect: Rect, pen: &Pen, paint: Color) -> Result<(), DrawError> {
        self.draw(DrawOp::StrokeRect {
            rect,
            pen: *pen,
            paint,
        })
    }

    fn fill_geometry(&mut self, geometry: &Geometry, paint: Color) -> Result<(), DrawError> {
        self.draw(DrawOp::FillGeometry {
            bounds: geometry.bounds(),
            paint,
        })
    }

    fn stroke_geometry(
        &mut self,
        geometry: &Geometry,
        pen: &Pen,
        paint: Color,
    ) -> Result<(), DrawError> {
        self.draw(DrawOp::StrokeGeometry {
            bounds: geometry.bounds(),
            pen: *pen,
            paint,
        })
    }

    fn draw_text(
        &mut self,
        text: &str,
        font: &Font,
        position: Point,
        paint: Color,
    ) -> Result<(), DrawError> {
        self.draw(DrawOp::DrawText {
            text: text.to_string(),
            font: font.clone(),
            position,
            paint,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headless_measure_scales_with_font() {
        let host = HeadlessHost::new(Size::new(10.0, 10.0));
        let font = Font {
            size: 20.0,
            ..Font::default()
        };
        let metrics = host.measure_text("abcd", &font);
        assert!((metrics.width - 48.0).abs() < 1e-3);
        assert!((metrics.height - 24.0).abs() < 1e-3);
        assert!((metrics.baseline - 19.0).abs() < 1e-3);
    }

    #[test]
    fn test_resize_is_visible() {
        let host = HeadlessHost::new(Size::new(10.0, 10.0));
        host.resize(Size::new(30.0, 40.0));
        assert_eq!(host.size(), Size::new(30.0, 40.0));
    }

    #[test]
    fn test_recording_backend_tracks_modifiers() {
        let mut backend = RecordingBackend::new();
        backend.push_transform(Affine2D::translation(5.0, 0.0));
        backend.push_opacity(0.5);
        backend.push_opacity(0.5);
        assert_eq!(backend.depths(), (1, 2));
        assert_eq!(backend.current_opacity(), 0.25);
        assert_eq!(
            backend.current_transform().transform_point(Point::ZERO),
            Point::new(5.0, 0.0)
        );

        backend.pop_opacity();
        backend.pop_opacity();
        backend.pop_transform();
        assert_eq!(backend.depths(), (0, 0));
    }

    #[test]
    fn test_failing_backend_records_no_draws() {
        let mut backend = RecordingBackend::new().failing();
        assert!(backend.fill_rect(Rect::new(0.0, 0.0, 1.0, 1.0), Color::RED).is_err());
        assert_eq!(backend.draws().count(), 0);
    }
}
