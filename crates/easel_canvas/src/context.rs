//! The 2D drawing context
//!
//! `CanvasContext` is the recording API scripts talk to. It mirrors the
//! familiar canvas 2D methods in snake_case. Style setters and path calls
//! only touch context state; `fill`, `stroke`, `fill_rect`, `stroke_rect` and
//! `fill_text` append a command carrying a snapshot of the current state.
//!
//! Invalid arguments (NaN, infinities, non-positive sizes, unparseable
//! strings) are ignored without raising anything.

use easel_paint::{Affine2D, Color, Font, Point, Rect};

use crate::backend::{HostSurface, TextMetrics};
use crate::command::Command;
use crate::config::CanvasConfig;
use crate::path::{PathBuilder, PathSegment};
use crate::state::{DrawingState, StateStack};
use crate::surface::CommandList;

/// Context state owned by a surface between `context()` calls
#[derive(Debug)]
pub struct ContextState {
    state: DrawingState,
    stack: StateStack,
    path: PathBuilder,
}

impl ContextState {
    pub fn new(config: &CanvasConfig) -> Self {
        Self {
            state: DrawingState::with_font_shorthand(&config.default_font),
            stack: StateStack::new(config.max_save_depth),
            path: PathBuilder::new(config.arc_segment_angle()),
        }
    }
}

/// Borrowed handle to a surface's 2D context
pub struct CanvasContext<'a> {
    core: &'a mut ContextState,
    commands: &'a mut CommandList,
    host: &'a dyn HostSurface,
}

impl<'a> CanvasContext<'a> {
    pub(crate) fn new(
        core: &'a mut ContextState,
        commands: &'a mut CommandList,
        host: &'a dyn HostSurface,
    ) -> Self {
        Self {
            core,
            commands,
            host,
        }
    }

    /// Current drawing state
    pub fn state(&self) -> &DrawingState {
        &self.core.state
    }

    pub fn commands(&self) -> &[Command] {
        self.commands.commands()
    }

    pub fn path_segments(&self) -> &[PathSegment] {
        self.core.path.segments()
    }

    // === Paint and line style ===

    pub fn fill_style(&self) -> String {
        self.core.state.fill().to_css()
    }

    pub fn set_fill_style(&mut self, value: &str) {
        self.core.state.set_fill_style(value);
    }

    pub fn set_fill_color(&mut self, color: Color) {
        self.core.state.set_fill_color(color);
    }

    pub fn stroke_style(&self) -> String {
        self.core.state.stroke().to_css()
    }

    pub fn set_stroke_style(&mut self, value: &str) {
        self.core.state.set_stroke_style(value);
    }

    pub fn set_stroke_color(&mut self, color: Color) {
        self.core.state.set_stroke_color(color);
    }

    pub fn line_width(&self) -> f32 {
        self.core.state.line_width()
    }

    pub fn set_line_width(&mut self, width: f32) {
        self.core.state.set_line_width(width);
    }

    pub fn line_cap(&self) -> &'static str {
        self.core.state.line_cap().as_str()
    }

    pub fn set_line_cap(&mut self, value: &str) {
        self.core.state.set_line_cap(value);
    }

    pub fn line_join(&self) -> &'static str {
        self.core.state.line_join().as_str()
    }

    pub fn set_line_join(&mut self, value: &str) {
        self.core.state.set_line_join(value);
    }

    pub fn miter_limit(&self) -> f32 {
        self.core.state.miter_limit()
    }

    pub fn set_miter_limit(&mut self, limit: f32) {
        self.core.state.set_miter_limit(limit);
    }

    pub fn global_alpha(&self) -> f32 {
        self.core.state.global_alpha()
    }

    pub fn set_global_alpha(&mut self, alpha: f32) {
        self.core.state.set_global_alpha(alpha);
    }

    // === Text style ===

    /// Font shorthand, e.g. `italic bold 12px serif`
    pub fn font(&self) -> String {
        self.core.state.font().to_css()
    }

    pub fn set_font(&mut self, value: &str) {
        self.core.state.set_font(value);
    }

    pub fn text_align(&self) -> &'static str {
        self.core.state.text_align().as_str()
    }

    pub fn set_text_align(&mut self, value: &str) {
        self.core.state.set_text_align(value);
    }

    pub fn text_baseline(&self) -> &'static str {
        self.core.state.text_baseline().as_str()
    }

    pub fn set_text_baseline(&mut self, value: &str) {
        self.core.state.set_text_baseline(value);
    }

    // === State stack ===

    pub fn save(&mut self) {
        self.core.stack.save(&self.core.state);
    }

    /// No-op when nothing was saved
    pub fn restore(&mut self) {
        self.core.stack.restore(&mut self.core.state);
    }

    pub fn save_depth(&self) -> usize {
        self.core.stack.depth()
    }

    // === Transform ===

    pub fn current_transform(&self) -> Affine2D {
        self.core.state.transform()
    }

    pub fn reset_transform(&mut self) {
        self.core.state.reset_transform();
    }

    pub fn set_transform(&mut self, a: f32, b: f32, c: f32, d: f32, e: f32, f: f32) {
        self.core.state.set_transform(Affine2D::new(a, b, c, d, e, f));
    }

    /// Multiply the current transform by the given matrix
    pub fn transform(&mut self, a: f32, b: f32, c: f32, d: f32, e: f32, f: f32) {
        self.core
            .state
            .apply_transform(Affine2D::new(a, b, c, d, e, f));
    }

    pub fn translate(&mut self, x: f32, y: f32) {
        self.core.state.translate(x, y);
    }

    pub fn scale(&mut self, x: f32, y: f32) {
        self.core.state.scale(x, y);
    }

    /// Rotate clockwise by `angle` radians
    pub fn rotate(&mut self, angle: f32) {
        self.core.state.rotate(angle);
    }

    // === Path building ===

    pub fn begin_path(&mut self) {
        self.core.path.begin_path();
    }

    pub fn close_path(&mut self) {
        self.core.path.close_path();
    }

    pub fn move_to(&mut self, x: f32, y: f32) {
        self.core.path.move_to(Point::new(x, y));
    }

    pub fn line_to(&mut self, x: f32, y: f32) {
        self.core.path.line_to(Point::new(x, y));
    }

    pub fn bezier_curve_to(&mut self, cp1x: f32, cp1y: f32, cp2x: f32, cp2y: f32, x: f32, y: f32) {
        self.core.path.bezier_curve_to(
            Point::new(cp1x, cp1y),
            Point::new(cp2x, cp2y),
            Point::new(x, y),
        );
    }

    pub fn quadratic_curve_to(&mut self, cpx: f32, cpy: f32, x: f32, y: f32) {
        self.core
            .path
            .quadratic_curve_to(Point::new(cpx, cpy), Point::new(x, y));
    }

    pub fn arc(
        &mut self,
        x: f32,
        y: f32,
        radius: f32,
        start_angle: f32,
        end_angle: f32,
        counterclockwise: bool,
    ) {
        self.core.path.arc(
            Point::new(x, y),
            radius,
            start_angle,
            end_angle,
            counterclockwise,
        );
    }

    pub fn rect(&mut self, x: f32, y: f32, width: f32, height: f32) {
        self.core.path.rect(Rect::new(x, y, width, height));
    }

    // === Drawing ===

    /// Record a fill of the current path; empty paths record nothing
    pub fn fill(&mut self) {
        if let Some(geometry) = self.core.path.build_geometry() {
            let snapshot = self.core.state.snapshot();
            self.commands.add(Command::FillPath { geometry, snapshot });
        }
    }

    /// Record a stroke of the current path; empty paths record nothing
    pub fn stroke(&mut self) {
        if let Some(geometry) = self.core.path.build_geometry() {
            let snapshot = self.core.state.snapshot();
            self.commands.add(Command::StrokePath { geometry, snapshot });
        }
    }

    pub fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32) {
        let Some(rect) = drawable_rect(x, y, width, height) else {
            return;
        };
        let snapshot = self.core.state.snapshot();
        self.commands.add(Command::FillRect { rect, snapshot });
    }

    pub fn stroke_rect(&mut self, x: f32, y: f32, width: f32, height: f32) {
        let Some(rect) = drawable_rect(x, y, width, height) else {
            return;
        };
        let snapshot = self.core.state.snapshot();
        self.commands.add(Command::StrokeRect { rect, snapshot });
    }

    /// Remove recorded commands lying entirely inside the rect.
    ///
    /// The rect is placed by the current transform. Commands that only
    /// partly overlap the placed area are kept.
    pub fn clear_rect(&mut self, x: f32, y: f32, width: f32, height: f32) {
        let Some(rect) = drawable_rect(x, y, width, height) else {
            return;
        };
        let transform = self.core.state.transform();
        self.commands.clear_transformed(rect, &transform);
    }

    /// Record a single line of text anchored at (x, y)
    pub fn fill_text(&mut self, text: &str, x: f32, y: f32) {
        let origin = Point::new(x, y);
        if text.is_empty() || !origin.is_finite() {
            return;
        }
        let metrics = self.host.measure_text(text, self.core.state.font());
        let snapshot = self.core.state.snapshot();
        self.commands
            .add(Command::fill_text(text, origin, metrics, snapshot));
    }

    /// Measure `text` in the current font
    pub fn measure_text(&self, text: &str) -> TextMetrics {
        self.host.measure_text(text, self.current_font())
    }

    fn current_font(&self) -> &Font {
        self.core.state.font()
    }
}

fn drawable_rect(x: f32, y: f32, width: f32, height: f32) -> Option<Rect> {
    let rect = Rect::new(x, y, width, height);
    (rect.is_finite() && rect.has_area()).then_some(rect)
}
