//! Drawing state, snapshots and the save/restore stack
//!
//! `DrawingState` is the mutable style/transform state of a context. Every
//! setter validates its input and keeps the previous value when the input is
//! unusable, so script mistakes never surface as errors. Commands capture a
//! `StateSnapshot` when they are recorded; the snapshot cannot be mutated.

use std::ops::Deref;

use easel_paint::parse::{
    parse_color, parse_font, parse_line_cap, parse_line_join, parse_text_align,
    parse_text_baseline,
};
use easel_paint::{Affine2D, Color, Font, LineCap, LineJoin, Pen, TextAlign, TextBaseline};

/// Mutable style and transform state of a drawing context
#[derive(Clone, Debug, PartialEq)]
pub struct DrawingState {
    fill: Color,
    stroke: Color,
    line_width: f32,
    line_cap: LineCap,
    line_join: LineJoin,
    miter_limit: f32,
    global_alpha: f32,
    transform: Affine2D,
    font: Font,
    text_align: TextAlign,
    text_baseline: TextBaseline,
}

impl Default for DrawingState {
    fn default() -> Self {
        Self::with_font(Font::default())
    }
}

impl DrawingState {
    pub fn with_font(font: Font) -> Self {
        Self {
            fill: Color::BLACK,
            stroke: Color::BLACK,
            line_width: 1.0,
            line_cap: LineCap::Butt,
            line_join: LineJoin::Miter,
            miter_limit: 10.0,
            global_alpha: 1.0,
            transform: Affine2D::IDENTITY,
            font,
            text_align: TextAlign::Start,
            text_baseline: TextBaseline::Alphabetic,
        }
    }

    /// Default state whose font comes from a shorthand string.
    /// An unusable shorthand falls back to `10px sans-serif`.
    pub fn with_font_shorthand(shorthand: &str) -> Self {
        let font = parse_font(shorthand, &Font::default()).unwrap_or_default();
        Self::with_font(font)
    }

    // === Getters ===

    pub fn fill(&self) -> Color {
        self.fill
    }

    pub fn stroke(&self) -> Color {
        self.stroke
    }

    pub fn line_width(&self) -> f32 {
        self.line_width
    }

    pub fn line_cap(&self) -> LineCap {
        self.line_cap
    }

    pub fn line_join(&self) -> LineJoin {
        self.line_join
    }

    pub fn miter_limit(&self) -> f32 {
        self.miter_limit
    }

    pub fn global_alpha(&self) -> f32 {
        self.global_alpha
    }

    pub fn transform(&self) -> Affine2D {
        self.transform
    }

    pub fn font(&self) -> &Font {
        &self.font
    }

    pub fn text_align(&self) -> TextAlign {
        self.text_align
    }

    pub fn text_baseline(&self) -> TextBaseline {
        self.text_baseline
    }

    /// Pen built from width, cap, join and miter limit
    pub fn pen(&self) -> Pen {
        Pen {
            width: self.line_width,
            cap: self.line_cap,
            join: self.line_join,
            miter_limit: self.miter_limit,
        }
    }

    // === Paint ===

    pub fn set_fill_style(&mut self, value: &str) -> bool {
        match parse_color(value) {
            Some(color) => {
                self.fill = color;
                true
            }
            None => {
                tracing::trace!(value, "ignoring unparseable fillStyle");
                false
            }
        }
    }

    pub fn set_fill_color(&mut self, color: Color) {
        self.fill = color;
    }

    pub fn set_stroke_style(&mut self, value: &str) -> bool {
        match parse_color(value) {
            Some(color) => {
                self.stroke = color;
                true
            }
            None => {
                tracing::trace!(value, "ignoring unparseable strokeStyle");
                false
            }
        }
    }

    pub fn set_stroke_color(&mut self, color: Color) {
        self.stroke = color;
    }

    // === Lines ===

    pub fn set_line_width(&mut self, width: f32) -> bool {
        if !(width.is_finite() && width > 0.0) {
            tracing::trace!(width, "ignoring non-positive lineWidth");
            return false;
        }
        self.line_width = width;
        true
    }

    pub fn set_line_cap(&mut self, value: &str) -> bool {
        match parse_line_cap(value) {
            Some(cap) => {
                self.line_cap = cap;
                true
            }
            None => {
                tracing::trace!(value, "ignoring unknown lineCap");
                false
            }
        }
    }

    pub fn set_line_join(&mut self, value: &str) -> bool {
        match parse_line_join(value) {
            Some(join) => {
                self.line_join = join;
                true
            }
            None => {
                tracing::trace!(value, "ignoring unknown lineJoin");
                false
            }
        }
    }

    pub fn set_miter_limit(&mut self, limit: f32) -> bool {
        if !(limit.is_finite() && limit > 0.0) {
            tracing::trace!(limit, "ignoring non-positive miterLimit");
            return false;
        }
        self.miter_limit = limit;
        true
    }

    /// Clamped into [0, 1]; NaN and infinities are ignored
    pub fn set_global_alpha(&mut self, alpha: f32) -> bool {
        if !alpha.is_finite() {
            tracing::trace!(alpha, "ignoring non-finite globalAlpha");
            return false;
        }
        self.global_alpha = alpha.clamp(0.0, 1.0);
        true
    }

    // === Text ===

    pub fn set_font(&mut self, value: &str) -> bool {
        match parse_font(value, &self.font) {
            Some(font) => {
                self.font = font;
                true
            }
            None => {
                tracing::trace!(value, "ignoring empty font shorthand");
                false
            }
        }
    }

    pub fn set_text_align(&mut self, value: &str) -> bool {
        match parse_text_align(value) {
            Some(align) => {
                self.text_align = align;
                true
            }
            None => {
                tracing::trace!(value, "ignoring unknown textAlign");
                false
            }
        }
    }

    pub fn set_text_baseline(&mut self, value: &str) -> bool {
        match parse_text_baseline(value) {
            Some(baseline) => {
                self.text_baseline = baseline;
                true
            }
            None => {
                tracing::trace!(value, "ignoring unknown textBaseline");
                false
            }
        }
    }

    // === Transform ===

    pub fn reset_transform(&mut self) {
        self.transform = Affine2D::IDENTITY;
    }

    pub fn set_transform(&mut self, transform: Affine2D) -> bool {
        if !transform.is_finite() {
            tracing::trace!(?transform, "ignoring non-finite setTransform");
            return false;
        }
        self.transform = transform;
        true
    }

    /// Multiply the current transform by `transform` (applied to points first)
    pub fn apply_transform(&mut self, transform: Affine2D) -> bool {
        if !transform.is_finite() {
            tracing::trace!(?transform, "ignoring non-finite transform");
            return false;
        }
        self.transform = self.transform.then(&transform);
        true
    }

    pub fn translate(&mut self, x: f32, y: f32) -> bool {
        self.apply_transform(Affine2D::translation(x, y))
    }

    pub fn scale(&mut self, sx: f32, sy: f32) -> bool {
        self.apply_transform(Affine2D::scale(sx, sy))
    }

    pub fn rotate(&mut self, angle: f32) -> bool {
        if !angle.is_finite() {
            return false;
        }
        self.apply_transform(Affine2D::rotation(angle))
    }

    /// Capture an immutable copy for a command
    pub fn snapshot(&self) -> StateSnapshot {
        StateSnapshot(self.clone())
    }
}

/// Immutable copy of a `DrawingState` taken when a command is recorded
#[derive(Clone, Debug, PartialEq)]
pub struct StateSnapshot(DrawingState);

impl Deref for StateSnapshot {
    type Target = DrawingState;

    fn deref(&self) -> &DrawingState {
        &self.0
    }
}

/// LIFO stack backing save() / restore()
#[derive(Debug)]
pub struct StateStack {
    saved: Vec<DrawingState>,
    max_depth: usize,
}

impl StateStack {
    pub fn new(max_depth: usize) -> Self {
        Self {
            saved: Vec::new(),
            max_depth,
        }
    }

    pub fn depth(&self) -> usize {
        self.saved.len()
    }

    /// Push a full clone of `state`; ignored once the depth bound is hit
    pub fn save(&mut self, state: &DrawingState) -> bool {
        if self.saved.len() >= self.max_depth {
            tracing::warn!(max_depth = self.max_depth, "save() ignored, state stack is full");
            return false;
        }
        self.saved.push(state.clone());
        true
    }

    /// Pop into `state`; no-op when nothing was saved
    pub fn restore(&mut self, state: &mut DrawingState) -> bool {
        match self.saved.pop() {
            Some(saved) => {
                *state = saved;
                true
            }
            None => false,
        }
    }
}
