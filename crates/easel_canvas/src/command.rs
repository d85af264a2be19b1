//! Recorded draw commands
//!
//! A command pairs a payload with the `StateSnapshot` taken when it was
//! recorded. Commands render themselves against a [`DrawBackend`] and report
//! their bounds in surface space so partial clears can reason about them.

use easel_paint::{Point, Rect, TextAlign, TextBaseline};

use crate::backend::{DrawBackend, ModifierScope, TextMetrics};
use crate::error::DrawError;
use crate::path::Geometry;
use crate::state::StateSnapshot;

/// Share of the baseline distance the hanging baseline sits below the top
const HANGING_BASELINE_RATIO: f32 = 0.2;
/// Share of the line height the ideographic baseline sits below the top
const IDEOGRAPHIC_BASELINE_RATIO: f32 = 0.9;

/// A recorded, immutable drawing command
#[derive(Clone, Debug)]
pub enum Command {
    FillRect {
        rect: Rect,
        snapshot: StateSnapshot,
    },
    StrokeRect {
        rect: Rect,
        snapshot: StateSnapshot,
    },
    FillPath {
        geometry: Geometry,
        snapshot: StateSnapshot,
    },
    StrokePath {
        geometry: Geometry,
        snapshot: StateSnapshot,
    },
    FillText {
        text: String,
        /// Origin passed to fillText
        origin: Point,
        /// Top-left of the line box after align/baseline shifts
        position: Point,
        metrics: TextMetrics,
        snapshot: StateSnapshot,
    },
}

impl Command {
    /// Text command anchored at `origin` according to the snapshot's
    /// textAlign and textBaseline
    pub fn fill_text(
        text: impl Into<String>,
        origin: Point,
        metrics: TextMetrics,
        snapshot: StateSnapshot,
    ) -> Self {
        let position = text_position(
            origin,
            &metrics,
            snapshot.text_align(),
            snapshot.text_baseline(),
        );
        Command::FillText {
            text: text.into(),
            origin,
            position,
            metrics,
            snapshot,
        }
    }

    pub fn snapshot(&self) -> &StateSnapshot {
        match self {
            Command::FillRect { snapshot, .. }
            | Command::StrokeRect { snapshot, .. }
            | Command::FillPath { snapshot, .. }
            | Command::StrokePath { snapshot, .. }
            | Command::FillText { snapshot, .. } => snapshot,
        }
    }

    /// Bounds before the snapshot transform is applied
    pub fn local_bounds(&self) -> Rect {
        match self {
            Command::FillRect { rect, .. } => *rect,
            Command::StrokeRect { rect, snapshot } => rect.inflate(snapshot.line_width() / 2.0),
            Command::FillPath { geometry, .. } => geometry.bounds(),
            Command::StrokePath { geometry, snapshot } => geometry.stroke_bounds(&snapshot.pen()),
            Command::FillText {
                position, metrics, ..
            } => Rect::new(position.x, position.y, metrics.width, metrics.height),
        }
    }

    /// Bounds in surface space
    pub fn bounds(&self) -> Rect {
        self.snapshot().transform().transform_rect(&self.local_bounds())
    }

    /// Replay this command.
    ///
    /// The snapshot's transform and opacity are pushed around the draw call
    /// and popped again whether or not the backend succeeds.
    pub fn render(&self, backend: &mut dyn DrawBackend) -> Result<(), DrawError> {
        match self {
            Command::FillRect { rect, .. } if !rect.has_area() => return Ok(()),
            Command::FillText { text, .. } if text.is_empty() => return Ok(()),
            _ => {}
        }

        let snapshot = self.snapshot();
        let mut scope =
            ModifierScope::enter(backend, snapshot.transform(), snapshot.global_alpha());
        let target = scope.backend();

        match self {
            Command::FillRect { rect, snapshot } => target.fill_rect(*rect, snapshot.fill()),
            Command::StrokeRect { rect, snapshot } => {
                target.stroke_rect(*rect, &snapshot.pen(), snapshot.stroke())
            }
            Command::FillPath { geometry, snapshot } => {
                target.fill_geometry(geometry, snapshot.fill())
            }
            Command::StrokePath { geometry, snapshot } => {
                target.stroke_geometry(geometry, &snapshot.pen(), snapshot.stroke())
            }
            Command::FillText {
                text,
                position,
                snapshot,
                ..
            } => target.draw_text(text, snapshot.font(), *position, snapshot.fill()),
        }
    }
}

/// Shift the fillText origin to the top-left of the measured line box
fn text_position(
    origin: Point,
    metrics: &TextMetrics,
    align: TextAlign,
    baseline: TextBaseline,
) -> Point {
    let dx = match align {
        TextAlign::Start | TextAlign::Left => 0.0,
        TextAlign::Center => -metrics.width / 2.0,
        TextAlign::End | TextAlign::Right => -metrics.width,
    };
    let dy = match baseline {
        TextBaseline::Top => 0.0,
        TextBaseline::Hanging => metrics.baseline * HANGING_BASELINE_RATIO,
        TextBaseline::Middle => -metrics.height / 2.0,
        TextBaseline::Alphabetic => -metrics.baseline,
        TextBaseline::Bottom => -metrics.height,
        TextBaseline::Ideographic => -metrics.height * IDEOGRAPHIC_BASELINE_RATIO,
    };
    Point::new(origin.x + dx, origin.y + dy)
}
