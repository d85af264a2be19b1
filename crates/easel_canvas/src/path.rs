//! Path building and compiled geometry
//!
//! `PathBuilder` accumulates the segments issued between `beginPath` calls.
//! `build_geometry` compiles them into a lyon path that backends can fill or
//! stroke. Arcs are flattened into straight segments up front.

use std::f32::consts::TAU;

use easel_paint::{Pen, Point, Rect};
use lyon::geom::{CubicBezierSegment, QuadraticBezierSegment};
use lyon::math::point;
use lyon::path::{Path as LyonPath, PathEvent};
use smallvec::SmallVec;

/// Path segment
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PathSegment {
    MoveTo(Point),
    LineTo(Point),
    QuadTo {
        control: Point,
        end: Point,
    },
    CubicTo {
        control1: Point,
        control2: Point,
        end: Point,
    },
    Close,
}

/// Builder for the current path of a context
#[derive(Clone, Debug)]
pub struct PathBuilder {
    segments: SmallVec<[PathSegment; 16]>,
    current: Option<Point>,
    /// Start of the open sub-path, `None` when no sub-path is open
    subpath_start: Option<Point>,
    /// Largest angle a single flattened arc segment may cover
    arc_step: f32,
}

impl PathBuilder {
    /// Finest arc step accepted, in degrees
    pub const MIN_ARC_STEP_DEGREES: f32 = 0.5;
    /// Coarsest arc step accepted, in degrees
    pub const MAX_ARC_STEP_DEGREES: f32 = 45.0;

    /// `arc_step` is in radians; out-of-range steps are clamped and
    /// non-positive ones fall back to 10 degrees.
    pub fn new(arc_step: f32) -> Self {
        let arc_step = if arc_step.is_finite() && arc_step > 0.0 {
            arc_step.clamp(
                Self::MIN_ARC_STEP_DEGREES.to_radians(),
                Self::MAX_ARC_STEP_DEGREES.to_radians(),
            )
        } else {
            10f32.to_radians()
        };
        Self {
            segments: SmallVec::new(),
            current: None,
            subpath_start: None,
            arc_step,
        }
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    pub fn current_point(&self) -> Option<Point> {
        self.current
    }

    pub fn has_open_subpath(&self) -> bool {
        self.subpath_start.is_some()
    }

    /// True when nothing drawable was added since the last `begin_path`
    pub fn is_empty(&self) -> bool {
        self.segments
            .iter()
            .all(|segment| matches!(segment, PathSegment::MoveTo(_) | PathSegment::Close))
    }

    pub fn begin_path(&mut self) {
        self.segments.clear();
        self.current = None;
        self.subpath_start = None;
    }

    pub fn move_to(&mut self, to: Point) {
        if !to.is_finite() {
            return;
        }
        self.segments.push(PathSegment::MoveTo(to));
        self.subpath_start = Some(to);
        self.current = Some(to);
    }

    pub fn line_to(&mut self, to: Point) {
        if !to.is_finite() {
            return;
        }
        self.ensure_subpath(to);
        self.segments.push(PathSegment::LineTo(to));
        self.current = Some(to);
    }

    pub fn quadratic_curve_to(&mut self, control: Point, end: Point) {
        if !(control.is_finite() && end.is_finite()) {
            return;
        }
        self.ensure_subpath(control);
        self.segments.push(PathSegment::QuadTo { control, end });
        self.current = Some(end);
    }

    pub fn bezier_curve_to(&mut self, control1: Point, control2: Point, end: Point) {
        if !(control1.is_finite() && control2.is_finite() && end.is_finite()) {
            return;
        }
        self.ensure_subpath(control1);
        self.segments.push(PathSegment::CubicTo {
            control1,
            control2,
            end,
        });
        self.current = Some(end);
    }

    /// Circular arc around `center`, flattened into line segments.
    ///
    /// An open sub-path is joined to the arc start with a line; otherwise the
    /// arc starts a new sub-path.
    pub fn arc(&mut self, center: Point, radius: f32, start: f32, end: f32, ccw: bool) {
        if !(center.is_finite() && radius.is_finite() && start.is_finite() && end.is_finite()) {
            return;
        }
        if radius <= 0.0 {
            return;
        }

        let sweep = normalize_sweep(start, end, ccw);
        let at = |angle: f32| {
            Point::new(
                center.x + radius * angle.cos(),
                center.y + radius * angle.sin(),
            )
        };

        let first = at(start);
        if self.subpath_start.is_some() {
            self.segments.push(PathSegment::LineTo(first));
        } else {
            self.segments.push(PathSegment::MoveTo(first));
            self.subpath_start = Some(first);
        }
        self.current = Some(first);

        if sweep == 0.0 {
            return;
        }

        // whole multiples of the step must not pick up a sliver segment from rounding
        let steps = (sweep.abs() / self.arc_step - 1e-3).ceil().max(1.0) as usize;
        for i in 1..=steps {
            let p = at(start + sweep * (i as f32 / steps as f32));
            self.segments.push(PathSegment::LineTo(p));
            self.current = Some(p);
        }
    }

    /// Closed rectangle figure; never joined to the open sub-path
    pub fn rect(&mut self, rect: Rect) {
        if !rect.is_finite() || !rect.has_area() {
            return;
        }
        let [p0, p1, p2, p3] = rect.corners();
        self.segments.push(PathSegment::MoveTo(p0));
        self.segments.push(PathSegment::LineTo(p1));
        self.segments.push(PathSegment::LineTo(p2));
        self.segments.push(PathSegment::LineTo(p3));
        self.segments.push(PathSegment::Close);
        self.subpath_start = None;
        self.current = Some(p0);
    }

    pub fn close_path(&mut self) {
        if let Some(start) = self.subpath_start.take() {
            self.segments.push(PathSegment::Close);
            self.current = Some(start);
        }
    }

    fn ensure_subpath(&mut self, fallback: Point) {
        if self.subpath_start.is_none() {
            let start = self.current.unwrap_or(fallback);
            self.segments.push(PathSegment::MoveTo(start));
            self.subpath_start = Some(start);
            self.current = Some(start);
        }
    }

    /// Compile the segments; `None` when the path has nothing to draw.
    ///
    /// Sub-paths that were never closed stay open in the result.
    pub fn build_geometry(&self) -> Option<Geometry> {
        if self.is_empty() {
            return None;
        }

        let mut builder = LyonPath::builder();
        let mut pending: Option<Point> = None;
        let mut current = Point::ZERO;
        let mut open = false;

        for segment in &self.segments {
            let draws = !matches!(segment, PathSegment::MoveTo(_) | PathSegment::Close);
            if draws && !open {
                let start = pending.take().unwrap_or(current);
                builder.begin(point(start.x, start.y));
                open = true;
            }

            match *segment {
                PathSegment::MoveTo(p) => {
                    if open {
                        builder.end(false);
                        open = false;
                    }
                    pending = Some(p);
                    current = p;
                }
                PathSegment::LineTo(p) => {
                    builder.line_to(point(p.x, p.y));
                    current = p;
                }
                PathSegment::QuadTo { control, end } => {
                    builder.quadratic_bezier_to(point(control.x, control.y), point(end.x, end.y));
                    current = end;
                }
                PathSegment::CubicTo {
                    control1,
                    control2,
                    end,
                } => {
                    builder.cubic_bezier_to(
                        point(control1.x, control1.y),
                        point(control2.x, control2.y),
                        point(end.x, end.y),
                    );
                    current = end;
                }
                PathSegment::Close => {
                    if open {
                        builder.end(true);
                        open = false;
                    }
                }
            }
        }

        if open {
            builder.end(false);
        }

        Some(Geometry::new(builder.build()))
    }
}

/// Sweep in (0, 2π] clockwise or [-2π, 0) counterclockwise.
/// Identical start and end angles give an empty sweep.
fn normalize_sweep(start: f32, end: f32, ccw: bool) -> f32 {
    let delta = end - start;
    if delta == 0.0 {
        return 0.0;
    }
    if ccw {
        if delta <= -TAU {
            return -TAU;
        }
        let sweep = (-delta).rem_euclid(TAU);
        if sweep == 0.0 {
            -TAU
        } else {
            -sweep
        }
    } else {
        if delta >= TAU {
            return TAU;
        }
        let sweep = delta.rem_euclid(TAU);
        if sweep == 0.0 {
            TAU
        } else {
            sweep
        }
    }
}

/// Renderable geometry compiled from a `PathBuilder`
#[derive(Clone, Debug)]
pub struct Geometry {
    path: LyonPath,
    bounds: Rect,
}

impl Geometry {
    fn new(path: LyonPath) -> Self {
        let bounds = tight_bounds(&path);
        Self { path, bounds }
    }

    pub fn path(&self) -> &LyonPath {
        &self.path
    }

    pub fn events(&self) -> impl Iterator<Item = PathEvent> + '_ {
        self.path.iter()
    }

    /// Tight bounds of the outline (curve extrema, not control points)
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// Bounds of the stroked outline for `pen`
    pub fn stroke_bounds(&self, pen: &Pen) -> Rect {
        self.bounds.inflate(pen.outset())
    }

    /// Close flag of every figure, in order
    pub fn figure_closed_flags(&self) -> Vec<bool> {
        self.path
            .iter()
            .filter_map(|event| match event {
                PathEvent::End { close, .. } => Some(close),
                _ => None,
            })
            .collect()
    }
}

fn tight_bounds(path: &LyonPath) -> Rect {
    let to_point = |p: lyon::math::Point| Point::new(p.x, p.y);

    let mut acc: Option<Rect> = None;
    for event in path.iter() {
        let rect = match event {
            PathEvent::Begin { at } => Rect::from_points(to_point(at), to_point(at)),
            PathEvent::Line { from, to } => Rect::from_points(to_point(from), to_point(to)),
            PathEvent::Quadratic { from, ctrl, to } => {
                let b = QuadraticBezierSegment { from, ctrl, to }.bounding_box();
                Rect::from_points(to_point(b.min), to_point(b.max))
            }
            PathEvent::Cubic {
                from,
                ctrl1,
                ctrl2,
                to,
            } => {
                let b = CubicBezierSegment {
                    from,
                    ctrl1,
                    ctrl2,
                    to,
                }
                .bounding_box();
                Rect::from_points(to_point(b.min), to_point(b.max))
            }
            PathEvent::End { .. } => continue,
        };
        acc = Some(match acc {
            Some(bounds) => bounds.union(&rect),
            None => rect,
        });
    }
    acc.unwrap_or(Rect::ZERO)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    fn builder() -> PathBuilder {
        PathBuilder::new(10f32.to_radians())
    }

    #[test]
    fn test_arc_step_is_clamped() {
        for step in [0.0, 1e-9, -3.0, f32::NAN, f32::INFINITY, 10.0] {
            let mut path = PathBuilder::new(step);
            path.arc(Point::new(0.0, 0.0), 5.0, 0.0, 2.0 * PI, false);
            // one move plus at most 720 half-degree steps
            assert!(path.segments().len() <= 721, "step {} gave {}", step, path.segments().len());
            // coarsest step still needs eight segments for a full turn
            assert!(path.segments().len() >= 9, "step {} gave {}", step, path.segments().len());
        }
    }

    #[test]
    fn test_empty_and_move_only_paths() {
        let mut path = builder();
        assert!(path.is_empty());
        assert!(path.build_geometry().is_none());

        path.move_to(Point::new(5.0, 5.0));
        path.move_to(Point::new(6.0, 6.0));
        assert!(path.is_empty());
        assert!(path.build_geometry().is_none());
    }

    #[test]
    fn test_closed_triangle_bounds() {
        let mut path = builder();
        path.move_to(Point::new(0.0, 0.0));
        path.line_to(Point::new(10.0, 0.0));
        path.line_to(Point::new(10.0, 10.0));
        path.close_path();

        let geometry = path.build_geometry().unwrap();
        assert_eq!(geometry.bounds(), Rect::new(0.0, 0.0, 10.0, 10.0));
        assert_eq!(geometry.figure_closed_flags(), vec![true]);
        assert_eq!(path.current_point(), Some(Point::new(0.0, 0.0)));
    }

    #[test]
    fn test_move_to_ends_open_subpath_without_closing() {
        let mut path = builder();
        path.move_to(Point::new(0.0, 0.0));
        path.line_to(Point::new(10.0, 0.0));
        path.move_to(Point::new(0.0, 20.0));
        path.line_to(Point::new(10.0, 20.0));

        let geometry = path.build_geometry().unwrap();
        assert_eq!(geometry.figure_closed_flags(), vec![false, false]);
    }

    #[test]
    fn test_line_without_subpath_opens_one() {
        let mut path = builder();
        path.line_to(Point::new(4.0, 4.0));
        path.line_to(Point::new(8.0, 0.0));
        assert_eq!(path.segments()[0], PathSegment::MoveTo(Point::new(4.0, 4.0)));

        // after closePath the next line starts at the closed figure's start
        path.close_path();
        path.line_to(Point::new(0.0, 8.0));
        let n = path.segments().len();
        assert_eq!(path.segments()[n - 2], PathSegment::MoveTo(Point::new(4.0, 4.0)));
    }

    #[test]
    fn test_close_without_subpath_is_noop() {
        let mut path = builder();
        path.close_path();
        assert!(path.segments().is_empty());
    }

    #[test]
    fn test_rect_is_its_own_closed_figure() {
        let mut path = builder();
        path.move_to(Point::new(0.0, 0.0));
        path.line_to(Point::new(5.0, 5.0));
        path.rect(Rect::new(10.0, 10.0, 4.0, 2.0));

        let geometry = path.build_geometry().unwrap();
        assert_eq!(geometry.figure_closed_flags(), vec![false, true]);
        assert_eq!(geometry.bounds(), Rect::new(0.0, 0.0, 14.0, 12.0));
        assert!(!path.has_open_subpath());
        assert_eq!(path.current_point(), Some(Point::new(10.0, 10.0)));
    }

    #[test]
    fn test_degenerate_rect_and_arc_are_ignored() {
        let mut path = builder();
        path.rect(Rect::new(0.0, 0.0, 0.0, 10.0));
        path.rect(Rect::new(0.0, 0.0, 10.0, -1.0));
        path.arc(Point::new(0.0, 0.0), 0.0, 0.0, PI, false);
        path.arc(Point::new(0.0, 0.0), -3.0, 0.0, PI, false);
        assert!(path.segments().is_empty());
    }

    #[test]
    fn test_sweep_normalization() {
        assert!((normalize_sweep(0.0, PI, false) - PI).abs() < 1e-6);
        assert!((normalize_sweep(0.0, -PI / 2.0, false) - 1.5 * PI).abs() < 1e-5);
        assert_eq!(normalize_sweep(0.0, 3.0 * TAU, false), TAU);
        assert!((normalize_sweep(0.0, PI, true) + PI).abs() < 1e-6);
        assert_eq!(normalize_sweep(0.0, -5.0 * TAU, true), -TAU);
        assert_eq!(normalize_sweep(1.0, 1.0, false), 0.0);
    }

    #[test]
    fn test_arc_segment_count_scales_with_sweep() {
        let mut quarter = builder();
        quarter.arc(Point::ZERO, 10.0, 0.0, PI / 2.0, false);
        let mut full = builder();
        full.arc(Point::ZERO, 10.0, 0.0, TAU, false);

        let lines = |p: &PathBuilder| {
            p.segments()
                .iter()
                .filter(|s| matches!(s, PathSegment::LineTo(_)))
                .count()
        };
        assert!(lines(&quarter) > 1);
        assert!(lines(&full) >= 4 * lines(&quarter) - 1);
    }

    #[test]
    fn test_half_circle_bounds() {
        let mut path = builder();
        path.arc(Point::new(50.0, 50.0), 20.0, 0.0, PI, false);
        let bounds = path.build_geometry().unwrap().bounds();

        assert!((bounds.x - 30.0).abs() < 1e-3);
        assert!((bounds.right() - 70.0).abs() < 1e-3);
        assert!((bounds.y - 50.0).abs() < 1e-3);
        assert!((bounds.bottom() - 70.0).abs() < 1e-3);
    }

    #[test]
    fn test_arc_joins_open_subpath() {
        let mut path = builder();
        path.move_to(Point::new(0.0, 0.0));
        path.arc(Point::new(20.0, 0.0), 5.0, 0.0, PI, false);
        assert_eq!(path.segments()[1], PathSegment::LineTo(Point::new(25.0, 0.0)));
        assert_eq!(path.build_geometry().unwrap().figure_closed_flags(), vec![false]);
    }

    #[test]
    fn test_curve_bounds_use_extrema() {
        let mut path = builder();
        path.move_to(Point::new(0.0, 0.0));
        path.quadratic_curve_to(Point::new(5.0, 10.0), Point::new(10.0, 0.0));
        let bounds = path.build_geometry().unwrap().bounds();

        // apex of the curve is at y = 5, the control point at y = 10
        assert!((bounds.height - 5.0).abs() < 1e-3);
        assert!((bounds.width - 10.0).abs() < 1e-3);
    }

    #[test]
    fn test_begin_path_clears() {
        let mut path = builder();
        path.rect(Rect::new(0.0, 0.0, 1.0, 1.0));
        path.begin_path();
        assert!(path.is_empty());
        assert_eq!(path.current_point(), None);
    }

    #[test]
    fn test_stroke_bounds_account_for_pen() {
        let mut path = builder();
        path.move_to(Point::new(0.0, 0.0));
        path.line_to(Point::new(10.0, 0.0));
        let geometry = path.build_geometry().unwrap();
        let pen = Pen::new(4.0).with_join(easel_paint::LineJoin::Round);
        assert_eq!(geometry.stroke_bounds(&pen), Rect::new(-2.0, -2.0, 14.0, 4.0));
    }
}
