//! 2D affine transforms

use crate::primitives::{Point, Rect};

/// 2D affine transformation
///
/// Components follow the 2D context convention `(a, b, c, d, e, f)`:
///
/// ```text
/// | a  c  e |
/// | b  d  f |
/// | 0  0  1 |
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Affine2D {
    pub elements: [f32; 6],
}

impl Default for Affine2D {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Affine2D {
    pub const IDENTITY: Affine2D = Affine2D {
        elements: [1.0, 0.0, 0.0, 1.0, 0.0, 0.0],
    };

    pub const fn new(a: f32, b: f32, c: f32, d: f32, e: f32, f: f32) -> Self {
        Self {
            elements: [a, b, c, d, e, f],
        }
    }

    pub fn translation(x: f32, y: f32) -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, x, y)
    }

    pub fn scale(sx: f32, sy: f32) -> Self {
        Self::new(sx, 0.0, 0.0, sy, 0.0, 0.0)
    }

    pub fn rotation(angle: f32) -> Self {
        let (s, c) = angle.sin_cos();
        Self::new(c, s, -s, c, 0.0, 0.0)
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }

    pub fn is_finite(&self) -> bool {
        self.elements.iter().all(|v| v.is_finite())
    }

    /// True when the transform maps axis-aligned rects onto axis-aligned rects
    pub fn is_axis_aligned(&self) -> bool {
        let [_, b, c, ..] = self.elements;
        b == 0.0 && c == 0.0
    }

    /// Inverse transform; `None` when the matrix is singular or non-finite
    pub fn invert(&self) -> Option<Affine2D> {
        let [a, b, c, d, e, f] = self.elements;
        let det = a * d - b * c;
        if det == 0.0 || !det.is_finite() {
            return None;
        }
        let inv = Affine2D::new(
            d / det,
            -b / det,
            -c / det,
            a / det,
            (c * f - d * e) / det,
            (b * e - a * f) / det,
        );
        inv.is_finite().then_some(inv)
    }

    pub fn transform_point(&self, point: Point) -> Point {
        let [a, b, c, d, e, f] = self.elements;
        Point::new(a * point.x + c * point.y + e, b * point.x + d * point.y + f)
    }

    /// Axis-aligned bounds of a rect after transformation
    pub fn transform_rect(&self, rect: &Rect) -> Rect {
        if self.is_identity() {
            return *rect;
        }
        Rect::bounding(rect.corners().map(|p| self.transform_point(p))).unwrap_or(*rect)
    }

    /// Concatenate this transform with another (self * other)
    /// The resulting transform first applies `other`, then `self`.
    pub fn then(&self, other: &Affine2D) -> Affine2D {
        let [a1, b1, c1, d1, e1, f1] = self.elements;
        let [a2, b2, c2, d2, e2, f2] = other.elements;
        Affine2D::new(
            a1 * a2 + c1 * b2,
            b1 * a2 + d1 * b2,
            a1 * c2 + c1 * d2,
            b1 * c2 + d1 * d2,
            a1 * e2 + c1 * f2 + e1,
            b1 * e2 + d1 * f2 + f1,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Point, b: Point) -> bool {
        (a.x - b.x).abs() < 1e-4 && (a.y - b.y).abs() < 1e-4
    }

    #[test]
    fn test_then_applies_other_first() {
        let translate = Affine2D::translation(10.0, 0.0);
        let scale = Affine2D::scale(2.0, 2.0);

        // scale first, then translate
        let m = translate.then(&scale);
        assert!(approx(m.transform_point(Point::new(1.0, 1.0)), Point::new(12.0, 2.0)));
    }

    #[test]
    fn test_rotation_quarter_turn() {
        let m = Affine2D::rotation(std::f32::consts::FRAC_PI_2);
        assert!(approx(m.transform_point(Point::new(1.0, 0.0)), Point::new(0.0, 1.0)));
    }

    #[test]
    fn test_invert_round_trips() {
        let m = Affine2D::translation(3.0, -2.0)
            .then(&Affine2D::rotation(0.7))
            .then(&Affine2D::scale(2.0, 0.5));
        let inv = m.invert().unwrap();
        let p = Point::new(4.0, 9.0);
        assert!(approx(inv.transform_point(m.transform_point(p)), p));
        assert!(approx(m.then(&inv).transform_point(p), p));
    }

    #[test]
    fn test_singular_has_no_inverse() {
        assert!(Affine2D::scale(0.0, 1.0).invert().is_none());
        assert!(Affine2D::new(1.0, 2.0, 2.0, 4.0, 0.0, 0.0).invert().is_none());
    }

    #[test]
    fn test_axis_alignment() {
        assert!(Affine2D::scale(2.0, -1.0).then(&Affine2D::translation(1.0, 1.0)).is_axis_aligned());
        assert!(!Affine2D::rotation(0.3).is_axis_aligned());
    }

    #[test]
    fn test_transform_rect_bounds() {
        let m = Affine2D::rotation(std::f32::consts::FRAC_PI_2);
        let r = m.transform_rect(&Rect::new(0.0, 0.0, 10.0, 5.0));
        assert!((r.x + 5.0).abs() < 1e-4);
        assert!((r.width - 5.0).abs() < 1e-4);
        assert!((r.height - 10.0).abs() < 1e-4);
    }
}
