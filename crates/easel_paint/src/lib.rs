//! Easel Paint
//!
//! Leaf value types shared by the drawing engine and its backends.
//!
//! # Features
//!
//! - Geometry primitives (point, size, rect)
//! - RGBA colors with the CSS named color table
//! - 2D affine transforms
//! - Stroke and text style values
//! - Parsers for script-supplied paint, keyword and font strings

pub mod color;
pub mod parse;
pub mod primitives;
pub mod style;
pub mod transform;

pub use color::Color;
pub use primitives::{Point, Rect, Size};
pub use style::{Font, FontStyle, FontWeight, LineCap, LineJoin, Pen, TextAlign, TextBaseline};
pub use transform::Affine2D;
