//! Pure page-geometry math shared by the modification handlers.
//!
//! All computations are in f64. Angles are in degrees with a
//! clockwise-positive convention (a positive angle turns page content the way
//! a reader would turn a physical sheet to the right).

use serde::{Deserialize, Serialize};

/// Width and height of a page box, in PDF points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// An axis-aligned rectangle anchored at its lower-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn size(&self) -> Size {
        Size {
            width: self.width,
            height: self.height,
        }
    }

    pub fn center(&self) -> Point {
        Point {
            x: self.x + self.width / 2.0,
            y: self.y + self.height / 2.0,
        }
    }
}

/// Result of fitting one size into another, see [`scale_ratio`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleRatio {
    pub ratio: f64,
    pub translate_x: f64,
    pub translate_y: f64,
}

/// Uniform scale factor that fits `original` into `target` without
/// distorting it, plus the per-axis offsets that center the scaled
/// `original` within `target`.
pub fn scale_ratio(original: Size, target: Size) -> ScaleRatio {
    let ratio = (target.width / original.width).min(target.height / original.height);
    ScaleRatio {
        ratio,
        translate_x: (target.width - original.width * ratio) / 2.0,
        translate_y: (target.height - original.height * ratio) / 2.0,
    }
}

/// Rotate `p` about `center` by `degrees`, clockwise positive.
///
/// The standard rotation matrix is counterclockwise for positive angles, so
/// the angle is negated before converting to radians.
pub fn rotate_point(p: Point, center: Point, degrees: f64) -> Point {
    let radians = (-degrees).to_radians();
    let dx = p.x - center.x;
    let dy = p.y - center.y;
    Point {
        x: center.x + dx * radians.cos() - dy * radians.sin(),
        y: center.y + dx * radians.sin() + dy * radians.cos(),
    }
}

/// The four corners of `rect` rotated by `degrees` about the rectangle's own
/// center, in lower-left, lower-right, upper-right, upper-left order.
pub fn rotate_rectangle(rect: Rect, degrees: f64) -> [Point; 4] {
    let center = rect.center();
    [
        rotate_point(Point { x: rect.x, y: rect.y }, center, degrees),
        rotate_point(
            Point {
                x: rect.x + rect.width,
                y: rect.y,
            },
            center,
            degrees,
        ),
        rotate_point(
            Point {
                x: rect.x + rect.width,
                y: rect.y + rect.height,
            },
            center,
            degrees,
        ),
        rotate_point(
            Point {
                x: rect.x,
                y: rect.y + rect.height,
            },
            center,
            degrees,
        ),
    ]
}

/// Axis-aligned bounding box spanning the min/max x and y of `points`.
/// `points` must be non-empty.
pub fn bounding_box(points: &[Point]) -> Rect {
    let mut min_x = f64::INFINITY;
    let mut min_y = f64::INFINITY;
    let mut max_x = f64::NEG_INFINITY;
    let mut max_y = f64::NEG_INFINITY;
    for p in points {
        min_x = min_x.min(p.x);
        min_y = min_y.min(p.y);
        max_x = max_x.max(p.x);
        max_y = max_y.max(p.y);
    }
    Rect {
        x: min_x,
        y: min_y,
        width: max_x - min_x,
        height: max_y - min_y,
    }
}
