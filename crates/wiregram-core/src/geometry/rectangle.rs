//! Axis-aligned rectangle.

use serde::{Deserialize, Serialize};

use super::{Point, Polygon, Size};

/// An axis-aligned rectangle with `x1 <= x2` and `y1 <= y2`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rectangle {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl Rectangle {
    /// Sentinel returned for degenerate input (empty point sets and such).
    pub const ZERO: Rectangle = Rectangle {
        x1: 0.0,
        y1: 0.0,
        x2: 0.0,
        y2: 0.0,
    };

    /// Create a rectangle, normalizing the min/max ordering.
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self {
            x1: x1.min(x2),
            y1: y1.min(y2),
            x2: x1.max(x2),
            y2: y1.max(y2),
        }
    }

    /// Create a rectangle from two opposite corners.
    pub fn from_points(a: Point, b: Point) -> Self {
        Self::new(a.x, a.y, b.x, b.y)
    }

    /// Create a rectangle of `size` centered on `center`.
    pub fn from_center(center: Point, size: Size) -> Self {
        let hw = size.width / 2.0;
        let hh = size.height / 2.0;
        Self::new(center.x - hw, center.y - hh, center.x + hw, center.y + hh)
    }

    pub fn width(&self) -> f64 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> f64 {
        self.y2 - self.y1
    }

    pub fn size(&self) -> Size {
        Size::new(self.width(), self.height())
    }

    pub fn center(&self) -> Point {
        Point::new((self.x1 + self.x2) / 2.0, (self.y1 + self.y2) / 2.0)
    }

    pub fn top_left(&self) -> Point {
        Point::new(self.x1, self.y1)
    }

    pub fn top_right(&self) -> Point {
        Point::new(self.x2, self.y1)
    }

    pub fn bottom_right(&self) -> Point {
        Point::new(self.x2, self.y2)
    }

    pub fn bottom_left(&self) -> Point {
        Point::new(self.x1, self.y2)
    }

    pub fn top_center(&self) -> Point {
        Point::new((self.x1 + self.x2) / 2.0, self.y1)
    }

    pub fn bottom_center(&self) -> Point {
        Point::new((self.x1 + self.x2) / 2.0, self.y2)
    }

    pub fn left_center(&self) -> Point {
        Point::new(self.x1, (self.y1 + self.y2) / 2.0)
    }

    pub fn right_center(&self) -> Point {
        Point::new(self.x2, (self.y1 + self.y2) / 2.0)
    }

    /// The four corners in clockwise order: top-left, top-right,
    /// bottom-right, bottom-left.
    pub fn poly(&self) -> Polygon {
        Polygon::new(vec![
            self.top_left(),
            self.top_right(),
            self.bottom_right(),
            self.bottom_left(),
        ])
    }

    pub fn translated(&self, dx: f64, dy: f64) -> Self {
        Self::new(self.x1 + dx, self.y1 + dy, self.x2 + dx, self.y2 + dy)
    }

    /// Scale relative to `center`. Negative factors are normalized away.
    pub fn scaled(&self, sx: f64, sy: f64, center: Point) -> Self {
        Self::from_points(
            self.top_left().scaled(sx, sy, center),
            self.bottom_right().scaled(sx, sy, center),
        )
    }

    /// Grow (or shrink, for negative amounts) on every side.
    pub fn inflated(&self, dx: f64, dy: f64) -> Self {
        Self::new(self.x1 - dx, self.y1 - dy, self.x2 + dx, self.y2 + dy)
    }

    /// Smallest rectangle containing both.
    pub fn union(&self, other: &Rectangle) -> Self {
        Self::new(
            self.x1.min(other.x1),
            self.y1.min(other.y1),
            self.x2.max(other.x2),
            self.y2.max(other.y2),
        )
    }

    /// Whether the point lies inside or on the border.
    pub fn contains_point(&self, p: Point) -> bool {
        p.x >= self.x1 && p.x <= self.x2 && p.y >= self.y1 && p.y <= self.y2
    }

    pub fn intersects(&self, other: &Rectangle) -> bool {
        self.x1 <= other.x2 && other.x1 <= self.x2 && self.y1 <= other.y2 && other.y1 <= self.y2
    }

    /// Whether either dimension is zero.
    pub fn is_zero_area(&self) -> bool {
        self.width() == 0.0 || self.height() == 0.0
    }
}

impl From<Rectangle> for kurbo::Rect {
    fn from(r: Rectangle) -> Self {
        kurbo::Rect::new(r.x1, r.y1, r.x2, r.y2)
    }
}
