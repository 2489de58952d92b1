//! Point and size value types.

use serde::{Deserialize, Serialize};

use super::wrap_angle;

/// A point in some coordinate space.
///
/// Points are plain values: every operation returns a new point and leaves
/// the receiver untouched.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    /// The origin.
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    /// Create a new point.
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Translate by a delta.
    pub fn translated(&self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    /// Rotate by `angle` radians around `center`.
    ///
    /// A zero angle returns an equal copy.
    pub fn rotated(&self, angle: f64, center: Point) -> Self {
        if angle == 0.0 {
            return *self;
        }
        let (sin, cos) = angle.sin_cos();
        let dx = self.x - center.x;
        let dy = self.y - center.y;
        Self::new(
            center.x + dx * cos - dy * sin,
            center.y + dx * sin + dy * cos,
        )
    }

    /// Scale relative to `center`.
    pub fn scaled(&self, sx: f64, sy: f64, center: Point) -> Self {
        Self::new(
            center.x + (self.x - center.x) * sx,
            center.y + (self.y - center.y) * sy,
        )
    }

    /// Component-wise sum.
    pub fn plus(&self, other: Point) -> Self {
        Self::new(self.x + other.x, self.y + other.y)
    }

    /// Component-wise difference.
    pub fn minus(&self, other: Point) -> Self {
        Self::new(self.x - other.x, self.y - other.y)
    }

    /// Euclidean distance to another point.
    pub fn distance_to(&self, other: Point) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    /// Direction angle from this point towards `other`, normalized to `[0, 2pi)`.
    pub fn angle_to(&self, other: Point) -> f64 {
        wrap_angle((other.y - self.y).atan2(other.x - self.x))
    }

    /// The point at `distance` from this one in direction `angle`.
    pub fn point_at(&self, angle: f64, distance: f64) -> Self {
        let (sin, cos) = angle.sin_cos();
        Self::new(self.x + distance * cos, self.y + distance * sin)
    }

    /// Midpoint between two points.
    pub fn midpoint(&self, other: Point) -> Self {
        Self::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }

    /// Round both coordinates to the nearest integer.
    pub fn rounded(&self) -> Self {
        Self::new(self.x.round(), self.y.round())
    }

    /// Approximate equality with an absolute tolerance.
    pub fn approx_eq(&self, other: Point, tolerance: f64) -> bool {
        (self.x - other.x).abs() <= tolerance && (self.y - other.y).abs() <= tolerance
    }
}

impl From<Point> for kurbo::Point {
    fn from(p: Point) -> Self {
        kurbo::Point::new(p.x, p.y)
    }
}

impl From<kurbo::Point> for Point {
    fn from(p: kurbo::Point) -> Self {
        Point::new(p.x, p.y)
    }
}

/// A width/height pair.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const ZERO: Size = Size {
        width: 0.0,
        height: 0.0,
    };

    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Scale both dimensions.
    pub fn scaled(&self, sx: f64, sy: f64) -> Self {
        Self::new(self.width * sx, self.height * sy)
    }

    /// Whether either dimension is zero.
    pub fn is_empty(&self) -> bool {
        self.width == 0.0 || self.height == 0.0
    }
}
