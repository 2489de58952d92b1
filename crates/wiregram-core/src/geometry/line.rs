//! Infinite lines in slope/intercept form.

use serde::{Deserialize, Serialize};

use super::Point;

const EPSILON: f64 = 1e-9;

/// A line `y = slope * x + intercept`.
///
/// A slope of `f64::INFINITY` denotes a vertical line, in which case
/// `intercept` is the x-intercept.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Line {
    pub slope: f64,
    pub intercept: f64,
}

impl Line {
    pub fn new(slope: f64, intercept: f64) -> Self {
        if slope.is_infinite() {
            Self::vertical(intercept)
        } else {
            Self { slope, intercept }
        }
    }

    /// A vertical line through `x`.
    pub fn vertical(x: f64) -> Self {
        Self {
            slope: f64::INFINITY,
            intercept: x,
        }
    }

    /// The line through two points. Coincident points yield a horizontal
    /// line through them.
    pub fn from_points(a: Point, b: Point) -> Self {
        let dx = b.x - a.x;
        if dx.abs() < EPSILON {
            if (b.y - a.y).abs() < EPSILON {
                return Self::new(0.0, a.y);
            }
            return Self::vertical(a.x);
        }
        let slope = (b.y - a.y) / dx;
        Self::new(slope, a.y - slope * a.x)
    }

    /// The line through `point` with direction `angle`.
    pub fn from_point_and_angle(point: Point, angle: f64) -> Self {
        let (sin, cos) = angle.sin_cos();
        if cos.abs() < EPSILON {
            return Self::vertical(point.x);
        }
        let slope = sin / cos;
        Self::new(slope, point.y - slope * point.x)
    }

    pub fn is_vertical(&self) -> bool {
        self.slope.is_infinite()
    }

    pub fn is_horizontal(&self) -> bool {
        self.slope == 0.0
    }

    /// Direction angle in `[0, pi)`.
    pub fn angle(&self) -> f64 {
        if self.is_vertical() {
            std::f64::consts::FRAC_PI_2
        } else {
            self.slope.atan().rem_euclid(std::f64::consts::PI)
        }
    }

    /// The y coordinate at `x`; `None` for vertical lines.
    pub fn y_at(&self, x: f64) -> Option<f64> {
        if self.is_vertical() {
            None
        } else {
            Some(self.slope * x + self.intercept)
        }
    }

    /// The x coordinate at `y`; `None` for horizontal lines.
    pub fn x_at(&self, y: f64) -> Option<f64> {
        if self.is_vertical() {
            Some(self.intercept)
        } else if self.slope == 0.0 {
            None
        } else {
            Some((y - self.intercept) / self.slope)
        }
    }

    /// Some point on the line.
    pub fn some_point(&self) -> Point {
        if self.is_vertical() {
            Point::new(self.intercept, 0.0)
        } else {
            Point::new(0.0, self.intercept)
        }
    }

    pub fn translated(&self, dx: f64, dy: f64) -> Self {
        if self.is_vertical() {
            Self::vertical(self.intercept + dx)
        } else {
            Self::new(self.slope, self.intercept + dy - self.slope * dx)
        }
    }

    /// Rotate by `angle` around `center`.
    pub fn rotated(&self, angle: f64, center: Point) -> Self {
        if angle == 0.0 {
            return *self;
        }
        let through = self.some_point().rotated(angle, center);
        Self::from_point_and_angle(through, self.angle() + angle)
    }

    /// Scale relative to `center`.
    pub fn scaled(&self, sx: f64, sy: f64, center: Point) -> Self {
        let through = self.some_point().scaled(sx, sy, center);
        if self.is_vertical() || sx == 0.0 {
            return Self::vertical(through.x);
        }
        let slope = self.slope * sy / sx;
        Self::new(slope, through.y - slope * through.x)
    }

    /// Intersection point; `None` for parallel or coincident lines.
    pub fn intersection(&self, other: &Line) -> Option<Point> {
        match (self.is_vertical(), other.is_vertical()) {
            (true, true) => None,
            (true, false) => Some(Point::new(
                self.intercept,
                other.slope * self.intercept + other.intercept,
            )),
            (false, true) => Some(Point::new(
                other.intercept,
                self.slope * other.intercept + self.intercept,
            )),
            (false, false) => {
                if (self.slope - other.slope).abs() < EPSILON {
                    return None;
                }
                if self.is_horizontal() {
                    let x = (self.intercept - other.intercept) / other.slope;
                    return Some(Point::new(x, self.intercept));
                }
                if other.is_horizontal() {
                    let x = (other.intercept - self.intercept) / self.slope;
                    return Some(Point::new(x, other.intercept));
                }
                let x = (other.intercept - self.intercept) / (self.slope - other.slope);
                Some(Point::new(x, self.slope * x + self.intercept))
            }
        }
    }

    /// The perpendicular line through `point`.
    pub fn perpendicular_through(&self, point: Point) -> Self {
        if self.is_vertical() {
            Self::new(0.0, point.y)
        } else if self.slope == 0.0 {
            Self::vertical(point.x)
        } else {
            let slope = -1.0 / self.slope;
            Self::new(slope, point.y - slope * point.x)
        }
    }

    /// Distance from a point to the line.
    pub fn distance_to(&self, point: Point) -> f64 {
        if self.is_vertical() {
            (point.x - self.intercept).abs()
        } else {
            (self.slope * point.x - point.y + self.intercept).abs() / self.slope.hypot(1.0)
        }
    }

    /// Whether `point` lies within `tolerance` of the line.
    pub fn contains_point(&self, point: Point, tolerance: f64) -> bool {
        self.distance_to(point) <= tolerance
    }
}
