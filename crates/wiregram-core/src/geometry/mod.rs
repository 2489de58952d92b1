//! Geometry kernel: immutable points, lines, rectangles and polygons.
//!
//! Every operation returns a new value. Angles are in radians and grow
//! clockwise on screen (y axis pointing down).

mod line;
mod point;
mod polygon;
mod rectangle;

pub use line::Line;
pub use point::{Point, Size};
pub use polygon::Polygon;
pub use rectangle::Rectangle;

use kurbo::{CubicBez, ParamCurve, ParamCurveArclen, QuadBez};
use std::f64::consts::TAU;

/// Arc-length step used when a bezier is approximated by a polyline.
pub const BEZIER_SAMPLE_STEP: f64 = 5.0;

/// Accuracy passed to kurbo when measuring curve length.
const ARCLEN_ACCURACY: f64 = 0.1;

/// Upper bound on the segments of any sampled curve.
pub const MAX_CURVE_SAMPLES: usize = 4096;

/// Wrap an angle into `[0, 2pi)` without quantizing it.
pub fn wrap_angle(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(TAU);
    if wrapped >= TAU { 0.0 } else { wrapped }
}

/// Map any angle into `[0, 2pi)`, quantized to a tenth of a degree.
///
/// The quantization makes repeated snapping idempotent:
/// `normalize_angle(normalize_angle(a)) == normalize_angle(a)`.
pub fn normalize_angle(angle: f64) -> f64 {
    if !angle.is_finite() {
        return 0.0;
    }
    // Wrap whole tenths so no float error creeps in before rounding.
    let tenths = (angle.to_degrees() * 10.0).round().rem_euclid(3600.0);
    let radians = (tenths / 10.0).to_radians();
    if radians >= TAU { 0.0 } else { radians }
}

/// Snap `angle` to the nearest multiple of `snap_angle` if it lies within
/// half of `threshold` of it. Returns `None` when no snap applies.
pub fn snapped_angle(angle: f64, snap_angle: f64, threshold: f64) -> Option<f64> {
    if snap_angle <= 0.0 {
        return None;
    }
    let nearest = (angle / snap_angle).round() * snap_angle;
    if (angle - nearest).abs() <= threshold / 2.0 {
        Some(normalize_angle(nearest))
    } else {
        None
    }
}

/// Whether `point` lies on the segment `a`-`b`, widened by `thickness` on
/// every side.
pub fn point_in_segment(point: Point, a: Point, b: Point, thickness: f64) -> bool {
    let length = a.distance_to(b);
    let local = point.rotated(-a.angle_to(b), a);
    local.x >= a.x - thickness
        && local.x <= a.x + length + thickness
        && (local.y - a.y).abs() <= thickness
}

/// Whether `point` lies inside the ellipse centered at `center`.
pub fn point_in_ellipse(point: Point, center: Point, radius_x: f64, radius_y: f64) -> bool {
    if radius_x <= 0.0 || radius_y <= 0.0 {
        return false;
    }
    let dx = (point.x - center.x) / radius_x;
    let dy = (point.y - center.y) / radius_y;
    dx * dx + dy * dy <= 1.0
}

/// Sample a quadratic (`control2 == None`) or cubic bezier into a polyline
/// with roughly `step` units of arc length between samples.
pub fn bezier_polyline(
    start: Point,
    control1: Point,
    control2: Option<Point>,
    end: Point,
    step: f64,
) -> Vec<Point> {
    let eval: Box<dyn Fn(f64) -> Point> = match control2 {
        Some(control2) => {
            let curve = CubicBez::new(start, control1, control2, end);
            Box::new(move |t| curve.eval(t).into())
        }
        None => {
            let curve = QuadBez::new(start, control1, end);
            Box::new(move |t| curve.eval(t).into())
        }
    };
    let length = match control2 {
        Some(control2) => CubicBez::new(start, control1, control2, end).arclen(ARCLEN_ACCURACY),
        None => QuadBez::new(start, control1, end).arclen(ARCLEN_ACCURACY),
    };
    let steps = ((length / step.max(f64::EPSILON)).ceil() as usize).clamp(1, MAX_CURVE_SAMPLES);
    (0..=steps)
        .map(|i| eval(i as f64 / steps as f64))
        .collect()
}

/// Approximate containment test for a bezier curve widened by `thickness`.
///
/// The curve is sampled at [`BEZIER_SAMPLE_STEP`] arc-length intervals and
/// each chord is tested with [`point_in_segment`].
pub fn point_in_bezier(
    point: Point,
    start: Point,
    control1: Point,
    control2: Option<Point>,
    end: Point,
    thickness: f64,
) -> bool {
    bezier_polyline(start, control1, control2, end, BEZIER_SAMPLE_STEP)
        .windows(2)
        .any(|w| point_in_segment(point, w[0], w[1], thickness))
}

/// Geometry that can be mapped through translate/rotate/scale operations.
pub trait Transformable: Sized {
    fn translated(&self, dx: f64, dy: f64) -> Self;
    fn rotated(&self, angle: f64, center: Point) -> Self;
    fn scaled(&self, sx: f64, sy: f64, center: Point) -> Self;
}

impl Transformable for Point {
    fn translated(&self, dx: f64, dy: f64) -> Self {
        Point::translated(self, dx, dy)
    }

    fn rotated(&self, angle: f64, center: Point) -> Self {
        Point::rotated(self, angle, center)
    }

    fn scaled(&self, sx: f64, sy: f64, center: Point) -> Self {
        Point::scaled(self, sx, sy, center)
    }
}

impl Transformable for Polygon {
    fn translated(&self, dx: f64, dy: f64) -> Self {
        Polygon::translated(self, dx, dy)
    }

    fn rotated(&self, angle: f64, center: Point) -> Self {
        Polygon::rotated(self, angle, center)
    }

    fn scaled(&self, sx: f64, sy: f64, center: Point) -> Self {
        Polygon::scaled(self, sx, sy, center)
    }
}

impl Transformable for Line {
    fn translated(&self, dx: f64, dy: f64) -> Self {
        Line::translated(self, dx, dy)
    }

    fn rotated(&self, angle: f64, center: Point) -> Self {
        Line::rotated(self, angle, center)
    }

    fn scaled(&self, sx: f64, sy: f64, center: Point) -> Self {
        Line::scaled(self, sx, sy, center)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_normalize_angle_range() {
        for a in [-10.0 * PI, -PI, -0.001, 0.0, 0.5, PI, TAU, TAU - 1e-9, 7.0 * PI, 1e6] {
            let n = normalize_angle(a);
            assert!((0.0..TAU).contains(&n), "{a} -> {n}");
        }
    }

    #[test]
    fn test_normalize_angle_idempotent() {
        for a in [-3.7, -0.2, 0.0, 1.234_567, 4.0, 6.28, 100.0] {
            let n = normalize_angle(a);
            assert_eq!(normalize_angle(n), n);
        }
    }

    #[test]
    fn test_normalize_negative_angles_idempotent() {
        for step in 1..=3600 {
            let a = -(step as f64) * 0.001_7;
            let n = normalize_angle(a);
            assert_eq!(normalize_angle(n), n, "{a}");
            assert!((0.0..TAU).contains(&n), "{a} -> {n}");
        }
    }

    #[test]
    fn test_normalize_angle_quantizes() {
        let n = normalize_angle(10.04_f64.to_radians());
        assert!((n - 10.0_f64.to_radians()).abs() < 1e-12);
        assert_eq!(normalize_angle(-90.0_f64.to_radians()), 270.0_f64.to_radians());
    }

    #[test]
    fn test_snapped_angle() {
        let snap = 45.0_f64.to_radians();
        let threshold = 10.0_f64.to_radians();
        let snapped = snapped_angle(44.0_f64.to_radians(), snap, threshold).unwrap();
        assert!((snapped - 45.0_f64.to_radians()).abs() < 1e-9);
        assert_eq!(snapped_angle(20.0_f64.to_radians(), snap, threshold), None);
    }

    #[test]
    fn test_snapped_angle_wraps_to_zero() {
        let snapped = snapped_angle(358.0_f64.to_radians(), 90.0_f64.to_radians(), 10.0_f64.to_radians());
        assert_eq!(snapped, Some(0.0));
    }

    #[test]
    fn test_point_in_segment() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(100.0, 100.0);
        assert!(point_in_segment(Point::new(50.0, 52.0), a, b, 2.0));
        assert!(!point_in_segment(Point::new(50.0, 60.0), a, b, 2.0));
        assert!(!point_in_segment(Point::new(110.0, 110.0), a, b, 2.0));
        assert!(point_in_segment(Point::new(-1.0, -1.0), a, b, 2.0));
    }

    #[test]
    fn test_point_in_bezier() {
        let start = Point::new(0.0, 0.0);
        let end = Point::new(100.0, 0.0);
        let control = Point::new(50.0, 100.0);
        // The quadratic peaks at y = 50 for t = 0.5.
        assert!(point_in_bezier(Point::new(50.0, 50.0), start, control, None, end, 2.0));
        assert!(!point_in_bezier(Point::new(50.0, 10.0), start, control, None, end, 2.0));
    }

    #[test]
    fn test_bezier_polyline_step() {
        let pts = bezier_polyline(
            Point::new(0.0, 0.0),
            Point::new(30.0, 0.0),
            Some(Point::new(70.0, 0.0)),
            Point::new(100.0, 0.0),
            BEZIER_SAMPLE_STEP,
        );
        assert!((21..=22).contains(&pts.len()));
        assert_eq!(*pts.last().unwrap(), Point::new(100.0, 0.0));

        let huge = bezier_polyline(
            Point::new(0.0, 0.0),
            Point::new(1e12, 1e12),
            None,
            Point::new(2e12, 0.0),
            1.0,
        );
        assert_eq!(huge.len(), MAX_CURVE_SAMPLES + 1);
    }

    #[test]
    fn test_point_in_ellipse() {
        assert!(point_in_ellipse(Point::new(9.0, 0.0), Point::ZERO, 10.0, 5.0));
        assert!(!point_in_ellipse(Point::new(0.0, 6.0), Point::ZERO, 10.0, 5.0));
    }
}
