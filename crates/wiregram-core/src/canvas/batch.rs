//! Pending path operations awaiting a paint call.

use crate::geometry::{MAX_CURVE_SAMPLES, Point, Polygon, Rectangle, bezier_polyline};
use crate::transform::TransformSet;

use super::Surface;

/// Arc-length step used when sampling curves for dash emulation.
const DASH_SAMPLE_STEP: f64 = 1.0;

/// One queued path primitive, in the coordinates of the transform set it
/// will be painted with.
#[derive(Debug, Clone, PartialEq)]
pub enum PathOp {
    Line {
        from: Point,
        to: Point,
    },
    Poly {
        points: Vec<Point>,
        closed: bool,
    },
    Arc {
        center: Point,
        radius_x: f64,
        radius_y: f64,
        start_angle: f64,
        end_angle: f64,
        anticlockwise: bool,
    },
    Bezier {
        start: Point,
        control1: Point,
        control2: Option<Point>,
        end: Point,
    },
}

impl PathOp {
    /// First point of the primitive.
    pub fn start(&self) -> Option<Point> {
        match self {
            PathOp::Line { from, .. } => Some(*from),
            PathOp::Poly { points, .. } => points.first().copied(),
            PathOp::Arc {
                center,
                radius_x,
                radius_y,
                start_angle,
                ..
            } => Some(ellipse_point(*center, *radius_x, *radius_y, *start_angle)),
            PathOp::Bezier { start, .. } => Some(*start),
        }
    }

    /// The primitive flattened into a polyline, walked in drawing order.
    pub fn polyline(&self) -> Vec<Point> {
        match self {
            PathOp::Line { from, to } => vec![*from, *to],
            PathOp::Poly { points, closed } => {
                let mut pts = points.clone();
                if *closed && points.len() > 2 {
                    pts.push(points[0]);
                }
                pts
            }
            PathOp::Arc {
                center,
                radius_x,
                radius_y,
                start_angle,
                end_angle,
                anticlockwise,
            } => {
                let sweep = arc_sweep(*start_angle, *end_angle, *anticlockwise);
                let radius = radius_x.max(*radius_y);
                let steps = ((sweep.abs() * radius / DASH_SAMPLE_STEP).ceil() as usize).clamp(8, MAX_CURVE_SAMPLES);
                (0..=steps)
                    .map(|i| {
                        let angle = start_angle + sweep * i as f64 / steps as f64;
                        ellipse_point(*center, *radius_x, *radius_y, angle)
                    })
                    .collect()
            }
            PathOp::Bezier {
                start,
                control1,
                control2,
                end,
            } => bezier_polyline(*start, *control1, *control2, *end, DASH_SAMPLE_STEP),
        }
    }

    /// Rough extent, used to place default gradients.
    pub fn bounds(&self) -> Rectangle {
        match self {
            PathOp::Line { from, to } => Rectangle::from_points(*from, *to),
            PathOp::Poly { points, .. } => Polygon::new(points.clone()).bounding_rectangle(),
            PathOp::Arc {
                center,
                radius_x,
                radius_y,
                ..
            } => Rectangle::new(
                center.x - radius_x,
                center.y - radius_y,
                center.x + radius_x,
                center.y + radius_y,
            ),
            PathOp::Bezier {
                start,
                control1,
                control2,
                end,
            } => {
                let mut pts = vec![*start, *control1, *end];
                pts.extend(control2.iter().copied());
                Polygon::new(pts).bounding_rectangle()
            }
        }
    }

    /// Issue the primitive as regular path calls.
    pub(crate) fn replay(&self, surface: &mut dyn Surface) {
        match self {
            PathOp::Line { from, to } => {
                surface.move_to(*from);
                surface.line_to(*to);
            }
            PathOp::Poly { points, closed } => {
                let Some((first, rest)) = points.split_first() else {
                    return;
                };
                surface.move_to(*first);
                for p in rest {
                    surface.line_to(*p);
                }
                if *closed {
                    surface.close_path();
                }
            }
            PathOp::Arc {
                center,
                radius_x,
                radius_y,
                start_angle,
                end_angle,
                anticlockwise,
            } => {
                surface.move_to(ellipse_point(*center, *radius_x, *radius_y, *start_angle));
                surface.ellipse(
                    *center,
                    *radius_x,
                    *radius_y,
                    *start_angle,
                    *end_angle,
                    *anticlockwise,
                );
            }
            PathOp::Bezier {
                start,
                control1,
                control2,
                end,
            } => {
                surface.move_to(*start);
                match control2 {
                    Some(control2) => surface.bezier_curve_to(*control1, *control2, *end),
                    None => surface.quadratic_curve_to(*control1, *end),
                }
            }
        }
    }

    /// The same primitive with every defining point snapped to whole
    /// pixels in the space `transform` maps into.
    pub(crate) fn rounded(&self, transform: &TransformSet) -> PathOp {
        let r = |p: &Point| transform.round_point(*p);
        match self {
            PathOp::Line { from, to } => PathOp::Line {
                from: r(from),
                to: r(to),
            },
            PathOp::Poly { points, closed } => PathOp::Poly {
                points: points.iter().map(r).collect(),
                closed: *closed,
            },
            PathOp::Arc {
                center,
                radius_x,
                radius_y,
                start_angle,
                end_angle,
                anticlockwise,
            } => PathOp::Arc {
                center: r(center),
                radius_x: *radius_x,
                radius_y: *radius_y,
                start_angle: *start_angle,
                end_angle: *end_angle,
                anticlockwise: *anticlockwise,
            },
            PathOp::Bezier {
                start,
                control1,
                control2,
                end,
            } => PathOp::Bezier {
                start: r(start),
                control1: r(control1),
                control2: control2.as_ref().map(r),
                end: r(end),
            },
        }
    }
}

fn ellipse_point(center: Point, radius_x: f64, radius_y: f64, angle: f64) -> Point {
    Point::new(
        center.x + radius_x * angle.cos(),
        center.y + radius_y * angle.sin(),
    )
}

/// Signed sweep from `start` to `end`, following canvas arc semantics.
fn arc_sweep(start: f64, end: f64, anticlockwise: bool) -> f64 {
    use std::f64::consts::TAU;
    let delta = end - start;
    if anticlockwise {
        if delta <= -TAU {
            -TAU
        } else {
            -((-delta).rem_euclid(TAU))
        }
    } else if delta >= TAU {
        TAU
    } else {
        delta.rem_euclid(TAU)
    }
}

/// The primitives queued between two paint calls.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PathBatch {
    ops: Vec<PathOp>,
}

impl PathBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ops(&self) -> &[PathOp] {
        &self.ops
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn push(&mut self, op: PathOp) {
        self.ops.push(op);
    }

    pub fn line(&mut self, from: Point, to: Point) {
        self.push(PathOp::Line { from, to });
    }

    pub fn poly(&mut self, poly: &Polygon, closed: bool) {
        if poly.is_empty() {
            return;
        }
        self.push(PathOp::Poly {
            points: poly.points.clone(),
            closed,
        });
    }

    pub fn arc(
        &mut self,
        center: Point,
        radius_x: f64,
        radius_y: f64,
        start_angle: f64,
        end_angle: f64,
        anticlockwise: bool,
    ) {
        self.push(PathOp::Arc {
            center,
            radius_x,
            radius_y,
            start_angle,
            end_angle,
            anticlockwise,
        });
    }

    pub fn bezier(&mut self, start: Point, control1: Point, control2: Option<Point>, end: Point) {
        self.push(PathOp::Bezier {
            start,
            control1,
            control2,
            end,
        });
    }

    /// Union of the extents of all queued primitives.
    pub fn bounds(&self) -> Rectangle {
        let mut iter = self.ops.iter().map(PathOp::bounds);
        let Some(first) = iter.next() else {
            return Rectangle::ZERO;
        };
        iter.fold(first, |acc, r| acc.union(&r))
    }

    pub(crate) fn into_ops(self) -> Vec<PathOp> {
        self.ops
    }
}
