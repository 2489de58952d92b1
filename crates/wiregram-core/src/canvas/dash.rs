//! Software emulation of dashed strokes.

use crate::geometry::Point;

use super::Surface;

/// Runs shorter than this are treated as exhausted.
const EPSILON: f64 = 1e-9;

/// Running dash-pattern phase for one path batch.
///
/// The phase carries over from one primitive to the next within the same
/// batch, so a polyline drawn as separate lines dashes exactly like one
/// drawn as a polygon.
#[derive(Debug, Clone, PartialEq)]
pub struct DashState {
    pattern: Vec<f64>,
    index: usize,
    remaining: f64,
    position: f64,
}

impl DashState {
    /// A fresh state at phase zero. Returns `None` for patterns that would
    /// draw nothing useful (empty, negative or all-zero entries).
    pub fn new(pattern: &[f64]) -> Option<Self> {
        if pattern.is_empty()
            || pattern.iter().any(|v| *v < 0.0 || !v.is_finite())
            || pattern.iter().all(|v| *v <= EPSILON)
        {
            return None;
        }
        let mut pattern = pattern.to_vec();
        if pattern.len() % 2 == 1 {
            pattern.extend_from_within(..);
        }
        let remaining = pattern[0];
        let mut state = Self {
            pattern,
            index: 0,
            remaining,
            position: 0.0,
        };
        state.skip_empty_runs();
        Some(state)
    }

    /// Whether the pen is currently down.
    pub fn is_drawing(&self) -> bool {
        self.index % 2 == 0
    }

    /// Total arc length walked so far.
    pub fn position(&self) -> f64 {
        self.position
    }

    fn advance(&mut self) {
        self.index = (self.index + 1) % self.pattern.len();
        self.remaining = self.pattern[self.index];
    }

    fn skip_empty_runs(&mut self) {
        while self.remaining <= EPSILON {
            self.advance();
        }
    }

    /// Walk a polyline, issuing `move_to`/`line_to` calls for the visible
    /// runs only.
    pub fn stroke_polyline(&mut self, points: &[Point], surface: &mut dyn Surface) {
        let Some(first) = points.first() else {
            return;
        };
        if self.is_drawing() {
            surface.move_to(*first);
        }
        for pair in points.windows(2) {
            self.stroke_segment(pair[0], pair[1], surface);
        }
    }

    fn stroke_segment(&mut self, from: Point, to: Point, surface: &mut dyn Surface) {
        let length = from.distance_to(to);
        if length <= EPSILON {
            return;
        }
        let ux = (to.x - from.x) / length;
        let uy = (to.y - from.y) / length;
        let mut walked = 0.0;
        while length - walked > self.remaining {
            walked += self.remaining;
            let p = Point::new(from.x + ux * walked, from.y + uy * walked);
            if self.is_drawing() {
                surface.line_to(p);
            } else {
                surface.move_to(p);
            }
            self.advance();
            self.skip_empty_runs();
        }
        self.remaining -= length - walked;
        if self.is_drawing() {
            surface.line_to(to);
        }
        if self.remaining <= EPSILON {
            self.advance();
            self.skip_empty_runs();
            if self.is_drawing() {
                surface.move_to(to);
            }
        }
        self.position += length;
    }
}
