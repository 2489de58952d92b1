//! Polygons as ordered vertex lists.

use serde::{Deserialize, Serialize};

use super::{Point, Rectangle, point_in_segment};

/// An ordered list of vertices.
///
/// The same type is used for closed polygons and open polylines; callers
/// decide whether the last vertex connects back to the first.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Polygon {
    pub points: Vec<Point>,
}

impl Polygon {
    pub fn new(points: Vec<Point>) -> Self {
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Even-odd ray casting over successive vertex pairs.
    pub fn contains_point(&self, p: Point) -> bool {
        let n = self.points.len();
        if n < 3 {
            return false;
        }
        let mut inside = false;
        let mut j = n - 1;
        for i in 0..n {
            let a = self.points[i];
            let b = self.points[j];
            if (a.y > p.y) != (b.y > p.y) && p.x < (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x {
                inside = !inside;
            }
            j = i;
        }
        inside
    }

    /// Whether `p` lies within `thickness` of any edge.
    pub fn contains_on_edge(&self, p: Point, thickness: f64, closed: bool) -> bool {
        self.edges(closed)
            .any(|(a, b)| point_in_segment(p, a, b, thickness))
    }

    /// Successive vertex pairs; with `closed`, the last vertex connects back
    /// to the first.
    pub fn edges(&self, closed: bool) -> impl Iterator<Item = (Point, Point)> + '_ {
        let n = self.points.len();
        let count = if closed && n > 2 { n } else { n.saturating_sub(1) };
        (0..count).map(move |i| (self.points[i], self.points[(i + 1) % n]))
    }

    /// Min/max extent of all vertices; `Rectangle::ZERO` when empty.
    pub fn bounding_rectangle(&self) -> Rectangle {
        let Some(first) = self.points.first() else {
            return Rectangle::ZERO;
        };
        let (mut x1, mut y1, mut x2, mut y2) = (first.x, first.y, first.x, first.y);
        for p in &self.points[1..] {
            x1 = x1.min(p.x);
            y1 = y1.min(p.y);
            x2 = x2.max(p.x);
            y2 = y2.max(p.y);
        }
        Rectangle::new(x1, y1, x2, y2)
    }

    /// Center of the bounding rectangle.
    pub fn center(&self) -> Point {
        self.bounding_rectangle().center()
    }

    pub fn translated(&self, dx: f64, dy: f64) -> Self {
        Self::new(self.points.iter().map(|p| p.translated(dx, dy)).collect())
    }

    pub fn rotated(&self, angle: f64, center: Point) -> Self {
        Self::new(self.points.iter().map(|p| p.rotated(angle, center)).collect())
    }

    pub fn scaled(&self, sx: f64, sy: f64, center: Point) -> Self {
        Self::new(self.points.iter().map(|p| p.scaled(sx, sy, center)).collect())
    }

    /// Total length of the edges.
    pub fn perimeter(&self, closed: bool) -> f64 {
        self.edges(closed).map(|(a, b)| a.distance_to(b)).sum()
    }
}
