//! Sockets: attachment points connector end points snap to.

use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::control::ControlPointRef;
use crate::geometry::{Point, Rectangle};
use crate::scene::{DrawingElement, ElementId};

/// How a socket's anchor is derived from its element, in local coordinates.
#[derive(Clone)]
pub enum SocketAnchor {
    Fixed(Point),
    /// Fractions of the local bounds: `(0, 0)` is the top left corner and
    /// `(1, 1)` the bottom right.
    Proportional { fx: f64, fy: f64 },
    Custom(Rc<dyn Fn(&DrawingElement, Rectangle) -> Point>),
}

impl fmt::Debug for SocketAnchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SocketAnchor::Fixed(p) => f.debug_tuple("Fixed").field(p).finish(),
            SocketAnchor::Proportional { fx, fy } => f
                .debug_struct("Proportional")
                .field("fx", fx)
                .field("fy", fy)
                .finish(),
            SocketAnchor::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

impl SocketAnchor {
    pub fn compute(&self, element: &DrawingElement, bounds: Rectangle) -> Point {
        match self {
            SocketAnchor::Fixed(p) => *p,
            SocketAnchor::Proportional { fx, fy } => Point::new(
                bounds.x1 + bounds.width() * fx,
                bounds.y1 + bounds.height() * fy,
            ),
            SocketAnchor::Custom(f) => f(element, bounds),
        }
    }
}

/// Names one socket of one element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SocketRef {
    pub element: ElementId,
    pub index: usize,
}

impl SocketRef {
    pub fn new(element: ElementId, index: usize) -> Self {
        Self { element, index }
    }
}

#[derive(Debug, Clone)]
pub struct Socket {
    pub name: String,
    pub anchor_fn: SocketAnchor,
    /// Cached anchor, parent coordinates of the owning element.
    anchor: Option<Point>,
    /// Connected end points, in connection order.
    pub(crate) end_points: Vec<ControlPointRef>,
}

impl Socket {
    pub fn new(name: impl Into<String>, anchor_fn: SocketAnchor) -> Self {
        Self {
            name: name.into(),
            anchor_fn,
            anchor: None,
            end_points: Vec::new(),
        }
    }

    /// A socket at a fraction of the element's bounds.
    pub fn proportional(name: impl Into<String>, fx: f64, fy: f64) -> Self {
        Self::new(name, SocketAnchor::Proportional { fx, fy })
    }

    /// The four edge midpoints, named `top`, `right`, `bottom` and `left`.
    pub fn edge_midpoints() -> Vec<Socket> {
        vec![
            Self::proportional("top", 0.5, 0.0),
            Self::proportional("right", 1.0, 0.5),
            Self::proportional("bottom", 0.5, 1.0),
            Self::proportional("left", 0.0, 0.5),
        ]
    }

    pub fn cached_anchor(&self) -> Option<Point> {
        self.anchor
    }

    pub(crate) fn set_anchor(&mut self, anchor: Point) {
        self.anchor = Some(anchor);
    }

    pub fn invalidate_anchor(&mut self) {
        self.anchor = None;
    }

    pub fn end_points(&self) -> &[ControlPointRef] {
        &self.end_points
    }

    pub fn is_connected(&self) -> bool {
        !self.end_points.is_empty()
    }
}
