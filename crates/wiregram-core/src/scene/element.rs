//! Drawing elements: placement, kind-specific geometry, owned handles.

use std::f64::consts::TAU;
use uuid::Uuid;

use crate::connector::Socket;
use crate::control::{ActionMenuItem, ControlPoint, ControlPointKind, Handle};
use crate::geometry::{Point, Polygon, Rectangle, Size, point_in_ellipse};
use crate::style::DEFAULT_STYLE;
use crate::transform::TransformSet;

/// Unique identifier for elements.
pub type ElementId = Uuid;

/// Kind-specific geometry. Point lists are in element-local coordinates.
#[derive(Debug, Clone, PartialEq)]
pub enum ElementKind {
    Rectangle,
    Ellipse,
    Polygon { points: Vec<Point>, closed: bool },
    /// A polyline whose first and last vertices are end points.
    Connector { points: Vec<Point>, arrow: bool },
    Text { text: String },
    Image { name: String },
    /// Groups and the root. Children are ordered back to front.
    Container { children: Vec<ElementId> },
}

impl ElementKind {
    pub fn name(&self) -> &'static str {
        match self {
            ElementKind::Rectangle => "rectangle",
            ElementKind::Ellipse => "ellipse",
            ElementKind::Polygon { .. } => "polygon",
            ElementKind::Connector { .. } => "connector",
            ElementKind::Text { .. } => "text",
            ElementKind::Image { .. } => "image",
            ElementKind::Container { .. } => "container",
        }
    }
}

/// A node of the scene graph.
///
/// `location` is the element's center in parent coordinates. Local
/// coordinates are centered on the origin; mapping local -> parent scales,
/// then rotates, then translates by `location`.
#[derive(Debug, Clone)]
pub struct DrawingElement {
    pub id: ElementId,
    pub parent: Option<ElementId>,
    pub location: Point,
    /// Radians, clockwise.
    pub rotation: f64,
    pub scale_x: f64,
    pub scale_y: f64,
    /// Unscaled extent for box-shaped kinds.
    pub size: Size,
    pub kind: ElementKind,
    pub stroke_style: String,
    pub fill_style: Option<String>,
    pub text_style: String,
    pub control_points: Vec<ControlPoint>,
    pub sockets: Vec<Socket>,
}

impl DrawingElement {
    pub fn new(kind: ElementKind, location: Point, size: Size) -> Self {
        let mut element = Self {
            id: Uuid::new_v4(),
            parent: None,
            location,
            rotation: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
            size,
            kind,
            stroke_style: DEFAULT_STYLE.to_string(),
            fill_style: None,
            text_style: DEFAULT_STYLE.to_string(),
            control_points: Vec::new(),
            sockets: Vec::new(),
        };
        element.rebuild_control_points();
        element
    }

    /// A rectangle with its center at `center`.
    pub fn rectangle(center: Point, size: Size) -> Self {
        Self::new(ElementKind::Rectangle, center, size)
    }

    pub fn ellipse(center: Point, size: Size) -> Self {
        Self::new(ElementKind::Ellipse, center, size)
    }

    pub fn text(center: Point, size: Size, text: impl Into<String>) -> Self {
        Self::new(ElementKind::Text { text: text.into() }, center, size)
    }

    pub fn image(center: Point, size: Size, name: impl Into<String>) -> Self {
        Self::new(ElementKind::Image { name: name.into() }, center, size)
    }

    /// A polygon from points in parent coordinates.
    pub fn polygon(points: Vec<Point>, closed: bool) -> Self {
        let (location, points) = center_points(points);
        let size = Polygon::new(points.clone()).bounding_rectangle().size();
        Self::new(ElementKind::Polygon { points, closed }, location, size)
    }

    /// A connector from at least two points in parent coordinates.
    pub fn connector(points: Vec<Point>) -> Self {
        let (location, points) = center_points(points);
        let size = Polygon::new(points.clone()).bounding_rectangle().size();
        Self::new(ElementKind::Connector { points, arrow: true }, location, size)
    }

    pub fn container(location: Point) -> Self {
        Self::new(
            ElementKind::Container {
                children: Vec::new(),
            },
            location,
            Size::ZERO,
        )
    }

    pub fn with_id(mut self, id: ElementId) -> Self {
        self.id = id;
        self
    }

    pub fn with_rotation(mut self, rotation: f64) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_scale(mut self, scale_x: f64, scale_y: f64) -> Self {
        self.scale_x = scale_x;
        self.scale_y = scale_y;
        self
    }

    pub fn with_stroke_style(mut self, name: impl Into<String>) -> Self {
        self.stroke_style = name.into();
        self
    }

    pub fn with_fill_style(mut self, name: impl Into<String>) -> Self {
        self.fill_style = Some(name.into());
        self
    }

    pub fn with_text_style(mut self, name: impl Into<String>) -> Self {
        self.text_style = name.into();
        self
    }

    pub fn with_socket(mut self, socket: Socket) -> Self {
        self.sockets.push(socket);
        self
    }

    pub fn with_action(mut self, item: ActionMenuItem) -> Self {
        self.control_points
            .push(ControlPoint::new(ControlPointKind::ActionMenu(item)));
        self
    }

    /// Recreate the default handles for the element's kind. Action menu
    /// items are kept.
    pub fn rebuild_control_points(&mut self) {
        let actions: Vec<ControlPoint> = self
            .control_points
            .drain(..)
            .filter(|cp| matches!(cp.kind, ControlPointKind::ActionMenu(_)))
            .collect();
        let mut points = Vec::new();
        match &self.kind {
            ElementKind::Rectangle
            | ElementKind::Ellipse
            | ElementKind::Text { .. }
            | ElementKind::Image { .. } => {
                points.extend(Handle::ALL.iter().map(|h| ControlPointKind::Resize(*h)));
                points.push(ControlPointKind::Rotate);
            }
            ElementKind::Polygon { points: vertices, .. } => {
                points.extend((0..vertices.len()).map(ControlPointKind::Vertex));
                points.push(ControlPointKind::Rotate);
            }
            ElementKind::Connector { points: vertices, .. } => {
                let last = vertices.len().saturating_sub(1);
                for i in 0..vertices.len() {
                    if i == 0 || i == last {
                        points.push(ControlPointKind::EndPoint {
                            vertex: i,
                            socket: None,
                        });
                    } else {
                        points.push(ControlPointKind::Vertex(i));
                    }
                }
            }
            ElementKind::Container { .. } => {
                points.push(ControlPointKind::Rotate);
            }
        }
        self.control_points = points.into_iter().map(ControlPoint::new).collect();
        self.control_points.extend(actions);
    }

    pub fn is_connector(&self) -> bool {
        matches!(self.kind, ElementKind::Connector { .. })
    }

    pub fn is_container(&self) -> bool {
        matches!(self.kind, ElementKind::Container { .. })
    }

    pub fn children(&self) -> Option<&[ElementId]> {
        match &self.kind {
            ElementKind::Container { children } => Some(children),
            _ => None,
        }
    }

    pub(crate) fn children_mut(&mut self) -> Option<&mut Vec<ElementId>> {
        match &mut self.kind {
            ElementKind::Container { children } => Some(children),
            _ => None,
        }
    }

    /// Vertices of polygons and connectors.
    pub fn points(&self) -> Option<&[Point]> {
        match &self.kind {
            ElementKind::Polygon { points, .. } | ElementKind::Connector { points, .. } => {
                Some(points)
            }
            _ => None,
        }
    }

    pub(crate) fn points_mut(&mut self) -> Option<&mut Vec<Point>> {
        match &mut self.kind {
            ElementKind::Polygon { points, .. } | ElementKind::Connector { points, .. } => {
                Some(points)
            }
            _ => None,
        }
    }

    /// Local -> parent.
    pub fn transform_direct(&self, point: Point) -> Point {
        point
            .scaled(self.scale_x, self.scale_y, Point::ZERO)
            .rotated(self.rotation, Point::ZERO)
            .translated(self.location.x, self.location.y)
    }

    /// Parent -> local.
    pub fn transform_inverse(&self, point: Point) -> Point {
        point
            .translated(-self.location.x, -self.location.y)
            .rotated(-self.rotation, Point::ZERO)
            .scaled(1.0 / self.scale_x, 1.0 / self.scale_y, Point::ZERO)
    }

    /// The element's own transform, local -> parent.
    pub fn transform_set(&self) -> TransformSet {
        TransformSet::new()
            .with_scaling(self.scale_x, self.scale_y)
            .with_rotation(self.rotation)
            .with_translation(self.location.x, self.location.y)
    }

    /// Extent in local coordinates. Containers report `Rectangle::ZERO`
    /// here; `Scene::local_bounds` includes their children.
    pub fn local_bounds(&self) -> Rectangle {
        match &self.kind {
            ElementKind::Polygon { points, .. } | ElementKind::Connector { points, .. } => {
                Polygon::new(points.clone()).bounding_rectangle()
            }
            ElementKind::Container { .. } => Rectangle::ZERO,
            _ => Rectangle::from_center(Point::ZERO, self.size),
        }
    }

    /// Local bounds mapped into parent coordinates.
    pub fn bounds_polygon(&self) -> Polygon {
        Polygon::new(
            self.local_bounds()
                .poly()
                .points
                .into_iter()
                .map(|p| self.transform_direct(p))
                .collect(),
        )
    }

    /// Hit test against a point in parent coordinates.
    pub fn contains_point(&self, point: Point, tolerance: f64) -> bool {
        let local = self.transform_inverse(point);
        let bounds = self.local_bounds();
        match &self.kind {
            ElementKind::Rectangle | ElementKind::Text { .. } | ElementKind::Image { .. } => {
                bounds.inflated(tolerance, tolerance).contains_point(local)
            }
            ElementKind::Ellipse => point_in_ellipse(
                local,
                Point::ZERO,
                self.size.width / 2.0 + tolerance,
                self.size.height / 2.0 + tolerance,
            ),
            ElementKind::Polygon { points, closed } => {
                let poly = Polygon::new(points.clone());
                (*closed && poly.contains_point(local)) || poly.contains_on_edge(local, tolerance, *closed)
            }
            ElementKind::Connector { points, .. } => {
                Polygon::new(points.clone()).contains_on_edge(local, tolerance, false)
            }
            ElementKind::Container { .. } => false,
        }
    }

    /// Mirror local geometry left/right.
    pub(crate) fn mirror(&mut self, horizontal: bool) {
        let (sx, sy) = if horizontal { (-1.0, 1.0) } else { (1.0, -1.0) };
        if let Some(points) = self.points_mut() {
            for p in points.iter_mut() {
                *p = p.scaled(sx, sy, Point::ZERO);
            }
        }
        if self.rotation != 0.0 {
            self.rotation = (TAU - self.rotation) % TAU;
        }
    }

    /// Refit box geometry (or vertices) into `rect`, given in current local
    /// coordinates. The element is re-centered on `rect`.
    pub(crate) fn set_local_bounds(&mut self, rect: Rectangle) {
        let old = self.local_bounds();
        let new_center = self.transform_direct(rect.center());
        if let Some(points) = self.points_mut() {
            let fx = if old.width() > 0.0 { rect.width() / old.width() } else { 1.0 };
            let fy = if old.height() > 0.0 { rect.height() / old.height() } else { 1.0 };
            let center = rect.center();
            for p in points.iter_mut() {
                *p = Point::new(
                    rect.x1 + (p.x - old.x1) * fx - center.x,
                    rect.y1 + (p.y - old.y1) * fy - center.y,
                );
            }
        }
        self.size = rect.size();
        self.location = new_center;
    }
}

/// Split parent-coordinate points into a center location and local points.
fn center_points(points: Vec<Point>) -> (Point, Vec<Point>) {
    let center = Polygon::new(points.clone()).bounding_rectangle().center();
    let local = points.into_iter().map(|p| p.minus(center)).collect();
    (center, local)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_transform_roundtrip() {
        let element = DrawingElement::rectangle(Point::new(40.0, -10.0), Size::new(20.0, 10.0))
            .with_rotation(0.7)
            .with_scale(2.0, 0.5);
        for p in [Point::ZERO, Point::new(3.0, 4.0), Point::new(-12.5, 8.0)] {
            let back = element.transform_inverse(element.transform_direct(p));
            assert!(back.approx_eq(p, 1e-9));
        }
    }

    #[test]
    fn test_transform_direct_order() {
        let element = DrawingElement::rectangle(Point::new(100.0, 0.0), Size::new(10.0, 10.0))
            .with_rotation(FRAC_PI_2)
            .with_scale(2.0, 2.0);
        let p = element.transform_direct(Point::new(1.0, 0.0));
        assert!(p.approx_eq(Point::new(100.0, 2.0), 1e-9));
        let via_set = element.transform_set().apply_to_geometry(&Point::new(1.0, 0.0), false);
        assert!(via_set.approx_eq(p, 1e-9));
    }

    #[test]
    fn test_connector_points_are_centered() {
        let connector = DrawingElement::connector(vec![Point::new(0.0, 0.0), Point::new(100.0, 50.0)]);
        assert_eq!(connector.location, Point::new(50.0, 25.0));
        assert_eq!(
            connector.points(),
            Some(&[Point::new(-50.0, -25.0), Point::new(50.0, 25.0)][..])
        );
        let kinds: Vec<_> = connector.control_points.iter().map(|cp| cp.kind.clone()).collect();
        assert_eq!(
            kinds,
            vec![
                ControlPointKind::EndPoint { vertex: 0, socket: None },
                ControlPointKind::EndPoint { vertex: 1, socket: None },
            ]
        );
    }

    #[test]
    fn test_default_handles() {
        let rect = DrawingElement::rectangle(Point::ZERO, Size::new(10.0, 10.0));
        assert_eq!(rect.control_points.len(), 9);
        let poly = DrawingElement::polygon(
            vec![Point::ZERO, Point::new(10.0, 0.0), Point::new(5.0, 5.0)],
            true,
        );
        assert_eq!(poly.control_points.len(), 4);
    }

    #[test]
    fn test_contains_point() {
        let rect = DrawingElement::rectangle(Point::new(50.0, 50.0), Size::new(100.0, 100.0))
            .with_rotation(FRAC_PI_2 / 2.0);
        assert!(rect.contains_point(Point::new(50.0, 50.0), 0.0));
        // The corner area of the unrotated box falls outside the rotated one.
        assert!(!rect.contains_point(Point::new(2.0, 2.0), 0.0));

        let connector = DrawingElement::connector(vec![Point::ZERO, Point::new(100.0, 0.0)]);
        assert!(connector.contains_point(Point::new(50.0, 2.0), 3.0));
        assert!(!connector.contains_point(Point::new(50.0, 10.0), 3.0));
    }

    #[test]
    fn test_set_local_bounds_keeps_fixed_corner() {
        let mut rect = DrawingElement::rectangle(Point::new(50.0, 50.0), Size::new(100.0, 100.0));
        let top_left = rect.transform_direct(Point::new(-50.0, -50.0));
        rect.set_local_bounds(Rectangle::new(-50.0, -50.0, 150.0, 50.0));
        assert_eq!(rect.size, Size::new(200.0, 100.0));
        assert!(rect.transform_direct(Point::new(-100.0, -50.0)).approx_eq(top_left, 1e-9));
    }

    #[test]
    fn test_set_local_bounds_scales_vertices() {
        let mut poly = DrawingElement::polygon(
            vec![Point::ZERO, Point::new(10.0, 0.0), Point::new(10.0, 10.0)],
            true,
        );
        poly.set_local_bounds(Rectangle::new(-5.0, -5.0, 15.0, 5.0));
        assert_eq!(poly.location, Point::new(10.0, 5.0));
        let points = poly.points().unwrap();
        assert!(points[1].approx_eq(Point::new(10.0, -5.0), 1e-9));
    }

    #[test]
    fn test_mirror_negates_rotation() {
        let mut poly = DrawingElement::polygon(vec![Point::ZERO, Point::new(10.0, 4.0)], false)
            .with_rotation(0.5);
        poly.mirror(true);
        assert!((poly.rotation - (TAU - 0.5)).abs() < 1e-12);
        assert_eq!(poly.points().unwrap()[0], Point::new(5.0, -2.0));
    }
}
