//! Control points: draggable handles owned by elements.
//!
//! A control point's anchor is cached in the parent coordinates of its
//! element and recomputed lazily. Moving a control point maps the pointer
//! into element-local coordinates and lets the handle kind decide what
//! changes.

mod action_menu;
mod painter;

pub use action_menu::{ActionMenuItem, Alignment, HorizontalEdge, VerticalEdge, sibling_offset};
pub use painter::ControlPointPainter;

use std::f64::consts::FRAC_PI_2;

use serde::{Deserialize, Serialize};

use crate::connector::SocketRef;
use crate::error::{SceneError, SceneResult};
use crate::event::Flow;
use crate::geometry::{Point, Rectangle, normalize_angle};
use crate::scene::{DrawingElement, ElementId, Scene};

/// Corner positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Corner {
    /// Unit direction away from the center, in local coordinates.
    pub fn direction(self) -> (f64, f64) {
        match self {
            Corner::TopLeft => (-1.0, -1.0),
            Corner::TopRight => (1.0, -1.0),
            Corner::BottomLeft => (-1.0, 1.0),
            Corner::BottomRight => (1.0, 1.0),
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Corner::TopLeft => Corner::BottomRight,
            Corner::TopRight => Corner::BottomLeft,
            Corner::BottomLeft => Corner::TopRight,
            Corner::BottomRight => Corner::TopLeft,
        }
    }

    pub fn of(self, rect: &Rectangle) -> Point {
        match self {
            Corner::TopLeft => rect.top_left(),
            Corner::TopRight => rect.top_right(),
            Corner::BottomLeft => rect.bottom_left(),
            Corner::BottomRight => rect.bottom_right(),
        }
    }
}

/// Edge positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Edge {
    Top,
    Right,
    Bottom,
    Left,
}

/// A resize handle on the bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Handle {
    Corner(Corner),
    Edge(Edge),
}

impl Handle {
    /// Corners first, then edges, clockwise from the top left.
    pub const ALL: [Handle; 8] = [
        Handle::Corner(Corner::TopLeft),
        Handle::Corner(Corner::TopRight),
        Handle::Corner(Corner::BottomRight),
        Handle::Corner(Corner::BottomLeft),
        Handle::Edge(Edge::Top),
        Handle::Edge(Edge::Right),
        Handle::Edge(Edge::Bottom),
        Handle::Edge(Edge::Left),
    ];

    pub fn direction(self) -> (f64, f64) {
        match self {
            Handle::Corner(corner) => corner.direction(),
            Handle::Edge(Edge::Top) => (0.0, -1.0),
            Handle::Edge(Edge::Right) => (1.0, 0.0),
            Handle::Edge(Edge::Bottom) => (0.0, 1.0),
            Handle::Edge(Edge::Left) => (-1.0, 0.0),
        }
    }

    pub fn of(self, rect: &Rectangle) -> Point {
        match self {
            Handle::Corner(corner) => corner.of(rect),
            Handle::Edge(Edge::Top) => rect.top_center(),
            Handle::Edge(Edge::Right) => rect.right_center(),
            Handle::Edge(Edge::Bottom) => rect.bottom_center(),
            Handle::Edge(Edge::Left) => rect.left_center(),
        }
    }

    /// CSS cursor name for hosts that show one.
    pub fn cursor(self) -> &'static str {
        match self {
            Handle::Corner(Corner::TopLeft | Corner::BottomRight) => "nwse-resize",
            Handle::Corner(Corner::TopRight | Corner::BottomLeft) => "nesw-resize",
            Handle::Edge(Edge::Top | Edge::Bottom) => "ns-resize",
            Handle::Edge(Edge::Left | Edge::Right) => "ew-resize",
        }
    }
}

/// What a control point does when dragged.
#[derive(Debug, Clone, PartialEq)]
pub enum ControlPointKind {
    /// Resize by one corner or edge.
    Resize(Handle),
    /// Resize by a corner, keeping the aspect ratio.
    Proportional(Corner),
    /// Rotate around the element's location.
    Rotate,
    /// An inner vertex of a polygon or connector.
    Vertex(usize),
    /// A connector terminal. `socket` is set while connected.
    EndPoint {
        vertex: usize,
        socket: Option<SocketRef>,
    },
    ActionMenu(ActionMenuItem),
}

impl ControlPointKind {
    /// Whether the handle's glyph turns with its element.
    pub fn is_drawn_rotated(&self) -> bool {
        matches!(
            self,
            ControlPointKind::Resize(_) | ControlPointKind::Proportional(_) | ControlPointKind::Rotate
        )
    }

    /// Whether the anchor is pushed outward by half the stroke width.
    fn sits_outside_stroke(&self) -> bool {
        matches!(
            self,
            ControlPointKind::Resize(_)
                | ControlPointKind::Proportional(_)
                | ControlPointKind::Rotate
                | ControlPointKind::ActionMenu(_)
        )
    }

    pub fn cursor(&self) -> &'static str {
        match self {
            ControlPointKind::Resize(handle) => handle.cursor(),
            ControlPointKind::Proportional(corner) => Handle::Corner(*corner).cursor(),
            ControlPointKind::Rotate => "grab",
            ControlPointKind::Vertex(_) | ControlPointKind::EndPoint { .. } => "move",
            ControlPointKind::ActionMenu(_) => "pointer",
        }
    }
}

/// Hover state of a control point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FocusType {
    #[default]
    None,
    Hovered,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ControlPoint {
    pub kind: ControlPointKind,
    pub focus: FocusType,
    /// Cached anchor, parent coordinates of the owning element.
    anchor: Option<Point>,
}

impl ControlPoint {
    pub fn new(kind: ControlPointKind) -> Self {
        Self {
            kind,
            focus: FocusType::None,
            anchor: None,
        }
    }

    pub fn cached_anchor(&self) -> Option<Point> {
        self.anchor
    }

    pub fn invalidate_anchor(&mut self) {
        self.anchor = None;
    }

    pub fn is_connected(&self) -> bool {
        matches!(self.kind, ControlPointKind::EndPoint { socket: Some(_), .. })
    }

    /// Anchor in local coordinates, before any screen offset. `bounds` is
    /// the element's local extent.
    pub fn compute_anchor(&self, element: &DrawingElement, bounds: Rectangle) -> Point {
        match &self.kind {
            ControlPointKind::Resize(handle) => handle.of(&bounds),
            ControlPointKind::Proportional(corner) => corner.of(&bounds),
            ControlPointKind::Rotate => bounds.top_center(),
            ControlPointKind::Vertex(index) | ControlPointKind::EndPoint { vertex: index, .. } => element
                .points()
                .and_then(|points| points.get(*index).copied())
                .unwrap_or(Point::ZERO),
            ControlPointKind::ActionMenu(item) => item.alignment.anchor(&bounds),
        }
    }
}

/// Names one control point of one element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ControlPointRef {
    pub element: ElementId,
    pub index: usize,
}

impl ControlPointRef {
    pub fn new(element: ElementId, index: usize) -> Self {
        Self { element, index }
    }
}

/// Sent whenever a recomputed anchor differs from the cached one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnchorUpdate {
    pub control_point: ControlPointRef,
    pub anchor: Point,
}

impl Scene {
    pub fn control_point(&self, cp: ControlPointRef) -> SceneResult<&ControlPoint> {
        self.element(cp.element)?
            .control_points
            .get(cp.index)
            .ok_or(SceneError::ControlPointNotFound {
                element: cp.element,
                index: cp.index,
            })
    }

    pub(crate) fn control_point_mut(&mut self, cp: ControlPointRef) -> SceneResult<&mut ControlPoint> {
        self.element_mut(cp.element)?
            .control_points
            .get_mut(cp.index)
            .ok_or(SceneError::ControlPointNotFound {
                element: cp.element,
                index: cp.index,
            })
    }

    /// Hit radius of a control point, in screen pixels.
    pub fn control_point_radius(&self, kind: &ControlPointKind) -> f64 {
        match kind {
            ControlPointKind::EndPoint { .. } => self.settings.end_point_radius,
            ControlPointKind::ActionMenu(_) => self.settings.action_menu_radius,
            _ => self.settings.control_point_radius,
        }
    }

    /// Screen-space offsets of a control point, converted to local units.
    fn control_point_offset(&self, element: &DrawingElement, index: usize) -> Point {
        let Some(control) = element.control_points.get(index) else {
            return Point::ZERO;
        };
        let zoom = self.viewport.zoom;
        let (sx, sy) = (element.scale_x.abs(), element.scale_y.abs());
        let half_stroke = if control.kind.sits_outside_stroke() {
            self.styles.stroke(&element.stroke_style).line_width / 2.0
        } else {
            0.0
        };
        let screen = |p: Point| Point::new(p.x / zoom / sx, p.y / zoom / sy);

        match &control.kind {
            ControlPointKind::Resize(handle) => {
                let (dx, dy) = handle.direction();
                Point::new(dx * half_stroke, dy * half_stroke)
            }
            ControlPointKind::Proportional(corner) => {
                let (dx, dy) = corner.direction();
                Point::new(dx * half_stroke, dy * half_stroke)
            }
            ControlPointKind::Rotate => screen(Point::new(0.0, -self.settings.rotation_handle_distance))
                .translated(0.0, -half_stroke),
            ControlPointKind::Vertex(_) | ControlPointKind::EndPoint { .. } => Point::ZERO,
            ControlPointKind::ActionMenu(item) => {
                let siblings: Vec<&ActionMenuItem> = element
                    .control_points
                    .iter()
                    .filter_map(|cp| match &cp.kind {
                        ControlPointKind::ActionMenu(other) if other.alignment == item.alignment => Some(other),
                        _ => None,
                    })
                    .collect();
                let before = element.control_points[..index]
                    .iter()
                    .filter(|cp| matches!(&cp.kind, ControlPointKind::ActionMenu(other) if other.alignment == item.alignment))
                    .count();
                let radius = self.settings.action_menu_radius;
                let (dx, dy) = item.alignment.direction();
                let outward = Point::new(dx * radius * 2.0, dy * radius * 2.0);
                let along = sibling_offset(item.alignment, before, siblings.len(), radius);
                screen(outward.plus(along)).plus(Point::new(dx * half_stroke, dy * half_stroke))
            }
        }
    }

    /// Cached anchor, recomputed when stale.
    pub fn control_point_anchor(&mut self, cp: ControlPointRef) -> SceneResult<Point> {
        match self.control_point(cp)?.cached_anchor() {
            Some(anchor) => Ok(anchor),
            None => self.update_control_point(cp),
        }
    }

    /// Recompute and cache an anchor, firing `anchor_update` if it moved.
    pub fn update_control_point(&mut self, cp: ControlPointRef) -> SceneResult<Point> {
        let anchor = {
            let element = self.element(cp.element)?;
            let control = self.control_point(cp)?;
            let bounds = self.local_bounds(cp.element)?;
            let local = control
                .compute_anchor(element, bounds)
                .plus(self.control_point_offset(element, cp.index));
            element.transform_direct(local)
        };
        let control = self.control_point_mut(cp)?;
        let previous = control.anchor.replace(anchor);
        if previous != Some(anchor) {
            self.events.anchor_update.trigger(&AnchorUpdate {
                control_point: cp,
                anchor,
            });
        }
        Ok(anchor)
    }

    /// Clear cached anchors of an element's control points and sockets.
    pub fn invalidate_anchors(&mut self, id: ElementId) -> SceneResult<()> {
        let element = self.element_mut(id)?;
        for control in &mut element.control_points {
            control.invalidate_anchor();
        }
        for socket in &mut element.sockets {
            socket.invalidate_anchor();
        }
        Ok(())
    }

    /// Clear the cached anchors of `id` and everything below it.
    pub(crate) fn invalidate_subtree(&mut self, id: ElementId) -> SceneResult<()> {
        self.invalidate_anchors(id)?;
        let children = self.element(id)?.children().map(<[_]>::to_vec).unwrap_or_default();
        for child in children {
            self.invalidate_subtree(child)?;
        }
        Ok(())
    }

    pub(crate) fn invalidate_all_anchors(&mut self) {
        for element in self.elements.values_mut() {
            for control in &mut element.control_points {
                control.invalidate_anchor();
            }
            for socket in &mut element.sockets {
                socket.invalidate_anchor();
            }
        }
    }

    /// Drag a control point to `point`, given in the parent coordinates of
    /// its element.
    pub fn move_control_point(&mut self, cp: ControlPointRef, point: Point) -> SceneResult<()> {
        let local = {
            let element = self.element(cp.element)?;
            self.control_point(cp)?;
            element
                .transform_inverse(point)
                .minus(self.control_point_offset(element, cp.index))
        };
        self.process_move(cp, local, point)?;
        self.events.control_point_move.trigger(&cp);
        self.update_control_point(cp)?;
        Ok(())
    }

    fn process_move(&mut self, cp: ControlPointRef, local: Point, point: Point) -> SceneResult<()> {
        let kind = self.control_point(cp)?.kind.clone();
        match kind {
            ControlPointKind::Resize(handle) => {
                let bounds = self.element(cp.element)?.local_bounds();
                let rect = resize_rect(bounds, handle, local, self.settings.min_element_size);
                self.set_local_bounds(cp.element, rect)
            }
            ControlPointKind::Proportional(corner) => {
                let bounds = self.element(cp.element)?.local_bounds();
                let rect = proportional_rect(bounds, corner, local, self.settings.min_element_size);
                self.set_local_bounds(cp.element, rect)
            }
            ControlPointKind::Rotate => {
                let center = self.element(cp.element)?.location;
                let angle = normalize_angle(center.angle_to(point) + FRAC_PI_2);
                let angle = self.settings.snap_rotation(angle).unwrap_or(angle);
                self.set_rotation(cp.element, angle)
            }
            ControlPointKind::Vertex(index) => self.set_vertex(cp.element, index, local),
            ControlPointKind::EndPoint { vertex, .. } => {
                self.set_vertex(cp.element, vertex, local)?;
                self.check_connect(cp)
            }
            ControlPointKind::ActionMenu(_) => Ok(()),
        }
    }

    /// Move one vertex of a polygon or connector, in local coordinates.
    pub(crate) fn set_vertex(&mut self, id: ElementId, index: usize, local: Point) -> SceneResult<()> {
        let element = self.element_mut(id)?;
        let Some(vertex) = element.points_mut().and_then(|points| points.get_mut(index)) else {
            log::debug!("Element {id} has no vertex {index}");
            return Ok(());
        };
        *vertex = local;
        self.invalidate_anchors(id)
    }

    /// Set the hover state of one control point and clear all others.
    pub fn set_focus(&mut self, focused: Option<ControlPointRef>) {
        for element in self.elements.values_mut() {
            for (index, control) in element.control_points.iter_mut().enumerate() {
                let hovered = focused == Some(ControlPointRef::new(element.id, index));
                control.focus = if hovered { FocusType::Hovered } else { FocusType::None };
            }
        }
    }

    /// Top-most control point of a selected element under `point` (scene
    /// coordinates).
    pub fn control_point_at(&mut self, point: Point) -> SceneResult<Option<ControlPointRef>> {
        let zoom = self.viewport.zoom;
        for id in self.selection.clone().into_iter().rev() {
            let local_point = self.root_to_parent(id, point)?;
            let count = self.element(id)?.control_points.len();
            for index in (0..count).rev() {
                let cp = ControlPointRef::new(id, index);
                let anchor = self.control_point_anchor(cp)?;
                let radius = self.control_point_radius(&self.control_point(cp)?.kind) / zoom;
                if anchor.distance_to(local_point) <= radius {
                    return Ok(Some(cp));
                }
            }
        }
        Ok(None)
    }

    /// Fire the `action` event for an action menu control point.
    pub fn trigger_action(&mut self, cp: ControlPointRef) -> SceneResult<Flow> {
        let ControlPointKind::ActionMenu(item) = &self.control_point(cp)?.kind else {
            return Ok(Flow::Continue);
        };
        let event = ActionEvent {
            element: cp.element,
            action: item.action.clone(),
        };
        log::debug!("Action '{}' on {}", event.action, event.element);
        Ok(self.events.action.trigger(&event))
    }
}

/// An action menu item was clicked.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionEvent {
    pub element: ElementId,
    pub action: String,
}

/// Move the side(s) named by `handle` to `to`, never shrinking below
/// `min_size` and never flipping through the opposite side.
fn resize_rect(bounds: Rectangle, handle: Handle, to: Point, min_size: f64) -> Rectangle {
    let (dx, dy) = handle.direction();
    let (x1, x2) = resize_axis(bounds.x1, bounds.x2, to.x, dx, min_size);
    let (y1, y2) = resize_axis(bounds.y1, bounds.y2, to.y, dy, min_size);
    Rectangle::new(x1, y1, x2, y2)
}

fn resize_axis(lo: f64, hi: f64, value: f64, direction: f64, min_size: f64) -> (f64, f64) {
    if direction < 0.0 {
        (value.min(hi - min_size), hi)
    } else if direction > 0.0 {
        (lo, value.max(lo + min_size))
    } else {
        (lo, hi)
    }
}

fn proportional_rect(bounds: Rectangle, corner: Corner, to: Point, min_size: f64) -> Rectangle {
    let (width, height) = (bounds.width(), bounds.height());
    if width <= 0.0 || height <= 0.0 {
        return bounds;
    }
    let fixed = corner.opposite().of(&bounds);
    let (dx, dy) = corner.direction();
    let factor = ((to.x - fixed.x) * dx / width)
        .max((to.y - fixed.y) * dy / height)
        .max(min_size / width.min(height));
    let moving = Point::new(fixed.x + dx * width * factor, fixed.y + dy * height * factor);
    Rectangle::from_points(fixed, moving)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Size;
    use std::cell::RefCell;
    use std::f64::consts::FRAC_PI_4;
    use std::rc::Rc;

    fn scene_with_rect() -> (Scene, ElementId) {
        let mut scene = Scene::new();
        let id = scene
            .add(DrawingElement::rectangle(Point::new(100.0, 100.0), Size::new(100.0, 50.0)))
            .unwrap();
        (scene, id)
    }

    fn index_of(scene: &Scene, id: ElementId, kind: &ControlPointKind) -> usize {
        scene
            .element(id)
            .unwrap()
            .control_points
            .iter()
            .position(|cp| &cp.kind == kind)
            .unwrap()
    }

    #[test]
    fn test_resize_anchor_pushed_out_by_half_stroke() {
        let (mut scene, id) = scene_with_rect();
        let index = index_of(&scene, id, &ControlPointKind::Resize(Handle::Corner(Corner::BottomRight)));
        let anchor = scene.control_point_anchor(ControlPointRef::new(id, index)).unwrap();
        // Default stroke is one unit wide.
        assert!(anchor.approx_eq(Point::new(150.5, 125.5), 1e-9));
    }

    #[test]
    fn test_rotate_anchor_offset_scales_with_zoom() {
        let (mut scene, id) = scene_with_rect();
        let cp = ControlPointRef::new(id, index_of(&scene, id, &ControlPointKind::Rotate));
        let at_one = scene.control_point_anchor(cp).unwrap();
        assert!((at_one.y - (75.0 - 25.0 - 0.5)).abs() < 1e-9);

        scene.zoom_at(Point::ZERO, 2.0);
        let at_two = scene.control_point_anchor(cp).unwrap();
        assert!((at_two.y - (75.0 - 12.5 - 0.5)).abs() < 1e-9);
    }

    #[test]
    fn test_anchor_update_fires_only_on_change() {
        let (mut scene, id) = scene_with_rect();
        let count = Rc::new(RefCell::new(0));
        let counter = count.clone();
        scene.events.anchor_update.bind(move |_| {
            *counter.borrow_mut() += 1;
            Flow::Continue
        });
        let cp = ControlPointRef::new(id, 0);
        scene.update_control_point(cp).unwrap();
        scene.update_control_point(cp).unwrap();
        assert_eq!(*count.borrow(), 1);
    }

    #[test]
    fn test_move_resize_handle() {
        let (mut scene, id) = scene_with_rect();
        let index = index_of(&scene, id, &ControlPointKind::Resize(Handle::Edge(Edge::Right)));
        scene
            .move_control_point(ControlPointRef::new(id, index), Point::new(250.5, 100.0))
            .unwrap();
        let element = scene.element(id).unwrap();
        assert!((element.size.width - 200.0).abs() < 1e-9);
        assert!((element.size.height - 50.0).abs() < 1e-9);
        assert!(element.location.approx_eq(Point::new(150.0, 100.0), 1e-9));
    }

    #[test]
    fn test_resize_respects_min_size() {
        let rect = resize_rect(
            Rectangle::new(-50.0, -25.0, 50.0, 25.0),
            Handle::Corner(Corner::TopLeft),
            Point::new(100.0, 100.0),
            5.0,
        );
        assert_eq!(rect, Rectangle::new(45.0, 20.0, 50.0, 25.0));
    }

    #[test]
    fn test_proportional_keeps_aspect() {
        let rect = proportional_rect(
            Rectangle::new(0.0, 0.0, 100.0, 50.0),
            Corner::BottomRight,
            Point::new(150.0, 60.0),
            5.0,
        );
        assert!((rect.width() - 150.0).abs() < 1e-9);
        assert!((rect.height() - 75.0).abs() < 1e-9);
        assert_eq!(rect.top_left(), Point::ZERO);
    }

    #[test]
    fn test_move_rotate_handle_snaps() {
        let (mut scene, id) = scene_with_rect();
        let cp = ControlPointRef::new(id, index_of(&scene, id, &ControlPointKind::Rotate));
        // Up and to the right at 44 degrees from vertical, snaps to 45.
        let angle = 44f64.to_radians();
        let target = Point::new(100.0 + 50.0 * angle.sin(), 100.0 - 50.0 * angle.cos());
        scene.move_control_point(cp, target).unwrap();
        assert!((scene.element(id).unwrap().rotation - FRAC_PI_4).abs() < 1e-9);
    }

    #[test]
    fn test_move_on_missing_element_fails() {
        let mut scene = Scene::new();
        let missing = ControlPointRef::new(uuid::Uuid::new_v4(), 0);
        assert!(matches!(
            scene.move_control_point(missing, Point::ZERO),
            Err(SceneError::ElementNotFound(_))
        ));
    }

    #[test]
    fn test_control_point_at() {
        let (mut scene, id) = scene_with_rect();
        assert_eq!(scene.control_point_at(Point::new(50.5, 75.5)).unwrap(), None);
        scene.select(vec![id]);
        let hit = scene.control_point_at(Point::new(51.0, 76.0)).unwrap();
        assert_eq!(hit, Some(ControlPointRef::new(id, 0)));
    }
}
