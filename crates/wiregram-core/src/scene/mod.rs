//! Scene graph: an arena of drawing elements under one root container.

mod element;
mod render;

pub use element::{DrawingElement, ElementId, ElementKind};

use std::collections::HashMap;

use crate::connector::{ConnectionEvent, SocketRef};
use crate::control::{ActionEvent, AnchorUpdate, ControlPointRef};
use crate::error::{SceneError, SceneResult};
use crate::event::{Event, Flow};
use crate::geometry::{Point, Polygon, Rectangle};
use crate::settings::Settings;
use crate::style::StyleRegistry;
use crate::transform::TransformSet;
use crate::viewport::Viewport;

/// What kind of user interaction changed an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InteractionKind {
    Connect,
    Disconnect,
    Move,
    Resize,
    Rotate,
    Flip,
    Edit,
}

/// Structural notifications for hosts (undo stacks, persistence).
#[derive(Debug, Clone, PartialEq)]
pub enum SceneChange {
    Added(ElementId),
    Removed(ElementId),
    Reindexed(ElementId),
    Interact {
        element: ElementId,
        kind: InteractionKind,
    },
    SelectionChanged(Vec<ElementId>),
}

/// Every observer list the scene fires.
#[derive(Debug, Default)]
pub struct SceneEvents {
    pub anchor_update: Event<AnchorUpdate>,
    pub control_point_move: Event<ControlPointRef>,
    pub socket_connect: Event<ConnectionEvent>,
    pub socket_disconnect: Event<ConnectionEvent>,
    pub end_point_connect: Event<ConnectionEvent>,
    pub end_point_disconnect: Event<ConnectionEvent>,
    pub connector_connect: Event<ConnectionEvent>,
    pub connector_disconnect: Event<ConnectionEvent>,
    pub action: Event<ActionEvent>,
    pub change: Event<SceneChange>,
}

/// The element arena plus everything needed to map it onto a window.
#[derive(Debug)]
pub struct Scene {
    pub(crate) elements: HashMap<ElementId, DrawingElement>,
    root: ElementId,
    pub(crate) viewport: Viewport,
    pub settings: Settings,
    pub styles: StyleRegistry,
    pub(crate) selection: Vec<ElementId>,
    pub(crate) hovered_socket_element: Option<ElementId>,
    pub events: SceneEvents,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    pub fn new() -> Self {
        Self::with_settings(Settings::default())
    }

    pub fn with_settings(settings: Settings) -> Self {
        let root = DrawingElement::container(Point::ZERO);
        let root_id = root.id;
        let mut elements = HashMap::new();
        elements.insert(root_id, root);
        let viewport = Viewport {
            min_zoom: settings.min_zoom,
            max_zoom: settings.max_zoom,
            ..Viewport::default()
        };
        Self {
            elements,
            root: root_id,
            viewport,
            settings,
            styles: StyleRegistry::default(),
            selection: Vec::new(),
            hovered_socket_element: None,
            events: SceneEvents::default(),
        }
    }

    pub fn with_styles(mut self, styles: StyleRegistry) -> Self {
        self.styles = styles;
        self
    }

    pub fn root(&self) -> ElementId {
        self.root
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// Replace the viewport. Cached anchors depend on zoom and are dropped.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.invalidate_all_anchors();
    }

    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        self.viewport.pan_by(dx, dy);
    }

    pub fn zoom_at(&mut self, window_point: Point, factor: f64) {
        let before = self.viewport.zoom;
        self.viewport.zoom_at(window_point, factor);
        if self.viewport.zoom != before {
            self.invalidate_all_anchors();
        }
    }

    /// Number of elements, not counting the root.
    pub fn len(&self) -> usize {
        self.elements.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.elements.contains_key(&id)
    }

    pub fn get(&self, id: ElementId) -> Option<&DrawingElement> {
        self.elements.get(&id)
    }

    pub fn element(&self, id: ElementId) -> SceneResult<&DrawingElement> {
        self.elements.get(&id).ok_or(SceneError::ElementNotFound(id))
    }

    pub(crate) fn element_mut(&mut self, id: ElementId) -> SceneResult<&mut DrawingElement> {
        self.elements.get_mut(&id).ok_or(SceneError::ElementNotFound(id))
    }

    pub fn children(&self, id: ElementId) -> SceneResult<&[ElementId]> {
        self.element(id)?.children().ok_or(SceneError::NotAContainer(id))
    }

    /// All elements below the root, back to front, depth first.
    pub fn draw_order(&self) -> Vec<ElementId> {
        let mut order = Vec::new();
        self.collect_descendants(self.root, &mut order);
        order
    }

    fn collect_descendants(&self, id: ElementId, out: &mut Vec<ElementId>) {
        if let Some(children) = self.get(id).and_then(|e| e.children()) {
            for child in children {
                out.push(*child);
                self.collect_descendants(*child, out);
            }
        }
    }

    /// Fire a change notification.
    pub fn notify(&mut self, change: SceneChange) -> Flow {
        self.events.change.trigger(&change)
    }

    pub fn add(&mut self, element: DrawingElement) -> SceneResult<ElementId> {
        self.add_to(self.root, element)
    }

    /// Append `element` on top of `parent`'s children.
    pub fn add_to(&mut self, parent: ElementId, mut element: DrawingElement) -> SceneResult<ElementId> {
        let id = element.id;
        element.parent = Some(parent);
        self.element_mut(parent)?
            .children_mut()
            .ok_or(SceneError::NotAContainer(parent))?
            .push(id);
        log::debug!("Added {} {id}", element.kind.name());
        self.elements.insert(id, element);
        self.notify(SceneChange::Added(id));
        Ok(id)
    }

    /// Remove an element and, for containers, everything below it. Sockets
    /// and end points are disconnected first.
    pub fn remove(&mut self, id: ElementId) -> SceneResult<DrawingElement> {
        if id == self.root {
            return Err(SceneError::RootElement);
        }
        let children = self.element(id)?.children().map(<[_]>::to_vec).unwrap_or_default();
        for child in children {
            self.remove(child)?;
        }

        let socket_count = self.element(id)?.sockets.len();
        for index in 0..socket_count {
            self.disconnect(SocketRef::new(id, index), None)?;
        }
        if self.element(id)?.is_connector() {
            self.disconnect_connector(id)?;
        }

        let element = self
            .elements
            .remove(&id)
            .ok_or(SceneError::ElementNotFound(id))?;
        if let Some(children) = element.parent.and_then(|p| self.elements.get_mut(&p)).and_then(|p| p.children_mut()) {
            children.retain(|c| *c != id);
        }
        if self.hovered_socket_element == Some(id) {
            self.hovered_socket_element = None;
        }
        if self.selection.contains(&id) {
            self.selection.retain(|s| *s != id);
            self.notify(SceneChange::SelectionChanged(self.selection.clone()));
        }
        log::debug!("Removed {} {id}", element.kind.name());
        self.notify(SceneChange::Removed(id));
        Ok(element)
    }

    /// Move an element to `index` among its siblings (clamped).
    pub fn reindex(&mut self, id: ElementId, index: usize) -> SceneResult<()> {
        let parent = self.element(id)?.parent.ok_or(SceneError::RootElement)?;
        let children = self
            .element_mut(parent)?
            .children_mut()
            .ok_or(SceneError::NotAContainer(parent))?;
        children.retain(|c| *c != id);
        let index = index.min(children.len());
        children.insert(index, id);
        self.notify(SceneChange::Reindexed(id));
        Ok(())
    }

    pub fn bring_to_front(&mut self, id: ElementId) -> SceneResult<()> {
        self.reindex(id, usize::MAX)
    }

    pub fn send_to_back(&mut self, id: ElementId) -> SceneResult<()> {
        self.reindex(id, 0)
    }

    /// Local extent of an element. Containers cover their children.
    pub fn local_bounds(&self, id: ElementId) -> SceneResult<Rectangle> {
        let element = self.element(id)?;
        let Some(children) = element.children() else {
            return Ok(element.local_bounds());
        };
        let mut bounds: Option<Rectangle> = None;
        for child in children {
            let rect = self.parent_bounds(*child)?;
            bounds = Some(match bounds {
                Some(b) => b.union(&rect),
                None => rect,
            });
        }
        Ok(bounds.unwrap_or(Rectangle::ZERO))
    }

    /// Axis-aligned extent of an element in its parent's coordinates.
    pub fn parent_bounds(&self, id: ElementId) -> SceneResult<Rectangle> {
        let element = self.element(id)?;
        let local = self.local_bounds(id)?;
        Ok(Polygon::new(
            local
                .poly()
                .points
                .into_iter()
                .map(|p| element.transform_direct(p))
                .collect(),
        )
        .bounding_rectangle())
    }

    /// Parent coordinates of `id` -> root coordinates.
    pub fn parent_to_root(&self, id: ElementId, point: Point) -> SceneResult<Point> {
        let mut point = point;
        let mut current = self.element(id)?.parent;
        while let Some(ancestor) = current {
            let ancestor = self.element(ancestor)?;
            point = ancestor.transform_direct(point);
            current = ancestor.parent;
        }
        Ok(point)
    }

    /// Root coordinates -> parent coordinates of `id`.
    pub fn root_to_parent(&self, id: ElementId, point: Point) -> SceneResult<Point> {
        let mut chain = Vec::new();
        let mut current = self.element(id)?.parent;
        while let Some(ancestor) = current {
            let ancestor = self.element(ancestor)?;
            chain.push(ancestor);
            current = ancestor.parent;
        }
        Ok(chain
            .iter()
            .rev()
            .fold(point, |p, ancestor| ancestor.transform_inverse(p)))
    }

    pub fn local_to_root(&self, id: ElementId, point: Point) -> SceneResult<Point> {
        let local = self.element(id)?.transform_direct(point);
        self.parent_to_root(id, local)
    }

    pub fn root_to_local(&self, id: ElementId, point: Point) -> SceneResult<Point> {
        let parent = self.root_to_parent(id, point)?;
        Ok(self.element(id)?.transform_inverse(parent))
    }

    /// Local coordinates of `id` -> window pixels.
    pub fn transform_set_for(&self, id: ElementId) -> SceneResult<TransformSet> {
        let mut element = self.element(id)?;
        let mut set = element.transform_set();
        while let Some(parent) = element.parent {
            element = self.element(parent)?;
            set = set.then(&element.transform_set());
        }
        Ok(set.then(&self.viewport.transform_set()))
    }

    /// Top-most element directly under the root hit by `point` (scene
    /// coordinates). Groups are hit through their children.
    pub fn element_at(&self, point: Point) -> Option<ElementId> {
        let tolerance = self.viewport.pixels(self.settings.control_point_radius);
        let children = self.children(self.root).ok()?;
        children
            .iter()
            .rev()
            .copied()
            .find(|id| self.hits(*id, point, tolerance))
    }

    fn hits(&self, id: ElementId, point: Point, tolerance: f64) -> bool {
        let Some(element) = self.get(id) else {
            return false;
        };
        match element.children() {
            Some(children) => {
                let local = element.transform_inverse(point);
                children.iter().any(|c| self.hits(*c, local, tolerance))
            }
            None => element.contains_point(point, tolerance),
        }
    }

    /// Move an element so its center sits at `location` (parent
    /// coordinates). Returns `false` when the move was suppressed: a
    /// connected connector has to travel at least four end point radii
    /// before it lets go of its sockets.
    pub fn move_element(&mut self, id: ElementId, location: Point) -> SceneResult<bool> {
        let element = self.element(id)?;
        if element.is_connector() && self.has_connections(id)? {
            let displacement = element.location.distance_to(location);
            let threshold = 4.0 * self.viewport.pixels(self.settings.end_point_radius);
            if displacement < threshold {
                log::debug!("Connector {id} held by its sockets ({displacement:.1} < {threshold:.1})");
                return Ok(false);
            }
            self.disconnect_connector(id)?;
        }
        self.element_mut(id)?.location = location;
        self.after_geometry_change(id, InteractionKind::Move)?;
        Ok(true)
    }

    pub fn move_by(&mut self, id: ElementId, dx: f64, dy: f64) -> SceneResult<bool> {
        let location = self.element(id)?.location.translated(dx, dy);
        self.move_element(id, location)
    }

    pub fn set_rotation(&mut self, id: ElementId, angle: f64) -> SceneResult<()> {
        if self.element(id)?.is_connector() {
            self.disconnect_connector(id)?;
        }
        self.element_mut(id)?.rotation = angle;
        self.after_geometry_change(id, InteractionKind::Rotate)
    }

    pub fn flip_horizontally(&mut self, id: ElementId) -> SceneResult<()> {
        self.flip(id, true)
    }

    pub fn flip_vertically(&mut self, id: ElementId) -> SceneResult<()> {
        self.flip(id, false)
    }

    fn flip(&mut self, id: ElementId, horizontal: bool) -> SceneResult<()> {
        if self.element(id)?.is_connector() {
            self.disconnect_connector(id)?;
        }
        self.element_mut(id)?.mirror(horizontal);
        self.after_geometry_change(id, InteractionKind::Flip)
    }

    /// Refit an element into `rect`, given in its current local coordinates.
    pub fn set_local_bounds(&mut self, id: ElementId, rect: Rectangle) -> SceneResult<()> {
        let element = self.element_mut(id)?;
        if element.is_container() {
            log::debug!("Containers are not resized");
            return Ok(());
        }
        element.set_local_bounds(rect);
        self.after_geometry_change(id, InteractionKind::Resize)
    }

    /// Refit an element into `rect`, given in parent coordinates.
    pub fn set_bounds(&mut self, id: ElementId, rect: Rectangle) -> SceneResult<()> {
        let element = self.element(id)?;
        let local = Rectangle::from_points(
            element.transform_inverse(rect.top_left()),
            element.transform_inverse(rect.bottom_right()),
        );
        self.set_local_bounds(id, local)
    }

    /// Run `f` on an element, then refresh its anchors and connections.
    pub fn update_element<R>(
        &mut self,
        id: ElementId,
        f: impl FnOnce(&mut DrawingElement) -> R,
    ) -> SceneResult<R> {
        let result = f(self.element_mut(id)?);
        self.invalidate_anchors(id)?;
        self.update_connections(id)?;
        Ok(result)
    }

    /// Replace the text of a text element.
    pub fn set_text(&mut self, id: ElementId, text: impl Into<String>) -> SceneResult<()> {
        let text = text.into();
        self.update_element(id, |element| {
            if let ElementKind::Text { text: current } = &mut element.kind {
                *current = text;
            }
        })
    }

    fn after_geometry_change(&mut self, id: ElementId, kind: InteractionKind) -> SceneResult<()> {
        self.invalidate_anchors(id)?;
        self.update_connections(id)?;
        self.notify(SceneChange::Interact { element: id, kind });
        Ok(())
    }

    /// Wrap sibling elements in a new container, placed where the top-most
    /// of them was.
    pub fn group(&mut self, ids: &[ElementId]) -> SceneResult<ElementId> {
        let Some(first) = ids.first() else {
            return Err(SceneError::EmptyGroup);
        };
        let parent = self.element(*first)?.parent.ok_or(SceneError::RootElement)?;
        let siblings = self.children(parent)?.to_vec();
        let members: Vec<ElementId> = siblings.iter().copied().filter(|c| ids.contains(c)).collect();
        if members.is_empty() {
            return Err(SceneError::EmptyGroup);
        }
        let mut bounds = self.parent_bounds(members[0])?;
        for id in &members[1..] {
            bounds = bounds.union(&self.parent_bounds(*id)?);
        }
        let center = bounds.center();
        let position = siblings.iter().rposition(|c| members.contains(c)).unwrap_or(0);

        let group = DrawingElement::container(center);
        let group_id = self.add_to(parent, group)?;
        self.reindex(group_id, position + 1)?;
        if let Some(children) = self.element_mut(parent)?.children_mut() {
            children.retain(|c| !members.contains(c));
        }
        for id in &members {
            let element = self.element_mut(*id)?;
            element.parent = Some(group_id);
            element.location = element.location.minus(center);
        }
        if let Some(children) = self.element_mut(group_id)?.children_mut() {
            children.extend(members.iter().copied());
        }
        self.invalidate_anchors(group_id)?;
        for id in &members {
            self.invalidate_subtree(*id)?;
            self.update_connections(*id)?;
        }
        Ok(group_id)
    }

    /// Dissolve a group, moving its children to the group's parent.
    pub fn ungroup(&mut self, id: ElementId) -> SceneResult<Vec<ElementId>> {
        let group = self.element(id)?;
        let children = group.children().ok_or(SceneError::NotAContainer(id))?.to_vec();
        let parent = group.parent.ok_or(SceneError::RootElement)?;
        let (rotation, scale_x, scale_y) = (group.rotation, group.scale_x, group.scale_y);
        let placed: Vec<Point> = children
            .iter()
            .map(|c| self.element(*c).map(|e| group.transform_direct(e.location)))
            .collect::<SceneResult<_>>()?;
        let index = self.children(parent)?.iter().position(|c| *c == id).unwrap_or(0);

        if let Some(list) = self.element_mut(id)?.children_mut() {
            list.clear();
        }
        for (child, location) in children.iter().zip(placed) {
            let element = self.element_mut(*child)?;
            element.parent = Some(parent);
            element.location = location;
            element.rotation += rotation;
            element.scale_x *= scale_x;
            element.scale_y *= scale_y;
        }
        if let Some(list) = self.element_mut(parent)?.children_mut() {
            list.splice(index..index, children.iter().copied());
        }
        self.remove(id)?;
        for child in &children {
            self.invalidate_subtree(*child)?;
            self.update_connections(*child)?;
        }
        Ok(children)
    }

    pub fn selection(&self) -> &[ElementId] {
        &self.selection
    }

    pub fn is_selected(&self, id: ElementId) -> bool {
        self.selection.contains(&id)
    }

    /// Replace the selection. Unknown ids are dropped.
    pub fn select(&mut self, ids: Vec<ElementId>) {
        let ids: Vec<ElementId> = ids
            .into_iter()
            .filter(|id| *id != self.root && self.contains(*id))
            .collect();
        if ids != self.selection {
            self.selection = ids;
            self.notify(SceneChange::SelectionChanged(self.selection.clone()));
        }
    }

    pub fn toggle_selection(&mut self, id: ElementId) {
        let mut selection = self.selection.clone();
        if let Some(pos) = selection.iter().position(|s| *s == id) {
            selection.remove(pos);
        } else {
            selection.push(id);
        }
        self.select(selection);
    }

    pub fn clear_selection(&mut self) {
        self.select(Vec::new());
    }

    /// Element whose sockets are highlighted during an end point drag.
    pub fn hovered_socket_element(&self) -> Option<ElementId> {
        self.hovered_socket_element
    }

    pub fn clear_hovered_socket_element(&mut self) {
        self.hovered_socket_element = None;
    }
}
