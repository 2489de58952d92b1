//! Drag-to-create.

use super::{DrawingControl, SelectControl};
use crate::control::ControlPointRef;
use crate::error::SceneResult;
use crate::event::Flow;
use crate::geometry::{Point, Rectangle};
use crate::input::{Key, KeyEvent, MouseButton, MouseEvent};
use crate::scene::{DrawingElement, ElementId, Scene};

/// Builds the element a drag from `from` to `to` creates.
pub trait ElementFactory {
    fn create(&self, from: Point, to: Point) -> DrawingElement;
}

/// Factories for the built-in element kinds.
#[derive(Debug, Clone, PartialEq)]
pub enum ShapeFactory {
    Rectangle,
    Ellipse,
    Text(String),
    /// An image by name in the host's image store.
    Image(String),
    Connector,
}

impl ElementFactory for ShapeFactory {
    fn create(&self, from: Point, to: Point) -> DrawingElement {
        let rect = Rectangle::from_points(from, to);
        let (center, size) = (rect.center(), rect.size());
        match self {
            ShapeFactory::Rectangle => DrawingElement::rectangle(center, size),
            ShapeFactory::Ellipse => DrawingElement::ellipse(center, size),
            ShapeFactory::Text(text) => DrawingElement::text(center, size, text.clone()),
            ShapeFactory::Image(name) => DrawingElement::image(center, size, name.clone()),
            ShapeFactory::Connector => DrawingElement::connector(vec![from, to]),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Pending {
    id: ElementId,
    start: Point,
    connector: bool,
}

/// Creates one element per drag, then hands back to [`SelectControl`].
pub struct CreateControl {
    factory: Box<dyn ElementFactory>,
    pending: Option<Pending>,
    finished: bool,
}

impl CreateControl {
    pub fn new(factory: impl ElementFactory + 'static) -> Self {
        Self {
            factory: Box::new(factory),
            pending: None,
            finished: false,
        }
    }

    /// Element being dragged out, if any.
    pub fn pending(&self) -> Option<ElementId> {
        self.pending.map(|p| p.id)
    }

    fn last_end_point(scene: &Scene, id: ElementId) -> SceneResult<Option<ControlPointRef>> {
        Ok(scene.end_points(id)?.last().copied())
    }

    fn is_too_small(scene: &Scene, pending: &Pending) -> SceneResult<bool> {
        let element = scene.element(pending.id)?;
        if pending.connector {
            let length = match element.points() {
                Some([first, .., last]) => first.distance_to(*last),
                _ => 0.0,
            };
            return Ok(length < scene.viewport().pixels(scene.settings.end_point_radius));
        }
        let bounds = scene.parent_bounds(pending.id)?;
        let min = scene.settings.min_element_size;
        Ok(bounds.width() < min || bounds.height() < min)
    }

    fn discard(&mut self, scene: &mut Scene) -> SceneResult<()> {
        if let Some(pending) = self.pending.take() {
            if scene.contains(pending.id) {
                scene.remove(pending.id)?;
            }
        }
        scene.clear_hovered_socket_element();
        Ok(())
    }
}

impl DrawingControl for CreateControl {
    fn name(&self) -> &'static str {
        "create"
    }

    fn activate(&mut self, scene: &mut Scene) -> SceneResult<()> {
        self.finished = false;
        scene.clear_selection();
        Ok(())
    }

    fn deactivate(&mut self, scene: &mut Scene) -> SceneResult<()> {
        self.discard(scene)
    }

    fn on_mouse_down(&mut self, scene: &mut Scene, event: &MouseEvent) -> SceneResult<Flow> {
        if event.button != Some(MouseButton::Left) || self.pending.is_some() {
            return Ok(Flow::Continue);
        }
        let start = scene.settings.snap_point(event.position);
        let element = self.factory.create(start, start);
        let connector = element.is_connector();
        let id = scene.add(element)?;
        log::debug!("Creating {id}");

        if connector {
            // Let the first end point pick up a socket under the pointer.
            if let Some(first) = scene.end_points(id)?.first().copied() {
                scene.move_control_point(first, start)?;
            }
        }
        self.pending = Some(Pending { id, start, connector });
        Ok(Flow::Stop)
    }

    fn on_mouse_move(&mut self, scene: &mut Scene, event: &MouseEvent) -> SceneResult<Flow> {
        let Some(pending) = self.pending else {
            return Ok(Flow::Continue);
        };
        let current = scene.settings.snap_point(event.position);
        if pending.connector {
            if let Some(last) = Self::last_end_point(scene, pending.id)? {
                scene.move_control_point(last, current)?;
            }
        } else {
            scene.set_bounds(pending.id, Rectangle::from_points(pending.start, current))?;
        }
        Ok(Flow::Stop)
    }

    fn on_mouse_up(&mut self, scene: &mut Scene, event: &MouseEvent) -> SceneResult<Flow> {
        if event.button != Some(MouseButton::Left) {
            return Ok(Flow::Continue);
        }
        let Some(pending) = self.pending else {
            return Ok(Flow::Continue);
        };
        if Self::is_too_small(scene, &pending)? {
            log::debug!("Discarding {}: too small", pending.id);
            self.discard(scene)?;
        } else {
            self.pending = None;
            scene.clear_hovered_socket_element();
            scene.select(vec![pending.id]);
        }
        self.finished = true;
        Ok(Flow::Stop)
    }

    fn on_key_down(&mut self, scene: &mut Scene, event: &KeyEvent) -> SceneResult<Flow> {
        if event.key != Key::Escape {
            return Ok(Flow::Continue);
        }
        self.discard(scene)?;
        self.finished = true;
        Ok(Flow::Stop)
    }

    fn take_next_control(&mut self) -> Option<Box<dyn DrawingControl>> {
        if !self.finished {
            return None;
        }
        self.finished = false;
        Some(Box::new(SelectControl::new()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connector::{Socket, SocketRef};
    use crate::geometry::Size;
    use crate::scene::ElementKind;

    fn press(x: f64, y: f64) -> MouseEvent {
        MouseEvent::at(Point::new(x, y)).with_button(MouseButton::Left)
    }

    fn drag(control: &mut CreateControl, scene: &mut Scene, from: Point, to: Point) {
        control.on_mouse_down(scene, &press(from.x, from.y)).unwrap();
        control.on_mouse_move(scene, &MouseEvent::at(to)).unwrap();
        control.on_mouse_up(scene, &press(to.x, to.y)).unwrap();
    }

    #[test]
    fn test_drag_creates_ellipse() {
        let mut scene = Scene::new();
        let mut control = CreateControl::new(ShapeFactory::Ellipse);
        drag(&mut control, &mut scene, Point::new(80.0, 60.0), Point::new(20.0, 20.0));

        let id = scene.selection()[0];
        let element = scene.element(id).unwrap();
        assert!(matches!(element.kind, ElementKind::Ellipse));
        assert_eq!(element.location, Point::new(50.0, 40.0));
        assert_eq!(element.size, Size::new(60.0, 40.0));
        assert!(control.take_next_control().is_some());
    }

    #[test]
    fn test_tiny_drag_is_discarded() {
        let mut scene = Scene::new();
        let mut control = CreateControl::new(ShapeFactory::Rectangle);
        drag(&mut control, &mut scene, Point::new(10.0, 10.0), Point::new(12.0, 30.0));
        assert!(scene.is_empty());
        assert!(scene.selection().is_empty());
    }

    #[test]
    fn test_escape_discards_pending() {
        let mut scene = Scene::new();
        let mut control = CreateControl::new(ShapeFactory::Rectangle);
        control.on_mouse_down(&mut scene, &press(10.0, 10.0)).unwrap();
        assert_eq!(scene.len(), 1);
        control
            .on_key_down(&mut scene, &KeyEvent::new(Key::Escape))
            .unwrap();
        assert!(scene.is_empty());
        assert_eq!(control.take_next_control().map(|c| c.name()), Some("select"));
    }

    #[test]
    fn test_connector_connects_both_ends() {
        let mut scene = Scene::new();
        let left = scene
            .add(
                DrawingElement::rectangle(Point::new(100.0, 100.0), Size::new(100.0, 100.0))
                    .with_socket(Socket::proportional("right", 1.0, 0.5)),
            )
            .unwrap();
        let right = scene
            .add(
                DrawingElement::rectangle(Point::new(400.0, 100.0), Size::new(100.0, 100.0))
                    .with_socket(Socket::proportional("left", 0.0, 0.5)),
            )
            .unwrap();

        let mut control = CreateControl::new(ShapeFactory::Connector);
        drag(&mut control, &mut scene, Point::new(152.0, 101.0), Point::new(347.0, 99.0));

        let connector = scene.selection()[0];
        let ends = scene.end_points(connector).unwrap();
        assert_eq!(scene.end_point_socket(ends[0]).unwrap(), Some(SocketRef::new(left, 0)));
        assert_eq!(scene.end_point_socket(ends[1]).unwrap(), Some(SocketRef::new(right, 0)));
        assert!(scene.hovered_socket_element().is_none());
        assert!(scene.connections_consistent());
    }

    #[test]
    fn test_custom_factory() {
        struct Square;
        impl ElementFactory for Square {
            fn create(&self, from: Point, to: Point) -> DrawingElement {
                let side = (to.x - from.x).abs().max((to.y - from.y).abs());
                DrawingElement::rectangle(from, Size::new(side, side))
            }
        }
        let mut scene = Scene::new();
        let mut control = CreateControl::new(Square);
        control.on_mouse_down(&mut scene, &press(10.0, 10.0)).unwrap();
        assert_eq!(scene.len(), 1);
    }
}
