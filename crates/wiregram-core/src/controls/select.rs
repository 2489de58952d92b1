//! Selecting, dragging and handle manipulation.

use super::{DrawingControl, TextEditControl};
use crate::control::{ControlPointKind, ControlPointRef};
use crate::error::SceneResult;
use crate::event::Flow;
use crate::geometry::Point;
use crate::input::{Key, KeyEvent, MouseButton, MouseEvent};
use crate::scene::{ElementId, ElementKind, InteractionKind, Scene, SceneChange};

/// What the pointer is currently dragging.
#[derive(Debug, Clone, Default)]
enum Drag {
    #[default]
    None,
    ControlPoint(ControlPointRef),
    Elements {
        start: Point,
        /// Selected elements and their locations when the drag began.
        origins: Vec<(ElementId, Point)>,
    },
}

/// The default control: click to select, drag to move, drag handles to
/// resize, rotate or reconnect.
#[derive(Default)]
pub struct SelectControl {
    drag: Drag,
    next: Option<Box<dyn DrawingControl>>,
}

impl SelectControl {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_dragging(&self) -> bool {
        !matches!(self.drag, Drag::None)
    }

    fn start_element_drag(&mut self, scene: &Scene, start: Point) {
        let origins = scene
            .selection()
            .iter()
            .filter_map(|id| scene.get(*id).map(|e| (*id, e.location)))
            .collect();
        self.drag = Drag::Elements { start, origins };
    }

    fn cancel_drag(&mut self, scene: &mut Scene) -> SceneResult<()> {
        if let Drag::Elements { origins, .. } = std::mem::take(&mut self.drag) {
            for (id, origin) in origins {
                if scene.contains(id) {
                    scene.move_element(id, origin)?;
                }
            }
        }
        self.drag = Drag::None;
        scene.clear_hovered_socket_element();
        Ok(())
    }
}

impl DrawingControl for SelectControl {
    fn name(&self) -> &'static str {
        "select"
    }

    fn deactivate(&mut self, scene: &mut Scene) -> SceneResult<()> {
        self.drag = Drag::None;
        scene.set_focus(None);
        scene.clear_hovered_socket_element();
        Ok(())
    }

    fn on_mouse_down(&mut self, scene: &mut Scene, event: &MouseEvent) -> SceneResult<Flow> {
        if event.button != Some(MouseButton::Left) {
            return Ok(Flow::Continue);
        }

        if let Some(cp) = scene.control_point_at(event.position)? {
            if matches!(scene.control_point(cp)?.kind, ControlPointKind::ActionMenu(_)) {
                scene.trigger_action(cp)?;
            } else {
                self.drag = Drag::ControlPoint(cp);
            }
            return Ok(Flow::Stop);
        }

        let Some(id) = scene.element_at(event.position) else {
            scene.clear_selection();
            return Ok(Flow::Continue);
        };

        if event.double_click && matches!(scene.element(id)?.kind, ElementKind::Text { .. }) {
            log::debug!("Editing text of {id}");
            self.next = Some(Box::new(TextEditControl::new(id)));
            return Ok(Flow::Stop);
        }

        if event.modifiers.shift {
            scene.toggle_selection(id);
        } else if !scene.is_selected(id) {
            scene.select(vec![id]);
        }
        self.start_element_drag(scene, event.position);
        Ok(Flow::Stop)
    }

    fn on_mouse_move(&mut self, scene: &mut Scene, event: &MouseEvent) -> SceneResult<Flow> {
        match &self.drag {
            Drag::None => {
                let hovered = scene.control_point_at(event.position)?;
                scene.set_focus(hovered);
                Ok(Flow::Continue)
            }
            Drag::ControlPoint(cp) => {
                let target = scene.root_to_parent(cp.element, event.position)?;
                scene.move_control_point(*cp, target)?;
                Ok(Flow::Stop)
            }
            Drag::Elements { start, origins } => {
                for (id, origin) in origins {
                    let from = scene.root_to_parent(*id, *start)?;
                    let to = scene.root_to_parent(*id, event.position)?;
                    let target = scene.settings.snap_point(origin.plus(to.minus(from)));
                    scene.move_element(*id, target)?;
                }
                Ok(Flow::Stop)
            }
        }
    }

    fn on_mouse_up(&mut self, scene: &mut Scene, event: &MouseEvent) -> SceneResult<Flow> {
        if event.button != Some(MouseButton::Left) {
            return Ok(Flow::Continue);
        }
        match std::mem::take(&mut self.drag) {
            Drag::None => Ok(Flow::Continue),
            Drag::ControlPoint(cp) => {
                scene.clear_hovered_socket_element();
                scene.notify(SceneChange::Interact {
                    element: cp.element,
                    kind: InteractionKind::Edit,
                });
                Ok(Flow::Stop)
            }
            Drag::Elements { .. } => Ok(Flow::Stop),
        }
    }

    fn on_key_down(&mut self, scene: &mut Scene, event: &KeyEvent) -> SceneResult<Flow> {
        match event.key {
            Key::Escape => {
                if self.is_dragging() {
                    self.cancel_drag(scene)?;
                } else {
                    scene.clear_selection();
                }
                Ok(Flow::Stop)
            }
            Key::Delete | Key::Backspace => {
                if self.is_dragging() {
                    return Ok(Flow::Stop);
                }
                for id in scene.selection().to_vec() {
                    if scene.contains(id) {
                        scene.remove(id)?;
                    }
                }
                Ok(Flow::Stop)
            }
            _ => Ok(Flow::Continue),
        }
    }

    fn take_next_control(&mut self) -> Option<Box<dyn DrawingControl>> {
        self.next.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::{ActionMenuItem, Alignment};
    use crate::geometry::Size;
    use crate::input::Modifiers;
    use crate::scene::DrawingElement;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn press(x: f64, y: f64) -> MouseEvent {
        MouseEvent::at(Point::new(x, y)).with_button(MouseButton::Left)
    }

    fn scene_with_box() -> (Scene, ElementId) {
        let mut scene = Scene::new();
        let id = scene
            .add(DrawingElement::rectangle(Point::new(100.0, 100.0), Size::new(100.0, 100.0)))
            .unwrap();
        (scene, id)
    }

    #[test]
    fn test_click_selects_and_empty_click_clears() {
        let (mut scene, id) = scene_with_box();
        let mut control = SelectControl::new();
        control.on_mouse_down(&mut scene, &press(100.0, 100.0)).unwrap();
        control.on_mouse_up(&mut scene, &press(100.0, 100.0)).unwrap();
        assert_eq!(scene.selection(), &[id]);

        control.on_mouse_down(&mut scene, &press(400.0, 400.0)).unwrap();
        assert!(scene.selection().is_empty());
    }

    #[test]
    fn test_shift_click_toggles() {
        let (mut scene, first) = scene_with_box();
        let second = scene
            .add(DrawingElement::rectangle(Point::new(300.0, 100.0), Size::new(50.0, 50.0)))
            .unwrap();
        let mut control = SelectControl::new();
        control.on_mouse_down(&mut scene, &press(100.0, 100.0)).unwrap();
        control.on_mouse_up(&mut scene, &press(100.0, 100.0)).unwrap();

        let mut shifted = press(300.0, 100.0);
        shifted.modifiers = Modifiers {
            shift: true,
            ..Modifiers::default()
        };
        control.on_mouse_down(&mut scene, &shifted).unwrap();
        control.on_mouse_up(&mut scene, &shifted).unwrap();
        assert_eq!(scene.selection(), &[first, second]);

        control.on_mouse_down(&mut scene, &shifted).unwrap();
        assert_eq!(scene.selection(), &[first]);
    }

    #[test]
    fn test_drag_moves_selection() {
        let (mut scene, id) = scene_with_box();
        let mut control = SelectControl::new();
        control.on_mouse_down(&mut scene, &press(90.0, 90.0)).unwrap();
        control
            .on_mouse_move(&mut scene, &MouseEvent::at(Point::new(120.0, 100.0)))
            .unwrap();
        control.on_mouse_up(&mut scene, &press(120.0, 100.0)).unwrap();
        assert_eq!(scene.element(id).unwrap().location, Point::new(130.0, 110.0));
        assert!(!control.is_dragging());
    }

    #[test]
    fn test_escape_cancels_drag() {
        let (mut scene, id) = scene_with_box();
        let mut control = SelectControl::new();
        control.on_mouse_down(&mut scene, &press(100.0, 100.0)).unwrap();
        control
            .on_mouse_move(&mut scene, &MouseEvent::at(Point::new(160.0, 100.0)))
            .unwrap();
        control
            .on_key_down(&mut scene, &KeyEvent::new(Key::Escape))
            .unwrap();
        assert_eq!(scene.element(id).unwrap().location, Point::new(100.0, 100.0));
        assert_eq!(scene.selection(), &[id]);
    }

    #[test]
    fn test_handle_drag_resizes() {
        let (mut scene, id) = scene_with_box();
        scene.select(vec![id]);
        let mut control = SelectControl::new();
        // Right edge handle, half a stroke outside the box.
        control.on_mouse_down(&mut scene, &press(150.5, 100.0)).unwrap();
        assert!(control.is_dragging());
        control
            .on_mouse_move(&mut scene, &MouseEvent::at(Point::new(200.5, 100.0)))
            .unwrap();
        control.on_mouse_up(&mut scene, &press(200.5, 100.0)).unwrap();

        let element = scene.element(id).unwrap();
        assert!((element.size.width - 150.0).abs() < 1e-9);
        assert!(element.location.approx_eq(Point::new(125.0, 100.0), 1e-9));
    }

    #[test]
    fn test_hover_focuses_handle() {
        let (mut scene, id) = scene_with_box();
        scene.select(vec![id]);
        let mut control = SelectControl::new();
        control
            .on_mouse_move(&mut scene, &MouseEvent::at(Point::new(150.5, 100.0)))
            .unwrap();
        let focus = scene.control_point(ControlPointRef::new(id, 5)).unwrap().focus;
        assert_eq!(focus, crate::control::FocusType::Hovered);
    }

    #[test]
    fn test_delete_removes_selection() {
        let (mut scene, id) = scene_with_box();
        scene.select(vec![id]);
        let mut control = SelectControl::new();
        control
            .on_key_down(&mut scene, &KeyEvent::new(Key::Delete))
            .unwrap();
        assert!(!scene.contains(id));
        assert!(scene.selection().is_empty());
    }

    #[test]
    fn test_action_menu_click_fires_action() {
        let mut scene = Scene::new();
        let item = ActionMenuItem::new("duplicate", "copy-icon", Alignment::parse("tr").unwrap());
        let id = scene
            .add(DrawingElement::rectangle(Point::new(100.0, 100.0), Size::new(100.0, 100.0)).with_action(item))
            .unwrap();
        scene.select(vec![id]);
        let actions = Rc::new(RefCell::new(Vec::new()));
        let log = actions.clone();
        scene.events.action.bind(move |e| {
            log.borrow_mut().push(e.action.clone());
            Flow::Continue
        });

        let index = scene.element(id).unwrap().control_points.len() - 1;
        let anchor = scene.control_point_anchor(ControlPointRef::new(id, index)).unwrap();
        let mut control = SelectControl::new();
        control.on_mouse_down(&mut scene, &press(anchor.x, anchor.y)).unwrap();
        assert_eq!(*actions.borrow(), vec!["duplicate".to_string()]);
        assert!(!control.is_dragging());
    }

    #[test]
    fn test_double_click_on_text_hands_over() {
        let mut scene = Scene::new();
        scene
            .add(DrawingElement::text(Point::new(50.0, 50.0), Size::new(100.0, 40.0), "hi"))
            .unwrap();
        let mut control = SelectControl::new();
        let mut click = press(50.0, 50.0);
        click.double_click = true;
        control.on_mouse_down(&mut scene, &click).unwrap();
        let next = control.take_next_control().unwrap();
        assert_eq!(next.name(), "text-edit");
    }
}
