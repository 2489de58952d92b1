//! In-place text editing.

use super::{DrawingControl, SelectControl};
use crate::canvas::{Canvas, TextLayout, layout_text};
use crate::error::SceneResult;
use crate::event::Flow;
use crate::input::{Key, KeyEvent, MouseButton, MouseEvent};
use crate::scene::{ElementId, ElementKind, InteractionKind, Scene, SceneChange};

fn text_of(scene: &Scene, id: ElementId) -> SceneResult<Option<String>> {
    Ok(match &scene.element(id)?.kind {
        ElementKind::Text { text } => Some(text.clone()),
        _ => None,
    })
}

fn byte_offset(text: &str, chars: usize) -> usize {
    text.char_indices()
        .nth(chars)
        .map(|(i, _)| i)
        .unwrap_or(text.len())
}

/// Edits the text of one element. Ctrl+Enter or a click outside commits,
/// Escape restores the text the edit started with.
pub struct TextEditControl {
    element: ElementId,
    original: String,
    /// Caret position in characters.
    cursor: usize,
    layout: Option<TextLayout>,
    finished: bool,
    handed_over: bool,
}

impl TextEditControl {
    pub fn new(element: ElementId) -> Self {
        Self {
            element,
            original: String::new(),
            cursor: 0,
            layout: None,
            finished: false,
            handed_over: false,
        }
    }

    pub fn element(&self) -> ElementId {
        self.element
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    fn edit(&mut self, scene: &mut Scene, f: impl FnOnce(&mut String, &mut usize)) -> SceneResult<()> {
        let Some(mut text) = text_of(scene, self.element)? else {
            return Ok(());
        };
        f(&mut text, &mut self.cursor);
        scene.set_text(self.element, text)
    }

    fn commit(&mut self, scene: &mut Scene) {
        if !self.finished {
            scene.notify(SceneChange::Interact {
                element: self.element,
                kind: InteractionKind::Edit,
            });
        }
        self.finished = true;
    }
}

impl DrawingControl for TextEditControl {
    fn name(&self) -> &'static str {
        "text-edit"
    }

    fn activate(&mut self, scene: &mut Scene) -> SceneResult<()> {
        match text_of(scene, self.element)? {
            Some(text) => {
                self.cursor = text.chars().count();
                self.original = text;
                scene.select(vec![self.element]);
            }
            None => {
                log::warn!("Element {} has no text to edit", self.element);
                self.finished = true;
            }
        }
        Ok(())
    }

    fn deactivate(&mut self, scene: &mut Scene) -> SceneResult<()> {
        if scene.contains(self.element) {
            self.commit(scene);
        }
        Ok(())
    }

    fn on_mouse_down(&mut self, scene: &mut Scene, event: &MouseEvent) -> SceneResult<Flow> {
        if event.button != Some(MouseButton::Left) {
            return Ok(Flow::Continue);
        }
        let local = scene.root_to_local(self.element, event.position)?;
        let inside = scene.local_bounds(self.element)?.contains_point(local);
        if !inside {
            self.commit(scene);
            return Ok(Flow::Continue);
        }
        if let Some(layout) = &self.layout {
            self.cursor = layout.cursor_at(local);
        }
        Ok(Flow::Stop)
    }

    fn on_mouse_move(&mut self, _scene: &mut Scene, _event: &MouseEvent) -> SceneResult<Flow> {
        Ok(Flow::Continue)
    }

    fn on_mouse_up(&mut self, _scene: &mut Scene, _event: &MouseEvent) -> SceneResult<Flow> {
        Ok(Flow::Continue)
    }

    fn on_key_down(&mut self, scene: &mut Scene, event: &KeyEvent) -> SceneResult<Flow> {
        match event.key {
            Key::Char(c) => self.edit(scene, |text, cursor| {
                text.insert(byte_offset(text, *cursor), c);
                *cursor += 1;
            })?,
            Key::Enter if event.modifiers.ctrl => self.commit(scene),
            Key::Enter => self.edit(scene, |text, cursor| {
                text.insert(byte_offset(text, *cursor), '\n');
                *cursor += 1;
            })?,
            Key::Backspace => self.edit(scene, |text, cursor| {
                if *cursor > 0 {
                    *cursor -= 1;
                    text.remove(byte_offset(text, *cursor));
                }
            })?,
            Key::Delete => self.edit(scene, |text, cursor| {
                if *cursor < text.chars().count() {
                    text.remove(byte_offset(text, *cursor));
                }
            })?,
            Key::Escape => {
                scene.set_text(self.element, self.original.clone())?;
                self.finished = true;
            }
            Key::Tab => return Ok(Flow::Continue),
        }
        Ok(Flow::Stop)
    }

    /// Draw the caret and remember the layout for click placement.
    fn draw(&mut self, scene: &mut Scene, canvas: &mut Canvas<'_>) -> SceneResult<()> {
        let Some(text) = text_of(scene, self.element)? else {
            return Ok(());
        };
        let element = scene.element(self.element)?;
        let style = scene.styles.text(&element.text_style);
        let layout = layout_text(&text, element.local_bounds(), style, &*canvas);
        let top = layout.cursor_position(self.cursor);
        let bottom = top.translated(0.0, layout.line_height);

        let transform = scene.transform_set_for(self.element)?;
        canvas.draw_line(top, bottom);
        canvas.paint(Some(scene.styles.stroke("control-point")), None, &transform);
        self.layout = Some(layout);
        Ok(())
    }

    fn take_next_control(&mut self) -> Option<Box<dyn DrawingControl>> {
        if !self.finished || self.handed_over {
            return None;
        }
        self.handed_over = true;
        Some(Box::new(SelectControl::new()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::{RecordingSurface, SurfaceCommand};
    use crate::controls::RootContainer;
    use crate::controls::tests::{down, up};
    use crate::geometry::{Point, Size};
    use crate::input::Modifiers;
    use crate::scene::DrawingElement;

    fn editing(text: &str) -> (Scene, ElementId, TextEditControl) {
        let mut scene = Scene::new();
        let id = scene
            .add(DrawingElement::text(Point::new(100.0, 100.0), Size::new(200.0, 50.0), text))
            .unwrap();
        let mut control = TextEditControl::new(id);
        control.activate(&mut scene).unwrap();
        (scene, id, control)
    }

    fn key(control: &mut TextEditControl, scene: &mut Scene, key: Key) {
        control.on_key_down(scene, &KeyEvent::new(key)).unwrap();
    }

    fn current(scene: &Scene, id: ElementId) -> String {
        text_of(scene, id).unwrap().unwrap()
    }

    #[test]
    fn test_typing_appends_at_cursor() {
        let (mut scene, id, mut control) = editing("ab");
        key(&mut control, &mut scene, Key::Char('c'));
        key(&mut control, &mut scene, Key::Enter);
        key(&mut control, &mut scene, Key::Char('é'));
        assert_eq!(current(&scene, id), "abc\né");
        key(&mut control, &mut scene, Key::Backspace);
        key(&mut control, &mut scene, Key::Backspace);
        assert_eq!(current(&scene, id), "abc");
        assert_eq!(control.cursor(), 3);
    }

    #[test]
    fn test_escape_restores_original() {
        let (mut scene, id, mut control) = editing("keep");
        key(&mut control, &mut scene, Key::Backspace);
        key(&mut control, &mut scene, Key::Escape);
        assert_eq!(current(&scene, id), "keep");
        assert_eq!(control.take_next_control().map(|c| c.name()), Some("select"));
    }

    #[test]
    fn test_ctrl_enter_commits() {
        let (mut scene, _, mut control) = editing("done");
        let event = KeyEvent::new(Key::Enter).with_modifiers(Modifiers {
            ctrl: true,
            ..Modifiers::default()
        });
        control.on_key_down(&mut scene, &event).unwrap();
        assert!(control.take_next_control().is_some());
    }

    #[test]
    fn test_click_outside_commits() {
        let (mut scene, _, mut control) = editing("x");
        let click = MouseEvent::at(Point::new(500.0, 500.0)).with_button(MouseButton::Left);
        assert_eq!(control.on_mouse_down(&mut scene, &click).unwrap(), Flow::Continue);
        assert!(control.take_next_control().is_some());
    }

    #[test]
    fn test_click_inside_places_cursor() {
        let (mut scene, _, mut control) = editing("abcdef");
        let mut surface = RecordingSurface::new();
        control.draw(&mut scene, &mut Canvas::new(&mut surface)).unwrap();
        assert!(surface
            .commands()
            .iter()
            .any(|c| matches!(c, SurfaceCommand::Stroke(_))));

        let layout = control.layout.clone().unwrap();
        let target = layout.cursor_position(2);
        let scene_point = scene.local_to_root(control.element(), target.translated(0.5, 1.0)).unwrap();
        let click = MouseEvent::at(scene_point).with_button(MouseButton::Left);
        assert_eq!(control.on_mouse_down(&mut scene, &click).unwrap(), Flow::Stop);
        assert_eq!(control.cursor(), 2);
    }

    #[test]
    fn test_double_click_enters_and_escape_leaves() {
        let mut scene = Scene::new();
        let id = scene
            .add(DrawingElement::text(Point::new(100.0, 100.0), Size::new(200.0, 50.0), "hi"))
            .unwrap();
        let mut root = RootContainer::new(scene).unwrap();
        root.handle_pointer_event(down(100.0, 100.0)).unwrap();
        root.handle_pointer_event(up(100.0, 100.0)).unwrap();
        root.handle_pointer_event(down(100.0, 100.0)).unwrap();
        assert_eq!(root.active_control(), "text-edit");
        root.handle_pointer_event(up(100.0, 100.0)).unwrap();

        root.handle_key_event(KeyEvent::new(Key::Char('!'))).unwrap();
        assert_eq!(current(root.scene(), id), "hi!");
        root.handle_key_event(KeyEvent::new(Key::Escape)).unwrap();
        assert_eq!(root.active_control(), "select");
        assert_eq!(current(root.scene(), id), "hi");
    }
}
