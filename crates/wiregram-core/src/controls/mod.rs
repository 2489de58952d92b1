//! Drawing controls: the interchangeable pointer and keyboard behaviours
//! that edit a scene.
//!
//! Exactly one control is active at a time. The [`RootContainer`] maps
//! window events into scene coordinates, hands them to the active control
//! and swaps controls when one asks to hand over.

mod create;
mod select;
mod text;

pub use create::{CreateControl, ElementFactory, ShapeFactory};
pub use select::SelectControl;
pub use text::TextEditControl;

use crate::canvas::Canvas;
use crate::error::SceneResult;
use crate::event::Flow;
use crate::geometry::Point;
use crate::input::{InputState, KeyEvent, MouseButton, MouseEvent, PointerEvent};
use crate::scene::Scene;

/// Zoom factor applied per scroll step.
const ZOOM_STEP: f64 = 1.1;

/// One editing behaviour.
pub trait DrawingControl {
    fn name(&self) -> &'static str;

    fn activate(&mut self, _scene: &mut Scene) -> SceneResult<()> {
        Ok(())
    }

    fn deactivate(&mut self, _scene: &mut Scene) -> SceneResult<()> {
        Ok(())
    }

    fn on_mouse_down(&mut self, scene: &mut Scene, event: &MouseEvent) -> SceneResult<Flow>;

    fn on_mouse_move(&mut self, scene: &mut Scene, event: &MouseEvent) -> SceneResult<Flow>;

    fn on_mouse_up(&mut self, scene: &mut Scene, event: &MouseEvent) -> SceneResult<Flow>;

    fn on_key_down(&mut self, _scene: &mut Scene, _event: &KeyEvent) -> SceneResult<Flow> {
        Ok(Flow::Continue)
    }

    /// Overlay drawn after the scene.
    fn draw(&mut self, _scene: &mut Scene, _canvas: &mut Canvas<'_>) -> SceneResult<()> {
        Ok(())
    }

    /// The control to switch to, if this one is finished.
    fn take_next_control(&mut self) -> Option<Box<dyn DrawingControl>> {
        None
    }
}

/// Owns the scene and routes input to the active drawing control.
pub struct RootContainer {
    scene: Scene,
    input: InputState,
    active: Box<dyn DrawingControl>,
}

impl RootContainer {
    pub fn new(mut scene: Scene) -> SceneResult<Self> {
        let mut active: Box<dyn DrawingControl> = Box::new(SelectControl::new());
        active.activate(&mut scene)?;
        Ok(Self {
            scene,
            input: InputState::new(),
            active,
        })
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    pub fn into_scene(self) -> Scene {
        self.scene
    }

    pub fn input(&self) -> &InputState {
        &self.input
    }

    pub fn active_control(&self) -> &'static str {
        self.active.name()
    }

    /// Deactivate the current control, then activate `control`.
    pub fn set_active_control(&mut self, mut control: Box<dyn DrawingControl>) -> SceneResult<()> {
        log::info!("Switching control: {} -> {}", self.active.name(), control.name());
        self.active.deactivate(&mut self.scene)?;
        control.activate(&mut self.scene)?;
        self.active = control;
        Ok(())
    }

    /// Feed one window-space pointer event through the active control.
    pub fn handle_pointer_event(&mut self, event: PointerEvent) -> SceneResult<Flow> {
        self.input.handle_pointer_event(event);
        let flow = match event {
            PointerEvent::Down { position, button } => {
                let mouse = self.mouse_event(position, Some(button));
                self.active.on_mouse_down(&mut self.scene, &mouse)?
            }
            PointerEvent::Move { position } => {
                let mouse = self.mouse_event(position, None);
                self.active.on_mouse_move(&mut self.scene, &mouse)?
            }
            PointerEvent::Up { position, button } => {
                let mut mouse = self.mouse_event(position, Some(button));
                // The input state already ended the drag; controls still
                // want to know where it began.
                if button == MouseButton::Left {
                    mouse.drag_start = None;
                }
                self.active.on_mouse_up(&mut self.scene, &mouse)?
            }
            PointerEvent::Scroll { position, delta } => {
                let factor = if delta < 0.0 { ZOOM_STEP } else { 1.0 / ZOOM_STEP };
                self.scene.zoom_at(position, factor);
                Flow::Stop
            }
        };
        self.follow_handover()?;
        Ok(flow)
    }

    pub fn handle_key_event(&mut self, event: KeyEvent) -> SceneResult<Flow> {
        self.input.set_modifiers(event.modifiers);
        let flow = self.active.on_key_down(&mut self.scene, &event)?;
        self.follow_handover()?;
        Ok(flow)
    }

    /// Draw the scene and the active control's overlay.
    pub fn draw(&mut self, canvas: &mut Canvas<'_>) -> SceneResult<()> {
        self.scene.draw(canvas)?;
        self.active.draw(&mut self.scene, canvas)
    }

    fn mouse_event(&self, window_position: Point, button: Option<MouseButton>) -> MouseEvent {
        let viewport = self.scene.viewport();
        MouseEvent {
            position: viewport.window_to_scene(window_position),
            window_position,
            button,
            modifiers: self.input.modifiers,
            drag_start: self.input.drag_start.map(|p| viewport.window_to_scene(p)),
            double_click: self.input.is_double_click(),
        }
    }

    fn follow_handover(&mut self) -> SceneResult<()> {
        if let Some(next) = self.active.take_next_control() {
            self.set_active_control(next)?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for RootContainer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RootContainer")
            .field("scene", &self.scene)
            .field("input", &self.input)
            .field("active", &self.active.name())
            .finish()
    }
}
