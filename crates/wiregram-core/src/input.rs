//! Input events and the pointer state tracked between them.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Instant;

use crate::geometry::Point;

/// Mouse button identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// Modifier keys state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

/// Raw pointer input, in window coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PointerEvent {
    Down { position: Point, button: MouseButton },
    Up { position: Point, button: MouseButton },
    Move { position: Point },
    Scroll { position: Point, delta: f64 },
}

/// Keys the drawing controls react to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    Escape,
    Enter,
    Backspace,
    Delete,
    Tab,
    Char(char),
}

/// A key press with the modifiers held at the time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyEvent {
    pub key: Key,
    pub modifiers: Modifiers,
}

impl KeyEvent {
    pub fn new(key: Key) -> Self {
        Self {
            key,
            modifiers: Modifiers::default(),
        }
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }
}

/// A pointer event as seen by drawing controls: positions already mapped
/// into scene coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MouseEvent {
    /// Position in scene coordinates.
    pub position: Point,
    /// Position in window pixels.
    pub window_position: Point,
    /// Button that changed state; `None` for moves.
    pub button: Option<MouseButton>,
    pub modifiers: Modifiers,
    /// Scene position where the current left-button drag started.
    pub drag_start: Option<Point>,
    pub double_click: bool,
}

impl MouseEvent {
    /// A synthetic event at a scene position, without window context.
    pub fn at(position: Point) -> Self {
        Self {
            position,
            window_position: position,
            button: None,
            modifiers: Modifiers::default(),
            drag_start: None,
            double_click: false,
        }
    }

    pub fn with_button(mut self, button: MouseButton) -> Self {
        self.button = Some(button);
        self
    }

    pub fn is_dragging(&self) -> bool {
        self.drag_start.is_some()
    }
}

/// Double-click detection constants.
const DOUBLE_CLICK_TIME_MS: u128 = 500;
const DOUBLE_CLICK_DISTANCE: f64 = 5.0;

/// Pointer and modifier state carried between events.
#[derive(Debug, Clone, Default)]
pub struct InputState {
    /// Current pointer position in window coordinates.
    pub pointer_position: Point,
    pressed_buttons: HashSet<MouseButton>,
    pub modifiers: Modifiers,
    /// Window position where the current left-button drag started.
    pub drag_start: Option<Point>,
    last_click_time: Option<Instant>,
    last_click_position: Option<Point>,
    double_click_detected: bool,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handle_pointer_event(&mut self, event: PointerEvent) {
        self.double_click_detected = false;
        match event {
            PointerEvent::Down { position, button } => {
                self.pointer_position = position;
                self.pressed_buttons.insert(button);
                if button == MouseButton::Left {
                    let now = Instant::now();
                    let repeat = match (self.last_click_time, self.last_click_position) {
                        (Some(last_time), Some(last_pos)) => {
                            now.duration_since(last_time).as_millis() < DOUBLE_CLICK_TIME_MS
                                && position.distance_to(last_pos) < DOUBLE_CLICK_DISTANCE
                        }
                        _ => false,
                    };
                    if repeat {
                        self.double_click_detected = true;
                        // A third click starts over.
                        self.last_click_time = None;
                        self.last_click_position = None;
                    } else {
                        self.last_click_time = Some(now);
                        self.last_click_position = Some(position);
                    }
                    self.drag_start.get_or_insert(position);
                }
            }
            PointerEvent::Up { position, button } => {
                self.pointer_position = position;
                self.pressed_buttons.remove(&button);
                if button == MouseButton::Left {
                    self.drag_start = None;
                }
            }
            PointerEvent::Move { position } | PointerEvent::Scroll { position, .. } => {
                self.pointer_position = position;
            }
        }
    }

    pub fn set_modifiers(&mut self, modifiers: Modifiers) {
        self.modifiers = modifiers;
    }

    pub fn is_button_pressed(&self, button: MouseButton) -> bool {
        self.pressed_buttons.contains(&button)
    }

    /// Whether the last pointer event completed a double click.
    pub fn is_double_click(&self) -> bool {
        self.double_click_detected
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn down(x: f64, y: f64) -> PointerEvent {
        PointerEvent::Down {
            position: Point::new(x, y),
            button: MouseButton::Left,
        }
    }

    fn up(x: f64, y: f64) -> PointerEvent {
        PointerEvent::Up {
            position: Point::new(x, y),
            button: MouseButton::Left,
        }
    }

    #[test]
    fn test_drag_tracking() {
        let mut input = InputState::new();
        input.handle_pointer_event(down(10.0, 10.0));
        assert!(input.is_button_pressed(MouseButton::Left));
        input.handle_pointer_event(PointerEvent::Move {
            position: Point::new(30.0, 40.0),
        });
        assert_eq!(input.drag_start, Some(Point::new(10.0, 10.0)));
        assert_eq!(input.pointer_position, Point::new(30.0, 40.0));
        input.handle_pointer_event(up(30.0, 40.0));
        assert!(input.drag_start.is_none());
        assert!(!input.is_button_pressed(MouseButton::Left));
    }

    #[test]
    fn test_double_click_detection() {
        let mut input = InputState::new();
        input.handle_pointer_event(down(100.0, 100.0));
        assert!(!input.is_double_click());
        input.handle_pointer_event(up(100.0, 100.0));
        input.handle_pointer_event(down(101.0, 100.0));
        assert!(input.is_double_click());
        input.handle_pointer_event(up(101.0, 100.0));
        assert!(!input.is_double_click());
    }

    #[test]
    fn test_double_click_too_far() {
        let mut input = InputState::new();
        input.handle_pointer_event(down(100.0, 100.0));
        input.handle_pointer_event(up(100.0, 100.0));
        input.handle_pointer_event(down(200.0, 200.0));
        assert!(!input.is_double_click());
    }
}
