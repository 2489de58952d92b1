//! Wiregram Core Library
//!
//! Platform-agnostic scene graph, geometry, canvas abstraction and
//! connector protocol for wiregram diagrams.

pub mod canvas;
pub mod connector;
pub mod control;
pub mod controls;
pub mod error;
pub mod event;
pub mod geometry;
pub mod input;
pub mod scene;
pub mod settings;
pub mod style;
pub mod transform;
pub mod viewport;

pub use canvas::{Canvas, RecordingSurface, Surface};
pub use connector::{Connection, ConnectionRecord, ElementLookup, Socket, SocketAnchor, SocketRef};
pub use control::{ControlPoint, ControlPointKind, ControlPointRef, FocusType};
pub use controls::{CreateControl, DrawingControl, RootContainer, SelectControl, ShapeFactory, TextEditControl};
pub use error::{SceneError, SceneResult};
pub use event::{Event, Flow};
pub use geometry::{Point, Polygon, Rectangle, Size};
pub use input::{InputState, Key, KeyEvent, MouseButton, MouseEvent, PointerEvent};
pub use scene::{DrawingElement, ElementId, ElementKind, InteractionKind, Scene, SceneChange};
pub use settings::{GRID_SIZE, Settings};
pub use style::{FillStyle, StrokeStyle, StyleRegistry, TextStyle};
pub use transform::TransformSet;
pub use viewport::Viewport;
