//! Wiregram Render Library
//!
//! Renderer abstraction and a display-list implementation for wiregram
//! scenes. The display list holds kurbo paths and peniko brushes, so any
//! vector or GPU backend can replay it.

mod display_list;
mod renderer;
pub mod surface;

pub use display_list::DisplayListRenderer;
pub use renderer::{GridStyle, RenderContext, RenderResult, Renderer, RendererError};
pub use surface::{DrawItem, KurboSurface};
