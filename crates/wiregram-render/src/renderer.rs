//! Renderer trait abstraction.

use kurbo::Size;
use peniko::Color;
use thiserror::Error;
use wiregram_core::RootContainer;
use wiregram_core::canvas::ImageStore;
use wiregram_core::error::SceneError;

/// Renderer errors.
#[derive(Debug, Error)]
pub enum RendererError {
    #[error("Render failed: {0}")]
    RenderFailed(String),
    #[error(transparent)]
    Scene(#[from] SceneError),
}

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RendererError>;

/// Grid display style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GridStyle {
    /// No grid (plain background).
    None,
    /// Full grid lines.
    #[default]
    Lines,
    /// Only corner crosses (+).
    CrossPlus,
    /// Only corner dots (.).
    Dots,
}

impl GridStyle {
    /// Cycle to the next grid style.
    pub fn next(self) -> Self {
        match self {
            GridStyle::None => GridStyle::Lines,
            GridStyle::Lines => GridStyle::CrossPlus,
            GridStyle::CrossPlus => GridStyle::Dots,
            GridStyle::Dots => GridStyle::None,
        }
    }

    /// Get display name for this grid style.
    pub fn name(self) -> &'static str {
        match self {
            GridStyle::None => "None",
            GridStyle::Lines => "Lines",
            GridStyle::CrossPlus => "Crosses",
            GridStyle::Dots => "Dots",
        }
    }
}

/// Context for a single render frame.
pub struct RenderContext<'a> {
    /// Viewport size in logical pixels.
    pub viewport_size: Size,
    /// Device pixel ratio (for HiDPI).
    pub scale_factor: f64,
    /// Background color.
    pub background_color: Color,
    /// Grid display style.
    pub grid_style: GridStyle,
    /// Where image elements look up their pixels.
    pub images: Option<&'a dyn ImageStore>,
}

impl<'a> RenderContext<'a> {
    /// Create a new render context.
    pub fn new(viewport_size: Size) -> Self {
        Self {
            viewport_size,
            scale_factor: 1.0,
            background_color: Color::from_rgba8(250, 250, 250, 255),
            grid_style: GridStyle::Lines,
            images: None,
        }
    }

    /// Set the scale factor for HiDPI.
    pub fn with_scale_factor(mut self, scale_factor: f64) -> Self {
        self.scale_factor = scale_factor;
        self
    }

    /// Set the background color.
    pub fn with_background(mut self, color: Color) -> Self {
        self.background_color = color;
        self
    }

    /// Set the grid style.
    pub fn with_grid(mut self, style: GridStyle) -> Self {
        self.grid_style = style;
        self
    }

    pub fn with_images(mut self, images: &'a dyn ImageStore) -> Self {
        self.images = Some(images);
        self
    }
}

/// Trait for rendering backends.
pub trait Renderer: Send + Sync {
    /// Build the drawing commands for one frame: background grid, scene,
    /// then the active control's overlay.
    fn build_scene(&mut self, root: &mut RootContainer, ctx: &RenderContext) -> RenderResult<()>;

    /// Get the background color (for clearing).
    fn background_color(&self, ctx: &RenderContext) -> Color {
        ctx.background_color
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_style_cycle() {
        let mut style = GridStyle::default();
        let mut names = Vec::new();
        for _ in 0..4 {
            names.push(style.name());
            style = style.next();
        }
        assert_eq!(names, ["Lines", "Crosses", "Dots", "None"]);
        assert_eq!(style, GridStyle::Lines);
    }

    #[test]
    fn test_scene_errors_convert() {
        let err: RendererError = SceneError::RootElement.into();
        assert!(matches!(err, RendererError::Scene(SceneError::RootElement)));
    }
}
