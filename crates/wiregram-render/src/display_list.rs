//! Renderer that produces a kurbo/peniko display list.

use kurbo::{Affine, BezPath, Point, Rect, Stroke};
use peniko::{Brush, Color};
use wiregram_core::RootContainer;
use wiregram_core::canvas::Canvas;

use crate::renderer::{GridStyle, RenderContext, RenderResult, Renderer, RendererError};
use crate::surface::{DrawItem, KurboSurface};

/// Builds one display list per frame: grid, scene, control overlay.
#[derive(Debug, Clone, Default)]
pub struct DisplayListRenderer {
    surface: KurboSurface,
}

impl DisplayListRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Items of the last built frame.
    pub fn items(&self) -> &[DrawItem] {
        self.surface.items()
    }

    pub fn take_items(&mut self) -> Vec<DrawItem> {
        self.surface.take_items()
    }

    /// Grid extent in world coordinates covering `viewport`.
    fn grid_bounds(&self, viewport: Rect, transform: Affine, grid_size: f64) -> (f64, f64, f64, f64) {
        let inv = transform.inverse();
        let world_tl = inv * Point::new(viewport.x0, viewport.y0);
        let world_br = inv * Point::new(viewport.x1, viewport.y1);

        let start_x = (world_tl.x / grid_size).floor() * grid_size;
        let start_y = (world_tl.y / grid_size).floor() * grid_size;
        let end_x = (world_br.x / grid_size).ceil() * grid_size;
        let end_y = (world_br.y / grid_size).ceil() * grid_size;

        (start_x, start_y, end_x, end_y)
    }

    fn stroke(&mut self, path: BezPath, transform: Affine, style: Stroke, color: Color) {
        self.surface.push(DrawItem::Stroke {
            path,
            transform,
            style,
            brush: Brush::Solid(color),
        });
    }

    /// Render full grid lines.
    fn render_grid_lines(&mut self, viewport: Rect, view: Affine, base: Affine, grid_size: f64) {
        let grid_color = Color::from_rgba8(200, 200, 200, 100);
        let stroke = Stroke::new(0.5);
        let transform = base * view;

        let (start_x, start_y, end_x, end_y) = self.grid_bounds(viewport, view, grid_size);

        // Vertical lines
        let mut x = start_x;
        while x <= end_x {
            let mut path = BezPath::new();
            path.move_to(Point::new(x, start_y));
            path.line_to(Point::new(x, end_y));
            self.stroke(path, transform, stroke.clone(), grid_color);
            x += grid_size;
        }

        // Horizontal lines
        let mut y = start_y;
        while y <= end_y {
            let mut path = BezPath::new();
            path.move_to(Point::new(start_x, y));
            path.line_to(Point::new(end_x, y));
            self.stroke(path, transform, stroke.clone(), grid_color);
            y += grid_size;
        }
    }

    /// Render grid as small crosses (+) at intersections, batched into one
    /// path.
    fn render_grid_crosses(&mut self, viewport: Rect, view: Affine, base: Affine, grid_size: f64) {
        let grid_color = Color::from_rgba8(180, 180, 180, 60);
        let cross_size = 3.0;

        let (start_x, start_y, end_x, end_y) = self.grid_bounds(viewport, view, grid_size);

        let mut path = BezPath::new();
        let mut x = start_x;
        while x <= end_x {
            let mut y = start_y;
            while y <= end_y {
                path.move_to(Point::new(x - cross_size, y));
                path.line_to(Point::new(x + cross_size, y));
                path.move_to(Point::new(x, y - cross_size));
                path.line_to(Point::new(x, y + cross_size));
                y += grid_size;
            }
            x += grid_size;
        }

        self.stroke(path, base * view, Stroke::new(1.0), grid_color);
    }

    /// Render grid as dots at intersections, batched into one path.
    fn render_grid_dots(&mut self, viewport: Rect, view: Affine, base: Affine, grid_size: f64) {
        let grid_color = Color::from_rgba8(160, 160, 160, 70);
        let dot_size = 1.5;

        let (start_x, start_y, end_x, end_y) = self.grid_bounds(viewport, view, grid_size);

        let mut path = BezPath::new();
        let mut x = start_x;
        while x <= end_x {
            let mut y = start_y;
            while y <= end_y {
                // Small squares are cheaper than ellipses.
                let rect = Rect::new(x - dot_size, y - dot_size, x + dot_size, y + dot_size);
                path.move_to(Point::new(rect.x0, rect.y0));
                path.line_to(Point::new(rect.x1, rect.y0));
                path.line_to(Point::new(rect.x1, rect.y1));
                path.line_to(Point::new(rect.x0, rect.y1));
                path.close_path();
                y += grid_size;
            }
            x += grid_size;
        }

        self.surface.push(DrawItem::Fill {
            path,
            transform: base * view,
            brush: Brush::Solid(grid_color),
        });
    }
}

impl Renderer for DisplayListRenderer {
    fn build_scene(&mut self, root: &mut RootContainer, ctx: &RenderContext) -> RenderResult<()> {
        if ctx.viewport_size.width <= 0.0 || ctx.viewport_size.height <= 0.0 {
            return Err(RendererError::RenderFailed(format!(
                "Empty viewport {}x{}",
                ctx.viewport_size.width, ctx.viewport_size.height
            )));
        }
        let base = Affine::scale(ctx.scale_factor);
        self.surface.reset(base);

        let scene = root.scene();
        let view = scene.viewport().transform_set().to_affine();
        let grid_size = scene.settings.grid_size;
        let viewport = Rect::new(0.0, 0.0, ctx.viewport_size.width, ctx.viewport_size.height);
        if grid_size > 0.0 {
            match ctx.grid_style {
                GridStyle::None => {}
                GridStyle::Lines => self.render_grid_lines(viewport, view, base, grid_size),
                GridStyle::CrossPlus => self.render_grid_crosses(viewport, view, base, grid_size),
                GridStyle::Dots => self.render_grid_dots(viewport, view, base, grid_size),
            }
        }
        let grid_items = self.surface.items().len();

        let mut canvas = Canvas::new(&mut self.surface);
        if let Some(images) = ctx.images {
            canvas = canvas.with_images(images);
        }
        root.draw(&mut canvas)?;

        log::debug!(
            "Built frame: {} grid item(s), {} scene item(s)",
            grid_items,
            self.surface.items().len() - grid_items
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Size;
    use wiregram_core::canvas::{ImageInfo, MemoryImageStore};
    use wiregram_core::geometry::{Point as ScenePoint, Size as SceneSize};
    use wiregram_core::scene::{DrawingElement, Scene};

    fn root_with_box() -> RootContainer {
        let mut scene = Scene::new();
        scene
            .add(DrawingElement::rectangle(ScenePoint::new(50.0, 50.0), SceneSize::new(20.0, 20.0)))
            .unwrap();
        RootContainer::new(scene).unwrap()
    }

    fn frame(root: &mut RootContainer, ctx: &RenderContext) -> Vec<DrawItem> {
        let mut renderer = DisplayListRenderer::new();
        renderer.build_scene(root, ctx).unwrap();
        renderer.take_items()
    }

    #[test]
    fn test_grid_lines_then_scene() {
        let mut root = root_with_box();
        let ctx = RenderContext::new(Size::new(100.0, 100.0));
        let items = frame(&mut root, &ctx);
        // Six vertical and six horizontal lines every 20 units, then the box.
        assert_eq!(items.len(), 13);
        assert!(matches!(items.last(), Some(DrawItem::Stroke { .. })));
    }

    #[test]
    fn test_batched_grid_styles() {
        let mut root = root_with_box();
        let crosses = frame(&mut root, &RenderContext::new(Size::new(100.0, 100.0)).with_grid(GridStyle::CrossPlus));
        assert_eq!(crosses.len(), 2);
        let dots = frame(&mut root, &RenderContext::new(Size::new(100.0, 100.0)).with_grid(GridStyle::Dots));
        assert!(matches!(dots[0], DrawItem::Fill { .. }));
        let none = frame(&mut root, &RenderContext::new(Size::new(100.0, 100.0)).with_grid(GridStyle::None));
        assert_eq!(none.len(), 1);
    }

    #[test]
    fn test_scale_factor_applies_to_scene() {
        let mut root = root_with_box();
        let ctx = RenderContext::new(Size::new(100.0, 100.0))
            .with_grid(GridStyle::None)
            .with_scale_factor(2.0);
        let items = frame(&mut root, &ctx);
        let bounds = items[0].bounds();
        // The 20x20 box centered at (50, 50), doubled, plus the half pixel
        // crisp offset.
        assert!((bounds.x0 - 81.0).abs() < 1e-9);
        assert!((bounds.width() - 40.0).abs() < 1e-9);
    }

    #[test]
    fn test_images_resolve_through_context() {
        let mut scene = Scene::new();
        scene
            .add(DrawingElement::image(ScenePoint::new(50.0, 50.0), SceneSize::new(20.0, 20.0), "logo"))
            .unwrap();
        let mut root = RootContainer::new(scene).unwrap();

        let missing = frame(&mut root, &RenderContext::new(Size::new(100.0, 100.0)).with_grid(GridStyle::None));
        assert!(missing.is_empty());

        let mut store = MemoryImageStore::new();
        store.insert(ImageInfo::new("logo", 64.0, 64.0));
        let ctx = RenderContext::new(Size::new(100.0, 100.0))
            .with_grid(GridStyle::None)
            .with_images(&store);
        let items = frame(&mut root, &ctx);
        assert!(matches!(&items[0], DrawItem::Image { name, .. } if name == "logo"));
    }

    #[test]
    fn test_empty_viewport_is_an_error() {
        let mut root = root_with_box();
        let mut renderer = DisplayListRenderer::new();
        let result = renderer.build_scene(&mut root, &RenderContext::new(Size::ZERO));
        assert!(matches!(result, Err(RendererError::RenderFailed(_))));
    }
}
