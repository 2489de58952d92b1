//! Canvas abstraction over a [`Surface`].
//!
//! Path primitives are queued on a [`PathBatch`] and only reach the surface
//! when [`Canvas::paint`] commits them with a stroke and/or fill style. Text
//! and images are drawn immediately.

mod batch;
mod dash;
mod image;
mod surface;
mod text;

pub use batch::{PathBatch, PathOp};
pub use dash::DashState;
pub use image::{ImageInfo, ImageStore, MemoryImageStore};
pub use surface::{
    Font, LineCap, LineJoin, Paint, RecordingSurface, StrokeParams, Surface, SurfaceCommand,
    TextMeasure,
};
pub use text::{HorizontalAlign, TextLayout, TextLine, VerticalAlign, layout_text};

use crate::geometry::{Point, Polygon, Rectangle};
use crate::style::{FillStyle, StrokeStyle, TextStyle};
use crate::transform::TransformSet;

/// Drawing front end that batches path primitives until they are painted.
pub struct Canvas<'a> {
    surface: &'a mut dyn Surface,
    images: Option<&'a dyn ImageStore>,
    pending: PathBatch,
}

impl<'a> Canvas<'a> {
    pub fn new(surface: &'a mut dyn Surface) -> Self {
        Self {
            surface,
            images: None,
            pending: PathBatch::new(),
        }
    }

    /// Attach the store images are looked up in.
    pub fn with_images(mut self, images: &'a dyn ImageStore) -> Self {
        self.images = Some(images);
        self
    }

    /// Clear the surface. A batch that was never painted is discarded.
    pub fn clear(&mut self) {
        if !self.pending.is_empty() {
            log::warn!(
                "Discarding {} path operation(s) that were never painted",
                self.pending.len()
            );
            self.pending = PathBatch::new();
        }
        self.surface.clear();
    }

    /// Whether primitives are queued and waiting for [`paint`](Self::paint).
    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn draw_line(&mut self, from: Point, to: Point) {
        self.pending.line(from, to);
    }

    pub fn draw_poly(&mut self, poly: &Polygon, closed: bool) {
        self.pending.poly(poly, closed);
    }

    pub fn draw_rect(&mut self, rect: Rectangle) {
        self.pending.poly(&rect.poly(), true);
    }

    pub fn draw_arc(
        &mut self,
        center: Point,
        radius_x: f64,
        radius_y: f64,
        start_angle: f64,
        end_angle: f64,
        anticlockwise: bool,
    ) {
        self.pending
            .arc(center, radius_x, radius_y, start_angle, end_angle, anticlockwise);
    }

    /// A quadratic curve when `control2` is `None`, cubic otherwise.
    pub fn draw_bezier(&mut self, start: Point, control1: Point, control2: Option<Point>, end: Point) {
        self.pending.bezier(start, control1, control2, end);
    }

    /// Commit every queued primitive as one path.
    pub fn paint(&mut self, stroke: Option<&StrokeStyle>, fill: Option<&FillStyle>, transform: &TransformSet) {
        let batch = std::mem::take(&mut self.pending);
        self.paint_batch(batch, stroke, fill, transform);
    }

    /// Commit an explicitly built batch. The pending batch is left alone.
    pub fn paint_batch(
        &mut self,
        batch: PathBatch,
        stroke: Option<&StrokeStyle>,
        fill: Option<&FillStyle>,
        transform: &TransformSet,
    ) {
        if batch.is_empty() {
            return;
        }
        let stroke = stroke.filter(|s| s.is_visible());
        if stroke.is_none() && fill.is_none() {
            log::debug!("Painting {} path operation(s) with neither stroke nor fill", batch.len());
            return;
        }

        let bounds = batch.bounds();
        let mut ops = batch.into_ops();
        if stroke.is_some_and(|s| s.crisp) {
            ops = ops.iter().map(|op| op.rounded(transform)).collect();
        }

        let surface = &mut *self.surface;
        surface.save();
        transform.apply_to_surface(surface);

        let dash = stroke
            .filter(|s| s.is_dashed() && !surface.supports_native_dash())
            .and_then(|s| DashState::new(&s.pattern));

        match (stroke, dash) {
            (Some(stroke), Some(mut dash)) => {
                if let Some(fill) = fill {
                    surface.begin_path();
                    replay(surface, &ops);
                    surface.close_path();
                    surface.fill(&fill.paint(bounds));
                }
                surface.begin_path();
                for op in &ops {
                    dash.stroke_polyline(&op.polyline(), surface);
                }
                surface.stroke(&stroke_params(stroke, bounds));
            }
            _ => {
                surface.begin_path();
                replay(surface, &ops);
                if stroke.is_some() && fill.is_some() {
                    surface.close_path();
                }
                if let Some(fill) = fill {
                    surface.fill(&fill.paint(bounds));
                }
                if let Some(stroke) = stroke {
                    let native_dash = stroke.is_dashed() && surface.supports_native_dash();
                    if native_dash {
                        surface.set_line_dash(&stroke.pattern);
                    }
                    surface.stroke(&stroke_params(stroke, bounds));
                    if native_dash {
                        surface.set_line_dash(&[]);
                    }
                }
            }
        }

        surface.restore();
    }

    /// Lay out and draw `text` inside `bounds`. Returns the layout so callers
    /// can hit-test the text afterwards.
    pub fn draw_text(
        &mut self,
        text: &str,
        bounds: Rectangle,
        style: &TextStyle,
        transform: &TransformSet,
    ) -> TextLayout {
        let layout = layout_text(text, bounds, style, &*self);
        let paint = Paint::Solid(style.color);
        self.surface.save();
        transform.apply_to_surface(self.surface);
        for line in layout.lines.iter().filter(|l| !l.is_empty()) {
            self.surface
                .fill_text(&line.text, line.bounds.top_left(), &style.font, &paint);
        }
        self.surface.restore();
        layout
    }

    /// Draw a named image stretched over `dest`. Returns `false` when the
    /// image is not available, in which case nothing is drawn.
    pub fn draw_image(&mut self, name: &str, dest: Rectangle, transform: &TransformSet) -> bool {
        let Some(info) = self.images.and_then(|store| store.image(name)) else {
            log::debug!("Image '{name}' not loaded yet, skipping draw");
            return false;
        };
        self.surface.save();
        transform.apply_to_surface(self.surface);
        self.surface.draw_image(&info, dest);
        self.surface.restore();
        true
    }
}

impl TextMeasure for Canvas<'_> {
    fn measure_text(&self, text: &str, font: &Font) -> f64 {
        self.surface.measure_text(text, font)
    }
}

fn replay(surface: &mut dyn Surface, ops: &[PathOp]) {
    for op in ops {
        op.replay(surface);
    }
}

fn stroke_params(stroke: &StrokeStyle, bounds: Rectangle) -> StrokeParams {
    StrokeParams {
        width: stroke.line_width,
        paint: stroke.paint(bounds),
        cap: stroke.cap,
        join: stroke.join,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::SerializableColor;

    fn thin(pattern: Vec<f64>) -> StrokeStyle {
        StrokeStyle::solid(1.0, SerializableColor::black())
            .with_pattern(pattern)
            .with_crisp(false)
    }

    /// Visible runs, as (from, to) pairs, reconstructed from path commands.
    fn runs(commands: &[SurfaceCommand]) -> Vec<(Point, Point)> {
        let mut runs = Vec::new();
        let mut start = None;
        for c in commands {
            match c {
                SurfaceCommand::MoveTo(p) => start = Some(*p),
                SurfaceCommand::LineTo(p) => {
                    if let Some(s) = start {
                        runs.push((s, *p));
                    }
                    start = Some(*p);
                }
                _ => {}
            }
        }
        runs
    }

    #[test]
    fn test_nothing_reaches_surface_before_paint() {
        let mut surface = RecordingSurface::new();
        {
            let mut canvas = Canvas::new(&mut surface);
            canvas.draw_line(Point::ZERO, Point::new(10.0, 0.0));
            canvas.draw_rect(Rectangle::new(0.0, 0.0, 5.0, 5.0));
            assert!(canvas.has_pending());
        }
        assert!(surface.commands().is_empty());
    }

    #[test]
    fn test_paint_solid_stroke() {
        let mut surface = RecordingSurface::new();
        let mut canvas = Canvas::new(&mut surface);
        canvas.draw_line(Point::ZERO, Point::new(10.0, 0.0));
        canvas.paint(Some(&thin(vec![])), None, &TransformSet::new());
        assert!(!canvas.has_pending());
        assert_eq!(
            surface.commands(),
            &[
                SurfaceCommand::Save,
                SurfaceCommand::Translate { dx: 0.5, dy: 0.5 },
                SurfaceCommand::BeginPath,
                SurfaceCommand::MoveTo(Point::ZERO),
                SurfaceCommand::LineTo(Point::new(10.0, 0.0)),
                SurfaceCommand::Stroke(StrokeParams {
                    width: 1.0,
                    paint: Paint::Solid(SerializableColor::black()),
                    cap: LineCap::Butt,
                    join: LineJoin::Miter,
                }),
                SurfaceCommand::Restore,
            ]
        );
    }

    #[test]
    fn test_stroke_and_fill_close_path() {
        let mut surface = RecordingSurface::new();
        let mut canvas = Canvas::new(&mut surface);
        canvas.draw_poly(
            &Polygon::new(vec![Point::ZERO, Point::new(10.0, 0.0), Point::new(10.0, 10.0)]),
            false,
        );
        canvas.paint(Some(&thin(vec![])), Some(&FillStyle::default()), &TransformSet::new());
        let commands = surface.commands();
        let close = commands.iter().position(|c| *c == SurfaceCommand::ClosePath);
        let fill = commands.iter().position(|c| matches!(c, SurfaceCommand::Fill(_)));
        let stroke = commands.iter().position(|c| matches!(c, SurfaceCommand::Stroke(_)));
        assert!(close.is_some());
        assert!(close < fill && fill < stroke);
    }

    #[test]
    fn test_zero_width_stroke_is_skipped() {
        let mut surface = RecordingSurface::new();
        let mut canvas = Canvas::new(&mut surface);
        canvas.draw_line(Point::ZERO, Point::new(10.0, 0.0));
        let mut style = thin(vec![]);
        style.line_width = 0.0;
        canvas.paint(Some(&style), None, &TransformSet::new());
        assert!(surface.commands().is_empty());
    }

    #[test]
    fn test_native_dash_is_set_and_reset() {
        let mut surface = RecordingSurface::with_native_dash();
        let mut canvas = Canvas::new(&mut surface);
        canvas.draw_line(Point::ZERO, Point::new(100.0, 0.0));
        canvas.paint(Some(&thin(vec![10.0, 5.0])), None, &TransformSet::new());
        let dashes: Vec<_> = surface
            .commands()
            .iter()
            .filter_map(|c| match c {
                SurfaceCommand::SetLineDash(p) => Some(p.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(dashes, vec![vec![10.0, 5.0], vec![]]);
        assert_eq!(runs(surface.commands()).len(), 1);
    }

    #[test]
    fn test_emulated_dash_carries_phase_between_primitives() {
        let mut surface = RecordingSurface::new();
        let mut canvas = Canvas::new(&mut surface);
        // 12 units: a full 10-unit dash, then 2 units into the 5-unit gap.
        canvas.draw_line(Point::new(0.0, 10.0), Point::new(12.0, 10.0));
        canvas.draw_line(Point::ZERO, Point::new(100.0, 0.0));
        canvas.paint(Some(&thin(vec![10.0, 5.0])), None, &TransformSet::new());

        let commands = surface.commands();
        assert!(!commands.iter().any(|c| matches!(c, SurfaceCommand::SetLineDash(_))));
        let runs = runs(commands);
        assert_eq!(runs[0], (Point::new(0.0, 10.0), Point::new(10.0, 10.0)));

        let second: Vec<(f64, f64)> = runs
            .iter()
            .filter(|(a, _)| a.y == 0.0)
            .map(|(a, b)| (a.x, b.x))
            .collect();
        assert_eq!(
            second,
            vec![
                (3.0, 13.0),
                (18.0, 28.0),
                (33.0, 43.0),
                (48.0, 58.0),
                (63.0, 73.0),
                (78.0, 88.0),
                (93.0, 100.0),
            ]
        );
        let drawn: f64 = second.iter().map(|(a, b)| b - a).sum();
        assert!((drawn - 67.0).abs() < 1e-9);
    }

    #[test]
    fn test_emulated_dash_fills_before_stroking() {
        let mut surface = RecordingSurface::new();
        let mut canvas = Canvas::new(&mut surface);
        canvas.draw_rect(Rectangle::new(0.0, 0.0, 20.0, 20.0));
        canvas.paint(
            Some(&thin(vec![4.0, 4.0])),
            Some(&FillStyle::default()),
            &TransformSet::new(),
        );
        let commands = surface.commands();
        let fill = commands.iter().position(|c| matches!(c, SurfaceCommand::Fill(_)));
        let stroke = commands.iter().position(|c| matches!(c, SurfaceCommand::Stroke(_)));
        assert!(fill.is_some() && fill < stroke);
        let begins = commands.iter().filter(|c| **c == SurfaceCommand::BeginPath).count();
        assert_eq!(begins, 2);
    }

    #[test]
    fn test_clear_discards_pending_batch() {
        let mut surface = RecordingSurface::new();
        let mut canvas = Canvas::new(&mut surface);
        canvas.draw_line(Point::ZERO, Point::new(10.0, 0.0));
        canvas.clear();
        canvas.paint(Some(&thin(vec![])), None, &TransformSet::new());
        assert_eq!(surface.commands(), &[SurfaceCommand::Clear]);
    }

    #[test]
    fn test_crisp_rounding_uses_transform() {
        let mut surface = RecordingSurface::new();
        let mut canvas = Canvas::new(&mut surface);
        canvas.draw_line(Point::new(0.2, 0.2), Point::new(10.3, 0.2));
        let style = thin(vec![]).with_crisp(true);
        canvas.paint(Some(&style), None, &TransformSet::new().with_scaling(2.0, 2.0));
        let runs = runs(surface.commands());
        assert_eq!(runs, vec![(Point::new(0.0, 0.0), Point::new(10.5, 0.0))]);
    }

    #[test]
    fn test_missing_image_is_skipped() {
        let mut store = MemoryImageStore::new();
        let mut surface = RecordingSurface::new();
        {
            let mut canvas = Canvas::new(&mut surface).with_images(&store);
            let dest = Rectangle::new(0.0, 0.0, 16.0, 16.0);
            assert!(!canvas.draw_image("gear", dest, &TransformSet::new()));
        }
        assert!(surface.commands().is_empty());

        store.insert(ImageInfo::new("gear", 16.0, 16.0));
        let mut canvas = Canvas::new(&mut surface).with_images(&store);
        assert!(canvas.draw_image("gear", Rectangle::new(0.0, 0.0, 16.0, 16.0), &TransformSet::new()));
        assert!(surface
            .commands()
            .iter()
            .any(|c| matches!(c, SurfaceCommand::DrawImage { name, .. } if name == "gear")));
    }

    #[test]
    fn test_draw_text_emits_one_run_per_line() {
        let mut surface = RecordingSurface::new();
        let mut canvas = Canvas::new(&mut surface);
        let layout = canvas.draw_text(
            "one two\nthree",
            Rectangle::new(0.0, 0.0, 200.0, 100.0),
            &TextStyle::default(),
            &TransformSet::new(),
        );
        assert_eq!(layout.lines.len(), 2);
        let texts: Vec<_> = surface
            .commands()
            .iter()
            .filter_map(|c| match c {
                SurfaceCommand::FillText { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(texts, vec!["one two", "three"]);
    }
}
