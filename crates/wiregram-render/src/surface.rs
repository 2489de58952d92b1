//! A [`Surface`] that records kurbo paths and peniko brushes into a display
//! list, ready to be replayed by a GPU or vector backend.

use std::f64::consts::TAU;

use kurbo::{Affine, Arc, BezPath, Cap, Join, Rect, Shape, Stroke, Vec2};
use peniko::{Brush, Color, Gradient};
use wiregram_core::canvas::{Font, ImageInfo, LineCap, LineJoin, Paint, StrokeParams, Surface, TextMeasure};
use wiregram_core::geometry::{Point, Rectangle};
use wiregram_core::style::SerializableColor;

/// Flattening tolerance for elliptical arcs.
const ARC_TOLERANCE: f64 = 0.1;

/// One display list entry. Paths are stored in the coordinates they were
/// built in, together with the transform current when they were painted.
#[derive(Debug, Clone)]
pub enum DrawItem {
    Stroke {
        path: BezPath,
        transform: Affine,
        style: Stroke,
        brush: Brush,
    },
    Fill {
        path: BezPath,
        transform: Affine,
        brush: Brush,
    },
    Text {
        text: String,
        /// Top-left corner of the run.
        origin: kurbo::Point,
        font: Font,
        transform: Affine,
        brush: Brush,
    },
    Image {
        name: String,
        dest: Rect,
        transform: Affine,
    },
}

impl DrawItem {
    /// Device-space bounds, ignoring stroke width. Text runs report their
    /// origin only.
    pub fn bounds(&self) -> Rect {
        match self {
            DrawItem::Stroke { path, transform, .. } | DrawItem::Fill { path, transform, .. } => {
                transform.transform_rect_bbox(path.bounding_box())
            }
            DrawItem::Text { origin, transform, .. } => {
                let p = *transform * *origin;
                Rect::from_points(p, p)
            }
            DrawItem::Image { dest, transform, .. } => transform.transform_rect_bbox(*dest),
        }
    }
}

#[derive(Debug, Clone)]
struct GraphicsState {
    transform: Affine,
    dash: Vec<f64>,
}

/// Display list builder with an HTML-canvas style state stack.
#[derive(Debug, Clone)]
pub struct KurboSurface {
    items: Vec<DrawItem>,
    base: Affine,
    state: GraphicsState,
    stack: Vec<GraphicsState>,
    path: BezPath,
    current: Option<kurbo::Point>,
    /// Estimated advance of one character as a fraction of the font size.
    pub char_width: f64,
}

impl Default for KurboSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl KurboSurface {
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            base: Affine::IDENTITY,
            state: GraphicsState {
                transform: Affine::IDENTITY,
                dash: Vec::new(),
            },
            stack: Vec::new(),
            path: BezPath::new(),
            current: None,
            char_width: 0.55,
        }
    }

    /// Drop everything and start over with `base` as the outermost
    /// transform (device pixel ratio, typically).
    pub fn reset(&mut self, base: Affine) {
        self.base = base;
        self.items.clear();
        self.stack.clear();
        self.state = GraphicsState {
            transform: base,
            dash: Vec::new(),
        };
        self.path = BezPath::new();
        self.current = None;
    }

    pub fn base_transform(&self) -> Affine {
        self.base
    }

    pub fn items(&self) -> &[DrawItem] {
        &self.items
    }

    pub fn take_items(&mut self) -> Vec<DrawItem> {
        std::mem::take(&mut self.items)
    }

    /// Append an item built outside the canvas pipeline.
    pub fn push(&mut self, item: DrawItem) {
        self.items.push(item);
    }

    /// Union of every item's bounds.
    pub fn bounds(&self) -> Option<Rect> {
        self.items
            .iter()
            .map(DrawItem::bounds)
            .reduce(|acc, r| acc.union(r))
    }
}

fn to_kurbo(p: Point) -> kurbo::Point {
    p.into()
}

fn to_rect(r: Rectangle) -> Rect {
    Rect::new(r.x1, r.y1, r.x2, r.y2)
}

fn colors(stops: &[SerializableColor]) -> Vec<Color> {
    stops.iter().map(|c| Color::from(*c)).collect()
}

/// Brush for a resolved paint.
pub fn brush(paint: &Paint) -> Brush {
    match paint {
        Paint::Solid(color) => Brush::Solid(Color::from(*color)),
        Paint::LinearGradient { start, end, stops } => Brush::Gradient(
            Gradient::new_linear(to_kurbo(*start), to_kurbo(*end)).with_stops(colors(stops).as_slice()),
        ),
        Paint::RadialGradient { center, radius, stops } => Brush::Gradient(
            Gradient::new_radial(to_kurbo(*center), *radius as f32).with_stops(colors(stops).as_slice()),
        ),
    }
}

/// kurbo stroke for resolved stroke parameters and a dash pattern.
pub fn stroke_style(params: &StrokeParams, dash: &[f64]) -> Stroke {
    let cap = match params.cap {
        LineCap::Butt => Cap::Butt,
        LineCap::Round => Cap::Round,
        LineCap::Square => Cap::Square,
    };
    let join = match params.join {
        LineJoin::Miter => Join::Miter,
        LineJoin::Round => Join::Round,
        LineJoin::Bevel => Join::Bevel,
    };
    let stroke = Stroke::new(params.width).with_caps(cap).with_join(join);
    if dash.is_empty() {
        stroke
    } else {
        stroke.with_dashes(0.0, dash.iter().copied())
    }
}

/// Signed sweep of a canvas arc from `start` to `end`.
fn arc_sweep(start: f64, end: f64, anticlockwise: bool) -> f64 {
    let raw = end - start;
    if anticlockwise {
        if -raw >= TAU { -TAU } else { -(-raw).rem_euclid(TAU) }
    } else if raw >= TAU {
        TAU
    } else {
        raw.rem_euclid(TAU)
    }
}

impl TextMeasure for KurboSurface {
    fn measure_text(&self, text: &str, font: &Font) -> f64 {
        text.chars().count() as f64 * font.size * self.char_width
    }
}

impl Surface for KurboSurface {
    fn supports_native_dash(&self) -> bool {
        true
    }

    fn clear(&mut self) {
        self.reset(self.base);
    }

    fn save(&mut self) {
        self.stack.push(self.state.clone());
    }

    fn restore(&mut self) {
        match self.stack.pop() {
            Some(state) => self.state = state,
            None => log::warn!("Unbalanced restore on display list surface"),
        }
    }

    fn translate(&mut self, dx: f64, dy: f64) {
        self.state.transform *= Affine::translate((dx, dy));
    }

    fn rotate(&mut self, angle: f64) {
        self.state.transform *= Affine::rotate(angle);
    }

    fn scale(&mut self, sx: f64, sy: f64) {
        self.state.transform *= Affine::scale_non_uniform(sx, sy);
    }

    fn begin_path(&mut self) {
        self.path = BezPath::new();
        self.current = None;
    }

    fn move_to(&mut self, point: Point) {
        let p = to_kurbo(point);
        self.path.move_to(p);
        self.current = Some(p);
    }

    fn line_to(&mut self, point: Point) {
        let p = to_kurbo(point);
        match self.current {
            Some(_) => self.path.line_to(p),
            None => self.path.move_to(p),
        }
        self.current = Some(p);
    }

    fn ellipse(
        &mut self,
        center: Point,
        radius_x: f64,
        radius_y: f64,
        start_angle: f64,
        end_angle: f64,
        anticlockwise: bool,
    ) {
        let center = to_kurbo(center);
        let radii = Vec2::new(radius_x, radius_y);
        let sweep = arc_sweep(start_angle, end_angle, anticlockwise);
        let on_ellipse = |angle: f64| center + Vec2::new(radius_x * angle.cos(), radius_y * angle.sin());

        let start = on_ellipse(start_angle);
        match self.current {
            Some(_) => self.path.line_to(start),
            None => self.path.move_to(start),
        }
        let arc = Arc::new(center, radii, start_angle, sweep, 0.0);
        self.path.extend(arc.append_iter(ARC_TOLERANCE));
        self.current = Some(on_ellipse(start_angle + sweep));
    }

    fn bezier_curve_to(&mut self, control1: Point, control2: Point, end: Point) {
        if self.current.is_none() {
            self.move_to(control1);
        }
        let end = to_kurbo(end);
        self.path.curve_to(to_kurbo(control1), to_kurbo(control2), end);
        self.current = Some(end);
    }

    fn quadratic_curve_to(&mut self, control: Point, end: Point) {
        if self.current.is_none() {
            self.move_to(control);
        }
        let end = to_kurbo(end);
        self.path.quad_to(to_kurbo(control), end);
        self.current = Some(end);
    }

    fn close_path(&mut self) {
        if self.current.is_some() {
            self.path.close_path();
        }
    }

    fn set_line_dash(&mut self, pattern: &[f64]) {
        self.state.dash = pattern.to_vec();
    }

    fn stroke(&mut self, params: &StrokeParams) {
        if self.path.elements().is_empty() {
            return;
        }
        self.items.push(DrawItem::Stroke {
            path: self.path.clone(),
            transform: self.state.transform,
            style: stroke_style(params, &self.state.dash),
            brush: brush(&params.paint),
        });
    }

    fn fill(&mut self, paint: &Paint) {
        if self.path.elements().is_empty() {
            return;
        }
        self.items.push(DrawItem::Fill {
            path: self.path.clone(),
            transform: self.state.transform,
            brush: brush(paint),
        });
    }

    fn fill_text(&mut self, text: &str, position: Point, font: &Font, paint: &Paint) {
        self.items.push(DrawItem::Text {
            text: text.to_string(),
            origin: to_kurbo(position),
            font: font.clone(),
            transform: self.state.transform,
            brush: brush(paint),
        });
    }

    fn draw_image(&mut self, image: &ImageInfo, dest: Rectangle) {
        self.items.push(DrawItem::Image {
            name: image.name.clone(),
            dest: to_rect(dest),
            transform: self.state.transform,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::PathEl;
    use wiregram_core::canvas::Canvas;
    use wiregram_core::style::StrokeStyle;
    use wiregram_core::transform::TransformSet;

    fn black_stroke() -> StrokeParams {
        StrokeParams {
            width: 2.0,
            paint: Paint::Solid(SerializableColor::black()),
            cap: LineCap::Round,
            join: LineJoin::Bevel,
        }
    }

    #[test]
    fn test_stroke_records_path_and_transform() {
        let mut surface = KurboSurface::new();
        surface.save();
        surface.translate(10.0, 5.0);
        surface.begin_path();
        surface.move_to(Point::ZERO);
        surface.line_to(Point::new(20.0, 0.0));
        surface.stroke(&black_stroke());
        surface.restore();

        let [DrawItem::Stroke { path, transform, style, .. }] = surface.items() else {
            panic!("expected one stroke");
        };
        assert_eq!(path.elements().len(), 2);
        assert_eq!(*transform, Affine::translate((10.0, 5.0)));
        assert!((style.width - 2.0).abs() < f64::EPSILON);
        assert_eq!(style.join, Join::Bevel);
        assert_eq!(surface.bounds(), Some(Rect::new(10.0, 5.0, 30.0, 5.0)));
    }

    #[test]
    fn test_restore_pops_transform_and_dash() {
        let mut surface = KurboSurface::new();
        surface.save();
        surface.scale(2.0, 2.0);
        surface.set_line_dash(&[4.0, 4.0]);
        surface.restore();
        surface.begin_path();
        surface.move_to(Point::ZERO);
        surface.line_to(Point::new(1.0, 1.0));
        surface.stroke(&black_stroke());
        let DrawItem::Stroke { transform, style, .. } = &surface.items()[0] else {
            panic!("expected a stroke");
        };
        assert_eq!(*transform, Affine::IDENTITY);
        assert!(style.dash_pattern.is_empty());
    }

    #[test]
    fn test_full_ellipse_closes_on_itself() {
        let mut surface = KurboSurface::new();
        surface.begin_path();
        surface.ellipse(Point::new(5.0, 5.0), 10.0, 4.0, 0.0, TAU, false);
        surface.fill(&Paint::Solid(SerializableColor::white()));
        let DrawItem::Fill { path, .. } = &surface.items()[0] else {
            panic!("expected a fill");
        };
        assert!(matches!(path.elements()[0], PathEl::MoveTo(p) if p == kurbo::Point::new(15.0, 5.0)));
        let bbox = path.bounding_box();
        assert!((bbox.width() - 20.0).abs() < 1e-6);
        assert!((bbox.height() - 8.0).abs() < 1e-6);
    }

    #[test]
    fn test_arc_sweep_follows_canvas_rules() {
        assert!((arc_sweep(0.0, TAU, false) - TAU).abs() < 1e-12);
        assert!((arc_sweep(0.0, -1.0, false) - (TAU - 1.0)).abs() < 1e-12);
        assert!((arc_sweep(0.0, 1.0, true) + (TAU - 1.0)).abs() < 1e-12);
        assert!((arc_sweep(0.0, -3.0 * TAU, true) + TAU).abs() < 1e-12);
    }

    #[test]
    fn test_gradient_paint_becomes_gradient_brush() {
        let paint = Paint::LinearGradient {
            start: Point::ZERO,
            end: Point::new(10.0, 0.0),
            stops: vec![SerializableColor::black(), SerializableColor::white()],
        };
        assert!(matches!(brush(&paint), Brush::Gradient(_)));
    }

    #[test]
    fn test_canvas_uses_native_dash() {
        let mut surface = KurboSurface::new();
        {
            let mut canvas = Canvas::new(&mut surface);
            let dashed = StrokeStyle::solid(1.0, SerializableColor::black())
                .with_pattern(vec![10.0, 5.0])
                .with_crisp(false);
            canvas.draw_line(Point::ZERO, Point::new(100.0, 0.0));
            canvas.paint(Some(&dashed), None, &TransformSet::new());
        }
        let [DrawItem::Stroke { path, style, .. }] = surface.items() else {
            panic!("expected one stroke");
        };
        // One line, dashed by the backend rather than split in software.
        assert_eq!(path.elements().len(), 2);
        assert_eq!(style.dash_pattern.as_slice(), &[10.0, 5.0]);
    }
}
