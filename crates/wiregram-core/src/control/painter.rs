//! Drawing of control point glyphs at a constant screen size.

use crate::canvas::{Canvas, TextLayout};
use crate::geometry::{Point, Polygon, Rectangle};
use crate::style::{FillStyle, StrokeStyle, TextStyle};
use crate::transform::TransformSet;

/// Wraps a [`Canvas`] so glyph coordinates can be given in screen pixels
/// around the anchor.
///
/// Every coordinate is scaled by `1 / zoom`, rotated by the element angle
/// when the glyph turns with its element, and translated by the anchor.
/// The result is in the parent coordinates of the element, so painting
/// uses the parent's transform chain.
pub struct ControlPointPainter<'c, 'a> {
    canvas: &'c mut Canvas<'a>,
    anchor: Point,
    zoom: f64,
    rotation: Option<f64>,
    transform: TransformSet,
}

impl<'c, 'a> ControlPointPainter<'c, 'a> {
    pub fn new(
        canvas: &'c mut Canvas<'a>,
        anchor: Point,
        zoom: f64,
        rotation: Option<f64>,
        parent_transform: TransformSet,
    ) -> Self {
        Self {
            canvas,
            anchor,
            zoom,
            rotation,
            transform: parent_transform,
        }
    }

    fn map(&self, point: Point) -> Point {
        let scaled = point.scaled(1.0 / self.zoom, 1.0 / self.zoom, Point::ZERO);
        let rotated = match self.rotation {
            Some(angle) => scaled.rotated(angle, Point::ZERO),
            None => scaled,
        };
        rotated.translated(self.anchor.x, self.anchor.y)
    }

    /// Glyph space -> parent space, for immediate primitives.
    fn glyph_transform(&self) -> TransformSet {
        TransformSet::new()
            .with_scaling(1.0 / self.zoom, 1.0 / self.zoom)
            .with_rotation(self.rotation.unwrap_or(0.0))
            .with_translation(self.anchor.x, self.anchor.y)
            .then(&self.transform)
    }

    pub fn draw_line(&mut self, from: Point, to: Point) {
        let (from, to) = (self.map(from), self.map(to));
        self.canvas.draw_line(from, to);
    }

    pub fn draw_poly(&mut self, poly: &Polygon, closed: bool) {
        let mapped = Polygon::new(poly.points.iter().map(|p| self.map(*p)).collect());
        self.canvas.draw_poly(&mapped, closed);
    }

    pub fn draw_rect(&mut self, rect: Rectangle) {
        self.draw_poly(&rect.poly(), true);
    }

    /// Angles turn with the glyph, which is exact for circles.
    pub fn draw_arc(
        &mut self,
        center: Point,
        radius_x: f64,
        radius_y: f64,
        start_angle: f64,
        end_angle: f64,
        anticlockwise: bool,
    ) {
        let turn = self.rotation.unwrap_or(0.0);
        self.canvas.draw_arc(
            self.map(center),
            radius_x / self.zoom,
            radius_y / self.zoom,
            start_angle + turn,
            end_angle + turn,
            anticlockwise,
        );
    }

    pub fn draw_bezier(&mut self, start: Point, control1: Point, control2: Option<Point>, end: Point) {
        let control2 = control2.map(|c| self.map(c));
        self.canvas
            .draw_bezier(self.map(start), self.map(control1), control2, self.map(end));
    }

    pub fn draw_text(&mut self, text: &str, bounds: Rectangle, style: &TextStyle) -> TextLayout {
        let transform = self.glyph_transform();
        self.canvas.draw_text(text, bounds, style, &transform)
    }

    pub fn draw_image(&mut self, name: &str, dest: Rectangle) -> bool {
        let transform = self.glyph_transform();
        self.canvas.draw_image(name, dest, &transform)
    }

    pub fn paint(&mut self, stroke: Option<&StrokeStyle>, fill: Option<&FillStyle>) {
        self.canvas.paint(stroke, fill, &self.transform);
    }
}
