//! Pan and zoom between scene space and window space.

use serde::{Deserialize, Serialize};

use crate::geometry::{Point, Rectangle, Size};
use crate::transform::TransformSet;

/// The root container's view of the scene.
///
/// `window = scene * zoom + pan`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Translation in window pixels.
    pub pan: Point,
    pub zoom: f64,
    pub min_zoom: f64,
    pub max_zoom: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            pan: Point::ZERO,
            zoom: 1.0,
            min_zoom: 0.1,
            max_zoom: 10.0,
        }
    }
}

impl Viewport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Zoom followed by pan, as outer transforms of scene content.
    pub fn transform_set(&self) -> TransformSet {
        TransformSet::new()
            .with_scaling(self.zoom, self.zoom)
            .with_translation(self.pan.x, self.pan.y)
    }

    pub fn window_to_scene(&self, window_point: Point) -> Point {
        Point::new(
            (window_point.x - self.pan.x) / self.zoom,
            (window_point.y - self.pan.y) / self.zoom,
        )
    }

    pub fn scene_to_window(&self, scene_point: Point) -> Point {
        Point::new(
            scene_point.x * self.zoom + self.pan.x,
            scene_point.y * self.zoom + self.pan.y,
        )
    }

    /// Convert a length in window pixels to scene units.
    pub fn pixels(&self, length: f64) -> f64 {
        length / self.zoom
    }

    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        self.pan = self.pan.translated(dx, dy);
    }

    /// Zoom by `factor`, keeping `window_point` fixed.
    pub fn zoom_at(&mut self, window_point: Point, factor: f64) {
        let new_zoom = (self.zoom * factor).clamp(self.min_zoom, self.max_zoom);
        if (new_zoom - self.zoom).abs() < f64::EPSILON {
            return;
        }
        let anchor = self.window_to_scene(window_point);
        self.zoom = new_zoom;
        let moved = self.scene_to_window(anchor);
        self.pan_by(window_point.x - moved.x, window_point.y - moved.y);
        log::debug!("Zoom {:.3} at ({:.1}, {:.1})", self.zoom, window_point.x, window_point.y);
    }

    pub fn reset(&mut self) {
        self.pan = Point::ZERO;
        self.zoom = 1.0;
    }

    /// Center `bounds` in a window of `window_size`, zooming to fit.
    pub fn fit_to_bounds(&mut self, bounds: Rectangle, window_size: Size, padding: f64) {
        if bounds.is_zero_area() {
            self.reset();
            return;
        }
        let width = (window_size.width - padding * 2.0).max(1.0);
        let height = (window_size.height - padding * 2.0).max(1.0);
        self.zoom = (width / bounds.width())
            .min(height / bounds.height())
            .clamp(self.min_zoom, self.max_zoom);
        let center = bounds.center();
        self.pan = Point::new(
            window_size.width / 2.0 - center.x * self.zoom,
            window_size.height / 2.0 - center.y * self.zoom,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_to_scene_with_pan_and_zoom() {
        let mut viewport = Viewport::new();
        viewport.pan = Point::new(50.0, 100.0);
        viewport.zoom = 2.0;
        let scene = viewport.window_to_scene(Point::new(150.0, 300.0));
        assert!((scene.x - 50.0).abs() < f64::EPSILON);
        assert!((scene.y - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_roundtrip_conversion() {
        let mut viewport = Viewport::new();
        viewport.pan = Point::new(30.0, -20.0);
        viewport.zoom = 1.5;
        let original = Point::new(123.0, 456.0);
        let back = viewport.scene_to_window(viewport.window_to_scene(original));
        assert!(back.approx_eq(original, 1e-10));
    }

    #[test]
    fn test_transform_set_matches_conversion() {
        let mut viewport = Viewport::new();
        viewport.pan = Point::new(7.0, 9.0);
        viewport.zoom = 3.0;
        let p = Point::new(2.0, -4.0);
        let mapped = viewport.transform_set().apply_to_geometry(&p, false);
        assert!(mapped.approx_eq(viewport.scene_to_window(p), 1e-12));
    }

    #[test]
    fn test_zoom_at_keeps_point_fixed() {
        let mut viewport = Viewport::new();
        let fixed = Point::new(200.0, 100.0);
        let before = viewport.window_to_scene(fixed);
        viewport.zoom_at(fixed, 2.0);
        assert!((viewport.zoom - 2.0).abs() < f64::EPSILON);
        assert!(viewport.window_to_scene(fixed).approx_eq(before, 1e-10));
    }

    #[test]
    fn test_zoom_clamp() {
        let mut viewport = Viewport::new();
        viewport.zoom_at(Point::ZERO, 0.001);
        assert!((viewport.zoom - viewport.min_zoom).abs() < f64::EPSILON);
        viewport.zoom_at(Point::ZERO, 1e6);
        assert!((viewport.zoom - viewport.max_zoom).abs() < f64::EPSILON);
    }

    #[test]
    fn test_fit_to_bounds() {
        let mut viewport = Viewport::new();
        viewport.fit_to_bounds(
            Rectangle::new(0.0, 0.0, 100.0, 50.0),
            Size::new(400.0, 400.0),
            0.0,
        );
        assert!((viewport.zoom - 4.0).abs() < f64::EPSILON);
        let center = viewport.scene_to_window(Point::new(50.0, 25.0));
        assert!(center.approx_eq(Point::new(200.0, 200.0), 1e-9));
    }
}
