//! Stroke, fill and text styles, and the registry that resolves them by name.

use peniko::Color;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::LazyLock;

use crate::canvas::{Font, HorizontalAlign, LineCap, LineJoin, Paint, VerticalAlign};
use crate::geometry::{Point, Rectangle};

/// Serializable color (RGBA8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializableColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl SerializableColor {
    pub fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn black() -> Self {
        Self::new(0, 0, 0, 255)
    }

    pub fn white() -> Self {
        Self::new(255, 255, 255, 255)
    }

    pub fn transparent() -> Self {
        Self::new(0, 0, 0, 0)
    }
}

impl From<Color> for SerializableColor {
    fn from(color: Color) -> Self {
        let rgba = color.to_rgba8();
        Self {
            r: rgba.r,
            g: rgba.g,
            b: rgba.b,
            a: rgba.a,
        }
    }
}

impl From<SerializableColor> for Color {
    fn from(color: SerializableColor) -> Self {
        Color::from_rgba8(color.r, color.g, color.b, color.a)
    }
}

/// Explicit gradient geometry, in the coordinates of the painted batch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Gradient {
    pub start: Point,
    pub end: Point,
    /// Present for radial gradients, centered on `start`.
    #[serde(default)]
    pub radius: Option<f64>,
}

/// Select solid or gradient paint from a color list. With no explicit
/// gradient geometry, a vertical gradient spans `bounds`.
fn select_paint(colors: &[SerializableColor], gradient: Option<&Gradient>, bounds: Rectangle) -> Paint {
    let stops = colors.to_vec();
    match stops.len() {
        0 => Paint::Solid(SerializableColor::transparent()),
        1 => Paint::Solid(stops[0]),
        _ => match gradient {
            Some(Gradient {
                start,
                radius: Some(radius),
                ..
            }) => Paint::RadialGradient {
                center: *start,
                radius: *radius,
                stops,
            },
            Some(Gradient { start, end, .. }) => Paint::LinearGradient {
                start: *start,
                end: *end,
                stops,
            },
            None => Paint::LinearGradient {
                start: bounds.top_center(),
                end: bounds.bottom_center(),
                stops,
            },
        },
    }
}

/// How outlines are drawn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrokeStyle {
    /// Zero disables the stroke.
    pub line_width: f64,
    /// One color for solid strokes, several for a gradient.
    pub colors: Vec<SerializableColor>,
    #[serde(default)]
    pub cap: LineCap,
    #[serde(default)]
    pub join: LineJoin,
    /// Alternating on/off run lengths. Empty means solid.
    #[serde(default)]
    pub pattern: Vec<f64>,
    #[serde(default)]
    pub gradient: Option<Gradient>,
    /// Snap path points to whole device pixels.
    #[serde(default = "default_crisp")]
    pub crisp: bool,
}

fn default_crisp() -> bool {
    true
}

impl Default for StrokeStyle {
    fn default() -> Self {
        Self {
            line_width: 1.0,
            colors: vec![SerializableColor::black()],
            cap: LineCap::default(),
            join: LineJoin::default(),
            pattern: Vec::new(),
            gradient: None,
            crisp: default_crisp(),
        }
    }
}

impl StrokeStyle {
    pub fn solid(line_width: f64, color: SerializableColor) -> Self {
        Self {
            line_width,
            colors: vec![color],
            ..Self::default()
        }
    }

    pub fn with_pattern(mut self, pattern: Vec<f64>) -> Self {
        self.pattern = pattern;
        self
    }

    pub fn with_crisp(mut self, crisp: bool) -> Self {
        self.crisp = crisp;
        self
    }

    pub fn is_visible(&self) -> bool {
        self.line_width > 0.0 && !self.colors.is_empty()
    }

    pub fn is_dashed(&self) -> bool {
        !self.pattern.is_empty()
    }

    pub fn paint(&self, bounds: Rectangle) -> Paint {
        select_paint(&self.colors, self.gradient.as_ref(), bounds)
    }
}

/// How interiors are filled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FillStyle {
    pub colors: Vec<SerializableColor>,
    #[serde(default)]
    pub gradient: Option<Gradient>,
}

impl FillStyle {
    pub fn solid(color: SerializableColor) -> Self {
        Self {
            colors: vec![color],
            gradient: None,
        }
    }

    pub fn paint(&self, bounds: Rectangle) -> Paint {
        select_paint(&self.colors, self.gradient.as_ref(), bounds)
    }
}

impl Default for FillStyle {
    fn default() -> Self {
        Self::solid(SerializableColor::white())
    }
}

/// Font, color and justification of text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextStyle {
    pub font: Font,
    pub color: SerializableColor,
    /// Line height as a multiple of the font size.
    #[serde(default = "default_line_height")]
    pub line_height: f64,
    #[serde(default)]
    pub align: HorizontalAlign,
    #[serde(default)]
    pub vertical_align: VerticalAlign,
}

fn default_line_height() -> f64 {
    1.2
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font: Font::default(),
            color: SerializableColor::black(),
            line_height: default_line_height(),
            align: HorizontalAlign::default(),
            vertical_align: VerticalAlign::default(),
        }
    }
}

/// Name of the style every lookup falls back to.
pub const DEFAULT_STYLE: &str = "default";

/// Named styles, resolved explicitly by whoever renders.
///
/// Lookups of unknown names fall back to the `default` entry, which is
/// always present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleRegistry {
    #[serde(default)]
    stroke: HashMap<String, StrokeStyle>,
    #[serde(default)]
    fill: HashMap<String, FillStyle>,
    #[serde(default)]
    text: HashMap<String, TextStyle>,
}

impl Default for StyleRegistry {
    fn default() -> Self {
        let mut registry = Self {
            stroke: HashMap::new(),
            fill: HashMap::new(),
            text: HashMap::new(),
        };
        registry.ensure_defaults();
        registry
    }
}

impl StyleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a registry from JSON. Missing `default` entries are filled in.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let mut registry: Self = serde_json::from_str(json)?;
        registry.ensure_defaults();
        Ok(registry)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    fn ensure_defaults(&mut self) {
        self.stroke.entry(DEFAULT_STYLE.to_string()).or_default();
        self.fill.entry(DEFAULT_STYLE.to_string()).or_default();
        self.text.entry(DEFAULT_STYLE.to_string()).or_default();
        self.stroke
            .entry("control-point".to_string())
            .or_insert_with(|| StrokeStyle::solid(1.0, SerializableColor::new(59, 130, 246, 255)));
        self.fill
            .entry("control-point".to_string())
            .or_insert_with(|| FillStyle::solid(SerializableColor::white()));
        self.fill
            .entry("socket".to_string())
            .or_insert_with(|| FillStyle::solid(SerializableColor::new(34, 197, 94, 160)));
        self.stroke.entry("selection".to_string()).or_insert_with(|| {
            StrokeStyle::solid(1.0, SerializableColor::new(59, 130, 246, 255)).with_pattern(vec![4.0, 4.0])
        });
    }

    pub fn insert_stroke(&mut self, name: impl Into<String>, style: StrokeStyle) {
        self.stroke.insert(name.into(), style);
    }

    pub fn insert_fill(&mut self, name: impl Into<String>, style: FillStyle) {
        self.fill.insert(name.into(), style);
    }

    pub fn insert_text(&mut self, name: impl Into<String>, style: TextStyle) {
        self.text.insert(name.into(), style);
    }

    pub fn stroke(&self, name: &str) -> &StrokeStyle {
        static FALLBACK: LazyLock<StrokeStyle> = LazyLock::new(StrokeStyle::default);
        lookup(&self.stroke, name).unwrap_or(&FALLBACK)
    }

    pub fn fill(&self, name: &str) -> &FillStyle {
        static FALLBACK: LazyLock<FillStyle> = LazyLock::new(FillStyle::default);
        lookup(&self.fill, name).unwrap_or(&FALLBACK)
    }

    pub fn text(&self, name: &str) -> &TextStyle {
        static FALLBACK: LazyLock<TextStyle> = LazyLock::new(TextStyle::default);
        lookup(&self.text, name).unwrap_or(&FALLBACK)
    }
}

fn lookup<'a, T>(map: &'a HashMap<String, T>, name: &str) -> Option<&'a T> {
    let style = map.get(name).or_else(|| map.get(DEFAULT_STYLE));
    if style.is_none() {
        log::warn!("Style '{name}' missing and no default registered");
    }
    style
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_color_is_solid() {
        let style = StrokeStyle::solid(2.0, SerializableColor::new(255, 0, 0, 255));
        assert_eq!(
            style.paint(Rectangle::ZERO),
            Paint::Solid(SerializableColor::new(255, 0, 0, 255))
        );
    }

    #[test]
    fn test_multiple_colors_select_gradient() {
        let mut fill = FillStyle {
            colors: vec![SerializableColor::black(), SerializableColor::white()],
            gradient: None,
        };
        let bounds = Rectangle::new(0.0, 0.0, 10.0, 20.0);
        match fill.paint(bounds) {
            Paint::LinearGradient { start, end, stops } => {
                assert_eq!(start, Point::new(5.0, 0.0));
                assert_eq!(end, Point::new(5.0, 20.0));
                assert_eq!(stops.len(), 2);
            }
            other => panic!("expected linear gradient, got {other:?}"),
        }

        fill.gradient = Some(Gradient {
            start: Point::new(1.0, 1.0),
            end: Point::ZERO,
            radius: Some(4.0),
        });
        assert!(matches!(
            fill.paint(bounds),
            Paint::RadialGradient { radius, .. } if (radius - 4.0).abs() < f64::EPSILON
        ));
    }

    #[test]
    fn test_registry_falls_back_to_default() {
        let registry = StyleRegistry::new();
        assert_eq!(registry.stroke("missing"), registry.stroke(DEFAULT_STYLE));
        assert!(registry.stroke("selection").is_dashed());
    }

    #[test]
    fn test_registry_from_json() {
        let json = r#"{
            "stroke": {
                "thick": { "line_width": 4.0, "colors": [{ "r": 0, "g": 0, "b": 0, "a": 255 }] }
            }
        }"#;
        let registry = StyleRegistry::from_json(json).unwrap();
        let thick = registry.stroke("thick");
        assert!((thick.line_width - 4.0).abs() < f64::EPSILON);
        assert!(thick.crisp);
        assert!(thick.pattern.is_empty());
        // Defaults are filled in even when the document omits them.
        assert!((registry.text(DEFAULT_STYLE).line_height - 1.2).abs() < f64::EPSILON);
    }
}
