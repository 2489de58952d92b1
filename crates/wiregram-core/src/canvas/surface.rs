//! The rendering surface capability set consumed by [`Canvas`](super::Canvas).

use crate::geometry::{Point, Rectangle};
use crate::style::SerializableColor;

use super::ImageInfo;

/// Stroke end caps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub enum LineCap {
    #[default]
    Butt,
    Round,
    Square,
}

/// Stroke corner joins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub enum LineJoin {
    #[default]
    Miter,
    Round,
    Bevel,
}

/// How a path is colored.
#[derive(Debug, Clone, PartialEq)]
pub enum Paint {
    Solid(SerializableColor),
    LinearGradient {
        start: Point,
        end: Point,
        stops: Vec<SerializableColor>,
    },
    RadialGradient {
        center: Point,
        radius: f64,
        stops: Vec<SerializableColor>,
    },
}

/// Resolved stroke parameters handed to the surface.
#[derive(Debug, Clone, PartialEq)]
pub struct StrokeParams {
    pub width: f64,
    pub paint: Paint,
    pub cap: LineCap,
    pub join: LineJoin,
}

/// A font description.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Font {
    pub family: String,
    pub size: f64,
    #[serde(default)]
    pub bold: bool,
    #[serde(default)]
    pub italic: bool,
}

impl Font {
    pub fn new(family: impl Into<String>, size: f64) -> Self {
        Self {
            family: family.into(),
            size,
            bold: false,
            italic: false,
        }
    }

    /// CSS shorthand, e.g. `italic bold 12px sans-serif`.
    pub fn css(&self) -> String {
        let mut parts = Vec::new();
        if self.italic {
            parts.push("italic".to_string());
        }
        if self.bold {
            parts.push("bold".to_string());
        }
        parts.push(format!("{}px", self.size));
        parts.push(self.family.clone());
        parts.join(" ")
    }
}

impl Default for Font {
    fn default() -> Self {
        Self::new("sans-serif", 12.0)
    }
}

/// Text measurement, split out so layout can run without a full surface.
pub trait TextMeasure {
    /// Advance width of `text` rendered in `font`.
    fn measure_text(&self, text: &str, font: &Font) -> f64;
}

/// A 2D drawing surface with an affine transform stack, in the manner of an
/// HTML canvas context.
pub trait Surface: TextMeasure {
    /// Whether `set_line_dash` is honored by the backend. When it is not,
    /// [`Canvas`](super::Canvas) emulates dash patterns in software.
    fn supports_native_dash(&self) -> bool;

    fn clear(&mut self);
    fn save(&mut self);
    fn restore(&mut self);
    fn translate(&mut self, dx: f64, dy: f64);
    fn rotate(&mut self, angle: f64);
    fn scale(&mut self, sx: f64, sy: f64);

    fn begin_path(&mut self);
    fn move_to(&mut self, point: Point);
    fn line_to(&mut self, point: Point);
    fn ellipse(
        &mut self,
        center: Point,
        radius_x: f64,
        radius_y: f64,
        start_angle: f64,
        end_angle: f64,
        anticlockwise: bool,
    );
    fn bezier_curve_to(&mut self, control1: Point, control2: Point, end: Point);
    fn quadratic_curve_to(&mut self, control: Point, end: Point);
    fn close_path(&mut self);

    fn arc(&mut self, center: Point, radius: f64, start_angle: f64, end_angle: f64, anticlockwise: bool) {
        self.ellipse(center, radius, radius, start_angle, end_angle, anticlockwise);
    }

    /// Only called when [`supports_native_dash`](Self::supports_native_dash)
    /// is true. An empty pattern means solid.
    fn set_line_dash(&mut self, pattern: &[f64]);
    fn stroke(&mut self, params: &StrokeParams);
    fn fill(&mut self, paint: &Paint);

    /// `position` is the top-left corner of the run.
    fn fill_text(&mut self, text: &str, position: Point, font: &Font, paint: &Paint);
    fn draw_image(&mut self, image: &ImageInfo, dest: Rectangle);
}

/// One recorded surface call.
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceCommand {
    Clear,
    Save,
    Restore,
    Translate { dx: f64, dy: f64 },
    Rotate { angle: f64 },
    Scale { sx: f64, sy: f64 },
    BeginPath,
    MoveTo(Point),
    LineTo(Point),
    Ellipse {
        center: Point,
        radius_x: f64,
        radius_y: f64,
        start_angle: f64,
        end_angle: f64,
        anticlockwise: bool,
    },
    BezierCurveTo { control1: Point, control2: Point, end: Point },
    QuadraticCurveTo { control: Point, end: Point },
    ClosePath,
    SetLineDash(Vec<f64>),
    Stroke(StrokeParams),
    Fill(Paint),
    FillText { text: String, position: Point, font: Font },
    DrawImage { name: String, dest: Rectangle },
}

/// A surface that records every call. Text is measured as monospace.
#[derive(Debug, Clone)]
pub struct RecordingSurface {
    commands: Vec<SurfaceCommand>,
    native_dash: bool,
    /// Advance of one character as a fraction of the font size.
    pub char_width: f64,
}

impl Default for RecordingSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingSurface {
    /// A recording surface without native dash support.
    pub fn new() -> Self {
        Self {
            commands: Vec::new(),
            native_dash: false,
            char_width: 0.6,
        }
    }

    /// A recording surface that claims native dash support.
    pub fn with_native_dash() -> Self {
        Self {
            native_dash: true,
            ..Self::new()
        }
    }

    pub fn commands(&self) -> &[SurfaceCommand] {
        &self.commands
    }

    pub fn take_commands(&mut self) -> Vec<SurfaceCommand> {
        std::mem::take(&mut self.commands)
    }

    fn push(&mut self, command: SurfaceCommand) {
        self.commands.push(command);
    }
}

impl TextMeasure for RecordingSurface {
    fn measure_text(&self, text: &str, font: &Font) -> f64 {
        text.chars().count() as f64 * font.size * self.char_width
    }
}

impl Surface for RecordingSurface {
    fn supports_native_dash(&self) -> bool {
        self.native_dash
    }

    fn clear(&mut self) {
        self.push(SurfaceCommand::Clear);
    }

    fn save(&mut self) {
        self.push(SurfaceCommand::Save);
    }

    fn restore(&mut self) {
        self.push(SurfaceCommand::Restore);
    }

    fn translate(&mut self, dx: f64, dy: f64) {
        self.push(SurfaceCommand::Translate { dx, dy });
    }

    fn rotate(&mut self, angle: f64) {
        self.push(SurfaceCommand::Rotate { angle });
    }

    fn scale(&mut self, sx: f64, sy: f64) {
        self.push(SurfaceCommand::Scale { sx, sy });
    }

    fn begin_path(&mut self) {
        self.push(SurfaceCommand::BeginPath);
    }

    fn move_to(&mut self, point: Point) {
        self.push(SurfaceCommand::MoveTo(point));
    }

    fn line_to(&mut self, point: Point) {
        self.push(SurfaceCommand::LineTo(point));
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
        self.push(SurfaceCommand::Ellipse {
            center,
            radius_x,
            radius_y,
            start_angle,
            end_angle,
            anticlockwise,
        });
    }

    fn bezier_curve_to(&mut self, control1: Point, control2: Point, end: Point) {
        self.push(SurfaceCommand::BezierCurveTo {
            control1,
            control2,
            end,
        });
    }

    fn quadratic_curve_to(&mut self, control: Point, end: Point) {
        self.push(SurfaceCommand::QuadraticCurveTo { control, end });
    }

    fn close_path(&mut self) {
        self.push(SurfaceCommand::ClosePath);
    }

    fn set_line_dash(&mut self, pattern: &[f64]) {
        self.push(SurfaceCommand::SetLineDash(pattern.to_vec()));
    }

    fn stroke(&mut self, params: &StrokeParams) {
        self.push(SurfaceCommand::Stroke(params.clone()));
    }

    fn fill(&mut self, paint: &Paint) {
        self.push(SurfaceCommand::Fill(paint.clone()));
    }

    fn fill_text(&mut self, text: &str, position: Point, font: &Font, _paint: &Paint) {
        self.push(SurfaceCommand::FillText {
            text: text.to_string(),
            position,
            font: font.clone(),
        });
    }

    fn draw_image(&mut self, image: &ImageInfo, dest: Rectangle) {
        self.push(SurfaceCommand::DrawImage {
            name: image.name.clone(),
            dest,
        });
    }
}
