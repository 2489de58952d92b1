//! Ordered translate/rotate/scale pipelines bridging coordinate spaces.

use crate::canvas::Surface;
use crate::geometry::{Point, Transformable};

/// A single affine step of a [`TransformSet`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TransformOp {
    Translate { dx: f64, dy: f64 },
    Rotate { angle: f64 },
    Scale { sx: f64, sy: f64 },
}

impl TransformOp {
    fn apply<G: Transformable>(&self, geometry: &G) -> G {
        match *self {
            TransformOp::Translate { dx, dy } => geometry.translated(dx, dy),
            TransformOp::Rotate { angle } => geometry.rotated(angle, Point::ZERO),
            TransformOp::Scale { sx, sy } => geometry.scaled(sx, sy, Point::ZERO),
        }
    }

    fn apply_inverse<G: Transformable>(&self, geometry: &G) -> G {
        match *self {
            TransformOp::Translate { dx, dy } => geometry.translated(-dx, -dy),
            TransformOp::Rotate { angle } => geometry.rotated(-angle, Point::ZERO),
            TransformOp::Scale { sx, sy } => geometry.scaled(1.0 / sx, 1.0 / sy, Point::ZERO),
        }
    }
}

/// An ordered, composable sequence of transforms.
///
/// Operations are prepended as they are added, so the most recently added
/// operation is the outermost one: it is issued first when replaying onto a
/// surface, and applied last when mapping geometry. Nested elements add their
/// own transform first and let their ancestors add theirs afterwards, which
/// yields the local -> root mapping.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransformSet {
    ops: Vec<TransformOp>,
}

impl TransformSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Operations in stored (surface replay) order.
    pub fn ops(&self) -> &[TransformOp] {
        &self.ops
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn add_translation(&mut self, dx: f64, dy: f64) {
        if dx == 0.0 && dy == 0.0 {
            return;
        }
        self.ops.insert(0, TransformOp::Translate { dx, dy });
    }

    pub fn add_rotation(&mut self, angle: f64) {
        if angle == 0.0 {
            return;
        }
        self.ops.insert(0, TransformOp::Rotate { angle });
    }

    pub fn add_scaling(&mut self, sx: f64, sy: f64) {
        if sx == 1.0 && sy == 1.0 {
            return;
        }
        self.ops.insert(0, TransformOp::Scale { sx, sy });
    }

    /// Builder form of [`add_translation`](Self::add_translation).
    pub fn with_translation(mut self, dx: f64, dy: f64) -> Self {
        self.add_translation(dx, dy);
        self
    }

    pub fn with_rotation(mut self, angle: f64) -> Self {
        self.add_rotation(angle);
        self
    }

    pub fn with_scaling(mut self, sx: f64, sy: f64) -> Self {
        self.add_scaling(sx, sy);
        self
    }

    /// Replay onto a surface: a half-pixel translation for crisp 1px
    /// strokes, then every operation in stored order.
    pub fn apply_to_surface(&self, surface: &mut dyn Surface) {
        surface.translate(0.5, 0.5);
        for op in &self.ops {
            match *op {
                TransformOp::Translate { dx, dy } => surface.translate(dx, dy),
                TransformOp::Rotate { angle } => surface.rotate(angle),
                TransformOp::Scale { sx, sy } => surface.scale(sx, sy),
            }
        }
    }

    /// Map geometry into the space the surface renders in (`reverse ==
    /// false`), or back out of it (`reverse == true`).
    pub fn apply_to_geometry<G: Transformable + Clone>(&self, geometry: &G, reverse: bool) -> G {
        let mut result = geometry.clone();
        if reverse {
            for op in &self.ops {
                result = op.apply_inverse(&result);
            }
        } else {
            for op in self.ops.iter().rev() {
                result = op.apply(&result);
            }
        }
        result
    }

    /// Map forward, round to whole pixels, map back. Keeps strokes crisp at
    /// any zoom level at the cost of sub-pixel accuracy.
    pub fn round_point(&self, point: Point) -> Point {
        let forward = self.apply_to_geometry(&point, false).rounded();
        self.apply_to_geometry(&forward, true)
    }

    /// Append all of `outer`'s operations as outer transforms of `self`.
    pub fn then(&self, outer: &TransformSet) -> TransformSet {
        let mut ops = outer.ops.clone();
        ops.extend_from_slice(&self.ops);
        TransformSet { ops }
    }

    /// The same mapping as a kurbo affine (without the half pixel).
    pub fn to_affine(&self) -> kurbo::Affine {
        self.ops.iter().fold(kurbo::Affine::IDENTITY, |acc, op| {
            acc * match *op {
                TransformOp::Translate { dx, dy } => kurbo::Affine::translate((dx, dy)),
                TransformOp::Rotate { angle } => kurbo::Affine::rotate(angle),
                TransformOp::Scale { sx, sy } => kurbo::Affine::scale_non_uniform(sx, sy),
            }
        })
    }
}
