use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, IntoStaticStr};

use crate::scene::SceneEntity;

/// A circle found by the Hough detector, in pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Circle {
    pub center: [f32; 2],
    pub radius: f32,
}

/// A near-axis-aligned quadrilateral. `rotation` is always 0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Rectangle {
    pub center: [f32; 2],
    pub width: f32,
    pub height: f32,
    pub rotation: f32,
}

/// The oriented box of a two-vertex contour.
///
/// `width` and `height` are the raw box sides: for a two point contour the
/// box has `width` equal to the point distance and `height` equal to zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct LineSegment {
    pub center: [f32; 2],
    pub width: f32,
    pub height: f32,
    pub angle_degrees: f32,
}

impl LineSegment {
    pub fn length(&self) -> f32 {
        self.width.max(self.height)
    }

    pub fn thickness(&self) -> f32 {
        self.width.min(self.height)
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash,
    Serialize, Deserialize, JsonSchema,
    Display, EnumIter, IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PrimitiveKind {
    Circle,
    Rectangle,
    LineSegment,
}

/// One detected shape. The family is closed, synthesis matches it exhaustively.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Primitive {
    Circle(Circle),
    Rectangle(Rectangle),
    LineSegment(LineSegment),
}

impl Primitive {
    pub fn kind(&self) -> PrimitiveKind {
        match self {
            Self::Circle(_) => PrimitiveKind::Circle,
            Self::Rectangle(_) => PrimitiveKind::Rectangle,
            Self::LineSegment(_) => PrimitiveKind::LineSegment,
        }
    }

    /// The pixel the color sampler reads for this primitive.
    pub fn center(&self) -> [f32; 2] {
        match self {
            Self::Circle(c) => c.center,
            Self::Rectangle(r) => r.center,
            Self::LineSegment(l) => l.center,
        }
    }
}

/// The three primitive lists produced by one detection pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Detections {
    pub circles: Vec<Circle>,
    pub rectangles: Vec<Rectangle>,
    pub lines: Vec<LineSegment>,
}

impl Detections {
    pub fn push(&mut self, primitive: Primitive) {
        match primitive {
            Primitive::Circle(c) => self.circles.push(c),
            Primitive::Rectangle(r) => self.rectangles.push(r),
            Primitive::LineSegment(l) => self.lines.push(l),
        }
    }

    pub fn len(&self) -> usize {
        self.circles.len() + self.rectangles.len() + self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&mut self) {
        self.circles.clear();
        self.rectangles.clear();
        self.lines.clear();
    }

    /// All primitives in instantiation order: circles, then lines, then rectangles.
    pub fn primitives(&self) -> impl Iterator<Item = Primitive> + '_ {
        self.circles
            .iter()
            .copied()
            .map(Primitive::Circle)
            .chain(self.lines.iter().copied().map(Primitive::LineSegment))
            .chain(self.rectangles.iter().copied().map(Primitive::Rectangle))
    }
}

impl Extend<Primitive> for Detections {
    fn extend<I: IntoIterator<Item = Primitive>>(&mut self, iter: I) {
        for primitive in iter {
            self.push(primitive);
        }
    }
}

/// Everything one pipeline run produced for a single image.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SceneDescription {
    /// Original image dimensions
    pub image_width: u32,
    pub image_height: u32,
    pub detections: Detections,
    pub entities: Vec<SceneEntity>,
}

impl SceneDescription {
    /// JSON schema of the descriptor format handed to hosts.
    pub fn schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(SceneDescription)
    }
}
