use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, IntoStaticStr};

use crate::{
    color::{SampledColor, SourceImage},
    config::WorldConfig,
    material::{MaterialClassifier, MaterialProperties},
    types::{Circle, Detections, LineSegment, Primitive, Rectangle},
};

/// Body the host must create for an entity.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash,
    Serialize, Deserialize, JsonSchema,
    Display, EnumIter, IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum BodyShape {
    Sphere,
    Box,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct WorldTransform {
    pub position: [f32; 3],
    pub scale: [f32; 3],
    /// Rotation about the out-of-plane (z) axis.
    pub rotation_degrees: f32,
}

/// A primitive realized in world space with its material.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SceneEntity {
    pub shape: BodyShape,
    pub primitive: Primitive,
    pub color: SampledColor,
    pub material: MaterialProperties,
    pub transform: WorldTransform,
}

/// Maps pixel-space primitives into the planar world.
#[derive(Debug, Clone, Default)]
pub struct SceneSynthesizer {
    pub world: WorldConfig,
}

impl SceneSynthesizer {
    pub fn new(world: WorldConfig) -> Self {
        Self { world }
    }

    /// Image origin is top-left with y down, world origin bottom-left with y up.
    pub fn to_world(&self, pixel: [f32; 2]) -> [f32; 3] {
        [
            self.x_units(pixel[0]),
            self.y_units(self.world.capture_height - pixel[1]),
            0.0,
        ]
    }

    /// Pixels along x scaled by the width factor.
    fn x_units(&self, pixels: f32) -> f32 {
        pixels / self.world.pixels_per_unit_x
    }

    /// Pixels along y scaled by the height factor.
    fn y_units(&self, pixels: f32) -> f32 {
        pixels / self.world.pixels_per_unit_y
    }

    pub fn transform(&self, primitive: &Primitive) -> (BodyShape, WorldTransform) {
        match primitive {
            Primitive::Circle(c) => (BodyShape::Sphere, self.circle_transform(c)),
            Primitive::Rectangle(r) => (BodyShape::Box, self.rectangle_transform(r)),
            Primitive::LineSegment(l) => (BodyShape::Box, self.line_transform(l)),
        }
    }

    fn circle_transform(&self, circle: &Circle) -> WorldTransform {
        let d = 2.0 * circle.radius;
        WorldTransform {
            position: self.to_world(circle.center),
            scale: [self.x_units(d), self.y_units(d), self.x_units(d)],
            rotation_degrees: 0.0,
        }
    }

    fn rectangle_transform(&self, rect: &Rectangle) -> WorldTransform {
        let w = &self.world;
        WorldTransform {
            position: self.to_world(rect.center),
            scale: [
                self.x_units(rect.width),
                self.y_units(rect.height),
                self.x_units(w.box_depth),
            ],
            rotation_degrees: rect.rotation,
        }
    }

    /// Two-point boxes report the segment length as width with zero height,
    /// so the sides swap before the fixed line thickness is applied.
    fn line_transform(&self, line: &LineSegment) -> WorldTransform {
        let w = &self.world;
        let scale = if line.height == 0.0 {
            [
                self.x_units(w.line_thickness),
                self.y_units(line.width),
                self.x_units(w.line_depth),
            ]
        } else {
            [
                self.x_units(line.height),
                self.y_units(w.line_thickness),
                self.x_units(w.line_depth),
            ]
        };
        WorldTransform {
            position: self.to_world(line.center),
            scale,
            rotation_degrees: line.angle_degrees,
        }
    }

    pub fn entity(
        &self,
        image: &SourceImage,
        classifier: &MaterialClassifier,
        primitive: Primitive,
    ) -> SceneEntity {
        let color = image.sample(primitive.center());
        let (shape, transform) = self.transform(&primitive);
        SceneEntity {
            shape,
            primitive,
            color,
            material: classifier.classify(&color),
            transform,
        }
    }

    /// One entity per primitive: circles, then lines, then rectangles.
    pub fn synthesize(
        &self,
        image: &SourceImage,
        classifier: &MaterialClassifier,
        detections: &Detections,
    ) -> Vec<SceneEntity> {
        detections
            .primitives()
            .map(|primitive| self.entity(image, classifier, primitive))
            .collect()
    }
}
