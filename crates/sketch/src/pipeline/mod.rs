pub mod builder;

use std::path::Path;

use tracing::{debug, info};

use crate::{
    color::SourceImage,
    error::Result,
    material::MaterialClassifier,
    scene::{SceneEntity, SceneSynthesizer},
    traits::PrimitiveDetector,
    types::{Detections, SceneDescription},
};

/// Detection followed by synthesis, for one image at a time
pub struct Pipeline {
    circle_detector: Box<dyn PrimitiveDetector>,
    polygon_detector: Box<dyn PrimitiveDetector>,
    classifier: MaterialClassifier,
    synthesizer: SceneSynthesizer,
}

impl Pipeline {
    /// Create a new pipeline builder
    pub fn builder() -> builder::PipelineBuilder {
        builder::PipelineBuilder::new()
    }

    pub fn new(
        circle_detector: Box<dyn PrimitiveDetector>,
        polygon_detector: Box<dyn PrimitiveDetector>,
        classifier: MaterialClassifier,
        synthesizer: SceneSynthesizer,
    ) -> Self {
        Self {
            circle_detector,
            polygon_detector,
            classifier,
            synthesizer,
        }
    }

    pub fn classifier(&self) -> &MaterialClassifier {
        &self.classifier
    }

    pub fn synthesizer(&self) -> &SceneSynthesizer {
        &self.synthesizer
    }

    /// Run both detectors. Circles come first, then the polygon detector's
    /// rectangles and lines in contour order.
    pub fn detect(&self, image: &SourceImage) -> Result<Detections> {
        let mut detections = Detections::default();
        detections.extend(self.circle_detector.detect(image)?);
        detections.extend(self.polygon_detector.detect(image)?);
        debug!(
            circles = detections.circles.len(),
            rectangles = detections.rectangles.len(),
            lines = detections.lines.len(),
            "detection finished"
        );
        Ok(detections)
    }

    pub fn synthesize(&self, image: &SourceImage, detections: &Detections) -> Vec<SceneEntity> {
        self.synthesizer.synthesize(image, &self.classifier, detections)
    }

    /// Process an image through the entire pipeline
    pub fn process(&self, image: &SourceImage) -> Result<SceneDescription> {
        let detections = self.detect(image)?;
        let entities = self.synthesize(image, &detections);
        info!(
            width = image.width(),
            height = image.height(),
            entities = entities.len(),
            "scene synthesized"
        );

        Ok(SceneDescription {
            image_width: image.width(),
            image_height: image.height(),
            detections,
            entities,
        })
    }

    /// Decode `path` and process it
    pub fn process_path<P: AsRef<Path>>(&self, path: P) -> Result<SceneDescription> {
        let image = SourceImage::open(path)?;
        self.process(&image)
    }

    /// Get information about the pipeline configuration
    pub fn info(&self) -> String {
        let world = &self.synthesizer.world;
        format!(
            "Pipeline: circle detector, polygon detector, {} material rules, capture height {} px at {}x{} px per unit",
            crate::material::MATERIAL_RULES.len(),
            world.capture_height,
            world.pixels_per_unit_x,
            world.pixels_per_unit_y,
        )
    }
}
