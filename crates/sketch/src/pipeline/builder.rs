use crate::{
    algorithms::{ContourPolygonDetector, HoughCircleDetector},
    config::{MaterialParams, PipelineConfig, WorldConfig},
    material::MaterialClassifier,
    pipeline::Pipeline,
    scene::SceneSynthesizer,
    traits::PrimitiveDetector,
};

/// Builder for creating processing pipelines with a fluent API
pub struct PipelineBuilder {
    circle_detector: Option<Box<dyn PrimitiveDetector>>,
    polygon_detector: Option<Box<dyn PrimitiveDetector>>,
    config: PipelineConfig,
}

impl PipelineBuilder {
    /// Create a new pipeline builder
    pub fn new() -> Self {
        Self {
            circle_detector: None,
            polygon_detector: None,
            config: PipelineConfig::default(),
        }
    }

    /// Start from a loaded configuration; every stage not overridden later
    /// takes its parameters from it.
    pub fn from_config(config: PipelineConfig) -> Self {
        Self {
            config,
            ..Self::new()
        }
    }

    /// Set the circle detector (replaces any existing one)
    pub fn set_circle_detector<D>(mut self, detector: D) -> Self
    where
        D: PrimitiveDetector + 'static,
    {
        self.circle_detector = Some(Box::new(detector));
        self
    }

    /// Set the rectangle and line detector (replaces any existing one)
    pub fn set_polygon_detector<D>(mut self, detector: D) -> Self
    where
        D: PrimitiveDetector + 'static,
    {
        self.polygon_detector = Some(Box::new(detector));
        self
    }

    pub fn with_world(mut self, world: WorldConfig) -> Self {
        self.config.world = world;
        self
    }

    pub fn with_materials(mut self, materials: MaterialParams) -> Self {
        self.config.materials = materials;
        self
    }

    /// Build the pipeline with default components if not specified
    pub fn build(self) -> Pipeline {
        let PipelineConfig {
            circles,
            polygons,
            materials,
            world,
        } = self.config;

        let circle_detector = self
            .circle_detector
            .unwrap_or_else(|| Box::new(HoughCircleDetector::new(circles)));

        let polygon_detector = self
            .polygon_detector
            .unwrap_or_else(|| Box::new(ContourPolygonDetector::new(polygons)));

        Pipeline::new(
            circle_detector,
            polygon_detector,
            MaterialClassifier::new(materials),
            SceneSynthesizer::new(world),
        )
    }
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}
