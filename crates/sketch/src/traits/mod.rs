use image::GrayImage;
use crate::{
    color::SourceImage,
    error::Result,
    scene::SceneEntity,
    types::Primitive,
};

/// Trait for single-channel image filters (blur, edges, morphology)
pub trait ImagePreprocessor: Send + Sync {
    /// Produce a new buffer; the input is never modified
    fn preprocess(&self, image: &GrayImage) -> Result<GrayImage>;
}

/// Trait for primitive detectors run against a loaded image
pub trait PrimitiveDetector: Send + Sync {
    /// Detect primitives in pixel space, in a stable order
    fn detect(&self, image: &SourceImage) -> Result<Vec<Primitive>>;
}

/// Opaque id a host hands back for a spawned entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityHandle(pub u64);

/// The rendering/physics substrate that realizes entities.
pub trait SceneHost {
    /// Instantiate a concrete body for `entity`
    fn spawn(&mut self, entity: &SceneEntity) -> EntityHandle;

    /// Destroy a body previously returned by `spawn`
    fn despawn(&mut self, handle: EntityHandle);
}
