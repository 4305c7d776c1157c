//! The load → detect → synthesize lifecycle around one host.
//!
//! A [`Session`] owns the entities it spawned. They are despawned before a new
//! image is loaded over a finished run, on [`Session::reset`], and on drop.

use std::path::{Path, PathBuf};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, IntoStaticStr};
use tracing::{debug, info, warn};

use crate::{
    color::SourceImage,
    error::{Result, SceneError},
    host::InMemoryWorld,
    pipeline::Pipeline,
    scene::SceneEntity,
    traits::{EntityHandle, SceneHost},
    types::{Detections, SceneDescription},
};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash,
    Serialize, Deserialize, JsonSchema,
    Display, EnumIter, IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SessionState {
    Idle,
    /// An image path is set and waiting for `run`.
    Loading,
    Detecting,
    Synthesizing,
    Ready,
}

/// An entity together with the handle its host returned.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnedEntity {
    pub handle: EntityHandle,
    pub entity: SceneEntity,
}

pub struct Session<H: SceneHost = InMemoryWorld> {
    pipeline: Pipeline,
    host: H,
    state: SessionState,
    image_path: Option<PathBuf>,
    image: Option<SourceImage>,
    detections: Detections,
    entities: Vec<SpawnedEntity>,
}

impl Session<InMemoryWorld> {
    /// A session with the default pipeline over an in-memory world
    pub fn in_memory() -> Self {
        Self::new(Pipeline::builder().build(), InMemoryWorld::new())
    }
}

impl<H: SceneHost> Session<H> {
    pub fn new(pipeline: Pipeline, host: H) -> Self {
        Self {
            pipeline,
            host,
            state: SessionState::Idle,
            image_path: None,
            image: None,
            detections: Detections::default(),
            entities: Vec::new(),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn image_path(&self) -> Option<&Path> {
        self.image_path.as_deref()
    }

    /// The decoded image of the last successful run
    pub fn image(&self) -> Option<&SourceImage> {
        self.image.as_ref()
    }

    pub fn detections(&self) -> &Detections {
        &self.detections
    }

    pub fn entities(&self) -> &[SpawnedEntity] {
        &self.entities
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// Set the image for the next run. Loading over a finished run destroys
    /// its entities first; loading over a pending path replaces it.
    pub fn load_image<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        match self.state {
            SessionState::Idle | SessionState::Loading => {}
            SessionState::Ready => {
                self.destroy_entities();
                self.detections.clear();
                self.image = None;
            }
            state @ (SessionState::Detecting | SessionState::Synthesizing) => {
                return Err(SceneError::InvalidTransition { state, operation: "load an image" });
            }
        }
        let path = path.as_ref().to_path_buf();
        debug!(path = %path.display(), "image selected");
        self.image_path = Some(path);
        self.state = SessionState::Loading;
        Ok(())
    }

    /// Decode the pending image, detect primitives and spawn one entity per
    /// primitive. On failure nothing is spawned and the session stays in
    /// `Loading`.
    pub fn run(&mut self) -> Result<&[SpawnedEntity]> {
        match self.state {
            SessionState::Loading => {}
            SessionState::Idle => return Err(SceneError::NoImageLoaded),
            state => return Err(SceneError::InvalidTransition { state, operation: "run" }),
        }
        let path = self.image_path.clone().ok_or(SceneError::NoImageLoaded)?;
        info!(path = %path.display(), "running detection");

        let image = SourceImage::open(&path).map_err(|err| {
            warn!(path = %path.display(), %err, "image could not be decoded");
            err
        })?;

        self.state = SessionState::Detecting;
        let detections = match self.pipeline.detect(&image) {
            Ok(detections) => detections,
            Err(err) => {
                self.state = SessionState::Loading;
                return Err(err);
            }
        };

        self.state = SessionState::Synthesizing;
        let entities = self.pipeline.synthesize(&image, &detections);
        for entity in entities {
            let handle = self.host.spawn(&entity);
            self.entities.push(SpawnedEntity { handle, entity });
        }

        info!(
            circles = detections.circles.len(),
            rectangles = detections.rectangles.len(),
            lines = detections.lines.len(),
            "scene ready"
        );
        self.detections = detections;
        self.image = Some(image);
        self.state = SessionState::Ready;
        Ok(&self.entities)
    }

    /// Despawn everything, forget the image and return to `Idle`.
    pub fn reset(&mut self) {
        if self.state == SessionState::Idle {
            return;
        }
        self.destroy_entities();
        self.detections.clear();
        self.image_path = None;
        self.image = None;
        self.state = SessionState::Idle;
        debug!("session reset");
    }

    /// Descriptor of the finished run, if there is one
    pub fn describe(&self) -> Option<SceneDescription> {
        if self.state != SessionState::Ready {
            return None;
        }
        let image = self.image.as_ref()?;
        Some(SceneDescription {
            image_width: image.width(),
            image_height: image.height(),
            detections: self.detections.clone(),
            entities: self.entities.iter().map(|spawned| spawned.entity).collect(),
        })
    }

    fn destroy_entities(&mut self) {
        for spawned in self.entities.drain(..) {
            self.host.despawn(spawned.handle);
        }
    }
}

impl<H: SceneHost> Drop for Session<H> {
    fn drop(&mut self) {
        self.reset();
    }
}
