use std::fs;
use std::path::{Path, PathBuf};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use sketch::{render_overlay, InMemoryWorld, PipelineBuilder, PipelineConfig, SceneError, Session};
use thiserror::Error;
use tracing::{error, info};

#[derive(Error, Debug)]
pub enum SketchCliError {
    #[error(transparent)]
    Scene(#[from] SceneError),
    #[error(transparent)]
    Image(#[from] image::ImageError),
    #[error(transparent)]
    IoError(#[from] std::io::Error),
    #[error("No input images given")]
    NoInputs,
}

/// Where a batch run reads its settings from and writes its artifacts to
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub config: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub overlay_dir: Option<PathBuf>,
}

/// Per-image outcome of a batch run
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct RunSummary {
    pub image: PathBuf,
    pub circles: usize,
    pub rectangles: usize,
    pub lines: usize,
    pub entities: usize,
    /// Set when the image could not be processed
    pub error: Option<String>,
    pub scene_json: Option<PathBuf>,
    pub overlay: Option<PathBuf>,
}

impl RunSummary {
    fn failed(image: &Path, err: &SketchCliError) -> Self {
        Self {
            image: image.to_path_buf(),
            circles: 0,
            rectangles: 0,
            lines: 0,
            entities: 0,
            error: Some(err.to_string()),
            scene_json: None,
            overlay: None,
        }
    }
}

pub fn load_config(path: Option<&Path>) -> Result<PipelineConfig, SketchCliError> {
    match path {
        Some(path) => Ok(PipelineConfig::from_file(path)?),
        None => Ok(PipelineConfig::default()),
    }
}

/// `<dir>/<image stem>.<extension>`
pub fn artifact_path(dir: &Path, image: &Path, extension: &str) -> PathBuf {
    let stem = image
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "scene".to_string());
    dir.join(format!("{stem}.{extension}"))
}

/// Run every image through one session, resetting between images.
///
/// A failing image is logged and summarized; the batch carries on.
pub fn process_images(images: &[PathBuf], options: &RunOptions) -> Result<Vec<RunSummary>, SketchCliError> {
    if images.is_empty() {
        return Err(SketchCliError::NoInputs);
    }
    let config = load_config(options.config.as_deref())?;
    for dir in [&options.output_dir, &options.overlay_dir].into_iter().flatten() {
        fs::create_dir_all(dir)?;
    }

    let pipeline = PipelineBuilder::from_config(config).build();
    info!("{}", pipeline.info());
    let mut session = Session::new(pipeline, InMemoryWorld::new());

    let mut summaries = Vec::with_capacity(images.len());
    for image in images {
        let summary = match process_one(&mut session, image, options) {
            Ok(summary) => summary,
            Err(err) => {
                error!(image = %image.display(), %err, "image skipped");
                RunSummary::failed(image, &err)
            }
        };
        session.reset();
        summaries.push(summary);
    }
    Ok(summaries)
}

fn process_one(
    session: &mut Session,
    image: &Path,
    options: &RunOptions,
) -> Result<RunSummary, SketchCliError> {
    session.load_image(image)?;
    let entities = session.run()?.len();
    let detections = session.detections();
    info!(
        image = %image.display(),
        circles = detections.circles.len(),
        rectangles = detections.rectangles.len(),
        lines = detections.lines.len(),
        entities,
        "scene synthesized"
    );

    let mut summary = RunSummary {
        image: image.to_path_buf(),
        circles: detections.circles.len(),
        rectangles: detections.rectangles.len(),
        lines: detections.lines.len(),
        entities,
        error: None,
        scene_json: None,
        overlay: None,
    };

    if let (Some(dir), Some(scene)) = (&options.output_dir, session.describe()) {
        let path = artifact_path(dir, image, "json");
        scene.save_json(&path)?;
        summary.scene_json = Some(path);
    }
    if let (Some(dir), Some(source)) = (&options.overlay_dir, session.image()) {
        let path = artifact_path(dir, image, "png");
        render_overlay(source, session.detections()).save(&path)?;
        summary.overlay = Some(path);
    }
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    #[test]
    fn artifacts_are_named_after_the_image() {
        let path = artifact_path(Path::new("/out"), Path::new("/in/drawing.jpg"), "json");
        assert_eq!(path, PathBuf::from("/out/drawing.json"));
    }

    #[test]
    fn empty_batch_is_an_error() {
        assert!(matches!(
            process_images(&[], &RunOptions::default()),
            Err(SketchCliError::NoInputs)
        ));
    }

    #[test]
    fn batch_writes_artifacts_and_survives_bad_inputs() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("blank.png");
        RgbImage::from_pixel(64, 64, Rgb([255, 255, 255])).save(&good).unwrap();
        let bad = dir.path().join("missing.png");

        let options = RunOptions {
            config: None,
            output_dir: Some(dir.path().join("scenes")),
            overlay_dir: Some(dir.path().join("overlays")),
        };
        let summaries = process_images(&[bad.clone(), good.clone()], &options).unwrap();

        assert_eq!(summaries.len(), 2);
        assert!(summaries[0].error.is_some());
        assert_eq!(summaries[1].error, None);
        assert_eq!(summaries[1].entities, 0);
        assert!(summaries[1].scene_json.as_ref().is_some_and(|p| p.exists()));
        assert!(summaries[1].overlay.as_ref().is_some_and(|p| p.exists()));
    }
}
