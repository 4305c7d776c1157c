use std::path::PathBuf;

use image::{Rgb, RgbImage};
use imageproc::{
    drawing::{draw_filled_circle_mut, draw_filled_rect_mut},
    rect::Rect,
};
use sketch::{
    BodyShape, InMemoryWorld, MaterialBand, MotionConstraint, Pipeline, PipelineConfig, PipelineBuilder, PrimitiveKind,
    SceneDescription, Session, SessionState,
};

fn save(dir: &tempfile::TempDir, name: &str, img: &RgbImage) -> PathBuf {
    let path = dir.path().join(name);
    img.save(&path).expect("png written");
    path
}

fn circle_drawing() -> RgbImage {
    let mut img = RgbImage::from_pixel(300, 300, Rgb([255, 255, 255]));
    draw_filled_circle_mut(&mut img, (151, 151), 40, Rgb([30, 30, 210]));
    img
}

fn line_drawing() -> RgbImage {
    let mut img = RgbImage::from_pixel(300, 300, Rgb([255, 255, 255]));
    draw_filled_rect_mut(&mut img, Rect::at(30, 239).of_size(240, 3), Rgb([0, 0, 0]));
    img
}

#[test]
fn rerun_after_reset_never_leaks_entities() {
    let dir = tempfile::tempdir().unwrap();
    let first = save(&dir, "circle.png", &circle_drawing());
    let second = save(&dir, "line.png", &line_drawing());

    let mut session = Session::new(Pipeline::builder().build(), InMemoryWorld::new());

    session.load_image(&first).unwrap();
    let spawned = session.run().unwrap().to_vec();
    let sphere = spawned
        .iter()
        .find(|s| s.entity.shape == BodyShape::Sphere)
        .expect("circle became a sphere");
    assert_eq!(sphere.entity.material.band, MaterialBand::Blue);
    assert_eq!(session.host().len(), spawned.len());

    session.reset();
    assert_eq!(session.state(), SessionState::Idle);
    assert!(session.host().is_empty());

    session.load_image(&second).unwrap();
    session.run().unwrap();
    assert_eq!(session.host().len(), session.entities().len());
    assert_eq!(session.entities().len(), session.detections().len());
    assert!(session
        .entities()
        .iter()
        .all(|s| s.entity.primitive.kind() != PrimitiveKind::Circle));
    assert!(session
        .host()
        .live()
        .all(|(handle, _)| spawned.iter().all(|old| old.handle != handle)));
}

#[test]
fn green_circle_becomes_a_free_planar_body() {
    let dir = tempfile::tempdir().unwrap();
    let mut img = RgbImage::from_pixel(300, 300, Rgb([255, 255, 255]));
    draw_filled_circle_mut(&mut img, (151, 151), 40, Rgb([30, 200, 30]));
    let path = save(&dir, "green.png", &img);

    let mut session = Session::in_memory();
    session.load_image(&path).unwrap();
    let spawned = session.run().unwrap();

    let spheres: Vec<_> = spawned.iter().filter(|s| s.entity.shape == BodyShape::Sphere).collect();
    assert_eq!(spheres.len(), 1, "{spawned:?}");
    let material = &spheres[0].entity.material;
    assert_eq!(material.band, MaterialBand::Green);
    assert_eq!(material.motion_constraint, MotionConstraint::Planar);
    assert_eq!(material.mass, 1.0);
}

#[test]
fn loading_a_new_image_replaces_the_finished_scene() {
    let dir = tempfile::tempdir().unwrap();
    let first = save(&dir, "circle.png", &circle_drawing());
    let second = save(&dir, "line.png", &line_drawing());

    let mut session = Session::in_memory();
    session.load_image(&first).unwrap();
    session.run().unwrap();
    assert!(!session.host().is_empty());

    session.load_image(&second).unwrap();
    assert_eq!(session.state(), SessionState::Loading);
    assert!(session.host().is_empty());
    assert!(session.detections().is_empty());
}

#[test]
fn finished_scene_exports_to_json() {
    let dir = tempfile::tempdir().unwrap();
    let path = save(&dir, "circle.png", &circle_drawing());

    let mut config = PipelineConfig::default();
    config.world.capture_height = 300.0;
    let mut session = Session::new(PipelineBuilder::from_config(config).build(), InMemoryWorld::new());
    session.load_image(&path).unwrap();
    session.run().unwrap();

    let scene = session.describe().expect("ready session describes itself");
    let out = dir.path().join("scene.json");
    scene.save_json(&out).unwrap();

    let loaded = SceneDescription::load_json(&out).unwrap();
    assert_eq!((loaded.image_width, loaded.image_height), (300, 300));
    assert_eq!(loaded.entities.len(), session.entities().len());
}
