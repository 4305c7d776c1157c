//! # Sketch scene synthesis
//!
//! Turns a photographed or drawn image into physically parameterized 2D
//! scene entities. Circles, small rectangles and thin line segments are
//! detected in pixel space, each one's color is sampled at its center and
//! mapped to a material, and the primitive is placed into a planar world.
//!
//! ## Core Features
//!
//! - **Hough-gradient circles** with a white-center false positive filter
//! - **Contour polygons**: Douglas-Peucker approximation classifies
//!   quadrilaterals as rectangles and two-point contours as line segments
//! - **Material table**: an ordered hue/value rule list derives mass,
//!   friction, bounciness and motion constraints
//! - **Session lifecycle** that never leaks entities between runs
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use sketch::{InMemoryWorld, Pipeline, Session};
//!
//! let mut session = Session::new(Pipeline::builder().build(), InMemoryWorld::new());
//! session.load_image("drawing.png")?;
//! for spawned in session.run()? {
//!     println!("{} at {:?}", spawned.entity.shape, spawned.entity.transform.position);
//! }
//! session.reset();
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## One-shot processing
//!
//! ```rust,no_run
//! use sketch::{PipelineBuilder, PipelineConfig};
//!
//! let config = PipelineConfig::from_file("sketch.toml")?;
//! let scene = PipelineBuilder::from_config(config).build().process_path("drawing.png")?;
//! scene.save_json("scene.json")?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod error;
pub mod types;
pub mod traits;
pub mod config;
pub mod color;
pub mod algorithms;
pub mod material;
pub mod scene;
pub mod pipeline;
pub mod session;
pub mod host;
pub mod overlay;
pub mod io;

pub use error::{Result, SceneError};
pub use types::*;
pub use traits::*;
pub use config::{CircleParams, MaterialParams, PipelineConfig, PolygonParams, WorldConfig};
pub use color::{Hsv, SampledColor, SourceImage};
pub use algorithms::{ContourPolygonDetector, HoughCircleDetector};
pub use material::{MaterialBand, MaterialClassifier, MaterialProperties, MotionConstraint};
pub use scene::{BodyShape, SceneEntity, SceneSynthesizer, WorldTransform};
pub use pipeline::{Pipeline, builder::PipelineBuilder};
pub use session::{Session, SessionState, SpawnedEntity};
pub use host::InMemoryWorld;
pub use overlay::render_overlay;
