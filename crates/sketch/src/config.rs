//! Tunable parameters for every stage of the pipeline.
//!
//! Defaults reproduce the fixed constants of the capture rig the pipeline was
//! built for: 300×300 captures mapped onto a 10×10 world, kernel-9 blurs and
//! the Hough/contour thresholds listed on each field.

use std::fs;
use std::path::Path;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SceneError};

/// Standard deviation the usual kernel-size convention assigns to a Gaussian
/// kernel of `kernel_size` taps when no sigma is given.
pub fn kernel_sigma(kernel_size: u32) -> f32 {
    let k = kernel_size.max(1) as f32;
    0.3 * ((k - 1.0) * 0.5 - 1.0) + 0.8
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct CircleParams {
    pub blur_kernel_size: u32,
    /// Inverse ratio of accumulator resolution to image resolution.
    pub dp: f32,
    /// Minimum distance between centers is `image height / min_dist_divisor`.
    pub min_dist_divisor: f32,
    /// Upper Canny threshold; the lower one is half of it.
    pub canny_high_threshold: f32,
    pub accumulator_threshold: u32,
    pub min_radius: u32,
    pub max_radius: u32,
    /// Candidates whose center has R, G and B all above this are dropped.
    pub white_cutoff: u8,
}

impl Default for CircleParams {
    fn default() -> Self {
        Self {
            blur_kernel_size: 9,
            dp: 2.0,
            min_dist_divisor: 3.0,
            canny_high_threshold: 200.0,
            accumulator_threshold: 55,
            min_radius: 10,
            max_radius: 100,
            white_cutoff: 230,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct PolygonParams {
    /// Run the 2x down/up pyramid before edge extraction. Off by default:
    /// stacked on the blur it rounds the corners of small quadrilaterals.
    pub pyramid_filter: bool,
    pub blur_kernel_size: u32,
    pub canny_low_threshold: f32,
    pub canny_high_threshold: f32,
    pub dilation_passes: u32,
    /// Douglas-Peucker tolerance as a fraction of the contour perimeter.
    pub approx_epsilon_ratio: f64,
    /// Quadrilaterals are accepted only when their area is below this.
    pub max_rectangle_area: f64,
    pub max_corner_cosine: f64,
}

impl Default for PolygonParams {
    fn default() -> Self {
        Self {
            pyramid_filter: false,
            blur_kernel_size: 9,
            canny_low_threshold: 0.0,
            canny_high_threshold: 100.0,
            dilation_passes: 1,
            approx_epsilon_ratio: 0.02,
            max_rectangle_area: 500.0,
            max_corner_cosine: 0.3,
        }
    }
}

/// Scale factors and the values a host gives a fresh body before any rule
/// touches it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct MaterialParams {
    pub max_mass: f32,
    pub max_friction: f32,
    pub default_mass: f32,
    pub default_static_friction: f32,
    pub default_dynamic_friction: f32,
    pub default_bounciness: f32,
}

impl Default for MaterialParams {
    fn default() -> Self {
        Self {
            max_mass: 100.0,
            max_friction: 1.0,
            default_mass: 1.0,
            default_static_friction: 0.6,
            default_dynamic_friction: 0.6,
            default_bounciness: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct WorldConfig {
    /// Pixel height of the capture; world y is flipped against it.
    pub capture_height: f32,
    /// Pixels per world unit along x; the width factor is its inverse.
    pub pixels_per_unit_x: f32,
    /// Pixels per world unit along y; the height factor is its inverse.
    pub pixels_per_unit_y: f32,
    /// Out-of-plane depth of rectangle boxes, in pixels.
    pub box_depth: f32,
    /// Out-of-plane depth of line boxes, in pixels.
    pub line_depth: f32,
    /// In-plane thickness given to line boxes, in pixels.
    pub line_thickness: f32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            capture_height: 300.0,
            pixels_per_unit_x: 30.0,
            pixels_per_unit_y: 30.0,
            box_depth: 40.0,
            line_depth: 50.0,
            line_thickness: 5.0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct PipelineConfig {
    pub circles: CircleParams,
    pub polygons: PolygonParams,
    pub materials: MaterialParams,
    pub world: WorldConfig,
}

impl PipelineConfig {
    /// Load a configuration from a TOML file
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load a configuration from a JSON file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Auto-detect file format and load configuration
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_ref = path.as_ref();
        match path_ref.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Self::from_toml_file(path),
            Some("json") => Self::from_json_file(path),
            _ => Err(SceneError::UnsupportedConfigFormat),
        }
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kernel_nine_maps_to_sigma_1_7() {
        assert!((kernel_sigma(9) - 1.7).abs() < 1e-6);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = PipelineConfig::from_toml(
            r#"
            [circles]
            accumulator_threshold = 40

            [world]
            capture_height = 600.0
            "#,
        )
        .expect("valid toml");

        assert_eq!(config.circles.accumulator_threshold, 40);
        assert_eq!(config.circles.max_radius, 100);
        assert_eq!(config.world.capture_height, 600.0);
        assert_eq!(config.polygons, PolygonParams::default());
    }

    #[test]
    fn toml_round_trip_preserves_defaults() {
        let config = PipelineConfig::default();
        let text = config.to_toml().expect("serializable");
        assert_eq!(PipelineConfig::from_toml(&text).expect("parsable"), config);
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let err = PipelineConfig::from_file("settings.yaml").unwrap_err();
        assert!(matches!(err, SceneError::UnsupportedConfigFormat));
    }
}
